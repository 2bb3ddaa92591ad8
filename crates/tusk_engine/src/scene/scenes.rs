//! Scenes: named lists of root entities

use super::{EntityId, SceneError, SceneId, World};

/// Ordered set of root entities updated together
#[derive(Debug, Clone, Default)]
pub struct Scene {
    name: String,
    roots: Vec<EntityId>,
}

impl Scene {
    fn new(name: String) -> Self {
        Self {
            name,
            roots: Vec::new(),
        }
    }

    /// Scene name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root entities in update order
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    pub(super) fn remove_root(&mut self, entity: EntityId) -> bool {
        let before = self.roots.len();
        self.roots.retain(|&root| root != entity);
        self.roots.len() != before
    }
}

impl World {
    /// Create an empty scene
    pub fn create_scene(&mut self, name: impl Into<String>) -> SceneId {
        let name = name.into();
        log::debug!("Creating scene '{}'", name);
        self.scenes.insert(Scene::new(name))
    }

    /// Drop a scene; its entities stay alive
    pub fn remove_scene(&mut self, scene: SceneId) -> Option<Scene> {
        self.scenes.remove(scene)
    }

    /// Look up a scene
    pub fn scene(&self, scene: SceneId) -> Option<&Scene> {
        self.scenes.get(scene)
    }

    /// Append a root entity; adding one that is already a root does nothing
    pub fn add_entity(&mut self, scene: SceneId, entity: EntityId) -> Result<(), SceneError> {
        if !self.entities.contains_key(entity) {
            return Err(SceneError::UnknownEntity(entity));
        }
        let target = self
            .scenes
            .get_mut(scene)
            .ok_or(SceneError::UnknownScene(scene))?;

        if target.roots.contains(&entity) {
            log::debug!("{:?} is already a root of scene '{}'", entity, target.name);
        } else {
            target.roots.push(entity);
        }
        Ok(())
    }

    /// Remove a root entity, returning whether it was present
    pub fn remove_entity(&mut self, scene: SceneId, entity: EntityId) -> Result<bool, SceneError> {
        let target = self
            .scenes
            .get_mut(scene)
            .ok_or(SceneError::UnknownScene(scene))?;
        Ok(target.remove_root(entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_keep_insertion_order() {
        let mut world = World::new();
        let scene = world.create_scene("level");
        let a = world.create_entity();
        let b = world.create_entity();

        world.add_entity(scene, b).unwrap();
        world.add_entity(scene, a).unwrap();

        let scene = world.scene(scene).unwrap();
        assert_eq!(scene.name(), "level");
        assert_eq!(scene.roots(), &[b, a]);
    }

    #[test]
    fn test_duplicate_root_is_ignored() {
        let mut world = World::new();
        let scene = world.create_scene("level");
        let a = world.create_entity();

        world.add_entity(scene, a).unwrap();
        world.add_entity(scene, a).unwrap();

        assert_eq!(world.scene(scene).unwrap().roots(), &[a]);
    }

    #[test]
    fn test_remove_entity() {
        let mut world = World::new();
        let scene = world.create_scene("level");
        let a = world.create_entity();
        world.add_entity(scene, a).unwrap();

        assert!(world.remove_entity(scene, a).unwrap());
        assert!(!world.remove_entity(scene, a).unwrap());
        assert!(world.contains_entity(a));
    }

    #[test]
    fn test_unknown_scene() {
        let mut world = World::new();
        let scene = world.create_scene("gone");
        let a = world.create_entity();
        world.remove_scene(scene).unwrap();

        assert_eq!(world.add_entity(scene, a), Err(SceneError::UnknownScene(scene)));
        assert_eq!(world.update_scene(scene, 0.1), Err(SceneError::UnknownScene(scene)));
    }
}
