//! Scene Manager
//!
//! Owns the world and tracks which scene is active. The engine calls
//! [`SceneManager::update`] once per fixed tick.

use super::{SceneId, World};

/// Holder of the world and the active scene handle
#[derive(Debug, Default)]
pub struct SceneManager {
    world: World,
    active: Option<SceneId>,
}

impl SceneManager {
    /// Create a manager with an empty world and no active scene
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager around an existing world
    pub fn with_world(world: World) -> Self {
        Self { world, active: None }
    }

    /// World containing every scene
    pub const fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for building and editing scenes
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Make `scene` active, returning the previously active handle
    ///
    /// The previous scene is left untouched.
    pub fn set_scene(&mut self, scene: SceneId) -> Option<SceneId> {
        if let Some(target) = self.world.scene(scene) {
            log::info!("Switching to scene '{}'", target.name());
        }
        self.active.replace(scene)
    }

    /// Deactivate the current scene
    pub fn clear_scene(&mut self) -> Option<SceneId> {
        self.active.take()
    }

    /// Currently active scene handle
    pub const fn active_scene(&self) -> Option<SceneId> {
        self.active
    }

    /// Update the active scene
    ///
    /// Does nothing when no scene is active or the handle is stale.
    pub fn update(&mut self, dt: f32) {
        let Some(scene) = self.active else {
            return;
        };
        if let Err(e) = self.world.update_scene(scene, dt) {
            log::warn!("Active scene not updated: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::test_components::{Probe, ProbeLog};

    fn scene_with_probe(manager: &mut SceneManager, name: &str, log: &ProbeLog) -> SceneId {
        let world = manager.world_mut();
        let scene = world.create_scene(name);
        let root = world.create_entity();
        world.spawn_component(root, Probe::new(name, log)).unwrap();
        world.add_entity(scene, root).unwrap();
        scene
    }

    #[test]
    fn test_update_without_scene_is_noop() {
        let mut manager = SceneManager::new();
        manager.update(0.1);
        assert_eq!(manager.active_scene(), None);
    }

    #[test]
    fn test_update_forwards_to_active_scene_only() {
        let log = ProbeLog::default();
        let mut manager = SceneManager::new();
        let menu = scene_with_probe(&mut manager, "menu", &log);
        let level = scene_with_probe(&mut manager, "level", &log);

        assert_eq!(manager.set_scene(menu), None);
        manager.update(0.1);
        assert_eq!(manager.set_scene(level), Some(menu));
        manager.update(0.1);

        assert_eq!(log.updates(), vec!["menu", "level"]);
        assert!(manager.world().scene(menu).is_some());
    }

    #[test]
    fn test_stale_active_scene_is_skipped() {
        let log = ProbeLog::default();
        let mut manager = SceneManager::new();
        let scene = scene_with_probe(&mut manager, "level", &log);
        manager.set_scene(scene);

        manager.world_mut().remove_scene(scene);
        manager.update(0.1);

        assert!(log.updates().is_empty());
        assert_eq!(manager.clear_scene(), Some(scene));
        assert_eq!(manager.active_scene(), None);
    }
}
