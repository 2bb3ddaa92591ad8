//! Entities and the parent/child tree

use super::{ComponentId, EntityId, SceneError, World};

/// One node of the entity tree
#[derive(Debug)]
pub(super) struct EntityNode {
    pub(super) name: Option<String>,
    pub(super) active: bool,
    pub(super) parent: Option<EntityId>,
    pub(super) children: Vec<EntityId>,
    pub(super) components: Vec<ComponentId>,
}

impl EntityNode {
    fn new(name: Option<String>) -> Self {
        Self {
            name,
            active: true,
            parent: None,
            children: Vec::new(),
            components: Vec::new(),
        }
    }
}

impl World {
    /// Create an active entity with no parent, children or components
    pub fn create_entity(&mut self) -> EntityId {
        self.entities.insert(EntityNode::new(None))
    }

    /// Create an entity carrying a display name
    pub fn create_named_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.entities.insert(EntityNode::new(Some(name.into())))
    }

    /// Whether the handle refers to a live entity
    pub fn contains_entity(&self, entity: EntityId) -> bool {
        self.entities.contains_key(entity)
    }

    /// Number of live entities
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Display name, if one was given
    pub fn name(&self, entity: EntityId) -> Option<&str> {
        self.entities.get(entity)?.name.as_deref()
    }

    /// Parent of `entity`
    pub fn parent(&self, entity: EntityId) -> Option<EntityId> {
        self.entities.get(entity)?.parent
    }

    /// Children of `entity` in update order
    pub fn children(&self, entity: EntityId) -> &[EntityId] {
        self.entities
            .get(entity)
            .map_or(&[], |node| node.children.as_slice())
    }

    /// Whether `entity` takes part in updates; `false` for unknown handles
    ///
    /// Only the entity's own flag is reported. An active entity under an
    /// inactive ancestor is still skipped by the traversal.
    pub fn is_active(&self, entity: EntityId) -> bool {
        self.entities.get(entity).is_some_and(|node| node.active)
    }

    /// Enable or disable updates for `entity` and its subtree
    pub fn set_active(&mut self, entity: EntityId, active: bool) -> Result<(), SceneError> {
        let node = self
            .entities
            .get_mut(entity)
            .ok_or(SceneError::UnknownEntity(entity))?;
        node.active = active;
        Ok(())
    }

    /// Append `child` to `parent`'s children
    ///
    /// A child that already has a parent is moved. Re-adding an existing
    /// child moves it to the end of the list.
    ///
    /// # Errors
    /// * [`SceneError::UnknownEntity`] for a stale handle
    /// * [`SceneError::CycleDetected`] if `child` is `parent` or one of its ancestors
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), SceneError> {
        if !self.entities.contains_key(parent) {
            return Err(SceneError::UnknownEntity(parent));
        }
        if !self.entities.contains_key(child) {
            return Err(SceneError::UnknownEntity(child));
        }
        if self.is_ancestor_or_self(child, parent) {
            return Err(SceneError::CycleDetected { parent, child });
        }

        if let Some(previous) = self.parent(child) {
            self.detach_child(previous, child);
        }
        if let Some(node) = self.entities.get_mut(parent) {
            node.children.push(child);
        }
        if let Some(node) = self.entities.get_mut(child) {
            node.parent = Some(parent);
        }
        Ok(())
    }

    /// Detach `child` from `parent`
    ///
    /// Returns `Ok(false)` without changes if `child` is not a child of `parent`.
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) -> Result<bool, SceneError> {
        if !self.entities.contains_key(parent) {
            return Err(SceneError::UnknownEntity(parent));
        }
        if self.parent(child) != Some(parent) {
            return Ok(false);
        }

        self.detach_child(parent, child);
        if let Some(node) = self.entities.get_mut(child) {
            node.parent = None;
        }
        Ok(true)
    }

    /// Free `entity`, its whole subtree and every component attached to it
    ///
    /// The entity is detached from its parent and removed from every scene's
    /// root list first.
    pub fn despawn(&mut self, entity: EntityId) -> Result<(), SceneError> {
        if !self.entities.contains_key(entity) {
            return Err(SceneError::UnknownEntity(entity));
        }

        if let Some(parent) = self.parent(entity) {
            self.detach_child(parent, entity);
        }
        for (_, scene) in self.scenes.iter_mut() {
            scene.remove_root(entity);
        }

        let mut pending = vec![entity];
        let mut freed = 0usize;
        while let Some(current) = pending.pop() {
            let Some(node) = self.entities.remove(current) else {
                continue;
            };
            for component in node.components {
                self.components.remove(component);
            }
            pending.extend(node.children);
            freed += 1;
        }

        log::debug!("Despawned {:?} ({} entities)", entity, freed);
        Ok(())
    }

    fn detach_child(&mut self, parent: EntityId, child: EntityId) {
        if let Some(node) = self.entities.get_mut(parent) {
            node.children.retain(|&c| c != child);
        }
    }

    fn is_ancestor_or_self(&self, candidate: EntityId, entity: EntityId) -> bool {
        let mut current = Some(entity);
        while let Some(id) = current {
            if id == candidate {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}
