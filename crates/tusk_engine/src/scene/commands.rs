//! Deferred scene edits

use super::{Component, ComponentId, EntityId, SceneId};

/// One queued edit
pub(super) enum Command {
    AddChild { parent: EntityId, child: EntityId },
    RemoveChild { parent: EntityId, child: EntityId },
    AddComponent { entity: EntityId, component: ComponentId },
    SpawnComponent { entity: EntityId, component: Box<dyn Component> },
    RemoveComponent { entity: EntityId, component: ComponentId },
    DestroyComponent(ComponentId),
    SetActive { entity: EntityId, active: bool },
    Despawn(EntityId),
    AddToScene { scene: SceneId, entity: EntityId },
    RemoveFromScene { scene: SceneId, entity: EntityId },
}

/// Queue of scene edits requested while the tree is being traversed
///
/// Applied in request order at the end of the outermost update call. An
/// edit that has become invalid by then (stale handle, cycle) is logged and
/// skipped; the rest still apply.
#[derive(Default)]
pub struct Commands {
    queue: Vec<Command>,
}

impl Commands {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Parent `child` under `parent`
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) {
        self.queue.push(Command::AddChild { parent, child });
    }

    /// Detach `child` from `parent`
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) {
        self.queue.push(Command::RemoveChild { parent, child });
    }

    /// Attach an existing detached component
    pub fn add_component(&mut self, entity: EntityId, component: ComponentId) {
        self.queue.push(Command::AddComponent { entity, component });
    }

    /// Create a component and attach it
    pub fn spawn_component<C: Component>(&mut self, entity: EntityId, component: C) {
        self.queue.push(Command::SpawnComponent {
            entity,
            component: Box::new(component),
        });
    }

    /// Detach a component, keeping it alive
    pub fn remove_component(&mut self, entity: EntityId, component: ComponentId) {
        self.queue.push(Command::RemoveComponent { entity, component });
    }

    /// Detach and free a component
    pub fn destroy_component(&mut self, component: ComponentId) {
        self.queue.push(Command::DestroyComponent(component));
    }

    /// Activate or deactivate an entity subtree
    pub fn set_active(&mut self, entity: EntityId, active: bool) {
        self.queue.push(Command::SetActive { entity, active });
    }

    /// Free an entity, its subtree and their components
    pub fn despawn(&mut self, entity: EntityId) {
        self.queue.push(Command::Despawn(entity));
    }

    /// Add a root entity to a scene
    pub fn add_to_scene(&mut self, scene: SceneId, entity: EntityId) {
        self.queue.push(Command::AddToScene { scene, entity });
    }

    /// Remove a root entity from a scene
    pub fn remove_from_scene(&mut self, scene: SceneId, entity: EntityId) {
        self.queue.push(Command::RemoveFromScene { scene, entity });
    }

    /// Number of queued edits
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub(super) fn into_queue(self) -> Vec<Command> {
        self.queue
    }
}

impl std::fmt::Debug for Commands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Commands").field("queued", &self.queue.len()).finish()
    }
}
