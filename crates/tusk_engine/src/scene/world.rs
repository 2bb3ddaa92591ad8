//! World arena and tree traversal

use super::commands::Command;
use super::entity::EntityNode;
use super::scenes::Scene;
use super::{Commands, Component, ComponentContext, ComponentId, EntityId, SceneError, SceneId};
use crate::foundation::collections::SlotMap;

/// Storage for one component and its owner back-reference
pub(super) struct ComponentSlot {
    pub(super) entity: Option<EntityId>,
    /// `None` only while the component's own hook is running
    pub(super) behaviour: Option<Box<dyn Component>>,
}

/// Arena owning every entity, component and scene
pub struct World {
    pub(super) entities: SlotMap<EntityId, EntityNode>,
    pub(super) components: SlotMap<ComponentId, ComponentSlot>,
    pub(super) scenes: SlotMap<SceneId, Scene>,
}

impl World {
    /// Create an empty world
    pub fn new() -> Self {
        Self {
            entities: SlotMap::with_key(),
            components: SlotMap::with_key(),
            scenes: SlotMap::with_key(),
        }
    }

    /// Update an entity subtree
    ///
    /// An inactive entity freezes its whole subtree. Otherwise its components
    /// run in attach order, then its children in child order. Edits queued by
    /// the hooks apply after the traversal.
    pub fn update_entity(&mut self, entity: EntityId, dt: f32) -> Result<(), SceneError> {
        if !self.entities.contains_key(entity) {
            return Err(SceneError::UnknownEntity(entity));
        }

        let mut commands = Commands::new();
        self.visit(entity, dt, &mut commands);
        self.apply_commands(commands);
        Ok(())
    }

    /// Update every root of a scene in insertion order
    pub fn update_scene(&mut self, scene: SceneId, dt: f32) -> Result<(), SceneError> {
        let roots = self
            .scenes
            .get(scene)
            .ok_or(SceneError::UnknownScene(scene))?
            .roots()
            .to_vec();

        let mut commands = Commands::new();
        for root in roots {
            self.visit(root, dt, &mut commands);
        }
        self.apply_commands(commands);
        Ok(())
    }

    fn visit(&mut self, entity: EntityId, dt: f32, commands: &mut Commands) {
        let Some(node) = self.entities.get(entity) else {
            return;
        };
        if !node.active {
            return;
        }

        // Hooks cannot edit the tree, but the lists are borrowed from `self`
        let components = node.components.clone();
        let children = node.children.clone();

        for component in components {
            self.run_hook(component, entity, commands, |behaviour, ctx| {
                behaviour.update(ctx, dt);
            });
        }
        for child in children {
            self.visit(child, dt, commands);
        }
    }

    /// Run a hook with the component taken out of its slot
    pub(super) fn run_hook<F>(
        &mut self,
        component: ComponentId,
        entity: EntityId,
        commands: &mut Commands,
        hook: F,
    ) where
        F: FnOnce(&mut dyn Component, &mut ComponentContext<'_>),
    {
        let Some(mut behaviour) = self
            .components
            .get_mut(component)
            .and_then(|slot| slot.behaviour.take())
        else {
            return;
        };

        {
            let mut ctx = ComponentContext::new(self, entity, component, commands);
            hook(behaviour.as_mut(), &mut ctx);
        }

        if let Some(slot) = self.components.get_mut(component) {
            slot.behaviour = Some(behaviour);
        }
    }

    /// Apply queued edits in request order, skipping the ones that fail
    pub(super) fn apply_commands(&mut self, commands: Commands) {
        for command in commands.into_queue() {
            if let Err(e) = self.apply_command(command) {
                log::warn!("Skipping deferred scene edit: {}", e);
            }
        }
    }

    fn apply_command(&mut self, command: Command) -> Result<(), SceneError> {
        match command {
            Command::AddChild { parent, child } => self.add_child(parent, child),
            Command::RemoveChild { parent, child } => {
                self.remove_child(parent, child)?;
                Ok(())
            }
            Command::AddComponent { entity, component } => self.add_component(entity, component),
            Command::SpawnComponent { entity, component } => {
                self.spawn_boxed_component(entity, component)?;
                Ok(())
            }
            Command::RemoveComponent { entity, component } => {
                self.remove_component(entity, component);
                Ok(())
            }
            Command::DestroyComponent(component) => self
                .destroy_component(component)
                .map(|_| ())
                .ok_or(SceneError::UnknownComponent(component)),
            Command::SetActive { entity, active } => self.set_active(entity, active),
            Command::Despawn(entity) => self.despawn(entity),
            Command::AddToScene { scene, entity } => self.add_entity(scene, entity),
            Command::RemoveFromScene { scene, entity } => {
                self.remove_entity(scene, entity)?;
                Ok(())
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for World {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("World")
            .field("entities", &self.entities.len())
            .field("components", &self.components.len())
            .field("scenes", &self.scenes.len())
            .finish()
    }
}
