//! Components: behaviour attached to entities

use std::any::{type_name, Any};

use super::world::ComponentSlot;
use super::{Commands, ComponentId, EntityId, SceneError, World};

/// Upcast helper so components can be found by concrete type
///
/// Implemented for every `'static` type; never implement it by hand.
pub trait AsAny: Any {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// Borrow as `&mut dyn Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Behaviour unit attached to an entity
///
/// Both hooks default to doing nothing.
///
/// ```rust
/// use tusk_engine::scene::{Component, ComponentContext};
///
/// struct Spin {
///     angle: f32,
/// }
///
/// impl Component for Spin {
///     fn update(&mut self, _ctx: &mut ComponentContext<'_>, dt: f32) {
///         self.angle += dt;
///     }
/// }
/// ```
pub trait Component: AsAny {
    /// Called once each time the component is attached to an entity
    fn start(&mut self, _ctx: &mut ComponentContext<'_>) {}

    /// Called once per tick while attached to an active subtree
    fn update(&mut self, _ctx: &mut ComponentContext<'_>, _dt: f32) {}

    /// Name used in logs
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }
}

/// What a component hook can see and request
///
/// The world is read-only here. The running component itself is absent from
/// it for the duration of the hook. Structural edits are queued on
/// [`ComponentContext::commands`].
pub struct ComponentContext<'a> {
    world: &'a World,
    entity: EntityId,
    component: ComponentId,
    commands: &'a mut Commands,
}

impl<'a> ComponentContext<'a> {
    pub(super) fn new(
        world: &'a World,
        entity: EntityId,
        component: ComponentId,
        commands: &'a mut Commands,
    ) -> Self {
        Self {
            world,
            entity,
            component,
            commands,
        }
    }

    /// Entity the component is attached to
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Handle of the running component
    pub const fn component(&self) -> ComponentId {
        self.component
    }

    /// Read-only view of the world
    pub const fn world(&self) -> &World {
        self.world
    }

    /// Queue for structural edits
    pub fn commands(&mut self) -> &mut Commands {
        self.commands
    }
}

pub(super) fn downcast_ref<T: Component>(component: &dyn Component) -> Option<&T> {
    component.as_any().downcast_ref::<T>()
}

pub(super) fn downcast_mut<T: Component>(component: &mut dyn Component) -> Option<&mut T> {
    component.as_any_mut().downcast_mut::<T>()
}

impl World {
    /// Store a detached component
    pub fn create_component<C: Component>(&mut self, component: C) -> ComponentId {
        self.create_boxed_component(Box::new(component))
    }

    /// Store an already boxed detached component
    pub fn create_boxed_component(&mut self, component: Box<dyn Component>) -> ComponentId {
        self.components.insert(ComponentSlot {
            entity: None,
            behaviour: Some(component),
        })
    }

    /// Store a component and attach it to `entity`
    pub fn spawn_component<C: Component>(
        &mut self,
        entity: EntityId,
        component: C,
    ) -> Result<ComponentId, SceneError> {
        self.spawn_boxed_component(entity, Box::new(component))
    }

    /// Store an already boxed component and attach it to `entity`
    pub fn spawn_boxed_component(
        &mut self,
        entity: EntityId,
        component: Box<dyn Component>,
    ) -> Result<ComponentId, SceneError> {
        if !self.entities.contains_key(entity) {
            return Err(SceneError::UnknownEntity(entity));
        }
        let id = self.create_boxed_component(component);
        self.add_component(entity, id)?;
        Ok(id)
    }

    /// Attach a detached component, then run its `start` hook
    ///
    /// # Errors
    /// * [`SceneError::UnknownEntity`] / [`SceneError::UnknownComponent`]
    /// * [`SceneError::ComponentAlreadyAttached`] if it is on any entity
    pub fn add_component(&mut self, entity: EntityId, component: ComponentId) -> Result<(), SceneError> {
        let node = self
            .entities
            .get_mut(entity)
            .ok_or(SceneError::UnknownEntity(entity))?;
        let slot = self
            .components
            .get_mut(component)
            .ok_or(SceneError::UnknownComponent(component))?;
        if let Some(owner) = slot.entity {
            return Err(SceneError::ComponentAlreadyAttached {
                component,
                entity: owner,
            });
        }

        slot.entity = Some(entity);
        node.components.push(component);
        log::debug!("Attached component {:?} to {:?}", component, entity);

        let mut commands = Commands::new();
        self.run_hook(component, entity, &mut commands, |behaviour, ctx| {
            behaviour.start(ctx);
        });
        self.apply_commands(commands);
        Ok(())
    }

    /// Detach a component from `entity`, keeping it alive for re-attachment
    ///
    /// Returns `false` without doing anything if it is not on that entity.
    pub fn remove_component(&mut self, entity: EntityId, component: ComponentId) -> bool {
        let Some(node) = self.entities.get_mut(entity) else {
            return false;
        };
        let Some(index) = node.components.iter().position(|&c| c == component) else {
            return false;
        };

        node.components.remove(index);
        if let Some(slot) = self.components.get_mut(component) {
            slot.entity = None;
        }
        log::debug!("Detached component {:?} from {:?}", component, entity);
        true
    }

    /// Detach and free a component, handing back its behaviour
    pub fn destroy_component(&mut self, component: ComponentId) -> Option<Box<dyn Component>> {
        let owner = self.components.get(component)?.entity;
        if let Some(entity) = owner {
            self.remove_component(entity, component);
        }
        self.components.remove(component)?.behaviour
    }

    /// Entity a component is attached to
    pub fn component_entity(&self, component: ComponentId) -> Option<EntityId> {
        self.components.get(component)?.entity
    }

    /// Whether the handle refers to a live component
    pub fn contains_component(&self, component: ComponentId) -> bool {
        self.components.contains_key(component)
    }

    /// Borrow a component by handle as its concrete type
    pub fn component<T: Component>(&self, component: ComponentId) -> Option<&T> {
        downcast_ref(self.components.get(component)?.behaviour.as_deref()?)
    }

    /// Mutably borrow a component by handle as its concrete type
    pub fn component_mut<T: Component>(&mut self, component: ComponentId) -> Option<&mut T> {
        downcast_mut(self.components.get_mut(component)?.behaviour.as_deref_mut()?)
    }

    /// First component of type `T` on `entity`, in attach order
    pub fn get_component<T: Component>(&self, entity: EntityId) -> Option<&T> {
        self.get_components::<T>(entity).next()
    }

    /// Mutable access to the first component of type `T` on `entity`
    pub fn get_component_mut<T: Component>(&mut self, entity: EntityId) -> Option<&mut T> {
        let id = self.find_component::<T>(entity)?;
        self.component_mut(id)
    }

    /// Handle of the first component of type `T` on `entity`
    pub fn find_component<T: Component>(&self, entity: EntityId) -> Option<ComponentId> {
        self.entities.get(entity)?.components.iter().copied().find(|&id| {
            self.components
                .get(id)
                .and_then(|slot| slot.behaviour.as_deref())
                .is_some_and(|behaviour| behaviour.as_any().is::<T>())
        })
    }

    /// Every component of type `T` on `entity`, in attach order
    pub fn get_components<T: Component>(&self, entity: EntityId) -> impl Iterator<Item = &T> + '_ {
        self.components_of(entity).iter().filter_map(|&id| {
            self.components
                .get(id)
                .and_then(|slot| slot.behaviour.as_deref())
                .and_then(downcast_ref::<T>)
        })
    }

    /// Component handles on `entity`, in attach order
    pub fn components_of(&self, entity: EntityId) -> &[ComponentId] {
        self.entities
            .get(entity)
            .map_or(&[], |node| node.components.as_slice())
    }
}
