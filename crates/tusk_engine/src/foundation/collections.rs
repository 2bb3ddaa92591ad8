//! Specialized collection types

pub use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Stable handle to an entity stored in a [`World`](crate::scene::World)
    pub struct EntityId;

    /// Stable handle to a component stored in a [`World`](crate::scene::World)
    pub struct ComponentId;

    /// Stable handle to a scene stored in a [`World`](crate::scene::World)
    pub struct SceneId;
}

/// Opaque handle to a compiled GPU program
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

/// Opaque handle to uploaded mesh buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(pub u32);
