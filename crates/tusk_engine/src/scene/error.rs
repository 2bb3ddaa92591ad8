//! Scene graph errors

use thiserror::Error;

use super::{ComponentId, EntityId, SceneId};

/// Scene graph errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// Entity handle is stale or was never issued by this world
    #[error("Unknown entity {0:?}")]
    UnknownEntity(EntityId),

    /// Component handle is stale or was never issued by this world
    #[error("Unknown component {0:?}")]
    UnknownComponent(ComponentId),

    /// Scene handle is stale or was never issued by this world
    #[error("Unknown scene {0:?}")]
    UnknownScene(SceneId),

    /// Parenting would make an entity its own ancestor
    #[error("Adding {child:?} under {parent:?} would create a cycle")]
    CycleDetected {
        /// Requested parent
        parent: EntityId,
        /// Requested child
        child: EntityId,
    },

    /// Component is already on an entity's component list
    #[error("Component {component:?} is already attached to {entity:?}")]
    ComponentAlreadyAttached {
        /// Component being attached
        component: ComponentId,
        /// Entity it is currently attached to
        entity: EntityId,
    },
}
