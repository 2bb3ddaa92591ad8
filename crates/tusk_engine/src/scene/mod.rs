//! Scene graph
//!
//! Entities form trees, carry ordered lists of behaviour components, and are
//! reachable from the update loop only through the root list of a scene.
//! Everything lives in one [`World`] arena and is addressed by generational
//! handles, so parent and owner back-references can never dangle.
//!
//! ## Update flow
//!
//! ```text
//! SceneManager::update(dt)
//!   └─ World::update_scene(active, dt)
//!        └─ for each root: update_entity
//!             ├─ inactive? stop (whole subtree frozen)
//!             ├─ components in order: Component::update
//!             └─ children in order: recurse
//!   └─ apply deferred Commands (tick boundary)
//! ```
//!
//! Component hooks see the world read-only. Structural edits requested from a
//! hook go through [`Commands`] and are applied once the outermost update call
//! has finished traversing.

mod commands;
mod component;
mod entity;
mod error;
mod scenes;
mod scene_manager;
mod world;

#[cfg(test)]
mod test_components;

pub use commands::Commands;
pub use component::{AsAny, Component, ComponentContext};
pub use error::SceneError;
pub use scenes::Scene;
pub use scene_manager::SceneManager;
pub use world::World;

pub use crate::foundation::collections::{ComponentId, EntityId, SceneId};
