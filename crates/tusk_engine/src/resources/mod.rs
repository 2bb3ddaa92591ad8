//! Resource management
//!
//! A path-keyed cache of loaded assets. Each asset type is identified by a
//! string tag and registered once with a [`TypeHandler`] that knows how to load
//! it and, optionally, how to release it. Cached entries carry a lifespan tag so
//! groups of assets (one level, one scene) can be evicted together.
//!
//! ```text
//! load("shader", "shaders/main.shader", "level1")
//!        ↓  resolve against data root
//! <data_root>/shaders/main.shader ── cached? ── yes → shared value
//!        ↓ no
//! TypeHandler("shader").loader → value → cache{value, "level1", "shader"}
//! ```

mod cache;
mod error;
mod handler;
pub mod io;

pub use cache::{ResourceCache, DEFAULT_LIFESPAN};
pub use error::ResourceError;
pub use handler::{LoadArgs, TypeHandler};
