//! # Tusk Engine
//!
//! A small real-time rendering scaffold built around two pieces of state with
//! real lifecycle semantics: a resource cache and a scene graph.
//!
//! ## Features
//!
//! - **Resource Cache**: path-keyed asset cache with per-type loaders, cleaners and lifespans
//! - **Scene Graph**: entities, components and scenes stored in generational arenas
//! - **Fixed Timestep Driver**: simulation decoupled from render rate
//! - **Backend Traits**: graphics and platform are narrow traits with headless implementations
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tusk_engine::prelude::*;
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let world = engine.scenes.world_mut();
//!         let scene = world.create_scene("main");
//!         let root = world.create_entity();
//!         world.add_entity(scene, root)?;
//!         engine.scenes.set_scene(scene);
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = EngineConfig::default();
//!     let backend = HeadlessBackend::shared();
//!     let mut platform = HeadlessPlatform::new(1.0 / 60.0, 120);
//!     Engine::run(config, backend, &mut platform, &mut MyApp)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod resources;
pub mod scene;
pub mod graphics;
pub mod platform;

mod application;
mod engine;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        AppError, Application, Engine, EngineError,
        config::{Config, ConfigError, EngineConfig, WindowConfig},
        foundation::time::{FixedTimestep, Timer},
        graphics::{
            GraphicsBackend, GraphicsError, HeadlessBackend, Mesh, Shader, ShaderSource,
            SharedBackend, Vertex,
        },
        platform::{HeadlessPlatform, Platform},
        resources::{LoadArgs, ResourceCache, ResourceError, TypeHandler, DEFAULT_LIFESPAN},
        scene::{
            Commands, Component, ComponentContext, ComponentId, EntityId, SceneError, SceneId,
            SceneManager, World,
        },
    };
}
