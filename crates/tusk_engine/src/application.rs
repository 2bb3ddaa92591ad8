//! Application trait and lifecycle management

use thiserror::Error;

use crate::engine::{Engine, EngineError};
use crate::graphics::GraphicsError;
use crate::resources::ResourceError;
use crate::scene::SceneError;

/// Application lifecycle trait
///
/// Implement this trait to create your game or application using the engine.
pub trait Application {
    /// Initialize the application
    ///
    /// Called once after the engine is initialized. Use this to build the
    /// initial scenes, load resources and pick the active scene.
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Update the application
    ///
    /// Called once per fixed simulation step, before the active scene is
    /// updated.
    ///
    /// # Arguments
    /// * `engine` - Mutable reference to the engine
    /// * `delta_time` - Length of the fixed step in seconds
    fn update(&mut self, _engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
        Ok(())
    }

    /// Render the application
    ///
    /// Called once per frame after all due simulation steps.
    fn render(&mut self, _engine: &mut Engine) -> Result<(), AppError> {
        Ok(())
    }

    /// Cleanup the application
    ///
    /// Called when the application is shutting down, before the resource
    /// cache is cleaned up. Also called when the main loop failed.
    fn cleanup(&mut self, _engine: &mut Engine) {}
}

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Engine error propagated to application level
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Resource loading error
    #[error("Resource error: {0}")]
    Resource(#[from] ResourceError),

    /// Scene graph error
    #[error("Scene error: {0}")]
    Scene(#[from] SceneError),

    /// Graphics error
    #[error("Graphics error: {0}")]
    Graphics(#[from] GraphicsError),

    /// Custom application error
    #[error("Application error: {0}")]
    Custom(String),
}
