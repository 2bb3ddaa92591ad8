//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Stable handles for arena-stored objects
//! - Time management and the fixed simulation step
//! - Logging bootstrap

pub mod collections;
pub mod time;
pub mod logging;
