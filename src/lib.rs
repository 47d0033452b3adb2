// Clippy allows for reasonable defaults
#![allow(clippy::too_many_arguments)] // Handlers occasionally need many params
#![allow(clippy::new_without_default)] // Default not always appropriate for stateful types

// Module declarations
pub mod config;
pub mod models;
pub mod research;
pub mod server;
pub mod shutdown;
pub mod store;
pub mod webhook;

// Re-export models for use by handlers and integration tests
pub use models::*;
