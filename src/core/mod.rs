//! Core business logic: store, registry, and authentication engine.

pub mod config;
pub mod engine;
pub mod error;
pub mod file_lock;
pub mod paths;
pub mod registry;
pub mod store;
