//! Data structures shared by the engine and the CLI.

pub mod account;
pub mod config;
pub mod policy;
