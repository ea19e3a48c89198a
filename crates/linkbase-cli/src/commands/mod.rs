//! CLI command implementations

pub mod completions;
pub mod config;
pub mod edge;
pub mod io;
pub mod node;
pub mod query;
