//! Orgdesk - organization admin console
//!
//! Users, departments, posts and roles over a generic resource client,
//! with user association management, inline cell editing and a
//! department tree.

pub mod association;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod editor;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod resource;
pub mod routes;
pub mod state;
pub mod tree;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
