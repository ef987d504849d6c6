//! HTTP endpoints for the slash commands and health check.

pub mod health;
pub mod lock;
pub mod render;
pub mod route;

pub use route::routes;
