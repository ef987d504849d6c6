//! Locker server library
//!
//! Slash-command webhook endpoints over the named-lock engine.

pub mod api;
pub mod error;
pub mod metrics;
pub mod model;
pub mod startup;

pub use error::ServerError;
