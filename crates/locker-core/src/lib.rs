//! Locker Core - named-lock protocol
//!
//! This crate provides:
//! - Lock key codec: lock name to store key, owner/timestamp value encoding
//! - Age formatter: human-readable lock lifetimes
//! - Lock engine: acquire, release, inspect and enumerate against a `LockStore`

pub mod age;
pub mod codec;
pub mod engine;
pub mod error;
pub mod model;

pub use age::{age_message, age_message_at, format_elapsed_minutes};
pub use codec::{LockValue, decode_value, encode_value, to_key};
pub use engine::{EngineConfig, LockEngine};
pub use error::{LockError, LockResult};
pub use model::*;
