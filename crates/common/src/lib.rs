//! Shared types used across the order workspace.

pub mod error;
pub mod types;

pub use error::ErrorKind;
pub use types::{OrderId, Version};
