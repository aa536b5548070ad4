/// Core Module for Litedal
///
/// This module contains the fundamental components shared by the rest of
/// the crate: the error type and the crate-wide `Result` alias.

pub mod error;

// Re-export commonly used types for convenience
pub use error::{LitedalError, Result};
