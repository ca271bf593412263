//! # domains
//!
//! The central domain models, port traits, and error types for the maqblog
//! comment and content backend.

pub mod error;
pub mod models;
pub mod moderation;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use moderation::*;
pub use traits::*;
