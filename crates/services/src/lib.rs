//! # services
//!
//! Application services sitting between the HTTP layer and the storage
//! ports: input sanitization, comment submission, thread reconstruction,
//! and the content read queries the page templates consume.

pub mod content;
pub mod sanitize;
pub mod submission;
pub mod thread;
