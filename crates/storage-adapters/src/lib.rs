//! # storage-adapters
//!
//! Implementations of the `domains` storage ports: a Postgres adapter for
//! deployments (feature `db-postgres`) and an in-memory adapter for tests
//! and local development.

pub mod memory;

#[cfg(feature = "db-postgres")]
pub mod postgres;

pub use memory::MemoryStore;

#[cfg(feature = "db-postgres")]
pub use postgres::PgStore;
