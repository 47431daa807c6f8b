//! Storage module.
//!
//! The append-only sample store capability, its SQL text and two
//! implementations: SQLite-backed for daemons, in-memory for tests and
//! store-less hosts.

pub mod memory;
pub mod models;
pub mod queries;
pub mod sqlite;
pub mod store;

pub use memory::*;
pub use models::*;
pub use queries::*;
pub use sqlite::*;
pub use store::*;
