//! Infrastructure Layer
//!
//! PostgreSQL repositories, local disk storage and in-memory doubles.

pub mod file_storage;
pub mod memory;
pub mod postgres;

pub use file_storage::DiskFileStorage;
pub use memory::{InMemoryCourseworkRepository, InMemoryFileStorage};
pub use postgres::PgCourseworkRepository;
