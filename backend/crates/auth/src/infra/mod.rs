//! Infrastructure Layer
//!
//! PostgreSQL repositories and an in-memory variant for tests and local runs.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAuthRepository;
pub use postgres::PgAuthRepository;
