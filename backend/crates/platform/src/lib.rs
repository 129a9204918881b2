//! Platform Crate - Technical Infrastructure
//!
//! Domain-free building blocks used by the backend crates:
//! - Cryptographic utilities (SHA-256, HMAC-SHA256 signing, Base64)
//! - Password hashing (Argon2id with optional pepper)
//! - `Authorization: Bearer` header parsing

pub mod bearer;
pub mod crypto;
pub mod password;
