//! Shared Kernel
//!
//! Vocabulary shared by every backend crate:
//! - Unified error type ([`error::app_error::AppError`]) and its HTTP mapping
//! - Typed entity identifiers ([`id::Id`])
//! - The time source used by domain rules ([`clock::Clock`])
//!
//! Anything placed here must mean the same thing in every domain.

pub mod clock;
pub mod error {
    pub mod app_error;
    pub mod conversions;
    pub mod kind;
}
pub mod id;
