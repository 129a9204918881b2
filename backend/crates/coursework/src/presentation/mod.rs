//! Presentation Layer
//!
//! HTTP handlers, DTOs, multipart readers and the router.

pub mod dto;
pub mod handlers;
pub mod multipart;
pub mod router;
