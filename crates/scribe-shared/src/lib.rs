//! # Scribe Shared
//!
//! Wire types of the HTTP API.
//! Kept free of domain and infrastructure dependencies so clients can reuse it.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MessageResponse};
