//! # Scribe Core
//!
//! The domain layer of the Scribe post service.
//! This crate contains the post model, the ports the three stores implement,
//! and the orchestration that keeps them coherent. It has zero infrastructure
//! dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod services;

pub use error::DomainError;
pub use services::{PostCache, PostService};
