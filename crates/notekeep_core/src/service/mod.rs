//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs, one
//!   `RequestScope` transaction per call.
//! - Keep transport layers decoupled from storage details.
//!
//! # Invariants
//! - Note, tag and favorite operations require an `AuthenticatedUser`.
//! - Slow external collaborators (password hashing, summarizer) run outside
//!   of store transactions.

pub mod account_service;
pub mod favorite_service;
pub mod note_service;
pub mod tag_service;
