//! # Tasklane Core
//!
//! Domain and persistence layer for the Tasklane service: task tracking
//! with an append-only assignment audit trail, kept consistent through
//! atomic unit-of-work commits.
//!
//! ## Architecture
//!
//! - **models**: persisted row types (`TaskItem`, `User`, `Assignment`)
//! - **store**: capability traits, the unit-of-work coordinator, and the
//!   Postgres and in-memory backends
//! - **service**: business rules for the task lifecycle, assignment log
//!   reads, identity and sessions, and the pure query engine
//! - **auth**: JWT minting/validation and Argon2id password hashing
//! - **error**: the service error taxonomy adapters map to responses
//!
//! ## Consistency model
//!
//! Services never write to storage directly. Each operation stages its
//! writes into a [`store::UnitOfWork`] and hands it to
//! [`store::Committer::commit`], which applies everything atomically or
//! nothing at all. A task created with an assignee and its first
//! assignment row are one unit; a reassignment and its log entry are one
//! unit. Updates carry a version token so concurrent writers lose cleanly
//! instead of silently clobbering each other.

pub mod auth;
pub mod error;
pub mod models;
pub mod service;
pub mod store;

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
