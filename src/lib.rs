//! Vanguard Escrow - escrow status ledger and authorization gate
//!
//! A role-gated escrow lifecycle service: buyers open and fund escrows,
//! sellers deliver and request release, admins oversee the ledger. Every
//! status change is validated against a single transition table and
//! recorded in an append-only audit log.
//!
//! # Architecture Layers
//!
//! - **cli**: Command-line interface
//! - **commands**: CLI command implementations
//! - **config**: Application configuration and constants
//! - **domain**: Core business entities and the lifecycle state machine
//! - **services**: Application use cases and business logic
//! - **infra**: Infrastructure concerns (database, cache, blob store)
//! - **api**: HTTP handlers, middleware, and routes
//! - **types**: Shared types (pagination, responses)
//! - **errors**: Centralized error handling
//!
//! # CLI Usage
//!
//! ```bash
//! # Start the server
//! cargo run -- serve
//!
//! # Run migrations
//! cargo run -- migrate up
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

// Re-export commonly used types at crate root
pub use api::AppState;
pub use config::Config;
pub use domain::{Escrow, EscrowStatus, Identity, Password, User, UserRole};
pub use errors::{AppError, AppResult};
pub use infra::Cache;
