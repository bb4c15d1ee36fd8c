//! # Botboard Database Crate
//!
//! The system's interface to the bot's PostgreSQL trade ledger. Everything
//! the dashboard shows ultimately comes out of this crate.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Adapter:** This crate encapsulates all database-specific
//!   logic. It provides a clean, abstract API to the rest of the application,
//!   hiding the underlying SQL and the shape of the joined rows.
//! - **Flat Rows, Rich Types:** Queries deserialize into flat `*Row` structs
//!   and are converted to `core-types` domain values in one place, so token
//!   parsing and the optional trade/result relationship are handled once.
//! - **Asynchronous & Pooled:** All operations are asynchronous, and it uses
//!   a connection pool (`PgPool`) for concurrent database access.
//!
//! ## Public API
//!
//! - `connect`: builds the shared connection pool from `DATABASE_URL`.
//! - `run_migrations`: applies the embedded schema migrations.
//! - `LedgerRepository`: the ledger reads and the seed-side writes.
//! - `DbError`: everything that can go wrong on the way to a row.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod repository;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use repository::LedgerRepository;
