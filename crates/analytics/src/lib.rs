//! # Botboard Analytics Engine
//!
//! This crate turns the bot's raw trade ledger into the numbers the dashboard
//! shows. It acts as the "unbiased judge" of the bot's performance.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems. It depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `AnalyticsEngine` is a stateless
//!   calculator. It takes slices of ledger records as input and produces
//!   summaries, bucket tables and series as output. It never fetches, caches
//!   or filters by date itself; callers own those concerns (see [`range`]).
//!
//! ## Public API
//!
//! - `AnalyticsEngine`: the calculation entry points.
//! - `PerformanceSummary`: the standardized closed-trade summary.
//! - `BucketPerformance`: one row of a dimension table (time-of-day,
//!   volatility, Kelly fraction).
//! - `IntegrityIssue`: a non-fatal ledger gap found by the audit.

// Declare the modules that constitute this crate.
pub mod buckets;
pub mod engine;
pub mod integrity;
pub mod range;
pub mod summary;

// Re-export the key components to create a clean, public-facing API.
pub use buckets::BucketPerformance;
pub use engine::{AnalyticsEngine, CumulativePnlPoint};
pub use integrity::IntegrityIssue;
pub use summary::PerformanceSummary;
