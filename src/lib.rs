//! Household carbon-footprint engine: deterministic emission calculation,
//! baseline comparison, recommendation rules, and incentive-program matching.
//!
//! The [`engine`] module holds the pure computation pipeline; [`config`],
//! [`telemetry`], and [`error`] carry the service plumbing shared by the CLI
//! and the HTTP server in `main.rs`.

pub mod config;
pub mod engine;
pub mod error;
pub mod telemetry;
