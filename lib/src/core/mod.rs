//! # Core Infrastructure (`core`)
//!
//! File: lib/src/core/mod.rs
//!
//! ## Overview
//!
//! Foundations shared by every helper in `common`: the error type, the
//! configuration file, and the logging setup a host pipeline installs at startup.
//!
//! ## Architecture
//!
//! - `config`: loading and validating the TOML configuration
//! - `error`: `UtilsError` and the crate-wide `Result` alias
//! - `logging`: log formatters, the rotating log file, and `init_logging`
//!
pub mod config;
pub mod error;
pub mod logging;
