//! # UI Utilities Module (`common::ui`)
//!
//! File: lib/src/common/ui/mod.rs
//!
//! ## Overview
//!
//! Terminal presentation helpers used when the pipeline reports progress to an
//! operator. Currently this is the `colors` submodule (ANSI-colored text and
//! stage banners). Log line coloring lives with the log formatters in
//! `core::logging`.
//!

/// ANSI-colored text and banner headers.
pub mod colors;
