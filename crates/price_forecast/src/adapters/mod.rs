// Rust guideline compliant 2026-10-18

//! Adapters (secondary ports) for the price-forecast binary.
//!
//! Each sub-module implements one hexagonal port trait defined in the
//! `domain` crate.

pub mod count_auditor;
pub mod demo_catalog;
pub mod linear_trend_engine;
