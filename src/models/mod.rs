//! Display models for CLI output
//!
//! This module provides shared display model abstractions for converting
//! report types into CLI-friendly display formats.

pub mod display;

pub use display::{BatchDisplay, DiagnosisDisplay, MetricDisplay, OpportunityDisplay};
