//! pagewhy - explain why a page loads slowly
//!
//! Queries PageSpeed Insights for lab and field data, extracts the metrics
//! that matter and ranks heuristic diagnoses of what is making the page
//! slow. Library consumers drive [`orchestrator::Orchestrator`]; the
//! `pagewhy` binary wraps it in a CLI.

pub mod cache;
pub mod cli;
pub mod client;
pub mod config;
pub mod diagnose;
pub mod error;
pub mod extract;
pub mod models;
pub mod orchestrator;
pub mod output;
pub mod rate_limit;
