//! Display model implementations for table and JSON output
//!
//! Display models flatten report types into CLI-friendly rows with
//! appropriate column names and serialization.

mod batch;
pub mod common;
mod diagnosis;
mod metric;
mod opportunity;

pub use batch::BatchDisplay;
pub use diagnosis::DiagnosisDisplay;
pub use metric::MetricDisplay;
pub use opportunity::OpportunityDisplay;
