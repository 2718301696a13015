//! Opportunity display model

use serde::Serialize;
use tabled::Tabled;

use super::common::{format_ms, truncate_string};
use crate::client::Strategy;
use crate::extract::Opportunity;

/// Width of the title column before truncation
const TITLE_WIDTH: usize = 60;

/// One opportunity row for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct OpportunityDisplay {
    #[tabled(rename = "STRATEGY")]
    pub strategy: String,

    #[tabled(rename = "AUDIT")]
    pub id: String,

    #[tabled(rename = "OPPORTUNITY")]
    pub title: String,

    #[tabled(rename = "EST. SAVINGS")]
    pub savings: String,
}

impl OpportunityDisplay {
    pub fn new(strategy: Strategy, opportunity: &Opportunity) -> Self {
        Self {
            strategy: strategy.to_string(),
            id: opportunity.id.clone(),
            title: truncate_string(&opportunity.title, TITLE_WIDTH),
            savings: format_ms(opportunity.savings_ms),
        }
    }
}
