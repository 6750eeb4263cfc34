use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A production flock (lot) housed at one farm.
///
/// The start date marks day 0 of the flock's life at the farm and anchors all
/// age-week bucketing. Initial bird counts seed the running live-bird counts
/// carried across weekly indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flock {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub company_id: i64,
    pub name: String,
    pub breed: String,
    pub guide_year: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub initial_female_count: i64,
    #[serde(default)]
    pub initial_male_count: i64,
}
