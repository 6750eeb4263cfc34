use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One flock's metrics for one calendar day.
///
/// Unique per (flock, date). Counts default to zero so partial submissions
/// deserialize cleanly; sample-based fields (weights, uniformity, CV, egg
/// weight) stay `None` when not measured that day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyProductionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub flock_id: i64,
    #[serde(default)]
    pub company_id: i64,
    pub record_date: NaiveDate,
    #[serde(default)]
    pub mortality_female: i64,
    #[serde(default)]
    pub mortality_male: i64,
    #[serde(default)]
    pub selection_female: i64,
    #[serde(default)]
    pub selection_male: i64,
    #[serde(default)]
    pub feed_female_kg: f64,
    #[serde(default)]
    pub feed_male_kg: f64,
    // Egg counts by quality category
    #[serde(default)]
    pub eggs_incubable: i64,
    #[serde(default)]
    pub eggs_dirty: i64,
    #[serde(default)]
    pub eggs_floor: i64,
    #[serde(default)]
    pub eggs_broken: i64,
    #[serde(default)]
    pub eggs_cracked: i64,
    #[serde(default)]
    pub eggs_double_yolk: i64,
    #[serde(default)]
    pub eggs_small: i64,
    #[serde(default)]
    pub eggs_deformed: i64,
    #[serde(default)]
    pub eggs_thin_shell: i64,
    #[serde(default)]
    pub eggs_soft_shell: i64,
    #[serde(default)]
    pub eggs_discard: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_female: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_male: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uniformity_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egg_weight: Option<f64>,
}

impl DailyProductionRecord {
    pub fn new(company_id: i64, flock_id: i64, record_date: NaiveDate) -> Self {
        Self {
            id: None,
            flock_id,
            company_id,
            record_date,
            mortality_female: 0,
            mortality_male: 0,
            selection_female: 0,
            selection_male: 0,
            feed_female_kg: 0.0,
            feed_male_kg: 0.0,
            eggs_incubable: 0,
            eggs_dirty: 0,
            eggs_floor: 0,
            eggs_broken: 0,
            eggs_cracked: 0,
            eggs_double_yolk: 0,
            eggs_small: 0,
            eggs_deformed: 0,
            eggs_thin_shell: 0,
            eggs_soft_shell: 0,
            eggs_discard: 0,
            weight_female: None,
            weight_male: None,
            uniformity_pct: None,
            cv_pct: None,
            egg_weight: None,
        }
    }

    /// Total eggs laid this day across all quality categories
    pub fn eggs_total(&self) -> i64 {
        self.eggs_incubable
            + self.eggs_dirty
            + self.eggs_floor
            + self.eggs_broken
            + self.eggs_cracked
            + self.eggs_double_yolk
            + self.eggs_small
            + self.eggs_deformed
            + self.eggs_thin_shell
            + self.eggs_soft_shell
            + self.eggs_discard
    }
}
