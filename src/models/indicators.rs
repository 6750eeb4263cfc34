use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Weekly egg sums by quality category, plus the grand total.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EggBreakdown {
    pub incubable: i64,
    pub dirty: i64,
    pub floor: i64,
    pub broken: i64,
    pub cracked: i64,
    pub double_yolk: i64,
    pub small: i64,
    pub deformed: i64,
    pub thin_shell: i64,
    pub soft_shell: i64,
    pub discard: i64,
    pub total: i64,
}

/// Reference values extracted from the genetic guide row matched to one
/// age week. `eggs_total` is the guide's expected egg count for the week,
/// derived from its production percentage and the live female count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideWeek {
    pub age_weeks: u32,
    pub mortality_female_pct: Option<f64>,
    pub mortality_male_pct: Option<f64>,
    pub feed_daily_female_g: Option<f64>,
    pub feed_daily_male_g: Option<f64>,
    pub weight_female_g: Option<f64>,
    pub weight_male_g: Option<f64>,
    pub uniformity_pct: Option<f64>,
    pub production_pct: Option<f64>,
    pub egg_weight_g: Option<f64>,
    pub eggs_total: Option<f64>,
    pub thermal_floor_required: bool,
}

/// Real-vs-guide percentage deviations, one per compared metric.
///
/// Every field is `None` when either side of the comparison is absent or the
/// guide value is zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviationSet {
    pub mortality_female_pct: Option<f64>,
    pub mortality_male_pct: Option<f64>,
    pub feed_per_female_day_g: Option<f64>,
    pub feed_per_male_day_g: Option<f64>,
    pub weight_female_g: Option<f64>,
    pub weight_male_g: Option<f64>,
    pub uniformity_pct: Option<f64>,
    pub production_pct: Option<f64>,
    pub egg_weight_g: Option<f64>,
    pub eggs_total: Option<f64>,
}

/// Derived aggregate over one age week of daily production records.
/// Computed fresh on every query, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyIndicator {
    pub week: u32,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub record_count: u32,
    // Sums
    pub mortality_female: i64,
    pub mortality_male: i64,
    pub selection_female: i64,
    pub selection_male: i64,
    pub feed_female_kg: f64,
    pub feed_male_kg: f64,
    pub eggs: EggBreakdown,
    // Rates
    pub mortality_female_pct: Option<f64>,
    pub mortality_male_pct: Option<f64>,
    pub feed_per_female_day_g: Option<f64>,
    pub feed_per_male_day_g: Option<f64>,
    pub production_pct: Option<f64>,
    // Averages over non-null, non-zero samples
    pub avg_weight_female_g: Option<f64>,
    pub avg_weight_male_g: Option<f64>,
    pub avg_uniformity_pct: Option<f64>,
    pub avg_cv_pct: Option<f64>,
    pub avg_egg_weight_g: Option<f64>,
    // Running live-bird counts
    pub birds_female_start: i64,
    pub birds_male_start: i64,
    pub birds_female_end: i64,
    pub birds_male_end: i64,
    // Guide comparison
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide: Option<GuideWeek>,
    pub deviation: DeviationSet,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub total_weeks: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_week: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_week: Option<u32>,
    pub has_guide_data: bool,
}

/// Ordered weekly indicators for one flock plus summary metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyIndicatorReport {
    pub flock_id: i64,
    pub weeks: Vec<WeeklyIndicator>,
    pub summary: ReportSummary,
}
