use serde::{Deserialize, Serialize};

/// One genetic-guide reference row for a breed/year/age-in-weeks.
///
/// Metric columns are stored as free-form text because the upstream reference
/// sheets are inconsistently formatted (comma vs point decimals, stray `%`
/// signs, ages like "SEM 25"). Parsing happens at the computation boundary
/// via `indicators::parser`; the raw text is the source of truth at rest.
///
/// Fields after `notes` are derived and recomputed on every create/update by
/// `indicators::derived::compute_derived_chain` over the row's breed+year
/// group.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuideRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default)]
    pub company_id: i64,
    pub breed: Option<String>,
    pub guide_year: Option<String>,
    pub age_weeks: Option<String>,
    // Raw reference metrics
    pub feed_daily_female_g: Option<String>,
    pub feed_daily_male_g: Option<String>,
    pub feed_cumulative_female_g: Option<String>,
    pub feed_cumulative_male_g: Option<String>,
    pub withdrawal_cumulative: Option<String>,
    pub mortality_female_pct: Option<String>,
    pub mortality_male_pct: Option<String>,
    pub weight_female_g: Option<String>,
    pub weight_male_g: Option<String>,
    pub uniformity_pct: Option<String>,
    pub eggs_total_cumulative: Option<String>,
    pub eggs_incubable_cumulative: Option<String>,
    pub production_pct: Option<String>,
    pub egg_weight_g: Option<String>,
    pub kcal_female: Option<String>,
    pub kcal_male: Option<String>,
    pub protein_female_pct: Option<String>,
    pub protein_male_pct: Option<String>,
    pub hatch_pct: Option<String>,
    pub chicks_cumulative: Option<String>,
    pub notes: Option<String>,
    // Derived fields
    pub code: Option<String>,
    pub females_count: Option<String>,
    pub males_count: Option<String>,
    pub mating_pct: Option<String>,
    pub kcal_week_female: Option<String>,
    pub kcal_week_male: Option<String>,
    pub protein_week_female: Option<String>,
    pub protein_week_male: Option<String>,
    pub egg_mass_g: Option<String>,
    pub feed_efficiency_pct: Option<String>,
    pub grams_per_total_egg: Option<String>,
    pub grams_per_incubable_egg: Option<String>,
    pub grams_per_chick: Option<String>,
}

impl GuideRow {
    pub fn new(company_id: i64) -> Self {
        Self {
            company_id,
            ..Default::default()
        }
    }
}

/// A guide row resolved for one age week, with every metric parsed.
///
/// This is the normalized shape the lookup hands to callers; nothing here is
/// free-form text anymore. Fields that failed tolerant parsing are `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuideReference {
    pub breed: String,
    pub guide_year: String,
    pub age_weeks: u32,
    pub feed_daily_female_g: Option<f64>,
    pub feed_daily_male_g: Option<f64>,
    pub mortality_female_pct: Option<f64>,
    pub mortality_male_pct: Option<f64>,
    pub weight_female_g: Option<f64>,
    pub weight_male_g: Option<f64>,
    pub uniformity_pct: Option<f64>,
    pub eggs_total_cumulative: Option<f64>,
    pub eggs_incubable_cumulative: Option<f64>,
    pub production_pct: Option<f64>,
    pub egg_weight_g: Option<f64>,
    pub egg_mass_g: Option<f64>,
    pub mating_pct: Option<f64>,
    pub females_count: Option<f64>,
    pub males_count: Option<f64>,
    /// Chicks under this age (or flagged housing) need supplemental floor heat
    pub thermal_floor_required: bool,
}
