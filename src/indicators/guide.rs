//! Genetic guide matching over in-memory row sets.
//!
//! Callers (the service layer) load the candidate rows for one breed+year;
//! everything here is a pure function over that slice. Age matching is
//! tolerant: exact parsed-age equality first, otherwise the row with minimum
//! absolute distance to the target, first candidate winning ties.

use crate::indicators::parser::{parse_age, parse_mating_percent, parse_number, parse_percent};
use crate::models::guide::{GuideReference, GuideRow};

/// Ages at or below this always require supplemental floor heat
pub const THERMAL_FLOOR_MAX_AGE: u32 = 3;

/// Lay-phase convention: rearing ends and production reporting starts here
pub const PRODUCTION_MIN_AGE: u32 = 26;

const THERMAL_KEYWORDS: [&str; 3] = ["thermal", "heat", "temperature"];

/// Case-insensitive trimmed breed match plus exact trimmed year match.
pub fn matches_breed_year(row: &GuideRow, breed: &str, year: &str) -> bool {
    let breed_ok = row
        .breed
        .as_deref()
        .map(str::trim)
        .is_some_and(|b| b.eq_ignore_ascii_case(breed.trim()));
    let year_ok = row.guide_year.as_deref().map(str::trim) == Some(year.trim());
    breed_ok && year_ok
}

/// Candidate rows for one breed+year, sorted ascending by parsed age
/// (unparsable ages last). Sorting keeps nearest-match tie-breaks stable.
pub fn filter_breed_year<'a>(rows: &'a [GuideRow], breed: &str, year: &str) -> Vec<&'a GuideRow> {
    let mut candidates: Vec<&GuideRow> = rows
        .iter()
        .filter(|r| matches_breed_year(r, breed, year))
        .collect();
    candidates.sort_by_key(|r| parse_age(r.age_weeks.as_deref()).unwrap_or(u32::MAX));
    candidates
}

/// Find the guide row for a target age: exact parsed-age match, then nearest
/// by absolute distance. Rows whose age cannot be parsed never match.
pub fn find_guide_row<'a>(candidates: &[&'a GuideRow], target_age: u32) -> Option<&'a GuideRow> {
    if let Some(row) = candidates
        .iter()
        .copied()
        .find(|r| parse_age(r.age_weeks.as_deref()) == Some(target_age))
    {
        return Some(row);
    }
    candidates
        .iter()
        .filter_map(|r| parse_age(r.age_weeks.as_deref()).map(|age| (*r, age.abs_diff(target_age))))
        .min_by_key(|(_, distance)| *distance)
        .map(|(row, _)| row)
}

/// All candidate rows whose parsed age falls in `[age_from, age_to]`,
/// ascending by age.
pub fn find_guide_rows_in_range(
    candidates: &[&GuideRow],
    age_from: u32,
    age_to: u32,
) -> Vec<GuideReference> {
    let mut matched: Vec<GuideReference> = candidates
        .iter()
        .filter_map(|r| to_reference(r))
        .filter(|reference| reference.age_weeks >= age_from && reference.age_weeks <= age_to)
        .collect();
    matched.sort_by_key(|reference| reference.age_weeks);
    matched
}

/// Range variant restricted to the lay phase (age >= 26).
pub fn find_production_rows(
    candidates: &[&GuideRow],
    age_from: u32,
    age_to: u32,
) -> Vec<GuideReference> {
    find_guide_rows_in_range(candidates, age_from.max(PRODUCTION_MIN_AGE), age_to)
}

/// Find and normalize in one step.
pub fn resolve_reference(candidates: &[&GuideRow], target_age: u32) -> Option<GuideReference> {
    find_guide_row(candidates, target_age).and_then(to_reference)
}

/// Map a raw row into the normalized reference DTO. Requires a parsable age;
/// every metric parses independently and soft-fails to `None`.
pub fn to_reference(row: &GuideRow) -> Option<GuideReference> {
    let age_weeks = parse_age(row.age_weeks.as_deref())?;
    Some(GuideReference {
        breed: row.breed.as_deref().unwrap_or("").trim().to_string(),
        guide_year: row.guide_year.as_deref().unwrap_or("").trim().to_string(),
        age_weeks,
        feed_daily_female_g: parse_number(row.feed_daily_female_g.as_deref()),
        feed_daily_male_g: parse_number(row.feed_daily_male_g.as_deref()),
        mortality_female_pct: parse_percent(row.mortality_female_pct.as_deref()),
        mortality_male_pct: parse_percent(row.mortality_male_pct.as_deref()),
        weight_female_g: parse_number(row.weight_female_g.as_deref()),
        weight_male_g: parse_number(row.weight_male_g.as_deref()),
        uniformity_pct: parse_percent(row.uniformity_pct.as_deref()),
        eggs_total_cumulative: parse_number(row.eggs_total_cumulative.as_deref()),
        eggs_incubable_cumulative: parse_number(row.eggs_incubable_cumulative.as_deref()),
        production_pct: parse_percent(row.production_pct.as_deref()),
        egg_weight_g: parse_number(row.egg_weight_g.as_deref()),
        egg_mass_g: parse_number(row.egg_mass_g.as_deref()),
        mating_pct: parse_mating_percent(row.mating_pct.as_deref()),
        females_count: parse_number(row.females_count.as_deref()),
        males_count: parse_number(row.males_count.as_deref()),
        thermal_floor_required: thermal_floor_required(age_weeks, row.notes.as_deref()),
    })
}

fn thermal_floor_required(age_weeks: u32, notes: Option<&str>) -> bool {
    if age_weeks <= THERMAL_FLOOR_MAX_AGE {
        return true;
    }
    notes.is_some_and(|n| {
        let lower = n.to_lowercase();
        THERMAL_KEYWORDS.iter().any(|k| lower.contains(k))
    })
}
