//! Unit tests for genetic guide matching

use ovotrix::indicators::guide::{filter_breed_year, find_guide_row, find_production_rows};
use ovotrix::indicators::resolve_reference;
use ovotrix::models::GuideRow;

fn guide_row(breed: &str, year: &str, age: &str) -> GuideRow {
    GuideRow {
        breed: Some(breed.to_string()),
        guide_year: Some(year.to_string()),
        age_weeks: Some(age.to_string()),
        ..Default::default()
    }
}

#[test]
fn nearest_match_prefers_smaller_distance() {
    let rows = vec![
        guide_row("Ross", "2024", "20"),
        guide_row("Ross", "2024", "24"),
        guide_row("Ross", "2024", "30"),
    ];
    let candidates = filter_breed_year(&rows, "Ross", "2024");
    // |26-24| = 2 beats |26-30| = 4
    let row = find_guide_row(&candidates, 26).unwrap();
    assert_eq!(row.age_weeks.as_deref(), Some("24"));
}

#[test]
fn exact_match_wins_over_nearest() {
    let rows = vec![
        guide_row("Ross", "2024", "SEM 26"),
        guide_row("Ross", "2024", "25"),
    ];
    let candidates = filter_breed_year(&rows, "Ross", "2024");
    let row = find_guide_row(&candidates, 26).unwrap();
    assert_eq!(row.age_weeks.as_deref(), Some("SEM 26"));
}

#[test]
fn other_breeds_and_years_are_invisible() {
    let rows = vec![
        guide_row("Cobb", "2024", "26"),
        guide_row("Ross", "2023", "26"),
    ];
    let candidates = filter_breed_year(&rows, "Ross", "2024");
    assert!(candidates.is_empty());
}

#[test]
fn reference_carries_parsed_metrics() {
    let mut row = guide_row(" Ross ", "2024", "26");
    row.production_pct = Some("50%".to_string());
    row.egg_weight_g = Some("58,5".to_string());
    row.mating_pct = Some("1:8".to_string());
    row.mortality_female_pct = Some("garbage".to_string());
    let rows = vec![row];
    let candidates = filter_breed_year(&rows, "ross", "2024");

    let reference = resolve_reference(&candidates, 26).unwrap();
    assert_eq!(reference.breed, "Ross");
    assert_eq!(reference.age_weeks, 26);
    assert_eq!(reference.production_pct, Some(50.0));
    assert_eq!(reference.egg_weight_g, Some(58.5));
    // mating ratio notation resolves to a percentage
    assert_eq!(reference.mating_pct, Some(12.5));
    // unparsable metric soft-fails without dropping the row
    assert_eq!(reference.mortality_female_pct, None);
    assert!(!reference.thermal_floor_required);
}

#[test]
fn production_range_starts_at_lay_phase() {
    let rows: Vec<GuideRow> = (20..=30)
        .map(|age| guide_row("Ross", "2024", &age.to_string()))
        .collect();
    let candidates = filter_breed_year(&rows, "Ross", "2024");
    let matched = find_production_rows(&candidates, 20, 28);
    let ages: Vec<u32> = matched.iter().map(|m| m.age_weeks).collect();
    assert_eq!(ages, vec![26, 27, 28]);
}
