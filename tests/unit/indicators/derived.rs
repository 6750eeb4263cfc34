//! Unit tests for derived guide-row fields

use ovotrix::indicators::{compute_derived, compute_derived_chain, parse_number};
use ovotrix::models::GuideRow;

fn guide_row(age: &str) -> GuideRow {
    GuideRow {
        breed: Some("Ross".to_string()),
        guide_year: Some("2024".to_string()),
        age_weeks: Some(age.to_string()),
        ..Default::default()
    }
}

#[test]
fn per_unit_metrics_gate_at_age_24() {
    let mut row = guide_row("24");
    row.feed_cumulative_female_g = Some("70000".to_string());
    row.feed_cumulative_male_g = Some("9000".to_string());
    row.females_count = Some("9000".to_string());
    row.males_count = Some("1260".to_string());
    row.eggs_total_cumulative = Some("500".to_string());
    row.eggs_incubable_cumulative = Some("400".to_string());
    row.chicks_cumulative = Some("300".to_string());
    compute_derived(&mut row, None);

    assert_eq!(row.grams_per_total_egg.as_deref(), Some("0"));
    assert_eq!(row.grams_per_incubable_egg.as_deref(), Some("0"));
    assert_eq!(row.grams_per_chick.as_deref(), Some("0"));
}

#[test]
fn per_unit_metrics_active_at_age_25() {
    let mut row = guide_row("25");
    row.feed_cumulative_female_g = Some("70000".to_string());
    row.feed_cumulative_male_g = Some("9000".to_string());
    row.females_count = Some("9000".to_string());
    row.males_count = Some("1260".to_string());
    row.eggs_total_cumulative = Some("500".to_string());
    row.eggs_incubable_cumulative = Some("400".to_string());
    row.chicks_cumulative = Some("300".to_string());
    compute_derived(&mut row, None);

    let per_total = parse_number(row.grams_per_total_egg.as_deref()).unwrap();
    let per_incubable = parse_number(row.grams_per_incubable_egg.as_deref()).unwrap();
    let per_chick = parse_number(row.grams_per_chick.as_deref()).unwrap();
    assert!(per_total > 0.0);
    assert!(per_incubable > per_total);
    assert!(per_chick > per_incubable);
}

#[test]
fn mating_ratio_notation_feeds_per_unit_metrics() {
    let mut row = guide_row("25");
    row.feed_cumulative_female_g = Some("70000".to_string());
    row.feed_cumulative_male_g = Some("10000".to_string());
    row.mating_pct = Some("1:8".to_string());
    row.eggs_total_cumulative = Some("1000".to_string());
    compute_derived(&mut row, None);

    // 1:8 is 12.5%, so combined = 70000 + 10000 * 0.125 = 71250 over 1000 eggs
    assert_eq!(row.grams_per_total_egg.as_deref(), Some("71,25"));
}

#[test]
fn mating_fraction_notation_feeds_per_unit_metrics() {
    let mut row = guide_row("25");
    row.feed_cumulative_female_g = Some("70000".to_string());
    row.feed_cumulative_male_g = Some("10000".to_string());
    row.mating_pct = Some("0,14".to_string());
    row.eggs_total_cumulative = Some("1000".to_string());
    compute_derived(&mut row, None);

    // 0,14 is a fraction: 14%, combined = 70000 + 10000 * 0.14 = 71400
    assert_eq!(row.grams_per_total_egg.as_deref(), Some("71,40"));
}

#[test]
fn feed_efficiency_is_incubable_share() {
    let mut row = guide_row("30");
    row.eggs_total_cumulative = Some("1000".to_string());
    row.eggs_incubable_cumulative = Some("850".to_string());
    compute_derived(&mut row, None);
    assert_eq!(row.feed_efficiency_pct.as_deref(), Some("85,00"));
}

#[test]
fn feed_efficiency_guards_zero_total() {
    let mut row = guide_row("30");
    row.eggs_total_cumulative = Some("0".to_string());
    row.eggs_incubable_cumulative = Some("850".to_string());
    compute_derived(&mut row, None);
    assert_eq!(row.feed_efficiency_pct, None);
}

#[test]
fn chain_carries_counts_across_three_weeks() {
    let mut rows: Vec<GuideRow> = ["3", "1", "2"]
        .iter()
        .map(|age| {
            let mut r = guide_row(age);
            r.mortality_female_pct = Some("10".to_string());
            r.mortality_male_pct = Some("10".to_string());
            r
        })
        .collect();
    compute_derived_chain(&mut rows);

    let counts: Vec<f64> = rows
        .iter()
        .map(|r| parse_number(r.females_count.as_deref()).unwrap())
        .collect();
    // 10000 -> 9000 -> 8100 -> 7290
    assert_eq!(counts, vec![9000.0, 8100.0, 7290.0]);
}

#[test]
fn editing_an_early_row_refreshes_later_ones() {
    let mut week1 = guide_row("1");
    week1.mortality_female_pct = Some("10".to_string());
    week1.mortality_male_pct = Some("10".to_string());
    let mut week2 = guide_row("2");
    week2.mortality_female_pct = Some("0".to_string());
    week2.mortality_male_pct = Some("0".to_string());
    let mut rows = vec![week1, week2];
    compute_derived_chain(&mut rows);
    assert_eq!(
        parse_number(rows[1].females_count.as_deref()),
        Some(9000.0)
    );

    // halve week 1 mortality and recompute the group
    rows[0].mortality_female_pct = Some("5".to_string());
    compute_derived_chain(&mut rows);
    assert_eq!(
        parse_number(rows[1].females_count.as_deref()),
        Some(9500.0)
    );
}

#[test]
fn missing_inputs_leave_prior_values_untouched() {
    let mut row = guide_row("10");
    row.egg_mass_g = Some("previously computed".to_string());
    compute_derived(&mut row, None);
    // no egg weight or production input, so the field is not overwritten
    assert_eq!(row.egg_mass_g.as_deref(), Some("previously computed"));
}
