//! Derived guide-row fields.
//!
//! A guide row's derived columns depend on its own raw columns and on the
//! previous age row of the same breed+year group (live bird counts chain
//! across ages). `compute_derived` applies the rules to one row;
//! `compute_derived_chain` sorts a whole group by age and folds across it so
//! editing an early-age row also refreshes every later row.
//!
//! Failure semantics: a missing or unparsable prerequisite skips that one
//! derived field and leaves its prior value untouched. Nothing here errors.

use crate::indicators::parser::{
    format_number, parse_age, parse_mating_percent, parse_number, parse_percent,
};
use crate::models::guide::GuideRow;

/// Industry-standard starting cohort at age week 1
pub const FEMALE_START_COUNT: f64 = 10_000.0;
pub const MALE_START_COUNT: f64 = 1_400.0;

/// Per-unit feed metrics are meaningless before lay onset and stay zeroed
/// through this age week.
pub const LAY_ONSET_AGE_WEEKS: u32 = 24;

/// Apply every derived-field rule to one row, in fixed order.
pub fn compute_derived(row: &mut GuideRow, previous: Option<&GuideRow>) {
    compute_code(row);
    compute_live_counts(row, previous);
    compute_mating_pct(row);
    compute_weekly_nutrition(row);
    compute_egg_mass(row);
    compute_feed_efficiency(row);
    compute_per_unit_feed(row);
}

/// Recompute a whole breed+year group as a fold ordered by age.
///
/// Rows whose age cannot be parsed sort last and chain off whatever precedes
/// them; their own derived fields still compute where prerequisites allow.
pub fn compute_derived_chain(rows: &mut [GuideRow]) {
    rows.sort_by_key(|r| parse_age(r.age_weeks.as_deref()).unwrap_or(u32::MAX));
    for i in 0..rows.len() {
        let (head, tail) = rows.split_at_mut(i);
        let previous = head.last().map(|r| &*r);
        compute_derived(&mut tail[0], previous);
    }
}

fn compute_code(row: &mut GuideRow) {
    if let (Some(breed), Some(year), Some(age)) = (&row.breed, &row.guide_year, &row.age_weeks) {
        row.code = Some(format!("{}{}{}", breed.trim(), year.trim(), age.trim()));
    }
}

fn compute_live_counts(row: &mut GuideRow, previous: Option<&GuideRow>) {
    let Some(age) = parse_age(row.age_weeks.as_deref()) else {
        return;
    };
    let (base_female, base_male) = if age <= 1 {
        (Some(FEMALE_START_COUNT), Some(MALE_START_COUNT))
    } else {
        match previous {
            Some(prev) => (
                parse_number(prev.females_count.as_deref()),
                parse_number(prev.males_count.as_deref()),
            ),
            None => (None, None),
        }
    };

    if let (Some(base), Some(mortality)) = (
        base_female,
        parse_percent(row.mortality_female_pct.as_deref()),
    ) {
        row.females_count = Some(format_number(base * (1.0 - mortality / 100.0)));
    }
    if let (Some(base), Some(mortality)) =
        (base_male, parse_percent(row.mortality_male_pct.as_deref()))
    {
        row.males_count = Some(format_number(base * (1.0 - mortality / 100.0)));
    }
}

fn compute_mating_pct(row: &mut GuideRow) {
    if let (Some(females), Some(males)) = (
        parse_number(row.females_count.as_deref()),
        parse_number(row.males_count.as_deref()),
    ) {
        if females != 0.0 {
            row.mating_pct = Some(format_number(males / females * 100.0));
        }
    }
}

fn compute_weekly_nutrition(row: &mut GuideRow) {
    if let (Some(kcal), Some(grams)) = (
        parse_number(row.kcal_female.as_deref()),
        parse_number(row.feed_daily_female_g.as_deref()),
    ) {
        row.kcal_week_female = Some(format_number(kcal * grams * 7.0 / 1000.0));
    }
    if let (Some(kcal), Some(grams)) = (
        parse_number(row.kcal_male.as_deref()),
        parse_number(row.feed_daily_male_g.as_deref()),
    ) {
        row.kcal_week_male = Some(format_number(kcal * grams * 7.0 / 1000.0));
    }
    if let (Some(protein), Some(grams)) = (
        parse_percent(row.protein_female_pct.as_deref()),
        parse_number(row.feed_daily_female_g.as_deref()),
    ) {
        row.protein_week_female = Some(format_number(protein / 100.0 * grams * 7.0));
    }
    if let (Some(protein), Some(grams)) = (
        parse_percent(row.protein_male_pct.as_deref()),
        parse_number(row.feed_daily_male_g.as_deref()),
    ) {
        row.protein_week_male = Some(format_number(protein / 100.0 * grams * 7.0));
    }
}

fn compute_egg_mass(row: &mut GuideRow) {
    if let (Some(weight), Some(production)) = (
        parse_number(row.egg_weight_g.as_deref()),
        parse_percent(row.production_pct.as_deref()),
    ) {
        row.egg_mass_g = Some(format_number(weight * production / 100.0));
    }
}

fn compute_feed_efficiency(row: &mut GuideRow) {
    if let (Some(incubable), Some(total)) = (
        parse_number(row.eggs_incubable_cumulative.as_deref()),
        parse_number(row.eggs_total_cumulative.as_deref()),
    ) {
        if total != 0.0 {
            row.feed_efficiency_pct = Some(format_number(incubable / total * 100.0));
        }
    }
}

fn compute_per_unit_feed(row: &mut GuideRow) {
    let Some(age) = parse_age(row.age_weeks.as_deref()) else {
        return;
    };
    if age <= LAY_ONSET_AGE_WEEKS {
        row.grams_per_total_egg = Some("0".to_string());
        row.grams_per_incubable_egg = Some("0".to_string());
        row.grams_per_chick = Some("0".to_string());
        return;
    }
    let (Some(consumed_female), Some(consumed_male), Some(mating)) = (
        parse_number(row.feed_cumulative_female_g.as_deref()),
        parse_number(row.feed_cumulative_male_g.as_deref()),
        parse_mating_percent(row.mating_pct.as_deref()),
    ) else {
        return;
    };
    // Male consumption weighted by the mating ratio gives grams per hen-house
    let combined = consumed_female + consumed_male * (mating / 100.0);
    row.grams_per_total_egg = Some(per_unit(
        combined,
        parse_number(row.eggs_total_cumulative.as_deref()),
    ));
    row.grams_per_incubable_egg = Some(per_unit(
        combined,
        parse_number(row.eggs_incubable_cumulative.as_deref()),
    ));
    row.grams_per_chick = Some(per_unit(
        combined,
        parse_number(row.chicks_cumulative.as_deref()),
    ));
}

fn per_unit(combined: f64, denominator: Option<f64>) -> String {
    match denominator {
        Some(d) if d != 0.0 => format_number(combined / d),
        _ => "0".to_string(),
    }
}
