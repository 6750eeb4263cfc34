//! Weekly production indicators.
//!
//! Daily records are bucketed into age weeks relative to the flock's start
//! date (day 0 through day 6 is week 1). Each week aggregates sums and
//! sample averages, carries running live-bird counts, and, when the genetic
//! guide has a row for that age week, reports the guide's reference values
//! and the real-vs-guide percentage deviation per metric.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};

use crate::error::DomainError;
use crate::indicators::guide::{filter_breed_year, resolve_reference};
use crate::models::flock::Flock;
use crate::models::guide::{GuideReference, GuideRow};
use crate::models::indicators::{
    DeviationSet, EggBreakdown, GuideWeek, ReportSummary, WeeklyIndicator, WeeklyIndicatorReport,
};
use crate::models::production::DailyProductionRecord;

/// Optional date and week-range filters for one computation.
#[derive(Debug, Clone, Default)]
pub struct WeeklyFilter {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
    pub week_from: Option<u32>,
    pub week_to: Option<u32>,
}

/// Percentage deviation of a real value against its guide reference:
/// ((real - guide) / guide) x 100. `None` when either side is absent or the
/// guide value is zero.
pub fn compute_deviation(real: Option<f64>, guide: Option<f64>) -> Option<f64> {
    let (real, guide) = (real?, guide?);
    if guide == 0.0 {
        return None;
    }
    Some((real - guide) / guide * 100.0)
}

/// Age week for a record date: day 0-6 is week 1, day 7-13 week 2, and so
/// on. Dates before the start date have no week.
pub fn week_number(start_date: NaiveDate, record_date: NaiveDate) -> Option<u32> {
    let days = (record_date - start_date).num_days();
    if days < 0 {
        return None;
    }
    Some((days / 7) as u32 + 1)
}

/// Compute the ordered weekly indicators for one flock.
///
/// `guide_rows` may contain rows for any breed/year; they are filtered to the
/// flock's breed and guide year here. A flock with no daily records yields an
/// empty report rather than an error; a flock without a start date cannot be
/// bucketed at all and fails with `NotConfigured`.
pub fn compute_weekly_indicators(
    flock: &Flock,
    records: &[DailyProductionRecord],
    guide_rows: &[GuideRow],
    filter: &WeeklyFilter,
) -> Result<WeeklyIndicatorReport, DomainError> {
    validate_filter(filter)?;

    let start_date = flock.start_date.ok_or_else(|| {
        DomainError::NotConfigured(format!(
            "flock '{}' has no start date; weekly bucketing is undefined",
            flock.name
        ))
    })?;

    let candidates = filter_breed_year(guide_rows, &flock.breed, &flock.guide_year);

    // Bucket records into age weeks, applying the optional filters
    let mut buckets: BTreeMap<u32, Vec<&DailyProductionRecord>> = BTreeMap::new();
    for record in records {
        if filter.date_from.is_some_and(|from| record.record_date < from)
            || filter.date_to.is_some_and(|to| record.record_date > to)
        {
            continue;
        }
        let Some(week) = week_number(start_date, record.record_date) else {
            continue;
        };
        if filter.week_from.is_some_and(|from| week < from)
            || filter.week_to.is_some_and(|to| week > to)
        {
            continue;
        }
        buckets.entry(week).or_default().push(record);
    }

    let mut weeks = Vec::with_capacity(buckets.len());
    let mut carried_female = flock.initial_female_count;
    let mut carried_male = flock.initial_male_count;

    for (week, week_records) in &buckets {
        let indicator = compute_week(
            *week,
            start_date,
            week_records,
            &candidates,
            carried_female,
            carried_male,
        );
        carried_female = indicator.birds_female_end;
        carried_male = indicator.birds_male_end;
        weeks.push(indicator);
    }

    let summary = ReportSummary {
        total_weeks: weeks.len() as u32,
        min_week: weeks.first().map(|w| w.week),
        max_week: weeks.last().map(|w| w.week),
        has_guide_data: weeks.iter().any(|w| w.guide.is_some()),
    };

    Ok(WeeklyIndicatorReport {
        flock_id: flock.id.unwrap_or(0),
        weeks,
        summary,
    })
}

fn validate_filter(filter: &WeeklyFilter) -> Result<(), DomainError> {
    if filter.week_from == Some(0) || filter.week_to == Some(0) {
        return Err(DomainError::validation("week numbers start at 1"));
    }
    if let (Some(from), Some(to)) = (filter.week_from, filter.week_to) {
        if from > to {
            return Err(DomainError::validation(format!(
                "invalid week range: {} > {}",
                from, to
            )));
        }
    }
    if let (Some(from), Some(to)) = (filter.date_from, filter.date_to) {
        if from > to {
            return Err(DomainError::validation(format!(
                "invalid date range: {} > {}",
                from, to
            )));
        }
    }
    Ok(())
}

fn compute_week(
    week: u32,
    start_date: NaiveDate,
    records: &[&DailyProductionRecord],
    candidates: &[&GuideRow],
    carried_female: i64,
    carried_male: i64,
) -> WeeklyIndicator {
    let record_count = records.len() as u32;

    let mortality_female: i64 = records.iter().map(|r| r.mortality_female).sum();
    let mortality_male: i64 = records.iter().map(|r| r.mortality_male).sum();
    let selection_female: i64 = records.iter().map(|r| r.selection_female).sum();
    let selection_male: i64 = records.iter().map(|r| r.selection_male).sum();
    let feed_female_kg: f64 = records.iter().map(|r| r.feed_female_kg).sum();
    let feed_male_kg: f64 = records.iter().map(|r| r.feed_male_kg).sum();

    let eggs = EggBreakdown {
        incubable: records.iter().map(|r| r.eggs_incubable).sum(),
        dirty: records.iter().map(|r| r.eggs_dirty).sum(),
        floor: records.iter().map(|r| r.eggs_floor).sum(),
        broken: records.iter().map(|r| r.eggs_broken).sum(),
        cracked: records.iter().map(|r| r.eggs_cracked).sum(),
        double_yolk: records.iter().map(|r| r.eggs_double_yolk).sum(),
        small: records.iter().map(|r| r.eggs_small).sum(),
        deformed: records.iter().map(|r| r.eggs_deformed).sum(),
        thin_shell: records.iter().map(|r| r.eggs_thin_shell).sum(),
        soft_shell: records.iter().map(|r| r.eggs_soft_shell).sum(),
        discard: records.iter().map(|r| r.eggs_discard).sum(),
        total: records.iter().map(|r| r.eggs_total()).sum(),
    };

    // Stored running counts are end-of-week, so the week-start population is
    // back-computed from the carried count plus this week's losses
    let birds_female_start = carried_female + mortality_female + selection_female;
    let birds_male_start = carried_male + mortality_male + selection_male;
    let birds_female_end = (birds_female_start - mortality_female - selection_female).max(0);
    let birds_male_end = (birds_male_start - mortality_male - selection_male).max(0);

    let mortality_female_pct =
        ratio(mortality_female as f64, birds_female_start as f64).map(|v| v * 100.0);
    let mortality_male_pct =
        ratio(mortality_male as f64, birds_male_start as f64).map(|v| v * 100.0);

    let feed_per_female_day_g = ratio(
        feed_female_kg * 1000.0,
        record_count as f64 * birds_female_start as f64,
    );
    let feed_per_male_day_g = ratio(
        feed_male_kg * 1000.0,
        record_count as f64 * birds_male_start as f64,
    );

    // Lay efficiency: average daily eggs over the live hen population
    let avg_daily_eggs = ratio(eggs.total as f64, record_count as f64);
    let production_pct = avg_daily_eggs
        .and_then(|avg| ratio(avg, birds_female_start as f64))
        .map(|v| v * 100.0);

    let avg_weight_female_g = sample_average(records, |r| r.weight_female);
    let avg_weight_male_g = sample_average(records, |r| r.weight_male);
    let avg_uniformity_pct = sample_average(records, |r| r.uniformity_pct);
    let avg_cv_pct = sample_average(records, |r| r.cv_pct);
    let avg_egg_weight_g = sample_average(records, |r| r.egg_weight);

    let guide = resolve_reference(candidates, week)
        .map(|reference| guide_week(&reference, birds_female_start));

    let deviation = match &guide {
        Some(g) => DeviationSet {
            mortality_female_pct: compute_deviation(mortality_female_pct, g.mortality_female_pct),
            mortality_male_pct: compute_deviation(mortality_male_pct, g.mortality_male_pct),
            feed_per_female_day_g: compute_deviation(feed_per_female_day_g, g.feed_daily_female_g),
            feed_per_male_day_g: compute_deviation(feed_per_male_day_g, g.feed_daily_male_g),
            weight_female_g: compute_deviation(avg_weight_female_g, g.weight_female_g),
            weight_male_g: compute_deviation(avg_weight_male_g, g.weight_male_g),
            uniformity_pct: compute_deviation(avg_uniformity_pct, g.uniformity_pct),
            production_pct: compute_deviation(production_pct, g.production_pct),
            egg_weight_g: compute_deviation(avg_egg_weight_g, g.egg_weight_g),
            eggs_total: compute_deviation(Some(eggs.total as f64), g.eggs_total),
        },
        None => DeviationSet::default(),
    };

    let week_start = start_date
        .checked_add_days(Days::new((week as u64 - 1) * 7))
        .unwrap_or(start_date);
    let week_end = week_start.checked_add_days(Days::new(6)).unwrap_or(week_start);

    WeeklyIndicator {
        week,
        week_start,
        week_end,
        record_count,
        mortality_female,
        mortality_male,
        selection_female,
        selection_male,
        feed_female_kg,
        feed_male_kg,
        eggs,
        mortality_female_pct,
        mortality_male_pct,
        feed_per_female_day_g,
        feed_per_male_day_g,
        production_pct,
        avg_weight_female_g,
        avg_weight_male_g,
        avg_uniformity_pct,
        avg_cv_pct,
        avg_egg_weight_g,
        birds_female_start,
        birds_male_start,
        birds_female_end,
        birds_male_end,
        guide,
        deviation,
    }
}

/// Expected weekly egg count from the guide's production percentage and the
/// week's live hen population.
fn guide_eggs_total(production_pct: Option<f64>, birds_female_start: i64) -> Option<f64> {
    production_pct.map(|pct| pct / 100.0 * birds_female_start as f64 * 7.0)
}

fn guide_week(reference: &GuideReference, birds_female_start: i64) -> GuideWeek {
    GuideWeek {
        age_weeks: reference.age_weeks,
        mortality_female_pct: reference.mortality_female_pct,
        mortality_male_pct: reference.mortality_male_pct,
        feed_daily_female_g: reference.feed_daily_female_g,
        feed_daily_male_g: reference.feed_daily_male_g,
        weight_female_g: reference.weight_female_g,
        weight_male_g: reference.weight_male_g,
        uniformity_pct: reference.uniformity_pct,
        production_pct: reference.production_pct,
        egg_weight_g: reference.egg_weight_g,
        eggs_total: guide_eggs_total(reference.production_pct, birds_female_start),
        thermal_floor_required: reference.thermal_floor_required,
    }
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        None
    } else {
        Some(numerator / denominator)
    }
}

/// Average over records whose sample is present and non-zero; weeks where a
/// metric was never measured stay `None`.
fn sample_average<F>(records: &[&DailyProductionRecord], extract: F) -> Option<f64>
where
    F: Fn(&DailyProductionRecord) -> Option<f64>,
{
    let samples: Vec<f64> = records
        .iter()
        .filter_map(|r| extract(r))
        .filter(|v| *v != 0.0)
        .collect();
    if samples.is_empty() {
        None
    } else {
        Some(samples.iter().sum::<f64>() / samples.len() as f64)
    }
}
