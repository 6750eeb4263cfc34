//! Unit tests for weekly indicator aggregation

use chrono::NaiveDate;
use ovotrix::indicators::weekly::{compute_weekly_indicators, WeeklyFilter};
use ovotrix::indicators::{compute_deviation, week_number};
use ovotrix::models::{DailyProductionRecord, Flock, GuideRow};
use ovotrix::DomainError;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn test_flock() -> Flock {
    Flock {
        id: Some(7),
        company_id: 1,
        name: "Lot 7".to_string(),
        breed: "Ross".to_string(),
        guide_year: "2024".to_string(),
        start_date: Some(date(2024, 1, 1)),
        initial_female_count: 200,
        initial_male_count: 20,
    }
}

fn record_on(day: u64) -> DailyProductionRecord {
    DailyProductionRecord::new(1, 7, date(2024, 1, 1) + chrono::Duration::days(day as i64))
}

fn guide_week1() -> GuideRow {
    GuideRow {
        breed: Some("Ross".to_string()),
        guide_year: Some("2024".to_string()),
        age_weeks: Some("1".to_string()),
        production_pct: Some("50".to_string()),
        egg_weight_g: Some("58".to_string()),
        ..Default::default()
    }
}

#[test]
fn day_six_is_week_one_and_day_seven_is_week_two() {
    let start = date(2024, 1, 1);
    assert_eq!(week_number(start, date(2024, 1, 7)), Some(1));
    assert_eq!(week_number(start, date(2024, 1, 8)), Some(2));
}

#[test]
fn deviation_null_safety() {
    assert_eq!(compute_deviation(Some(10.0), Some(0.0)), None);
    assert_eq!(compute_deviation(None, Some(10.0)), None);
    assert_eq!(compute_deviation(Some(12.0), Some(10.0)), Some(20.0));
}

#[test]
fn no_records_yields_empty_report() {
    let report =
        compute_weekly_indicators(&test_flock(), &[], &[], &WeeklyFilter::default()).unwrap();
    assert!(report.weeks.is_empty());
    assert_eq!(report.summary.total_weeks, 0);
    assert!(!report.summary.has_guide_data);
}

#[test]
fn missing_start_date_is_a_configuration_error() {
    let mut flock = test_flock();
    flock.start_date = None;
    let result = compute_weekly_indicators(&flock, &[], &[], &WeeklyFilter::default());
    assert!(matches!(result, Err(DomainError::NotConfigured(_))));
}

#[test]
fn inverted_week_range_is_rejected() {
    let filter = WeeklyFilter {
        week_from: Some(10),
        week_to: Some(2),
        ..Default::default()
    };
    let result = compute_weekly_indicators(&test_flock(), &[], &[], &filter);
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[test]
fn week_filter_limits_the_report() {
    let records: Vec<DailyProductionRecord> = (0..21).map(record_on).collect();
    let filter = WeeklyFilter {
        week_from: Some(2),
        week_to: Some(2),
        ..Default::default()
    };
    let report = compute_weekly_indicators(&test_flock(), &records, &[], &filter).unwrap();
    assert_eq!(report.weeks.len(), 1);
    assert_eq!(report.weeks[0].week, 2);
    assert_eq!(report.summary.min_week, Some(2));
    assert_eq!(report.summary.max_week, Some(2));
}

#[test]
fn sums_and_averages_aggregate_per_week() {
    let mut records: Vec<DailyProductionRecord> = (0..7).map(record_on).collect();
    for r in records.iter_mut() {
        r.mortality_female = 2;
        r.feed_female_kg = 20.0;
        r.eggs_incubable = 90;
        r.eggs_dirty = 10;
    }
    records[0].uniformity_pct = Some(80.0);
    records[1].uniformity_pct = Some(90.0);
    records[2].uniformity_pct = Some(0.0); // zero samples are excluded

    let report = compute_weekly_indicators(
        &test_flock(),
        &records,
        &[],
        &WeeklyFilter::default(),
    )
    .unwrap();
    let week = &report.weeks[0];

    assert_eq!(week.record_count, 7);
    assert_eq!(week.mortality_female, 14);
    assert_eq!(week.feed_female_kg, 140.0);
    assert_eq!(week.eggs.incubable, 630);
    assert_eq!(week.eggs.dirty, 70);
    assert_eq!(week.eggs.total, 700);
    assert_eq!(week.avg_uniformity_pct, Some(85.0));
    assert_eq!(week.avg_weight_female_g, None);
}

#[test]
fn bird_counts_back_compute_week_start() {
    let mut records: Vec<DailyProductionRecord> = (0..7).map(record_on).collect();
    for r in records.iter_mut() {
        r.mortality_female = 1;
        r.selection_female = 1;
    }
    let report =
        compute_weekly_indicators(&test_flock(), &records, &[], &WeeklyFilter::default()).unwrap();
    let week = &report.weeks[0];

    // carried-in counts are end-of-week, so week start adds losses back
    assert_eq!(week.birds_female_start, 200 + 7 + 7);
    assert_eq!(week.birds_female_end, 200);
    assert_eq!(week.birds_male_start, 20);
    assert_eq!(week.birds_male_end, 20);
}

#[test]
fn week_one_scenario_against_the_guide() {
    let mut records: Vec<DailyProductionRecord> = (0..7).map(record_on).collect();
    for r in records.iter_mut() {
        r.eggs_incubable = 100; // 700 total over the week
    }
    records[2].egg_weight = Some(60.0);
    records[5].egg_weight = Some(60.0);

    let report = compute_weekly_indicators(
        &test_flock(),
        &records,
        &[guide_week1()],
        &WeeklyFilter::default(),
    )
    .unwrap();

    assert_eq!(report.weeks.len(), 1);
    assert!(report.summary.has_guide_data);
    let week = &report.weeks[0];
    let guide = week.guide.as_ref().unwrap();

    // guide expectation: 50% production over 200 hens for 7 days
    assert_eq!(guide.eggs_total, Some(700.0));
    assert_eq!(week.eggs.total, 700);
    assert_eq!(week.deviation.eggs_total, Some(0.0));

    // real production: (700 / 7) / 200 = 50%
    assert_eq!(week.production_pct, Some(50.0));
    assert_eq!(week.deviation.production_pct, Some(0.0));

    // real egg weight 60 vs guide 58
    assert_eq!(week.avg_egg_weight_g, Some(60.0));
    let dev = week.deviation.egg_weight_g.unwrap();
    assert!((dev - (60.0 - 58.0) / 58.0 * 100.0).abs() < 1e-9);
}

#[test]
fn weeks_without_guide_rows_have_no_deviation() {
    let records: Vec<DailyProductionRecord> = (0..7).map(record_on).collect();
    let report =
        compute_weekly_indicators(&test_flock(), &records, &[], &WeeklyFilter::default()).unwrap();
    let week = &report.weeks[0];
    assert!(week.guide.is_none());
    assert_eq!(week.deviation.eggs_total, None);
    assert!(!report.summary.has_guide_data);
}
