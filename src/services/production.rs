//! Weekly indicator orchestration: load flock, records, and guide rows via
//! the repository seams, then delegate to the pure aggregator.

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::error::DomainError;
use crate::indicators::weekly::{compute_weekly_indicators, WeeklyFilter};
use crate::metrics::Metrics;
use crate::models::indicators::WeeklyIndicatorReport;
use crate::services::repository::{DailyRecordRepository, FlockRepository, GuideRepository};
use crate::tenant::TenantContext;

pub struct ProductionIndicatorService {
    flocks: Arc<dyn FlockRepository>,
    records: Arc<dyn DailyRecordRepository>,
    guides: Arc<dyn GuideRepository>,
    metrics: Option<Arc<Metrics>>,
}

impl ProductionIndicatorService {
    pub fn new(
        flocks: Arc<dyn FlockRepository>,
        records: Arc<dyn DailyRecordRepository>,
        guides: Arc<dyn GuideRepository>,
        metrics: Option<Arc<Metrics>>,
    ) -> Self {
        Self {
            flocks,
            records,
            guides,
            metrics,
        }
    }

    /// Compute the weekly indicator report for one flock.
    pub async fn compute_weekly(
        &self,
        ctx: &TenantContext,
        flock_id: i64,
        filter: &WeeklyFilter,
    ) -> Result<WeeklyIndicatorReport, DomainError> {
        let start = Instant::now();

        let flock = self
            .flocks
            .get_flock(ctx, flock_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("flock {}", flock_id)))?;

        let records = self
            .records
            .get_records(ctx, flock_id, filter.date_from, filter.date_to)
            .await?;

        let guide_rows = self
            .guides
            .get_rows(ctx, &flock.breed, &flock.guide_year)
            .await?;

        let report = compute_weekly_indicators(&flock, &records, &guide_rows, filter)?;

        if let Some(ref metrics) = self.metrics {
            metrics.indicator_computations_total.inc();
            metrics
                .indicator_computation_duration_seconds
                .observe(start.elapsed().as_secs_f64());
        }

        debug!(
            flock_id = flock_id,
            company_id = ctx.company_id,
            record_count = records.len(),
            weeks = report.weeks.len(),
            has_guide_data = report.summary.has_guide_data,
            "computed weekly indicators for flock {}",
            flock_id
        );

        Ok(report)
    }
}
