//! Genetic-guide orchestration: lookups over the tenant's reference table
//! and derived-field recomputation on writes.

use std::sync::Arc;

use tracing::debug;

use crate::error::DomainError;
use crate::indicators::derived::compute_derived_chain;
use crate::indicators::guide::{
    filter_breed_year, find_guide_rows_in_range, find_production_rows, resolve_reference,
};
use crate::metrics::Metrics;
use crate::models::guide::{GuideReference, GuideRow};
use crate::services::repository::GuideRepository;
use crate::tenant::TenantContext;

pub struct GuideService {
    guides: Arc<dyn GuideRepository>,
    metrics: Option<Arc<Metrics>>,
}

impl GuideService {
    pub fn new(guides: Arc<dyn GuideRepository>, metrics: Option<Arc<Metrics>>) -> Self {
        Self { guides, metrics }
    }

    /// Resolve one reference row for (breed, year, age-in-weeks).
    pub async fn lookup(
        &self,
        ctx: &TenantContext,
        breed: &str,
        year: &str,
        age_weeks: u32,
    ) -> Result<GuideReference, DomainError> {
        if let Some(ref metrics) = self.metrics {
            metrics.guide_lookups_total.inc();
        }
        let rows = self.guides.get_rows(ctx, breed, year).await?;
        let candidates = filter_breed_year(&rows, breed, year);
        if candidates.is_empty() {
            if let Some(ref metrics) = self.metrics {
                metrics.guide_lookup_misses_total.inc();
            }
            return Err(DomainError::not_found(format!(
                "no guide rows for breed '{}' year '{}'",
                breed.trim(),
                year.trim()
            )));
        }
        resolve_reference(&candidates, age_weeks).ok_or_else(|| {
            if let Some(ref metrics) = self.metrics {
                metrics.guide_lookup_misses_total.inc();
            }
            DomainError::not_found(format!(
                "no guide row with a readable age for breed '{}' year '{}'",
                breed.trim(),
                year.trim()
            ))
        })
    }

    /// All reference rows with parsed age in `[age_from, age_to]`, ascending.
    /// `production_only` restricts to the lay phase (age >= 26).
    pub async fn range(
        &self,
        ctx: &TenantContext,
        breed: &str,
        year: &str,
        age_from: u32,
        age_to: u32,
        production_only: bool,
    ) -> Result<Vec<GuideReference>, DomainError> {
        if age_from > age_to {
            return Err(DomainError::validation(format!(
                "invalid age range: {} > {}",
                age_from, age_to
            )));
        }
        let rows = self.guides.get_rows(ctx, breed, year).await?;
        let candidates = filter_breed_year(&rows, breed, year);
        let matched = if production_only {
            find_production_rows(&candidates, age_from, age_to)
        } else {
            find_guide_rows_in_range(&candidates, age_from, age_to)
        };
        Ok(matched)
    }

    /// Persist a raw guide row, recomputing derived fields for its whole
    /// breed+year group first. Returns the saved row.
    ///
    /// Sibling rows are rewritten too: later ages chain their live-bird
    /// counts off earlier rows, so an edit anywhere refreshes the group.
    pub async fn save(
        &self,
        ctx: &TenantContext,
        mut row: GuideRow,
    ) -> Result<GuideRow, DomainError> {
        let breed = row
            .breed
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .ok_or_else(|| DomainError::validation("guide row requires a breed"))?
            .to_string();
        let year = row
            .guide_year
            .as_deref()
            .map(str::trim)
            .filter(|y| !y.is_empty())
            .ok_or_else(|| DomainError::validation("guide row requires a guide year"))?
            .to_string();

        row.company_id = ctx.company_id;

        // Updates may move a row to a different breed+year; the stored copy
        // tells us which group it is leaving
        let vacated_group = match row.id {
            Some(id) => {
                let stored = self
                    .guides
                    .get_row(ctx, id)
                    .await?
                    .ok_or_else(|| DomainError::not_found(format!("guide row {}", id)))?;
                let old_breed = stored.breed.as_deref().unwrap_or("").trim().to_string();
                let old_year = stored.guide_year.as_deref().unwrap_or("").trim().to_string();
                let moved = !old_breed.eq_ignore_ascii_case(&breed) || old_year != year;
                (moved && !old_breed.is_empty() && !old_year.is_empty())
                    .then_some((old_breed, old_year))
            }
            None => None,
        };

        let mut group = self.guides.get_rows(ctx, &breed, &year).await?;
        match row.id {
            Some(id) => match group.iter_mut().find(|r| r.id == Some(id)) {
                Some(slot) => *slot = row.clone(),
                // moving into this group from another breed+year
                None => group.push(row.clone()),
            },
            None => group.push(row.clone()),
        }

        let known_ids: Vec<i64> = group.iter().filter_map(|r| r.id).collect();
        compute_derived_chain(&mut group);
        let saved = self.guides.save_rows(ctx, group).await?;

        // Later ages in the vacated group chained off the moved row, so that
        // group needs a re-fold too
        if let Some((old_breed, old_year)) = vacated_group {
            let mut old_rows = self.guides.get_rows(ctx, &old_breed, &old_year).await?;
            if !old_rows.is_empty() {
                compute_derived_chain(&mut old_rows);
                self.guides.save_rows(ctx, old_rows).await?;
            }
        }

        debug!(
            company_id = ctx.company_id,
            breed = %breed,
            year = %year,
            group_size = saved.len(),
            "saved guide row and recomputed derived fields for breed '{}' year '{}'",
            breed,
            year
        );

        // An insert is the one saved row whose id was not in the group before
        let saved_row = match row.id {
            Some(id) => saved.into_iter().find(|r| r.id == Some(id)),
            None => saved
                .into_iter()
                .find(|r| r.id.is_some_and(|id| !known_ids.contains(&id))),
        };
        saved_row.ok_or_else(|| DomainError::Database("saved guide row vanished".to_string()))
    }

    /// Fetch one raw row by id.
    pub async fn get(&self, ctx: &TenantContext, id: i64) -> Result<GuideRow, DomainError> {
        self.guides
            .get_row(ctx, id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("guide row {}", id)))
    }
}
