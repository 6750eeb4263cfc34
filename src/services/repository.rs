//! Repository interfaces for the entities the computation services consume.
//!
//! The Postgres implementations live in `db::postgres`; `InMemoryStore`
//! backs tests and local experiments. Every call takes the tenant context
//! explicitly - repositories must scope all reads and writes to the calling
//! company.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::error::DomainError;
use crate::models::flock::Flock;
use crate::models::guide::GuideRow;
use crate::models::production::DailyProductionRecord;
use crate::tenant::TenantContext;

#[async_trait]
pub trait FlockRepository: Send + Sync {
    async fn get_flock(
        &self,
        ctx: &TenantContext,
        flock_id: i64,
    ) -> Result<Option<Flock>, DomainError>;

    async fn create_flock(&self, ctx: &TenantContext, flock: &Flock) -> Result<i64, DomainError>;
}

#[async_trait]
pub trait DailyRecordRepository: Send + Sync {
    /// Daily records for one flock, ordered by date, optionally windowed.
    async fn get_records(
        &self,
        ctx: &TenantContext,
        flock_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<DailyProductionRecord>, DomainError>;

    async fn insert_record(
        &self,
        ctx: &TenantContext,
        record: &DailyProductionRecord,
    ) -> Result<i64, DomainError>;
}

#[async_trait]
pub trait GuideRepository: Send + Sync {
    /// All guide rows matching a breed (case-insensitive, trimmed) and year
    /// (trimmed) for the tenant.
    async fn get_rows(
        &self,
        ctx: &TenantContext,
        breed: &str,
        year: &str,
    ) -> Result<Vec<GuideRow>, DomainError>;

    async fn get_row(
        &self,
        ctx: &TenantContext,
        id: i64,
    ) -> Result<Option<GuideRow>, DomainError>;

    /// Insert or update each row (rows with an id update in place). Returns
    /// the persisted rows with ids assigned.
    async fn save_rows(
        &self,
        ctx: &TenantContext,
        rows: Vec<GuideRow>,
    ) -> Result<Vec<GuideRow>, DomainError>;
}

/// Tenant-scoped in-memory store implementing all three repositories.
#[derive(Default)]
pub struct InMemoryStore {
    flocks: RwLock<Vec<Flock>>,
    records: RwLock<Vec<DailyProductionRecord>>,
    guide_rows: RwLock<Vec<GuideRow>>,
    next_id: RwLock<i64>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn allocate_id(&self) -> i64 {
        let mut next = self.next_id.write().await;
        *next += 1;
        *next
    }
}

#[async_trait]
impl FlockRepository for InMemoryStore {
    async fn get_flock(
        &self,
        ctx: &TenantContext,
        flock_id: i64,
    ) -> Result<Option<Flock>, DomainError> {
        let flocks = self.flocks.read().await;
        Ok(flocks
            .iter()
            .find(|f| f.id == Some(flock_id) && f.company_id == ctx.company_id)
            .cloned())
    }

    async fn create_flock(&self, ctx: &TenantContext, flock: &Flock) -> Result<i64, DomainError> {
        let id = self.allocate_id().await;
        let mut stored = flock.clone();
        stored.id = Some(id);
        stored.company_id = ctx.company_id;
        self.flocks.write().await.push(stored);
        Ok(id)
    }
}

#[async_trait]
impl DailyRecordRepository for InMemoryStore {
    async fn get_records(
        &self,
        ctx: &TenantContext,
        flock_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<DailyProductionRecord>, DomainError> {
        let records = self.records.read().await;
        let mut matched: Vec<DailyProductionRecord> = records
            .iter()
            .filter(|r| r.flock_id == flock_id && r.company_id == ctx.company_id)
            .filter(|r| date_from.is_none_or(|from| r.record_date >= from))
            .filter(|r| date_to.is_none_or(|to| r.record_date <= to))
            .cloned()
            .collect();
        matched.sort_by_key(|r| r.record_date);
        Ok(matched)
    }

    async fn insert_record(
        &self,
        ctx: &TenantContext,
        record: &DailyProductionRecord,
    ) -> Result<i64, DomainError> {
        let mut records = self.records.write().await;
        let duplicate = records.iter().any(|r| {
            r.flock_id == record.flock_id
                && r.company_id == ctx.company_id
                && r.record_date == record.record_date
        });
        if duplicate {
            return Err(DomainError::validation(format!(
                "daily record already exists for flock {} on {}",
                record.flock_id, record.record_date
            )));
        }
        let id = self.allocate_id().await;
        let mut stored = record.clone();
        stored.id = Some(id);
        stored.company_id = ctx.company_id;
        records.push(stored);
        Ok(id)
    }
}

#[async_trait]
impl GuideRepository for InMemoryStore {
    async fn get_rows(
        &self,
        ctx: &TenantContext,
        breed: &str,
        year: &str,
    ) -> Result<Vec<GuideRow>, DomainError> {
        let rows = self.guide_rows.read().await;
        Ok(rows
            .iter()
            .filter(|r| r.company_id == ctx.company_id)
            .filter(|r| crate::indicators::guide::matches_breed_year(r, breed, year))
            .cloned()
            .collect())
    }

    async fn get_row(
        &self,
        ctx: &TenantContext,
        id: i64,
    ) -> Result<Option<GuideRow>, DomainError> {
        let rows = self.guide_rows.read().await;
        Ok(rows
            .iter()
            .find(|r| r.id == Some(id) && r.company_id == ctx.company_id)
            .cloned())
    }

    async fn save_rows(
        &self,
        ctx: &TenantContext,
        rows: Vec<GuideRow>,
    ) -> Result<Vec<GuideRow>, DomainError> {
        let mut stored_rows = self.guide_rows.write().await;
        let mut saved = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.company_id = ctx.company_id;
            match row.id {
                Some(id) => {
                    let existing = stored_rows
                        .iter_mut()
                        .find(|r| r.id == Some(id) && r.company_id == ctx.company_id);
                    match existing {
                        Some(slot) => *slot = row.clone(),
                        None => {
                            return Err(DomainError::not_found(format!("guide row {}", id)))
                        }
                    }
                }
                None => {
                    let id = self.allocate_id().await;
                    row.id = Some(id);
                    stored_rows.push(row.clone());
                }
            }
            saved.push(row);
        }
        Ok(saved)
    }
}
