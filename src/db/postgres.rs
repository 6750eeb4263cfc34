//! PostgreSQL repositories for flocks, daily records, and guide rows.
//!
//! Guide metric columns are TEXT on purpose: the reference sheets they come
//! from are inconsistently formatted and parsing happens at the computation
//! boundary, not at ingestion. Every query is scoped by company_id from the
//! tenant context.

use async_trait::async_trait;
use chrono::NaiveDate;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls, Row};

use crate::config;
use crate::error::DomainError;
use crate::models::flock::Flock;
use crate::models::guide::GuideRow;
use crate::models::production::DailyProductionRecord;
use crate::services::repository::{DailyRecordRepository, FlockRepository, GuideRepository};
use crate::tenant::TenantContext;

pub struct PgDatabase {
    client: Arc<RwLock<Option<Client>>>,
}

fn db_err(context: &str, e: impl std::fmt::Display) -> DomainError {
    DomainError::Database(format!("{}: {}", context, e))
}

const NOT_CONNECTED: &str = "database connection not available";

impl PgDatabase {
    pub async fn new() -> Result<Self, DomainError> {
        let database_url = config::get_database_url();
        let (client, connection) = tokio_postgres::connect(&database_url, NoTls)
            .await
            .map_err(|e| db_err("failed to connect to PostgreSQL", e))?;

        // Spawn connection task
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::error!(error = %e, "PostgreSQL connection error");
            }
        });

        let db = Self {
            client: Arc::new(RwLock::new(Some(client))),
        };
        db.init_schema().await?;
        Ok(db)
    }

    async fn init_schema(&self) -> Result<(), DomainError> {
        let client = self.client.read().await;
        let Some(ref c) = *client else {
            return Err(DomainError::Database(NOT_CONNECTED.to_string()));
        };

        c.batch_execute(
            "CREATE TABLE IF NOT EXISTS flocks (
                id BIGSERIAL PRIMARY KEY,
                company_id BIGINT NOT NULL,
                name TEXT NOT NULL,
                breed TEXT NOT NULL,
                guide_year TEXT NOT NULL,
                start_date DATE,
                initial_female_count BIGINT NOT NULL DEFAULT 0,
                initial_male_count BIGINT NOT NULL DEFAULT 0
            );
            CREATE TABLE IF NOT EXISTS daily_records (
                id BIGSERIAL PRIMARY KEY,
                company_id BIGINT NOT NULL,
                flock_id BIGINT NOT NULL,
                record_date DATE NOT NULL,
                mortality_female BIGINT NOT NULL DEFAULT 0,
                mortality_male BIGINT NOT NULL DEFAULT 0,
                selection_female BIGINT NOT NULL DEFAULT 0,
                selection_male BIGINT NOT NULL DEFAULT 0,
                feed_female_kg DOUBLE PRECISION NOT NULL DEFAULT 0,
                feed_male_kg DOUBLE PRECISION NOT NULL DEFAULT 0,
                eggs_incubable BIGINT NOT NULL DEFAULT 0,
                eggs_dirty BIGINT NOT NULL DEFAULT 0,
                eggs_floor BIGINT NOT NULL DEFAULT 0,
                eggs_broken BIGINT NOT NULL DEFAULT 0,
                eggs_cracked BIGINT NOT NULL DEFAULT 0,
                eggs_double_yolk BIGINT NOT NULL DEFAULT 0,
                eggs_small BIGINT NOT NULL DEFAULT 0,
                eggs_deformed BIGINT NOT NULL DEFAULT 0,
                eggs_thin_shell BIGINT NOT NULL DEFAULT 0,
                eggs_soft_shell BIGINT NOT NULL DEFAULT 0,
                eggs_discard BIGINT NOT NULL DEFAULT 0,
                weight_female DOUBLE PRECISION,
                weight_male DOUBLE PRECISION,
                uniformity_pct DOUBLE PRECISION,
                cv_pct DOUBLE PRECISION,
                egg_weight DOUBLE PRECISION,
                UNIQUE (flock_id, record_date)
            );
            CREATE TABLE IF NOT EXISTS guide_rows (
                id BIGSERIAL PRIMARY KEY,
                company_id BIGINT NOT NULL,
                breed TEXT,
                guide_year TEXT,
                age_weeks TEXT,
                feed_daily_female_g TEXT,
                feed_daily_male_g TEXT,
                feed_cumulative_female_g TEXT,
                feed_cumulative_male_g TEXT,
                withdrawal_cumulative TEXT,
                mortality_female_pct TEXT,
                mortality_male_pct TEXT,
                weight_female_g TEXT,
                weight_male_g TEXT,
                uniformity_pct TEXT,
                eggs_total_cumulative TEXT,
                eggs_incubable_cumulative TEXT,
                production_pct TEXT,
                egg_weight_g TEXT,
                kcal_female TEXT,
                kcal_male TEXT,
                protein_female_pct TEXT,
                protein_male_pct TEXT,
                hatch_pct TEXT,
                chicks_cumulative TEXT,
                notes TEXT,
                code TEXT,
                females_count TEXT,
                males_count TEXT,
                mating_pct TEXT,
                kcal_week_female TEXT,
                kcal_week_male TEXT,
                protein_week_female TEXT,
                protein_week_male TEXT,
                egg_mass_g TEXT,
                feed_efficiency_pct TEXT,
                grams_per_total_egg TEXT,
                grams_per_incubable_egg TEXT,
                grams_per_chick TEXT
            );",
        )
        .await
        .map_err(|e| db_err("failed to initialize schema", e))?;

        Ok(())
    }

    /// Check if the connection is available
    pub async fn is_available(&self) -> bool {
        let client = self.client.read().await;
        client.is_some()
    }
}

fn flock_from_row(row: &Row) -> Flock {
    Flock {
        id: Some(row.get(0)),
        company_id: row.get(1),
        name: row.get(2),
        breed: row.get(3),
        guide_year: row.get(4),
        start_date: row.get(5),
        initial_female_count: row.get(6),
        initial_male_count: row.get(7),
    }
}

fn record_from_row(row: &Row) -> DailyProductionRecord {
    DailyProductionRecord {
        id: Some(row.get(0)),
        company_id: row.get(1),
        flock_id: row.get(2),
        record_date: row.get(3),
        mortality_female: row.get(4),
        mortality_male: row.get(5),
        selection_female: row.get(6),
        selection_male: row.get(7),
        feed_female_kg: row.get(8),
        feed_male_kg: row.get(9),
        eggs_incubable: row.get(10),
        eggs_dirty: row.get(11),
        eggs_floor: row.get(12),
        eggs_broken: row.get(13),
        eggs_cracked: row.get(14),
        eggs_double_yolk: row.get(15),
        eggs_small: row.get(16),
        eggs_deformed: row.get(17),
        eggs_thin_shell: row.get(18),
        eggs_soft_shell: row.get(19),
        eggs_discard: row.get(20),
        weight_female: row.get(21),
        weight_male: row.get(22),
        uniformity_pct: row.get(23),
        cv_pct: row.get(24),
        egg_weight: row.get(25),
    }
}

const GUIDE_COLUMNS: &str = "breed, guide_year, age_weeks, feed_daily_female_g, \
     feed_daily_male_g, feed_cumulative_female_g, feed_cumulative_male_g, \
     withdrawal_cumulative, mortality_female_pct, mortality_male_pct, \
     weight_female_g, weight_male_g, uniformity_pct, eggs_total_cumulative, \
     eggs_incubable_cumulative, production_pct, egg_weight_g, kcal_female, \
     kcal_male, protein_female_pct, protein_male_pct, hatch_pct, \
     chicks_cumulative, notes, code, females_count, males_count, mating_pct, \
     kcal_week_female, kcal_week_male, protein_week_female, protein_week_male, \
     egg_mass_g, feed_efficiency_pct, grams_per_total_egg, \
     grams_per_incubable_egg, grams_per_chick";

fn guide_from_row(row: &Row) -> GuideRow {
    GuideRow {
        id: Some(row.get(0)),
        company_id: row.get(1),
        breed: row.get(2),
        guide_year: row.get(3),
        age_weeks: row.get(4),
        feed_daily_female_g: row.get(5),
        feed_daily_male_g: row.get(6),
        feed_cumulative_female_g: row.get(7),
        feed_cumulative_male_g: row.get(8),
        withdrawal_cumulative: row.get(9),
        mortality_female_pct: row.get(10),
        mortality_male_pct: row.get(11),
        weight_female_g: row.get(12),
        weight_male_g: row.get(13),
        uniformity_pct: row.get(14),
        eggs_total_cumulative: row.get(15),
        eggs_incubable_cumulative: row.get(16),
        production_pct: row.get(17),
        egg_weight_g: row.get(18),
        kcal_female: row.get(19),
        kcal_male: row.get(20),
        protein_female_pct: row.get(21),
        protein_male_pct: row.get(22),
        hatch_pct: row.get(23),
        chicks_cumulative: row.get(24),
        notes: row.get(25),
        code: row.get(26),
        females_count: row.get(27),
        males_count: row.get(28),
        mating_pct: row.get(29),
        kcal_week_female: row.get(30),
        kcal_week_male: row.get(31),
        protein_week_female: row.get(32),
        protein_week_male: row.get(33),
        egg_mass_g: row.get(34),
        feed_efficiency_pct: row.get(35),
        grams_per_total_egg: row.get(36),
        grams_per_incubable_egg: row.get(37),
        grams_per_chick: row.get(38),
    }
}

/// Guide metric values in the same order as `GUIDE_COLUMNS`.
fn guide_params(row: &GuideRow) -> Vec<&(dyn ToSql + Sync)> {
    vec![
        &row.breed,
        &row.guide_year,
        &row.age_weeks,
        &row.feed_daily_female_g,
        &row.feed_daily_male_g,
        &row.feed_cumulative_female_g,
        &row.feed_cumulative_male_g,
        &row.withdrawal_cumulative,
        &row.mortality_female_pct,
        &row.mortality_male_pct,
        &row.weight_female_g,
        &row.weight_male_g,
        &row.uniformity_pct,
        &row.eggs_total_cumulative,
        &row.eggs_incubable_cumulative,
        &row.production_pct,
        &row.egg_weight_g,
        &row.kcal_female,
        &row.kcal_male,
        &row.protein_female_pct,
        &row.protein_male_pct,
        &row.hatch_pct,
        &row.chicks_cumulative,
        &row.notes,
        &row.code,
        &row.females_count,
        &row.males_count,
        &row.mating_pct,
        &row.kcal_week_female,
        &row.kcal_week_male,
        &row.protein_week_female,
        &row.protein_week_male,
        &row.egg_mass_g,
        &row.feed_efficiency_pct,
        &row.grams_per_total_egg,
        &row.grams_per_incubable_egg,
        &row.grams_per_chick,
    ]
}

fn placeholders(first: usize, count: usize) -> String {
    (first..first + count)
        .map(|i| format!("${}", i))
        .collect::<Vec<_>>()
        .join(", ")
}

fn update_assignments(columns: &str, first: usize) -> String {
    columns
        .split(',')
        .map(str::trim)
        .enumerate()
        .map(|(i, col)| format!("{} = ${}", col, first + i))
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl FlockRepository for PgDatabase {
    async fn get_flock(
        &self,
        ctx: &TenantContext,
        flock_id: i64,
    ) -> Result<Option<Flock>, DomainError> {
        let client = self.client.read().await;
        let Some(ref c) = *client else {
            return Err(DomainError::Database(NOT_CONNECTED.to_string()));
        };
        let rows = c
            .query(
                "SELECT id, company_id, name, breed, guide_year, start_date,
                        initial_female_count, initial_male_count
                 FROM flocks WHERE id = $1 AND company_id = $2",
                &[&flock_id, &ctx.company_id],
            )
            .await
            .map_err(|e| db_err("failed to query flock", e))?;
        Ok(rows.first().map(flock_from_row))
    }

    async fn create_flock(&self, ctx: &TenantContext, flock: &Flock) -> Result<i64, DomainError> {
        let client = self.client.read().await;
        let Some(ref c) = *client else {
            return Err(DomainError::Database(NOT_CONNECTED.to_string()));
        };
        let row = c
            .query_one(
                "INSERT INTO flocks (company_id, name, breed, guide_year, start_date,
                                     initial_female_count, initial_male_count)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)
                 RETURNING id",
                &[
                    &ctx.company_id,
                    &flock.name,
                    &flock.breed,
                    &flock.guide_year,
                    &flock.start_date,
                    &flock.initial_female_count,
                    &flock.initial_male_count,
                ],
            )
            .await
            .map_err(|e| db_err("failed to create flock", e))?;
        Ok(row.get(0))
    }
}

#[async_trait]
impl DailyRecordRepository for PgDatabase {
    async fn get_records(
        &self,
        ctx: &TenantContext,
        flock_id: i64,
        date_from: Option<NaiveDate>,
        date_to: Option<NaiveDate>,
    ) -> Result<Vec<DailyProductionRecord>, DomainError> {
        let client = self.client.read().await;
        let Some(ref c) = *client else {
            return Err(DomainError::Database(NOT_CONNECTED.to_string()));
        };
        let rows = c
            .query(
                "SELECT id, company_id, flock_id, record_date,
                        mortality_female, mortality_male, selection_female, selection_male,
                        feed_female_kg, feed_male_kg,
                        eggs_incubable, eggs_dirty, eggs_floor, eggs_broken, eggs_cracked,
                        eggs_double_yolk, eggs_small, eggs_deformed, eggs_thin_shell,
                        eggs_soft_shell, eggs_discard,
                        weight_female, weight_male, uniformity_pct, cv_pct, egg_weight
                 FROM daily_records
                 WHERE flock_id = $1 AND company_id = $2
                   AND ($3::date IS NULL OR record_date >= $3)
                   AND ($4::date IS NULL OR record_date <= $4)
                 ORDER BY record_date",
                &[&flock_id, &ctx.company_id, &date_from, &date_to],
            )
            .await
            .map_err(|e| db_err("failed to query daily records", e))?;
        Ok(rows.iter().map(record_from_row).collect())
    }

    async fn insert_record(
        &self,
        ctx: &TenantContext,
        record: &DailyProductionRecord,
    ) -> Result<i64, DomainError> {
        let client = self.client.read().await;
        let Some(ref c) = *client else {
            return Err(DomainError::Database(NOT_CONNECTED.to_string()));
        };
        let row = c
            .query_one(
                "INSERT INTO daily_records (company_id, flock_id, record_date,
                    mortality_female, mortality_male, selection_female, selection_male,
                    feed_female_kg, feed_male_kg,
                    eggs_incubable, eggs_dirty, eggs_floor, eggs_broken, eggs_cracked,
                    eggs_double_yolk, eggs_small, eggs_deformed, eggs_thin_shell,
                    eggs_soft_shell, eggs_discard,
                    weight_female, weight_male, uniformity_pct, cv_pct, egg_weight)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                         $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
                 RETURNING id",
                &[
                    &ctx.company_id,
                    &record.flock_id,
                    &record.record_date,
                    &record.mortality_female,
                    &record.mortality_male,
                    &record.selection_female,
                    &record.selection_male,
                    &record.feed_female_kg,
                    &record.feed_male_kg,
                    &record.eggs_incubable,
                    &record.eggs_dirty,
                    &record.eggs_floor,
                    &record.eggs_broken,
                    &record.eggs_cracked,
                    &record.eggs_double_yolk,
                    &record.eggs_small,
                    &record.eggs_deformed,
                    &record.eggs_thin_shell,
                    &record.eggs_soft_shell,
                    &record.eggs_discard,
                    &record.weight_female,
                    &record.weight_male,
                    &record.uniformity_pct,
                    &record.cv_pct,
                    &record.egg_weight,
                ],
            )
            .await
            .map_err(|e| {
                // UNIQUE (flock_id, record_date) makes duplicates a caller error
                if e.to_string().contains("duplicate key") {
                    DomainError::validation(format!(
                        "daily record already exists for flock {} on {}",
                        record.flock_id, record.record_date
                    ))
                } else {
                    db_err("failed to insert daily record", e)
                }
            })?;
        Ok(row.get(0))
    }
}

#[async_trait]
impl GuideRepository for PgDatabase {
    async fn get_rows(
        &self,
        ctx: &TenantContext,
        breed: &str,
        year: &str,
    ) -> Result<Vec<GuideRow>, DomainError> {
        let client = self.client.read().await;
        let Some(ref c) = *client else {
            return Err(DomainError::Database(NOT_CONNECTED.to_string()));
        };
        let sql = format!(
            "SELECT id, company_id, {} FROM guide_rows
             WHERE company_id = $1
               AND lower(btrim(breed)) = lower(btrim($2))
               AND btrim(guide_year) = btrim($3)",
            GUIDE_COLUMNS
        );
        let rows = c
            .query(&sql, &[&ctx.company_id, &breed, &year])
            .await
            .map_err(|e| db_err("failed to query guide rows", e))?;
        Ok(rows.iter().map(guide_from_row).collect())
    }

    async fn get_row(
        &self,
        ctx: &TenantContext,
        id: i64,
    ) -> Result<Option<GuideRow>, DomainError> {
        let client = self.client.read().await;
        let Some(ref c) = *client else {
            return Err(DomainError::Database(NOT_CONNECTED.to_string()));
        };
        let sql = format!(
            "SELECT id, company_id, {} FROM guide_rows WHERE id = $1 AND company_id = $2",
            GUIDE_COLUMNS
        );
        let rows = c
            .query(&sql, &[&id, &ctx.company_id])
            .await
            .map_err(|e| db_err("failed to query guide row", e))?;
        Ok(rows.first().map(guide_from_row))
    }

    async fn save_rows(
        &self,
        ctx: &TenantContext,
        rows: Vec<GuideRow>,
    ) -> Result<Vec<GuideRow>, DomainError> {
        let client = self.client.read().await;
        let Some(ref c) = *client else {
            return Err(DomainError::Database(NOT_CONNECTED.to_string()));
        };

        let mut saved = Vec::with_capacity(rows.len());
        for mut row in rows {
            row.company_id = ctx.company_id;
            match row.id {
                Some(id) => {
                    let sql = format!(
                        "UPDATE guide_rows SET {} WHERE id = $1 AND company_id = $2",
                        update_assignments(GUIDE_COLUMNS, 3)
                    );
                    let mut params: Vec<&(dyn ToSql + Sync)> = vec![&id, &ctx.company_id];
                    params.extend(guide_params(&row));
                    let affected = c
                        .execute(&sql, &params)
                        .await
                        .map_err(|e| db_err("failed to update guide row", e))?;
                    if affected == 0 {
                        return Err(DomainError::not_found(format!("guide row {}", id)));
                    }
                }
                None => {
                    let sql = format!(
                        "INSERT INTO guide_rows (company_id, {}) VALUES ($1, {}) RETURNING id",
                        GUIDE_COLUMNS,
                        placeholders(2, 37)
                    );
                    let mut params: Vec<&(dyn ToSql + Sync)> = vec![&ctx.company_id];
                    params.extend(guide_params(&row));
                    let inserted = c
                        .query_one(&sql, &params)
                        .await
                        .map_err(|e| db_err("failed to insert guide row", e))?;
                    row.id = Some(inserted.get(0));
                }
            }
            saved.push(row);
        }
        Ok(saved)
    }
}
