//! Ovotrix - multi-tenant poultry production backend
//!
//! Records daily production metrics per flock, keeps breed-specific genetic
//! reference tables, and derives weekly technical indicators compared against
//! the matching genetic guide week.

pub mod config;
pub mod core;
pub mod db;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;
pub mod tenant;

pub use error::DomainError;
pub use tenant::TenantContext;
