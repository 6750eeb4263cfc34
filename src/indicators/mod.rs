//! Computational core: tolerant parsing, genetic-guide matching, derived
//! guide fields, and weekly production indicators.
//!
//! Everything in this module is pure: callers load the rows, these functions
//! compute. Persistence and tenancy live in `services` and `db`.

pub mod derived;
pub mod guide;
pub mod parser;
pub mod weekly;

pub use derived::{compute_derived, compute_derived_chain};
pub use guide::{find_guide_row, find_guide_rows_in_range, find_production_rows, resolve_reference};
pub use parser::{format_number, parse_age, parse_mating_percent, parse_number, parse_percent};
pub use weekly::{compute_deviation, compute_weekly_indicators, week_number, WeeklyFilter};
