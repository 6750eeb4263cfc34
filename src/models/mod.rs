//! Shared data models spanning the service layers.

pub mod flock;
pub mod guide;
pub mod indicators;
pub mod production;

pub use flock::Flock;
pub use guide::{GuideReference, GuideRow};
pub use indicators::{
    DeviationSet, EggBreakdown, GuideWeek, ReportSummary, WeeklyIndicator, WeeklyIndicatorReport,
};
pub use production::DailyProductionRecord;
