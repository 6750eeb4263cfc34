//! Service layer: repository seams and computation orchestrators.

pub mod guide;
pub mod production;
pub mod repository;

pub use guide::GuideService;
pub use production::ProductionIndicatorService;
pub use repository::{
    DailyRecordRepository, FlockRepository, GuideRepository, InMemoryStore,
};
