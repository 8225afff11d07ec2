//! Freshness scoring and layout validation of a context store.

pub mod score;
pub mod validate;

pub use score::{DocumentHealth, HealthReport, HealthScorer, HealthStatus};
pub use validate::{StructureValidator, ValidationReport};
