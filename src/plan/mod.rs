pub(crate) mod command;
pub mod engine;
pub mod record;

pub use engine::{DEFAULT_CULL_MARGIN, Plan, PlanCache};
pub use record::UsageCounts;
