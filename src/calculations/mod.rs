pub mod actual_dates;
pub mod plan_dates;

pub use actual_dates::{ActualDates, project_actual};
pub use plan_dates::{PlanPass, ResolvedPlan};
