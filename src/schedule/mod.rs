pub mod escalation;
pub mod generator;
pub mod row;

pub use escalation::EscalationSchedule;
pub use generator::{generate, ScheduleGenerator};
pub use row::{RowSchedule, ScheduleRow};
