mod estimator;
mod schedule;
mod types;

pub use estimator::{DTI_THRESHOLD, LTI_THRESHOLD, REFINANCE_RATE_THRESHOLD_PCT, estimate};
pub use schedule::{MAX_SCHEDULE_MONTHS, simulate};
pub use types::{
    Estimate, LoanInputs, PayoffStatus, Recommendation, RepaymentTerm, Schedule, SchedulePoint,
};
