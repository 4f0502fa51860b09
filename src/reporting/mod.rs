//! balances, splits, projections and journals read off an amortized schedule.
//!
//! Every figure leaving this module carries the reporting sign, so a sublease
//! reports the mirror image of the equivalent lease.

pub mod balance;
pub mod journal;
pub mod maturity;
pub mod projection;
pub mod split;

pub use balance::{carrying_amounts, BalanceSnapshot, Derecognition, PeriodActivity, Recognition};
pub use journal::{account_balance, generate_journal, is_balanced, totals, JournalEntry};
pub use maturity::{maturity_analysis, MaturityAnalysis, MaturityBand, MaturityBucket};
pub use projection::{project, ProjectionEntry};
pub use split::{split_liability, LiabilitySplit};
