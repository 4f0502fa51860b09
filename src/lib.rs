pub mod amortization;
pub mod calculator;
pub mod config;
pub mod dates;
pub mod decimal;
pub mod errors;
pub mod interest;
pub mod reporting;
pub mod schedule;
pub mod types;

// re-export key types
pub use amortization::{amortize, AmortizationEngine, AmortizedRow, AmortizedSchedule, Layer, LayerKind};
pub use calculator::{calculate_lease, LeaseCalculation, LeaseCalculator, LeaseSummary};
pub use config::{
    AroEntry, AroRateSource, CalculationOptions, Escalation, Impairment, LeaseTerms, LeaseTermsBuilder,
    ProjectionConfig, RentalOverride, SecurityDeposit, SplitMethod, MAX_PROJECTION_PERIODS,
};
pub use decimal::{Money, Rate};
pub use errors::{LeaseError, Result};
pub use interest::{CompoundingEngine, FlatRate, NoRates, RateEntry, RateProvider, RateTable};
pub use reporting::{
    generate_journal, maturity_analysis, project, split_liability, BalanceSnapshot, Derecognition,
    JournalEntry, LiabilitySplit, MaturityAnalysis, MaturityBucket, PeriodActivity, ProjectionEntry,
    Recognition,
};
pub use schedule::{generate, EscalationSchedule, RowSchedule, ScheduleGenerator, ScheduleRow};
pub use types::{Account, DayOfMonth, ForcedEnd, ForcedEndKind, LeaseId, LeaseRole, RowKind, Side};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;
pub use uuid::Uuid;
