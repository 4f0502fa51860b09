use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::amortization::{amortize, AmortizedSchedule};
use crate::config::{CalculationOptions, LeaseTerms};
use crate::decimal::Money;
use crate::errors::{LeaseError, Result};
use crate::interest::{NoRates, RateProvider};
use crate::reporting::{
    generate_journal, maturity_analysis, project, split_liability, BalanceSnapshot, JournalEntry,
    LiabilitySplit, MaturityAnalysis, PeriodActivity, ProjectionEntry,
};
use crate::schedule::{generate, RowSchedule};
use crate::types::{LeaseId, LeaseRole};

static NO_RATES: NoRates = NoRates;

/// runs the full pipeline for one lease: rows, amortization, then reporting over a window
pub struct LeaseCalculator<'a> {
    terms: &'a LeaseTerms,
    rates: &'a dyn RateProvider,
}

impl<'a> LeaseCalculator<'a> {
    /// calculator with no rate table; table-sourced obligations will fail to price
    pub fn new(terms: &'a LeaseTerms) -> Self {
        Self {
            terms,
            rates: &NO_RATES,
        }
    }

    pub fn with_rate_provider(terms: &'a LeaseTerms, rates: &'a dyn RateProvider) -> Self {
        Self { terms, rates }
    }

    /// generated and amortized schedule, without any reporting
    pub fn schedule(&self) -> Result<AmortizedSchedule> {
        self.terms.validate()?;
        let rows: RowSchedule = generate(self.terms)?;
        amortize(self.terms, &rows, self.rates)
    }

    pub fn calculate(&self, options: &CalculationOptions) -> Result<LeaseCalculation> {
        options.validate()?;
        let schedule = self.schedule()?;

        let from_date = options.from_date.unwrap_or(schedule.lease_start_date);
        let to_date = options.to_date.unwrap_or(schedule.lease_end_date);
        if to_date < from_date {
            return Err(LeaseError::configuration(format!(
                "calculation window ends {to_date} before it starts {from_date}"
            )));
        }

        let method = options.split_method;
        let opening = BalanceSnapshot::opening(&schedule, from_date, method)?;
        let closing = BalanceSnapshot::at(&schedule, to_date, method)?;
        let activity = PeriodActivity::for_window(&schedule, from_date, to_date);
        let split = split_liability(&schedule, to_date, method)?;
        let projections = project(&schedule, to_date, &options.projection)?;
        let journal = generate_journal(&opening, &closing, &activity);
        let maturity = maturity_analysis(&schedule, to_date)?;

        info!(
            lease_id = %schedule.lease_id,
            from = %from_date,
            to = %to_date,
            rows = schedule.rows.len(),
            liability = %closing.lease_liability,
            rou = %closing.rou_asset,
            "lease calculated"
        );
        debug!(
            lease_id = %schedule.lease_id,
            projections = projections.len(),
            journal_lines = journal.len(),
            "reporting derived"
        );

        Ok(LeaseCalculation {
            lease_id: schedule.lease_id,
            from_date,
            to_date,
            opening,
            closing,
            activity,
            split,
            projections,
            journal,
            maturity,
            schedule,
        })
    }
}

/// everything derived for one lease over one window
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseCalculation {
    pub lease_id: LeaseId,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub schedule: AmortizedSchedule,
    pub opening: BalanceSnapshot,
    pub closing: BalanceSnapshot,
    pub activity: PeriodActivity,
    pub split: LiabilitySplit,
    pub projections: Vec<ProjectionEntry>,
    pub journal: Vec<JournalEntry>,
    pub maturity: MaturityAnalysis,
}

impl LeaseCalculation {
    pub fn summary(&self) -> LeaseSummary {
        LeaseSummary::from_calculation(self)
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// flat summary record of a calculation, signed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseSummary {
    pub lease_id: LeaseId,
    pub role: LeaseRole,
    pub from_date: NaiveDate,
    pub to_date: NaiveDate,
    pub initial_liability: Money,
    pub initial_rou: Money,
    pub opening_liability: Money,
    pub closing_liability: Money,
    pub current_liability: Money,
    pub non_current_liability: Money,
    pub opening_rou: Money,
    pub closing_rou: Money,
    pub interest: Money,
    pub depreciation: Money,
    pub impairment: Money,
    pub rent_paid: Money,
    pub aro_provision: Money,
    pub security_deposit: Money,
    pub gain_loss: Option<Money>,
}

impl LeaseSummary {
    pub fn from_calculation(calc: &LeaseCalculation) -> Self {
        let sign = calc.schedule.sign();
        LeaseSummary {
            lease_id: calc.lease_id,
            role: calc.schedule.role,
            from_date: calc.from_date,
            to_date: calc.to_date,
            initial_liability: calc.schedule.initial_liability * sign,
            initial_rou: calc.schedule.initial_rou * sign,
            opening_liability: calc.opening.lease_liability,
            closing_liability: calc.closing.lease_liability,
            current_liability: calc.split.current,
            non_current_liability: calc.split.non_current,
            opening_rou: calc.opening.rou_asset,
            closing_rou: calc.closing.rou_asset,
            interest: calc.activity.interest,
            depreciation: calc.activity.depreciation,
            impairment: calc.activity.impairment,
            rent_paid: calc.activity.rent_paid,
            aro_provision: calc.closing.aro_provision,
            security_deposit: calc.closing.security_deposit,
            gain_loss: calc.closing.gain_loss,
        }
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// calculate with no rate table
pub fn calculate_lease(terms: &LeaseTerms, options: &CalculationOptions) -> Result<LeaseCalculation> {
    LeaseCalculator::new(terms).calculate(options)
}
