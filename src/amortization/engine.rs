use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::amortization::tracks::{build_tracks, Layer};
use crate::config::LeaseTerms;
use crate::dates;
use crate::decimal::{Money, Rate};
use crate::errors::{LeaseError, Result};
use crate::interest::{CompoundingEngine, RateProvider};
use crate::schedule::{RowSchedule, ScheduleRow};
use crate::types::{ForcedEnd, LeaseId, LeaseRole, RowKind};

/// schedule row annotated with liability, asset and side-track balances
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizedRow {
    pub date: NaiveDate,
    pub kind: RowKind,
    pub rental: Money,
    /// days since the previous row (0 on the opening row)
    pub days: i64,
    pub pv_factor: Decimal,
    pub opening_liability: Money,
    pub interest: Money,
    pub principal: Money,
    pub closing_liability: Money,
    pub opening_rou: Money,
    pub depreciation: Money,
    pub impairment: Money,
    pub rou_addition: Money,
    pub closing_rou: Money,
    pub aro_addition: Money,
    pub aro_interest: Money,
    pub aro_provision: Money,
    pub deposit_addition: Money,
    pub deposit_discount: Money,
    pub deposit_interest: Money,
    pub security_deposit: Money,
}

impl AmortizedRow {
    pub fn is_payment(&self) -> bool {
        !self.rental.is_zero()
    }
}

/// fully amortized lease; figures are unsigned, the role sign is applied when reporting
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizedSchedule {
    pub lease_id: LeaseId,
    pub role: LeaseRole,
    pub lease_start_date: NaiveDate,
    pub lease_end_date: NaiveDate,
    pub end_of_life: NaiveDate,
    pub forced_end: Option<ForcedEnd>,
    pub borrowing_rate: Rate,
    pub compounding_months: u32,
    pub initial_liability: Money,
    pub initial_rou: Money,
    pub initial_direct_costs: Money,
    pub lease_incentives: Money,
    pub prepaid_payments: Money,
    pub termination_penalty: Money,
    pub rows: Vec<AmortizedRow>,
    pub truncated_payments: Vec<ScheduleRow>,
    pub layers: Vec<Layer>,
}

impl AmortizedSchedule {
    pub fn sign(&self) -> Decimal {
        self.role.sign()
    }

    pub fn engine(&self) -> Result<CompoundingEngine> {
        CompoundingEngine::new(self.borrowing_rate, self.compounding_months)
    }

    /// last date of the visible timeline (lease end, or the forced end)
    pub fn final_date(&self) -> NaiveDate {
        self.rows.last().map(|r| r.date).unwrap_or(self.lease_end_date)
    }

    pub fn index_on_or_before(&self, date: NaiveDate) -> Option<usize> {
        self.rows.partition_point(|r| r.date <= date).checked_sub(1)
    }

    /// row in force on `date`, carrying the previous row forward when none falls on it
    pub fn row_on_or_before(&self, date: NaiveDate) -> Option<&AmortizedRow> {
        self.index_on_or_before(date).map(|idx| &self.rows[idx])
    }

    /// rows dated in `(after, up_to]`
    pub fn rows_between(&self, after: NaiveDate, up_to: NaiveDate) -> &[AmortizedRow] {
        let lo = self.rows.partition_point(|r| r.date <= after);
        let hi = self.rows.partition_point(|r| r.date <= up_to);
        if lo >= hi {
            &[]
        } else {
            &self.rows[lo..hi]
        }
    }

    /// true once a termination or modification has taken the lease off the books
    pub fn is_derecognised_at(&self, date: NaiveDate) -> bool {
        self.forced_end.map(|f| date >= f.date).unwrap_or(false)
    }

    pub fn terminal_liability(&self) -> Money {
        self.rows.last().map(|r| r.closing_liability).unwrap_or(Money::ZERO)
    }

    /// liability reduction plus everything capitalised into the asset
    pub fn total_rou_recognised(&self) -> Money {
        self.initial_rou + self.rows.iter().map(|r| r.rou_addition).sum::<Money>()
    }
}

/// annotates the row timeline with liability, asset and side-track balances
pub struct AmortizationEngine<'a> {
    terms: &'a LeaseTerms,
    rates: &'a dyn RateProvider,
}

impl<'a> AmortizationEngine<'a> {
    pub fn new(terms: &'a LeaseTerms, rates: &'a dyn RateProvider) -> Self {
        Self { terms, rates }
    }

    pub fn amortize(&self, schedule: &RowSchedule) -> Result<AmortizedSchedule> {
        let terms = self.terms;
        let start = schedule
            .rows
            .first()
            .map(|r| r.date)
            .ok_or_else(|| LeaseError::computation("row schedule is empty"))?;
        let engine = CompoundingEngine::new(terms.borrowing_rate, terms.compounding_months())?;

        // single upfront measurement over every payment, truncated ones included
        let mut initial_liability = Money::ZERO;
        for payment in schedule.measured_payments() {
            let factor = engine.discount_factor(dates::days_between(start, payment.date))?;
            initial_liability += payment.rental * factor;
        }
        let initial_rou = initial_liability + terms.initial_direct_costs - terms.lease_incentives
            + schedule.prepaid_payments;

        let row_dates: Vec<NaiveDate> = schedule.rows.iter().map(|r| r.date).collect();
        let tracks = build_tracks(terms, &row_dates, self.rates)?;
        let impairments = self.impairments_by_row(&row_dates);
        let end_of_life = terms.end_of_life();

        let mut rows = Vec::with_capacity(schedule.rows.len());
        let mut prev_date = start;
        let mut liability = initial_liability;
        let mut rou = initial_rou;

        for (idx, row) in schedule.rows.iter().enumerate() {
            let days = dates::days_between(prev_date, row.date);
            let pv_factor = engine.discount_factor(dates::days_between(start, row.date))?;

            let opening_liability = liability;
            let interest = engine.interest(opening_liability, days)?;
            let closing_liability = opening_liability - row.rental + interest;

            let track = tracks.rows[idx];
            let opening_rou = rou;
            let rou_addition = track.rou_addition();
            let impairment = impairments[idx].min(opening_rou.max(Money::ZERO));
            let depreciation = depreciation_for(
                opening_rou - impairment,
                rou_addition,
                prev_date,
                row.date,
                end_of_life,
            );
            let closing_rou = opening_rou - depreciation - impairment + rou_addition;

            rows.push(AmortizedRow {
                date: row.date,
                kind: row.kind,
                rental: row.rental,
                days,
                pv_factor,
                opening_liability,
                interest,
                principal: row.rental - interest,
                closing_liability,
                opening_rou,
                depreciation,
                impairment,
                rou_addition,
                closing_rou,
                aro_addition: track.aro_addition,
                aro_interest: track.aro_interest,
                aro_provision: track.aro_provision,
                deposit_addition: track.deposit_addition,
                deposit_discount: track.deposit_discount,
                deposit_interest: track.deposit_interest,
                security_deposit: track.security_deposit,
            });

            prev_date = row.date;
            liability = closing_liability;
            rou = closing_rou;
        }

        let amortized = AmortizedSchedule {
            lease_id: terms.lease_id,
            role: terms.role,
            lease_start_date: terms.lease_start_date,
            lease_end_date: terms.lease_end_date,
            end_of_life,
            forced_end: schedule.forced_end,
            borrowing_rate: terms.borrowing_rate,
            compounding_months: terms.compounding_months(),
            initial_liability,
            initial_rou,
            initial_direct_costs: terms.initial_direct_costs,
            lease_incentives: terms.lease_incentives,
            prepaid_payments: schedule.prepaid_payments,
            termination_penalty: terms.termination_penalty,
            rows,
            truncated_payments: schedule.truncated_payments.clone(),
            layers: tracks.layers,
        };

        let terminal = amortized.terminal_liability();
        if schedule.truncated_payments.is_empty() && !terminal.approx_eq(Money::ZERO, Money::CENT) {
            warn!(
                lease_id = %terms.lease_id,
                terminal = %terminal,
                "lease liability did not amortize to zero"
            );
        }
        debug!(
            lease_id = %terms.lease_id,
            rows = amortized.rows.len(),
            initial_liability = %initial_liability,
            initial_rou = %initial_rou,
            "amortized lease schedule"
        );
        Ok(amortized)
    }

    /// impairment charges keyed to the first row on or after their date
    fn impairments_by_row(&self, row_dates: &[NaiveDate]) -> Vec<Money> {
        let mut charges = vec![Money::ZERO; row_dates.len()];
        for impairment in &self.terms.impairments {
            let idx = row_dates.partition_point(|d| *d < impairment.date);
            match charges.get_mut(idx) {
                Some(charge) => *charge += impairment.amount,
                None => warn!(
                    lease_id = %self.terms.lease_id,
                    date = %impairment.date,
                    "impairment dated after the final schedule row is ignored"
                ),
            }
        }
        charges
    }
}

/// straight-line depreciation by elapsed days toward `end_of_life`.
///
/// The row reaching the end of life takes the whole remaining balance.
fn depreciation_for(
    base: Money,
    addition: Money,
    prev_date: NaiveDate,
    date: NaiveDate,
    end_of_life: NaiveDate,
) -> Money {
    if date >= end_of_life {
        return (base + addition).max(Money::ZERO);
    }
    let remaining = dates::days_between(prev_date, end_of_life);
    let days = dates::days_between(prev_date, date);
    if remaining <= 0 || days <= 0 || !base.is_positive() {
        return Money::ZERO;
    }
    let charge = base * (Decimal::from(days) / Decimal::from(remaining));
    charge.clamp(Money::ZERO, base)
}

/// amortize a generated row schedule
pub fn amortize(
    terms: &LeaseTerms,
    schedule: &RowSchedule,
    rates: &dyn RateProvider,
) -> Result<AmortizedSchedule> {
    AmortizationEngine::new(terms, rates).amortize(schedule)
}
