use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dates;

/// unique identifier for a lease
pub type LeaseId = Uuid;

/// day of the month on which regular payments fall
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayOfMonth {
    /// fixed calendar day, clamped to the month length
    Day(u32),
    /// last calendar day of the month
    Last,
}

impl DayOfMonth {
    /// rule implied by a payment date: month-end dates map to `Last`
    pub fn from_date(date: NaiveDate) -> Self {
        if dates::is_month_end(date) {
            DayOfMonth::Last
        } else {
            DayOfMonth::Day(date.day())
        }
    }

    /// payment day within the given month.
    ///
    /// February payments are checked against day 28 first, so in leap years
    /// the payment lands on the 28th and the 29th stays an accrual-only date.
    pub fn day_in(&self, year: i32, month: u32) -> u32 {
        let requested = match self {
            DayOfMonth::Day(day) => *day,
            DayOfMonth::Last => 31,
        };
        let cap = if month == 2 { 28 } else { dates::days_in_month(year, month) };
        requested.min(cap)
    }
}

/// why a schedule row exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RowKind {
    /// commencement; PV reference point
    Opening,
    /// first payment when it differs from the commencement date
    FirstPayment,
    /// payment on the frequency grid
    RegularPayment,
    /// zero-rental month-end row for accrual bookkeeping
    MonthEndAccrual,
    /// lease end or forced end with no other row on that date
    Closing,
}

/// what cut the lease short
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForcedEndKind {
    Termination,
    Modification,
}

/// earliest of termination and modification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForcedEnd {
    pub date: NaiveDate,
    pub kind: ForcedEndKind,
}

/// lessee or lessor side of the arrangement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LeaseRole {
    Lessee,
    /// head lessee acting as intermediate lessor; every reported figure is negated
    Sublease,
}

impl LeaseRole {
    /// sign multiplier applied at reporting time
    pub fn sign(&self) -> rust_decimal::Decimal {
        match self {
            LeaseRole::Lessee => rust_decimal::Decimal::ONE,
            LeaseRole::Sublease => rust_decimal::Decimal::NEGATIVE_ONE,
        }
    }
}

/// chart of accounts used by the journal
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Account {
    LeaseLiabilityNonCurrent,
    LeaseLiabilityCurrent,
    RouAsset,
    InterestCost,
    Depreciation,
    Impairment,
    RentPaid,
    AroInterest,
    SecurityDepositInterest,
    AroProvision,
    SecurityDeposit,
    Cash,
    GainLoss,
}

impl Account {
    /// ledger code, where the chart assigns one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Account::LeaseLiabilityNonCurrent => Some("2101"),
            Account::LeaseLiabilityCurrent => Some("2102"),
            Account::RouAsset => Some("1200"),
            Account::InterestCost => Some("5101"),
            Account::Depreciation => Some("5102"),
            Account::RentPaid => Some("5103"),
            Account::AroInterest => Some("5104"),
            Account::SecurityDepositInterest => Some("5105"),
            Account::AroProvision => Some("2201"),
            Account::SecurityDeposit => Some("1201"),
            Account::GainLoss => Some("5200"),
            Account::Impairment | Account::Cash => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Account::LeaseLiabilityNonCurrent => "Lease Liability Non-current",
            Account::LeaseLiabilityCurrent => "Lease Liability Current",
            Account::RouAsset => "RoU Asset",
            Account::InterestCost => "Interest Cost",
            Account::Depreciation => "Depreciation",
            Account::Impairment => "Impairment",
            Account::RentPaid => "Rent Paid",
            Account::AroInterest => "ARO Interest",
            Account::SecurityDepositInterest => "Interest on Security Deposit",
            Account::AroProvision => "ARO Provision",
            Account::SecurityDeposit => "Security Deposit",
            Account::Cash => "Cash",
            Account::GainLoss => "(Gain)/Loss",
        }
    }
}

/// debit or credit side of a journal line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    pub fn opposite(&self) -> Side {
        match self {
            Side::Debit => Side::Credit,
            Side::Credit => Side::Debit,
        }
    }
}
