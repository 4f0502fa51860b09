use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amortization::{AmortizedRow, AmortizedSchedule};
use crate::config::SplitMethod;
use crate::dates;
use crate::decimal::Money;
use crate::errors::Result;
use crate::reporting::split::split_liability;
use crate::types::ForcedEndKind;

/// unsigned liability and asset carried at the close of `date`; zero before
/// commencement and once a forced end has derecognised the lease
pub fn carrying_amounts(schedule: &AmortizedSchedule, date: NaiveDate) -> (Money, Money) {
    if schedule.is_derecognised_at(date) {
        return (Money::ZERO, Money::ZERO);
    }
    schedule
        .row_on_or_before(date)
        .map(|row| (row.closing_liability, row.closing_rou))
        .unwrap_or((Money::ZERO, Money::ZERO))
}

/// initial measurement on the commencement date, signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recognition {
    pub date: NaiveDate,
    pub lease_liability: Money,
    pub initial_direct_costs: Money,
    pub lease_incentives: Money,
    pub prepaid_payments: Money,
    pub rou_asset: Money,
}

/// removal of the lease on termination or modification, signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derecognition {
    pub date: NaiveDate,
    pub kind: ForcedEndKind,
    pub lease_liability: Money,
    pub rou_asset: Money,
    pub penalty: Money,
    /// positive is a gain
    pub gain_loss: Money,
}

impl Derecognition {
    pub fn for_schedule(schedule: &AmortizedSchedule) -> Option<Self> {
        let forced = schedule.forced_end?;
        let row = schedule.row_on_or_before(forced.date)?;
        let sign = schedule.sign();
        let liability = row.closing_liability;
        let rou = row.closing_rou;
        // the penalty belongs to a termination, not to a modification
        let penalty = match forced.kind {
            ForcedEndKind::Termination => schedule.termination_penalty,
            ForcedEndKind::Modification => Money::ZERO,
        };
        Some(Self {
            date: forced.date,
            kind: forced.kind,
            lease_liability: liability * sign,
            rou_asset: rou * sign,
            penalty: penalty * sign,
            gain_loss: (liability - rou - penalty) * sign,
        })
    }
}

/// movements over a half-open date range, signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodActivity {
    /// exclusive lower bound
    pub after: NaiveDate,
    /// inclusive upper bound
    pub up_to: NaiveDate,
    pub interest: Money,
    pub depreciation: Money,
    pub impairment: Money,
    pub rent_paid: Money,
    pub aro_interest: Money,
    pub deposit_interest: Money,
    pub aro_additions: Money,
    pub deposit_additions: Money,
    pub deposit_discounts: Money,
    pub recognition: Option<Recognition>,
    pub derecognition: Option<Derecognition>,
}

impl PeriodActivity {
    /// activity on rows dated in `(after, up_to]`
    pub fn between(schedule: &AmortizedSchedule, after: NaiveDate, up_to: NaiveDate) -> Self {
        let rows = schedule.rows_between(after, up_to);
        let sign = schedule.sign();
        let total = |f: fn(&AmortizedRow) -> Money| rows.iter().map(f).sum::<Money>() * sign;

        let start = schedule.lease_start_date;
        let recognition = (after < start && start <= up_to).then(|| Recognition {
            date: start,
            lease_liability: schedule.initial_liability * sign,
            initial_direct_costs: schedule.initial_direct_costs * sign,
            lease_incentives: schedule.lease_incentives * sign,
            prepaid_payments: schedule.prepaid_payments * sign,
            rou_asset: schedule.initial_rou * sign,
        });
        let derecognition = Derecognition::for_schedule(schedule)
            .filter(|d| after < d.date && d.date <= up_to);

        Self {
            after,
            up_to,
            interest: total(|r| r.interest),
            depreciation: total(|r| r.depreciation),
            impairment: total(|r| r.impairment),
            rent_paid: total(|r| r.rental),
            aro_interest: total(|r| r.aro_interest),
            deposit_interest: total(|r| r.deposit_interest),
            aro_additions: total(|r| r.aro_addition),
            deposit_additions: total(|r| r.deposit_addition),
            deposit_discounts: total(|r| r.deposit_discount),
            recognition,
            derecognition,
        }
    }

    /// activity for the inclusive window `[from, to]`
    pub fn for_window(schedule: &AmortizedSchedule, from: NaiveDate, to: NaiveDate) -> Self {
        Self::between(schedule, dates::day_before(from), to)
    }
}

/// balances at the close of a balance date, signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    pub balance_date: NaiveDate,
    pub lease_liability: Money,
    pub current_liability: Money,
    pub non_current_liability: Money,
    pub rou_asset: Money,
    pub cumulative_depreciation: Money,
    pub cumulative_impairment: Money,
    pub cumulative_interest: Money,
    pub cumulative_rent_paid: Money,
    pub cumulative_aro_interest: Money,
    pub cumulative_deposit_interest: Money,
    pub aro_provision: Money,
    pub security_deposit: Money,
    /// set once a termination or modification has been reached
    pub gain_loss: Option<Money>,
}

impl BalanceSnapshot {
    pub fn at(schedule: &AmortizedSchedule, date: NaiveDate, method: SplitMethod) -> Result<Self> {
        let sign = schedule.sign();
        let split = split_liability(schedule, date, method)?;
        let (_, rou) = carrying_amounts(schedule, date);
        let to_date = PeriodActivity::between(schedule, NaiveDate::MIN, date);
        let (aro_provision, security_deposit) = schedule
            .row_on_or_before(date)
            .map(|r| (r.aro_provision, r.security_deposit))
            .unwrap_or((Money::ZERO, Money::ZERO));
        let gain_loss = if schedule.is_derecognised_at(date) {
            Derecognition::for_schedule(schedule).map(|d| d.gain_loss)
        } else {
            None
        };

        Ok(Self {
            balance_date: date,
            lease_liability: split.total,
            current_liability: split.current,
            non_current_liability: split.non_current,
            rou_asset: rou * sign,
            cumulative_depreciation: to_date.depreciation,
            cumulative_impairment: to_date.impairment,
            cumulative_interest: to_date.interest,
            cumulative_rent_paid: to_date.rent_paid,
            cumulative_aro_interest: to_date.aro_interest,
            cumulative_deposit_interest: to_date.deposit_interest,
            aro_provision: aro_provision * sign,
            security_deposit: security_deposit * sign,
            gain_loss,
        })
    }

    /// position at the start of `from`, i.e. the close of the previous day
    pub fn opening(schedule: &AmortizedSchedule, from: NaiveDate, method: SplitMethod) -> Result<Self> {
        Self::at(schedule, dates::day_before(from), method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::amortize;
    use crate::config::LeaseTerms;
    use crate::decimal::Rate;
    use crate::interest::NoRates;
    use crate::schedule::generate;
    use crate::types::DayOfMonth;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn schedule(sublease: bool, termination: Option<NaiveDate>) -> AmortizedSchedule {
        let mut builder = LeaseTerms::builder()
            .start_date(d(2024, 1, 1))
            .first_payment_date(d(2024, 1, 31))
            .end_date(d(2026, 12, 31))
            .day_of_month(DayOfMonth::Last)
            .rental(Money::from_major(20_000))
            .borrowing_rate(Rate::from_percentage(7))
            .sublease(sublease);
        if let Some(date) = termination {
            builder = builder.termination(date, Money::from_major(5_000));
        }
        let terms = builder.build().unwrap();
        amortize(&terms, &generate(&terms).unwrap(), &NoRates).unwrap()
    }

    #[test]
    fn test_snapshot_before_commencement_is_empty() {
        let s = schedule(false, None);
        let snap = BalanceSnapshot::at(&s, d(2023, 12, 31), SplitMethod::Projection).unwrap();

        assert_eq!(snap.lease_liability, Money::ZERO);
        assert_eq!(snap.rou_asset, Money::ZERO);
        assert_eq!(snap.cumulative_rent_paid, Money::ZERO);
        assert_eq!(snap.gain_loss, None);
    }

    #[test]
    fn test_snapshot_between_rows_carries_forward() {
        let s = schedule(false, None);
        let mid = BalanceSnapshot::at(&s, d(2024, 3, 15), SplitMethod::Projection).unwrap();
        let feb = BalanceSnapshot::at(&s, d(2024, 2, 29), SplitMethod::Projection).unwrap();

        assert_eq!(mid.lease_liability, feb.lease_liability);
        assert_eq!(mid.rou_asset, feb.rou_asset);
        assert_eq!(mid.cumulative_rent_paid, Money::from_major(40_000));
    }

    #[test]
    fn test_cumulative_figures_reconcile() {
        let s = schedule(false, None);
        let snap = BalanceSnapshot::at(&s, d(2025, 6, 30), SplitMethod::Projection).unwrap();

        // liability roll-forward from initial measurement
        assert_eq!(
            snap.lease_liability,
            s.initial_liability + snap.cumulative_interest - snap.cumulative_rent_paid
        );
        assert_eq!(snap.rou_asset, s.initial_rou - snap.cumulative_depreciation);
        assert_eq!(snap.current_liability + snap.non_current_liability, snap.lease_liability);
    }

    #[test]
    fn test_derecognition_after_forced_end() {
        let s = schedule(false, Some(d(2025, 6, 15)));
        let before = BalanceSnapshot::at(&s, d(2025, 6, 14), SplitMethod::Projection).unwrap();
        let after = BalanceSnapshot::at(&s, d(2025, 6, 15), SplitMethod::Projection).unwrap();

        assert!(before.lease_liability.is_positive());
        assert_eq!(before.gain_loss, None);
        assert_eq!(after.lease_liability, Money::ZERO);
        assert_eq!(after.rou_asset, Money::ZERO);

        let row = s.row_on_or_before(d(2025, 6, 15)).unwrap();
        let expected = row.closing_liability - row.closing_rou - Money::from_major(5_000);
        assert_eq!(after.gain_loss, Some(expected));
    }

    #[test]
    fn test_modification_carries_no_termination_penalty() {
        let terms = LeaseTerms::builder()
            .start_date(d(2024, 1, 1))
            .first_payment_date(d(2024, 1, 31))
            .end_date(d(2028, 12, 31))
            .day_of_month(DayOfMonth::Last)
            .rental(Money::from_major(20_000))
            .borrowing_rate(Rate::from_percentage(7))
            .termination(d(2027, 6, 30), Money::from_major(50_000))
            .modification_date(d(2026, 3, 31))
            .build()
            .unwrap();
        let s = amortize(&terms, &generate(&terms).unwrap(), &NoRates).unwrap();

        let derecognition = Derecognition::for_schedule(&s).unwrap();
        assert_eq!(derecognition.kind, ForcedEndKind::Modification);
        assert_eq!(derecognition.date, d(2026, 3, 31));
        assert_eq!(derecognition.penalty, Money::ZERO);
        assert_eq!(
            derecognition.gain_loss,
            derecognition.lease_liability - derecognition.rou_asset
        );
    }

    #[test]
    fn test_sublease_flips_reported_figures() {
        let lease = schedule(false, None);
        let sublease = schedule(true, None);
        let date = d(2025, 3, 31);

        let a = BalanceSnapshot::at(&lease, date, SplitMethod::Projection).unwrap();
        let b = BalanceSnapshot::at(&sublease, date, SplitMethod::Projection).unwrap();

        assert_eq!(b.lease_liability, -a.lease_liability);
        assert_eq!(b.current_liability, -a.current_liability);
        assert_eq!(b.non_current_liability, -a.non_current_liability);
        assert_eq!(b.rou_asset, -a.rou_asset);
        assert_eq!(b.cumulative_rent_paid, -a.cumulative_rent_paid);
        assert_eq!(b.cumulative_interest, -a.cumulative_interest);
        // internal schedule untouched
        assert_eq!(lease.rows, sublease.rows);
    }

    #[test]
    fn test_window_activity_includes_recognition() {
        let s = schedule(false, None);
        let first_year = PeriodActivity::for_window(&s, d(2024, 1, 1), d(2024, 12, 31));
        let second_year = PeriodActivity::for_window(&s, d(2025, 1, 1), d(2025, 12, 31));

        assert_eq!(first_year.recognition.map(|r| r.lease_liability), Some(s.initial_liability));
        assert!(second_year.recognition.is_none());
        assert_eq!(first_year.rent_paid, Money::from_major(240_000));
        assert!(second_year.interest < first_year.interest);
    }
}
