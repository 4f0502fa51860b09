use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::amortization::AmortizedSchedule;
use crate::config::{ProjectionConfig, SplitMethod};
use crate::dates;
use crate::decimal::Money;
use crate::errors::Result;
use crate::reporting::balance::carrying_amounts;
use crate::reporting::projection::project;

/// months ahead that count as current
const CURRENT_HORIZON_MONTHS: u32 = 12;

/// closing liability classified at a balance date, signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiabilitySplit {
    pub balance_date: NaiveDate,
    pub method: SplitMethod,
    pub total: Money,
    pub current: Money,
    pub non_current: Money,
}

/// classify the liability at `date`; recomputed on every call
pub fn split_liability(
    schedule: &AmortizedSchedule,
    date: NaiveDate,
    method: SplitMethod,
) -> Result<LiabilitySplit> {
    let (total, _) = carrying_amounts(schedule, date);
    let current = if total.is_positive() {
        match method {
            SplitMethod::Projection => discounted_within_horizon(schedule, date)?,
            SplitMethod::BalanceSheet => reduction_within_horizon(schedule, date, total)?,
        }
        .clamp(Money::ZERO, total)
    } else {
        Money::ZERO
    };

    let sign = schedule.sign();
    let total = total * sign;
    let current = current * sign;
    trace!(
        lease_id = %schedule.lease_id,
        date = %date,
        method = ?method,
        total = %total,
        current = %current,
        "split lease liability"
    );
    Ok(LiabilitySplit {
        balance_date: date,
        method,
        total,
        current,
        non_current: total - current,
    })
}

/// payments due within the horizon, rediscounted to the balance date
fn discounted_within_horizon(schedule: &AmortizedSchedule, date: NaiveDate) -> Result<Money> {
    let horizon = dates::edate(date, CURRENT_HORIZON_MONTHS as i32)?;
    let engine = schedule.engine()?;
    let at_balance_date =
        engine.discount_factor(dates::days_between(schedule.lease_start_date, date).max(0))?;

    Ok(schedule
        .rows_between(date, horizon)
        .iter()
        .filter(|r| r.is_payment())
        .map(|r| r.rental * (r.pv_factor / at_balance_date))
        .sum())
}

/// liability today less the liability projected twelve months ahead
fn reduction_within_horizon(schedule: &AmortizedSchedule, date: NaiveDate, total: Money) -> Result<Money> {
    let ahead = ProjectionConfig {
        enabled: true,
        periods: 1,
        period_months: CURRENT_HORIZON_MONTHS,
    };
    let projected = project(schedule, date, &ahead)?
        .first()
        .map(|entry| entry.closing_liability.abs())
        .unwrap_or(Money::ZERO);
    Ok((total.abs() - projected).max(Money::ZERO))
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
    use proptest::prelude::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn schedule(rate: Rate, sublease: bool) -> AmortizedSchedule {
        let terms = LeaseTerms::builder()
            .start_date(d(2024, 1, 1))
            .first_payment_date(d(2024, 1, 31))
            .end_date(d(2028, 12, 31))
            .day_of_month(DayOfMonth::Last)
            .rental(Money::from_major(10_000))
            .borrowing_rate(rate)
            .sublease(sublease)
            .build()
            .unwrap();
        amortize(&terms, &generate(&terms).unwrap(), &NoRates).unwrap()
    }

    #[test]
    fn test_zero_rate_current_is_next_twelve_payments() {
        let s = schedule(Rate::ZERO, false);
        let split = split_liability(&s, d(2024, 12, 31), SplitMethod::Projection).unwrap();

        assert_eq!(split.total, Money::from_major(480_000));
        assert_eq!(split.current, Money::from_major(120_000));
        assert_eq!(split.non_current, Money::from_major(360_000));
    }

    #[test]
    fn test_methods_agree_without_interest() {
        let s = schedule(Rate::ZERO, false);
        let projection = split_liability(&s, d(2025, 12, 31), SplitMethod::Projection).unwrap();
        let balance_sheet = split_liability(&s, d(2025, 12, 31), SplitMethod::BalanceSheet).unwrap();

        assert_eq!(projection.current, balance_sheet.current);
        assert_eq!(projection.total, balance_sheet.total);
    }

    #[test]
    fn test_final_year_is_all_current() {
        let s = schedule(Rate::from_percentage(8), false);
        for method in [SplitMethod::Projection, SplitMethod::BalanceSheet] {
            let split = split_liability(&s, d(2028, 3, 31), method).unwrap();
            assert!(split.total.is_positive());
            assert!(split.non_current.approx_eq(Money::ZERO, Money::CENT));
        }
    }

    #[test]
    fn test_sublease_split_is_negated() {
        let lease = split_liability(&schedule(Rate::from_percentage(8), false), d(2025, 6, 30), SplitMethod::Projection).unwrap();
        let sublease = split_liability(&schedule(Rate::from_percentage(8), true), d(2025, 6, 30), SplitMethod::Projection).unwrap();

        assert_eq!(sublease.total, -lease.total);
        assert_eq!(sublease.current, -lease.current);
        assert_eq!(sublease.non_current, -lease.non_current);
    }

    #[test]
    fn test_no_liability_before_commencement() {
        let s = schedule(Rate::from_percentage(8), false);
        let split = split_liability(&s, d(2023, 6, 30), SplitMethod::BalanceSheet).unwrap();
        assert_eq!(split.total, Money::ZERO);
        assert_eq!(split.current, Money::ZERO);
    }

    proptest! {
        #[test]
        fn prop_current_plus_non_current_is_total(
            offset_days in 0i64..1_900,
            rate_bps in 0u32..2_000,
            sublease in any::<bool>(),
            balance_sheet in any::<bool>(),
        ) {
            let s = schedule(Rate::from_bps(rate_bps), sublease);
            let date = d(2024, 1, 1) + chrono::Duration::days(offset_days);
            let method = if balance_sheet { SplitMethod::BalanceSheet } else { SplitMethod::Projection };
            let split = split_liability(&s, date, method).unwrap();

            prop_assert_eq!(split.current + split.non_current, split.total);
            prop_assert!(split.current.abs() <= split.total.abs());
        }
    }
}
