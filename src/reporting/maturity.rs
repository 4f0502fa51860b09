use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::amortization::AmortizedSchedule;
use crate::dates;
use crate::decimal::Money;
use crate::errors::Result;
use crate::reporting::balance::carrying_amounts;

/// contractual maturity window, measured from the balance date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaturityBucket {
    WithinOneYear,
    OneToTwoYears,
    TwoToFiveYears,
    AfterFiveYears,
}

impl MaturityBucket {
    pub const ALL: [MaturityBucket; 4] = [
        MaturityBucket::WithinOneYear,
        MaturityBucket::OneToTwoYears,
        MaturityBucket::TwoToFiveYears,
        MaturityBucket::AfterFiveYears,
    ];

    /// months from the balance date to the window's inclusive end, `None` when open-ended
    fn upper_months(&self) -> Option<i32> {
        match self {
            MaturityBucket::WithinOneYear => Some(12),
            MaturityBucket::OneToTwoYears => Some(24),
            MaturityBucket::TwoToFiveYears => Some(60),
            MaturityBucket::AfterFiveYears => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityBand {
    pub bucket: MaturityBucket,
    /// exclusive
    pub after: NaiveDate,
    /// inclusive, open-ended for the last band
    pub up_to: Option<NaiveDate>,
    pub undiscounted: Money,
}

/// undiscounted payments still due, reconciled to the carried liability; signed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaturityAnalysis {
    pub balance_date: NaiveDate,
    pub bands: Vec<MaturityBand>,
    pub undiscounted_total: Money,
    pub lease_liability: Money,
    /// interest still to be charged on the liability
    pub finance_charge: Money,
}

pub fn maturity_analysis(schedule: &AmortizedSchedule, balance_date: NaiveDate) -> Result<MaturityAnalysis> {
    let sign = schedule.sign();
    let derecognised = schedule.is_derecognised_at(balance_date);
    let mut bands = Vec::with_capacity(MaturityBucket::ALL.len());
    let mut after = balance_date;

    for bucket in MaturityBucket::ALL {
        let up_to = bucket
            .upper_months()
            .map(|months| dates::edate(balance_date, months))
            .transpose()?;
        let undiscounted = if derecognised {
            Money::ZERO
        } else {
            let up_to = up_to.unwrap_or(NaiveDate::MAX);
            // payments cut off by a later forced end are still in the carried liability
            let visible = schedule
                .rows_between(after, up_to)
                .iter()
                .filter(|r| r.is_payment())
                .map(|r| r.rental);
            let truncated = schedule
                .truncated_payments
                .iter()
                .filter(|r| after < r.date && r.date <= up_to)
                .map(|r| r.rental);
            visible.chain(truncated).sum::<Money>()
        };
        bands.push(MaturityBand {
            bucket,
            after,
            up_to,
            undiscounted: undiscounted * sign,
        });
        if let Some(end) = up_to {
            after = end;
        }
    }

    let undiscounted_total: Money = bands.iter().map(|b| b.undiscounted).sum();
    let lease_liability = carrying_amounts(schedule, balance_date).0 * sign;
    Ok(MaturityAnalysis {
        balance_date,
        bands,
        undiscounted_total,
        lease_liability,
        finance_charge: undiscounted_total - lease_liability,
    })
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
        schedule_ending(rate, sublease, None)
    }

    fn schedule_ending(rate: Rate, sublease: bool, termination: Option<NaiveDate>) -> AmortizedSchedule {
        let mut builder = LeaseTerms::builder()
            .start_date(d(2024, 1, 1))
            .first_payment_date(d(2024, 1, 31))
            .end_date(d(2030, 12, 31))
            .day_of_month(DayOfMonth::Last)
            .rental(Money::from_major(1_000))
            .borrowing_rate(rate)
            .sublease(sublease);
        if let Some(date) = termination {
            builder = builder.termination(date, Money::ZERO);
        }
        let terms = builder.build().unwrap();
        amortize(&terms, &generate(&terms).unwrap(), &NoRates).unwrap()
    }

    fn band(analysis: &MaturityAnalysis, bucket: MaturityBucket) -> Money {
        analysis.bands.iter().find(|b| b.bucket == bucket).unwrap().undiscounted
    }

    #[test]
    fn test_payments_fall_into_windows() {
        let analysis = maturity_analysis(&schedule(Rate::from_percentage(6), false), d(2023, 12, 31)).unwrap();

        assert_eq!(band(&analysis, MaturityBucket::WithinOneYear), Money::from_major(12_000));
        assert_eq!(band(&analysis, MaturityBucket::OneToTwoYears), Money::from_major(12_000));
        assert_eq!(band(&analysis, MaturityBucket::TwoToFiveYears), Money::from_major(36_000));
        assert_eq!(band(&analysis, MaturityBucket::AfterFiveYears), Money::from_major(24_000));
        assert_eq!(analysis.undiscounted_total, Money::from_major(84_000));
    }

    #[test]
    fn test_finance_charge_reconciles_to_liability() {
        let s = schedule(Rate::from_percentage(6), false);
        let analysis = maturity_analysis(&s, d(2026, 6, 30)).unwrap();

        assert_eq!(analysis.lease_liability, carrying_amounts(&s, d(2026, 6, 30)).0);
        assert!(analysis.finance_charge.is_positive());
        assert_eq!(analysis.undiscounted_total, Money::from_major(54_000));
    }

    #[test]
    fn test_zero_rate_has_no_finance_charge() {
        let analysis = maturity_analysis(&schedule(Rate::ZERO, false), d(2025, 12, 31)).unwrap();
        assert_eq!(analysis.finance_charge, Money::ZERO);
    }

    #[test]
    fn test_sublease_analysis_is_negated() {
        let lease = maturity_analysis(&schedule(Rate::from_percentage(6), false), d(2025, 3, 31)).unwrap();
        let sublease = maturity_analysis(&schedule(Rate::from_percentage(6), true), d(2025, 3, 31)).unwrap();

        assert_eq!(sublease.undiscounted_total, -lease.undiscounted_total);
        assert_eq!(sublease.finance_charge, -lease.finance_charge);
    }

    #[test]
    fn test_pending_termination_keeps_cut_off_payments() {
        let s = schedule_ending(Rate::from_percentage(6), false, Some(d(2026, 6, 15)));
        let analysis = maturity_analysis(&s, d(2026, 3, 31)).unwrap();

        // apr 2026 through dec 2030, the same payments the carried liability discounts
        assert_eq!(analysis.undiscounted_total, Money::from_major(57_000));
        assert_eq!(analysis.lease_liability, carrying_amounts(&s, d(2026, 3, 31)).0);
        assert!(analysis.finance_charge.is_positive());
        assert!(analysis.finance_charge < analysis.undiscounted_total);

        let after = maturity_analysis(&s, d(2026, 6, 15)).unwrap();
        assert_eq!(after.undiscounted_total, Money::ZERO);
        assert_eq!(after.finance_charge, Money::ZERO);
    }

    proptest! {
        #[test]
        fn prop_finance_charge_is_never_negative(
            offset_days in 0i64..2_600,
            termination_days in proptest::option::of(30i64..2_500),
            rate_bps in 0u32..1_500,
        ) {
            let termination = termination_days.map(|days| d(2024, 1, 1) + chrono::Duration::days(days));
            let s = schedule_ending(Rate::from_bps(rate_bps), false, termination);
            let date = d(2024, 1, 1) + chrono::Duration::days(offset_days);
            let analysis = maturity_analysis(&s, date).unwrap();

            prop_assert!(analysis.finance_charge >= -Money::CENT);
            prop_assert!(analysis.lease_liability <= analysis.undiscounted_total + Money::CENT);
        }
    }
}
