use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{LeaseError, Result};

/// days in the compounding year
const DAYS_PER_YEAR: f64 = 365.0;

/// fractional-period compounding on an actual/365 day count.
///
/// A sub-period rate `r = annual * months / 12` compounds over
/// `n = (days / 365) * 12 / months` sub-periods, so uneven row spacing
/// produces proportionally smaller growth. Powers are evaluated in `f64`
/// to reproduce spreadsheet arithmetic; results are handed back as `Decimal`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompoundingEngine {
    pub annual_rate: Rate,
    pub compounding_months: u32,
    base: f64,
}

impl CompoundingEngine {
    pub fn new(annual_rate: Rate, compounding_months: u32) -> Result<Self> {
        if compounding_months == 0 {
            return Err(LeaseError::computation("compounding period must be at least one month"));
        }
        let period_rate = annual_rate.as_decimal() * Decimal::from(compounding_months) / Decimal::from(12);
        let base = (Decimal::ONE + period_rate)
            .to_f64()
            .ok_or_else(|| LeaseError::computation(format!("rate {annual_rate} cannot be evaluated")))?;
        if !base.is_finite() || base <= 0.0 {
            return Err(LeaseError::computation(format!(
                "non-positive compounding base {base} for annual rate {annual_rate}"
            )));
        }
        Ok(Self {
            annual_rate,
            compounding_months,
            base,
        })
    }

    /// monthly compounding, used by the retirement obligation and deposit tracks
    pub fn monthly(annual_rate: Rate) -> Result<Self> {
        Self::new(annual_rate, 1)
    }

    /// rate per compounding sub-period
    pub fn period_rate(&self) -> Rate {
        Rate::from_decimal(
            self.annual_rate.as_decimal() * Decimal::from(self.compounding_months) / Decimal::from(12),
        )
    }

    /// number of (fractional) sub-periods spanned by `days`
    pub fn periods(&self, days: i64) -> f64 {
        (days as f64 / DAYS_PER_YEAR) * 12.0 / self.compounding_months as f64
    }

    /// `(1 + r)^n` over `days`
    pub fn growth_factor(&self, days: i64) -> Result<Decimal> {
        self.factor(self.base.powf(self.periods(days)))
    }

    /// present value factor `1 / (1 + r)^n` over `days`
    pub fn discount_factor(&self, days: i64) -> Result<Decimal> {
        self.factor(1.0 / self.base.powf(self.periods(days)))
    }

    /// interest compounded on `balance` over `days`
    pub fn interest(&self, balance: Money, days: i64) -> Result<Money> {
        if days <= 0 {
            return Ok(Money::ZERO);
        }
        let growth = self.growth_factor(days)?;
        Ok(balance * (growth - Decimal::ONE))
    }

    /// `amount` discounted back over `days`
    pub fn present_value(&self, amount: Money, days: i64) -> Result<Money> {
        Ok(amount * self.discount_factor(days)?)
    }

    fn factor(&self, value: f64) -> Result<Decimal> {
        if !value.is_finite() || value <= 0.0 {
            return Err(LeaseError::computation(format!(
                "invalid compounding factor {value} at annual rate {}",
                self.annual_rate
            )));
        }
        Decimal::from_f64(value)
            .map(|d| d.round_dp(16))
            .ok_or_else(|| LeaseError::computation(format!("compounding factor {value} out of range")))
    }
}
