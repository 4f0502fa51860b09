use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::{Escalation, LeaseTerms};
use crate::dates;
use crate::decimal::Money;
use crate::errors::Result;

/// rental in force on a date, after escalation
#[derive(Debug, Clone, Copy)]
pub struct EscalationSchedule {
    base: Money,
    escalation: Option<Escalation>,
}

impl EscalationSchedule {
    pub fn new(base: Money, escalation: Option<Escalation>) -> Self {
        Self { base, escalation }
    }

    pub fn from_terms(terms: &LeaseTerms) -> Self {
        Self::new(terms.rental, terms.escalation)
    }

    /// number of increases applied by `date`.
    ///
    /// The first increase takes effect on the escalation start date and one
    /// more follows every `frequency_months` whole months after it.
    pub fn steps_at(&self, date: NaiveDate) -> u32 {
        match &self.escalation {
            Some(esc) if !esc.rate.is_zero() && date >= esc.start_date => {
                1 + dates::whole_months_between(esc.start_date, date) / esc.frequency_months.max(1)
            }
            _ => 0,
        }
    }

    pub fn rental_on(&self, date: NaiveDate) -> Money {
        match &self.escalation {
            Some(esc) => self.base.compound(esc.rate.as_decimal(), self.steps_at(date)),
            None => self.base,
        }
    }

    /// date the `step`-th increase takes effect (1-based)
    fn step_date(esc: &Escalation, step: u32) -> Result<NaiveDate> {
        let months = (step.saturating_sub(1)).saturating_mul(esc.frequency_months.max(1));
        dates::edate(esc.start_date, i32::try_from(months).unwrap_or(i32::MAX))
    }

    /// rental for the payment made in `date`'s month.
    ///
    /// The payment covers `period_months` calendar months from the first of
    /// that month. An increase taking effect inside the period is blended in
    /// by days, old rental before it and new rental after it.
    pub fn rental_for_period(&self, date: NaiveDate, period_months: u32) -> Result<Money> {
        let esc = match &self.escalation {
            Some(esc) if !esc.rate.is_zero() => esc,
            _ => return Ok(self.base),
        };
        let month = dates::month_index(date);
        let start = dates::date_in_month(month, 1)?;
        let end = dates::date_in_month(month + period_months.max(1) as i32, 1)?;

        let mut steps = self.steps_at(start);
        let mut boundaries = Vec::new();
        loop {
            let next = Self::step_date(esc, steps + 1)?;
            if next >= end {
                break;
            }
            if next > start {
                boundaries.push(next);
            }
            steps += 1;
        }
        if boundaries.is_empty() {
            return Ok(self.rental_on(start));
        }

        let total = Decimal::from(dates::days_between(start, end));
        let mut rental = Money::ZERO;
        let mut from = start;
        for to in boundaries.into_iter().chain(std::iter::once(end)) {
            let days = Decimal::from(dates::days_between(from, to));
            rental += self.rental_on(from) * (days / total);
            from = to;
        }
        Ok(rental)
    }
}
