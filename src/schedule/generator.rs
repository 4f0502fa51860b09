use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, warn};

use crate::config::LeaseTerms;
use crate::dates;
use crate::decimal::Money;
use crate::errors::{LeaseError, Result};
use crate::schedule::escalation::EscalationSchedule;
use crate::schedule::row::{RowSchedule, ScheduleRow};
use crate::types::RowKind;

/// builds the row timeline from lease terms
pub struct ScheduleGenerator<'a> {
    terms: &'a LeaseTerms,
    rentals: EscalationSchedule,
}

impl<'a> ScheduleGenerator<'a> {
    pub fn new(terms: &'a LeaseTerms) -> Self {
        Self {
            terms,
            rentals: EscalationSchedule::from_terms(terms),
        }
    }

    pub fn generate(&self) -> Result<RowSchedule> {
        self.terms.validate()?;
        let terms = self.terms;
        let start = terms.lease_start_date;
        let end = terms.lease_end_date;

        let mut rows: BTreeMap<NaiveDate, ScheduleRow> = BTreeMap::new();
        rows.insert(
            start,
            ScheduleRow {
                date: start,
                rental: Money::ZERO,
                kind: RowKind::Opening,
            },
        );

        // payments before commencement are prepaid, not part of the liability
        let mut prepaid = Money::ZERO;
        for (date, kind) in self.payment_dates()? {
            let rental = self.rentals.rental_for_period(date, terms.frequency_months)?;
            if date < start {
                prepaid += rental;
                continue;
            }
            rows.entry(date)
                .and_modify(|row| row.rental += rental)
                .or_insert(ScheduleRow { date, rental, kind });
        }

        for index in dates::month_index(start)..=dates::month_index(end) {
            let month_end = dates::month_end(index)?;
            if month_end > start && month_end <= end {
                rows.entry(month_end).or_insert(ScheduleRow {
                    date: month_end,
                    rental: Money::ZERO,
                    kind: RowKind::MonthEndAccrual,
                });
            }
        }
        rows.entry(end).or_insert(ScheduleRow {
            date: end,
            rental: Money::ZERO,
            kind: RowKind::Closing,
        });

        for adjustment in &terms.rental_overrides {
            match rows.get_mut(&adjustment.date) {
                Some(row) => row.rental = adjustment.amount,
                None => {
                    return Err(LeaseError::invalid_terms(format!(
                        "rental override dated {} does not match a schedule row",
                        adjustment.date
                    )))
                }
            }
        }

        if let Some(price) = terms.purchase_option_price {
            if let Some(row) = rows.get_mut(&end) {
                row.rental += price;
            }
        }

        let mut truncated_payments = Vec::new();
        let forced_end = terms.forced_end();
        if let Some(forced) = forced_end.filter(|f| f.date < end) {
            let cut = rows.split_off(&(forced.date + chrono::Duration::days(1)));
            truncated_payments = cut.into_values().filter(|r| r.is_payment()).collect();
            rows.entry(forced.date).or_insert(ScheduleRow {
                date: forced.date,
                rental: Money::ZERO,
                kind: RowKind::Closing,
            });
            debug!(
                lease_id = %terms.lease_id,
                forced_end = %forced.date,
                kind = ?forced.kind,
                truncated = truncated_payments.len(),
                "schedule truncated at forced end"
            );
        }

        let schedule = RowSchedule {
            lease_id: terms.lease_id,
            rows: rows.into_values().collect(),
            truncated_payments,
            prepaid_payments: prepaid,
            lease_end_date: end,
            forced_end,
        };

        if schedule.payment_rows().next().is_none() && schedule.truncated_payments.is_empty() {
            warn!(lease_id = %terms.lease_id, "lease has no payments after commencement");
        }
        debug!(
            lease_id = %terms.lease_id,
            rows = schedule.len(),
            payments = schedule.payment_rows().count(),
            total_rental = %schedule.total_rental(),
            prepaid = %schedule.prepaid_payments,
            "generated schedule rows"
        );
        Ok(schedule)
    }

    /// first payment plus the frequency grid, up to the lease end
    fn payment_dates(&self) -> Result<Vec<(NaiveDate, RowKind)>> {
        let terms = self.terms;
        let first = terms.first_payment_date;
        let first_kind = if first == terms.lease_start_date {
            RowKind::Opening
        } else {
            RowKind::FirstPayment
        };
        let mut payments = vec![(first, first_kind)];

        let first_month = dates::month_index(first);
        let step = i32::try_from(terms.frequency_months).map_err(|_| {
            LeaseError::invalid_terms(format!("payment frequency {} is out of range", terms.frequency_months))
        })?;
        for k in 1.. {
            let index = first_month + k * step;
            let month_start = dates::date_in_month(index, 1)?;
            let day = terms.day_of_month.day_in(month_start.year(), month_start.month());
            let date = dates::date_in_month(index, day)?;
            if date > terms.lease_end_date {
                break;
            }
            payments.push((date, RowKind::RegularPayment));
        }
        Ok(payments)
    }
}

/// generate the row timeline for `terms`
pub fn generate(terms: &LeaseTerms) -> Result<RowSchedule> {
    ScheduleGenerator::new(terms).generate()
}
