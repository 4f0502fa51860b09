use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{ForcedEnd, LeaseId, RowKind};

/// one dated line of the calculation timeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub date: NaiveDate,
    pub rental: Money,
    pub kind: RowKind,
}

impl ScheduleRow {
    pub fn is_payment(&self) -> bool {
        !self.rental.is_zero()
    }
}

/// ordered row timeline for one lease
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowSchedule {
    pub lease_id: LeaseId,
    /// strictly increasing dates, starting at the lease start
    pub rows: Vec<ScheduleRow>,
    /// payments cut off by a forced end; they only enter the liability measurement
    pub truncated_payments: Vec<ScheduleRow>,
    /// payments made before commencement
    pub prepaid_payments: Money,
    pub lease_end_date: NaiveDate,
    pub forced_end: Option<ForcedEnd>,
}

impl RowSchedule {
    /// last date of the visible timeline
    pub fn final_date(&self) -> NaiveDate {
        self.rows.last().map(|r| r.date).unwrap_or(self.lease_end_date)
    }

    pub fn payment_rows(&self) -> impl Iterator<Item = &ScheduleRow> {
        self.rows.iter().filter(|r| r.is_payment())
    }

    /// every payment measured in the liability, visible or truncated
    pub fn measured_payments(&self) -> impl Iterator<Item = &ScheduleRow> {
        self.payment_rows().chain(self.truncated_payments.iter())
    }

    pub fn total_rental(&self) -> Money {
        self.payment_rows().map(|r| r.rental).sum()
    }

    pub fn row_at(&self, date: NaiveDate) -> Option<&ScheduleRow> {
        self.rows
            .binary_search_by_key(&date, |r| r.date)
            .ok()
            .map(|idx| &self.rows[idx])
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
