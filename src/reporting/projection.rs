use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::amortization::AmortizedSchedule;
use crate::config::ProjectionConfig;
use crate::dates;
use crate::decimal::Money;
use crate::errors::Result;
use crate::reporting::balance::{carrying_amounts, PeriodActivity};

/// balances at a future period end, signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionEntry {
    /// 1-based
    pub index: u32,
    pub date: NaiveDate,
    pub closing_liability: Money,
    pub closing_rou: Money,
    pub depreciation: Money,
    pub interest: Money,
    pub rent_paid: Money,
}

/// step forward from `balance_date` by whole period ends, reading balances off the schedule
pub fn project(
    schedule: &AmortizedSchedule,
    balance_date: NaiveDate,
    config: &ProjectionConfig,
) -> Result<Vec<ProjectionEntry>> {
    config.validate()?;
    if let Some(reason) = skip_reason(schedule, balance_date, config) {
        debug!(lease_id = %schedule.lease_id, date = %balance_date, reason, "projection skipped");
        return Ok(Vec::new());
    }

    let final_date = schedule.final_date();
    let sign = schedule.sign();
    let mut entries = Vec::with_capacity(config.periods as usize);
    let mut previous = balance_date;

    for index in 1..=config.periods {
        let mut cursor = dates::end_of_month(previous, config.period_months as i32)?;
        let last = cursor >= final_date;
        if last {
            cursor = final_date;
        }

        let (liability, rou) = carrying_amounts(schedule, cursor);
        let activity = PeriodActivity::between(schedule, previous, cursor);
        entries.push(ProjectionEntry {
            index,
            date: cursor,
            closing_liability: liability * sign,
            closing_rou: rou * sign,
            depreciation: activity.depreciation,
            interest: activity.interest,
            rent_paid: activity.rent_paid,
        });

        if last {
            break;
        }
        previous = cursor;
    }

    debug!(
        lease_id = %schedule.lease_id,
        date = %balance_date,
        entries = entries.len(),
        "projected future balances"
    );
    Ok(entries)
}

fn skip_reason(schedule: &AmortizedSchedule, balance_date: NaiveDate, config: &ProjectionConfig) -> Option<&'static str> {
    if !config.enabled || config.periods == 0 {
        return Some("disabled");
    }
    if schedule.is_derecognised_at(balance_date) {
        return Some("lease already terminated or modified");
    }
    if balance_date >= schedule.lease_end_date {
        return Some("balance date at or after lease end");
    }
    if schedule.final_date() <= balance_date {
        return Some("no schedule rows after the balance date");
    }
    None
}
