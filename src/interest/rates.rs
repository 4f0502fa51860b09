use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LeaseError, Result};

/// read-only source of discount rates keyed by date (e.g. a risk-free rate table)
pub trait RateProvider: Send + Sync {
    fn rate_for(&self, date: NaiveDate) -> Result<Rate>;
}

/// same rate for every date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlatRate(pub Rate);

impl RateProvider for FlatRate {
    fn rate_for(&self, _date: NaiveDate) -> Result<Rate> {
        Ok(self.0)
    }
}

/// provider used when the caller injects none; every lookup fails
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRates;

impl RateProvider for NoRates {
    fn rate_for(&self, date: NaiveDate) -> Result<Rate> {
        Err(LeaseError::RateLookup {
            date,
            message: "no rate provider configured".to_string(),
        })
    }
}

/// one effective-dated rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateEntry {
    pub effective_date: NaiveDate,
    pub rate: Rate,
}

/// effective-dated rate table; a lookup returns the latest entry on or before the date
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateTable {
    entries: Vec<RateEntry>,
}

impl RateTable {
    pub fn new(mut entries: Vec<RateEntry>) -> Self {
        entries.sort_by_key(|e| e.effective_date);
        entries.dedup_by_key(|e| e.effective_date);
        Self { entries }
    }

    pub fn entries(&self) -> &[RateEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(NaiveDate, Rate)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, Rate)>>(iter: I) -> Self {
        RateTable::new(
            iter.into_iter()
                .map(|(effective_date, rate)| RateEntry { effective_date, rate })
                .collect(),
        )
    }
}

impl RateProvider for RateTable {
    fn rate_for(&self, date: NaiveDate) -> Result<Rate> {
        let idx = self.entries.partition_point(|e| e.effective_date <= date);
        if idx == 0 {
            return Err(LeaseError::RateLookup {
                date,
                message: match self.entries.first() {
                    Some(first) => format!("table starts at {}", first.effective_date),
                    None => "rate table is empty".to_string(),
                },
            });
        }
        Ok(self.entries[idx - 1].rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn table() -> RateTable {
        vec![
            (d(2024, 1, 1), Rate::from_bps(650)),
            (d(2023, 1, 1), Rate::from_bps(600)),
            (d(2024, 7, 1), Rate::from_bps(700)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_latest_entry_on_or_before() {
        let rates = table();

        assert_eq!(rates.rate_for(d(2023, 6, 30)).unwrap(), Rate::from_bps(600));
        assert_eq!(rates.rate_for(d(2024, 1, 1)).unwrap(), Rate::from_bps(650));
        assert_eq!(rates.rate_for(d(2024, 6, 30)).unwrap(), Rate::from_bps(650));
        assert_eq!(rates.rate_for(d(2030, 1, 1)).unwrap(), Rate::from_bps(700));
    }

    #[test]
    fn test_missing_entry_is_an_error() {
        let err = table().rate_for(d(2022, 12, 31)).unwrap_err();
        assert!(matches!(err, LeaseError::RateLookup { .. }));

        assert!(RateTable::default().rate_for(d(2024, 1, 1)).is_err());
        assert!(NoRates.rate_for(d(2024, 1, 1)).is_err());
    }

    #[test]
    fn test_flat_rate() {
        let flat = FlatRate(Rate::from_percentage(4));
        assert_eq!(flat.rate_for(d(1999, 1, 1)).unwrap(), Rate::from_percentage(4));
    }
}
