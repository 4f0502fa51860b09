use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{AroRateSource, LeaseTerms};
use crate::dates;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::interest::{CompoundingEngine, RateProvider};

/// which side track a layer belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerKind {
    RetirementObligation,
    SecurityDeposit,
}

/// one obligation or deposit, discounted to the lease end and unwound row by row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub kind: LayerKind,
    pub entry_date: NaiveDate,
    /// schedule date the layer is recognised on
    pub recognised_on: NaiveDate,
    pub gross: Money,
    pub rate: Rate,
    pub present_value: Money,
}

impl Layer {
    /// undiscounted amount less its present value
    pub fn discount(&self) -> Money {
        self.gross - self.present_value
    }
}

/// per-row totals across all layers
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackRow {
    pub aro_addition: Money,
    pub aro_interest: Money,
    pub aro_provision: Money,
    pub deposit_addition: Money,
    /// deposit discount treated as prepaid rent in the right-of-use asset
    pub deposit_discount: Money,
    pub deposit_interest: Money,
    pub security_deposit: Money,
}

impl TrackRow {
    /// amount added to the right-of-use asset on this row
    pub fn rou_addition(&self) -> Money {
        self.aro_addition + self.deposit_discount
    }
}

/// side tracks aligned with the schedule rows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracks {
    pub rows: Vec<TrackRow>,
    pub layers: Vec<Layer>,
}

/// amortize every retirement obligation and security deposit over `row_dates`
pub fn build_tracks(
    terms: &LeaseTerms,
    row_dates: &[NaiveDate],
    rates: &dyn RateProvider,
) -> Result<Tracks> {
    let mut tracks = Tracks {
        rows: vec![TrackRow::default(); row_dates.len()],
        layers: Vec::new(),
    };

    for entry in &terms.aro {
        let rate = match entry.rate_source {
            AroRateSource::Fixed(rate) => rate,
            AroRateSource::Table => rates.rate_for(entry.date)?,
        };
        add_layer(
            &mut tracks,
            terms,
            row_dates,
            LayerKind::RetirementObligation,
            entry.date,
            entry.amount,
            rate,
        )?;
    }
    for deposit in &terms.security_deposits {
        add_layer(
            &mut tracks,
            terms,
            row_dates,
            LayerKind::SecurityDeposit,
            deposit.date,
            deposit.amount,
            terms.deposit_discount_rate,
        )?;
    }

    debug!(
        lease_id = %terms.lease_id,
        layers = tracks.layers.len(),
        "built retirement obligation and deposit tracks"
    );
    Ok(tracks)
}

fn add_layer(
    tracks: &mut Tracks,
    terms: &LeaseTerms,
    row_dates: &[NaiveDate],
    kind: LayerKind,
    entry_date: NaiveDate,
    gross: Money,
    rate: Rate,
) -> Result<()> {
    let first = row_dates.partition_point(|d| *d < entry_date);
    if first == row_dates.len() {
        warn!(
            lease_id = %terms.lease_id,
            kind = ?kind,
            date = %entry_date,
            "layer dated after the final schedule row is ignored"
        );
        return Ok(());
    }

    let engine = CompoundingEngine::monthly(rate)?;
    let recognised_on = row_dates[first];
    let present_value =
        engine.present_value(gross, dates::days_between(recognised_on, terms.lease_end_date))?;

    let mut balance = present_value;
    for idx in first..row_dates.len() {
        let row = &mut tracks.rows[idx];
        let interest = if idx == first {
            Money::ZERO
        } else {
            engine.interest(balance, dates::days_between(row_dates[idx - 1], row_dates[idx]))?
        };
        balance += interest;
        match kind {
            LayerKind::RetirementObligation => {
                if idx == first {
                    row.aro_addition += present_value;
                }
                row.aro_interest += interest;
                row.aro_provision += balance;
            }
            LayerKind::SecurityDeposit => {
                if idx == first {
                    row.deposit_addition += present_value;
                    row.deposit_discount += gross - present_value;
                }
                row.deposit_interest += interest;
                row.security_deposit += balance;
            }
        }
    }

    tracks.layers.push(Layer {
        kind,
        entry_date,
        recognised_on,
        gross,
        rate,
        present_value,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::LeaseError;
    use crate::interest::{FlatRate, NoRates};
    use crate::schedule::generate;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn terms_with(aro: Option<AroRateSource>, deposit: bool) -> LeaseTerms {
        let mut builder = LeaseTerms::builder()
            .start_date(d(2024, 1, 1))
            .first_payment_date(d(2024, 1, 31))
            .end_date(d(2026, 12, 31))
            .rental(Money::from_major(10_000))
            .borrowing_rate(Rate::from_percentage(8))
            .deposit_discount_rate(Rate::from_percentage(6));
        if let Some(source) = aro {
            builder = builder.aro(d(2024, 1, 1), Money::from_major(50_000), source);
        }
        if deposit {
            builder = builder.security_deposit(d(2024, 1, 1), Money::from_major(30_000));
        }
        builder.build().unwrap()
    }

    fn row_dates(terms: &LeaseTerms) -> Vec<NaiveDate> {
        generate(terms).unwrap().rows.iter().map(|r| r.date).collect()
    }

    #[test]
    fn test_aro_accretes_to_gross_at_lease_end() {
        let terms = terms_with(Some(AroRateSource::Fixed(Rate::from_percentage(7))), false);
        let dates = row_dates(&terms);
        let tracks = build_tracks(&terms, &dates, &NoRates).unwrap();

        let first = tracks.rows[0];
        let last = tracks.rows[dates.len() - 1];
        assert!(first.aro_provision < Money::from_major(50_000));
        assert_eq!(first.aro_provision, first.aro_addition);
        assert!(last.aro_provision.approx_eq(Money::from_major(50_000), Money::CENT));

        let interest: Money = tracks.rows.iter().map(|r| r.aro_interest).sum();
        assert!((first.aro_addition + interest).approx_eq(last.aro_provision, Money::CENT));
    }

    #[test]
    fn test_deposit_discount_goes_to_rou() {
        let terms = terms_with(None, true);
        let dates = row_dates(&terms);
        let tracks = build_tracks(&terms, &dates, &NoRates).unwrap();

        let first = tracks.rows[0];
        assert_eq!(first.deposit_addition + first.deposit_discount, Money::from_major(30_000));
        assert_eq!(first.rou_addition(), first.deposit_discount);
        assert!(tracks.rows[dates.len() - 1]
            .security_deposit
            .approx_eq(Money::from_major(30_000), Money::CENT));
        assert_eq!(tracks.layers.len(), 1);
        assert_eq!(tracks.layers[0].discount(), first.deposit_discount);
    }

    #[test]
    fn test_table_rate_uses_provider() {
        let terms = terms_with(Some(AroRateSource::Table), false);
        let dates = row_dates(&terms);

        let tracks = build_tracks(&terms, &dates, &FlatRate(Rate::from_percentage(7))).unwrap();
        assert_eq!(tracks.layers[0].rate, Rate::from_percentage(7));

        let err = build_tracks(&terms, &dates, &NoRates).unwrap_err();
        assert!(matches!(err, LeaseError::RateLookup { .. }));
    }

    #[test]
    fn test_later_layer_recognised_on_next_row() {
        let terms = LeaseTerms::builder()
            .start_date(d(2024, 1, 1))
            .end_date(d(2025, 12, 31))
            .rental(Money::from_major(1_000))
            .borrowing_rate(Rate::from_percentage(8))
            .aro(d(2024, 6, 10), Money::from_major(5_000), AroRateSource::Fixed(Rate::from_percentage(5)))
            .build()
            .unwrap();
        let dates = row_dates(&terms);
        let tracks = build_tracks(&terms, &dates, &NoRates).unwrap();

        assert_eq!(tracks.layers[0].recognised_on, d(2024, 6, 30));
        let idx = dates.iter().position(|d0| *d0 == d(2024, 6, 30)).unwrap();
        assert!(tracks.rows[idx - 1].aro_provision.is_zero());
        assert!(tracks.rows[idx].aro_addition.is_positive());
    }
}
