use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::errors::{LeaseError, Result};
use crate::interest::compounding_months_for_frequency;
use crate::types::{DayOfMonth, ForcedEnd, ForcedEndKind, LeaseId, LeaseRole};

/// most projection periods a calculation may request
pub const MAX_PROJECTION_PERIODS: u32 = 6;

/// longest payment, escalation or compounding interval, in months
pub const MAX_FREQUENCY_MONTHS: u32 = 1_200;

/// periodic rental increase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Escalation {
    pub rate: Rate,
    pub frequency_months: u32,
    /// date of the first increase
    pub start_date: NaiveDate,
}

/// where an asset retirement obligation takes its discount rate from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AroRateSource {
    Fixed(Rate),
    /// looked up through the injected rate provider at the obligation date
    Table,
}

/// asset retirement obligation estimate recognised at `date`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AroEntry {
    pub date: NaiveDate,
    pub amount: Money,
    pub rate_source: AroRateSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityDeposit {
    pub date: NaiveDate,
    pub amount: Money,
}

/// manual replacement of the rental due on a schedule date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RentalOverride {
    pub date: NaiveDate,
    pub amount: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Impairment {
    pub date: NaiveDate,
    pub amount: Money,
}

/// contractual terms of a single lease
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaseTerms {
    pub lease_id: LeaseId,
    pub lease_start_date: NaiveDate,
    pub first_payment_date: NaiveDate,
    pub lease_end_date: NaiveDate,
    pub day_of_month: DayOfMonth,
    pub frequency_months: u32,
    pub rental: Money,
    #[serde(default)]
    pub escalation: Option<Escalation>,
    pub borrowing_rate: Rate,
    /// months per compounding sub-period; derived from the frequency when absent
    #[serde(default)]
    pub compounding_months: Option<u32>,
    #[serde(default)]
    pub initial_direct_costs: Money,
    #[serde(default)]
    pub lease_incentives: Money,
    #[serde(default)]
    pub purchase_option_price: Option<Money>,
    #[serde(default)]
    pub aro: Vec<AroEntry>,
    #[serde(default)]
    pub security_deposits: Vec<SecurityDeposit>,
    #[serde(default)]
    pub deposit_discount_rate: Rate,
    #[serde(default)]
    pub rental_overrides: Vec<RentalOverride>,
    #[serde(default)]
    pub impairments: Vec<Impairment>,
    #[serde(default)]
    pub useful_life_end: Option<NaiveDate>,
    #[serde(default)]
    pub ownership_transfer: bool,
    #[serde(default = "default_role")]
    pub role: LeaseRole,
    #[serde(default)]
    pub termination_date: Option<NaiveDate>,
    #[serde(default)]
    pub modification_date: Option<NaiveDate>,
    #[serde(default)]
    pub termination_penalty: Money,
}

fn default_role() -> LeaseRole {
    LeaseRole::Lessee
}

impl LeaseTerms {
    pub fn builder() -> LeaseTermsBuilder {
        LeaseTermsBuilder::new()
    }

    /// parse and validate terms supplied as JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let terms: LeaseTerms = serde_json::from_str(json)
            .map_err(|e| LeaseError::invalid_terms(format!("could not parse lease terms: {e}")))?;
        terms.validate()?;
        Ok(terms)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// effective compounding sub-period in months
    pub fn compounding_months(&self) -> u32 {
        self.compounding_months
            .unwrap_or_else(|| compounding_months_for_frequency(self.frequency_months))
    }

    /// reporting sign: +1 for a lease, -1 for a sublease
    pub fn sign(&self) -> Decimal {
        self.role.sign()
    }

    /// earlier of termination and modification, when either is set
    pub fn forced_end(&self) -> Option<ForcedEnd> {
        let termination = self.termination_date.map(|date| ForcedEnd {
            date,
            kind: ForcedEndKind::Termination,
        });
        let modification = self.modification_date.map(|date| ForcedEnd {
            date,
            kind: ForcedEndKind::Modification,
        });
        match (termination, modification) {
            (Some(t), Some(m)) => Some(if m.date < t.date { m } else { t }),
            (t, m) => t.or(m),
        }
    }

    /// date the right-of-use asset is depreciated to
    pub fn end_of_life(&self) -> NaiveDate {
        let extends = self.ownership_transfer || self.purchase_option_price.is_some();
        match self.useful_life_end {
            Some(life_end) if extends => life_end.max(self.lease_end_date),
            _ => self.lease_end_date,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.lease_end_date < self.lease_start_date {
            return Err(LeaseError::invalid_terms(format!(
                "lease end {} precedes lease start {}",
                self.lease_end_date, self.lease_start_date
            )));
        }
        if self.frequency_months == 0 {
            return Err(LeaseError::invalid_terms("payment frequency must be at least one month"));
        }
        if self.frequency_months > MAX_FREQUENCY_MONTHS {
            return Err(LeaseError::invalid_terms(format!(
                "payment frequency of {} months exceeds {MAX_FREQUENCY_MONTHS}",
                self.frequency_months
            )));
        }
        if self.first_payment_date > self.lease_end_date {
            return Err(LeaseError::invalid_terms(format!(
                "first payment {} falls after lease end {}",
                self.first_payment_date, self.lease_end_date
            )));
        }
        if let DayOfMonth::Day(day) = self.day_of_month {
            if !(1..=31).contains(&day) {
                return Err(LeaseError::invalid_terms(format!("day of month {day} is not a calendar day")));
            }
        }
        if self.rental.is_negative() {
            return Err(LeaseError::invalid_terms(format!("rental {} is negative", self.rental)));
        }
        match self.compounding_months {
            Some(0) => return Err(LeaseError::invalid_terms("compounding period must be at least one month")),
            Some(months) if months > MAX_FREQUENCY_MONTHS => {
                return Err(LeaseError::invalid_terms(format!(
                    "compounding period of {months} months exceeds {MAX_FREQUENCY_MONTHS}"
                )))
            }
            _ => {}
        }
        if let Some(escalation) = &self.escalation {
            if escalation.frequency_months == 0 {
                return Err(LeaseError::invalid_terms("escalation frequency must be at least one month"));
            }
            if escalation.frequency_months > MAX_FREQUENCY_MONTHS {
                return Err(LeaseError::invalid_terms(format!(
                    "escalation frequency of {} months exceeds {MAX_FREQUENCY_MONTHS}",
                    escalation.frequency_months
                )));
            }
            if escalation.rate.as_decimal() <= Decimal::NEGATIVE_ONE {
                return Err(LeaseError::invalid_terms(format!(
                    "escalation rate {} would eliminate the rental",
                    escalation.rate
                )));
            }
        }
        let forced_ends = [
            self.termination_date.map(|date| (ForcedEndKind::Termination, date)),
            self.modification_date.map(|date| (ForcedEndKind::Modification, date)),
        ];
        for (kind, date) in forced_ends.into_iter().flatten() {
            if date < self.lease_start_date {
                return Err(LeaseError::invalid_terms(format!(
                    "{kind:?} date {date} precedes lease start {}",
                    self.lease_start_date
                )));
            }
            // ending on the lease end date is a natural expiry, not a forced end
            if date > self.lease_end_date {
                return Err(LeaseError::invalid_terms(format!(
                    "{kind:?} date {date} falls after lease end {}",
                    self.lease_end_date
                )));
            }
        }
        if let Some(life_end) = self.useful_life_end {
            if life_end < self.lease_start_date {
                return Err(LeaseError::invalid_terms(format!(
                    "useful life end {life_end} precedes lease start"
                )));
            }
        }
        if let Some(price) = self.purchase_option_price {
            if price.is_negative() {
                return Err(LeaseError::invalid_terms("purchase option price is negative"));
            }
        }
        if self.initial_direct_costs.is_negative() || self.lease_incentives.is_negative() {
            return Err(LeaseError::invalid_terms(
                "initial direct costs and incentives are entered as positive amounts",
            ));
        }
        for entry in &self.aro {
            if entry.date > self.lease_end_date {
                return Err(LeaseError::invalid_terms(format!(
                    "retirement obligation dated {} after lease end",
                    entry.date
                )));
            }
        }
        for deposit in &self.security_deposits {
            if deposit.date > self.lease_end_date {
                return Err(LeaseError::invalid_terms(format!(
                    "security deposit dated {} after lease end",
                    deposit.date
                )));
            }
        }
        for impairment in &self.impairments {
            if impairment.amount.is_negative() {
                return Err(LeaseError::invalid_terms(format!(
                    "impairment on {} is negative",
                    impairment.date
                )));
            }
        }
        Ok(())
    }
}

/// builder for lease terms
#[derive(Debug, Clone, Default)]
pub struct LeaseTermsBuilder {
    lease_id: Option<LeaseId>,
    lease_start_date: Option<NaiveDate>,
    first_payment_date: Option<NaiveDate>,
    lease_end_date: Option<NaiveDate>,
    day_of_month: Option<DayOfMonth>,
    frequency_months: Option<u32>,
    rental: Option<Money>,
    escalation: Option<Escalation>,
    borrowing_rate: Option<Rate>,
    compounding_months: Option<u32>,
    initial_direct_costs: Money,
    lease_incentives: Money,
    purchase_option_price: Option<Money>,
    aro: Vec<AroEntry>,
    security_deposits: Vec<SecurityDeposit>,
    deposit_discount_rate: Rate,
    rental_overrides: Vec<RentalOverride>,
    impairments: Vec<Impairment>,
    useful_life_end: Option<NaiveDate>,
    ownership_transfer: bool,
    sublease: bool,
    termination_date: Option<NaiveDate>,
    modification_date: Option<NaiveDate>,
    termination_penalty: Money,
}

impl LeaseTermsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lease_id(mut self, id: LeaseId) -> Self {
        self.lease_id = Some(id);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.lease_start_date = Some(date);
        self
    }

    pub fn first_payment_date(mut self, date: NaiveDate) -> Self {
        self.first_payment_date = Some(date);
        self
    }

    pub fn end_date(mut self, date: NaiveDate) -> Self {
        self.lease_end_date = Some(date);
        self
    }

    pub fn day_of_month(mut self, rule: DayOfMonth) -> Self {
        self.day_of_month = Some(rule);
        self
    }

    pub fn frequency_months(mut self, months: u32) -> Self {
        self.frequency_months = Some(months);
        self
    }

    pub fn rental(mut self, amount: Money) -> Self {
        self.rental = Some(amount);
        self
    }

    pub fn escalation(mut self, rate: Rate, frequency_months: u32, start_date: NaiveDate) -> Self {
        self.escalation = Some(Escalation {
            rate,
            frequency_months,
            start_date,
        });
        self
    }

    pub fn borrowing_rate(mut self, rate: Rate) -> Self {
        self.borrowing_rate = Some(rate);
        self
    }

    pub fn compounding_months(mut self, months: u32) -> Self {
        self.compounding_months = Some(months);
        self
    }

    pub fn initial_direct_costs(mut self, amount: Money) -> Self {
        self.initial_direct_costs = amount;
        self
    }

    pub fn lease_incentives(mut self, amount: Money) -> Self {
        self.lease_incentives = amount;
        self
    }

    pub fn purchase_option(mut self, price: Money) -> Self {
        self.purchase_option_price = Some(price);
        self
    }

    pub fn aro(mut self, date: NaiveDate, amount: Money, rate_source: AroRateSource) -> Self {
        self.aro.push(AroEntry {
            date,
            amount,
            rate_source,
        });
        self
    }

    pub fn security_deposit(mut self, date: NaiveDate, amount: Money) -> Self {
        self.security_deposits.push(SecurityDeposit { date, amount });
        self
    }

    pub fn deposit_discount_rate(mut self, rate: Rate) -> Self {
        self.deposit_discount_rate = rate;
        self
    }

    pub fn rental_override(mut self, date: NaiveDate, amount: Money) -> Self {
        self.rental_overrides.push(RentalOverride { date, amount });
        self
    }

    pub fn impairment(mut self, date: NaiveDate, amount: Money) -> Self {
        self.impairments.push(Impairment { date, amount });
        self
    }

    pub fn useful_life_end(mut self, date: NaiveDate) -> Self {
        self.useful_life_end = Some(date);
        self
    }

    pub fn ownership_transfer(mut self, transfers: bool) -> Self {
        self.ownership_transfer = transfers;
        self
    }

    pub fn sublease(mut self, sublease: bool) -> Self {
        self.sublease = sublease;
        self
    }

    pub fn termination(mut self, date: NaiveDate, penalty: Money) -> Self {
        self.termination_date = Some(date);
        self.termination_penalty = penalty;
        self
    }

    pub fn modification_date(mut self, date: NaiveDate) -> Self {
        self.modification_date = Some(date);
        self
    }

    pub fn build(self) -> Result<LeaseTerms> {
        let lease_start_date = self
            .lease_start_date
            .ok_or_else(|| LeaseError::invalid_terms("lease start date is required"))?;
        let lease_end_date = self
            .lease_end_date
            .ok_or_else(|| LeaseError::invalid_terms("lease end date is required"))?;
        let rental = self
            .rental
            .ok_or_else(|| LeaseError::invalid_terms("rental amount is required"))?;
        let borrowing_rate = self
            .borrowing_rate
            .ok_or_else(|| LeaseError::invalid_terms("borrowing rate is required"))?;
        let first_payment_date = self.first_payment_date.unwrap_or(lease_start_date);

        let terms = LeaseTerms {
            lease_id: self.lease_id.unwrap_or_else(Uuid::new_v4),
            lease_start_date,
            first_payment_date,
            lease_end_date,
            day_of_month: self
                .day_of_month
                .unwrap_or_else(|| DayOfMonth::from_date(first_payment_date)),
            frequency_months: self.frequency_months.unwrap_or(1),
            rental,
            escalation: self.escalation,
            borrowing_rate,
            compounding_months: self.compounding_months,
            initial_direct_costs: self.initial_direct_costs,
            lease_incentives: self.lease_incentives,
            purchase_option_price: self.purchase_option_price,
            aro: self.aro,
            security_deposits: self.security_deposits,
            deposit_discount_rate: self.deposit_discount_rate,
            rental_overrides: self.rental_overrides,
            impairments: self.impairments,
            useful_life_end: self.useful_life_end,
            ownership_transfer: self.ownership_transfer,
            role: if self.sublease { LeaseRole::Sublease } else { LeaseRole::Lessee },
            termination_date: self.termination_date,
            modification_date: self.modification_date,
            termination_penalty: self.termination_penalty,
        };
        terms.validate()?;
        Ok(terms)
    }
}

/// forward projection settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub enabled: bool,
    pub periods: u32,
    pub period_months: u32,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            periods: 3,
            period_months: 3,
        }
    }
}

impl ProjectionConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// quarterly steps across a full year ahead
    pub fn quarterly() -> Self {
        Self {
            enabled: true,
            periods: 4,
            period_months: 3,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.periods > MAX_PROJECTION_PERIODS {
            return Err(LeaseError::configuration(format!(
                "{} projection periods requested, at most {MAX_PROJECTION_PERIODS} allowed",
                self.periods
            )));
        }
        if self.enabled && self.period_months == 0 {
            return Err(LeaseError::configuration("projection period must be at least one month"));
        }
        Ok(())
    }
}

/// how the closing liability is classified into current and non-current
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SplitMethod {
    /// discounted payments falling due within twelve months
    #[default]
    Projection,
    /// reduction of the liability over the next twelve months
    BalanceSheet,
}

/// window and reporting options for one calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CalculationOptions {
    /// first day of the window; defaults to the lease start
    pub from_date: Option<NaiveDate>,
    /// last day of the window; defaults to the final schedule date
    pub to_date: Option<NaiveDate>,
    pub projection: ProjectionConfig,
    pub split_method: SplitMethod,
}

impl CalculationOptions {
    pub fn for_window(from_date: NaiveDate, to_date: NaiveDate) -> Self {
        Self {
            from_date: Some(from_date),
            to_date: Some(to_date),
            ..Self::default()
        }
    }

    pub fn with_projection(mut self, projection: ProjectionConfig) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_split_method(mut self, method: SplitMethod) -> Self {
        self.split_method = method;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.projection.validate()?;
        if let (Some(from), Some(to)) = (self.from_date, self.to_date) {
            if to < from {
                return Err(LeaseError::configuration(format!(
                    "calculation window ends {to} before it starts {from}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn base() -> LeaseTermsBuilder {
        LeaseTerms::builder()
            .start_date(d(2024, 1, 1))
            .end_date(d(2028, 12, 31))
            .rental(Money::from_major(150_000))
            .borrowing_rate(Rate::from_percentage(8))
    }

    #[test]
    fn test_builder_defaults() {
        let terms = base().build().unwrap();

        assert_eq!(terms.first_payment_date, d(2024, 1, 1));
        assert_eq!(terms.day_of_month, DayOfMonth::Day(1));
        assert_eq!(terms.frequency_months, 1);
        assert_eq!(terms.compounding_months(), 1);
        assert_eq!(terms.sign(), Decimal::ONE);
        assert_eq!(terms.forced_end(), None);
        assert_eq!(terms.end_of_life(), d(2028, 12, 31));
    }

    #[test]
    fn test_missing_required_fields() {
        let err = LeaseTerms::builder().start_date(d(2024, 1, 1)).build().unwrap_err();
        assert!(matches!(err, LeaseError::InvalidTerms { .. }));
    }

    #[test]
    fn test_invalid_terms_are_rejected() {
        assert!(base().end_date(d(2023, 12, 31)).build().is_err());
        assert!(base().frequency_months(0).build().is_err());
        assert!(base().first_payment_date(d(2029, 1, 31)).build().is_err());
        assert!(base().day_of_month(DayOfMonth::Day(32)).build().is_err());
        assert!(base().day_of_month(DayOfMonth::Day(0)).build().is_err());
        assert!(base().rental(Money::from_major(-1)).build().is_err());
        assert!(base().termination(d(2023, 6, 30), Money::ZERO).build().is_err());
        assert!(base()
            .escalation(Rate::from_percentage(5), 0, d(2025, 1, 1))
            .build()
            .is_err());
    }

    #[test]
    fn test_forced_end_after_lease_end_is_rejected() {
        let err = base()
            .termination(d(2029, 6, 30), Money::from_major(1_000))
            .build()
            .unwrap_err();
        assert!(matches!(err, LeaseError::InvalidTerms { .. }));
        assert!(base().modification_date(d(2029, 1, 1)).build().is_err());

        // a later termination is still rejected when an earlier modification is present
        assert!(base()
            .modification_date(d(2026, 3, 31))
            .termination(d(2030, 1, 1), Money::ZERO)
            .build()
            .is_err());

        assert!(base().termination(d(2028, 12, 31), Money::ZERO).build().is_ok());
        assert!(base().modification_date(d(2024, 1, 1)).build().is_ok());
    }

    #[test]
    fn test_frequencies_are_bounded() {
        assert!(base().frequency_months(MAX_FREQUENCY_MONTHS).build().is_ok());
        assert!(base().frequency_months(MAX_FREQUENCY_MONTHS + 1).build().is_err());
        assert!(base().frequency_months(u32::MAX).build().is_err());
        assert!(base().compounding_months(u32::MAX).build().is_err());
        assert!(base()
            .escalation(Rate::from_percentage(5), u32::MAX, d(2025, 1, 1))
            .build()
            .is_err());
    }

    #[test]
    fn test_forced_end_takes_earlier_date() {
        let terms = base()
            .termination(d(2027, 6, 30), Money::ZERO)
            .modification_date(d(2026, 3, 31))
            .build()
            .unwrap();

        let forced = terms.forced_end().unwrap();
        assert_eq!(forced.date, d(2026, 3, 31));
        assert_eq!(forced.kind, ForcedEndKind::Modification);
    }

    #[test]
    fn test_compounding_derived_from_frequency() {
        let quarterly = base().frequency_months(3).build().unwrap();
        assert_eq!(quarterly.compounding_months(), 3);

        let explicit = base().frequency_months(3).compounding_months(1).build().unwrap();
        assert_eq!(explicit.compounding_months(), 1);
    }

    #[test]
    fn test_end_of_life_with_ownership_transfer() {
        let terms = base()
            .useful_life_end(d(2033, 12, 31))
            .ownership_transfer(true)
            .build()
            .unwrap();
        assert_eq!(terms.end_of_life(), d(2033, 12, 31));

        let no_transfer = base().useful_life_end(d(2033, 12, 31)).build().unwrap();
        assert_eq!(no_transfer.end_of_life(), d(2028, 12, 31));
    }

    #[test]
    fn test_terms_json_round_trip() {
        let terms = base()
            .escalation(Rate::from_decimal(dec!(0.05)), 12, d(2025, 1, 1))
            .sublease(true)
            .build()
            .unwrap();

        let parsed = LeaseTerms::from_json(&terms.to_json_pretty().unwrap()).unwrap();
        assert_eq!(parsed, terms);
        assert_eq!(parsed.sign(), Decimal::NEGATIVE_ONE);
    }

    #[test]
    fn test_projection_config_limits() {
        assert!(ProjectionConfig::default().validate().is_ok());

        let too_many = ProjectionConfig {
            periods: 7,
            ..ProjectionConfig::default()
        };
        assert!(matches!(
            too_many.validate().unwrap_err(),
            LeaseError::InvalidConfiguration { .. }
        ));

        let inverted = CalculationOptions::for_window(d(2025, 1, 1), d(2024, 1, 1));
        assert!(inverted.validate().is_err());
    }
}
