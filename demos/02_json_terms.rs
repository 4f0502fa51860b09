/// json terms - sublease with a retirement obligation priced from a rate table
use lease_accounting_rs::chrono::NaiveDate;
use lease_accounting_rs::{CalculationOptions, LeaseCalculator, LeaseTerms, Rate, RateTable, SplitMethod};

const TERMS: &str = r#"{
    "lease_id": "6f1c8f7e-2b1a-4c39-9d7e-2f5b8a1e4c10",
    "lease_start_date": "2024-04-01",
    "first_payment_date": "2024-04-01",
    "lease_end_date": "2029-03-31",
    "day_of_month": { "day": 1 },
    "frequency_months": 1,
    "rental": "8500",
    "escalation": { "rate": "0.03", "frequency_months": 12, "start_date": "2025-04-01" },
    "borrowing_rate": "0.075",
    "aro": [
        { "date": "2024-04-01", "amount": "40000", "rate_source": "Table" }
    ],
    "security_deposits": [
        { "date": "2024-04-01", "amount": "25500" }
    ],
    "deposit_discount_rate": "0.05",
    "role": "Sublease"
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).ok_or("invalid date");

    let terms = LeaseTerms::from_json(TERMS)?;
    let rates: RateTable = [
        (date(2023, 1, 1)?, Rate::from_bps(420)),
        (date(2024, 1, 1)?, Rate::from_bps(455)),
    ]
    .into_iter()
    .collect();

    let options = CalculationOptions::for_window(date(2024, 4, 1)?, date(2025, 3, 31)?)
        .with_split_method(SplitMethod::BalanceSheet);
    let calc = LeaseCalculator::with_rate_provider(&terms, &rates).calculate(&options)?;

    println!("{}", calc.summary().to_json_pretty()?);
    for band in &calc.maturity.bands {
        println!("{:?}: {}", band.bucket, band.undiscounted);
    }

    Ok(())
}
