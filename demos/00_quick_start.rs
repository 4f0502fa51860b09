/// quick start - minimal example to get started
use lease_accounting_rs::chrono::NaiveDate;
use lease_accounting_rs::{calculate_lease, CalculationOptions, DayOfMonth, LeaseTerms, Money, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).ok_or("invalid date");

    // five year office lease, paid on the last day of each month, 5% uplift every year
    let terms = LeaseTerms::builder()
        .start_date(date(2024, 1, 1)?)
        .first_payment_date(date(2024, 1, 31)?)
        .end_date(date(2028, 12, 31)?)
        .day_of_month(DayOfMonth::Last)
        .rental(Money::from_major(15_000))
        .escalation(Rate::from_percentage(5), 12, date(2025, 1, 1)?)
        .borrowing_rate(Rate::from_percentage(8))
        .initial_direct_costs(Money::from_major(5_000))
        .build()?;

    // report the first financial year
    let options = CalculationOptions::for_window(date(2024, 1, 1)?, date(2024, 12, 31)?);
    let calc = calculate_lease(&terms, &options)?;

    println!("{}", calc.summary().to_json_pretty()?);
    for entry in &calc.journal {
        println!(
            "{:>4} {:<30} {:?} {:>16} {}",
            entry.account.code().unwrap_or("-"),
            entry.account.name(),
            entry.side,
            entry.amount,
            entry.memo
        );
    }

    Ok(())
}
