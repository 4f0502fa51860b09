/// early termination - derecognition and the resulting gain or loss
use lease_accounting_rs::chrono::NaiveDate;
use lease_accounting_rs::{
    BalanceSnapshot, CalculationOptions, DayOfMonth, LeaseCalculator, LeaseTerms, Money, ProjectionConfig,
    Rate, SplitMethod,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).ok_or("invalid date");

    // quarterly warehouse lease terminated two years early with a penalty
    let terms = LeaseTerms::builder()
        .start_date(date(2023, 7, 1)?)
        .first_payment_date(date(2023, 9, 30)?)
        .end_date(date(2030, 6, 30)?)
        .day_of_month(DayOfMonth::Last)
        .frequency_months(3)
        .rental(Money::from_major(60_000))
        .borrowing_rate(Rate::from_percentage(7))
        .termination(date(2028, 6, 30)?, Money::from_major(25_000))
        .build()?;

    let calculator = LeaseCalculator::new(&terms);
    let schedule = calculator.schedule()?;

    // quarterly position leading up to the termination
    let mut quarter_end = date(2027, 6, 30)?;
    while quarter_end <= date(2028, 6, 30)? {
        let snapshot = BalanceSnapshot::at(&schedule, quarter_end, SplitMethod::Projection)?;
        println!(
            "{quarter_end}: liability {:>16} (current {:>16}) rou {:>16}",
            snapshot.lease_liability, snapshot.current_liability, snapshot.rou_asset
        );
        quarter_end = lease_accounting_rs::dates::end_of_month(quarter_end, 3)?;
    }

    let options = CalculationOptions::for_window(date(2028, 1, 1)?, date(2028, 12, 31)?)
        .with_projection(ProjectionConfig::quarterly());
    let calc = calculator.calculate(&options)?;

    if let Some(derecognition) = calc.activity.derecognition {
        println!(
            "{:?} on {}: liability {} rou {} penalty {} gain/(loss) {}",
            derecognition.kind,
            derecognition.date,
            derecognition.lease_liability,
            derecognition.rou_asset,
            derecognition.penalty,
            derecognition.gain_loss
        );
    }
    println!("projections after termination: {}", calc.projections.len());
    println!("{}", serde_json::to_string_pretty(&calc.journal)?);

    Ok(())
}
