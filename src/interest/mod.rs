pub mod compound;
pub mod rates;

pub use compound::CompoundingEngine;
pub use rates::{FlatRate, NoRates, RateEntry, RateProvider, RateTable};

/// compounding sub-period implied by the payment frequency
pub fn compounding_months_for_frequency(frequency_months: u32) -> u32 {
    match frequency_months {
        3 => 3,
        6 => 6,
        f if f >= 12 => 12,
        _ => 1,
    }
}
