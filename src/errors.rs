use chrono::NaiveDate;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeaseError {
    /// malformed or contradictory lease terms, never auto-corrected
    #[error("invalid lease terms: {message}")]
    InvalidTerms {
        message: String,
    },

    /// numerically invalid intermediate state (e.g. non-positive compounding base)
    #[error("schedule computation failed: {message}")]
    ScheduleComputation {
        message: String,
    },

    /// the injected rate provider had no usable entry for a required date
    #[error("rate lookup failed for {date}: {message}")]
    RateLookup {
        date: NaiveDate,
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

impl LeaseError {
    pub(crate) fn invalid_terms(message: impl Into<String>) -> Self {
        LeaseError::InvalidTerms {
            message: message.into(),
        }
    }

    pub(crate) fn computation(message: impl Into<String>) -> Self {
        LeaseError::ScheduleComputation {
            message: message.into(),
        }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        LeaseError::InvalidConfiguration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeaseError>;
