//! Construction parameters for a `Histogram`.
//!
//! `Config` captures the three values that fully determine a histogram's shape. It derives serde's
//! `Serialize` and `Deserialize` so it can be embedded in whatever configuration format the
//! application already uses:
//!
//! ```
//! use hdrhist::{Config, Histogram};
//!
//! let config: Config = serde_json::from_str(
//!     r#"{ "highest_trackable_value": 3600000000, "significant_figures": 2 }"#,
//! ).unwrap();
//! assert_eq!(1, config.lowest_trackable_value);
//!
//! let hist: Histogram<u64> = config.build().unwrap();
//! assert_eq!(3_600_000_000, hist.highest_trackable_value());
//! ```

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Counter, CreationError, Histogram};

fn default_lowest_trackable_value() -> u64 {
    1
}

fn default_significant_figures() -> u8 {
    3
}

/// The immutable configuration of a histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Lowest value that can be distinguished from 0. A value of 0 is accepted and behaves like 1.
    #[serde(default = "default_lowest_trackable_value")]
    pub lowest_trackable_value: u64,
    /// Highest value that can be recorded. Must be at least twice `lowest_trackable_value`.
    pub highest_trackable_value: u64,
    /// Number of significant decimal digits maintained across the whole range, in `[1, 5]`.
    #[serde(default = "default_significant_figures")]
    pub significant_figures: u8,
}

impl Config {
    /// Create a configuration. Nothing is validated until `validate` or `build` is called.
    pub fn new(lowest_trackable_value: u64, highest_trackable_value: u64, sigfig: u8) -> Config {
        Config {
            lowest_trackable_value,
            highest_trackable_value,
            significant_figures: sigfig,
        }
    }

    /// Check the parameters without allocating anything.
    pub fn validate(&self) -> Result<(), CreationError> {
        if self.significant_figures < 1 || self.significant_figures > 5 {
            return Err(CreationError::SigFigOutOfRange);
        }
        if self.lowest_trackable_value > u64::max_value() / 2 {
            return Err(CreationError::LowExceedsMax);
        }
        if self.highest_trackable_value < 2 * self.lowest_trackable_value {
            return Err(CreationError::HighLessThanTwiceLow);
        }
        // the largest value in bucket 0 must still fit in a u64 once shifted by the unit magnitude
        if self.unit_magnitude() + self.sub_bucket_half_count_magnitude() + 1 > 63 {
            return Err(CreationError::CannotRepresentSigFigBeyondLow);
        }
        Ok(())
    }

    /// Validate the configuration and allocate a histogram for it.
    pub fn build<T: Counter>(&self) -> Result<Histogram<T>, CreationError> {
        Histogram::from_config(*self).map_err(|e| {
            debug!(config = ?self, error = %e, "rejected histogram configuration");
            e
        })
    }

    /// floor(log2(lowest)), with a lowest value of 0 treated as 1.
    pub(crate) fn unit_magnitude(&self) -> u32 {
        let low = self.lowest_trackable_value.max(1);
        63 - low.leading_zeros()
    }

    /// log2 of half of the smallest power of two that can hold 2 * 10^sigfigs distinct values.
    pub(crate) fn sub_bucket_half_count_magnitude(&self) -> u32 {
        // Given a 3 decimal point accuracy, the expectation is obviously for "+/- 1 unit at 1000".
        // It also means that it's "ok to be +/- 2 units at 2000". The "tricky" thing is that it is
        // NOT ok to be +/- 2 units at 1999. Only starting at 2000. So internally, we need to
        // maintain single unit resolution to 2x 10^decimal points.
        let largest_value_with_single_unit_resolution =
            2 * 10_u32.pow(u32::from(self.significant_figures));

        // power-of-two ceiling of the above
        let sub_bucket_count_magnitude =
            32 - (largest_value_with_single_unit_resolution - 1).leading_zeros();
        sub_bucket_count_magnitude.max(1) - 1
    }
}
