//! Bucketization of continuous observations into table keys

use serde::{Deserialize, Serialize};

use super::cart_pole::{THETA_THRESHOLD, X_THRESHOLD};
use crate::{Error, Result, types::Observation};

/// Equal-width bins over `[low, high]`.
///
/// Values outside the range are clamped to the first or last bin, unless the
/// bucket is bounded: then values below `low` map to `-1` and values above
/// `high` map to `bins`, so they never share a key with an in-range value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    low: f64,
    high: f64,
    bins: usize,
    #[serde(default)]
    bounded: bool,
}

impl Bucket {
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] unless `low < high` (both
    /// finite) and `bins > 0`.
    pub fn new(low: f64, high: f64, bins: usize) -> Result<Self> {
        if !(low.is_finite() && high.is_finite() && low < high) || bins == 0 {
            return Err(Error::InvalidConfiguration {
                message: format!("invalid bucket [{low}, {high}] with {bins} bins"),
            });
        }
        Ok(Self {
            low,
            high,
            bins,
            bounded: false,
        })
    }

    /// Like [`Bucket::new`], with out-of-range values kept in their own
    /// overflow bins.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Bucket::new`].
    pub fn bounded(low: f64, high: f64, bins: usize) -> Result<Self> {
        Ok(Self {
            bounded: true,
            ..Self::new(low, high, bins)?
        })
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Bin index of `value`; NaN lands in bin 0
    pub fn index(&self, value: f64) -> i64 {
        if self.bounded {
            if value < self.low {
                return -1;
            }
            if value > self.high {
                return self.bins as i64;
            }
        }
        let ratio = (value - self.low) / (self.high - self.low);
        // saturating float-to-int cast sends NaN to 0
        let raw = (ratio * self.bins as f64).floor() as i64;
        raw.clamp(0, self.bins as i64 - 1)
    }
}

/// Per-dimension bucketization of a continuous state vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discretizer {
    buckets: Vec<Bucket>,
}

impl Discretizer {
    pub fn new(buckets: Vec<Bucket>) -> Self {
        Self { buckets }
    }

    /// Bucket layout used for cart-pole: position, velocity, pole angle and
    /// pole angular velocity.
    ///
    /// Position and angle are bounded by the termination thresholds, so a
    /// state past either threshold gets a key no live state can produce.
    pub fn cart_pole() -> Self {
        Self::new(vec![
            Bucket {
                low: -X_THRESHOLD,
                high: X_THRESHOLD,
                bins: 3,
                bounded: true,
            },
            Bucket {
                low: -3.0,
                high: 3.0,
                bins: 3,
                bounded: false,
            },
            Bucket {
                low: -THETA_THRESHOLD,
                high: THETA_THRESHOLD,
                bins: 6,
                bounded: true,
            },
            Bucket {
                low: -2.0,
                high: 2.0,
                bins: 6,
                bounded: false,
            },
        ])
    }

    pub fn dimensions(&self) -> usize {
        self.buckets.len()
    }

    /// Map a state vector to its bucketed observation.
    pub fn discretize(&self, state: &[f64]) -> Observation {
        debug_assert_eq!(state.len(), self.buckets.len());
        Observation::Features(
            self.buckets
                .iter()
                .zip(state)
                .map(|(bucket, &value)| bucket.index(value))
                .collect(),
        )
    }
}
