//! Playback speed.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Speed multiplier, always within [`Speed::MIN`]..=[`Speed::MAX`].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(from = "f64", into = "f64")]
pub struct Speed(f64);

impl Speed {
    pub const MIN: f64 = 0.1;
    pub const MAX: f64 = 3.0;
    pub const NORMAL: Speed = Speed(1.0);

    /// Clamp `value` into range. NaN falls back to normal speed.
    pub fn new(value: f64) -> Self {
        if value.is_nan() {
            Self::NORMAL
        } else {
            Speed(value.clamp(Self::MIN, Self::MAX))
        }
    }

    /// Change to `value`, keeping the current speed if `value` is NaN.
    pub fn adjusted(self, value: f64) -> Self {
        if value.is_nan() {
            self
        } else {
            Self::new(value)
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Time between ticks: `base / speed`.
    pub fn interval(self, base: Duration) -> Duration {
        base.div_f64(self.0)
    }
}

impl Default for Speed {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl From<f64> for Speed {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl From<Speed> for f64 {
    fn from(speed: Speed) -> Self {
        speed.0
    }
}
