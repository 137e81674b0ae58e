use crate::error::{SightlineError, SightlineResult};

pub use kurbo::{Point, Rect, Vec2};

/// Milliseconds on the host's monotonic clock.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct Millis(pub u64);

impl Default for Millis {
    fn default() -> Self {
        Millis::ZERO
    }
}

impl Millis {
    pub const ZERO: Millis = Millis(0);

    pub fn saturating_add(self, other: Millis) -> Millis {
        Millis(self.0.saturating_add(other.0))
    }

    pub fn saturating_sub(self, other: Millis) -> Millis {
        Millis(self.0.saturating_sub(other.0))
    }

    pub fn saturating_mul(self, k: u64) -> Millis {
        Millis(self.0.saturating_mul(k))
    }

    pub fn as_f64(self) -> f64 {
        self.0 as f64
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> SightlineResult<Self> {
        if !width.is_finite() || width <= 0.0 {
            return Err(SightlineError::validation("viewport width must be > 0"));
        }
        if !height.is_finite() || height <= 0.0 {
            return Err(SightlineError::validation("viewport height must be > 0"));
        }
        Ok(Self { width, height })
    }
}

/// A ratio in [0, 1] (visibility fractions, trigger thresholds).
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Fraction(f64);

impl Fraction {
    pub const ZERO: Fraction = Fraction(0.0);
    pub const ONE: Fraction = Fraction(1.0);

    pub fn new(value: f64) -> SightlineResult<Self> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(SightlineError::validation(format!(
                "fraction must be finite and within [0, 1], got {value}"
            )));
        }
        Ok(Self(value))
    }

    /// Builds from an unchecked runtime ratio; non-finite input collapses to 0.
    pub fn clamped(value: f64) -> Self {
        if value.is_finite() {
            Self(value.clamp(0.0, 1.0))
        } else {
            Self(0.0)
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}
