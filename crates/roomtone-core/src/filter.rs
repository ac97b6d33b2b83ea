//! Single-pole exponential smoothing filter
//!
//! The level monitor's only signal-processing primitive. Each update blends
//! the newest sample into the running value:
//!
//! ```text
//! value = alpha * sample + (1 - alpha) * value
//! ```
//!
//! Units are not normalized; whatever scale goes in comes out.

/// Default weight on the newest sample
pub const DEFAULT_ALPHA: f64 = 0.8;

/// Exponential moving average over a stream of samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingFilter {
    value: f64,
    alpha: f64,
}

impl SmoothingFilter {
    /// Create a filter with value 0
    ///
    /// `alpha` must lie in `(0, 1]`.
    pub fn new(alpha: f64) -> Self {
        debug_assert!(alpha > 0.0 && alpha <= 1.0, "alpha out of range: {}", alpha);
        Self { value: 0.0, alpha }
    }

    /// Feed one sample and return the new smoothed value
    #[inline]
    pub fn update(&mut self, sample: f64) -> f64 {
        self.value = self.alpha * sample + (1.0 - self.alpha) * self.value;
        self.value
    }

    #[inline]
    pub fn value(&self) -> f64 {
        self.value
    }

    #[inline]
    pub fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Default for SmoothingFilter {
    fn default() -> Self {
        Self::new(DEFAULT_ALPHA)
    }
}
