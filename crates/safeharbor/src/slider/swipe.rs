//! Touch swipe detection.

/// Tracks one touch gesture at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeTracker {
    threshold: f64,
    start: Option<f64>,
}

impl SwipeTracker {
    /// Create a tracker that counts gestures longer than `threshold` pixels.
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            start: None,
        }
    }

    /// Record where a touch began.
    pub fn start(&mut self, x: f64) {
        self.start = Some(x);
    }

    /// Finish the gesture at `x`.
    ///
    /// Returns `+1` for a leftward swipe (next panel), `-1` for a rightward
    /// one, or `None` if the travel didn't exceed the threshold or no touch
    /// was in progress. A gesture with a non-finite coordinate is ignored.
    pub fn end(&mut self, x: f64) -> Option<isize> {
        let start = self.start.take()?;
        let diff = start - x;

        // NaN compares false both ways, so reject it before the sign test
        if !diff.is_finite() || diff.abs() <= self.threshold {
            return None;
        }
        Some(if diff > 0.0 { 1 } else { -1 })
    }

    /// Minimum travel in pixels.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}
