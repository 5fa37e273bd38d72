//! Rolling-window average over calibrated samples.

use crate::types::CalibratedSample;

/// Largest supported window.
pub const MAX_STEPS: usize = 10;

/// Smallest supported window.
pub const MIN_STEPS: usize = 2;

/// Ring buffer of the last `steps` samples with a running per-axis sum.
///
/// In advanced mode one maximum and one minimum sample per axis are dropped
/// from the average once at least three samples are buffered.
#[derive(Debug, Clone)]
pub struct SmoothingFilter {
    buffer: [[i32; 3]; MAX_STEPS],
    sum: [i64; 3],
    steps: usize,
    next: usize,
    filled: usize,
    advanced: bool,
}

impl SmoothingFilter {
    /// Create a filter; `steps` is clamped to `MIN_STEPS..=MAX_STEPS`.
    #[must_use]
    pub fn new(steps: usize, advanced: bool) -> Self {
        Self {
            buffer: [[0; 3]; MAX_STEPS],
            sum: [0; 3],
            steps: steps.clamp(MIN_STEPS, MAX_STEPS),
            next: 0,
            filled: 0,
            advanced,
        }
    }

    #[inline]
    #[must_use]
    pub const fn steps(&self) -> usize {
        self.steps
    }

    #[inline]
    #[must_use]
    pub const fn is_full(&self) -> bool {
        self.filled == self.steps
    }

    /// Drop all buffered samples.
    pub fn reset(&mut self) {
        self.sum = [0; 3];
        self.next = 0;
        self.filled = 0;
    }

    /// Push a sample and return the smoothed value.
    ///
    /// Until the window fills, the mean is taken over the samples seen so far.
    pub fn push(&mut self, sample: CalibratedSample) -> CalibratedSample {
        let axes = sample.axes();

        if self.is_full() {
            let evicted = self.buffer[self.next];
            for axis in 0..3 {
                self.sum[axis] -= i64::from(evicted[axis]);
            }
        } else {
            self.filled += 1;
        }

        self.buffer[self.next] = axes;
        for axis in 0..3 {
            self.sum[axis] += i64::from(axes[axis]);
        }
        self.next = (self.next + 1) % self.steps;

        let mut out = [0i32; 3];
        for (axis, value) in out.iter_mut().enumerate() {
            *value = self.average(axis);
        }
        CalibratedSample::from_axes(out)
    }

    fn average(&self, axis: usize) -> i32 {
        let count = self.filled as i64;
        if self.advanced && self.filled >= 3 {
            let window = &self.buffer[..self.filled];
            let max = window.iter().map(|s| s[axis]).max().unwrap_or(0);
            let min = window.iter().map(|s| s[axis]).min().unwrap_or(0);
            let trimmed = self.sum[axis] - i64::from(max) - i64::from(min);
            (trimmed / (count - 2)) as i32
        } else {
            (self.sum[axis] / count) as i32
        }
    }
}
