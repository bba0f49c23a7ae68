//! Step detection from raw accelerometer samples
//!
//! A step is a rising crossing of the acceleration magnitude above a slowly
//! tracking baseline. Crossings closer together than the minimum step
//! interval are not counted.

/// Acceleration in raw sensor counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl AccelSample {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    pub fn magnitude(&self) -> f32 {
        let (x, y, z) = (f32::from(self.x), f32::from(self.y), f32::from(self.z));
        libm::sqrtf(x * x + y * y + z * z)
    }
}

/// Counts per g at the ±2 g range of the BMA421
pub const COUNTS_PER_G: f32 = 1024.0;

/// Rise over the baseline that counts as a step, ~0.15 g
const STEP_THRESHOLD: f32 = 0.15 * COUNTS_PER_G;

/// Nobody walks faster than four steps per second
const MIN_STEP_INTERVAL_MS: u64 = 250;

/// Baseline smoothing, alpha = 1/16
const BASELINE_WEIGHT: f32 = 1.0 / 16.0;

pub struct StepCounter {
    threshold: f32,
    min_interval_ms: u64,
    baseline: Option<f32>,
    above: bool,
    last_step_ms: Option<u64>,
    steps: u32,
}

impl Default for StepCounter {
    fn default() -> Self {
        Self::new(STEP_THRESHOLD, MIN_STEP_INTERVAL_MS)
    }
}

impl StepCounter {
    pub fn new(threshold: f32, min_interval_ms: u64) -> Self {
        Self {
            threshold,
            min_interval_ms,
            baseline: None,
            above: false,
            last_step_ms: None,
            steps: 0,
        }
    }

    /// Steps since the last reset
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Start a new day. The baseline is kept.
    pub fn reset(&mut self) {
        self.steps = 0;
        self.last_step_ms = None;
    }

    /// Feed one sample taken at `now_ms`. Returns whether it completed a step.
    pub fn update(&mut self, now_ms: u64, sample: &AccelSample) -> bool {
        let magnitude = sample.magnitude();
        let Some(baseline) = self.baseline else {
            self.baseline = Some(magnitude);
            return false;
        };

        let rise = magnitude - baseline;
        self.baseline = Some(baseline + (magnitude - baseline) * BASELINE_WEIGHT);

        if self.above {
            // Hysteresis: wait until the peak is over
            if rise < self.threshold / 2.0 {
                self.above = false;
            }
            return false;
        }

        if rise < self.threshold {
            return false;
        }
        self.above = true;

        let rested = self
            .last_step_ms
            .map_or(true, |last| now_ms.saturating_sub(last) >= self.min_interval_ms);
        if rested {
            self.last_step_ms = Some(now_ms);
            self.steps = self.steps.saturating_add(1);
        }
        rested
    }
}
