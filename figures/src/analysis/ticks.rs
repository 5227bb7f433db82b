//! "Nice number" axis scaling.
//!
//! Picks a tick step of the form {1, 2, 5, 10} × 10^k and snaps the axis bounds
//! outward to multiples of that step. Each axis of each plot calls
//! [`nice_scale`] independently.

use serde::Serialize;
use tracing::debug;

pub const MIN_TARGET_TICKS: usize = 3;

/// Quotients closer than this to an integer are treated as that integer.
const SNAP_EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisScale {
    pub lo: f64,
    pub hi: f64,
    pub step: f64,
}

impl AxisScale {
    pub const FALLBACK: AxisScale = AxisScale {
        lo: -1.0,
        hi: 1.0,
        step: 0.5,
    };

    /// Number of step intervals between `lo` and `hi`.
    pub fn intervals(&self) -> usize {
        ((self.hi - self.lo) / self.step).round().max(0.0) as usize
    }

    pub fn ticks(&self) -> Vec<f64> {
        (0..=self.intervals())
            .map(|i| self.lo + i as f64 * self.step)
            .collect()
    }

    /// Decimals needed to print tick labels without losing the step.
    pub fn decimals(&self) -> usize {
        let exp = self.step.log10().floor();
        if exp >= 0.0 {
            0
        } else {
            (-exp) as usize
        }
    }

    pub fn range(&self) -> std::ops::Range<f64> {
        self.lo..self.hi
    }
}

pub fn nice_scale(min: f64, max: f64, target_ticks: usize) -> AxisScale {
    if !min.is_finite() || !max.is_finite() {
        debug!("Non-finite axis extent ({min}, {max}); using fallback scale");
        return AxisScale::FALLBACK;
    }

    let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
    let target = target_ticks.max(MIN_TARGET_TICKS) as f64;

    let (lo, hi) = if lo == hi {
        let pad = if lo == 0.0 { 1.0 } else { 0.1 * lo.abs() };
        (lo - pad, hi + pad)
    } else {
        (lo, hi)
    };

    let step = nice_step((hi - lo) / target);

    AxisScale {
        lo: snapped_floor(lo / step) * step,
        hi: snapped_ceil(hi / step) * step,
        step,
    }
}

/// Rounds a raw step to the nearest 1/2/5/10 × 10^k.
pub fn nice_step(rough: f64) -> f64 {
    let exp = rough.log10().floor();
    let magnitude = 10f64.powf(exp);
    let mantissa = rough / magnitude;
    let base = if mantissa < 1.5 {
        1.0
    } else if mantissa < 3.5 {
        2.0
    } else if mantissa < 7.5 {
        5.0
    } else {
        10.0
    };
    base * magnitude
}

fn snapped_floor(q: f64) -> f64 {
    let r = q.round();
    if (q - r).abs() < SNAP_EPS {
        r
    } else {
        q.floor()
    }
}

fn snapped_ceil(q: f64) -> f64 {
    let r = q.round();
    if (q - r).abs() < SNAP_EPS {
        r
    } else {
        q.ceil()
    }
}
