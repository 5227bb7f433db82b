//! Shared binning for the back-to-back histogram of two methods.
//!
//! Both vectors are counted against one edge set built over their union, so
//! each left/right bar pair sits on the same bin centre.

use serde::Serialize;
use tracing::debug;

use crate::error::{ensure_finite, FigureError, Result};

const SNAP_EPS: f64 = 1e-9;

/// Upper bound on the bin count a single call may allocate.
pub const MAX_BINS: usize = 100_000;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirroredHistogram {
    pub bin_width: f64,
    pub edges: Vec<f64>,
    pub counts_a: Vec<usize>,
    pub counts_b: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub center: f64,
    pub count_a: usize,
    pub count_b: usize,
}

impl MirroredHistogram {
    pub fn n_bins(&self) -> usize {
        self.counts_a.len()
    }

    pub fn centers(&self) -> Vec<f64> {
        self.edges
            .windows(2)
            .map(|w| (w[0] + w[1]) / 2.0)
            .collect()
    }

    /// A counts as negated magnitudes, drawn to the left of zero.
    pub fn left_magnitudes(&self) -> Vec<f64> {
        self.counts_a.iter().map(|&c| -(c as f64)).collect()
    }

    pub fn right_magnitudes(&self) -> Vec<f64> {
        self.counts_b.iter().map(|&c| c as f64).collect()
    }

    pub fn max_count(&self) -> usize {
        self.counts_a
            .iter()
            .chain(&self.counts_b)
            .copied()
            .max()
            .unwrap_or(0)
    }

    /// Index of the half-open bin `[e_i, e_{i+1})` containing `value`.
    pub fn bin_index(&self, value: f64) -> Option<usize> {
        let first = *self.edges.first()?;
        let last = *self.edges.last()?;
        if !value.is_finite() || value < first - SNAP_EPS * self.bin_width || value > last {
            return None;
        }
        Some(raw_index(value, first, self.bin_width).min(self.n_bins() - 1))
    }

    pub fn bins(&self) -> Vec<HistogramBin> {
        self.edges
            .windows(2)
            .zip(self.counts_a.iter().zip(&self.counts_b))
            .map(|(w, (&count_a, &count_b))| HistogramBin {
                lower: w[0],
                upper: w[1],
                center: (w[0] + w[1]) / 2.0,
                count_a,
                count_b,
            })
            .collect()
    }
}

fn snapped_quotient(value: f64, origin: f64, width: f64) -> f64 {
    let q = (value - origin) / width;
    let r = q.round();
    let idx = if (q - r).abs() < SNAP_EPS { r } else { q.floor() };
    idx.max(0.0)
}

/// Only called once the bin count is known to fit under [`MAX_BINS`].
fn raw_index(value: f64, origin: f64, width: f64) -> usize {
    snapped_quotient(value, origin, width) as usize
}

pub fn mirrored_histogram(a: &[f64], b: &[f64], bin_width: f64) -> Result<MirroredHistogram> {
    if !bin_width.is_finite() || bin_width <= 0.0 {
        return Err(FigureError::InvalidBinWidth(bin_width));
    }
    ensure_finite(a, "method A values")?;
    ensure_finite(b, "method B values")?;

    let (min, max) = a
        .iter()
        .chain(b)
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    let bins = snapped_quotient(max, min, bin_width) + 1.0;
    if !bins.is_finite() || bins > MAX_BINS as f64 {
        return Err(FigureError::TooManyBins {
            bin_width,
            bins,
            max: MAX_BINS,
        });
    }
    let n_bins = bins as usize;
    let edges: Vec<f64> = (0..=n_bins)
        .map(|i| min + i as f64 * bin_width)
        .collect();

    let count = |values: &[f64]| {
        let mut counts = vec![0usize; n_bins];
        for &v in values {
            counts[raw_index(v, min, bin_width).min(n_bins - 1)] += 1;
        }
        counts
    };
    let counts_a = count(a);
    let counts_b = count(b);

    debug!(
        "Mirrored histogram: {} bins of width {} from {} to {}",
        n_bins,
        bin_width,
        edges[0],
        edges[n_bins]
    );

    Ok(MirroredHistogram {
        bin_width,
        edges,
        counts_a,
        counts_b,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_edges_example() {
        let h = mirrored_histogram(&[0.05, 0.15], &[0.25], 0.1).unwrap();
        assert_eq!(h.counts_a.len(), h.counts_b.len());
        assert_eq!(h.edges.len(), h.counts_a.len() + 1);

        let i05 = h.bin_index(0.05).unwrap();
        assert_eq!((h.counts_a[i05], h.counts_b[i05]), (1, 0));

        let i25 = h.bin_index(0.25).unwrap();
        assert_eq!((h.counts_a[i25], h.counts_b[i25]), (0, 1));

        let i15 = h.bin_index(0.15).unwrap();
        assert_ne!(i15, i25);
        assert_eq!((h.counts_a[i15], h.counts_b[i15]), (1, 0));
    }

    #[test]
    fn test_edges_cover_observed_range() {
        let a = [1.3, 2.9, 4.1];
        let b = [0.2, 3.3];
        let h = mirrored_histogram(&a, &b, 0.5).unwrap();
        assert_eq!(h.edges[0], 0.2);
        assert!(*h.edges.last().unwrap() > 4.1);
        assert_eq!(h.counts_a.iter().sum::<usize>(), a.len());
        assert_eq!(h.counts_b.iter().sum::<usize>(), b.len());
    }

    #[test]
    fn test_identical_values_give_single_bin() {
        let h = mirrored_histogram(&[2.0, 2.0], &[2.0], 1.0).unwrap();
        assert_eq!(h.n_bins(), 1);
        assert_eq!(h.counts_a, vec![2]);
        assert_eq!(h.counts_b, vec![1]);
    }

    #[test]
    fn test_sign_convention() {
        let h = mirrored_histogram(&[0.0, 0.0, 1.0], &[1.0], 1.0).unwrap();
        assert_eq!(h.left_magnitudes(), vec![-2.0, -1.0]);
        assert_eq!(h.right_magnitudes(), vec![0.0, 1.0]);
        assert_eq!(h.max_count(), 2);
        assert_eq!(h.centers(), vec![0.5, 1.5]);
    }

    #[test]
    fn test_bins_table() {
        let h = mirrored_histogram(&[0.0, 1.0], &[1.5], 1.0).unwrap();
        let bins = h.bins();
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[1].lower, 1.0);
        assert_eq!(bins[1].upper, 2.0);
        assert_eq!(bins[1].count_a, 1);
        assert_eq!(bins[1].count_b, 1);
    }

    #[test]
    fn test_invalid_bin_width() {
        for w in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let err = mirrored_histogram(&[1.0], &[2.0], w).unwrap_err();
            assert!(matches!(err, FigureError::InvalidBinWidth(_)));
        }
    }

    #[test]
    fn test_tiny_bin_width_is_rejected_not_allocated() {
        for w in [f64::MIN_POSITIVE, 1e-300, 1e-6] {
            match mirrored_histogram(&[0.0], &[1.0], w) {
                Err(FigureError::TooManyBins { max, .. }) => assert_eq!(max, MAX_BINS),
                other => panic!("unexpected result {other:?}"),
            }
        }
    }

    #[test]
    fn test_bin_count_at_limit_is_accepted() {
        let w = 1.0 / (MAX_BINS - 1) as f64;
        let h = mirrored_histogram(&[0.0], &[1.0], w).unwrap();
        assert!(h.n_bins() <= MAX_BINS);
        assert_eq!(h.counts_b.iter().sum::<usize>(), 1);
    }

    #[test]
    fn test_empty_side_fails() {
        let err = mirrored_histogram(&[1.0], &[], 0.5).unwrap_err();
        assert!(matches!(err, FigureError::EmptyInput(_)));
    }

    #[test]
    fn test_out_of_range_lookup() {
        let h = mirrored_histogram(&[0.0], &[1.0], 1.0).unwrap();
        assert_eq!(h.bin_index(-0.5), None);
        assert_eq!(h.bin_index(2.5), None);
        assert_eq!(h.bin_index(f64::NAN), None);
    }
}
