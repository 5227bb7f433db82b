//! Seeded demo vectors used when no input table is supplied.
//!
//! Only the measurements are simulated. No significance values are drawn, so
//! demo rank plots are labelled on fold change alone.

use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;
use tracing::info;

use crate::data_handling::paired_table::PairedInput;
use crate::error::{FigureError, Result};

/// Shape of the simulated method comparison: A ~ N(level, spread), and
/// B = A + N(offset, noise).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairedDemo {
    pub level: f64,
    pub spread: f64,
    pub offset: f64,
    pub noise: f64,
}

impl Default for PairedDemo {
    fn default() -> Self {
        Self {
            level: 20.0,
            spread: 2.0,
            offset: 0.3,
            noise: 0.5,
        }
    }
}

fn normal(mean: f64, sd: f64) -> Result<Normal> {
    Normal::new(mean, sd).map_err(|e| FigureError::InvalidDistribution(e.to_string()))
}

pub fn demo_log2_ratios(n: usize, seed: u64) -> Result<Vec<f64>> {
    if n == 0 {
        return Err(FigureError::EmptyInput("demo size"));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let dist = normal(0.0, 1.0)?;
    info!("Synthesizing {n} demo log2 ratios (seed {seed})");
    Ok((0..n).map(|_| dist.sample(&mut rng)).collect())
}

pub fn demo_paired(n: usize, seed: u64, params: &PairedDemo) -> Result<PairedInput> {
    if n == 0 {
        return Err(FigureError::EmptyInput("demo size"));
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let level = normal(params.level, params.spread)?;
    let error = normal(params.offset, params.noise)?;
    info!("Synthesizing {n} demo measurement pairs (seed {seed})");

    let a: Vec<f64> = (0..n).map(|_| level.sample(&mut rng)).collect();
    let b: Vec<f64> = a.iter().map(|&x| x + error.sample(&mut rng)).collect();
    Ok(PairedInput { a, b })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_vector() {
        let x = demo_log2_ratios(100, 7).unwrap();
        let y = demo_log2_ratios(100, 7).unwrap();
        assert_eq!(x, y);
        assert_ne!(x, demo_log2_ratios(100, 8).unwrap());
        assert!(x.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_paired_demo_has_offset() {
        let pairs = demo_paired(2000, 42, &PairedDemo::default()).unwrap();
        assert_eq!(pairs.a.len(), 2000);
        assert_eq!(pairs.b.len(), 2000);
        let mean_diff: f64 =
            pairs.b.iter().zip(&pairs.a).map(|(b, a)| b - a).sum::<f64>() / 2000.0;
        assert!((mean_diff - 0.3).abs() < 0.1, "mean diff {mean_diff}");
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(matches!(
            demo_log2_ratios(0, 1),
            Err(FigureError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_invalid_spread_rejected() {
        let params = PairedDemo {
            spread: -1.0,
            ..PairedDemo::default()
        };
        assert!(matches!(
            demo_paired(10, 1, &params),
            Err(FigureError::InvalidDistribution(_))
        ));
    }
}
