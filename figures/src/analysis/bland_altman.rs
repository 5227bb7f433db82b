//! Bland–Altman agreement statistics for two paired measurement vectors.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::info;

use crate::error::{ensure_finite, FigureError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SdEstimator {
    /// Divide by n − 1.
    Sample,
    /// Divide by n.
    Population,
}

impl FromStr for SdEstimator {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sample" => Ok(SdEstimator::Sample),
            "population" => Ok(SdEstimator::Population),
            other => Err(format!(
                "unknown SD estimator `{other}` (use sample|population)"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgreementConfig {
    pub estimator: SdEstimator,
    /// Width of the limits of agreement in SDs.
    pub multiplier: f64,
}

impl Default for AgreementConfig {
    fn default() -> Self {
        Self {
            estimator: SdEstimator::Sample,
            multiplier: 1.96,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlandAltman {
    pub average: Vec<f64>,
    pub difference: Vec<f64>,
    pub n: usize,
    pub bias: f64,
    pub sd: f64,
    pub upper_loa: f64,
    pub lower_loa: f64,
    pub estimator: SdEstimator,
    pub multiplier: f64,
}

impl BlandAltman {
    /// Number of differences inside the closed interval [lower, upper].
    pub fn within_limits(&self) -> usize {
        self.difference
            .iter()
            .filter(|&&d| d >= self.lower_loa && d <= self.upper_loa)
            .count()
    }

    pub fn within_limits_fraction(&self) -> f64 {
        self.within_limits() as f64 / self.n as f64
    }

    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.average
            .iter()
            .copied()
            .zip(self.difference.iter().copied())
    }
}

pub fn bland_altman(a: &[f64], b: &[f64], config: &AgreementConfig) -> Result<BlandAltman> {
    if a.len() != b.len() {
        return Err(FigureError::LengthMismatch {
            a: a.len(),
            b: b.len(),
        });
    }
    ensure_finite(a, "method A values")?;
    ensure_finite(b, "method B values")?;

    let (average, difference): (Vec<f64>, Vec<f64>) = a
        .iter()
        .zip(b)
        .map(|(&x, &y)| ((x + y) / 2.0, x - y))
        .unzip();

    let n = difference.len();
    let bias = difference.iter().mean();
    let sd = match (n, config.estimator) {
        (1, _) => 0.0,
        (_, SdEstimator::Sample) => difference.iter().std_dev(),
        (_, SdEstimator::Population) => difference.iter().population_std_dev(),
    };

    let half_width = config.multiplier * sd;
    let summary = BlandAltman {
        average,
        difference,
        n,
        bias,
        sd,
        upper_loa: bias + half_width,
        lower_loa: bias - half_width,
        estimator: config.estimator,
        multiplier: config.multiplier,
    };

    info!(
        "Bland–Altman over {} pairs: bias={:.4}, sd={:.4}, LoA=[{:.4}, {:.4}]",
        summary.n, summary.bias, summary.sd, summary.lower_loa, summary.upper_loa
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-9;

    #[test]
    fn test_identical_methods_agree_perfectly() {
        let ba = bland_altman(&[1.0, 2.0, 3.0], &[1.0, 2.0, 3.0], &AgreementConfig::default())
            .unwrap();
        assert_eq!(ba.bias, 0.0);
        assert_eq!(ba.sd, 0.0);
        assert_eq!(ba.upper_loa, 0.0);
        assert_eq!(ba.lower_loa, 0.0);
        assert_eq!(ba.difference, vec![0.0, 0.0, 0.0]);
        assert_eq!(ba.average, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_two_pair_example() {
        let ba = bland_altman(&[2.0, 4.0], &[0.0, 0.0], &AgreementConfig::default()).unwrap();
        assert_eq!(ba.average, vec![1.0, 2.0]);
        assert_eq!(ba.difference, vec![2.0, 4.0]);
        assert!((ba.bias - 3.0).abs() < TOL);
        assert!((ba.sd - 2f64.sqrt()).abs() < TOL);
        assert!((ba.upper_loa - (3.0 + 1.96 * 2f64.sqrt())).abs() < TOL);
        assert!((ba.lower_loa - (3.0 - 1.96 * 2f64.sqrt())).abs() < TOL);
        assert!((ba.upper_loa - 5.772).abs() < 1e-3);
        assert!((ba.lower_loa - 0.228).abs() < 1e-3);
        assert_eq!(ba.n, 2);
    }

    #[test]
    fn test_population_estimator() {
        let cfg = AgreementConfig {
            estimator: SdEstimator::Population,
            multiplier: 1.96,
        };
        let ba = bland_altman(&[2.0, 4.0], &[0.0, 0.0], &cfg).unwrap();
        assert!((ba.sd - 1.0).abs() < TOL);
    }

    #[test]
    fn test_length_mismatch_fails_first() {
        let err = bland_altman(&[1.0, 2.0, 3.0], &[1.0, 2.0], &AgreementConfig::default())
            .unwrap_err();
        assert!(matches!(err, FigureError::LengthMismatch { a: 3, b: 2 }));
    }

    #[test]
    fn test_empty_input_fails() {
        let err = bland_altman(&[], &[], &AgreementConfig::default()).unwrap_err();
        assert!(matches!(err, FigureError::EmptyInput(_)));
    }

    #[test]
    fn test_non_finite_input_fails() {
        let err = bland_altman(&[1.0, f64::NAN], &[1.0, 2.0], &AgreementConfig::default())
            .unwrap_err();
        assert!(matches!(err, FigureError::NonFinite { index: 1, .. }));
    }

    #[test]
    fn test_single_pair_has_zero_spread() {
        let ba = bland_altman(&[5.0], &[3.0], &AgreementConfig::default()).unwrap();
        assert_eq!(ba.bias, 2.0);
        assert_eq!(ba.sd, 0.0);
        assert_eq!(ba.upper_loa, 2.0);
        assert_eq!(ba.lower_loa, 2.0);
    }

    #[test]
    fn test_within_limits() {
        let a = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 30.0];
        let b = [1.0; 10];
        let ba = bland_altman(&a, &b, &AgreementConfig::default()).unwrap();
        assert_eq!(ba.within_limits(), 9);
        assert!((ba.within_limits_fraction() - 0.9).abs() < TOL);
    }

    #[test]
    fn test_estimator_parsing() {
        assert_eq!("Sample".parse::<SdEstimator>().unwrap(), SdEstimator::Sample);
        assert_eq!(
            "population".parse::<SdEstimator>().unwrap(),
            SdEstimator::Population
        );
        assert!("robust".parse::<SdEstimator>().is_err());
    }
}
