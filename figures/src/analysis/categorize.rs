//! Regulation categories for the rank–log2 plot.
//!
//! Labels are either supplied by the caller or derived from a fold-change
//! threshold plus an optional per-element significance value. Labels are
//! attached before ranking so they travel with their values through the sort.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{ensure_finite, FigureError, Result};
use crate::models::{Category, RankedPoint};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelRule {
    /// Minimum |log2 ratio| for a regulated call.
    pub threshold: f64,
    /// Values strictly below this count as significant.
    pub significance_cutoff: f64,
}

impl Default for LabelRule {
    fn default() -> Self {
        Self {
            threshold: 1.5f64.log2(),
            significance_cutoff: 0.05,
        }
    }
}

impl LabelRule {
    pub fn classify(&self, value: f64, significant: bool) -> Category {
        if significant && value >= self.threshold {
            Category::Upregulated
        } else if significant && value <= -self.threshold {
            Category::DownRegulated
        } else {
            Category::Unchanged
        }
    }
}

/// Labels every value from the threshold alone, treating all as significant.
pub fn auto_label(values: &[f64], rule: &LabelRule) -> Result<Vec<Category>> {
    label_with_significance(values, None, rule)
}

pub fn label_with_significance(
    values: &[f64],
    significance: Option<&[f64]>,
    rule: &LabelRule,
) -> Result<Vec<Category>> {
    ensure_finite(values, "log2 ratios")?;

    match significance {
        Some(p) => {
            if p.len() != values.len() {
                return Err(FigureError::ShapeMismatch {
                    what: "significance values",
                    expected: values.len(),
                    got: p.len(),
                });
            }
            Ok(values
                .iter()
                .zip(p)
                .map(|(&v, &p)| rule.classify(v, p < rule.significance_cutoff))
                .collect())
        }
        None => {
            debug!("No significance values supplied; labelling on fold change only");
            Ok(values.iter().map(|&v| rule.classify(v, true)).collect())
        }
    }
}

pub fn parse_labels(labels: &[String], expected_len: usize) -> Result<Vec<Category>> {
    if labels.len() != expected_len {
        return Err(FigureError::ShapeMismatch {
            what: "category labels",
            expected: expected_len,
            got: labels.len(),
        });
    }
    labels
        .iter()
        .enumerate()
        .map(|(index, raw)| {
            raw.parse::<Category>()
                .map_err(|label| FigureError::UnknownCategory { label, index })
        })
        .collect()
}

/// Explicit labels win; otherwise labels are derived from `values`.
pub fn resolve_labels(
    values: &[f64],
    explicit: Option<&[String]>,
    significance: Option<&[f64]>,
    rule: &LabelRule,
) -> Result<Vec<Category>> {
    match explicit {
        Some(labels) => {
            ensure_finite(values, "log2 ratios")?;
            info!("Using {} caller-supplied category labels", labels.len());
            parse_labels(labels, values.len())
        }
        None => label_with_significance(values, significance, rule),
    }
}

/// Sorts descending by value and assigns 1-based ranks. Ties keep input order.
pub fn rank_points(values: &[f64], labels: &[Category]) -> Result<Vec<RankedPoint>> {
    ensure_finite(values, "log2 ratios")?;
    if labels.len() != values.len() {
        return Err(FigureError::ShapeMismatch {
            what: "category labels",
            expected: values.len(),
            got: labels.len(),
        });
    }

    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));

    Ok(order
        .into_iter()
        .enumerate()
        .map(|(pos, source_index)| RankedPoint {
            rank: pos + 1,
            value: values[source_index],
            category: labels[source_index],
            source_index,
        })
        .collect())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryCounts {
    pub counts: BTreeMap<Category, usize>,
}

impl CategoryCounts {
    pub fn tally(labels: &[Category]) -> Self {
        let mut counts: BTreeMap<Category, usize> =
            Category::ALL.iter().map(|&c| (c, 0)).collect();
        for &c in labels {
            *counts.entry(c).or_insert(0) += 1;
        }
        Self { counts }
    }

    pub fn get(&self, category: Category) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_threshold_labels_with_all_significant() {
        let rule = LabelRule::default();
        let y = [2.0, -2.0, 0.1];
        let p = [0.001, 0.001, 0.001];
        let labels = label_with_significance(&y, Some(&p), &rule).unwrap();
        assert_eq!(
            labels,
            vec![
                Category::Upregulated,
                Category::DownRegulated,
                Category::Unchanged
            ]
        );
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let rule = LabelRule {
            threshold: 1.0,
            significance_cutoff: 0.05,
        };
        let labels = auto_label(&[1.0, -1.0, 0.999], &rule).unwrap();
        assert_eq!(
            labels,
            vec![
                Category::Upregulated,
                Category::DownRegulated,
                Category::Unchanged
            ]
        );
    }

    #[test]
    fn test_not_significant_is_unchanged() {
        let rule = LabelRule::default();
        let labels =
            label_with_significance(&[3.0, -3.0], Some(&[0.05, 0.2]), &rule).unwrap();
        assert_eq!(labels, vec![Category::Unchanged, Category::Unchanged]);
    }

    #[test]
    fn test_significance_length_mismatch() {
        let err = label_with_significance(&[1.0, 2.0], Some(&[0.01]), &LabelRule::default())
            .unwrap_err();
        assert!(matches!(
            err,
            FigureError::ShapeMismatch {
                expected: 2,
                got: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_values_fail() {
        let err = auto_label(&[], &LabelRule::default()).unwrap_err();
        assert!(matches!(err, FigureError::EmptyInput(_)));
    }

    #[test]
    fn test_explicit_labels_must_match_length() {
        let err = resolve_labels(
            &[1.0, 2.0, 3.0],
            Some(&strings(&["Upregulated", "Unchanged"])),
            None,
            &LabelRule::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            FigureError::ShapeMismatch {
                what: "category labels",
                expected: 3,
                got: 2
            }
        ));
    }

    #[test]
    fn test_explicit_labels_must_be_known() {
        let err = resolve_labels(
            &[1.0, 2.0],
            Some(&strings(&["Upregulated", "Maybe"])),
            None,
            &LabelRule::default(),
        )
        .unwrap_err();
        match err {
            FigureError::UnknownCategory { label, index } => {
                assert_eq!(label, "Maybe");
                assert_eq!(index, 1);
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_explicit_labels_override_threshold() {
        let labels = resolve_labels(
            &[0.0, 5.0],
            Some(&strings(&["Down-regulated", "Unchanged"])),
            Some(&[0.0, 0.0]),
            &LabelRule::default(),
        )
        .unwrap();
        assert_eq!(labels, vec![Category::DownRegulated, Category::Unchanged]);
    }

    #[test]
    fn test_rank_carries_labels_through_sort() {
        let y = [0.1, 2.0, -2.0, 0.5];
        let labels = auto_label(&y, &LabelRule::default()).unwrap();
        let ranked = rank_points(&y, &labels).unwrap();

        let values: Vec<f64> = ranked.iter().map(|p| p.value).collect();
        assert_eq!(values, vec![2.0, 0.5, 0.1, -2.0]);
        let ranks: Vec<usize> = ranked.iter().map(|p| p.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3, 4]);
        assert_eq!(ranked[0].category, Category::Upregulated);
        assert_eq!(ranked[0].source_index, 1);
        assert_eq!(ranked[3].category, Category::DownRegulated);
        assert_eq!(ranked[3].source_index, 2);
    }

    #[test]
    fn test_rank_ties_keep_input_order() {
        let y = [1.0, 1.0, 1.0];
        let labels = [
            Category::Unchanged,
            Category::Upregulated,
            Category::DownRegulated,
        ];
        let ranked = rank_points(&y, &labels).unwrap();
        let idx: Vec<usize> = ranked.iter().map(|p| p.source_index).collect();
        assert_eq!(idx, vec![0, 1, 2]);
    }

    #[test]
    fn test_counts() {
        let counts = CategoryCounts::tally(&[
            Category::Upregulated,
            Category::Upregulated,
            Category::Unchanged,
        ]);
        assert_eq!(counts.get(Category::Upregulated), 2);
        assert_eq!(counts.get(Category::DownRegulated), 0);
        assert_eq!(counts.get(Category::Unchanged), 1);
        assert_eq!(counts.total(), 3);
    }
}
