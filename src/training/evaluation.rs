//! Validation split and classification report.
//!
//! Measures how well the fitted lookup reproduces held-out labels:
//! overall accuracy plus per-label precision, recall and F1.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::BTreeMap;
use std::fmt;

use crate::advisory::nearest::NearestNeighborModel;
use crate::types::{DatasetRecord, ModelError};

// ---------------------------------------------------------------------------
// Split
// ---------------------------------------------------------------------------

/// Split per label so both halves keep the label mix.
///
/// Each label holds out `round(n * fraction)` rows, but never all of them
/// when it has more than one row.
pub fn stratified_split(
    records: &[DatasetRecord],
    fraction: f64,
    seed: u64,
) -> (Vec<DatasetRecord>, Vec<DatasetRecord>) {
    let fraction = fraction.clamp(0.0, 1.0);
    let mut by_label: BTreeMap<&str, Vec<&DatasetRecord>> = BTreeMap::new();
    for r in records {
        by_label.entry(r.advisory.as_str()).or_default().push(r);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let mut train = Vec::new();
    let mut validation = Vec::new();
    for group in by_label.values_mut() {
        group.shuffle(&mut rng);
        let n = group.len();
        let held_out = ((n as f64) * fraction).round() as usize;
        let held_out = if n > 1 { held_out.min(n - 1) } else { 0 };
        validation.extend(group[..held_out].iter().map(|r| (*r).clone()));
        train.extend(group[held_out..].iter().map(|r| (*r).clone()));
    }
    (train, validation)
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Scores for one label.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelScore {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub total: usize,
    /// Sorted by label.
    pub labels: Vec<LabelScore>,
}

impl ClassificationReport {
    /// Compare predictions against ground truth, pairwise.
    pub fn compute(actual: &[String], predicted: &[String]) -> Self {
        #[derive(Default)]
        struct Counts {
            tp: usize,
            fp: usize,
            fn_: usize,
            support: usize,
        }

        let mut counts: BTreeMap<&str, Counts> = BTreeMap::new();
        let mut correct = 0;
        for (a, p) in actual.iter().zip(predicted) {
            counts.entry(a.as_str()).or_default().support += 1;
            if a == p {
                correct += 1;
                counts.entry(a.as_str()).or_default().tp += 1;
            } else {
                counts.entry(a.as_str()).or_default().fn_ += 1;
                counts.entry(p.as_str()).or_default().fp += 1;
            }
        }

        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let labels = counts
            .into_iter()
            .map(|(label, c)| {
                let precision = ratio(c.tp, c.tp + c.fp);
                let recall = ratio(c.tp, c.tp + c.fn_);
                let f1 = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };
                LabelScore {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1,
                    support: c.support,
                }
            })
            .collect();

        let total = actual.len().min(predicted.len());
        Self {
            accuracy: ratio(correct, total),
            total,
            labels,
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:<52} {:>9} {:>9} {:>9} {:>8}", "label", "precision", "recall", "f1", "support")?;
        for s in &self.labels {
            writeln!(
                f,
                "{:<52} {:>9.2} {:>9.2} {:>9.2} {:>8}",
                s.label, s.precision, s.recall, s.f1, s.support
            )?;
        }
        write!(f, "accuracy: {:.3} ({} rows)", self.accuracy, self.total)
    }
}

/// Predict every validation row and score the result.
pub fn evaluate(
    model: &NearestNeighborModel,
    validation: &[DatasetRecord],
) -> Result<ClassificationReport, ModelError> {
    let actual: Vec<String> = validation.iter().map(|r| r.advisory.clone()).collect();
    let predicted = validation
        .iter()
        .map(|r| model.predict(&r.to_input()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ClassificationReport::compute(&actual, &predicted))
}
