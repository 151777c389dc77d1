//! Evaluation metrics for a thresholded matcher against labelled text pairs.
//!
//! Used to pick `MATCH_THRESHOLD`: score every pair once, then sweep thresholds and
//! compare accuracy / precision / recall / F1.

use serde::{Deserialize, Serialize};

use crate::matching::service::MatchService;

/// Thresholds swept when the caller does not supply any.
pub const DEFAULT_THRESHOLDS: &[f64] = &[0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelledPair {
    pub left: String,
    pub right: String,
    pub is_match: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub true_positive: usize,
    pub true_negative: usize,
    pub false_positive: usize,
    pub false_negative: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_positive + self.true_negative + self.false_positive + self.false_negative
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub confusion: ConfusionMatrix,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdReport {
    pub threshold: f64,
    pub metrics: EvaluationMetrics,
}

/// Compares predictions with ground truth, position by position. Extra items on the
/// longer side are ignored. Every ratio with a zero denominator is reported as 0.0.
pub fn compute_metrics(ground_truth: &[bool], predictions: &[bool]) -> EvaluationMetrics {
    let mut confusion = ConfusionMatrix::default();
    for (&actual, &predicted) in ground_truth.iter().zip(predictions) {
        match (actual, predicted) {
            (true, true) => confusion.true_positive += 1,
            (false, false) => confusion.true_negative += 1,
            (false, true) => confusion.false_positive += 1,
            (true, false) => confusion.false_negative += 1,
        }
    }

    let ratio = |num: usize, den: usize| {
        if den == 0 {
            0.0
        } else {
            num as f64 / den as f64
        }
    };

    let accuracy = ratio(
        confusion.true_positive + confusion.true_negative,
        confusion.total(),
    );
    let precision = ratio(
        confusion.true_positive,
        confusion.true_positive + confusion.false_positive,
    );
    let recall = ratio(
        confusion.true_positive,
        confusion.true_positive + confusion.false_negative,
    );
    let f1_score = if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    };

    EvaluationMetrics {
        accuracy,
        precision,
        recall,
        f1_score,
        confusion,
    }
}

/// Scores each pair once, then evaluates `score > threshold` for every threshold given.
pub fn sweep_thresholds(
    service: &MatchService,
    pairs: &[LabelledPair],
    thresholds: &[f64],
) -> Vec<ThresholdReport> {
    let scores: Vec<f64> = pairs
        .iter()
        .map(|p| service.similarity(&p.left, &p.right))
        .collect();
    let ground_truth: Vec<bool> = pairs.iter().map(|p| p.is_match).collect();

    thresholds
        .iter()
        .map(|&threshold| {
            let predictions: Vec<bool> = scores.iter().map(|&s| s > threshold).collect();
            ThresholdReport {
                threshold,
                metrics: compute_metrics(&ground_truth, &predictions),
            }
        })
        .collect()
}
