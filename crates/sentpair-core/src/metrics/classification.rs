use crate::error::{ensure_same_len, Result};

/// Probability at or above which a pair is predicted as a paraphrase.
pub const DEFAULT_THRESHOLD: f32 = 0.5;

/// Maps positive-class probabilities to hard 0/1 predictions.
#[must_use]
pub fn threshold(probabilities: &[f32], cutoff: f32) -> Vec<u32> {
    probabilities
        .iter()
        .map(|&p| u32::from(p >= cutoff))
        .collect()
}

/// Fraction of predictions equal to their label. Empty input scores 0.
pub fn accuracy(labels: &[u32], predictions: &[u32]) -> Result<f64> {
    ensure_same_len("labels/predictions", labels.len(), predictions.len())?;
    if labels.is_empty() {
        return Ok(0.0);
    }
    let correct = labels
        .iter()
        .zip(predictions)
        .filter(|(l, p)| l == p)
        .count();
    Ok(correct as f64 / labels.len() as f64)
}

/// Binary F1 with class `1` as the positive class.
///
/// Precision or recall with a zero denominator counts as 0, so a run with no
/// true positives scores 0 rather than NaN.
pub fn f1_score(labels: &[u32], predictions: &[u32]) -> Result<f64> {
    ensure_same_len("labels/predictions", labels.len(), predictions.len())?;

    let (mut tp, mut fp, mut fn_) = (0usize, 0usize, 0usize);
    for (&label, &pred) in labels.iter().zip(predictions) {
        match (label == 1, pred == 1) {
            (true, true) => tp += 1,
            (false, true) => fp += 1,
            (true, false) => fn_ += 1,
            (false, false) => {}
        }
    }

    if tp == 0 {
        return Ok(0.0);
    }
    let precision = tp as f64 / (tp + fp) as f64;
    let recall = tp as f64 / (tp + fn_) as f64;
    Ok(2.0 * precision * recall / (precision + recall))
}

/// Summed per-example cross-entropy divided by the number of examples.
#[must_use]
pub fn mean_cross_entropy(total_loss: f64, examples: usize) -> f64 {
    if examples == 0 {
        0.0
    } else {
        total_loss / examples as f64
    }
}
