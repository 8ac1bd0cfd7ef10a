use serde::{Deserialize, Serialize};

use crate::error::{Result, SentPairError};

/// Learning-rate changes smaller than this are not applied.
const MIN_LR_DELTA: f64 = 1e-8;

/// Whether a larger or smaller metric counts as an improvement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlateauMode {
    Max,
    Min,
}

/// Multiplies the learning rate by `factor` once the monitored metric has
/// stopped improving for more than `patience` consecutive steps.
#[derive(Debug, Clone)]
pub struct ReduceLrOnPlateau {
    mode: PlateauMode,
    factor: f64,
    patience: usize,
    /// Relative improvement required to reset patience.
    threshold: f64,
    cooldown: usize,
    min_lr: f64,
    best: f64,
    bad_steps: usize,
    cooldown_left: usize,
}

impl ReduceLrOnPlateau {
    pub fn new(mode: PlateauMode, factor: f64, patience: usize) -> Result<Self> {
        if !(factor > 0.0 && factor < 1.0) {
            return Err(SentPairError::InvalidConfig(format!(
                "lr reduce factor must be in (0, 1), got {factor}"
            )));
        }
        Ok(Self {
            mode,
            factor,
            patience,
            threshold: 1e-4,
            cooldown: 0,
            min_lr: 0.0,
            best: match mode {
                PlateauMode::Max => f64::NEG_INFINITY,
                PlateauMode::Min => f64::INFINITY,
            },
            bad_steps: 0,
            cooldown_left: 0,
        })
    }

    #[must_use]
    pub fn with_cooldown(mut self, cooldown: usize) -> Self {
        self.cooldown = cooldown;
        self
    }

    #[must_use]
    pub fn with_min_lr(mut self, min_lr: f64) -> Self {
        self.min_lr = min_lr;
        self
    }

    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Best metric observed so far.
    #[must_use]
    pub fn best(&self) -> f64 {
        self.best
    }

    fn is_better(&self, metric: f64) -> bool {
        match self.mode {
            PlateauMode::Max => metric > self.best * (1.0 + self.threshold),
            PlateauMode::Min => metric < self.best * (1.0 - self.threshold),
        }
    }

    /// Records one epoch's metric. Returns the new learning rate when a
    /// reduction is due, `None` otherwise.
    pub fn step(&mut self, metric: f64, current_lr: f64) -> Option<f64> {
        if self.is_better(metric) {
            self.best = metric;
            self.bad_steps = 0;
        } else {
            self.bad_steps += 1;
        }

        if self.cooldown_left > 0 {
            self.cooldown_left -= 1;
            self.bad_steps = 0;
        }

        if self.bad_steps <= self.patience {
            return None;
        }

        self.cooldown_left = self.cooldown;
        self.bad_steps = 0;

        let new_lr = (current_lr * self.factor).max(self.min_lr);
        if current_lr - new_lr > MIN_LR_DELTA {
            tracing::info!(from = current_lr, to = new_lr, "reducing learning rate");
            Some(new_lr)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_factor() {
        assert!(ReduceLrOnPlateau::new(PlateauMode::Max, 1.0, 2).is_err());
        assert!(ReduceLrOnPlateau::new(PlateauMode::Max, 0.0, 2).is_err());
        assert!(ReduceLrOnPlateau::new(PlateauMode::Max, 0.3, 2).is_ok());
    }

    #[test]
    fn reduces_after_patience_exceeded() {
        let mut sched = ReduceLrOnPlateau::new(PlateauMode::Max, 0.5, 2).unwrap();
        let lr = 0.1;
        assert_eq!(sched.step(0.60, lr), None); // improvement
        assert_eq!(sched.step(0.55, lr), None); // bad 1
        assert_eq!(sched.step(0.58, lr), None); // bad 2
        let reduced = sched.step(0.59, lr).unwrap(); // bad 3 > patience
        assert!((reduced - 0.05).abs() < 1e-12);
        // counter resets after a reduction
        assert_eq!(sched.step(0.50, reduced), None);
    }

    #[test]
    fn improvement_resets_patience() {
        let mut sched = ReduceLrOnPlateau::new(PlateauMode::Max, 0.5, 1).unwrap();
        assert_eq!(sched.step(0.5, 1.0), None);
        assert_eq!(sched.step(0.4, 1.0), None);
        assert_eq!(sched.step(0.6, 1.0), None);
        assert_eq!(sched.step(0.6, 1.0), None);
        assert!(sched.step(0.6, 1.0).is_some());
        assert!((sched.best() - 0.6).abs() < 1e-12);
    }

    #[test]
    fn min_mode_tracks_decreasing_metric() {
        let mut sched = ReduceLrOnPlateau::new(PlateauMode::Min, 0.1, 0).unwrap();
        assert_eq!(sched.step(1.0, 1.0), None);
        assert_eq!(sched.step(0.5, 1.0), None);
        let lr = sched.step(0.7, 1.0).unwrap();
        assert!((lr - 0.1).abs() < 1e-12);
    }

    #[test]
    fn relative_threshold_ignores_tiny_gains() {
        let mut sched = ReduceLrOnPlateau::new(PlateauMode::Max, 0.5, 0)
            .unwrap()
            .with_threshold(0.01);
        assert_eq!(sched.step(1.0, 1.0), None);
        assert!(sched.step(1.005, 1.0).is_some());
    }

    #[test]
    fn cooldown_suppresses_reductions() {
        let mut sched = ReduceLrOnPlateau::new(PlateauMode::Max, 0.5, 0)
            .unwrap()
            .with_cooldown(2);
        assert_eq!(sched.step(1.0, 1.0), None);
        assert!(sched.step(0.9, 1.0).is_some());
        assert_eq!(sched.step(0.9, 0.5), None);
        assert_eq!(sched.step(0.9, 0.5), None);
        assert!(sched.step(0.9, 0.5).is_some());
    }

    #[test]
    fn respects_min_lr() {
        let mut sched = ReduceLrOnPlateau::new(PlateauMode::Max, 0.5, 0)
            .unwrap()
            .with_min_lr(0.4);
        assert_eq!(sched.step(1.0, 0.5), None);
        let lr = sched.step(0.9, 0.5).unwrap();
        assert!((lr - 0.4).abs() < 1e-12);
        // already at the floor: nothing to apply
        assert_eq!(sched.step(0.9, 0.4), None);
    }
}
