/// Dev loss change at or below which training stops.
pub const DEFAULT_LOSS_TOLERANCE: f64 = 0.0002;

/// Stops training once the dev loss stops moving between epochs.
#[derive(Debug, Clone)]
pub struct LossDeltaStopper {
    tolerance: f64,
    prev_loss: f64,
}

impl LossDeltaStopper {
    #[must_use]
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            prev_loss: -1.0,
        }
    }

    /// Returns true when `loss` is within `tolerance` of the previous
    /// epoch's loss. Otherwise remembers it for the next call.
    pub fn observe(&mut self, loss: f64) -> bool {
        if (self.prev_loss - loss).abs() <= self.tolerance {
            return true;
        }
        self.prev_loss = loss;
        false
    }

    #[must_use]
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }
}

impl Default for LossDeltaStopper {
    fn default() -> Self {
        Self::new(DEFAULT_LOSS_TOLERANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_when_loss_plateaus() {
        let mut stopper = LossDeltaStopper::default();
        assert!(!stopper.observe(0.70));
        assert!(!stopper.observe(0.60));
        assert!(stopper.observe(0.6001));
    }

    #[test]
    fn boundary_is_inclusive() {
        let mut stopper = LossDeltaStopper::new(0.5);
        assert!(!stopper.observe(2.0));
        assert!(stopper.observe(1.5));
    }

    #[test]
    fn first_observation_compares_against_sentinel() {
        let mut stopper = LossDeltaStopper::default();
        assert!(stopper.observe(-1.0));
    }
}
