//! Validation-loss early stopping.

/// Tracks the best validation loss and how long it has gone unimproved.
///
/// # Example
///
/// ```
/// use egan_nn::training::EarlyStopping;
///
/// let mut stopper = EarlyStopping::new(2);
/// assert!(!stopper.observe(1.0));
/// assert!(!stopper.observe(1.5));
/// assert!(stopper.observe(1.2));
/// assert_eq!(stopper.min_loss(), 1.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct EarlyStopping {
    patience: usize,
    min_loss: f32,
    stall: usize,
}

impl EarlyStopping {
    /// Creates a tracker that halts after `patience` non-improving epochs.
    pub fn new(patience: usize) -> Self {
        Self {
            patience,
            min_loss: f32::INFINITY,
            stall: 0,
        }
    }

    /// Records one epoch's validation loss and returns `true` when
    /// training should stop.
    ///
    /// Only a loss strictly below the best so far counts as improvement;
    /// NaN never does.
    pub fn observe(&mut self, loss: f32) -> bool {
        if loss < self.min_loss {
            self.min_loss = loss;
            self.stall = 0;
            return false;
        }
        self.stall += 1;
        self.stall >= self.patience
    }

    /// Best loss seen so far (`+inf` before any observation).
    pub fn min_loss(&self) -> f32 {
        self.min_loss
    }

    /// Consecutive non-improving epochs since the last improvement.
    pub fn stall_count(&self) -> usize {
        self.stall
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Feeds `losses` until the stopper fires; returns epochs run.
    fn epochs_until_stop(patience: usize, losses: &[f32]) -> usize {
        let mut stopper = EarlyStopping::new(patience);
        for (i, &loss) in losses.iter().enumerate() {
            if stopper.observe(loss) {
                return i + 1;
            }
        }
        losses.len()
    }

    #[test]
    fn halts_after_exactly_patience_stalls() {
        // minimum at epoch 3, then 4 non-improving epochs
        let losses = [0.9, 0.8, 0.5, 0.6, 0.7, 0.5, 0.9, 0.1];
        assert_eq!(epochs_until_stop(4, &losses), 7);
    }

    #[test]
    fn improvement_resets_counter() {
        let mut stopper = EarlyStopping::new(3);
        stopper.observe(1.0);
        stopper.observe(2.0);
        stopper.observe(2.0);
        assert_eq!(stopper.stall_count(), 2);
        assert!(!stopper.observe(0.5));
        assert_eq!(stopper.stall_count(), 0);
        assert_eq!(stopper.min_loss(), 0.5);
    }

    #[test]
    fn never_fires_while_improving() {
        let losses: Vec<f32> = (0..100).map(|i| 1.0 / (i as f32 + 1.0)).collect();
        assert_eq!(epochs_until_stop(1, &losses), 100);
    }

    #[test]
    fn nan_counts_as_stall() {
        let mut stopper = EarlyStopping::new(1);
        assert!(!stopper.observe(0.3));
        assert!(stopper.observe(f32::NAN));
        assert_eq!(stopper.min_loss(), 0.3);
    }

    #[test]
    fn zero_patience_stops_on_first_stall() {
        assert_eq!(epochs_until_stop(0, &[1.0, 1.0, 0.5]), 2);
    }
}
