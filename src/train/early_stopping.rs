//! Early stopping with best-checkpoint restore

use crate::io::CheckpointStore;
use crate::model::Model;
use crate::Result;

/// Checkpoint name used for the best-so-far snapshot
pub const BEST_CHECKPOINT: &str = "early_stopping";

/// Halts training when validation loss stops improving
///
/// Every improving epoch overwrites the [`BEST_CHECKPOINT`] snapshot, so
/// the checkpoint on disk always corresponds to the best validation loss
/// observed so far. When `patience` consecutive non-improving epochs are
/// exceeded, the snapshot is restored into the model and training stops.
#[derive(Debug, Clone)]
pub struct EarlyStopping {
    best_loss: f32,
    patience: usize,
    strikes: usize,
}

impl EarlyStopping {
    /// Create with a patience budget
    pub fn new(patience: usize) -> Self {
        Self {
            best_loss: f32::INFINITY,
            patience,
            strikes: 0,
        }
    }

    /// Epoch-end check. Returns `true` when training should stop, in which
    /// case the best checkpoint has been restored into `model`.
    ///
    /// A validation loss equal to the best counts as an improvement and
    /// refreshes the snapshot.
    pub fn check<M: Model>(
        &mut self,
        val_loss: f32,
        model: &mut M,
        store: &CheckpointStore,
    ) -> Result<bool> {
        if val_loss > self.best_loss {
            self.strikes += 1;
            if self.strikes > self.patience {
                println!("early stopping");
                model.load_state(store.load(BEST_CHECKPOINT)?)?;
                return Ok(true);
            }
        } else {
            self.best_loss = val_loss;
            self.strikes = 0;
            store.save(BEST_CHECKPOINT, &model.state())?;
        }
        Ok(false)
    }

    /// Best validation loss observed so far
    pub fn best_loss(&self) -> f32 {
        self.best_loss
    }

    /// Consecutive non-improving epochs
    pub fn strikes(&self) -> usize {
        self.strikes
    }
}


#[cfg(test)]
mod tests {
    use super::stub::Stub;
    use super::*;

    #[test]
    fn test_improvement_saves_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        let mut model = Stub::new(1.0);
        let mut es = EarlyStopping::new(2);

        assert!(!es.check(0.5, &mut model, &store).unwrap());
        assert_eq!(es.best_loss(), 0.5);
        assert_eq!(store.load(BEST_CHECKPOINT).unwrap().data, vec![1.0]);
    }

    #[test]
    fn test_equal_loss_counts_as_improvement() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        let mut model = Stub::new(1.0);
        let mut es = EarlyStopping::new(1);

        assert!(!es.check(0.5, &mut model, &store).unwrap());
        model.weight[0] = 2.0;
        assert!(!es.check(0.5, &mut model, &store).unwrap());

        assert_eq!(es.strikes(), 0);
        // Snapshot refreshed with the newer parameters
        assert_eq!(store.load(BEST_CHECKPOINT).unwrap().data, vec![2.0]);
    }

    #[test]
    fn test_stops_after_patience_and_restores() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        let mut model = Stub::new(1.0);
        let mut es = EarlyStopping::new(2);

        // Epoch 1: best so far, snapshot carries weight 1.0
        assert!(!es.check(1.0, &mut model, &store).unwrap());

        // Worsening epochs mutate the parameters
        model.weight[0] = 5.0;
        assert!(!es.check(2.0, &mut model, &store).unwrap());
        assert!(!es.check(3.0, &mut model, &store).unwrap());

        // Third worsening epoch exceeds patience: stop at epoch patience + 2
        assert!(es.check(4.0, &mut model, &store).unwrap());
        assert_eq!(model.weight[0], 1.0);
    }

    #[test]
    fn test_strike_counter_resets_on_improvement() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        let mut model = Stub::new(1.0);
        let mut es = EarlyStopping::new(2);

        es.check(1.0, &mut model, &store).unwrap();
        es.check(2.0, &mut model, &store).unwrap();
        assert_eq!(es.strikes(), 1);

        es.check(0.5, &mut model, &store).unwrap();
        assert_eq!(es.strikes(), 0);
        assert_eq!(es.best_loss(), 0.5);
    }

    #[test]
    fn test_stop_without_checkpoint_is_error() {
        // Patience 0 and an immediately worsening loss: restore has nothing
        // to load only if no improvement was ever recorded
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        let mut model = Stub::new(1.0);
        let mut es = EarlyStopping::new(0);
        es.best_loss = 0.1; // pretend a best was seen but never saved

        assert!(es.check(0.5, &mut model, &store).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::stub::Stub;
    use super::*;
    use proptest::prelude::*;

    /// Feed 20 epochs of `loss(epoch)` through the check; returns the
    /// 1-based epoch at which it stopped, if any
    fn run_schedule(patience: usize, loss: impl Fn(usize) -> f32) -> Option<usize> {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::open(dir.path()).unwrap();
        let mut model = Stub::new(1.0);
        let mut es = EarlyStopping::new(patience);

        for epoch in 0..20 {
            if es.check(loss(epoch), &mut model, &store).unwrap() {
                return Some(epoch + 1);
            }
        }
        None
    }

    proptest! {
        /// A strictly worsening loss sequence stops exactly at check
        /// number patience + 2
        #[test]
        fn worsening_run_stops_at_patience_plus_two(patience in 0usize..6) {
            let stop_at = run_schedule(patience, |epoch| epoch as f32 + 1.0);
            prop_assert_eq!(stop_at, Some(patience + 2));
        }

        /// A strictly improving loss sequence never stops
        #[test]
        fn improving_run_never_stops(patience in 0usize..6) {
            let stop_at = run_schedule(patience, |epoch| 100.0 - epoch as f32);
            prop_assert_eq!(stop_at, None);
        }
    }
}
