//! Multi-class classification trainer

use super::{EarlyStopping, FitSummary, History, TrainConfig, TrainingReport};
use crate::data::{permutation, Batch, Batches};
use crate::io::CheckpointStore;
use crate::loss::Loss;
use crate::metrics::{CategoricalAccuracy, Mean};
use crate::model::Model;
use crate::optim::Optimizer;
use crate::{Error, Result};
use ndarray::{Array2, ArrayD, Axis};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Trains a model for multi-class classification over one-hot targets
///
/// Each epoch shuffles the training split, runs the training phase in
/// batches (forward, loss, backward, optimizer step, metric update), runs
/// the validation phase in original order (forward and metrics only),
/// records `train_loss` / `val_loss` / `train_acc` / `val_acc`, prints a
/// one-line summary, and optionally runs the early-stopping check.
pub struct ClassificationTrainer<M: Model> {
    model: M,
    loss: Box<dyn Loss>,
    optimizer: Box<dyn Optimizer>,
    checkpoints: CheckpointStore,
    config: TrainConfig,
    history: History,
    report: Option<Box<dyn TrainingReport>>,
    rng: StdRng,
}

impl<M: Model> ClassificationTrainer<M> {
    /// Create a trainer. `checkpoints` must already be opened; construction
    /// performs no filesystem work.
    pub fn new(
        model: M,
        loss: Box<dyn Loss>,
        optimizer: Box<dyn Optimizer>,
        checkpoints: CheckpointStore,
        config: TrainConfig,
    ) -> Self {
        Self {
            model,
            loss,
            optimizer,
            checkpoints,
            config,
            history: History::with_series(&["train_loss", "val_loss", "train_acc", "val_acc"]),
            report: None,
            rng: StdRng::from_entropy(),
        }
    }

    /// Seed the shuffle RNG (deterministic epochs, mainly for tests)
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Install a reporting hook fired once after the final epoch
    pub fn with_report(mut self, report: Box<dyn TrainingReport>) -> Self {
        self.report = Some(report);
        self
    }

    /// Run the full epoch loop over the given splits
    pub fn fit(
        &mut self,
        x_train: &ArrayD<f32>,
        t_train: &Array2<f32>,
        x_val: &ArrayD<f32>,
        t_val: &Array2<f32>,
    ) -> Result<FitSummary> {
        let mut train_loss = Mean::new();
        let mut train_acc = CategoricalAccuracy::new();
        let mut val_loss = Mean::new();
        let mut val_acc = CategoricalAccuracy::new();
        let mut stopper = EarlyStopping::new(self.config.patience);
        let mut stopped_early = false;

        let n_train = x_train.len_of(Axis(0));

        for epoch in 0..self.config.epochs {
            train_loss.reset();
            train_acc.reset();
            val_loss.reset();
            val_acc.reset();

            let order = permutation(n_train, &mut self.rng);
            for batch in Batches::with_order(
                x_train,
                t_train,
                self.config.batch_size,
                self.config.drop_last,
                order,
            )? {
                self.train_step(&batch, &mut train_loss, &mut train_acc);
            }

            for batch in Batches::sequential(
                x_val,
                t_val,
                self.config.batch_size,
                self.config.drop_last,
            )? {
                self.val_step(&batch, &mut val_loss, &mut val_acc);
            }

            self.history.append("train_loss", train_loss.result());
            self.history.append("val_loss", val_loss.result());
            self.history.append("train_acc", train_acc.result());
            self.history.append("val_acc", val_acc.result());

            println!(
                "epoch {} => train_loss: {:.4}, train_acc: {:.4}, val_loss: {:.4}, val_acc: {:.4}",
                epoch + 1,
                train_loss.result(),
                train_acc.result(),
                val_loss.result(),
                val_acc.result()
            );

            if self.config.early_stopping
                && stopper.check(val_loss.result(), &mut self.model, &self.checkpoints)?
            {
                stopped_early = true;
                break;
            }
        }

        if let Some(report) = self.report.as_mut() {
            report.on_training_complete(&self.history);
        }

        Ok(self.summarize(stopped_early))
    }

    /// One forward-backward-update cycle on one batch
    fn train_step(&mut self, batch: &Batch, loss_metric: &mut Mean, acc: &mut CategoricalAccuracy) {
        let predictions = self.model.forward(&batch.inputs);
        let loss = self.loss.compute(&batch.targets, &predictions);

        let grad = self.loss.grad_predictions(&batch.targets, &predictions);
        let grads = self.model.backward(&batch.inputs, &grad);
        let mut params = self.model.parameters_mut();
        self.optimizer.apply(&grads, &mut params);

        loss_metric.update(loss);
        acc.update(&batch.targets, &predictions);
    }

    /// Read-only evaluation cycle on one batch
    fn val_step(&mut self, batch: &Batch, loss_metric: &mut Mean, acc: &mut CategoricalAccuracy) {
        let predictions = self.model.forward(&batch.inputs);
        loss_metric.update(self.loss.compute(&batch.targets, &predictions));
        acc.update(&batch.targets, &predictions);
    }

    /// Whole-set evaluation on a held-out split; prints and returns
    /// `(accuracy, loss)`
    pub fn evaluate(&self, x_test: &ArrayD<f32>, t_test: &Array2<f32>) -> Result<(f32, f32)> {
        let n = x_test.len_of(Axis(0));
        if t_test.nrows() != n {
            return Err(Error::ShapeMismatch {
                expected: vec![n],
                got: vec![t_test.nrows()],
            });
        }

        let predictions = self.model.forward(x_test);
        let loss = self.loss.compute(t_test, &predictions);
        let mut accuracy = CategoricalAccuracy::new();
        accuracy.update(t_test, &predictions);

        println!("accuracy: {:.4}, loss: {:.4}", accuracy.result(), loss);
        Ok((accuracy.result(), loss))
    }

    /// Persist the model parameters under a caller-supplied name
    pub fn save(&self, name: &str) -> Result<()> {
        self.checkpoints.save(name, &self.model.state())
    }

    /// Replace the model parameters from a named checkpoint
    pub fn load(&mut self, name: &str) -> Result<()> {
        self.model.load_state(self.checkpoints.load(name)?)
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    fn summarize(&self, stopped_early: bool) -> FitSummary {
        let val_losses = self.history.get("val_loss").unwrap_or(&[]);
        FitSummary {
            epochs_run: self.history.epochs(),
            final_val_loss: val_losses.last().copied().unwrap_or(0.0),
            best_val_loss: val_losses
                .iter()
                .copied()
                .fold(f32::INFINITY, f32::min),
            stopped_early,
        }
    }
}
