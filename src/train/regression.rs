//! Scalar regression trainer over id-keyed image samples

use super::{EarlyStopping, FitSummary, History, TrainConfig, TrainingReport};
use crate::data::{permutation, IdBatch, IdBatches, ImageStore};
use crate::io::CheckpointStore;
use crate::loss::Loss;
use crate::metrics::Mean;
use crate::model::Model;
use crate::optim::Optimizer;
use crate::Result;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Trains a model for scalar regression on externally stored images
///
/// Structurally identical to the classification trainer, with two
/// differences: samples are addressed by identifier and resolved to image
/// tensors through an [`ImageStore`] once per batch, and no accuracy metric
/// is tracked (`train_loss` / `val_loss` only).
pub struct RegressionTrainer<M: Model> {
    model: M,
    loss: Box<dyn Loss>,
    optimizer: Box<dyn Optimizer>,
    checkpoints: CheckpointStore,
    images: ImageStore,
    config: TrainConfig,
    history: History,
    report: Option<Box<dyn TrainingReport>>,
    rng: StdRng,
}

impl<M: Model> RegressionTrainer<M> {
    /// Create a trainer. `checkpoints` must already be opened; construction
    /// performs no filesystem work.
    pub fn new(
        model: M,
        loss: Box<dyn Loss>,
        optimizer: Box<dyn Optimizer>,
        checkpoints: CheckpointStore,
        images: ImageStore,
        config: TrainConfig,
    ) -> Self {
        Self {
            model,
            loss,
            optimizer,
            checkpoints,
            images,
            config,
            history: History::with_series(&["train_loss", "val_loss"]),
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

    /// Run the full epoch loop over the given splits of sample ids
    pub fn fit(
        &mut self,
        x_train: &[String],
        t_train: &Array2<f32>,
        x_val: &[String],
        t_val: &Array2<f32>,
    ) -> Result<FitSummary> {
        let mut train_loss = Mean::new();
        let mut val_loss = Mean::new();
        let mut stopper = EarlyStopping::new(self.config.patience);
        let mut stopped_early = false;

        for epoch in 0..self.config.epochs {
            train_loss.reset();
            val_loss.reset();

            let order = permutation(x_train.len(), &mut self.rng);
            for batch in IdBatches::with_order(
                x_train,
                t_train,
                self.config.batch_size,
                self.config.drop_last,
                order,
            )? {
                self.train_step(&batch, &mut train_loss)?;
            }

            for batch in IdBatches::sequential(
                x_val,
                t_val,
                self.config.batch_size,
                self.config.drop_last,
            )? {
                self.val_step(&batch, &mut val_loss)?;
            }

            self.history.append("train_loss", train_loss.result());
            self.history.append("val_loss", val_loss.result());

            println!(
                "epoch {} => train_loss: {:.4}, val_loss: {:.4}",
                epoch + 1,
                train_loss.result(),
                val_loss.result()
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

    /// One forward-backward-update cycle on one id batch
    fn train_step(&mut self, batch: &IdBatch, loss_metric: &mut Mean) -> Result<()> {
        let images = self.images.load_batch(&batch.ids)?;
        let predictions = self.model.forward(&images);
        let loss = self.loss.compute(&batch.targets, &predictions);

        let grad = self.loss.grad_predictions(&batch.targets, &predictions);
        let grads = self.model.backward(&images, &grad);
        let mut params = self.model.parameters_mut();
        self.optimizer.apply(&grads, &mut params);

        loss_metric.update(loss);
        Ok(())
    }

    /// Read-only evaluation cycle on one id batch
    fn val_step(&mut self, batch: &IdBatch, loss_metric: &mut Mean) -> Result<()> {
        let images = self.images.load_batch(&batch.ids)?;
        let predictions = self.model.forward(&images);
        loss_metric.update(self.loss.compute(&batch.targets, &predictions));
        Ok(())
    }

    /// Batched evaluation over a held-out split of sample ids; prints and
    /// returns the mean loss. Uses the same partial-batch policy as
    /// training.
    pub fn evaluate(
        &self,
        x_test: &[String],
        t_test: &Array2<f32>,
        batch_size: usize,
    ) -> Result<f32> {
        let mut loss_metric = Mean::new();

        for batch in IdBatches::sequential(x_test, t_test, batch_size, self.config.drop_last)? {
            let images = self.images.load_batch(&batch.ids)?;
            let predictions = self.model.forward(&images);
            loss_metric.update(self.loss.compute(&batch.targets, &predictions));
        }

        println!("loss: {:.4}", loss_metric.result());
        Ok(loss_metric.result())
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
