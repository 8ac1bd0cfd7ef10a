//! Epoch loop shared by the MSRP and TRECQA trainers.

use std::time::Instant;

use candle_core::{Device, Tensor, Var};
use candle_nn::optim::{AdamW, Optimizer, ParamsAdamW, SGD};
use candle_nn::VarMap;
use serde::{Deserialize, Serialize};

use sentpair_core::{
    EvalScores, LossDeltaStopper, PlateauMode, ReduceLrOnPlateau, Result, SentPairError, Task,
};

use crate::checkpoint::Checkpointer;
use crate::config::{OptimizerKind, TrainerConfig};
use crate::data::PairDataset;
use crate::evaluator::{summed_cross_entropy, Evaluator, Predictions};
use crate::model::SentencePairModel;
use crate::scalars::ScalarWriter;

/// Optimizer selected by [`OptimizerKind`].
pub enum PairOptimizer {
    AdamW(AdamW),
    Sgd(SGD),
}

impl PairOptimizer {
    pub fn new(kind: OptimizerKind, vars: Vec<Var>, lr: f64, weight_decay: f64) -> Result<Self> {
        let optimizer = match kind {
            OptimizerKind::Adamw => Self::AdamW(AdamW::new(
                vars,
                ParamsAdamW {
                    lr,
                    weight_decay,
                    ..ParamsAdamW::default()
                },
            )?),
            OptimizerKind::Sgd => Self::Sgd(SGD::new(vars, lr)?),
        };
        Ok(optimizer)
    }

    /// Zero-grad, backward pass and parameter update in one call.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        match self {
            Self::AdamW(opt) => opt.backward_step(loss)?,
            Self::Sgd(opt) => opt.backward_step(loss)?,
        }
        Ok(())
    }

    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        match self {
            Self::AdamW(opt) => opt.learning_rate(),
            Self::Sgd(opt) => opt.learning_rate(),
        }
    }

    pub fn set_learning_rate(&mut self, lr: f64) {
        match self {
            Self::AdamW(opt) => opt.set_learning_rate(lr),
            Self::Sgd(opt) => opt.set_learning_rate(lr),
        }
    }
}

/// Outcome of one epoch of [`Trainer::train`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochRecord {
    pub epoch: usize,
    pub train_loss: f64,
    pub dev: EvalScores,
    pub lr: f64,
    pub seconds: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrainingReport {
    pub epochs_run: usize,
    pub best_dev_score: Option<f64>,
    pub best_epoch: Option<usize>,
    pub stopped_early: bool,
    pub total_seconds: f64,
    pub history: Vec<EpochRecord>,
}

pub struct Trainer<M: SentencePairModel> {
    task: Task,
    model: M,
    varmap: VarMap,
    optimizer: PairOptimizer,
    train_data: PairDataset,
    config: TrainerConfig,
    scalars: ScalarWriter,
    checkpointer: Option<Checkpointer>,
    device: Device,
}

impl<M: SentencePairModel> Trainer<M> {
    /// `varmap` must hold the variables `model` was built from.
    pub fn new(
        task: Task,
        model: M,
        varmap: VarMap,
        train_data: PairDataset,
        config: TrainerConfig,
        device: Device,
    ) -> Result<Self> {
        config.validate()?;
        let optimizer = PairOptimizer::new(
            config.optimizer,
            varmap.all_vars(),
            config.lr,
            config.weight_decay,
        )?;
        Ok(Self {
            task,
            model,
            varmap,
            optimizer,
            train_data,
            config,
            scalars: ScalarWriter::disabled(),
            checkpointer: None,
            device,
        })
    }

    #[must_use]
    pub fn with_scalars(mut self, scalars: ScalarWriter) -> Self {
        self.scalars = scalars;
        self
    }

    #[must_use]
    pub fn with_checkpointer(mut self, checkpointer: Checkpointer) -> Self {
        self.checkpointer = Some(checkpointer);
        self
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    #[must_use]
    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate()
    }

    /// One pass over the training split. Returns the summed cross-entropy.
    pub fn train_epoch(&mut self, epoch: usize) -> Result<f64> {
        let batch_size = self.config.batch_size;
        let total = self.train_data.len();
        let num_batches = self.train_data.num_batches(batch_size);
        let seed = self.config.seed.wrapping_add(epoch as u64);

        let mut predictions = Predictions::default();
        for (batch_idx, batch) in self
            .train_data
            .batches(batch_size, Some(seed), &self.device)
            .enumerate()
        {
            let batch = batch?;
            let output = self.model.forward(&batch)?;
            let loss = summed_cross_entropy(&output, &batch)?;
            self.optimizer.backward_step(&loss)?;
            let loss_value = f64::from(loss.to_scalar::<f32>()?);

            if batch_idx % self.config.log_interval == 0 {
                tracing::info!(
                    "Train Epoch: {} [{}/{} ({:.0}%)]\tLoss: {:.6}",
                    epoch,
                    (batch_idx * batch_size).min(total),
                    total,
                    100.0 * batch_idx as f64 / num_batches as f64,
                    loss_value
                );
            }

            predictions.record(&output, &batch, loss_value)?;
        }

        let scores = predictions.scores(self.task)?;
        let tag = self.task.tag();
        for (name, value) in scores.iter() {
            let name = if name == "cross_entropy" {
                "cross_entropy_loss"
            } else {
                name
            };
            self.scalars
                .add_scalar(&format!("{tag}/train/{name}"), value, epoch)?;
        }
        tracing::debug!(epoch, %scores, "train epoch scores");

        Ok(predictions.total_loss)
    }

    /// Score the current model with `evaluator` and log the result.
    pub fn evaluate(&self, evaluator: &dyn Evaluator, split: &str) -> Result<EvalScores> {
        let scores = evaluator.scores(&self.model)?;
        tracing::info!("Evaluation metrics for {}: {}", split, scores);
        Ok(scores)
    }

    /// Train for up to `epochs` epochs, checkpointing on the best dev
    /// primary score and stopping once the dev loss stops moving.
    pub fn train(&mut self, epochs: usize, dev: &dyn Evaluator) -> Result<TrainingReport> {
        if dev.task() != self.task {
            return Err(SentPairError::InvalidConfig(format!(
                "dev evaluator is for {}, trainer is for {}",
                dev.task(),
                self.task
            )));
        }

        let mut scheduler = ReduceLrOnPlateau::new(
            PlateauMode::Max,
            self.config.lr_reduce_factor,
            self.config.patience,
        )?;
        let mut stopper = LossDeltaStopper::new(self.config.loss_tolerance);
        let mut report = TrainingReport::default();
        let tag = self.task.tag();

        for epoch in 1..=epochs {
            let start = Instant::now();
            tracing::info!("Epoch {} started...", epoch);

            let train_loss = self.train_epoch(epoch)?;
            let dev_scores = self.evaluate(dev, "dev")?;
            let primary = dev_scores.primary().ok_or_else(|| {
                SentPairError::InvalidConfig("dev evaluator returned no scores".into())
            })?;
            let dev_loss = dev_scores.get("cross_entropy").unwrap_or(primary);
            let lr = self.optimizer.learning_rate();

            self.scalars.add_scalar(&format!("{tag}/lr"), lr, epoch)?;
            for (name, value) in dev_scores.iter() {
                let name = if name == "cross_entropy" {
                    "cross_entropy_loss"
                } else {
                    name
                };
                self.scalars
                    .add_scalar(&format!("{tag}/dev/{name}"), value, epoch)?;
            }

            let seconds = start.elapsed().as_secs_f64();
            tracing::info!("Epoch {} finished in {:.2} minutes", epoch, seconds / 60.0);
            report.total_seconds += seconds;
            report.epochs_run = epoch;

            if report.best_dev_score.is_none_or(|best| primary > best) {
                report.best_dev_score = Some(primary);
                report.best_epoch = Some(epoch);
                if let Some(checkpointer) = self.checkpointer.as_mut() {
                    checkpointer.save(&self.varmap, primary, epoch)?;
                }
            }

            report.history.push(EpochRecord {
                epoch,
                train_loss,
                dev: dev_scores,
                lr,
                seconds,
            });

            if stopper.observe(dev_loss) {
                tracing::info!(
                    "Early stopping. Loss changed by less than {}.",
                    stopper.tolerance()
                );
                report.stopped_early = true;
                break;
            }

            if let Some(new_lr) = scheduler.step(primary, lr) {
                self.optimizer.set_learning_rate(new_lr);
            }
        }

        tracing::info!(
            "Training took {:.2} minutes overall...",
            report.total_seconds / 60.0
        );
        Ok(report)
    }
}
