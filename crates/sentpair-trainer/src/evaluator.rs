//! Split evaluation: MSRP (accuracy / F1) and TRECQA (MAP / MRR).

use candle_core::{Device, Tensor};

use sentpair_core::metrics::{
    accuracy, f1_score, map_mrr, mean_cross_entropy, threshold, DEFAULT_THRESHOLD,
};
use sentpair_core::{EvalScores, Result, Task};

use crate::data::{PairBatch, PairDataset};
use crate::model::SentencePairModel;

/// Positive-class probabilities and labels for one batch.
pub fn final_prediction_and_label(
    log_probs: &Tensor,
    batch: &PairBatch,
) -> Result<(Vec<f32>, Vec<u32>)> {
    let probs = log_probs.exp()?.narrow(1, 1, 1)?.squeeze(1)?.to_vec1::<f32>()?;
    Ok((probs, batch.label_values.clone()))
}

/// Summed cross-entropy of a batch (no averaging over the batch).
pub fn summed_cross_entropy(log_probs: &Tensor, batch: &PairBatch) -> candle_core::Result<Tensor> {
    candle_nn::loss::nll(log_probs, &batch.labels)? * batch.size() as f64
}

/// Accumulates model outputs over a pass through a split.
#[derive(Debug, Clone, Default)]
pub struct Predictions {
    pub total_loss: f64,
    pub probabilities: Vec<f32>,
    pub labels: Vec<u32>,
    pub qids: Vec<f64>,
}

impl Predictions {
    pub fn record(&mut self, log_probs: &Tensor, batch: &PairBatch, loss: f64) -> Result<()> {
        let (probs, labels) = final_prediction_and_label(log_probs, batch)?;
        self.total_loss += loss;
        self.probabilities.extend(probs);
        self.labels.extend(labels);
        self.qids.extend_from_slice(&batch.ids);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    #[must_use]
    pub fn mean_loss(&self) -> f64 {
        mean_cross_entropy(self.total_loss, self.len())
    }

    /// Task scores in the task's reporting order, cross-entropy last.
    pub fn scores(&self, task: Task) -> Result<EvalScores> {
        let [first, second, loss] = task.score_names();
        let (x, y) = match task {
            Task::Msrp => {
                let predicted = threshold(&self.probabilities, DEFAULT_THRESHOLD);
                (
                    accuracy(&self.labels, &predicted)?,
                    f1_score(&self.labels, &predicted)?,
                )
            }
            Task::TrecQa => map_mrr(&self.qids, &self.probabilities, &self.labels)?,
        };
        Ok(EvalScores::new()
            .with(first, x)
            .with(second, y)
            .with(loss, self.mean_loss()))
    }
}

/// Runs `model` over every batch of `dataset` without updating it.
pub fn collect_predictions(
    model: &dyn SentencePairModel,
    dataset: &PairDataset,
    batch_size: usize,
    device: &Device,
) -> Result<Predictions> {
    let mut predictions = Predictions::default();
    for batch in dataset.batches(batch_size, None, device) {
        let batch = batch?;
        let output = model.forward(&batch)?;
        let loss = summed_cross_entropy(&output, &batch)?.to_scalar::<f32>()?;
        predictions.record(&output, &batch, f64::from(loss))?;
    }
    Ok(predictions)
}

/// Scores a model on one data split.
pub trait Evaluator {
    fn task(&self) -> Task;

    fn dataset(&self) -> &PairDataset;

    fn scores(&self, model: &dyn SentencePairModel) -> Result<EvalScores>;
}

/// Paraphrase evaluation: `[accuracy, f1, cross_entropy]` with a 0.5
/// probability threshold.
pub struct MsrpEvaluator {
    dataset: PairDataset,
    batch_size: usize,
    device: Device,
}

impl MsrpEvaluator {
    #[must_use]
    pub fn new(dataset: PairDataset, batch_size: usize, device: Device) -> Self {
        Self {
            dataset,
            batch_size,
            device,
        }
    }
}

impl Evaluator for MsrpEvaluator {
    fn task(&self) -> Task {
        Task::Msrp
    }

    fn dataset(&self) -> &PairDataset {
        &self.dataset
    }

    fn scores(&self, model: &dyn SentencePairModel) -> Result<EvalScores> {
        collect_predictions(model, &self.dataset, self.batch_size, &self.device)?.scores(Task::Msrp)
    }
}

/// Answer-ranking evaluation: `[map, mrr, cross_entropy]`, ranking each
/// question's candidates by positive-class probability.
pub struct TrecQaEvaluator {
    dataset: PairDataset,
    batch_size: usize,
    device: Device,
}

impl TrecQaEvaluator {
    #[must_use]
    pub fn new(dataset: PairDataset, batch_size: usize, device: Device) -> Self {
        Self {
            dataset,
            batch_size,
            device,
        }
    }
}

impl Evaluator for TrecQaEvaluator {
    fn task(&self) -> Task {
        Task::TrecQa
    }

    fn dataset(&self) -> &PairDataset {
        &self.dataset
    }

    fn scores(&self, model: &dyn SentencePairModel) -> Result<EvalScores> {
        collect_predictions(model, &self.dataset, self.batch_size, &self.device)?
            .scores(Task::TrecQa)
    }
}

/// The evaluator matching `task`.
#[must_use]
pub fn evaluator_for(
    task: Task,
    dataset: PairDataset,
    batch_size: usize,
    device: Device,
) -> Box<dyn Evaluator> {
    match task {
        Task::Msrp => Box::new(MsrpEvaluator::new(dataset, batch_size, device)),
        Task::TrecQa => Box::new(TrecQaEvaluator::new(dataset, batch_size, device)),
    }
}
