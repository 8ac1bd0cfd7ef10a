//! Command-line entry point: train on a data directory, then score the
//! best checkpoint on the test split.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use clap::Parser;

use sentpair_core::Task;

use crate::checkpoint::{load_model, CheckpointMeta, Checkpointer};
use crate::config::{OptimizerKind, TrainerConfig};
use crate::data::{load_pairs, PairDataset, TextEncoder, WhitespaceVocab};
use crate::evaluator::evaluator_for;
use crate::model::{BagOfEmbeddings, ModelConfig};
use crate::scalars::ScalarWriter;
use crate::trainer::{Trainer, TrainingReport};

#[derive(Debug, Parser)]
#[command(name = "train")]
#[command(about = "Train and evaluate a sentence-pair model on MSRP or TRECQA")]
#[command(version)]
pub struct Cli {
    /// Benchmark to train for (msrp or trecqa)
    #[arg(short, long, env = "SENTPAIR_TASK")]
    pub task: Task,

    /// Directory holding train.jsonl, dev.jsonl and test.jsonl
    #[arg(short = 'd', long, env = "SENTPAIR_DATA_DIR")]
    pub data_dir: PathBuf,

    /// JSON file with trainer settings; flags below override it
    #[arg(short, long, env = "SENTPAIR_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long, env = "SENTPAIR_EPOCHS")]
    pub epochs: Option<usize>,

    #[arg(long, env = "SENTPAIR_BATCH_SIZE")]
    pub batch_size: Option<usize>,

    /// Initial learning rate
    #[arg(long, env = "SENTPAIR_LR")]
    pub lr: Option<f64>,

    #[arg(long, value_enum, env = "SENTPAIR_OPTIMIZER")]
    pub optimizer: Option<OptimizerKind>,

    /// Batches between training-loss log lines
    #[arg(long, env = "SENTPAIR_LOG_INTERVAL")]
    pub log_interval: Option<usize>,

    #[arg(long, env = "SENTPAIR_LR_REDUCE_FACTOR")]
    pub lr_reduce_factor: Option<f64>,

    /// Epochs without dev improvement before the learning rate drops
    #[arg(long, env = "SENTPAIR_PATIENCE")]
    pub patience: Option<usize>,

    /// Where the best model is saved
    #[arg(short = 'o', long, env = "SENTPAIR_MODEL_OUTFILE")]
    pub model_outfile: Option<PathBuf>,

    /// Append per-epoch scalars to this JSONL file
    #[arg(long, env = "SENTPAIR_SCALAR_LOG")]
    pub scalar_log: Option<PathBuf>,

    /// Hugging Face tokenizer.json; defaults to a whitespace vocabulary
    #[arg(long, env = "SENTPAIR_TOKENIZER")]
    pub tokenizer: Option<PathBuf>,

    #[arg(long, env = "SENTPAIR_SEED")]
    pub seed: Option<u64>,

    /// Skip reloading the best model and scoring the test split
    #[arg(long, env = "SENTPAIR_SKIP_TEST")]
    pub skip_test: bool,
}

impl Cli {
    /// File config (or defaults) with command-line overrides applied.
    pub fn trainer_config(&self) -> Result<TrainerConfig> {
        let mut config = match &self.config {
            Some(path) => TrainerConfig::from_json_file(path)
                .with_context(|| format!("failed to read config {}", path.display()))?,
            None => TrainerConfig::default(),
        };

        if let Some(v) = self.epochs {
            config.epochs = v;
        }
        if let Some(v) = self.batch_size {
            config.batch_size = v;
        }
        if let Some(v) = self.lr {
            config.lr = v;
        }
        if let Some(v) = self.optimizer {
            config.optimizer = v;
        }
        if let Some(v) = self.log_interval {
            config.log_interval = v;
        }
        if let Some(v) = self.lr_reduce_factor {
            config.lr_reduce_factor = v;
        }
        if let Some(v) = self.patience {
            config.patience = v;
        }
        if let Some(v) = &self.model_outfile {
            config.model_outfile = v.clone();
        }
        if let Some(v) = &self.scalar_log {
            config.scalar_log = Some(v.clone());
        }
        if let Some(v) = self.seed {
            config.seed = v;
        }

        config.validate()?;
        Ok(config)
    }
}

fn split_path(dir: &Path, split: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{split}.jsonl"));
    if !path.exists() {
        anyhow::bail!("{} split not found: {}", split, path.display());
    }
    Ok(path)
}

/// Train, checkpoint and (unless skipped) test, as configured by `cli`.
pub fn run(cli: &Cli) -> Result<TrainingReport> {
    let config = cli.trainer_config()?;
    let device = Device::Cpu;

    let train_examples = load_pairs(split_path(&cli.data_dir, "train")?)?;
    let dev_examples = load_pairs(split_path(&cli.data_dir, "dev")?)?;
    tracing::info!(
        task = %cli.task,
        train = train_examples.len(),
        dev = dev_examples.len(),
        "loaded dataset"
    );

    let encoder = match &cli.tokenizer {
        Some(path) => TextEncoder::from_tokenizer_file(path)?,
        None => TextEncoder::Whitespace(WhitespaceVocab::build(&train_examples, config.min_count)),
    };

    let train_data = PairDataset::new("train", &train_examples, &encoder, config.max_len)?;
    let dev_data = PairDataset::new("dev", &dev_examples, &encoder, config.max_len)?;
    if dev_data.ext_feats_dim() != train_data.ext_feats_dim() {
        anyhow::bail!(
            "train has {} external features, dev has {}",
            train_data.ext_feats_dim(),
            dev_data.ext_feats_dim()
        );
    }

    let model_config = ModelConfig {
        vocab_size: encoder.vocab_size(),
        embedding_dim: config.embedding_dim,
        hidden_dim: config.hidden_dim,
        ext_feats_dim: train_data.ext_feats_dim(),
    };
    let varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
    let model = BagOfEmbeddings::new(model_config.clone(), vb)?;

    let scalars = match &config.scalar_log {
        Some(path) => ScalarWriter::create(path)?,
        None => ScalarWriter::disabled(),
    };
    let checkpointer = Checkpointer::new(
        config.model_outfile.clone(),
        CheckpointMeta {
            task: cli.task,
            model: model_config,
            encoder: encoder.spec(),
            trainer: config.clone(),
            best_score: None,
            best_epoch: None,
        },
    );

    let dev = evaluator_for(cli.task, dev_data, config.batch_size, device.clone());
    let mut trainer = Trainer::new(cli.task, model, varmap, train_data, config.clone(), device.clone())?
        .with_scalars(scalars)
        .with_checkpointer(checkpointer);
    let report = trainer.train(config.epochs, dev.as_ref())?;

    if !cli.skip_test && report.best_epoch.is_some() {
        let test_examples = load_pairs(split_path(&cli.data_dir, "test")?)?;
        let best = load_model(&config.model_outfile, &device)
            .with_context(|| format!("failed to reload {}", config.model_outfile.display()))?;
        let test_data = PairDataset::new("test", &test_examples, &best.encoder, config.max_len)?;
        let test = evaluator_for(cli.task, test_data, config.batch_size, device);
        let scores = test.scores(&best.model)?;
        tracing::info!("Evaluation metrics for test: {}", scores);
        println!("{} test ({} examples): {}", cli.task, test.dataset().len(), scores);
    }

    Ok(report)
}
