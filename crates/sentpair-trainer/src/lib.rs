//! # Sentpair Trainer
//!
//! Training and evaluation loops for sentence-pair models on top of candle:
//! JSONL datasets, a baseline bag-of-embeddings model, MSRP and TRECQA
//! evaluators, the shared epoch loop with reduce-on-plateau scheduling and
//! loss-delta early stopping, and safetensors checkpoints.

pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod data;
pub mod evaluator;
pub mod model;
pub mod scalars;
pub mod trainer;

pub use checkpoint::{load_model, CheckpointMeta, Checkpointer, LoadedModel};
pub use config::{OptimizerKind, TrainerConfig};
pub use data::{load_pairs, PairBatch, PairDataset, PairExample, TextEncoder, WhitespaceVocab};
pub use evaluator::{evaluator_for, Evaluator, MsrpEvaluator, TrecQaEvaluator};
pub use model::{BagOfEmbeddings, ModelConfig, SentencePairModel};
pub use trainer::{EpochRecord, PairOptimizer, Trainer, TrainingReport};
