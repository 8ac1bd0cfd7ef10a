//! # Sentpair
//!
//! Training and evaluation loops for sentence-pair models: paraphrase
//! detection (MSRP) scored by accuracy and F1, and answer ranking (TRECQA)
//! scored by MAP and MRR.
//!
//! This crate re-exports [`sentpair_core`] (metrics, scheduling, shared
//! types) and [`sentpair_trainer`] (datasets, models, evaluators, the epoch
//! loop and checkpoints).

pub use sentpair_core::{
    EvalScores, LossDeltaStopper, PlateauMode, QueryId, ReduceLrOnPlateau, Result,
    SentPairError, Task,
};
pub use sentpair_trainer::{
    evaluator_for, load_model, BagOfEmbeddings, Evaluator, SentencePairModel, Trainer,
    TrainerConfig, TrainingReport,
};
