//! Sentence-pair datasets: JSONL loading, encoding and batching.

pub mod batch;
pub mod encoder;
pub mod example;

pub use batch::{BatchIter, PairBatch, PairDataset};
pub use encoder::{EncoderSpec, TextEncoder, WhitespaceVocab};
pub use example::{load_pairs, PairExample};
