//! # Sentpair Core
//!
//! Framework-independent building blocks for training sentence-pair models:
//! paraphrase and ranking metrics, the reduce-on-plateau learning-rate
//! scheduler, loss-delta early stopping, and shared task/score types.
//!
//! ## Quick Start
//!
//! ```rust
//! use sentpair_core::metrics::map_mrr;
//!
//! let qids = [1.0, 1.0, 2.0, 2.0];
//! let scores = [0.9, 0.2, 0.6, 0.4];
//! let labels = [0, 1, 1, 0];
//! let (map, mrr) = map_mrr(&qids, &scores, &labels).unwrap();
//!
//! assert!((map - 0.75).abs() < 1e-9);
//! assert!((mrr - 0.75).abs() < 1e-9);
//! ```
pub mod error;
pub mod metrics;
pub mod schedule;
pub mod types;

// Re-export primary API
pub use error::{Result, SentPairError};
pub use metrics::{accuracy, f1_score, map_mrr, mean_cross_entropy, threshold};
pub use schedule::{LossDeltaStopper, PlateauMode, ReduceLrOnPlateau};
pub use types::{EvalScores, QueryId, Task};
