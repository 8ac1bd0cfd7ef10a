//! Scalar metrics for paraphrase classification and answer ranking.

pub mod classification;
pub mod ranking;

pub use classification::{accuracy, f1_score, mean_cross_entropy, threshold, DEFAULT_THRESHOLD};
pub use ranking::{map_mrr, rank_queries, QueryRanking};
