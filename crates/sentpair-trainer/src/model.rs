//! Sentence-pair model interface and a small bag-of-embeddings baseline.

use candle_core::{D, Result, Tensor};
use candle_nn::{Embedding, Linear, Module, VarBuilder};
use serde::{Deserialize, Serialize};

use crate::data::PairBatch;

/// A model scoring sentence pairs.
///
/// `forward` returns log-probabilities over `{0, 1}` with shape `[B, 2]`.
pub trait SentencePairModel {
    fn forward(&self, batch: &PairBatch) -> Result<Tensor>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub hidden_dim: usize,
    pub ext_feats_dim: usize,
}

impl ModelConfig {
    /// Width of the pair representation fed to the hidden layer.
    #[must_use]
    pub fn feature_dim(&self) -> usize {
        4 * self.embedding_dim + self.ext_feats_dim
    }
}

/// Mean-pooled word embeddings, compared with `[a, b, |a - b|, a * b]`
/// plus any external features, followed by a one-hidden-layer MLP.
pub struct BagOfEmbeddings {
    embedding: Embedding,
    hidden: Linear,
    output: Linear,
    config: ModelConfig,
}

impl BagOfEmbeddings {
    pub fn new(config: ModelConfig, vb: VarBuilder) -> Result<Self> {
        let embedding = candle_nn::embedding(
            config.vocab_size,
            config.embedding_dim,
            vb.pp("embedding"),
        )?;
        let hidden = candle_nn::linear(config.feature_dim(), config.hidden_dim, vb.pp("hidden"))?;
        let output = candle_nn::linear(config.hidden_dim, 2, vb.pp("output"))?;
        Ok(Self {
            embedding,
            hidden,
            output,
            config,
        })
    }

    #[must_use]
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// `[B, L]` ids -> `[B, E]` masked mean of the embeddings.
    fn pool(&self, ids: &Tensor, mask: &Tensor, len: &Tensor) -> Result<Tensor> {
        let embedded = self.embedding.forward(ids)?;
        embedded
            .broadcast_mul(&mask.unsqueeze(2)?)?
            .sum(1)?
            .broadcast_div(len)
    }
}

impl SentencePairModel for BagOfEmbeddings {
    fn forward(&self, batch: &PairBatch) -> Result<Tensor> {
        let a = self.pool(&batch.a, &batch.a_mask, &batch.a_len)?;
        let b = self.pool(&batch.b, &batch.b_mask, &batch.b_len)?;
        let diff = (&a - &b)?.abs()?;
        let prod = (&a * &b)?;

        let mut parts = vec![a, b, diff, prod];
        if let Some(ext) = &batch.ext_feats {
            parts.push(ext.clone());
        }
        let features = Tensor::cat(parts.as_slice(), 1)?;

        let hidden = self.hidden.forward(&features)?.tanh()?;
        let logits = self.output.forward(&hidden)?;
        candle_nn::ops::log_softmax(&logits, D::Minus1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{PairDataset, PairExample, TextEncoder, WhitespaceVocab};
    use candle_core::{DType, Device};
    use candle_nn::VarMap;

    #[test]
    fn forward_returns_log_probabilities() {
        let examples = vec![
            PairExample {
                id: 1.0,
                a: "what is rust".into(),
                b: "rust is a language".into(),
                label: 1,
                ext_feats: vec![0.5],
            },
            PairExample {
                id: 1.0,
                a: "what is rust".into(),
                b: "".into(),
                label: 0,
                ext_feats: vec![0.0],
            },
        ];
        let encoder = TextEncoder::Whitespace(WhitespaceVocab::build(&examples, 1));
        let dataset = PairDataset::new("train", &examples, &encoder, 16).unwrap();

        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
        let config = ModelConfig {
            vocab_size: encoder.vocab_size(),
            embedding_dim: 8,
            hidden_dim: 6,
            ext_feats_dim: 1,
        };
        assert_eq!(config.feature_dim(), 33);
        let model = BagOfEmbeddings::new(config, vb).unwrap();

        let batch = dataset.batches(2, None, &device).next().unwrap().unwrap();
        let out = model.forward(&batch).unwrap();
        assert_eq!(out.dims(), &[2, 2]);

        let probs: Vec<Vec<f32>> = out.exp().unwrap().to_vec2().unwrap();
        for row in probs {
            assert!((row[0] + row[1] - 1.0).abs() < 1e-5);
            assert!(row.iter().all(|p| p.is_finite()));
        }
    }
}
