use candle_core::{Device, Tensor};

use sentpair_core::{Result, SentPairError};

use super::encoder::{TextEncoder, PAD_ID};
use super::example::PairExample;

/// A sentence pair after encoding.
#[derive(Debug, Clone)]
struct EncodedPair {
    id: f64,
    a: Vec<u32>,
    b: Vec<u32>,
    label: u32,
    ext_feats: Vec<f32>,
}

/// An encoded split, ready to be cut into batches.
#[derive(Debug, Clone)]
pub struct PairDataset {
    name: String,
    pairs: Vec<EncodedPair>,
    ext_feats_dim: usize,
}

impl PairDataset {
    /// Encodes `examples`, truncating each sentence to `max_len` ids.
    pub fn new(
        name: impl Into<String>,
        examples: &[PairExample],
        encoder: &TextEncoder,
        max_len: usize,
    ) -> Result<Self> {
        let name = name.into();
        if examples.is_empty() {
            return Err(SentPairError::EmptySplit(name));
        }

        let ext_feats_dim = examples[0].ext_feats.len();
        let pairs = examples
            .iter()
            .map(|ex| {
                let mut a = encoder.encode(&ex.a)?;
                let mut b = encoder.encode(&ex.b)?;
                a.truncate(max_len);
                b.truncate(max_len);
                Ok(EncodedPair {
                    id: ex.id,
                    a,
                    b,
                    label: ex.label,
                    ext_feats: ex.ext_feats.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            name,
            pairs,
            ext_feats_dim,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    #[must_use]
    pub fn ext_feats_dim(&self) -> usize {
        self.ext_feats_dim
    }

    /// Number of batches one pass over the split yields.
    #[must_use]
    pub fn num_batches(&self, batch_size: usize) -> usize {
        self.pairs.len().div_ceil(batch_size.max(1))
    }

    /// Iterate over the split in batches. `shuffle_seed` permutes the order.
    pub fn batches<'a>(
        &'a self,
        batch_size: usize,
        shuffle_seed: Option<u64>,
        device: &'a Device,
    ) -> BatchIter<'a> {
        let mut order: Vec<usize> = (0..self.pairs.len()).collect();
        if let Some(seed) = shuffle_seed {
            let mut rng = oorandom::Rand32::new(seed);
            for i in (1..order.len()).rev() {
                let j = rng.rand_range(0..(i as u32 + 1)) as usize;
                order.swap(i, j);
            }
        }
        BatchIter {
            dataset: self,
            order,
            pos: 0,
            batch_size: batch_size.max(1),
            device,
        }
    }
}

/// Tensors for one batch of sentence pairs.
#[derive(Debug, Clone)]
pub struct PairBatch {
    /// Token ids of the first sentences, `[B, La]`, padded with 0.
    pub a: Tensor,
    /// `1.0` on real tokens of `a`, `0.0` on padding.
    pub a_mask: Tensor,
    /// Token count of each `a` sentence (at least 1), `[B, 1]`.
    pub a_len: Tensor,
    pub b: Tensor,
    pub b_mask: Tensor,
    pub b_len: Tensor,
    /// `[B, F]`, absent when the split has no external features.
    pub ext_feats: Option<Tensor>,
    /// Gold labels, `u32`, `[B]`.
    pub labels: Tensor,
    /// Host copy of the labels.
    pub label_values: Vec<u32>,
    /// Raw question ids.
    pub ids: Vec<f64>,
}

impl PairBatch {
    #[must_use]
    pub fn size(&self) -> usize {
        self.ids.len()
    }
}

fn pad(
    rows: &[&[u32]],
    device: &Device,
) -> candle_core::Result<(Tensor, Tensor, Tensor)> {
    let width = rows.iter().map(|r| r.len()).max().unwrap_or(0).max(1);
    let mut ids = Vec::with_capacity(rows.len() * width);
    let mut mask = Vec::with_capacity(rows.len() * width);
    let mut lens = Vec::with_capacity(rows.len());
    for row in rows {
        ids.extend_from_slice(row);
        ids.extend(std::iter::repeat_n(PAD_ID, width - row.len()));
        mask.extend(std::iter::repeat_n(1f32, row.len()));
        mask.extend(std::iter::repeat_n(0f32, width - row.len()));
        lens.push(row.len().max(1) as f32);
    }
    let n = rows.len();
    Ok((
        Tensor::from_vec(ids, (n, width), device)?,
        Tensor::from_vec(mask, (n, width), device)?,
        Tensor::from_vec(lens, (n, 1), device)?,
    ))
}

/// Iterator over the batches of a [`PairDataset`].
pub struct BatchIter<'a> {
    dataset: &'a PairDataset,
    order: Vec<usize>,
    pos: usize,
    batch_size: usize,
    device: &'a Device,
}

impl BatchIter<'_> {
    fn build(&self, indices: &[usize]) -> candle_core::Result<PairBatch> {
        let pairs: Vec<&EncodedPair> = indices.iter().map(|&i| &self.dataset.pairs[i]).collect();
        let n = pairs.len();

        let a_rows: Vec<&[u32]> = pairs.iter().map(|p| p.a.as_slice()).collect();
        let b_rows: Vec<&[u32]> = pairs.iter().map(|p| p.b.as_slice()).collect();
        let (a, a_mask, a_len) = pad(&a_rows, self.device)?;
        let (b, b_mask, b_len) = pad(&b_rows, self.device)?;

        let dim = self.dataset.ext_feats_dim;
        let ext_feats = if dim > 0 {
            let flat: Vec<f32> = pairs.iter().flat_map(|p| p.ext_feats.iter().copied()).collect();
            Some(Tensor::from_vec(flat, (n, dim), self.device)?)
        } else {
            None
        };

        let label_values: Vec<u32> = pairs.iter().map(|p| p.label).collect();
        let labels = Tensor::new(label_values.as_slice(), self.device)?;

        Ok(PairBatch {
            a,
            a_mask,
            a_len,
            b,
            b_mask,
            b_len,
            ext_feats,
            labels,
            label_values,
            ids: pairs.iter().map(|p| p.id).collect(),
        })
    }
}

impl Iterator for BatchIter<'_> {
    type Item = Result<PairBatch>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.order.len() {
            return None;
        }
        let end = (self.pos + self.batch_size).min(self.order.len());
        let indices = self.order[self.pos..end].to_vec();
        self.pos = end;
        Some(self.build(&indices).map_err(SentPairError::from))
    }
}
