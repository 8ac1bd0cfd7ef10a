//! Best-model persistence: weights as safetensors, metadata as a JSON sidecar.

use std::path::{Path, PathBuf};

use candle_core::{DType, Device};
use candle_nn::{VarBuilder, VarMap};
use serde::{Deserialize, Serialize};

use sentpair_core::{Result, SentPairError, Task};

use crate::config::TrainerConfig;
use crate::data::{EncoderSpec, TextEncoder};
use crate::model::{BagOfEmbeddings, ModelConfig};

/// Everything besides the weights needed to rebuild a trained model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub task: Task,
    pub model: ModelConfig,
    pub encoder: EncoderSpec,
    pub trainer: TrainerConfig,
    pub best_score: Option<f64>,
    pub best_epoch: Option<usize>,
}

/// `models/x.safetensors` -> `models/x.safetensors.json`
#[must_use]
pub fn sidecar_path(weights: &Path) -> PathBuf {
    let mut name = weights.as_os_str().to_owned();
    name.push(".json");
    PathBuf::from(name)
}

/// Writes the current weights whenever the trainer finds a new best model.
pub struct Checkpointer {
    path: PathBuf,
    meta: CheckpointMeta,
}

impl Checkpointer {
    pub fn new(path: impl Into<PathBuf>, meta: CheckpointMeta) -> Self {
        Self {
            path: path.into(),
            meta,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&mut self, varmap: &VarMap, score: f64, epoch: usize) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        varmap.save(&self.path)?;

        self.meta.best_score = Some(score);
        self.meta.best_epoch = Some(epoch);
        let json = serde_json::to_string_pretty(&self.meta)?;
        std::fs::write(sidecar_path(&self.path), json)?;

        tracing::info!(path = %self.path.display(), score, epoch, "saved best model");
        Ok(())
    }
}

/// Names of the tensors stored in a safetensors file.
pub fn tensor_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let buffer = std::fs::read(path)?;
    let tensors = safetensors::SafeTensors::deserialize(&buffer)
        .map_err(|e| SentPairError::Checkpoint(e.to_string()))?;
    let mut names: Vec<String> = tensors.names().into_iter().cloned().collect();
    names.sort();
    Ok(names)
}

/// A model restored from disk together with its encoder and metadata.
pub struct LoadedModel {
    pub model: BagOfEmbeddings,
    pub varmap: VarMap,
    pub encoder: TextEncoder,
    pub meta: CheckpointMeta,
}

/// Restore a model saved by [`Checkpointer`].
pub fn load_model<P: AsRef<Path>>(path: P, device: &Device) -> Result<LoadedModel> {
    let path = path.as_ref();
    let sidecar = sidecar_path(path);
    if !path.exists() || !sidecar.exists() {
        return Err(SentPairError::Checkpoint(format!(
            "checkpoint not found at {}",
            path.display()
        )));
    }

    let meta: CheckpointMeta = serde_json::from_str(&std::fs::read_to_string(&sidecar)?)?;
    let encoder = TextEncoder::from_spec(meta.encoder.clone())?;

    let mut varmap = VarMap::new();
    let vb = VarBuilder::from_varmap(&varmap, DType::F32, device);
    let model = BagOfEmbeddings::new(meta.model.clone(), vb)?;

    let stored = tensor_names(path)?;
    let expected: Vec<String> = {
        let vars = varmap
            .data()
            .lock()
            .map_err(|e| SentPairError::Checkpoint(e.to_string()))?;
        vars.keys().cloned().collect()
    };
    if let Some(missing) = expected.iter().find(|name| !stored.contains(name)) {
        return Err(SentPairError::Checkpoint(format!(
            "{} has no tensor {missing:?}",
            path.display()
        )));
    }
    varmap.load(path)?;

    Ok(LoadedModel {
        model,
        varmap,
        encoder,
        meta,
    })
}
