use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use sentpair_core::{Result, SentPairError};

/// One labelled sentence pair as stored on disk.
///
/// For TRECQA `a` is the question, `b` a candidate answer and `id` the
/// question id shared by all of its candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairExample {
    #[serde(default)]
    pub id: f64,
    pub a: String,
    pub b: String,
    pub label: u32,
    /// Hand-crafted pair features (word overlap, IDF-weighted overlap, ...).
    #[serde(default)]
    pub ext_feats: Vec<f32>,
}

/// Load a JSON Lines file of [`PairExample`]s.
///
/// Blank lines and lines starting with `#` are skipped. Labels must be 0 or
/// 1 and every example must carry the same number of external features.
pub fn load_pairs<P: AsRef<Path>>(path: P) -> Result<Vec<PairExample>> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let invalid = |line: usize, reason: String| SentPairError::InvalidData {
        path: path.display().to_string(),
        line,
        reason,
    };

    let mut examples: Vec<PairExample> = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let example: PairExample =
            serde_json::from_str(line).map_err(|e| invalid(idx + 1, e.to_string()))?;

        if example.label > 1 {
            return Err(invalid(
                idx + 1,
                format!("label must be 0 or 1, got {}", example.label),
            ));
        }
        if let Some(first) = examples.first() {
            if first.ext_feats.len() != example.ext_feats.len() {
                return Err(invalid(
                    idx + 1,
                    format!(
                        "expected {} external features, got {}",
                        first.ext_feats.len(),
                        example.ext_feats.len()
                    ),
                ));
            }
        }
        examples.push(example);
    }

    tracing::debug!(path = %path.display(), count = examples.len(), "loaded sentence pairs");
    Ok(examples)
}
