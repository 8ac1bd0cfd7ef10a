//! Append-only JSONL log of per-epoch scalars (losses, scores, learning rate).

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use sentpair_core::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarRecord {
    pub tag: String,
    pub value: f64,
    pub step: usize,
}

/// Writes [`ScalarRecord`]s one per line; does nothing when disabled.
pub struct ScalarWriter {
    out: Option<BufWriter<File>>,
}

impl ScalarWriter {
    #[must_use]
    pub fn disabled() -> Self {
        Self { out: None }
    }

    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        tracing::debug!(path = %path.display(), "writing scalars");
        Ok(Self {
            out: Some(BufWriter::new(file)),
        })
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.out.is_some()
    }

    pub fn add_scalar(&mut self, tag: &str, value: f64, step: usize) -> Result<()> {
        let Some(out) = self.out.as_mut() else {
            return Ok(());
        };
        let record = ScalarRecord {
            tag: tag.to_string(),
            value,
            step,
        };
        serde_json::to_writer(&mut *out, &record)?;
        out.write_all(b"\n")?;
        out.flush()?;
        Ok(())
    }
}
