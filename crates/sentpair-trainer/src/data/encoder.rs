//! Text to token-id encoding.
//!
//! Tokenization proper is delegated: either to a Hugging Face
//! `tokenizer.json`, or to a plain whitespace split over a vocabulary
//! built from the training split.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokenizers::Tokenizer as HfTokenizer;

use sentpair_core::{Result, SentPairError};

use super::example::PairExample;

/// Id reserved for padding.
pub const PAD_ID: u32 = 0;
/// Id for words missing from the vocabulary.
pub const UNK_ID: u32 = 1;

/// Lowercased whitespace vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WhitespaceVocab {
    word_to_id: HashMap<String, u32>,
}

impl WhitespaceVocab {
    /// Builds a vocabulary from both sentences of every example, keeping
    /// words seen at least `min_count` times.
    #[must_use]
    pub fn build(examples: &[PairExample], min_count: usize) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for example in examples {
            for word in Self::words(&example.a).chain(Self::words(&example.b)) {
                *counts.entry(word).or_default() += 1;
            }
        }

        let mut kept: Vec<String> = counts
            .into_iter()
            .filter(|(_, c)| *c >= min_count)
            .map(|(w, _)| w)
            .collect();
        // Stable ids across runs
        kept.sort_unstable();

        let word_to_id = kept
            .into_iter()
            .enumerate()
            .map(|(i, w)| (w, i as u32 + 2))
            .collect();
        Self { word_to_id }
    }

    fn words(text: &str) -> impl Iterator<Item = String> + '_ {
        text.split_whitespace().map(str::to_lowercase)
    }

    #[must_use]
    pub fn encode(&self, text: &str) -> Vec<u32> {
        Self::words(text)
            .map(|w| *self.word_to_id.get(&w).unwrap_or(&UNK_ID))
            .collect()
    }

    /// Number of ids, including padding and unknown.
    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.word_to_id.len() + 2
    }
}

/// Serializable description of an encoder, stored alongside checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EncoderSpec {
    Whitespace { vocab: WhitespaceVocab },
    HuggingFace { path: PathBuf },
}

/// Encoder used to turn sentences into ids for the embedding layer.
pub enum TextEncoder {
    Whitespace(WhitespaceVocab),
    HuggingFace {
        path: PathBuf,
        tokenizer: Box<HfTokenizer>,
    },
}

impl TextEncoder {
    /// Load a Hugging Face `tokenizer.json`.
    ///
    /// The path is canonicalized so a checkpoint sidecar can be reloaded
    /// from any working directory.
    pub fn from_tokenizer_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path = std::fs::canonicalize(path).map_err(|e| {
            SentPairError::Tokenizer(format!("tokenizer not found at {}: {e}", path.display()))
        })?;
        let tokenizer =
            HfTokenizer::from_file(&path).map_err(|e| SentPairError::Tokenizer(e.to_string()))?;
        Ok(Self::HuggingFace {
            path,
            tokenizer: Box::new(tokenizer),
        })
    }

    pub fn from_spec(spec: EncoderSpec) -> Result<Self> {
        match spec {
            EncoderSpec::Whitespace { vocab } => Ok(Self::Whitespace(vocab)),
            EncoderSpec::HuggingFace { path } => Self::from_tokenizer_file(path),
        }
    }

    #[must_use]
    pub fn spec(&self) -> EncoderSpec {
        match self {
            Self::Whitespace(vocab) => EncoderSpec::Whitespace {
                vocab: vocab.clone(),
            },
            Self::HuggingFace { path, .. } => EncoderSpec::HuggingFace { path: path.clone() },
        }
    }

    pub fn encode(&self, text: &str) -> Result<Vec<u32>> {
        match self {
            Self::Whitespace(vocab) => Ok(vocab.encode(text)),
            Self::HuggingFace { tokenizer, .. } => {
                let encoding = tokenizer
                    .encode(text, false)
                    .map_err(|e| SentPairError::Tokenizer(e.to_string()))?;
                Ok(encoding.get_ids().to_vec())
            }
        }
    }

    #[must_use]
    pub fn vocab_size(&self) -> usize {
        match self {
            Self::Whitespace(vocab) => vocab.vocab_size(),
            Self::HuggingFace { tokenizer, .. } => tokenizer.get_vocab_size(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(a: &str, b: &str) -> PairExample {
        PairExample {
            id: 0.0,
            a: a.into(),
            b: b.into(),
            label: 0,
            ext_feats: vec![],
        }
    }

    #[test]
    fn vocab_reserves_pad_and_unk() {
        let vocab = WhitespaceVocab::build(&[pair("The cat", "the dog")], 1);
        assert_eq!(vocab.vocab_size(), 5);
        let ids = vocab.encode("the CAT bird");
        assert_eq!(ids.len(), 3);
        assert!(ids[0] >= 2 && ids[1] >= 2);
        assert_eq!(ids[2], UNK_ID);
        assert!(!ids.contains(&PAD_ID));
    }

    #[test]
    fn min_count_filters_rare_words() {
        let vocab = WhitespaceVocab::build(&[pair("a a b", "a c")], 2);
        assert_eq!(vocab.vocab_size(), 3);
        assert_eq!(vocab.encode("b"), vec![UNK_ID]);
    }

    #[test]
    fn ids_are_deterministic() {
        let examples = [pair("x y z", "w")];
        let v1 = WhitespaceVocab::build(&examples, 1);
        let v2 = WhitespaceVocab::build(&examples, 1);
        assert_eq!(v1, v2);
    }

    #[test]
    fn spec_roundtrips_through_json() {
        let encoder = TextEncoder::Whitespace(WhitespaceVocab::build(&[pair("a b", "c")], 1));
        let json = serde_json::to_string(&encoder.spec()).unwrap();
        let restored = TextEncoder::from_spec(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(restored.encode("a c").unwrap(), encoder.encode("a c").unwrap());
    }

    const WORD_LEVEL_TOKENIZER: &str = r#"{
        "version": "1.0",
        "truncation": null,
        "padding": null,
        "added_tokens": [],
        "normalizer": null,
        "pre_tokenizer": {"type": "Whitespace"},
        "post_processor": null,
        "decoder": null,
        "model": {
            "type": "WordLevel",
            "vocab": {"[UNK]": 0, "hello": 1, "world": 2},
            "unk_token": "[UNK]"
        }
    }"#;

    #[test]
    fn tokenizer_spec_stores_absolute_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), WORD_LEVEL_TOKENIZER).unwrap();

        let indirect = dir.path().join("nested").join("..").join("tokenizer.json");
        let encoder = TextEncoder::from_tokenizer_file(&indirect).unwrap();
        let EncoderSpec::HuggingFace { path } = encoder.spec() else {
            panic!("expected a tokenizer spec");
        };
        assert!(path.is_absolute());
        assert_eq!(
            path,
            std::fs::canonicalize(dir.path().join("tokenizer.json")).unwrap()
        );

        let restored = TextEncoder::from_spec(encoder.spec()).unwrap();
        assert_eq!(restored.encode("hello world").unwrap(), vec![1, 2]);
        assert_eq!(restored.vocab_size(), 3);
    }

    #[test]
    fn missing_tokenizer_file_is_an_error() {
        assert!(TextEncoder::from_tokenizer_file("/nonexistent/tokenizer.json").is_err());
    }
}
