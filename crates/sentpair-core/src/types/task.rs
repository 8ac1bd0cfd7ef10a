use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SentPairError;

/// Sentence-pair benchmark a model is trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Task {
    /// Microsoft Research Paraphrase corpus: binary paraphrase detection.
    Msrp,
    /// TREC question answering: rank candidate answers per question.
    #[serde(rename = "trecqa")]
    TrecQa,
}

impl Task {
    /// Prefix used for scalar tags, e.g. `trecqa/dev/map`.
    #[must_use]
    pub fn tag(self) -> &'static str {
        match self {
            Self::Msrp => "msrp",
            Self::TrecQa => "trecqa",
        }
    }

    /// Names of the scores an evaluator reports for this task, primary first.
    #[must_use]
    pub fn score_names(self) -> [&'static str; 3] {
        match self {
            Self::Msrp => ["accuracy", "f1", "cross_entropy"],
            Self::TrecQa => ["map", "mrr", "cross_entropy"],
        }
    }

    /// Whether evaluation ranks candidates grouped by question id.
    #[must_use]
    pub fn is_ranking(self) -> bool {
        matches!(self, Self::TrecQa)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Task {
    type Err = SentPairError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "msrp" => Ok(Self::Msrp),
            "trecqa" => Ok(Self::TrecQa),
            other => Err(SentPairError::InvalidConfig(format!(
                "unknown task {other:?}, expected msrp or trecqa"
            ))),
        }
    }
}
