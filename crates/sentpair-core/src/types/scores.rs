use std::fmt;

use serde::{Deserialize, Serialize};

/// Named evaluation scores; the first entry is the primary score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalScores {
    entries: Vec<(String, f64)>,
}

impl EvalScores {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a score, keeping insertion order.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: f64) -> Self {
        self.entries.push((name.into(), value));
        self
    }

    /// The score used for checkpoint selection and learning-rate scheduling.
    #[must_use]
    pub fn primary(&self) -> Option<f64> {
        self.entries.first().map(|(_, v)| *v)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Display for EvalScores {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}: {value:.4}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primary_is_first_inserted() {
        let scores = EvalScores::new()
            .with("map", 0.7)
            .with("mrr", 0.8)
            .with("cross_entropy", 0.4);
        assert_eq!(scores.primary(), Some(0.7));
        assert_eq!(scores.get("mrr"), Some(0.8));
        assert_eq!(scores.get("f1"), None);
        assert_eq!(scores.len(), 3);
        assert_eq!(
            scores.to_string(),
            "map: 0.7000, mrr: 0.8000, cross_entropy: 0.4000"
        );
    }

    #[test]
    fn empty_has_no_primary() {
        assert!(EvalScores::new().primary().is_none());
        assert!(EvalScores::new().is_empty());
    }
}
