use std::fmt;

use serde::{Deserialize, Serialize};

/// Question identifier normalised to one decimal place.
///
/// Raw ids come out of the data pipeline as floats (`32.1`, `32.100000001`);
/// they are rounded to tenths (halves go to the even neighbour) and kept as
/// an integer so grouping is exact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QueryId(i64);

impl QueryId {
    #[must_use]
    pub fn from_raw(id: f64) -> Self {
        Self((id * 10.0).round_ties_even() as i64)
    }

    #[must_use]
    pub fn as_f64(self) -> f64 {
        self.0 as f64 / 10.0
    }
}

impl From<f64> for QueryId {
    fn from(id: f64) -> Self {
        Self::from_raw(id)
    }
}

impl fmt::Display for QueryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f64())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_tenths() {
        assert_eq!(QueryId::from_raw(32.1), QueryId::from_raw(32.100_000_1));
        assert_eq!(QueryId::from_raw(32.14), QueryId::from_raw(32.1));
        assert_ne!(QueryId::from_raw(32.1), QueryId::from_raw(32.2));
        assert_eq!(QueryId::from_raw(7.0).to_string(), "7.0");
        assert_eq!(QueryId::from_raw(32.06).to_string(), "32.1");
    }

    #[test]
    fn exact_halves_round_to_even() {
        assert_eq!(QueryId::from_raw(0.25), QueryId::from_raw(0.2));
        assert_eq!(QueryId::from_raw(0.25).to_string(), "0.2");
        assert_eq!(QueryId::from_raw(0.75), QueryId::from_raw(0.8));
        assert_ne!(QueryId::from_raw(0.25), QueryId::from_raw(0.3));
    }
}
