use serde::{Deserialize, Serialize};

use crate::zeyrho::btree::error::{BTreeError, Result};
use crate::zeyrho::btree::{DEFAULT_MIN_DEGREE, LOWEST_MIN_DEGREE};

/// Construction settings for a `BTree`.
///
/// Missing fields fall back to their defaults when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BTreeConfig {
    /// Minimum degree `t`: non-root nodes keep `t - 1..=2t - 1` values.
    pub min_degree: usize,
}

impl Default for BTreeConfig {
    fn default() -> Self {
        BTreeConfig {
            min_degree: DEFAULT_MIN_DEGREE,
        }
    }
}

impl BTreeConfig {
    pub fn with_min_degree(min_degree: usize) -> Self {
        BTreeConfig { min_degree }
    }

    pub fn validate(&self) -> Result<()> {
        // full nodes hold `2t - 1` values, which has to fit in a usize
        if self.min_degree < LOWEST_MIN_DEGREE || self.min_degree.checked_mul(2).is_none() {
            return Err(BTreeError::InvalidMinDegree(self.min_degree));
        }
        Ok(())
    }
}
