use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct HashConfig {
    /// Distinct-value slots reserved up front in every memo table.
    #[serde(default = "HashConfig::default_memo_capacity")]
    pub memo_capacity: usize,
}

impl HashConfig {
    fn default_memo_capacity() -> usize {
        0
    }
}

impl Default for HashConfig {
    fn default() -> Self {
        Self {
            memo_capacity: Self::default_memo_capacity(),
        }
    }
}
