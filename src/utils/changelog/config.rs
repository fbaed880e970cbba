// parser configuration

use serde::{Deserialize, Serialize};

/// configuration for a single parse session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// require the latest release to be dated today
    pub release_today: bool,

    /// reserved, currently has no effect
    pub strict: bool,
}

impl ParserConfig {
    /// create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn release_today(mut self, required: bool) -> Self {
        self.release_today = required;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}
