//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the TOML config file.
//! They are deserialized directly and use domain types where appropriate.

mod output;
mod provider;
mod session;

pub use output::FileOutputConfig;
pub use provider::FileProviderConfig;
pub use session::FileSessionConfig;

use promptline_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Primary session settings
    pub session: FileSessionConfig,
    /// Model service adapter settings
    pub provider: FileProviderConfig,
    /// Output settings
    pub output: FileOutputConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues.
    ///
    /// Checks:
    /// 1. Provider kind is known
    /// 2. Provider fields the selected adapter needs
    /// 3. System prompt is not blank
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        issues.extend(self.provider.parse_kind().1);
        issues.extend(self.provider.validate_fields());
        issues.extend(self.session.to_session_config().1);

        issues
    }
}
