//! Configuration file loading for promptline
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment: `PROMPTLINE_*` (`__` separates sections)
//! 2. `--config <path>` specified file
//! 3. Project root: `./promptline.toml` or `./.promptline.toml`
//! 4. XDG config: `$XDG_CONFIG_HOME/promptline/config.toml`
//!    (fallback `~/.config/promptline/config.toml`)
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{FileConfig, FileOutputConfig, FileProviderConfig, FileSessionConfig};
pub use loader::ConfigLoader;
