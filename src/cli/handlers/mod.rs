mod list;
mod print;
mod utils;

pub use list::{ListParams, handle_list};
pub use print::{PrintParams, handle_print};

use crate::config::{CardsConfig, Overrides, RunConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Common context passed to all command handlers
pub struct CommandContext {
    pub config: CardsConfig,
    pub config_path: Option<PathBuf>,
}

impl CommandContext {
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir()?;
        let (config, config_path) =
            CardsConfig::load(explicit, &cwd).context("Failed to load storycards configuration")?;
        Ok(Self {
            config,
            config_path,
        })
    }

    /// Merge command-line values into the loaded config. Fails before any
    /// network access when credentials or projects are missing.
    pub fn resolve(&self, overrides: Overrides) -> Result<RunConfig> {
        let run = self.config.clone().resolve(overrides)?;
        tracing::debug!(
            config = ?self.config_path,
            projects = ?run.projects,
            filter = ?run.filter,
            "Resolved run configuration"
        );
        Ok(run)
    }
}
