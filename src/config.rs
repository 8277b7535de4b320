use crate::card::{Rgb, RuleTable};
use crate::error::{CardsError, Result};
use crate::model::{Filter, StoryKind, string_list};
use crate::tracker::DEFAULT_API_URL;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE: &str = "config.yml";

/// Contents of `config.yml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CardsConfig {
    #[serde(default)]
    pub options: OptionsSettings,

    #[serde(default)]
    pub filters: Filter,

    #[serde(default)]
    pub theme: ThemeSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(
        default,
        deserialize_with = "string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub projects: Option<Vec<String>>,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,

    /// Open each generated deck in the system PDF viewer.
    #[serde(default = "default_open_viewer")]
    pub open_viewer: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("pdfs")
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_open_viewer() -> bool {
    true
}

impl Default for OptionsSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            projects: None,
            api_url: default_api_url(),
            output_dir: default_output_dir(),
            assets_dir: default_assets_dir(),
            open_viewer: default_open_viewer(),
        }
    }
}

/// Per-kind border color overrides, e.g. `colors: { bug: "ff0000" }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeSettings {
    #[serde(default)]
    pub colors: BTreeMap<String, Rgb>,
}

impl ThemeSettings {
    pub fn rule_table(&self) -> RuleTable {
        self.colors
            .iter()
            .fold(RuleTable::default(), |rules, (kind, color)| {
                let kind = kind.parse::<StoryKind>().unwrap_or_default();
                rules.with_color(kind, *color)
            })
    }
}

/// Values given on the command line; each one beats the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_key: Option<String>,
    pub projects: Option<Vec<String>>,
    pub filter: Filter,
    pub output_dir: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub open_viewer: Option<bool>,
}

/// Fully resolved settings for a print run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub api_key: String,
    pub api_url: String,
    pub projects: Vec<String>,
    pub filter: Filter,
    pub output_dir: PathBuf,
    pub assets_dir: PathBuf,
    pub open_viewer: bool,
    pub rules: RuleTable,
}

impl CardsConfig {
    /// Load `explicit` if given (it must exist), else `config.yml` in
    /// `start_path`, else the one in the user config directory. Without any
    /// file the defaults are used.
    pub fn load(explicit: Option<&Path>, start_path: &Path) -> Result<(Self, Option<PathBuf>)> {
        let path = match explicit {
            Some(path) if !path.is_file() => {
                return Err(CardsError::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Self::find_config_file(start_path).or_else(Self::user_config_file),
        };

        match path {
            Some(path) => {
                let content = std::fs::read_to_string(&path)?;
                let config = Self::parse(&content)?;
                tracing::debug!(path = %path.display(), "Loaded config");
                Ok((config, Some(path)))
            }
            None => Ok((Self::default(), None)),
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        // An empty file is valid and means "all defaults".
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Parent directories are not searched; `config.yml` is too common a
    /// name to pick up from an enclosing project.
    pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
        let path = start_path.join(CONFIG_FILE);
        path.is_file().then_some(path)
    }

    fn user_config_file() -> Option<PathBuf> {
        let dirs = ProjectDirs::from("", "", env!("CARGO_PKG_NAME"))?;
        let path = dirs.config_dir().join(CONFIG_FILE);
        path.is_file().then_some(path)
    }

    /// Merge command-line overrides and check that everything a run needs
    /// is present. Fails before any network access.
    pub fn resolve(self, overrides: Overrides) -> Result<RunConfig> {
        let api_key = overrides
            .api_key
            .or(self.options.api_key)
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| CardsError::Config("No api key e.g. -k YOUR_API_KEY".to_string()))?;

        let projects = overrides
            .projects
            .or(self.options.projects)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| {
                CardsError::Config("No projects specified e.g. -p 1234567".to_string())
            })?;

        let mut filter = self.filters.merged_with(overrides.filter);
        if filter.is_empty() {
            filter = Filter::to_print();
        }

        Ok(RunConfig {
            api_key,
            api_url: self.options.api_url,
            projects,
            filter,
            output_dir: overrides.output_dir.unwrap_or(self.options.output_dir),
            assets_dir: overrides.assets_dir.unwrap_or(self.options.assets_dir),
            open_viewer: overrides.open_viewer.unwrap_or(self.options.open_viewer),
            rules: self.theme.rule_table(),
        })
    }
}
