use crate::config::Overrides;
use crate::model::Filter;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "storycards")]
#[command(
    author,
    version,
    about = "Print planning-poker cards from Pivotal Tracker stories"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (defaults to ./config.yml, then the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write JSON logs to this file (rotated daily)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Render matching stories to a PDF deck and mark them as printed
    Print {
        #[command(flatten)]
        tracker: TrackerArgs,

        /// Directory for generated PDF files
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Directory holding the card icons
        #[arg(long)]
        assets_dir: Option<PathBuf>,

        /// Do not open the generated PDF in a viewer
        #[arg(long)]
        no_open: bool,

        /// Add the p label and remove to-print without asking
        #[arg(short, long)]
        yes: bool,
    },

    /// List the stories a print run would pick up
    #[command(visible_alias = "ls")]
    List {
        #[command(flatten)]
        tracker: TrackerArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Credentials, projects and story filters. List values are comma separated.
#[derive(Args, Clone, Debug, Default)]
pub struct TrackerArgs {
    /// Pivotal Tracker API token
    #[arg(short = 'k', long, env = "PIVOTAL_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Project IDs to print
    #[arg(short, long, value_delimiter = ',')]
    pub projects: Option<Vec<String>>,

    /// Only stories with any of these labels (default: to-print)
    #[arg(short, long, value_delimiter = ',')]
    pub label: Option<Vec<String>>,

    /// Only these story types (feature, bug, chore, release)
    #[arg(short = 't', long, value_delimiter = ',')]
    pub story_type: Option<Vec<String>>,

    /// Only stories in these states (e.g. unstarted, started)
    #[arg(short, long, value_delimiter = ',')]
    pub state: Option<Vec<String>>,

    /// Only these story IDs
    #[arg(short, long, value_delimiter = ',')]
    pub ids: Option<Vec<String>>,
}

impl TrackerArgs {
    pub fn filter(&self) -> Filter {
        Filter {
            labels: self.label.clone(),
            kinds: self.story_type.clone(),
            states: self.state.clone(),
            ids: self.ids.clone(),
        }
    }

    pub fn overrides(&self) -> Overrides {
        Overrides {
            api_key: self.api_key.clone(),
            projects: self.projects.clone(),
            filter: self.filter(),
            ..Overrides::default()
        }
    }
}
