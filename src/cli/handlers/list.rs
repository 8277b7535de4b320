use crate::model::Story;
use crate::tracker::{BacklogService, TrackerClient};
use anyhow::{Context, Result};
use colored::Colorize;

use super::CommandContext;
use super::utils::print_story_list;
use crate::cli::TrackerArgs;

/// Parameters for list operation
pub struct ListParams {
    pub tracker: TrackerArgs,
    pub json: bool,
}

pub fn handle_list(ctx: &CommandContext, params: ListParams) -> Result<()> {
    let run = ctx.resolve(params.tracker.overrides())?;
    let client = TrackerClient::authenticate(&run.api_url, &run.api_key)
        .context("Failed to authenticate with Pivotal Tracker")?;

    let mut all: Vec<Story> = Vec::new();
    for project_id in &run.projects {
        let project = client.project(project_id)?;
        let stories = client.list_stories(project_id, &run.filter)?;
        if !params.json {
            println!(
                "{} {} ({} stories)",
                "Project".cyan(),
                project.name.bold(),
                stories.len()
            );
            print_story_list(&stories);
            println!();
        }
        all.extend(stories);
    }

    if params.json {
        println!("{}", serde_json::to_string_pretty(&all)?);
    }
    Ok(())
}
