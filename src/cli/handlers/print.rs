use crate::deck::{DeckAssembler, DeckOutcome};
use crate::error::{CardsError, ErrorKind};
use crate::pipeline::{Event, print_project};
use crate::prompt::{AssumeYes, Confirm, LinePrompter};
use crate::tracker::TrackerClient;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};

use super::CommandContext;
use super::utils::{error_banner, print_deck, success_banner};
use crate::cli::TrackerArgs;

/// Parameters for print operation
pub struct PrintParams {
    pub tracker: TrackerArgs,
    pub output_dir: Option<PathBuf>,
    pub assets_dir: Option<PathBuf>,
    pub no_open: bool,
    pub yes: bool,
}

pub fn handle_print(ctx: &CommandContext, params: PrintParams) -> Result<()> {
    let mut overrides = params.tracker.overrides();
    overrides.output_dir = params.output_dir;
    overrides.assets_dir = params.assets_dir;
    overrides.open_viewer = params.no_open.then_some(false);
    let run = ctx.resolve(overrides)?;

    let client = TrackerClient::authenticate(&run.api_url, &run.api_key)
        .context("Failed to authenticate with Pivotal Tracker")?;
    let assembler = DeckAssembler::new(run.rules.clone(), &run.assets_dir, &run.output_dir);
    let mut confirm: Box<dyn Confirm> = if params.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(LinePrompter::stdio())
    };

    for project_id in &run.projects {
        let result = print_project(
            &client,
            &assembler,
            confirm.as_mut(),
            project_id,
            &run.filter,
            &mut report_event,
        );

        let report = match result {
            Ok(report) => report,
            Err(err) => {
                report_failure(&err);
                return Err(err).with_context(|| format!("Print run failed for project {}", project_id));
            }
        };

        if let (Some(relabel), DeckOutcome::Generated { path, .. }) = (report.relabel, &report.deck) {
            println!(
                "{} {} updated, {} unchanged",
                "Labels:".green(),
                relabel.updated,
                relabel.unchanged
            );
            if run.open_viewer {
                open_deck(path);
            }
        }
    }

    Ok(())
}

fn report_event(event: Event<'_>) {
    match event {
        Event::Fetched { project, stories } => println!(
            "{} {} ({} stories)",
            "Project".cyan(),
            project.name.bold(),
            stories.len()
        ),
        Event::DeckGenerated { deck, stories } => print_deck(deck, stories),
        Event::Relabeling { relabel } => {
            if !relabel.is_noop() {
                println!("{}", success_banner(">>> Updating pivotal labels"));
            }
        }
    }
}

fn report_failure(err: &CardsError) {
    let banner = match err.kind() {
        ErrorKind::Rendering => {
            "[!] There was an error while generating the PDF file... What happened was:"
        }
        ErrorKind::RemoteUpdate => "[!] Updating labels stopped part way... What happened was:",
        _ => "[!] The print run failed... What happened was:",
    };
    eprintln!("{}", error_banner(banner));
    eprintln!("{}", err);
}

fn open_deck(path: &Path) {
    if let Err(e) = open::that(path) {
        tracing::warn!(path = %path.display(), error = %e, "Could not open PDF viewer");
    }
}
