//! One print run for a single project: fetch, render, confirm, relabel.

use crate::deck::{DeckAssembler, DeckOutcome};
use crate::error::Result;
use crate::model::{Filter, Project, Story};
use crate::prompt::Confirm;
use crate::relabel::{Relabel, RelabelReport, apply_labels};
use crate::tracker::BacklogService;

/// Progress notifications, emitted in order.
#[derive(Debug)]
pub enum Event<'a> {
    Fetched { project: &'a Project, stories: &'a [Story] },
    DeckGenerated { deck: &'a DeckOutcome, stories: &'a [Story] },
    Relabeling { relabel: Relabel },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProjectReport {
    pub project: Project,
    pub deck: DeckOutcome,
    /// `None` when the deck was empty and the label step never ran.
    pub relabel: Option<RelabelReport>,
}

/// Run the whole workflow for `project_id`.
///
/// Labels are only touched after the deck was written completely; an empty
/// selection skips both the prompts and the update.
pub fn print_project(
    service: &dyn BacklogService,
    assembler: &DeckAssembler,
    confirm: &mut dyn Confirm,
    project_id: &str,
    filter: &Filter,
    on_event: &mut dyn FnMut(Event<'_>),
) -> Result<ProjectReport> {
    let project = service.project(project_id)?;
    let stories = service.list_stories(project_id, filter)?;
    on_event(Event::Fetched {
        project: &project,
        stories: &stories,
    });

    let deck = assembler.assemble(&project.name, &stories)?;
    on_event(Event::DeckGenerated {
        deck: &deck,
        stories: &stories,
    });

    if deck == DeckOutcome::Empty {
        return Ok(ProjectReport {
            project,
            deck,
            relabel: None,
        });
    }

    let relabel = Relabel::ask(confirm)?;
    on_event(Event::Relabeling { relabel });
    let report = apply_labels(service, &stories, relabel)?;

    Ok(ProjectReport {
        project,
        deck,
        relabel: Some(report),
    })
}
