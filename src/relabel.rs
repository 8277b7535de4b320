//! Marking printed stories on the tracker.

use crate::error::{CardsError, Result};
use crate::model::{LabelSet, Story};
use crate::prompt::Confirm;
use crate::tracker::BacklogService;

/// Label added to stories that have been printed.
pub const PRINTED: &str = "p";

/// Label selecting stories that still need printing.
pub const TO_PRINT: &str = crate::model::TO_PRINT;

pub const ADD_PRINTED_QUESTION: &str = "To label those stories with p enter y";
pub const REMOVE_TO_PRINT_QUESTION: &str = "To remove to-print label enter y";

/// What the operator agreed to change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relabel {
    pub add_printed: bool,
    pub remove_to_print: bool,
}

impl Relabel {
    /// Ask both questions, `p` first.
    pub fn ask(confirm: &mut dyn Confirm) -> Result<Self> {
        let add_printed = confirm.confirm(ADD_PRINTED_QUESTION)?;
        let remove_to_print = confirm.confirm(REMOVE_TO_PRINT_QUESTION)?;
        Ok(Self {
            add_printed,
            remove_to_print,
        })
    }

    pub fn is_noop(&self) -> bool {
        !self.add_printed && !self.remove_to_print
    }

    /// New label set for `current`. Applying it twice gives the same result.
    pub fn apply(&self, current: &LabelSet) -> LabelSet {
        let mut labels = current.clone();
        if self.remove_to_print {
            labels.remove(TO_PRINT);
        }
        if self.add_printed {
            labels.insert(PRINTED);
        }
        labels
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelabelReport {
    pub updated: usize,
    pub unchanged: usize,
}

/// Persist `relabel` for each story, one at a time. The first failure stops
/// the batch; stories before it keep their new labels.
pub fn apply_labels(
    service: &dyn BacklogService,
    stories: &[Story],
    relabel: Relabel,
) -> Result<RelabelReport> {
    let mut report = RelabelReport::default();
    if relabel.is_noop() {
        report.unchanged = stories.len();
        return Ok(report);
    }

    for story in stories {
        let labels = relabel.apply(&story.labels);
        if labels == story.labels {
            report.unchanged += 1;
            continue;
        }
        service
            .update_labels(story, &labels)
            .map_err(|source| CardsError::UpdateAborted {
                story_id: story.id,
                updated: report.updated,
                source: Box::new(source),
            })?;
        tracing::info!(story = story.id, labels = %labels, "Updated labels");
        report.updated += 1;
    }

    Ok(report)
}
