use super::labels::LabelSet;
use super::types::StoryKind;
use serde::{Deserialize, Serialize};

/// Estimate value the tracker uses for "not estimated".
pub const UNESTIMATED: i64 = -1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: u64,
    pub project_id: u64,
    pub name: String,

    #[serde(rename = "type")]
    pub kind: StoryKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimate: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(default)]
    pub labels: LabelSet,
}

impl Story {
    pub fn new(id: u64, name: impl Into<String>, kind: StoryKind) -> Self {
        Self {
            id,
            project_id: 0,
            name: name.into(),
            kind,
            estimate: None,
            state: None,
            labels: LabelSet::new(),
        }
    }

    pub fn with_project(mut self, project_id: u64) -> Self {
        self.project_id = project_id;
        self
    }

    /// Set the estimate; the tracker's `-1` sentinel is stored as `None`.
    pub fn with_estimate(mut self, estimate: i64) -> Self {
        self.estimate = (estimate != UNESTIMATED).then_some(estimate);
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_labels(mut self, labels: LabelSet) -> Self {
        self.labels = labels;
        self
    }

    /// Points printed on the card: only estimated features carry any.
    pub fn points(&self) -> Option<i64> {
        if self.kind.is_feature() {
            self.estimate
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: u64,
    pub name: String,
}
