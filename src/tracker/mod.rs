//! Remote backlog service access.

mod client;

pub use client::{DEFAULT_API_URL, TrackerClient};

use crate::error::Result;
use crate::model::{Filter, LabelSet, Project, Story};

/// Read/write operations the print workflow needs from a backlog service.
/// Every call may fail; none is retried.
pub trait BacklogService {
    fn project(&self, project_id: &str) -> Result<Project>;

    /// Stories matching `filter`, in the service's order.
    fn list_stories(&self, project_id: &str, filter: &Filter) -> Result<Vec<Story>>;

    /// Replace the labels of `story` with `labels`.
    fn update_labels(&self, story: &Story, labels: &LabelSet) -> Result<()>;
}
