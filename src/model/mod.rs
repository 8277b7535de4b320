//! Data models for storycards.
//!
//! - [`Story`]: one backlog item fetched from the tracker
//! - [`StoryKind`]: feature, bug, chore, release or an unrecognized kind
//! - [`LabelSet`]: ordered, duplicate-free set of tags
//! - [`Filter`]: conjunctive story selection

mod filter;
mod labels;
mod story;
mod types;

pub use filter::{Filter, TO_PRINT};
pub(crate) use filter::string_list;
pub use labels::LabelSet;
pub use story::{Project, Story};
pub use types::StoryKind;
