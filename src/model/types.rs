use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{convert::Infallible, fmt, str::FromStr};

/// Story type as reported by the tracker.
///
/// Unknown kinds are kept verbatim in [`StoryKind::Other`] so that a new
/// tracker story type never breaks a print run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum StoryKind {
    #[default]
    Feature,
    Bug,
    Chore,
    Release,
    Other(String),
}

impl StoryKind {
    pub fn as_str(&self) -> &str {
        match self {
            StoryKind::Feature => "feature",
            StoryKind::Bug => "bug",
            StoryKind::Chore => "chore",
            StoryKind::Release => "release",
            StoryKind::Other(s) => s,
        }
    }

    pub fn is_feature(&self) -> bool {
        matches!(self, StoryKind::Feature)
    }
}

impl fmt::Display for StoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StoryKind {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "feature" => StoryKind::Feature,
            "bug" => StoryKind::Bug,
            "chore" => StoryKind::Chore,
            "release" => StoryKind::Release,
            other => StoryKind::Other(other.to_string()),
        })
    }
}

impl Serialize for StoryKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StoryKind {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw.parse().unwrap_or_default())
    }
}
