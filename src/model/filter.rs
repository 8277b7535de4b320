use super::story::Story;
use serde::{Deserialize, Deserializer, Serialize};

/// Default label selecting stories that are waiting to be printed.
pub const TO_PRINT: &str = "to-print";

/// Conjunctive story filter. Every dimension that is set must match; within a
/// dimension any listed value is accepted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(
        default,
        rename = "label",
        deserialize_with = "string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub labels: Option<Vec<String>>,

    #[serde(
        default,
        rename = "story_type",
        deserialize_with = "string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub kinds: Option<Vec<String>>,

    #[serde(
        default,
        rename = "state",
        deserialize_with = "string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub states: Option<Vec<String>>,

    #[serde(
        default,
        rename = "id",
        deserialize_with = "string_list",
        skip_serializing_if = "Option::is_none"
    )]
    pub ids: Option<Vec<String>>,
}

impl Filter {
    /// The filter used when neither the config file nor the command line
    /// select anything: stories labelled `to-print`.
    pub fn to_print() -> Self {
        Self {
            labels: Some(vec![TO_PRINT.to_string()]),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_none() && self.kinds.is_none() && self.states.is_none() && self.ids.is_none()
    }

    /// Overlay `other` on top of `self`: dimensions set in `other` win.
    pub fn merged_with(mut self, other: Filter) -> Self {
        if other.labels.is_some() {
            self.labels = other.labels;
        }
        if other.kinds.is_some() {
            self.kinds = other.kinds;
        }
        if other.states.is_some() {
            self.states = other.states;
        }
        if other.ids.is_some() {
            self.ids = other.ids;
        }
        self
    }

    pub fn matches(&self, story: &Story) -> bool {
        if let Some(ref labels) = self.labels {
            if !labels.iter().any(|l| story.labels.contains(l)) {
                return false;
            }
        }
        if let Some(ref kinds) = self.kinds {
            if !kinds.iter().any(|k| k == story.kind.as_str()) {
                return false;
            }
        }
        if let Some(ref states) = self.states {
            match story.state {
                Some(ref state) if states.contains(state) => {}
                _ => return false,
            }
        }
        if let Some(ref ids) = self.ids {
            let id = story.id.to_string();
            if !ids.contains(&id) {
                return false;
            }
        }
        true
    }

    /// The only value of a dimension, if it has exactly one. Used to narrow
    /// server-side queries that accept a single value.
    pub fn single(values: &Option<Vec<String>>) -> Option<&str> {
        match values.as_deref() {
            Some([only]) => Some(only.as_str()),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Text(String),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Int(n) => n.to_string(),
            Scalar::Text(s) => s,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Scalar>),
    One(Scalar),
}

/// Accepts a YAML list of strings or numbers, or a single comma-separated
/// value, so `id: [42, 43]` and `label: to-print,ux` both work.
pub(crate) fn string_list<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let values = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => return Ok(None),
        Some(OneOrMany::Many(values)) => values.into_iter().map(Scalar::into_string).collect(),
        Some(OneOrMany::One(value)) => split_list(&value.into_string()),
    };
    Ok(Some(values))
}

/// Split a comma-separated YAML scalar such as `story_type: feature,bug`,
/// dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
