use crate::error::{CardsError, Result};
use crate::model::{LabelSet, StoryKind};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fmt, str::FromStr};

/// Icon used for cards labelled `design`.
pub const DESIGN_ICON: &str = "design.png";

/// Icon used for cards labelled `retro`.
pub const IDEA_ICON: &str = "idea.png";

/// Border color for kinds missing from the rule table.
pub const NEUTRAL_COLOR: Rgb = Rgb(0xcc, 0xcc, 0xcc);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Components scaled to `0.0..=1.0`.
    pub fn to_unit(self) -> (f32, f32, f32) {
        (
            f32::from(self.0) / 255.0,
            f32::from(self.1) / 255.0,
            f32::from(self.2) / 255.0,
        )
    }
}

impl FromStr for Rgb {
    type Err = CardsError;

    fn from_str(s: &str) -> Result<Self> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(CardsError::Config(format!("Invalid hex color: {}", s)));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| CardsError::Config(format!("Invalid hex color: {}", s)))
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = CardsError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

/// Resolved look of a single card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardTheme {
    pub icon: String,
    pub color: Rgb,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct KindStyle {
    color: Rgb,
    icon: String,
}

/// Immutable mapping from story kind to its default theme.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    kinds: HashMap<StoryKind, KindStyle>,
}

impl Default for RuleTable {
    fn default() -> Self {
        let entries = [
            (StoryKind::Feature, Rgb(0xf5, 0x9e, 0x3a)),
            (StoryKind::Bug, Rgb(0xcc, 0x16, 0x19)),
            (StoryKind::Chore, Rgb(0x50, 0x50, 0x50)),
            (StoryKind::Release, Rgb(0x40, 0x7a, 0xa5)),
        ];
        let kinds = entries
            .into_iter()
            .map(|(kind, color)| {
                let icon = format!("{}.png", kind);
                (kind, KindStyle { color, icon })
            })
            .collect();
        Self { kinds }
    }
}

impl RuleTable {
    /// Replace the border color of a kind, keeping its icon.
    pub fn with_color(mut self, kind: StoryKind, color: Rgb) -> Self {
        let icon = format!("{}.png", kind);
        self.kinds
            .entry(kind)
            .and_modify(|style| style.color = color)
            .or_insert(KindStyle { color, icon });
        self
    }

    /// Theme for a card. Labels only ever change the icon: `design` first,
    /// then `retro`, so `retro` wins when both are present.
    pub fn resolve(&self, kind: &StoryKind, labels: &LabelSet) -> CardTheme {
        let mut theme = match self.kinds.get(kind) {
            Some(style) => CardTheme {
                icon: style.icon.clone(),
                color: style.color,
            },
            None => CardTheme {
                icon: format!("{}.png", kind),
                color: NEUTRAL_COLOR,
            },
        };

        if labels.contains("design") {
            theme.icon = DESIGN_ICON.to_string();
        }
        if labels.contains("retro") {
            theme.icon = IDEA_ICON.to_string();
        }

        theme
    }
}
