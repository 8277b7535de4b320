use super::text::fit_text;
use super::theme::{CardTheme, Rgb};
use crate::model::Story;

/// Page width in points (landscape).
pub const PAGE_WIDTH: f32 = 420.0;
/// Page height in points (landscape).
pub const PAGE_HEIGHT: f32 = 298.0;
pub const PAGE_MARGIN: f32 = 10.0;

const BOUNDS_WIDTH: f32 = PAGE_WIDTH - 2.0 * PAGE_MARGIN;
const BOUNDS_HEIGHT: f32 = PAGE_HEIGHT - 2.0 * PAGE_MARGIN;
const PADDING: f32 = 10.0;
const CONTENT_WIDTH: f32 = BOUNDS_WIDTH - 2.0 * PADDING;

const BORDER_WIDTH: f32 = 10.0;
const BADGE_RADIUS: f32 = 8.0;
const ICON_WIDTH: f32 = 60.0;
const TEXT_COLOR: Rgb = Rgb(0x00, 0x00, 0x00);
const CAPTION_COLOR: Rgb = Rgb(0x66, 0x66, 0x66);

/// Workflow and badge tags that never appear in the label strip.
pub const CONTROL_LABELS: [&str; 5] = ["to-print", "ux", "ui", "design", "retro"];

/// A tag drawn as a colored dot with a caption at a fixed slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Badge {
    pub tag: &'static str,
    pub color: Rgb,
    /// Vertical center of the dot; the caption top sits 5pt above it.
    pub y: f32,
}

/// Badge slots, top to bottom. Slots stay put when a badge is absent.
pub const BADGES: [Badge; 3] = [
    Badge {
        tag: "ux",
        color: Rgb(0x66, 0x33, 0x66),
        y: 80.0,
    },
    Badge {
        tag: "design",
        color: Rgb(0xff, 0xcc, 0x00),
        y: 60.0,
    },
    Badge {
        tag: "ui",
        color: Rgb(0x00, 0x99, 0xcc),
        y: 40.0,
    },
];

/// Position inside the margin box; origin bottom-left, y grows upward.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Laid-out text anchored at its top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBox {
    pub text: String,
    pub at: Point,
    pub width: f32,
    pub size: f32,
    pub color: Rgb,
    pub lines: Vec<String>,
}

impl TextBox {
    fn new(text: String, at: Point, width: f32, height: Option<f32>, size: f32) -> Self {
        let (size, lines) = fit_text(&text, width, height, size);
        Self {
            text,
            at,
            width,
            size,
            color: TEXT_COLOR,
            lines,
        }
    }

    fn with_color(mut self, color: Rgb) -> Self {
        self.color = color;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// Stroke around the whole margin box.
    Border { color: Rgb, line_width: f32 },
    Text(TextBox),
    Dot {
        center: Point,
        radius: f32,
        color: Rgb,
    },
    /// Image file scaled to `width`, anchored at its top-left corner.
    Icon { name: String, at: Point, width: f32 },
}

/// Everything drawn on one card, in drawing order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CardPage {
    pub elements: Vec<Element>,
}

impl CardPage {
    pub fn texts(&self) -> impl Iterator<Item = &TextBox> {
        self.elements.iter().filter_map(|e| match e {
            Element::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn has_text(&self, text: &str) -> bool {
        self.texts().any(|t| t.text == text)
    }

    pub fn dots(&self) -> impl Iterator<Item = (Point, Rgb)> + '_ {
        self.elements.iter().filter_map(|e| match e {
            Element::Dot { center, color, .. } => Some((*center, *color)),
            _ => None,
        })
    }

    pub fn icon(&self) -> Option<&str> {
        self.elements.iter().find_map(|e| match e {
            Element::Icon { name, .. } => Some(name.as_str()),
            _ => None,
        })
    }
}

/// Labels left for the bottom strip once workflow and badge tags are removed.
pub fn label_strip(story: &Story) -> String {
    story
        .labels
        .without(&CONTROL_LABELS)
        .collect::<Vec<_>>()
        .join(" | ")
}

pub fn render_card(story: &Story, theme: &CardTheme) -> CardPage {
    let mut elements = vec![Element::Border {
        color: theme.color,
        line_width: BORDER_WIDTH,
    }];

    let anchor = Point::new(PADDING, BOUNDS_HEIGHT - PADDING);
    elements.push(Element::Text(TextBox::new(
        story.name.clone(),
        anchor,
        CONTENT_WIDTH,
        Some(100.0),
        24.0,
    )));
    elements.push(Element::Text(TextBox::new(
        format!("#{}", story.id),
        Point::new(anchor.x, anchor.y - 120.0),
        CONTENT_WIDTH - 15.0,
        Some(20.0),
        16.0,
    )));

    let strip = label_strip(story);
    if !strip.is_empty() {
        elements.push(Element::Text(TextBox::new(
            strip,
            Point::new(10.0, 20.0),
            CONTENT_WIDTH - 15.0 - 60.0,
            Some(20.0),
            14.0,
        )));
    }

    for badge in BADGES.iter().filter(|b| story.labels.contains(b.tag)) {
        elements.push(Element::Text(
            TextBox::new(
                badge.tag.to_string(),
                Point::new(130.0, badge.y + 5.0),
                CONTENT_WIDTH - 80.0,
                Some(15.0),
                12.0,
            )
            .with_color(CAPTION_COLOR),
        ));
        elements.push(Element::Dot {
            center: Point::new(120.0, badge.y),
            radius: BADGE_RADIUS,
            color: badge.color,
        });
    }

    if let Some(points) = story.points() {
        elements.push(Element::Text(TextBox::new(
            format!("{} points", points),
            Point::new(10.0, 60.0),
            CONTENT_WIDTH - 15.0,
            None,
            16.0,
        )));
    }

    elements.push(Element::Icon {
        name: theme.icon.clone(),
        at: Point::new(330.0, 70.0),
        width: ICON_WIDTH,
    });

    CardPage { elements }
}
