//! Card classification and layout.
//!
//! [`RuleTable`] resolves a [`CardTheme`] from a story's kind and labels, and
//! [`render_card`] turns a story plus its theme into the positioned
//! [`Element`]s of one page. Nothing here touches the PDF backend.

mod layout;
mod text;
mod theme;

pub use layout::{
    BADGES, Badge, CardPage, CONTROL_LABELS, Element, PAGE_HEIGHT, PAGE_MARGIN, PAGE_WIDTH,
    Point, TextBox, label_strip, render_card,
};
pub use text::{ASCENDER_RATIO, LINE_HEIGHT_RATIO, fit_text, text_width};
pub use theme::{CardTheme, DESIGN_ICON, IDEA_ICON, NEUTRAL_COLOR, Rgb, RuleTable};
