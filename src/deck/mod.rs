//! Deck assembly: one page per story, written to a single PDF.

mod pdf;

pub use pdf::PdfCanvas;

use crate::card::{Element, RuleTable, render_card};
use crate::error::{RenderError, Result};
use crate::model::Story;
use chrono::{DateTime, Local};
use slug::slugify;
use std::path::{Path, PathBuf};

/// Drawing surface for a deck. A fresh canvas already has its first page.
pub trait DeckCanvas {
    fn start_new_page(&mut self) -> std::result::Result<(), RenderError>;

    fn draw(&mut self, element: &Element) -> std::result::Result<(), RenderError>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeckOutcome {
    /// Nothing matched the filter; no file was written.
    Empty,
    Generated { path: PathBuf, cards: usize },
}

impl DeckOutcome {
    pub fn cards(&self) -> usize {
        match self {
            DeckOutcome::Empty => 0,
            DeckOutcome::Generated { cards, .. } => *cards,
        }
    }
}

pub struct DeckAssembler {
    rules: RuleTable,
    assets_dir: PathBuf,
    output_dir: PathBuf,
}

impl DeckAssembler {
    pub fn new(rules: RuleTable, assets_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            rules,
            assets_dir: assets_dir.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// File name for a deck generated at `at` for `project_name`.
    pub fn deck_path(&self, project_name: &str, at: DateTime<Local>) -> PathBuf {
        let mut name = slugify(project_name);
        if name.is_empty() {
            name = "project".to_string();
        }
        self.output_dir.join(format!(
            "PT_to_print_{}_{}.pdf",
            at.format("%Y-%m-%d_%H-%M-%S"),
            name
        ))
    }

    /// Draw every story onto `canvas`, in order. Stops at the first failure.
    pub fn assemble_into<C: DeckCanvas>(
        &self,
        canvas: &mut C,
        stories: &[Story],
    ) -> std::result::Result<usize, RenderError> {
        for (i, story) in stories.iter().enumerate() {
            if i > 0 {
                canvas.start_new_page()?;
            }
            let theme = self.rules.resolve(&story.kind, &story.labels);
            let page = render_card(story, &theme);
            for element in &page.elements {
                canvas.draw(element).inspect_err(|e| {
                    tracing::error!(story = story.id, error = %e, "Failed to draw card");
                })?;
            }
            tracing::debug!(story = story.id, icon = %theme.icon, "Rendered card");
        }
        Ok(stories.len())
    }

    /// Render the deck to a PDF file. An empty story list writes nothing.
    pub fn assemble(&self, project_name: &str, stories: &[Story]) -> Result<DeckOutcome> {
        if stories.is_empty() {
            tracing::info!(project = project_name, "No stories to print");
            return Ok(DeckOutcome::Empty);
        }

        let path = self.deck_path(project_name, Local::now());
        let mut canvas = PdfCanvas::new(project_name, &self.assets_dir)?;
        let cards = self.assemble_into(&mut canvas, stories)?;

        std::fs::create_dir_all(&self.output_dir)?;
        canvas.save(&path)?;
        tracing::info!(project = project_name, cards, path = %path.display(), "Generated deck");

        Ok(DeckOutcome::Generated { path, cards })
    }
}
