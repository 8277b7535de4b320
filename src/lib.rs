//! # storycards - planning-poker cards from Pivotal Tracker
//!
//! storycards fetches the stories of one or more Pivotal Tracker projects,
//! renders one fixed-size card per story into a printable PDF deck, and then
//! offers to relabel the printed stories (`+p`, `-to-print`) on the tracker.
//!
//! ## Quick Start
//!
//! ```bash
//! # Print every story labelled to-print in project 1234567
//! storycards print -k $TOKEN -p 1234567
//!
//! # Only unstarted features and bugs
//! storycards print -p 1234567 -t feature,bug -s unstarted
//!
//! # See what would be printed
//! storycards list -p 1234567
//! ```
//!
//! ## Modules
//!
//! - [`card`]: Theme resolution and card layout
//! - [`deck`]: Deck assembly and the PDF canvas
//! - [`relabel`]: Label update workflow
//! - [`pipeline`]: One complete print run for a project
//! - [`tracker`]: Backlog service trait and the Pivotal Tracker client

/// Card themes, text fitting and page layout.
pub mod card;

/// Command-line interface definitions using clap.
pub mod cli;

/// Configuration loading and command-line overrides.
///
/// Handles `config.yml` discovery and merging.
pub mod config;

/// Deck assembly and PDF output.
pub mod deck;

/// Error types and result aliases.
///
/// Defines `CardsError`, `RenderError` and the `Result<T>` alias.
pub mod error;

pub mod logging;

/// Data models: `Story`, `StoryKind`, `LabelSet`, `Filter`.
pub mod model;

pub mod pipeline;
pub mod prompt;

/// Marking printed stories on the tracker.
pub mod relabel;

/// Backlog service access.
pub mod tracker;
