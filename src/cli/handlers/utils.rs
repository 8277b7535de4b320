use crate::deck::DeckOutcome;
use crate::model::{Story, StoryKind};
use colored::{ColoredString, Colorize};

/// Format a story kind with the color of its card border
pub fn format_kind(kind: &StoryKind) -> ColoredString {
    let text = kind.as_str();
    match kind {
        StoryKind::Feature => text.yellow(),
        StoryKind::Bug => text.red(),
        StoryKind::Chore => text.white(),
        StoryKind::Release => text.blue(),
        StoryKind::Other(_) => text.dimmed(),
    }
}

/// Highlighted status line for a completed step
pub fn success_banner(message: &str) -> ColoredString {
    message.black().on_green()
}

/// Highlighted status line for a failed step
pub fn error_banner(message: &str) -> ColoredString {
    message.white().on_red()
}

/// Print a list of stories (compact format)
pub fn print_story_list(stories: &[Story]) {
    if stories.is_empty() {
        println!("No stories found.");
        return;
    }

    for story in stories {
        let mut line = format!(
            "{} [{}] {}",
            format!("#{}", story.id).cyan(),
            format_kind(&story.kind),
            story.name
        );
        if let Some(points) = story.points() {
            line.push_str(&format!(" ({} pts)", points));
        }
        if !story.labels.is_empty() {
            line.push_str(&format!(" {}", story.labels.to_delimited().magenta()));
        }
        println!("{}", line);
    }
}

/// Print the outcome of a deck generation
pub fn print_deck(deck: &DeckOutcome, stories: &[Story]) {
    match deck {
        DeckOutcome::Empty => println!("no stories to print"),
        DeckOutcome::Generated { path, cards } => {
            for story in stories {
                println!("* {}", story.name);
            }
            println!(
                "{}",
                success_banner(&format!(
                    ">>> Generated PDF file in '{}' with {} stories",
                    path.display(),
                    cards
                ))
            );
        }
    }
}
