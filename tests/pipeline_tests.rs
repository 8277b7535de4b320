use std::cell::RefCell;
use std::path::{Path, PathBuf};

use storycards::card::RuleTable;
use storycards::deck::{DeckAssembler, DeckOutcome};
use storycards::error::{CardsError, ErrorKind, Result};
use storycards::model::{Filter, LabelSet, Project, Story, StoryKind};
use storycards::pipeline::{ProjectReport, print_project};
use storycards::prompt::Confirm;
use storycards::relabel::{ADD_PRINTED_QUESTION, REMOVE_TO_PRINT_QUESTION};
use storycards::tracker::BacklogService;
use tempfile::TempDir;

/// In-memory tracker that filters and updates like the real one.
struct FakeTracker {
    stories: RefCell<Vec<Story>>,
    updates: RefCell<Vec<(u64, String)>>,
    fail_on: Option<u64>,
}

impl FakeTracker {
    fn new(stories: Vec<Story>) -> Self {
        Self {
            stories: RefCell::new(stories),
            updates: RefCell::new(Vec::new()),
            fail_on: None,
        }
    }

    fn labels_of(&self, id: u64) -> String {
        self.stories
            .borrow()
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.labels.to_delimited())
            .unwrap_or_default()
    }
}

impl BacklogService for FakeTracker {
    fn project(&self, project_id: &str) -> Result<Project> {
        Ok(Project {
            id: project_id.parse().unwrap_or(0),
            name: "Web Site".to_string(),
        })
    }

    fn list_stories(&self, _project_id: &str, filter: &Filter) -> Result<Vec<Story>> {
        Ok(self
            .stories
            .borrow()
            .iter()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect())
    }

    fn update_labels(&self, story: &Story, labels: &LabelSet) -> Result<()> {
        if self.fail_on == Some(story.id) {
            return Err(CardsError::Remote("500 Internal Server Error".to_string()));
        }
        self.updates
            .borrow_mut()
            .push((story.id, labels.to_delimited()));
        if let Some(stored) = self.stories.borrow_mut().iter_mut().find(|s| s.id == story.id) {
            stored.labels = labels.clone();
        }
        Ok(())
    }
}

/// Replays fixed answers and records the questions asked.
struct Scripted {
    answers: Vec<&'static str>,
    asked: Vec<String>,
}

impl Scripted {
    fn new(answers: &[&'static str]) -> Self {
        Self {
            answers: answers.to_vec(),
            asked: Vec::new(),
        }
    }
}

impl Confirm for Scripted {
    fn ask(&mut self, question: &str) -> std::io::Result<String> {
        self.asked.push(question.to_string());
        Ok(if self.answers.is_empty() {
            String::new()
        } else {
            self.answers.remove(0).to_string()
        })
    }
}

fn shipped_assets() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn assembler(out: &TempDir) -> DeckAssembler {
    DeckAssembler::new(RuleTable::default(), shipped_assets(), out.path().join("pdfs"))
}

fn story(id: u64, name: &str, kind: StoryKind, labels: &str) -> Story {
    Story::new(id, name, kind)
        .with_project(99)
        .with_state("unstarted")
        .with_labels(LabelSet::from_delimited(labels))
}

fn run(
    tracker: &FakeTracker,
    deck: &DeckAssembler,
    confirm: &mut Scripted,
    filter: &Filter,
) -> Result<ProjectReport> {
    print_project(tracker, deck, confirm, "99", filter, &mut |_| {})
}

#[test]
fn test_login_flow_end_to_end() {
    let out = TempDir::new().unwrap();
    let tracker = FakeTracker::new(vec![
        story(42, "Login flow", StoryKind::Feature, "to-print,ux").with_estimate(3),
        story(43, "Not selected", StoryKind::Chore, "backend"),
    ]);
    let mut confirm = Scripted::new(&["n", "y"]);

    let report = run(&tracker, &assembler(&out), &mut confirm, &Filter::to_print()).unwrap();

    let DeckOutcome::Generated { path, cards } = &report.deck else {
        panic!("expected a deck, got {:?}", report.deck);
    };
    assert_eq!(*cards, 1);
    assert!(path.starts_with(out.path().join("pdfs")));
    assert!(path.to_string_lossy().ends_with("_web-site.pdf"));
    assert!(std::fs::read(path).unwrap().starts_with(b"%PDF"));

    assert_eq!(confirm.asked, [ADD_PRINTED_QUESTION, REMOVE_TO_PRINT_QUESTION]);
    assert_eq!(*tracker.updates.borrow(), vec![(42u64, "ux".to_string())]);
    assert_eq!(tracker.labels_of(43), "backend");

    let relabel = report.relabel.unwrap();
    assert_eq!(relabel.updated, 1);
}

#[test]
fn test_empty_selection_skips_prompts_and_updates() {
    let out = TempDir::new().unwrap();
    let tracker = FakeTracker::new(vec![story(1, "Backlog item", StoryKind::Bug, "backend")]);
    let mut confirm = Scripted::new(&["y", "y"]);

    let report = run(&tracker, &assembler(&out), &mut confirm, &Filter::to_print()).unwrap();

    assert_eq!(report.deck, DeckOutcome::Empty);
    assert_eq!(report.relabel, None);
    assert!(confirm.asked.is_empty());
    assert!(tracker.updates.borrow().is_empty());
    assert!(!out.path().join("pdfs").exists());
}

#[test]
fn test_render_failure_leaves_labels_alone() {
    let out = TempDir::new().unwrap();
    let no_assets = TempDir::new().unwrap();
    let deck = DeckAssembler::new(RuleTable::default(), no_assets.path(), out.path().join("pdfs"));
    let tracker = FakeTracker::new(vec![story(5, "Crash on save", StoryKind::Bug, "to-print")]);
    let mut confirm = Scripted::new(&["y", "y"]);

    let err = run(&tracker, &deck, &mut confirm, &Filter::to_print()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Rendering);
    assert!(confirm.asked.is_empty());
    assert!(tracker.updates.borrow().is_empty());
    assert_eq!(tracker.labels_of(5), "to-print");
    assert!(!out.path().join("pdfs").exists());
}

#[test]
fn test_unknown_kind_without_asset_is_fatal() {
    let out = TempDir::new().unwrap();
    let tracker = FakeTracker::new(vec![story(6, "Research", StoryKind::Other("spike".into()), "to-print")]);
    let mut confirm = Scripted::new(&["y", "y"]);

    let err = run(&tracker, &assembler(&out), &mut confirm, &Filter::to_print()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Rendering);
    assert!(err.to_string().contains("spike.png"));
    assert!(tracker.updates.borrow().is_empty());
}

#[test]
fn test_non_latin_title_aborts_deck() {
    let out = TempDir::new().unwrap();
    let tracker = FakeTracker::new(vec![
        story(10, "Login flow", StoryKind::Feature, "to-print"),
        story(11, "Вход ÄÖ 登录 flow", StoryKind::Feature, "to-print,бэкенд"),
    ]);
    let mut confirm = Scripted::new(&["y", "y"]);

    let err = run(&tracker, &assembler(&out), &mut confirm, &Filter::to_print()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Rendering);
    assert!(err.to_string().contains("Вход ÄÖ 登录 flow"));
    assert!(confirm.asked.is_empty());
    assert!(tracker.updates.borrow().is_empty());
    assert_eq!(tracker.labels_of(11), "to-print,бэкенд");
    assert!(!out.path().join("pdfs").exists());
}

#[test]
fn test_non_latin_label_aborts_deck() {
    let out = TempDir::new().unwrap();
    let tracker = FakeTracker::new(vec![story(12, "Checkout", StoryKind::Chore, "to-print,бэкенд")]);
    let mut confirm = Scripted::new(&["y", "y"]);

    let err = run(&tracker, &assembler(&out), &mut confirm, &Filter::to_print()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Rendering);
    assert!(err.to_string().contains("бэкенд"));
    assert!(tracker.updates.borrow().is_empty());
}

#[test]
fn test_update_failure_stops_batch() {
    let out = TempDir::new().unwrap();
    let mut tracker = FakeTracker::new(vec![
        story(1, "One", StoryKind::Feature, "to-print"),
        story(2, "Two", StoryKind::Bug, "to-print"),
        story(3, "Three", StoryKind::Chore, "to-print"),
    ]);
    tracker.fail_on = Some(2);
    let mut confirm = Scripted::new(&["y", "y"]);

    let err = run(&tracker, &assembler(&out), &mut confirm, &Filter::to_print()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RemoteUpdate);
    assert_eq!(tracker.labels_of(1), "p");
    assert_eq!(tracker.labels_of(2), "to-print");
    assert_eq!(tracker.labels_of(3), "to-print");
    assert_eq!(tracker.updates.borrow().len(), 1);
}

#[test]
fn test_rerun_is_idempotent() {
    let out = TempDir::new().unwrap();
    let deck = assembler(&out);
    let tracker = FakeTracker::new(vec![
        story(1, "One", StoryKind::Feature, "to-print,ux").with_estimate(2),
        story(2, "Two", StoryKind::Release, "to-print,p"),
    ]);
    let everything = Filter::default();

    let first = run(&tracker, &deck, &mut Scripted::new(&["y", "y"]), &everything).unwrap();
    assert_eq!(first.deck.cards(), 2);
    assert_eq!(tracker.labels_of(1), "ux,p");
    assert_eq!(tracker.labels_of(2), "p");

    let second = run(&tracker, &deck, &mut Scripted::new(&["y", "y"]), &everything).unwrap();
    let relabel = second.relabel.unwrap();
    assert_eq!(relabel.updated, 0);
    assert_eq!(relabel.unchanged, 2);
    assert_eq!(tracker.labels_of(1), "ux,p");
    assert_eq!(tracker.updates.borrow().len(), 2);

    let printed = run(&tracker, &deck, &mut Scripted::new(&[]), &Filter::to_print()).unwrap();
    assert_eq!(printed.deck, DeckOutcome::Empty);
}

#[test]
fn test_declined_prompts_change_nothing() {
    let out = TempDir::new().unwrap();
    let tracker = FakeTracker::new(vec![story(8, "Ship it", StoryKind::Release, "to-print")]);
    let mut confirm = Scripted::new(&["Y", "yes"]);

    let report = run(&tracker, &assembler(&out), &mut confirm, &Filter::to_print()).unwrap();

    assert_eq!(report.deck.cards(), 1);
    assert_eq!(confirm.asked.len(), 2);
    assert!(tracker.updates.borrow().is_empty());
    assert_eq!(tracker.labels_of(8), "to-print");
}
