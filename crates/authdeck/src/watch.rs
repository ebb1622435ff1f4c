//! Live reload of a deck file.
//!
//! Watches the file's parent directory and filters events down to the deck
//! path, so saves that replace the file by rename are still seen.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use anyhow::{Context, Result};
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};

use crate::deck::Deck;
use crate::deck::stepper::DeckCommand;

const DEBOUNCE: Duration = Duration::from_millis(250);

/// Outcome of re-reading the deck after a change.
#[derive(Debug)]
pub enum WatchEvent {
    Reload(DeckCommand),
    /// The file changed but no longer parses. The old deck stays up.
    Invalid(String),
}

pub struct DeckWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<WatchEvent>,
    path: PathBuf,
}

impl DeckWatcher {
    /// Start watching `path`. `wake` runs on the watcher thread after each
    /// event is queued, so the UI can repaint.
    pub fn spawn(path: &Path, wake: impl Fn() + Send + 'static) -> Result<Self> {
        let path = path
            .canonicalize()
            .with_context(|| format!("Cannot watch {}", path.display()))?;
        let dir = path
            .parent()
            .map(Path::to_path_buf)
            .context("Deck file has no parent directory")?;

        let (tx, rx) = mpsc::channel();
        let target = path.clone();
        let mut debouncer = new_debouncer(DEBOUNCE, move |res: DebounceEventResult| {
            handle_events(res, &target, &tx, &wake);
        })
        .context("Failed to start file watcher")?;
        debouncer
            .watcher()
            .watch(&dir, RecursiveMode::NonRecursive)
            .with_context(|| format!("Failed to watch {}", dir.display()))?;
        log::info!("watching {}", path.display());

        Ok(Self {
            _debouncer: debouncer,
            rx,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Everything queued since the last poll, oldest first.
    pub fn poll(&self) -> Vec<WatchEvent> {
        self.rx.try_iter().collect()
    }
}

fn handle_events(
    res: DebounceEventResult,
    target: &Path,
    tx: &Sender<WatchEvent>,
    wake: &impl Fn(),
) {
    let events = match res {
        Ok(events) => events,
        Err(e) => {
            log::warn!("watch error: {e}");
            return;
        }
    };
    if !events.iter().any(|e| e.path == target) {
        return;
    }
    log::debug!("{} changed", target.display());
    if tx.send(reload(target)).is_ok() {
        wake();
    }
}

/// Re-read the deck at `path` into a reload command.
pub fn reload(path: &Path) -> WatchEvent {
    match Deck::load(path) {
        Ok(deck) => WatchEvent::Reload(DeckCommand::Reload(Box::new(deck))),
        Err(e) => {
            log::error!("reload failed: {e}");
            WatchEvent::Invalid(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_deck(name: &str, content: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "authdeck-watch-{}-{name}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn reload_parses_valid_deck() {
        let path = temp_deck(
            "valid",
            "title: Live\nslides:\n  - title: S\n    steps:\n      - name: one\n",
        );
        match reload(&path) {
            WatchEvent::Reload(DeckCommand::Reload(deck)) => assert_eq!(deck.title, "Live"),
            other => panic!("expected reload, got {other:?}"),
        }
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn reload_reports_broken_deck() {
        let path = temp_deck("broken", "title: [unterminated\n");
        assert!(matches!(reload(&path), WatchEvent::Invalid(_)));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn reload_reports_missing_file() {
        let path = std::env::temp_dir().join("authdeck-watch-does-not-exist.yaml");
        match reload(&path) {
            WatchEvent::Invalid(msg) => assert!(msg.contains("does-not-exist")),
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[test]
    fn spawn_rejects_missing_file() {
        let path = std::env::temp_dir().join("authdeck-watch-missing-spawn.yaml");
        assert!(DeckWatcher::spawn(&path, || {}).is_err());
    }
}
