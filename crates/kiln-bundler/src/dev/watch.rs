//! Source tree watching.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::warn;

use crate::error::Result;

/// Events arriving this close together count as one change.
pub const DEBOUNCE: Duration = Duration::from_millis(100);

pub struct SourceWatcher {
    // Dropping the watcher stops event delivery.
    _watcher: RecommendedWatcher,
    events: Receiver<notify::Result<Event>>,
    ignored: Vec<PathBuf>,
}

impl SourceWatcher {
    /// Watch `root` recursively, skipping anything under `ignored`.
    pub fn new(root: &Path, ignored: Vec<PathBuf>) -> Result<Self> {
        let (tx, events) = mpsc::channel();
        let mut watcher = notify::recommended_watcher(move |event: notify::Result<Event>| {
            let _ = tx.send(event);
        })?;
        watcher.watch(root, RecursiveMode::Recursive)?;
        Ok(Self {
            _watcher: watcher,
            events,
            ignored,
        })
    }

    /// Block until something relevant changes; returns the changed paths.
    ///
    /// `None` once the watcher has shut down.
    pub fn next_change(&self) -> Option<Vec<PathBuf>> {
        loop {
            let mut changed = self.relevant(self.events.recv().ok()?);
            if changed.is_empty() {
                continue;
            }
            loop {
                match self.events.recv_timeout(DEBOUNCE) {
                    Ok(event) => changed.extend(self.relevant(event)),
                    Err(RecvTimeoutError::Timeout) => break,
                    Err(RecvTimeoutError::Disconnected) => return Some(changed),
                }
            }
            changed.sort();
            changed.dedup();
            return Some(changed);
        }
    }

    fn relevant(&self, event: notify::Result<Event>) -> Vec<PathBuf> {
        match event {
            Ok(event) => relevant_paths(&event, &self.ignored),
            Err(e) => {
                warn!(error = %e, "watch error");
                Vec::new()
            }
        }
    }
}

/// Paths of a content-changing event that lie outside `ignored`.
pub fn relevant_paths(event: &Event, ignored: &[PathBuf]) -> Vec<PathBuf> {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return Vec::new();
    }
    event
        .paths
        .iter()
        .filter(|path| !ignored.iter().any(|dir| path.starts_with(dir)))
        .cloned()
        .collect()
}
