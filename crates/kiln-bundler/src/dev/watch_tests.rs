use std::path::PathBuf;

use notify::event::{AccessKind, CreateKind, ModifyKind};
use notify::{Event, EventKind};

use super::watch::relevant_paths;

#[test]
fn content_changes_are_relevant() {
    let event = Event::new(EventKind::Modify(ModifyKind::Any))
        .add_path(PathBuf::from("/app/src/App.tsx"));
    assert_eq!(relevant_paths(&event, &[]), [PathBuf::from("/app/src/App.tsx")]);

    let event = Event::new(EventKind::Create(CreateKind::File))
        .add_path(PathBuf::from("/app/src/New.tsx"));
    assert_eq!(relevant_paths(&event, &[]).len(), 1);
}

#[test]
fn output_directory_is_ignored() {
    let ignored = [PathBuf::from("/app/build")];
    let event = Event::new(EventKind::Modify(ModifyKind::Any))
        .add_path(PathBuf::from("/app/build/app-1234abcd.bundle.js"))
        .add_path(PathBuf::from("/app/index.web.tsx"));
    assert_eq!(
        relevant_paths(&event, &ignored),
        [PathBuf::from("/app/index.web.tsx")]
    );
}

#[test]
fn access_events_are_not_changes() {
    let event = Event::new(EventKind::Access(AccessKind::Any))
        .add_path(PathBuf::from("/app/index.web.tsx"));
    assert!(relevant_paths(&event, &[]).is_empty());
}
