//! Development serving: build once, serve, rebuild on every source change.
//!
//! The watcher loop is the only writer of the artifact store; request
//! handlers only read it, so a request sees either the previous build or the
//! next one, never a partial one.

mod server;
mod watch;

#[cfg(test)]
mod watch_tests;

use std::thread;

use tracing::{info, warn};

pub use server::{ArtifactStore, DevServer, Reply, content_type, route};
pub use watch::{DEBOUNCE, SourceWatcher, relevant_paths};

use crate::build::Builder;
use crate::error::Result;

const WORKERS: usize = 4;

/// Build, then persist (when configured) and publish the result.
pub fn rebuild(builder: &Builder, store: &ArtifactStore) -> Result<()> {
    let output = if builder.plan().dev_server.write_to_disk {
        builder.build_and_emit()?
    } else {
        builder.build()?
    };
    store.publish(output);
    Ok(())
}

/// Serve until the watcher shuts down.
///
/// A failing initial build is fatal; a failing rebuild is logged and the
/// previous artifacts keep being served.
pub fn serve(builder: &Builder) -> Result<()> {
    let plan = builder.plan();
    let store = ArtifactStore::new();
    rebuild(builder, &store)?;

    let server = DevServer::bind(
        &plan.dev_server.address(),
        store.clone(),
        plan.dev_server.static_roots.clone(),
    )?;
    let watcher = SourceWatcher::new(
        &plan.root,
        vec![plan.output.target_dir.clone(), plan.root.join(".git")],
    )?;
    info!(address = %server.local_addr(), "serving");

    thread::scope(|scope| {
        scope.spawn(|| server.serve(WORKERS));
        while let Some(changed) = watcher.next_change() {
            info!(files = changed.len(), "change detected, rebuilding");
            match rebuild(builder, &store) {
                Ok(()) => log_current(&store),
                Err(e) => warn!(error = %e, "rebuild failed; serving previous build"),
            }
        }
        server.unblock();
    });
    Ok(())
}

fn log_current(store: &ArtifactStore) {
    if let Some(output) = store.current() {
        info!(build = %output.build_id, bundle = %output.bundle_filename, "rebuilt");
    }
}
