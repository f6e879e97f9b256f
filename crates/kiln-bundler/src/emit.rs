//! Writing artifacts to the target directory.

use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{Error, Result};

/// A file produced by a build, named relative to the target directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub content: Vec<u8>,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Empty `target` (when `clean`), then write every artifact.
///
/// The clean step finishes before the first write. `root` is the project
/// root; a target that contains it is never cleaned.
pub fn emit(target: &Path, root: &Path, clean: bool, artifacts: &[Artifact]) -> Result<()> {
    let write_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: io::Error| Error::OutputWrite { path, source }
    };

    if clean && target.exists() {
        if root.starts_with(target) {
            return Err(Error::OutputWrite {
                path: target.to_path_buf(),
                source: io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "target directory contains the project root",
                ),
            });
        }
        debug!(target = %target.display(), "cleaning");
        fs::remove_dir_all(target).map_err(write_err(target))?;
    }
    fs::create_dir_all(target).map_err(write_err(target))?;

    for artifact in artifacts {
        let path = target.join(&artifact.filename);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err(parent))?;
        }
        fs::write(&path, &artifact.content).map_err(write_err(&path))?;
        debug!(path = %path.display(), bytes = artifact.content.len(), "wrote");
    }
    info!(target = %target.display(), files = artifacts.len(), "emitted");
    Ok(())
}
