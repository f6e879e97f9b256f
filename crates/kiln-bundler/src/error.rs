//! Build errors.
//!
//! Everything propagates to the caller; nothing is recovered locally.

use std::io;
use std::path::PathBuf;

use kiln_config::{ConfigError, ModuleNotFound};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error("{0}")]
    ModuleNotFound(#[from] Box<ModuleNotFound>),

    #[error("handler '{handler}' failed on '{}': {diagnostic}", path.display())]
    HandlerTransform {
        path: PathBuf,
        handler: String,
        diagnostic: String,
    },

    #[error("failed to write '{}': {source}", path.display())]
    OutputWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("dev server: {0}")]
    Server(String),

    #[error("file watcher: {0}")]
    Watch(#[from] notify::Error),
}

impl From<ModuleNotFound> for Error {
    fn from(err: ModuleNotFound) -> Self {
        Error::ModuleNotFound(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
