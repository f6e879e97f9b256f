//! Project loading and error reporting shared by every command.

use std::path::{Path, PathBuf};

use kiln_bundler::Error;
use kiln_config::{BuildConfig, BuildPlan, StatsLevel};
use kiln_core::{BuildMode, Environment, derive_mode};
use tracing::{Level, debug};

pub struct ProjectArgs {
    pub config: Option<PathBuf>,
    pub root: PathBuf,
    pub mode: Option<BuildMode>,
    pub verbose: u8,
}

/// Discover the config, start logging, and compile the plan.
///
/// `adjust` sees the parsed config before it is compiled, so command-line
/// overrides go through the same validation as the file.
pub fn load_plan(args: &ProjectArgs, adjust: impl FnOnce(&mut BuildConfig)) -> BuildPlan {
    // Watcher events carry absolute paths; the root has to match them.
    let root = args.root.canonicalize().unwrap_or_else(|e| {
        eprintln!("error: project root '{}': {}", args.root.display(), e);
        std::process::exit(1);
    });

    let (mut config, origin) = BuildConfig::discover(&root, args.config.as_deref())
        .unwrap_or_else(|e| fail(e));
    init_logging(log_level(config.stats, args.verbose));
    match &origin {
        Some(path) => debug!(config = %path.display(), "loaded config"),
        None => debug!("no config file, using defaults"),
    }

    adjust(&mut config);
    let env = Environment::capture();
    let mode = derive_mode(&env, args.mode);
    config
        .compile(&root, mode, &env)
        .unwrap_or_else(|e| fail(e))
}

/// Tracing level for a `stats` setting; any `-v` wins over the config.
pub fn log_level(stats: StatsLevel, verbose: u8) -> Level {
    match verbose {
        0 => match stats {
            StatsLevel::ErrorsOnly => Level::ERROR,
            StatsLevel::Minimal => Level::WARN,
            StatsLevel::Normal => Level::INFO,
            StatsLevel::Verbose => Level::DEBUG,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_logging(level: Level) {
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("warning: logging unavailable: {}", e);
    }
}

/// Report `err` and exit with status 1.
pub fn fail(err: impl Into<Error>) -> ! {
    let err = err.into();
    eprintln!("error: {}", err);
    if let Error::ModuleNotFound(missing) = &err {
        eprint!("{}", missing.render_candidates());
    }
    std::process::exit(1)
}

/// `path` relative to `root` when it lies inside it.
pub fn display_relative(path: &Path, root: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .display()
        .to_string()
}
