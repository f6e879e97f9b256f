//! Shared argument builders for CLI commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};
use kiln_core::BuildMode;

/// Config file (-c/--config).
pub fn config_arg() -> Arg {
    Arg::new("config")
        .short('c')
        .long("config")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Config file [default: <ROOT>/kiln.json, built-in defaults if absent]")
}

/// Project root (--root).
pub fn root_arg() -> Arg {
    Arg::new("root")
        .long("root")
        .value_name("DIR")
        .value_parser(value_parser!(PathBuf))
        .help("Project root [default: current directory]")
}

/// Build mode override (--mode).
pub fn mode_arg() -> Arg {
    Arg::new("mode")
        .long("mode")
        .value_name("MODE")
        .value_parser(|s: &str| s.parse::<BuildMode>())
        .help("development or production [default: from NODE_ENV]")
}

/// Verbosity (-v, repeatable).
pub fn verbose_arg() -> Arg {
    Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .help("More output (-v info, -vv debug, -vvv trace); overrides `stats`")
}

/// Dev server port (--port).
pub fn port_arg() -> Arg {
    Arg::new("port")
        .short('p')
        .long("port")
        .value_name("PORT")
        .value_parser(value_parser!(u16))
        .help("Dev server port [default: devServer.port]")
}

/// Serve from memory only (--no-write-to-disk).
pub fn no_write_to_disk_arg() -> Arg {
    Arg::new("no_write_to_disk")
        .long("no-write-to-disk")
        .action(ArgAction::SetTrue)
        .help("Keep rebuilt artifacts in memory instead of writing them to the target directory")
}

/// Import specifier (positional).
pub fn specifier_arg() -> Arg {
    Arg::new("specifier")
        .value_name("SPECIFIER")
        .required(true)
        .help("Import specifier, e.g. ./components/Button or react-native")
}

/// Importing file (--from).
pub fn from_arg() -> Arg {
    Arg::new("from")
        .long("from")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("File the import appears in, relative to the root [default: the entry]")
}

/// File to classify (positional).
pub fn path_arg() -> Arg {
    Arg::new("path")
        .value_name("PATH")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("File path, relative to the root")
}
