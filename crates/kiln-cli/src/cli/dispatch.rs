//! Dispatch logic: extract params from ArgMatches and convert to command args.

use std::path::PathBuf;

use clap::ArgMatches;
use kiln_core::BuildMode;

use crate::commands::build::BuildArgs;
use crate::commands::common::ProjectArgs;
use crate::commands::resolve::ResolveArgs;
use crate::commands::rules::RulesArgs;
use crate::commands::serve::ServeArgs;

/// Arguments every command shares.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectParams {
    pub config: Option<PathBuf>,
    pub root: Option<PathBuf>,
    pub mode: Option<BuildMode>,
    pub verbose: u8,
}

impl ProjectParams {
    fn from_matches(m: &ArgMatches) -> Self {
        Self {
            config: m.get_one::<PathBuf>("config").cloned(),
            root: m.get_one::<PathBuf>("root").cloned(),
            mode: m.get_one::<BuildMode>("mode").copied(),
            verbose: m.get_count("verbose"),
        }
    }
}

impl From<ProjectParams> for ProjectArgs {
    fn from(p: ProjectParams) -> Self {
        Self {
            config: p.config,
            root: p.root.unwrap_or_else(|| PathBuf::from(".")),
            mode: p.mode,
            verbose: p.verbose,
        }
    }
}

pub struct BuildParams {
    pub project: ProjectParams,
}

impl BuildParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            project: ProjectParams::from_matches(m),
        }
    }
}

impl From<BuildParams> for BuildArgs {
    fn from(p: BuildParams) -> Self {
        Self {
            project: p.project.into(),
        }
    }
}

pub struct ServeParams {
    pub project: ProjectParams,
    pub port: Option<u16>,
    pub no_write_to_disk: bool,
}

impl ServeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            project: ProjectParams::from_matches(m),
            port: m.get_one::<u16>("port").copied(),
            no_write_to_disk: m.get_flag("no_write_to_disk"),
        }
    }
}

impl From<ServeParams> for ServeArgs {
    fn from(p: ServeParams) -> Self {
        Self {
            project: p.project.into(),
            port: p.port,
            write_to_disk: if p.no_write_to_disk { Some(false) } else { None },
        }
    }
}

pub struct ResolveParams {
    pub project: ProjectParams,
    pub specifier: String,
    pub from: Option<PathBuf>,
}

impl ResolveParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            project: ProjectParams::from_matches(m),
            specifier: m
                .get_one::<String>("specifier")
                .cloned()
                .unwrap_or_default(),
            from: m.get_one::<PathBuf>("from").cloned(),
        }
    }
}

impl From<ResolveParams> for ResolveArgs {
    fn from(p: ResolveParams) -> Self {
        Self {
            project: p.project.into(),
            specifier: p.specifier,
            from: p.from,
        }
    }
}

pub struct RulesParams {
    pub project: ProjectParams,
    pub path: PathBuf,
}

impl RulesParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            project: ProjectParams::from_matches(m),
            path: m.get_one::<PathBuf>("path").cloned().unwrap_or_default(),
        }
    }
}

impl From<RulesParams> for RulesArgs {
    fn from(p: RulesParams) -> Self {
        Self {
            project: p.project.into(),
            path: p.path,
        }
    }
}
