//! Command builders for the CLI.

use clap::Command;

use super::args::*;

/// Config, root, mode and verbosity, accepted by every command.
fn with_project_args(cmd: Command) -> Command {
    cmd.arg(config_arg())
        .arg(root_arg())
        .arg(mode_arg())
        .arg(verbose_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("kiln")
        .about("Build and serve browser bundles from a declarative pipeline")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(build_command())
        .subcommand(serve_command())
        .subcommand(resolve_command())
        .subcommand(rules_command())
}

pub fn build_command() -> Command {
    let cmd = Command::new("build")
        .about("Build the bundle into the target directory")
        .after_help(
            r#"EXAMPLES:
  kiln build                          # mode from NODE_ENV
  kiln build --mode production        # content-hashed, compacted bundle
  kiln build -c kiln.prod.json"#,
        );
    with_project_args(cmd)
}

pub fn serve_command() -> Command {
    let cmd = Command::new("serve")
        .about("Build, serve, and rebuild on change")
        .after_help(
            r#"EXAMPLES:
  kiln serve                          # http://127.0.0.1:8080
  kiln serve -p 3000 --no-write-to-disk"#,
        )
        .arg(port_arg())
        .arg(no_write_to_disk_arg());
    with_project_args(cmd)
}

pub fn resolve_command() -> Command {
    let cmd = Command::new("resolve")
        .about("Show where an import specifier resolves to")
        .after_help(
            r#"EXAMPLES:
  kiln resolve ./components/Button
  kiln resolve react-native --from src/App.tsx"#,
        )
        .arg(specifier_arg())
        .arg(from_arg());
    with_project_args(cmd)
}

pub fn rules_command() -> Command {
    let cmd = Command::new("rules")
        .about("Show which rule and handlers apply to a file")
        .arg(path_arg());
    with_project_args(cmd)
}
