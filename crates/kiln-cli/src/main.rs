mod cli;
mod commands;

use cli::{BuildParams, ResolveParams, RulesParams, ServeParams, build_cli};

fn main() {
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("build", m)) => {
            let params = BuildParams::from_matches(m);
            commands::build::run(params.into());
        }
        Some(("serve", m)) => {
            let params = ServeParams::from_matches(m);
            commands::serve::run(params.into());
        }
        Some(("resolve", m)) => {
            let params = ResolveParams::from_matches(m);
            commands::resolve::run(params.into());
        }
        Some(("rules", m)) => {
            let params = RulesParams::from_matches(m);
            commands::rules::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
