use std::path::PathBuf;

use super::common::{ProjectArgs, display_relative, fail, load_plan};

pub struct ResolveArgs {
    pub project: ProjectArgs,
    pub specifier: String,
    /// Importing file relative to the root; the entry when absent.
    pub from: Option<PathBuf>,
}

pub fn run(args: ResolveArgs) {
    let plan = load_plan(&args.project, |_| {});
    let importer = match &args.from {
        Some(from) => plan.root.join(from),
        None => plan.entry.clone(),
    };

    match plan.policy.resolve_module(&args.specifier, &importer) {
        Ok(path) => println!("{}", display_relative(&path, &plan.root)),
        Err(missing) => fail(missing),
    }
}
