use kiln_bundler::Builder;

use super::common::{ProjectArgs, display_relative, fail, load_plan};

pub struct BuildArgs {
    pub project: ProjectArgs,
}

pub fn run(args: BuildArgs) {
    let plan = load_plan(&args.project, |_| {});
    let target = display_relative(&plan.output.target_dir, &plan.root);

    let builder = Builder::new(plan).unwrap_or_else(|e| fail(e));
    let output = builder.build_and_emit().unwrap_or_else(|e| fail(e));

    tracing::info!(
        target_dir = %target,
        bundle = %output.bundle_filename,
        modules = output.module_count,
        files = output.artifacts.len(),
        "build complete"
    );
}
