use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use kiln_config::TransformationChain;

use super::common::{ProjectArgs, load_plan};

pub struct RulesArgs {
    pub project: ProjectArgs,
    pub path: PathBuf,
}

pub fn run(args: RulesArgs) {
    let plan = load_plan(&args.project, |_| {});
    let path = plan.root.join(&args.path);
    print!("{}", describe(&plan.chain, &path));
}

/// Human-readable account of which rule claims `path` and what it runs.
pub fn describe(chain: &TransformationChain, path: &Path) -> String {
    let Some((index, rule)) = chain.matching_rule(path) else {
        return "no rule matches; passed through unmodified\n".to_owned();
    };

    let mut out = String::new();
    let _ = write!(out, "rule {}: test {}", index, rule.test.as_str());
    if let Some(exclude) = &rule.exclude {
        let _ = write!(out, ", exclude {}", exclude.as_str());
    }
    if rule.priority != 0 {
        let _ = write!(out, ", priority {}", rule.priority);
    }
    out.push('\n');

    for (step, handler) in rule.handlers.iter().enumerate() {
        let _ = write!(out, "  {}. {}", step + 1, handler.name);
        if !handler.options.is_empty() {
            let options = serde_json::Value::Object(handler.options.clone());
            let _ = write!(out, " {}", options);
        }
        out.push('\n');
    }
    out
}
