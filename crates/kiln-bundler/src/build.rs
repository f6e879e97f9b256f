//! One build: graph, bundle, HTML document, artifacts.

use std::sync::Arc;

use kiln_config::{BuildPlan, Stage};
use kiln_core::ContentHash;
use tracing::{debug, info};

use crate::bundle;
use crate::collab::{HtmlPage, HtmlTemplater, ModuleCompiler, PassthroughCompiler, ScriptInjector};
use crate::emit::{Artifact, emit};
use crate::error::{Error, Result};
use crate::graph::ModuleGraph;
use crate::handlers::HandlerRegistry;

/// Result of a build, held in memory until emitted or served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    /// Content hash of the bundle; changes whenever the bundle does.
    pub build_id: String,
    pub bundle_filename: String,
    pub html_filename: Option<String>,
    pub module_count: usize,
    /// Assets first, then the bundle, then the HTML document.
    pub artifacts: Vec<Artifact>,
}

impl BuildOutput {
    pub fn get(&self, filename: &str) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.filename == filename)
    }

    pub fn bundle(&self) -> Option<&Artifact> {
        self.get(&self.bundle_filename)
    }
}

pub struct Builder {
    plan: BuildPlan,
    registry: HandlerRegistry,
    templater: Arc<dyn HtmlTemplater>,
}

impl Builder {
    /// Builder with the built-in handlers over [`PassthroughCompiler`].
    pub fn new(plan: BuildPlan) -> Result<Self> {
        Self::with_compiler(plan, Arc::new(PassthroughCompiler))
    }

    pub fn with_compiler(plan: BuildPlan, compiler: Arc<dyn ModuleCompiler>) -> Result<Self> {
        Self::with_registry(plan, HandlerRegistry::with_builtins(compiler))
    }

    /// Fails when a rule names a handler `registry` does not know.
    pub fn with_registry(plan: BuildPlan, registry: HandlerRegistry) -> Result<Self> {
        plan.chain.validate(|name| registry.contains(name))?;
        Ok(Self {
            plan,
            registry,
            templater: Arc::new(ScriptInjector),
        })
    }

    pub fn templater(mut self, templater: Arc<dyn HtmlTemplater>) -> Self {
        self.templater = templater;
        self
    }

    pub fn plan(&self) -> &BuildPlan {
        &self.plan
    }

    /// Build into memory. Nothing is written.
    pub fn build(&self) -> Result<BuildOutput> {
        let plan = &self.plan;
        info!(mode = %plan.mode, entry = %plan.entry.display(), "building");

        let graph = ModuleGraph::build(plan, &self.registry)?;
        let code = bundle::render(&graph, plan);
        let bundle_filename = plan.output.bundle_filename(&plan.name, code.as_bytes());
        let build_id = ContentHash::of(code.as_bytes()).to_string();

        let mut artifacts: Vec<Artifact> = graph
            .assets()
            .iter()
            .map(|a| Artifact::new(a.filename.clone(), a.content.clone()))
            .collect();
        artifacts.push(Artifact::new(bundle_filename.clone(), code));

        let mut html_filename = None;
        if plan.pipeline.contains(Stage::HtmlTemplate) {
            let html = self.render_html(&bundle_filename)?;
            artifacts.push(Artifact::new(plan.html_filename.clone(), html));
            html_filename = Some(plan.html_filename.clone());
        }

        info!(
            bundle = %bundle_filename,
            modules = graph.len(),
            assets = graph.assets().len(),
            "built"
        );
        Ok(BuildOutput {
            build_id,
            bundle_filename,
            html_filename,
            module_count: graph.len(),
            artifacts,
        })
    }

    /// Build, then clean the target directory and write everything.
    pub fn build_and_emit(&self) -> Result<BuildOutput> {
        let output = self.build()?;
        let descriptor = &self.plan.output;
        emit(
            &descriptor.target_dir,
            &self.plan.root,
            descriptor.clean,
            &output.artifacts,
        )?;
        Ok(output)
    }

    fn render_html(&self, bundle_filename: &str) -> Result<String> {
        let plan = &self.plan;
        let fs = plan.policy.fs();
        let template = match &plan.html_template {
            Some(path) if fs.is_file(path) => {
                Some(fs.read_to_string(path).map_err(|source| Error::Read {
                    path: path.clone(),
                    source,
                })?)
            }
            Some(path) => {
                debug!(template = %path.display(), "template missing, using skeleton");
                None
            }
            None => None,
        };
        let page = HtmlPage {
            title: &plan.html_title,
            scripts: vec![plan.output.public_url(bundle_filename)],
        };
        self.templater
            .render(template.as_deref(), &page)
            .map_err(|diagnostic| Error::HandlerTransform {
                path: plan
                    .html_template
                    .clone()
                    .unwrap_or_else(|| plan.html_filename.clone().into()),
                handler: "html-template".into(),
                diagnostic,
            })
    }
}
