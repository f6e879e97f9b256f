use std::path::Path;
use std::sync::Arc;

use kiln_config::{HandlerOptions, OutputConfig, OutputDescriptor, TargetConfig, plan_output};
use kiln_core::BuildMode;
use serde_json::json;

use super::{Asset, HandlerContext, HandlerRegistry, ModuleContent};
use crate::collab::{CompileRequest, ModuleCompiler, PassthroughCompiler};

struct Fixture {
    output: OutputDescriptor,
    target: TargetConfig,
    assets: Vec<Asset>,
    mode: BuildMode,
}

impl Fixture {
    fn new(mode: BuildMode) -> Self {
        let config = OutputConfig {
            public_path: "/static/".into(),
            ..Default::default()
        };
        Self {
            output: plan_output(mode, &config, Path::new("/app")).unwrap(),
            target: TargetConfig::default(),
            assets: Vec::new(),
            mode,
        }
    }

    fn run(&mut self, handler: &str, path: &str, input: ModuleContent) -> Result<String, String> {
        self.run_with(handler, path, input, &HandlerOptions::new())
    }

    fn run_with(
        &mut self,
        handler: &str,
        path: &str,
        input: ModuleContent,
        options: &HandlerOptions,
    ) -> Result<String, String> {
        let registry = HandlerRegistry::with_builtins(Arc::new(PassthroughCompiler));
        let path = Path::new(path);
        let mut cx = HandlerContext::new(
            path,
            "./module",
            self.mode,
            &self.output,
            &self.target,
            &mut self.assets,
        );
        registry
            .get(handler)
            .unwrap()
            .apply(input, &mut cx, options)?
            .into_text()
    }
}

fn raw(text: &str) -> ModuleContent {
    ModuleContent::Raw(text.as_bytes().to_vec())
}

#[test]
fn builtins_are_registered() {
    let registry = HandlerRegistry::with_builtins(Arc::new(PassthroughCompiler));
    let names: Vec<_> = registry.names().collect();
    assert_eq!(
        names,
        ["compile", "asset/resource", "css", "style", "html", "json"]
    );
    assert!(registry.get("compile").unwrap().scans_dependencies());
    assert!(!registry.get("css").unwrap().scans_dependencies());
    assert!(!registry.contains("file-loader"));
}

#[test]
fn compile_minifies_by_mode() {
    let source = "const a = 1;\n\n    const b = 2;\n";

    let mut dev = Fixture::new(BuildMode::Development);
    assert_eq!(dev.run("compile", "/app/a.ts", raw(source)).unwrap(), source);

    let mut prod = Fixture::new(BuildMode::Production);
    assert_eq!(
        prod.run("compile", "/app/a.ts", raw(source)).unwrap(),
        "const a = 1;\nconst b = 2;"
    );
}

#[test]
fn compile_option_overrides_mode() {
    let mut options = HandlerOptions::new();
    options.insert("minify".into(), json!(false));
    let mut prod = Fixture::new(BuildMode::Production);
    let source = "  a();\n";
    assert_eq!(
        prod.run_with("compile", "/app/a.ts", raw(source), &options).unwrap(),
        source
    );
}

#[test]
fn compiler_sees_target_query() {
    struct Recording;
    impl ModuleCompiler for Recording {
        fn compile(&self, request: &CompileRequest<'_>) -> Result<String, String> {
            Ok(format!("// {}\n{}", request.browserslist, request.source))
        }
    }

    let mut registry = HandlerRegistry::with_builtins(Arc::new(PassthroughCompiler));
    registry.register("compile", super::CompileHandler::new(Arc::new(Recording)));
    let fixture = Fixture::new(BuildMode::Development);
    let mut assets = Vec::new();
    let mut cx = HandlerContext::new(
        Path::new("/app/a.js"),
        "./a.js",
        fixture.mode,
        &fixture.output,
        &fixture.target,
        &mut assets,
    );
    let out = registry
        .get("compile")
        .unwrap()
        .apply(raw("x();"), &mut cx, &HandlerOptions::new())
        .unwrap();
    assert_eq!(
        out,
        ModuleContent::Script(
            "// >0.2%, not dead, not op_mini all, Chrome >= 38\nx();".into()
        )
    );
}

#[test]
fn compile_rejects_binary_input() {
    let mut fixture = Fixture::new(BuildMode::Development);
    let err = fixture
        .run("compile", "/app/a.js", ModuleContent::Raw(vec![0xff, 0xfe]))
        .unwrap_err();
    assert!(err.contains("UTF-8"));
}

#[test]
fn asset_is_emitted_and_url_exported() {
    let mut fixture = Fixture::new(BuildMode::Production);
    let bytes = ModuleContent::Raw(vec![0x89, b'P', b'N', b'G']);
    let out = fixture.run("asset/resource", "/app/logo.png", bytes).unwrap();

    assert_eq!(fixture.assets.len(), 1);
    let asset = &fixture.assets[0];
    assert!(asset.filename.ends_with(".png"));
    assert_eq!(asset.content, [0x89, b'P', b'N', b'G']);
    assert_eq!(
        out,
        format!("module.exports = \"/static/{}\";\n", asset.filename)
    );
}

#[test]
fn identical_assets_are_emitted_once() {
    let mut fixture = Fixture::new(BuildMode::Production);
    fixture.run("asset/resource", "/app/a.png", raw("same")).unwrap();
    fixture.run("asset/resource", "/app/b.png", raw("same")).unwrap();
    assert_eq!(fixture.assets.len(), 1);
}

#[test]
fn css_then_style_injects_stylesheet() {
    let mut fixture = Fixture::new(BuildMode::Development);
    let css = fixture
        .run("css", "/app/app.css", raw("body { color: \"red\"; }"))
        .unwrap();
    assert_eq!(css, "module.exports = \"body { color: \\\"red\\\"; }\";\n");

    let styled = fixture
        .run("style", "/app/app.css", ModuleContent::Script(css))
        .unwrap();
    assert!(styled.starts_with("var css = (function (module) {\nmodule.exports = "));
    assert!(styled.contains("document.createElement(\"style\")"));
    assert!(styled.contains("style.setAttribute(\"data-kiln-module\", \"./module\");"));
    assert!(styled.ends_with("module.exports = css;\n"));
}

#[test]
fn style_accepts_raw_css() {
    let mut fixture = Fixture::new(BuildMode::Development);
    let styled = fixture.run("style", "/app/app.css", raw("p{}")).unwrap();
    assert!(styled.starts_with("var css = \"p{}\";\n"));
}

#[test]
fn html_exports_markup() {
    let mut fixture = Fixture::new(BuildMode::Development);
    let out = fixture.run("html", "/app/t.html", raw("<p>\n</p>")).unwrap();
    assert_eq!(out, "module.exports = \"<p>\\n</p>\";\n");
}

#[test]
fn json_exports_value() {
    let mut fixture = Fixture::new(BuildMode::Development);
    let out = fixture
        .run("json", "/app/data.json", raw(r#"{ "a": [1, 2] }"#))
        .unwrap();
    assert_eq!(out, "module.exports = {\"a\":[1,2]};\n");

    let err = fixture.run("json", "/app/bad.json", raw("{")).unwrap_err();
    assert!(err.starts_with("invalid JSON"));
}
