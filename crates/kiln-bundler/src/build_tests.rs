use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indoc::indoc;
use kiln_config::{BuildConfig, ConfigError, HandlerSpec};
use kiln_core::{BuildMode, Environment};

use crate::build::Builder;
use crate::collab::{CompileRequest, ModuleCompiler};
use crate::error::Error;

fn project() -> (tempfile::TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    let write = |path: &str, content: &[u8]| {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    };
    write(
        "index.web.tsx",
        indoc! {br#"
            import App from "./App";
            import "./styles.css";
            import logo from "./assets/logo.png";
            App(logo);
        "#},
    );
    write(
        "App.web.tsx",
        indoc! {br#"
            export default function App(logo) {
                document.body.innerHTML = "<img src=" + logo + ">";
            }
        "#},
    );
    write("App.tsx", b"export default function App() { native(); }");
    write("styles.css", b"body {\n  margin: 0;\n}\n");
    write("assets/logo.png", &[0x89, b'P', b'N', b'G']);
    write(
        "web/public/index.html",
        b"<!DOCTYPE html>\n<html>\n<head><title>Shop</title></head>\n<body><div id=\"root\"></div></body>\n</html>\n",
    );
    (dir, root)
}

fn builder(root: &Path, mode: BuildMode) -> Builder {
    let plan = BuildConfig::default()
        .compile(root, mode, &Environment::new())
        .unwrap();
    Builder::new(plan).unwrap()
}

fn scripts_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<_> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .filter(|name| name.ends_with(".js"))
        .collect();
    names.sort();
    names
}

#[test]
fn production_build_leaves_only_the_compacted_bundle() {
    let (_dir, root) = project();
    let target = root.join("build");
    fs::create_dir_all(&target).unwrap();
    fs::write(target.join("app-stale000.bundle.js"), "  stale();\n").unwrap();

    let output = builder(&root, BuildMode::Production).build_and_emit().unwrap();

    assert_eq!(scripts_in(&target), [output.bundle_filename.clone()]);
    let bundle = fs::read_to_string(target.join(&output.bundle_filename)).unwrap();
    assert!(bundle.lines().all(|line| line == line.trim()));
    assert!(bundle.contains("var __DEV__ = false;"));
    assert!(bundle.contains("document.body.innerHTML"));
    assert!(!bundle.contains("native()"));
    assert_eq!(output.module_count, 4);
}

#[test]
fn development_and_production_hashes_differ() {
    let (_dir, root) = project();
    let target = root.join("build");

    let prod = builder(&root, BuildMode::Production).build_and_emit().unwrap();
    let dev = builder(&root, BuildMode::Development).build_and_emit().unwrap();

    assert_ne!(prod.bundle_filename, dev.bundle_filename);
    assert_ne!(prod.build_id, dev.build_id);
    assert_eq!(scripts_in(&target), [dev.bundle_filename.clone()]);
}

#[test]
fn rebuilding_unchanged_sources_is_idempotent() {
    let (_dir, root) = project();
    let first = builder(&root, BuildMode::Production).build().unwrap();
    let second = builder(&root, BuildMode::Production).build().unwrap();
    assert_eq!(first, second);
}

#[test]
fn html_references_bundle_through_template() {
    let (_dir, root) = project();
    let output = builder(&root, BuildMode::Development).build_and_emit().unwrap();

    assert_eq!(output.html_filename.as_deref(), Some("index.html"));
    let html = fs::read_to_string(root.join("build/index.html")).unwrap();
    assert!(html.contains("<title>Shop</title>"));
    assert!(html.contains(&format!(
        "<script defer src=\"{}\"></script></head>",
        output.bundle_filename
    )));
}

#[test]
fn missing_template_falls_back_to_skeleton() {
    let (_dir, root) = project();
    fs::remove_file(root.join("web/public/index.html")).unwrap();
    let output = builder(&root, BuildMode::Development).build().unwrap();

    let html = String::from_utf8(output.get("index.html").unwrap().content.clone()).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<div id=\"root\"></div>"));
}

#[test]
fn assets_are_emitted_with_hashed_names() {
    let (_dir, root) = project();
    let output = builder(&root, BuildMode::Production).build_and_emit().unwrap();

    let png: Vec<_> = output
        .artifacts
        .iter()
        .filter(|a| a.filename.ends_with(".png"))
        .collect();
    assert_eq!(png.len(), 1);
    assert_eq!(png[0].filename.len(), "01234567.png".len());
    assert_eq!(
        fs::read(root.join("build").join(&png[0].filename)).unwrap(),
        [0x89, b'P', b'N', b'G']
    );
    let bundle = String::from_utf8(output.bundle().unwrap().content.clone()).unwrap();
    assert!(bundle.contains(&format!("module.exports = \"{}\";", png[0].filename)));
}

#[test]
fn unknown_handler_is_rejected_before_building() {
    let (_dir, root) = project();
    let mut config = BuildConfig::default();
    config.rules[3].handlers.push(HandlerSpec::Name("postcss".into()));
    let plan = config
        .compile(&root, BuildMode::Development, &Environment::new())
        .unwrap();

    let err = Builder::new(plan).err().unwrap();
    assert!(matches!(
        err,
        Error::Configuration(ConfigError::UnknownHandler { rule: 3, ref name }) if name == "postcss"
    ));
}

#[test]
fn custom_compiler_is_used_for_scripts() {
    struct Banner;
    impl ModuleCompiler for Banner {
        fn compile(&self, request: &CompileRequest<'_>) -> Result<String, String> {
            Ok(format!("/* {} */\n{}", request.mode, request.source))
        }
    }

    let (_dir, root) = project();
    let plan = BuildConfig::default()
        .compile(&root, BuildMode::Development, &Environment::new())
        .unwrap();
    let output = Builder::with_compiler(plan, Arc::new(Banner))
        .unwrap()
        .build()
        .unwrap();
    let bundle = String::from_utf8(output.bundle().unwrap().content.clone()).unwrap();
    assert_eq!(bundle.matches("/* development */").count(), 2);
}

#[test]
fn compiler_diagnostic_aborts_build() {
    struct Failing;
    impl ModuleCompiler for Failing {
        fn compile(&self, request: &CompileRequest<'_>) -> Result<String, String> {
            Err(format!("unexpected token in {}", request.path.display()))
        }
    }

    let (_dir, root) = project();
    let plan = BuildConfig::default()
        .compile(&root, BuildMode::Production, &Environment::new())
        .unwrap();
    let err = Builder::with_compiler(plan, Arc::new(Failing))
        .unwrap()
        .build_and_emit()
        .unwrap_err();

    let Error::HandlerTransform { path, handler, .. } = err else {
        panic!("expected HandlerTransform");
    };
    assert_eq!(path, root.join("index.web.tsx"));
    assert_eq!(handler, "compile");
    assert!(!root.join("build").exists());
}
