use std::path::{Path, PathBuf};

use kiln_core::{BuildMode, TemplateError};

use crate::error::ConfigError;
use crate::output::{OutputConfig, SourceMapMode, plan_output};

#[test]
fn default_plan_for_each_mode() {
    let root = Path::new("/app");
    let dev = plan_output(BuildMode::Development, &OutputConfig::default(), root).unwrap();
    assert_eq!(dev.target_dir, PathBuf::from("/app/build"));
    assert_eq!(dev.filename.as_str(), "app-[contenthash].bundle.js");
    assert!(dev.clean);
    assert!(!dev.minify);
    assert_eq!(dev.source_map, SourceMapMode::Inline);

    let prod = plan_output(BuildMode::Production, &OutputConfig::default(), root).unwrap();
    assert!(prod.clean);
    assert!(prod.minify);
    assert_eq!(prod.source_map, SourceMapMode::None);
}

#[test]
fn bundle_filename_is_idempotent() {
    let root = Path::new("/app");
    let a = plan_output(BuildMode::Production, &OutputConfig::default(), root).unwrap();
    let b = plan_output(BuildMode::Production, &OutputConfig::default(), root).unwrap();
    let content = b"(function(){})()";

    assert_eq!(a, b);
    assert_eq!(a.bundle_filename("app", content), b.bundle_filename("app", content));
    assert_ne!(
        a.bundle_filename("app", content),
        a.bundle_filename("app", b"(function(){ })()")
    );
}

#[test]
fn asset_filename_keeps_extension() {
    let plan = plan_output(BuildMode::Development, &OutputConfig::default(), Path::new("/app")).unwrap();
    let name = plan.asset_filename(Path::new("/app/assets/logo.png"), b"png-bytes");
    assert!(name.ends_with(".png"));
    assert_eq!(name.len(), 12);
}

#[test]
fn public_url_joins_prefix() {
    let mut config = OutputConfig::default();
    let root = Path::new("/app");

    let plan = plan_output(BuildMode::Development, &config, root).unwrap();
    assert_eq!(plan.public_url("app.js"), "app.js");

    config.public_path = "/static/".into();
    let plan = plan_output(BuildMode::Development, &config, root).unwrap();
    assert_eq!(plan.public_url("app.js"), "/static/app.js");

    config.public_path = "https://cdn.test/assets".into();
    let plan = plan_output(BuildMode::Development, &config, root).unwrap();
    assert_eq!(plan.public_url("app.js"), "https://cdn.test/assets/app.js");
}

#[test]
fn template_without_hash_is_rejected() {
    let config = OutputConfig {
        filename: "app.bundle.js".into(),
        ..Default::default()
    };
    let err = plan_output(BuildMode::Production, &config, Path::new("/app")).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Template(TemplateError::MissingContentHash(_))
    ));
}
