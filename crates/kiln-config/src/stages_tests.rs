use kiln_core::{BuildMode, Environment};
use serde_json::json;

use crate::stages::{DefineConfig, Defines, Pipeline, Stage};

#[test]
fn development_pipeline() {
    let pipeline = Pipeline::compose(BuildMode::Development, true);
    assert_eq!(
        pipeline.stages(),
        [
            Stage::Define,
            Stage::HtmlTemplate,
            Stage::LiveReload,
            Stage::InlineSourceMap,
        ]
    );
}

#[test]
fn production_pipeline() {
    let pipeline = Pipeline::compose(BuildMode::Production, true);
    assert_eq!(
        pipeline.stages(),
        [Stage::Define, Stage::HtmlTemplate, Stage::Minify]
    );
}

#[test]
fn live_reload_isolated_to_development() {
    for live_reload in [true, false] {
        assert!(!Pipeline::compose(BuildMode::Production, live_reload).contains(Stage::LiveReload));
    }
    assert!(Pipeline::compose(BuildMode::Development, true).contains(Stage::LiveReload));
    assert!(!Pipeline::compose(BuildMode::Development, false).contains(Stage::LiveReload));
}

#[test]
fn defines_follow_mode() {
    let env = Environment::new().with("API_URL", "https://api.test").with("SECRET", "x");
    let config = DefineConfig {
        env: vec!["API_URL".into(), "MISSING".into()],
        ..Default::default()
    };

    let dev = Defines::new(BuildMode::Development, &config, &env);
    assert_eq!(dev.get("__DEV__"), Some(&json!(true)));
    assert_eq!(
        dev.get("process"),
        Some(&json!({ "env": { "API_URL": "https://api.test", "NODE_ENV": "development" } }))
    );

    let prod = Defines::new(BuildMode::Production, &config, &env);
    assert_eq!(prod.get("__DEV__"), Some(&json!(false)));
    assert_eq!(prod.get("process").unwrap()["env"]["NODE_ENV"], json!("production"));
}

#[test]
fn user_constants_are_appended() {
    let mut config = DefineConfig::default();
    config.constants.insert("VERSION".into(), json!("1.2.0"));
    let defines = Defines::new(BuildMode::Production, &config, &Environment::new());
    let names: Vec<_> = defines.iter().map(|(k, _)| k).collect();
    assert_eq!(names, ["__DEV__", "process", "VERSION"]);
}

#[test]
fn dev_flag_ignores_app_env() {
    let env = Environment::new().with("APP_ENV", "production");
    let defines = Defines::new(BuildMode::Development, &DefineConfig::default(), &env);

    assert_eq!(defines.get("__DEV__"), Some(&json!(true)));
    assert_eq!(
        defines.get("process"),
        Some(&json!({ "env": { "NODE_ENV": "development" } }))
    );
}
