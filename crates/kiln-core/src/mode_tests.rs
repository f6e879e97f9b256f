use crate::mode::{BuildMode, Environment, derive_mode};

#[test]
fn absent_signal_is_development() {
    let env = Environment::new();
    assert_eq!(derive_mode(&env, None), BuildMode::Development);
}

#[test]
fn production_signal_selects_production() {
    let env = Environment::new().with("NODE_ENV", "production");
    assert_eq!(derive_mode(&env, None), BuildMode::Production);
}

#[test]
fn other_values_fall_back_to_development() {
    for value in ["development", "test", "", "PRODUCTION", "prod"] {
        let env = Environment::new().with("NODE_ENV", value);
        assert_eq!(derive_mode(&env, None), BuildMode::Development, "{value:?}");
    }
}

#[test]
fn override_beats_environment() {
    let env = Environment::new().with("NODE_ENV", "production");
    assert_eq!(
        derive_mode(&env, Some(BuildMode::Development)),
        BuildMode::Development
    );

    let env = Environment::new();
    assert_eq!(
        derive_mode(&env, Some(BuildMode::Production)),
        BuildMode::Production
    );
}

#[test]
fn gated_effects() {
    assert!(BuildMode::Development.live_reload());
    assert!(BuildMode::Development.inline_source_map());
    assert!(!BuildMode::Development.minifies());

    assert!(!BuildMode::Production.live_reload());
    assert!(!BuildMode::Production.inline_source_map());
    assert!(BuildMode::Production.minifies());
}

#[test]
fn parse_mode() {
    assert_eq!("production".parse::<BuildMode>().unwrap(), BuildMode::Production);
    assert_eq!("Dev".parse::<BuildMode>().unwrap(), BuildMode::Development);
    let err = "staging".parse::<BuildMode>().unwrap_err();
    assert!(err.to_string().contains("staging"));
}

#[test]
fn mode_serde_is_lowercase() {
    let json = serde_json::to_string(&BuildMode::Production).unwrap();
    assert_eq!(json, "\"production\"");
    let mode: BuildMode = serde_json::from_str("\"development\"").unwrap();
    assert_eq!(mode, BuildMode::Development);
}

#[test]
fn environment_from_pairs() {
    let env: Environment = [("A", "1"), ("B", "2")].into_iter().collect();
    assert_eq!(env.len(), 2);
    assert_eq!(env.get("A"), Some("1"));
    assert_eq!(env.get("C"), None);
    let names: Vec<_> = env.iter().map(|(k, _)| k).collect();
    assert_eq!(names, ["A", "B"]);
}
