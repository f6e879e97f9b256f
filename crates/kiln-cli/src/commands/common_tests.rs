use std::path::Path;

use kiln_config::StatsLevel;
use tracing::Level;

use super::common::{display_relative, log_level};

#[test]
fn stats_levels_map_to_tracing() {
    assert_eq!(log_level(StatsLevel::ErrorsOnly, 0), Level::ERROR);
    assert_eq!(log_level(StatsLevel::Minimal, 0), Level::WARN);
    assert_eq!(log_level(StatsLevel::Normal, 0), Level::INFO);
    assert_eq!(log_level(StatsLevel::Verbose, 0), Level::DEBUG);
}

#[test]
fn verbose_flag_overrides_stats() {
    assert_eq!(log_level(StatsLevel::Verbose, 1), Level::INFO);
    assert_eq!(log_level(StatsLevel::ErrorsOnly, 2), Level::DEBUG);
    assert_eq!(log_level(StatsLevel::ErrorsOnly, 5), Level::TRACE);
}

#[test]
fn paths_inside_root_are_shown_relative() {
    let root = Path::new("/work/app");
    assert_eq!(
        display_relative(Path::new("/work/app/src/App.web.tsx"), root),
        "src/App.web.tsx"
    );
    assert_eq!(
        display_relative(Path::new("/elsewhere/lib.js"), root),
        "/elsewhere/lib.js"
    );
}
