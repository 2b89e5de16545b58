use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use std::io::Write;
use tablenote_core::{
    CommandError, CommandExecutor, ConfigError, FixedClock, GridConfig, ResizeHistory, Shift,
    header_text,
};

fn clock(hour: u32, minute: u32) -> FixedClock {
    FixedClock(
        NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap(),
    )
}

#[test]
fn header_names_the_shift() {
    assert_eq!(
        header_text(&clock(9, 30)),
        "07.03.2024 - Daily Breakage - (Morning Shift)"
    );
    assert_eq!(
        header_text(&clock(22, 0)),
        "07.03.2024 - Daily Breakage - (Night Shift)"
    );
}

#[test]
fn shift_boundaries() {
    assert_eq!(Shift::from_hour(5), Shift::Night);
    assert_eq!(Shift::from_hour(6), Shift::Morning);
    assert_eq!(Shift::from_hour(17), Shift::Morning);
    assert_eq!(Shift::from_hour(18), Shift::Night);
}

#[test]
fn executor_seeds_header_from_clock() {
    let executor = CommandExecutor::new(GridConfig::default(), &clock(7, 0)).unwrap();
    assert_eq!(
        executor.snapshot().header(),
        "07.03.2024 - Daily Breakage - (Morning Shift)"
    );
    assert_eq!(executor.snapshot().row_count(), 6);
    assert_eq!(executor.snapshot().col_count(), 6);
    assert_eq!(executor.snapshot().row_heights(), &[40; 6]);
    assert_eq!(executor.snapshot().col_widths(), &[120; 6]);
}

#[test]
fn config_file_shapes_the_grid() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
rows = 2
cols = 3
col-width = 90
resize-history = "commit-on-release"
"#
    )
    .unwrap();

    let config = GridConfig::load(file.path()).unwrap();
    assert_eq!(config.resize_history, ResizeHistory::CommitOnRelease);
    assert_eq!(config.history_limit, 1000);

    let executor = CommandExecutor::new(config, &clock(12, 0)).unwrap();
    assert_eq!(executor.snapshot().col_widths(), &[90, 90, 90]);
    assert_eq!(executor.snapshot().row_count(), 2);
}

#[test]
fn missing_file_reports_path() {
    let err = GridConfig::load("/definitely/not/here.toml").unwrap_err();
    match err {
        ConfigError::Io { path, .. } => assert!(path.ends_with("here.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn invalid_values_are_rejected() {
    assert!(matches!(
        GridConfig::from_toml_str("col-width = 10"),
        Err(ConfigError::Invalid { key: "col-width", .. })
    ));
    assert!(matches!(
        GridConfig::from_toml_str("rows = \"six\""),
        Err(ConfigError::Parse(_))
    ));

    let config = GridConfig {
        history_limit: 0,
        ..GridConfig::default()
    };
    assert!(matches!(
        CommandExecutor::new(config, &clock(0, 0)),
        Err(CommandError::Config(ConfigError::Invalid {
            key: "history-limit",
            ..
        }))
    ));
}
