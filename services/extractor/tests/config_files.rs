//! Loading configuration files from disk.

use chrono::NaiveDate;
use extractor::{load_extractor_config, resolve_config, RunArgs, RUN_FILE_NAME};
use flo2d_parser::ChannelColumn;
use test_utils::{temp_test_dir, workspace_root, write_fixture};

#[test]
fn test_bundled_config_parses() {
    let path = workspace_root().join("config").join("extractor.yaml");
    let config = load_extractor_config(&path).unwrap();

    assert_eq!(config.grid.min_threshold, Some(0.3));
    assert_eq!(config.water_level.stations.channel.len(), 3);
    assert_eq!(config.water_level.stations.flood_plain.len(), 2);
}

#[test]
fn test_resolve_from_files() {
    let dir = temp_test_dir();
    write_fixture(
        dir.path(),
        "extractor.yaml",
        "model: FLO2D_150\noutput_dir: out\nwater_level:\n  channel_column: depth\n  stations:\n    channel:\n      \"179\": Dehiwala Canal\n",
    );
    write_fixture(
        dir.path(),
        RUN_FILE_NAME,
        r#"{"MODEL_STATE_DATE": "2017-05-20", "MODEL_STATE_TIME": "06:00:00", "FLO2D_OUTPUT_SUFFIX": "run-7"}"#,
    );

    let file = load_extractor_config(dir.path().join("extractor.yaml")).unwrap();
    let args = RunArgs {
        input_dir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let now = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let resolved = resolve_config(&file, &args, now).unwrap();
    let config = resolved.extraction;

    assert_eq!(config.cell_size, 150.0);
    assert_eq!(config.times.state.to_string(), "2017-05-20 06:00:00");
    assert_eq!(config.water_level.channel_column, ChannelColumn::Depth);
    assert_eq!(config.grid_dir(), std::path::PathBuf::from("out/water_level_grid-run-7"));
    assert_eq!(resolved.catalog_path, std::path::PathBuf::from("out/catalog.json"));
}

#[test]
fn test_missing_config_file_is_an_error() {
    let dir = temp_test_dir();
    assert!(load_extractor_config(dir.path().join("nope.yaml")).is_err());
}
