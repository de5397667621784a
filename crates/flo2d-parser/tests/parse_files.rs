//! Integration tests reading generated model files from disk.

use std::fs::File;
use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use flo2d_common::{build_bounding_box, build_cell_map, HourWindow};
use flo2d_parser::{
    extract_channel_series_from_path, load_reference_points, slice_blocks, BlockReader,
    ChannelColumn, ParseError,
};
use test_utils::{
    assert_approx_eq, fixtures, generate_cadpts, generate_hychan, generate_timdep,
    require_test_file, synthetic_depth, temp_test_dir, write_fixture,
};

#[test]
fn test_block_count_conservation() {
    let dir = temp_test_dir();
    let path = write_fixture(dir.path(), "TIMDEP.OUT", &generate_timdep(25, 12, 0.25));

    let blocks: Vec<_> = BlockReader::open(&path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(blocks.len(), 12);
    for (b, block) in blocks.iter().enumerate() {
        assert_eq!(block.records.len(), 25);
        assert_approx_eq!(block.model_time, (b + 1) as f64 * 0.25, 1e-9);
        let record = &block.records[6];
        assert_approx_eq!(record.value(1).unwrap(), synthetic_depth(record.cell_id, b), 1e-3);
    }
}

#[test]
fn test_trailing_block_without_blank_line() {
    let dir = temp_test_dir();
    let mut text = generate_timdep(3, 4, 1.0);
    text.push_str("5.00\n1 0.9\n");
    let path = write_fixture(dir.path(), "TIMDEP.OUT", &text);

    let blocks: Vec<_> = BlockReader::open(&path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(blocks.len(), 5);
    assert_eq!(blocks[4].records.len(), 1);
}

#[test]
fn test_gzip_depth_file() {
    let dir = temp_test_dir();
    let path = dir.path().join("TIMDEP.OUT.gz");
    let mut encoder = GzEncoder::new(File::create(&path).unwrap(), Compression::fast());
    encoder
        .write_all(fixtures::TWO_BLOCK_TIMDEP.as_bytes())
        .unwrap();
    encoder.finish().unwrap();

    let blocks: Vec<_> = BlockReader::open(&path)
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(blocks.len(), 2);
}

#[test]
fn test_generated_reference_maps_inside_grid() {
    let dir = temp_test_dir();
    let path = write_fixture(
        dir.path(),
        "CADPTS.DAT",
        &generate_cadpts(40, 30, 250.0, (396_960.0, 498_550.0)),
    );

    let points = load_reference_points(&path).unwrap();
    let bbox = build_bounding_box(&points).unwrap();
    let map = build_cell_map(&points, &bbox, 250.0).unwrap();

    assert_eq!(map.len(), 1200);
    assert!(map.out_of_bounds().is_empty());
    // South-west cell lands in the bottom row.
    assert_eq!(map.get(1).unwrap().row, map.dimensions().rows - 1);
}

#[test]
fn test_two_phase_hydrograph_extraction() {
    let dir = temp_test_dir();
    let path = write_fixture(
        dir.path(),
        "HYCHAN.OUT",
        &generate_hychan(&[11, 22, 33], 48, 0.5),
    );

    let ids = vec!["22".to_string(), "33".to_string(), "99".to_string()];
    let extraction =
        extract_channel_series_from_path(&path, &ids, ChannelColumn::Elevation).unwrap();

    assert_eq!(extraction.series.len(), 2);
    assert!(extraction.incomplete.is_empty());
    let series = &extraction.series["33"];
    assert_eq!(series.samples.len(), 48);
    assert_approx_eq!(series.samples[47].value, 33.47, 1e-9);
}

#[test]
fn test_missing_hydrograph_file() {
    let err = extract_channel_series_from_path("/nonexistent/HYCHAN.OUT", &[], ChannelColumn::Depth)
        .unwrap_err();
    assert!(matches!(err, ParseError::MissingFile(_)));
}

#[test]
fn test_slice_generated_file() {
    let text = generate_timdep(2, 10, 1.0);
    let mut out = Vec::new();
    let window = HourWindow::new(3.0, Some(5.0)).unwrap();
    let summary = slice_blocks(text.as_bytes(), &mut out, &window).unwrap();
    assert_eq!(summary.blocks_read, 10);
    assert_eq!(summary.blocks_written, 3);

    let sliced: Vec<_> = flo2d_parser::parse_blocks(out.as_slice())
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(sliced.len(), 3);
    assert_approx_eq!(sliced[0].model_time, 3.0, 1e-9);
}

#[test]
fn test_sample_model_run() {
    let path = require_test_file!("TIMDEP.OUT");
    let mut reader = BlockReader::open(&path).unwrap();
    let first = reader.next_block().unwrap().expect("sample has at least one block");
    assert!(!first.records.is_empty());
}
