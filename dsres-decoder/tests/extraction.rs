// End-to-end decoding of in-memory and on-disk result containers

mod common;

use common::{tank_model, MatBuilder};
use dsres_decoder::{
    extract, extract_from, read_catalog, read_catalog_from, DecoderError, ExtractorConfig,
    SelectionCriteria, SignalSelection, Trajectory,
};
use std::io::Write;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn check_tank_extraction(bytes: &[u8]) {
    let extraction = extract_from(bytes, SelectionCriteria::all(), SelectionCriteria::all()).unwrap();
    let t = &extraction.trajectories;

    assert_eq!(t["time"], Trajectory::Series(vec![0.0, 5.0, 10.0]));
    assert_eq!(t["tank.level"], Trajectory::Series(vec![1.0, 1.5, 1.8]));
    assert_eq!(t["tank.area"], Trajectory::Constant(2.5));
    assert_eq!(t["tank.outflow"], Trajectory::Series(vec![-0.5, -0.25, -0.1]));
    assert_eq!(t["pipe.m_flow"], Trajectory::Series(vec![0.5, 0.25, 0.1]));

    let f = &extraction.finals;
    assert_eq!(f["time"], Some(10.0));
    assert_eq!(f["tank.level"], Some(1.8));
    assert_eq!(f["tank.area"], Some(2.5));
    assert_eq!(f["tank.outflow"], Some(-0.1));
}

#[test]
fn test_catalog_lists_every_variable() {
    init_logging();
    let bytes = tank_model(MatBuilder::new()).build();
    let catalog = read_catalog_from(&bytes[..]).unwrap();

    assert_eq!(catalog.len(), 5);
    assert_eq!(catalog["time"], "Simulation time [s]");
    assert_eq!(catalog["tank.outflow"], "Outflow");
    assert_eq!(catalog["pipe.m_flow"], "Mass flow rate [kg/s]");
}

#[test]
fn test_catalog_stops_after_description() {
    // Anything after "description" must not even be parsed
    let bytes = MatBuilder::new()
        .aclass()
        .text("name", &["p", "q"])
        .text("description", &["pressure", "flow"])
        .raw(b"not a matrix header")
        .build();

    let catalog = read_catalog_from(&bytes[..]).unwrap();
    assert_eq!(catalog.len(), 2);
    assert_eq!(catalog["p"], "pressure");
    assert_eq!(catalog["q"], "flow");
}

#[test]
fn test_extract_all_variables() {
    init_logging();
    check_tank_extraction(&tank_model(MatBuilder::new()).build());
}

#[test]
fn test_big_endian_container() {
    check_tank_extraction(&tank_model(MatBuilder::new().big_endian()).build());
}

#[test]
fn test_normal_layout_container() {
    check_tank_extraction(&tank_model(MatBuilder::new().normal_layout()).build());
}

#[test]
fn test_varying_trajectories_share_length() {
    let bytes = tank_model(MatBuilder::new()).build();
    let extraction = extract_from(&bytes[..], SelectionCriteria::all(), SelectionCriteria::none()).unwrap();

    let lengths: Vec<usize> = extraction
        .trajectories
        .values()
        .filter_map(|t| t.as_series().map(|s| s.len()))
        .collect();
    assert_eq!(lengths, vec![3, 3, 3, 3]);
    assert!(extraction.finals.is_empty());
}

#[test]
fn test_prefix_selection() {
    let bytes = tank_model(MatBuilder::new()).build();
    let extraction = extract_from(
        &bytes[..],
        SelectionCriteria::prefix("tank."),
        SelectionCriteria::predicate(|name| name.ends_with("m_flow")),
    )
    .unwrap();

    let names: Vec<&str> = extraction.trajectories.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["tank.area", "tank.level", "tank.outflow"]);
    assert_eq!(extraction.finals.len(), 1);
    assert_eq!(extraction.finals["pipe.m_flow"], Some(0.1));
}

#[test]
fn test_extract_from_file() {
    init_logging();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&tank_model(MatBuilder::new()).build()).unwrap();
    file.flush().unwrap();

    let config = ExtractorConfig::new()
        .add_trajectory("tank.level")
        .with_finals(SignalSelection::new().add_prefix("tank."));
    let extraction = extract(file.path(), &config).unwrap();

    assert_eq!(extraction.trajectories.len(), 1);
    assert_eq!(extraction.trajectories["tank.level"], Trajectory::Series(vec![1.0, 1.5, 1.8]));
    assert_eq!(extraction.finals.len(), 3);
    assert_eq!(extraction.finals["tank.area"], Some(2.5));

    let catalog = read_catalog(file.path()).unwrap();
    assert_eq!(catalog["tank.level"], "Fill level [m]");
}

#[test]
fn test_extraction_serializes_to_json() {
    let bytes = tank_model(MatBuilder::new()).build();
    let extraction = extract_from(
        &bytes[..],
        SelectionCriteria::names(["tank.area", "tank.level"]),
        SelectionCriteria::names(["tank.level"]),
    )
    .unwrap();

    let json = serde_json::to_value(&extraction).unwrap();
    assert_eq!(json["trajectories"]["tank.area"], serde_json::json!(2.5));
    assert_eq!(json["trajectories"]["tank.level"], serde_json::json!([1.0, 1.5, 1.8]));
    assert_eq!(json["finals"]["tank.level"], serde_json::json!(1.8));
}

#[test]
fn test_zero_reference_is_protocol_error() {
    let bytes = MatBuilder::new()
        .aclass()
        .text("name", &["x"])
        .text("description", &[""])
        .ints("dataInfo", &[vec![2, 0, 0, -1]])
        .doubles("data_2", &[vec![0.0]])
        .build();

    let err = extract_from(&bytes[..], SelectionCriteria::all(), SelectionCriteria::none()).unwrap_err();
    match err {
        DecoderError::Protocol { matrix, index, .. } => {
            assert_eq!(matrix, "dataInfo");
            assert_eq!(index, 1);
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_repeated_name_is_protocol_error() {
    let bytes = MatBuilder::new()
        .aclass()
        .text("name", &["time", "x", "x"])
        .text("description", &["", "", ""])
        .ints("dataInfo", &[vec![0, 1, 0, -1], vec![2, 2, 0, -1], vec![2, -2, 0, -1]])
        .doubles("data_2", &[vec![0.0, 1.0], vec![1.0, 2.0], vec![2.0, 3.0]])
        .build();

    let err = extract_from(&bytes[..], SelectionCriteria::all(), SelectionCriteria::all()).unwrap_err();
    match err {
        DecoderError::Protocol { matrix, index, .. } => {
            assert_eq!(matrix, "name");
            assert_eq!(index, 3);
        }
        other => panic!("unexpected error: {}", other),
    }

    assert!(read_catalog_from(&bytes[..]).is_err());
}

#[test]
fn test_stream_ending_before_data_blocks_is_protocol_error() {
    let metadata_only = MatBuilder::new()
        .aclass()
        .text("name", &["T"])
        .text("description", &["Temperature"])
        .ints("dataInfo", &[vec![1, 1, 0, 0]])
        .build();
    let err = extract_from(&metadata_only[..], SelectionCriteria::all(), SelectionCriteria::all())
        .unwrap_err();
    assert!(matches!(err, DecoderError::Protocol { ref matrix, .. } if matrix == "data_2"));

    // Constants alone still leave the finals of varying signals unknown
    let constants_only = MatBuilder::new()
        .aclass()
        .text("name", &["T"])
        .text("description", &["Temperature"])
        .ints("dataInfo", &[vec![1, 1, 0, 0]])
        .doubles("data_1", &[vec![5.0], vec![5.0]])
        .build();
    let err = extract_from(&constants_only[..], SelectionCriteria::all(), SelectionCriteria::all())
        .unwrap_err();
    assert!(matches!(err, DecoderError::Protocol { .. }));

    // The catalog never needs the data blocks
    assert_eq!(read_catalog_from(&metadata_only[..]).unwrap()["T"], "Temperature");
}

#[test]
fn test_empty_varying_block_completes_extraction() {
    let bytes = MatBuilder::new()
        .aclass()
        .text("name", &["T"])
        .text("description", &[""])
        .ints("dataInfo", &[vec![1, 1, 0, 0]])
        .doubles("data_1", &[vec![5.0]])
        .doubles("data_2", &[])
        .build();

    let extraction = extract_from(&bytes[..], SelectionCriteria::all(), SelectionCriteria::all()).unwrap();
    assert_eq!(extraction.trajectories["T"], Trajectory::Constant(5.0));
    assert_eq!(extraction.finals["T"], Some(5.0));
}

#[test]
fn test_short_row_is_decode_error() {
    let bytes = MatBuilder::new()
        .aclass()
        .text("name", &["x"])
        .text("description", &[""])
        .ints("dataInfo", &[vec![2, 5, 0, -1]])
        .doubles("data_2", &[vec![0.0, 1.0], vec![1.0, 2.0]])
        .build();

    let err = extract_from(&bytes[..], SelectionCriteria::all(), SelectionCriteria::none()).unwrap_err();
    assert!(matches!(err, DecoderError::Decode { ref matrix, index: 1, .. } if matrix == "data_2"));
}

#[test]
fn test_truncated_container() {
    let mut bytes = tank_model(MatBuilder::new()).build();
    bytes.truncate(bytes.len() - 3);

    let err = extract_from(&bytes[..], SelectionCriteria::all(), SelectionCriteria::all()).unwrap_err();
    assert!(matches!(err, DecoderError::Format(_)));
}
