//! 完整坐标重赋值流程

use std::path::{Path, PathBuf};

use sg_config::{OutputSampleFormat, ReassignConfig};
use sg_geo::Point2D;
use sg_io::exporters::{ExportShape, ShapefileWriter};
use sg_io::segy::{scan_headers, SampleFormat, SegyReader, SegyWriter, SeismicProfile, TraceHeaderMap};
use sg_io::shapefile::{FeatureCollection, FieldDescriptor, FieldValue, ShapeType};
use sg_workflow::{CoordinateReassignment, ReassignStage, WorkflowError};

const N_TRACES: usize = 41;

/// 无坐标的输入剖面
fn write_input(dir: &Path) -> PathBuf {
    let path = dir.join("Profile_19.sgy");
    let cdp: Vec<i32> = (100..100 + N_TRACES as i32).collect();
    let data: Vec<f64> = (0..N_TRACES * 10).map(|i| (i % 13) as f64).collect();
    let profile = SeismicProfile::new(cdp, 10, 4000, data).unwrap();
    // 无坐标字段
    let map = TraceHeaderMap::from_entries([("cdp".to_string(), 21u16)]).unwrap();
    SegyWriter::new(map).write(&profile, &path).unwrap();
    path
}

fn write_profiles(dir: &Path) -> PathBuf {
    let path = dir.join("profiles.shp");
    let mut w = ShapefileWriter::new(
        ShapeType::PolyLine,
        vec![FieldDescriptor::character("N_PROF", 10)],
    )
    .unwrap();
    let lines = [
        ("PR_18", vec![Point2D::new(0.0, 0.0), Point2D::new(100.0, 0.0)]),
        (
            "PR_19",
            vec![
                Point2D::new(430_000.0, 7_100_000.0),
                Point2D::new(430_300.0, 7_100_000.0),
                Point2D::new(430_300.0, 7_100_100.0),
            ],
        ),
    ];
    for (name, pts) in lines {
        w.add(
            ExportShape::PolyLine(vec![pts]),
            vec![FieldValue::Text(name.to_string())],
        )
        .unwrap();
    }
    w.write(&path).unwrap();
    path
}

fn config(dir: &Path) -> ReassignConfig {
    let mut config = ReassignConfig::default();
    config.input.segy = write_input(dir);
    config.input.shapefile = write_profiles(dir);
    config.output.segy = dir.join("seismic_with_coords.sgy");
    config
}

#[test]
fn test_full_reassignment() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.output.report = Some(dir.path().join("report.json"));

    let report = CoordinateReassignment::new(cfg.clone()).unwrap().run().unwrap();

    assert_eq!(report.n_traces, N_TRACES);
    assert_eq!(report.n_samples, 10);
    assert_eq!(report.cdp_range, (100, 140));
    assert!((report.line_length - 400.0).abs() < 1e-9);
    assert!((report.cdp_spacing - 10.0).abs() < 1e-9);
    assert!(report.first_point.approx_eq(&Point2D::new(430_000.0, 7_100_000.0), 1e-6));
    assert!(report.last_point.approx_eq(&Point2D::new(430_300.0, 7_100_100.0), 1e-6));
    assert!(report.validation.is_valid());

    let before: Vec<u16> = report.varying_before.iter().map(|v| v.byte).collect();
    assert!(!before.contains(&73));
    let after: Vec<u16> = report.varying_after.iter().map(|v| v.byte).collect();
    assert!(after.contains(&21));
    assert!(after.contains(&73));
    assert!(after.contains(&77));

    // 第 30 道位于拐点 (430300, 7100000)
    let mut reader = SegyReader::open(&cfg.output.segy).unwrap();
    let h = reader.read_trace_header(30).unwrap();
    let scalar = h.coordinate_scalar(reader.endian());
    let x = sg_io::segy::unscale(h.get(reader.endian(), 73, 4).unwrap(), scalar);
    let y = sg_io::segy::unscale(h.get(reader.endian(), 77, 4).unwrap(), scalar);
    assert!((x - 430_300.0).abs() < 0.01);
    assert!((y - 7_100_000.0).abs() < 0.01);
    assert!(reader.textual().lines()[38].contains("PR_19"));

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("report.json")).unwrap())
            .unwrap();
    assert_eq!(json["n_traces"], N_TRACES);
}

#[test]
fn test_missing_profile_fails_at_selection() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.profile.value = "PR_99".into();

    let err = CoordinateReassignment::new(cfg.clone()).unwrap().run().unwrap_err();
    assert_eq!(err.stage(), Some(ReassignStage::SelectProfile));
    assert!(!cfg.output.segy.exists());
}

#[test]
fn test_missing_input_fails_at_scan() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.input.segy = dir.path().join("absent.sgy");

    let err = CoordinateReassignment::new(cfg).unwrap().run().unwrap_err();
    assert_eq!(err.stage(), Some(ReassignStage::ScanInput));
    assert!(matches!(err.root(), WorkflowError::Io(_)));
}

#[test]
fn test_extra_outputs_and_format() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = config(dir.path());
    cfg.output.geojson = Some(dir.path().join("cdp.geojson"));
    cfg.output.cdp_shapefile = Some(dir.path().join("cdp_points.shp"));
    cfg.output.sample_format = OutputSampleFormat::Ibm;
    cfg.output.coord_scalar = Some(-10);

    let report = CoordinateReassignment::new(cfg.clone()).unwrap().run().unwrap();
    assert_eq!(report.scalar, -10);
    assert_eq!(report.sample_format, 1);
    assert_eq!(report.extra_outputs.len(), 2);

    let reader = SegyReader::open(&cfg.output.segy).unwrap();
    assert_eq!(reader.format(), SampleFormat::IbmFloat32);

    let geojson: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("cdp.geojson")).unwrap())
            .unwrap();
    assert_eq!(geojson["type"], "FeatureCollection");
    assert_eq!(geojson["features"].as_array().map(Vec::len), Some(N_TRACES + 1));

    let points = FeatureCollection::read(dir.path().join("cdp_points.shp")).unwrap();
    assert_eq!(points.len(), N_TRACES);
    assert_eq!(points.shape_type, ShapeType::Point);
    assert!(points.features[0].attribute("CDP").unwrap().matches("100"));
}

#[test]
fn test_output_scan_matches_report() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path());
    let report = CoordinateReassignment::new(cfg.clone()).unwrap().run().unwrap();

    let scan = scan_headers(&cfg.output.segy, None).unwrap();
    let cdp_x = scan.field(73).unwrap();
    let reported = report.varying_after.iter().find(|v| v.byte == 73).unwrap();
    assert_eq!(cdp_x.min, reported.min);
    assert_eq!(cdp_x.max, reported.max);
}
