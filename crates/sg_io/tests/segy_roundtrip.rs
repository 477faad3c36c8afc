//! SEG-Y 写出、读回与道头扫描

use sg_geo::{Point2D, Polyline};
use sg_io::segy::{
    scan_headers, unscale, CoordinateScalar, Endianness, ProfileLoader, SampleFormat, SegyReader,
    SegyWriter, SeismicProfile, TraceHeaderMap,
};
use sg_io::IoError;

fn synthetic_profile(n_traces: usize, n_samples: usize) -> SeismicProfile {
    let cdp: Vec<i32> = (1001..1001 + n_traces as i32).collect();
    let data: Vec<f64> = (0..n_traces * n_samples)
        .map(|i| ((i % 97) as f64 - 48.0) * 0.5)
        .collect();
    SeismicProfile::new(cdp, n_samples, 2000, data).unwrap()
}

#[test]
fn test_coordinates_vary_after_write() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("seismic_with_coords.sgy");

    let mut profile = synthetic_profile(25, 16);
    let line = Polyline::new(vec![
        Point2D::new(512_000.0, 6_210_000.0),
        Point2D::new(512_800.0, 6_210_600.0),
    ])
    .unwrap();
    let pts = line.resample(profile.n_traces()).unwrap();
    profile
        .assign_xy(pts.iter().map(|p| p.x).collect(), pts.iter().map(|p| p.y).collect())
        .unwrap();

    SegyWriter::new(TraceHeaderMap::default()).write(&profile, &out).unwrap();

    let before = scan_headers(&out, Some(1000)).unwrap();
    assert_eq!(before.scanned_traces, 25);
    let varying: Vec<u16> = before.varying().iter().map(|f| f.byte).collect();
    assert!(varying.contains(&21));
    assert!(varying.contains(&73));
    assert!(varying.contains(&77));
    // 比例因子各道相同
    assert!(!varying.contains(&71));
    assert_eq!(before.field(71).map(|f| f.min), Some(-100.0));
}

#[test]
fn test_constant_coordinates_do_not_vary() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("flat.sgy");
    let mut profile = synthetic_profile(5, 4);
    profile.assign_xy(vec![10.0; 5], vec![20.0; 5]).unwrap();
    SegyWriter::new(TraceHeaderMap::default())
        .with_scalar(CoordinateScalar::Fixed(1))
        .write(&profile, &out)
        .unwrap();

    let scan = scan_headers(&out, None).unwrap();
    assert_eq!(scan.field(73).map(|f| f.std), Some(0.0));
    assert_eq!(scan.field(73).map(|f| f.mean), Some(10.0));
}

#[test]
fn test_ibm_output_format_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("ibm.sgy");
    let mut profile = synthetic_profile(3, 8);
    profile.assign_xy(vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]).unwrap();
    SegyWriter::new(TraceHeaderMap::default())
        .with_format(SampleFormat::IbmFloat32)
        .write(&profile, &out)
        .unwrap();

    let mut reader = SegyReader::open(&out).unwrap();
    assert_eq!(reader.format(), SampleFormat::IbmFloat32);
    assert_eq!(reader.endian(), Endianness::Big);
    let (_, samples) = reader.read_trace(1).unwrap();
    assert_eq!(samples.as_slice(), profile.trace(1).unwrap());
}

#[test]
fn test_little_endian_input_detected() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("le.sgy");
    let mut profile = synthetic_profile(4, 6);
    profile.endian = Endianness::Little;
    profile.binary = sg_io::segy::BinaryHeader::new(
        Endianness::Little,
        2000,
        6,
        SampleFormat::IeeeFloat32,
    );
    for (h, &c) in profile.trace_headers.iter_mut().zip(&[1001, 1002, 1003, 1004]) {
        h.set(Endianness::Little, 21, 4, c).unwrap();
    }
    profile.assign_xy(vec![0.0, 1.0, 2.0, 3.0], vec![0.0; 4]).unwrap();
    SegyWriter::new(TraceHeaderMap::default()).write(&profile, &out).unwrap();

    let loaded = ProfileLoader::new().load(&out).unwrap();
    assert_eq!(loaded.endian, Endianness::Little);
    assert_eq!(loaded.cdp(), &[1001, 1002, 1003, 1004]);
    assert_eq!(loaded.data(), profile.data());
}

#[test]
fn test_custom_cdp_byte_and_map() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("custom.sgy");
    let mut profile = synthetic_profile(6, 2);
    profile
        .assign_xy((0..6).map(f64::from).collect(), (0..6).map(|i| f64::from(i) * 2.0).collect())
        .unwrap();
    let map =
        TraceHeaderMap::from_entries([("cdp", 9u16), ("cdp_x", 181), ("cdp_y", 185)]).unwrap();
    SegyWriter::new(map).write(&profile, &out).unwrap();

    let loaded = ProfileLoader::new()
        .with_cdp_byte(9)
        .with_coordinates(181, 185)
        .load(&out)
        .unwrap();
    assert_eq!(loaded.cdp(), profile.cdp());
    assert_eq!(loaded.coord("cdp_y").unwrap()[5], 10.0);
}

/// 未映射的 GroupX/GroupY（字节 81/85）以比例因子 1 存储
fn profile_with_group_coords(n_traces: usize) -> SeismicProfile {
    let mut profile = synthetic_profile(n_traces, 4);
    let endian = profile.endian;
    for (i, h) in profile.trace_headers.iter_mut().enumerate() {
        h.set_coordinate_scalar(endian, 1);
        h.set(endian, 81, 4, 512_345 + i as i32).unwrap();
        h.set(endian, 85, 4, 6_210_000).unwrap();
    }
    profile
}

#[test]
fn test_unmapped_coordinates_keep_real_values() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("group.sgy");
    let mut profile = profile_with_group_coords(4);
    profile
        .assign_xy(vec![512_000.25, 512_010.5, 512_020.75, 512_031.0], vec![6_210_000.0; 4])
        .unwrap();

    let summary = SegyWriter::new(TraceHeaderMap::default()).write(&profile, &out).unwrap();
    assert_eq!(summary.scalar, -100);

    let mut reader = SegyReader::open(&out).unwrap();
    let endian = reader.endian();
    for i in 0..4 {
        let h = reader.read_trace_header(i).unwrap();
        let scalar = h.coordinate_scalar(endian);
        assert_eq!(scalar, -100);
        let gx = unscale(h.get(endian, 81, 4).unwrap(), scalar);
        let gy = unscale(h.get(endian, 85, 4).unwrap(), scalar);
        assert!((gx - (512_345.0 + i as f64)).abs() < 1e-9);
        assert!((gy - 6_210_000.0).abs() < 1e-9);
    }
}

#[test]
fn test_auto_scalar_accounts_for_unmapped_coordinates() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("group_auto.sgy");
    let mut profile = profile_with_group_coords(3);
    // 仅看 cdp_x/cdp_y 会选 -10000，但 GroupY×10000 超出 i32
    profile.assign_xy(vec![100.25, 200.5, 300.75], vec![1.0, 2.0, 3.0]).unwrap();

    let summary = SegyWriter::new(TraceHeaderMap::default()).write(&profile, &out).unwrap();
    assert_eq!(summary.scalar, -100);

    let mut reader = SegyReader::open(&out).unwrap();
    let h = reader.read_trace_header(2).unwrap();
    let scalar = h.coordinate_scalar(reader.endian());
    assert!((unscale(h.get(reader.endian(), 85, 4).unwrap(), scalar) - 6_210_000.0).abs() < 1e-9);
}

#[test]
fn test_fixed_scalar_overflowing_unmapped_coordinate_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("group_fixed.sgy");
    let mut profile = profile_with_group_coords(2);
    profile.assign_xy(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();

    let err = SegyWriter::new(TraceHeaderMap::default())
        .with_scalar(CoordinateScalar::Fixed(-10_000))
        .write(&profile, &out)
        .unwrap_err();
    assert!(matches!(err, IoError::HeaderValueOverflow { ref name, trace: 0, .. } if name == "GroupX"));
    assert!(!out.exists());
}
