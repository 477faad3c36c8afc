// crates/sg_io/src/exporters/geojson.rs

//! GeoJSON 导出
//!
//! 输出一个 FeatureCollection：参考测线 `LineString`（多段时为
//! `MultiLineString`）以及每个 CDP 一个 `Point`，便于在 GIS 中检查结果。

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{json, Value};
use sg_geo::{Point2D, Polyline};
use tracing::info;

use crate::error::{IoError, IoResult};

fn coords(points: &[Point2D]) -> Value {
    Value::Array(points.iter().map(|p| json!([p.x, p.y])).collect())
}

/// 测线要素
pub fn line_feature(line: &Polyline, name: &str) -> Value {
    let geometry = match line.parts() {
        [single] => json!({ "type": "LineString", "coordinates": coords(single) }),
        parts => json!({
            "type": "MultiLineString",
            "coordinates": parts.iter().map(|p| coords(p)).collect::<Vec<_>>(),
        }),
    };
    json!({
        "type": "Feature",
        "geometry": geometry,
        "properties": { "name": name, "length": line.length() },
    })
}

/// CDP 点要素
pub fn cdp_features(points: &[Point2D], cdp: &[i32], distances: &[f64]) -> IoResult<Vec<Value>> {
    if cdp.len() != points.len() || distances.len() != points.len() {
        return Err(IoError::CoordinateLength {
            name: "cdp".into(),
            expected: points.len(),
            actual: cdp.len().min(distances.len()),
        });
    }
    Ok(points
        .iter()
        .zip(cdp)
        .zip(distances)
        .enumerate()
        .map(|(trace, ((p, c), d))| {
            json!({
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [p.x, p.y] },
                "properties": { "cdp": c, "trace": trace, "distance": d },
            })
        })
        .collect())
}

/// 组装并写出 FeatureCollection
pub fn write_feature_collection(path: impl AsRef<Path>, features: Vec<Value>) -> IoResult<()> {
    let path = path.as_ref();
    let n = features.len();
    let doc = json!({ "type": "FeatureCollection", "features": features });
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, &doc).map_err(|e| IoError::Export(e.to_string()))?;
    w.write_all(b"\n")?;
    w.flush()?;
    info!("导出 GeoJSON: {} ({} 个要素)", path.display(), n);
    Ok(())
}

/// 导出测线与 CDP 位置
pub fn export_cdp_geojson(
    path: impl AsRef<Path>,
    line: &Polyline,
    line_name: &str,
    points: &[Point2D],
    cdp: &[i32],
    distances: &[f64],
) -> IoResult<()> {
    let mut features = Vec::with_capacity(points.len() + 1);
    features.push(line_feature(line, line_name));
    features.extend(cdp_features(points, cdp, distances)?);
    write_feature_collection(path, features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_and_parse_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cdp.geojson");
        let line = Polyline::new(vec![Point2D::new(0.0, 0.0), Point2D::new(30.0, 0.0)]).unwrap();
        let pts = line.resample(4).unwrap();
        let dist = line.resample_distances(4).unwrap();

        export_cdp_geojson(&path, &line, "PR_19", &pts, &[10, 11, 12, 13], &dist).unwrap();

        let doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(doc["type"], "FeatureCollection");
        let features = doc["features"].as_array().unwrap();
        assert_eq!(features.len(), 5);
        assert_eq!(features[0]["geometry"]["type"], "LineString");
        assert_eq!(features[0]["properties"]["name"], "PR_19");
        assert_eq!(features[2]["properties"]["cdp"], 11);
        assert_eq!(features[2]["geometry"]["coordinates"][0], 10.0);
    }

    #[test]
    fn test_multipart_line() {
        let line = Polyline::from_parts(vec![
            vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)],
            vec![Point2D::new(2.0, 0.0), Point2D::new(3.0, 0.0)],
        ])
        .unwrap();
        let f = line_feature(&line, "x");
        assert_eq!(f["geometry"]["type"], "MultiLineString");
    }

    #[test]
    fn test_cdp_length_mismatch() {
        assert!(cdp_features(&[Point2D::ZERO], &[], &[0.0]).is_err());
    }
}
