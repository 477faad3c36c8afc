// crates/sg_io/src/shapefile/shp.rs

//! ESRI Shapefile 主文件 (.shp) 解析
//!
//! 文件头与记录头为大端，记录内容为小端。
//! Z/M 坐标不参与平面计算，按记录长度跳过。

use std::fmt;
use std::io::Cursor;
use std::path::Path;

use byteorder::{BigEndian, LittleEndian, ReadBytesExt};
use serde::Serialize;
use sg_geo::{BoundingBox, Point2D};

use crate::error::{IoError, IoResult};

/// 文件代码
pub const FILE_CODE: i32 = 9994;
/// 版本号
pub const VERSION: i32 = 1000;
/// 文件头字节数
pub const HEADER_LEN: usize = 100;

/// 几何类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ShapeType {
    /// 0
    Null,
    /// 1
    Point,
    /// 3
    PolyLine,
    /// 5
    Polygon,
    /// 8
    MultiPoint,
    /// 11
    PointZ,
    /// 13
    PolyLineZ,
    /// 15
    PolygonZ,
    /// 18
    MultiPointZ,
    /// 21
    PointM,
    /// 23
    PolyLineM,
    /// 25
    PolygonM,
    /// 28
    MultiPointM,
    /// 31
    MultiPatch,
    /// 未知代码
    Unknown(i32),
}

impl ShapeType {
    /// 由类型代码解析
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Null,
            1 => Self::Point,
            3 => Self::PolyLine,
            5 => Self::Polygon,
            8 => Self::MultiPoint,
            11 => Self::PointZ,
            13 => Self::PolyLineZ,
            15 => Self::PolygonZ,
            18 => Self::MultiPointZ,
            21 => Self::PointM,
            23 => Self::PolyLineM,
            25 => Self::PolygonM,
            28 => Self::MultiPointM,
            31 => Self::MultiPatch,
            other => Self::Unknown(other),
        }
    }

    /// 类型代码
    pub fn code(self) -> i32 {
        match self {
            Self::Null => 0,
            Self::Point => 1,
            Self::PolyLine => 3,
            Self::Polygon => 5,
            Self::MultiPoint => 8,
            Self::PointZ => 11,
            Self::PolyLineZ => 13,
            Self::PolygonZ => 15,
            Self::MultiPointZ => 18,
            Self::PointM => 21,
            Self::PolyLineM => 23,
            Self::PolygonM => 25,
            Self::MultiPointM => 28,
            Self::MultiPatch => 31,
            Self::Unknown(c) => c,
        }
    }

    /// 是否为线类型
    pub fn is_line(self) -> bool {
        matches!(self, Self::PolyLine | Self::PolyLineZ | Self::PolyLineM)
    }
}

impl fmt::Display for ShapeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(c) => write!(f, "Unknown({c})"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// 单条记录的几何
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// 空几何
    Null,
    /// 点
    Point(Point2D),
    /// 多点
    MultiPoint(Vec<Point2D>),
    /// 折线（可多段）
    PolyLine(Vec<Vec<Point2D>>),
    /// 多边形（各环作为独立部分）
    Polygon(Vec<Vec<Point2D>>),
    /// 未解析的类型
    Unsupported(ShapeType),
}

impl Shape {
    /// 几何类型名
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "Null",
            Self::Point(_) => "Point",
            Self::MultiPoint(_) => "MultiPoint",
            Self::PolyLine(_) => "PolyLine",
            Self::Polygon(_) => "Polygon",
            Self::Unsupported(_) => "Unsupported",
        }
    }

    /// 顶点数
    pub fn num_points(&self) -> usize {
        match self {
            Self::Null | Self::Unsupported(_) => 0,
            Self::Point(_) => 1,
            Self::MultiPoint(pts) => pts.len(),
            Self::PolyLine(parts) | Self::Polygon(parts) => parts.iter().map(Vec::len).sum(),
        }
    }
}

/// .shp 文件内容
#[derive(Debug, Clone)]
pub struct ShpFile {
    /// 文件头中的几何类型
    pub shape_type: ShapeType,
    /// 文件头中的范围
    pub bbox: BoundingBox,
    /// 记录号（从 1 开始）与几何
    pub records: Vec<(i32, Shape)>,
}

/// 读取 .shp 文件
pub fn read_shp(path: impl AsRef<Path>) -> IoResult<ShpFile> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let bytes = std::fs::read(path)?;
    parse_shp(&bytes, &path.display().to_string())
}

/// 解析 .shp 字节
pub fn parse_shp(bytes: &[u8], name: &str) -> IoResult<ShpFile> {
    if bytes.len() < HEADER_LEN {
        return Err(IoError::shapefile(
            name,
            format!("文件长度 {} 小于文件头 {HEADER_LEN} 字节", bytes.len()),
        ));
    }
    let mut cur = Cursor::new(bytes);
    let code = cur.read_i32::<BigEndian>()?;
    if code != FILE_CODE {
        return Err(IoError::shapefile(
            name,
            format!("文件代码 {code} 不是 {FILE_CODE}"),
        ));
    }
    cur.set_position(24);
    let declared = usize::try_from(cur.read_i32::<BigEndian>()?).unwrap_or(0) * 2;
    let version = cur.read_i32::<LittleEndian>()?;
    if version != VERSION {
        tracing::warn!("{}: 版本号 {} (期望 {})", name, version, VERSION);
    }
    let shape_type = ShapeType::from_code(cur.read_i32::<LittleEndian>()?);
    let xmin = cur.read_f64::<LittleEndian>()?;
    let ymin = cur.read_f64::<LittleEndian>()?;
    let xmax = cur.read_f64::<LittleEndian>()?;
    let ymax = cur.read_f64::<LittleEndian>()?;
    let bbox = BoundingBox::new(xmin, ymin, xmax, ymax);

    let end = if declared >= HEADER_LEN && declared <= bytes.len() {
        declared
    } else {
        bytes.len()
    };

    let mut records = Vec::new();
    let mut pos = HEADER_LEN;
    while pos + 8 <= end {
        let mut rh = Cursor::new(&bytes[pos..pos + 8]);
        let number = rh.read_i32::<BigEndian>()?;
        let content_len = rh.read_i32::<BigEndian>()?;
        let content_len = usize::try_from(content_len)
            .map_err(|_| IoError::shapefile(name, format!("记录 {number} 长度为负")))?
            * 2;
        let start = pos + 8;
        let stop = start + content_len;
        if stop > bytes.len() {
            return Err(IoError::shapefile(
                name,
                format!("记录 {number} 截断: 需要 {content_len} 字节，剩余 {}", bytes.len() - start),
            ));
        }
        let shape = parse_shape(&bytes[start..stop])
            .map_err(|e| IoError::shapefile(name, format!("记录 {number}: {e}")))?;
        records.push((number, shape));
        pos = stop;
    }

    tracing::debug!("{}: {} 条记录, 类型 {}", name, records.len(), shape_type);
    Ok(ShpFile {
        shape_type,
        bbox,
        records,
    })
}

fn read_points(cur: &mut Cursor<&[u8]>, n: usize) -> std::io::Result<Vec<Point2D>> {
    let remaining = cur.get_ref().len().saturating_sub(cur.position() as usize);
    let mut pts = Vec::with_capacity(n.min(remaining / 16));
    for _ in 0..n {
        let x = cur.read_f64::<LittleEndian>()?;
        let y = cur.read_f64::<LittleEndian>()?;
        pts.push(Point2D::new(x, y));
    }
    Ok(pts)
}

fn read_count(cur: &mut Cursor<&[u8]>, what: &str) -> std::io::Result<usize> {
    let n = cur.read_i32::<LittleEndian>()?;
    usize::try_from(n).map_err(|_| {
        std::io::Error::new(std::io::ErrorKind::InvalidData, format!("{what} 为负: {n}"))
    })
}

fn parse_shape(content: &[u8]) -> std::io::Result<Shape> {
    if content.len() < 4 {
        return Ok(Shape::Null);
    }
    let mut cur = Cursor::new(content);
    let shape_type = ShapeType::from_code(cur.read_i32::<LittleEndian>()?);
    let shape = match shape_type {
        ShapeType::Null => Shape::Null,
        ShapeType::Point | ShapeType::PointZ | ShapeType::PointM => {
            let x = cur.read_f64::<LittleEndian>()?;
            let y = cur.read_f64::<LittleEndian>()?;
            Shape::Point(Point2D::new(x, y))
        }
        ShapeType::MultiPoint | ShapeType::MultiPointZ | ShapeType::MultiPointM => {
            cur.set_position(cur.position() + 32);
            let n = read_count(&mut cur, "点数")?;
            Shape::MultiPoint(read_points(&mut cur, n)?)
        }
        ShapeType::PolyLine
        | ShapeType::PolyLineZ
        | ShapeType::PolyLineM
        | ShapeType::Polygon
        | ShapeType::PolygonZ
        | ShapeType::PolygonM => {
            cur.set_position(cur.position() + 32);
            let num_parts = read_count(&mut cur, "部分数")?;
            let num_points = read_count(&mut cur, "点数")?;
            let mut starts = Vec::with_capacity(num_parts.min(content.len() / 4));
            for _ in 0..num_parts {
                starts.push(read_count(&mut cur, "部分起点")?);
            }
            let points = read_points(&mut cur, num_points)?;
            let mut parts = Vec::with_capacity(num_parts);
            for (i, &s) in starts.iter().enumerate() {
                let e = starts.get(i + 1).copied().unwrap_or(num_points);
                if s > e || e > num_points {
                    return Err(std::io::Error::new(
                        std::io::ErrorKind::InvalidData,
                        format!("部分索引越界: {s}..{e} (共 {num_points} 点)"),
                    ));
                }
                parts.push(points[s..e].to_vec());
            }
            if shape_type.is_line() {
                Shape::PolyLine(parts)
            } else {
                Shape::Polygon(parts)
            }
        }
        other => Shape::Unsupported(other),
    };
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;

    fn header(shape_type: i32, total_len: usize) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.write_i32::<BigEndian>(FILE_CODE).unwrap();
        buf.extend_from_slice(&[0u8; 20]);
        buf.write_i32::<BigEndian>((total_len / 2) as i32).unwrap();
        buf.write_i32::<LittleEndian>(VERSION).unwrap();
        buf.write_i32::<LittleEndian>(shape_type).unwrap();
        for v in [0.0, 0.0, 10.0, 10.0, 0.0, 0.0, 0.0, 0.0] {
            buf.write_f64::<LittleEndian>(v).unwrap();
        }
        buf
    }

    fn polyline_record(number: i32, parts: &[&[(f64, f64)]]) -> Vec<u8> {
        let mut content = Vec::new();
        content.write_i32::<LittleEndian>(3).unwrap();
        for _ in 0..4 {
            content.write_f64::<LittleEndian>(0.0).unwrap();
        }
        let n_points: usize = parts.iter().map(|p| p.len()).sum();
        content.write_i32::<LittleEndian>(parts.len() as i32).unwrap();
        content.write_i32::<LittleEndian>(n_points as i32).unwrap();
        let mut start = 0;
        for p in parts {
            content.write_i32::<LittleEndian>(start).unwrap();
            start += p.len() as i32;
        }
        for p in parts {
            for &(x, y) in p.iter() {
                content.write_f64::<LittleEndian>(x).unwrap();
                content.write_f64::<LittleEndian>(y).unwrap();
            }
        }
        let mut rec = Vec::new();
        rec.write_i32::<BigEndian>(number).unwrap();
        rec.write_i32::<BigEndian>((content.len() / 2) as i32).unwrap();
        rec.extend(content);
        rec
    }

    #[test]
    fn test_parse_multipart_polyline() {
        let rec = polyline_record(1, &[&[(0.0, 0.0), (5.0, 0.0)], &[(5.0, 5.0), (10.0, 5.0)]]);
        let mut bytes = header(3, HEADER_LEN + rec.len());
        bytes.extend(rec);

        let shp = parse_shp(&bytes, "mem.shp").unwrap();
        assert_eq!(shp.shape_type, ShapeType::PolyLine);
        assert_eq!(shp.records.len(), 1);
        match &shp.records[0].1 {
            Shape::PolyLine(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[1][1], Point2D::new(10.0, 5.0));
            }
            other => panic!("unexpected shape {other:?}"),
        }
        assert_eq!((shp.bbox.max_x, shp.bbox.max_y), (10.0, 10.0));
    }

    #[test]
    fn test_bad_file_code() {
        let mut bytes = header(3, HEADER_LEN);
        bytes[3] = 0;
        let err = parse_shp(&bytes, "bad.shp").unwrap_err();
        assert!(matches!(err, IoError::ShapefileFormat { .. }));
    }

    #[test]
    fn test_truncated_record() {
        let rec = polyline_record(1, &[&[(0.0, 0.0), (5.0, 0.0)]]);
        let mut bytes = header(3, HEADER_LEN + rec.len());
        bytes.extend_from_slice(&rec[..rec.len() - 8]);
        assert!(parse_shp(&bytes, "cut.shp").is_err());
    }

    #[test]
    fn test_shape_type_codes() {
        for code in [0, 1, 3, 5, 8, 11, 13, 15, 18, 21, 23, 25, 28, 31] {
            assert_eq!(ShapeType::from_code(code).code(), code);
        }
        assert!(ShapeType::PolyLineZ.is_line());
        assert!(!ShapeType::Polygon.is_line());
        assert_eq!(ShapeType::from_code(99), ShapeType::Unknown(99));
    }
}
