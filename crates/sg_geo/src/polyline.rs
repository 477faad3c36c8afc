// crates/sg_geo/src/polyline.rs

//! 折线与弧长插值
//!
//! 提供 [`Polyline`]：有序顶点序列（可含多个部件），支持
//! - 总长度计算
//! - 按弧长距离插值 (`interpolate`)
//! - 等弧长重采样 (`resample`)，用于把测线重采样为与 CDP 数相同的点
//! - 点在折线上的弧长定位 (`locate`)
//!
//! # 多部件折线
//!
//! 多部件按顺序连接，部件之间的间隙不计入弧长。
//!
//! # 示例
//!
//! ```
//! use sg_geo::{Point2D, Polyline};
//!
//! let line = Polyline::new(vec![
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(100.0, 0.0),
//!     Point2D::new(100.0, 50.0),
//! ]).unwrap();
//!
//! assert!((line.length() - 150.0).abs() < 1e-9);
//!
//! let pts = line.resample(4).unwrap();
//! assert_eq!(pts.len(), 4);
//! assert!(pts[2].approx_eq(&Point2D::new(100.0, 0.0), 1e-9));
//! ```

use crate::error::{GeoError, GeoResult};
use crate::geometry::{BoundingBox, Point2D};
use serde::{Deserialize, Serialize};

/// 折线线段（已展开为弧长参数化）
#[derive(Debug, Clone, Copy, PartialEq)]
struct Segment {
    a: Point2D,
    b: Point2D,
    /// 线段起点的累计弧长
    start: f64,
    len: f64,
}

impl Segment {
    #[inline]
    fn end(&self) -> f64 {
        self.start + self.len
    }
}

/// 折线（可多部件）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polyline {
    parts: Vec<Vec<Point2D>>,
}

impl Polyline {
    /// 由单一顶点序列创建折线
    pub fn new(points: Vec<Point2D>) -> GeoResult<Self> {
        Self::from_parts(vec![points])
    }

    /// 由多个部件创建折线
    ///
    /// 空部件被丢弃；所有部件均为空时返回 [`GeoError::EmptyPolyline`]。
    pub fn from_parts(parts: Vec<Vec<Point2D>>) -> GeoResult<Self> {
        let parts: Vec<Vec<Point2D>> = parts.into_iter().filter(|p| !p.is_empty()).collect();
        if parts.is_empty() {
            return Err(GeoError::EmptyPolyline);
        }

        for (index, p) in parts.iter().flatten().enumerate() {
            if !p.is_finite() {
                return Err(GeoError::NonFiniteVertex {
                    index,
                    x: p.x,
                    y: p.y,
                });
            }
        }

        Ok(Self { parts })
    }

    /// 部件
    pub fn parts(&self) -> &[Vec<Point2D>] {
        &self.parts
    }

    /// 部件数量
    pub fn num_parts(&self) -> usize {
        self.parts.len()
    }

    /// 顶点总数
    pub fn num_vertices(&self) -> usize {
        self.parts.iter().map(Vec::len).sum()
    }

    /// 按顺序遍历所有顶点
    pub fn vertices(&self) -> impl Iterator<Item = &Point2D> + '_ {
        self.parts.iter().flatten()
    }

    /// 起点
    pub fn start(&self) -> Point2D {
        self.parts[0][0]
    }

    /// 终点
    pub fn end(&self) -> Point2D {
        let last = &self.parts[self.parts.len() - 1];
        last[last.len() - 1]
    }

    /// 总长度（各部件长度之和）
    pub fn length(&self) -> f64 {
        self.parts.iter().map(|p| part_length(p)).sum()
    }

    /// 各部件长度
    pub fn part_lengths(&self) -> Vec<f64> {
        self.parts.iter().map(|p| part_length(p)).collect()
    }

    /// 每个顶点处的累计弧长
    ///
    /// 部件衔接处弧长不增加。
    pub fn cumulative_distances(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.num_vertices());
        let mut acc = 0.0;
        for part in &self.parts {
            out.push(acc);
            for w in part.windows(2) {
                acc += w[0].distance_to(&w[1]);
                out.push(acc);
            }
        }
        out
    }

    /// 边界框
    pub fn bounding_box(&self) -> BoundingBox {
        let start = self.start();
        let mut bbox = BoundingBox::new(start.x, start.y, start.x, start.y);
        for p in self.vertices() {
            bbox.expand_to_include(p);
        }
        bbox
    }

    /// 按弧长距离插值
    ///
    /// 负距离从终点反向计算；结果限制在折线两端之间。
    pub fn interpolate(&self, distance: f64) -> GeoResult<Point2D> {
        let segments = self.segments();
        let total = segments.last().map_or(0.0, Segment::end);
        interpolate_on(&segments, total, self.start(), self.end(), distance)
    }

    /// 按归一化弧长 (0..=1) 插值
    pub fn interpolate_normalized(&self, fraction: f64) -> GeoResult<Point2D> {
        self.interpolate(fraction * self.length())
    }

    /// 等弧长采样距离：`0, L/(n-1), …, L`
    ///
    /// `n == 1` 时只返回 `[0]`。
    pub fn resample_distances(&self, n: usize) -> GeoResult<Vec<f64>> {
        if n == 0 {
            return Err(GeoError::InvalidSampleCount { count: n });
        }
        Ok(linspace(0.0, self.length(), n))
    }

    /// 等弧长重采样为 `n` 个点
    ///
    /// 第一个点为折线起点，最后一个点为折线终点（`n >= 2` 时）。
    /// 零长度折线返回 `n` 个起点副本。
    pub fn resample(&self, n: usize) -> GeoResult<Vec<Point2D>> {
        let distances = self.resample_distances(n)?;
        let segments = self.segments();
        let total = segments.last().map_or(0.0, Segment::end);
        let (start, end) = (self.start(), self.end());

        distances
            .into_iter()
            .map(|d| interpolate_on(&segments, total, start, end, d))
            .collect()
    }

    /// 点在折线上最近位置的弧长
    pub fn locate(&self, point: &Point2D) -> f64 {
        let mut best = (f64::INFINITY, 0.0);
        for seg in self.segments() {
            let ab = seg.b - seg.a;
            let t = ((*point - seg.a).dot(&ab) / ab.dot(&ab)).clamp(0.0, 1.0);
            let d2 = seg.a.lerp(&seg.b, t).distance_squared_to(point);
            if d2 < best.0 {
                best = (d2, seg.start + t * seg.len);
            }
        }
        best.1
    }

    /// 展开为非零长度线段
    fn segments(&self) -> Vec<Segment> {
        let mut segs = Vec::with_capacity(self.num_vertices());
        let mut acc = 0.0;
        for part in &self.parts {
            for w in part.windows(2) {
                let len = w[0].distance_to(&w[1]);
                if len > 0.0 {
                    segs.push(Segment {
                        a: w[0],
                        b: w[1],
                        start: acc,
                        len,
                    });
                    acc += len;
                }
            }
        }
        segs
    }
}

fn part_length(part: &[Point2D]) -> f64 {
    part.windows(2).map(|w| w[0].distance_to(&w[1])).sum()
}

fn interpolate_on(
    segments: &[Segment],
    total: f64,
    start: Point2D,
    end: Point2D,
    distance: f64,
) -> GeoResult<Point2D> {
    if !distance.is_finite() {
        return Err(GeoError::NonFiniteDistance { distance });
    }
    if segments.is_empty() {
        return Ok(start);
    }

    let d = if distance < 0.0 { total + distance } else { distance };
    let d = d.clamp(0.0, total);

    let idx = segments.partition_point(|s| s.end() < d);
    match segments.get(idx) {
        Some(seg) => {
            let t = ((d - seg.start) / seg.len).clamp(0.0, 1.0);
            Ok(seg.a.lerp(&seg.b, t))
        }
        None => Ok(end),
    }
}

/// `n` 个等间距值，首尾精确为 `start` 与 `stop`
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            let mut v: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
            v[n - 1] = stop;
            v
        }
    }
}
