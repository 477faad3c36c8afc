// crates/sg_geo/src/geometry.rs

//! 几何类型定义
//!
//! 提供项目统一的平面几何类型：[`Point2D`] 与 [`BoundingBox`]。
//!
//! 剖面坐标来自投影坐标系（米或英尺），所有距离均为欧几里得距离。

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

// ============================================================================
// Point2D
// ============================================================================

/// 2D点 - 用于平面几何和投影坐标
///
/// # 示例
///
/// ```
/// use sg_geo::geometry::Point2D;
///
/// let p1 = Point2D::new(500000.0, 4000000.0);
/// let p2 = Point2D::new(500100.0, 4000100.0);
/// let dist = p1.distance_to(&p2); // 约 141.4 米
/// assert!((dist - 141.421356).abs() < 1e-5);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X坐标（东向）
    pub x: f64,
    /// Y坐标（北向）
    pub y: f64,
}

impl Point2D {
    /// 零点常量
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// 创建新的2D点
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 计算到另一个点的欧几里得距离
    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// 计算到另一个点的距离的平方
    #[inline]
    #[must_use]
    pub fn distance_squared_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// 点积
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 向量长度
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    /// 线性插值
    #[inline]
    #[must_use]
    pub fn lerp(&self, other: &Self, t: f64) -> Self {
        Self {
            x: self.x + (other.x - self.x) * t,
            y: self.y + (other.y - self.y) * t,
        }
    }

    /// 判断是否为有限数
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// 在容差范围内是否与另一点重合
    #[inline]
    #[must_use]
    pub fn approx_eq(&self, other: &Self, tol: f64) -> bool {
        (self.x - other.x).abs() <= tol && (self.y - other.y).abs() <= tol
    }
}

impl Add for Point2D {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Self {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Neg for Point2D {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self {
            x: -self.x,
            y: -self.y,
        }
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    #[inline]
    fn mul(self, scalar: f64) -> Self {
        Self {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl From<[f64; 2]> for Point2D {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for [f64; 2] {
    fn from(p: Point2D) -> Self {
        [p.x, p.y]
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

impl From<Point2D> for (f64, f64) {
    fn from(p: Point2D) -> Self {
        (p.x, p.y)
    }
}

// ============================================================================
// BoundingBox
// ============================================================================

/// 边界框
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// 最小 x
    pub min_x: f64,
    /// 最小 y
    pub min_y: f64,
    /// 最大 x
    pub max_x: f64,
    /// 最大 y
    pub max_y: f64,
}

impl BoundingBox {
    /// 创建新的边界框
    #[must_use]
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// 包围一组点的最小边界框，空输入返回 `None`
    #[must_use]
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point2D>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bbox = Self::new(first.x, first.y, first.x, first.y);
        for p in iter {
            bbox.expand_to_include(p);
        }
        Some(bbox)
    }

    /// 扩展以包含指定点
    pub fn expand_to_include(&mut self, point: &Point2D) {
        self.min_x = self.min_x.min(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_x = self.max_x.max(point.x);
        self.max_y = self.max_y.max(point.y);
    }

    /// 宽度
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point2d_euclidean_distance() {
        let p1 = Point2D::new(0.0, 0.0);
        let p2 = Point2D::new(3.0, 4.0);
        assert!((p1.distance_to(&p2) - 5.0).abs() < 1e-12);
        assert!((p1.distance_squared_to(&p2) - 25.0).abs() < 1e-12);
    }

    #[test]
    fn test_point2d_lerp() {
        let a = Point2D::new(10.0, 20.0);
        let b = Point2D::new(20.0, 40.0);
        let m = a.lerp(&b, 0.25);
        assert!(m.approx_eq(&Point2D::new(12.5, 25.0), 1e-12));
    }

    #[test]
    fn test_point2d_ops() {
        let a = Point2D::new(1.0, 2.0);
        let b = Point2D::new(3.0, 5.0);
        assert_eq!(a + b, Point2D::new(4.0, 7.0));
        assert_eq!(b - a, Point2D::new(2.0, 3.0));
        assert_eq!(-a, Point2D::new(-1.0, -2.0));
        assert_eq!(a * 2.0, Point2D::new(2.0, 4.0));
        assert!((a.dot(&b) - 13.0).abs() < 1e-12);
    }

    #[test]
    fn test_bbox_from_points() {
        let pts = [
            Point2D::new(3.0, -1.0),
            Point2D::new(-2.0, 4.0),
            Point2D::new(0.5, 0.5),
        ];
        let bbox = BoundingBox::from_points(&pts).unwrap();
        assert_eq!(bbox, BoundingBox::new(-2.0, -1.0, 3.0, 4.0));
        assert!((bbox.width() - 5.0).abs() < 1e-12);
        assert!(BoundingBox::from_points(&[]).is_none());
    }
}
