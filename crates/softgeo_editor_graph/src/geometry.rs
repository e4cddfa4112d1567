// SPDX-License-Identifier: MIT OR Apache-2.0
//! Canvas-space geometry shared by the model and the interaction layer.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Sub};

/// A point (or offset) in canvas space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal coordinate
    pub x: f32,
    /// Vertical coordinate
    pub y: f32,
}

impl Point {
    /// The origin
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new point
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Round both coordinates to the nearest multiple of `step`, ties to even
    pub fn snapped(self, step: f32) -> Self {
        if step <= 0.0 {
            return self;
        }
        Self {
            x: (self.x / step).round_ties_even() * step,
            y: (self.y / step).round_ties_even() * step,
        }
    }
}

impl Add for Point {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// A width/height extent in canvas space
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Extent {
    /// Width
    pub width: f32,
    /// Height
    pub height: f32,
}

impl Extent {
    /// Create a new extent
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Component-wise maximum with a floor
    pub fn at_least(self, floor: Extent) -> Self {
        Self {
            width: self.width.max(floor.width),
            height: self.height.max(floor.height),
        }
    }
}

/// Axis-aligned rectangle, stored as top-left corner plus size
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    /// Top-left corner
    pub min: Point,
    /// Extent (never negative)
    pub size: Extent,
}

impl Rect {
    /// Create from a corner and a size
    pub fn from_min_size(min: Point, size: Extent) -> Self {
        Self { min, size }
    }

    /// Create from two arbitrary corners, normalized regardless of order
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            size: Extent::new((a.x - b.x).abs(), (a.y - b.y).abs()),
        }
    }

    /// Bottom-right corner
    pub fn max(&self) -> Point {
        Point::new(self.min.x + self.size.width, self.min.y + self.size.height)
    }

    /// Whether `point` lies inside (edges inclusive on the min side only)
    pub fn contains(&self, point: Point) -> bool {
        let max = self.max();
        point.x >= self.min.x && point.x < max.x && point.y >= self.min.y && point.y < max.y
    }

    /// Whether the interiors of both rectangles overlap. Touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        let (a_max, b_max) = (self.max(), other.max());
        other.min.x < a_max.x && self.min.x < b_max.x && other.min.y < a_max.y && self.min.y < b_max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapping() {
        assert_eq!(Point::new(115.0, 61.0).snapped(10.0), Point::new(120.0, 60.0));
        assert_eq!(Point::new(-14.0, 4.9).snapped(10.0), Point::new(-10.0, 0.0));
        assert_eq!(Point::new(3.3, 4.4).snapped(0.0), Point::new(3.3, 4.4));
    }

    #[test]
    fn test_snapping_midpoints_go_to_even() {
        assert_eq!(Point::new(105.0, 125.0).snapped(10.0), Point::new(100.0, 120.0));
        assert_eq!(Point::new(115.0, 135.0).snapped(10.0), Point::new(120.0, 140.0));
        assert_eq!(Point::new(-25.0, 5.0).snapped(10.0), Point::new(-20.0, 0.0));
    }

    #[test]
    fn test_rect_from_corners_is_normalized() {
        let rect = Rect::from_corners(Point::new(150.0, 100.0), Point::new(0.0, 0.0));
        assert_eq!(rect.min, Point::ZERO);
        assert_eq!(rect.size, Extent::new(150.0, 100.0));
    }

    #[test]
    fn test_intersection() {
        let marquee = Rect::from_corners(Point::ZERO, Point::new(150.0, 100.0));
        let near = Rect::from_min_size(Point::ZERO, Extent::new(100.0, 50.0));
        let far = Rect::from_min_size(Point::new(200.0, 200.0), Extent::new(100.0, 50.0));
        let touching = Rect::from_min_size(Point::new(150.0, 0.0), Extent::new(10.0, 10.0));

        assert!(marquee.intersects(&near));
        assert!(!marquee.intersects(&far));
        assert!(!marquee.intersects(&touching));
    }
}
