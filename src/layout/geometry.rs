//! Document-space geometry
//!
//! All coordinates are in document space (page offsets), so a rectangle stays
//! valid while the view scrolls and goes stale only when layout reflows.

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle `{top, left, width, height}`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle spanning two corners
    pub fn from_edges(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// Half-open point containment: left/top edges inside, right/bottom outside
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }

    /// Euclidean distance from the point to the nearest point of the rectangle
    pub fn distance_to(&self, point: Point) -> f64 {
        let dx = (self.left - point.x).max(0.0).max(point.x - self.right());
        let dy = (self.top - point.y).max(0.0).max(point.y - self.bottom());
        dx.hypot(dy)
    }

    /// Build the bounding box of all rectangles, `None` for an empty iterator
    pub fn bounding_box<'a, I>(mut rects: I) -> Option<Rect>
    where
        I: Iterator<Item = &'a Rect>,
    {
        let first = *rects.next()?;
        Some(rects.fold(first, |acc, rect| acc.union(rect)))
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "top={} left={} width={} height={}",
            self.top, self.left, self.width, self.height
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_is_half_open() {
        let rect = Rect::new(10.0, 20.0, 30.0, 10.0);
        assert!(rect.contains(Point::new(10.0, 20.0)));
        assert!(rect.contains(Point::new(39.9, 29.9)));
        assert!(!rect.contains(Point::new(40.0, 25.0)));
        assert!(!rect.contains(Point::new(15.0, 30.0)));
    }

    #[test]
    fn test_bounding_box() {
        let rects = [Rect::new(8.0, 0.0, 40.0, 20.0), Rect::new(0.0, 20.0, 24.0, 20.0)];
        let bbox = Rect::bounding_box(rects.iter()).unwrap();
        assert_eq!(bbox, Rect::new(0.0, 0.0, 48.0, 40.0));
        assert!(Rect::bounding_box(std::iter::empty()).is_none());
    }

    #[test]
    fn test_distance_to() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert_eq!(rect.distance_to(Point::new(5.0, 5.0)), 0.0);
        assert_eq!(rect.distance_to(Point::new(13.0, 14.0)), 5.0);
        assert_eq!(rect.distance_to(Point::new(-2.0, 5.0)), 2.0);
    }

    #[test]
    fn test_display() {
        let rect = Rect::new(8.0, 20.0, 48.0, 20.0);
        assert_eq!(rect.to_string(), "top=20 left=8 width=48 height=20");
    }
}
