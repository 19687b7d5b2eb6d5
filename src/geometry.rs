//! Small geometry value types used by window attributes and input state.

use std::ops::{Add, Sub};

/// 2D integer point (window position, screen coordinates).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// 2D integer extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Rectangle with corner and extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub corner: Point,
    pub extent: Size,
}

impl Rect {
    pub const fn new(corner: Point, extent: Size) -> Self {
        Self { corner, extent }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.corner.x
            && point.y >= self.corner.y
            && point.x < self.corner.x + self.extent.width
            && point.y < self.corner.y + self.extent.height
    }
}

/// 2D float vector (cursor position, scroll offsets).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(Point::new(100, 100), Size::new(640, 480));
        assert!(rect.contains(Point::new(100, 100)));
        assert!(rect.contains(Point::new(739, 579)));
        assert!(!rect.contains(Point::new(740, 200)));
        assert!(!rect.contains(Point::new(99, 200)));
    }

    #[test]
    fn test_vec2_arithmetic() {
        let a = Vec2::new(3.0, 4.0);
        let b = Vec2::new(1.0, 1.5);
        assert_eq!(a - b, Vec2::new(2.0, 2.5));
        assert_eq!(a + b, Vec2::new(4.0, 5.5));
    }
}
