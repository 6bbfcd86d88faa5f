//! Integer geometry in virtual-desktop and canvas-local space.

use std::fmt;
use std::ops::{Add, Sub};

/// A pixel position. Depending on context this is either a virtual-desktop
/// coordinate or a canvas-local one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned rectangle. Width and height are unsigned, so a `Rect` can
/// never be inverted; zero area is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: u32, height: u32) -> Self {
        Rect { left, top, width, height }
    }

    /// Normalized rectangle spanning two corners, whatever their order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let top = a.y.min(b.y);
        Rect {
            left,
            top,
            width: a.x.abs_diff(b.x),
            height: a.y.abs_diff(b.y),
        }
    }

    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    /// Exclusive right edge.
    pub fn right(&self) -> i64 {
        self.left as i64 + self.width as i64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> i64 {
        self.top as i64 + self.height as i64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Half-open containment: the left/top edges are inside, right/bottom are not.
    pub fn contains(&self, p: Point) -> bool {
        let (x, y) = (p.x as i64, p.y as i64);
        x >= self.left as i64 && x < self.right() && y >= self.top as i64 && y < self.bottom()
    }

    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    pub fn translate(&self, by: Point) -> Rect {
        Rect { left: self.left + by.x, top: self.top + by.y, ..*self }
    }

    /// Nearest point on or inside the rect. The right/bottom edges count as
    /// inside here, so a corner clamped to them still spans the full width.
    pub fn clamp_point(&self, p: Point) -> Point {
        let x = (p.x as i64).clamp(self.left as i64, self.right());
        let y = (p.y as i64).clamp(self.top as i64, self.bottom());
        Point::new(x as i32, y as i32)
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.left as i64 + self.width as i64 / 2) as i32,
            (self.top as i64 + self.height as i64 / 2) as i32,
        )
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.left, self.top)
    }
}
