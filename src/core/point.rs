use serde::{Deserialize, Serialize};
use std::ops::Add;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    pub x: i16,
    pub y: i16,
}

impl Point {
    pub const fn new(x: i16, y: i16) -> Self {
        Point { x, y }
    }

    pub fn is_non_negative(&self) -> bool {
        self.x >= 0 && self.y >= 0
    }

    /// True when the point lies inside a `width` x `height` grid anchored at the origin.
    pub fn within(&self, width: u16, height: u16) -> bool {
        self.is_non_negative() && (self.x as i32) < width as i32 && (self.y as i32) < height as i32
    }
}

impl From<(i32, i32)> for Point {
    fn from(pt: (i32, i32)) -> Self {
        Point {
            x: pt.0 as i16,
            y: pt.1 as i16,
        }
    }
}

impl From<(i16, i16)> for Point {
    fn from(pt: (i16, i16)) -> Self {
        Point { x: pt.0, y: pt.1 }
    }
}

impl From<(u16, u16)> for Point {
    fn from(pt: (u16, u16)) -> Self {
        Point {
            x: pt.0 as i16,
            y: pt.1 as i16,
        }
    }
}

impl From<bresenham::Point> for Point {
    fn from(p: bresenham::Point) -> Self {
        Point {
            x: p.0 as i16,
            y: p.1 as i16,
        }
    }
}

impl From<Point> for bresenham::Point {
    fn from(p: Point) -> Self {
        (p.x as isize, p.y as isize)
    }
}

pub fn distance(xy: Point, pq: Point) -> f32 {
    let dx = xy.x as f32 - pq.x as f32;
    let dy = xy.y as f32 - pq.y as f32;
    (dx * dx + dy * dy).sqrt()
}

pub fn chebyshev(xy: Point, pq: Point) -> u16 {
    let dx = (xy.x as i32 - pq.x as i32).unsigned_abs();
    let dy = (xy.y as i32 - pq.y as i32).unsigned_abs();
    dx.max(dy) as u16
}

impl Add for Point {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}
