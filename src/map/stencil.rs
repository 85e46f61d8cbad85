use crate::core::point::Point;
use crate::map::region::PackedRegion;
use bresenham::Bresenham;
use std::collections::HashSet;

pub type RasterIter = Vec<Point>;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Bool {
    Union,
    Diff,
    Intersect,
}

pub trait Rasterize {
    fn rasterize(&self, origin: Point) -> RasterIter;
}

/// Shape description used by terrain-editing callers. Rasterized into a
/// [`PackedRegion`] against the dimensions of the map being edited.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Stencil {
    Empty,
    Line {
        a: Point,
        b: Point,
    },
    Rectangle {
        xy: Point,
        w: u16,
        h: u16,
    },
    Circle {
        center: Point,
        radius: u16,
    },
    Boolean {
        op: Bool,
        lhs: Box<Stencil>,
        rhs: Box<Stencil>,
    },
    Resize {
        amount: i16,
        target: Box<Stencil>,
    },
}

pub type StencilImpl = Box<Stencil>;

pub fn empty() -> StencilImpl {
    Box::new(Stencil::Empty)
}

pub fn line<P: Into<Point>, Q: Into<Point>>(p: P, q: Q) -> StencilImpl {
    Box::new(Stencil::Line {
        a: p.into(),
        b: q.into(),
    })
}

pub fn rect<P: Into<Point>>(xy: P, w: u16, h: u16) -> StencilImpl {
    Box::new(Stencil::Rectangle {
        xy: xy.into(),
        w,
        h,
    })
}

pub fn circle<P: Into<Point>>(c: P, r: u16) -> StencilImpl {
    Box::new(Stencil::Circle {
        center: c.into(),
        radius: r,
    })
}

fn boolean(op: Bool, a: &Stencil, b: &Stencil) -> StencilImpl {
    Box::new(Stencil::Boolean {
        op,
        lhs: Box::new(a.clone()),
        rhs: Box::new(b.clone()),
    })
}

pub fn union(a: &Stencil, b: &Stencil) -> StencilImpl {
    boolean(Bool::Union, a, b)
}

pub fn diff(a: &Stencil, b: &Stencil) -> StencilImpl {
    boolean(Bool::Diff, a, b)
}

pub fn intersect(a: &Stencil, b: &Stencil) -> StencilImpl {
    boolean(Bool::Intersect, a, b)
}

pub fn grow(t: &Stencil, n: u16) -> StencilImpl {
    Box::new(Stencil::Resize {
        amount: n as i16,
        target: Box::new(t.clone()),
    })
}

pub fn shrink(t: &Stencil, n: u16) -> StencilImpl {
    Box::new(Stencil::Resize {
        amount: -(n as i16),
        target: Box::new(t.clone()),
    })
}

/// Outline of a room: the shape minus its one-cell-shrunk interior.
pub fn walls(room: &Stencil) -> StencilImpl {
    let non_walls = shrink(room, 1);
    diff(room, &non_walls)
}

impl Stencil {
    /// Rectangles and circles resized by `amount`; `None` when shrunk away or not resizable.
    fn resized(&self, amount: i16) -> Option<Stencil> {
        match self {
            Stencil::Rectangle { xy, w, h } => {
                let w = *w as i32 + 2 * amount as i32;
                let h = *h as i32 + 2 * amount as i32;
                if w <= 0 || h <= 0 {
                    None
                } else {
                    Some(Stencil::Rectangle {
                        xy: Point::new(xy.x - amount, xy.y - amount),
                        w: w as u16,
                        h: h as u16,
                    })
                }
            }
            Stencil::Circle { center, radius } => {
                let r = *radius as i32 + amount as i32;
                if r <= 0 {
                    None
                } else {
                    Some(Stencil::Circle {
                        center: *center,
                        radius: r as u16,
                    })
                }
            }
            _ => None,
        }
    }

    pub fn to_region(&self, width: u16, height: u16) -> PackedRegion {
        match self {
            Stencil::Boolean { op, lhs, rhs } => {
                let l = lhs.to_region(width, height);
                let r = rhs.to_region(width, height);
                match op {
                    Bool::Union => l.union(&r),
                    Bool::Diff => l.subtract(&r),
                    Bool::Intersect => l.intersect(&r),
                }
            }
            Stencil::Resize { amount, target } => match target.resized(*amount) {
                Some(changed) => changed.to_region(width, height),
                None => PackedRegion::empty(width, height),
            },
            other => PackedRegion::pack(width, height, other.rasterize(Point::new(0, 0))),
        }
    }
}

impl Rasterize for Stencil {
    fn rasterize(&self, origin: Point) -> RasterIter {
        match self {
            Stencil::Empty => vec![],

            Stencil::Line { a, b } => {
                let mut points: Vec<Point> = Bresenham::new((*a).into(), (*b).into())
                    .map(Point::from)
                    .collect();
                // The iterator stops short of the end point.
                points.push(*b);
                points.into_iter().map(|p| p + origin).collect()
            }

            Stencil::Rectangle { xy, w, h } => {
                let mut vec = Vec::with_capacity(*w as usize * *h as usize);
                for x in 0..*w as i16 {
                    for y in 0..*h as i16 {
                        vec.push(Point::new(xy.x + x + origin.x, xy.y + y + origin.y));
                    }
                }
                vec
            }

            Stencil::Circle { radius, center } => {
                let r = *radius as i16;
                let mut vec = Vec::new();
                for x in -r..=r {
                    for y in -r..=r {
                        if (x as i32 * x as i32 + y as i32 * y as i32) <= r as i32 * r as i32 {
                            vec.push(Point::new(center.x + x + origin.x, center.y + y + origin.y));
                        }
                    }
                }
                vec
            }

            Stencil::Boolean { op, lhs, rhs } => {
                let ls: HashSet<Point> = lhs.rasterize(origin).into_iter().collect();
                let rs: HashSet<Point> = rhs.rasterize(origin).into_iter().collect();
                let mut points: Vec<Point> = match op {
                    Bool::Union => ls.union(&rs).copied().collect(),
                    Bool::Diff => ls.difference(&rs).copied().collect(),
                    Bool::Intersect => ls.intersection(&rs).copied().collect(),
                };
                points.sort();
                points
            }

            Stencil::Resize { amount, target } => match target.resized(*amount) {
                Some(changed) => changed.rasterize(origin),
                None => vec![],
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_walls_are_the_outline() {
        let room = rect((1, 1), 4, 3);
        let outline = walls(&room).to_region(10, 10);
        assert_eq!(outline.count(), 10);
        assert!(outline.contains(Point::new(1, 1)));
        assert!(!outline.contains(Point::new(2, 2)));
    }

    #[test]
    fn lines_include_both_ends() {
        let region = line((0, 0), (3, 0)).to_region(5, 5);
        assert_eq!(region.count(), 4);
        assert!(region.contains(Point::new(3, 0)));
    }

    #[test]
    fn shrinking_past_zero_gives_nothing() {
        let tiny = shrink(&rect((0, 0), 2, 2), 1);
        assert!(tiny.to_region(4, 4).is_empty());
        assert!(tiny.rasterize(Point::new(0, 0)).is_empty());
    }

    #[test]
    fn rasterized_booleans_keep_negative_cells() {
        let a = rect((-2, -2), 2, 2);
        let b = rect((-1, -1), 1, 1);
        let cells = diff(&a, &b).rasterize(Point::new(0, 0));
        assert_eq!(cells.len(), 3);
        assert!(cells.contains(&Point::new(-2, -2)));
        // Nothing of it lies on a grid anchored at the origin.
        assert!(diff(&a, &b).to_region(4, 4).is_empty());
    }

    #[test]
    fn circles_and_grown_rooms() {
        assert_eq!(circle((2, 2), 1).to_region(5, 5).count(), 5);
        assert_eq!(grow(&rect((1, 1), 2, 2), 1).to_region(5, 5).count(), 16);
        assert!(empty().to_region(5, 5).is_empty());
    }

    #[test]
    fn boolean_stencils_use_region_algebra() {
        let a = rect((0, 0), 3, 3);
        let b = rect((1, 1), 3, 3);
        assert_eq!(intersect(&a, &b).to_region(6, 6).count(), 4);
        assert_eq!(union(&a, &b).to_region(6, 6).count(), 14);
        assert_eq!(diff(&a, &b).to_region(6, 6).count(), 5);
    }
}
