use crate::core::point::Point;
use std::ops::Range;

pub trait Shadowcaster {
    /// Calls `mark` for every cell visible from `origin` up to `max_depth` rows out.
    /// Cells may be marked more than once, and may lie outside the grid.
    fn compute(origin: Point, max_depth: u16, is_blocking: &impl Fn(Point) -> bool, mark: &mut impl FnMut(Point));
}

pub fn round_ties_up(n: f32) -> i16 {
    (n + 0.5).floor() as i16
}

pub fn round_ties_down(n: f32) -> i16 {
    (n - 0.5).ceil() as i16
}

#[derive(Clone, Copy, Debug)]
pub enum QuadrantDirection {
    North,
    East,
    South,
    West,
}

impl QuadrantDirection {
    pub fn all() -> [QuadrantDirection; 4] {
        use QuadrantDirection::*;
        [North, East, South, West]
    }
}

pub struct Quadrant {
    direction: QuadrantDirection,
    origin: Point,
}

impl Quadrant {
    pub fn new(direction: QuadrantDirection, origin: Point) -> Self {
        Self { direction, origin }
    }

    /// Maps a (depth, column) pair in quadrant space to a grid cell.
    pub fn transform(&self, depth: i16, col: i16) -> Point {
        let offset = match self.direction {
            QuadrantDirection::North => Point::new(col, -depth),
            QuadrantDirection::South => Point::new(col, depth),
            QuadrantDirection::East => Point::new(depth, col),
            QuadrantDirection::West => Point::new(-depth, col),
        };
        self.origin + offset
    }
}

type Depth = u16;
type Slope = f32;

#[derive(Debug)]
pub struct Row {
    depth: Depth,
    start_slope: Slope,
    end_slope: Slope,
}

impl Row {
    pub fn new(depth: Depth, start_slope: Slope, end_slope: Slope) -> Self {
        Self {
            depth,
            start_slope,
            end_slope,
        }
    }

    pub fn columns(&self) -> Range<i16> {
        let min_col = round_ties_up(self.depth as f32 * self.start_slope);
        let max_col = round_ties_down(self.depth as f32 * self.end_slope) + 1;
        min_col..max_col
    }

    pub fn next(&self) -> Row {
        Row::new(self.depth + 1, self.start_slope, self.end_slope)
    }

    fn is_symmetric(&self, col: i16) -> bool {
        let col = col as f32;
        col >= self.depth as f32 * self.start_slope && col <= self.depth as f32 * self.end_slope
    }
}

fn slope(depth: Depth, col: i16) -> Slope {
    (2.0 * col as f32 - 1.0) / (2.0 * depth as f32)
}

/// Symmetric shadowcasting: if A sees B then B sees A, walls are lit, and
/// nothing is visible through a diagonal gap between two walls.
pub struct SymmetricShadowcast;

impl SymmetricShadowcast {
    fn scan(
        first: Row,
        max_depth: u16,
        quad: &Quadrant,
        is_blocking: &impl Fn(Point) -> bool,
        mark: &mut impl FnMut(Point),
    ) {
        let mut rows = vec![first];

        while let Some(mut row) = rows.pop() {
            if row.depth > max_depth {
                continue;
            }

            let depth = row.depth as i16;
            let mut prev_wall: Option<bool> = None;

            for col in row.columns() {
                let cell = quad.transform(depth, col);
                let wall = is_blocking(cell);

                if wall || row.is_symmetric(col) {
                    mark(cell);
                }

                match prev_wall {
                    Some(true) if !wall => row.start_slope = slope(row.depth, col),
                    Some(false) if wall => {
                        let mut next = row.next();
                        next.end_slope = slope(row.depth, col);
                        rows.push(next);
                    }
                    _ => {}
                }

                prev_wall = Some(wall);
            }

            if prev_wall == Some(false) {
                rows.push(row.next());
            }
        }
    }
}

impl Shadowcaster for SymmetricShadowcast {
    fn compute(origin: Point, max_depth: u16, is_blocking: &impl Fn(Point) -> bool, mark: &mut impl FnMut(Point)) {
        mark(origin);

        for dir in QuadrantDirection::all() {
            let quad = Quadrant::new(dir, origin);
            SymmetricShadowcast::scan(Row::new(1, -1.0, 1.0), max_depth, &quad, is_blocking, mark);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn visible(origin: Point, depth: u16, walls: &[Point]) -> HashSet<Point> {
        let mut seen = HashSet::new();
        SymmetricShadowcast::compute(
            origin,
            depth,
            &|p| walls.contains(&p),
            &mut |p| {
                seen.insert(p);
            },
        );
        seen
    }

    #[test]
    fn open_ground_reveals_the_whole_square() {
        let seen = visible(Point::new(0, 0), 2, &[]);
        assert_eq!(seen.len(), 25);
    }

    #[test]
    fn walls_are_lit_but_hide_what_is_behind() {
        let wall = Point::new(2, 0);
        let seen = visible(Point::new(0, 0), 4, &[wall]);
        assert!(seen.contains(&wall));
        assert!(!seen.contains(&Point::new(3, 0)));
        assert!(!seen.contains(&Point::new(4, 0)));
    }

    #[test]
    fn sight_is_symmetric() {
        let walls = [Point::new(2, 1), Point::new(3, 3), Point::new(1, 4)];
        let a = Point::new(0, 0);
        let b = Point::new(4, 2);
        assert_eq!(
            visible(a, 6, &walls).contains(&b),
            visible(b, 6, &walls).contains(&a)
        );
    }
}
