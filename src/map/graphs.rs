use crate::core::point::Point;
use crate::map::field::Field;
use petgraph::algo::astar;
use petgraph::graph::{NodeIndex, UnGraph};
use std::collections::HashMap;

/// Black-box route finding over a walkability grid.
pub trait PathFinder: Send + Sync {
    /// Cells from `from` to `to`, both included, or `None` when unreachable.
    fn find_path(&self, walkable: &Field<bool>, from: Point, to: Point) -> Option<Vec<Point>>;

    /// One answer per `(from, to)` request, in request order, all over the same grid.
    fn find_paths(&self, walkable: &Field<bool>, requests: &[(Point, Point)]) -> Vec<Option<Vec<Point>>> {
        requests
            .iter()
            .map(|(from, to)| self.find_path(walkable, *from, *to))
            .collect()
    }
}

/// Walkable cells as nodes, 4-way steps as unit edges.
pub struct MapGraph(pub UnGraph<Point, u32>, pub HashMap<Point, NodeIndex>);

impl MapGraph {
    pub fn new(walkable: &Field<bool>) -> MapGraph {
        let mut graph = UnGraph::<Point, u32>::default();
        let mut nodes = HashMap::new();

        for (p, open) in walkable.iter() {
            if *open {
                nodes.insert(p, graph.add_node(p));
            }
        }

        for (p, a) in &nodes {
            // Right and down only, so each pair is linked once.
            for q in [*p + Point::new(1, 0), *p + Point::new(0, 1)] {
                if let Some(b) = nodes.get(&q) {
                    graph.add_edge(*a, *b, 1);
                }
            }
        }

        MapGraph(graph, nodes)
    }

    pub fn node(&self, p: Point) -> Option<NodeIndex> {
        self.1.get(&p).copied()
    }

    pub fn route(&self, from: Point, to: Point) -> Option<Vec<Point>> {
        let start = self.node(from)?;
        let goal = self.node(to)?;

        let (_, nodes) = astar(
            &self.0,
            start,
            |n| n == goal,
            |e| *e.weight(),
            |n| {
                let p = self.0[n];
                ((p.x - to.x).unsigned_abs() + (p.y - to.y).unsigned_abs()) as u32
            },
        )?;

        Some(nodes.into_iter().map(|n| self.0[n]).collect())
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct GridPathFinder;

impl PathFinder for GridPathFinder {
    fn find_path(&self, walkable: &Field<bool>, from: Point, to: Point) -> Option<Vec<Point>> {
        MapGraph::new(walkable).route(from, to)
    }

    /// Builds the graph once and routes every request over it.
    fn find_paths(&self, walkable: &Field<bool>, requests: &[(Point, Point)]) -> Vec<Option<Vec<Point>>> {
        if requests.is_empty() {
            return Vec::new();
        }

        let graph = MapGraph::new(walkable);
        requests
            .iter()
            .map(|(from, to)| graph.route(*from, *to))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_go_around_walls() {
        let mut walkable = Field::new(5, 5, true);
        for y in 0..4 {
            walkable.set(Point::new(2, y), false);
        }

        let path = GridPathFinder
            .find_path(&walkable, Point::new(0, 0), Point::new(4, 0))
            .unwrap();

        assert_eq!(path.first(), Some(&Point::new(0, 0)));
        assert_eq!(path.last(), Some(&Point::new(4, 0)));
        assert!(path.contains(&Point::new(2, 4)));
        assert_eq!(path.len(), 13);
    }

    #[test]
    fn walled_off_goals_have_no_route() {
        let mut walkable = Field::new(5, 5, true);
        for y in 0..5 {
            walkable.set(Point::new(2, y), false);
        }
        assert!(GridPathFinder
            .find_path(&walkable, Point::new(0, 0), Point::new(4, 0))
            .is_none());
    }

    #[test]
    fn batched_routes_match_single_ones() {
        let mut walkable = Field::new(6, 6, true);
        for y in 1..6 {
            walkable.set(Point::new(3, y), false);
        }
        let requests = [
            (Point::new(0, 5), Point::new(5, 5)),
            (Point::new(1, 1), Point::new(1, 4)),
            (Point::new(0, 0), Point::new(3, 3)),
        ];

        let batched = GridPathFinder.find_paths(&walkable, &requests);
        assert_eq!(batched.len(), 3);
        for ((from, to), route) in requests.iter().zip(&batched) {
            let single = GridPathFinder.find_path(&walkable, *from, *to);
            assert_eq!(route.as_ref().map(Vec::len), single.as_ref().map(Vec::len));
            assert_eq!(route.as_ref().and_then(|r| r.last()), single.as_ref().and_then(|r| r.last()));
        }
        assert!(batched[2].is_none());
        assert!(GridPathFinder.find_paths(&walkable, &[]).is_empty());
    }

    #[test]
    fn staying_put_is_a_one_cell_route() {
        let walkable = Field::new(3, 3, true);
        assert_eq!(
            GridPathFinder.find_path(&walkable, Point::new(1, 1), Point::new(1, 1)),
            Some(vec![Point::new(1, 1)])
        );
    }
}
