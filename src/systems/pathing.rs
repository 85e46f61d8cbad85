use crate::core::world::World;
use crate::map::graphs::PathFinder;
use crate::map::world_map::WorldMap;
use log::debug;

/// Replans every agent that has a destination. Returns how many got a route.
pub fn plan_paths(world: &mut World, map: &WorldMap, finder: &dyn PathFinder) -> usize {
    let mut agents = Vec::new();
    let mut requests = Vec::new();
    for entity in world.query(&[
        world.positions.mask(),
        world.destinations.mask(),
        world.movements.mask(),
    ]) {
        if let (Some(position), Some(destination)) = (world.positions.get(entity), world.destinations.get(entity)) {
            agents.push(entity);
            requests.push((position.get(), destination.0));
        }
    }
    if agents.is_empty() {
        return 0;
    }

    let walkable = map.walkability();
    let routes = finder.find_paths(&walkable, &requests);
    let mut planned = 0;

    for ((entity, (from, to)), route) in agents.into_iter().zip(requests).zip(routes) {
        let steps = match route {
            Some(path) => path,
            None => {
                debug!("{:?} has no route from {:?} to {:?}", entity, from, to);
                Vec::new()
            }
        };

        if let Some(movement) = world.movements.get_mut(entity) {
            // The route starts where the agent already stands.
            movement.replace(steps.iter().copied().skip(1));
            if !steps.is_empty() {
                planned += 1;
            }
        }
    }

    planned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::glyphs::Glyph;
    use crate::core::point::Point;
    use crate::gameplay::{Destination, MovementList, Positioned};
    use crate::map::field::Field;
    use crate::map::graphs::GridPathFinder;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingFinder {
        batches: AtomicUsize,
    }

    impl PathFinder for CountingFinder {
        fn find_path(&self, walkable: &Field<bool>, from: Point, to: Point) -> Option<Vec<Point>> {
            GridPathFinder.find_path(walkable, from, to)
        }

        fn find_paths(&self, walkable: &Field<bool>, requests: &[(Point, Point)]) -> Vec<Option<Vec<Point>>> {
            self.batches.fetch_add(1, Ordering::SeqCst);
            GridPathFinder.find_paths(walkable, requests)
        }
    }

    #[test]
    fn destinations_become_movement_lists() {
        let map = WorldMap::filled(4, 4, Glyph::plain('.'), '#');
        let mut world = World::default();
        let e = world.spawn().unwrap();
        world.positions.insert(e, Positioned::at(0, 0));
        world.destinations.insert(e, Destination(Point::new(3, 0)));
        world.movements.insert(e, MovementList::default());

        assert_eq!(plan_paths(&mut world, &map, &GridPathFinder), 1);
        let steps: Vec<Point> = world.movements.get(e).unwrap().0.iter().copied().collect();
        assert_eq!(steps, vec![Point::new(1, 0), Point::new(2, 0), Point::new(3, 0)]);
    }

    #[test]
    fn unreachable_destinations_clear_the_plan() {
        let mut map = WorldMap::filled(4, 4, Glyph::plain('.'), '#');
        map.set_glyph(Point::new(3, 0), Glyph::plain('#'));
        let mut world = World::default();
        let e = world.spawn().unwrap();
        world.positions.insert(e, Positioned::at(0, 0));
        world.destinations.insert(e, Destination(Point::new(3, 0)));
        world.movements.insert(e, MovementList([Point::new(0, 1)].into_iter().collect()));

        assert_eq!(plan_paths(&mut world, &map, &GridPathFinder), 0);
        assert!(world.movements.get(e).unwrap().is_empty());
    }

    #[test]
    fn one_batch_serves_every_agent() {
        let map = WorldMap::filled(6, 6, Glyph::plain('.'), '#');
        let mut world = World::default();
        for x in 0..4 {
            let e = world.spawn().unwrap();
            world.positions.insert(e, Positioned::at(x, 0));
            world.destinations.insert(e, Destination(Point::new(x, 5)));
            world.movements.insert(e, MovementList::default());
        }

        let finder = CountingFinder::default();
        assert_eq!(plan_paths(&mut world, &map, &finder), 4);
        assert_eq!(finder.batches.load(Ordering::SeqCst), 1);
    }
}
