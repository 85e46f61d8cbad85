use crate::core::workers::{await_all, TaskReport};
use crate::core::world::World;
use crate::error::FogboundError;
use crate::map::view::MapView;
use crate::map::world_map::WorldMap;
use rayon::ThreadPool;

/// Mirrors agent positions into the world map's occupant index and evicts
/// despawned agents. Returns how many occupant records changed.
pub fn sync_locations(world: &mut World, map: &mut WorldMap) -> usize {
    let mut changed = 0;

    for entity in world.drain_despawned() {
        if map.remove_occupant(entity).is_some() {
            changed += 1;
        }
    }

    for entity in world.query(&[world.positions.mask()]) {
        if let Some(position) = world.positions.get(entity) {
            let p = position.get();
            if map.location_of(entity) != Some(p) {
                map.set_occupant(entity, p);
                changed += 1;
            }
        }
    }

    changed
}

/// Copies what each agent currently sees into its memory and queues those
/// cells for the next upload.
pub fn record_sightings(world: &World, map: &WorldMap, now: f64, pool: &ThreadPool) -> TaskReport {
    let jobs = world
        .query(&[world.sight.mask(), world.memories.mask()])
        .into_iter()
        .filter_map(|entity| {
            let seen = world.sight.get(entity)?.seen().clone();
            let memory = world.memories.get(entity)?.clone();
            Some((entity, (memory, seen)))
        })
        .filter(|(_, (_, seen))| seen.dimensions() == map.dimensions())
        .collect();

    await_all(pool, "sightings", jobs, |_, (memory, seen)| {
        let found = memory.map.read().dimensions();
        if found != map.dimensions() {
            return Err(FogboundError::DimensionMismatch {
                expected: map.dimensions(),
                found,
            });
        }

        memory.map.write().ingest_from_world(map, Some(&seen), now);
        let mut unreported = memory.unreported.write();
        *unreported = unreported.union(&seen);
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::glyphs::Glyph;
    use crate::core::point::Point;
    use crate::core::workers::build_pool;
    use crate::gameplay::{FieldOfView, Memory, Positioned};

    #[test]
    fn occupants_follow_positions_and_despawns() {
        let mut map = WorldMap::filled(6, 6, Glyph::plain('.'), '#');
        let mut world = World::default();
        let a = world.spawn().unwrap();
        world.positions.insert(a, Positioned::at(1, 1));

        assert_eq!(sync_locations(&mut world, &mut map), 1);
        assert_eq!(sync_locations(&mut world, &mut map), 0);

        world.positions.get_mut(a).unwrap().update(Point::new(2, 1));
        sync_locations(&mut world, &mut map);
        assert_eq!(map.location_of(a), Some(Point::new(2, 1)));

        world.despawn(a);
        sync_locations(&mut world, &mut map);
        assert!(map.occupants().is_empty());
    }

    #[test]
    fn sightings_feed_memory_and_unreported_cells() {
        let mut map = WorldMap::filled(10, 10, Glyph::plain('.'), '#');
        map.set_glyph(Point::new(3, 3), Glyph::plain('#'));
        let pool = build_pool(2).unwrap();

        let mut world = World::default();
        let e = world.spawn().unwrap();
        let mut fov = FieldOfView::new(1);
        fov.recompute(map.visibility_resistance(), Point::new(3, 3), None);
        world.sight.insert(e, fov);
        world.memories.insert(e, Memory::new(10, 10));

        let report = record_sightings(&world, &map, 1.0, &pool);
        assert_eq!(report.completed, 1);

        let memory = world.memories.get(e).unwrap();
        assert_eq!(memory.unreported.read().count(), 5);
        let walls = memory.map.read().terrain_region('#').cloned().unwrap();
        assert_eq!(walls.unpack(), vec![Point::new(3, 3)]);
    }

    #[test]
    fn mismatched_memories_fail_without_stopping_others() {
        let map = WorldMap::filled(4, 4, Glyph::plain('.'), '#');
        let pool = build_pool(2).unwrap();
        let mut world = World::default();

        for (i, size) in [(0, 4u16), (1, 7u16)] {
            let e = world.spawn().unwrap();
            let mut fov = FieldOfView::new(2);
            fov.recompute(map.visibility_resistance(), Point::new(i, i), None);
            world.sight.insert(e, fov);
            world.memories.insert(e, Memory::new(size, size));
        }

        let report = record_sightings(&world, &map, 1.0, &pool);
        assert_eq!(report.submitted, 2);
        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 1);
    }
}
