use crate::core::options::SightOptions;
use crate::core::point::Point;
use crate::core::world::{Entity, World};
use crate::gameplay::sight::FieldOfView;
use crate::map::world_map::WorldMap;
use rayon::prelude::*;
use rayon::ThreadPool;

/// Recomputes every positioned agent's field of view in parallel.
/// Returns how many were recomputed.
pub fn recompute_fields_of_view(
    world: &mut World,
    map: &WorldMap,
    options: &SightOptions,
    pool: &ThreadPool,
) -> usize {
    let mut jobs: Vec<(Entity, Point, FieldOfView)> = Vec::new();
    for entity in world.query(&[world.positions.mask(), world.sight.mask()]) {
        let origin = match world.positions.get(entity) {
            Some(position) => position.get(),
            None => continue,
        };

        if let Some(fov) = world.sight.get_mut(entity) {
            let fresh = FieldOfView::new(fov.distance);
            jobs.push((entity, origin, std::mem::replace(fov, fresh)));
        }
    }

    let resistance = map.visibility_resistance();
    let compress = if options.compress_light {
        Some(options.light_level_count)
    } else {
        None
    };

    pool.install(|| {
        jobs.par_iter_mut()
            .for_each(|(_, origin, fov)| fov.recompute(resistance, *origin, compress));
    });

    let count = jobs.len();
    for (entity, _, fov) in jobs {
        if let Some(slot) = world.sight.get_mut(entity) {
            *slot = fov;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::glyphs::Glyph;
    use crate::core::workers::build_pool;
    use crate::gameplay::Positioned;

    #[test]
    fn every_sighted_agent_is_recomputed() {
        let map = WorldMap::filled(10, 10, Glyph::plain('.'), '#');
        let pool = build_pool(2).unwrap();
        let mut world = World::default();

        let near = world.spawn().unwrap();
        world.positions.insert(near, Positioned::at(1, 1));
        world.sight.insert(near, FieldOfView::new(1));

        let blind = world.spawn().unwrap();
        world.positions.insert(blind, Positioned::at(5, 5));

        let options = SightOptions::default();
        assert_eq!(recompute_fields_of_view(&mut world, &map, &options, &pool), 1);

        let fov = world.sight.get(near).unwrap();
        assert_eq!(fov.seen().count(), 5);
        assert_eq!(fov.is_compressed(), options.compress_light);
    }
}
