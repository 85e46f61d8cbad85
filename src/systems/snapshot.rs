use crate::core::world::{Entity, World};
use crate::gameplay::snapshot::ViewSnapshot;
use crate::map::region::PackedRegion;
use crate::map::view::MapView;
use crate::map::world_map::WorldMap;

/// Captures what `viewer` would see now. `None` when it has no memory.
pub fn capture_view(world: &World, map: &WorldMap, viewer: Entity, now: f64) -> Option<ViewSnapshot> {
    let memory = world.memories.get(viewer)?;
    let (width, height) = map.dimensions();
    let seen = world
        .sight
        .get(viewer)
        .map(|fov| fov.seen().clone())
        .filter(|seen| seen.dimensions() == (width, height))
        .unwrap_or_else(|| PackedRegion::empty(width, height));

    let known = memory.map.read();
    Some(ViewSnapshot::capture(viewer, &known, &seen, map, &world.glyphs, now))
}
