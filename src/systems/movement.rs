use crate::core::events::MapEvent;
use crate::core::world::World;
use crate::map::world_map::WorldMap;
use log::trace;
use std::sync::mpsc::Sender;

/// Pops one step per agent. Steps onto walls or off the map are dropped.
/// Returns how many agents moved.
pub fn execute_movement_lists(world: &mut World, map: &WorldMap, events: &Sender<MapEvent>) -> usize {
    let mut moved = 0;

    for entity in world.query(&[world.positions.mask(), world.movements.mask()]) {
        let step = match world.movements.get_mut(entity).and_then(|m| m.next_step()) {
            Some(step) => step,
            None => continue,
        };

        if !map.is_open(step) {
            trace!("{:?} cannot step onto {:?}", entity, step);
            continue;
        }

        let has_glyph = world.glyphs.contains(entity);
        let position = match world.positions.get_mut(entity) {
            Some(position) => position,
            None => continue,
        };

        let before = position.get();
        position.update(step);
        let after = position.get();

        if before.x != after.x || before.y != after.y {
            moved += 1;
            if has_glyph {
                let _ = events.send(MapEvent::GlyphMoved {
                    entity,
                    from: before,
                    to: after,
                });
            }
        }
    }

    moved
}
