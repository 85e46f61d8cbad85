use crate::core::thread_safety::ThreadSafe;
use crate::map::known_map::KnownMap;
use crate::map::region::PackedRegion;
use crate::map::view::MapView;
use log::debug;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TeamId(pub u32);

#[derive(Default)]
struct TeamState {
    map: Option<KnownMap>,
    visible: Option<PackedRegion>,
}

impl TeamState {
    fn map(&mut self, width: u16, height: u16) -> &mut KnownMap {
        let stale = self.map.as_ref().map_or(true, |m| m.dimensions() != (width, height));
        if stale {
            self.map = Some(KnownMap::new(width, height));
        }
        self.map.get_or_insert_with(|| KnownMap::new(width, height))
    }

    fn visible(&mut self, width: u16, height: u16) -> &mut PackedRegion {
        let stale = self.visible.as_ref().map_or(true, |v| v.dimensions() != (width, height));
        if stale {
            self.visible = Some(PackedRegion::empty(width, height));
        }
        self.visible.get_or_insert_with(|| PackedRegion::empty(width, height))
    }
}

/// Shared knowledge of one team: a canonical map and what any member sees now.
///
/// Both are built on first use against the size asked for, and rebuilt from
/// scratch after [`Team::invalidate`].
pub struct Team {
    id: TeamId,
    name: String,
    state: RwLock<TeamState>,
}

impl Team {
    pub fn new(id: TeamId, name: impl Into<String>) -> Self {
        Team {
            id,
            name: name.into(),
            state: RwLock::new(TeamState::default()),
        }
    }

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reset_visibility(&self) {
        let mut state = self.state.write();
        if let Some(visible) = state.visible.as_mut() {
            *visible = PackedRegion::empty(visible.width(), visible.height());
        }
    }

    /// Folds a member's memory into the team map; `visible` joins what the team sees now.
    pub fn update(&self, known: &KnownMap, visible: Option<&PackedRegion>) -> bool {
        let (width, height) = known.dimensions();
        let mut state = self.state.write();

        if let Some(region) = visible {
            let now = state.visible(width, height);
            *now = now.union(region);
        }

        state.map(width, height).ingest_from_known_map(known, None, false)
    }

    pub fn map_snapshot(&self, width: u16, height: u16) -> KnownMap {
        self.state.write().map(width, height).clone()
    }

    pub fn visible(&self, width: u16, height: u16) -> PackedRegion {
        self.state.write().visible(width, height).clone()
    }

    /// Drops all knowledge; the next access starts from an empty map.
    pub fn invalidate(&self) {
        debug!("team {:?} ({}) forgets its map", self.id, self.name);
        *self.state.write() = TeamState::default();
    }

    /// Forces `member`'s memory inside `region` to match the team map.
    pub fn restrict_member(&self, member: &ThreadSafe<KnownMap>, region: &PackedRegion) {
        let (width, height) = region.dimensions();
        let snapshot = self.map_snapshot(width, height);
        member.write().restrict_from_team(&snapshot, region);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::glyphs::Glyph;
    use crate::core::point::Point;
    use crate::core::thread_safety::thread_safe;
    use crate::map::world_map::WorldMap;

    #[test]
    fn visibility_accumulates_until_reset() {
        let team = Team::new(TeamId(1), "red");
        let member = KnownMap::new(5, 5);
        team.update(&member, Some(&PackedRegion::pack(5, 5, [Point::new(0, 0)])));
        team.update(&member, Some(&PackedRegion::pack(5, 5, [Point::new(4, 4)])));
        assert_eq!(team.visible(5, 5).count(), 2);

        team.reset_visibility();
        assert!(team.visible(5, 5).is_empty());
    }

    #[test]
    fn invalidation_discards_knowledge() {
        let world = WorldMap::filled(5, 5, Glyph::plain('.'), '#');
        let mut member = KnownMap::new(5, 5);
        member.ingest_from_world(&world, None, 1.0);

        let team = Team::new(TeamId(1), "red");
        assert!(team.update(&member, None));
        assert_eq!(team.map_snapshot(5, 5).known_region().count(), 25);

        team.invalidate();
        assert!(team.map_snapshot(5, 5).known_region().is_empty());
        assert_eq!(team.map_snapshot(8, 3).dimensions(), (8, 3));
    }

    #[test]
    fn restricting_a_member_prunes_memory_beyond_the_team() {
        let world = WorldMap::filled(5, 5, Glyph::plain('.'), '#');
        let team = Team::new(TeamId(2), "blue");
        let mut scout = KnownMap::new(5, 5);
        scout.ingest_from_world(&world, Some(&PackedRegion::pack(5, 5, [Point::new(1, 1)])), 1.0);
        team.update(&scout, None);

        let mut wide = KnownMap::new(5, 5);
        wide.ingest_from_world(&world, None, 1.0);
        let member = thread_safe(wide);

        let horizon = team.map_snapshot(5, 5).known_region().clone();
        team.restrict_member(&member, &horizon);
        assert_eq!(member.read().known_region().count(), 25);

        team.restrict_member(&member, &PackedRegion::full(5, 5));
        assert_eq!(member.read().known_region().count(), 1);
    }
}
