use crate::core::colors::Color;
use crate::core::point::Point;
use crate::core::world::Entity;
use crate::map::occupants::Occupants;
use crate::map::region::PackedRegion;
use crate::map::view::MapView;
use crate::map::world_map::WorldMap;
use log::warn;
use std::collections::HashMap;
use std::hash::Hash;

/// One recorded value's cells, stamped with the merge that last added to it.
#[derive(Clone, Debug)]
struct Bucket {
    region: PackedRegion,
    stamp: u64,
}

type Buckets<K> = HashMap<K, Bucket>;

/// Flat, stamp-free view of a [`KnownMap`], used to persist and rebuild one.
#[derive(Clone, Debug, PartialEq)]
pub struct KnownMapParts {
    pub width: u16,
    pub height: u16,
    pub known: PackedRegion,
    pub terrain: Vec<(char, PackedRegion)>,
    pub foreground: Vec<(Color, PackedRegion)>,
    pub background: Vec<(Color, PackedRegion)>,
    pub occupants: Vec<(Entity, Point)>,
    pub last_synced: f64,
}

/// A partial, possibly stale copy of a [`WorldMap`].
///
/// Terrain and colors are stored as one region per distinct value, so merges
/// are a handful of whole-region operations regardless of map size. Lookups
/// scan the (few) buckets instead.
///
/// Peer merges only ever add cells to buckets, so after two peers disagree
/// about a cell it sits in two buckets; lookups then answer with the bucket
/// that was merged into most recently. Ingesting from the world removes the
/// target cells from every bucket first and keeps buckets disjoint.
#[derive(Clone, Debug)]
pub struct KnownMap {
    width: u16,
    height: u16,
    known: PackedRegion,
    terrain: Buckets<char>,
    foreground: Buckets<Color>,
    background: Buckets<Color>,
    occupants: Occupants,
    last_synced: f64,
    sequence: u64,
}

fn strip<K>(buckets: &mut Buckets<K>, cells: &PackedRegion) {
    for bucket in buckets.values_mut() {
        bucket.region = bucket.region.subtract(cells);
    }
    buckets.retain(|_, b| !b.region.is_empty());
}

fn add_cells<K: Eq + Hash>(buckets: &mut Buckets<K>, key: K, cells: &PackedRegion, stamp: u64) {
    if cells.is_empty() {
        return;
    }

    match buckets.get_mut(&key) {
        Some(bucket) => {
            bucket.region = bucket.region.union(cells);
            bucket.stamp = stamp;
        }
        None => {
            buckets.insert(
                key,
                Bucket {
                    region: cells.clone(),
                    stamp,
                },
            );
        }
    }
}

fn lookup<K: Copy>(buckets: &Buckets<K>, p: Point) -> Option<K> {
    buckets
        .iter()
        .filter(|(_, b)| b.region.contains(p))
        .max_by_key(|(_, b)| b.stamp)
        .map(|(k, _)| *k)
}

fn same_content<K: Eq + Hash>(a: &Buckets<K>, b: &Buckets<K>) -> bool {
    a.len() == b.len()
        && a.iter()
            .all(|(k, bucket)| b.get(k).map_or(false, |other| other.region == bucket.region))
}

fn by_recency<K: Copy>(buckets: &Buckets<K>) -> Vec<(K, &PackedRegion)> {
    let mut ordered: Vec<(K, &Bucket)> = buckets.iter().map(|(k, b)| (*k, b)).collect();
    ordered.sort_by_key(|(_, b)| b.stamp);
    ordered.into_iter().map(|(k, b)| (k, &b.region)).collect()
}

impl KnownMap {
    pub fn new(width: u16, height: u16) -> Self {
        KnownMap {
            width,
            height,
            known: PackedRegion::empty(width, height),
            terrain: HashMap::new(),
            foreground: HashMap::new(),
            background: HashMap::new(),
            occupants: Occupants::default(),
            last_synced: 0.0,
            sequence: 0,
        }
    }

    /// Forgets everything and takes on new dimensions.
    pub fn resize(&mut self, width: u16, height: u16) {
        *self = KnownMap::new(width, height);
    }

    pub fn clear(&mut self) {
        self.resize(self.width, self.height);
    }

    fn target(&self, region: Option<&PackedRegion>) -> PackedRegion {
        match region {
            Some(r) => {
                debug_assert_eq!(r.dimensions(), self.dimensions());
                r.clone()
            }
            None => PackedRegion::full(self.width, self.height),
        }
    }

    fn next_stamp(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Authoritative copy of `world` inside `region` (everything when `None`).
    ///
    /// Previously recorded values inside the region are replaced, occupants
    /// recorded there are dropped before the world's current ones are copied.
    pub fn ingest_from_world(&mut self, world: &WorldMap, region: Option<&PackedRegion>, timestamp: f64) {
        debug_assert_eq!(world.dimensions(), self.dimensions());
        if world.dimensions() != self.dimensions() {
            warn!(
                "world ingest skipped: world is {:?}, memory is {:?}",
                world.dimensions(),
                self.dimensions()
            );
            return;
        }

        let target = self.target(region);
        self.known = self.known.union(&target);

        let mut symbols: HashMap<char, Vec<Point>> = HashMap::new();
        let mut fgs: HashMap<Color, Vec<Point>> = HashMap::new();
        let mut bgs: HashMap<Color, Vec<Point>> = HashMap::new();
        for p in target.iter() {
            if let Some(glyph) = world.glyph_at(p) {
                symbols.entry(glyph.symbol).or_default().push(p);
                fgs.entry(glyph.foreground).or_default().push(p);
                bgs.entry(glyph.background).or_default().push(p);
            }
        }

        let stamp = self.next_stamp();
        let (w, h) = (self.width, self.height);

        strip(&mut self.terrain, &target);
        for (symbol, cells) in symbols {
            add_cells(&mut self.terrain, symbol, &PackedRegion::pack(w, h, cells), stamp);
        }

        strip(&mut self.foreground, &target);
        for (color, cells) in fgs {
            add_cells(&mut self.foreground, color, &PackedRegion::pack(w, h, cells), stamp);
        }

        strip(&mut self.background, &target);
        for (color, cells) in bgs {
            add_cells(&mut self.background, color, &PackedRegion::pack(w, h, cells), stamp);
        }

        for p in self.occupants.points_within(&target) {
            self.occupants.clear_at(p);
        }
        for p in world.occupants().points_within(&target) {
            for entity in world.occupants().at(p) {
                self.occupants.place(*entity, p);
            }
        }

        if timestamp > self.last_synced {
            self.last_synced = timestamp;
        }
    }

    /// Merges `other`'s knowledge inside `region` into this map.
    ///
    /// Returns `false` when skipped: our data is strictly newer and
    /// `ignore_timestamps` is off. Known cells and buckets only grow;
    /// occupant records at cells `other` has occupants for are overwritten.
    pub fn ingest_from_known_map(
        &mut self,
        other: &KnownMap,
        region: Option<&PackedRegion>,
        ignore_timestamps: bool,
    ) -> bool {
        if !ignore_timestamps && self.last_synced > other.last_synced {
            return false;
        }

        debug_assert_eq!(other.dimensions(), self.dimensions());
        if other.dimensions() != self.dimensions() {
            warn!(
                "peer merge skipped: source is {:?}, target is {:?}",
                other.dimensions(),
                self.dimensions()
            );
            return false;
        }

        let target = self.target(region);
        self.known = self.known.union(&other.known.intersect(&target));

        // Replay the source's buckets oldest first so its own recency order survives.
        for (symbol, cells) in by_recency(&other.terrain) {
            let stamp = self.next_stamp();
            add_cells(&mut self.terrain, symbol, &cells.intersect(&target), stamp);
        }
        for (color, cells) in by_recency(&other.foreground) {
            let stamp = self.next_stamp();
            add_cells(&mut self.foreground, color, &cells.intersect(&target), stamp);
        }
        for (color, cells) in by_recency(&other.background) {
            let stamp = self.next_stamp();
            add_cells(&mut self.background, color, &cells.intersect(&target), stamp);
        }

        let points = other.occupants.points_within(&target);
        for p in &points {
            self.occupants.clear_at(*p);
        }
        for p in points {
            for entity in other.occupants.at(p) {
                self.occupants.place(*entity, p);
            }
        }

        if other.last_synced > self.last_synced {
            self.last_synced = other.last_synced;
        }
        true
    }

    /// Forces this map to agree with `team` inside `region`.
    ///
    /// Cells the team does not know become unknown here, cells it does know
    /// take the team's values. Memory outside `region` is untouched.
    pub fn restrict_from_team(&mut self, team: &KnownMap, region: &PackedRegion) {
        debug_assert_eq!(team.dimensions(), self.dimensions());
        debug_assert_eq!(region.dimensions(), self.dimensions());
        if team.dimensions() != self.dimensions() {
            warn!(
                "team restriction skipped: team map is {:?}, memory is {:?}",
                team.dimensions(),
                self.dimensions()
            );
            return;
        }

        self.known = self
            .known
            .subtract(region)
            .union(&team.known.intersect(region));

        strip(&mut self.terrain, region);
        strip(&mut self.foreground, region);
        strip(&mut self.background, region);

        for (symbol, cells) in by_recency(&team.terrain) {
            let stamp = self.next_stamp();
            add_cells(&mut self.terrain, symbol, &cells.intersect(region), stamp);
        }
        for (color, cells) in by_recency(&team.foreground) {
            let stamp = self.next_stamp();
            add_cells(&mut self.foreground, color, &cells.intersect(region), stamp);
        }
        for (color, cells) in by_recency(&team.background) {
            let stamp = self.next_stamp();
            add_cells(&mut self.background, color, &cells.intersect(region), stamp);
        }

        for p in self.occupants.points_within(region) {
            self.occupants.clear_at(p);
        }
        for p in team.occupants.points_within(region) {
            for entity in team.occupants.at(p) {
                self.occupants.place(*entity, p);
            }
        }
    }

    /// Records `entity` at `p`, moving it if it was recorded elsewhere.
    pub fn place_occupant(&mut self, entity: Entity, p: Point) {
        self.occupants.place(entity, p);
    }

    pub fn is_known(&self, p: Point) -> bool {
        self.known.contains(p)
    }

    pub fn known_region(&self) -> &PackedRegion {
        &self.known
    }

    pub fn terrain_region(&self, symbol: char) -> Option<&PackedRegion> {
        self.terrain.get(&symbol).map(|b| &b.region)
    }

    pub fn foreground_region(&self, color: Color) -> Option<&PackedRegion> {
        self.foreground.get(&color).map(|b| &b.region)
    }

    pub fn background_region(&self, color: Color) -> Option<&PackedRegion> {
        self.background.get(&color).map(|b| &b.region)
    }

    pub fn symbols(&self) -> Vec<char> {
        let mut symbols: Vec<char> = self.terrain.keys().copied().collect();
        symbols.sort();
        symbols
    }

    pub fn occupants(&self) -> &Occupants {
        &self.occupants
    }

    /// Logical game-clock time of the newest world ingest this map has seen.
    pub fn last_synced(&self) -> f64 {
        self.last_synced
    }

    pub fn into_parts(self) -> KnownMapParts {
        let mut occupants: Vec<(Entity, Point)> = self.occupants.iter().collect();
        occupants.sort();

        KnownMapParts {
            width: self.width,
            height: self.height,
            terrain: by_recency(&self.terrain)
                .into_iter()
                .map(|(k, r)| (k, r.clone()))
                .collect(),
            foreground: by_recency(&self.foreground)
                .into_iter()
                .map(|(k, r)| (k, r.clone()))
                .collect(),
            background: by_recency(&self.background)
                .into_iter()
                .map(|(k, r)| (k, r.clone()))
                .collect(),
            known: self.known,
            occupants,
            last_synced: self.last_synced,
        }
    }

    /// Rebuilds a map; later entries in each bucket list count as more recent.
    pub fn from_parts(parts: KnownMapParts) -> Self {
        let mut map = KnownMap::new(parts.width, parts.height);
        map.known = parts.known;

        for (symbol, cells) in parts.terrain {
            let stamp = map.next_stamp();
            add_cells(&mut map.terrain, symbol, &cells, stamp);
        }
        for (color, cells) in parts.foreground {
            let stamp = map.next_stamp();
            add_cells(&mut map.foreground, color, &cells, stamp);
        }
        for (color, cells) in parts.background {
            let stamp = map.next_stamp();
            add_cells(&mut map.background, color, &cells, stamp);
        }
        for (entity, p) in parts.occupants {
            map.occupants.place(entity, p);
        }

        map.last_synced = parts.last_synced;
        map
    }
}

impl PartialEq for KnownMap {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.known == other.known
            && same_content(&self.terrain, &other.terrain)
            && same_content(&self.foreground, &other.foreground)
            && same_content(&self.background, &other.background)
            && self.occupants == other.occupants
            && self.last_synced == other.last_synced
    }
}

impl MapView for KnownMap {
    fn width(&self) -> u16 {
        self.width
    }

    fn height(&self) -> u16 {
        self.height
    }

    fn get_map_at(&self, p: Point) -> Option<char> {
        if !self.is_known(p) {
            return None;
        }
        lookup(&self.terrain, p)
    }

    fn get_color_at(&self, p: Point) -> Option<(Color, Color)> {
        if !self.is_known(p) {
            return None;
        }
        Some((lookup(&self.foreground, p)?, lookup(&self.background, p)?))
    }

    fn get_entities_at(&self, p: Point) -> Vec<Entity> {
        self.occupants.at(p).to_vec()
    }

    fn get_entities_near(&self, p: Point, radius: u16) -> Vec<Entity> {
        self.occupants.near(p, radius, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::glyphs::Glyph;

    fn floor(width: u16, height: u16) -> WorldMap {
        WorldMap::filled(width, height, Glyph::plain('.'), '#')
    }

    fn only(p: Point) -> PackedRegion {
        PackedRegion::pack(10, 10, [p])
    }

    #[test]
    fn world_ingest_is_idempotent() {
        let mut world = floor(10, 10);
        world.set_glyph(Point::new(3, 3), Glyph::plain('#'));
        world.set_occupant(Entity(1), Point::new(2, 2));

        let mut known = KnownMap::new(10, 10);
        known.ingest_from_world(&world, None, 1.0);
        let once = known.clone();
        known.ingest_from_world(&world, None, 1.0);

        assert_eq!(known, once);
        assert_eq!(known.get_map_at(Point::new(3, 3)), Some('#'));
        assert_eq!(known.get_entities_at(Point::new(2, 2)), vec![Entity(1)]);
    }

    #[test]
    fn world_ingest_replaces_values_inside_region() {
        let mut world = floor(10, 10);
        let mut known = KnownMap::new(10, 10);
        known.ingest_from_world(&world, None, 1.0);

        world.set_glyph(Point::new(5, 5), Glyph::plain('#'));
        known.ingest_from_world(&world, Some(&only(Point::new(5, 5))), 2.0);

        assert_eq!(known.get_map_at(Point::new(5, 5)), Some('#'));
        assert!(!known.terrain_region('.').unwrap().contains(Point::new(5, 5)));
        assert_eq!(known.last_synced(), 2.0);
    }

    #[test]
    fn world_ingest_moves_occupants_only_inside_region() {
        let mut world = floor(10, 10);
        world.set_occupant(Entity(4), Point::new(1, 1));
        let mut known = KnownMap::new(10, 10);
        known.ingest_from_world(&world, None, 1.0);

        world.set_occupant(Entity(4), Point::new(6, 6));
        known.ingest_from_world(&world, Some(&only(Point::new(1, 1))), 2.0);
        assert!(known.get_entities_at(Point::new(1, 1)).is_empty());
        assert!(known.get_entities_at(Point::new(6, 6)).is_empty());

        known.ingest_from_world(&world, Some(&only(Point::new(6, 6))), 3.0);
        assert_eq!(known.get_entities_at(Point::new(6, 6)), vec![Entity(4)]);
    }

    #[test]
    fn older_peers_are_ignored_unless_forced() {
        let world = floor(10, 10);
        let mut newer = KnownMap::new(10, 10);
        newer.ingest_from_world(&world, Some(&only(Point::new(0, 0))), 5.0);
        let mut older = KnownMap::new(10, 10);
        older.ingest_from_world(&world, Some(&only(Point::new(9, 9))), 3.0);

        let before = newer.clone();
        assert!(!newer.ingest_from_known_map(&older, None, false));
        assert_eq!(newer, before);

        assert!(newer.ingest_from_known_map(&older, None, true));
        assert!(newer.is_known(Point::new(9, 9)));
        assert_eq!(newer.last_synced(), 5.0);
    }

    #[test]
    fn equal_timestamps_still_merge() {
        let world = floor(10, 10);
        let mut a = KnownMap::new(10, 10);
        a.ingest_from_world(&world, Some(&only(Point::new(0, 0))), 2.0);
        let mut b = KnownMap::new(10, 10);
        b.ingest_from_world(&world, Some(&only(Point::new(1, 0))), 2.0);

        assert!(a.ingest_from_known_map(&b, None, false));
        assert_eq!(a.known_region().count(), 2);
    }

    #[test]
    fn peer_merges_never_forget() {
        let world = floor(10, 10);
        let mut target = KnownMap::new(10, 10);
        target.ingest_from_world(&world, Some(&only(Point::new(0, 0))), 1.0);
        let mut source = KnownMap::new(10, 10);
        source.ingest_from_world(&world, None, 2.0);

        target.ingest_from_known_map(&source, Some(&only(Point::new(5, 5))), false);
        assert_eq!(target.known_region().count(), 2);
        assert!(target.is_known(Point::new(0, 0)));
        assert_eq!(target.last_synced(), 2.0);
    }

    #[test]
    fn lookups_prefer_the_latest_merge() {
        let mut walls = floor(10, 10);
        walls.set_glyph(Point::new(1, 1), Glyph::plain('#'));
        let floors = floor(10, 10);

        let mut a = KnownMap::new(10, 10);
        a.ingest_from_world(&walls, Some(&only(Point::new(1, 1))), 1.0);
        let mut b = KnownMap::new(10, 10);
        b.ingest_from_world(&floors, Some(&only(Point::new(1, 1))), 2.0);

        let mut team = KnownMap::new(10, 10);
        team.ingest_from_known_map(&a, None, false);
        team.ingest_from_known_map(&b, None, false);

        assert!(team.terrain_region('#').unwrap().contains(Point::new(1, 1)));
        assert!(team.terrain_region('.').unwrap().contains(Point::new(1, 1)));
        assert_eq!(team.get_map_at(Point::new(1, 1)), Some('.'));
    }

    #[test]
    fn restriction_matches_team_inside_region_only() {
        let world = floor(10, 10);
        let mut team = KnownMap::new(10, 10);
        team.ingest_from_world(&world, Some(&only(Point::new(2, 2))), 1.0);

        let mut agent = KnownMap::new(10, 10);
        agent.ingest_from_world(&world, None, 1.0);

        let horizon = PackedRegion::from_predicate(10, 10, |p| p.x < 5);
        agent.restrict_from_team(&team, &horizon);

        assert!(agent.is_known(Point::new(2, 2)));
        assert!(!agent.is_known(Point::new(3, 3)));
        assert_eq!(agent.get_map_at(Point::new(3, 3)), None);
        assert!(agent.is_known(Point::new(7, 7)));
        assert_eq!(agent.known_region().count(), 51);
    }

    #[test]
    fn resize_forgets_everything() {
        let world = floor(10, 10);
        let mut known = KnownMap::new(10, 10);
        known.ingest_from_world(&world, None, 3.0);
        known.resize(4, 4);

        assert_eq!(known.dimensions(), (4, 4));
        assert!(known.known_region().is_empty());
        assert!(known.symbols().is_empty());
        assert_eq!(known.last_synced(), 0.0);
    }

    #[test]
    fn parts_rebuild_an_equal_map() {
        let mut world = floor(10, 10);
        world.set_glyph(Point::new(4, 4), Glyph::plain('#'));
        world.set_occupant(Entity(2), Point::new(1, 1));
        let mut known = KnownMap::new(10, 10);
        known.ingest_from_world(&world, None, 4.0);

        let rebuilt = KnownMap::from_parts(known.clone().into_parts());
        assert_eq!(rebuilt, known);
    }
}
