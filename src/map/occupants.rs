use crate::core::point::Point;
use crate::core::world::Entity;
use crate::map::region::PackedRegion;
use multimap::MultiMap;
use std::collections::HashMap;

/// Bidirectional index: every entity sits on exactly one cell, a cell may hold many.
#[derive(Clone, Debug, Default)]
pub struct Occupants {
    by_entity: HashMap<Entity, Point>,
    by_point: MultiMap<Point, Entity>,
}

impl PartialEq for Occupants {
    fn eq(&self, other: &Self) -> bool {
        self.by_entity == other.by_entity
    }
}

impl Occupants {
    /// Moves `entity` to `p`, leaving whatever cell it occupied before.
    pub fn place(&mut self, entity: Entity, p: Point) {
        if let Some(previous) = self.by_entity.insert(entity, p) {
            if previous == p {
                return;
            }
            self.detach(entity, previous);
        }
        self.by_point.insert(p, entity);
    }

    pub fn remove(&mut self, entity: Entity) -> Option<Point> {
        let previous = self.by_entity.remove(&entity)?;
        self.detach(entity, previous);
        Some(previous)
    }

    fn detach(&mut self, entity: Entity, p: Point) {
        let now_empty = match self.by_point.get_vec_mut(&p) {
            Some(list) => {
                list.retain(|e| *e != entity);
                list.is_empty()
            }
            None => false,
        };

        if now_empty {
            self.by_point.remove(&p);
        }
    }

    /// Empties the cell, returning the evicted entities.
    pub fn clear_at(&mut self, p: Point) -> Vec<Entity> {
        let evicted = self.by_point.remove(&p).unwrap_or_default();
        for e in &evicted {
            self.by_entity.remove(e);
        }
        evicted
    }

    pub fn clear(&mut self) {
        self.by_entity.clear();
        self.by_point.clear();
    }

    pub fn at(&self, p: Point) -> &[Entity] {
        match self.by_point.get_vec(&p) {
            Some(list) => list.as_slice(),
            None => &[],
        }
    }

    pub fn location(&self, entity: Entity) -> Option<Point> {
        self.by_entity.get(&entity).copied()
    }

    pub fn len(&self) -> usize {
        self.by_entity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_entity.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.by_point.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Entity, Point)> + '_ {
        self.by_entity.iter().map(|(e, p)| (*e, *p))
    }

    pub fn region(&self, width: u16, height: u16) -> PackedRegion {
        PackedRegion::pack(width, height, self.points())
    }

    /// Occupied cells that fall inside `region`, without scanning the whole grid.
    pub fn points_within(&self, region: &PackedRegion) -> Vec<Point> {
        let mut points: Vec<Point> = self.points().filter(|p| region.contains(*p)).collect();
        points.sort();
        points
    }

    /// Entities within `radius` (Chebyshev) of `p` on a `width` x `height` grid.
    pub fn near(&self, p: Point, radius: u16, width: u16, height: u16) -> Vec<Entity> {
        let area = PackedRegion::pack(width, height, [p]).expand8way(radius);
        let mut found = Vec::new();
        for cell in self.points_within(&area) {
            found.extend_from_slice(self.at(cell));
        }
        found.sort();
        found
    }
}
