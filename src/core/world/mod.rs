mod common;

pub use common::*;

use crate::error::{FogboundError, Result};
use crate::gameplay::{
    Destination, FieldOfView, MapSharing, Memory, MovementList, Positioned, Radio, TeamMember,
    Visible,
};
use log::debug;

/// Arena of agent components. Entity slots are recycled; a recycled slot starts empty.
#[derive(Default)]
pub struct World {
    next_entity: usize,
    recycled: Vec<Entity>,
    alive: WorldBitmap,
    despawned: Vec<Entity>,
    pub positions: Column<Positioned>,
    pub glyphs: Column<Visible>,
    pub sight: Column<FieldOfView>,
    pub radios: Column<Radio>,
    pub sharing: Column<MapSharing>,
    pub memories: Column<Memory>,
    pub members: Column<TeamMember>,
    pub movements: Column<MovementList>,
    pub destinations: Column<Destination>,
}

impl World {
    pub fn spawn(&mut self) -> Result<Entity> {
        let entity = match self.recycled.pop() {
            Some(entity) => entity,
            None if self.next_entity < STORAGE_SIZE => {
                let entity = Entity(self.next_entity);
                self.next_entity += 1;
                entity
            }
            None => return Err(FogboundError::WorldFull(STORAGE_SIZE)),
        };

        self.clear_slot(entity);
        self.alive.set(entity.0, true);
        debug!("Spawning new entity {:?}", entity);
        Ok(entity)
    }

    pub fn despawn(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }

        self.clear_slot(entity);
        self.alive.set(entity.0, false);
        self.recycled.push(entity);
        self.despawned.push(entity);
        debug!("Despawned entity {:?}", entity);
        true
    }

    pub fn is_alive(&self, entity: Entity) -> bool {
        entity.0 < STORAGE_SIZE && self.alive.get(entity.0)
    }

    pub fn entities(&self) -> Vec<Entity> {
        indices(&self.alive)
    }

    pub fn len(&self) -> usize {
        self.alive.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Live entities holding every component whose mask is given.
    pub fn query(&self, masks: &[&WorldBitmap]) -> Vec<Entity> {
        let mut bits = self.alive;
        for mask in masks {
            bits &= **mask;
        }
        indices(&bits)
    }

    /// Entities despawned since the last call, so location sync can evict them.
    pub fn drain_despawned(&mut self) -> Vec<Entity> {
        std::mem::take(&mut self.despawned)
    }

    fn clear_slot(&mut self, entity: Entity) {
        self.positions.remove(entity);
        self.glyphs.remove(entity);
        self.sight.remove(entity);
        self.radios.remove(entity);
        self.sharing.remove(entity);
        self.memories.remove(entity);
        self.members.remove(entity);
        self.movements.remove(entity);
        self.destinations.remove(entity);
    }
}
