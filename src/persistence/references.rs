use crate::core::world::Entity;
use crate::error::{FogboundError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stable id an entity is saved under. Live [`Entity`] slots differ between runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityRef(pub u64);

impl From<Entity> for EntityRef {
    fn from(e: Entity) -> Self {
        EntityRef(e.0 as u64)
    }
}

pub type Fixup = Box<dyn FnMut(Entity) + Send>;

/// Entity references met while loading, resolved once the entities exist.
#[derive(Default)]
pub struct ReferenceRegistry {
    resolved: HashMap<EntityRef, Entity>,
    pending: Vec<(EntityRef, Fixup)>,
}

impl ReferenceRegistry {
    pub fn register(&mut self, reference: EntityRef, entity: Entity) {
        self.resolved.insert(reference, entity);
    }

    pub fn lookup(&self, reference: EntityRef) -> Option<Entity> {
        self.resolved.get(&reference).copied()
    }

    /// Queues `fix` to run with the entity behind `reference` on the next resolve.
    pub fn defer(&mut self, reference: EntityRef, fix: impl FnMut(Entity) + Send + 'static) {
        self.pending.push((reference, Box::new(fix)));
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Runs every fix whose reference is known by now. Fixes that still
    /// cannot run stay queued, and their count is reported as an error.
    pub fn resolve_pending(&mut self) -> Result<()> {
        let mut still_pending = Vec::new();

        for (reference, mut fix) in self.pending.drain(..) {
            match self.resolved.get(&reference) {
                Some(entity) => fix(*entity),
                None => still_pending.push((reference, fix)),
            }
        }

        self.pending = still_pending;
        if self.pending.is_empty() {
            Ok(())
        } else {
            debug!("{} entity reference(s) still pending", self.pending.len());
            Err(FogboundError::UnresolvedReferences {
                pending: self.pending.len(),
            })
        }
    }
}
