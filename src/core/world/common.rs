use bitmaps::Bitmap;
use serde::{Deserialize, Serialize};
use sparseset::SparseSet;

pub const STORAGE_SIZE: usize = 512;

pub type WorldBitmap = Bitmap<STORAGE_SIZE>;

#[derive(Clone, Copy, Eq, Hash, PartialEq, Ord, PartialOrd, Debug, Serialize, Deserialize)]
pub struct Entity(pub usize);

/// One component kind: values indexed by entity slot plus a presence mask for queries.
pub struct Column<T> {
    values: SparseSet<T>,
    present: WorldBitmap,
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Column {
            values: SparseSet::with_capacity(STORAGE_SIZE),
            present: WorldBitmap::new(),
        }
    }
}

impl<T> Column<T> {
    pub fn insert(&mut self, entity: Entity, value: T) {
        assert!(entity.0 < STORAGE_SIZE);
        self.values.insert(entity.0, value);
        self.present.set(entity.0, true);
    }

    pub fn remove(&mut self, entity: Entity) -> Option<T> {
        if !self.contains(entity) {
            return None;
        }

        self.present.set(entity.0, false);
        self.values.remove(entity.0)
    }

    pub fn contains(&self, entity: Entity) -> bool {
        entity.0 < STORAGE_SIZE && self.present.get(entity.0)
    }

    pub fn get(&self, entity: Entity) -> Option<&T> {
        if self.contains(entity) {
            self.values.get(entity.0)
        } else {
            None
        }
    }

    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        if self.contains(entity) {
            self.values.get_mut(entity.0)
        } else {
            None
        }
    }

    pub fn mask(&self) -> &WorldBitmap {
        &self.present
    }

    pub fn len(&self) -> usize {
        self.present.len()
    }

    pub fn is_empty(&self) -> bool {
        self.present.is_empty()
    }
}

pub fn indices(bits: &WorldBitmap) -> Vec<Entity> {
    let mut result = Vec::with_capacity(bits.len());
    let mut next = bits.first_index();
    while let Some(index) = next {
        result.push(Entity(index));
        next = bits.next_index(index);
    }
    result
}
