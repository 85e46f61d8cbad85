use crate::core::world::{Entity, World};
use crate::error::{FogboundError, Result};
use crate::gameplay::components::Memory;
use crate::gameplay::sight::FieldOfView;
use crate::gameplay::{MapSharing, Positioned, Radio, TeamMember, Visible};
use crate::persistence::record::KnownMapRecord;
use crate::persistence::references::{EntityRef, ReferenceRegistry};
use log::debug;
use serde::{Deserialize, Serialize};

/// Encode/decode pair for one component kind, keyed by a stable name.
pub struct ComponentCodec {
    pub name: &'static str,
    pub has: fn(&World, Entity) -> bool,
    pub encode: fn(&World, Entity) -> Result<Vec<u8>>,
    pub decode: fn(&mut World, Entity, &[u8], &mut ReferenceRegistry) -> Result<()>,
}

macro_rules! serde_codec {
    ($name:literal, $column:ident, $ty:ty) => {
        ComponentCodec {
            name: $name,
            has: |world, entity| world.$column.contains(entity),
            encode: |world, entity| match world.$column.get(entity) {
                Some(value) => Ok(bincode::serialize(value)?),
                None => Err(FogboundError::NoSuchEntity(entity)),
            },
            decode: |world, entity, bytes, _| {
                let value: $ty = bincode::deserialize(bytes)?;
                world.$column.insert(entity, value);
                Ok(())
            },
        }
    };
}

pub static COMPONENT_CODECS: &[ComponentCodec] = &[
    serde_codec!("positioned", positions, Positioned),
    serde_codec!("visible", glyphs, Visible),
    serde_codec!("radio", radios, Radio),
    serde_codec!("map_sharing", sharing, MapSharing),
    serde_codec!("team_member", members, TeamMember),
    ComponentCodec {
        name: "field_of_view",
        has: |world, entity| world.sight.contains(entity),
        encode: |world, entity| match world.sight.get(entity) {
            Some(fov) => Ok(bincode::serialize(&fov.distance)?),
            None => Err(FogboundError::NoSuchEntity(entity)),
        },
        decode: |world, entity, bytes, _| {
            let distance: u16 = bincode::deserialize(bytes)?;
            world.sight.insert(entity, FieldOfView::new(distance));
            Ok(())
        },
    },
    ComponentCodec {
        name: "memory",
        has: |world, entity| world.memories.contains(entity),
        encode: |world, entity| match world.memories.get(entity) {
            Some(memory) => {
                let record = KnownMapRecord::capture(&memory.map.read());
                Ok(bincode::serialize(&record)?)
            }
            None => Err(FogboundError::NoSuchEntity(entity)),
        },
        decode: |world, entity, bytes, references| {
            let record: KnownMapRecord = bincode::deserialize(bytes)?;
            let memory = Memory::from_map(record.restore()?);
            record.defer_occupants(&memory.map, references);
            world.memories.insert(entity, memory);
            Ok(())
        },
    },
];

pub fn codec_for(name: &str) -> Option<&'static ComponentCodec> {
    COMPONENT_CODECS.iter().find(|codec| codec.name == name)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedComponent {
    pub name: String,
    pub payload: Vec<u8>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavedEntity {
    pub reference: EntityRef,
    pub components: Vec<SavedComponent>,
}

pub fn save_entity(world: &World, entity: Entity) -> Result<SavedEntity> {
    if !world.is_alive(entity) {
        return Err(FogboundError::NoSuchEntity(entity));
    }

    let mut components = Vec::new();
    for codec in COMPONENT_CODECS.iter().filter(|codec| (codec.has)(world, entity)) {
        components.push(SavedComponent {
            name: codec.name.to_string(),
            payload: (codec.encode)(world, entity)?,
        });
    }

    Ok(SavedEntity {
        reference: EntityRef::from(entity),
        components,
    })
}

/// Spawns the saved entity and registers it under its saved reference.
/// References it holds to other entities are queued on `references`.
pub fn load_entity(world: &mut World, saved: &SavedEntity, references: &mut ReferenceRegistry) -> Result<Entity> {
    for component in &saved.components {
        if codec_for(&component.name).is_none() {
            return Err(FogboundError::UnknownComponent(component.name.clone()));
        }
    }

    let entity = world.spawn()?;
    references.register(saved.reference, entity);

    for component in &saved.components {
        if let Some(codec) = codec_for(&component.name) {
            (codec.decode)(world, entity, &component.payload, references)?;
        }
    }

    debug!("loaded {:?} as {:?}", saved.reference, entity);
    Ok(entity)
}
