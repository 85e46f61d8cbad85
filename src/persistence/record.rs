use crate::core::colors::Color;
use crate::core::point::Point;
use crate::core::thread_safety::ThreadSafe;
use crate::error::{FogboundError, Result};
use crate::map::known_map::{KnownMap, KnownMapParts};
use crate::map::region::PackedRegion;
use crate::persistence::codec::{decode_region, encode_region};
use crate::persistence::references::{EntityRef, ReferenceRegistry};
use ron::ser::PrettyConfig;
use serde::{Deserialize, Serialize};

/// Compact, serializable form of a [`KnownMap`]. Buckets are listed oldest
/// first; characters key terrain, color literals key colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KnownMapRecord {
    pub width: u16,
    pub height: u16,
    pub known: String,
    pub terrain: Vec<(char, String)>,
    pub foreground: Vec<(String, String)>,
    pub background: Vec<(String, String)>,
    pub occupants: Vec<(EntityRef, Point)>,
    pub last_synced: f64,
}

fn encode_colors(buckets: &[(Color, PackedRegion)]) -> Vec<(String, String)> {
    buckets
        .iter()
        .map(|(color, cells)| (color.to_literal(), encode_region(cells)))
        .collect()
}

impl KnownMapRecord {
    pub fn capture(map: &KnownMap) -> Self {
        let parts = map.clone().into_parts();

        KnownMapRecord {
            width: parts.width,
            height: parts.height,
            known: encode_region(&parts.known),
            terrain: parts
                .terrain
                .iter()
                .map(|(symbol, cells)| (*symbol, encode_region(cells)))
                .collect(),
            foreground: encode_colors(&parts.foreground),
            background: encode_colors(&parts.background),
            occupants: parts
                .occupants
                .iter()
                .map(|(entity, p)| (EntityRef::from(*entity), *p))
                .collect(),
            last_synced: parts.last_synced,
        }
    }

    pub fn to_ron(&self) -> Result<String> {
        Ok(ron::ser::to_string_pretty(self, PrettyConfig::new())?)
    }

    pub fn from_ron(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    fn decode_colors(&self, buckets: &[(String, String)]) -> Result<Vec<(Color, PackedRegion)>> {
        buckets
            .iter()
            .map(|(literal, cells)| {
                let color = Color::from_literal(literal)
                    .ok_or_else(|| FogboundError::ColorLiteral(literal.clone()))?;
                Ok((color, decode_region(self.width, self.height, cells)?))
            })
            .collect()
    }

    /// Rebuilds the map without occupants; those come back through
    /// [`KnownMapRecord::defer_occupants`] once entities are resolvable.
    pub fn restore(&self) -> Result<KnownMap> {
        let terrain = self
            .terrain
            .iter()
            .map(|(symbol, cells)| Ok((*symbol, decode_region(self.width, self.height, cells)?)))
            .collect::<Result<Vec<_>>>()?;

        Ok(KnownMap::from_parts(KnownMapParts {
            width: self.width,
            height: self.height,
            known: decode_region(self.width, self.height, &self.known)?,
            terrain,
            foreground: self.decode_colors(&self.foreground)?,
            background: self.decode_colors(&self.background)?,
            occupants: Vec::new(),
            last_synced: self.last_synced,
        }))
    }

    /// Queues one fix per recorded occupant that places it into `map` once
    /// its reference resolves.
    pub fn defer_occupants(&self, map: &ThreadSafe<KnownMap>, registry: &mut ReferenceRegistry) {
        for (reference, p) in &self.occupants {
            let map = map.clone();
            let p = *p;
            registry.defer(*reference, move |entity| map.write().place_occupant(entity, p));
        }
    }
}
