pub mod core;
pub mod error;
pub mod gameplay;
pub mod map;
pub mod persistence;
pub mod session;
pub mod systems;

pub use crate::core::colors::Color;
pub use crate::core::events::MapEvent;
pub use crate::core::glyphs::Glyph;
pub use crate::core::options::SightOptions;
pub use crate::core::point::{chebyshev, distance, Point};
pub use crate::core::world::{Entity, World};
pub use crate::error::{FogboundError, Result};
pub use crate::gameplay::{Team, TeamId, ViewSnapshot};
pub use crate::map::{KnownMap, MapView, PackedRegion, WorldMap};
pub use crate::session::{AgentSpec, Session};
pub use crate::systems::TickReport;
