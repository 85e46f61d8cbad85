pub mod field;
pub mod fov;
pub mod graphs;
pub mod known_map;
pub mod occupants;
pub mod region;
pub mod shadow_casting;
pub mod stencil;
pub mod types;
pub mod view;
pub mod world_map;

pub use field::Field;
pub use fov::light_levels;
pub use graphs::{GridPathFinder, PathFinder};
pub use known_map::{KnownMap, KnownMapParts};
pub use occupants::Occupants;
pub use region::PackedRegion;
pub use stencil::{Rasterize, Stencil, StencilImpl};
pub use types::*;
pub use view::MapView;
pub use world_map::WorldMap;
