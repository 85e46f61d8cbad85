pub mod components;
pub mod sight;
pub mod snapshot;
pub mod team;

pub use components::*;
pub use sight::{CompressedLight, FieldOfView};
pub use snapshot::{CellView, ViewSnapshot};
pub use team::{Team, TeamId};
