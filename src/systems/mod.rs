pub mod fov;
pub mod location_sync;
pub mod movement;
pub mod pathing;
pub mod schedule;
pub mod sharing;
pub mod snapshot;

pub use schedule::{run_tick, Schedule, TickReport};
