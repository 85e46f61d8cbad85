pub mod colors;
pub mod events;
pub mod glyphs;
pub mod options;
pub mod point;
pub mod thread_safety;
pub mod time;
pub mod workers;
pub mod world;
