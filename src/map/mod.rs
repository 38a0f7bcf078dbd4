//! RCM map files: the on-disk codec ([`raw`]) and the loader that turns a
//! file into a ready-to-render [`Level`](crate::world::Level).

pub mod loader;
pub mod raw;

pub use loader::{
    blank_level, cell_centre, level_from_raw, level_to_raw, load_level, save_level, spawn_sprites,
};
pub use raw::{MapError, RawHeader, RawMap, RawThing};
