mod camera;
mod doors;
mod grid;
mod level;
mod sprite;
mod texture;

pub use camera::{CROUCHING_EYE, DEFAULT_FOV_DEG, STANDING_EYE, Viewer};
pub use doors::{DOOR_SLIDE_TIME, DoorPhase, DoorState};
pub use grid::{Cell, CellFlags, Face, FaceIndexError, Grid, MAX_FACE};
pub use level::{DEFAULT_CEILING, DEFAULT_FLOOR, Level, Thing};
pub use sprite::{Appearance, Sprite, TexRect, facing_bucket};
pub use texture::{
    Atlas, NO_TEXTURE, TEX_HEIGHT, TEX_WIDTH, Texture, TextureBank, TextureError, TextureId,
};
