//! Per-frame pipeline: cast a ray per column, shade walls, project sprites.

pub mod depth;
pub mod edit;
#[allow(clippy::module_inception)]
pub mod engine;
pub mod raycast;
pub mod sprites;
pub mod types;
pub mod walls;

pub use depth::DepthBuffer;
pub use edit::USE_REACH;
pub use engine::{DOOR_SOUND, Engine};
pub use raycast::{DOOR_INSET, RayHit, RayMarcher, Side};
pub use sprites::project;
pub use types::Screen;
pub use walls::{Y_SIDE_SHADE, shade_column};
