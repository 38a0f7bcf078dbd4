//! Yet Another Ray Caster: a Wolfenstein-style tile renderer.
//!
//! * [`world`]: tile grid, doors, sprites, viewer, textures.
//! * [`engine`]: ray marching, wall shading, sprite projection, editing.
//! * [`renderer`]: the [`Renderer`](renderer::Renderer) trait and a CPU
//!   implementation.
//! * [`map`]: the RCM map file format.

pub mod audio;
pub mod defs;
pub mod engine;
pub mod map;
pub mod renderer;
pub mod sim;
pub mod world;
