//! Rendering abstraction layer.
//!
//! *The rest of the engine never touches a pixel buffer directly.*
//! The engine shades each visible wall column into a [`WallSpan`] and each
//! visible sprite into a [`VisSprite`], then hands them to a type that
//! implements [`Renderer`].

use glam::UVec2;

use crate::{engine::DepthBuffer, world::Texture};

/// Pixel format of the software frame-buffer (0xAARRGGBB).
pub type Rgba = u32;

/// Distance at which fog reaches full black.
pub const FOG_DISTANCE: f32 = 25.0;

/// Opaque colour from 8-bit channels.
#[inline]
pub const fn rgb(r: u8, g: u8, b: u8) -> Rgba {
    0xFF00_0000 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Scale the colour channels by `factor / 255`; alpha is kept.
#[inline]
pub const fn modulate(c: Rgba, factor: u8) -> Rgba {
    let f = factor as u32;
    let r = ((c >> 16) & 0xFF) * f / 255;
    let g = ((c >> 8) & 0xFF) * f / 255;
    let b = (c & 0xFF) * f / 255;
    (c & 0xFF00_0000) | r << 16 | g << 8 | b
}

/// Linear distance fog: 255 at the eye, 0 at [`FOG_DISTANCE`] and beyond.
#[inline]
pub fn fog(dist: f32) -> u8 {
    (255.0 * (1.0 - dist / FOG_DISTANCE).max(0.0)) as u8
}

/// One shaded wall column.
///
/// Rows `y_start..y_end` are on screen; `top` and `line_h` describe the
/// whole (unclipped) wall so texture rows stay put when it is clipped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallSpan {
    pub x: usize,
    pub y_start: usize,
    pub y_end: usize,
    pub top: f32,
    pub line_h: f32,
    /// Top-left texel of the face's atlas cell.
    pub tex_origin: UVec2,
    /// Column inside the atlas cell (`0..TEX_WIDTH`).
    pub tex_x: u32,
    pub shade: u8,
}

/// A sprite after projection: screen footprint, depth, and which part of
/// its sheet to sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisSprite {
    /// Camera-space depth compared against the [`DepthBuffer`].
    pub depth: f32,
    /// Unclipped left edge and width (pixels).
    pub left: f32,
    pub width: f32,
    /// Unclipped top edge and height (pixels).
    pub top: f32,
    pub height: f32,
    /// Clipped column range.
    pub x_start: usize,
    pub x_end: usize,
    pub tex_origin: UVec2,
    pub tex_size: UVec2,
    pub shade: u8,
}

/// A renderer that owns an internal scratch buffer for the whole frame.
///
/// `end_frame` hands the finished buffer to a user-supplied closure.
/// Software callers typically forward it to their window-manager.
pub trait Renderer {
    /// (Re)allocate internal scratch for the requested resolution and paint
    /// the ceiling (upper half) and floor (lower half).
    fn begin_frame(&mut self, width: usize, height: usize, ceiling: Rgba, floor: Rgba);

    /// Rasterise one wall column sampled from the wall atlas.
    fn draw_wall(&mut self, span: &WallSpan, atlas: &Texture);

    /// Rasterise a sprite, skipping columns where `depth` holds a nearer
    /// wall and texels with zero alpha.
    fn draw_sprite(&mut self, sprite: &VisSprite, sheet: &Texture, depth: &DepthBuffer);

    /// Finish the frame and **loan** the finished buffer to `submit`.
    ///
    /// * `submit(&[Rgba], w, h)` is run exactly once per frame.
    /// * Software caller passes `|fb, w, h| window.update_with_buffer(fb, w, h)`.
    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize);
}

pub mod software;
pub use software::Software;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_is_opaque_argb() {
        assert_eq!(rgb(0x12, 0x34, 0x56), 0xFF_123456);
    }

    #[test]
    fn modulate_scales_channels_and_keeps_alpha() {
        assert_eq!(modulate(0x80_FF8040, 255), 0x80_FF8040);
        assert_eq!(modulate(0xFF_FF8040, 0), 0xFF_000000);
        assert_eq!(modulate(0xFF_FFFFFF, 170), 0xFF_AAAAAA);
    }

    #[test]
    fn fog_is_linear_and_clamped() {
        assert_eq!(fog(0.0), 255);
        assert_eq!(fog(12.5), 127);
        assert_eq!(fog(25.0), 0);
        assert_eq!(fog(400.0), 0);
    }
}
