//! ---------------------------------------------------------------------------
//! Software (CPU) column renderer
//!
//! * Fills an internal `Vec<u32>` frame-buffer in **0xAARRGGBB** format.
//! * Walls arrive one column at a time; sprites arrive far-to-near and are
//!   clipped per column against the wall depth buffer.
//! ---------------------------------------------------------------------------

use crate::{
    engine::DepthBuffer,
    renderer::{Renderer, Rgba, VisSprite, WallSpan, modulate},
    world::{TEX_HEIGHT, Texture},
};

/// Column renderer into a private scratch buffer.
#[derive(Default)]
pub struct Software {
    scratch: Vec<Rgba>,
    width: usize,
    height: usize,
}

impl Software {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pixel at `(x, y)` of the frame being built.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.scratch[y * self.width + x])
    }

    #[inline]
    fn put(&mut self, x: usize, y: usize, c: Rgba) {
        self.scratch[y * self.width + x] = c | 0xFF00_0000;
    }
}

/*──────────────────────── Renderer trait impl ────────────────────────*/
impl Renderer for Software {
    fn begin_frame(&mut self, w: usize, h: usize, ceiling: Rgba, floor: Rgba) {
        // (re)allocate if resolution changed
        if w != self.width || h != self.height {
            self.width = w;
            self.height = h;
            self.scratch.resize(w * h, 0);
        }

        let split = (h / 2) * w;
        self.scratch[..split].fill(ceiling);
        self.scratch[split..].fill(floor);
    }

    fn draw_wall(&mut self, span: &WallSpan, atlas: &Texture) {
        if span.x >= self.width || span.line_h <= 0.0 {
            return;
        }
        let u = (span.tex_origin.x + span.tex_x) as usize;
        let y_end = span.y_end.min(self.height);
        let max_v = TEX_HEIGHT as u32 - 1;

        for y in span.y_start..y_end {
            let v = ((y as f32 - span.top) / span.line_h * TEX_HEIGHT as f32).max(0.0) as u32;
            let texel = atlas.pixel(u, (span.tex_origin.y + v.min(max_v)) as usize);
            self.put(span.x, y, modulate(texel, span.shade));
        }
    }

    fn draw_sprite(&mut self, spr: &VisSprite, sheet: &Texture, depth: &DepthBuffer) {
        if spr.width <= 0.0 || spr.height <= 0.0 || spr.tex_size.x == 0 || spr.tex_size.y == 0 {
            return;
        }
        let x_end = spr.x_end.min(self.width);
        let y_start = spr.top.max(0.0) as usize;
        let y_end = (spr.top + spr.height).clamp(0.0, self.height as f32) as usize;
        let (max_u, max_v) = (spr.tex_size.x - 1, spr.tex_size.y - 1);

        for x in spr.x_start..x_end {
            if depth.occludes(x, spr.depth) {
                continue;
            }
            let u = ((x as f32 - spr.left) * spr.tex_size.x as f32 / spr.width).max(0.0) as u32;
            let u = (spr.tex_origin.x + u.min(max_u)) as usize;

            for y in y_start..y_end {
                let v = ((y as f32 - spr.top) * spr.tex_size.y as f32 / spr.height).max(0.0) as u32;
                let texel = sheet.pixel(u, (spr.tex_origin.y + v.min(max_v)) as usize);
                if texel >> 24 == 0 {
                    continue;
                }
                self.put(x, y, modulate(texel, spr.shade));
            }
        }
    }

    fn end_frame<F>(&mut self, submit: F)
    where
        F: FnOnce(&[Rgba], usize, usize),
    {
        submit(&self.scratch, self.width, self.height);
    }
}

/*──────────────────────────────── Tests ───────────────────────────────*/
