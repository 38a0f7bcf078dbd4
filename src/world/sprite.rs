use std::f32::consts::{PI, TAU};

use glam::{UVec2, Vec2, uvec2, vec2};

use super::texture::TextureId;
use crate::sim::Animation;

/// Guards the facing calculation when the viewer stands on the sprite.
const FACING_EPS: f32 = 1e-7;

/// How a sprite picks its sheet column.
#[derive(Clone, Debug, PartialEq)]
pub enum Appearance {
    /// Single frame in column 0.
    Still,
    /// Column = current frame value − 1.
    Animated(Animation),
}

/// Source rectangle inside a sprite sheet (texels).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TexRect {
    pub origin: UVec2,
    pub size: UVec2,
}

/// World-space billboard. Owned by the [`Level`](super::Level); the renderer
/// only reads it.
#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub pos: Vec2,
    forward: Vec2,
    /// Fraction of wall height the sprite occupies.
    pub scale: f32,
    /// Vertical anchor in `[0, 1]`: 0 = standing on the floor.
    pub float_height: f32,
    /// Pixel size of one frame in the sheet.
    pub size: UVec2,
    pub texture: TextureId,
    pub appearance: Appearance,
    pub directional: bool,
    facing: u8,
}

impl Sprite {
    pub fn new(texture: TextureId, size: UVec2, pos: Vec2, scale: f32, float_height: f32) -> Self {
        Self {
            pos,
            forward: vec2(0.0, -1.0),
            scale,
            float_height,
            size,
            texture,
            appearance: Appearance::Still,
            directional: false,
            facing: 0,
        }
    }

    /// Attach an animation and start it.
    pub fn with_animation(mut self, mut anim: Animation) -> Self {
        anim.clock.play();
        self.appearance = Appearance::Animated(anim);
        self
    }

    pub fn with_directional(mut self, directional: bool) -> Self {
        self.directional = directional;
        self
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        self.forward
    }

    /// Set facing direction; zero vectors are ignored.
    pub fn set_forward(&mut self, dir: Vec2) {
        if let Some(f) = dir.try_normalize() {
            self.forward = f;
        }
    }

    /// 8-way facing bucket last computed by [`Sprite::update_facing`].
    #[inline]
    pub fn facing(&self) -> u8 {
        self.facing
    }

    #[inline]
    pub fn is_animated(&self) -> bool {
        matches!(self.appearance, Appearance::Animated(_))
    }

    pub fn update_facing(&mut self, viewer: Vec2) {
        if self.directional {
            self.facing = facing_bucket(self.forward, viewer - self.pos);
        }
    }

    /// Per-frame update: facing toward `viewer`, then animation time.
    pub fn tick(&mut self, dt: f32, viewer: Vec2) {
        self.update_facing(viewer);
        if let Appearance::Animated(anim) = &mut self.appearance {
            anim.advance(dt);
        }
    }

    /// Frame rectangle: column from the animation, row from the facing.
    pub fn source_rect(&self) -> TexRect {
        let col = match &self.appearance {
            Appearance::Still => 0,
            Appearance::Animated(a) => a.current().unwrap_or(1).saturating_sub(1) as u32,
        };
        let row = if self.directional { self.facing as u32 } else { 0 };
        TexRect {
            origin: uvec2(col * self.size.x, row * self.size.y),
            size: self.size,
        }
    }
}

/// Which of eight sheet rows to show, given the sprite's `forward` and the
/// vector from the sprite to the viewer.
///
/// Row 4 is the front view (viewer straight ahead), row 0 the back.
pub fn facing_bucket(forward: Vec2, to_viewer: Vec2) -> u8 {
    let d = to_viewer / (to_viewer.length() + FACING_EPS);
    let signed = forward.perp_dot(d).atan2(forward.dot(d));
    let ang = signed + PI;
    ((8.0 * (ang + PI / 8.0) / TAU).floor() as i32).rem_euclid(8) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_front_back_and_sides() {
        let f = vec2(0.0, -1.0);
        assert_eq!(facing_bucket(f, vec2(0.0, -5.0)), 4);
        assert_eq!(facing_bucket(f, vec2(0.0, 5.0)), 0);
        let left = facing_bucket(f, vec2(-5.0, 0.0));
        let right = facing_bucket(f, vec2(5.0, 0.0));
        assert_ne!(left, right);
        assert_eq!((left + right) % 8, 0, "sides mirror around the back view");
    }

    #[test]
    fn facing_covers_all_eight_rows() {
        let f = vec2(1.0, 0.0);
        let mut seen = [false; 8];
        for i in 0..64 {
            let a = i as f32 * TAU / 64.0;
            seen[facing_bucket(f, Vec2::from_angle(a)) as usize] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn viewer_on_top_of_sprite_is_finite() {
        let b = facing_bucket(vec2(0.0, -1.0), Vec2::ZERO);
        assert!(b < 8);
    }

    #[test]
    fn source_rect_uses_frame_and_facing() {
        let anim = Animation::new(3.0, [1, 2], true);
        let mut s = Sprite::new(1, uvec2(23, 32), vec2(5.0, 5.0), 0.4, 0.0)
            .with_animation(anim)
            .with_directional(true);
        assert_eq!(s.source_rect().origin, uvec2(0, 0));

        s.tick(0.34, vec2(5.0, 1.0)); // viewer straight ahead, frame 2
        assert_eq!(s.facing(), 4);
        assert_eq!(s.source_rect().origin, uvec2(23, 4 * 32));
    }

    #[test]
    fn non_directional_ignores_viewer() {
        let mut s = Sprite::new(1, uvec2(8, 8), Vec2::ZERO, 1.0, 0.0);
        s.tick(0.1, vec2(0.0, 3.0));
        assert_eq!(s.facing(), 0);
        assert_eq!(s.source_rect().origin, UVec2::ZERO);
    }

    #[test]
    fn zero_forward_is_ignored() {
        let mut s = Sprite::new(1, uvec2(8, 8), Vec2::ZERO, 1.0, 0.0);
        s.set_forward(Vec2::ZERO);
        assert_eq!(s.forward(), vec2(0.0, -1.0));
        s.set_forward(vec2(3.0, 0.0));
        assert_eq!(s.forward(), vec2(1.0, 0.0));
    }
}
