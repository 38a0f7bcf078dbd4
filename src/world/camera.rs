use glam::{Vec2, vec2};

use super::level::Level;

/// Default horizontal field of view (degrees).
pub const DEFAULT_FOV_DEG: f32 = 65.0;
/// Eye height as a fraction of wall height.
pub const STANDING_EYE: f32 = 0.5;
pub const CROUCHING_EYE: f32 = 0.35;

/// First-person view-point on the tile grid.
///
/// * `forward` is a unit vector; `right` is perpendicular to it with
///   magnitude `tan(fov / 2)`, so `forward ± right` spans the view fan.
/// * `+y` points south on the map, so `forward = (0, -1)` looks north.
#[derive(Clone, Copy, Debug)]
pub struct Viewer {
    pos: Vec2,
    forward: Vec2,
    right: Vec2,
    fov: f32,
    eye_height: f32,
}

impl Viewer {
    /// Viewer at `pos` looking along `look` (normalised here), horizontal FoV
    /// `fov` in radians.
    pub fn new(pos: Vec2, look: Vec2, fov: f32) -> Self {
        let mut v = Self {
            pos,
            forward: look.try_normalize().unwrap_or(vec2(0.0, -1.0)),
            right: Vec2::ZERO,
            fov,
            eye_height: STANDING_EYE,
        };
        v.calculate_right();
        v
    }

    #[inline]
    pub fn pos(&self) -> Vec2 {
        self.pos
    }

    #[inline]
    pub fn set_pos(&mut self, pos: Vec2) {
        self.pos = pos;
    }

    #[inline]
    pub fn forward(&self) -> Vec2 {
        self.forward
    }

    /// Camera-plane vector (already scaled by `tan(fov/2)`).
    #[inline]
    pub fn right(&self) -> Vec2 {
        self.right
    }

    #[inline]
    pub fn fov(&self) -> f32 {
        self.fov
    }

    /// Heading in radians (`atan2(forward.y, forward.x)`).
    #[inline]
    pub fn angle(&self) -> f32 {
        self.forward.y.atan2(self.forward.x)
    }

    #[inline]
    pub fn eye_height(&self) -> f32 {
        self.eye_height
    }

    pub fn set_eye_height(&mut self, h: f32) {
        self.eye_height = h.clamp(0.0, 1.0);
    }

    /// Ray direction through screen column `x` of a `width`-wide view.
    #[inline]
    pub fn ray_dir(&self, x: usize, width: usize) -> Vec2 {
        let camera_x = 2.0 * x as f32 / width as f32 - 1.0;
        self.forward + self.right * camera_x
    }

    /// Rotate by `angle` radians (positive turns toward `right`).
    pub fn rotate(&mut self, angle: f32) {
        self.forward = Vec2::from_angle(angle).rotate(self.forward);
        self.calculate_right();
    }

    /// Move by `delta`, sliding along collidable cells one axis at a time.
    /// Moves that would leave the grid are rejected outright.
    pub fn try_move(&mut self, delta: Vec2, level: &Level) -> bool {
        let mut next = self.pos + delta;
        let cell = |p: f32| p.floor() as i32;

        if !level.grid.contains(cell(next.x), cell(next.y)) {
            return false;
        }
        if level.collidable(cell(next.x), cell(self.pos.y)) {
            next.x = self.pos.x;
        }
        if level.collidable(cell(self.pos.x), cell(next.y)) {
            next.y = self.pos.y;
        }

        let moved = next != self.pos;
        self.pos = next;
        moved
    }

    fn calculate_right(&mut self) {
        self.right = self.forward.perp() * (self.fov * 0.5).tan();
    }
}

/*====================================================================*/
/*                                Tests                                */
/*====================================================================*/
