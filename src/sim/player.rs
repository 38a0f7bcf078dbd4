use std::f32::consts::PI;

use glam::Vec2;

use crate::world::{CROUCHING_EYE, Level, STANDING_EYE, Viewer};

pub const WALK_SPEED: f32 = 1.8 * 1.3; // cells / second
pub const SPRINT_FACTOR: f32 = 1.5;
pub const CROUCH_FACTOR: f32 = 0.5;
pub const TURN_RATE: f32 = PI; // rad / second (180°/s)

/// One frame of player intent, filled by the window layer.
#[derive(Clone, Copy, Debug, Default)]
pub struct InputCmd {
    pub forward: f32, // –1 … +1
    pub strafe: f32,  // –1 … +1  (left / right)
    pub turn: f32,    // –1 … +1  (left / right)
    pub run: bool,    // Shift
    pub crouch: bool, // Ctrl
}

/// Apply `cmd` to `viewer` for `dt` seconds. Returns `true` if the viewer
/// changed position.
pub fn step(viewer: &mut Viewer, cmd: &InputCmd, level: &Level, dt: f32) -> bool {
    if cmd.turn != 0.0 {
        viewer.rotate(cmd.turn * TURN_RATE * dt);
    }

    viewer.set_eye_height(if cmd.crouch { CROUCHING_EYE } else { STANDING_EYE });

    let speed = WALK_SPEED
        * match (cmd.crouch, cmd.run) {
            (true, _) => CROUCH_FACTOR,
            (false, true) => SPRINT_FACTOR,
            (false, false) => 1.0,
        };

    let fwd = viewer.forward();
    let wish: Vec2 = (fwd * cmd.forward + fwd.perp() * cmd.strafe).normalize_or_zero();
    if wish == Vec2::ZERO {
        return false;
    }
    viewer.try_move(wish * speed * dt, level)
}
