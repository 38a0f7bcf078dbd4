mod animation;
mod player;

pub use animation::{Animation, AnimationClock, ClockState};
pub use player::{CROUCH_FACTOR, InputCmd, SPRINT_FACTOR, TURN_RATE, WALK_SPEED, step};
