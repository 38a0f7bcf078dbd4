//! In-game map editing. Every operation acts on whatever the centre column
//! of the view currently strikes.

use crate::{
    audio::AudioSink,
    engine::Engine,
    renderer::Renderer,
    world::{Cell, CellFlags, MAX_FACE},
};

/// Furthest a door can be from the viewer and still be used.
pub const USE_REACH: f32 = 1.6;

impl<R: Renderer, A: AudioSink> Engine<R, A> {
    /// Open the door in view if it is closed and within [`USE_REACH`].
    pub fn use_door(&mut self) -> bool {
        let Some(hit) = self.hit_center() else {
            return false;
        };
        let idx = self.level.grid.index(hit.cell.x, hit.cell.y);
        let closed = idx.is_some_and(|i| {
            self.level.grid.get_index(i).is_door() && !self.level.doors.is_moving(i)
        });
        if !closed || hit.point.distance_squared(self.viewer.pos()) > USE_REACH * USE_REACH {
            return false;
        }
        self.open_door(hit.cell.x, hit.cell.y)
    }

    /// Step the texture of the face in view by `delta`, staying inside
    /// `1..=MAX_FACE`.
    pub fn cycle_face(&mut self, delta: i32) -> bool {
        let Some(hit) = self.hit_center() else {
            return false;
        };
        let mut cell = self.level.grid.get(hit.cell.x, hit.cell.y);
        let tex = (cell.face(hit.face) as i32 + delta).clamp(1, MAX_FACE as i32) as u8;
        if cell.set_face(hit.face, tex).is_err() {
            return false;
        }
        log::debug!(
            "cell ({}, {}) {:?} face -> {tex}",
            hit.cell.x,
            hit.cell.y,
            hit.face
        );
        self.level.grid.set(hit.cell.x, hit.cell.y, cell)
    }

    /// Build a plain wall in the cell the face in view looks into.
    pub fn place_wall(&mut self) -> bool {
        let Some(hit) = self.hit_center() else {
            return false;
        };
        let at = hit.cell + hit.face.outward();
        self.level.grid.set(at.x, at.y, Cell::solid(1))
    }

    /// Empty the cell in view.
    pub fn clear_wall(&mut self) -> bool {
        let Some(hit) = self.hit_center() else {
            return false;
        };
        self.level.grid.set(hit.cell.x, hit.cell.y, Cell::EMPTY)
    }

    /// Flip the door flag of the cell in view.
    pub fn toggle_door(&mut self) -> bool {
        let Some(hit) = self.hit_center() else {
            return false;
        };
        let mut cell = self.level.grid.get(hit.cell.x, hit.cell.y);
        cell.flags.toggle(CellFlags::DOOR);
        log::debug!(
            "cell ({}, {}) door = {}",
            hit.cell.x,
            hit.cell.y,
            cell.is_door()
        );
        self.level.grid.set(hit.cell.x, hit.cell.y, cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::NullSink,
        map,
        renderer::Software,
        world::{DoorPhase, Face, TextureBank, Viewer},
    };
    use glam::{IVec2, vec2};

    /// 6×6 room; viewer at (2.5, 3.5) looking north at the wall row y = 0.
    fn engine() -> Engine<Software, NullSink> {
        let level = map::blank_level(6, 6);
        let viewer = Viewer::new(vec2(2.5, 3.5), vec2(0.0, -1.0), 65f32.to_radians());
        Engine::new(
            Software::new(),
            NullSink,
            level,
            viewer,
            TextureBank::default_with_checker(),
            32,
            24,
        )
    }

    fn door(e: &mut Engine<Software, NullSink>, x: i32, y: i32) {
        e.level
            .grid
            .set(x, y, Cell::new([5; 4], CellFlags::DOOR | CellFlags::COLLIDE).unwrap());
    }

    #[test]
    fn door_in_reach_opens() {
        let mut e = engine();
        door(&mut e, 2, 2);
        // door plane at y = 2.5, exactly one unit away
        assert!(e.use_door());
        assert!(matches!(e.level.door_phase(2, 2), DoorPhase::Sliding(_)));
        assert!(!e.use_door(), "already moving");
    }

    #[test]
    fn door_out_of_reach_stays_shut() {
        let mut e = engine();
        door(&mut e, 2, 1);
        // plane at y = 1.5: two units away
        assert!(!e.use_door());
        assert_eq!(e.level.door_phase(2, 1), DoorPhase::Closed);
    }

    #[test]
    fn plain_wall_is_not_a_door() {
        let mut e = engine();
        e.level.grid.set(2, 2, Cell::solid(3));
        assert!(!e.use_door());
    }

    #[test]
    fn cycle_face_clamps() {
        let mut e = engine();
        // looking north: the struck face of (2, 0) is its south-looking side
        let face = e.hit_center().unwrap().face;
        assert_eq!(face, Face::North);

        assert!(e.cycle_face(1));
        assert_eq!(e.level.grid.get(2, 0).face(face), 2);
        assert!(e.cycle_face(-1));
        assert!(e.cycle_face(-1));
        assert_eq!(e.level.grid.get(2, 0).face(face), 1);

        e.level.grid.set(2, 0, Cell::solid(MAX_FACE));
        assert!(e.cycle_face(1));
        assert_eq!(e.level.grid.get(2, 0).face(face), MAX_FACE);
        // other faces untouched
        assert_eq!(e.level.grid.get(2, 0).face(Face::East), MAX_FACE);
    }

    #[test]
    fn place_wall_goes_in_front_of_the_face() {
        let mut e = engine();
        assert!(e.place_wall());
        assert_eq!(e.level.grid.get(2, 1), Cell::solid(1));
        // the new wall is now what the viewer sees
        assert_eq!(e.hit_center().unwrap().cell, IVec2::new(2, 1));
    }

    #[test]
    fn clear_wall_opens_the_border() {
        let mut e = engine();
        assert!(e.clear_wall());
        assert!(e.level.grid.get(2, 0).is_empty());
        // nothing left to hit: the ray leaves the grid
        assert!(e.hit_center().is_none());
        assert!(!e.clear_wall());
        assert!(!e.toggle_door());
    }

    #[test]
    fn toggle_door_flips_the_flag() {
        let mut e = engine();
        assert!(e.toggle_door());
        assert!(e.level.grid.get(2, 0).is_door());
        assert!(e.toggle_door());
        assert!(!e.level.grid.get(2, 0).is_door());
    }
}
