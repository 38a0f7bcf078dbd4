use std::cmp::Ordering;
use std::path::PathBuf;

use glam::{IVec2, Vec2};
use smallvec::SmallVec;

use super::{
    doors::{DoorPhase, DoorState},
    grid::{CellFlags, Grid},
    sprite::Sprite,
    texture::Atlas,
};
use crate::renderer::{Rgba, rgb};

pub const DEFAULT_FLOOR: Rgba = rgb(112, 112, 112);
pub const DEFAULT_CEILING: Rgba = rgb(56, 56, 56);

/// Spawn record stored in the map file; turned into a [`Sprite`] through
/// the `defs` catalog.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Thing {
    pub kind: u8,
    pub pos: Vec2,
    pub forward: Vec2,
}

/// Everything the renderer reads each frame: tiles, door state, sprites and
/// the surface colours.
#[derive(Clone, Debug)]
pub struct Level {
    pub region: String,
    pub name: String,
    pub grid: Grid,
    pub doors: DoorState,
    pub floor: Rgba,
    pub ceiling: Rgba,
    /// Asset path of the wall atlas image.
    pub wall_texture: String,
    pub atlas: Atlas,
    pub things: Vec<Thing>,
    pub sprites: Vec<Sprite>,
    /// File this level was read from (target of reload / save).
    pub source: Option<PathBuf>,
}

impl Level {
    pub fn new(grid: Grid) -> Self {
        Self {
            region: "E1".into(),
            name: "M1".into(),
            grid,
            doors: DoorState::new(),
            floor: DEFAULT_FLOOR,
            ceiling: DEFAULT_CEILING,
            wall_texture: "Images/walls.png".into(),
            atlas: Atlas::missing(),
            things: Vec::new(),
            sprites: Vec::new(),
            source: None,
        }
    }

    /// `"E1M1"`-style title.
    pub fn title(&self) -> String {
        format!("{}{}", self.region, self.name)
    }

    /// Door phase of cell `(x, y)`; closed outside the grid.
    pub fn door_phase(&self, x: i32, y: i32) -> DoorPhase {
        self.grid
            .index(x, y)
            .map_or(DoorPhase::Closed, |i| self.doors.phase(i))
    }

    /// Blocks movement? Open doors never do; outside the grid nothing does.
    pub fn collidable(&self, x: i32, y: i32) -> bool {
        let Some(idx) = self.grid.index(x, y) else {
            return false;
        };
        let cell = self.grid.get_index(idx);
        if cell.is_door() && self.doors.is_open(idx) {
            return false;
        }
        cell.flags.contains(CellFlags::COLLIDE)
    }

    /// Start sliding the door at `(x, y)`.
    ///
    /// Returns `false` when the cell is outside the grid or the door is
    /// already moving or open. The caller owns the audio cue.
    pub fn open_door(&mut self, x: i32, y: i32) -> bool {
        let Some(idx) = self.grid.index(x, y) else {
            return false;
        };
        let started = self.doors.open(idx);
        if started {
            log::debug!("door at ({x}, {y}) opening");
        }
        started
    }

    /// Advance door slides and sprite animation/facing by `dt` seconds.
    /// Returns the cells whose doors finished opening.
    pub fn advance(&mut self, dt: f32, viewer: Vec2) -> SmallVec<[IVec2; 4]> {
        let finished: SmallVec<[IVec2; 4]> = self
            .doors
            .advance(dt)
            .into_iter()
            .map(|i| self.grid.coords(i))
            .collect();
        for c in &finished {
            log::debug!("door at ({}, {}) fully open", c.x, c.y);
        }
        for sprite in &mut self.sprites {
            sprite.tick(dt, viewer);
        }
        finished
    }

    /// Far-to-near by squared distance. Stable: equal distances keep their
    /// insertion order.
    pub fn sort_sprites(&mut self, viewer: Vec2) {
        self.sprites.sort_by(|a, b| {
            let da = a.pos.distance_squared(viewer);
            let db = b.pos.distance_squared(viewer);
            db.partial_cmp(&da).unwrap_or(Ordering::Equal)
        });
    }
}
