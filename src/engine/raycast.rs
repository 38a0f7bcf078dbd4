//! Per-column wall search.
//!
//! A grid DDA walks cell boundaries until it leaves the map or enters a
//! cell with any face or flag set. Doors get a second look: closed and
//! sliding doors are drawn on a plane pushed [`DOOR_INSET`] into the cell,
//! open doors are transparent.

use glam::{IVec2, Vec2, ivec2, vec2};

use crate::world::{DoorPhase, DoorState, Face, Grid, Level, Viewer};

/// How far a door's plane sits inside its cell (world units).
pub const DOOR_INSET: f32 = 0.5;

/// Which family of grid lines the ray crossed last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    /// A vertical line (`x = const`); east or west face.
    X,
    /// A horizontal line (`y = const`); north or south face.
    Y,
}

/// Result of one successful cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// Cell that was struck.
    pub cell: IVec2,
    /// World-space intersection (on the inset plane for doors), not the
    /// cell boundary: a viewer at (1.5, 2.5) looking north at cell (1, 1)
    /// gets (1.5, 2.0). Door reach is measured to this point.
    pub point: Vec2,
    pub face: Face,
    pub side: Side,
    /// Distance along the viewer's forward axis; drives wall height.
    pub perp_dist: f32,
    /// Straight-line distance from the ray origin; drives fog.
    pub dist: f32,
    /// Coordinate along the struck face. Its fractional part selects the
    /// texture column; for doors it includes slide progress and back-face
    /// mirroring.
    pub wall_u: f32,
    pub ray_dir: Vec2,
    pub door: bool,
}

impl RayHit {
    /// Texture index of the struck face; `0` when the face has none.
    pub fn face_texture(&self, grid: &Grid) -> u8 {
        grid.get(self.cell.x, self.cell.y).face(self.face)
    }
}

/// What the door test decided about a candidate hit.
enum DoorOutcome {
    Accept(RayHit),
    PassThrough,
}

/// Grid ray caster.
#[derive(Clone, Copy, Debug)]
pub struct RayMarcher {
    pub door_inset: f32,
}

impl Default for RayMarcher {
    fn default() -> Self {
        Self {
            door_inset: DOOR_INSET,
        }
    }
}

impl RayMarcher {
    pub fn new(door_inset: f32) -> Self {
        Self { door_inset }
    }

    /// Cast the ray for screen column `x` of a `width`-wide view.
    pub fn cast_column(
        &self,
        level: &Level,
        viewer: &Viewer,
        x: usize,
        width: usize,
    ) -> Option<RayHit> {
        self.cast(&level.grid, &level.doors, viewer.pos(), viewer.ray_dir(x, width))
    }

    /// March from `origin` along `dir` (need not be unit length; distances
    /// along it are measured in multiples of its forward component).
    ///
    /// Returns `None` when the ray leaves the grid. When both side distances
    /// are equal the x axis steps first.
    pub fn cast(
        &self,
        grid: &Grid,
        doors: &DoorState,
        origin: Vec2,
        dir: Vec2,
    ) -> Option<RayHit> {
        if dir == Vec2::ZERO || !dir.is_finite() || !origin.is_finite() {
            return None;
        }

        let delta = vec2(inv_abs(dir.x), inv_abs(dir.y));
        let step = ivec2(
            if dir.x < 0.0 { -1 } else { 1 },
            if dir.y < 0.0 { -1 } else { 1 },
        );
        let mut cell = origin.floor().as_ivec2();
        let mut side_dist = vec2(
            if dir.x < 0.0 {
                (origin.x - cell.x as f32) * delta.x
            } else {
                (cell.x as f32 + 1.0 - origin.x) * delta.x
            },
            if dir.y < 0.0 {
                (origin.y - cell.y as f32) * delta.y
            } else {
                (cell.y as f32 + 1.0 - origin.y) * delta.y
            },
        );

        loop {
            let side = if side_dist.x <= side_dist.y {
                side_dist.x += delta.x;
                cell.x += step.x;
                Side::X
            } else {
                side_dist.y += delta.y;
                cell.y += step.y;
                Side::Y
            };

            let idx = grid.index(cell.x, cell.y)?;
            let tile = grid.get_index(idx);
            if !tile.is_wall() {
                continue;
            }

            let (perp, face) = match side {
                Side::X => (
                    side_dist.x - delta.x,
                    if step.x < 0 { Face::East } else { Face::West },
                ),
                Side::Y => (
                    side_dist.y - delta.y,
                    if step.y < 0 { Face::North } else { Face::South },
                ),
            };
            let point = origin + dir * perp;
            let hit = RayHit {
                cell,
                point,
                face,
                side,
                perp_dist: perp,
                dist: perp * dir.length(),
                wall_u: match side {
                    Side::X => point.y,
                    Side::Y => point.x,
                },
                ray_dir: dir,
                door: false,
            };

            if !tile.is_door() {
                return Some(hit);
            }
            match self.door_hit(hit, doors.phase(idx), step) {
                DoorOutcome::Accept(hit) => return Some(hit),
                DoorOutcome::PassThrough => continue,
            }
        }
    }

    /// Re-project a hit on a door cell onto the inset plane.
    fn door_hit(&self, mut hit: RayHit, phase: DoorPhase, step: IVec2) -> DoorOutcome {
        let slide = match phase {
            DoorPhase::Open => return DoorOutcome::PassThrough,
            DoorPhase::Sliding(p) => p,
            DoorPhase::Closed => 0.0,
        };

        let dir = hit.ray_dir;
        let (along_dir, across_dir, along_cell, back_face) = match hit.side {
            Side::X => (dir.y, dir.x, hit.cell.y, step.x < 0),
            Side::Y => (dir.x, dir.y, hit.cell.x, step.y > 0),
        };

        // extra ray length to reach the inset plane
        let extra = self.door_inset / across_dir.abs();
        let plane_u = hit.wall_u + along_dir * extra;
        if plane_u.floor() as i32 != along_cell {
            return DoorOutcome::PassThrough;
        }
        // the slid panel only covers what is left of the cell
        let mut u = plane_u + slide;
        if u.floor() as i32 != along_cell {
            return DoorOutcome::PassThrough;
        }
        if back_face {
            let base = along_cell as f32;
            u = base + (1.0 - (u - base));
        }

        hit.point += dir * extra;
        hit.perp_dist += extra;
        hit.dist += extra * dir.length();
        hit.wall_u = u;
        hit.door = true;
        DoorOutcome::Accept(hit)
    }
}

#[inline]
fn inv_abs(v: f32) -> f32 {
    if v == 0.0 { f32::INFINITY } else { (1.0 / v).abs() }
}
