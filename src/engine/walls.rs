use crate::{
    engine::{
        raycast::{RayHit, Side},
        types::Screen,
    },
    renderer::{WallSpan, fog},
    world::{Atlas, Grid, TEX_WIDTH},
};

/// Y-side walls are darkened by this factor (out of 255).
pub const Y_SIDE_SHADE: u32 = 170;

/// Floor for the perpendicular distance so a wall touching the eye
/// still has a finite height.
const MIN_PERP: f32 = 1e-4;

/// Turn a ray hit in column `x` into a wall span.
///
/// `None` when the struck face carries texture `0` or a slot the atlas does
/// not have; the caller still records depth for the column.
pub fn shade_column(
    x: usize,
    hit: &RayHit,
    grid: &Grid,
    atlas: &Atlas,
    screen: &Screen,
    eye_height: f32,
) -> Option<WallSpan> {
    let tex_origin = atlas.cell_origin(hit.face_texture(grid))?;

    let line_h = screen.h as f32 / hit.perp_dist.max(MIN_PERP);
    let top = screen.half_h - line_h * (1.0 - eye_height);
    let bottom = screen.half_h + line_h * eye_height;
    let y_start = top.clamp(0.0, screen.h as f32) as usize;
    let y_end = bottom.clamp(0.0, screen.h as f32) as usize;

    let frac = hit.wall_u - hit.wall_u.floor();
    let mut tex_x = ((frac * TEX_WIDTH as f32) as u32).min(TEX_WIDTH as u32 - 1);
    let mirrored = match hit.side {
        Side::X => hit.ray_dir.x > 0.0,
        Side::Y => hit.ray_dir.y < 0.0,
    };
    if mirrored {
        tex_x = TEX_WIDTH as u32 - 1 - tex_x;
    }

    let mut shade = fog(hit.dist);
    if hit.side == Side::Y {
        shade = (shade as u32 * Y_SIDE_SHADE / 255) as u8;
    }

    Some(WallSpan {
        x,
        y_start,
        y_end,
        top,
        line_h,
        tex_origin,
        tex_x,
        shade,
    })
}
