use crate::{
    engine::types::Screen,
    renderer::{VisSprite, fog},
    world::{Sprite, Viewer},
};

/// Billboard transform of `sprite` for `viewer`.
///
/// `None` when the sprite is behind the viewer, degenerate, or entirely off
/// screen. Depth testing against walls happens per column at draw time.
pub fn project(sprite: &Sprite, viewer: &Viewer, screen: &Screen) -> Option<VisSprite> {
    let offset = sprite.pos - viewer.pos();
    let f = viewer.forward();
    let r = viewer.right();
    if f.dot(offset) <= 0.0 {
        return None;
    }

    // inverse of the [right forward] camera matrix
    let det = r.x * f.y - f.x * r.y;
    if det == 0.0 {
        return None;
    }
    let inv_det = 1.0 / det;
    let tx = inv_det * (f.y * offset.x - f.x * offset.y);
    let ty = inv_det * (-r.y * offset.x + r.x * offset.y);
    if ty <= 0.0 {
        return None;
    }

    let full_h = (screen.h as f32 / ty).abs();
    let screen_x = screen.half_w * (1.0 + tx / ty);
    let float = (1.0 - sprite.scale) * sprite.float_height;
    let lift = viewer.eye_height() - sprite.scale / 2.0 - float;
    let screen_y = screen.half_h + full_h * lift;

    let height = full_h * sprite.scale;
    let width = sprite.size.x as f32 * height / sprite.size.y.max(1) as f32;
    let left = screen_x - width / 2.0;
    let x_start = left.clamp(0.0, screen.w as f32) as usize;
    let x_end = (screen_x + width / 2.0).clamp(0.0, screen.w as f32) as usize;
    if x_start >= x_end || height <= 0.0 {
        return None;
    }

    let rect = sprite.source_rect();
    Some(VisSprite {
        depth: ty,
        left,
        width,
        top: screen_y - height / 2.0,
        height,
        x_start,
        x_end,
        tex_origin: rect.origin,
        tex_size: rect.size,
        shade: fog(offset.length()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, uvec2, vec2};
    use std::f32::consts::FRAC_PI_2;

    fn viewer() -> Viewer {
        // right = (1, 0): camera plane spans exactly ±45°
        Viewer::new(vec2(5.0, 5.0), vec2(0.0, -1.0), FRAC_PI_2)
    }

    fn sprite_at(pos: Vec2, scale: f32, float_height: f32) -> Sprite {
        Sprite::new(1, uvec2(32, 64), pos, scale, float_height)
    }

    #[test]
    fn straight_ahead_is_centred() {
        let screen = Screen::new(200, 100);
        let vis = project(&sprite_at(vec2(5.0, 3.0), 1.0, 0.0), &viewer(), &screen).unwrap();
        assert!((vis.depth - 2.0).abs() < 1e-5);
        assert!((vis.height - 50.0).abs() < 1e-4);
        assert!((vis.width - 25.0).abs() < 1e-4);
        assert!((vis.left - 87.5).abs() < 1e-4);
        assert_eq!((vis.x_start, vis.x_end), (87, 112));
        assert!((vis.top - 25.0).abs() < 1e-4);
        assert_eq!(vis.shade, fog(2.0));
    }

    #[test]
    fn small_sprites_stand_on_the_floor() {
        let screen = Screen::new(200, 100);
        let vis = project(&sprite_at(vec2(5.0, 3.0), 0.4, 0.0), &viewer(), &screen).unwrap();
        // wall bottom at half_h + full_h * eye = 75
        assert!((vis.top + vis.height - 75.0).abs() < 1e-3);

        let floating = project(&sprite_at(vec2(5.0, 3.0), 0.4, 1.0), &viewer(), &screen).unwrap();
        assert!(floating.top < vis.top);
    }

    #[test]
    fn offset_sprite_moves_right() {
        let screen = Screen::new(200, 100);
        let vis = project(&sprite_at(vec2(6.0, 3.0), 1.0, 0.0), &viewer(), &screen).unwrap();
        // tx / ty = 0.5 → centre at 150
        assert!((vis.left + vis.width / 2.0 - 150.0).abs() < 1e-3);
    }

    #[test]
    fn behind_or_beside_is_culled() {
        let screen = Screen::new(200, 100);
        let v = viewer();
        assert!(project(&sprite_at(vec2(5.0, 7.0), 1.0, 0.0), &v, &screen).is_none());
        assert!(project(&sprite_at(vec2(8.0, 5.0), 1.0, 0.0), &v, &screen).is_none());
        assert!(project(&sprite_at(v.pos(), 1.0, 0.0), &v, &screen).is_none());
    }

    #[test]
    fn far_off_screen_is_culled() {
        let screen = Screen::new(200, 100);
        let vis = project(&sprite_at(vec2(60.0, 3.0), 1.0, 0.0), &viewer(), &screen);
        assert!(vis.is_none());
    }
}
