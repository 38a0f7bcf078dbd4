//! Static catalog of placeable things.
//!
//! A map stores only a kind byte per thing; everything needed to build its
//! sprite (sheet, frame size, scale, animation, facing) lives here.

use std::collections::HashMap;

use glam::uvec2;
use once_cell::sync::Lazy;

use crate::{
    sim::Animation,
    world::{Sprite, TextureId, Thing},
};

/// Frame timing for an animated thing.
#[derive(Clone, Copy, Debug)]
pub struct AnimDef {
    pub fps: f32,
    /// 1-based sheet columns.
    pub frames: &'static [u16],
    pub looping: bool,
}

#[derive(Clone, Copy, Debug)]
pub struct ThingDef {
    pub kind: u8,
    pub name: &'static str,
    /// Sprite sheet, relative to the asset root.
    pub texture: &'static str,
    /// Pixel size of one frame.
    pub frame_size: (u32, u32),
    pub scale: f32,
    pub float_height: f32,
    pub anim: Option<AnimDef>,
    pub directional: bool,
}

pub static THINGS: &[ThingDef] = &[
    ThingDef {
        kind: 0,
        name: "barrel",
        texture: "Images/barrel.png",
        frame_size: (23, 32),
        scale: 0.4,
        float_height: 0.0,
        anim: Some(AnimDef {
            fps: 3.0,
            frames: &[1, 2],
            looping: true,
        }),
        directional: false,
    },
    ThingDef {
        kind: 1,
        name: "imp",
        texture: "Images/Monsters/imp.png",
        frame_size: (41, 57),
        scale: 0.65,
        float_height: 0.0,
        anim: None,
        directional: true,
    },
    ThingDef {
        kind: 2,
        name: "cacodemon",
        texture: "Images/Monsters/cacodemon.png",
        frame_size: (76, 78),
        scale: 0.8,
        float_height: 0.5,
        anim: Some(AnimDef {
            fps: 6.0,
            frames: &[1, 2, 3, 4, 1],
            looping: true,
        }),
        directional: true,
    },
];

static BY_KIND: Lazy<HashMap<u8, &'static ThingDef>> =
    Lazy::new(|| THINGS.iter().map(|def| (def.kind, def)).collect());

pub fn by_kind(kind: u8) -> Option<&'static ThingDef> {
    BY_KIND.get(&kind).copied()
}

impl ThingDef {
    /// Build the sprite for `thing`, drawing from sheet `texture`.
    pub fn spawn(&self, texture: TextureId, thing: &Thing) -> Sprite {
        let (w, h) = self.frame_size;
        let mut sprite = Sprite::new(texture, uvec2(w, h), thing.pos, self.scale, self.float_height)
            .with_directional(self.directional);
        sprite.set_forward(thing.forward);
        if let Some(a) = self.anim {
            let anim = Animation::new(a.fps, a.frames.iter().copied(), a.looping);
            sprite = sprite.with_animation(anim);
        }
        sprite
    }
}
