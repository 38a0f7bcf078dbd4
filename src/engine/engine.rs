use std::path::{Path, PathBuf};

use glam::IVec2;
use smallvec::SmallVec;

use crate::{
    audio::{AudioSink, Cue, SoundBank, SoundId},
    engine::{
        depth::DepthBuffer,
        raycast::{RayHit, RayMarcher},
        sprites,
        types::Screen,
        walls,
    },
    map::{self, MapError},
    renderer::{Renderer, Rgba},
    sim::{self, InputCmd},
    world::{Level, TextureBank, Viewer},
};

/// Sound played when a door starts sliding, relative to the asset root.
pub const DOOR_SOUND: &str = "Sounds/door.wav";

pub struct Engine<R: Renderer, A: AudioSink> {
    pub renderer: R,
    pub audio: A,
    pub level: Level,
    pub viewer: Viewer,
    pub textures: TextureBank,
    pub sounds: SoundBank,
    pub screen: Screen,
    pub marcher: RayMarcher,
    pub depth: DepthBuffer,
    /// Directory map assets (atlas, sprite sheets, sounds) are read from.
    pub assets: PathBuf,
    door_sound: Option<SoundId>,
}

impl<R: Renderer, A: AudioSink> Engine<R, A> {
    pub fn new(
        renderer: R,
        audio: A,
        level: Level,
        viewer: Viewer,
        textures: TextureBank,
        w: usize,
        h: usize,
    ) -> Self {
        Self {
            renderer,
            audio,
            level,
            viewer,
            textures,
            sounds: SoundBank::new(),
            screen: Screen::new(w, h),
            marcher: RayMarcher::default(),
            depth: DepthBuffer::new(w),
            assets: PathBuf::from("."),
            door_sound: None,
        }
    }

    /// Use `root` for reloads and load the door sound from it. A missing
    /// sound only silences doors.
    pub fn with_assets(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets = root.into();
        self.door_sound = match self.sounds.load(&self.assets, DOOR_SOUND) {
            Ok(id) => Some(id),
            Err(e) => {
                log::warn!("{e}; doors will be silent");
                None
            }
        };
        self
    }

    /// Change the output resolution.
    pub fn resize(&mut self, w: usize, h: usize) {
        self.screen = Screen::new(w, h);
        self.depth.reset(w);
    }

    /// Apply one frame of player input.
    pub fn step(&mut self, cmd: &InputCmd, dt: f32) -> bool {
        sim::step(&mut self.viewer, cmd, &self.level, dt)
    }

    /// Advance doors, sprite animation and audio by `dt` seconds.
    /// Returns the cells whose doors finished opening.
    pub fn advance(&mut self, dt: f32) -> SmallVec<[IVec2; 4]> {
        let finished = self.level.advance(dt, self.viewer.pos());
        self.audio.set_listener(self.viewer.pos(), self.viewer.right());
        self.audio.advance(dt);
        finished
    }

    pub fn render_frame(&mut self, submit: impl FnOnce(&[Rgba], usize, usize)) {
        let Screen { w, h, .. } = self.screen;
        self.renderer.begin_frame(w, h, self.level.ceiling, self.level.floor);
        self.depth.reset(w);

        self.draw_walls();
        self.draw_sprites();

        self.renderer.end_frame(submit);
    }

    fn draw_walls(&mut self) {
        let w = self.screen.w;
        let atlas = self.textures.texture_or_missing(self.level.atlas.texture);
        let eye = self.viewer.eye_height();

        for x in 0..w {
            let Some(hit) = self.marcher.cast_column(&self.level, &self.viewer, x, w) else {
                continue;
            };
            // depth goes in even when the face has no texture
            self.depth.record(x, hit.perp_dist);
            if let Some(span) =
                walls::shade_column(x, &hit, &self.level.grid, &self.level.atlas, &self.screen, eye)
            {
                self.renderer.draw_wall(&span, atlas);
            }
        }
    }

    fn draw_sprites(&mut self) {
        self.level.sort_sprites(self.viewer.pos());
        for sprite in &self.level.sprites {
            let Some(vis) = sprites::project(sprite, &self.viewer, &self.screen) else {
                continue;
            };
            let sheet = self.textures.texture_or_missing(sprite.texture);
            self.renderer.draw_sprite(&vis, sheet, &self.depth);
        }
    }

    /// What the ray through screen column `col` strikes.
    pub fn hit_test(&self, col: usize) -> Option<RayHit> {
        self.marcher.cast_column(&self.level, &self.viewer, col, self.screen.w)
    }

    /// What the viewer is looking at (centre column).
    pub fn hit_center(&self) -> Option<RayHit> {
        self.hit_test(self.screen.w / 2)
    }

    /// Start the door at `(x, y)` sliding and play its sound there.
    pub fn open_door(&mut self, x: i32, y: i32) -> bool {
        if !self.level.open_door(x, y) {
            return false;
        }
        if let Some(sound) = self.door_sound.and_then(|id| self.sounds.get(id)) {
            self.audio.play(sound, Cue::at(map::cell_centre(x, y)));
        }
        true
    }

    /// Re-read the level from the file it came from, keeping the viewer.
    /// Returns `false` when the level has no file behind it.
    pub fn reload(&mut self) -> Result<bool, MapError> {
        let Some(path) = self.level.source.clone() else {
            log::warn!("{} has no source file to reload", self.level.title());
            return Ok(false);
        };
        self.level = map::load_level(&path, &self.assets, &mut self.textures)?;
        log::info!("reloaded {}", path.display());
        Ok(true)
    }

    /// Write the level back to its source file.
    /// Returns `false` when the level has no file behind it.
    pub fn save(&self) -> Result<bool, MapError> {
        match &self.level.source {
            Some(path) => self.save_as(path).map(|_| true),
            None => {
                log::warn!("{} has no source file; use save_as", self.level.title());
                Ok(false)
            }
        }
    }

    pub fn save_as(&self, path: &Path) -> Result<(), MapError> {
        map::save_level(&self.level, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        audio::{Sound, VoicePool},
        renderer::{Software, modulate},
        world::{Atlas, Cell, CellFlags, Sprite, Texture},
    };
    use glam::{Vec2, uvec2, vec2};

    const RED: Rgba = 0xFF_FF0000;
    const BLUE: Rgba = 0xFF_0000FF;

    /// 5×5 room, viewer in the middle looking north (-y), wall face 1 red.
    fn engine() -> Engine<Software, VoicePool> {
        let mut level = map::blank_level(5, 5);
        let mut textures = TextureBank::default_with_checker();
        let atlas = Texture {
            name: "walls".into(),
            w: 64,
            h: 64,
            pixels: vec![RED; 64 * 64],
        };
        let id = textures.insert("walls", atlas.clone()).unwrap();
        level.atlas = Atlas::new(id, &atlas);
        let viewer = Viewer::new(vec2(2.5, 2.5), vec2(0.0, -1.0), 65f32.to_radians());
        Engine::new(Software::new(), VoicePool::new(4), level, viewer, textures, 40, 30)
    }

    fn door_sound(e: &mut Engine<Software, VoicePool>) {
        let sound = Sound {
            name: DOOR_SOUND.into(),
            bytes: Default::default(),
            channels: 1,
            sample_rate: 8000,
            duration: 0.5,
        };
        e.door_sound = Some(e.sounds.insert(sound));
    }

    fn frame(e: &mut Engine<Software, VoicePool>) -> Vec<Rgba> {
        let mut out = Vec::new();
        e.render_frame(|fb, _, _| out = fb.to_vec());
        out
    }

    #[test]
    fn frame_has_ceiling_wall_and_floor() {
        let mut e = engine();
        let fb = frame(&mut e);
        let (w, h) = (40, 30);
        assert_eq!(fb.len(), w * h);
        // wall is 2 cells away: line height 30/1.5 = 20 rows around the middle
        assert_eq!(fb[0], e.level.ceiling);
        assert_eq!(fb[(h - 1) * w], e.level.floor);
        let mid = fb[(h / 2) * w + w / 2];
        assert_eq!(mid & 0xFF00_FFFF, 0xFF00_0000, "fogged red: {mid:#x}");
        assert!((mid & 0x00FF_0000) > 0);
        // depth holds the perpendicular distance of the north wall
        assert!((e.depth.get(w / 2) - 1.5).abs() < 1e-4);
    }

    #[test]
    fn untextured_face_still_occludes_sprites() {
        let mut e = engine();
        let blue = Texture {
            name: "blue".into(),
            w: 1,
            h: 1,
            pixels: vec![BLUE],
        };
        let id = e.textures.insert("blue", blue).unwrap();
        // invisible wall right in front, sprite behind it
        e.level.grid.set(2, 1, Cell::new([0; 4], CellFlags::COLLIDE).unwrap());
        e.level
            .sprites
            .push(Sprite::new(id, uvec2(1, 1), vec2(2.5, 0.9), 1.0, 0.0));
        let fb = frame(&mut e);
        let (w, h) = (40, 30);
        assert!((e.depth.get(w / 2) - 0.5).abs() < 1e-4);
        assert_eq!(fb[(h / 2) * w + w / 2], e.level.floor);
    }

    #[test]
    fn visible_sprite_is_drawn_over_the_floor() {
        let mut e = engine();
        let blue = Texture {
            name: "blue".into(),
            w: 1,
            h: 1,
            pixels: vec![BLUE],
        };
        let id = e.textures.insert("blue", blue).unwrap();
        e.level
            .sprites
            .push(Sprite::new(id, uvec2(1, 1), vec2(2.5, 1.5), 1.0, 0.0));
        let fb = frame(&mut e);
        let (w, h) = (40, 30);
        let shade = crate::renderer::fog(1.0);
        assert_eq!(fb[(h / 2) * w + w / 2], modulate(BLUE, shade));
    }

    #[test]
    fn hit_test_and_resize() {
        let mut e = engine();
        let hit = e.hit_center().unwrap();
        assert_eq!(hit.cell, IVec2::new(2, 0));
        e.resize(10, 8);
        assert_eq!(e.depth.len(), 10);
        assert_eq!(e.hit_test(5).unwrap().cell, IVec2::new(2, 0));
    }

    #[test]
    fn opening_a_door_plays_its_sound() {
        let mut e = engine();
        door_sound(&mut e);
        e.level.grid.set(2, 1, Cell::new([1; 4], CellFlags::DOOR).unwrap());
        assert!(e.open_door(2, 1));
        assert!(!e.open_door(2, 1), "already sliding");
        assert_eq!(e.audio.active(), 1);
        let voice = e.audio.voices().next().unwrap();
        assert_eq!(voice.cue.position, Some(vec2(2.5, 1.5)));

        let done = e.advance(1.0);
        assert_eq!(done.as_slice(), &[IVec2::new(2, 1)]);
        assert_eq!(e.audio.active(), 0);
    }

    #[test]
    fn step_moves_the_viewer() {
        let mut e = engine();
        let cmd = InputCmd {
            forward: 1.0,
            ..Default::default()
        };
        assert!(e.step(&cmd, 0.1));
        assert!(e.viewer.pos().y < 2.5);
        assert_eq!(e.viewer.pos().x, 2.5);
    }

    #[test]
    fn reload_and_save_need_a_source() {
        let mut e = engine();
        assert!(!e.reload().unwrap());
        assert!(!e.save().unwrap());
    }

    #[test]
    fn save_then_reload_restores_edits() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("Images")).unwrap();
        image::RgbaImage::from_pixel(64, 64, image::Rgba([255, 0, 0, 255]))
            .save(dir.path().join("Images/walls.png"))
            .unwrap();
        let path = dir.path().join("room.rcm");

        let mut e = engine().with_assets(dir.path());
        e.save_as(&path).unwrap();
        e.level.source = Some(path.clone());

        e.level.grid.set(2, 2, Cell::solid(3));
        assert!(e.reload().unwrap());
        assert!(e.level.grid.get(2, 2).is_empty());
        assert_eq!(e.viewer.pos(), Vec2::new(2.5, 2.5));

        e.level.grid.set(1, 1, Cell::solid(3));
        assert!(e.save().unwrap());
        assert!(e.reload().unwrap());
        assert_eq!(e.level.grid.get(1, 1), Cell::solid(3));
    }
}
