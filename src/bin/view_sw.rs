//! Software-rendered walk-through / editor for RCM maps.
//!
//! ```bash
//! YARC_LOG=info cargo run --release -- maps/e1m1.rcm --assets ./assets
//! ```
//!
//! WASD move, ←/→ turn, Shift sprint, Ctrl crouch, Space opens doors.
//! ↑/↓ cycle the face texture in view, C places a wall, X clears one,
//! M toggles the door flag, F1 reloads the map, F2 saves it.

use clap::Parser;
use glam::{Vec2, vec2};
use minifb::{Key, KeyRepeat, Window, WindowOptions};
use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use yarc_rs::{
    audio::Speakers,
    engine::Engine,
    map,
    renderer::Software,
    sim::InputCmd,
    world::{Atlas, Cell, CellFlags, DEFAULT_FOV_DEG, Level, TextureBank, Thing, Viewer},
};

/// CLI options handled via `clap` derive.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Opts {
    /// RCM map to open; a built-in test room when omitted
    #[arg(value_name = "FILE")]
    map: Option<PathBuf>,

    /// Directory holding `Images/` and `Sounds/`
    #[arg(long, value_name = "DIR", default_value = ".")]
    assets: PathBuf,

    #[arg(long, default_value_t = 600)]
    width: usize,

    #[arg(long, default_value_t = 450)]
    height: usize,

    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = DEFAULT_FOV_DEG)]
    fov: f32,

    /// Start position in map cells
    #[arg(long, num_args = 2, value_names = ["X", "Y"], default_values_t = [14.5, 8.5])]
    start: Vec<f32>,

    /// Start heading in degrees, clockwise from north
    #[arg(long, default_value_t = 0.0)]
    heading: f32,
}

/// Cap on a single simulation step so a stalled frame cannot tunnel walls.
const MAX_DT: f32 = 0.1;

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("YARC_LOG");
    let opts = Opts::parse();

    let mut textures = TextureBank::default_with_checker();
    let level = match &opts.map {
        Some(path) => map::load_level(path, &opts.assets, &mut textures)?,
        None => test_room(&opts, &mut textures),
    };
    println!("map: {}", level.title());

    let start = vec2(opts.start[0], opts.start[1]);
    let heading = opts.heading.to_radians();
    let viewer = Viewer::new(
        start,
        vec2(heading.sin(), -heading.cos()),
        opts.fov.to_radians(),
    );

    let (w, h) = (opts.width, opts.height);
    let mut engine = Engine::new(
        Software::default(),
        Speakers::open(),
        level,
        viewer,
        textures,
        w,
        h,
    )
    .with_assets(&opts.assets);

    let mut win = Window::new("yarc software render", w, h, WindowOptions::default())?;
    win.set_target_fps(60);

    // ────────────────── benchmarking state ──────────────────────────────
    let mut acc_time = Duration::ZERO;
    let mut acc_frames = 0usize;
    let mut last_print = Instant::now();
    let mut last_frame = Instant::now();

    while win.is_open() && !win.is_key_down(Key::Escape) {
        let dt = last_frame.elapsed().as_secs_f32().min(MAX_DT);
        last_frame = Instant::now();

        /* movement --------------------------------------------------------- */
        let cmd = read_input(&win);
        engine.step(&cmd, dt);

        /* actions & edits -------------------------------------------------- */
        let pressed = |k| win.is_key_pressed(k, KeyRepeat::No);
        if pressed(Key::Space) {
            engine.use_door();
        }
        if pressed(Key::Up) {
            engine.cycle_face(1);
        }
        if pressed(Key::Down) {
            engine.cycle_face(-1);
        }
        if pressed(Key::C) {
            engine.place_wall();
        }
        if pressed(Key::X) {
            engine.clear_wall();
        }
        if pressed(Key::M) {
            engine.toggle_door();
        }
        if pressed(Key::F1) {
            if let Err(e) = engine.reload() {
                log::error!("reload failed: {e}");
            }
        }
        if pressed(Key::F2) {
            if let Err(e) = engine.save() {
                log::error!("save failed: {e}");
            }
        }

        engine.advance(dt);

        /* draw ------------------------------------------------------------- */
        let t0 = Instant::now();
        let mut shown = Ok(());
        engine.render_frame(|fb, w, h| {
            acc_time += t0.elapsed();
            acc_frames += 1;
            shown = win.update_with_buffer(fb, w, h);
        });
        shown?;

        if last_print.elapsed() >= Duration::from_secs(3) && acc_frames > 0 {
            let avg_ms = acc_time.as_secs_f64() * 1000.0 / acc_frames as f64;
            println!("avg render: {:.2} ms  ({:.1} FPS)", avg_ms, 1000.0 / avg_ms);
            acc_time = Duration::ZERO;
            acc_frames = 0;
            last_print = Instant::now();
        }
    }
    Ok(())
}

fn read_input(win: &Window) -> InputCmd {
    let mut cmd = InputCmd::default();
    if win.is_key_down(Key::W) {
        cmd.forward += 1.0;
    }
    if win.is_key_down(Key::S) {
        cmd.forward -= 1.0;
    }
    if win.is_key_down(Key::A) {
        cmd.strafe -= 1.0;
    }
    if win.is_key_down(Key::D) {
        cmd.strafe += 1.0;
    }
    if win.is_key_down(Key::Left) {
        cmd.turn -= 1.0;
    }
    if win.is_key_down(Key::Right) {
        cmd.turn += 1.0;
    }
    cmd.run = win.is_key_down(Key::LeftShift) || win.is_key_down(Key::RightShift);
    cmd.crouch = win.is_key_down(Key::LeftCtrl) || win.is_key_down(Key::RightCtrl);
    cmd
}

/// Walled 24×16 room with a few pillars and a door, used when no map file
/// is given.
fn test_room(opts: &Opts, textures: &mut TextureBank) -> Level {
    let mut level = map::blank_level(24, 16);
    for (x, y, tex) in [(6, 4, 2), (6, 11, 3), (18, 4, 4), (18, 11, 5)] {
        level.grid.set(x, y, Cell::solid(tex));
    }
    // partition with a door in the middle
    for y in 1..15 {
        level.grid.set(10, y, Cell::solid(6));
    }
    if let Ok(door) = Cell::new([7; 4], CellFlags::DOOR | CellFlags::COLLIDE) {
        level.grid.set(10, 8, door);
    }

    match textures.load(&opts.assets, &level.wall_texture) {
        Ok(id) => {
            if let Ok(tex) = textures.texture(id) {
                level.atlas = Atlas::new(id, tex);
            }
        }
        Err(e) => log::warn!("{e}; walls use the missing texture"),
    }
    level.things = vec![Thing {
        kind: 0,
        pos: vec2(12.5, 8.5),
        forward: Vec2::NEG_Y,
    }];
    map::spawn_sprites(&mut level, &opts.assets, textures);
    level
}
