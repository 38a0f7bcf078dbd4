// ──────────────────────────────────────────────────────────────────────────
// map/loader.rs
//
//  *   RawMap     (map::raw)             ──╮
//  *   wall atlas + sprite sheets          │   --->  world::Level
//  *   TextureBank (mut)                   │          + populated TextureBank
//                                          ╯
// ──────────────────────────────────────────────────────────────────────────

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use glam::{Vec2, vec2};

use crate::{
    defs,
    map::raw::{MapError, RawHeader, RawMap, RawThing, MAGIC, field_str, name_field, pack_cell},
    renderer::{Rgba, rgb},
    world::{Atlas, Cell, Grid, Level, NO_TEXTURE, TextureBank, Thing},
};

/*====================================================================*/
/*                       Public API                                   */
/*====================================================================*/

/// Read the map at `path`, load its wall atlas and sprite sheets from
/// `root` into `bank`, and spawn a sprite for every known thing.
///
/// Doors always start closed.
pub fn load_level(path: &Path, root: &Path, bank: &mut TextureBank) -> Result<Level, MapError> {
    let raw = RawMap::read_from(&mut BufReader::new(File::open(path)?))?;
    let mut level = level_from_raw(&raw)?;
    level.source = Some(path.to_path_buf());

    let atlas_id = bank.load(root, &level.wall_texture)?;
    level.atlas = Atlas::new(atlas_id, bank.texture(atlas_id)?);

    spawn_sprites(&mut level, root, bank);

    log::info!(
        "loaded {} ({}x{}, {} sprites) from {}",
        level.title(),
        level.grid.width(),
        level.grid.height(),
        level.sprites.len(),
        path.display()
    );
    Ok(level)
}

/// Write `level` to `path` in RCM layout.
pub fn save_level(level: &Level, path: &Path) -> Result<(), MapError> {
    let raw = level_to_raw(level)?;
    let mut out = BufWriter::new(File::create(path)?);
    raw.write_to(&mut out)?;
    out.flush()?;
    log::info!("saved {} to {}", level.title(), path.display());
    Ok(())
}

/// Build the texture-free part of a level (grid, colours, things).
pub fn level_from_raw(raw: &RawMap) -> Result<Level, MapError> {
    let h = &raw.header;
    let (w, ht) = (h.width as usize, h.height as usize);
    let cells = raw.unpack_cells()?;
    let grid = Grid::from_cells(w, ht, cells).ok_or(MapError::EmptyGrid {
        width: h.width,
        height: h.height,
    })?;

    let mut level = Level::new(grid);
    level.region = field_str(&h.region);
    level.name = field_str(&h.name);
    level.wall_texture = field_str(&h.atlas);
    level.floor = rgb(h.floor[0], h.floor[1], h.floor[2]);
    level.ceiling = rgb(h.ceiling[0], h.ceiling[1], h.ceiling[2]);
    level.things = raw
        .things
        .iter()
        .map(|t| Thing {
            kind: t.kind,
            pos: vec2(t.pos[0], t.pos[1]),
            forward: vec2(t.forward[0], t.forward[1]),
        })
        .collect();
    Ok(level)
}

/// Inverse of [`level_from_raw`]. Fails if the grid is too big for the
/// one-byte size fields.
pub fn level_to_raw(level: &Level) -> Result<RawMap, MapError> {
    let byte = |what, n: usize| u8::try_from(n).map_err(|_| MapError::TooLarge { what, len: n });
    let header = RawHeader {
        magic: MAGIC,
        region: name_field(&level.region),
        name: name_field(&level.name),
        width: byte("grid width", level.grid.width())?,
        height: byte("grid height", level.grid.height())?,
        floor: channels(level.floor),
        ceiling: channels(level.ceiling),
        atlas: name_field(&level.wall_texture),
    };
    Ok(RawMap {
        header,
        cells: level.grid.cells().iter().map(pack_cell).collect(),
        things: level
            .things
            .iter()
            .map(|t| RawThing {
                kind: t.kind,
                pos: t.pos.to_array(),
                forward: t.forward.to_array(),
            })
            .collect(),
    })
}

/// Replace `level.sprites` with one sprite per catalogued thing.
///
/// Unknown kinds are skipped; unreadable sheets fall back to the
/// checkerboard so one bad asset does not sink the map.
pub fn spawn_sprites(level: &mut Level, root: &Path, bank: &mut TextureBank) {
    level.sprites.clear();
    for thing in &level.things {
        let Some(def) = defs::by_kind(thing.kind) else {
            log::warn!("unknown thing kind {} at {:?}, skipped", thing.kind, thing.pos);
            continue;
        };
        let tex = bank.load(root, def.texture).unwrap_or_else(|e| {
            log::warn!("{e}; drawing {} with the missing texture", def.name);
            NO_TEXTURE
        });
        level.sprites.push(def.spawn(tex, thing));
    }
}

/// A level with no file behind it: empty grid ringed by walls.
pub fn blank_level(width: usize, height: usize) -> Level {
    let mut grid = Grid::new(width, height);
    let (w, h) = (width as i32, height as i32);
    for x in 0..w {
        grid.set(x, 0, Cell::solid(1));
        grid.set(x, h - 1, Cell::solid(1));
    }
    for y in 0..h {
        grid.set(0, y, Cell::solid(1));
        grid.set(w - 1, y, Cell::solid(1));
    }
    Level::new(grid)
}

fn channels(c: Rgba) -> [u8; 3] {
    [(c >> 16) as u8, (c >> 8) as u8, c as u8]
}

/// Centre of cell `(x, y)` in world space.
pub fn cell_centre(x: i32, y: i32) -> Vec2 {
    vec2(x as f32 + 0.5, y as f32 + 0.5)
}

/*====================================================================*/
/*                               Tests                                */
/*====================================================================*/
