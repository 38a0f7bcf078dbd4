//! # RCM map codec
//!
//! * Header and thing records are fixed-layout little-endian structs coded
//!   with **bincode 2**.
//! * Cell words and counts go through `byteorder`.
//! * The packed cell word (four 6-bit faces + 8 flag bits) exists only here;
//!   the rest of the crate sees [`Cell`].
//!
//! Layout:
//!
//! ```text
//! "RCM\0" | region[20] | name[20] | w u8 | h u8 | floor rgb | ceil rgb | atlas[20]
//! cells: w*h × u32
//! count u32, then count × { kind u8, pos 2×f32, forward 2×f32 }
//! ```

use std::io::{self, Read};

use bincode::{Decode, Encode, config, decode_from_std_read, encode_into_std_write};
use byteorder::{LittleEndian as LE, ReadBytesExt, WriteBytesExt};
use thiserror::Error;

use crate::world::{Cell, CellFlags, FaceIndexError, TextureError};

pub const MAGIC: [u8; 4] = *b"RCM\0";
/// Width of every fixed-size string field.
pub const NAME_LEN: usize = 20;

const FACE_BITS: u32 = 6;
const FACE_MASK: u32 = (1 << FACE_BITS) - 1;
const FLAG_SHIFT: u32 = 24;

/// Loader / codec errors. All of them are fatal for the load in progress.
#[derive(Error, Debug)]
pub enum MapError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("file is not an RCM map")]
    BadMagic,

    #[error("map is {width}x{height}; both sides must be non-zero")]
    EmptyGrid { width: u8, height: u8 },

    #[error("cell {index}: {source}")]
    BadCell {
        index: usize,
        source: FaceIndexError,
    },

    #[error("{what} does not fit in a map file ({len})")]
    TooLarge { what: &'static str, len: usize },

    #[error("decode error: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("encode error: {0}")]
    Encode(#[from] bincode::error::EncodeError),

    #[error(transparent)]
    Texture(#[from] TextureError),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Encode, Decode)]
pub struct RawHeader {
    pub magic: [u8; 4],
    pub region: [u8; NAME_LEN],
    pub name: [u8; NAME_LEN],
    pub width: u8,
    pub height: u8,
    pub floor: [u8; 3],
    pub ceiling: [u8; 3],
    pub atlas: [u8; NAME_LEN],
}

#[derive(Clone, Copy, Debug, PartialEq, Encode, Decode)]
pub struct RawThing {
    pub kind: u8,
    pub pos: [f32; 2],
    pub forward: [f32; 2],
}

/// A whole map file, still in on-disk form.
#[derive(Clone, Debug, PartialEq)]
pub struct RawMap {
    pub header: RawHeader,
    pub cells: Vec<u32>,
    pub things: Vec<RawThing>,
}

/// Pack `cell` into its on-disk word.
pub fn pack_cell(cell: &Cell) -> u32 {
    let f = cell.faces();
    (f[0] as u32 & FACE_MASK)
        | (f[1] as u32 & FACE_MASK) << FACE_BITS
        | (f[2] as u32 & FACE_MASK) << (2 * FACE_BITS)
        | (f[3] as u32 & FACE_MASK) << (3 * FACE_BITS)
        | (cell.flags.bits() as u32) << FLAG_SHIFT
}

/// Unpack an on-disk word; faces above the atlas range are rejected.
pub fn unpack_cell(word: u32) -> Result<Cell, FaceIndexError> {
    let face = |i: u32| ((word >> (i * FACE_BITS)) & FACE_MASK) as u8;
    Cell::new(
        [face(0), face(1), face(2), face(3)],
        CellFlags::from_bits_retain((word >> FLAG_SHIFT) as u8),
    )
}

/// `"E1"` → NUL-padded fixed field (truncated if too long).
pub fn name_field(s: &str) -> [u8; NAME_LEN] {
    let mut out = [0u8; NAME_LEN];
    let n = s.len().min(NAME_LEN);
    out[..n].copy_from_slice(&s.as_bytes()[..n]);
    out
}

/// Fixed field → string, trimmed at the first NUL.
pub fn field_str(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

fn cfg() -> impl config::Config {
    config::standard()
        .with_fixed_int_encoding()
        .with_little_endian()
}

impl RawMap {
    pub fn read_from<R: Read>(r: &mut R) -> Result<Self, MapError> {
        let header: RawHeader = decode_from_std_read(r, cfg())?;
        if header.magic != MAGIC {
            return Err(MapError::BadMagic);
        }
        if header.width == 0 || header.height == 0 {
            return Err(MapError::EmptyGrid {
                width: header.width,
                height: header.height,
            });
        }

        let count = header.width as usize * header.height as usize;
        let mut cells = vec![0u32; count];
        r.read_u32_into::<LE>(&mut cells)?;

        let things_len = r.read_u32::<LE>()? as usize;
        let mut things = Vec::with_capacity(things_len.min(1024));
        for _ in 0..things_len {
            things.push(decode_from_std_read(r, cfg())?);
        }

        Ok(Self {
            header,
            cells,
            things,
        })
    }

    pub fn write_to<W: io::Write>(&self, w: &mut W) -> Result<(), MapError> {
        encode_into_std_write(self.header, w, cfg())?;
        for &c in &self.cells {
            w.write_u32::<LE>(c)?;
        }
        let count = u32::try_from(self.things.len()).map_err(|_| MapError::TooLarge {
            what: "thing list",
            len: self.things.len(),
        })?;
        w.write_u32::<LE>(count)?;
        for t in &self.things {
            encode_into_std_write(t, w, cfg())?;
        }
        Ok(())
    }

    /// Decode every cell word.
    pub fn unpack_cells(&self) -> Result<Vec<Cell>, MapError> {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, &w)| unpack_cell(w).map_err(|source| MapError::BadCell { index, source }))
            .collect()
    }
}

// ==========================================================================
// Tests
// ==========================================================================
