// Name-keyed repository of decoded images (wall atlas, sprite sheets).
// The renderer and world logic interact through `TextureId` only.

use std::collections::HashMap;
use std::path::Path;

use glam::{UVec2, uvec2};

use super::grid::MAX_FACE;
use crate::renderer::Rgba;

/// Runtime handle for a texture in this bank.
///
/// *Guaranteed* to remain stable for the lifetime of the bank.
pub type TextureId = u16;

/// `TextureId` whose pixels are the checkerboard fallback.
/// Always = 0 because `TextureBank::new()` inserts it first.
pub const NO_TEXTURE: TextureId = 0;

/// Size of one wall cell inside the atlas.
pub const TEX_WIDTH: usize = 64;
pub const TEX_HEIGHT: usize = 64;

/// CPU-side storage: 32-bit **ARGB** (0xAARRGGBB) in row-major order.
#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub name: String,
    pub w: usize,
    pub h: usize,
    pub pixels: Vec<Rgba>,
}

/// Convenience checkerboard 8×8 (dark/light grey).
impl Default for Texture {
    fn default() -> Self {
        const LIGHT: Rgba = 0xFF_A0A0A0;
        const DARK: Rgba = 0xFF_505050;
        let mut pix = vec![0; 8 * 8];
        for y in 0..8 {
            for x in 0..8 {
                pix[y * 8 + x] = if (x ^ y) & 1 == 0 { LIGHT } else { DARK };
            }
        }
        Texture {
            name: "CHECKER".to_string(),
            w: 8,
            h: 8,
            pixels: pix,
        }
    }
}

impl Texture {
    /// Convert a decoded RGBA image into ARGB pixels.
    pub fn from_image(name: impl Into<String>, img: &image::RgbaImage) -> Self {
        let pixels = img
            .pixels()
            .map(|p| {
                let [r, g, b, a] = p.0;
                (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
            })
            .collect();
        Texture {
            name: name.into(),
            w: img.width() as usize,
            h: img.height() as usize,
            pixels,
        }
    }

    /// Texel at `(x, y)`, wrapping around the edges like a tiled wall.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Rgba {
        if self.pixels.is_empty() {
            return 0;
        }
        self.pixels[(y % self.h) * self.w + (x % self.w)]
    }
}

/// Things that can go wrong when using the bank.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    /// Attempted to insert a second texture with an existing name.
    #[error("texture name `{0}` already present in bank")]
    Duplicate(String),

    /// Requested ID is outside `0 .. bank.len()`.
    #[error("texture id {0} out of range")]
    BadId(TextureId),

    #[error("cannot decode `{name}`: {source}")]
    Decode {
        name: String,
        source: image::ImageError,
    },
}

/// A name-keyed cache of textures.
///
/// * Does **not** know about map files; the loader handles those.
/// * Stores exactly one copy of every name.
/// * ID **0** is always the “missing” checkerboard.
///
/// Owned by whoever renders; pass it by reference to loaders that need to
/// add images.
pub struct TextureBank {
    by_name: HashMap<String, TextureId>,
    data: Vec<Texture>,
}

impl TextureBank {
    // ---------------------------------------------------------------------
    // Constructors
    // ---------------------------------------------------------------------

    /// Create an empty bank with a mandatory *missing* texture used as
    /// fallback.  The texture is inserted under the fixed name `"MISSING"`
    /// and obtains the handle **0**.
    pub fn new(missing_tex: Texture) -> Self {
        let mut by_name = HashMap::new();
        by_name.insert("MISSING".into(), NO_TEXTURE);
        Self {
            by_name,
            data: vec![missing_tex],
        }
    }

    pub fn default_with_checker() -> Self {
        Self::new(Texture::default())
    }

    // ---------------------------------------------------------------------
    // Query helpers
    // ---------------------------------------------------------------------

    /// Number of textures stored (including the “missing” one).
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.len() == 1
    } // only checker

    /// Obtain the id for a *loaded* texture by name.
    pub fn id(&self, name: &str) -> Option<TextureId> {
        self.by_name.get(name).copied()
    }

    /// Fallback-safe query: unknown names resolve to the checkerboard id.
    pub fn id_or_missing(&self, name: &str) -> TextureId {
        self.id(name).unwrap_or(NO_TEXTURE)
    }

    /// Borrow a texture by id, with bounds-checking.
    pub fn texture(&self, id: TextureId) -> Result<&Texture, TextureError> {
        self.data.get(id as usize).ok_or(TextureError::BadId(id))
    }

    /// Borrow a texture, falling back to the checkerboard for bad ids.
    pub fn texture_or_missing(&self, id: TextureId) -> &Texture {
        self.data.get(id as usize).unwrap_or(&self.data[0])
    }

    // ---------------------------------------------------------------------
    // Mutations
    // ---------------------------------------------------------------------

    /// Insert a texture under `name`.
    ///
    /// * Returns the newly assigned `TextureId`.
    /// * Fails if the name already exists (`Duplicate`).
    pub fn insert<S: Into<String>>(
        &mut self,
        name: S,
        tex: Texture,
    ) -> Result<TextureId, TextureError> {
        let name = name.into();
        if self.by_name.contains_key(&name) {
            return Err(TextureError::Duplicate(name));
        }
        let id = self.data.len() as TextureId;
        self.data.push(tex);
        self.by_name.insert(name, id);
        Ok(id)
    }

    /// Return the cached id for `name`, decoding `root/name` on first use.
    pub fn load(&mut self, root: &Path, name: &str) -> Result<TextureId, TextureError> {
        if let Some(id) = self.id(name) {
            return Ok(id);
        }
        let img = image::open(root.join(name))
            .map_err(|source| TextureError::Decode {
                name: name.to_owned(),
                source,
            })?
            .to_rgba8();
        log::debug!("decoded texture {name} ({}x{})", img.width(), img.height());
        self.insert(name, Texture::from_image(name, &img))
    }
}

/*======================================================================*/
/*                               Atlas                                  */
/*======================================================================*/

/// Wall atlas: a grid of `TEX_WIDTH × TEX_HEIGHT` cells. Face index `n`
/// (1-based) lives in slot `n - 1`, laid out row-major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Atlas {
    pub texture: TextureId,
    pub columns: usize,
    pub rows: usize,
}

impl Atlas {
    /// Slice `tex` into wall cells.
    pub fn new(texture: TextureId, tex: &Texture) -> Self {
        Self {
            texture,
            columns: (tex.w / TEX_WIDTH).max(1),
            rows: (tex.h / TEX_HEIGHT).max(1),
        }
    }

    /// Placeholder atlas over the checkerboard; every face resolves.
    pub fn missing() -> Self {
        Self {
            texture: NO_TEXTURE,
            columns: 1,
            rows: MAX_FACE as usize,
        }
    }

    /// Top-left texel of face `face`; `None` for `0` or a slot past the atlas.
    pub fn cell_origin(&self, face: u8) -> Option<UVec2> {
        let slot = (face as usize).checked_sub(1)?;
        let (col, row) = (slot % self.columns, slot / self.columns);
        (row < self.rows).then(|| uvec2((col * TEX_WIDTH) as u32, (row * TEX_HEIGHT) as u32))
    }
}

/*======================================================================*/
/*                               Tests                                  */
/*======================================================================*/
#[cfg(test)]
mod tests {
    use super::*;

    fn dummy_tex(color: Rgba) -> Texture {
        Texture {
            name: "Dummy".to_string(),
            w: 2,
            h: 2,
            pixels: vec![color; 4],
        }
    }

    #[test]
    fn insert_and_lookup() {
        let mut bank = TextureBank::default_with_checker();
        let red = bank.insert("RED", dummy_tex(0xFF_FF0000)).unwrap();
        let blue = bank.insert("BLUE", dummy_tex(0xFF_0000FF)).unwrap();

        assert_ne!(red, NO_TEXTURE);
        assert_ne!(blue, red);
        assert_eq!(bank.id("RED"), Some(red));
        assert_eq!(bank.id("BLUE"), Some(blue));
        assert_eq!(bank.id("NOPE"), None);

        assert_eq!(bank.texture(red).unwrap().pixels[0], 0xFF_FF0000);
        assert_eq!(bank.texture(blue).unwrap().pixels[0], 0xFF_0000FF);
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut bank = TextureBank::default_with_checker();
        bank.insert("WOOD", dummy_tex(1)).unwrap();
        let err = bank.insert("WOOD", dummy_tex(2)).unwrap_err();
        assert!(matches!(err, TextureError::Duplicate(n) if n == "WOOD"));
        // texture count still 2 (checker + first WOOD)
        assert_eq!(bank.len(), 2);
    }

    #[test]
    fn bad_id_guard() {
        let bank = TextureBank::default_with_checker();
        let bad = TextureId::MAX;
        assert!(matches!(bank.texture(bad), Err(TextureError::BadId(id)) if id == bad));
        assert_eq!(bank.texture_or_missing(bad).name, "CHECKER");
    }

    #[test]
    fn load_is_cached_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut img = image::RgbaImage::new(2, 1);
        img.put_pixel(1, 0, image::Rgba([10, 20, 30, 255]));
        img.save(dir.path().join("px.png")).unwrap();

        let mut bank = TextureBank::default_with_checker();
        let a = bank.load(dir.path(), "px.png").unwrap();
        let b = bank.load(dir.path(), "px.png").unwrap();
        assert_eq!(a, b);
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.texture(a).unwrap().pixel(1, 0), 0xFF_0A141E);
        assert_eq!(bank.texture(a).unwrap().pixel(0, 0), 0);
    }

    #[test]
    fn missing_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut bank = TextureBank::default_with_checker();
        assert!(matches!(
            bank.load(dir.path(), "nope.png"),
            Err(TextureError::Decode { .. })
        ));
    }

    #[test]
    fn atlas_slots_are_one_based_row_major() {
        let tex = Texture {
            name: "walls".into(),
            w: 3 * TEX_WIDTH,
            h: 18 * TEX_HEIGHT,
            pixels: vec![0; 3 * TEX_WIDTH * 18 * TEX_HEIGHT],
        };
        let atlas = Atlas::new(1, &tex);
        assert_eq!((atlas.columns, atlas.rows), (3, 18));
        assert_eq!(atlas.cell_origin(0), None);
        assert_eq!(atlas.cell_origin(1), Some(uvec2(0, 0)));
        assert_eq!(atlas.cell_origin(3), Some(uvec2(128, 0)));
        assert_eq!(atlas.cell_origin(5), Some(uvec2(64, 64)));
        assert_eq!(atlas.cell_origin(54), Some(uvec2(128, 17 * 64)));
        assert_eq!(atlas.cell_origin(55), None);
    }
}
