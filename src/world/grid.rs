use bitflags::bitflags;
use glam::IVec2;
use thiserror::Error;

/// Highest texture index a face may carry (atlas holds 54 wall cells).
pub const MAX_FACE: u8 = 54;

bitflags! {
    /// Behaviour flags carried by a map cell, independent of its faces.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct CellFlags: u8 {
        /// Blocks viewer movement.
        const COLLIDE = 0x01;
        /// Slides open when used; rendered inset into its frame.
        const DOOR    = 0x02;
        const SECRET  = 0x04;
    }
}

/// One of the four faces of a cell.
///
/// A face is named after the direction the ray was travelling when it
/// struck it: a ray heading north (`-y`) strikes the `North` face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    North,
    East,
    South,
    West,
}

impl Face {
    pub const ALL: [Face; 4] = [Face::North, Face::East, Face::South, Face::West];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Offset to the cell the struck face looks into (where the ray came from).
    #[inline]
    pub fn outward(self) -> IVec2 {
        match self {
            Face::North => IVec2::new(0, 1),
            Face::East => IVec2::new(1, 0),
            Face::South => IVec2::new(0, -1),
            Face::West => IVec2::new(-1, 0),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("face index {0} outside 0..={MAX_FACE}")]
pub struct FaceIndexError(pub u8);

/// One tile of the map: four face textures (`0` = none) plus flags.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Cell {
    faces: [u8; 4],
    pub flags: CellFlags,
}

impl Cell {
    pub const EMPTY: Cell = Cell {
        faces: [0; 4],
        flags: CellFlags::empty(),
    };

    /// Build a cell from `[north, east, south, west]` face indices.
    pub fn new(faces: [u8; 4], flags: CellFlags) -> Result<Self, FaceIndexError> {
        if let Some(&bad) = faces.iter().find(|&&f| f > MAX_FACE) {
            return Err(FaceIndexError(bad));
        }
        Ok(Self { faces, flags })
    }

    /// Collidable wall with the same texture on every face (clamped to 1..=54).
    pub fn solid(tex: u8) -> Self {
        let tex = tex.clamp(1, MAX_FACE);
        Self {
            faces: [tex; 4],
            flags: CellFlags::COLLIDE,
        }
    }

    #[inline]
    pub fn face(&self, face: Face) -> u8 {
        self.faces[face.index()]
    }

    #[inline]
    pub fn faces(&self) -> [u8; 4] {
        self.faces
    }

    pub fn set_face(&mut self, face: Face, tex: u8) -> Result<(), FaceIndexError> {
        if tex > MAX_FACE {
            return Err(FaceIndexError(tex));
        }
        self.faces[face.index()] = tex;
        Ok(())
    }

    /// No faces and no flags.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces == [0; 4] && self.flags.is_empty()
    }

    /// Anything that stops a ray. Flag-only cells count as invisible walls.
    #[inline]
    pub fn is_wall(&self) -> bool {
        !self.is_empty()
    }

    #[inline]
    pub fn is_door(&self) -> bool {
        self.flags.contains(CellFlags::DOOR)
    }
}

/// Fixed-size, row-major tile map.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::EMPTY; width * height],
        }
    }

    /// Wrap an existing row-major cell vector; `None` if the length is wrong.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Option<Self> {
        (cells.len() == width * height).then_some(Self {
            width,
            height,
            cells,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Linear index `y * width + x`, or `None` outside the grid.
    #[inline]
    pub fn index(&self, x: i32, y: i32) -> Option<usize> {
        self.contains(x, y)
            .then(|| y as usize * self.width + x as usize)
    }

    /// Inverse of [`Grid::index`].
    #[inline]
    pub fn coords(&self, idx: usize) -> IVec2 {
        let x = idx % self.width;
        IVec2::new(x as i32, ((idx - x) / self.width) as i32)
    }

    /// Cell at `(x, y)`; [`Cell::EMPTY`] outside the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Cell {
        self.index(x, y).map_or(Cell::EMPTY, |i| self.cells[i])
    }

    #[inline]
    pub fn get_index(&self, idx: usize) -> Cell {
        self.cells.get(idx).copied().unwrap_or(Cell::EMPTY)
    }

    /// Overwrite a cell. Returns `false` (and does nothing) outside the grid.
    pub fn set(&mut self, x: i32, y: i32, cell: Cell) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = cell;
                true
            }
            None => false,
        }
    }

    pub fn set_index(&mut self, idx: usize, cell: Cell) -> bool {
        match self.cells.get_mut(idx) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_wall(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_wall()
    }

    #[inline]
    pub fn is_door(&self, x: i32, y: i32) -> bool {
        self.get(x, y).is_door()
    }
}
