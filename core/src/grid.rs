use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Location of a single floor pixel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PixelCoord {
    x: u32,
    y: u32,
}

impl PixelCoord {
    /// Creates a new pixel coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column of the pixel.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row of the pixel.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Position of the pixel in pixel space.
    #[must_use]
    pub fn to_vec2(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Size of the discretized floor measured in whole pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FloorDimensions {
    width: u32,
    height: u32,
}

impl FloorDimensions {
    /// Creates a new floor description.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixel columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of pixel rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of pixels on the floor.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Floor extent as a vector, used to scale normalized positions.
    #[must_use]
    pub fn extent(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    /// Converts a normalized floor position into pixel space.
    #[must_use]
    pub fn to_pixel_space(&self, normalized: Vec2) -> Vec2 {
        normalized * self.extent()
    }

    /// Reports whether the pixel lies on the floor.
    #[must_use]
    pub const fn contains(&self, pixel: PixelCoord) -> bool {
        pixel.x < self.width && pixel.y < self.height
    }

    /// Row-major storage index of the pixel, if it lies on the floor.
    #[must_use]
    pub fn index(&self, pixel: PixelCoord) -> Option<usize> {
        if self.contains(pixel) {
            Some(pixel.y as usize * self.width as usize + pixel.x as usize)
        } else {
            None
        }
    }

    pub(crate) fn coord(&self, index: usize) -> PixelCoord {
        let width = self.width as usize;
        PixelCoord::new((index % width) as u32, (index / width) as u32)
    }
}

/// Dense per-pixel buffer covering the whole floor.
///
/// Grids are only produced by [`crate::Substrate::map_grid`], so every grid is
/// fully materialized by the time another stage can read it.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    dimensions: FloorDimensions,
    cells: Vec<T>,
}

impl<T> Grid<T> {
    pub(crate) fn from_raw(dimensions: FloorDimensions, cells: Vec<T>) -> Self {
        debug_assert_eq!(cells.len(), dimensions.cell_count());
        Self { dimensions, cells }
    }

    /// Dimensions of the floor the grid covers.
    #[must_use]
    pub const fn dimensions(&self) -> FloorDimensions {
        self.dimensions
    }

    /// Row-major view of every cell.
    #[must_use]
    pub fn cells(&self) -> &[T] {
        &self.cells
    }

    /// Returns the value stored for the pixel, if it lies on the floor.
    #[must_use]
    pub fn get(&self, pixel: PixelCoord) -> Option<&T> {
        self.dimensions
            .index(pixel)
            .and_then(|index| self.cells.get(index))
    }

    /// Iterator over every pixel and its value in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (PixelCoord, &T)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, value)| (self.dimensions.coord(index), value))
    }
}

impl<T: Copy> Grid<T> {
    /// Returns a copy of the value stored for the pixel, if it lies on the floor.
    #[must_use]
    pub fn value(&self, pixel: PixelCoord) -> Option<T> {
        self.get(pixel).copied()
    }
}
