//! # Pixel Grid
//!
//! One complete image for the rotating display.
//!
//! ## Addressing
//!
//! ```text
//!   column : angular position around the revolution (0..C)
//!   row    : radial LED index along the arm          (0..R)
//!   layer  : depth tier along the spin axis          (0..L)
//! ```
//!
//! Storage is column-major: every pixel of one angular position is
//! contiguous, which is the order an LED driver streams them out while
//! the arm sweeps past that angle.
//!
//! ## Bounds Policy
//!
//! Coordinates are signed so animations can compute positions that slide
//! off the edge. Anything outside the geometry is ignored on write and
//! reads back as `None`. This is policy, not an error.

use bytemuck::{Pod, Zeroable};
use pov_shared::{DISPLAY_COLUMNS, DISPLAY_LAYERS, DISPLAY_ROWS};

/// 8-bit RGB pixel.
///
/// `#[repr(C)]` and `Pod` so a whole frame can be handed to a driver as a
/// flat RGB byte slice with no copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Pixel {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

impl Pixel {
    /// LED off.
    pub const BLACK: Self = Self::new(0, 0, 0);
    /// Full white.
    pub const WHITE: Self = Self::new(255, 255, 255);
    /// Full red.
    pub const RED: Self = Self::new(255, 0, 0);
    /// Full green.
    pub const GREEN: Self = Self::new(0, 255, 0);
    /// Full blue.
    pub const BLUE: Self = Self::new(0, 0, 255);

    /// Creates a pixel from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Returns true if any channel is non-zero.
    #[inline]
    #[must_use]
    pub const fn is_lit(self) -> bool {
        self.r != 0 || self.g != 0 || self.b != 0
    }
}

/// Fixed extents of a frame.
///
/// Chosen once at construction; frames never resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Geometry {
    /// Angular positions (C).
    pub columns: usize,
    /// Radial LEDs (R).
    pub rows: usize,
    /// Depth tiers (L).
    pub layers: usize,
}

impl Geometry {
    /// The production display: 96 x 8 x 6.
    pub const POV: Self = Self::new(DISPLAY_COLUMNS, DISPLAY_ROWS, DISPLAY_LAYERS);

    /// Creates a geometry.
    #[inline]
    #[must_use]
    pub const fn new(columns: usize, rows: usize, layers: usize) -> Self {
        Self { columns, rows, layers }
    }

    /// Total number of pixels.
    #[inline]
    #[must_use]
    pub const fn pixel_count(&self) -> usize {
        self.columns * self.rows * self.layers
    }

    /// Whether any extent is zero, leaving no addressable pixel.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.columns == 0 || self.rows == 0 || self.layers == 0
    }

    /// Pixels in one angular column (all layers, all rows).
    #[inline]
    #[must_use]
    pub const fn column_len(&self) -> usize {
        self.rows * self.layers
    }

    /// Returns the storage index of a coordinate, or `None` if it lies
    /// outside the geometry.
    #[inline]
    #[must_use]
    pub fn index_of(&self, column: i32, row: i32, layer: i32) -> Option<usize> {
        let column = usize::try_from(column).ok().filter(|&c| c < self.columns)?;
        let row = usize::try_from(row).ok().filter(|&r| r < self.rows)?;
        let layer = usize::try_from(layer).ok().filter(|&l| l < self.layers)?;
        Some((column * self.layers + layer) * self.rows + row)
    }
}

impl Default for Geometry {
    fn default() -> Self {
        Self::POV
    }
}

/// A complete C x R x L image.
///
/// The pixel storage is allocated once in [`Frame::new`]; every other
/// operation works in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    geometry: Geometry,
    pixels: Box<[Pixel]>,
}

impl Frame {
    /// Creates an all-black frame.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry,
            pixels: vec![Pixel::BLACK; geometry.pixel_count()].into_boxed_slice(),
        }
    }

    /// Returns the frame geometry.
    #[inline]
    #[must_use]
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Sets one pixel. Out-of-range coordinates are ignored.
    #[inline]
    pub fn set_pixel(&mut self, column: i32, row: i32, layer: i32, color: Pixel) {
        if let Some(idx) = self.geometry.index_of(column, row, layer) {
            self.pixels[idx] = color;
        }
    }

    /// Reads one pixel, or `None` for out-of-range coordinates.
    #[inline]
    #[must_use]
    pub fn pixel(&self, column: i32, row: i32, layer: i32) -> Option<Pixel> {
        self.geometry
            .index_of(column, row, layer)
            .map(|idx| self.pixels[idx])
    }

    /// Turns every LED off.
    #[inline]
    pub fn clear(&mut self) {
        self.fill(Pixel::BLACK);
    }

    /// Sets every pixel to `color`.
    #[inline]
    pub fn fill(&mut self, color: Pixel) {
        self.pixels.fill(color);
    }

    /// All pixels in storage order.
    #[inline]
    #[must_use]
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Pixels of one angular column, layer by layer, or `None` past the edge.
    #[must_use]
    pub fn column(&self, column: usize) -> Option<&[Pixel]> {
        if column >= self.geometry.columns {
            return None;
        }
        let len = self.geometry.column_len();
        let start = column * len;
        Some(&self.pixels[start..start + len])
    }

    /// Zero-copy RGB byte view for output drivers.
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Number of pixels that are not black.
    #[must_use]
    pub fn lit_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.is_lit()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_creation() {
        let frame = Frame::new(Geometry::POV);
        assert_eq!(frame.pixels().len(), 96 * 8 * 6);
        assert_eq!(frame.lit_count(), 0);
        assert_eq!(frame.as_bytes().len(), 96 * 8 * 6 * 3);
    }

    #[test]
    fn test_empty_geometry() {
        assert!(!Geometry::POV.is_empty());
        assert!(Geometry::new(0, 8, 6).is_empty());
        assert!(Geometry::new(96, 0, 6).is_empty());
        assert!(Geometry::new(96, 8, 0).is_empty());

        let mut frame = Frame::new(Geometry::new(0, 8, 6));
        frame.set_pixel(0, 0, 0, Pixel::WHITE);
        assert_eq!(frame.pixel(0, 0, 0), None);
        assert_eq!(frame.lit_count(), 0);
    }

    #[test]
    fn test_set_then_clear() {
        let mut frame = Frame::new(Geometry::POV);
        frame.set_pixel(5, 2, 1, Pixel::new(255, 0, 0));
        assert_eq!(frame.pixel(5, 2, 1), Some(Pixel::RED));
        assert_eq!(frame.lit_count(), 1);

        frame.clear();
        assert_eq!(frame.pixel(5, 2, 1), Some(Pixel::BLACK));
        assert_eq!(frame.lit_count(), 0);
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut frame = Frame::new(Geometry::new(4, 2, 1));
        frame.set_pixel(-1, 0, 0, Pixel::WHITE);
        frame.set_pixel(4, 0, 0, Pixel::WHITE);
        frame.set_pixel(0, 2, 0, Pixel::WHITE);
        frame.set_pixel(0, 0, 1, Pixel::WHITE);
        frame.set_pixel(i32::MIN, i32::MAX, -7, Pixel::WHITE);

        assert_eq!(frame.lit_count(), 0);
        assert_eq!(frame.pixel(-1, 0, 0), None);
        assert_eq!(frame.pixel(0, 0, 1), None);
    }

    #[test]
    fn test_column_is_contiguous() {
        let geometry = Geometry::new(3, 2, 2);
        let mut frame = Frame::new(geometry);
        for layer in 0..2 {
            for row in 0..2 {
                frame.set_pixel(1, row, layer, Pixel::GREEN);
            }
        }

        assert!(frame.column(0).unwrap().iter().all(|p| !p.is_lit()));
        assert!(frame.column(1).unwrap().iter().all(|p| *p == Pixel::GREEN));
        assert!(frame.column(2).unwrap().iter().all(|p| !p.is_lit()));
        assert!(frame.column(3).is_none());
    }

    #[test]
    fn test_byte_view_is_rgb_order() {
        let mut frame = Frame::new(Geometry::new(1, 1, 1));
        frame.set_pixel(0, 0, 0, Pixel::new(1, 2, 3));
        assert_eq!(frame.as_bytes(), &[1, 2, 3]);
    }
}
