//! Per-channel frame buffer with the HT1632C packed memory layout.
//!
//! The chip's display RAM is addressed in 4-bit words, but the buffer packs
//! pixels eight to a byte so that a full byte maps onto two consecutive RAM
//! words. Bit 7 of a byte is the topmost pixel of its row group:
//!
//! - byte offset: `x * (COM / 8) + y / 8`
//! - bit mask: `0x80 >> (y % 8)`
//!
//! This matches the RAM layout in the HT1632C datasheet, so the renderer can
//! stream the buffer front to back without any reordering.
//!
//! Buffer mutation never touches hardware. Changes become visible on the
//! display only when the driver retransmits the buffer.
//!
//! # Example
//! ```rust
//! use ht1632c::framebuffer::{compute_buffer_size, FrameBuffer};
//!
//! const OUT: usize = 32; // columns
//! const COM: usize = 8; // rows
//! const SIZE: usize = compute_buffer_size(OUT, COM);
//!
//! let mut fb = FrameBuffer::<OUT, COM, SIZE>::new();
//! fb.set_pixel(3, 5);
//! assert!(fb.get_pixel(3, 5));
//! ```

use core::convert::Infallible;

use embedded_graphics::draw_target::DrawTarget;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::OriginDimensions;
use embedded_graphics::prelude::Size;
use embedded_graphics::Pixel;

/// Number of vertically adjacent pixels packed into one buffer byte.
pub const PIXELS_PER_BYTE: usize = 8;

/// Computes the buffer size in bytes for a chip with `out` columns and
/// `com` rows.
///
/// Use this to derive the `SIZE` parameter of [`FrameBuffer`]:
///
/// ```rust
/// use ht1632c::framebuffer::compute_buffer_size;
///
/// const SIZE: usize = compute_buffer_size(32, 8);
/// assert_eq!(SIZE, 32);
/// ```
#[must_use]
pub const fn compute_buffer_size(out: usize, com: usize) -> usize {
    out * com / PIXELS_PER_BYTE
}

/// Byte offset of pixel `(x, y)` within a channel buffer with `com` rows.
#[must_use]
pub const fn byte_offset(x: usize, y: usize, com: usize) -> usize {
    x * (com / PIXELS_PER_BYTE) + y / PIXELS_PER_BYTE
}

/// Bit mask of pixel row `y` within its buffer byte. Bit position
/// `7 - (y % 8)`, so the topmost pixel of a row group lands in the most
/// significant bit.
#[must_use]
pub const fn bit_mask(y: usize) -> u8 {
    0x80 >> (y % PIXELS_PER_BYTE)
}

/// One channel's worth of packed pixel memory.
///
/// # Type Parameters
/// - `OUT`: number of columns (chip output capacity)
/// - `COM`: number of rows (chip common capacity), a multiple of 8
/// - `SIZE`: buffer size in bytes, `compute_buffer_size(OUT, COM)`
///
/// Coordinates outside `x < OUT && y < COM` are silently ignored: mutators
/// are no-ops and reads return `false`. Invalid input never corrupts buffer
/// state.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct FrameBuffer<const OUT: usize, const COM: usize, const SIZE: usize> {
    data: [u8; SIZE],
}

impl<const OUT: usize, const COM: usize, const SIZE: usize> Default
    for FrameBuffer<OUT, COM, SIZE>
{
    fn default() -> Self {
        Self::new()
    }
}

impl<const OUT: usize, const COM: usize, const SIZE: usize> FrameBuffer<OUT, COM, SIZE> {
    /// Create a zeroed frame buffer.
    #[must_use]
    pub const fn new() -> Self {
        assert!(COM % PIXELS_PER_BYTE == 0);
        assert!(SIZE == compute_buffer_size(OUT, COM));

        Self { data: [0; SIZE] }
    }

    /// Set the pixel at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        if x >= OUT || y >= COM {
            return;
        }
        self.data[byte_offset(x, y, COM)] |= bit_mask(y);
    }

    /// Clear the pixel at `(x, y)`. Out-of-range coordinates are ignored.
    pub fn clear_pixel(&mut self, x: usize, y: usize) {
        if x >= OUT || y >= COM {
            return;
        }
        self.data[byte_offset(x, y, COM)] &= !bit_mask(y);
    }

    /// Get the pixel at `(x, y)`. Out-of-range coordinates read as `false`.
    #[must_use]
    pub fn get_pixel(&self, x: usize, y: usize) -> bool {
        if x >= OUT || y >= COM {
            return false;
        }
        self.data[byte_offset(x, y, COM)] & bit_mask(y) != 0
    }

    /// Turn every pixel on.
    pub fn fill(&mut self) {
        for byte in self.data.iter_mut() {
            *byte = 0xFF;
        }
    }

    /// Turn every pixel off.
    pub fn clear(&mut self) {
        for byte in self.data.iter_mut() {
            *byte = 0x00;
        }
    }

    /// The packed bytes, in chip RAM order.
    #[must_use]
    pub const fn data(&self) -> &[u8; SIZE] {
        &self.data
    }
}

impl<const OUT: usize, const COM: usize, const SIZE: usize> OriginDimensions
    for FrameBuffer<OUT, COM, SIZE>
{
    fn size(&self) -> Size {
        Size::new(OUT as u32, COM as u32)
    }
}

impl<const OUT: usize, const COM: usize, const SIZE: usize> DrawTarget
    for FrameBuffer<OUT, COM, SIZE>
{
    type Color = BinaryColor;

    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(p, color) in pixels {
            if p.x < 0 || p.y < 0 {
                continue;
            }
            match color {
                BinaryColor::On => self.set_pixel(p.x as usize, p.y as usize),
                BinaryColor::Off => self.clear_pixel(p.x as usize, p.y as usize),
            }
        }
        Ok(())
    }
}

#[cfg(feature = "log")]
impl<const OUT: usize, const COM: usize, const SIZE: usize> core::fmt::Debug
    for FrameBuffer<OUT, COM, SIZE>
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FrameBuffer")
            .field("out", &OUT)
            .field("com", &COM)
            .field("size", &SIZE)
            .finish()
    }
}

#[cfg(feature = "defmt")]
impl<const OUT: usize, const COM: usize, const SIZE: usize> defmt::Format
    for FrameBuffer<OUT, COM, SIZE>
{
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "FrameBuffer<{}, {}, {}>", OUT, COM, SIZE);
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::collections::HashSet;
    use std::vec::Vec;

    use embedded_graphics::prelude::Point;
    use embedded_graphics::Drawable;

    use super::*;

    const OUT: usize = 32;
    const COM: usize = 8;
    const SIZE: usize = compute_buffer_size(OUT, COM);

    type Buffer = FrameBuffer<OUT, COM, SIZE>;

    #[test]
    fn test_compute_buffer_size() {
        assert_eq!(compute_buffer_size(32, 8), 32);
        assert_eq!(compute_buffer_size(24, 16), 48);
        assert_eq!(compute_buffer_size(8, 8), 8);
    }

    #[test]
    fn test_new_is_zeroed() {
        let fb = Buffer::new();
        assert!(fb.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_set_get_clear_round_trip() {
        let mut fb = Buffer::new();
        for x in 0..OUT {
            for y in 0..COM {
                fb.set_pixel(x, y);
                assert!(fb.get_pixel(x, y), "set failed at ({x}, {y})");
                fb.clear_pixel(x, y);
                assert!(!fb.get_pixel(x, y), "clear failed at ({x}, {y})");
            }
        }
    }

    #[test]
    fn test_no_aliasing_between_pixels() {
        let mut fb = Buffer::new();
        fb.set_pixel(3, 5);
        for x in 0..OUT {
            for y in 0..COM {
                assert_eq!(fb.get_pixel(x, y), x == 3 && y == 5);
            }
        }
        fb.clear_pixel(3, 5);
        assert!(fb.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut fb = Buffer::new();
        let out_of_range = [
            (OUT, 0),
            (0, COM),
            (OUT, COM),
            (usize::MAX, 0),
            (0, usize::MAX),
        ];
        for (x, y) in out_of_range {
            fb.set_pixel(x, y);
            assert!(!fb.get_pixel(x, y));
        }
        assert!(fb.data().iter().all(|&b| b == 0));

        fb.fill();
        for (x, y) in out_of_range {
            fb.clear_pixel(x, y);
        }
        assert!(fb.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_fill_and_clear() {
        let mut fb = Buffer::new();
        fb.fill();
        for x in 0..OUT {
            for y in 0..COM {
                assert!(fb.get_pixel(x, y));
            }
        }
        fb.clear();
        for x in 0..OUT {
            for y in 0..COM {
                assert!(!fb.get_pixel(x, y));
            }
        }
    }

    #[test]
    fn test_addressing_is_injective() {
        // Distinct valid (x, y) must map to distinct (byte, mask) pairs.
        let mut seen = HashSet::new();
        for x in 0..OUT {
            for y in 0..COM {
                let offset = byte_offset(x, y, COM);
                assert!(offset < SIZE, "offset {offset} escapes buffer");
                assert!(seen.insert((offset, bit_mask(y))));
            }
        }
        assert_eq!(seen.len(), OUT * COM);
    }

    #[test]
    fn test_addressing_16_commons() {
        // 16-common variants pack two row groups per column.
        assert_eq!(byte_offset(0, 0, 16), 0);
        assert_eq!(byte_offset(0, 8, 16), 1);
        assert_eq!(byte_offset(1, 0, 16), 2);
        assert_eq!(byte_offset(5, 12, 16), 11);
    }

    #[test]
    fn test_bit_mask_is_msb_for_top_row() {
        assert_eq!(bit_mask(0), 0b1000_0000);
        assert_eq!(bit_mask(7), 0b0000_0001);
        assert_eq!(bit_mask(8), 0b1000_0000);
        let masks: Vec<u8> = (0..8).map(bit_mask).collect();
        assert_eq!(masks, [0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01]);
    }

    #[test]
    fn test_packed_byte_layout() {
        let mut fb = Buffer::new();
        fb.set_pixel(0, 0);
        assert_eq!(fb.data()[0], 0x80);
        fb.set_pixel(0, 7);
        assert_eq!(fb.data()[0], 0x81);
        fb.set_pixel(1, 0);
        assert_eq!(fb.data()[1], 0x80);
    }

    #[test]
    fn test_draw_target() {
        let mut fb = Buffer::new();
        Pixel(Point::new(2, 3), BinaryColor::On)
            .draw(&mut fb)
            .unwrap();
        assert!(fb.get_pixel(2, 3));

        Pixel(Point::new(2, 3), BinaryColor::Off)
            .draw(&mut fb)
            .unwrap();
        assert!(!fb.get_pixel(2, 3));

        // Negative and out-of-range points are dropped.
        Pixel(Point::new(-1, 0), BinaryColor::On)
            .draw(&mut fb)
            .unwrap();
        Pixel(Point::new(OUT as i32, 0), BinaryColor::On)
            .draw(&mut fb)
            .unwrap();
        assert!(fb.data().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_dimensions() {
        let fb = Buffer::new();
        assert_eq!(fb.size(), Size::new(OUT as u32, COM as u32));
    }
}
