//! Glyph compositing
//!
//! Blends a 2-bit coverage bitmap in a foreground color onto a slice buffer.
//! The clip rectangle is resolved once up front into start offsets and row
//! skips for both the bitmap and the buffer, so the inner loop only walks two
//! linear indices.

use crate::color::Rgb;
use crate::dither::Dither;
use crate::framebuffer::FrameBuffer;
use crate::glyph::CoverageBitmap;

/// Overlap of a bitmap placed at an origin with the target buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Clip {
    /// First bitmap pixel inside the buffer
    src_start: usize,
    /// First buffer pixel covered by the bitmap
    dst_start: usize,
    /// Bitmap pixels to skip after each row
    src_skip: usize,
    /// Buffer pixels to skip after each row
    dst_skip: usize,
    /// Buffer column of the first covered pixel
    x0: usize,
    /// Buffer row of the first covered pixel
    y0: usize,
    line_width: usize,
    rows: usize,
}

impl Clip {
    /// Returns `None` when nothing of the bitmap lands in the buffer
    fn new(
        src_w: i32,
        src_h: i32,
        dst_w: i32,
        dst_h: i32,
        origin_x: i32,
        origin_y: i32,
    ) -> Option<Self> {
        if origin_x >= dst_w || origin_y >= dst_h || origin_x + src_w <= 0 || origin_y + src_h <= 0
        {
            return None;
        }

        let x0 = origin_x.max(0);
        let y0 = origin_y.max(0);
        let x1 = (origin_x + src_w).min(dst_w);
        let y1 = (origin_y + src_h).min(dst_h);
        let line_width = x1 - x0;

        Some(Self {
            src_start: ((y0 - origin_y) * src_w + (x0 - origin_x)) as usize,
            dst_start: (y0 * dst_w + x0) as usize,
            src_skip: (src_w - line_width) as usize,
            dst_skip: (dst_w - line_width) as usize,
            x0: x0 as usize,
            y0: y0 as usize,
            line_width: line_width as usize,
            rows: (y1 - y0) as usize,
        })
    }
}

/// Mix background and foreground for a non-zero coverage level
#[inline]
fn blend(bg: u8, fg: u8, level: u8) -> u8 {
    match level {
        1 => (bg >> 1) + (fg >> 1),
        2 => (bg >> 2) + 3 * (fg >> 2),
        _ => fg,
    }
}

/// Draw `bitmap` in color `fg` with its top-left corner at the origin
///
/// The origin is in buffer coordinates and may be negative or beyond the
/// far edges; only the overlapping part is drawn. Level 0 pixels are left
/// alone, level 3 pixels become `fg`, levels 1 and 2 mix ½ and ¾ of `fg`
/// into the existing color. Every written pixel is re-packed through
/// `dither` at its buffer position.
pub fn composite(
    bitmap: &CoverageBitmap<'_>,
    target: &mut FrameBuffer,
    fg: Rgb,
    origin_x: i32,
    origin_y: i32,
    dither: &Dither,
) {
    let Some(clip) = Clip::new(
        i32::from(bitmap.width()),
        i32::from(bitmap.height()),
        i32::from(target.width()),
        i32::from(target.lines()),
        origin_x,
        origin_y,
    ) else {
        return;
    };

    let mut src = clip.src_start;
    let mut dst = clip.dst_start;
    for row in 0..clip.rows {
        let y = clip.y0 + row;
        for col in 0..clip.line_width {
            let level = bitmap.level(src);
            if level != 0 {
                let bg = target.pixel(dst).unpack();
                let mixed = Rgb::new(
                    blend(bg.r, fg.r, level),
                    blend(bg.g, fg.g, level),
                    blend(bg.b, fg.b, level),
                );
                target.set_pixel(dst, dither.pack(mixed, clip.x0 + col, y));
            }
            src += 1;
            dst += 1;
        }
        src += clip.src_skip;
        dst += clip.dst_skip;
    }
}
