//! Headless PNG export of a rendered frame, for tests and offline tooling
//! that can't spin up the Piston window `main.rs` uses.
//!
//! Grounded on the teacher's own `image` dependency (already used by
//! `main.rs` to back its `G2dTexture`) and on the pack's render-dump
//! examples (e.g. `emu-nes`'s `render_test.rs`), which write a rendered
//! framebuffer out for visual inspection rather than asserting on it
//! pixel-by-pixel in a unit test.

use std::io;
use std::path::Path;

use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH};

/// Packs a `render()` buffer (row-major ARGB8888, `SCREEN_WIDTH *
/// SCREEN_HEIGHT` entries) into an RGBA `image::RgbaImage`.
pub fn to_rgba_image(frame: &[u32]) -> image::RgbaImage {
    assert_eq!(frame.len(), SCREEN_WIDTH * SCREEN_HEIGHT, "frame is not a full 256x240 buffer");
    image::ImageBuffer::from_fn(SCREEN_WIDTH as u32, SCREEN_HEIGHT as u32, |x, y| {
        let argb = frame[y as usize * SCREEN_WIDTH + x as usize];
        let r = (argb >> 16) as u8;
        let g = (argb >> 8) as u8;
        let b = argb as u8;
        image::Rgba([r, g, b, 0xFF])
    })
}

/// Writes a `render()` buffer to `path` as a PNG. Intended for debugging a
/// failing scenario test or eyeballing a new mapper's output, not for
/// byte-exact pixel assertions (use the buffer indices directly for those).
pub fn save_png<P: AsRef<Path>>(frame: &[u32], path: P) -> io::Result<()> {
    to_rgba_image(frame)
        .save(path)
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_solid_frame_to_matching_rgba_image() {
        let frame = vec![0xFF00_80FFu32; SCREEN_WIDTH * SCREEN_HEIGHT];
        let image = to_rgba_image(&frame);
        assert_eq!(image.width(), SCREEN_WIDTH as u32);
        assert_eq!(image.height(), SCREEN_HEIGHT as u32);
        assert_eq!(*image.get_pixel(0, 0), image::Rgba([0x00, 0x80, 0xFF, 0xFF]));
    }

    #[test]
    fn round_trips_through_a_temp_png_file() {
        let frame = vec![0xFFAA_BBCCu32; SCREEN_WIDTH * SCREEN_HEIGHT];
        let path = std::env::temp_dir().join("nes_core_framedump_test.png");
        save_png(&frame, &path).unwrap();
        let loaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(*loaded.get_pixel(10, 10), image::Rgba([0xAA, 0xBB, 0xCC, 0xFF]));
        let _ = std::fs::remove_file(&path);
    }
}
