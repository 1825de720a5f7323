//! Generates the diagnostic texture used when an image cannot be resolved.
//!
//! A mid-grey square with "TEXTURE / NOT FOUND / USING FALLBACK" stamped in a
//! darker grey, drawn with a built-in 5x7 bitmap font.

use super::{Texture, TextureOrigin};

const BACKGROUND: [u8; 4] = [0x80, 0x80, 0x80, 0xff];
const INK: [u8; 4] = [0x66, 0x66, 0x66, 0xff];

const GLYPH_W: usize = 5;
const GLYPH_H: usize = 7;

/// Lines of text with their vertical center as a fraction of the height,
/// and whether they use the large type size.
const LINES: &[(&str, f32, bool)] = &[
    ("TEXTURE", 0.43, true),
    ("NOT FOUND", 0.51, true),
    ("USING FALLBACK", 0.59, false),
];

/// Renders the placeholder image at the requested size.
///
/// # Examples
/// ```
/// use objzip::textures::placeholder::generate_placeholder;
///
/// let tex = generate_placeholder(64, 64);
/// assert!(tex.is_placeholder());
/// assert_eq!(tex.data.len(), 64 * 64 * 4);
/// assert_eq!(&tex.data[..4], &[0x80, 0x80, 0x80, 0xff]);
/// ```
pub fn generate_placeholder(width: u32, height: u32) -> Texture {
    let w = width as usize;
    let h = height as usize;
    let mut data = Vec::with_capacity(w * h * 4);
    for _ in 0..w * h {
        data.extend_from_slice(&BACKGROUND);
    }

    let large = (w / 80).max(1);
    let small = (w / 128).max(1);
    for &(text, center, is_large) in LINES {
        let scale = if is_large { large } else { small };
        let text_w = (text.len() * (GLYPH_W + 1)).saturating_sub(1) * scale;
        let left = w.saturating_sub(text_w) / 2;
        let top = ((h as f32 * center) as usize).saturating_sub(GLYPH_H * scale / 2);
        draw_text(&mut data, w, h, text, left, top, scale);
    }

    Texture {
        name: "placeholder".to_string(),
        width,
        height,
        data,
        sampler: Default::default(),
        origin: TextureOrigin::Placeholder,
    }
}

fn draw_text(data: &mut [u8], w: usize, h: usize, text: &str, left: usize, top: usize, scale: usize) {
    for (i, ch) in text.chars().enumerate() {
        let origin_x = left + i * (GLYPH_W + 1) * scale;
        let rows = glyph(ch);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..GLYPH_W {
                if bits & (1 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        let x = origin_x + col * scale + dx;
                        let y = top + row * scale + dy;
                        if x < w && y < h {
                            let idx = (y * w + x) * 4;
                            data[idx..idx + 4].copy_from_slice(&INK);
                        }
                    }
                }
            }
        }
    }
}

fn glyph(ch: char) -> [u8; GLYPH_H] {
    match ch {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        _ => [0; GLYPH_H],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(tex: &Texture, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * tex.width + x) * 4) as usize;
        [tex.data[idx], tex.data[idx + 1], tex.data[idx + 2], tex.data[idx + 3]]
    }

    #[test]
    fn test_background_and_ink() {
        let tex = generate_placeholder(256, 256);
        assert_eq!(pixel(&tex, 0, 0), BACKGROUND);
        assert_eq!(pixel(&tex, 255, 255), BACKGROUND);

        let ink = tex.data.chunks(4).filter(|px| *px == INK).count();
        assert!(ink > 0, "placeholder should carry diagnostic text");
        // Text stays in the middle band.
        for y in 0..80 {
            for x in 0..256 {
                assert_eq!(pixel(&tex, x, y), BACKGROUND);
            }
        }
    }

    #[test]
    fn test_tiny_sizes_do_not_panic() {
        for size in [1, 2, 7, 33] {
            let tex = generate_placeholder(size, size);
            assert_eq!(tex.data.len(), (size * size * 4) as usize);
        }
    }

    #[test]
    fn test_every_character_has_a_glyph() {
        for (text, _, _) in LINES {
            for ch in text.chars().filter(|c| *c != ' ') {
                assert_ne!(glyph(ch), [0; GLYPH_H], "missing glyph for {}", ch);
            }
        }
    }
}
