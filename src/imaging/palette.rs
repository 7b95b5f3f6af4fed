//! Greedy palette construction for placeholder GIFs.
//!
//! Colors are taken in raster order (row by row, left to right), each new
//! distinct color claiming the next palette slot until the palette is full.
//! Placeholders are capped at 256 pixels, so every color fits and the result
//! is exact.

/// A palette plus one palette index per pixel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexed {
    pub palette: Vec<[u8; 3]>,
    pub indices: Vec<u8>,
}

impl Indexed {
    /// Palette as a flat `r g b r g b …` byte list, as GIF encoders take it.
    pub fn flat_palette(&self) -> Vec<u8> {
        self.palette.iter().flatten().copied().collect()
    }
}

fn distance(a: [u8; 3], b: [u8; 3]) -> u32 {
    a.iter()
        .zip(b)
        .map(|(&x, y)| {
            let d = i32::from(x) - i32::from(y);
            (d * d) as u32
        })
        .sum()
}

/// Index `pixels` with at most `capacity` colors (clamped to 1..=256).
pub fn greedy(pixels: &[[u8; 3]], capacity: usize) -> Indexed {
    let capacity = capacity.clamp(1, 256);
    let mut palette: Vec<[u8; 3]> = Vec::with_capacity(capacity);
    for &px in pixels {
        if palette.len() == capacity {
            break;
        }
        if !palette.contains(&px) {
            palette.push(px);
        }
    }
    if palette.is_empty() {
        palette.push([0, 0, 0]);
    }

    let indices = pixels
        .iter()
        .map(|&px| {
            palette
                .iter()
                .position(|&c| c == px)
                .unwrap_or_else(|| {
                    (0..palette.len())
                        .min_by_key(|&i| distance(palette[i], px))
                        .unwrap_or(0)
                }) as u8
        })
        .collect();
    Indexed { palette, indices }
}
