use autocrop::Rect;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Black map with each `rect` filled with `value`.
pub fn block_map(width: usize, height: usize, blocks: &[Rect], value: u8) -> Vec<u8> {
    assert!(width > 0 && height > 0, "image dimensions must be positive");

    let mut img = vec![0u8; width * height];
    for b in blocks {
        assert!(b.fits_within(width, height), "block {b} outside image");
        for y in b.y..b.bottom() {
            img[y * width + b.x..y * width + b.right()].fill(value);
        }
    }
    img
}

pub fn uniform(width: usize, height: usize, value: u8) -> Vec<u8> {
    vec![value; width * height]
}

/// One-pixel vertical line at column `x`.
pub fn vertical_line(width: usize, height: usize, x: usize, value: u8) -> Vec<u8> {
    assert!(x < width, "line outside image");

    let mut img = vec![0u8; width * height];
    for y in 0..height {
        img[y * width + x] = value;
    }
    img
}

/// Mostly-black map with a fraction `density` of random bright pixels.
pub fn sparse_noise(width: usize, height: usize, density: f64, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..width * height)
        .map(|_| if rng.gen_bool(density) { rng.gen_range(1..=255) } else { 0 })
        .collect()
}
