//! Benchmark helper utilities for c64gfx-rs
//!
//! This module provides generators for synthetic images that respect the
//! hardware constraints, so every benchmark runs without test files.

use c64gfx_types::{
	color::HwColor,
	palette::PALETTES,
	source::RgbImage,
};
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Screen width in pixels
pub const WIDTH: usize = 320;

/// Screen height in pixels
pub const HEIGHT: usize = 200;

/// Generates a 320x200 image with four colors in random patterns
///
/// Black is the most frequent color. Nearly every block holds all four
/// colors and almost no two blocks repeat, so charset modes overflow and the
/// image ends up as a koala bitmap.
pub fn generate_noise(seed: u64, colors: [HwColor; 4]) -> RgbImage {
	let mut rng = SmallRng::seed_from_u64(seed);
	let pixels: Vec<HwColor> = (0..WIDTH * HEIGHT)
		.map(|_| match rng.random_range(0..8) {
			0..=3 => colors[0],
			4 | 5 => colors[1],
			6 => colors[2],
			_ => colors[3],
		})
		.collect();
	RgbImage::from_fn(WIDTH, HEIGHT, |x, y| PALETTES[0].rgb(pixels[y * WIDTH + x]))
}

/// Hardware color of an index, wrapping at 16
fn color(index: usize) -> HwColor {
	HwColor::new((index % 16) as u8).unwrap_or(HwColor::BLACK)
}

/// Generates a 320x200 image where every 8x8 block has its own two colors
///
/// Colors are taken from the block index, which makes a hires bitmap.
pub fn generate_hires_blocks(seed: u64) -> RgbImage {
	let mut rng = SmallRng::seed_from_u64(seed);
	let patterns: Vec<u64> = (0..1000).map(|_| rng.random()).collect();
	RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
		let block = (y / 8) * 40 + x / 8;
		let bit = (y % 8) * 8 + x % 8;
		let index = if patterns[block] >> bit & 1 == 1 { block } else { block + 7 };
		PALETTES[0].rgb(color(index))
	})
}

/// Generates a 320x200 two-color image built from `glyphs` distinct 8x8 patterns
pub fn generate_charset(seed: u64, glyphs: usize) -> RgbImage {
	let mut rng = SmallRng::seed_from_u64(seed);
	let patterns: Vec<u64> = (0..glyphs.max(1)).map(|_| rng.random()).collect();
	let layout: Vec<usize> = (0..1000).map(|_| rng.random_range(0..patterns.len())).collect();
	RgbImage::from_fn(WIDTH, HEIGHT, |x, y| {
		let pattern = patterns[layout[(y / 8) * 40 + x / 8]];
		let bit = (y % 8) * 8 + x % 8;
		let color = if pattern >> bit & 1 == 1 { HwColor::WHITE } else { HwColor::BLUE };
		PALETTES[0].rgb(color)
	})
}
