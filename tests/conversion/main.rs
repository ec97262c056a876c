//! Integration tests for `c64gfx-rs`

mod animation;
mod interlace;
mod linking;
mod modes;
mod scenario;

use std::convert::Infallible;

use c64gfx_rs::prelude::*;
use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Initializes the logger with default level set to info if `RUST_LOG` is not set.
pub(crate) fn init_logger() {
	let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
		.is_test(true)
		.try_init();
}

/// Byte-oriented run-length encoder, deterministic like a real cruncher.
pub(crate) struct RunLength;

impl Compressor for RunLength {
	type Error = Infallible;

	fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
		let mut out = Vec::with_capacity(data.len());
		for run in data.chunk_by(|a, b| a == b) {
			for part in run.chunks(255) {
				out.push(part.len() as u8);
				out.push(part[0]);
			}
		}
		Ok(out)
	}
}

/// Builds an image from hardware colors using the first palette.
pub(crate) fn paint(
	width: usize,
	height: usize,
	f: impl Fn(usize, usize) -> HwColor,
) -> RgbImage {
	RgbImage::from_fn(width, height, |x, y| PALETTES[0].rgb(f(x, y)))
}

/// 320x200 image of black, white, red and cyan in random patterns, with a red
/// pixel at the origin of every block.
pub(crate) fn four_color_noise(seed: u64) -> RgbImage {
	let mut rng = SmallRng::seed_from_u64(seed);
	let pixels: Vec<HwColor> = (0..320 * 200)
		.map(|_| match rng.random_range(0..10) {
			0..=4 => HwColor::BLACK,
			5 | 6 => HwColor::WHITE,
			7 => HwColor::RED,
			_ => HwColor::CYAN,
		})
		.collect();
	paint(320, 200, |x, y| {
		if x % 8 == 0 && y % 8 == 0 { HwColor::RED } else { pixels[y * 320 + x] }
	})
}
