//! Interlaced pictures through the public entry points.

use c64gfx_rs::{
	c64gfx_types::interlace::{self, constants::*},
	prelude::*,
};

use crate::{four_color_noise, init_logger, paint};

/// Screenshot whose screen interleaves two noise images pixel by pixel.
fn interlaced_screenshot(left: u64, right: u64) -> RgbImage {
	let (left, right) = (four_color_noise(left), four_color_noise(right));
	RgbImage::from_fn(384, 272, |x, y| {
		if !(32..352).contains(&x) || !(35..235).contains(&y) {
			return PALETTES[0].rgb(HwColor::LIGHT_BLUE);
		}
		let source = if x % 2 == 0 { &left } else { &right };
		source.pixel(x - 32, y - 35)
	})
}

#[test_log::test]
fn test_interlaced_screenshot_layout() -> anyhow::Result<()> {
	let conversion =
		Converter::new(Options::default()).convert_interlace(&[interlaced_screenshot(1, 2)])?;
	assert_eq!(conversion.mode, GraphicsMode::MultiColorBitmap);

	let bytes = &conversion.bytes;
	let at = |address: u16| bytes[2 + usize::from(address) - 0x2000];
	assert_eq!(&bytes[..2], &[0x00, 0x20]);
	assert_eq!(bytes.len(), 2 + 0x7f43 - 0x2000);
	// light blue border from the margin, black background
	assert_eq!(at(BACKGROUND_ADDRESS), 0xe0);
	assert_eq!(at(REGISTERS_ADDRESS), 0xe0);
	assert_eq!(at(D016_OFFSET_ADDRESS), 1);
	Ok(())
}

#[test]
fn test_frames_render_their_half() -> anyhow::Result<()> {
	init_logger();
	let source = interlaced_screenshot(3, 4);
	let converter = Converter::new(Options::with_mode(GraphicsMode::MultiColorBitmap));
	let conversion = converter.convert_interlace(&[&source])?;

	let (left, right) = interlace::split(&source)?;
	let first = converter.analyze(&left)?;
	let second = converter.analyze(&right)?;
	let koala = InterlacedKoala::encode(&first, &second, &conversion.mapping, 1)?;
	assert_eq!(koala.stats.conflicts, 0);
	assert_eq!(koala.first.color_ram, koala.second.color_ram);
	assert_eq!(koala.to_prg()?, conversion.bytes);

	for (frame, image) in [(&koala.first, &left), (&koala.second, &right)] {
		let pixels = frame.render();
		for y in 0..200 {
			for x in 0..320 {
				assert_eq!(
					PALETTES[0].rgb(pixels[y * 320 + x]),
					image.pixel(x + 32, y + 35),
					"pixel ({x},{y})"
				);
			}
		}
	}
	Ok(())
}

#[test_log::test]
fn test_plain_koala_still_converts() -> anyhow::Result<()> {
	// identical pixel pairs give two equal frames
	let plain = paint(320, 200, |x, y| {
		[HwColor::BLACK, HwColor::WHITE, HwColor::RED, HwColor::CYAN][(x / 2 + y) % 4]
	});
	let bytes = convert_interlace(&[plain], &Options::default())?;
	let at = |address: u16| bytes[2 + usize::from(address) - 0x2000];
	assert_eq!(at(FIRST_BITMAP_ADDRESS), at(SECOND_BITMAP_ADDRESS));
	assert_eq!(at(FIRST_SCREEN_ADDRESS), at(SECOND_SCREEN_ADDRESS));
	Ok(())
}
