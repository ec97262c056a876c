//! Animations through the public entry points.

use c64gfx_rs::{
	c64gfx_types::{animation::STREAM_END, convert::constants::KOALA_ANIMATION_ADDRESS},
	prelude::*,
};

use crate::{four_color_noise, paint};

#[test_log::test]
fn test_koala_animation_layout() -> anyhow::Result<()> {
	let frames = [four_color_noise(1), four_color_noise(2)];
	let conversion = Converter::new(Options::default()).convert_animation(&frames)?;
	assert_eq!(conversion.mode, GraphicsMode::MultiColorBitmap);
	assert!(conversion.symbols.contains(&("animation", KOALA_ANIMATION_ADDRESS)));

	let bytes = &conversion.bytes;
	let stream = 2 + usize::from(KOALA_ANIMATION_ADDRESS) - 0x2000;
	assert_eq!(&bytes[..2], &[0x00, 0x20]);
	// gap between the picture and the stream stays empty
	assert!(bytes[2 + 0x4711 - 0x2000..stream].iter().all(|b| *b == 0));
	assert_eq!(bytes.last(), Some(&STREAM_END));
	Ok(())
}

#[test_log::test]
fn test_stream_replays_frames() -> anyhow::Result<()> {
	let sources = [four_color_noise(5), four_color_noise(6), four_color_noise(7)];
	let converter = Converter::new(Options::default());
	let conversion = converter.convert_animation(&sources)?;

	// encode the frames the same way to compare against
	let first = converter.analyze(&sources[0])?.with_mode(GraphicsMode::MultiColorBitmap);
	let mapping = conversion.mapping.clone();
	let expected: Vec<EncodedImage> = sources
		.iter()
		.map(|source| {
			let mut image = converter.analyze(source)?.with_mode(GraphicsMode::MultiColorBitmap);
			image.set_background(first.background());
			Ok(EncodedImage::encode(&image, &mapping)?)
		})
		.collect::<Result<_, ConvertError>>()?;

	let (EncodedImage::Koala(start), EncodedImage::Koala(last)) = (&expected[0], &expected[2]) else {
		panic!("frames are not koala");
	};
	let stream_start = 2 + usize::from(KOALA_ANIMATION_ADDRESS) - 0x2000;
	let stream = &conversion.bytes[stream_start..];

	// frame 0 of the stream turns the last frame back into the first
	let mut bitmap = last.bitmap.clone();
	let mut screen = last.screen.clone();
	let mut color_ram = last.color_ram.clone();
	let mut pos = 0;
	for frame in expected.iter() {
		let used =
			AnimationEncoder::apply_frame(&stream[pos..], &mut bitmap, &mut [&mut screen, &mut color_ram])
				.expect("truncated frame");
		pos += used;
		let EncodedImage::Koala(frame) = frame else {
			panic!("frame is not koala");
		};
		assert_eq!(bitmap, frame.bitmap);
		assert_eq!(screen, frame.screen);
		assert_eq!(color_ram, frame.color_ram);
	}
	assert_eq!(stream[pos], STREAM_END);
	assert_eq!(start.bitmap.len(), 8000);
	Ok(())
}

#[test_log::test]
fn test_mixed_modes_rejected() {
	let koala = four_color_noise(1);
	let two_colors =
		paint(320, 200, |x, y| if (x + y) % 2 == 0 { HwColor::BLACK } else { HwColor::WHITE });
	let hires = paint(320, 200, |x, y| {
		let block = (y / 8) * 40 + x / 8;
		HwColor::new(((block + (x + y) % 2) % 16) as u8).unwrap()
	});
	// a two-color frame fits a koala animation
	assert!(Converter::new(Options::default()).convert_animation(&[koala.clone(), two_colors]).is_ok());
	// a koala frame does not fit a hires animation
	let err = Converter::new(Options::default()).convert_animation(&[hires, koala]).unwrap_err();
	assert!(matches!(
		err,
		ConvertError::Validation(ValidationError::MixedModes {
			frame: 1,
			expected: GraphicsMode::SingleColorBitmap,
			found: GraphicsMode::MultiColorCharset,
		})
	));
}

#[test_log::test]
fn test_animation_with_displayer() -> anyhow::Result<()> {
	let mut prg = vec![0x01, 0x08];
	prg.extend_from_slice(&[0xea; 0x40]);
	let options = Options {
		frame_delay: 3,
		wait_seconds: 5,
		..Options::default()
	};
	// only the top two block rows change, so the stream ends below the fade code
	let (a, b) = (four_color_noise(1), four_color_noise(2));
	let changed =
		RgbImage::from_fn(320, 200, |x, y| if y < 16 { b.pixel(x, y) } else { a.pixel(x, y) });
	let frames = [a, changed];
	let conversion = Converter::new(options)
		.with_displayer(Displayer::new(prg)?)
		.convert_animation(&frames)?;
	let bytes = &conversion.bytes;
	assert_eq!(&bytes[..2], &[0x01, 0x08]);
	assert_eq!(bytes[2 + 0x0820 - 0x0801], 3);
	assert_eq!(bytes[2 + 0x0821 - 0x0801], 5);
	Ok(())
}
