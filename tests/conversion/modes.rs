//! Mode detection and encoding through the public entry points.

use c64gfx_rs::prelude::*;
use rstest::rstest;

use crate::{init_logger, paint};

/// Blocks alternate between `a` and `b`, each marked with a pixel pair of the
/// other color at its origin.
fn checker_color(a: HwColor, b: HwColor, x: usize, y: usize) -> HwColor {
	let even = (x / 8 + y / 8) % 2 == 0;
	let mark = x % 8 < 2 && y % 8 == 0;
	if even != mark { a } else { b }
}

fn checker(a: HwColor, b: HwColor) -> RgbImage {
	paint(320, 200, move |x, y| checker_color(a, b, x, y))
}

/// Each block has its own two colors.
fn hires_blocks() -> RgbImage {
	paint(320, 200, |x, y| {
		let block = (y / 8) * 40 + x / 8;
		let index = if (x + y) % 2 == 0 { block % 16 } else { (block + 5) % 16 };
		HwColor::new(index as u8).unwrap()
	})
}

/// Three colors in a repeated pattern.
fn three_colors() -> RgbImage {
	let colors = [HwColor::BLUE, HwColor::LIGHT_BLUE, HwColor::WHITE];
	paint(320, 200, move |x, y| colors[(x / 2 + y) % 3])
}

#[rstest]
#[case::sc_charset(
	checker(HwColor::BLACK, HwColor::WHITE),
	GraphicsMode::SingleColorCharset,
	0x2fea
)]
#[case::mc_charset(three_colors(), GraphicsMode::MultiColorCharset, 0x2fec)]
#[case::hires(hires_blocks(), GraphicsMode::SingleColorBitmap, 0x4329)]
fn test_detected_mode(#[case] image: RgbImage, #[case] mode: GraphicsMode, #[case] end: usize) {
	init_logger();
	let conversion = Converter::new(Options::default()).convert(&image).unwrap();
	assert_eq!(conversion.mode, mode);
	assert_eq!(&conversion.bytes[..2], &[0x00, 0x20]);
	assert_eq!(conversion.bytes.len(), 2 + end - 0x2000);
}

#[rstest]
#[case(GraphicsMode::SingleColorBitmap)]
#[case(GraphicsMode::MultiColorBitmap)]
#[case(GraphicsMode::SingleColorCharset)]
#[case(GraphicsMode::MultiColorCharset)]
fn test_forced_modes_render_back(#[case] mode: GraphicsMode) {
	init_logger();
	let image = checker(HwColor::BLACK, HwColor::YELLOW);
	let converter = Converter::new(Options::with_mode(mode));
	let analyzed = converter.analyze(&image).unwrap();
	let (_, _, encoded) = converter.encode(analyzed).unwrap();
	assert_eq!(encoded.mode(), mode);
	let pixels = encoded.render().unwrap();
	for (i, color) in pixels.iter().enumerate() {
		let (x, y) = (i % 320, i / 320);
		let expected = checker_color(HwColor::BLACK, HwColor::YELLOW, x, y);
		assert_eq!(*color, expected, "pixel ({x},{y})");
	}
}

#[test_log::test]
fn test_forced_sc_charset_rejects_colors() {
	let err = Converter::new(Options::with_mode(GraphicsMode::SingleColorCharset))
		.convert(&three_colors())
		.unwrap_err();
	assert!(matches!(err, ConvertError::Validation(ValidationError::IncompatibleMode { .. })));
}

#[test_log::test]
fn test_screenshot_is_cropped() {
	let image = paint(384, 272, |x, y| {
		let inside = (32..352).contains(&x) && (35..235).contains(&y);
		match inside {
			true => checker_color(HwColor::BLACK, HwColor::WHITE, x - 32, y - 35),
			false => HwColor::LIGHT_BLUE,
		}
	});
	let conversion = Converter::new(Options::default()).convert(&image).unwrap();
	assert_eq!(conversion.mode, GraphicsMode::SingleColorCharset);
	assert!(conversion.symbols.contains(&("d020", 14)));
}

#[test_log::test]
fn test_bad_dimensions() {
	let image = paint(100, 100, |_, _| HwColor::BLACK);
	let err = convert(&image, &Options::default()).unwrap_err();
	assert!(matches!(
		err,
		ConvertError::Validation(ValidationError::InvalidDimensions {
			width: 100,
			height: 100
		})
	));
}

#[rstest]
#[case::blank(paint(320, 200, |_, _| HwColor::BLUE))]
#[case::solid_halves(paint(320, 200, |x, _| if x < 160 { HwColor::BLACK } else { HwColor::WHITE }))]
#[case::solid_blocks(paint(320, 200, |x, y| HwColor::new(((x / 8 + y / 8) % 3) as u8).unwrap()))]
fn test_degenerate_image(#[case] image: RgbImage) {
	init_logger();
	let err = convert(&image, &Options::default()).unwrap_err();
	assert!(matches!(err, ConvertError::Validation(ValidationError::DegenerateImage { .. })));
}

#[test_log::test]
fn test_sprite_sheet() {
	let colors = [HwColor::BLACK, HwColor::RED, HwColor::GREEN, HwColor::BLUE];
	let image = paint(72, 42, move |x, y| colors[(x / 2 + y / 3) % 4]);
	let conversion = Converter::new(Options::default()).convert(&image).unwrap();
	assert_eq!(conversion.mode, GraphicsMode::MultiColorSprites);
	assert!(conversion.symbols.contains(&("columns", 3)));
	assert!(conversion.symbols.contains(&("rows", 2)));
	assert_eq!(conversion.bytes.len(), 2 + 6 * 64);
}

#[test_log::test]
fn test_sprites_with_displayer() {
	let image = paint(24, 21, |x, _| if x < 12 { HwColor::BLACK } else { HwColor::WHITE });
	let mut prg = vec![0x01, 0x08];
	prg.extend_from_slice(&[0x60; 0x40]);
	let conversion = Converter::new(Options::default())
		.with_displayer(Displayer::new(prg).unwrap())
		.convert(&image)
		.unwrap();
	let params = 2 + 0x40;
	assert_eq!(&conversion.bytes[params..params + 4], &[1, 1, 0, 1]);
	assert_eq!(conversion.bytes.len(), params + 4 + 64);
}

#[test_log::test]
fn test_options_from_toml() {
	let options = Options::from_toml_str(
		r#"
		mode = "hires"
		bitpair_colors = "6,14"
		no_fade = true
		"#,
	)
	.unwrap();
	assert_eq!(options.mode, Some(GraphicsMode::SingleColorBitmap));
	let image = paint(320, 200, |x, _| if x % 2 == 0 { HwColor::BLUE } else { HwColor::LIGHT_BLUE });
	let conversion = Converter::new(options).convert(&image).unwrap();
	assert_eq!(conversion.mapping.slot(0), Some(HwColor::BLUE));
	assert_eq!(conversion.mapping.slot(1), Some(HwColor::LIGHT_BLUE));
	// screen byte: bitpair 1 in the high nibble
	assert_eq!(conversion.bytes[2 + 0x3f40 - 0x2000], 0xe6);
}
