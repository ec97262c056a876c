//! Four colors, red in every block, too many chars for a charset.

use c64gfx_rs::prelude::*;

use crate::{RunLength, four_color_noise, init_logger};

#[test_log::test]
fn test_falls_back_to_koala_on_black() -> anyhow::Result<()> {
	let image = four_color_noise(42);
	let converter = Converter::new(Options::default());

	let analyzed = converter.analyze(&image)?;
	assert_eq!(analyzed.mode(), GraphicsMode::MultiColorCharset);
	assert_eq!(analyzed.background(), HwColor::BLACK);

	let conversion = converter.convert(&image)?;
	assert_eq!(conversion.mode, GraphicsMode::MultiColorBitmap);
	assert_eq!(conversion.mapping.slot(0), Some(HwColor::BLACK));
	assert!(conversion.symbols.contains(&("d021", 0)));
	Ok(())
}

#[test_log::test]
fn test_crunched_length_is_deterministic() -> anyhow::Result<()> {
	let image = four_color_noise(42);
	let options = Options {
		crunch: true,
		..Options::default()
	};
	let converter = Converter::new(options).with_compressor(RunLength);
	let first = converter.convert(&image)?;
	for _ in 0..3 {
		let again = converter.convert(&image)?;
		assert_eq!(again.bytes.len(), first.bytes.len());
		assert_eq!(again.bytes, first.bytes);
	}
	Ok(())
}

#[test]
fn test_brute_force_is_deterministic() -> anyhow::Result<()> {
	init_logger();
	let image = four_color_noise(7);
	let run = |workers: usize| {
		let options = Options {
			num_workers: workers,
			..Options::smallest()
		};
		Converter::new(options).with_compressor(RunLength).convert(&image)
	};
	let single = run(1)?;
	let pooled = run(4)?;
	assert_eq!(single.mode, GraphicsMode::MultiColorBitmap);
	assert_eq!(single.mapping, pooled.mapping);
	assert_eq!(single.bytes.len(), pooled.bytes.len());

	// the search never does worse than the heuristic
	let heuristic = Options {
		crunch: true,
		..Options::default()
	};
	let guessed = Converter::new(heuristic).with_compressor(RunLength).convert(&image)?;
	assert!(single.bytes.len() <= guessed.bytes.len());
	Ok(())
}

#[test_log::test]
fn test_brute_force_entry_point() -> anyhow::Result<()> {
	let image = four_color_noise(3);
	let mapping = brute_force(&image, &Options::default(), RunLength)?;
	assert_eq!(mapping.len(), 4);

	// every color is in every block, so each one may be the background
	let analyzed = Converter::new(Options::default()).analyze(&image)?;
	let background = mapping.slot(0).unwrap();
	assert!(analyzed.is_background_candidate(background));
	Ok(())
}
