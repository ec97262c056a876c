//! Conversion entry points.
//!
//! [`Converter`] runs the whole pipeline: analysis, bitpair assignment,
//! encoding, linking and the optional crunch. It carries the collaborators a
//! run may need: a [`Compressor`], a [`Displayer`] and [`Music`].
//!
//! Charset modes that cannot hold an image fall back to the matching bitmap
//! mode, unless the mode was forced. Interlaced pictures go through
//! [`Converter::convert_interlace`].
//!
//! # Examples
//!
//! ```
//! use c64gfx_types::{
//! 	color::HwColor,
//! 	convert::Converter,
//! 	mode::GraphicsMode,
//! 	options::Options,
//! 	palette::PALETTES,
//! 	source::RgbImage,
//! };
//!
//! let image = RgbImage::from_fn(320, 200, |x, y| {
//! 	let color = if (x + y) % 2 == 0 { HwColor::BLACK } else { HwColor::WHITE };
//! 	PALETTES[0].rgb(color)
//! });
//! let conversion = Converter::new(Options::default()).convert(&image).unwrap();
//! assert_eq!(conversion.mode, GraphicsMode::SingleColorCharset);
//! assert_eq!(&conversion.bytes[..2], &[0x00, 0x20]);
//! ```

use log::{debug, info, warn};

use crate::{
	analyze::{AnalyzedImage, ModeAnalyzer},
	animation::AnimationEncoder,
	bitpair::{BitpairAssigner, BitpairMapping},
	bruteforce::BruteForce,
	compress::{Compressor, Uncompressed},
	encode::{EncodedImage, Symbol, constants::SPRITE_ADDRESS},
	error::{ConvertError, ValidationError},
	interlace::{self, InterlacedKoala},
	linker::Linker,
	mode::GraphicsMode,
	music::{Displayer, Music},
	options::Options,
	source::{PixelSource, SourceImage},
};

/// Where the animation stream of each bitmap mode starts.
pub mod constants {
	/// Koala animation stream
	pub const KOALA_ANIMATION_ADDRESS: u16 = 0x4800;

	/// Hires animation stream
	pub const HIRES_ANIMATION_ADDRESS: u16 = 0x4400;
}

/// Result of a conversion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
	/// Program bytes, load address first, crunched if requested
	pub bytes: Vec<u8>,
	/// Mode the image was encoded in
	pub mode: GraphicsMode,
	/// Bitpair colors used
	pub mapping: BitpairMapping,
	/// Load addresses and color registers
	pub symbols: Vec<Symbol>,
}

/// Converts images with one set of options and collaborators.
#[derive(Debug, Clone)]
pub struct Converter<C = Uncompressed> {
	options: Options,
	compressor: C,
	displayer: Option<Displayer>,
	music: Option<Music>,
}

impl Converter<Uncompressed> {
	/// Creates a converter that never compresses.
	pub fn new(options: Options) -> Self {
		Self {
			options,
			compressor: Uncompressed,
			displayer: None,
			music: None,
		}
	}
}

impl<C: Compressor> Converter<C> {
	/// Uses `compressor` for crunching and brute-force scoring.
	pub fn with_compressor<D: Compressor>(self, compressor: D) -> Converter<D> {
		Converter {
			options: self.options,
			compressor,
			displayer: self.displayer,
			music: self.music,
		}
	}

	/// Links `displayer` in front of every picture.
	pub fn with_displayer(mut self, displayer: Displayer) -> Self {
		self.displayer = Some(displayer);
		self
	}

	/// Includes `music`, played by the displayer.
	pub fn with_music(mut self, music: Music) -> Self {
		self.music = Some(music);
		self
	}

	/// Options of this converter.
	pub fn options(&self) -> &Options {
		&self.options
	}

	/// Analyzes one image.
	pub fn analyze<S: PixelSource>(&self, source: S) -> Result<AnalyzedImage, ConvertError> {
		ModeAnalyzer::analyze(&SourceImage::new(source)?, &self.options)
	}

	/// Picks the bitpair colors of an analyzed image.
	///
	/// Runs the brute-force search if enabled, the heuristic or the caller's
	/// preference otherwise.
	pub fn mapping(&self, image: &AnalyzedImage) -> Result<BitpairMapping, ConvertError> {
		if self.options.brute_force {
			let best = BruteForce::best(image, &self.compressor, self.options.workers())?;
			return Ok(best.mapping);
		}
		Ok(BitpairAssigner::assign(
			image,
			self.options.bitpair_colors.as_ref(),
			self.options.guess_bitpair_colors,
		))
	}

	/// Encodes an analyzed image, falling back from charset to bitmap modes.
	///
	/// # Returns
	///
	/// The image in the mode it was finally encoded in, its mapping and the
	/// encoded data.
	pub fn encode(
		&self,
		image: AnalyzedImage,
	) -> Result<(AnalyzedImage, BitpairMapping, EncodedImage), ConvertError> {
		let (image, (mapping, encoded)) = self.with_fallback(image, |image| {
			let mapping = self.mapping(image)?;
			let encoded = EncodedImage::encode(image, &mapping)?;
			Ok((mapping, encoded))
		})?;
		Ok((image, mapping, encoded))
	}

	/// Converts one image to a program.
	pub fn convert<S: PixelSource>(&self, source: S) -> Result<Conversion, ConvertError> {
		let image = self.analyze(source)?;
		let (image, mapping, encoded) = self.encode(image)?;
		debug!("bitpair colors of {}: {}", image.mode(), mapping);

		let mut linker = Linker::default();
		match &self.displayer {
			Some(displayer) => {
				displayer.link(&mut linker, encoded.mode(), &self.options)?;
				match encoded.sprite_parameters().transpose()? {
					Some(parameters) => {
						linker.write(&parameters)?;
						linker.write(encoded.sprite_data().unwrap_or_default())?;
					}
					None => encoded.link(&mut linker)?,
				}
				if let Some(music) = &self.music {
					music.link(&mut linker)?;
				}
			}
			None => {
				if self.music.is_some() {
					warn!("music is only included with a displayer, skipping it");
				}
				encoded.link(&mut linker)?;
			}
		}

		let bytes = self.finish(&linker)?;
		info!("converted to {}: {} byte(s)", encoded.mode(), bytes.len());
		Ok(Conversion {
			bytes,
			mode: encoded.mode(),
			mapping,
			symbols: encoded.symbols(),
		})
	}

	/// Converts the frames of an animation to one program.
	///
	/// Frame 0 is linked as a regular picture. Bitmap frames follow as a delta
	/// stream, sprite frames are appended to the sprite data. Every frame uses
	/// frame 0's bitpair colors and background.
	///
	/// With the `interlace` option, two frames are converted as one
	/// interlaced picture instead.
	pub fn convert_animation<S: PixelSource>(
		&self,
		sources: &[S],
	) -> Result<Conversion, ConvertError> {
		if self.options.interlace && sources.len() == 2 {
			return self.convert_interlace(sources);
		}
		if sources.len() < 2 {
			return Err(ValidationError::NotEnoughFrames {
				count: sources.len(),
			}
			.into());
		}

		let first = self.animation_frame(self.analyze(&sources[0])?)?;
		let mode = first.mode();
		let background = first.background();
		let mapping = self.mapping(&first)?;
		let preference = mapping.to_preference();
		let mut frames = vec![EncodedImage::encode(&first, &mapping)?];

		for (index, source) in sources.iter().enumerate().skip(1) {
			let mut image = self.analyze(source)?;
			if image.mode() != mode {
				if !fits_mode(image.mode(), mode) {
					return Err(ValidationError::MixedModes {
						frame: index,
						expected: mode,
						found: image.mode(),
					}
					.into());
				}
				debug!("frame {}: {} encoded as {}", index, image.mode(), mode);
				image = image.with_mode(mode);
			}
			if image.background() != background {
				image.set_background(background);
			}
			let frame_mapping =
				BitpairAssigner::assign(&image, Some(&preference), self.options.guess_bitpair_colors);
			if frame_mapping != mapping {
				warn!("frame {}: bitpair colors {} differ from {}", index, frame_mapping, mapping);
			}
			frames.push(EncodedImage::encode(&image, &frame_mapping)?);
		}

		let mut linker = Linker::default();
		if let Some(displayer) = &self.displayer {
			displayer.link_animation(&mut linker, mode, &self.options)?;
		}
		if self.music.is_some() {
			warn!("music is not included in animations, skipping it");
		}

		let mut symbols = frames[0].symbols();
		if mode.is_sprites() {
			if self.displayer.is_some() {
				let parameters = frames[0].sprite_parameters().transpose()?;
				linker.write(&parameters.unwrap_or_default())?;
			} else {
				linker.set_cursor(SPRITE_ADDRESS);
			}
			for frame in &frames {
				linker.write(frame.sprite_data().unwrap_or_default())?;
			}
		} else {
			let address = match mode {
				GraphicsMode::MultiColorBitmap => constants::KOALA_ANIMATION_ADDRESS,
				_ => constants::HIRES_ANIMATION_ADDRESS,
			};
			let stream = AnimationEncoder::encode(&frames)?;
			frames[0].link(&mut linker)?;
			linker.write_at(address, &stream)?;
			info!("animation: {} frame(s), {} byte(s) at ${:04x}", frames.len(), stream.len(), address);
			symbols.push(("animation", address));
		}
		symbols.push(("frames", frames.len() as u16));

		let bytes = self.finish(&linker)?;
		Ok(Conversion {
			bytes,
			mode,
			mapping,
			symbols,
		})
	}

	/// Converts an interlaced picture to one program.
	///
	/// A single source is split into its two frames, two sources are taken as
	/// the frames. Both are encoded as multicolor bitmaps on the first frame's
	/// background, sharing one color RAM.
	pub fn convert_interlace<S: PixelSource>(
		&self,
		sources: &[S],
	) -> Result<Conversion, ConvertError> {
		if let Some(mode) = self.options.mode
			&& mode != GraphicsMode::MultiColorBitmap
		{
			return Err(ValidationError::IncompatibleMode {
				mode,
				reason: "interlaced pictures are multicolor bitmaps".to_string(),
			}
			.into());
		}
		let options = Options {
			mode: Some(GraphicsMode::MultiColorBitmap),
			..self.options.clone()
		};
		let (first, mut second) = match sources {
			[source] => {
				if !interlace::is_interlaced(&SourceImage::new(source)?) {
					warn!("no pixel pair differs, both interlaced frames are the same");
				}
				let (first, second) = interlace::split(source)?;
				(analyze_frame(&first, &options)?, analyze_frame(&second, &options)?)
			}
			[first, second] => {
				(analyze_frame(first, &options)?, analyze_frame(second, &options)?)
			}
			_ => {
				return Err(ValidationError::InterlaceFrames {
					count: sources.len(),
				}
				.into());
			}
		};
		if second.background() != first.background() {
			second.set_background(first.background());
		}

		let mapping = self.mapping(&first)?;
		debug!("bitpair colors of the first interlaced frame: {}", mapping);
		let encoded = InterlacedKoala::encode(&first, &second, &mapping, self.options.d016_offset)?;

		let mut linker = Linker::default();
		match &self.displayer {
			Some(displayer) => {
				displayer.link_interlace(&mut linker)?;
				encoded.link(&mut linker)?;
				if let Some(music) = &self.music {
					music.link(&mut linker)?;
				}
			}
			None => {
				if self.music.is_some() {
					warn!("music is only included with a displayer, skipping it");
				}
				encoded.link(&mut linker)?;
			}
		}

		let bytes = self.finish(&linker)?;
		info!("converted to interlaced koala: {} byte(s)", bytes.len());
		Ok(Conversion {
			bytes,
			mode: GraphicsMode::MultiColorBitmap,
			mapping,
			symbols: encoded.symbols(),
		})
	}

	/// Analyzes an image and searches its smallest bitpair colors.
	pub fn brute_force<S: PixelSource>(&self, source: S) -> Result<BitpairMapping, ConvertError> {
		let image = self.analyze(source)?;
		let (_, best) = self.with_fallback(image, |image| {
			BruteForce::best(image, &self.compressor, self.options.workers())
		})?;
		Ok(best.mapping)
	}

	/// Runs `step` on the image, retrying in the bitmap mode when a detected
	/// charset mode cannot hold it.
	fn with_fallback<T>(
		&self,
		image: AnalyzedImage,
		step: impl Fn(&AnalyzedImage) -> Result<T, ConvertError>,
	) -> Result<(AnalyzedImage, T), ConvertError> {
		let err = match step(&image) {
			Ok(value) => return Ok((image, value)),
			Err(err) => err,
		};
		match image.mode().bitmap_fallback() {
			Some(mode) if !image.is_mode_forced() && err.allows_bitmap_fallback() => {
				info!("{} failed ({}), falling back to {}", image.mode(), err, mode);
				let image = image.with_mode(mode);
				let value = step(&image)?;
				Ok((image, value))
			}
			_ => Err(err),
		}
	}

	/// Checks the mode of an animation's first frame.
	///
	/// Charset animations are not supported. A detected charset mode moves to
	/// its bitmap mode, a forced one fails.
	fn animation_frame(&self, image: AnalyzedImage) -> Result<AnalyzedImage, ConvertError> {
		let mode = image.mode();
		if !mode.is_charset() {
			return Ok(image);
		}
		match mode.bitmap_fallback() {
			Some(fallback) if !image.is_mode_forced() => {
				debug!("animating {} as {}", mode, fallback);
				Ok(image.with_mode(fallback))
			}
			_ => Err(ValidationError::UnsupportedAnimation(mode).into()),
		}
	}

	/// Emits the program and crunches it if requested.
	fn finish(&self, linker: &Linker) -> Result<Vec<u8>, ConvertError> {
		let prg = linker.to_prg()?;
		if !self.options.crunch {
			return Ok(prg);
		}
		let crunched =
			self.compressor.compress(&prg).map_err(|err| ConvertError::external("compress", err))?;
		info!("crunched {} byte(s) to {}", prg.len(), crunched.len());
		Ok(crunched)
	}
}

/// Whether an image detected as `found` can be encoded as `target`.
fn fits_mode(found: GraphicsMode, target: GraphicsMode) -> bool {
	found.is_sprites() == target.is_sprites()
		&& !target.is_charset()
		&& found.max_colors() <= target.max_colors()
}

fn analyze_frame<S: PixelSource>(
	source: S,
	options: &Options,
) -> Result<AnalyzedImage, ConvertError> {
	ModeAnalyzer::analyze(&SourceImage::new(source)?, options)
}

/// Converts one image with default collaborators.
pub fn convert<S: PixelSource>(source: S, options: &Options) -> Result<Vec<u8>, ConvertError> {
	Ok(Converter::new(options.clone()).convert(source)?.bytes)
}

/// Converts the frames of an animation with default collaborators.
pub fn convert_animation<S: PixelSource>(
	sources: &[S],
	options: &Options,
) -> Result<Vec<u8>, ConvertError> {
	Ok(Converter::new(options.clone()).convert_animation(sources)?.bytes)
}

/// Converts an interlaced picture, or its two frames, with default
/// collaborators.
pub fn convert_interlace<S: PixelSource>(
	sources: &[S],
	options: &Options,
) -> Result<Vec<u8>, ConvertError> {
	Ok(Converter::new(options.clone()).convert_interlace(sources)?.bytes)
}

/// Finds the bitpair colors whose program compresses best with `compressor`.
pub fn brute_force<S: PixelSource, C: Compressor>(
	source: S,
	options: &Options,
	compressor: C,
) -> Result<BitpairMapping, ConvertError> {
	Converter::new(options.clone()).with_compressor(compressor).brute_force(source)
}
