//! Per-mode encoders.
//!
//! Each encoder turns an [`AnalyzedImage`] and a [`BitpairMapping`] into the
//! exact bytes the VIC-II reads: a bitmap or charset plane, per-block
//! attribute bytes and global color registers. [`EncodedImage`] wraps the six
//! results and knows where each part lives in memory.
//!
//! # Layouts
//!
//! | Mode | Data | Attributes | Registers |
//! |------|------|------------|-----------|
//! | hires | bitmap `$2000` | screen `$3f40` | border `$4328` |
//! | koala | bitmap `$2000` | screen `$3f40`, color RAM `$4328` | bg and border `$4710` |
//! | charsets | charset `$2000` | screen `$2800`, color RAM `$2c00` | `$2fe8` |
//! | sprites | sprite data `$2000` | | |

pub mod bitmap;
pub mod charset;
pub mod sprites;

pub use bitmap::{Hires, Koala};
pub use charset::{MultiColorCharset, SingleColorCharset};
pub use sprites::{MultiColorSprites, SingleColorSprites};

use std::fmt::Write as _;

use log::warn;

use crate::{
	analyze::AnalyzedImage,
	bitpair::{BitpairMapping, BlockAssignment},
	color::HwColor,
	error::{ConvertError, MemoryError, ValidationError},
	linker::Linker,
	mode::GraphicsMode,
};

/// Load addresses of the encoded data.
pub mod constants {
	/// Bitmap of the bitmap modes
	pub const BITMAP_ADDRESS: u16 = 0x2000;

	/// Screen RAM copy of the bitmap modes
	pub const BITMAP_SCREEN_ADDRESS: u16 = 0x3f40;

	/// Color RAM copy of koala, border of hires
	pub const BITMAP_COLOR_ADDRESS: u16 = 0x4328;

	/// Background and border byte of koala
	pub const KOALA_BACKGROUND_ADDRESS: u16 = 0x4710;

	/// Charset data
	pub const CHARSET_ADDRESS: u16 = 0x2000;

	/// Screen RAM of the charset modes
	pub const CHARSET_SCREEN_ADDRESS: u16 = 0x2800;

	/// Color RAM copy of the charset modes
	pub const CHARSET_COLOR_ADDRESS: u16 = 0x2c00;

	/// Color registers of the charset modes
	pub const CHARSET_REGISTERS_ADDRESS: u16 = 0x2fe8;

	/// Sprite data
	pub const SPRITE_ADDRESS: u16 = 0x2000;

	/// Bytes per 8x8 block in the bitmap
	pub const BYTES_PER_BLOCK: usize = 8;

	/// Most characters in one charset
	pub const MAX_CHARS: usize = 256;
}

/// Named value exported alongside an encoded image.
pub type Symbol = (&'static str, u16);

/// One image encoded for its graphics mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodedImage {
	/// Single-color bitmap
	Hires(Hires),
	/// Multicolor bitmap
	Koala(Koala),
	/// Single-color charset
	SingleColorCharset(SingleColorCharset),
	/// Multicolor charset
	MultiColorCharset(MultiColorCharset),
	/// Single-color sprites
	SingleColorSprites(SingleColorSprites),
	/// Multicolor sprites
	MultiColorSprites(MultiColorSprites),
}

impl EncodedImage {
	/// Encodes an analyzed image in its mode.
	pub fn encode(image: &AnalyzedImage, mapping: &BitpairMapping) -> Result<Self, ConvertError> {
		let encoded = match image.mode() {
			GraphicsMode::SingleColorBitmap => Self::Hires(Hires::encode(image, mapping)?),
			GraphicsMode::MultiColorBitmap => Self::Koala(Koala::encode(image, mapping)?),
			GraphicsMode::SingleColorCharset => {
				Self::SingleColorCharset(SingleColorCharset::encode(image, mapping)?)
			}
			GraphicsMode::MultiColorCharset => {
				Self::MultiColorCharset(MultiColorCharset::encode(image, mapping)?)
			}
			GraphicsMode::SingleColorSprites => {
				Self::SingleColorSprites(SingleColorSprites::encode(image, mapping)?)
			}
			GraphicsMode::MultiColorSprites => {
				Self::MultiColorSprites(MultiColorSprites::encode(image, mapping)?)
			}
		};
		Ok(encoded)
	}

	/// Graphics mode of the image.
	pub fn mode(&self) -> GraphicsMode {
		match self {
			Self::Hires(_) => GraphicsMode::SingleColorBitmap,
			Self::Koala(_) => GraphicsMode::MultiColorBitmap,
			Self::SingleColorCharset(_) => GraphicsMode::SingleColorCharset,
			Self::MultiColorCharset(_) => GraphicsMode::MultiColorCharset,
			Self::SingleColorSprites(_) => GraphicsMode::SingleColorSprites,
			Self::MultiColorSprites(_) => GraphicsMode::MultiColorSprites,
		}
	}

	/// Writes the image to its load addresses.
	pub fn link(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		match self {
			Self::Hires(image) => image.link(linker),
			Self::Koala(image) => image.link(linker),
			Self::SingleColorCharset(image) => image.link(linker),
			Self::MultiColorCharset(image) => image.link(linker),
			Self::SingleColorSprites(image) => image.link(linker),
			Self::MultiColorSprites(image) => image.link(linker),
		}
	}

	/// Sprite data of the sprite modes.
	pub fn sprite_data(&self) -> Option<&[u8]> {
		match self {
			Self::SingleColorSprites(image) => Some(&image.data),
			Self::MultiColorSprites(image) => Some(&image.data),
			_ => None,
		}
	}

	/// Sprite grid and colors in the order a sprite displayer reads them.
	///
	/// `None` for the other modes.
	pub fn sprite_parameters(&self) -> Option<Result<Vec<u8>, ValidationError>> {
		match self {
			Self::SingleColorSprites(image) => Some(image.parameters()),
			Self::MultiColorSprites(image) => Some(image.parameters()),
			_ => None,
		}
	}

	/// Links the image on its own and returns the program bytes.
	pub fn to_prg(&self) -> Result<Vec<u8>, MemoryError> {
		let mut linker = Linker::default();
		self.link(&mut linker)?;
		linker.to_prg()
	}

	/// Load addresses and color registers.
	pub fn symbols(&self) -> Vec<Symbol> {
		match self {
			Self::Hires(image) => image.symbols(),
			Self::Koala(image) => image.symbols(),
			Self::SingleColorCharset(image) => image.symbols(),
			Self::MultiColorCharset(image) => image.symbols(),
			Self::SingleColorSprites(image) => image.symbols(),
			Self::MultiColorSprites(image) => image.symbols(),
		}
	}

	/// Number of animatable blocks, zero for modes without block payloads.
	pub fn block_count(&self) -> usize {
		match self {
			Self::Hires(image) => image.screen.len(),
			Self::Koala(image) => image.screen.len(),
			_ => 0,
		}
	}

	/// The bytes an animation copies when a block changes.
	///
	/// Koala blocks are the 8 bitmap bytes, the screen byte and the color RAM
	/// byte; hires blocks drop the color RAM byte.
	pub fn block_payload(&self, index: usize) -> Option<Vec<u8>> {
		match self {
			Self::Hires(image) => image.block_payload(index),
			Self::Koala(image) => image.block_payload(index),
			_ => None,
		}
	}

	/// Hardware color of every canvas pixel, decoded from the encoded bytes.
	///
	/// Returns `None` for sprites.
	pub fn render(&self) -> Option<Vec<HwColor>> {
		match self {
			Self::Hires(image) => Some(image.render()),
			Self::Koala(image) => Some(image.render()),
			Self::SingleColorCharset(image) => Some(image.render()),
			Self::MultiColorCharset(image) => Some(image.render()),
			_ => None,
		}
	}
}

/// Formats symbols as `name = value` lines.
///
/// Values below 16 are colors and print in decimal, addresses print as hex.
pub fn write_symbols(symbols: &[Symbol]) -> String {
	let mut out = String::new();
	for (name, value) in symbols {
		let _ = if *value < 16 {
			writeln!(out, "{name} = {value}")
		} else {
			writeln!(out, "{name} = ${value:04x}")
		};
	}
	out
}

/// Looks up the code of a pixel, logging pixels the mapping misses.
fn code_of(assignment: &BlockAssignment, color: HwColor, x: usize, y: usize) -> u8 {
	match assignment.bitpair_of(color) {
		Some(code) => code,
		None => {
			warn!("pixel ({},{}) color {} is not in the bitpair colors, using 0", x, y, color);
			0
		}
	}
}

/// Packs one 8-pixel row of 1-bit codes, most significant bit first.
fn pack_hires_row(
	image: &AnalyzedImage,
	assignment: &BlockAssignment,
	x: usize,
	y: usize,
	pixels: usize,
) -> u8 {
	let mut byte = 0u8;
	for p in 0..pixels {
		let code = code_of(assignment, image.pixel(x + p, y), x + p, y);
		byte |= (code & 1) << (7 - p);
	}
	byte
}

/// Packs four 2-bit codes sampled from the left pixel of each pair.
fn pack_multicolor_row(
	image: &AnalyzedImage,
	assignment: &BlockAssignment,
	x: usize,
	y: usize,
) -> u8 {
	let mut byte = 0u8;
	for p in 0..4 {
		let px = x + p * 2;
		let code = code_of(assignment, image.pixel(px, y), px, y);
		byte |= (code & 3) << (6 - p * 2);
	}
	byte
}
