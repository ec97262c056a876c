//! Charset modes.
//!
//! The canvas is cut into 8x8 blocks, identical blocks share one character and
//! the screen holds the character index of every block. All colors are global,
//! so one bitpair assignment covers the whole image.

use std::collections::HashMap;

use log::debug;

use crate::{
	analyze::AnalyzedImage,
	bitpair::{BitpairMapping, BlockAssignment},
	color::HwColor,
	encode::{
		Symbol,
		constants::{
			BYTES_PER_BLOCK, CHARSET_ADDRESS, CHARSET_COLOR_ADDRESS, CHARSET_REGISTERS_ADDRESS,
			CHARSET_SCREEN_ADDRESS, MAX_CHARS,
		},
		pack_hires_row, pack_multicolor_row,
	},
	error::{ConvertError, MemoryError, PackingError},
	linker::Linker,
	source::constants::BLOCK_SIZE,
};

/// Multicolor flag of a color RAM value.
const MULTICOLOR_FLAG: u8 = 0x08;

type Glyph = [u8; BYTES_PER_BLOCK];

/// Deduplicated characters plus the per-block index map.
#[derive(Debug, Default)]
struct CharsetBuilder {
	glyphs: Vec<Glyph>,
	lookup: HashMap<Glyph, u8>,
	screen: Vec<u8>,
	overflow: usize,
}

impl CharsetBuilder {
	fn push(&mut self, glyph: Glyph) {
		if let Some(index) = self.lookup.get(&glyph) {
			self.screen.push(*index);
			return;
		}
		if self.glyphs.len() == MAX_CHARS {
			self.overflow += 1;
			self.lookup.insert(glyph, 0);
			self.screen.push(0);
			return;
		}
		let index = self.glyphs.len() as u8;
		self.glyphs.push(glyph);
		self.lookup.insert(glyph, index);
		self.screen.push(index);
	}

	fn finish(self) -> Result<(Vec<u8>, Vec<u8>), PackingError> {
		if self.overflow > 0 {
			return Err(PackingError::TooManyChars {
				count: self.glyphs.len() + self.overflow,
				max: MAX_CHARS,
			});
		}
		debug!("charset uses {} unique chars", self.glyphs.len());
		Ok((self.glyphs.concat(), self.screen))
	}
}

fn build_charset(
	image: &AnalyzedImage,
	assignment: &BlockAssignment,
	multicolor: bool,
) -> Result<(Vec<u8>, Vec<u8>), PackingError> {
	let mut builder = CharsetBuilder::default();
	for index in 0..image.blocks().len() {
		let (bx, by) = image.block_origin(index);
		let mut glyph = Glyph::default();
		for (row, byte) in glyph.iter_mut().enumerate() {
			*byte = if multicolor {
				pack_multicolor_row(image, assignment, bx, by + row)
			} else {
				pack_hires_row(image, assignment, bx, by + row, BLOCK_SIZE)
			};
		}
		builder.push(glyph);
	}
	builder.finish()
}

fn render_chars(
	charset: &[u8],
	screen: &[u8],
	blocks_per_row: usize,
	mut pixel: impl FnMut(usize, u8, usize) -> (HwColor, usize),
) -> Vec<HwColor> {
	let width = blocks_per_row * BLOCK_SIZE;
	let mut pixels = vec![HwColor::BLACK; screen.len() * BLOCK_SIZE * BLOCK_SIZE];
	for (index, char_index) in screen.iter().enumerate() {
		let (bx, by) = ((index % blocks_per_row) * BLOCK_SIZE, (index / blocks_per_row) * BLOCK_SIZE);
		for row in 0..BLOCK_SIZE {
			let byte = charset[usize::from(*char_index) * BYTES_PER_BLOCK + row];
			let mut x = 0;
			while x < BLOCK_SIZE {
				let (color, span) = pixel(index, byte, x);
				for dx in 0..span {
					pixels[(by + row) * width + bx + x + dx] = color;
				}
				x += span;
			}
		}
	}
	pixels
}

/// Two-color characters on a global background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleColorCharset {
	/// Character data, 8 bytes per character
	pub charset: Vec<u8>,
	/// Character index per block
	pub screen: Vec<u8>,
	/// Color of bit 1 per block
	pub color_ram: Vec<u8>,
	/// Background color, bit 0
	pub background: HwColor,
	/// Border color
	pub border: HwColor,
	blocks_per_row: usize,
}

impl SingleColorCharset {
	/// Encodes a single-color charset.
	pub fn encode(image: &AnalyzedImage, mapping: &BitpairMapping) -> Result<Self, ConvertError> {
		let assignment = mapping.resolve_global(image)?;
		let (charset, screen) = build_charset(image, &assignment, false)?;
		let foreground = assignment.color_or_black(1);
		Ok(Self {
			color_ram: vec![foreground.index(); screen.len()],
			charset,
			screen,
			background: assignment.color_or_black(0),
			border: image.border(),
			blocks_per_row: image.blocks_per_row(),
		})
	}

	/// Number of unique characters.
	pub fn char_count(&self) -> usize {
		self.charset.len() / BYTES_PER_BLOCK
	}

	/// Writes charset, screen, color RAM and registers.
	pub fn link(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		linker.write_at(CHARSET_ADDRESS, &self.charset)?;
		linker.write_at(CHARSET_SCREEN_ADDRESS, &self.screen)?;
		linker.write_at(CHARSET_COLOR_ADDRESS, &self.color_ram)?;
		linker.write_at(CHARSET_REGISTERS_ADDRESS, &[self.border.index(), self.background.index()])?;
		Ok(())
	}

	/// Load addresses and color registers.
	pub fn symbols(&self) -> Vec<Symbol> {
		vec![
			("charset", CHARSET_ADDRESS),
			("screenram", CHARSET_SCREEN_ADDRESS),
			("colorram", CHARSET_COLOR_ADDRESS),
			("d020", u16::from(self.border.index())),
			("d021", u16::from(self.background.index())),
		]
	}

	/// Decodes the pixels back to hardware colors.
	pub fn render(&self) -> Vec<HwColor> {
		render_chars(&self.charset, &self.screen, self.blocks_per_row, |index, byte, x| {
			let color = if byte & (0x80 >> x) != 0 {
				HwColor::new(self.color_ram[index] & 0x0f).unwrap_or_default()
			} else {
				self.background
			};
			(color, 1)
		})
	}
}

/// Multicolor characters with three global colors and one per-char color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiColorCharset {
	/// Character data, 8 bytes per character
	pub charset: Vec<u8>,
	/// Character index per block
	pub screen: Vec<u8>,
	/// Bitpair 11 color with the multicolor flag, per block
	pub color_ram: Vec<u8>,
	/// Background color, bitpair 00
	pub background: HwColor,
	/// `$d022`, bitpair 01
	pub d022: HwColor,
	/// `$d023`, bitpair 10
	pub d023: HwColor,
	/// Bitpair 11
	pub char_color: HwColor,
	/// Border color
	pub border: HwColor,
	blocks_per_row: usize,
}

impl MultiColorCharset {
	/// Encodes a multicolor charset.
	///
	/// Fails when bitpair 11 is one of colors 8-15, which would turn the
	/// characters single-color.
	pub fn encode(image: &AnalyzedImage, mapping: &BitpairMapping) -> Result<Self, ConvertError> {
		let assignment = mapping.resolve_global(image)?;
		let char_color = assignment.color_or_black(3);
		if char_color.index() >= 8 {
			return Err(PackingError::UnsupportedCharColor(char_color).into());
		}
		let (charset, screen) = build_charset(image, &assignment, true)?;
		Ok(Self {
			color_ram: vec![char_color.index() | MULTICOLOR_FLAG; screen.len()],
			charset,
			screen,
			background: assignment.color_or_black(0),
			d022: assignment.color_or_black(1),
			d023: assignment.color_or_black(2),
			char_color,
			border: image.border(),
			blocks_per_row: image.blocks_per_row(),
		})
	}

	/// Number of unique characters.
	pub fn char_count(&self) -> usize {
		self.charset.len() / BYTES_PER_BLOCK
	}

	/// Writes charset, screen, color RAM and registers.
	pub fn link(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		linker.write_at(CHARSET_ADDRESS, &self.charset)?;
		linker.write_at(CHARSET_SCREEN_ADDRESS, &self.screen)?;
		linker.write_at(CHARSET_COLOR_ADDRESS, &self.color_ram)?;
		linker.write_at(
			CHARSET_REGISTERS_ADDRESS,
			&[self.border.index(), self.background.index(), self.d022.index(), self.d023.index()],
		)?;
		Ok(())
	}

	/// Load addresses and color registers.
	pub fn symbols(&self) -> Vec<Symbol> {
		vec![
			("charset", CHARSET_ADDRESS),
			("screenram", CHARSET_SCREEN_ADDRESS),
			("colorram", CHARSET_COLOR_ADDRESS),
			("d020", u16::from(self.border.index())),
			("d021", u16::from(self.background.index())),
			("d022", u16::from(self.d022.index())),
			("d023", u16::from(self.d023.index())),
			("charcolor", u16::from(self.char_color.index())),
		]
	}

	/// Decodes the pixels back to hardware colors.
	pub fn render(&self) -> Vec<HwColor> {
		render_chars(&self.charset, &self.screen, self.blocks_per_row, |index, byte, x| {
			let color = match (byte >> (6 - x)) & 3 {
				0 => self.background,
				1 => self.d022,
				2 => self.d023,
				_ => HwColor::new(self.color_ram[index] & 0x07).unwrap_or_default(),
			};
			(color, 2)
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::{
		analyze::ModeAnalyzer,
		bitpair::BitpairAssigner,
		mode::GraphicsMode,
		options::Options,
		palette::PALETTES,
		source::{RgbImage, SourceImage},
	};

	fn analyzed(options: &Options, f: impl Fn(usize, usize) -> HwColor) -> AnalyzedImage {
		let image = RgbImage::from_fn(320, 200, |x, y| PALETTES[0].rgb(f(x, y)));
		ModeAnalyzer::analyze(&SourceImage::new(&image).unwrap(), options).unwrap()
	}

	/// Block pattern derived from the block index: bit `i` of the index sets
	/// pixel `i` of the block.
	fn unique_blocks(count: usize) -> impl Fn(usize, usize) -> HwColor {
		move |x, y| {
			let index = (y / 8) * 40 + x / 8;
			let bit = (y % 8) * 8 + x % 8;
			let pattern = if index < count { index + 1 } else { 0 };
			if bit < 12 && pattern & (1 << bit) != 0 { HwColor::WHITE } else { HwColor::BLUE }
		}
	}

	#[test]
	fn test_sc_charset_dedup() {
		let image = analyzed(&Options::default(), |x, y| {
			if (x / 8) % 2 == 0 && x % 8 == y % 8 { HwColor::WHITE } else { HwColor::BLUE }
		});
		assert_eq!(image.mode(), GraphicsMode::SingleColorCharset);
		let mapping = BitpairAssigner::assign(&image, None, true);
		let charset = SingleColorCharset::encode(&image, &mapping).unwrap();
		assert_eq!(charset.char_count(), 2);
		assert_eq!(charset.screen.len(), 1000);
		assert_eq!(charset.background, HwColor::BLUE);
		assert_eq!(charset.color_ram[0], HwColor::WHITE.index());
		assert_eq!(charset.screen[0], 0);
		assert_eq!(charset.screen[1], 1);
		assert_eq!(&charset.charset[..8], &[0x80, 0x40, 0x20, 0x10, 0x08, 0x04, 0x02, 0x01]);
		assert_eq!(&charset.charset[8..], &[0; 8]);
	}

	#[test]
	fn test_sc_charset_at_limit() {
		let image = analyzed(&Options::default(), unique_blocks(255));
		let mapping = BitpairAssigner::assign(&image, None, true);
		let charset = SingleColorCharset::encode(&image, &mapping).unwrap();
		assert_eq!(charset.char_count(), 256);
	}

	#[test]
	fn test_sc_charset_over_limit() {
		let image = analyzed(&Options::default(), unique_blocks(256));
		let mapping = BitpairAssigner::assign(&image, None, true);
		let err = SingleColorCharset::encode(&image, &mapping).unwrap_err();
		assert!(matches!(
			err,
			ConvertError::Packing(PackingError::TooManyChars {
				count: 257,
				max: 256
			})
		));
	}

	#[test]
	fn test_mc_charset_registers_and_render() {
		let colors = [HwColor::BLACK, HwColor::RED, HwColor::CYAN, HwColor::PURPLE];
		let pick = |x: usize, y: usize| colors[(x / 2 + y / 8) % 4];
		let image = analyzed(&Options::default(), pick);
		assert_eq!(image.mode(), GraphicsMode::MultiColorCharset);
		let mapping = BitpairMapping::from_colors(&colors);
		let charset = MultiColorCharset::encode(&image, &mapping).unwrap();
		assert_eq!(charset.background, HwColor::BLACK);
		assert_eq!(charset.d022, HwColor::RED);
		assert_eq!(charset.d023, HwColor::CYAN);
		assert_eq!(charset.char_color, HwColor::PURPLE);
		assert_eq!(charset.color_ram[0], 0x0c);
		assert_eq!(charset.char_count(), 4);

		let pixels = charset.render();
		for y in 0..200 {
			for x in 0..320 {
				assert_eq!(pixels[y * 320 + x], pick(x, y));
			}
		}

		let mut linker = Linker::default();
		charset.link(&mut linker).unwrap();
		assert_eq!(linker.end_address(), Some(0x2fec));
		assert_eq!(linker.byte(0x2fea), HwColor::RED.index());
	}

	#[test]
	fn test_mc_charset_rejects_high_char_color() {
		let colors = [HwColor::BLACK, HwColor::RED, HwColor::CYAN, HwColor::LIGHT_GREEN];
		let image = analyzed(&Options::default(), |x, _| colors[(x / 2) % 4]);
		let mapping = BitpairMapping::from_colors(&colors);
		let err = MultiColorCharset::encode(&image, &mapping).unwrap_err();
		assert!(matches!(
			err,
			ConvertError::Packing(PackingError::UnsupportedCharColor(c)) if c == HwColor::LIGHT_GREEN
		));
	}
}
