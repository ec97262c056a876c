//! Multicolor interlace.
//!
//! An interlaced picture is two koala frames shown on alternate video frames,
//! the second one scrolled right by the d016 offset. Each frame carries one
//! pixel of every source pixel pair, so the blend shows the full horizontal
//! resolution. Both frames read the same color RAM, which means the bitpair
//! 11 color of a block has to agree between them.
//!
//! # Layout
//!
//! | Part | Address |
//! |------|---------|
//! | first bitmap | `$2000` |
//! | first screen | `$4000` |
//! | shared color RAM | `$4400` |
//! | background and border | `$47e8` |
//! | second screen | `$5c00` |
//! | second bitmap | `$6000` |
//! | background and border, 0, d016 offset | `$7f40` |

use log::{debug, info, warn};

use crate::{
	analyze::{AnalyzedImage, BlockColorMap},
	bitpair::{BitpairMapping, BlockAssignment, MAX_SLOTS},
	color::HwColor,
	encode::{Koala, Symbol},
	error::{ConvertError, MemoryError, PackingError, ValidationError},
	linker::Linker,
	mode::GraphicsMode,
	source::{Canvas, PixelSource, RgbImage, SourceImage},
};

/// Load addresses of an interlaced picture.
pub mod constants {
	/// Bitmap of the first frame
	pub const FIRST_BITMAP_ADDRESS: u16 = 0x2000;

	/// Screen RAM of the first frame
	pub const FIRST_SCREEN_ADDRESS: u16 = 0x4000;

	/// Color RAM shared by both frames
	pub const COLOR_RAM_ADDRESS: u16 = 0x4400;

	/// Background and border byte following the color RAM
	pub const BACKGROUND_ADDRESS: u16 = 0x47e8;

	/// Screen RAM of the second frame
	pub const SECOND_SCREEN_ADDRESS: u16 = 0x5c00;

	/// Bitmap of the second frame
	pub const SECOND_BITMAP_ADDRESS: u16 = 0x6000;

	/// Background and border, a zero byte and the d016 offset
	pub const REGISTERS_ADDRESS: u16 = 0x7f40;

	/// Horizontal scroll of the second frame
	pub const D016_OFFSET_ADDRESS: u16 = REGISTERS_ADDRESS + 2;
}

use constants::*;

/// Returns `true` if any pixel pair of the canvas has two different colors.
///
/// A plain koala picture repeats every color over a pixel pair, an
/// interlaced one does not.
pub fn is_interlaced<S: PixelSource>(source: &SourceImage<S>) -> bool {
	let canvas = source.canvas();
	(0..canvas.height).any(|y| {
		(0..canvas.width).step_by(2).any(|x| source.pixel(x, y) != source.pixel(x + 1, y))
	})
}

/// Splits an interlaced picture into its two frames.
///
/// The first frame repeats the left pixel of every pair, the second the
/// right one. The whole source is split, margins included, so screenshots
/// keep their border.
pub fn split<S: PixelSource>(source: S) -> Result<(RgbImage, RgbImage), ValidationError> {
	let canvas = Canvas::detect(source.width(), source.height())?;
	if canvas.is_sprites() {
		return Err(ValidationError::IncompatibleMode {
			mode: GraphicsMode::MultiColorBitmap,
			reason: "sprite sheets cannot be interlaced".to_string(),
		});
	}
	let (width, height) = (source.width(), source.height());
	let frame =
		|side: usize| RgbImage::from_fn(width, height, |x, y| source.pixel(x & !1 | side, y));
	Ok((frame(0), frame(1)))
}

/// How the blocks of two interlaced frames were matched up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairingStats {
	/// Blocks where the first frame's bitpairs fit the second frame as well
	pub guided: usize,
	/// Blocks where a color of both frames was moved to bitpair 11
	pub forced: usize,
	/// Blocks where one frame leaves bitpair 11 unused
	pub unshared: usize,
	/// Blocks whose frames still want different bitpair 11 colors
	pub conflicts: usize,
}

/// Two koala frames sharing one color RAM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterlacedKoala {
	/// Frame shown unscrolled
	pub first: Koala,
	/// Frame shown with the d016 offset
	pub second: Koala,
	/// Horizontal scroll of the second frame
	pub d016_offset: u8,
	/// How the blocks were paired
	pub stats: PairingStats,
}

impl InterlacedKoala {
	/// Encodes two multicolor bitmap frames.
	///
	/// Every block of the second frame is resolved with the bitpairs its
	/// counterpart got in the first frame. When the two still disagree on
	/// bitpair 11, a color found in both blocks is moved to bitpair 11 in
	/// both. Without such a color the fuller block keeps bitpair 11 and the
	/// other one is packed without it.
	///
	/// # Errors
	///
	/// Fails when a frame is not a multicolor bitmap, when a block does not
	/// fit the background, or when two blocks with four colors each have no
	/// color in common.
	pub fn encode(
		first: &AnalyzedImage,
		second: &AnalyzedImage,
		mapping: &BitpairMapping,
		d016_offset: u8,
	) -> Result<Self, ConvertError> {
		for image in [first, second] {
			if image.mode() != GraphicsMode::MultiColorBitmap {
				return Err(ValidationError::IncompatibleMode {
					mode: image.mode(),
					reason: "interlaced frames are multicolor bitmaps".to_string(),
				}
				.into());
			}
		}

		let background = mapping.background_for(first);
		let mut stats = PairingStats::default();
		let mut firsts = Vec::with_capacity(first.blocks().len());
		let mut seconds = Vec::with_capacity(first.blocks().len());
		for index in 0..first.blocks().len().min(second.blocks().len()) {
			let (a, b) = pair_block(first, second, index, mapping, background, &mut stats)?;
			firsts.push(a);
			seconds.push(b);
		}

		let mut first_koala = Koala::from_assignments(first, &firsts, background);
		let mut second_koala = Koala::from_assignments(second, &seconds, background);
		for (index, (a, b)) in firsts.iter().zip(&seconds).enumerate() {
			let shared = match (a.color(3), b.color(3)) {
				(Some(left), Some(right)) if left != right => {
					stats.conflicts += 1;
					right
				}
				(left, right) => right.or(left).unwrap_or_default(),
			};
			first_koala.color_ram[index] = shared.index();
			second_koala.color_ram[index] = shared.index();
		}

		info!(
			"interlace: {} guided, {} forced, {} unshared block(s)",
			stats.guided, stats.forced, stats.unshared
		);
		if stats.conflicts > 0 {
			warn!(
				"interlace: {} block(s) disagree on bitpair 11, using the second frame's color",
				stats.conflicts
			);
		}
		Ok(Self {
			first: first_koala,
			second: second_koala,
			d016_offset,
			stats,
		})
	}

	/// Writes both frames, the shared color RAM and the registers.
	pub fn link(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		let registers = self.first.background.index() | self.first.border.index() << 4;
		linker.write_at(FIRST_BITMAP_ADDRESS, &self.first.bitmap)?;
		linker.write_at(FIRST_SCREEN_ADDRESS, &self.first.screen)?;
		linker.write_at(COLOR_RAM_ADDRESS, &self.first.color_ram)?;
		linker.write_at(BACKGROUND_ADDRESS, &[registers])?;
		linker.write_at(SECOND_SCREEN_ADDRESS, &self.second.screen)?;
		linker.write_at(SECOND_BITMAP_ADDRESS, &self.second.bitmap)?;
		linker.write_at(REGISTERS_ADDRESS, &[registers, 0, self.d016_offset])?;
		Ok(())
	}

	/// Emits the picture as a program of its own.
	pub fn to_prg(&self) -> Result<Vec<u8>, MemoryError> {
		let mut linker = Linker::default();
		self.link(&mut linker)?;
		linker.to_prg()
	}

	/// Load addresses and color registers.
	pub fn symbols(&self) -> Vec<Symbol> {
		vec![
			("bitmap1", FIRST_BITMAP_ADDRESS),
			("screenram1", FIRST_SCREEN_ADDRESS),
			("colorram", COLOR_RAM_ADDRESS),
			("screenram2", SECOND_SCREEN_ADDRESS),
			("bitmap2", SECOND_BITMAP_ADDRESS),
			("d016offsetaddr", D016_OFFSET_ADDRESS),
			("d016offset", u16::from(self.d016_offset)),
			("d020", u16::from(self.first.border.index())),
			("d021", u16::from(self.first.background.index())),
		]
	}
}

/// Resolves one block in both frames.
fn pair_block(
	first: &AnalyzedImage,
	second: &AnalyzedImage,
	index: usize,
	mapping: &BitpairMapping,
	background: HwColor,
	stats: &mut PairingStats,
) -> Result<(BlockAssignment, BlockAssignment), PackingError> {
	let a = &first.blocks()[index];
	let b = &second.blocks()[index];
	let guided = resolve_block(mapping, first, index, background)?;
	let resolved = resolve_block(&guided.to_mapping(), second, index, background)?;
	if agrees(&guided, &resolved) {
		stats.guided += 1;
		return Ok((guided, resolved));
	}

	if let Some(color) = a.colors().find(|&color| color != background && b.contains(color)) {
		debug!("block {}: {} moved to bitpair 11 in both frames", index, color);
		let forced = BitpairMapping::from_slots(vec![Some(background), None, None, Some(color)]);
		stats.forced += 1;
		return Ok((
			resolve_block(&forced, first, index, background)?,
			resolve_block(&forced, second, index, background)?,
		));
	}

	if a.len() == MAX_SLOTS && b.len() == MAX_SLOTS {
		let (x, y) = first.block_origin(index);
		return Err(PackingError::NoSharedColor {
			block: index,
			x,
			y,
		});
	}
	stats.unshared += 1;
	if a.len() < MAX_SLOTS {
		Ok((resolve_block(&compact(a, background), first, index, background)?, resolved))
	} else {
		Ok((guided, resolve_block(&compact(b, background), second, index, background)?))
	}
}

fn agrees(a: &BlockAssignment, b: &BlockAssignment) -> bool {
	match (a.color(3), b.color(3)) {
		(Some(left), Some(right)) => left == right,
		_ => true,
	}
}

/// Background first, then the block's colors from the lowest slot up.
fn compact(block: &BlockColorMap, background: HwColor) -> BitpairMapping {
	let mut colors = vec![background];
	colors.extend(block.colors().filter(|&color| color != background));
	BitpairMapping::from_colors(&colors)
}

fn resolve_block(
	mapping: &BitpairMapping,
	image: &AnalyzedImage,
	index: usize,
	background: HwColor,
) -> Result<BlockAssignment, PackingError> {
	let block = &image.blocks()[index];
	mapping.resolve(GraphicsMode::MultiColorBitmap, background, block.colors()).ok_or_else(|| {
		let (x, y) = image.block_origin(index);
		PackingError::TooManyColorsInBlock {
			block: index,
			x,
			y,
			colors: block.len(),
			max: MAX_SLOTS - usize::from(!block.contains(background)),
		}
	})
}
