//! Sprite modes.
//!
//! A sprite sheet is cut into 24x21 cells, left to right and top to bottom.
//! Every cell becomes 63 bytes of sprite data plus one padding byte.

use crate::{
	analyze::AnalyzedImage,
	bitpair::{BitpairMapping, BlockAssignment},
	color::HwColor,
	encode::{Symbol, constants::SPRITE_ADDRESS, pack_hires_row, pack_multicolor_row},
	error::{ConvertError, MemoryError, ValidationError},
	linker::Linker,
	source::{
		CanvasKind,
		constants::{MAX_SPRITE_GRID, SPRITE_HEIGHT, SPRITE_WIDTH},
	},
};

/// Bytes per sprite including the padding byte.
pub const SPRITE_SIZE: usize = 64;

/// Bytes per sprite pixel row.
const BYTES_PER_ROW: usize = SPRITE_WIDTH / 8;

fn grid(image: &AnalyzedImage) -> (usize, usize) {
	match image.canvas().kind {
		CanvasKind::Sprites {
			columns,
			rows,
		} => (columns, rows),
		_ => (image.width() / SPRITE_WIDTH, image.height() / SPRITE_HEIGHT),
	}
}

/// Columns and rows as single bytes.
fn grid_bytes(columns: usize, rows: usize) -> Result<[u8; 2], ValidationError> {
	match (u8::try_from(columns), u8::try_from(rows)) {
		(Ok(columns), Ok(rows)) => Ok([columns, rows]),
		_ => Err(ValidationError::TooManySprites {
			columns,
			rows,
			max: MAX_SPRITE_GRID,
		}),
	}
}

fn rasterize(image: &AnalyzedImage, assignment: &BlockAssignment, multicolor: bool) -> Vec<u8> {
	let (columns, rows) = grid(image);
	let mut data = Vec::with_capacity(columns * rows * SPRITE_SIZE);
	for row in 0..rows {
		for column in 0..columns {
			let (sx, sy) = (column * SPRITE_WIDTH, row * SPRITE_HEIGHT);
			for y in sy..sy + SPRITE_HEIGHT {
				for part in 0..BYTES_PER_ROW {
					let x = sx + part * 8;
					data.push(if multicolor {
						pack_multicolor_row(image, assignment, x, y)
					} else {
						pack_hires_row(image, assignment, x, y, 8)
					});
				}
			}
			data.push(0);
		}
	}
	data
}

/// Two-color sprites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleColorSprites {
	/// Sprite data, 64 bytes per sprite
	pub data: Vec<u8>,
	/// Sprites per row
	pub columns: usize,
	/// Sprite rows
	pub rows: usize,
	/// Background color, bit 0
	pub background: HwColor,
	/// Sprite color, bit 1
	pub sprite_color: HwColor,
}

impl SingleColorSprites {
	/// Encodes a sheet of single-color sprites.
	pub fn encode(image: &AnalyzedImage, mapping: &BitpairMapping) -> Result<Self, ConvertError> {
		let assignment = mapping.resolve_global(image)?;
		let (columns, rows) = grid(image);
		Ok(Self {
			data: rasterize(image, &assignment, false),
			columns,
			rows,
			background: assignment.color_or_black(0),
			sprite_color: assignment.color_or_black(1),
		})
	}

	/// Number of sprites.
	pub fn sprite_count(&self) -> usize {
		self.columns * self.rows
	}

	/// Writes the sprite data.
	pub fn link(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		linker.write_at(SPRITE_ADDRESS, &self.data)?;
		Ok(())
	}

	/// Grid size and colors as a displayer reads them.
	pub fn parameters(&self) -> Result<Vec<u8>, ValidationError> {
		let [columns, rows] = grid_bytes(self.columns, self.rows)?;
		Ok(vec![columns, rows, self.background.index(), self.sprite_color.index()])
	}

	/// Load address, colors and grid size.
	pub fn symbols(&self) -> Vec<Symbol> {
		vec![
			("sprites", SPRITE_ADDRESS),
			("d021", u16::from(self.background.index())),
			("spritecolor", u16::from(self.sprite_color.index())),
			("columns", self.columns as u16),
			("rows", self.rows as u16),
		]
	}
}

/// Multicolor sprites with two shared colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiColorSprites {
	/// Sprite data, 64 bytes per sprite
	pub data: Vec<u8>,
	/// Sprites per row
	pub columns: usize,
	/// Sprite rows
	pub rows: usize,
	/// Background color, bitpair 00
	pub background: HwColor,
	/// `$d025`, bitpair 01
	pub d025: HwColor,
	/// Sprite color, bitpair 10
	pub sprite_color: HwColor,
	/// `$d026`, bitpair 11
	pub d026: HwColor,
}

impl MultiColorSprites {
	/// Encodes a sheet of multicolor sprites.
	pub fn encode(image: &AnalyzedImage, mapping: &BitpairMapping) -> Result<Self, ConvertError> {
		let assignment = mapping.resolve_global(image)?;
		let (columns, rows) = grid(image);
		Ok(Self {
			data: rasterize(image, &assignment, true),
			columns,
			rows,
			background: assignment.color_or_black(0),
			d025: assignment.color_or_black(1),
			sprite_color: assignment.color_or_black(2),
			d026: assignment.color_or_black(3),
		})
	}

	/// Number of sprites.
	pub fn sprite_count(&self) -> usize {
		self.columns * self.rows
	}

	/// Writes the sprite data.
	pub fn link(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		linker.write_at(SPRITE_ADDRESS, &self.data)?;
		Ok(())
	}

	/// Grid size and colors as a displayer reads them.
	pub fn parameters(&self) -> Result<Vec<u8>, ValidationError> {
		let [columns, rows] = grid_bytes(self.columns, self.rows)?;
		Ok(vec![
			columns,
			rows,
			self.background.index(),
			self.d025.index(),
			self.sprite_color.index(),
			self.d026.index(),
		])
	}

	/// Load address, colors and grid size.
	pub fn symbols(&self) -> Vec<Symbol> {
		vec![
			("sprites", SPRITE_ADDRESS),
			("d021", u16::from(self.background.index())),
			("d025", u16::from(self.d025.index())),
			("spritecolor", u16::from(self.sprite_color.index())),
			("d026", u16::from(self.d026.index())),
			("columns", self.columns as u16),
			("rows", self.rows as u16),
		]
	}
}
