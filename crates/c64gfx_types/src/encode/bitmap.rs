//! Bitmap modes: hires and koala.

use crate::{
	analyze::AnalyzedImage,
	bitpair::{BitpairMapping, BlockAssignment},
	color::HwColor,
	encode::{
		Symbol,
		constants::{
			BITMAP_ADDRESS, BITMAP_COLOR_ADDRESS, BITMAP_SCREEN_ADDRESS, BYTES_PER_BLOCK,
			KOALA_BACKGROUND_ADDRESS,
		},
		pack_hires_row, pack_multicolor_row,
	},
	error::{MemoryError, PackingError},
	linker::Linker,
	source::constants::BLOCK_SIZE,
};

fn nibble(color: HwColor) -> u8 {
	color.index() & 0x0f
}

fn color_of(value: u8) -> HwColor {
	HwColor::new(value & 0x0f).unwrap_or_default()
}

fn block_payload(bitmap: &[u8], attributes: &[&[u8]], index: usize) -> Option<Vec<u8>> {
	let start = index * BYTES_PER_BLOCK;
	let mut payload = bitmap.get(start..start + BYTES_PER_BLOCK)?.to_vec();
	for table in attributes {
		payload.push(*table.get(index)?);
	}
	Some(payload)
}

/// Single-color bitmap. Each block picks its own two colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hires {
	/// 8000 bitmap bytes, 8 per block
	pub bitmap: Vec<u8>,
	/// Per block: color of bit 1 in the high nibble, bit 0 in the low nibble
	pub screen: Vec<u8>,
	/// Border color
	pub border: HwColor,
	blocks_per_row: usize,
}

impl Hires {
	/// Encodes a single-color bitmap.
	pub fn encode(image: &AnalyzedImage, mapping: &BitpairMapping) -> Result<Self, PackingError> {
		let assignments = mapping.resolve_blocks(image)?;
		let mut bitmap = Vec::with_capacity(assignments.len() * BYTES_PER_BLOCK);
		let mut screen = Vec::with_capacity(assignments.len());
		for (index, assignment) in assignments.iter().enumerate() {
			let (bx, by) = image.block_origin(index);
			for y in by..by + BLOCK_SIZE {
				bitmap.push(pack_hires_row(image, assignment, bx, y, BLOCK_SIZE));
			}
			screen.push(
				nibble(assignment.color_or_black(1)) << 4 | nibble(assignment.color_or_black(0)),
			);
		}
		Ok(Self {
			bitmap,
			screen,
			border: image.border(),
			blocks_per_row: image.blocks_per_row(),
		})
	}

	/// Writes bitmap, screen and border.
	pub fn link(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		linker.write_at(BITMAP_ADDRESS, &self.bitmap)?;
		linker.write_at(BITMAP_SCREEN_ADDRESS, &self.screen)?;
		linker.write_at(BITMAP_COLOR_ADDRESS, &[self.border.index()])?;
		Ok(())
	}

	/// Load addresses and the border color.
	pub fn symbols(&self) -> Vec<Symbol> {
		vec![
			("bitmap", BITMAP_ADDRESS),
			("screenram", BITMAP_SCREEN_ADDRESS),
			("d020", u16::from(self.border.index())),
		]
	}

	/// Bitmap bytes and screen byte of one block.
	pub fn block_payload(&self, index: usize) -> Option<Vec<u8>> {
		block_payload(&self.bitmap, &[&self.screen], index)
	}

	/// Decodes the pixels back to hardware colors.
	pub fn render(&self) -> Vec<HwColor> {
		let width = self.blocks_per_row * BLOCK_SIZE;
		let mut pixels = vec![HwColor::BLACK; self.bitmap.len() * 8];
		for (index, colors) in self.screen.iter().enumerate() {
			let bx = (index % self.blocks_per_row) * BLOCK_SIZE;
			let by = (index / self.blocks_per_row) * BLOCK_SIZE;
			for row in 0..BLOCK_SIZE {
				let byte = self.bitmap[index * BYTES_PER_BLOCK + row];
				for p in 0..8 {
					let value = if byte & (0x80 >> p) != 0 { colors >> 4 } else { *colors };
					pixels[(by + row) * width + bx + p] = color_of(value);
				}
			}
		}
		pixels
	}
}

/// Multicolor bitmap with a shared background.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Koala {
	/// 8000 bitmap bytes, 8 per block
	pub bitmap: Vec<u8>,
	/// Per block: bitpair 01 in the high nibble, bitpair 10 in the low nibble
	pub screen: Vec<u8>,
	/// Per block: bitpair 11
	pub color_ram: Vec<u8>,
	/// Background color, bitpair 00
	pub background: HwColor,
	/// Border color
	pub border: HwColor,
	blocks_per_row: usize,
}

impl Koala {
	/// Encodes a multicolor bitmap.
	pub fn encode(image: &AnalyzedImage, mapping: &BitpairMapping) -> Result<Self, PackingError> {
		let assignments = mapping.resolve_blocks(image)?;
		Ok(Self::from_assignments(image, &assignments, mapping.background_for(image)))
	}

	/// Packs an image whose blocks are already resolved.
	pub fn from_assignments(
		image: &AnalyzedImage,
		assignments: &[BlockAssignment],
		background: HwColor,
	) -> Self {
		let mut bitmap = Vec::with_capacity(assignments.len() * BYTES_PER_BLOCK);
		let mut screen = Vec::with_capacity(assignments.len());
		let mut color_ram = Vec::with_capacity(assignments.len());
		for (index, assignment) in assignments.iter().enumerate() {
			let (bx, by) = image.block_origin(index);
			for y in by..by + BLOCK_SIZE {
				bitmap.push(pack_multicolor_row(image, assignment, bx, y));
			}
			screen.push(
				nibble(assignment.color_or_black(1)) << 4 | nibble(assignment.color_or_black(2)),
			);
			color_ram.push(nibble(assignment.color_or_black(3)));
		}
		Self {
			bitmap,
			screen,
			color_ram,
			background,
			border: image.border(),
			blocks_per_row: image.blocks_per_row(),
		}
	}

	/// Writes the classic koala layout.
	pub fn link(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		linker.write_at(BITMAP_ADDRESS, &self.bitmap)?;
		linker.write_at(BITMAP_SCREEN_ADDRESS, &self.screen)?;
		linker.write_at(BITMAP_COLOR_ADDRESS, &self.color_ram)?;
		linker.write_at(
			KOALA_BACKGROUND_ADDRESS,
			&[nibble(self.background) | nibble(self.border) << 4],
		)?;
		Ok(())
	}

	/// Load addresses and color registers.
	pub fn symbols(&self) -> Vec<Symbol> {
		vec![
			("bitmap", BITMAP_ADDRESS),
			("screenram", BITMAP_SCREEN_ADDRESS),
			("colorram", BITMAP_COLOR_ADDRESS),
			("d020", u16::from(self.border.index())),
			("d021", u16::from(self.background.index())),
		]
	}

	/// Bitmap bytes, screen byte and color RAM byte of one block.
	pub fn block_payload(&self, index: usize) -> Option<Vec<u8>> {
		block_payload(&self.bitmap, &[&self.screen, &self.color_ram], index)
	}

	/// Decodes the pixels back to hardware colors, both pixels of a pair
	/// getting the same color.
	pub fn render(&self) -> Vec<HwColor> {
		let width = self.blocks_per_row * BLOCK_SIZE;
		let mut pixels = vec![HwColor::BLACK; self.bitmap.len() * 8];
		for (index, colors) in self.screen.iter().enumerate() {
			let bx = (index % self.blocks_per_row) * BLOCK_SIZE;
			let by = (index / self.blocks_per_row) * BLOCK_SIZE;
			for row in 0..BLOCK_SIZE {
				let byte = self.bitmap[index * BYTES_PER_BLOCK + row];
				for p in 0..4 {
					let color = match (byte >> (6 - p * 2)) & 3 {
						0 => self.background,
						1 => color_of(colors >> 4),
						2 => color_of(*colors),
						_ => color_of(self.color_ram[index]),
					};
					let offset = (by + row) * width + bx + p * 2;
					pixels[offset] = color;
					pixels[offset + 1] = color;
				}
			}
		}
		pixels
	}
}
