//! Bitpair color assignment.
//!
//! Every pixel of an encoded image is a 1- or 2-bit code. The mapping from
//! codes to hardware colors is global for the image (with per-block freedom
//! in the bitmap modes). Where a color lands changes the byte patterns the
//! encoders emit, and with them the compressed size of the result.
//!
//! # Examples
//!
//! ```
//! use c64gfx_types::bitpair::BitpairPreference;
//! use c64gfx_types::color::HwColor;
//!
//! let pref: BitpairPreference = "0,-1,-1,3".parse().unwrap();
//! assert_eq!(pref.slot(0), Some(HwColor::BLACK));
//! assert_eq!(pref.slot(1), None);
//! assert_eq!(pref.to_string(), "0,-1,-1,3");
//! ```

use std::{fmt, str::FromStr};

use log::{debug, warn};
use serde::Deserialize;

use crate::{
	analyze::AnalyzedImage,
	color::HwColor,
	error::{ConvertError, PackingError, ValidationError},
	mode::GraphicsMode,
};

/// Most slots any mode has.
pub const MAX_SLOTS: usize = 4;

fn format_slots(slots: &[Option<HwColor>], f: &mut fmt::Formatter<'_>) -> fmt::Result {
	for (i, slot) in slots.iter().enumerate() {
		if i > 0 {
			f.write_str(",")?;
		}
		match slot {
			Some(color) => write!(f, "{}", color.index())?,
			None => f.write_str("-1")?,
		}
	}
	Ok(())
}

/// Caller-supplied bitpair colors, `-1` meaning "don't care".
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub struct BitpairPreference {
	slots: Vec<Option<HwColor>>,
}

impl BitpairPreference {
	/// Creates a preference from explicit slots.
	pub fn new(slots: Vec<Option<HwColor>>) -> Result<Self, ValidationError> {
		let text = Self {
			slots: slots.clone(),
		}
		.to_string();
		if slots.len() > MAX_SLOTS {
			return Err(ValidationError::InvalidBitpairColors(
				text,
				format!("at most {MAX_SLOTS} colors"),
			));
		}
		for (i, slot) in slots.iter().enumerate() {
			if slot.is_some() && slots[..i].contains(slot) {
				return Err(ValidationError::InvalidBitpairColors(
					text,
					"a color is listed twice".to_string(),
				));
			}
		}
		Ok(Self {
			slots,
		})
	}

	/// Color wanted for a slot, `None` when unspecified.
	pub fn slot(&self, index: usize) -> Option<HwColor> {
		self.slots.get(index).copied().flatten()
	}

	/// The listed slots.
	pub fn slots(&self) -> &[Option<HwColor>] {
		&self.slots
	}

	/// Number of listed slots.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Returns `true` if nothing was listed.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}

impl FromStr for BitpairPreference {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if s.is_empty() {
			return Ok(Self::default());
		}
		let slots = s
			.split(',')
			.map(|part| {
				let value: i32 = part.trim().parse().map_err(|_| {
					ValidationError::InvalidBitpairColors(
						s.to_string(),
						format!("{:?} is not a number", part.trim()),
					)
				})?;
				if value == -1 {
					Ok(None)
				} else {
					HwColor::try_from(value).map(Some)
				}
			})
			.collect::<Result<Vec<_>, _>>()?;
		Self::new(slots)
	}
}

impl TryFrom<String> for BitpairPreference {
	type Error = ValidationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}

impl fmt::Display for BitpairPreference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		format_slots(&self.slots, f)
	}
}

/// Global color per bitpair code.
///
/// No color occupies two slots. For modes with a global background, slot 0
/// holds it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct BitpairMapping {
	slots: Vec<Option<HwColor>>,
}

impl BitpairMapping {
	/// Builds a mapping from fully specified colors.
	pub fn from_colors(colors: &[HwColor]) -> Self {
		Self {
			slots: colors.iter().copied().map(Some).collect(),
		}
	}

	/// Builds a mapping with unspecified slots.
	pub fn from_slots(slots: Vec<Option<HwColor>>) -> Self {
		Self {
			slots,
		}
	}

	/// Color of a slot.
	pub fn slot(&self, index: usize) -> Option<HwColor> {
		self.slots.get(index).copied().flatten()
	}

	/// Slot holding `color`.
	pub fn slot_of(&self, color: HwColor) -> Option<usize> {
		self.slots.iter().position(|slot| *slot == Some(color))
	}

	/// All slots.
	pub fn slots(&self) -> &[Option<HwColor>] {
		&self.slots
	}

	/// Number of slots.
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	/// Returns `true` for an empty mapping.
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// The mapping as a preference, for reuse across animation frames.
	pub fn to_preference(&self) -> BitpairPreference {
		BitpairPreference {
			slots: self.slots.clone(),
		}
	}

	/// Resolves the slots of one set of colors.
	///
	/// The background is pinned to slot 0 for modes that have one. Colors that
	/// are already mapped keep their slot, the rest take the remaining slots
	/// from the highest down. Returns `None` if the colors do not fit.
	pub fn resolve(
		&self,
		mode: GraphicsMode,
		background: HwColor,
		colors: impl IntoIterator<Item = HwColor>,
	) -> Option<BlockAssignment> {
		let width = mode.max_colors();
		let colors: Vec<HwColor> = colors.into_iter().collect();
		let mut assignment = BlockAssignment::default();
		let mut available: Vec<usize> = (0..width).collect();

		if mode.has_global_background() {
			assignment.slots[0] = Some(background);
			available.retain(|&slot| slot != 0);
		}
		for (slot, wanted) in self.slots.iter().enumerate().take(width) {
			if let Some(color) = wanted
				&& colors.contains(color)
				&& available.contains(&slot)
				&& assignment.bitpair_of(*color).is_none()
			{
				assignment.slots[slot] = Some(*color);
				available.retain(|&s| s != slot);
			}
		}
		for color in colors {
			if assignment.bitpair_of(color).is_some() {
				continue;
			}
			let slot = available.pop()?;
			assignment.slots[slot] = Some(color);
		}
		Some(assignment)
	}

	/// Resolves the slots of every block of a bitmap image.
	pub fn resolve_blocks(&self, image: &AnalyzedImage) -> Result<Vec<BlockAssignment>, PackingError> {
		let mode = image.mode();
		let background = self.background_for(image);
		image
			.blocks()
			.iter()
			.enumerate()
			.map(|(index, block)| {
				self.resolve(mode, background, block.colors()).ok_or_else(|| {
					let (x, y) = image.block_origin(index);
					let reserved = mode.has_global_background() && !block.contains(background);
					let max = mode.max_colors() - usize::from(reserved);
					PackingError::TooManyColorsInBlock {
						block: index,
						x,
						y,
						colors: block.len(),
						max,
					}
				})
			})
			.collect()
	}

	/// Resolves one assignment for the whole image, for modes with global
	/// color registers.
	pub fn resolve_global(&self, image: &AnalyzedImage) -> Result<BlockAssignment, ConvertError> {
		let mode = image.mode();
		let colors = image.colors();
		let found = colors.len();
		self.resolve(mode, self.background_for(image), colors).ok_or_else(|| {
			ValidationError::TooManyColors {
				found,
				max: mode.max_colors(),
			}
			.into()
		})
	}

	/// The background this mapping encodes with.
	pub fn background_for(&self, image: &AnalyzedImage) -> HwColor {
		self.slot(0).filter(|_| image.mode().has_global_background()).unwrap_or(image.background())
	}
}

impl fmt::Display for BitpairMapping {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		format_slots(&self.slots, f)
	}
}

/// The color of each bitpair inside one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockAssignment {
	slots: [Option<HwColor>; MAX_SLOTS],
}

impl BlockAssignment {
	/// Color selected by a bitpair code.
	pub fn color(&self, bitpair: usize) -> Option<HwColor> {
		self.slots.get(bitpair).copied().flatten()
	}

	/// Color of a bitpair, black when unused.
	pub fn color_or_black(&self, bitpair: usize) -> HwColor {
		self.color(bitpair).unwrap_or_default()
	}

	/// Bitpair code of a color.
	pub fn bitpair_of(&self, color: HwColor) -> Option<u8> {
		self.slots.iter().position(|slot| *slot == Some(color)).map(|i| i as u8)
	}

	/// The block's slots as a mapping, to steer the resolution of another
	/// block towards the same bitpairs.
	pub fn to_mapping(&self) -> BitpairMapping {
		BitpairMapping {
			slots: self.slots.to_vec(),
		}
	}
}

/// Picks the global bitpair mapping of an image.
pub struct BitpairAssigner;

impl BitpairAssigner {
	/// Builds the mapping from an optional caller preference.
	///
	/// Without a preference the heuristic runs: the background seeds slot 0,
	/// the most used colors fill the rest, then slots 1 and 3 are swapped.
	/// With a preference the listed slots are kept and only the remaining
	/// slots are filled by frequency. `guess = false` disables filling.
	pub fn assign(
		image: &AnalyzedImage,
		preference: Option<&BitpairPreference>,
		guess: bool,
	) -> BitpairMapping {
		let mode = image.mode();
		let max = mode.max_colors();
		let explicit = preference.is_some_and(|p| !p.is_empty());
		let mut slots: Vec<Option<HwColor>> =
			preference.map(|p| p.slots().iter().copied().take(max).collect()).unwrap_or_default();

		if mode.has_global_background() {
			let background = image.background();
			for slot in slots.iter_mut().skip(1) {
				if *slot == Some(background) {
					*slot = None;
				}
			}
			match slots.first_mut() {
				Some(first) => {
					if first.is_some_and(|c| c != background) {
						warn!("bitpair 0 must be the background, using {} instead", background);
					}
					*first = Some(background);
				}
				None => slots.push(Some(background)),
			}
		}

		if guess {
			for color in image.colors_by_frequency() {
				if slots.len() >= max {
					break;
				}
				if !slots.contains(&Some(color)) {
					slots.push(Some(color));
				}
			}
			if !explicit {
				Self::reorder(mode, &mut slots);
			}
		}

		let mapping = BitpairMapping {
			slots,
		};
		debug!("bitpair colors: {}", mapping);
		mapping
	}

	fn reorder(mode: GraphicsMode, slots: &mut [Option<HwColor>]) {
		if slots.len() < MAX_SLOTS {
			return;
		}
		slots.swap(1, 3);
		if mode != GraphicsMode::MultiColorCharset {
			return;
		}
		if slots[3] == Some(HwColor::BLACK) {
			slots.swap(1, 3);
		}
		if slots[3].is_some_and(|c| c.index() >= 8)
			&& let Some(i) = (1..3).find(|&i| slots[i].is_some_and(|c| c.index() < 8))
		{
			slots.swap(i, 3);
		}
	}
}
