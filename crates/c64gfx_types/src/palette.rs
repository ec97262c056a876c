//! Palette matching.
//!
//! Emulators and image editors disagree on the exact RGB values of the sixteen
//! hardware colors. The matcher compares the colors of a source image against a
//! fixed set of reference tables and keeps the closest one.
//!
//! # Examples
//!
//! ```
//! use c64gfx_types::palette::{PALETTES, PaletteMatcher};
//!
//! let pepto = &PALETTES[2];
//! let result = PaletteMatcher::match_colors(&pepto.colors).unwrap();
//! assert_eq!(result.table.name, "pepto");
//! assert_eq!(result.distance, 0);
//! ```

use std::collections::BTreeMap;

use log::{debug, info};

use crate::{
	color::{HwColor, Rgb},
	error::ValidationError,
};

/// A named set of RGB values for the sixteen hardware colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteTable {
	/// Table name
	pub name: &'static str,
	/// RGB value per hardware color index
	pub colors: [Rgb; HwColor::COUNT],
}

impl PaletteTable {
	const fn from_hex(name: &'static str, hex: [u32; HwColor::COUNT]) -> Self {
		let mut colors = [Rgb::new(0, 0, 0); HwColor::COUNT];
		let mut i = 0;
		while i < HwColor::COUNT {
			colors[i] = Rgb::from_u32(hex[i]);
			i += 1;
		}
		Self {
			name,
			colors,
		}
	}

	/// Returns the RGB value of a hardware color.
	pub const fn rgb(&self, color: HwColor) -> Rgb {
		self.colors[color.index() as usize]
	}

	/// Returns the closest hardware color to `rgb` and its distance.
	///
	/// Exact matches return immediately, ties keep the lower index.
	pub fn nearest(&self, rgb: Rgb) -> (HwColor, u32) {
		let mut best = (HwColor::BLACK, u32::MAX);
		for color in HwColor::all() {
			let distance = self.rgb(color).distance(rgb);
			if distance == 0 {
				return (color, 0);
			}
			if distance < best.1 {
				best = (color, distance);
			}
		}
		best
	}
}

/// Reference tables in match priority order.
pub const PALETTES: [PaletteTable; 7] = [
	PaletteTable::from_hex(
		"vice",
		[
			0x000000, 0xffffff, 0xbc5241, 0x8feffb, 0xb956eb, 0x7edb40, 0x553fe4, 0xffff77, 0xc17b1d,
			0x826300, 0xf49486, 0x727272, 0xa4a4a4, 0xcdff98, 0x9e8dff, 0xd5d5d5,
		],
	),
	PaletteTable::from_hex(
		"vice old lum",
		[
			0x000000, 0xffffff, 0xa93826, 0xaeffff, 0xdf82ff, 0x7edb40, 0x553fe4, 0xf7ff6d, 0xe7a453,
			0x826300, 0xf49486, 0x5c5c5c, 0xb0b0b0, 0xc4ff8f, 0xaa99ff, 0xf2f2f2,
		],
	),
	PaletteTable::from_hex(
		"pepto",
		[
			0x000000, 0xffffff, 0x68372b, 0x70a4b2, 0x6f3d86, 0x588d43, 0x352879, 0xb8c76f, 0x6f4f25,
			0x433900, 0x9a6759, 0x444444, 0x6c6c6c, 0x9ad284, 0x6c5eb5, 0x959595,
		],
	),
	PaletteTable::from_hex(
		"pantaloon",
		[
			0x000000, 0xffffff, 0x68372b, 0x83f0dc, 0x6f3d86, 0x59cd36, 0x4137cd, 0xb8c76f, 0xd17f30,
			0x433900, 0x9a6759, 0x5b5b5b, 0x8e8e8e, 0x9dff9d, 0x75a1ec, 0xc1c1c1,
		],
	),
	PaletteTable::from_hex(
		"archmage",
		[
			0x000000, 0xffffff, 0x894036, 0x7abfc7, 0x8a46ae, 0x68a941, 0x3e31a2, 0xd0dc71, 0x905f25,
			0x5c4700, 0xbb776d, 0x555555, 0x808080, 0xacea88, 0x7c70da, 0xababab,
		],
	),
	PaletteTable::from_hex(
		"electric cocillana",
		[
			0x000000, 0xffffff, 0x8b1f00, 0x6fdfb7, 0xa73b9f, 0x4ab510, 0x080094, 0xf3eb5b, 0xa54200,
			0x632918, 0xcb7b6f, 0x454444, 0x9f9f9f, 0x94ff94, 0x4a94d6, 0xbdbdbd,
		],
	),
	PaletteTable::from_hex(
		"ste",
		[
			0x000000, 0xffffff, 0xc83535, 0x83f0dc, 0xcc59c6, 0x59cd36, 0x4137cd, 0xf7ee59, 0xd17f30,
			0x915f33, 0xf99b97, 0x5b5b5b, 0x8e8e8e, 0x9dff9d, 0x75a1ec, 0xc1c1c1,
		],
	),
];

/// Outcome of matching a set of source colors against [`PALETTES`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteMatch {
	/// The selected table
	pub table: &'static PaletteTable,
	/// Sum of the per-color distances against the selected table
	pub distance: u32,
	map: BTreeMap<Rgb, HwColor>,
}

impl PaletteMatch {
	/// Returns the hardware color for a source sample seen during matching.
	pub fn get(&self, rgb: Rgb) -> Option<HwColor> {
		self.map.get(&rgb).copied()
	}

	/// Number of mapped source colors.
	pub fn len(&self) -> usize {
		self.map.len()
	}

	/// Returns `true` if no colors were mapped.
	pub fn is_empty(&self) -> bool {
		self.map.is_empty()
	}

	/// Iterates the source-to-hardware color pairs in RGB order.
	pub fn iter(&self) -> impl Iterator<Item = (Rgb, HwColor)> + '_ {
		self.map.iter().map(|(rgb, color)| (*rgb, *color))
	}
}

/// Selects the reference table closest to a set of source colors.
pub struct PaletteMatcher;

impl PaletteMatcher {
	/// Maximum number of distinct source colors.
	pub const MAX_COLORS: usize = HwColor::COUNT;

	/// Matches distinct source colors against every table in priority order.
	///
	/// # Arguments
	///
	/// * `colors` - Distinct colors of the source image
	///
	/// # Returns
	///
	/// The closest table and the color map, or an error if there are more than
	/// sixteen colors or two colors collapse onto the same hardware color.
	pub fn match_colors(colors: &[Rgb]) -> Result<PaletteMatch, ValidationError> {
		if colors.len() > Self::MAX_COLORS {
			return Err(ValidationError::TooManyColors {
				found: colors.len(),
				max: Self::MAX_COLORS,
			});
		}

		let mut best: Option<(&'static PaletteTable, u32)> = None;
		for table in &PALETTES {
			let total: u32 = colors.iter().map(|rgb| table.nearest(*rgb).1).sum();
			debug!("palette {:?} distance {}", table.name, total);
			if best.is_none_or(|(_, distance)| total < distance) {
				best = Some((table, total));
			}
			if total == 0 {
				break;
			}
		}
		let (table, distance) = best.unwrap_or((&PALETTES[0], 0));

		let mut map = BTreeMap::new();
		let mut seen: BTreeMap<HwColor, Rgb> = BTreeMap::new();
		for rgb in colors {
			let (color, _) = table.nearest(*rgb);
			if let Some(first) = seen.insert(color, *rgb)
				&& first != *rgb
			{
				return Err(ValidationError::AmbiguousPalette {
					table: table.name,
					color,
					first,
					second: *rgb,
				});
			}
			map.insert(*rgb, color);
		}

		info!("using palette {:?} with distance {}", table.name, distance);
		Ok(PaletteMatch {
			table,
			distance,
			map,
		})
	}
}
