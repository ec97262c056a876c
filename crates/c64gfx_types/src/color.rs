//! Color primitives.
//!
//! [`Rgb`] is a raw sample read from a pixel source, [`HwColor`] is one of the
//! sixteen fixed colors the VIC-II can display.

use std::{fmt, str::FromStr};

use crate::error::ValidationError;

/// 24-bit RGB sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Rgb {
	/// Red component (0-255)
	pub r: u8,
	/// Green component (0-255)
	pub g: u8,
	/// Blue component (0-255)
	pub b: u8,
}

impl Rgb {
	/// Creates a new RGB sample.
	pub const fn new(r: u8, g: u8, b: u8) -> Self {
		Self {
			r,
			g,
			b,
		}
	}

	/// Creates a sample from a packed `0xRRGGBB` value.
	pub const fn from_u32(rgb: u32) -> Self {
		Self {
			r: ((rgb >> 16) & 0xFF) as u8,
			g: ((rgb >> 8) & 0xFF) as u8,
			b: (rgb & 0xFF) as u8,
		}
	}

	/// Returns the sample packed as `0xRRGGBB`.
	pub const fn to_u32(self) -> u32 {
		((self.r as u32) << 16) | ((self.g as u32) << 8) | (self.b as u32)
	}

	/// Manhattan distance between two samples, `|dr| + |dg| + |db|`.
	pub const fn distance(self, other: Self) -> u32 {
		self.r.abs_diff(other.r) as u32
			+ self.g.abs_diff(other.g) as u32
			+ self.b.abs_diff(other.b) as u32
	}
}

impl fmt::Display for Rgb {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
	}
}

impl From<[u8; 3]> for Rgb {
	fn from(value: [u8; 3]) -> Self {
		Self::new(value[0], value[1], value[2])
	}
}

/// Hardware color index (0-15).
///
/// The wrapped value is always in range; construct through [`HwColor::new`] or
/// the `TryFrom` impls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct HwColor(u8);

impl HwColor {
	/// Number of hardware colors.
	pub const COUNT: usize = 16;

	/// Black
	pub const BLACK: Self = Self(0);
	/// White
	pub const WHITE: Self = Self(1);
	/// Red
	pub const RED: Self = Self(2);
	/// Cyan
	pub const CYAN: Self = Self(3);
	/// Purple
	pub const PURPLE: Self = Self(4);
	/// Green
	pub const GREEN: Self = Self(5);
	/// Blue
	pub const BLUE: Self = Self(6);
	/// Yellow
	pub const YELLOW: Self = Self(7);
	/// Orange
	pub const ORANGE: Self = Self(8);
	/// Brown
	pub const BROWN: Self = Self(9);
	/// Light red
	pub const LIGHT_RED: Self = Self(10);
	/// Dark grey
	pub const DARK_GREY: Self = Self(11);
	/// Grey
	pub const GREY: Self = Self(12);
	/// Light green
	pub const LIGHT_GREEN: Self = Self(13);
	/// Light blue
	pub const LIGHT_BLUE: Self = Self(14);
	/// Light grey
	pub const LIGHT_GREY: Self = Self(15);

	const NAMES: [&'static str; Self::COUNT] = [
		"black",
		"white",
		"red",
		"cyan",
		"purple",
		"green",
		"blue",
		"yellow",
		"orange",
		"brown",
		"lightred",
		"darkgrey",
		"grey",
		"lightgreen",
		"lightblue",
		"lightgrey",
	];

	/// Creates a hardware color, returning `None` for values above 15.
	pub const fn new(index: u8) -> Option<Self> {
		if (index as usize) < Self::COUNT {
			Some(Self(index))
		} else {
			None
		}
	}

	/// Returns the raw index.
	pub const fn index(self) -> u8 {
		self.0
	}

	/// Returns the conventional color name.
	pub const fn name(self) -> &'static str {
		Self::NAMES[self.0 as usize]
	}

	/// Iterates all sixteen hardware colors in index order.
	pub fn all() -> impl Iterator<Item = Self> {
		(0..Self::COUNT as u8).map(Self)
	}
}

impl TryFrom<u8> for HwColor {
	type Error = ValidationError;

	fn try_from(value: u8) -> Result<Self, Self::Error> {
		Self::new(value).ok_or(ValidationError::InvalidColor(i32::from(value)))
	}
}

impl TryFrom<i32> for HwColor {
	type Error = ValidationError;

	fn try_from(value: i32) -> Result<Self, Self::Error> {
		u8::try_from(value)
			.ok()
			.and_then(Self::new)
			.ok_or(ValidationError::InvalidColor(value))
	}
}

impl From<HwColor> for u8 {
	fn from(value: HwColor) -> Self {
		value.0
	}
}

impl FromStr for HwColor {
	type Err = ValidationError;

	/// Parses either a numeric index or a color name such as `lightblue`.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let s = s.trim();
		if let Ok(value) = s.parse::<i32>() {
			return Self::try_from(value);
		}
		let normalized: String =
			s.chars().filter(|c| !matches!(c, ' ' | '_' | '-')).collect::<String>().to_lowercase();
		Self::NAMES
			.iter()
			.position(|name| *name == normalized)
			.map(|i| Self(i as u8))
			.ok_or_else(|| ValidationError::UnknownColorName(s.to_string()))
	}
}

impl fmt::Display for HwColor {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} ({})", self.0, self.name())
	}
}
