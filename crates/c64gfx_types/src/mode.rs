//! Target graphics modes.

use std::{fmt, str::FromStr};

use serde::Deserialize;

use crate::error::ValidationError;

/// One of the six output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum GraphicsMode {
	/// 320x200 bitmap, two colors per 8x8 block (hires)
	SingleColorBitmap,
	/// 160x200 bitmap, four colors per block with a shared background (koala)
	MultiColorBitmap,
	/// Up to 256 two-color characters
	SingleColorCharset,
	/// Up to 256 multicolor characters
	MultiColorCharset,
	/// Two-color 24x21 sprites
	SingleColorSprites,
	/// Multicolor 12x21 sprites
	MultiColorSprites,
}

impl GraphicsMode {
	/// All modes, in the order used for display.
	pub const ALL: [Self; 6] = [
		Self::SingleColorBitmap,
		Self::MultiColorBitmap,
		Self::SingleColorCharset,
		Self::MultiColorCharset,
		Self::SingleColorSprites,
		Self::MultiColorSprites,
	];

	/// Short name used on the command line and in configuration files.
	pub const fn name(self) -> &'static str {
		match self {
			Self::SingleColorBitmap => "hires",
			Self::MultiColorBitmap => "koala",
			Self::SingleColorCharset => "sccharset",
			Self::MultiColorCharset => "mccharset",
			Self::SingleColorSprites => "scsprites",
			Self::MultiColorSprites => "mcsprites",
		}
	}

	/// Number of bitpair slots, 2 for single-color modes and 4 otherwise.
	pub const fn max_colors(self) -> usize {
		if self.is_multicolor() {
			4
		} else {
			2
		}
	}

	/// Returns `true` for the modes that pack two bits per pixel.
	pub const fn is_multicolor(self) -> bool {
		matches!(self, Self::MultiColorBitmap | Self::MultiColorCharset | Self::MultiColorSprites)
	}

	/// Returns `true` for the sprite modes.
	pub const fn is_sprites(self) -> bool {
		matches!(self, Self::SingleColorSprites | Self::MultiColorSprites)
	}

	/// Returns `true` for the charset modes.
	pub const fn is_charset(self) -> bool {
		matches!(self, Self::SingleColorCharset | Self::MultiColorCharset)
	}

	/// Returns `true` when bitpair 0 is a global background color.
	///
	/// Only the hires bitmap picks both of its colors per block.
	pub const fn has_global_background(self) -> bool {
		!matches!(self, Self::SingleColorBitmap)
	}

	/// Bitmap mode a charset conversion falls back to.
	pub const fn bitmap_fallback(self) -> Option<Self> {
		match self {
			Self::SingleColorCharset => Some(Self::SingleColorBitmap),
			Self::MultiColorCharset => Some(Self::MultiColorBitmap),
			_ => None,
		}
	}
}

impl fmt::Display for GraphicsMode {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.name())
	}
}

impl FromStr for GraphicsMode {
	type Err = ValidationError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let lower = s.trim().to_ascii_lowercase();
		let mode = match lower.as_str() {
			"hires" | "singlecolorbitmap" | "scbitmap" => Self::SingleColorBitmap,
			"koala" | "multicolorbitmap" | "mcbitmap" => Self::MultiColorBitmap,
			"sccharset" | "singlecolorcharset" => Self::SingleColorCharset,
			"mccharset" | "multicolorcharset" => Self::MultiColorCharset,
			"scsprites" | "singlecolorsprites" => Self::SingleColorSprites,
			"mcsprites" | "multicolorsprites" => Self::MultiColorSprites,
			_ => return Err(ValidationError::UnknownMode(s.to_string())),
		};
		Ok(mode)
	}
}

impl TryFrom<String> for GraphicsMode {
	type Error = ValidationError;

	fn try_from(value: String) -> Result<Self, Self::Error> {
		value.parse()
	}
}
