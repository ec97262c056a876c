//! Error types for image analysis, encoding and linking.
//!
//! Errors are grouped by the stage that raises them. [`ConvertError`] unifies
//! them for the conversion entry points.

use thiserror::Error;

use crate::{
	color::{HwColor, Rgb},
	mode::GraphicsMode,
};

/// The source image or the requested options cannot be converted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
	/// The canvas size is not supported
	#[error(
		"Invalid dimensions: {width}x{height}, expected 320x200, 384x272 or a multiple of 24x21"
	)]
	InvalidDimensions {
		/// Width of the source image
		width: usize,
		/// Height of the source image
		height: usize,
	},

	/// More distinct colors than the palette or mode allows
	#[error("Too many colors: found {found}, the max is {max}")]
	TooManyColors {
		/// Number of distinct colors found
		found: usize,
		/// Maximum number of colors allowed
		max: usize,
	},

	/// Two source colors map to the same hardware color
	#[error("Ambiguous palette {table}: {first} and {second} both map to color {color}")]
	AmbiguousPalette {
		/// Name of the selected palette table
		table: &'static str,
		/// Hardware color both samples map to
		color: HwColor,
		/// First source sample
		first: Rgb,
		/// Second source sample
		second: Rgb,
	},

	/// Not enough colors to encode anything meaningful
	#[error("Degenerate image: {colors} usable color(s), at least 2 are required")]
	DegenerateImage {
		/// Number of usable colors
		colors: usize,
	},

	/// The forced mode cannot represent the image
	#[error("Cannot use mode {mode}: {reason}")]
	IncompatibleMode {
		/// The requested mode
		mode: GraphicsMode,
		/// Why the mode does not fit
		reason: String,
	},

	/// A color value outside 0-15
	#[error("Invalid color value {0}, expected 0-15")]
	InvalidColor(i32),

	/// A color name that is not one of the sixteen hardware colors
	#[error("Unknown color name: {0:?}")]
	UnknownColorName(String),

	/// A malformed bitpair preference string
	#[error("Invalid bitpair colors {0:?}: {1}")]
	InvalidBitpairColors(String, String),

	/// A mode name that is not recognized
	#[error("Unknown graphics mode: {0:?}")]
	UnknownMode(String),

	/// An animation needs at least two frames
	#[error("Not enough frames: got {count}, an animation needs at least 2")]
	NotEnoughFrames {
		/// Number of frames supplied
		count: usize,
	},

	/// Frames of one animation resolved to different modes
	#[error("Mixed graphics modes: frame {frame} is {found}, expected {expected}")]
	MixedModes {
		/// Index of the offending frame
		frame: usize,
		/// Mode of the first frame
		expected: GraphicsMode,
		/// Mode of the offending frame
		found: GraphicsMode,
	},

	/// A sprite sheet with more columns or rows than a displayer can address
	#[error("Too many sprites: {columns}x{rows} grid, at most {max} columns and rows")]
	TooManySprites {
		/// Sprites per row
		columns: usize,
		/// Sprite rows
		rows: usize,
		/// Largest column or row count
		max: usize,
	},

	/// Interlacing pairs exactly two frames
	#[error("Interlace needs 1 image to split or 2 frames, got {count}")]
	InterlaceFrames {
		/// Number of frames supplied
		count: usize,
	},

	/// The mode has no animation format
	#[error("Animation is not supported for mode {0}")]
	UnsupportedAnimation(GraphicsMode),
}

/// The image does not fit the packing rules of its graphics mode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PackingError {
	/// A block uses more colors than there are bitpairs left for it
	#[error("Too many colors in block {block} at ({x},{y}): {colors} colors, the max is {max}")]
	TooManyColorsInBlock {
		/// Row-major block index
		block: usize,
		/// Pixel x of the block origin
		x: usize,
		/// Pixel y of the block origin
		y: usize,
		/// Number of distinct colors in the block
		colors: usize,
		/// Number of colors the block may use
		max: usize,
	},

	/// A charset needs more unique characters than fit in one set
	#[error("Image translates to {count} unique chars, the max is {max}")]
	TooManyChars {
		/// Number of unique characters
		count: usize,
		/// Maximum character count
		max: usize,
	},

	/// Multicolor characters can only use colors 0-7 for bitpair 11
	#[error("Char color {0} is not supported, multicolor chars need a color below 8")]
	UnsupportedCharColor(HwColor),

	/// Brute force found no candidate mapping that encodes
	#[error("No bitpair candidate could encode the image")]
	NoCandidates,

	/// Two interlaced blocks are full and have no color in common
	#[error("Interlaced block {block} at ({x},{y}) shares no color between both frames")]
	NoSharedColor {
		/// Row-major block index
		block: usize,
		/// Pixel x of the block origin
		x: usize,
		/// Pixel y of the block origin
		y: usize,
	},
}

/// The linker could not place data in the 64KB address space.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MemoryError {
	/// A write touches used or blocked memory
	#[error("Memory overlap at ${address:04x} with {remaining} byte(s) left to write")]
	Overlap {
		/// First conflicting address
		address: usize,
		/// Bytes not yet written, including the conflicting one
		remaining: usize,
	},

	/// A write runs past the end of memory
	#[error("Out of memory: {len} byte(s) at ${address:04x} exceed $ffff")]
	OutOfMemory {
		/// Start address of the write
		address: usize,
		/// Length of the write
		len: usize,
	},

	/// Nothing was written
	#[error("Nothing to output, no memory is in use")]
	Empty,

	/// The used span is empty or inverted
	#[error("Invalid memory span: start ${start:04x} is not below end ${end:04x}")]
	InvertedSpan {
		/// First used address
		start: usize,
		/// One past the last used address
		end: usize,
	},

	/// An address-prefixed blob carries no payload
	#[error("Program blob too short: {len} byte(s), at least 3 are required")]
	BlobTooShort {
		/// Length of the blob
		len: usize,
	},
}

/// Any error raised while converting images.
#[derive(Debug, Error)]
pub enum ConvertError {
	/// Validation error
	#[error(transparent)]
	Validation(#[from] ValidationError),

	/// Packing error
	#[error(transparent)]
	Packing(#[from] PackingError),

	/// Linker error
	#[error(transparent)]
	Memory(#[from] MemoryError),

	/// A collaborator such as the compressor failed
	#[error("{operation} failed: {source}")]
	External {
		/// Name of the failing operation
		operation: &'static str,
		/// Underlying error
		#[source]
		source: Box<dyn std::error::Error + Send + Sync>,
	},

	/// Configuration could not be loaded
	#[error(transparent)]
	Config(#[from] config::ConfigError),
}

impl ConvertError {
	/// Wraps an error raised by an external collaborator.
	pub fn external<E>(operation: &'static str, source: E) -> Self
	where
		E: std::error::Error + Send + Sync + 'static,
	{
		Self::External {
			operation,
			source: Box::new(source),
		}
	}

	/// Returns `true` when a failed charset conversion may retry as a bitmap.
	pub fn allows_bitmap_fallback(&self) -> bool {
		matches!(self, Self::Validation(_) | Self::Packing(_))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_error_messages() {
		let err = MemoryError::Overlap {
			address: 0x2000,
			remaining: 8,
		};
		assert_eq!(err.to_string(), "Memory overlap at $2000 with 8 byte(s) left to write");

		let err = PackingError::TooManyChars {
			count: 257,
			max: 256,
		};
		assert_eq!(err.to_string(), "Image translates to 257 unique chars, the max is 256");
	}

	#[test]
	fn test_fallback_classification() {
		let err: ConvertError = PackingError::NoCandidates.into();
		assert!(err.allows_bitmap_fallback());
		let err: ConvertError = MemoryError::Empty.into();
		assert!(!err.allows_bitmap_fallback());
	}
}
