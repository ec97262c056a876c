//! Prelude module for `c64gfx_types`.
//!
//! This module provides a convenient way to import commonly used types, traits, and constants.
//!
//! # Examples
//!
//! ```no_run
//! use c64gfx_types::prelude::*;
//!
//! let image = RgbImage::new(384, 272, PALETTES[0].rgb(HwColor::LIGHT_BLUE));
//! let mapping = brute_force(&image, &Options::default(), Uncompressed);
//! ```

// Colors and palettes
#[doc(inline)]
pub use crate::color::{HwColor, Rgb};
#[doc(inline)]
pub use crate::palette::{PALETTES, PaletteMatch, PaletteMatcher, PaletteTable};

// Sources and analysis
#[doc(inline)]
pub use crate::analyze::{AnalyzedImage, BlockColorMap, ModeAnalyzer};
#[doc(inline)]
pub use crate::mode::GraphicsMode;
#[doc(inline)]
pub use crate::source::{Canvas, CanvasKind, PixelSource, RgbImage, SourceImage};

// Bitpairs
#[doc(inline)]
pub use crate::bitpair::{BitpairAssigner, BitpairMapping, BitpairPreference, BlockAssignment};
#[doc(inline)]
pub use crate::bruteforce::{BruteForce, Score};

// Encoders
#[doc(inline)]
pub use crate::animation::{AnimationEncoder, Chunk};
#[doc(inline)]
pub use crate::encode::{
	EncodedImage, Hires, Koala, MultiColorCharset, MultiColorSprites, SingleColorCharset,
	SingleColorSprites, Symbol, write_symbols,
};
#[doc(inline)]
pub use crate::interlace::{InterlacedKoala, PairingStats};

// Linking and collaborators
#[doc(inline)]
pub use crate::compress::{Compressor, Uncompressed};
#[doc(inline)]
pub use crate::linker::{Linker, MemoryState};
#[doc(inline)]
pub use crate::music::{Displayer, Music};

// Conversion
#[doc(inline)]
pub use crate::convert::{
	Conversion, Converter, brute_force, convert, convert_animation, convert_interlace,
};
#[doc(inline)]
pub use crate::error::{ConvertError, MemoryError, PackingError, ValidationError};
#[doc(inline)]
pub use crate::options::Options;
