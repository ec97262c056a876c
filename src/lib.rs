#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! `c64gfx-rs` converts raster images that already respect the Commodore 64's
//! constraints into programs the machine loads directly.
//!
//! Supported targets are hires and koala bitmaps, single and multicolor
//! charsets, single and multicolor sprites, and delta-encoded animations of
//! bitmaps and sprites.
//!
//! # Examples
//!
//! ```
//! use c64gfx_rs::prelude::*;
//!
//! let image = RgbImage::from_fn(24, 21, |x, _| {
//! 	PALETTES[0].rgb(if x < 12 { HwColor::BLACK } else { HwColor::YELLOW })
//! });
//! let conversion = Converter::new(Options::default()).convert(&image).unwrap();
//! assert_eq!(conversion.mode, GraphicsMode::SingleColorSprites);
//! assert_eq!(conversion.bytes.len(), 2 + 64);
//! ```
pub use c64gfx_internal::*;
