//! This crate provides the core types and algorithms of the `c64gfx-rs` project.
//!
//! Images go through a fixed pipeline:
//!
//! - **Palette matching**: source RGB colors are mapped to the sixteen hardware
//!   colors using the closest of several reference palettes
//! - **Mode analysis**: the canvas is split into 8x8 blocks and the graphics
//!   mode, background and border are derived
//! - **Bitpair assignment**: every color gets a 2-bit code, by heuristic, by
//!   caller preference or by a brute-force search scored by compressed size
//! - **Encoding**: hires and koala bitmaps, single and multicolor charsets,
//!   single and multicolor sprites
//! - **Animation**: frame-to-frame deltas of changed blocks
//! - **Interlace**: two koala frames sharing one color RAM
//! - **Linking**: all blobs are placed in a simulated 64KB address space and
//!   emitted as one program
//!
//! # Examples
//!
//! Using the prelude (recommended):
//!
//! ```no_run
//! use c64gfx_types::prelude::*;
//!
//! let image = RgbImage::new(320, 200, Rgb::new(0, 0, 0));
//! let options = Options::with_mode(GraphicsMode::MultiColorBitmap);
//! let conversion = Converter::new(options).convert(&image);
//! ```
//!
//! Or use explicit paths:
//!
//! ```no_run
//! use c64gfx_types::{convert::convert, options::Options, source::RgbImage};
//!
//! # let image = RgbImage::from_raw(320, 200, vec![0; 320 * 200 * 3]).unwrap();
//! let bytes = convert(&image, &Options::default());
//! ```

pub mod analyze;
pub mod animation;
pub mod bitpair;
pub mod bruteforce;
pub mod color;
pub mod compress;
pub mod convert;
pub mod encode;
pub mod error;
pub mod interlace;
pub mod linker;
pub mod mode;
pub mod music;
pub mod options;
pub mod palette;
pub mod source;

/// `use c64gfx_types::prelude::*;` to import commonly used items.
pub mod prelude;
