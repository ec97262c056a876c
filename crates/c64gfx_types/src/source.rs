//! Pixel sources and canvas detection.
//!
//! Decoding image files is left to the caller. Anything that can report its
//! bounds and sample RGB values implements [`PixelSource`]; [`SourceImage`]
//! wraps a source with the canvas window the converter works on.

use std::collections::BTreeSet;

use crate::{color::Rgb, error::ValidationError};

/// Canvas size and block layout constants.
pub mod constants {
	/// Width of a full screen canvas in pixels
	pub const SCREEN_WIDTH: usize = 320;

	/// Height of a full screen canvas in pixels
	pub const SCREEN_HEIGHT: usize = 200;

	/// Width of an emulator screenshot with default borders
	pub const SCREENSHOT_WIDTH: usize = 384;

	/// Height of an emulator screenshot with default borders
	pub const SCREENSHOT_HEIGHT: usize = 272;

	/// Horizontal offset of the screen inside a screenshot
	pub const SCREENSHOT_X_OFFSET: usize = 32;

	/// Vertical offset of the screen inside a screenshot
	pub const SCREENSHOT_Y_OFFSET: usize = 35;

	/// Distance up and left of the canvas origin where the border is sampled
	pub const BORDER_SAMPLE_DISTANCE: usize = 10;

	/// Block edge length in pixels
	pub const BLOCK_SIZE: usize = 8;

	/// Blocks per row on a full screen
	pub const BLOCKS_X: usize = SCREEN_WIDTH / BLOCK_SIZE;

	/// Block rows on a full screen
	pub const BLOCKS_Y: usize = SCREEN_HEIGHT / BLOCK_SIZE;

	/// Blocks on a full screen
	pub const BLOCK_COUNT: usize = BLOCKS_X * BLOCKS_Y;

	/// Sprite width in pixels
	pub const SPRITE_WIDTH: usize = 24;

	/// Sprite height in pixels
	pub const SPRITE_HEIGHT: usize = 21;

	/// Most sprite columns or rows, the displayer reads each as one byte
	pub const MAX_SPRITE_GRID: usize = u8::MAX as usize;
}

use constants::*;

/// Random access to RGB samples.
pub trait PixelSource {
	/// Width in pixels.
	fn width(&self) -> usize;

	/// Height in pixels.
	fn height(&self) -> usize;

	/// Samples the pixel at `(x, y)`. Callers stay within bounds.
	fn pixel(&self, x: usize, y: usize) -> Rgb;
}

impl<T: PixelSource + ?Sized> PixelSource for &T {
	fn width(&self) -> usize {
		(**self).width()
	}

	fn height(&self) -> usize {
		(**self).height()
	}

	fn pixel(&self, x: usize, y: usize) -> Rgb {
		(**self).pixel(x, y)
	}
}

/// Packed RGB8 pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbImage {
	width: usize,
	height: usize,
	data: Vec<u8>,
}

impl RgbImage {
	/// Creates an image filled with one color.
	pub fn new(width: usize, height: usize, fill: Rgb) -> Self {
		let data = [fill.r, fill.g, fill.b].repeat(width * height);
		Self {
			width,
			height,
			data,
		}
	}

	/// Wraps a packed RGB8 buffer.
	///
	/// Returns `None` if the buffer length does not match the dimensions.
	pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
		(data.len() == width * height * 3).then_some(Self {
			width,
			height,
			data,
		})
	}

	/// Builds an image by evaluating `f` for every pixel.
	pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> Rgb) -> Self {
		let mut data = Vec::with_capacity(width * height * 3);
		for y in 0..height {
			for x in 0..width {
				let rgb = f(x, y);
				data.extend_from_slice(&[rgb.r, rgb.g, rgb.b]);
			}
		}
		Self {
			width,
			height,
			data,
		}
	}

	/// Sets a single pixel.
	///
	/// # Panics
	///
	/// Panics if the coordinate is out of bounds.
	pub fn put_pixel(&mut self, x: usize, y: usize, rgb: Rgb) {
		assert!(x < self.width && y < self.height, "pixel ({x},{y}) out of bounds");
		let offset = (y * self.width + x) * 3;
		self.data[offset..offset + 3].copy_from_slice(&[rgb.r, rgb.g, rgb.b]);
	}

	/// Returns the raw buffer.
	pub fn as_bytes(&self) -> &[u8] {
		&self.data
	}
}

impl PixelSource for RgbImage {
	fn width(&self) -> usize {
		self.width
	}

	fn height(&self) -> usize {
		self.height
	}

	fn pixel(&self, x: usize, y: usize) -> Rgb {
		let offset = (y * self.width + x) * 3;
		Rgb::new(self.data[offset], self.data[offset + 1], self.data[offset + 2])
	}
}

#[cfg(feature = "image")]
impl PixelSource for image::RgbImage {
	fn width(&self) -> usize {
		image::RgbImage::width(self) as usize
	}

	fn height(&self) -> usize {
		image::RgbImage::height(self) as usize
	}

	fn pixel(&self, x: usize, y: usize) -> Rgb {
		Rgb::from(self.get_pixel(x as u32, y as u32).0)
	}
}

#[cfg(feature = "image")]
impl PixelSource for image::RgbaImage {
	fn width(&self) -> usize {
		image::RgbaImage::width(self) as usize
	}

	fn height(&self) -> usize {
		image::RgbaImage::height(self) as usize
	}

	fn pixel(&self, x: usize, y: usize) -> Rgb {
		let [r, g, b, _] = self.get_pixel(x as u32, y as u32).0;
		Rgb::new(r, g, b)
	}
}

/// The kind of canvas a source was recognized as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanvasKind {
	/// Exactly one screen, no margin
	Screen,
	/// Emulator screenshot, the screen is cropped out of the border
	Screenshot,
	/// Sheet of sprites
	Sprites {
		/// Sprites per row
		columns: usize,
		/// Sprite rows
		rows: usize,
	},
}

/// The window of a source the converter encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
	/// Kind of canvas
	pub kind: CanvasKind,
	/// Horizontal offset into the source
	pub x_offset: usize,
	/// Vertical offset into the source
	pub y_offset: usize,
	/// Canvas width
	pub width: usize,
	/// Canvas height
	pub height: usize,
}

impl Canvas {
	/// Recognizes the canvas from the source dimensions.
	pub fn detect(width: usize, height: usize) -> Result<Self, ValidationError> {
		let (kind, x_offset, y_offset) = match (width, height) {
			(SCREEN_WIDTH, SCREEN_HEIGHT) => (CanvasKind::Screen, 0, 0),
			(SCREENSHOT_WIDTH, SCREENSHOT_HEIGHT) => {
				(CanvasKind::Screenshot, SCREENSHOT_X_OFFSET, SCREENSHOT_Y_OFFSET)
			}
			(w, h) if w > 0 && h > 0 && w % SPRITE_WIDTH == 0 && h % SPRITE_HEIGHT == 0 => (
				CanvasKind::Sprites {
					columns: w / SPRITE_WIDTH,
					rows: h / SPRITE_HEIGHT,
				},
				0,
				0,
			),
			_ => {
				return Err(ValidationError::InvalidDimensions {
					width,
					height,
				});
			}
		};
		if let CanvasKind::Sprites {
			columns,
			rows,
		} = kind
			&& (columns > MAX_SPRITE_GRID || rows > MAX_SPRITE_GRID)
		{
			return Err(ValidationError::TooManySprites {
				columns,
				rows,
				max: MAX_SPRITE_GRID,
			});
		}
		let (width, height) = match kind {
			CanvasKind::Sprites {
				..
			} => (width, height),
			_ => (SCREEN_WIDTH, SCREEN_HEIGHT),
		};
		Ok(Self {
			kind,
			x_offset,
			y_offset,
			width,
			height,
		})
	}

	/// Returns `true` for sprite sheets.
	pub fn is_sprites(&self) -> bool {
		matches!(self.kind, CanvasKind::Sprites { .. })
	}
}

/// A pixel source paired with its detected canvas.
#[derive(Debug, Clone)]
pub struct SourceImage<S> {
	source: S,
	canvas: Canvas,
}

impl<S: PixelSource> SourceImage<S> {
	/// Validates the source dimensions and detects the canvas.
	pub fn new(source: S) -> Result<Self, ValidationError> {
		let canvas = Canvas::detect(source.width(), source.height())?;
		Ok(Self {
			source,
			canvas,
		})
	}

	/// The detected canvas.
	pub fn canvas(&self) -> &Canvas {
		&self.canvas
	}

	/// Samples a canvas-relative pixel.
	pub fn pixel(&self, x: usize, y: usize) -> Rgb {
		self.source.pixel(x + self.canvas.x_offset, y + self.canvas.y_offset)
	}

	/// Samples the border color from the margin up-left of the canvas.
	///
	/// Returns `None` when the source has no margin.
	pub fn border_sample(&self) -> Option<Rgb> {
		let x = self.canvas.x_offset.checked_sub(BORDER_SAMPLE_DISTANCE)?;
		let y = self.canvas.y_offset.checked_sub(BORDER_SAMPLE_DISTANCE)?;
		Some(self.source.pixel(x, y))
	}

	/// Distinct colors of the whole source, margin included, in RGB order.
	pub fn distinct_colors(&self) -> Vec<Rgb> {
		let mut colors = BTreeSet::new();
		for y in 0..self.source.height() {
			for x in 0..self.source.width() {
				colors.insert(self.source.pixel(x, y));
			}
		}
		colors.into_iter().collect()
	}
}
