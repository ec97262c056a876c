//! Image analysis: palette mapping, per-block color maps and mode detection.
//!
//! [`ModeAnalyzer::analyze`] turns a [`SourceImage`] into an [`AnalyzedImage`]:
//! a plane of hardware colors plus everything the bitpair assignment and the
//! encoders need to know about it.

use log::{debug, info, warn};

use crate::{
	color::HwColor,
	error::{ConvertError, PackingError, ValidationError},
	mode::GraphicsMode,
	options::Options,
	palette::{PaletteMatch, PaletteMatcher},
	source::{Canvas, PixelSource, SourceImage, constants::BLOCK_SIZE},
};

/// Distinct-color usage counts of one 8x8 block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockColorMap {
	counts: [u16; HwColor::COUNT],
}

impl BlockColorMap {
	fn add(&mut self, color: HwColor) {
		self.counts[color.index() as usize] += 1;
	}

	/// Number of pixels of `color` in the block.
	pub fn count(&self, color: HwColor) -> u16 {
		self.counts[color.index() as usize]
	}

	/// Returns `true` if the block uses `color`.
	pub fn contains(&self, color: HwColor) -> bool {
		self.count(color) > 0
	}

	/// Number of distinct colors in the block.
	pub fn len(&self) -> usize {
		self.counts.iter().filter(|&&n| n > 0).count()
	}

	/// Returns `true` for a block without pixels.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Distinct colors in ascending index order.
	pub fn colors(&self) -> impl Iterator<Item = HwColor> + '_ {
		HwColor::all().filter(|color| self.contains(*color))
	}
}

/// A source image reduced to hardware colors, with its detected mode.
#[derive(Debug, Clone)]
pub struct AnalyzedImage {
	canvas: Canvas,
	pixels: Vec<HwColor>,
	blocks: Vec<BlockColorMap>,
	color_counts: [usize; HwColor::COUNT],
	palette: PaletteMatch,
	background_candidates: Vec<HwColor>,
	mode: GraphicsMode,
	background: HwColor,
	border: HwColor,
	forced_mode: bool,
}

impl AnalyzedImage {
	/// The canvas the image was cropped to.
	pub fn canvas(&self) -> &Canvas {
		&self.canvas
	}

	/// Canvas width in pixels.
	pub fn width(&self) -> usize {
		self.canvas.width
	}

	/// Canvas height in pixels.
	pub fn height(&self) -> usize {
		self.canvas.height
	}

	/// Hardware color of a canvas pixel.
	pub fn pixel(&self, x: usize, y: usize) -> HwColor {
		self.pixels[y * self.canvas.width + x]
	}

	/// Per-block color maps in row-major order. Empty for sprite sheets.
	pub fn blocks(&self) -> &[BlockColorMap] {
		&self.blocks
	}

	/// Blocks per row.
	pub fn blocks_per_row(&self) -> usize {
		self.canvas.width / BLOCK_SIZE
	}

	/// Pixel origin of a block.
	pub fn block_origin(&self, index: usize) -> (usize, usize) {
		let per_row = self.blocks_per_row();
		((index % per_row) * BLOCK_SIZE, (index / per_row) * BLOCK_SIZE)
	}

	/// The palette match the image was mapped with.
	pub fn palette(&self) -> &PaletteMatch {
		&self.palette
	}

	/// Total pixel count of a color on the canvas.
	pub fn color_count(&self, color: HwColor) -> usize {
		self.color_counts[color.index() as usize]
	}

	/// Distinct canvas colors in ascending index order.
	pub fn colors(&self) -> Vec<HwColor> {
		HwColor::all().filter(|c| self.color_count(*c) > 0).collect()
	}

	/// Distinct canvas colors, most used first, ties by lower index.
	pub fn colors_by_frequency(&self) -> Vec<HwColor> {
		let mut colors = self.colors();
		colors.sort_by(|a, b| self.color_count(*b).cmp(&self.color_count(*a)).then(a.cmp(b)));
		colors
	}

	/// Colors usable as the global background.
	///
	/// These are the colors present in every four-color block, or every canvas
	/// color when there is no such block.
	pub fn background_candidates(&self) -> &[HwColor] {
		&self.background_candidates
	}

	/// Returns `true` if `color` can be the global background.
	pub fn is_background_candidate(&self, color: HwColor) -> bool {
		self.background_candidates.contains(&color)
	}

	/// The resolved graphics mode.
	pub fn mode(&self) -> GraphicsMode {
		self.mode
	}

	/// Returns `true` if the mode was requested by the caller.
	pub fn is_mode_forced(&self) -> bool {
		self.forced_mode
	}

	/// The resolved global background color.
	pub fn background(&self) -> HwColor {
		self.background
	}

	/// The resolved border color.
	pub fn border(&self) -> HwColor {
		self.border
	}

	/// Returns a copy of the image retargeted to another mode.
	pub fn with_mode(&self, mode: GraphicsMode) -> Self {
		Self {
			mode,
			..self.clone()
		}
	}

	/// Overrides the background, keeping it even when it is not a candidate.
	///
	/// Used to keep the frames of an animation on one background.
	pub fn set_background(&mut self, background: HwColor) {
		if !self.is_background_candidate(background) {
			warn!(
				"background {} is not used in every full block, some blocks may fail to encode",
				background
			);
		}
		self.background = background;
	}
}

/// Derives block maps, the graphics mode, the background and the border.
pub struct ModeAnalyzer;

impl ModeAnalyzer {
	/// Most distinct colors any block mode allows per block.
	pub const MAX_BLOCK_COLORS: usize = 4;

	/// Analyzes a source image.
	///
	/// # Arguments
	///
	/// * `source` - The validated source image
	/// * `options` - Mode override, bitpair preference and border override
	///
	/// # Returns
	///
	/// The analyzed image, or the validation/packing error that makes it
	/// unconvertible.
	pub fn analyze<S: PixelSource>(
		source: &SourceImage<S>,
		options: &Options,
	) -> Result<AnalyzedImage, ConvertError> {
		let canvas = *source.canvas();
		let palette = PaletteMatcher::match_colors(&source.distinct_colors())?;

		let mut pixels = Vec::with_capacity(canvas.width * canvas.height);
		let mut color_counts = [0usize; HwColor::COUNT];
		for y in 0..canvas.height {
			for x in 0..canvas.width {
				let color = palette.get(source.pixel(x, y)).unwrap_or_default();
				color_counts[color.index() as usize] += 1;
				pixels.push(color);
			}
		}

		let blocks = if canvas.is_sprites() {
			Vec::new()
		} else {
			Self::block_maps(&canvas, &pixels)?
		};

		let total = color_counts.iter().filter(|&&n| n > 0).count();
		if total < 2 {
			return Err(ValidationError::DegenerateImage {
				colors: total,
			}
			.into());
		}

		let detected = Self::classify(&canvas, &blocks, total)?;
		let (mode, forced_mode) = match options.mode {
			Some(forced) => {
				Self::check_override(forced, &canvas, total)?;
				if forced != detected {
					info!("mode {} forced, detected {}", forced, detected);
				}
				(forced, true)
			}
			None => (detected, false),
		};
		info!("graphics mode: {}", mode);

		let border = match options.border_color {
			Some(color) => color,
			None => match source.border_sample().and_then(|rgb| palette.get(rgb)) {
				Some(color) => {
					debug!("border color detected: {}", color);
					color
				}
				None => {
					info!("border color not detected, using black");
					HwColor::BLACK
				}
			},
		};

		let background_candidates = Self::background_candidates(&blocks, &color_counts);
		let preferred = options.bitpair_colors.as_ref().and_then(|p| p.slot(0));

		let mut image = AnalyzedImage {
			canvas,
			pixels,
			blocks,
			color_counts,
			palette,
			background_candidates,
			mode,
			background: HwColor::BLACK,
			border,
			forced_mode,
		};
		image.background = Self::resolve_background(&image, preferred);
		debug!("background candidates: {:?}", image.background_candidates);
		Ok(image)
	}

	fn block_maps(canvas: &Canvas, pixels: &[HwColor]) -> Result<Vec<BlockColorMap>, PackingError> {
		let per_row = canvas.width / BLOCK_SIZE;
		let count = per_row * (canvas.height / BLOCK_SIZE);
		let mut blocks = Vec::with_capacity(count);
		for index in 0..count {
			let (bx, by) = ((index % per_row) * BLOCK_SIZE, (index / per_row) * BLOCK_SIZE);
			let mut map = BlockColorMap::default();
			for y in by..by + BLOCK_SIZE {
				for x in bx..bx + BLOCK_SIZE {
					map.add(pixels[y * canvas.width + x]);
				}
			}
			if map.len() > Self::MAX_BLOCK_COLORS {
				return Err(PackingError::TooManyColorsInBlock {
					block: index,
					x: bx,
					y: by,
					colors: map.len(),
					max: Self::MAX_BLOCK_COLORS,
				});
			}
			blocks.push(map);
		}
		Ok(blocks)
	}

	fn classify(
		canvas: &Canvas,
		blocks: &[BlockColorMap],
		total: usize,
	) -> Result<GraphicsMode, ValidationError> {
		if canvas.is_sprites() {
			return match total {
				0..=2 => Ok(GraphicsMode::SingleColorSprites),
				3..=4 => Ok(GraphicsMode::MultiColorSprites),
				found => Err(ValidationError::TooManyColors {
					found,
					max: 4,
				}),
			};
		}

		let per_block_max = blocks.iter().map(BlockColorMap::len).max().unwrap_or(0);
		debug!("total colors {}, max colors per block {}", total, per_block_max);
		if per_block_max < 2 {
			// every block is a single solid color, nothing to draw inside them
			return Err(ValidationError::DegenerateImage {
				colors: per_block_max,
			});
		}
		let mode = if total == 2 {
			GraphicsMode::SingleColorCharset
		} else if per_block_max == 2 {
			GraphicsMode::SingleColorBitmap
		} else if total <= 4 {
			GraphicsMode::MultiColorCharset
		} else {
			GraphicsMode::MultiColorBitmap
		};
		Ok(mode)
	}

	fn check_override(
		mode: GraphicsMode,
		canvas: &Canvas,
		total: usize,
	) -> Result<(), ValidationError> {
		let reason = if mode.is_sprites() && !canvas.is_sprites() {
			Some("sprites need a canvas of whole 24x21 cells".to_string())
		} else if !mode.is_sprites() && canvas.is_sprites() {
			Some("needs a 320x200 canvas".to_string())
		} else if (mode.is_sprites() || mode.is_charset()) && total > mode.max_colors() {
			Some(format!("image has {} colors, the max is {}", total, mode.max_colors()))
		} else {
			None
		};
		match reason {
			Some(reason) => Err(ValidationError::IncompatibleMode {
				mode,
				reason,
			}),
			None => Ok(()),
		}
	}

	fn background_candidates(
		blocks: &[BlockColorMap],
		color_counts: &[usize; HwColor::COUNT],
	) -> Vec<HwColor> {
		let mut full = blocks.iter().filter(|b| b.len() == Self::MAX_BLOCK_COLORS).peekable();
		if full.peek().is_none() {
			return HwColor::all().filter(|c| color_counts[c.index() as usize] > 0).collect();
		}
		let mut candidates: Vec<HwColor> = HwColor::all().collect();
		for block in full {
			candidates.retain(|c| block.contains(*c));
		}
		candidates
	}

	fn resolve_background(image: &AnalyzedImage, preferred: Option<HwColor>) -> HwColor {
		if let Some(color) = preferred {
			if image.is_background_candidate(color) {
				return color;
			}
			warn!("preferred background {} is not used in every full block", color);
		}
		let by_frequency = image.colors_by_frequency();
		if let Some(color) =
			by_frequency.iter().find(|c| image.is_background_candidate(**c)).copied()
		{
			return color;
		}
		let fallback = by_frequency.first().copied().unwrap_or_default();
		warn!("no color is shared by every full block, settling for background {}", fallback);
		fallback
	}
}
