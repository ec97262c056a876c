//! Conversion options.
//!
//! [`Options`] is plain data with sensible defaults. It can be built in code or
//! loaded from a TOML file through the `config` crate.
//!
//! # Examples
//!
//! ```
//! use c64gfx_types::options::Options;
//! use c64gfx_types::mode::GraphicsMode;
//!
//! let options = Options::from_toml_str(
//! 	r#"
//! 	mode = "koala"
//! 	bitpair_colors = "0,-1,-1,3"
//! 	border_color = "lightblue"
//! 	"#,
//! )
//! .unwrap();
//! assert_eq!(options.mode, Some(GraphicsMode::MultiColorBitmap));
//! assert!(!options.brute_force);
//! ```

use std::path::Path;

use config::{Config, File, FileFormat};
use serde::{Deserialize, Deserializer};

use crate::{
	bitpair::BitpairPreference,
	color::HwColor,
	error::{ConvertError, ValidationError},
	mode::GraphicsMode,
};

/// Default delay between animation frames, in frames.
pub const DEFAULT_FRAME_DELAY: u8 = 6;

/// Default pause before an animation starts, in seconds.
pub const DEFAULT_WAIT_SECONDS: u8 = 0;

/// Default horizontal shift of the second interlaced frame, in pixels.
pub const DEFAULT_D016_OFFSET: u8 = 1;

/// Options controlling a conversion run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Options {
	/// Forced graphics mode, detected when `None`
	pub mode: Option<GraphicsMode>,

	/// Preferred bitpair colors
	pub bitpair_colors: Option<BitpairPreference>,

	/// Fill unspecified bitpair slots by color frequency
	pub guess_bitpair_colors: bool,

	/// Search all bitpair permutations for the smallest compressed output
	pub brute_force: bool,

	/// Worker threads used by the brute-force search
	pub num_workers: usize,

	/// Forced border color, sampled from the margin when `None`
	#[serde(deserialize_with = "deserialize_color")]
	pub border_color: Option<HwColor>,

	/// Compress the final program
	pub crunch: bool,

	/// Skip the displayer's fade in and out
	pub no_fade: bool,

	/// Show the picture once instead of looping
	pub no_loop: bool,

	/// Frames to wait between animation frames
	pub frame_delay: u8,

	/// Seconds to wait before an animation starts
	pub wait_seconds: u8,

	/// Treat two frames as one interlaced picture instead of an animation
	pub interlace: bool,

	/// Horizontal scroll of the second interlaced frame
	pub d016_offset: u8,
}

impl Default for Options {
	fn default() -> Self {
		Self {
			mode: None,
			bitpair_colors: None,
			guess_bitpair_colors: true,
			brute_force: false,
			num_workers: default_workers(),
			border_color: None,
			crunch: false,
			no_fade: false,
			no_loop: false,
			frame_delay: DEFAULT_FRAME_DELAY,
			wait_seconds: DEFAULT_WAIT_SECONDS,
			interlace: false,
			d016_offset: DEFAULT_D016_OFFSET,
		}
	}
}

impl Options {
	/// Default options with a forced mode.
	pub fn with_mode(mode: GraphicsMode) -> Self {
		Self {
			mode: Some(mode),
			..Self::default()
		}
	}

	/// Options that brute-force the bitpair colors and crunch the output.
	pub fn smallest() -> Self {
		Self {
			brute_force: true,
			crunch: true,
			..Self::default()
		}
	}

	/// Parses options from TOML text.
	pub fn from_toml_str(text: &str) -> Result<Self, ConvertError> {
		let options = Config::builder()
			.add_source(File::from_str(text, FileFormat::Toml))
			.build()?
			.try_deserialize::<Self>()?;
		Ok(options.normalized())
	}

	/// Loads options from a TOML file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConvertError> {
		let options = Config::builder()
			.add_source(File::from(path.as_ref()).format(FileFormat::Toml))
			.build()?
			.try_deserialize::<Self>()?;
		Ok(options.normalized())
	}

	/// Worker count, at least one.
	pub fn workers(&self) -> usize {
		self.num_workers.max(1)
	}

	fn normalized(mut self) -> Self {
		if self.num_workers == 0 {
			self.num_workers = default_workers();
		}
		self
	}
}

fn default_workers() -> usize {
	std::thread::available_parallelism().map(usize::from).unwrap_or(1)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ColorValue {
	Index(i64),
	Name(String),
}

fn deserialize_color<'de, D>(deserializer: D) -> Result<Option<HwColor>, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<ColorValue>::deserialize(deserializer)?;
	let color = match value {
		None => return Ok(None),
		Some(ColorValue::Index(i)) => i32::try_from(i)
			.map_err(|_| ValidationError::InvalidColor(-1))
			.and_then(HwColor::try_from),
		Some(ColorValue::Name(name)) => name.parse(),
	};
	color.map(Some).map_err(serde::de::Error::custom)
}
