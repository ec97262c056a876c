//! Displayer and music splicing.
//!
//! A [`Displayer`] is a caller-supplied viewer program that is linked in front
//! of the picture so the output runs on its own. Its settings block starts at
//! `$081a`; the converter patches the fade and loop flags, the animation
//! timing and, when [`Music`] is included, the tune's vectors into it.
//!
//! # Settings block
//!
//! | Address | Content |
//! |---------|---------|
//! | `$081a` | start song, bit 7 set for NTSC tunes |
//! | `$081c` | init vector |
//! | `$081f` | play vector |
//! | `$0820` | animation frame delay |
//! | `$0821` | animation wait seconds |
//! | `$0823` | fade and loop flags of bitmap displayers |
//! | `$0824` | fade and loop flags of charset displayers |

use log::{debug, info};

use crate::{
	error::MemoryError,
	linker::Linker,
	mode::GraphicsMode,
	options::Options,
};

/// Addresses inside the displayer.
pub mod constants {
	/// Start of the settings block
	pub const SETTINGS_ADDRESS: u16 = 0x081a;

	/// Start song and video standard
	pub const START_SONG_ADDRESS: u16 = SETTINGS_ADDRESS;

	/// Init vector of the tune
	pub const INIT_ADDRESS: u16 = SETTINGS_ADDRESS + 2;

	/// Play vector of the tune
	pub const PLAY_ADDRESS: u16 = SETTINGS_ADDRESS + 5;

	/// Frames between animation frames
	pub const FRAME_DELAY_ADDRESS: u16 = 0x0820;

	/// Seconds before the animation starts
	pub const WAIT_SECONDS_ADDRESS: u16 = 0x0821;

	/// No-fade and no-loop flags of bitmap displayers
	pub const BITMAP_FLAGS_ADDRESS: u16 = SETTINGS_ADDRESS + 9;

	/// No-fade and no-loop flags of charset displayers
	pub const CHARSET_FLAGS_ADDRESS: u16 = SETTINGS_ADDRESS + 10;

	/// Set in the start song byte for NTSC tunes
	pub const NTSC_FLAG: u8 = 0x80;

	/// Fade code of the koala displayer
	pub const KOALA_FADE: (u16, u16) = (0x4800, 0x8e50);

	/// Fade code of the hires displayer
	pub const HIRES_FADE: (u16, u16) = (0x4800, 0x6b29);

	/// Fade code of the charset displayers
	pub const CHARSET_FADE: (u16, u16) = (0xac00, 0xcf28);

	/// Fade code of the koala animation displayer
	pub const KOALA_ANIMATION_FADE: (u16, u16) = (0x8900, 0xd000);

	/// Fade code of the hires animation displayer
	pub const HIRES_ANIMATION_FADE: (u16, u16) = (0xac00, 0xd000);
}

use constants::*;

/// A tune to play while the picture is shown.
///
/// Loading and parsing music files is up to the caller, only the values the
/// displayer needs are kept here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Music {
	/// Where the tune is loaded
	pub load_address: u16,
	/// Init routine
	pub init: u16,
	/// Play routine, called once per frame
	pub play: u16,
	/// Song to start, counting from 1
	pub start_song: u8,
	/// The tune expects NTSC timing
	pub ntsc: bool,
	/// Tune bytes without load address
	pub data: Vec<u8>,
}

impl Music {
	/// Creates a tune with the usual vectors: init at the load address and
	/// play three bytes after it.
	pub fn new(load_address: u16, data: Vec<u8>) -> Self {
		Self {
			load_address,
			init: load_address,
			play: load_address.wrapping_add(3),
			start_song: 1,
			ntsc: false,
			data,
		}
	}

	/// Start song byte as the displayer expects it.
	///
	/// Songs count from 0 in the displayer, bit 7 flags NTSC.
	pub fn start_song_byte(&self) -> u8 {
		let song = self.start_song.saturating_sub(1) & 0x7f;
		if self.ntsc { song | NTSC_FLAG } else { song }
	}

	/// Writes the tune and patches its vectors into the displayer settings.
	pub fn link(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		linker.write_at(self.load_address, &self.data)?;
		linker.set_byte(START_SONG_ADDRESS, &[self.start_song_byte()])?;
		linker.set_byte(INIT_ADDRESS, &self.init.to_le_bytes())?;
		linker.set_byte(PLAY_ADDRESS, &self.play.to_le_bytes())?;
		info!(
			"music: ${:04x} - ${:04x}, init ${:04x}, play ${:04x}",
			self.load_address,
			usize::from(self.load_address) + self.data.len(),
			self.init,
			self.play
		);
		Ok(())
	}
}

/// Viewer program linked in front of the picture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Displayer {
	prg: Vec<u8>,
}

impl Displayer {
	/// Wraps an address-prefixed program.
	pub fn new(prg: Vec<u8>) -> Result<Self, MemoryError> {
		if prg.len() < 3 {
			return Err(MemoryError::BlobTooShort {
				len: prg.len(),
			});
		}
		Ok(Self {
			prg,
		})
	}

	/// Load address of the program.
	pub fn load_address(&self) -> u16 {
		u16::from_le_bytes([self.prg[0], self.prg[1]])
	}

	/// Address-prefixed program bytes.
	pub fn as_bytes(&self) -> &[u8] {
		&self.prg
	}

	/// Links the displayer for a still image of `mode`.
	///
	/// The fade and loop flags are patched, and the fade code area is blocked
	/// unless fading is disabled.
	pub fn link(
		&self,
		linker: &mut Linker,
		mode: GraphicsMode,
		options: &Options,
	) -> Result<(), MemoryError> {
		linker.write_prg(&self.prg)?;
		let flags = [u8::from(options.no_fade), u8::from(options.no_loop)];
		let (flags_address, fade) = match mode {
			GraphicsMode::MultiColorBitmap => (Some(BITMAP_FLAGS_ADDRESS), Some(KOALA_FADE)),
			GraphicsMode::SingleColorBitmap => (Some(BITMAP_FLAGS_ADDRESS), Some(HIRES_FADE)),
			GraphicsMode::SingleColorCharset | GraphicsMode::MultiColorCharset => {
				(Some(CHARSET_FLAGS_ADDRESS), Some(CHARSET_FADE))
			}
			GraphicsMode::SingleColorSprites | GraphicsMode::MultiColorSprites => (None, None),
		};
		if let Some(address) = flags_address {
			linker.set_byte(address, &flags)?;
		}
		if let Some((start, end)) = fade.filter(|_| !options.no_fade) {
			debug!("fade code: ${:04x} - ${:04x}", start, end);
			linker.block(start, end);
		}
		Ok(())
	}

	/// Links the displayer for an interlaced picture.
	///
	/// The interlace displayer has no fade code and no flags to patch.
	pub fn link_interlace(&self, linker: &mut Linker) -> Result<(), MemoryError> {
		linker.write_prg(&self.prg)?;
		Ok(())
	}

	/// Links the displayer for an animation of `mode`.
	///
	/// Writes the frame delay and the wait seconds and blocks the area the
	/// displayer generates its fade code into.
	pub fn link_animation(
		&self,
		linker: &mut Linker,
		mode: GraphicsMode,
		options: &Options,
	) -> Result<(), MemoryError> {
		linker.write_prg(&self.prg)?;
		linker.set_byte(FRAME_DELAY_ADDRESS, &[options.frame_delay])?;
		linker.set_byte(WAIT_SECONDS_ADDRESS, &[options.wait_seconds])?;
		let fade = match mode {
			GraphicsMode::MultiColorBitmap => Some(KOALA_ANIMATION_FADE),
			GraphicsMode::SingleColorBitmap => Some(HIRES_ANIMATION_FADE),
			_ => None,
		};
		if let Some((start, end)) = fade {
			debug!("fade code: ${:04x} - ${:04x}", start, end);
			linker.block(start, end);
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::linker::MemoryState;

	fn displayer() -> Displayer {
		// load address $0801 followed by a settings block filled with $ea
		let mut prg = vec![0x01, 0x08];
		prg.extend_from_slice(&[0xea; 0x30]);
		Displayer::new(prg).unwrap()
	}

	#[test]
	fn test_start_song_byte() {
		let mut music = Music::new(0x1000, vec![0x60]);
		assert_eq!(music.start_song_byte(), 0);
		music.start_song = 3;
		music.ntsc = true;
		assert_eq!(music.start_song_byte(), 0x82);
		music.start_song = 0;
		assert_eq!(music.start_song_byte(), 0x80);
	}

	#[test]
	fn test_music_patches_settings() {
		let mut linker = Linker::default();
		displayer().link(&mut linker, GraphicsMode::MultiColorBitmap, &Options::default()).unwrap();
		let mut music = Music::new(0x1000, vec![0x4c, 0x00, 0x10]);
		music.play = 0x1006;
		music.link(&mut linker).unwrap();
		assert_eq!(linker.byte(0x081a), 0);
		assert_eq!((linker.byte(0x081c), linker.byte(0x081d)), (0x00, 0x10));
		assert_eq!((linker.byte(0x081f), linker.byte(0x0820)), (0x06, 0x10));
		assert_eq!(linker.byte(0x1000), 0x4c);
	}

	#[test]
	fn test_fade_area_blocked() {
		let mut linker = Linker::default();
		displayer().link(&mut linker, GraphicsMode::MultiColorBitmap, &Options::default()).unwrap();
		assert_eq!(linker.state(0x4800), MemoryState::Blocked);
		assert_eq!(linker.state(0x8e4f), MemoryState::Blocked);
		assert_eq!(linker.state(0x8e50), MemoryState::Free);
		assert_eq!(linker.byte(0x0823), 0);
		assert_eq!(linker.byte(0x0824), 0);

		let options = Options {
			no_fade: true,
			no_loop: true,
			..Options::default()
		};
		let mut linker = Linker::default();
		displayer().link(&mut linker, GraphicsMode::SingleColorCharset, &options).unwrap();
		assert_eq!(linker.state(0xac00), MemoryState::Free);
		assert_eq!((linker.byte(0x0824), linker.byte(0x0825)), (1, 1));
	}

	#[test]
	fn test_animation_settings() {
		let options = Options {
			frame_delay: 4,
			wait_seconds: 2,
			..Options::default()
		};
		let mut linker = Linker::default();
		displayer().link_animation(&mut linker, GraphicsMode::SingleColorBitmap, &options).unwrap();
		assert_eq!((linker.byte(0x0820), linker.byte(0x0821)), (4, 2));
		assert_eq!(linker.state(0xac00), MemoryState::Blocked);
		assert_eq!(linker.state(0xcfff), MemoryState::Blocked);
	}

	#[test]
	fn test_interlace_leaves_memory_free() {
		let mut linker = Linker::default();
		displayer().link_interlace(&mut linker).unwrap();
		assert_eq!(linker.start_address(), Some(0x0801));
		assert_eq!(linker.state(0x4800), MemoryState::Free);
		assert_eq!(linker.state(0x6000), MemoryState::Free);
	}

	#[test]
	fn test_short_displayer() {
		assert!(matches!(
			Displayer::new(vec![0x01, 0x08]),
			Err(MemoryError::BlobTooShort {
				len: 2
			})
		));
	}
}
