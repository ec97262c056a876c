//! Frame-to-frame delta encoding for bitmap animations.
//!
//! Each frame is stored as the blocks that changed since the previous one.
//! The first frame is diffed against the last, so the stream loops cleanly.
//!
//! # Stream format
//!
//! ```text
//! frame  := chunk* 0x00
//! chunk  := count bitmap_lo bitmap_hi screen_lo screen_hi payload{count}
//! stream := frame+ 0xff
//! ```
//!
//! `bitmap` and `screen` are offsets from the bitmap and screen bases
//! (`block * 8` and `block`). A payload is the block's 8 bitmap bytes followed
//! by its screen byte, and for koala its color RAM byte.

use log::debug;

use crate::{
	encode::{EncodedImage, constants::BYTES_PER_BLOCK},
	error::{ConvertError, ValidationError},
};

/// Ends the chunk list of one frame.
pub const FRAME_END: u8 = 0x00;

/// Ends the stream.
pub const STREAM_END: u8 = 0xff;

/// Most blocks in one chunk, so the count never reads as [`FRAME_END`] or
/// wraps.
pub const MAX_CHUNK_BLOCKS: usize = 255;

/// A run of consecutive changed blocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
	/// Index of the first block
	pub first_block: usize,
	/// Payload of each block in the run
	pub payloads: Vec<Vec<u8>>,
}

impl Chunk {
	/// Serializes the chunk.
	pub fn to_bytes(&self) -> Vec<u8> {
		let bitmap = ((self.first_block * BYTES_PER_BLOCK) as u16).to_le_bytes();
		let screen = (self.first_block as u16).to_le_bytes();
		let mut bytes = vec![self.payloads.len() as u8, bitmap[0], bitmap[1], screen[0], screen[1]];
		for payload in &self.payloads {
			bytes.extend_from_slice(payload);
		}
		bytes
	}
}

/// Builds the delta stream of an animation.
pub struct AnimationEncoder;

impl AnimationEncoder {
	/// Checks that the frames can form one animation.
	pub fn validate(frames: &[EncodedImage]) -> Result<(), ValidationError> {
		let first = frames.first().ok_or(ValidationError::NotEnoughFrames {
			count: 0,
		})?;
		if frames.len() < 2 {
			return Err(ValidationError::NotEnoughFrames {
				count: frames.len(),
			});
		}
		let mode = first.mode();
		if first.block_count() == 0 {
			return Err(ValidationError::UnsupportedAnimation(mode));
		}
		for (frame, image) in frames.iter().enumerate().skip(1) {
			if image.mode() != mode {
				return Err(ValidationError::MixedModes {
					frame,
					expected: mode,
					found: image.mode(),
				});
			}
		}
		Ok(())
	}

	/// Changed-block runs between two frames of the same mode.
	pub fn diff(previous: &EncodedImage, current: &EncodedImage) -> Vec<Chunk> {
		let mut chunks: Vec<Chunk> = Vec::new();
		let mut open = false;
		for index in 0..current.block_count() {
			let payload = current.block_payload(index);
			if payload == previous.block_payload(index) {
				open = false;
				continue;
			}
			let Some(payload) = payload else {
				continue;
			};
			match chunks.last_mut() {
				Some(chunk) if open && chunk.payloads.len() < MAX_CHUNK_BLOCKS => {
					chunk.payloads.push(payload);
				}
				_ => {
					chunks.push(Chunk {
						first_block: index,
						payloads: vec![payload],
					});
					open = true;
				}
			}
		}
		chunks
	}

	/// Encodes every frame against its predecessor, frame 0 against the last.
	///
	/// Each returned frame ends with [`FRAME_END`].
	pub fn encode_frames(frames: &[EncodedImage]) -> Result<Vec<Vec<u8>>, ConvertError> {
		Self::validate(frames)?;
		let count = frames.len();
		let encoded = (0..count)
			.map(|i| {
				let previous = &frames[(i + count - 1) % count];
				let chunks = Self::diff(previous, &frames[i]);
				let mut bytes: Vec<u8> = chunks.iter().flat_map(Chunk::to_bytes).collect();
				bytes.push(FRAME_END);
				debug!("frame {}: {} chunk(s), {} byte(s)", i, chunks.len(), bytes.len());
				bytes
			})
			.collect();
		Ok(encoded)
	}

	/// Encodes all frames and terminates the stream with [`STREAM_END`].
	pub fn encode(frames: &[EncodedImage]) -> Result<Vec<u8>, ConvertError> {
		let mut stream: Vec<u8> = Self::encode_frames(frames)?.concat();
		stream.push(STREAM_END);
		Ok(stream)
	}

	/// Applies one encoded frame to bitmap and attribute tables.
	///
	/// `attributes` lists the per-block tables in payload order (screen, then
	/// color RAM for koala).
	///
	/// # Returns
	///
	/// Bytes consumed, including the [`FRAME_END`] marker, or `None` if the
	/// frame is truncated or addresses blocks outside the tables.
	pub fn apply_frame(
		frame: &[u8],
		bitmap: &mut [u8],
		attributes: &mut [&mut [u8]],
	) -> Option<usize> {
		let payload_len = BYTES_PER_BLOCK + attributes.len();
		let mut pos = 0;
		loop {
			let count = usize::from(*frame.get(pos)?);
			if count == usize::from(FRAME_END) {
				return Some(pos + 1);
			}
			let header = frame.get(pos + 1..pos + 5)?;
			let bitmap_offset = usize::from(u16::from_le_bytes([header[0], header[1]]));
			let block = usize::from(u16::from_le_bytes([header[2], header[3]]));
			pos += 5;
			for i in 0..count {
				let payload = frame.get(pos..pos + payload_len)?;
				let target = bitmap_offset + i * BYTES_PER_BLOCK;
				bitmap
					.get_mut(target..target + BYTES_PER_BLOCK)?
					.copy_from_slice(&payload[..BYTES_PER_BLOCK]);
				for (table, value) in attributes.iter_mut().zip(&payload[BYTES_PER_BLOCK..]) {
					*table.get_mut(block + i)? = *value;
				}
				pos += payload_len;
			}
		}
	}
}
