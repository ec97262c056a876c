//! Memory linker.
//!
//! The linker assembles independently produced blobs (picture data, an
//! optional displayer, music, animation frames) into one program image. It
//! simulates the full 64KB address space and refuses to let two blobs share a
//! byte.
//!
//! # Examples
//!
//! ```
//! use c64gfx_types::linker::Linker;
//!
//! let mut linker = Linker::new(0x0801);
//! linker.write(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
//! let prg = linker.to_prg().unwrap();
//! assert_eq!(prg.len(), 10);
//! assert_eq!(&prg[..2], &[0x01, 0x08]);
//! ```

use std::fmt::Write as _;

use log::debug;

use crate::error::MemoryError;

/// Size of the address space.
pub const MEMORY_SIZE: usize = 0x10000;

/// Usage of one byte of memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MemoryState {
	/// Nothing written yet
	#[default]
	Free,
	/// Reserved, writes fail
	Blocked,
	/// Written
	Used,
}

impl MemoryState {
	const fn symbol(self) -> char {
		match self {
			Self::Free => '.',
			Self::Blocked => 'x',
			Self::Used => '+',
		}
	}
}

/// Simulated 64KB address space with a write cursor.
#[derive(Debug, Clone)]
pub struct Linker {
	memory: Box<[u8]>,
	state: Box<[MemoryState]>,
	cursor: usize,
}

impl Default for Linker {
	fn default() -> Self {
		Self::new(0)
	}
}

impl Linker {
	/// Creates an empty address space with the cursor at `start`.
	pub fn new(start: u16) -> Self {
		Self {
			memory: vec![0; MEMORY_SIZE].into_boxed_slice(),
			state: vec![MemoryState::Free; MEMORY_SIZE].into_boxed_slice(),
			cursor: usize::from(start),
		}
	}

	/// Current cursor.
	pub fn cursor(&self) -> usize {
		self.cursor
	}

	/// Moves the cursor.
	pub fn set_cursor(&mut self, address: u16) {
		self.cursor = usize::from(address);
	}

	/// State of one byte.
	pub fn state(&self, address: u16) -> MemoryState {
		self.state[usize::from(address)]
	}

	/// Byte value at an address.
	pub fn byte(&self, address: u16) -> u8 {
		self.memory[usize::from(address)]
	}

	/// Reserves `start..end` so later writes there fail.
	///
	/// Used bytes inside the range stay used.
	pub fn block(&mut self, start: u16, end: u16) {
		for state in &mut self.state[usize::from(start)..usize::from(end.max(start))] {
			if *state == MemoryState::Free {
				*state = MemoryState::Blocked;
			}
		}
	}

	/// Writes bytes at the cursor and advances it.
	///
	/// Nothing is written if any target byte is used or blocked.
	///
	/// # Returns
	///
	/// The number of bytes written.
	pub fn write(&mut self, bytes: &[u8]) -> Result<usize, MemoryError> {
		let start = self.cursor;
		let end = start + bytes.len();
		if end > MEMORY_SIZE {
			return Err(MemoryError::OutOfMemory {
				address: start,
				len: bytes.len(),
			});
		}
		if let Some(offset) = self.state[start..end].iter().position(|s| *s != MemoryState::Free) {
			debug!("memory usage at overlap:\n{}", self.memory_usage());
			return Err(MemoryError::Overlap {
				address: start + offset,
				remaining: bytes.len() - offset,
			});
		}
		self.memory[start..end].copy_from_slice(bytes);
		self.state[start..end].fill(MemoryState::Used);
		self.cursor = end;
		Ok(bytes.len())
	}

	/// Moves the cursor to `address` and writes there.
	pub fn write_at(&mut self, address: u16, bytes: &[u8]) -> Result<usize, MemoryError> {
		self.set_cursor(address);
		self.write(bytes)
	}

	/// Writes several blobs in ascending address order.
	pub fn write_map<'a, I>(&mut self, blobs: I) -> Result<usize, MemoryError>
	where
		I: IntoIterator<Item = (u16, &'a [u8])>,
	{
		let mut blobs: Vec<_> = blobs.into_iter().collect();
		blobs.sort_by_key(|(address, _)| *address);
		let mut total = 0;
		for (address, bytes) in blobs {
			total += self.write_at(address, bytes)?;
		}
		Ok(total)
	}

	/// Writes a program whose first two bytes are its little-endian load
	/// address.
	pub fn write_prg(&mut self, prg: &[u8]) -> Result<usize, MemoryError> {
		if prg.len() < 3 {
			return Err(MemoryError::BlobTooShort {
				len: prg.len(),
			});
		}
		let address = u16::from_le_bytes([prg[0], prg[1]]);
		self.write_at(address, &prg[2..])
	}

	/// Overwrites bytes regardless of their state, for header fixups.
	///
	/// The cursor does not move.
	pub fn set_byte(&mut self, address: u16, bytes: &[u8]) -> Result<(), MemoryError> {
		let start = usize::from(address);
		let end = start + bytes.len();
		if end > MEMORY_SIZE {
			return Err(MemoryError::OutOfMemory {
				address: start,
				len: bytes.len(),
			});
		}
		self.memory[start..end].copy_from_slice(bytes);
		self.state[start..end].fill(MemoryState::Used);
		Ok(())
	}

	/// First used address.
	pub fn start_address(&self) -> Option<usize> {
		self.state.iter().position(|s| *s == MemoryState::Used)
	}

	/// One past the last used address.
	pub fn end_address(&self) -> Option<usize> {
		self.state.iter().rposition(|s| *s == MemoryState::Used).map(|i| i + 1)
	}

	/// Bytes from the first to the last used address, gaps zeroed.
	pub fn bytes(&self) -> Result<&[u8], MemoryError> {
		let (start, end) = self.span()?;
		Ok(&self.memory[start..end])
	}

	/// Emits the program: load address, then the used span.
	pub fn to_prg(&self) -> Result<Vec<u8>, MemoryError> {
		let (start, end) = self.span()?;
		let mut prg = Vec::with_capacity(end - start + 2);
		prg.extend_from_slice(&(start as u16).to_le_bytes());
		prg.extend_from_slice(&self.memory[start..end]);
		Ok(prg)
	}

	fn span(&self) -> Result<(usize, usize), MemoryError> {
		let start = self.start_address().ok_or(MemoryError::Empty)?;
		let end = self.end_address().ok_or(MemoryError::Empty)?;
		if start >= end {
			return Err(MemoryError::InvertedSpan {
				start,
				end,
			});
		}
		Ok((start, end))
	}

	/// Renders memory usage as one line per 4KB, one character per 256 bytes.
	///
	/// A page shows `+` if any byte is used, `x` if any byte is blocked and
	/// `.` otherwise.
	pub fn memory_usage(&self) -> String {
		let mut out = String::from("      0123456789abcdef\n");
		for (row, chunk) in self.state.chunks(0x1000).enumerate() {
			let _ = write!(out, "${:x}000 ", row);
			for page in chunk.chunks(0x100) {
				let state = if page.contains(&MemoryState::Used) {
					MemoryState::Used
				} else if page.contains(&MemoryState::Blocked) {
					MemoryState::Blocked
				} else {
					MemoryState::Free
				};
				out.push(state.symbol());
			}
			out.push('\n');
		}
		out
	}
}
