//! The compressor seam.
//!
//! Conversion never compresses on its own. A [`Compressor`] is handed in by the
//! caller and used twice: to crunch the final program when
//! [`Options::crunch`](crate::options::Options::crunch) is set, and as the
//! fitness function of the brute-force bitpair search, where only the length
//! of its output matters.
//!
//! # Examples
//!
//! ```
//! use c64gfx_types::compress::{Compressor, Uncompressed};
//!
//! let out = Uncompressed.compress(&[1, 2, 3]).unwrap();
//! assert_eq!(out, vec![1, 2, 3]);
//! ```

use std::convert::Infallible;

/// Byte-level compressor used to crunch programs and score candidates.
///
/// Implementations must be deterministic: the same input always produces
/// output of the same length, otherwise brute-force results are not
/// reproducible. Workers share one instance, hence the `Sync` bound.
pub trait Compressor: Send + Sync {
	/// Error raised when compression fails
	type Error: std::error::Error + Send + Sync + 'static;

	/// Compresses `data`.
	fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Self::Error>;

	/// Length of the compressed `data`.
	///
	/// The default compresses and measures; override when the length is
	/// cheaper to compute.
	fn compressed_len(&self, data: &[u8]) -> Result<usize, Self::Error> {
		self.compress(data).map(|out| out.len())
	}
}

impl<C: Compressor + ?Sized> Compressor for &C {
	type Error = C::Error;

	fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
		(**self).compress(data)
	}

	fn compressed_len(&self, data: &[u8]) -> Result<usize, Self::Error> {
		(**self).compressed_len(data)
	}
}

/// Identity compressor, returns its input unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Uncompressed;

impl Compressor for Uncompressed {
	type Error = Infallible;

	fn compress(&self, data: &[u8]) -> Result<Vec<u8>, Self::Error> {
		Ok(data.to_vec())
	}

	fn compressed_len(&self, data: &[u8]) -> Result<usize, Self::Error> {
		Ok(data.len())
	}
}
