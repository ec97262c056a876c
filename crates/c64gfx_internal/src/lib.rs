//! This module is separated into its own crate to keep the public facade thin, and should not be used directly.

/// `use c64gfx_rs::prelude::*;` to import commonly used items.
pub mod prelude;

// Re-export c64gfx_types for convenience
pub use c64gfx_types;

// Re-export the entry points at crate root
pub use c64gfx_types::convert::{
	Conversion, Converter, brute_force, convert, convert_animation, convert_interlace,
};
pub use c64gfx_types::error::{ConvertError, MemoryError, PackingError, ValidationError};
pub use c64gfx_types::options::Options;
