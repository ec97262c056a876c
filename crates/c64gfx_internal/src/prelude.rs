//! Prelude module for `c64gfx_internal`.
//!
//! This module provides a convenient way to import commonly used types and traits.
//!
//! # Examples
//!
//! ```rust
//! use c64gfx_internal::prelude::*;
//!
//! // Now you can use all common types directly
//! let mut linker = Linker::new(0x0801);
//! linker.write(&[0x0b, 0x08, 0x0a, 0x00]).unwrap();
//! assert_eq!(linker.to_prg().unwrap().len(), 6);
//!
//! let mode: GraphicsMode = "koala".parse().unwrap();
//! assert_eq!(mode.max_colors(), 4);
//! ```

// Re-export everything from c64gfx_types::prelude
#[doc(inline)]
pub use c64gfx_types::prelude::*;

// Re-export the entire c64gfx_types module for advanced usage
#[doc(inline)]
pub use c64gfx_types;
