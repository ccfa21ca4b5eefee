//! # PCL Raster Decoding
//!
//! Reconstructs monochrome bitmaps from the PCL printer output of HP/Agilent
//! test instruments.
//!
//! ## Stream Layout
//!
//! A screen dump from an instrument looks like this on the wire:
//!
//! ```text
//! ESC E  ESC &l0O  ...            printer setup (ignored)
//! ESC *t75R                       resolution
//! ESC *rA                         start graphics
//! ESC *b64W  <64 bytes>           row 0
//! ESC *b64W  <64 bytes>           row 1
//! ...
//! ESC *rB                         end graphics
//! ```
//!
//! The serial line delivers this in chunks of any size, so escapes and rows
//! regularly straddle two reads.
//!
//! ## Modules
//!
//! - [`buffer`]: unconsumed-byte arena
//! - [`token`]: escape token scanner
//! - [`decoder`]: state machine and row slicing
//! - [`image`]: decoded rows

pub mod buffer;
pub mod decoder;
pub mod image;
pub mod token;

pub use decoder::{Decoder, State};
pub use image::{Image, Row};
