//! # Tivu - Test Instrument Viewer
//!
//! Tivu acts as the printer attached to an HP/Agilent test instrument. When
//! the instrument's print button is pressed it sends a PCL screen dump over
//! its serial printer port; tivu decodes the raster rows and saves them as an
//! image. It provides:
//!
//! - **PCL decoding**: a streaming decoder that copes with escape sequences
//!   and rows split across arbitrary reads
//! - **Capture**: start/progress/completed events, file replay, raw dumps
//! - **Export**: PNG, JPEG, BMP and TIFF output
//! - **Transport**: raw serial TTY access with read timeouts
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::path::Path;
//! use tivu::{
//!     capture,
//!     export::{self, ExportFormat},
//! };
//!
//! // Decode a dump recorded earlier with `tivu dump`
//! let image = capture::replay_file("dump-pcl-8752.txt")?;
//! println!("Image size: {}x{}", image.width_pixels(), image.height());
//!
//! export::save(&image, Path::new("screen"), ExportFormat::Png)?;
//!
//! # Ok::<(), tivu::error::TivuError>(())
//! ```
//!
//! ## Streaming
//!
//! ```
//! use tivu::pcl::{Decoder, State};
//!
//! let mut decoder = Decoder::new();
//! let chunks: [&[u8]; 4] = [b"\x1b*r", b"A\x1b*b2", b"W\xFF", b"\x00\x1b*rB"];
//! for chunk in chunks {
//!     decoder.feed(chunk);
//! }
//! assert_eq!(decoder.image().rows(), &[vec![0xFF, 0x00]]);
//! assert_eq!(decoder.state(), State::Idle);
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`pcl`] | Streaming PCL raster decoder |
//! | [`capture`] | Capture sessions, replay, raw dump |
//! | [`export`] | Bitmap rendering and image files |
//! | [`transport`] | Serial port access |
//! | [`instrument`] | Instrument profiles |
//! | [`error`] | Error types |
//!
//! ## Supported Instruments
//!
//! Currently tested with:
//! - HP E8285A (CDMA mobile station test set)
//! - HP 8752A (network analyzer)
//!
//! Other instruments that print PCL raster graphics over RS-232 should work
//! with the generic profile.

pub mod capture;
pub mod error;
pub mod export;
pub mod instrument;
pub mod pcl;
pub mod transport;

// Re-exports for convenience
pub use error::TivuError;
pub use instrument::InstrumentProfile;
pub use pcl::{Decoder, Image, State};
pub use transport::SerialPort;
