//! # Instrument Transport Layer
//!
//! This module provides the byte sources a capture reads from.
//!
//! ## Available Transports
//!
//! - [`serial`]: RS-232 printer port via a TTY device (Unix)
//!
//! Anything implementing [`std::io::Read`] can feed a capture, so recorded
//! dumps replay through the same path as a live port.

pub mod serial;

pub use serial::{SerialConfig, SerialPort};
