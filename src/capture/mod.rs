//! # Capture
//!
//! Everything between a byte source and a finished image.
//!
//! | Piece | Role |
//! |-------|------|
//! | [`session`] | Decoder plus started/progress/completed events |
//! | [`reader`] | Background thread for blocking reads |
//! | [`replay`] | Decode a recorded file |
//! | [`dump`] | Record raw bytes from a port |

pub mod dump;
pub mod reader;
pub mod replay;
pub mod session;

pub use dump::dump;
pub use reader::{Reader, Received};
pub use replay::{REPLAY_CHUNK_SIZE, replay, replay_file, replay_file_with_chunk_size};
pub use session::{CaptureEvent, CaptureSession};
