//! # Streaming PCL Raster Decoder
//!
//! Turns an arbitrarily chunked PCL byte stream into raster rows.
//!
//! ## State Machine
//!
//! | State | start-graphics | end-graphics | raster-data | row complete |
//! |-------|----------------|--------------|-------------|--------------|
//! | Idle | → Graphics | stay | ignored | n/a |
//! | Graphics | → Graphics | → Idle | → GraphicsData | n/a |
//! | GraphicsData | → Graphics | → Idle | ignored | → Graphics |
//!
//! ## Feed Loop
//!
//! Each step does exactly one of:
//!
//! 1. In `GraphicsData` with at least `row_length` bytes buffered: slice a
//!    row. Checked first so raster bytes are never scanned as escapes.
//! 2. Otherwise consume up to and including the leftmost complete token,
//!    dropping whatever precedes it.
//!
//! The loop stops when neither applies. Whatever is left, including half an
//! escape sequence, waits for the next [`Decoder::feed`].
//!
//! ## Example
//!
//! ```
//! use tivu::pcl::{Decoder, State};
//!
//! let mut decoder = Decoder::new();
//! decoder.feed(b"\x1b*rA\x1b*b4W");
//! decoder.feed(&[10, 20]);
//! assert!(decoder.image().is_empty());
//! decoder.feed(&[30, 40]);
//! decoder.feed(b"\x1b*rB");
//!
//! assert_eq!(decoder.image().rows(), &[vec![10, 20, 30, 40]]);
//! assert_eq!(decoder.state(), State::Idle);
//! ```

use super::buffer::ByteBuffer;
use super::image::Image;
use super::token::{self, Command};

/// Graphics-mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum State {
    /// Outside a raster block.
    #[default]
    Idle,
    /// Inside a raster block, waiting for a raster-data command.
    Graphics,
    /// Collecting `row_length` bytes of raster data.
    GraphicsData,
}

/// Streaming decoder for one capture session.
#[derive(Debug, Default, Clone)]
pub struct Decoder {
    buffer: ByteBuffer,
    state: State,
    row_length: usize,
    image: Image,
}

impl Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `chunk` and decode as far as possible.
    ///
    /// Never blocks and never fails. Returns the number of rows completed
    /// during this call.
    pub fn feed(&mut self, chunk: &[u8]) -> usize {
        self.buffer.append(chunk);
        let before = self.image.height();
        while self.step() {}
        self.image.height() - before
    }

    /// Rows decoded so far.
    pub fn image(&self) -> &Image {
        &self.image
    }

    pub fn state(&self) -> State {
        self.state
    }

    /// Byte count of the row being collected. Only meaningful in
    /// [`State::GraphicsData`].
    pub fn row_length(&self) -> usize {
        self.row_length
    }

    /// Bytes received but not yet consumed.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    /// Move the decoded rows out, leaving state and buffered bytes alone.
    pub fn take_image(&mut self) -> Image {
        std::mem::take(&mut self.image)
    }

    /// Drop all rows and buffered bytes and return to [`State::Idle`].
    pub fn reset(&mut self) {
        log::debug!(
            "decoder reset: dropping {} rows, {} pending bytes",
            self.image.height(),
            self.buffer.len()
        );
        self.buffer.clear();
        self.image = Image::new();
        self.state = State::Idle;
        self.row_length = 0;
    }

    /// One unit of progress. Returns false when nothing could be done.
    fn step(&mut self) -> bool {
        if self.state == State::GraphicsData && self.buffer.len() >= self.row_length {
            let row = self.buffer.consume(self.row_length);
            self.image.push(row);
            self.state = State::Graphics;
            log::trace!("row {} complete", self.image.height());
            return true;
        }

        let Some(found) = token::find_token(self.buffer.as_slice()) else {
            return false;
        };
        if found.start > 0 {
            log::trace!("skipping {} bytes before {}", found.start, found.token);
        } else {
            log::trace!("token {}", found.token);
        }
        let command = found.token.command();
        self.buffer.discard(found.end);
        self.dispatch(command);
        true
    }

    fn dispatch(&mut self, command: Command) {
        match command {
            Command::StartGraphics => self.transition(State::Graphics),
            Command::EndGraphics => self.transition(State::Idle),
            Command::RasterData(length) if self.state == State::Graphics => match length {
                Some(length) => {
                    self.row_length = length;
                    self.transition(State::GraphicsData);
                }
                None => log::warn!("ignoring raster data command with oversized byte count"),
            },
            Command::Resolution(Some(dpi)) => log::trace!("resolution {} dpi", dpi),
            Command::RasterData(_) | Command::Resolution(None) | Command::Unhandled => {}
        }
    }

    fn transition(&mut self, next: State) {
        if self.state != next {
            log::debug!("state {:?} -> {:?}", self.state, next);
        }
        self.state = next;
    }
}
