//! # Capture Session
//!
//! Turns decoder progress into the events a front end reacts to: a screen
//! dump started, more rows arrived, the dump is complete.
//!
//! ```text
//! Idle ──(decoder leaves Idle)──► Streaming ──(decoder back in Idle)──► Completed
//!   ▲                                 │                                    │
//!   └──────────── abort() ────────────┘◄───────────────────────────────────┘
//! ```
//!
//! A completed image is moved out of the decoder, so each dump is reported
//! once and the next dump starts from an empty image.

use crate::instrument::InstrumentProfile;
use crate::pcl::{Decoder, Image, State};

/// Something a front end should know about after a chunk was pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// The instrument started sending a raster block.
    Started,
    /// Row count grew. `expected` comes from the instrument profile.
    Progress {
        rows: usize,
        expected: Option<usize>,
    },
    /// The raster block ended; these are its rows.
    Completed(Image),
}

/// Decoder plus streaming bookkeeping for one port or file.
#[derive(Debug, Clone)]
pub struct CaptureSession {
    decoder: Decoder,
    profile: InstrumentProfile,
    streaming: bool,
    reported_rows: usize,
}

impl CaptureSession {
    pub fn new(profile: InstrumentProfile) -> Self {
        Self {
            decoder: Decoder::new(),
            profile,
            streaming: false,
            reported_rows: 0,
        }
    }

    pub fn profile(&self) -> &InstrumentProfile {
        &self.profile
    }

    /// Whether a raster block is in progress.
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Rows received for the block in progress.
    pub fn rows(&self) -> usize {
        self.decoder.image().height()
    }

    pub fn decoder(&self) -> &Decoder {
        &self.decoder
    }

    /// Feed a chunk and report what changed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<CaptureEvent> {
        self.decoder.feed(chunk);

        let mut events = Vec::new();
        let state = self.decoder.state();
        let rows = self.decoder.image().height();

        // A whole block can arrive inside one chunk, in which case the
        // decoder is already back in Idle but holds rows.
        if !self.streaming && (state != State::Idle || rows > 0) {
            log::info!("capture started ({})", self.profile.name);
            self.streaming = true;
            self.reported_rows = 0;
            events.push(CaptureEvent::Started);
        }

        if self.streaming && rows > self.reported_rows {
            self.reported_rows = rows;
            events.push(CaptureEvent::Progress {
                rows,
                expected: self.profile.expected_rows,
            });
        }

        if self.streaming && state == State::Idle {
            let image = self.decoder.take_image();
            log::info!(
                "capture complete: {}x{}",
                image.width_pixels(),
                image.height()
            );
            self.streaming = false;
            self.reported_rows = 0;
            events.push(CaptureEvent::Completed(image));
        }

        events
    }

    /// Abandon the block in progress.
    pub fn abort(&mut self) {
        if self.streaming {
            log::info!("capture aborted after {} rows", self.rows());
        }
        self.decoder.reset();
        self.streaming = false;
        self.reported_rows = 0;
    }
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new(InstrumentProfile::default())
    }
}
