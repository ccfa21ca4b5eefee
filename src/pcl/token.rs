//! # PCL Escape Tokens
//!
//! Finds and classifies the handful of PCL escape sequences that matter for
//! raster reconstruction.
//!
//! ## Grammar
//!
//! ```text
//! ESC  introducer  class  digits*  terminator
//! 1B   * or &      t k r b  0-9     W R A B
//! ```
//!
//! | Sequence | Meaning |
//! |----------|---------|
//! | `ESC * r A` | Start raster graphics |
//! | `ESC * r B` | End raster graphics |
//! | `ESC * b # W` | Transfer `#` bytes of raster data |
//! | `ESC * t # R` | Raster resolution in DPI |
//!
//! Everything else that fits the grammar is matched (so it gets consumed)
//! but has no meaning to the decoder.
//!
//! ## Matching
//!
//! [`find_token`] returns the leftmost complete match. A sequence cut off by
//! the end of the buffer is not a match; the caller keeps the bytes and
//! scans again once more data has arrived.

use std::fmt;

/// ESC (Escape) - start of every PCL command
pub const ESC: u8 = 0x1B;

/// Bytes allowed directly after ESC.
const INTRODUCERS: &[u8] = b"*&";

/// Command class letters.
const CLASSES: &[u8] = b"tkrb";

/// Final letters that close a token.
const TERMINATORS: &[u8] = b"WRAB";

/// What a token means to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `ESC * r A`
    StartGraphics,
    /// `ESC * r B`
    EndGraphics,
    /// `ESC * b # W`. `None` when the byte count doesn't fit in `usize`.
    RasterData(Option<usize>),
    /// `ESC * t # R`. `None` when the value doesn't fit in `usize`.
    Resolution(Option<usize>),
    /// Any other token the grammar accepts.
    Unhandled,
}

/// A complete escape token borrowed from the scan buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub introducer: u8,
    pub class: u8,
    /// Decimal parameter digits, possibly empty.
    pub digits: &'a [u8],
    pub terminator: u8,
}

impl Token<'_> {
    /// Numeric parameter. Missing digits mean 0; overflow means `None`.
    pub fn parameter(&self) -> Option<usize> {
        self.digits.iter().try_fold(0usize, |acc, &d| {
            acc.checked_mul(10)?.checked_add(usize::from(d - b'0'))
        })
    }

    /// Classify by introducer, class and terminator.
    pub fn command(&self) -> Command {
        match (self.introducer, self.class, self.terminator) {
            (b'*', b'r', b'A') => Command::StartGraphics,
            (b'*', b'r', b'B') => Command::EndGraphics,
            (b'*', b'b', b'W') => Command::RasterData(self.parameter()),
            (b'*', b't', b'R') => Command::Resolution(self.parameter()),
            _ => Command::Unhandled,
        }
    }

    /// Encoded length in bytes.
    pub fn encoded_len(&self) -> usize {
        4 + self.digits.len()
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ESC {}{}{}{}",
            self.introducer as char,
            self.class as char,
            String::from_utf8_lossy(self.digits),
            self.terminator as char
        )
    }
}

/// A token located inside a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// Offset of the ESC byte.
    pub start: usize,
    /// Offset one past the terminator.
    pub end: usize,
    pub token: Token<'a>,
}

/// Find the leftmost complete token in `buf`.
///
/// ```
/// use tivu::pcl::token::{find_token, Command};
///
/// let m = find_token(b"junk\x1b*b72W").unwrap();
/// assert_eq!(m.start, 4);
/// assert_eq!(m.end, 11);
/// assert_eq!(m.token.command(), Command::RasterData(Some(72)));
/// ```
pub fn find_token(buf: &[u8]) -> Option<Match<'_>> {
    let mut from = 0;
    while let Some(offset) = buf[from..].iter().position(|&b| b == ESC) {
        let start = from + offset;
        if let Some(token) = token_at(&buf[start..]) {
            return Some(Match {
                start,
                end: start + token.encoded_len(),
                token,
            });
        }
        from = start + 1;
    }
    None
}

/// Match a token starting exactly at `buf[0]`, which must be ESC.
fn token_at(buf: &[u8]) -> Option<Token<'_>> {
    let introducer = *buf.get(1)?;
    if !INTRODUCERS.contains(&introducer) {
        return None;
    }
    let class = *buf.get(2)?;
    if !CLASSES.contains(&class) {
        return None;
    }
    let digit_count = buf[3..].iter().take_while(|b| b.is_ascii_digit()).count();
    let terminator = *buf.get(3 + digit_count)?;
    if !TERMINATORS.contains(&terminator) {
        return None;
    }
    Some(Token {
        introducer,
        class,
        digits: &buf[3..3 + digit_count],
        terminator,
    })
}
