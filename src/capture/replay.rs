//! # File Replay
//!
//! Decodes a recorded instrument dump by pushing it through the decoder in
//! small pieces, the same way a live port delivers it.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::error::TivuError;
use crate::pcl::{Decoder, Image, State};

/// Read size used when replaying a file
pub const REPLAY_CHUNK_SIZE: usize = 100;

/// Decode everything `reader` yields, `chunk_size` bytes at a time.
///
/// ```
/// use tivu::capture::replay;
///
/// let stream = b"\x1b*rA\x1b*b2W\xF0\x0F\x1b*rB";
/// let image = replay(&stream[..], 3).unwrap();
/// assert_eq!(image.rows(), &[vec![0xF0, 0x0F]]);
/// ```
pub fn replay<R: Read>(mut reader: R, chunk_size: usize) -> Result<Image, TivuError> {
    if chunk_size == 0 {
        return Err(TivuError::Config(
            "Replay chunk size must be greater than zero".to_string(),
        ));
    }

    let mut decoder = Decoder::new();
    let mut buf = vec![0u8; chunk_size];
    let mut total = 0usize;

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        total += n;
        decoder.feed(&buf[..n]);
    }

    if decoder.state() != State::Idle {
        log::warn!(
            "stream ended inside a graphics block ({} bytes unconsumed)",
            decoder.pending()
        );
    }
    log::debug!(
        "replayed {} bytes into {} rows",
        total,
        decoder.image().height()
    );

    Ok(decoder.take_image())
}

/// Decode a recorded dump file.
pub fn replay_file<P: AsRef<Path>>(path: P) -> Result<Image, TivuError> {
    replay_file_with_chunk_size(path, REPLAY_CHUNK_SIZE)
}

/// Decode a recorded dump file with a custom read size.
pub fn replay_file_with_chunk_size<P: AsRef<Path>>(
    path: P,
    chunk_size: usize,
) -> Result<Image, TivuError> {
    let path = path.as_ref();
    let file = File::open(path)
        .map_err(|e| TivuError::Config(format!("Failed to open {}: {}", path.display(), e)))?;
    log::info!("replaying {}", path.display());
    replay(file, chunk_size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_stream() -> Vec<u8> {
        let mut out = b"\x1bE\x1b*t75R\x1b*rA".to_vec();
        for i in 0..10u8 {
            out.extend_from_slice(b"\x1b*b3W");
            out.extend_from_slice(&[i, i + 0x40, 0xAA]);
        }
        out.extend_from_slice(b"\x1b*rB\x0c");
        out
    }

    #[test]
    fn test_replay_matches_single_feed() {
        let stream = sample_stream();
        let mut decoder = Decoder::new();
        decoder.feed(&stream);

        for chunk_size in [1, 2, 7, 100, 4096] {
            let image = replay(stream.as_slice(), chunk_size).unwrap();
            assert_eq!(&image, decoder.image(), "chunk size {}", chunk_size);
        }
    }

    #[test]
    fn test_replay_zero_chunk_size() {
        assert!(matches!(
            replay(&b""[..], 0),
            Err(TivuError::Config(_))
        ));
    }

    #[test]
    fn test_replay_truncated_stream_keeps_rows() {
        let stream = sample_stream();
        let cut = stream.len() - 20;
        let image = replay(&stream[..cut], REPLAY_CHUNK_SIZE).unwrap();
        assert!(image.height() > 0 && image.height() < 10);
    }

    #[test]
    fn test_replay_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&sample_stream()).unwrap();

        let image = replay_file(file.path()).unwrap();
        assert_eq!(image.height(), 10);
        assert_eq!(image.width_pixels(), 24);
    }

    #[test]
    fn test_replay_missing_file() {
        assert!(replay_file("/nonexistent/dump.pcl").is_err());
    }
}
