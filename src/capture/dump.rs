//! # Raw Dump
//!
//! Records the exact bytes an instrument sends, for later replay or for
//! inspecting a printout the decoder doesn't understand.
//!
//! Waits as long as it takes for the first byte, then records until the
//! source goes quiet for one read timeout.

use std::io::{self, Read, Write};

use crate::error::TivuError;

const DUMP_BUFFER_SIZE: usize = 4096;

/// Copy one transmission from `source` to `sink`. Returns the byte count.
///
/// `source` must block with a timeout: an empty read before any data is
/// taken as "keep waiting", an empty read afterwards ends the dump.
pub fn dump<R: Read, W: Write>(mut source: R, mut sink: W) -> Result<u64, TivuError> {
    let mut buf = [0u8; DUMP_BUFFER_SIZE];
    let mut started = false;
    let mut total = 0u64;

    loop {
        let n = match source.read(&mut buf) {
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        if n == 0 {
            if started {
                break;
            }
            continue;
        }
        if !started {
            log::info!("started reading");
            started = true;
        }
        sink.write_all(&buf[..n])?;
        total += n as u64;
    }

    sink.flush()?;
    log::info!("dumped {} bytes", total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Quiet for a few reads, then talks, then goes quiet again.
    struct LateSource {
        quiet_reads: usize,
        data: Vec<Vec<u8>>,
    }

    impl Read for LateSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.quiet_reads > 0 {
                self.quiet_reads -= 1;
                return Ok(0);
            }
            if self.data.is_empty() {
                return Ok(0);
            }
            let chunk = self.data.remove(0);
            buf[..chunk.len()].copy_from_slice(&chunk);
            Ok(chunk.len())
        }
    }

    #[test]
    fn test_dump_waits_for_first_byte() {
        let source = LateSource {
            quiet_reads: 3,
            data: vec![b"\x1b*rA".to_vec(), b"\x1b*rB".to_vec()],
        };
        let mut sink = Vec::new();
        let total = dump(source, &mut sink).unwrap();
        assert_eq!(total, 8);
        assert_eq!(sink, b"\x1b*rA\x1b*rB");
    }

    #[test]
    fn test_dump_from_slice() {
        let mut sink = Vec::new();
        let total = dump(&b"raw bytes"[..], &mut sink).unwrap();
        assert_eq!(total, 9);
        assert_eq!(sink, b"raw bytes");
    }
}
