//! # Background Reader
//!
//! Runs blocking reads on their own thread and hands the chunks to whoever
//! drives the decoder, so a slow or silent line never stalls the consumer.
//!
//! ```text
//! reader thread                        consumer
//! ─────────────                        ────────
//! loop while alive:                    recv_timeout()
//!   read (≤ timeout) ──► mpsc chunk ──►   → CaptureSession::push()
//! ```
//!
//! Sources are expected to block with a timeout, as [`SerialPort`] does: a
//! read of 0 bytes means "nothing yet", not end of stream. Stopping takes
//! at most one read timeout.
//!
//! [`SerialPort`]: crate::transport::SerialPort

use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::TivuError;

/// Largest chunk handed over per read
const READ_BUFFER_SIZE: usize = 4096;

/// Result of waiting on the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Received {
    /// Bytes from the source.
    Data(Vec<u8>),
    /// Nothing arrived within the wait.
    Idle,
    /// The reader thread has stopped.
    Closed,
}

/// Handle to a reader thread.
pub struct Reader {
    receiver: Receiver<io::Result<Vec<u8>>>,
    alive: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Reader {
    /// Start reading `source` on a new thread.
    pub fn spawn<R: Read + Send + 'static>(mut source: R) -> Result<Self, TivuError> {
        let (sender, receiver) = mpsc::channel();
        let alive = Arc::new(AtomicBool::new(true));
        let thread_alive = Arc::clone(&alive);

        let handle = thread::Builder::new()
            .name("tivu-reader".to_string())
            .spawn(move || {
                let mut buf = vec![0u8; READ_BUFFER_SIZE];
                while thread_alive.load(Ordering::Acquire) {
                    match source.read(&mut buf) {
                        Ok(0) => thread::yield_now(),
                        Ok(n) => {
                            if sender.send(Ok(buf[..n].to_vec())).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => {
                            log::warn!("reader stopped: {}", e);
                            let _ = sender.send(Err(e));
                            break;
                        }
                    }
                }
                log::debug!("reader thread exiting");
            })?;

        Ok(Self {
            receiver,
            alive,
            handle: Some(handle),
        })
    }

    /// Wait up to `timeout` for the next chunk.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Received, TivuError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(Ok(data)) => Ok(Received::Data(data)),
            Ok(Err(e)) => Err(TivuError::Transport(format!("Read failed: {}", e))),
            Err(RecvTimeoutError::Timeout) => Ok(Received::Idle),
            Err(RecvTimeoutError::Disconnected) => Ok(Received::Closed),
        }
    }

    /// Whether the thread is still meant to run.
    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Ask the thread to finish and wait for it.
    pub fn stop(&mut self) {
        self.alive.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("reader thread panicked");
            }
        }
    }
}

impl Drop for Reader {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    /// Hands out scripted chunks, then behaves like a quiet serial line.
    struct ScriptedSource {
        chunks: VecDeque<io::Result<Vec<u8>>>,
    }

    impl ScriptedSource {
        fn new(chunks: Vec<io::Result<Vec<u8>>>) -> Self {
            Self {
                chunks: chunks.into(),
            }
        }
    }

    impl Read for ScriptedSource {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            match self.chunks.pop_front() {
                Some(Ok(chunk)) => {
                    buf[..chunk.len()].copy_from_slice(&chunk);
                    Ok(chunk.len())
                }
                Some(Err(e)) => Err(e),
                None => {
                    thread::sleep(Duration::from_millis(5));
                    Ok(0)
                }
            }
        }
    }

    fn collect(reader: &Reader, count: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut chunks = 0;
        while chunks < count {
            match reader.recv_timeout(Duration::from_secs(5)).unwrap() {
                Received::Data(data) => {
                    out.extend(data);
                    chunks += 1;
                }
                Received::Idle => panic!("timed out waiting for data"),
                Received::Closed => break,
            }
        }
        out
    }

    #[test]
    fn test_chunks_arrive_in_order() {
        let source = ScriptedSource::new(vec![Ok(b"\x1b*r".to_vec()), Ok(b"A".to_vec())]);
        let mut reader = Reader::spawn(source).unwrap();
        assert_eq!(collect(&reader, 2), b"\x1b*rA");
        reader.stop();
        assert!(!reader.is_alive());
    }

    #[test]
    fn test_idle_when_quiet() {
        let mut reader = Reader::spawn(ScriptedSource::new(Vec::new())).unwrap();
        assert_eq!(
            reader.recv_timeout(Duration::from_millis(20)).unwrap(),
            Received::Idle
        );
        reader.stop();
    }

    #[test]
    fn test_read_error_is_reported_then_closed() {
        let source = ScriptedSource::new(vec![
            Ok(vec![1, 2, 3]),
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "unplugged")),
        ]);
        let reader = Reader::spawn(source).unwrap();
        assert_eq!(collect(&reader, 1), vec![1, 2, 3]);
        assert!(reader.recv_timeout(Duration::from_secs(5)).is_err());
        assert_eq!(
            reader.recv_timeout(Duration::from_secs(5)).unwrap(),
            Received::Closed
        );
    }

    #[test]
    fn test_drop_stops_thread() {
        let reader = Reader::spawn(ScriptedSource::new(Vec::new())).unwrap();
        drop(reader);
    }
}
