//! # Serial Transport
//!
//! Receives printer output from an instrument's RS-232 printer port.
//!
//! ## Wiring
//!
//! The instrument believes it is talking to a printer. Connect its serial
//! printer port to the host with a null-modem cable (or a USB adapter), set
//! the instrument's printer to PCL/"HP LaserJet" mode, and match the speed
//! on both ends:
//!
//! ```bash
//! $ tivu ports
//! /dev/ttyS0
//! /dev/ttyUSB0
//! $ tivu capture --device /dev/ttyUSB0 --baud 9600
//! ```
//!
//! ## TTY Configuration
//!
//! The device is opened read-only in raw mode so binary raster data reaches
//! the decoder untouched:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR,
//!   ICRNL cleared
//! - **No software flow control**: IXON, IXOFF, IXANY cleared, since 0x11
//!   and 0x13 occur in raster rows
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**: ICANON, ECHO, ECHONL, ISIG, IEXTEN cleared
//!
//! ## Read Timeout
//!
//! `VMIN = 0` and `VTIME = timeout` make every read wait at most the
//! configured timeout. A read that times out returns `Ok(0)`; it does not
//! mean the line is closed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::TivuError;

/// Default serial device path
pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";

/// Default line speed (the instruments' factory setting)
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Default per-read timeout
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Line speeds instruments of this era offer for their printer port.
pub const SUPPORTED_BAUD_RATES: &[u32] = &[300, 600, 1200, 2400, 4800, 9600, 19200, 38400, 57600];

/// # Serial Line Configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0`
    pub device: PathBuf,

    /// Line speed in baud
    pub baud_rate: u32,

    /// Longest a single read may wait for data
    pub read_timeout: Duration,
}

impl SerialConfig {
    pub fn new<P: Into<PathBuf>>(device: P) -> Self {
        Self {
            device: device.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_read_timeout(mut self, read_timeout: Duration) -> Self {
        self.read_timeout = read_timeout;
        self
    }

    /// Check the speed is one the port can be set to.
    pub fn validate(&self) -> Result<(), TivuError> {
        if !SUPPORTED_BAUD_RATES.contains(&self.baud_rate) {
            return Err(TivuError::Config(format!(
                "Unsupported baud rate {}. Supported: {:?}",
                self.baud_rate, SUPPORTED_BAUD_RATES
            )));
        }
        if self.read_timeout.is_zero() {
            return Err(TivuError::Config(
                "Read timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Read timeout in the tenths of a second termios counts in, clamped to
    /// what `VTIME` can hold.
    fn vtime(&self) -> u8 {
        let tenths = self.read_timeout.as_millis().div_ceil(100);
        tenths.clamp(1, u8::MAX as u128) as u8
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from(DEFAULT_DEVICE),
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// # Serial Port
///
/// A raw, read-only TTY that hands out whatever bytes the instrument sent.
///
/// ## Example
///
/// ```no_run
/// use std::io::Read;
/// use tivu::transport::{SerialConfig, SerialPort};
///
/// let mut port = SerialPort::open(&SerialConfig::new("/dev/ttyUSB0"))?;
/// let mut buf = [0u8; 1024];
/// let n = port.read(&mut buf)?; // 0 after a quiet second
///
/// # Ok::<(), tivu::error::TivuError>(())
/// ```
pub struct SerialPort {
    file: File,
    device: PathBuf,
}

impl SerialPort {
    /// Open and configure the device.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The baud rate or timeout is invalid
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout group)
    /// - The device is not a TTY
    pub fn open(config: &SerialConfig) -> Result<Self, TivuError> {
        config.validate()?;
        let path = config.device.as_path();

        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_NOCTTY)
            .open(path)
            .map_err(|e| {
                TivuError::Transport(format!("Failed to open {}: {}", path.display(), e))
            })?;

        configure_tty_raw(file.as_raw_fd(), config)?;
        log::info!("opened {} at {} baud", path.display(), config.baud_rate);

        Ok(Self {
            file,
            device: path.to_path_buf(),
        })
    }

    pub fn device(&self) -> &Path {
        &self.device
    }
}

impl Read for SerialPort {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

/// Map a baud rate to its termios speed constant.
#[cfg(unix)]
fn speed_constant(baud_rate: u32) -> Option<libc::speed_t> {
    let speed = match baud_rate {
        300 => libc::B300,
        600 => libc::B600,
        1200 => libc::B1200,
        2400 => libc::B2400,
        4800 => libc::B4800,
        9600 => libc::B9600,
        19200 => libc::B19200,
        38400 => libc::B38400,
        57600 => libc::B57600,
        _ => return None,
    };
    Some(speed)
}

/// Put a file descriptor in raw 8N1 mode at the configured speed, with
/// blocking-with-timeout reads.
#[cfg(unix)]
fn configure_tty_raw(fd: i32, config: &SerialConfig) -> Result<(), TivuError> {
    use std::mem::MaybeUninit;

    let speed = speed_constant(config.baud_rate).ok_or_else(|| {
        TivuError::Config(format!("Unsupported baud rate {}", config.baud_rate))
    })?;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(TivuError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);

    termios.c_oflag &= !libc::OPOST;

    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);

    // 8N1, receiver on, ignore modem control lines
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB | libc::CSTOPB);
    termios.c_cflag |= libc::CS8 | libc::CREAD | libc::CLOCAL;

    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = config.vtime();

    let input = unsafe { libc::cfsetispeed(&mut termios, speed) };
    let output = unsafe { libc::cfsetospeed(&mut termios, speed) };
    if input != 0 || output != 0 {
        return Err(TivuError::Transport(format!(
            "cfsetspeed failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(TivuError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    // Drop anything that arrived before we were listening
    unsafe { libc::tcflush(fd, libc::TCIFLUSH) };

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_fd: i32, _config: &SerialConfig) -> Result<(), TivuError> {
    Ok(())
}

// ============================================================================
// PORT DISCOVERY
// ============================================================================

/// Whether a `/dev` entry name looks like a serial port (`tty` followed by
/// an upper-case letter: `ttyS0`, `ttyUSB0`, `ttyACM0`).
pub fn is_serial_device_name(name: &str) -> bool {
    name.strip_prefix("tty")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_ascii_uppercase())
}

/// List candidate serial devices in `/dev`, sorted by path.
pub fn list_ports() -> Result<Vec<PathBuf>, TivuError> {
    list_ports_in(Path::new("/dev"))
}

/// List candidate serial devices in `dir`, sorted by path.
pub fn list_ports_in(dir: &Path) -> Result<Vec<PathBuf>, TivuError> {
    let mut ports: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| is_serial_device_name(&entry.file_name().to_string_lossy()))
        .map(|entry| entry.path())
        .collect();
    ports.sort();
    Ok(ports)
}

/// Candidate ports that can actually be opened by this user.
///
/// Opens each device non-blocking so a port waiting on carrier detect
/// doesn't hang the scan.
pub fn available_ports() -> Result<Vec<PathBuf>, TivuError> {
    let ports = list_ports()?
        .into_iter()
        .filter(|path| {
            let opened = OpenOptions::new()
                .read(true)
                .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK)
                .open(path);
            match opened {
                Ok(file) => unsafe { libc::isatty(file.as_raw_fd()) == 1 },
                Err(e) => {
                    log::debug!("skipping {}: {}", path.display(), e);
                    false
                }
            }
        })
        .collect();
    Ok(ports)
}

// ============================================================================
// TESTS
// ============================================================================
