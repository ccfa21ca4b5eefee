//! # Tivu CLI
//!
//! Command-line front end for capturing instrument screen dumps.
//!
//! ## Usage
//!
//! ```bash
//! # Decode a recorded dump and save it as PNG
//! tivu decode dump-pcl-8752.txt --output screen.png
//!
//! # Wait for the instrument's print button, save every dump
//! tivu capture --device /dev/ttyUSB0 --instrument e8285a --output-dir shots
//!
//! # Record raw bytes for later replay
//! tivu dump --device /dev/ttyUSB0 raw.pcl
//!
//! # List serial ports and known instruments
//! tivu ports
//! tivu instruments
//! ```

use clap::{Parser, Subcommand};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tivu::{
    TivuError,
    capture::{self, CaptureEvent, CaptureSession, Reader, Received},
    export::{self, ExportFormat, ImageSummary},
    instrument::InstrumentProfile,
    pcl::Image,
    transport::{SerialConfig, SerialPort, serial},
};

/// How long the capture loop waits on the reader before checking again
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Tivu - Test instrument viewer
#[derive(Parser, Debug)]
#[command(name = "tivu")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a recorded PCL dump file
    Decode {
        /// File containing raw instrument output
        file: PathBuf,

        /// Save the decoded image here
        #[arg(long, short, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Image format (defaults to the output extension, then png)
        #[arg(long)]
        format: Option<ExportFormat>,

        /// Bytes fed to the decoder per read
        #[arg(long, default_value_t = capture::REPLAY_CHUNK_SIZE)]
        chunk_size: usize,

        /// Print image dimensions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Capture screen dumps from a serial port
    Capture {
        /// Serial device path
        #[arg(long, default_value = serial::DEFAULT_DEVICE)]
        device: PathBuf,

        /// Line speed (defaults to the instrument's)
        #[arg(long)]
        baud: Option<u32>,

        /// Per-read timeout in milliseconds
        #[arg(long, default_value = "1000")]
        timeout_ms: u64,

        /// Instrument profile (see `tivu instruments`)
        #[arg(long, default_value = "e8285a")]
        instrument: String,

        /// Directory for saved captures
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,

        /// Image format for saved captures
        #[arg(long, default_value = "png")]
        format: ExportFormat,

        /// Exit after the first completed capture
        #[arg(long)]
        once: bool,
    },

    /// Record raw bytes from a serial port to a file
    Dump {
        /// Output file
        file: PathBuf,

        /// Serial device path
        #[arg(long, default_value = serial::DEFAULT_DEVICE)]
        device: PathBuf,

        /// Line speed
        #[arg(long, default_value_t = serial::DEFAULT_BAUD_RATE)]
        baud: u32,

        /// Silence in milliseconds that ends the recording
        #[arg(long, default_value = "10000")]
        timeout_ms: u64,
    },

    /// List serial ports
    Ports {
        /// Include ports that cannot be opened
        #[arg(long)]
        all: bool,
    },

    /// List known instrument profiles
    Instruments {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli.command) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(command: Commands) -> Result<(), TivuError> {
    match command {
        Commands::Decode {
            file,
            output,
            format,
            chunk_size,
            json,
        } => decode(&file, output.as_deref(), format, chunk_size, json),

        Commands::Capture {
            device,
            baud,
            timeout_ms,
            instrument,
            output_dir,
            format,
            once,
        } => {
            let profile = InstrumentProfile::parse(&instrument).map_err(TivuError::Config)?;
            let config = SerialConfig::new(device)
                .with_baud_rate(baud.unwrap_or(profile.default_baud_rate))
                .with_read_timeout(Duration::from_millis(timeout_ms));
            capture_loop(&config, profile, &output_dir, format, once)
        }

        Commands::Dump {
            file,
            device,
            baud,
            timeout_ms,
        } => {
            let config = SerialConfig::new(device)
                .with_baud_rate(baud)
                .with_read_timeout(Duration::from_millis(timeout_ms));
            let port = SerialPort::open(&config)?;
            let sink = BufWriter::new(File::create(&file)?);

            println!("Waiting for data on {}...", port.device().display());
            let total = capture::dump(port, sink)?;
            println!("Wrote {} bytes to {}", total, file.display());
            Ok(())
        }

        Commands::Ports { all } => {
            let ports = if all {
                serial::list_ports()?
            } else {
                serial::available_ports()?
            };
            if ports.is_empty() {
                println!("No serial ports found");
            }
            for port in ports {
                println!("{}", port.display());
            }
            Ok(())
        }

        Commands::Instruments { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(InstrumentProfile::ALL)?);
                return Ok(());
            }
            for profile in InstrumentProfile::ALL {
                let rows = profile
                    .expected_rows
                    .map_or_else(|| "varies".to_string(), |r| r.to_string());
                println!(
                    "  {:<10} {:<24} rows: {:<7} baud: {}",
                    profile.key, profile.name, rows, profile.default_baud_rate
                );
            }
            Ok(())
        }
    }
}

/// Replay a recorded dump, report its size and optionally save it
fn decode(
    file: &Path,
    output: Option<&Path>,
    format: Option<ExportFormat>,
    chunk_size: usize,
    json: bool,
) -> Result<(), TivuError> {
    let image = capture::replay_file_with_chunk_size(file, chunk_size)?;
    let summary = ImageSummary::of(&image);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Image size: {}x{}", summary.width, summary.height);
        if !summary.uniform {
            println!("Warning: rows have different lengths");
        }
    }

    if let Some(output) = output {
        let format = format
            .or_else(|| ExportFormat::from_path(output))
            .unwrap_or_default();
        let written = export::save(&image, output, format)?;
        println!("Saved to {}", written.display());
    }

    Ok(())
}

/// Read from the port until interrupted, saving each completed dump
fn capture_loop(
    config: &SerialConfig,
    profile: InstrumentProfile,
    output_dir: &Path,
    format: ExportFormat,
    once: bool,
) -> Result<(), TivuError> {
    fs::create_dir_all(output_dir)?;

    let port = SerialPort::open(config)?;
    println!(
        "Waiting for {} on {} ({} baud)...",
        profile.name,
        port.device().display(),
        config.baud_rate
    );

    let mut reader = Reader::spawn(port)?;
    let mut session = CaptureSession::new(profile);

    loop {
        let chunk = match reader.recv_timeout(POLL_INTERVAL)? {
            Received::Data(chunk) => chunk,
            Received::Idle => continue,
            Received::Closed => {
                return Err(TivuError::Transport("Serial reader stopped".to_string()));
            }
        };

        for event in session.push(&chunk) {
            match event {
                CaptureEvent::Started => println!("Receiving data from instrument..."),
                CaptureEvent::Progress { rows, expected } => {
                    print_progress(rows, expected, session.profile())
                }
                CaptureEvent::Completed(image) => {
                    println!();
                    if save_capture(&image, output_dir, format)? && once {
                        reader.stop();
                        return Ok(());
                    }
                }
            }
        }
    }
}

fn print_progress(rows: usize, expected: Option<usize>, profile: &InstrumentProfile) {
    match (expected, profile.progress(rows)) {
        (Some(expected), Some(fraction)) => {
            print!("\r  {}/{} rows ({:.0}%)", rows, expected, fraction * 100.0)
        }
        _ => print!("\r  {} rows", rows),
    }
    let _ = io::stdout().flush();
}

/// Save one completed capture. Returns false if there was nothing to save.
fn save_capture(image: &Image, output_dir: &Path, format: ExportFormat) -> Result<bool, TivuError> {
    if image.is_empty() {
        log::warn!("graphics block ended without any rows");
        return Ok(false);
    }

    let name = export::capture_file_name(&chrono::Local::now().naive_local());
    let written = export::save(image, &output_dir.join(name), format)?;
    println!(
        "Saved {}x{} capture to {}",
        image.width_pixels(),
        image.height(),
        written.display()
    );
    Ok(true)
}
