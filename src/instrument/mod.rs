//! # Instrument Module
//!
//! Profiles for the test instruments whose printouts tivu has been used with.
//!
//! ## Modules
//!
//! - [`config`]: Instrument profiles

pub mod config;

pub use config::InstrumentProfile;
