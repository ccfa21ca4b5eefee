//! # Instrument Profiles
//!
//! Known instruments that print PCL raster screen dumps over RS-232.
//!
//! | Model | Rows per dump | Default speed |
//! |-------|---------------|---------------|
//! | HP E8285A | 276 | 9600 baud |
//! | HP 8752A | varies | 9600 baud |
//!
//! The row count is only used to scale progress reporting while a capture
//! is running. Decoding never depends on it.
//!
//! ## Usage
//!
//! ```
//! use tivu::instrument::InstrumentProfile;
//!
//! let profile = InstrumentProfile::parse("e8285a").unwrap();
//! assert_eq!(profile.expected_rows, Some(276));
//! ```

use serde::Serialize;

/// # Instrument Profile
///
/// Describes what a screen dump from one instrument model looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InstrumentProfile {
    /// Short identifier used on the command line
    pub key: &'static str,

    /// Instrument model name
    pub name: &'static str,

    /// Number of raster rows in one screen dump, if fixed
    pub expected_rows: Option<usize>,

    /// Serial speed the instrument uses out of the box
    pub default_baud_rate: u32,
}

impl InstrumentProfile {
    /// # HP/Agilent E8285A CDMA Mobile Station Test Set
    pub const HP_E8285A: Self = Self {
        key: "e8285a",
        name: "HP E8285A",
        expected_rows: Some(276),
        default_baud_rate: 9600,
    };

    /// # HP 8752A Network Analyzer
    pub const HP_8752A: Self = Self {
        key: "8752a",
        name: "HP 8752A",
        expected_rows: None,
        default_baud_rate: 9600,
    };

    /// Profile for an instrument not in the list.
    pub const GENERIC: Self = Self {
        key: "generic",
        name: "Generic PCL instrument",
        expected_rows: None,
        default_baud_rate: 9600,
    };

    /// All built-in profiles.
    pub const ALL: &'static [Self] = &[Self::HP_E8285A, Self::HP_8752A, Self::GENERIC];

    /// Look up a profile by key or model name, case-insensitively.
    pub fn parse(s: &str) -> Result<Self, String> {
        Self::ALL
            .iter()
            .find(|p| p.key.eq_ignore_ascii_case(s) || p.name.eq_ignore_ascii_case(s))
            .copied()
            .ok_or_else(|| {
                let keys: Vec<&str> = Self::ALL.iter().map(|p| p.key).collect();
                format!("Unknown instrument '{}'. Known: {}", s, keys.join(", "))
            })
    }

    /// Progress through a dump as a fraction in `0.0..=1.0`, if the row
    /// count is known.
    pub fn progress(&self, rows: usize) -> Option<f32> {
        self.expected_rows
            .filter(|&expected| expected > 0)
            .map(|expected| (rows as f32 / expected as f32).min(1.0))
    }
}

impl Default for InstrumentProfile {
    fn default() -> Self {
        Self::HP_E8285A
    }
}

// ============================================================================
// TESTS
// ============================================================================
