//! # Error Types
//!
//! All fallible operations in the crate return [`StaffError`].
//!
//! ## Error Types
//! - `UnknownPitch` - A pitch label outside the 14-entry table (strict policy only)
//! - `ConfigError` - Invalid YAML configuration or out-of-range settings
//! - `Io` - Reading a request or writing the exported file failed
//! - `ExportFailed` - The export could not be produced; shown to the user generically
//!
//! ## Usage
//! ```rust
//! use staffmidi::{labels_to_midi_bytes, LabelPolicy, StaffError};
//!
//! match labels_to_midi_bytes(&["c/4", "z/9"], LabelPolicy::Strict) {
//!     Ok(bytes) => println!("{} bytes", bytes.len()),
//!     Err(StaffError::UnknownPitch(label)) => eprintln!("no such pitch: {}", label),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StaffError {
    /// A pitch label that is not one of the 14 staff pitches.
    ///
    /// # Example
    /// ```
    /// # use staffmidi::StaffError;
    /// let err = StaffError::UnknownPitch("z/9".to_string());
    /// assert_eq!(err.to_string(), "Unknown pitch label 'z/9'");
    /// ```
    #[error("Unknown pitch label '{0}'")]
    UnknownPitch(String),

    /// Invalid configuration.
    ///
    /// Occurs when the YAML file does not parse or holds unusable values
    /// (zero row height, unknown row labels, negative gains).
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The MIDI file could not be produced.
    #[error("Export failed: {0}")]
    ExportFailed(String),
}
