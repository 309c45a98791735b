//! # Error Types
//!
//! The metronome synthesizer itself never fails: every anomaly in the notation
//! text is replaced by a fallback value. Errors only exist at the edges of the
//! library, where outside data is loaded:
//! - `SettingsError` - settings YAML/JSON that cannot be read or is out of range
//! - `ResponseError` - a generative-service reply without usable notation
//! - `SourceError` - a notation source that could not produce an exercise
//!
//! ## Usage
//! ```rust
//! use sightread::{Settings, SightreadError};
//!
//! match Settings::from_yaml("measures: 0") {
//!     Ok(_) => unreachable!(),
//!     Err(SightreadError::SettingsError(message)) => {
//!         eprintln!("Bad settings: {}", message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SightreadError {
    /// Invalid settings.
    ///
    /// # Example
    /// ```
    /// # use sightread::SightreadError;
    /// let err = SightreadError::SettingsError("measures must be at least 1".to_string());
    /// assert_eq!(err.to_string(), "Invalid settings: measures must be at least 1");
    /// ```
    #[error("Invalid settings: {0}")]
    SettingsError(String),

    /// The generative service replied, but the reply holds no notation.
    #[error("Invalid response: {0}")]
    ResponseError(String),

    /// A notation source failed to produce an exercise.
    ///
    /// # Example
    /// ```
    /// # use sightread::SightreadError;
    /// let err = SightreadError::SourceError {
    ///     source_name: "recorded".to_string(),
    ///     message: "Empty response".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Notation source 'recorded' failed: Empty response");
    /// ```
    #[error("Notation source '{source_name}' failed: {message}")]
    SourceError {
        source_name: String,
        message: String,
    },
}
