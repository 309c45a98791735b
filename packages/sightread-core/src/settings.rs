//! # Settings
//!
//! The part of the exercise settings that generation and playback depend on.
//!
//! Settings files are YAML with kebab-case keys. Every key is optional; a
//! missing key takes the application default.
//!
//! ```yaml
//! mode: chord
//! selected-keys: [G Major, E Minor]
//! time-signature: 3/4
//! measures: 8
//! clef: bass
//! tempo: 80
//! metronome-on: true
//! show-chord-symbols: false
//! articulations: [staccato]
//! ```
//!
//! The browser sends the same structure as JSON with camelCase keys, which are
//! accepted as aliases. There `articulations` is an object,
//! `{ "enabledIds": [...], "frequencies": {...} }`; the YAML form may use
//! either that table or a bare list of enabled ids. Keys the generator does
//! not use (`lowestNote`, `chordSettings`, `rhythm`, ...) are ignored.

use crate::error::SightreadError;
use crate::types::{MeterSpec, MAX_REQUESTED_MEASURES};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Time signatures offered by the settings UI.
pub const TIME_SIGNATURES: [&str; 5] = ["4/4", "3/4", "2/4", "6/8", "2/2"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GeneratorMode {
    #[default]
    #[serde(alias = "Melody")]
    Melody,
    #[serde(alias = "Interval")]
    Interval,
    #[serde(alias = "Chord")]
    Chord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Clef {
    #[default]
    Treble,
    Bass,
    Alto,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct Settings {
    pub mode: GeneratorMode,
    #[serde(alias = "selectedKeys")]
    pub selected_keys: Vec<String>,
    #[serde(alias = "timeSignature")]
    pub time_signature: String,
    pub measures: u32,
    pub clef: Clef,
    pub tempo: u32,
    #[serde(alias = "metronomeOn")]
    pub metronome_on: bool,
    #[serde(alias = "showChordSymbols")]
    pub show_chord_symbols: bool,
    pub articulations: Articulations,
}

/// Articulations the generator may write, with their relative frequency in
/// percent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(from = "ArticulationsInput", rename_all = "kebab-case")]
pub struct Articulations {
    /// Enabled articulation ids, e.g. `staccato`, `accent`.
    pub enabled_ids: Vec<String>,
    pub frequencies: BTreeMap<String, u32>,
}

impl Articulations {
    pub fn enabled<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            enabled_ids: ids.into_iter().map(Into::into).collect(),
            frequencies: BTreeMap::new(),
        }
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        self.enabled_ids.iter().any(|a| a == id)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ArticulationsInput {
    List(Vec<String>),
    Table(ArticulationTable),
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
struct ArticulationTable {
    #[serde(alias = "enabledIds")]
    enabled_ids: Vec<String>,
    frequencies: BTreeMap<String, u32>,
}

impl From<ArticulationsInput> for Articulations {
    fn from(input: ArticulationsInput) -> Self {
        match input {
            ArticulationsInput::List(enabled_ids) => Self {
                enabled_ids,
                frequencies: BTreeMap::new(),
            },
            ArticulationsInput::Table(table) => Self {
                enabled_ids: table.enabled_ids,
                frequencies: table.frequencies,
            },
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: GeneratorMode::Melody,
            selected_keys: vec!["C Major".to_string(), "A Minor".to_string()],
            time_signature: "4/4".to_string(),
            measures: 4,
            clef: Clef::Treble,
            tempo: 60,
            metronome_on: false,
            show_chord_symbols: true,
            articulations: Articulations::default(),
        }
    }
}

impl Settings {
    /// Parse and validate settings from YAML.
    pub fn from_yaml(content: &str) -> Result<Self, SightreadError> {
        let settings: Settings = serde_yaml::from_str(content)
            .map_err(|e| SightreadError::SettingsError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parse and validate settings from JSON (as sent by the browser).
    pub fn from_json(content: &str) -> Result<Self, SightreadError> {
        let settings: Settings = serde_json::from_str(content)
            .map_err(|e| SightreadError::SettingsError(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SightreadError> {
        if self.measures == 0 {
            return Err(SightreadError::SettingsError(
                "measures must be at least 1".to_string(),
            ));
        }
        if self.measures > MAX_REQUESTED_MEASURES {
            return Err(SightreadError::SettingsError(format!(
                "measures must be at most {}, got {}",
                MAX_REQUESTED_MEASURES, self.measures
            )));
        }
        if self.tempo == 0 {
            return Err(SightreadError::SettingsError(
                "tempo must be at least 1".to_string(),
            ));
        }
        if MeterSpec::from_token(&self.time_signature).is_none() {
            return Err(SightreadError::SettingsError(format!(
                "time-signature must be in format N/D, C or C|, got '{}'",
                self.time_signature
            )));
        }
        Ok(())
    }

    /// The time signature the user asked for, or 4/4 if it cannot be read.
    pub fn requested_meter(&self) -> MeterSpec {
        MeterSpec::from_token(&self.time_signature).unwrap_or_else(|| {
            debug!(
                "Unreadable time signature '{}' in settings, using 4/4",
                self.time_signature
            );
            MeterSpec::default()
        })
    }

    pub fn has_articulation(&self, id: &str) -> bool {
        self.articulations.is_enabled(id)
    }
}
