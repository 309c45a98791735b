//! # Notation Sources
//!
//! Where exercise notation comes from. The metronome code only ever sees the
//! resulting string.
//!
//! - [`FallbackSource`] - deterministic offline exercises
//! - [`RecordedResponse`] - a saved reply from the generative service
//! - [`generate_or_fallback`] - try a source, fall back to offline on failure
//!
//! ## Service Replies
//! The generative service is asked for JSON of the form `{"abc": "X:1\n..."}`,
//! but replies are sometimes wrapped in markdown code fences.
//! [`decode_response`] strips those before parsing.

use crate::error::SightreadError;
use crate::settings::{Clef, GeneratorMode, Settings};
use log::warn;
use serde::Deserialize;

pub trait NotationSource {
    /// Short name used in error messages and logs.
    fn name(&self) -> &str;

    fn generate(&self, settings: &Settings) -> Result<String, SightreadError>;
}

/// Offline exercise generator.
///
/// The key is picked from the selected keys by `key_index` (wrapping), so the
/// same settings and index always produce the same exercise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FallbackSource {
    pub key_index: usize,
}

impl FallbackSource {
    pub fn new(key_index: usize) -> Self {
        Self { key_index }
    }

    /// Always succeeds.
    ///
    /// # Example
    /// ```
    /// use sightread::{FallbackSource, Settings};
    ///
    /// let abc = FallbackSource::new(1).notation(&Settings::default());
    /// assert!(abc.starts_with("X:1\n"));
    /// assert!(abc.contains("\nK:Am clef=treble\n"));
    /// ```
    pub fn notation(&self, settings: &Settings) -> String {
        let key = abc_key(self.active_key(settings));
        let clef = match settings.clef {
            Clef::Bass => "bass",
            Clef::Treble | Clef::Alto => "treble",
        };

        let notes = match settings.mode {
            GeneratorMode::Interval => {
                "| [C4E4] [D4F4] [E4G4] [F4A4] | [G4B4] [A4c5] [B4d5] [c5e5] |".to_string()
            }
            GeneratorMode::Chord => chord_body(settings),
            GeneratorMode::Melody => melody_body(settings),
        };

        format!(
            "X:1\nT: Generated Exercise (Offline Mode)\nM:{}\nL:1/4\nQ:1/4={}\nK:{} clef={}\n{}",
            settings.time_signature, settings.tempo, key, clef, notes
        )
    }

    fn active_key<'a>(&self, settings: &'a Settings) -> &'a str {
        if settings.selected_keys.is_empty() {
            return "C Major";
        }
        &settings.selected_keys[self.key_index % settings.selected_keys.len()]
    }
}

impl NotationSource for FallbackSource {
    fn name(&self) -> &str {
        "offline"
    }

    fn generate(&self, settings: &Settings) -> Result<String, SightreadError> {
        Ok(self.notation(settings))
    }
}

/// "C Major" → "C", "A Minor" → "Am", "F# Minor" → "F#m"
fn abc_key(key: &str) -> String {
    key.replace(" Major", "").replace(" Minor", "m")
}

fn chord_body(settings: &Settings) -> String {
    let symbols = ["\"C\"", "\"Dm\"", "\"G7\"", "\"C\""];
    let chords = ["[C4E4G4]", "[D4F4A4]", "[G4B4d4]", "[C4E4G4]"];

    let measure = symbols
        .iter()
        .zip(chords)
        .map(|(symbol, chord)| {
            if settings.show_chord_symbols {
                format!("{}{}", symbol, chord)
            } else {
                chord.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    if settings.measures > 2 {
        format!("| {} | {} |", measure, measure)
    } else {
        format!("| {} |", measure)
    }
}

fn melody_body(settings: &Settings) -> String {
    let articulation = if settings.has_articulation("staccato") { "." } else { "" };
    let bar = |notes: [&str; 4]| {
        notes
            .iter()
            .map(|n| format!("{}{}", articulation, n))
            .collect::<Vec<_>>()
            .join(" ")
    };
    format!(
        "| {} | {} |",
        bar(["C4", "D4", "E4", "F4"]),
        bar(["G4", "A4", "B4", "c4"])
    )
}

/// A reply from the generative service captured earlier, e.g. read from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedResponse {
    pub text: String,
}

impl RecordedResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl NotationSource for RecordedResponse {
    fn name(&self) -> &str {
        "recorded"
    }

    fn generate(&self, _settings: &Settings) -> Result<String, SightreadError> {
        decode_response(&self.text).map_err(|e| SightreadError::SourceError {
            source_name: self.name().to_string(),
            message: e.to_string(),
        })
    }
}

#[derive(Deserialize)]
struct ResponseEnvelope {
    abc: String,
}

/// Pull the notation out of a generative-service reply.
///
/// # Example
/// ```
/// use sightread::decode_response;
///
/// let reply = "```json\n{\"abc\": \"X:1\\nK:C\\nCDEF|\"}\n```";
/// assert_eq!(decode_response(reply).unwrap(), "X:1\nK:C\nCDEF|");
/// ```
pub fn decode_response(text: &str) -> Result<String, SightreadError> {
    let cleaned = text.replace("```json", "").replace("```", "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Err(SightreadError::ResponseError("Empty response".to_string()));
    }

    let envelope: ResponseEnvelope = serde_json::from_str(cleaned)
        .map_err(|e| SightreadError::ResponseError(e.to_string()))?;

    if envelope.abc.trim().is_empty() {
        return Err(SightreadError::ResponseError(
            "Response contains no notation".to_string(),
        ));
    }
    Ok(envelope.abc)
}

/// Generate with `source`, or with `fallback` if that fails.
pub fn generate_or_fallback(
    source: &dyn NotationSource,
    fallback: &FallbackSource,
    settings: &Settings,
) -> String {
    match source.generate(settings) {
        Ok(notation) => notation,
        Err(e) => {
            warn!("{}; using {} exercise", e, fallback.name());
            fallback.notation(settings)
        }
    }
}
