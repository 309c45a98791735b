//! # Metronome Voice
//!
//! Builds the percussion voice that is appended to generated notation before
//! it is handed to the synthesizer for playback.
//!
//! ## Pipeline
//! 1. [`parse_meter`] and [`parse_unit_length`] read the header
//! 2. [`compute_click_plan`] picks the click pattern
//! 3. [`count_measures`] sizes the voice
//! 4. [`emit_metronome_track`] writes the voice block
//!
//! ## Output Shape
//! ```text
//! <original notation, untouched>
//! V:Metronome clef=perc
//! %%MIDI channel 10
//! L:1/8
//! | !f!e2 !p!f2 !p!f2 !p!f2 | !f!e2 !p!f2 !p!f2 !p!f2 | ... |
//! ```
//!
//! The voice is recomputed on every call. The main voice may have been
//! regenerated, or the toggle flipped, between two playbacks.

use crate::measures::count_measures;
use crate::meter::{compute_click_plan, parse_meter, parse_unit_length};
use crate::settings::Settings;
use crate::types::*;

/// Voice identifier of the metronome track.
pub const METRONOME_VOICE: &str = "Metronome";

/// General MIDI percussion channel.
pub const PERCUSSION_CHANNEL: u8 = 10;

/// First click of each measure.
pub const STRONG_CLICK: &str = "!f!e";

/// Remaining clicks of each measure.
pub const WEAK_CLICK: &str = "!p!f";

const MEASURES_PER_LINE: usize = 4;

/// Analyse notation text without writing anything.
///
/// # Example
/// ```
/// use sightread::{plan_metronome, MeterSpec};
///
/// let abc = "X:1\nM:6/8\nL:1/8\nK:G\n| GAB cBA | G3 D3 |\n";
/// let plan = plan_metronome(abc, 2, MeterSpec::default());
///
/// assert!(plan.clicks.is_compound);
/// assert_eq!(plan.clicks.clicks_per_measure, 2);
/// assert_eq!(plan.measures.total_bars, 5);
/// ```
pub fn plan_metronome(
    notation: &str,
    requested_measures: usize,
    requested_meter: MeterSpec,
) -> MetronomePlan {
    let meter = parse_meter(notation, requested_meter);
    let unit_length = parse_unit_length(notation);
    let clicks = compute_click_plan(*meter.value(), *unit_length.value());
    let measures = count_measures(notation, requested_measures);

    MetronomePlan {
        meter,
        unit_length,
        clicks,
        measures,
    }
}

/// One measure of clicks: a strong click followed by weak ones.
fn click_measure(clicks: &ClickPlan) -> String {
    let duration = clicks.duration_in_units.to_string();
    (0..clicks.clicks_per_measure)
        .map(|i| {
            let click = if i == 0 { STRONG_CLICK } else { WEAK_CLICK };
            format!("{}{}", click, duration)
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Write the metronome voice block: voice declaration, percussion channel,
/// unit length, then `total_bars` measures of clicks.
///
/// # Example
/// ```
/// use sightread::{emit_metronome_track, ClickDuration, ClickPlan, UnitLength};
///
/// let clicks = ClickPlan {
///     clicks_per_measure: 3,
///     is_compound: false,
///     duration_in_units: ClickDuration::ONE,
/// };
/// let track = emit_metronome_track(&clicks, UnitLength::new(4).unwrap(), 2);
///
/// assert_eq!(
///     track,
///     "V:Metronome clef=perc\n%%MIDI channel 10\nL:1/4\n| !f!e !p!f !p!f | !f!e !p!f !p!f |\n"
/// );
/// ```
pub fn emit_metronome_track(clicks: &ClickPlan, unit: UnitLength, total_bars: usize) -> String {
    let mut track = String::new();
    track.push_str(&format!("V:{} clef=perc\n", METRONOME_VOICE));
    track.push_str(&format!("%%MIDI channel {}\n", PERCUSSION_CHANNEL));
    track.push_str(&format!("L:{}\n", unit));

    let measure = click_measure(clicks);
    let mut remaining = total_bars;
    while remaining > 0 {
        let on_line = remaining.min(MEASURES_PER_LINE);
        track.push('|');
        for _ in 0..on_line {
            track.push(' ');
            track.push_str(&measure);
            track.push_str(" |");
        }
        track.push('\n');
        remaining -= on_line;
    }

    track
}

/// Append a metronome voice to generated notation.
///
/// With `metronome_on == false` the notation comes back unchanged. Otherwise
/// the original text is kept byte for byte and the metronome voice follows it.
///
/// # Example
/// ```
/// use sightread::{inject_metronome, MeterSpec};
///
/// let abc = "X:1\nM:3/4\nL:1/4\nK:F\n| F A c | f3 |";
///
/// assert_eq!(inject_metronome(abc, false, 2, MeterSpec::default()), abc);
///
/// let with_clicks = inject_metronome(abc, true, 2, MeterSpec::default());
/// assert!(with_clicks.starts_with(abc));
/// assert!(with_clicks.contains("V:Metronome clef=perc"));
/// ```
pub fn inject_metronome(
    notation: &str,
    metronome_on: bool,
    requested_measures: usize,
    requested_meter: MeterSpec,
) -> String {
    if !metronome_on {
        return notation.to_string();
    }

    let plan = plan_metronome(notation, requested_measures, requested_meter);
    let track = emit_metronome_track(
        &plan.clicks,
        *plan.unit_length.value(),
        plan.measures.total_bars,
    );

    let mut combined = String::with_capacity(notation.len() + track.len() + 1);
    combined.push_str(notation);
    if !notation.is_empty() && !notation.ends_with('\n') {
        combined.push('\n');
    }
    combined.push_str(&track);
    combined
}

/// [`inject_metronome`] driven by the playback settings.
pub fn inject_metronome_with_settings(notation: &str, settings: &Settings) -> String {
    inject_metronome(
        notation,
        settings.metronome_on,
        settings.measures as usize,
        settings.requested_meter(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(clicks_per_measure: u32, duration_in_units: ClickDuration) -> ClickPlan {
        ClickPlan {
            clicks_per_measure,
            is_compound: false,
            duration_in_units,
        }
    }

    #[test]
    fn test_click_measure_accents() {
        let measure = click_measure(&plan(4, ClickDuration::whole(2).unwrap()));
        assert_eq!(measure, "!f!e2 !p!f2 !p!f2 !p!f2");
    }

    #[test]
    fn test_click_measure_fractional_duration() {
        let measure = click_measure(&plan(2, ClickDuration::new(3, 2).unwrap()));
        assert_eq!(measure, "!f!e3/2 !p!f3/2");
    }

    #[test]
    fn test_single_click_measure() {
        assert_eq!(click_measure(&plan(1, ClickDuration::ONE)), "!f!e");
    }

    #[test]
    fn test_track_wraps_lines() {
        let track = emit_metronome_track(&plan(1, ClickDuration::ONE), UnitLength::default(), 6);
        let body: Vec<_> = track.lines().skip(3).collect();
        assert_eq!(
            body,
            vec!["| !f!e | !f!e | !f!e | !f!e |", "| !f!e | !f!e |"]
        );
    }

    #[test]
    fn test_track_header_uses_unit() {
        let track = emit_metronome_track(&plan(2, ClickDuration::ONE), UnitLength::new(16).unwrap(), 1);
        assert!(track.starts_with("V:Metronome clef=perc\n%%MIDI channel 10\nL:1/16\n"));
    }

    #[test]
    fn test_identity_when_disabled() {
        for abc in ["", "X:1\nK:C\n| C |", "no headers at all"] {
            assert_eq!(inject_metronome(abc, false, 4, MeterSpec::default()), abc);
        }
    }

    #[test]
    fn test_separator_newline_only_when_needed() {
        let with_newline = inject_metronome("K:C\n| C |\n", true, 1, MeterSpec::default());
        assert!(with_newline.starts_with("K:C\n| C |\nV:Metronome"));

        let without_newline = inject_metronome("K:C\n| C |", true, 1, MeterSpec::default());
        assert!(without_newline.starts_with("K:C\n| C |\nV:Metronome"));
    }

    #[test]
    fn test_empty_notation_gets_track_only() {
        let out = inject_metronome("", true, 2, MeterSpec::default());
        assert!(out.starts_with("V:Metronome"));
    }

    #[test]
    fn test_settings_toggle() {
        let mut settings = Settings::default();
        let abc = "X:1\nM:2/4\nK:C\n| C D | E F |\n";
        assert_eq!(inject_metronome_with_settings(abc, &settings), abc);

        settings.metronome_on = true;
        let out = inject_metronome_with_settings(abc, &settings);
        assert!(out.starts_with(abc));
        assert!(out.contains("| !f!e2 !p!f2 |"));
    }
}
