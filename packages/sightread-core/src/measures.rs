//! Measure counting for the metronome voice.
//!
//! The count is deliberately generous: every bar line token in the body counts
//! once (so `| A | B |` counts three), the requested measure count is used when
//! it is larger, and a fixed buffer of [`MEASURE_BUFFER`] measures is added on
//! top. The main voice ends playback, so an over-long metronome voice is
//! harmless while a short one is not.

use crate::header;
use crate::lexer::{bar_lines, Lexer};
use crate::types::{MeasureCount, MEASURE_BUFFER};
use log::debug;

/// Count bar line tokens from the key signature line onward.
pub fn count_bar_lines(notation: &str) -> usize {
    let body = header::body(notation);
    let tokens = Lexer::new(body.text)
        .starting_at_line(body.first_line)
        .tokenize();
    bar_lines(&tokens).count()
}

/// Work out how many measures the metronome voice needs.
///
/// # Example
/// ```
/// use sightread::count_measures;
///
/// let abc = "X:1\nT:Title | with a bar\nM:4/4\nK:C\n| C D E F | G A B c |\n";
/// let count = count_measures(abc, 2);
/// assert_eq!(count.detected_bars, 3);
/// assert_eq!(count.total_bars, 5);
/// ```
pub fn count_measures(notation: &str, requested_measures: usize) -> MeasureCount {
    let detected_bars = count_bar_lines(notation);
    if detected_bars == 0 {
        debug!(
            "No bar lines found, sizing metronome from {} requested measures",
            requested_measures
        );
    }
    MeasureCount::new(detected_bars, requested_measures)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_each_bar_line_once() {
        let abc = "X:1\nM:4/4\nK:C\n|: C D E F | G A B c :|\n| C4 || D4 |]\n";
        assert_eq!(count_bar_lines(abc), 6);
    }

    #[test]
    fn test_header_bars_ignored() {
        let abc = "X:1\nT:Call | Response\nC:Anon | Trad\nK:C\n| C D |\n";
        assert_eq!(count_bar_lines(abc), 2);
    }

    #[test]
    fn test_annotation_and_lyric_bars_ignored() {
        let abc = "X:1\nK:C\n| \"C|G\"C2 !|!D2 |\nw: do | re\n";
        assert_eq!(count_bar_lines(abc), 2);
    }

    #[test]
    fn test_no_bars_uses_requested() {
        let count = count_measures("X:1\nK:C\nC D E F G A B c\n", 8);
        assert_eq!(count.detected_bars, 0);
        assert_eq!(count.total_bars, 10);
    }

    #[test]
    fn test_more_bars_than_requested() {
        let abc = "K:C\n| C | D | E | F | G |\n";
        let count = count_measures(abc, 2);
        assert_eq!(count.detected_bars, 6);
        assert_eq!(count.total_bars, 8);
    }

    #[test]
    fn test_total_is_never_below_either_input_plus_buffer() {
        let bodies = ["", "K:C\n|", "K:C\n| A | B | C |", "| x |\n| y |\n| z |"];
        for body in bodies {
            for requested in [0, 1, 4, 16] {
                let count = count_measures(body, requested);
                assert!(count.total_bars >= requested + MEASURE_BUFFER);
                assert!(count.total_bars >= count.detected_bars + MEASURE_BUFFER);
            }
        }
    }
}
