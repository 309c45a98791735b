//! Integration tests for metronome injection
//!
//! Tests the full pipeline from generated notation to notation with a
//! metronome voice appended.

use pretty_assertions::assert_eq;
use sightread::*;

/// Split the output of `inject_metronome` into the original text and the
/// click events of the appended voice.
fn appended_clicks<'a>(original: &str, output: &'a str) -> Vec<&'a str> {
    assert!(output.starts_with(original), "original text must be a prefix");
    output[original.len()..]
        .split_whitespace()
        .filter(|t| t.starts_with(metronome::STRONG_CLICK) || t.starts_with(metronome::WEAK_CLICK))
        .collect()
}

#[test]
fn test_four_four_end_to_end() {
    let abc = "X:1\nT:Four bars\nM:4/4\nL:1/8\nK:C\n| C2 D2 E2 F2 | G2 A2 B2 c2 | c2 B2 A2 G2 | C8\n";
    let plan = plan_metronome(abc, 4, MeterSpec::default());

    assert_eq!(plan.measures.detected_bars, 4);
    assert_eq!(plan.measures.total_bars, 6);
    assert_eq!(plan.clicks.clicks_per_measure, 4);
    assert!(!plan.clicks.is_compound);

    let output = inject_metronome(abc, true, 4, MeterSpec::default());
    let clicks = appended_clicks(abc, &output);
    assert_eq!(clicks.len(), 24);

    let strong: Vec<usize> = clicks
        .iter()
        .enumerate()
        .filter(|(_, c)| c.starts_with(metronome::STRONG_CLICK))
        .map(|(i, _)| i + 1)
        .collect();
    assert_eq!(strong, vec![1, 5, 9, 13, 17, 21]);
    assert!(clicks.iter().all(|c| c.ends_with('2')));
}

#[test]
fn test_four_four_exact_output() {
    let abc = "X:1\nM:4/4\nL:1/8\nK:C\n| C2 D2 E2 F2 | G8 |\n";
    let output = inject_metronome(abc, true, 1, MeterSpec::default());

    let expected = "X:1\nM:4/4\nL:1/8\nK:C\n| C2 D2 E2 F2 | G8 |\n\
V:Metronome clef=perc\n\
%%MIDI channel 10\n\
L:1/8\n\
| !f!e2 !p!f2 !p!f2 !p!f2 | !f!e2 !p!f2 !p!f2 !p!f2 | !f!e2 !p!f2 !p!f2 !p!f2 | !f!e2 !p!f2 !p!f2 !p!f2 |\n\
| !f!e2 !p!f2 !p!f2 !p!f2 |\n";
    assert_eq!(output, expected);
}

#[test]
fn test_compound_meter_end_to_end() {
    let abc = "X:1\nM:6/8\nL:1/8\nK:D\n| DFA dAF | D3 D3 |\n";
    let plan = plan_metronome(abc, 2, MeterSpec::default());

    assert_eq!(plan.clicks.clicks_per_measure, 2);
    assert!(plan.clicks.is_compound);
    assert_eq!(plan.clicks.duration_in_units, ClickDuration::whole(3).unwrap());

    let output = inject_metronome(abc, true, 2, MeterSpec::default());
    assert!(output.contains("| !f!e3 !p!f3 |"));
}

#[test]
fn test_missing_headers_end_to_end() {
    let abc = "C D E | F G A | B c d";
    let requested = MeterSpec::from_token("3/4").unwrap();
    let plan = plan_metronome(abc, 8, requested);

    assert_eq!(plan.meter, Resolved::Defaulted(MeterSpec::new(3, 4).unwrap()));
    assert_eq!(plan.unit_length, Resolved::Defaulted(UnitLength::new(8).unwrap()));
    assert_eq!(plan.clicks.clicks_per_measure, 3);
    assert!(plan.measures.total_bars >= 10);

    let output = inject_metronome(abc, true, 8, requested);
    assert!(output.starts_with("C D E | F G A | B c d\nV:Metronome clef=perc\n"));
    assert!(output.contains("L:1/8\n"));
    assert_eq!(appended_clicks(abc, &output).len(), 3 * plan.measures.total_bars);
}

#[test]
fn test_disabled_is_identity() {
    let inputs = [
        "",
        "X:1\nM:6/8\nK:C\n| C |",
        "garbage | text :: with [| odd ]| tokens",
    ];
    for abc in inputs {
        for measures in [0, 1, 16] {
            assert_eq!(inject_metronome(abc, false, measures, MeterSpec::default()), abc);
        }
    }
}

#[test]
fn test_output_is_deterministic() {
    let abc = "X:1\nM:3/4\nL:1/4\nK:Bb\n|: B d f | b3 :|\n";
    let first = inject_metronome(abc, true, 4, MeterSpec::default());
    let second = inject_metronome(abc, true, 4, MeterSpec::default());
    assert_eq!(first, second);
}

#[test]
fn test_fractional_click_stays_in_sync() {
    // Dotted-quarter clicks in quarter-note units
    let abc = "X:1\nM:6/8\nL:1/4\nK:G\n| G/A/B/ c3/2 | d3 |\n";
    let output = inject_metronome(abc, true, 2, MeterSpec::default());
    assert!(output.contains("L:1/4\n| !f!e3/2 !p!f3/2 |"));
}

#[test]
fn test_grand_staff_notation() {
    let abc = "X:1\nM:4/4\nL:1/4\nK:C\nV:1 clef=treble\n| c e g c' |\nV:2 clef=bass\n| C, E, G, C |\n";
    let plan = plan_metronome(abc, 1, MeterSpec::default());
    // Bar lines from both voices are counted
    assert_eq!(plan.measures.detected_bars, 4);

    let output = inject_metronome(abc, true, 1, MeterSpec::default());
    assert!(output.starts_with(abc));
    assert!(output.contains("V:Metronome clef=perc"));
}

#[test]
fn test_fallback_exercise_with_settings() {
    let settings = Settings::from_yaml(
        "time-signature: 3/4\nmeasures: 2\nmetronome-on: true\nselected-keys: [D Major]\n",
    )
    .unwrap();

    let abc = FallbackSource::default().notation(&settings);
    let output = inject_metronome_with_settings(&abc, &settings);

    // Offline exercises use quarter-note units
    assert!(output.contains("L:1/4\n"));
    assert!(output.contains("| !f!e !p!f !p!f |"));
    assert_eq!(appended_clicks(&abc, &output).len(), 3 * 5);
}

#[test]
fn test_recorded_response_pipeline() {
    let reply = "```json\n{\"abc\": \"X:1\\nM:2/2\\nL:1/8\\nK:F\\n| F4 A4 | c8 |\"}\n```";
    let settings = Settings {
        metronome_on: true,
        measures: 2,
        ..Settings::default()
    };

    let abc = generate_or_fallback(
        &RecordedResponse::new(reply),
        &FallbackSource::default(),
        &settings,
    );
    assert_eq!(abc, "X:1\nM:2/2\nL:1/8\nK:F\n| F4 A4 | c8 |");

    let output = inject_metronome_with_settings(&abc, &settings);
    assert!(output.contains("| !f!e4 !p!f4 |"));
}

#[test]
fn test_plan_serializes_camel_case() {
    let plan = plan_metronome("M:6/8\nK:C\n| C |", 1, MeterSpec::default());
    let json = serde_json::to_value(plan).unwrap();

    assert_eq!(json["meter"]["source"], "parsed");
    assert_eq!(json["meter"]["value"]["numerator"], 6);
    assert_eq!(json["unitLength"]["source"], "defaulted");
    assert_eq!(json["unitLength"]["value"], 8);
    assert_eq!(json["clicks"]["clicksPerMeasure"], 2);
    assert_eq!(json["clicks"]["isCompound"], true);
    assert_eq!(json["measures"]["totalBars"], 4);
}
