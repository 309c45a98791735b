//! # Meter Parsing and Click Patterns
//!
//! Reads the `M:` and `L:` header fields of generated notation and turns them
//! into a [`ClickPlan`].
//!
//! ## Fallbacks
//! Generated notation is not trusted to be well formed. Nothing here returns an
//! error:
//! - missing or malformed `M:` → the meter requested in the settings
//! - missing or malformed `L:` → `1/8`
//! - a click duration that works out to zero → one unit note
//!
//! ## Click Patterns
//! | Meter | Compound | Clicks | Click length |
//! |-------|----------|--------|--------------|
//! | 4/4   | no       | 4      | unit / 4     |
//! | 3/4   | no       | 3      | unit / 4     |
//! | 2/2   | no       | 2      | unit / 2     |
//! | 6/8   | yes      | 2      | 3 × unit / 8 |
//! | 9/8   | yes      | 3      | 3 × unit / 8 |
//! | 8/8   | no       | 8      | unit / 8     |

use crate::header::find_field;
use crate::types::*;
use log::debug;

/// Read the time signature from the first `M:` field.
///
/// # Example
/// ```
/// use sightread::{parse_meter, MeterSpec, Resolved};
///
/// let requested = MeterSpec::new(3, 4).unwrap();
///
/// let meter = parse_meter("X:1\nM:6/8\nK:C\n", requested);
/// assert_eq!(meter, Resolved::Parsed(MeterSpec::new(6, 8).unwrap()));
///
/// let meter = parse_meter("X:1\nK:C\n", requested);
/// assert_eq!(meter, Resolved::Defaulted(requested));
/// ```
pub fn parse_meter(notation: &str, requested: MeterSpec) -> Resolved<MeterSpec> {
    match find_field(notation, 'M') {
        Some(token) => match MeterSpec::from_token(token) {
            Some(meter) => Resolved::Parsed(meter),
            None => {
                debug!("Unusable meter field 'M:{}', using requested {}", token, requested);
                Resolved::Defaulted(requested)
            }
        },
        None => {
            debug!("No meter field, using requested {}", requested);
            Resolved::Defaulted(requested)
        }
    }
}

/// Read the unit note length from the first `L:` field (`1/N`).
///
/// Without a usable field the unit is an eighth note, whatever the meter.
pub fn parse_unit_length(notation: &str) -> Resolved<UnitLength> {
    let Some(value) = find_field(notation, 'L') else {
        debug!("No unit length field, assuming 1/{}", DEFAULT_UNIT_DENOMINATOR);
        return Resolved::Defaulted(UnitLength::default());
    };

    let unit = value
        .split_once('/')
        .filter(|(numerator, _)| numerator.trim() == "1")
        .and_then(|(_, denominator)| denominator.trim().parse().ok())
        .and_then(UnitLength::new);

    match unit {
        Some(unit) => Resolved::Parsed(unit),
        None => {
            debug!(
                "Unusable unit length field 'L:{}', assuming 1/{}",
                value, DEFAULT_UNIT_DENOMINATOR
            );
            Resolved::Defaulted(UnitLength::default())
        }
    }
}

/// Decide how many clicks a measure gets and how long each one is.
///
/// Simple meters click once per beat. Compound meters (6/8, 9/8, 12/8) click
/// once per dotted quarter, i.e. every three eighth notes.
///
/// # Example
/// ```
/// use sightread::{compute_click_plan, ClickDuration, MeterSpec, UnitLength};
///
/// let plan = compute_click_plan(MeterSpec::new(6, 8).unwrap(), UnitLength::new(8).unwrap());
/// assert!(plan.is_compound);
/// assert_eq!(plan.clicks_per_measure, 2);
/// assert_eq!(plan.duration_in_units, ClickDuration::whole(3).unwrap());
/// ```
pub fn compute_click_plan(meter: MeterSpec, unit: UnitLength) -> ClickPlan {
    let unit_denominator = unit.denominator();
    let is_compound = meter.is_compound();

    let (clicks_per_measure, duration) = if is_compound {
        let duration = unit_denominator
            .checked_mul(3)
            .and_then(|units| ClickDuration::new(units, 8));
        (meter.numerator / 3, duration)
    } else {
        (
            meter.numerator,
            ClickDuration::new(unit_denominator, meter.denominator),
        )
    };

    let duration_in_units = duration.unwrap_or_else(|| {
        debug!(
            "Click duration for {} in units of {} is not positive, clamping to one unit",
            meter, unit
        );
        ClickDuration::ONE
    });

    ClickPlan {
        clicks_per_measure: clicks_per_measure.max(1),
        is_compound,
        duration_in_units,
    }
}
