//! # Metronome Types
//!
//! Plain data types shared by the meter parser, the click-pattern calculator,
//! the measure counter and the track emitter.
//!
//! ## Type Overview
//! ```text
//! MetronomePlan
//!   ├── meter: Resolved<MeterSpec>        (M: field or requested meter)
//!   ├── unit_length: Resolved<UnitLength> (L: field or 1/8)
//!   ├── clicks: ClickPlan
//!   │     ├── clicks_per_measure
//!   │     ├── is_compound
//!   │     └── duration_in_units: ClickDuration (exact ratio of unit notes)
//!   └── measures: MeasureCount
//!         ├── detected_bars
//!         ├── requested_measures
//!         └── total_bars = max(detected, requested) + 2
//! ```
//!
//! All types are `Copy` value types. Nothing here holds a reference into the
//! notation text, so a plan can outlive the string it was computed from.

use serde::Serialize;
use std::fmt;

/// Extra measures appended to the metronome voice so it never runs out
/// before the main voice does.
pub const MEASURE_BUFFER: usize = 2;

/// Largest number of measures a caller may ask for.
pub const MAX_REQUESTED_MEASURES: u32 = 64;

/// Unit note denominator assumed when the notation has no `L:` field.
pub const DEFAULT_UNIT_DENOMINATOR: u32 = 8;

/// Result of reading a header field: either the value was parsed from the
/// notation text, or a fallback value was substituted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum Resolved<T> {
    Parsed(T),
    Defaulted(T),
}

impl<T> Resolved<T> {
    pub fn value(&self) -> &T {
        match self {
            Resolved::Parsed(value) | Resolved::Defaulted(value) => value,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Resolved::Parsed(value) | Resolved::Defaulted(value) => value,
        }
    }

    pub fn is_defaulted(&self) -> bool {
        matches!(self, Resolved::Defaulted(_))
    }
}

/// Time signature (e.g., 4/4, 3/4, 6/8)
///
/// The denominator is always a positive power of two and the numerator is at
/// least one; [`MeterSpec::new`] refuses anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MeterSpec {
    pub numerator: u32,
    pub denominator: u32,
}

impl Default for MeterSpec {
    fn default() -> Self {
        Self {
            numerator: 4,
            denominator: 4,
        }
    }
}

impl MeterSpec {
    pub const COMMON_TIME: MeterSpec = MeterSpec {
        numerator: 4,
        denominator: 4,
    };

    pub const CUT_TIME: MeterSpec = MeterSpec {
        numerator: 2,
        denominator: 2,
    };

    pub fn new(numerator: u32, denominator: u32) -> Option<Self> {
        if numerator == 0 || !denominator.is_power_of_two() {
            return None;
        }
        Some(Self {
            numerator,
            denominator,
        })
    }

    /// Parse a meter token as written after `M:`.
    ///
    /// Accepts `C` (common time), `C|` (cut time), plain fractions like `3/4`
    /// and additive numerators like `2+3/8` or `(2+2+3)/8`.
    ///
    /// # Example
    /// ```
    /// use sightread::MeterSpec;
    ///
    /// assert_eq!(MeterSpec::from_token("6/8"), MeterSpec::new(6, 8));
    /// assert_eq!(MeterSpec::from_token("C|"), Some(MeterSpec::CUT_TIME));
    /// assert_eq!(MeterSpec::from_token("(2+3)/8"), MeterSpec::new(5, 8));
    /// assert_eq!(MeterSpec::from_token("none"), None);
    /// ```
    pub fn from_token(token: &str) -> Option<Self> {
        let trimmed = token.trim();
        match trimmed {
            "C" => return Some(Self::COMMON_TIME),
            "C|" => return Some(Self::CUT_TIME),
            _ => {}
        }

        let (numerator, denominator) = trimmed.split_once('/')?;
        let numerator = parse_additive(numerator)?;
        let denominator = denominator.trim().parse().ok()?;
        Self::new(numerator, denominator)
    }

    /// Compound meters group three eighth notes into one felt beat:
    /// 6/8, 9/8, 12/8 and so on.
    pub fn is_compound(&self) -> bool {
        self.denominator == 8 && self.numerator % 3 == 0 && self.numerator >= 6
    }
}

impl fmt::Display for MeterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Sum a numerator such as `3`, `2+3` or `(2+2+3)`.
fn parse_additive(s: &str) -> Option<u32> {
    let s = s.trim();
    let s = s
        .strip_prefix('(')
        .and_then(|inner| inner.strip_suffix(')'))
        .unwrap_or(s);

    s.split('+').try_fold(0u32, |total, part| {
        let part: u32 = part.trim().parse().ok()?;
        total.checked_add(part)
    })
}

/// Unit note length: the metronome voice counts in notes of `1/N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct UnitLength(u32);

impl Default for UnitLength {
    fn default() -> Self {
        Self(DEFAULT_UNIT_DENOMINATOR)
    }
}

impl UnitLength {
    pub fn new(denominator: u32) -> Option<Self> {
        (denominator > 0).then_some(Self(denominator))
    }

    pub fn denominator(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for UnitLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "1/{}", self.0)
    }
}

/// Length of one click, as an exact multiple of the unit note.
///
/// Stored in lowest terms and never zero. Displays in ABC length syntax:
/// `""` for one unit, `3` for three units, `/2` for half a unit and `3/2`
/// for one and a half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClickDuration {
    numerator: u32,
    denominator: u32,
}

impl ClickDuration {
    pub const ONE: ClickDuration = ClickDuration {
        numerator: 1,
        denominator: 1,
    };

    /// Returns `None` when either side is zero.
    pub fn new(numerator: u32, denominator: u32) -> Option<Self> {
        if numerator == 0 || denominator == 0 {
            return None;
        }
        let divisor = gcd(numerator, denominator);
        Some(Self {
            numerator: numerator / divisor,
            denominator: denominator / divisor,
        })
    }

    pub fn whole(units: u32) -> Option<Self> {
        Self::new(units, 1)
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }

    pub fn as_f64(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

impl fmt::Display for ClickDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.numerator, self.denominator) {
            (1, 1) => Ok(()),
            (n, 1) => write!(f, "{}", n),
            (1, d) => write!(f, "/{}", d),
            (n, d) => write!(f, "{}/{}", n, d),
        }
    }
}

fn gcd(mut a: u32, mut b: u32) -> u32 {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// How the metronome clicks within one measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickPlan {
    pub clicks_per_measure: u32,
    pub is_compound: bool,
    pub duration_in_units: ClickDuration,
}

/// Measure length of the metronome voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasureCount {
    pub detected_bars: usize,
    pub requested_measures: usize,
    pub total_bars: usize,
}

impl MeasureCount {
    pub fn new(detected_bars: usize, requested_measures: usize) -> Self {
        Self {
            detected_bars,
            requested_measures,
            total_bars: detected_bars
                .max(requested_measures)
                .saturating_add(MEASURE_BUFFER),
        }
    }
}

/// Everything needed to write a metronome voice for one piece of notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetronomePlan {
    pub meter: Resolved<MeterSpec>,
    pub unit_length: Resolved<UnitLength>,
    pub clicks: ClickPlan,
    pub measures: MeasureCount,
}
