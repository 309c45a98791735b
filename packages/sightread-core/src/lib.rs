//! # Sightread
//!
//! Metronome overlay for generated ABC sight-reading exercises.
//!
//! Exercises arrive as ABC notation from a [`NotationSource`]. Before playback,
//! [`inject_metronome`] appends a percussion voice that clicks along with the
//! exercise, accented on the first beat of each measure and long enough to
//! outlast it.
//!
//! ```rust
//! use sightread::{inject_metronome, MeterSpec};
//!
//! let abc = "X:1\nM:4/4\nL:1/8\nK:C\n| C2 D2 E2 F2 | G8 |\n";
//! let playback = inject_metronome(abc, true, 2, MeterSpec::default());
//!
//! assert!(playback.starts_with(abc));
//! assert!(playback.ends_with("| !f!e2 !p!f2 !p!f2 !p!f2 |\n"));
//! ```

pub mod error;
pub mod header;
pub mod lexer;
pub mod measures;
pub mod meter;
pub mod metronome;
pub mod settings;
pub mod source;
pub mod types;

pub use error::*;
pub use measures::count_measures;
pub use meter::{compute_click_plan, parse_meter, parse_unit_length};
pub use metronome::{
    emit_metronome_track, inject_metronome, inject_metronome_with_settings, plan_metronome,
};
pub use settings::{Articulations, Clef, GeneratorMode, Settings};
pub use source::{
    decode_response, generate_or_fallback, FallbackSource, NotationSource, RecordedResponse,
};
pub use types::*;
