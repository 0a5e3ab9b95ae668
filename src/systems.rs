//! Staff-system grouping: splits the measure stream into fixed windows,
//! one named LilyPond block per window.

use std::fmt::Write;

use tracing::debug;

use crate::error::Result;
use crate::model::Score;
use crate::naming::next_name;
use crate::transform::encode_measures;

/// Measures per staff system.
pub const MEASURES_PER_SYSTEM: usize = 4;

/// One named block of encoded measures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaffSystem {
    /// Identifier, e.g. "mA"
    pub name: String,
    /// 0-based index of the first measure in the window
    pub first_measure: usize,
    /// Encoded note text
    pub notes: String,
}

/// All staff systems of a score plus the signatures in force at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaffSystems {
    pub systems: Vec<StaffSystem>,
    /// Last non-empty time signature seen; empty if the score has none
    pub time_signature: String,
    /// Last non-empty key signature seen; empty if the score has none
    pub key_signature: String,
}

impl StaffSystem {
    /// `mA = { … }` followed by the `systemPair` registration.
    pub fn to_lilypond(&self) -> String {
        format!(
            "{name} = {{ {notes} }}\n\\score {{ #(systemPair {name}) }}\n",
            name = self.name,
            notes = self.notes
        )
    }
}

impl StaffSystems {
    /// Accumulated block text for the document body.
    pub fn blocks(&self) -> String {
        let mut out = String::new();
        for system in &self.systems {
            // Writing to a String cannot fail.
            let _ = writeln!(out, "{}", system.to_lilypond());
        }
        out
    }
}

/// Walk the score in windows of [`MEASURES_PER_SYSTEM`] measures, counted on
/// the first part. The final window may be short. A score without measures
/// yields no systems.
pub fn group_systems(score: &Score) -> Result<StaffSystems> {
    let total = score.measure_count();
    let mut result = StaffSystems::default();
    let mut name = String::new();

    for start in (0..total).step_by(MEASURES_PER_SYSTEM) {
        let encoded = encode_measures(score, start..start + MEASURES_PER_SYSTEM);
        if !encoded.time_signature.is_empty() {
            result.time_signature = encoded.time_signature;
        }
        if !encoded.key_signature.is_empty() {
            result.key_signature = encoded.key_signature;
        }

        name = next_name(&name)?;
        debug!(system = %name, first_measure = start + 1, "encoded staff system");
        result.systems.push(StaffSystem {
            name: name.clone(),
            first_measure: start,
            notes: encoded.notes,
        });
    }

    Ok(result)
}
