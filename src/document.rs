//! Document assembly: wraps staff-system blocks in the LilyPond header,
//! paper/layout settings and the `systemPair` staff template.

use crate::tuning::Tuning;

/// LilyPond version the generated documents target.
pub const LILYPOND_VERSION: &str = "2.24.0";

/// File extension of generated notation files.
pub const NOTATION_EXTENSION: &str = "ly";

const PAPER: &str = r#"\paper {
    indent = 0
    ragged-bottom = ##f
    ragged-last-bottom = ##f
    ragged-last = ##f
    ragged-right = ##f
}"#;

const LAYOUT: &str = r#"\layout {
    \context {
        \Score
    }
    \context {
        \Staff
    }
}"#;

/// `\time` / `\key` prefix shared by both staves. A signature that was never
/// seen is left out rather than emitted bare.
fn signature_directives(time_signature: &str, key_signature: &str) -> String {
    let mut out = String::new();
    if !time_signature.is_empty() {
        out.push_str(&format!("\\time {time_signature} "));
    }
    if !key_signature.is_empty() {
        out.push_str(&format!("\\key {key_signature} "));
    }
    out
}

/// The `systemPair` macro: a standard staff over a tab staff, both fed the
/// same music.
fn system_pair_macro(time_signature: &str, key_signature: &str, tuning_name: &str) -> String {
    let signatures = signature_directives(time_signature, key_signature);
    format!(
        r#"#(define (systemPair music)
#{{
    \new StaffGroup <<
        \new Staff {{ \clef "treble_8" {signatures}#music }}
        \new TabStaff \with {{ stringTunings = #{tuning_name} }}
        {{ \clef "moderntab" {signatures}#music }}
    >>
#}})"#
    )
}

/// Build the complete notation document.
///
/// Inputs are pasted in as given; a malformed signature or tuning only
/// shows up when the document is rendered.
pub fn assemble(
    blocks: &str,
    time_signature: &str,
    key_signature: &str,
    tuning: &Tuning,
) -> String {
    format!(
        "\\version \"{LILYPOND_VERSION}\"\n\
         \\makeDefaultStringTuning {descriptor}\n\
         {PAPER}\n\n\
         {LAYOUT}\n\n\
         {pair}\n\n\
         {blocks}",
        descriptor = tuning.descriptor,
        pair = system_pair_macro(time_signature, key_signature, &tuning.name),
    )
}
