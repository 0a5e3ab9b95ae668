//! Event encoder: turns notes, chords and rests into LilyPond tokens.
//!
//! Pitches are absolute: octave 4 carries no mark, each octave below adds a
//! comma and each octave above adds an apostrophe.

use crate::model::{Chord, Duration, Event, Note, NoteType, Pitch, Rest};

/// Octave marks for octaves 0..=8. Octaves outside the table get no mark.
const OCTAVE_MARKS: [(i32, &str); 9] = [
    (0, ",,,,"),
    (1, ",,,"),
    (2, ",,"),
    (3, ","),
    (4, ""),
    (5, "'"),
    (6, "''"),
    (7, "'''"),
    (8, "''''"),
];

/// Duration tokens for the supported note values. Anything else (whole
/// notes, 32nds, tuplets, …) encodes to an empty token and the renderer
/// falls back to the previous duration.
const DURATION_TOKENS: [(NoteType, u8, &str); 8] = [
    (NoteType::Quarter, 0, "4"),
    (NoteType::Quarter, 1, "4."),
    (NoteType::Eighth, 0, "8"),
    (NoteType::Eighth, 1, "8."),
    (NoteType::Half, 0, "2"),
    (NoteType::Half, 1, "2."),
    (NoteType::Sixteenth, 0, "16"),
    (NoteType::Sixteenth, 1, "16."),
];

/// Bar check separating measures.
pub const BAR_SEPARATOR: &str = "|";

pub fn octave_mark(octave: i32) -> &'static str {
    OCTAVE_MARKS
        .iter()
        .find(|(o, _)| *o == octave)
        .map_or("", |(_, mark)| *mark)
}

pub fn duration_token(duration: &Duration) -> &'static str {
    match *duration {
        Duration::Typed { note_type, dots } => DURATION_TOKENS
            .iter()
            .find(|(t, d, _)| *t == note_type && *d == dots)
            .map_or("", |(_, _, token)| *token),
        Duration::Tuplet { .. } | Duration::Inexpressible => "",
    }
}

/// Pitch without duration, e.g. `cis'`.
pub fn encode_pitch(pitch: &Pitch) -> String {
    let mut token = String::new();
    token.push(pitch.step.letter());
    if pitch.alter > 0 {
        token.push_str("is");
    } else if pitch.alter < 0 {
        token.push_str("es");
    }
    token.push_str(octave_mark(pitch.octave));
    token
}

pub fn encode_note(note: &Note) -> String {
    format!("{}{}", encode_pitch(&note.pitch), duration_token(&note.duration))
}

/// `<e g> 2`: member pitches share the chord's duration.
pub fn encode_chord(chord: &Chord) -> String {
    let pitches: Vec<String> = chord.pitches.iter().map(encode_pitch).collect();
    format!("<{}> {}", pitches.join(" "), duration_token(&chord.duration))
}

pub fn encode_rest(rest: &Rest) -> String {
    format!("r{}", duration_token(&rest.duration))
}

/// Token for a sounding event; `None` for key and time markers.
pub fn encode_event(event: &Event) -> Option<String> {
    match event {
        Event::Note(note) => Some(encode_note(note)),
        Event::Chord(chord) => Some(encode_chord(chord)),
        Event::Rest(rest) => Some(encode_rest(rest)),
        Event::Key(_) | Event::Time(_) => None,
    }
}
