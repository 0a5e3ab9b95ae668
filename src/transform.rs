//! Score transform: normalizes a score and encodes runs of measures into
//! LilyPond note text with their key and time signatures.

use std::ops::Range;

use crate::encoder::{encode_event, BAR_SEPARATOR};
use crate::model::{Clef, Event, Interval, Score};

/// How a score is prepared before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// Whether to transpose pitched events by `interval`
    pub transpose: bool,
    /// Transposition interval (default: one octave up)
    pub interval: Interval,
    /// Clef placed at the start of every part
    pub clef: Clef,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            transpose: false,
            interval: Interval::OCTAVE,
            clef: Clef::treble(),
        }
    }
}

impl NormalizeOptions {
    pub fn transposed(transpose: bool) -> Self {
        Self {
            transpose,
            ..Self::default()
        }
    }
}

/// Note text for a run of measures plus the last signatures seen in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncodedMeasures {
    /// Space-joined tokens, each measure closed by a bar check
    pub notes: String,
    /// Last time signature, e.g. "3/4"; empty if none was seen
    pub time_signature: String,
    /// Last key signature in LilyPond form, e.g. "g \major"; empty if none was seen
    pub key_signature: String,
}

/// Transpose (if asked) and reset clefs.
///
/// Every existing clef is dropped and `options.clef` is placed in the first
/// measure of each part, whether or not the score is transposed.
pub fn normalize(mut score: Score, options: &NormalizeOptions) -> Score {
    for part in &mut score.parts {
        for measure in &mut part.measures {
            measure.clefs.clear();
            if options.transpose {
                for event in &mut measure.events {
                    transpose_event(event, &options.interval);
                }
            }
        }
        if let Some(first) = part.measures.first_mut() {
            first.clefs.push(options.clef.clone());
        }
    }
    score
}

fn transpose_event(event: &mut Event, interval: &Interval) {
    match event {
        Event::Note(note) => note.pitch = note.pitch.transpose(interval),
        Event::Chord(chord) => {
            for pitch in &mut chord.pitches {
                *pitch = pitch.transpose(interval);
            }
        }
        Event::Rest(_) | Event::Key(_) | Event::Time(_) => {}
    }
}

/// Key name in LilyPond form: "G major" becomes "g \major".
pub fn key_literal(name: &str) -> String {
    name.replace(' ', " \\").to_lowercase()
}

/// Encode measures `range` (0-based indices) of every part, part by part.
pub fn encode_measures(score: &Score, range: Range<usize>) -> EncodedMeasures {
    let mut tokens: Vec<String> = Vec::new();
    let mut time_signature = String::new();
    let mut key_signature = String::new();

    for part in &score.parts {
        let end = range.end.min(part.measures.len());
        let start = range.start.min(end);
        for measure in &part.measures[start..end] {
            for event in &measure.events {
                match event {
                    Event::Key(key) => key_signature = key_literal(&key.name),
                    Event::Time(time) => {
                        let time = time.to_string();
                        if time != time_signature {
                            time_signature = time;
                        }
                    }
                    _ => tokens.extend(encode_event(event)),
                }
            }
            tokens.push(BAR_SEPARATOR.to_string());
        }
    }

    EncodedMeasures {
        notes: tokens.join(" "),
        time_signature,
        key_signature,
    }
}
