//! Data model for a parsed score as seen by the tablature converter.
//!
//! Only the information the notation transform consumes is kept: parts,
//! measures, and the ordered events inside each measure.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TabError};

/// A complete musical score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    /// Title of the piece
    pub title: Option<String>,
    /// Composer name
    pub composer: Option<String>,
    /// MusicXML version (e.g., "3.1", "4.0")
    pub version: Option<String>,
    /// Musical parts (instruments)
    pub parts: Vec<Part>,
}

/// A musical part (one instrument or voice).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name (e.g., "Classical Guitar")
    pub name: String,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    /// Measure number as written in the source
    pub number: i32,
    /// Whether this is an implicit measure (e.g., pickup/anacrusis)
    pub implicit: bool,
    /// Clef annotations placed in this measure
    pub clefs: Vec<Clef>,
    /// Events in score order
    pub events: Vec<Event>,
}

/// Anything that can sit inside a measure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Note(Note),
    Chord(Chord),
    Rest(Rest),
    Key(KeySignature),
    Time(TimeSignature),
}

/// A single pitched note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: Pitch,
    pub duration: Duration,
}

/// Several pitches struck together, sharing one duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chord {
    pub pitches: Vec<Pitch>,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rest {
    pub duration: Duration,
}

/// Key signature, identified by its name (e.g., "G major", "fis minor").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeySignature {
    pub name: String,
}

/// Time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub numerator: u32,
    /// Denominator (e.g., 4 in 3/4)
    pub denominator: u32,
}

/// Clef definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clef {
    /// Staff number this clef belongs to (1-based; defaults to 1)
    pub number: i32,
    /// Clef sign: "G" (treble), "F" (bass), "C" (alto/tenor)
    pub sign: String,
    /// Staff line the clef sits on
    pub line: i32,
    /// Octave transposition (e.g., -1 for guitar's octave-lower treble clef)
    pub octave_change: Option<i32>,
}

/// Diatonic step name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

/// Pitch of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pitch {
    pub step: Step,
    /// Chromatic alteration in semitones: -1 = flat, 1 = sharp, 0 = natural
    pub alter: i32,
    /// Octave number (middle C = C4)
    pub octave: i32,
}

/// Graphic note value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NoteType {
    Breve,
    Whole,
    Half,
    Quarter,
    Eighth,
    Sixteenth,
    ThirtySecond,
    SixtyFourth,
}

/// How long an event lasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    /// A plain (optionally dotted) note value
    Typed { note_type: NoteType, dots: u8 },
    /// A note value squeezed into a tuplet: `actual` notes in the time of `normal`
    Tuplet {
        note_type: NoteType,
        dots: u8,
        actual: u32,
        normal: u32,
    },
    /// No single note value describes this length
    Inexpressible,
}

/// A transposition interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    /// Steps along the diatonic scale (7 per octave)
    pub diatonic: i32,
    /// Semitones (12 per octave)
    pub chromatic: i32,
}

impl Score {
    /// Create a new empty score.
    pub fn new() -> Self {
        Self {
            title: None,
            composer: None,
            version: None,
            parts: Vec::new(),
        }
    }

    /// Number of measures in the first part.
    pub fn measure_count(&self) -> usize {
        self.parts.first().map_or(0, |p| p.measures.len())
    }
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Part {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            measures: Vec::new(),
        }
    }
}

impl Measure {
    pub fn new(number: i32) -> Self {
        Self {
            number,
            implicit: false,
            clefs: Vec::new(),
            events: Vec::new(),
        }
    }

    pub fn with_events(number: i32, events: Vec<Event>) -> Self {
        Self {
            events,
            ..Self::new(number)
        }
    }
}

impl Event {
    pub fn note(pitch: Pitch, duration: Duration) -> Self {
        Event::Note(Note { pitch, duration })
    }

    pub fn chord(pitches: Vec<Pitch>, duration: Duration) -> Self {
        Event::Chord(Chord { pitches, duration })
    }

    pub fn rest(duration: Duration) -> Self {
        Event::Rest(Rest { duration })
    }

    pub fn key(name: impl Into<String>) -> Self {
        Event::Key(KeySignature { name: name.into() })
    }

    pub fn time(numerator: u32, denominator: u32) -> Self {
        Event::Time(TimeSignature {
            numerator,
            denominator,
        })
    }
}

// Tonic spellings indexed by fifths + 7 (Ces .. Cis).
const MAJOR_TONICS: [&str; 15] = [
    "Ces", "Ges", "Des", "Aes", "Ees", "Bes", "F", "C", "G", "D", "A", "E", "B", "Fis", "Cis",
];
const MINOR_TONICS: [&str; 15] = [
    "aes", "ees", "bes", "f", "c", "g", "d", "a", "e", "b", "fis", "cis", "gis", "dis", "ais",
];

impl KeySignature {
    /// Build a key from a circle-of-fifths position and a mode.
    ///
    /// Minor keys get a lowercase tonic ("e minor"); unknown modes are
    /// treated as major. Positions outside -7..=7 are clamped.
    pub fn from_fifths(fifths: i32, mode: Option<&str>) -> Self {
        let idx = (fifths.clamp(-7, 7) + 7) as usize;
        let name = match mode {
            Some("minor") => format!("{} minor", MINOR_TONICS[idx]),
            _ => format!("{} major", MAJOR_TONICS[idx]),
        };
        Self { name }
    }
}

impl fmt::Display for TimeSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

impl Clef {
    /// The plain treble (G2) clef.
    pub fn treble() -> Self {
        Self {
            number: 1,
            sign: "G".to_string(),
            line: 2,
            octave_change: None,
        }
    }
}

const NATURAL_SEMITONES: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

impl Step {
    const ALL: [Step; 7] = [Step::C, Step::D, Step::E, Step::F, Step::G, Step::A, Step::B];

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_uppercase() {
            'C' => Some(Step::C),
            'D' => Some(Step::D),
            'E' => Some(Step::E),
            'F' => Some(Step::F),
            'G' => Some(Step::G),
            'A' => Some(Step::A),
            'B' => Some(Step::B),
            _ => None,
        }
    }

    /// Lowercase letter name.
    pub fn letter(self) -> char {
        match self {
            Step::C => 'c',
            Step::D => 'd',
            Step::E => 'e',
            Step::F => 'f',
            Step::G => 'g',
            Step::A => 'a',
            Step::B => 'b',
        }
    }

    fn index(self) -> i32 {
        self as i32
    }
}

impl Pitch {
    pub fn new(step: Step, alter: i32, octave: i32) -> Self {
        Self {
            step,
            alter,
            octave,
        }
    }

    /// Convert pitch to MIDI note number.
    /// Middle C (C4) = 60.
    pub fn to_midi(&self) -> i32 {
        self.octave
            .saturating_add(1)
            .saturating_mul(12)
            .saturating_add(NATURAL_SEMITONES[self.step.index() as usize])
            .saturating_add(self.alter)
    }

    /// Move the pitch by `interval`, keeping the spelling the interval implies
    /// (C4 up a major third is E4, not F-flat4).
    pub fn transpose(&self, interval: &Interval) -> Pitch {
        let diatonic = self
            .octave
            .saturating_mul(7)
            .saturating_add(self.step.index())
            .saturating_add(interval.diatonic);
        let octave = diatonic.div_euclid(7);
        let step = Step::ALL[diatonic.rem_euclid(7) as usize];
        let target = self.to_midi().saturating_add(interval.chromatic);
        let natural = Pitch::new(step, 0, octave).to_midi();
        Pitch::new(step, target.saturating_sub(natural), octave)
    }
}

/// Parses `"C4"`, `"C#5"`, `"B-3"` and `"Bb3"`.
impl FromStr for Pitch {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TabError::InvalidPitch(s.to_string());
        let mut chars = s.trim().chars().peekable();
        let step = chars.next().and_then(Step::from_letter).ok_or_else(invalid)?;

        let mut alter = 0;
        while let Some(&c) = chars.peek() {
            match c {
                '#' => alter += 1,
                '-' | 'b' => alter -= 1,
                _ => break,
            }
            chars.next();
        }

        let octave: String = chars.collect();
        let octave = octave.parse::<i32>().map_err(|_| invalid())?;
        Ok(Pitch::new(step, alter, octave))
    }
}

impl NoteType {
    /// Parse a MusicXML `<type>` value.
    pub fn from_musicxml(name: &str) -> Option<Self> {
        match name {
            "breve" => Some(NoteType::Breve),
            "whole" => Some(NoteType::Whole),
            "half" => Some(NoteType::Half),
            "quarter" => Some(NoteType::Quarter),
            "eighth" => Some(NoteType::Eighth),
            "16th" => Some(NoteType::Sixteenth),
            "32nd" => Some(NoteType::ThirtySecond),
            "64th" => Some(NoteType::SixtyFourth),
            _ => None,
        }
    }

    /// Length in quarter notes, undotted.
    pub fn quarter_length(self) -> f64 {
        match self {
            NoteType::Breve => 8.0,
            NoteType::Whole => 4.0,
            NoteType::Half => 2.0,
            NoteType::Quarter => 1.0,
            NoteType::Eighth => 0.5,
            NoteType::Sixteenth => 0.25,
            NoteType::ThirtySecond => 0.125,
            NoteType::SixtyFourth => 0.0625,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            NoteType::Breve => "Breve",
            NoteType::Whole => "Whole",
            NoteType::Half => "Half",
            NoteType::Quarter => "Quarter",
            NoteType::Eighth => "Eighth",
            NoteType::Sixteenth => "16th",
            NoteType::ThirtySecond => "32nd",
            NoteType::SixtyFourth => "64th",
        }
    }
}

const TYPES_LONGEST_FIRST: [NoteType; 8] = [
    NoteType::Breve,
    NoteType::Whole,
    NoteType::Half,
    NoteType::Quarter,
    NoteType::Eighth,
    NoteType::Sixteenth,
    NoteType::ThirtySecond,
    NoteType::SixtyFourth,
];

impl Duration {
    pub const QUARTER: Duration = Duration::typed(NoteType::Quarter, 0);
    pub const HALF: Duration = Duration::typed(NoteType::Half, 0);
    pub const EIGHTH: Duration = Duration::typed(NoteType::Eighth, 0);

    pub const fn typed(note_type: NoteType, dots: u8) -> Self {
        Duration::Typed { note_type, dots }
    }

    /// Find the note value (with up to two dots) lasting `quarter_length`
    /// quarter notes.
    pub fn from_quarter_length(quarter_length: f64) -> Self {
        for note_type in TYPES_LONGEST_FIRST {
            let base = note_type.quarter_length();
            let mut length = base;
            let mut add = base;
            for dots in 0..=2u8 {
                if (length - quarter_length).abs() < 1e-6 {
                    return Duration::typed(note_type, dots);
                }
                add /= 2.0;
                length += add;
            }
        }
        Duration::Inexpressible
    }

    /// Human-readable name, e.g. "Dotted Quarter", "16th", "Eighth Triplet".
    pub fn full_name(&self) -> String {
        match *self {
            Duration::Typed { note_type, dots } => dotted_name(note_type, dots),
            Duration::Tuplet {
                note_type,
                dots,
                actual,
                normal,
            } => {
                let tuplet = match (actual, normal) {
                    (3, 2) => "Triplet".to_string(),
                    (5, 4) => "Quintuplet".to_string(),
                    (6, 4) => "Sextuplet".to_string(),
                    _ => format!("{actual}:{normal} Tuplet"),
                };
                format!("{} {}", dotted_name(note_type, dots), tuplet)
            }
            Duration::Inexpressible => "Inexpressible".to_string(),
        }
    }
}

fn dotted_name(note_type: NoteType, dots: u8) -> String {
    match dots {
        0 => note_type.name().to_string(),
        1 => format!("Dotted {}", note_type.name()),
        2 => format!("Double Dotted {}", note_type.name()),
        n => format!("{n}-Times Dotted {}", note_type.name()),
    }
}

impl Interval {
    /// Largest accepted interval size: ten octaves.
    pub const MAX_SIZE: i32 = 71;

    /// One octave up ("P8").
    pub const OCTAVE: Interval = Interval {
        diatonic: 7,
        chromatic: 12,
    };
}

impl Default for Interval {
    fn default() -> Self {
        Interval::OCTAVE
    }
}

/// Parses quality + size names such as `"P8"`, `"M3"`, `"m2"`, `"A4"`,
/// `"d5"`; a leading `-` means downward.
impl FromStr for Interval {
    type Err = TabError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || TabError::InvalidInterval(s.to_string());
        let trimmed = s.trim();
        let (sign, rest) = match trimmed.strip_prefix('-') {
            Some(rest) => (-1, rest),
            None => (1, trimmed),
        };
        let split = rest
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (quality, size) = rest.split_at(split);
        let size: i32 = size.parse().map_err(|_| invalid())?;
        if !(1..=Interval::MAX_SIZE).contains(&size) {
            return Err(invalid());
        }

        let simple = (size - 1) % 7;
        let octaves = (size - 1) / 7;
        let perfect_kind = matches!(simple, 0 | 3 | 4);
        let base = NATURAL_SEMITONES[simple as usize];

        let adjust = match (quality, perfect_kind) {
            ("P", true) | ("M", false) => 0,
            ("m", false) => -1,
            ("d", true) => -1,
            ("d", false) => -2,
            ("A", _) => 1,
            ("AA", _) => 2,
            _ => return Err(invalid()),
        };

        Ok(Interval {
            diatonic: sign * (size - 1),
            chromatic: sign * (octaves * 12 + base + adjust),
        })
    }
}
