//! MusicXML parser: converts MusicXML XML into the Score data model.
//!
//! Each measure is read in document order. Key and time changes become
//! marker events where they occur, clefs are collected on the measure, and
//! notes flagged `<chord/>` are folded into the event before them.

use roxmltree::{Document, Node};
use tracing::debug;

use crate::error::{Result, TabError};
use crate::model::*;

/// Parse a MusicXML XML string into a Score.
pub fn parse_musicxml(xml: &str) -> Result<Score> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)
        .map_err(|e| TabError::Parse(format!("XML parse error: {e}")))?;
    let root = doc.root_element();

    // Verify this is a score-partwise document
    if root.tag_name().name() != "score-partwise" {
        return Err(TabError::Parse(format!(
            "Unsupported root element: '{}'. Only 'score-partwise' is supported.",
            root.tag_name().name()
        )));
    }

    let mut score = Score::new();
    score.version = root.attribute("version").map(String::from);
    let mut movement_title = None;

    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "work" => parse_work(&child, &mut score),
            "movement-title" => movement_title = text_of(&child),
            "identification" => parse_identification(&child, &mut score),
            "credit" => parse_credit(&child, &mut score),
            "part-list" => parse_part_list(&child, &mut score),
            "part" => parse_part(&child, &mut score)?,
            _ => {}
        }
    }

    if score.title.is_none() {
        score.title = movement_title;
    }

    Ok(score)
}

// ─── Header ──────────────────────────────────────────────────────────

fn parse_work(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        // Only use work-title as a fallback; <credit type="title"> takes priority.
        if child.tag_name().name() == "work-title" && score.title.is_none() {
            score.title = text_of(&child);
        }
    }
}

fn parse_identification(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "creator"
            && child.attribute("type") == Some("composer")
            && score.composer.is_none()
        {
            score.composer = text_of(&child);
        }
    }
}

fn parse_credit(node: &Node, score: &mut Score) {
    let mut credit_type = String::new();
    let mut credit_text = String::new();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "credit-type" => {
                credit_type = child.text().unwrap_or("").trim().to_string();
            }
            "credit-words" => {
                let text = child.text().unwrap_or("").trim();
                if !text.is_empty() {
                    if !credit_text.is_empty() {
                        credit_text.push('\n');
                    }
                    credit_text.push_str(text);
                }
            }
            _ => {}
        }
    }

    if credit_text.is_empty() {
        return;
    }
    match credit_type.as_str() {
        "title" => score.title = Some(credit_text),
        "composer" => score.composer = Some(credit_text),
        _ => {}
    }
}

// ─── Part List ───────────────────────────────────────────────────────

fn parse_part_list(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "score-part" {
            let mut part = Part::new(child.attribute("id").unwrap_or(""));
            for sp_child in child.children().filter(|n| n.is_element()) {
                if sp_child.tag_name().name() == "part-name" {
                    part.name = sp_child.text().unwrap_or("").trim().to_string();
                }
            }
            score.parts.push(part);
        }
    }
}

// ─── Part (measures) ─────────────────────────────────────────────────

fn parse_part(node: &Node, score: &mut Score) -> Result<()> {
    let part_id = node.attribute("id").unwrap_or("");

    // Find the matching part from the part-list
    let part = match score.parts.iter_mut().find(|p| p.id == part_id) {
        Some(p) => p,
        None => {
            debug!(part = part_id, "skipping part missing from part-list");
            return Ok(());
        }
    };

    // <divisions> carries over from measure to measure until changed.
    let mut divisions = 0;
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "measure" {
            part.measures.push(parse_measure(&child, &mut divisions)?);
        }
    }
    Ok(())
}

// ─── Measure ─────────────────────────────────────────────────────────

fn parse_measure(node: &Node, divisions: &mut i32) -> Result<Measure> {
    let number = node
        .attribute("number")
        .and_then(|n| n.parse::<i32>().ok())
        .unwrap_or(0);
    let mut measure = Measure::new(number);
    measure.implicit = node.attribute("implicit") == Some("yes");

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "attributes" => parse_attributes(&child, &mut measure, divisions),
            "note" => {
                if let Some(parsed) = parse_note(&child, *divisions)? {
                    push_note(&mut measure.events, parsed);
                }
            }
            _ => {}
        }
    }

    Ok(measure)
}

// ─── Attributes ──────────────────────────────────────────────────────

fn parse_attributes(node: &Node, measure: &mut Measure, divisions: &mut i32) {
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "divisions" => {
                if let Some(d) = parse_i32(&child) {
                    *divisions = d;
                }
            }
            "key" => measure.events.push(Event::Key(parse_key(&child))),
            "time" => {
                if let Some(time) = parse_time(&child) {
                    measure.events.push(Event::Time(time));
                }
            }
            "clef" => measure.clefs.push(parse_clef(&child)),
            _ => {}
        }
    }
}

fn parse_key(node: &Node) -> KeySignature {
    let mut fifths = 0;
    let mut mode = None;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "fifths" => fifths = parse_i32(&child).unwrap_or(0),
            "mode" => mode = text_of(&child),
            _ => {}
        }
    }
    KeySignature::from_fifths(fifths, mode.as_deref())
}

/// `None` for senza-misura or otherwise unreadable time signatures.
fn parse_time(node: &Node) -> Option<TimeSignature> {
    let mut beats = None;
    let mut beat_type = None;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            // Compound numerators like "3+2" are summed.
            "beats" => {
                beats = child.text().and_then(|t| {
                    t.split('+')
                        .try_fold(0u32, |acc, p| acc.checked_add(p.trim().parse().ok()?))
                })
            }
            "beat-type" => beat_type = parse_i32(&child).and_then(|b| u32::try_from(b).ok()),
            _ => {}
        }
    }
    Some(TimeSignature {
        numerator: beats?,
        denominator: beat_type?,
    })
}

fn parse_clef(node: &Node) -> Clef {
    let number = node
        .attribute("number")
        .and_then(|n| n.parse::<i32>().ok())
        .unwrap_or(1);
    let mut clef = Clef {
        number,
        sign: "G".to_string(),
        line: 2,
        octave_change: None,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "sign" => {
                clef.sign = child.text().unwrap_or("G").trim().to_string();
            }
            "line" => clef.line = parse_i32(&child).unwrap_or(2),
            "clef-octave-change" => clef.octave_change = parse_i32(&child),
            _ => {}
        }
    }
    clef
}

// ─── Note ────────────────────────────────────────────────────────────

/// A `<note>` element before chord folding.
#[derive(Debug)]
struct ParsedNote {
    /// `None` for rests
    pitch: Option<Pitch>,
    duration: Duration,
    /// Sounds together with the previous note
    chord: bool,
}

/// Returns `None` for grace notes, which take no time in the bar.
fn parse_note(node: &Node, divisions: i32) -> Result<Option<ParsedNote>> {
    let mut pitch = None;
    let mut chord = false;
    let mut note_type = None;
    let mut dots = 0u8;
    let mut length = 0;
    let mut tuplet: Option<(u32, u32)> = None;

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "pitch" => pitch = Some(parse_pitch(&child)?),
            "grace" => return Ok(None),
            "chord" => chord = true,
            "duration" => length = parse_i32(&child).unwrap_or(0),
            "type" => note_type = child.text().and_then(|t| NoteType::from_musicxml(t.trim())),
            "dot" => dots = dots.saturating_add(1),
            "time-modification" => tuplet = parse_time_modification(&child),
            _ => {}
        }
    }

    let duration = match (note_type, tuplet) {
        (Some(note_type), Some((actual, normal))) => Duration::Tuplet {
            note_type,
            dots,
            actual,
            normal,
        },
        (Some(note_type), None) => Duration::typed(note_type, dots),
        (None, _) if divisions > 0 && length > 0 => {
            Duration::from_quarter_length(f64::from(length) / f64::from(divisions))
        }
        (None, _) => Duration::Inexpressible,
    };

    Ok(Some(ParsedNote {
        pitch,
        duration,
        chord,
    }))
}

fn parse_time_modification(node: &Node) -> Option<(u32, u32)> {
    let mut actual = None;
    let mut normal = None;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "actual-notes" => actual = parse_i32(&child).and_then(|v| u32::try_from(v).ok()),
            "normal-notes" => normal = parse_i32(&child).and_then(|v| u32::try_from(v).ok()),
            _ => {}
        }
    }
    Some((actual?, normal?))
}

fn parse_pitch(node: &Node) -> Result<Pitch> {
    let mut step = Step::C;
    let mut octave = 4;
    let mut alter = 0;
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "step" => {
                let text = child.text().unwrap_or("").trim();
                step = text
                    .chars()
                    .next()
                    .and_then(Step::from_letter)
                    .filter(|_| text.len() == 1)
                    .ok_or_else(|| TabError::Parse(format!("Invalid pitch step: '{text}'")))?;
            }
            "octave" => octave = parse_i32(&child).unwrap_or(4),
            // Microtonal alterations round to the nearest semitone.
            "alter" => alter = parse_f64(&child).map_or(0, |a| a.round() as i32),
            _ => {}
        }
    }
    Ok(Pitch::new(step, alter, octave))
}

/// Append a note to the measure, folding `<chord/>` notes into the
/// preceding note or chord.
fn push_note(events: &mut Vec<Event>, parsed: ParsedNote) {
    let Some(pitch) = parsed.pitch else {
        events.push(Event::rest(parsed.duration));
        return;
    };

    if parsed.chord {
        match events.last_mut() {
            Some(Event::Chord(chord)) => {
                chord.pitches.push(pitch);
                return;
            }
            Some(Event::Note(note)) => {
                let (first, duration) = (note.pitch, note.duration);
                events.pop();
                events.push(Event::chord(vec![first, pitch], duration));
                return;
            }
            _ => {}
        }
    }

    events.push(Event::note(pitch, parsed.duration));
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn text_of(node: &Node) -> Option<String> {
    node.text()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}

fn parse_i32(node: &Node) -> Option<i32> {
    node.text()?.trim().parse().ok()
}

fn parse_f64(node: &Node) -> Option<f64> {
    node.text()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(measures: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="3.1">
  <part-list><score-part id="P1"><part-name>Guitar</part-name></score-part></part-list>
  <part id="P1">{measures}</part>
</score-partwise>"#
        )
    }

    fn first_measure(xml: &str) -> Measure {
        let score = parse_musicxml(xml).unwrap();
        score.parts[0].measures[0].clone()
    }

    #[test]
    fn rejects_timewise_scores() {
        let err = parse_musicxml("<score-timewise/>").unwrap_err();
        assert!(matches!(err, TabError::Parse(_)));
    }

    #[test]
    fn rejects_malformed_xml() {
        assert!(matches!(parse_musicxml("<score-partwise>"), Err(TabError::Parse(_))));
    }

    #[test]
    fn chord_notes_fold_into_previous() {
        let m = first_measure(&wrap(
            r#"<measure number="1">
                 <note><pitch><step>E</step><octave>4</octave></pitch><duration>2</duration><type>half</type></note>
                 <note><chord/><pitch><step>G</step><octave>4</octave></pitch><duration>2</duration><type>half</type></note>
                 <note><chord/><pitch><step>B</step><octave>4</octave></pitch><duration>2</duration><type>half</type></note>
               </measure>"#,
        ));
        assert_eq!(m.events.len(), 1);
        match &m.events[0] {
            Event::Chord(chord) => {
                assert_eq!(chord.pitches.len(), 3);
                assert_eq!(chord.duration, Duration::HALF);
            }
            other => panic!("expected chord, got {other:?}"),
        }
    }

    #[test]
    fn grace_notes_are_skipped() {
        let m = first_measure(&wrap(
            r#"<measure number="1">
                 <note><grace/><pitch><step>D</step><octave>4</octave></pitch><type>eighth</type></note>
                 <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration><type>quarter</type></note>
               </measure>"#,
        ));
        assert_eq!(m.events, vec![Event::note("C4".parse().unwrap(), Duration::QUARTER)]);
    }

    #[test]
    fn duration_inferred_without_type() {
        let m = first_measure(&wrap(
            r#"<measure number="1">
                 <attributes><divisions>2</divisions></attributes>
                 <note><rest measure="yes"/><duration>3</duration></note>
               </measure>"#,
        ));
        assert_eq!(
            m.events,
            vec![Event::rest(Duration::typed(NoteType::Quarter, 1))]
        );
    }

    #[test]
    fn tuplets_are_marked() {
        let m = first_measure(&wrap(
            r#"<measure number="1">
                 <note><pitch><step>A</step><octave>3</octave></pitch><duration>1</duration><type>eighth</type>
                   <time-modification><actual-notes>3</actual-notes><normal-notes>2</normal-notes></time-modification></note>
               </measure>"#,
        ));
        match &m.events[0] {
            Event::Note(note) => assert_eq!(note.duration.full_name(), "Eighth Triplet"),
            other => panic!("expected note, got {other:?}"),
        }
    }

    #[test]
    fn invalid_step_is_a_parse_error() {
        let xml = wrap(
            r#"<measure number="1">
                 <note><pitch><step>H</step><octave>4</octave></pitch><duration>1</duration></note>
               </measure>"#,
        );
        assert!(matches!(parse_musicxml(&xml), Err(TabError::Parse(_))));
    }

    #[test]
    fn compound_time_signature_is_summed() {
        let m = first_measure(&wrap(
            r#"<measure number="1">
                 <attributes><time><beats>3+2</beats><beat-type>8</beat-type></time></attributes>
               </measure>"#,
        ));
        assert_eq!(m.events, vec![Event::time(5, 8)]);
    }

    #[test]
    fn overflowing_time_signature_is_ignored() {
        let m = first_measure(&wrap(
            r#"<measure number="1">
                 <attributes><time><beats>4294967295+1</beats><beat-type>4</beat-type></time></attributes>
               </measure>"#,
        ));
        assert!(m.events.is_empty(), "{:?}", m.events);
    }
}
