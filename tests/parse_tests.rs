//! Integration tests: parse MusicXML documents into the score model.

use scoretab::{parse_bytes, parse_file, score_to_json, Duration, Event, NoteType, Score};

const TWO_PARTS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="3.1">
  <work><work-title>Fallback Title</work-title></work>
  <identification><creator type="composer">Luiz Gonzaga</creator></identification>
  <credit page="1"><credit-type>title</credit-type><credit-words>Asa branca</credit-words></credit>
  <part-list>
    <score-part id="P1"><part-name>Classical Guitar</part-name></score-part>
    <score-part id="P2"><part-name>Bass</part-name></score-part>
  </part-list>
  <part id="P1">
    <measure number="0" implicit="yes">
      <attributes>
        <divisions>2</divisions>
        <key><fifths>0</fifths></key>
        <time><beats>2</beats><beat-type>4</beat-type></time>
        <clef><sign>G</sign><line>2</line><clef-octave-change>-1</clef-octave-change></clef>
      </attributes>
      <note><pitch><step>C</step><octave>4</octave></pitch><duration>1</duration><type>eighth</type></note>
      <note><pitch><step>D</step><octave>4</octave></pitch><duration>1</duration><type>eighth</type></note>
    </measure>
    <measure number="1">
      <note><pitch><step>B</step><alter>-1</alter><octave>3</octave></pitch><duration>2</duration><type>quarter</type></note>
      <note><rest/><duration>2</duration><type>quarter</type></note>
    </measure>
  </part>
  <part id="P2">
    <measure number="0" implicit="yes">
      <attributes><divisions>1</divisions><clef><sign>F</sign><line>4</line></clef></attributes>
      <note><rest/><duration>1</duration><type>quarter</type></note>
    </measure>
  </part>
</score-partwise>"#;

fn parse(xml: &str) -> Score {
    parse_bytes(xml.as_bytes(), Some("musicxml")).expect("Failed to parse fixture")
}

#[test]
fn parses_metadata_and_parts() {
    let score = parse(TWO_PARTS);

    // <credit> wins over <work-title>
    assert_eq!(score.title.as_deref(), Some("Asa branca"));
    assert_eq!(score.composer.as_deref(), Some("Luiz Gonzaga"));
    assert_eq!(score.version.as_deref(), Some("3.1"));

    assert_eq!(score.parts.len(), 2);
    assert_eq!(score.parts[0].id, "P1");
    assert_eq!(score.parts[0].name, "Classical Guitar");
    assert_eq!(score.parts[1].name, "Bass");
    assert_eq!(score.measure_count(), 2);
}

#[test]
fn attributes_become_markers_and_clefs() {
    let score = parse(TWO_PARTS);
    let m0 = &score.parts[0].measures[0];

    assert_eq!(m0.number, 0);
    assert!(m0.implicit, "Measure 0 should be implicit (anacrusis)");
    assert_eq!(m0.events[0], Event::key("C major"));
    assert_eq!(m0.events[1], Event::time(2, 4));

    assert_eq!(m0.clefs.len(), 1);
    assert_eq!(m0.clefs[0].sign, "G");
    assert_eq!(m0.clefs[0].octave_change, Some(-1));
}

#[test]
fn notes_and_rests_in_order() {
    let score = parse(TWO_PARTS);
    let m0 = &score.parts[0].measures[0];
    let eighth = Duration::typed(NoteType::Eighth, 0);
    assert_eq!(m0.events[2], Event::note("C4".parse().unwrap(), eighth));
    assert_eq!(m0.events[3], Event::note("D4".parse().unwrap(), eighth));

    let m1 = &score.parts[0].measures[1];
    assert_eq!(
        m1.events,
        vec![
            Event::note("Bb3".parse().unwrap(), Duration::QUARTER),
            Event::rest(Duration::QUARTER),
        ]
    );

    // MIDI check on the flat
    match &m1.events[0] {
        Event::Note(note) => assert_eq!(note.pitch.to_midi(), 58),
        other => panic!("expected note, got {other:?}"),
    }
}

#[test]
fn format_is_sniffed_without_extension() {
    let score = parse_bytes(TWO_PARTS.as_bytes(), None).unwrap();
    assert_eq!(score.parts.len(), 2);
}

#[test]
fn parse_file_reads_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("asa-branca.xml");
    std::fs::write(&path, TWO_PARTS).unwrap();
    let score = parse_file(&path).unwrap();
    assert_eq!(score.title.as_deref(), Some("Asa branca"));

    assert!(parse_file(dir.path().join("missing.musicxml")).is_err());
}

#[test]
fn json_dump_contains_events() {
    let score = parse(TWO_PARTS);
    let json = score_to_json(&score).unwrap();
    assert!(json.contains("\"Classical Guitar\""));
    assert!(json.contains("\"Key\""));

    let back: Score = serde_json::from_str(&json).unwrap();
    assert_eq!(back, score);
}
