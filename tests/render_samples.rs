//! Rendering tests: encode inline MusicXML scores end to end.

use jianpu99::reader::{
    Accidental, BarlineType, MeasureEvent, MeasureEvents, MeasureIter, NoteEvent, PitchSpelling,
};
use jianpu99::{
    parse_musicxml, render_bytes_to_jianpu, render_score_to_jianpu, ContractViolation,
    JianpuConfig, JianpuError, JianpuWriter, LookupFailure, ScoreReader,
};
use pretty_assertions::assert_eq;

const ATTRS: &str = r#"<attributes><divisions>2</divisions><key><fifths>2</fifths></key>
  <time><beats>3</beats><beat-type>4</beat-type></time></attributes>"#;

fn note(step: &str, alter: Option<i32>, octave: i32, duration: i32, extra: &str) -> String {
    let alter = alter.map(|a| format!("<alter>{a}</alter>")).unwrap_or_default();
    format!(
        "<note><pitch><step>{step}</step>{alter}<octave>{octave}</octave></pitch>\
         <duration>{duration}</duration>{extra}</note>"
    )
}

fn rest(duration: i32) -> String {
    format!("<note><rest/><duration>{duration}</duration></note>")
}

fn harmony(step: &str, kind: &str) -> String {
    format!("<harmony><root><root-step>{step}</root-step></root><kind>{kind}</kind></harmony>")
}

fn four_part_score() -> String {
    let p1 = [
        format!(
            r#"<measure number="1">{ATTRS}<barline location="left"><repeat direction="forward"/></barline>{}{}{}</measure>"#,
            note("F", Some(1), 5, 2, ""),
            "<note><grace/><pitch><step>E</step><octave>5</octave></pitch></note>",
            note("D", None, 5, 4, ""),
        ),
        format!(
            r#"<measure number="2">{}{}{}<barline location="right"><repeat direction="backward"/></barline></measure>"#,
            note("F", None, 5, 2, "<accidental>natural</accidental>"),
            note("F", None, 5, 2, ""),
            note("A", None, 5, 2, r#"<tie type="start"/>"#),
        ),
        format!(
            r#"<measure number="3">{}{}<barline location="right"><bar-style>light-heavy</bar-style></barline></measure>"#,
            note("A", None, 5, 2, r#"<tie type="stop"/>"#),
            rest(4),
        ),
    ]
    .concat();

    let p2 = [
        format!(
            r#"<measure number="1">{ATTRS}{}{}{}</measure>"#,
            note("B", Some(-1), 4, 3, "<accidental>flat</accidental>"),
            note("C", Some(1), 5, 1, ""),
            note("G", None, 5, 2, ""),
        ),
        format!(r#"<measure number="2">{}</measure>"#, rest(6)),
    ]
    .concat();

    let p3 = [
        format!(r#"<measure number="1">{ATTRS}{}</measure>"#, note("D", None, 3, 6, "")),
        format!(r#"<measure number="2">{}</measure>"#, note("A", None, 2, 6, "")),
        format!(r#"<measure number="3">{}</measure>"#, note("D", None, 3, 6, "")),
    ]
    .concat();

    let p4 = [
        format!(
            r#"<measure number="1">{ATTRS}{}{}{}{}{}{}</measure>"#,
            harmony("D", "major"),
            note("D", None, 4, 2, ""),
            note("F", Some(1), 4, 2, "<chord/>"),
            harmony("A", "dominant"),
            note("A", None, 3, 2, ""),
            note("A", None, 3, 2, ""),
        ),
        format!(r#"<measure number="2">{}</measure>"#, rest(6)),
        format!(
            r#"<measure number="3">{}{}</measure>"#,
            harmony("B", "minor"),
            note("B", None, 3, 6, ""),
        ),
    ]
    .concat();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<score-partwise version="3.1">
  <work><work-title>Test Song</work-title></work>
  <identification><creator type="composer">Anon</creator></identification>
  <part-list>
    <score-part id="P1"><part-name>Melody</part-name></score-part>
    <score-part id="P2"><part-name>Counter</part-name></score-part>
    <score-part id="P3"><part-name>Bass</part-name></score-part>
    <score-part id="P4"><part-name>Chords</part-name></score-part>
  </part-list>
  <part id="P1">{p1}</part>
  <part id="P2">{p2}</part>
  <part id="P3">{p3}</part>
  <part id="P4">{p4}</part>
</score-partwise>"#
    )
}

fn two_per_line() -> JianpuConfig {
    JianpuConfig {
        measures_per_line: 2,
        lines_per_page: 1,
        ..Default::default()
    }
}

#[test]
fn render_four_part_score() {
    let score = parse_musicxml(&four_part_score()).expect("Failed to parse score");
    let text = render_score_to_jianpu(&score, &two_per_line()).expect("Failed to render score");

    let expected = concat!(
        "V: 1.0\n",
        "B: Test Song\n",
        "D: D\n",
        "P: 3/4\n",
        "Z: Anon\n",
        "\n",
        "Q1: |: 4# 2 [3] - | 4= 4= ( 6 :|\n",
        "Q2: | 6#,. 1#/ 5 | 0 - - |\n",
        "Q3: | 2, - - | 6,, - - |\n",
        "Q4: | 9 9 9 | 0 - - |\n",
        "C: DA7@@\n",
        "\n",
        "[fenye]\n",
        "\n",
        "Q1: | 6 ) 0 - ||\n",
        "Q2: |\n",
        "Q3: | 2, - - |\n",
        "Q4: | 9 - - |\n",
        "C: Bm\n",
        "\n",
        "[fenye]\n",
    );
    assert_eq!(text, expected);
}

#[test]
fn render_bytes_matches_render_score() {
    let xml = four_part_score();
    let from_bytes = render_bytes_to_jianpu(xml.as_bytes(), None, &two_per_line()).unwrap();
    let score = parse_musicxml(&xml).unwrap();
    assert_eq!(from_bytes, render_score_to_jianpu(&score, &two_per_line()).unwrap());
}

#[test]
fn default_layout_puts_five_measures_per_line() {
    let score = parse_musicxml(&four_part_score()).unwrap();
    let text = render_score_to_jianpu(&score, &JianpuConfig::default()).unwrap();
    assert!(text.contains("Q1: |: 4# 2 [3] - | 4= 4= ( 6 :| 6 ) 0 - ||\n"));
    assert!(text.contains("C: DA7@@Bm\n"));
    assert!(!text.contains("[fenye]"), "one line group never fills a page");
}

fn single_part(key_fifths: i32, body: &str) -> String {
    format!(
        r#"<score-partwise version="3.1">
  <part-list><score-part id="P1"><part-name>Solo</part-name></score-part></part-list>
  <part id="P1"><measure number="1"><attributes><divisions>1</divisions>
    <key><fifths>{key_fifths}</fifths></key></attributes>{body}</measure></part>
</score-partwise>"#
    )
}

#[test]
fn header_writes_flats_as_dollar() {
    let score = parse_musicxml(&single_part(-3, &note("E", Some(-1), 5, 1, ""))).unwrap();
    let text = render_score_to_jianpu(&score, &JianpuConfig::default()).unwrap();
    // E flat in E flat major is still spelled from C: the sharp of 2
    assert_eq!(text, "V: 1.0\nD: E$\nP: 4/4\n\nQ1: | 2# |\n");
}

#[test]
fn unrecognized_key_aborts_without_output() {
    let score = parse_musicxml(&single_part(7, &note("C", Some(1), 5, 1, ""))).unwrap();
    let err = render_score_to_jianpu(&score, &JianpuConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        JianpuError::Lookup(LookupFailure::KeySignature(ref k)) if k == "C#"
    ));
}

#[test]
fn dangling_tie_stop_is_reported() {
    let body = note("C", None, 5, 1, r#"<tie type="stop"/>"#);
    let score = parse_musicxml(&single_part(0, &body)).unwrap();

    let err = render_score_to_jianpu(&score, &JianpuConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        JianpuError::Contract(ContractViolation::TieStopWithoutStart)
    ));

    let lenient = JianpuConfig {
        strict_contracts: false,
        ..Default::default()
    };
    let text = render_score_to_jianpu(&score, &lenient).unwrap();
    assert!(text.contains("Q1: | 1 ) |"));
}

#[test]
fn tie_from_chord_member_renders_in_strict_mode() {
    let body = [
        note("C", None, 5, 1, ""),
        note("E", None, 5, 1, r#"<chord/><tie type="start"/>"#),
        note("E", None, 5, 1, r#"<tie type="stop"/>"#),
    ]
    .concat();
    let score = parse_musicxml(&single_part(0, &body)).unwrap();
    let text = render_score_to_jianpu(&score, &JianpuConfig::default()).unwrap();
    assert!(text.contains("Q1: | 1 3 3 ) |"), "got:\n{text}");
}

#[test]
fn grace_chord_renders_in_strict_mode() {
    let body = [
        "<note><grace/><pitch><step>C</step><octave>5</octave></pitch></note>".to_string(),
        "<note><grace/><chord/><pitch><step>E</step><octave>5</octave></pitch></note>".to_string(),
        note("G", None, 5, 1, ""),
    ]
    .concat();
    let score = parse_musicxml(&single_part(0, &body)).unwrap();
    let text = render_score_to_jianpu(&score, &JianpuConfig::default()).unwrap();
    assert!(text.contains("Q1: | 5 [1]  |"), "got:\n{text}");
}

#[test]
fn triplets_use_displayed_duration() {
    let tm = "<time-modification><actual-notes>3</actual-notes><normal-notes>2</normal-notes></time-modification>";
    let body = [
        note("C", None, 5, 2, &format!(r#"{tm}<notations><tuplet type="start"/></notations>"#)),
        note("D", None, 5, 2, tm),
        note("E", None, 5, 2, &format!(r#"{tm}<notations><tuplet type="stop"/></notations>"#)),
    ]
    .concat();
    let xml = single_part(0, &body).replace("<divisions>1</divisions>", "<divisions>6</divisions>");
    let score = parse_musicxml(&xml).unwrap();
    let text = render_score_to_jianpu(&score, &JianpuConfig::default()).unwrap();
    assert!(text.contains("Q1: | (y1/ 2/ 3/) |"), "got:\n{text}");
}

// ─── Custom readers ─────────────────────────────────────────────────

struct FixedReader;

impl ScoreReader for FixedReader {
    fn work_title(&self) -> Option<String> {
        Some("Custom".into())
    }

    fn composer(&self) -> Option<String> {
        None
    }

    fn initial_key_signature(&self) -> String {
        "F".into()
    }

    fn initial_time_signature(&self) -> String {
        "2/4".into()
    }

    fn part_ids(&self) -> Vec<String> {
        vec!["P1".into()]
    }

    fn measures<'a>(&'a self, part_id: &str) -> Result<MeasureIter<'a>, JianpuError> {
        assert_eq!(part_id, "P1");
        let measure = MeasureEvents {
            right_barline: BarlineType::Final,
            events: vec![
                MeasureEvent::Note(NoteEvent::note(
                    PitchSpelling::new("B", Accidental::Flat, 5),
                    1,
                    1,
                    "F",
                )),
                MeasureEvent::Note(NoteEvent::note(
                    PitchSpelling::new("C", Accidental::None, 5),
                    1,
                    1,
                    "F",
                )),
            ],
            ..Default::default()
        };
        Ok(Box::new(std::iter::once(Ok(measure))))
    }
}

#[test]
fn writer_accepts_any_score_reader() {
    let writer = JianpuWriter::new(JianpuConfig::default());
    let text = writer.generate(&FixedReader).unwrap();
    assert_eq!(text, "V: 1.0\nB: Custom\nD: F\nP: 2/4\n\nQ1: | 6# 1 ||\n");
}

#[test]
fn writer_rejects_zero_measures_per_line() {
    let writer = JianpuWriter::new(JianpuConfig {
        measures_per_line: 0,
        ..Default::default()
    });
    assert!(matches!(writer.generate(&FixedReader), Err(JianpuError::Config(_))));
}
