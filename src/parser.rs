//! MusicXML parser: converts MusicXML XML into the Score data model.

use roxmltree::{Document, Node};

use crate::error::JianpuError;
use crate::model::*;

/// Parse a MusicXML XML string into a Score.
pub fn parse_musicxml(xml: &str) -> Result<Score, JianpuError> {
    // MusicXML files include a DOCTYPE declaration, so we must allow DTDs
    let options = roxmltree::ParsingOptions {
        allow_dtd: true,
        ..Default::default()
    };
    let doc = Document::parse_with_options(xml, options)?;
    let root = doc.root_element();

    if root.tag_name().name() != "score-partwise" {
        return Err(JianpuError::Parse(format!(
            "unsupported root element '{}', only 'score-partwise' is supported",
            root.tag_name().name()
        )));
    }

    let mut score = Score::new();
    score.version = root.attribute("version").map(String::from);
    let mut movement_title = None;

    for child in root.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "work" => parse_work(&child, &mut score),
            "movement-title" => movement_title = trimmed_text(&child),
            "identification" => parse_identification(&child, &mut score),
            "credit" => parse_credit(&child, &mut score),
            "part-list" => parse_part_list(&child, &mut score),
            "part" => parse_part(&child, &mut score),
            _ => {}
        }
    }

    if score.title.is_none() {
        score.title = movement_title;
    }

    log::debug!(
        "parsed score {:?}: {} parts, {} measures",
        score.title,
        score.parts.len(),
        score.measure_count()
    );
    Ok(score)
}

// ─── Work ────────────────────────────────────────────────────────────

fn parse_work(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        // <credit type="title"> takes priority over <work-title>
        if child.tag_name().name() == "work-title" && score.title.is_none() {
            score.title = trimmed_text(&child);
        }
    }
}

// ─── Identification ──────────────────────────────────────────────────

fn parse_identification(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "creator" => {
                let text = trimmed_text(&child);
                match child.attribute("type").unwrap_or("") {
                    "composer" => {
                        if score.composer.is_none() {
                            score.composer = text;
                        }
                    }
                    "arranger" => score.arranger = text,
                    _ => {}
                }
            }
            "encoding" => {
                for enc_child in child.children().filter(|n| n.is_element()) {
                    if enc_child.tag_name().name() == "software" {
                        score.software = trimmed_text(&enc_child);
                    }
                }
            }
            _ => {}
        }
    }
}

// ─── Credits ─────────────────────────────────────────────────────────

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
                        credit_text.push(' ');
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
        "subtitle" => score.subtitle = Some(credit_text),
        "composer" => score.composer = Some(credit_text),
        _ => {}
    }
}

// ─── Part List ───────────────────────────────────────────────────────

fn parse_part_list(node: &Node, score: &mut Score) {
    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() != "score-part" {
            continue;
        }
        let mut part = Part {
            id: child.attribute("id").unwrap_or("").to_string(),
            ..Default::default()
        };
        for sp_child in child.children().filter(|n| n.is_element()) {
            match sp_child.tag_name().name() {
                "part-name" => part.name = trimmed_text(&sp_child).unwrap_or_default(),
                "part-abbreviation" => part.abbreviation = trimmed_text(&sp_child),
                _ => {}
            }
        }
        score.parts.push(part);
    }
}

// ─── Part (measures) ─────────────────────────────────────────────────

fn parse_part(node: &Node, score: &mut Score) {
    let part_id = node.attribute("id").unwrap_or("");

    let part = match score.parts.iter_mut().find(|p| p.id == part_id) {
        Some(p) => p,
        None => {
            log::warn!("part '{part_id}' is not declared in the part-list, skipping");
            return;
        }
    };

    for child in node.children().filter(|n| n.is_element()) {
        if child.tag_name().name() == "measure" {
            part.measures.push(parse_measure(&child));
        }
    }
}

// ─── Measure ─────────────────────────────────────────────────────────

fn parse_measure(node: &Node) -> Measure {
    let mut measure = Measure {
        number: node
            .attribute("number")
            .and_then(|n| n.parse::<i32>().ok())
            .unwrap_or(0),
        implicit: node.attribute("implicit") == Some("yes"),
        ..Default::default()
    };

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            // Later <attributes> blocks in the same measure refine earlier ones
            "attributes" => {
                let attrs = parse_attributes(&child);
                measure.attributes = Some(match measure.attributes.take() {
                    Some(prev) => Attributes {
                        divisions: attrs.divisions.or(prev.divisions),
                        key: attrs.key.or(prev.key),
                        time: attrs.time.or(prev.time),
                    },
                    None => attrs,
                });
            }
            "note" => measure.notes.push(parse_note(&child)),
            "harmony" => {
                let note_index = measure.notes.len();
                measure.harmonies.push(parse_harmony(&child, note_index));
            }
            "barline" => measure.barlines.push(parse_barline(&child)),
            _ => {}
        }
    }

    measure
}

// ─── Attributes ──────────────────────────────────────────────────────

fn parse_attributes(node: &Node) -> Attributes {
    let mut attrs = Attributes::default();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "divisions" => attrs.divisions = parse_i32(&child),
            "key" => attrs.key = Some(parse_key(&child)),
            "time" => attrs.time = Some(parse_time(&child)),
            _ => {}
        }
    }

    attrs
}

fn parse_key(node: &Node) -> Key {
    let mut key = Key {
        fifths: 0,
        mode: None,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "fifths" => key.fifths = parse_i32(&child).unwrap_or(0),
            "mode" => key.mode = trimmed_text(&child),
            _ => {}
        }
    }
    key
}

fn parse_time(node: &Node) -> TimeSignature {
    let mut ts = TimeSignature {
        beats: 4,
        beat_type: 4,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "beats" => ts.beats = parse_i32(&child).unwrap_or(4),
            "beat-type" => ts.beat_type = parse_i32(&child).unwrap_or(4),
            _ => {}
        }
    }
    ts
}

// ─── Note ────────────────────────────────────────────────────────────

fn parse_note(node: &Node) -> Note {
    let mut note = Note::default();

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "pitch" => note.pitch = Some(parse_pitch(&child)),
            "duration" => note.duration = parse_i32(&child).unwrap_or(0),
            "voice" => note.voice = parse_i32(&child),
            "staff" => note.staff = parse_i32(&child),
            "type" => note.note_type = trimmed_text(&child),
            "rest" => note.rest = true,
            "grace" => note.grace = true,
            "chord" => note.chord = true,
            "dot" => note.dot = true,
            "accidental" => note.accidental = trimmed_text(&child),
            "tie" => match child.attribute("type") {
                Some("start") => note.tie_start = true,
                Some("stop") => note.tie_stop = true,
                _ => {}
            },
            "time-modification" => note.time_modification = Some(parse_time_modification(&child)),
            "notations" => parse_notations(&child, &mut note),
            _ => {}
        }
    }

    note
}

fn parse_notations(node: &Node, note: &mut Note) {
    for nc in node.children().filter(|n| n.is_element()) {
        match nc.tag_name().name() {
            "tuplet" => match nc.attribute("type") {
                Some("start") => note.tuplet_start = true,
                Some("stop") => note.tuplet_stop = true,
                _ => {}
            },
            // <tied> mirrors <tie>; some exporters only write one of the two
            "tied" => match nc.attribute("type") {
                Some("start") => note.tie_start = true,
                Some("stop") => note.tie_stop = true,
                _ => {}
            },
            _ => {}
        }
    }
}

fn parse_pitch(node: &Node) -> Pitch {
    let mut pitch = Pitch {
        step: "C".to_string(),
        octave: 4,
        alter: None,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "step" => pitch.step = child.text().unwrap_or("C").trim().to_string(),
            "octave" => pitch.octave = parse_i32(&child).unwrap_or(4),
            "alter" => pitch.alter = parse_f64(&child),
            _ => {}
        }
    }
    pitch
}

fn parse_time_modification(node: &Node) -> TimeModification {
    let mut tm = TimeModification {
        actual_notes: 1,
        normal_notes: 1,
    };
    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "actual-notes" => tm.actual_notes = parse_i32(&child).unwrap_or(1),
            "normal-notes" => tm.normal_notes = parse_i32(&child).unwrap_or(1),
            _ => {}
        }
    }
    tm
}

// ─── Harmony ─────────────────────────────────────────────────────────

fn parse_harmony(node: &Node, note_index: usize) -> Harmony {
    let mut root = HarmonyRoot {
        step: "C".to_string(),
        alter: None,
    };
    let mut kind = "major".to_string();
    let mut text = None;
    let mut bass = None;

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "root" => {
                for rc in child.children().filter(|n| n.is_element()) {
                    match rc.tag_name().name() {
                        "root-step" => root.step = rc.text().unwrap_or("C").trim().to_string(),
                        "root-alter" => root.alter = parse_f64(&rc),
                        _ => {}
                    }
                }
            }
            "kind" => {
                kind = child.text().unwrap_or("major").trim().to_string();
                text = child.attribute("text").map(String::from);
            }
            "bass" => {
                let mut b = HarmonyRoot {
                    step: "C".to_string(),
                    alter: None,
                };
                for bc in child.children().filter(|n| n.is_element()) {
                    match bc.tag_name().name() {
                        "bass-step" => b.step = bc.text().unwrap_or("C").trim().to_string(),
                        "bass-alter" => b.alter = parse_f64(&bc),
                        _ => {}
                    }
                }
                bass = Some(b);
            }
            _ => {}
        }
    }

    Harmony {
        root,
        kind,
        text,
        bass,
        note_index,
    }
}

// ─── Barline ─────────────────────────────────────────────────────────

fn parse_barline(node: &Node) -> Barline {
    let mut barline = Barline {
        location: node.attribute("location").unwrap_or("right").to_string(),
        bar_style: None,
        repeat: None,
    };

    for child in node.children().filter(|n| n.is_element()) {
        match child.tag_name().name() {
            "bar-style" => barline.bar_style = trimmed_text(&child),
            "repeat" => {
                let direction = child.attribute("direction").unwrap_or("forward").to_string();
                barline.repeat = Some(Repeat { direction });
            }
            _ => {}
        }
    }

    barline
}

// ─── Helpers ─────────────────────────────────────────────────────────

fn trimmed_text(node: &Node) -> Option<String> {
    node.text().map(|t| t.trim().to_string())
}

fn parse_i32(node: &Node) -> Option<i32> {
    node.text()?.trim().parse().ok()
}

fn parse_f64(node: &Node) -> Option<f64> {
    node.text()?.trim().parse().ok()
}
