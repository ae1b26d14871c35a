//! Reader contract consumed by the Jianpu writer, and its implementation
//! over a parsed [`Score`].
//!
//! The writer never looks at the MusicXML model directly. It pulls measures
//! through [`ScoreReader`], where every note already carries the key
//! signature and divisions in force and harmony symbols are interleaved with
//! notes in document order.

use crate::error::JianpuError;
use crate::model::*;

/// Barline kinds the writer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BarlineType {
    #[default]
    Normal,
    Repeat,
    Double,
    Final,
}

/// Accidental as spelled on a note or stored in the accidental table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Accidental {
    #[default]
    None,
    Sharp,
    Flat,
    Natural,
}

impl Accidental {
    /// Text mark appended after the scale degree.
    pub fn mark(self) -> &'static str {
        match self {
            Accidental::None => "",
            Accidental::Sharp => "#",
            Accidental::Flat => "b",
            Accidental::Natural => "=",
        }
    }
}

/// Pitch spelling of one event, as handed over by the reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PitchSpelling {
    /// Step letter, "C" through "B"; validated by the encoder
    pub step: String,
    /// Alteration implied by the pitch itself (sharp, flat or none)
    pub accidental: Accidental,
    /// The note prints an explicit accidental
    pub forced: bool,
    pub octave: i32,
}

impl PitchSpelling {
    pub fn new(step: &str, accidental: Accidental, octave: i32) -> Self {
        Self {
            step: step.to_string(),
            accidental,
            forced: false,
            octave,
        }
    }

    pub fn forced(mut self) -> Self {
        self.forced = true;
        self
    }

    /// Accidental the note states explicitly. A printed accidental on an
    /// unaltered pitch is a natural.
    pub fn explicit(&self) -> Accidental {
        match self.accidental {
            Accidental::None if self.forced => Accidental::Natural,
            other => other,
        }
    }
}

/// One note or rest, with everything the encoder needs resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteEvent {
    /// None for rests
    pub pitch: Option<PitchSpelling>,
    /// Displayed duration, in the same unit as `divisions`
    pub duration: i64,
    /// Units per quarter note
    pub divisions: i64,
    pub grace: bool,
    /// Not the first note of a chord
    pub chord: bool,
    pub tie_start: bool,
    pub tie_stop: bool,
    pub tuplet_start: bool,
    pub tuplet_stop: bool,
    /// Key signature name in force ("C", "Bb", "F#", ...)
    pub key_signature: String,
}

impl NoteEvent {
    pub fn note(pitch: PitchSpelling, duration: i64, divisions: i64, key: &str) -> Self {
        Self {
            pitch: Some(pitch),
            duration,
            divisions,
            grace: false,
            chord: false,
            tie_start: false,
            tie_stop: false,
            tuplet_start: false,
            tuplet_stop: false,
            key_signature: key.to_string(),
        }
    }

    pub fn rest(duration: i64, divisions: i64, key: &str) -> Self {
        Self {
            pitch: None,
            ..Self::note(PitchSpelling::new("C", Accidental::None, 4), duration, divisions, key)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MeasureEvent {
    Note(NoteEvent),
    /// Chord symbol text
    Harmony(String),
}

/// A measure's events in document order plus its barlines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeasureEvents {
    pub left_barline: BarlineType,
    pub right_barline: BarlineType,
    pub events: Vec<MeasureEvent>,
}

pub type MeasureIter<'a> = Box<dyn Iterator<Item = Result<MeasureEvents, JianpuError>> + 'a>;

/// Source of score metadata and per-part measure sequences.
pub trait ScoreReader {
    fn work_title(&self) -> Option<String>;
    fn composer(&self) -> Option<String>;
    /// Key signature name of the first measure, e.g. "Eb".
    fn initial_key_signature(&self) -> String;
    /// Time signature of the first measure, e.g. "3/4".
    fn initial_time_signature(&self) -> String;
    fn part_ids(&self) -> Vec<String>;
    /// Lazily yields the measures of one part, in order.
    fn measures<'a>(&'a self, part_id: &str) -> Result<MeasureIter<'a>, JianpuError>;
}

/// Key signature name for a circle-of-fifths position. Only -6..=6 map to
/// names the writer recognizes.
pub fn key_name_for_fifths(fifths: i32) -> &'static str {
    match fifths {
        0 => "C",
        1 => "G",
        2 => "D",
        3 => "A",
        4 => "E",
        5 => "B",
        6 => "F#",
        7 => "C#",
        -1 => "F",
        -2 => "Bb",
        -3 => "Eb",
        -4 => "Ab",
        -5 => "Db",
        -6 => "Gb",
        -7 => "Cb",
        _ => "?",
    }
}

/// Chord symbol text for a harmony, e.g. "Bbm7/F".
pub fn harmony_symbol(harmony: &Harmony) -> String {
    let kind = match harmony.text.as_deref() {
        Some(text) => text,
        None => match harmony.kind.as_str() {
            "major" => "",
            "minor" => "m",
            "dominant" | "dominant-seventh" => "7",
            "major-seventh" => "maj7",
            "minor-seventh" => "m7",
            "diminished" => "dim",
            "diminished-seventh" => "dim7",
            "augmented" => "aug",
            "half-diminished" => "m7b5",
            "suspended-fourth" => "sus4",
            "suspended-second" => "sus2",
            "major-sixth" => "6",
            "minor-sixth" => "m6",
            "dominant-ninth" => "9",
            "none" => "",
            other => other,
        },
    };
    let mut symbol = format!("{}{}{}", harmony.root.step, alter_mark(harmony.root.alter), kind);
    if let Some(ref bass) = harmony.bass {
        symbol.push('/');
        symbol.push_str(&bass.step);
        symbol.push_str(alter_mark(bass.alter));
    }
    symbol
}

fn alter_mark(alter: Option<f64>) -> &'static str {
    match alter {
        Some(a) if a > 0.0 => "#",
        Some(a) if a < 0.0 => "b",
        _ => "",
    }
}

/// [`ScoreReader`] over a parsed MusicXML [`Score`].
pub struct ScoreModelReader<'a> {
    score: &'a Score,
}

impl<'a> ScoreModelReader<'a> {
    pub fn new(score: &'a Score) -> Self {
        Self { score }
    }

    fn first_attributes(&self) -> impl Iterator<Item = &'a Attributes> {
        self.score
            .parts
            .first()
            .into_iter()
            .flat_map(|p| p.measures.iter())
            .filter_map(|m| m.attributes.as_ref())
    }
}

impl ScoreReader for ScoreModelReader<'_> {
    fn work_title(&self) -> Option<String> {
        self.score.title.clone().filter(|t| !t.is_empty())
    }

    fn composer(&self) -> Option<String> {
        self.score.composer.clone().filter(|c| !c.is_empty())
    }

    fn initial_key_signature(&self) -> String {
        let fifths = self
            .first_attributes()
            .find_map(|a| a.key.as_ref())
            .map_or(0, |k| k.fifths);
        key_name_for_fifths(fifths).to_string()
    }

    fn initial_time_signature(&self) -> String {
        self.first_attributes()
            .find_map(|a| a.time.as_ref())
            .map_or_else(|| "4/4".to_string(), |t| format!("{}/{}", t.beats, t.beat_type))
    }

    fn part_ids(&self) -> Vec<String> {
        self.score.parts.iter().map(|p| p.id.clone()).collect()
    }

    fn measures<'r>(&'r self, part_id: &str) -> Result<MeasureIter<'r>, JianpuError> {
        let part = self
            .score
            .part(part_id)
            .ok_or_else(|| JianpuError::Parse(format!("no part with id '{part_id}'")))?;

        let mut divisions: i64 = 1;
        let mut key = key_name_for_fifths(0);
        Ok(Box::new(part.measures.iter().map(move |measure| {
            if let Some(ref attrs) = measure.attributes {
                if let Some(d) = attrs.divisions.filter(|&d| d > 0) {
                    divisions = i64::from(d);
                }
                if let Some(ref k) = attrs.key {
                    key = key_name_for_fifths(k.fifths);
                    if !(-6..=6).contains(&k.fifths) {
                        log::warn!("measure {}: key with {} fifths has no Jianpu name", measure.number, k.fifths);
                    }
                }
            }
            Ok(measure_events(measure, divisions, key))
        })))
    }
}

fn measure_events(measure: &Measure, divisions: i64, key: &str) -> MeasureEvents {
    let mut events = Vec::with_capacity(measure.notes.len() + measure.harmonies.len());
    let mut harmonies = measure.harmonies.iter().peekable();

    for (i, note) in measure.notes.iter().enumerate() {
        while let Some(h) = harmonies.next_if(|h| h.note_index <= i) {
            events.push(MeasureEvent::Harmony(harmony_symbol(h)));
        }
        events.push(MeasureEvent::Note(note_event(note, divisions, key)));
    }
    events.extend(harmonies.map(|h| MeasureEvent::Harmony(harmony_symbol(h))));

    MeasureEvents {
        left_barline: left_barline_type(measure),
        right_barline: right_barline_type(measure),
        events,
    }
}

fn note_event(note: &Note, divisions: i64, key: &str) -> NoteEvent {
    let (duration, divisions) = match note.time_modification {
        Some(ref tm) if note.tuplet_start || note.tuplet_stop || tm.actual_notes != tm.normal_notes => (
            i64::from(note.duration) * i64::from(tm.actual_notes),
            divisions * i64::from(tm.normal_notes),
        ),
        _ => (i64::from(note.duration), divisions),
    };

    let pitch = if note.rest {
        None
    } else {
        note.pitch.as_ref().map(|p| {
            let accidental = match p.alter {
                Some(a) if a > 0.0 => Accidental::Sharp,
                Some(a) if a < 0.0 => Accidental::Flat,
                _ => Accidental::None,
            };
            PitchSpelling {
                step: p.step.clone(),
                accidental,
                forced: note.accidental.is_some(),
                octave: p.octave,
            }
        })
    };

    NoteEvent {
        pitch,
        duration,
        divisions,
        grace: note.grace,
        chord: note.chord,
        tie_start: note.tie_start,
        tie_stop: note.tie_stop,
        tuplet_start: note.tuplet_start,
        tuplet_stop: note.tuplet_stop,
        key_signature: key.to_string(),
    }
}

fn left_barline_type(measure: &Measure) -> BarlineType {
    match measure.barline("left") {
        Some(bl) if bl.repeat.as_ref().is_some_and(|r| r.direction == "forward") => BarlineType::Repeat,
        _ => BarlineType::Normal,
    }
}

fn right_barline_type(measure: &Measure) -> BarlineType {
    let Some(bl) = measure.barline("right") else {
        return BarlineType::Normal;
    };
    if bl.repeat.as_ref().is_some_and(|r| r.direction == "backward") {
        return BarlineType::Repeat;
    }
    match bl.bar_style.as_deref() {
        Some("light-heavy") => BarlineType::Final,
        Some("light-light") => BarlineType::Double,
        _ => BarlineType::Normal,
    }
}
