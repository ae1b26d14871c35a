//! Data model for representing a parsed MusicXML score.
//!
//! These structures capture the musical information the Jianpu encoder
//! consumes: part order, measure contents in document order, key and time
//! signatures, and the per-note flags that drive ties, tuplets and grace notes.

use serde::{Deserialize, Serialize};

/// A complete musical score parsed from MusicXML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Score {
    /// Title of the piece
    pub title: Option<String>,
    /// Subtitle
    pub subtitle: Option<String>,
    /// Composer name
    pub composer: Option<String>,
    /// Arranger name
    pub arranger: Option<String>,
    /// MusicXML version (e.g., "3.1", "4.0")
    pub version: Option<String>,
    /// Software that created the file
    pub software: Option<String>,
    /// Musical parts (instruments), in part-list order
    pub parts: Vec<Part>,
}

/// A musical part (one instrument or voice).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Part {
    /// Part identifier (e.g., "P1")
    pub id: String,
    /// Part name (e.g., "Melody")
    pub name: String,
    /// Abbreviated name
    pub abbreviation: Option<String>,
    /// Ordered list of measures
    pub measures: Vec<Measure>,
}

/// A single measure (bar) of music.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Measure {
    /// Measure number
    pub number: i32,
    /// Whether this is an implicit measure (e.g., pickup/anacrusis)
    pub implicit: bool,
    /// Attributes (key, time, divisions), only present when they change
    pub attributes: Option<Attributes>,
    /// Notes and rests in document order
    pub notes: Vec<Note>,
    /// Chord symbols, each tagged with its position among `notes`
    pub harmonies: Vec<Harmony>,
    /// Barlines (repeat signs, double bars, etc.)
    pub barlines: Vec<Barline>,
}

/// Musical attributes that may change at the start of a measure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attributes {
    /// Divisions per quarter note (determines duration resolution)
    pub divisions: Option<i32>,
    /// Key signature
    pub key: Option<Key>,
    /// Time signature
    pub time: Option<TimeSignature>,
}

/// Key signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Key {
    /// Number of sharps (positive) or flats (negative)
    pub fifths: i32,
    /// Mode (e.g., "major", "minor")
    pub mode: Option<String>,
}

/// Time signature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSignature {
    /// Numerator (e.g., 3 in 3/4)
    pub beats: i32,
    /// Denominator (e.g., 4 in 3/4)
    pub beat_type: i32,
}

/// A single note or rest.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Note {
    /// Pitch (None if this is a rest)
    pub pitch: Option<Pitch>,
    /// Duration in divisions (0 for grace notes)
    pub duration: i32,
    /// Voice number (for multi-voice writing)
    pub voice: Option<i32>,
    /// Note type: "whole", "half", "quarter", "eighth", "16th", "32nd"
    pub note_type: Option<String>,
    /// Whether this is a rest
    pub rest: bool,
    /// Whether this note is part of a chord with the previous note
    pub chord: bool,
    /// Whether this is a grace note
    pub grace: bool,
    /// Whether the note has a dot
    pub dot: bool,
    /// Printed accidental: "sharp", "flat", "natural", ...
    pub accidental: Option<String>,
    /// Tie starts on this note
    pub tie_start: bool,
    /// Tie ends on this note
    pub tie_stop: bool,
    /// Tuplet ratio, when the note belongs to a tuplet
    pub time_modification: Option<TimeModification>,
    /// A tuplet bracket starts on this note
    pub tuplet_start: bool,
    /// A tuplet bracket ends on this note
    pub tuplet_stop: bool,
    /// Staff number (1-based; for multi-staff parts like piano)
    pub staff: Option<i32>,
}

/// Pitch of a note.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pitch {
    /// Note name: A, B, C, D, E, F, G
    pub step: String,
    /// Octave number (middle C = C4)
    pub octave: i32,
    /// Chromatic alteration: -1.0 = flat, 1.0 = sharp, 0.0 = natural
    pub alter: Option<f64>,
}

/// `<time-modification>`: `actual_notes` in the time of `normal_notes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeModification {
    pub actual_notes: i32,
    pub normal_notes: i32,
}

/// A chord symbol (harmony).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Harmony {
    /// Root note
    pub root: HarmonyRoot,
    /// Chord quality: "major", "minor", "dominant", "diminished", etc.
    pub kind: String,
    /// Display text from the `<kind text="...">` attribute, if any
    pub text: Option<String>,
    /// Bass note (for slash chords)
    pub bass: Option<HarmonyRoot>,
    /// Number of `<note>` elements preceding this harmony in the measure
    pub note_index: usize,
}

/// Root or bass note of a harmony.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarmonyRoot {
    /// Note name: A–G
    pub step: String,
    /// Alteration: -1 = flat, 1 = sharp
    pub alter: Option<f64>,
}

/// A barline (may include repeat signs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Barline {
    /// Location: "left", "right", "middle"
    pub location: String,
    /// Visual style: "regular", "light-light", "light-heavy", "heavy-light", etc.
    pub bar_style: Option<String>,
    /// Repeat sign
    pub repeat: Option<Repeat>,
}

/// A repeat sign on a barline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repeat {
    /// "forward" or "backward"
    pub direction: String,
}

impl Score {
    /// Create a new empty score.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the largest measure count across all parts.
    pub fn measure_count(&self) -> usize {
        self.parts.iter().map(|p| p.measures.len()).max().unwrap_or(0)
    }

    /// Look up a part by its identifier.
    pub fn part(&self, id: &str) -> Option<&Part> {
        self.parts.iter().find(|p| p.id == id)
    }
}

impl Measure {
    /// Barline at the given location ("left" or "right"), if declared.
    pub fn barline(&self, location: &str) -> Option<&Barline> {
        self.barlines.iter().find(|b| b.location == location)
    }
}
