//! Token vocabulary of the Jianpu99 text format.

// ── Header ──────────────────────────────────────────────────────────
pub(super) const FORMAT_VERSION: &str = "1.0";
/// Flats are written as '$' in the key line.
pub(super) const HEADER_FLAT: char = '$';

// ── Notes ───────────────────────────────────────────────────────────
pub(super) const REST: &str = "0";
/// Pitch placeholder for chord-rhythm parts.
pub(super) const CHORD_PLACEHOLDER: &str = "9";
pub(super) const SUBDIVISION: &str = "/";
pub(super) const SUSTAIN: &str = " -";
pub(super) const DOTTED: &str = ".";
pub(super) const OCTAVE_UP: char = '\'';
pub(super) const OCTAVE_DOWN: char = ',';
pub(super) const TIE_OPEN: &str = "( ";
pub(super) const TIE_CLOSE: &str = " )";
pub(super) const TUPLET_OPEN: &str = "(y";
pub(super) const TUPLET_CLOSE: &str = ")";
pub(super) const GRACE_OPEN: &str = " [";
pub(super) const GRACE_CLOSE: &str = "] ";

// ── Octave centres ──────────────────────────────────────────────────
pub(super) const MELODY_CENTER_OCTAVE: i32 = 5;
pub(super) const BASS_CENTER_OCTAVE: i32 = 4;

// ── Barlines ────────────────────────────────────────────────────────
pub(super) const BAR_REPEAT_OPEN: &str = ":";
pub(super) const BAR_REPEAT_CLOSE: &str = ":|";
pub(super) const BAR_DOUBLE: &str = "||/";
pub(super) const BAR_FINAL: &str = "||";
pub(super) const BAR_SINGLE: &str = "|";

// ── Layout ──────────────────────────────────────────────────────────
pub(super) const PART_LINE_PREFIX: char = 'Q';
pub(super) const HARMONY_LINE_PREFIX: &str = "C: ";
pub(super) const HARMONY_PLACEHOLDER: char = '@';
pub(super) const PAGE_BREAK: &str = "[fenye]";
