//! Pitch tokens: scale degree, accidental mark and octave marks.
//!
//! Accidentals are resolved against the key signature and against an
//! [`AccidentalTable`] that remembers, per step and octave, which accidental
//! is in force for the rest of the measure.

use super::constants::*;
use crate::error::{JianpuError, LookupFailure};
use crate::reader::{Accidental, PitchSpelling};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Step {
    pub fn from_letter(letter: &str) -> Result<Self, LookupFailure> {
        match letter {
            "C" => Ok(Step::C),
            "D" => Ok(Step::D),
            "E" => Ok(Step::E),
            "F" => Ok(Step::F),
            "G" => Ok(Step::G),
            "A" => Ok(Step::A),
            "B" => Ok(Step::B),
            other => Err(LookupFailure::Step(other.to_string())),
        }
    }

    /// Scale degree in C, 1 through 7.
    pub fn number(self) -> usize {
        self as usize + 1
    }

    /// Next letter up, B wrapping to C.
    pub fn above(self) -> Self {
        match self {
            Step::C => Step::D,
            Step::D => Step::E,
            Step::E => Step::F,
            Step::F => Step::G,
            Step::G => Step::A,
            Step::A => Step::B,
            Step::B => Step::C,
        }
    }

    /// Degree written for the flat of this step, C wrapping to 7.
    fn flat_degree(self) -> usize {
        match self {
            Step::C => 7,
            other => other.number() - 1,
        }
    }
}

/// Accidental a key signature applies, and the steps it applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPolicy {
    pub accidental: Accidental,
    pub affected: &'static [Step],
}

const SHARP_ORDER: [Step; 6] = [Step::F, Step::C, Step::G, Step::D, Step::A, Step::E];
const FLAT_ORDER: [Step; 6] = [Step::B, Step::E, Step::A, Step::D, Step::G, Step::C];

impl KeyPolicy {
    /// Policy for one of the 13 recognized key names.
    pub fn lookup(key: &str) -> Result<Self, LookupFailure> {
        let (accidental, count) = match key {
            "C" => (Accidental::Sharp, 0),
            "G" => (Accidental::Sharp, 1),
            "D" => (Accidental::Sharp, 2),
            "A" => (Accidental::Sharp, 3),
            "E" => (Accidental::Sharp, 4),
            "B" => (Accidental::Sharp, 5),
            "F#" => (Accidental::Sharp, 6),
            "F" => (Accidental::Flat, 1),
            "Bb" => (Accidental::Flat, 2),
            "Eb" => (Accidental::Flat, 3),
            "Ab" => (Accidental::Flat, 4),
            "Db" => (Accidental::Flat, 5),
            "Gb" => (Accidental::Flat, 6),
            other => return Err(LookupFailure::KeySignature(other.to_string())),
        };
        let order: &'static [Step; 6] = match accidental {
            Accidental::Flat => &FLAT_ORDER,
            _ => &SHARP_ORDER,
        };
        Ok(Self {
            accidental,
            affected: &order[..count],
        })
    }

    pub fn alters(&self, step: Step) -> bool {
        self.affected.contains(&step)
    }
}

/// Accidental in force per (step, octave) within the current measure.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AccidentalTable {
    // [step 1..=7][octave 0..=7]; row 0 is unused
    cells: [[Accidental; 8]; 8],
}

impl AccidentalTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.cells = Default::default();
    }

    pub fn is_empty(&self) -> bool {
        self.cells.iter().flatten().all(|&a| a == Accidental::None)
    }

    pub fn get(&self, step: Step, octave: i32) -> Result<Accidental, LookupFailure> {
        Ok(self.cells[step.number()][octave_index(octave)?])
    }

    pub fn set(&mut self, step: Step, octave: i32, accidental: Accidental) -> Result<(), LookupFailure> {
        self.cells[step.number()][octave_index(octave)?] = accidental;
        Ok(())
    }
}

fn octave_index(octave: i32) -> Result<usize, LookupFailure> {
    usize::try_from(octave)
        .ok()
        .filter(|&o| o < 8)
        .ok_or(LookupFailure::Octave(octave))
}

/// Resolve which accidental applies to `pitch` and record it in `table`.
///
/// Key-signature steps take the key's accidental unless the note prints its
/// own or a natural is already in force. Other steps inherit the table, except
/// that a step directly below a recorded flat gets an explicit natural when
/// flats are spelled as sharps (the flat was written as this degree sharped).
pub fn resolve_accidental(
    step: Step,
    pitch: &PitchSpelling,
    key: &KeyPolicy,
    table: &mut AccidentalTable,
    flat_to_sharp: bool,
) -> Result<Accidental, LookupFailure> {
    let octave = pitch.octave;
    let explicit = pitch.explicit();

    let resolved = if key.alters(step) {
        if pitch.forced {
            explicit
        } else if table.get(step, octave)? == Accidental::Natural {
            Accidental::Natural
        } else {
            key.accidental
        }
    } else if explicit == Accidental::None {
        let current = table.get(step, octave)?;
        if flat_to_sharp
            && current == Accidental::None
            && table.get(step.above(), octave)? == Accidental::Flat
        {
            Accidental::Natural
        } else {
            return Ok(current);
        }
    } else {
        explicit
    };

    table.set(step, octave, resolved)?;
    Ok(resolved)
}

/// Full pitch token for one note, e.g. `"4#'"`, `"7,"`, `"2="`.
pub fn encode_pitch(
    pitch: &PitchSpelling,
    key_signature: &str,
    table: &mut AccidentalTable,
    flat_to_sharp: bool,
    center_octave: i32,
) -> Result<String, JianpuError> {
    let key = KeyPolicy::lookup(key_signature)?;
    let step = Step::from_letter(&pitch.step)?;
    let accidental = resolve_accidental(step, pitch, &key, table, flat_to_sharp)?;
    let octave = pitch.octave;

    let token = match accidental {
        Accidental::Flat if flat_to_sharp => match step {
            Step::C => format!("{}{}", step.flat_degree(), octave_marks(octave - 1, center_octave)),
            Step::F => format!("{}{}", step.flat_degree(), octave_marks(octave, center_octave)),
            _ => format!(
                "{}{}{}",
                step.flat_degree(),
                Accidental::Sharp.mark(),
                octave_marks(octave, center_octave)
            ),
        },
        _ => format!("{}{}{}", step.number(), accidental.mark(), octave_marks(octave, center_octave)),
    };
    Ok(token)
}

/// Apostrophes above the centre octave, commas below.
pub fn octave_marks(octave: i32, center_octave: i32) -> String {
    let distance = (octave - center_octave).unsigned_abs() as usize;
    let mark = if octave >= center_octave { OCTAVE_UP } else { OCTAVE_DOWN };
    std::iter::repeat(mark).take(distance).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enc(pitch: &PitchSpelling, key: &str, table: &mut AccidentalTable) -> String {
        encode_pitch(pitch, key, table, true, MELODY_CENTER_OCTAVE).unwrap()
    }

    #[test]
    fn key_policies_cover_thirteen_keys() {
        let d = KeyPolicy::lookup("D").unwrap();
        assert_eq!(d.accidental, Accidental::Sharp);
        assert_eq!(d.affected, &[Step::F, Step::C]);
        let gb = KeyPolicy::lookup("Gb").unwrap();
        assert_eq!(gb.affected.len(), 6);
        assert!(gb.alters(Step::C));
        assert!(KeyPolicy::lookup("C").unwrap().affected.is_empty());
        assert_eq!(
            KeyPolicy::lookup("C#"),
            Err(LookupFailure::KeySignature("C#".into()))
        );
    }

    #[test]
    fn octave_marks_around_center() {
        assert_eq!(octave_marks(5, 5), "");
        assert_eq!(octave_marks(7, 5), "''");
        assert_eq!(octave_marks(3, 5), ",,");
        assert_eq!(octave_marks(4, 4), "");
    }

    #[test]
    fn key_sharp_persists_within_measure() {
        let mut table = AccidentalTable::new();
        let f_sharp = PitchSpelling::new("F", Accidental::Sharp, 5);
        assert_eq!(enc(&f_sharp, "D", &mut table), "4#");
        assert_eq!(table.get(Step::F, 5).unwrap(), Accidental::Sharp);
        assert_eq!(enc(&f_sharp, "D", &mut table), "4#");
    }

    #[test]
    fn forced_natural_on_key_step_sticks() {
        let mut table = AccidentalTable::new();
        let f_natural = PitchSpelling::new("F", Accidental::None, 5).forced();
        assert_eq!(enc(&f_natural, "D", &mut table), "4=");
        // same step later, no printed accidental
        let f_plain = PitchSpelling::new("F", Accidental::None, 5);
        assert_eq!(enc(&f_plain, "D", &mut table), "4=");
        // other octave is untouched
        let f_low = PitchSpelling::new("F", Accidental::Sharp, 4);
        assert_eq!(enc(&f_low, "D", &mut table), "4#,");
    }

    #[test]
    fn flats_are_spelled_as_sharps_below() {
        let mut table = AccidentalTable::new();
        let d_flat = PitchSpelling::new("D", Accidental::Flat, 5);
        assert_eq!(enc(&d_flat, "C", &mut table), "1#");

        let mut table = AccidentalTable::new();
        let c_flat = PitchSpelling::new("C", Accidental::Flat, 5);
        assert_eq!(enc(&c_flat, "C", &mut table), "7,");

        let mut table = AccidentalTable::new();
        let f_flat = PitchSpelling::new("F", Accidental::Flat, 6);
        assert_eq!(enc(&f_flat, "C", &mut table), "3'");
    }

    #[test]
    fn flats_kept_when_rewriting_disabled() {
        let mut table = AccidentalTable::new();
        let b_flat = PitchSpelling::new("B", Accidental::Flat, 4);
        let token = encode_pitch(&b_flat, "F", &mut table, false, MELODY_CENTER_OCTAVE).unwrap();
        assert_eq!(token, "7b,");
    }

    #[test]
    fn step_below_a_rewritten_flat_gets_natural() {
        let mut table = AccidentalTable::new();
        let d_flat = PitchSpelling::new("D", Accidental::Flat, 5);
        assert_eq!(enc(&d_flat, "C", &mut table), "1#");
        let c = PitchSpelling::new("C", Accidental::None, 5);
        assert_eq!(enc(&c, "C", &mut table), "1=");
        // recorded natural is now inherited
        assert_eq!(enc(&c, "C", &mut table), "1=");
    }

    #[test]
    fn key_flat_step_in_flat_key() {
        let mut table = AccidentalTable::new();
        let b_flat = PitchSpelling::new("B", Accidental::Flat, 5);
        assert_eq!(enc(&b_flat, "Bb", &mut table), "6#");
        let e_flat = PitchSpelling::new("E", Accidental::Flat, 5);
        assert_eq!(enc(&e_flat, "Bb", &mut table), "2#");
    }

    #[test]
    fn unaltered_step_inherits_table() {
        let mut table = AccidentalTable::new();
        let g_sharp = PitchSpelling::new("G", Accidental::Sharp, 5);
        assert_eq!(enc(&g_sharp, "C", &mut table), "5#");
        let g = PitchSpelling::new("G", Accidental::None, 5);
        assert_eq!(enc(&g, "C", &mut table), "5#");
        table.reset();
        assert!(table.is_empty());
        assert_eq!(enc(&g, "C", &mut table), "5");
    }

    #[test]
    fn lookup_failures() {
        let mut table = AccidentalTable::new();
        let bad_step = PitchSpelling::new("H", Accidental::None, 5);
        assert!(matches!(
            encode_pitch(&bad_step, "C", &mut table, true, 5),
            Err(JianpuError::Lookup(LookupFailure::Step(_)))
        ));
        let high = PitchSpelling::new("C", Accidental::None, 8);
        assert!(matches!(
            encode_pitch(&high, "C", &mut table, true, 5),
            Err(JianpuError::Lookup(LookupFailure::Octave(8)))
        ));
    }
}
