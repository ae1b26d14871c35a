//! Per-event token assembly: rests, pitches, chord placeholders, grace
//! notes, ties and tuplets.

use super::constants::*;
use super::duration::time_suffix;
use super::pitch::{encode_pitch, AccidentalTable};
use crate::config::JianpuConfig;
use crate::error::{ContractViolation, JianpuError};
use crate::reader::NoteEvent;

/// How a part is rendered for the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderContext {
    #[default]
    Melody,
    /// Octave marks counted from octave 4 instead of 5
    Bass,
    /// Rhythm only; pitches become the `9` placeholder
    ChordRhythm,
}

impl RenderContext {
    pub fn center_octave(self) -> i32 {
        match self {
            RenderContext::Bass => BASS_CENTER_OCTAVE,
            RenderContext::Melody | RenderContext::ChordRhythm => MELODY_CENTER_OCTAVE,
        }
    }
}

/// A grace note waiting to be attached to the next main note.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PendingGrace {
    #[default]
    Empty,
    /// Bracketed text, ready to splice
    Pending(String),
}

/// Mutable state carried from note to note while encoding one part.
#[derive(Debug, Clone, Default)]
pub struct EncoderState {
    pub accidentals: AccidentalTable,
    pub tie_open: bool,
    pub pending_grace: PendingGrace,
}

impl EncoderState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accidentals expire at the barline, unless a tie carries them over.
    pub fn begin_measure(&mut self) {
        if !self.tie_open {
            self.accidentals.reset();
        } else if !self.accidentals.is_empty() {
            log::trace!("tie carries accidentals across the barline");
        }
    }

    pub fn begin_line(&mut self) {
        self.accidentals.reset();
    }

    pub fn has_pending_grace(&self) -> bool {
        matches!(self.pending_grace, PendingGrace::Pending(_))
    }
}

/// Encode one note or rest. Grace notes yield an empty token and are
/// spliced into the following note instead.
pub fn encode_note(
    note: &NoteEvent,
    ctx: RenderContext,
    state: &mut EncoderState,
    config: &JianpuConfig,
) -> Result<String, JianpuError> {
    if note.grace && note.chord {
        // the grace chord is represented by its first note
        return Ok(String::new());
    }
    if note.grace {
        if let PendingGrace::Pending(ref pending) = state.pending_grace {
            contract_violation(
                ContractViolation::GraceAlreadyPending {
                    pending: pending.clone(),
                },
                config,
            )?;
        }
    }

    let mut token = basic_token(note, ctx, state, config)?;

    if let PendingGrace::Pending(grace) = std::mem::take(&mut state.pending_grace) {
        match token.find(SUSTAIN) {
            // the grace text replaces the sustain's leading space
            Some(idx) => token.replace_range(idx..idx + 1, &grace),
            None => token.push_str(&grace),
        }
    }

    if note.grace {
        state.pending_grace = PendingGrace::Pending(format!("{GRACE_OPEN}{token}{GRACE_CLOSE}"));
        return Ok(String::new());
    }

    // Chord members share the first note's tie and tuplet markings but
    // still open and close ties.
    if note.chord {
        if note.tie_stop {
            state.accidentals.reset();
        }
        if note.tie_start {
            state.tie_open = true;
        } else if note.tie_stop {
            state.tie_open = false;
        }
        return Ok(token);
    }

    let tie_was_open = state.tie_open;
    if note.tie_start {
        token.insert_str(0, TIE_OPEN);
        state.tie_open = true;
    }
    if note.tuplet_start {
        token.insert_str(0, TUPLET_OPEN);
    }
    if note.tuplet_stop {
        token.push_str(TUPLET_CLOSE);
    }
    if note.tie_stop {
        if !tie_was_open {
            contract_violation(ContractViolation::TieStopWithoutStart, config)?;
        }
        state.accidentals.reset();
        // Stop-then-start: the note ends one tie and begins the next, so the
        // chain stays open. Only a plain stop closes it.
        state.tie_open = note.tie_start;
        match token.find(SUSTAIN) {
            Some(idx) => token.insert_str(idx + 1, ") "),
            None => token.push_str(TIE_CLOSE),
        }
    }

    Ok(token)
}

fn basic_token(
    note: &NoteEvent,
    ctx: RenderContext,
    state: &mut EncoderState,
    config: &JianpuConfig,
) -> Result<String, JianpuError> {
    let suffix = || -> Result<String, JianpuError> {
        if note.grace {
            Ok(String::new())
        } else {
            time_suffix(note.duration, note.divisions)
        }
    };

    let Some(ref pitch) = note.pitch else {
        return Ok(format!("{REST}{}", suffix()?));
    };

    if ctx == RenderContext::ChordRhythm {
        if note.chord {
            return Ok(String::new());
        }
        return Ok(format!("{CHORD_PLACEHOLDER}{}", suffix()?));
    }

    let mut token = encode_pitch(
        pitch,
        &note.key_signature,
        &mut state.accidentals,
        config.flat_to_sharp,
        ctx.center_octave(),
    )?;
    token.push_str(&suffix()?);
    Ok(token)
}

fn contract_violation(violation: ContractViolation, config: &JianpuConfig) -> Result<(), JianpuError> {
    if config.strict_contracts {
        return Err(violation.into());
    }
    log::warn!("{violation}; continuing");
    Ok(())
}
