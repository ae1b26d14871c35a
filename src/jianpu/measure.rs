//! Measure-level encoding: note tokens, barlines, sounding-note counts and
//! the harmony events that feed the chord track.

use super::constants::*;
use super::note::{encode_note, EncoderState, RenderContext};
use crate::config::JianpuConfig;
use crate::error::JianpuError;
use crate::reader::{BarlineType, MeasureEvent, MeasureEvents};

/// A chord symbol and the index of the sounding note it sits on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarmonyEvent {
    pub symbol: String,
    pub note_index: usize,
}

/// Encoded content of one measure, without barlines.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeasureEncoding {
    pub text: String,
    /// Notes and rests, counting each chord once
    pub sounding_notes: usize,
    pub harmonies: Vec<HarmonyEvent>,
}

pub fn encode_measure(
    measure: &MeasureEvents,
    ctx: RenderContext,
    state: &mut EncoderState,
    config: &JianpuConfig,
) -> Result<MeasureEncoding, JianpuError> {
    state.begin_measure();

    let mut encoding = MeasureEncoding::default();
    let mut tokens = Vec::with_capacity(measure.events.len());

    for event in &measure.events {
        match event {
            MeasureEvent::Harmony(symbol) => encoding.harmonies.push(HarmonyEvent {
                symbol: symbol.clone(),
                note_index: encoding.sounding_notes,
            }),
            MeasureEvent::Note(note) => {
                if !note.chord {
                    encoding.sounding_notes += 1;
                }
                let token = encode_note(note, ctx, state, config)?;
                if !token.is_empty() {
                    tokens.push(token);
                }
            }
        }
    }

    encoding.text = tokens.join(" ");
    Ok(encoding)
}

pub fn right_barline_marker(barline: BarlineType) -> &'static str {
    match barline {
        BarlineType::Repeat => BAR_REPEAT_CLOSE,
        BarlineType::Double => BAR_DOUBLE,
        BarlineType::Final => BAR_FINAL,
        BarlineType::Normal => BAR_SINGLE,
    }
}

/// Encode consecutive measures into one line body, e.g. `" 1 2 | 3 4 :|"`.
pub fn encode_measures(
    measures: &[MeasureEvents],
    ctx: RenderContext,
    state: &mut EncoderState,
    config: &JianpuConfig,
) -> Result<(String, Vec<MeasureEncoding>), JianpuError> {
    let mut line = String::new();
    let mut encodings = Vec::with_capacity(measures.len());

    for measure in measures {
        if measure.left_barline == BarlineType::Repeat {
            line.push_str(BAR_REPEAT_OPEN);
        }
        let encoding = encode_measure(measure, ctx, state, config)?;
        line.push(' ');
        line.push_str(&encoding.text);
        line.push(' ');
        line.push_str(right_barline_marker(measure.right_barline));
        encodings.push(encoding);
    }

    log::trace!("encoded {} measures ({ctx:?}): {line}", measures.len());
    Ok((line, encodings))
}
