//! Document layout: header block, per-part lines grouped by measures and
//! pages, and the aligned harmony track of the chord part.

use super::constants::*;
use super::measure::{encode_measures, MeasureEncoding};
use super::note::{EncoderState, PendingGrace, RenderContext};
use crate::config::JianpuConfig;
use crate::error::JianpuError;
use crate::reader::{MeasureEvents, ScoreReader};

pub fn render_header(reader: &impl ScoreReader) -> String {
    let mut header = format!("V: {FORMAT_VERSION}\n");
    if let Some(title) = reader.work_title() {
        header.push_str(&format!("B: {title}\n"));
    }
    let key = reader.initial_key_signature().replace('b', &HEADER_FLAT.to_string());
    header.push_str(&format!("D: {key}\n"));
    header.push_str(&format!("P: {}\n", reader.initial_time_signature()));
    if let Some(composer) = reader.composer() {
        header.push_str(&format!("Z: {composer}\n"));
    }
    header
}

/// Rendering mode for the part with the given 1-based number.
pub fn context_for_part(part_number: usize, config: &JianpuConfig) -> RenderContext {
    if config.bass_part == Some(part_number) {
        RenderContext::Bass
    } else if config.chord_part == Some(part_number) {
        RenderContext::ChordRhythm
    } else {
        RenderContext::Melody
    }
}

/// Placeholder/symbol track lining chord symbols up with sounding notes.
///
/// A measure without harmonies still takes one placeholder per note (at
/// least one). Otherwise each symbol is preceded by placeholders for the
/// notes since the previous symbol and followed by enough to reach the
/// measure's note count.
pub fn align_harmonies(encodings: &[MeasureEncoding]) -> String {
    let mut track = String::new();
    for encoding in encodings {
        let mut last: i64 = 0;
        if encoding.harmonies.is_empty() {
            push_placeholders(&mut track, 1);
        } else {
            let mut previous: i64 = -1;
            for harmony in &encoding.harmonies {
                let index = harmony.note_index as i64;
                push_placeholders(&mut track, index - previous - 1);
                track.push_str(&harmony.symbol);
                previous = index;
                last = index;
            }
        }
        push_placeholders(&mut track, encoding.sounding_notes as i64 - last - 1);
    }
    track
}

fn push_placeholders(track: &mut String, count: i64) {
    track.extend(std::iter::repeat(HARMONY_PLACEHOLDER).take(count.max(0) as usize));
}

/// All part lines, grouped `measures_per_line` measures at a time.
pub fn render_body(reader: &impl ScoreReader, config: &JianpuConfig) -> Result<String, JianpuError> {
    config.validate()?;
    let part_ids = reader.part_ids();
    let part_measures = part_ids
        .iter()
        .map(|id| reader.measures(id)?.collect::<Result<Vec<MeasureEvents>, _>>())
        .collect::<Result<Vec<_>, JianpuError>>()?;

    let measure_count = part_measures.iter().map(Vec::len).max().unwrap_or(0);
    let mut states: Vec<EncoderState> = part_ids.iter().map(|_| EncoderState::new()).collect();
    let mut lines = Vec::new();
    let mut lines_on_page = 0;

    for begin in (0..measure_count).step_by(config.measures_per_line) {
        let end = (begin + config.measures_per_line).min(measure_count);
        log::debug!("composing measures {}..{}", begin + 1, end);

        for (part_idx, measures) in part_measures.iter().enumerate() {
            let part_number = part_idx + 1;
            let ctx = context_for_part(part_number, config);
            let state = &mut states[part_idx];
            state.begin_line();

            let slice = &measures[begin.min(measures.len())..end.min(measures.len())];
            let (body, encodings) = encode_measures(slice, ctx, state, config)?;
            lines.push(format!("{PART_LINE_PREFIX}{part_number}: {BAR_SINGLE}{body}"));
            if ctx == RenderContext::ChordRhythm {
                lines.push(format!("{HARMONY_LINE_PREFIX}{}", align_harmonies(&encodings)));
            }
        }
        lines.push(String::new());

        lines_on_page += 1;
        if lines_on_page == config.lines_per_page {
            lines.push(PAGE_BREAK.to_string());
            lines.push(String::new());
            lines_on_page = 0;
        }
    }

    for (id, state) in part_ids.iter().zip(&states) {
        if let PendingGrace::Pending(ref grace) = state.pending_grace {
            log::warn!("part {id}: grace note{grace}has no following note, dropped");
        }
    }

    Ok(lines.join("\n"))
}
