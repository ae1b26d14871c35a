//! Jianpu writer: encodes a score into Jianpu99 numbered-notation text.
//!
//! The engine is layered leaves-first:
//! - `duration`: time suffixes (`/`, ` -`, `.`)
//! - `pitch`: scale degree, accidental and octave marks
//! - `note`: one event, including grace splicing, ties and tuplets
//! - `measure`: token joining, barlines, harmony positions
//! - `layout`: lines, pages, the chord part's harmony track, the header
//!
//! Encoding state is owned per part by the layout pass and threaded through
//! every call, so a writer can be reused for any number of scores.

mod constants;
pub mod duration;
pub mod layout;
pub mod measure;
pub mod note;
pub mod pitch;

use crate::config::JianpuConfig;
use crate::error::JianpuError;
use crate::model::Score;
use crate::reader::{ScoreModelReader, ScoreReader};

pub use measure::{HarmonyEvent, MeasureEncoding};
pub use note::{EncoderState, PendingGrace, RenderContext};
pub use pitch::{AccidentalTable, KeyPolicy, Step};

/// Produces a complete Jianpu99 document from a [`ScoreReader`].
#[derive(Debug, Clone, Default)]
pub struct JianpuWriter {
    config: JianpuConfig,
}

impl JianpuWriter {
    pub fn new(config: JianpuConfig) -> Self {
        Self { config }
    }

    /// Header block, a blank line, then every composed line. Nothing is
    /// returned unless the whole score encodes.
    pub fn generate(&self, reader: &impl ScoreReader) -> Result<String, JianpuError> {
        let header = layout::render_header(reader);
        let body = layout::render_body(reader, &self.config)?;
        Ok(format!("{header}\n{body}"))
    }
}

/// Encode a parsed score with the given configuration.
pub fn render_score_to_jianpu(score: &Score, config: &JianpuConfig) -> Result<String, JianpuError> {
    JianpuWriter::new(config.clone()).generate(&ScoreModelReader::new(score))
}
