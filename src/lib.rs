//! jianpu99: MusicXML to Jianpu99 numbered-notation encoder.
//!
//! Supports both uncompressed MusicXML (.musicxml) and compressed MXL (.mxl) files.
//!
//! # Example
//! ```no_run
//! use jianpu99::{render_file_to_jianpu, JianpuConfig};
//!
//! let text = render_file_to_jianpu("path/to/score.musicxml", &JianpuConfig::default()).unwrap();
//! println!("{text}");
//! ```

pub mod config;
pub mod error;
pub mod jianpu;
pub mod model;
pub mod mxl;
pub mod parser;
pub mod reader;

use std::path::Path;

pub use config::JianpuConfig;
pub use error::{ContractViolation, JianpuError, LookupFailure};
pub use jianpu::{render_score_to_jianpu, JianpuWriter, RenderContext};
pub use model::*;
pub use mxl::parse_mxl;
pub use parser::parse_musicxml;
pub use reader::{ScoreModelReader, ScoreReader};

/// Parse a MusicXML file from a file path.
/// Automatically detects format based on file extension:
/// - `.musicxml` or `.xml` → uncompressed MusicXML
/// - `.mxl` → compressed MXL (ZIP archive)
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Score, JianpuError> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .map_err(|e| JianpuError::Io(format!("failed to read '{}': {e}", path.display())))?;

    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Parse MusicXML from raw bytes with an optional format hint.
/// If `extension` is None, tries to auto-detect the format.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> Result<Score, JianpuError> {
    match extension {
        Some("mxl") => parse_mxl(data),
        Some("musicxml") | Some("xml") => {
            let xml = std::str::from_utf8(data)
                .map_err(|e| JianpuError::Parse(format!("invalid UTF-8 in MusicXML file: {e}")))?;
            parse_musicxml(xml)
        }
        _ => {
            // Auto-detect: try as XML first, then as MXL
            if let Ok(xml) = std::str::from_utf8(data) {
                if xml.trim_start().starts_with('<') {
                    return parse_musicxml(xml);
                }
            }
            parse_mxl(data)
        }
    }
}

/// Convert a parsed score to a JSON string.
pub fn score_to_json(score: &Score) -> Result<String, JianpuError> {
    Ok(serde_json::to_string_pretty(score)?)
}

/// Parse a MusicXML file and encode it as Jianpu99 text.
pub fn render_file_to_jianpu<P: AsRef<Path>>(
    path: P,
    config: &JianpuConfig,
) -> Result<String, JianpuError> {
    let score = parse_file(path)?;
    render_score_to_jianpu(&score, config)
}

/// Parse MusicXML bytes and encode them as Jianpu99 text.
pub fn render_bytes_to_jianpu(
    data: &[u8],
    extension: Option<&str>,
    config: &JianpuConfig,
) -> Result<String, JianpuError> {
    let score = parse_bytes(data, extension)?;
    render_score_to_jianpu(&score, config)
}
