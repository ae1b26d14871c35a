//! MXL file handler: reads compressed MusicXML (.mxl) archives.
//!
//! An .mxl file is a ZIP archive containing:
//!   - META-INF/container.xml  : declares the root MusicXML file path
//!   - <rootfile>.xml          : the actual MusicXML content (e.g., score.xml)
//!   - (optional) other files  : images, sounds, etc.

use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::JianpuError;
use crate::model::Score;
use crate::parser;

/// Read and parse a .mxl file from raw bytes.
pub fn parse_mxl(data: &[u8]) -> Result<Score, JianpuError> {
    let xml = extract_musicxml_from_mxl(data)?;
    parser::parse_musicxml(&xml)
}

/// Extract the MusicXML content string from .mxl bytes.
pub fn extract_musicxml_from_mxl(data: &[u8]) -> Result<String, JianpuError> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let root_file_path = read_container_xml(&mut archive)?;
    log::debug!("MXL root file: {root_file_path}");

    let mut root_file = archive.by_name(&root_file_path).map_err(|e| {
        JianpuError::Archive(format!("root file '{root_file_path}' not found in archive: {e}"))
    })?;

    let mut xml = String::new();
    root_file.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Find the root MusicXML path, from META-INF/container.xml when present.
fn read_container_xml(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String, JianpuError> {
    let container_xml = match archive.by_name("META-INF/container.xml") {
        Ok(mut container_file) => {
            let mut xml = String::new();
            container_file.read_to_string(&mut xml)?;
            Some(xml)
        }
        Err(_) => None,
    };

    if let Some(xml) = container_xml {
        let doc = roxmltree::Document::parse(&xml)?;
        return doc
            .descendants()
            .filter(|n| n.tag_name().name() == "rootfile")
            .find_map(|n| n.attribute("full-path"))
            .map(String::from)
            .ok_or_else(|| JianpuError::Archive("no rootfile found in container.xml".into()));
    }

    let names: Vec<String> = archive.file_names().map(String::from).collect();
    names
        .iter()
        .find(|name| {
            !name.starts_with("META-INF/") && (name.ends_with(".xml") || name.ends_with(".musicxml"))
        })
        .cloned()
        .ok_or_else(|| {
            JianpuError::Archive(format!("no MusicXML file found in archive. Files: {names:?}"))
        })
}
