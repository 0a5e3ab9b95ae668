//! MXL file handler: reads compressed MusicXML (.mxl) archives.
//!
//! An .mxl file is a ZIP archive containing:
//!   - META-INF/container.xml: declares the root MusicXML file path
//!   - <rootfile>.xml: the actual MusicXML content (e.g., score.xml)
//!   - (optional) other files: images, sounds, etc.

use std::io::{Cursor, Read};
use zip::ZipArchive;

use crate::error::{Result, TabError};
use crate::model::Score;
use crate::parser;

const CONTAINER_PATH: &str = "META-INF/container.xml";

/// Read and parse a .mxl file from raw bytes.
pub fn parse_mxl(data: &[u8]) -> Result<Score> {
    let xml = extract_musicxml_from_mxl(data)?;
    parser::parse_musicxml(&xml)
}

/// Extract the MusicXML content string from .mxl bytes.
pub fn extract_musicxml_from_mxl(data: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(data))
        .map_err(|e| TabError::Parse(format!("Failed to open MXL archive: {e}")))?;

    let root_file_path = find_root_file(&mut archive)?;

    let mut root_file = archive.by_name(&root_file_path).map_err(|e| {
        TabError::Parse(format!(
            "Root file '{root_file_path}' not found in archive: {e}"
        ))
    })?;

    let mut xml = String::new();
    root_file
        .read_to_string(&mut xml)
        .map_err(|e| TabError::Parse(format!("Failed to read '{root_file_path}': {e}")))?;

    Ok(xml)
}

/// Locate the root MusicXML file: the container's `rootfile`, or failing
/// that the first .xml/.musicxml entry outside META-INF.
fn find_root_file(archive: &mut ZipArchive<Cursor<&[u8]>>) -> Result<String> {
    let container_xml = match archive.by_name(CONTAINER_PATH) {
        Ok(mut container_file) => {
            let mut xml = String::new();
            container_file
                .read_to_string(&mut xml)
                .map_err(|e| TabError::Parse(format!("Failed to read container.xml: {e}")))?;
            Some(xml)
        }
        Err(_) => None,
    }; // mutable borrow of archive is released here

    if let Some(xml) = container_xml {
        let doc = roxmltree::Document::parse(&xml)
            .map_err(|e| TabError::Parse(format!("Failed to parse container.xml: {e}")))?;

        return doc
            .descendants()
            .filter(|node| node.tag_name().name() == "rootfile")
            .find_map(|node| node.attribute("full-path"))
            .map(String::from)
            .ok_or_else(|| TabError::Parse("No rootfile found in container.xml".to_string()));
    }

    let names: Vec<String> = archive.file_names().map(String::from).collect();
    names
        .iter()
        .find(|name| {
            !name.starts_with("META-INF/")
                && (name.ends_with(".xml") || name.ends_with(".musicxml"))
        })
        .cloned()
        .ok_or_else(|| {
            TabError::Parse(format!(
                "No MusicXML file found in archive. Files: {names:?}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    const SCORE: &str = r#"<?xml version="1.0"?>
<score-partwise version="4.0">
  <work><work-title>Zipped</work-title></work>
  <part-list><score-part id="P1"><part-name>Guitar</part-name></score-part></part-list>
  <part id="P1"><measure number="1"/></part>
</score-partwise>"#;

    fn archive(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, content) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn reads_root_file_from_container() {
        let container = r#"<container><rootfiles>
            <rootfile full-path="music/song.xml"/>
        </rootfiles></container>"#;
        let data = archive(&[(CONTAINER_PATH, container), ("music/song.xml", SCORE)]);
        let score = parse_mxl(&data).unwrap();
        assert_eq!(score.title.as_deref(), Some("Zipped"));
        assert_eq!(score.measure_count(), 1);
    }

    #[test]
    fn falls_back_to_first_xml_entry() {
        let data = archive(&[("readme.txt", "hi"), ("score.musicxml", SCORE)]);
        let xml = extract_musicxml_from_mxl(&data).unwrap();
        assert!(xml.contains("Zipped"));
    }

    #[test]
    fn archive_without_score_is_a_parse_error() {
        let data = archive(&[("readme.txt", "hi")]);
        assert!(matches!(parse_mxl(&data), Err(TabError::Parse(_))));
    }

    #[test]
    fn garbage_is_a_parse_error() {
        assert!(matches!(parse_mxl(b"not a zip"), Err(TabError::Parse(_))));
    }
}
