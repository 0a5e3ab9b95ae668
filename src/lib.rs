//! scoretab: converts MusicXML scores into LilyPond guitar tablature.
//!
//! A parsed [`Score`] is normalized (optional transposition, treble clef),
//! cut into staff systems of four measures, and wrapped in a LilyPond
//! document pairing a standard staff with a tab staff. LilyPond itself can
//! then be run to produce a PDF.
//!
//! # Example
//! ```no_run
//! use scoretab::convert;
//!
//! let ly = convert("path/to/score.musicxml", "drop-d", false, "out", false).unwrap();
//! println!("Wrote {}", ly.display());
//! ```

pub mod convert;
pub mod document;
pub mod encoder;
pub mod error;
pub mod model;
pub mod mxl;
pub mod naming;
pub mod parser;
pub mod renderer;
pub mod systems;
pub mod transform;
pub mod tuning;

use std::path::Path;

pub use convert::{convert, convert_score, convert_with, write_notation, ConvertOptions};
pub use error::{Result, TabError};
pub use model::*;
pub use mxl::parse_mxl;
pub use parser::parse_musicxml;
pub use renderer::RendererConfig;
pub use transform::NormalizeOptions;
pub use tuning::Tuning;

/// Parse a MusicXML file from a file path.
/// Automatically detects format based on file extension:
/// - `.musicxml` or `.xml` → uncompressed MusicXML
/// - `.mxl` → compressed MXL (ZIP archive)
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Score> {
    let path = path.as_ref();
    let data = std::fs::read(path).map_err(|e| {
        TabError::Parse(format!("Failed to read file '{}': {e}", path.display()))
    })?;

    parse_bytes(&data, path.extension().and_then(|e| e.to_str()))
}

/// Parse MusicXML from raw bytes with an optional format hint.
/// If `extension` is None, tries to auto-detect the format.
pub fn parse_bytes(data: &[u8], extension: Option<&str>) -> Result<Score> {
    match extension {
        Some("mxl") => parse_mxl(data),
        Some("musicxml") | Some("xml") => {
            let xml = std::str::from_utf8(data)
                .map_err(|e| TabError::Parse(format!("Invalid UTF-8 in MusicXML file: {e}")))?;
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
pub fn score_to_json(score: &Score) -> Result<String> {
    Ok(serde_json::to_string_pretty(score)?)
}
