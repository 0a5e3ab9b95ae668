//! Conversion pipeline: score file in, LilyPond tab (and optionally a PDF)
//! out.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::document::{assemble, NOTATION_EXTENSION};
use crate::error::Result;
use crate::model::{Interval, Score};
use crate::parse_file;
use crate::renderer::{render_document, RendererConfig};
use crate::systems::group_systems;
use crate::transform::{normalize, NormalizeOptions};
use crate::tuning::{lookup, Tuning};

/// Title used when the input file name yields nothing.
pub const UNTITLED: &str = "untitled";

/// Everything `convert_with` needs besides the input path.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertOptions {
    /// Named tuning or 6-character custom tuning
    pub tuning: String,
    /// Transpose pitched events by `interval` before encoding
    pub transpose: bool,
    pub interval: Interval,
    /// Directory receiving the .ly (and .pdf) files; created if missing
    pub output_dir: PathBuf,
    /// Run the renderer after writing the notation file
    pub render: bool,
    pub renderer: RendererConfig,
}

impl ConvertOptions {
    /// Defaults: transpose up an octave, write to `.`, render a PDF.
    pub fn new(tuning: impl Into<String>) -> Self {
        Self {
            tuning: tuning.into(),
            transpose: true,
            interval: Interval::OCTAVE,
            output_dir: PathBuf::from("."),
            render: true,
            renderer: RendererConfig::default(),
        }
    }
}

/// Write notation text to `path` verbatim.
pub fn write_notation(text: &str, path: &Path) -> Result<PathBuf> {
    fs::write(path, text)?;
    Ok(path.to_path_buf())
}

/// Input file stem, or [`UNTITLED`] when there is none.
pub fn score_title(file_path: &Path) -> String {
    file_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

/// Turn an in-memory score into a complete LilyPond document.
pub fn convert_score(score: Score, tuning: &Tuning, options: &NormalizeOptions) -> Result<String> {
    let score = normalize(score, options);
    let systems = group_systems(&score)?;
    info!(
        measures = score.measure_count(),
        systems = systems.systems.len(),
        "grouped staff systems"
    );
    Ok(assemble(
        &systems.blocks(),
        &systems.time_signature,
        &systems.key_signature,
        tuning,
    ))
}

/// Convert `file_path` with the reference defaults for everything not
/// named here. Returns the PDF path if `emit_final_document`, otherwise the
/// .ly path.
pub fn convert(
    file_path: impl AsRef<Path>,
    tuning: &str,
    transpose: bool,
    output_dir: impl AsRef<Path>,
    emit_final_document: bool,
) -> Result<PathBuf> {
    let options = ConvertOptions {
        transpose,
        output_dir: output_dir.as_ref().to_path_buf(),
        render: emit_final_document,
        ..ConvertOptions::new(tuning)
    };
    convert_with(file_path, &options)
}

/// Convert `file_path` according to `options`.
///
/// The tuning is resolved before anything is read or written, so an
/// unknown tuning leaves the filesystem untouched.
pub fn convert_with(file_path: impl AsRef<Path>, options: &ConvertOptions) -> Result<PathBuf> {
    let file_path = file_path.as_ref();
    info!(
        file = %file_path.display(),
        tuning = %options.tuning,
        "creating a fingering"
    );

    let tuning = lookup(&options.tuning)?;
    let score = parse_file(file_path)?;
    let title = score_title(file_path);

    let normalize_options = NormalizeOptions {
        transpose: options.transpose,
        interval: options.interval,
        ..NormalizeOptions::default()
    };
    let ly_code = convert_score(score, &tuning, &normalize_options)?;

    fs::create_dir_all(&options.output_dir)?;
    let ly_file = options
        .output_dir
        .join(format!("{title}_{}.{NOTATION_EXTENSION}", options.tuning));
    write_notation(&ly_code, &ly_file)?;
    info!(file = %ly_file.display(), "wrote notation");

    if options.render {
        return render_document(&ly_file, &options.output_dir, &options.renderer);
    }
    Ok(ly_file)
}
