//! External renderer: runs LilyPond on a notation file and checks that the
//! PDF actually appeared.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::error::{Result, TabError};

/// Extension of the rendered document.
pub const RENDERED_EXTENSION: &str = "pdf";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Longer timeouts are treated as this one.
const MAX_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24 * 365);

/// How to invoke the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererConfig {
    /// Program to run (default: `lilypond` from `PATH`)
    pub program: PathBuf,
    /// Kill the renderer if it runs longer than this
    pub timeout: Duration,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("lilypond"),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Where the renderer puts the document for `ly_file`: same stem, `.pdf`,
/// inside `output_dir`.
pub fn rendered_path(ly_file: &Path, output_dir: &Path) -> PathBuf {
    let mut name = ly_file.file_stem().unwrap_or_default().to_os_string();
    name.push(".");
    name.push(RENDERED_EXTENSION);
    output_dir.join(name)
}

/// Render `ly_file` into `output_dir` and return the PDF path.
///
/// A non-zero exit, a timeout, or a missing PDF are all failures. The
/// notation file is left in place either way.
pub fn render_document(
    ly_file: &Path,
    output_dir: &Path,
    config: &RendererConfig,
) -> Result<PathBuf> {
    info!(
        program = %config.program.display(),
        file = %ly_file.display(),
        "rendering notation"
    );

    let deadline = Instant::now() + config.timeout.min(MAX_TIMEOUT);
    // -o is an output prefix; LilyPond appends the extension itself.
    let mut child = Command::new(&config.program)
        .arg("-o")
        .arg(output_dir)
        .arg(ly_file)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| {
            TabError::renderer(format!(
                "failed to spawn '{}': {e}",
                config.program.display()
            ))
        })?;

    // LilyPond is chatty on stderr; drain it so a full pipe cannot stall it.
    // Processes it spawned (Ghostscript) can hold the pipe open after it
    // exits or is killed, so the reader is never joined.
    let stderr = drain_stderr(&mut child);
    let status = wait_until(&mut child, deadline, config.timeout)?;
    let stderr = stderr
        .and_then(|rx| {
            rx.recv_timeout(deadline.saturating_duration_since(Instant::now()))
                .ok()
        })
        .unwrap_or_default();
    if !status.success() {
        warn!(%status, "renderer exited with failure");
        return Err(TabError::renderer(format!(
            "'{}' exited with {status}: {}",
            config.program.display(),
            stderr.trim()
        )));
    }

    let pdf = rendered_path(ly_file, output_dir);
    if !pdf.exists() {
        return Err(TabError::renderer(format!(
            "output was not created: {}",
            pdf.display()
        )));
    }

    info!(file = %pdf.display(), "rendered document");
    Ok(pdf)
}

fn wait_until(child: &mut Child, deadline: Instant, timeout: Duration) -> Result<ExitStatus> {
    loop {
        if let Some(status) = child.try_wait()? {
            debug!(%status, "renderer finished");
            return Ok(status);
        }
        if Instant::now() >= deadline {
            // The process may exit between try_wait and kill.
            let _ = child.kill();
            let _ = child.wait();
            return Err(TabError::renderer(format!(
                "timed out after {}s",
                timeout.as_secs_f64()
            )));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn drain_stderr(child: &mut Child) -> Option<Receiver<String>> {
    let mut pipe = child.stderr.take()?;
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut stderr = String::new();
        let _ = pipe.read_to_string(&mut stderr);
        let _ = tx.send(stderr);
    });
    Some(rx)
}
