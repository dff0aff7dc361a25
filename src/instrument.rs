/// Explicit wrappers for timing and input/output snapshots around any operation.
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use crate::writer::WriterError;

/// A RAII timer that logs elapsed milliseconds on drop.
///
/// Created via [`crate::cli::OutputCtx::timer`]. Does nothing when inactive.
pub struct Timer {
    label: &'static str,
    start: Instant,
    active: bool,
}

impl Timer {
    #[must_use]
    pub fn new(label: &'static str, active: bool) -> Self {
        Self {
            label,
            start: Instant::now(),
            active,
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        if self.active {
            let ms = self.start.elapsed().as_secs_f64() * 1000.0;
            debug!(span = self.label, elapsed_ms = ms, "timing");
        }
    }
}

/// Run `f` and log how long it took.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let value = f();
    info!(
        operation = label,
        elapsed_s = start.elapsed().as_secs_f64(),
        "operation finished"
    );
    value
}

/// Run `f`, saving its input to `{dir}/{name}_in.json` beforehand and its
/// output to `{dir}/{name}_out.json` afterwards.
///
/// Failed operations still leave the input snapshot behind; no output
/// snapshot is written for them.
///
/// # Errors
///
/// Snapshot I/O errors, or whatever `f` returns.
pub fn with_snapshots<I, O, E>(
    dir: &Path,
    name: &str,
    input: &I,
    f: impl FnOnce(&I) -> Result<O, E>,
) -> Result<O, E>
where
    I: Serialize + ?Sized,
    O: Serialize,
    E: From<WriterError>,
{
    write_snapshot(&dir.join(format!("{name}_in.json")), input)?;
    let output = f(input)?;
    write_snapshot(&dir.join(format!("{name}_out.json")), &output)?;
    Ok(output)
}

fn write_snapshot<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), WriterError> {
    let file = File::create(path).map_err(|e| WriterError::io(path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(|e| WriterError::io(path, e.into()))?;
    debug!(path = %path.display(), "wrote snapshot");
    Ok(())
}
