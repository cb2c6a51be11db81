//! Staleness gate: skip regeneration when the output is newer than its input.
//!
//! This is an optimisation only. The check and the later write are not
//! atomic, so callers must not run two generations against the same output
//! at once.

use std::path::Path;
use std::time::SystemTime;

use chrono::{DateTime, Local};
use tracing::debug;

use crate::GenerateError;

/// Should `output` be regenerated from `input`?
///
/// True if `output` does not exist, or if `input` was not modified strictly
/// before `output`.
///
/// # Errors
///
/// [`GenerateError::MissingInput`] if `input` does not exist or cannot be
/// inspected.
pub fn should_regenerate(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<bool, GenerateError> {
    let input = input.as_ref();
    let output = output.as_ref();

    let input_mtime = std::fs::metadata(input)
        .and_then(|m| m.modified())
        .map_err(|_| GenerateError::MissingInput {
            path: input.display().to_string(),
        })?;

    let output_mtime = match std::fs::metadata(output).and_then(|m| m.modified()) {
        Ok(t) => t,
        Err(_) => {
            debug!(output = %output.display(), "output missing, regenerating");
            return Ok(true);
        }
    };

    let stale = input_mtime >= output_mtime;
    debug!(
        input = %input.display(),
        input_mtime = %format_mtime(input_mtime),
        output_mtime = %format_mtime(output_mtime),
        stale,
        "staleness check"
    );
    Ok(stale)
}

fn format_mtime(t: SystemTime) -> String {
    DateTime::<Local>::from(t).format("%Y-%m-%d %H:%M:%S%.3f").to_string()
}
