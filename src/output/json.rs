//! JSON session dumps

use crate::model::CrawlSessionResult;
use crate::output::OutputResult;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Returns `path` with a `.json` suffix appended when it lacks one
pub fn json_path(path: &Path) -> PathBuf {
    if path.to_string_lossy().ends_with(".json") {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }
}

/// Writes a session as pretty-printed JSON
///
/// # Arguments
///
/// * `path` - Destination file; `.json` is appended if missing
/// * `session` - The session to write
///
/// # Returns
///
/// * `Ok(PathBuf)` - The path actually written
/// * `Err(OutputError)` - The file could not be created or written
pub fn save_session(path: &Path, session: &CrawlSessionResult) -> OutputResult<PathBuf> {
    let path = json_path(path);
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer_pretty(&mut writer, session)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::debug!("Wrote session JSON to {}", path.display());
    Ok(path)
}

/// Reads a session previously written by [`save_session`]
pub fn load_session(path: &Path) -> OutputResult<CrawlSessionResult> {
    let reader = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}
