//! Snapshot artifact writer
//!
//! The document is written to a sibling temp file and renamed over the
//! target, so readers see either the previous snapshot or the new one.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use worldstate_core::Snapshot;

/// Default artifact name, relative to the working directory
pub const DEFAULT_OUTPUT_FILE: &str = "world_data.json";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> OutputError + '_ {
    move |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Temp file next to `path`, so the final rename stays on one filesystem
fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_OUTPUT_FILE.to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// Overwrite `path` with the snapshot document
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<(), OutputError> {
    let json = snapshot.to_json_pretty()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }

    let tmp = temp_path(path);
    fs::write(&tmp, json.as_bytes()).map_err(io_error(&tmp))?;

    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(io_error(path)(e));
    }

    debug!("Wrote {} bytes to {}", json.len(), path.display());
    Ok(())
}

/// Read a previously written artifact
pub fn read_snapshot(path: &Path) -> Result<Snapshot, OutputError> {
    let text = fs::read_to_string(path).map_err(io_error(path))?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use worldstate_core::{Indicator, IndicatorKind};

    fn snapshot(value: f64) -> Snapshot {
        IndicatorKind::ALL
            .iter()
            .fold(Snapshot::builder(), |b, kind| b.indicator(Indicator::new(*kind, value)))
            .build(Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap())
            .unwrap()
    }

    #[test]
    fn test_write_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("world_data.json");

        write_snapshot(&path, &snapshot(0.25)).unwrap();
        assert_eq!(read_snapshot(&path).unwrap().season, 0.25);

        write_snapshot(&path, &snapshot(0.75)).unwrap();
        assert_eq!(read_snapshot(&path).unwrap().season, 0.75);

        // no temp file left behind
        let entries: Vec<_> = fs::read_dir(path.parent().unwrap()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_write_into_missing_root_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, b"x").unwrap();

        // a regular file cannot be a parent directory
        let err = write_snapshot(&blocker.join("out.json"), &snapshot(0.5)).unwrap_err();
        assert!(matches!(err, OutputError::Io { .. }));
    }

    #[test]
    fn test_temp_path() {
        assert_eq!(
            temp_path(Path::new("/tmp/out/world_data.json")),
            PathBuf::from("/tmp/out/.world_data.json.tmp")
        );
    }
}
