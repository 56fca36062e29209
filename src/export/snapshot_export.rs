//! Snapshot export functionality

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::snapshot::FrameSnapshot;

/// Errors that can occur during export
#[derive(Debug)]
pub enum ExportError {
    /// Failed to create or write the output file
    Io {
        path: PathBuf,
        error: std::io::Error,
    },
    /// Failed to encode a snapshot
    Serialize { frame: u64, error: serde_json::Error },
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io { path, error } => {
                write!(f, "Failed to write snapshots to '{}': {}", path.display(), error)
            }
            ExportError::Serialize { frame, error } => {
                write!(f, "Failed to serialize frame {}: {}", frame, error)
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExportError::Io { error, .. } => Some(error),
            ExportError::Serialize { error, .. } => Some(error),
        }
    }
}

/// Streams frame snapshots to a file, one JSON object per line.
pub struct SnapshotWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    written: u64,
}

impl SnapshotWriter {
    /// Create (or truncate) the output file.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|error| ExportError::Io {
            path: path.clone(),
            error,
        })?;

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            written: 0,
        })
    }

    /// Append one snapshot as a single line.
    pub fn write(&mut self, snapshot: &FrameSnapshot) -> Result<(), ExportError> {
        serde_json::to_writer(&mut self.writer, snapshot).map_err(|error| {
            ExportError::Serialize {
                frame: snapshot.frame,
                error,
            }
        })?;
        self.writer.write_all(b"\n").map_err(|error| self.io_error(error))?;
        self.written += 1;
        Ok(())
    }

    /// Number of snapshots written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Flush buffered output to disk.
    pub fn finish(mut self) -> Result<u64, ExportError> {
        self.writer.flush().map_err(|error| self.io_error(error))?;
        log::info!("Wrote {} snapshots to {}", self.written, self.path.display());
        Ok(self.written)
    }

    fn io_error(&self, error: std::io::Error) -> ExportError {
        ExportError::Io {
            path: self.path.clone(),
            error,
        }
    }
}

/// Export a batch of snapshots to a JSON-lines file
///
/// # Arguments
/// * `path` - Output file path
/// * `snapshots` - Frames in emission order
///
/// # Returns
/// * `Ok(())` on success
/// * `Err(ExportError)` on failure
pub fn export_snapshots<P: AsRef<Path>>(path: P, snapshots: &[FrameSnapshot]) -> Result<(), ExportError> {
    let mut writer = SnapshotWriter::create(path)?;
    for snapshot in snapshots {
        writer.write(snapshot)?;
    }
    writer.finish()?;
    Ok(())
}
