//! Scoped file handling for one job.
//!
//! Intermediate files live in a private temporary directory that disappears
//! when the workspace is dropped. The final MP4 is written straight into the
//! output directory but stays guarded: unless [`JobWorkspace::commit`] is
//! called, dropping the workspace removes it too, so a failed job never leaves
//! a half-written video behind.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::Result;

/// Temporary files plus the guarded output path of a single job
pub struct JobWorkspace {
    scratch: TempDir,
    output: PathBuf,
    committed: bool,
}

impl JobWorkspace {
    /// Create the scratch directory and reserve `<output_dir>/video_<job_id>.mp4`
    pub fn create(output_dir: &Path, job_id: &str) -> Result<Self> {
        fs::create_dir_all(output_dir)?;

        let scratch = tempfile::Builder::new()
            .prefix(&format!("news_reel_{}_", job_id))
            .tempdir()?;
        let output = output_dir.join(format!("video_{}.mp4", job_id));

        debug!(scratch = %scratch.path().display(), output = %output.display(), "Created job workspace");
        Ok(Self {
            scratch,
            output,
            committed: false,
        })
    }

    /// Directory for intermediate files
    pub fn scratch_dir(&self) -> &Path {
        self.scratch.path()
    }

    /// Where the finished video will be written
    pub fn output_path(&self) -> &Path {
        &self.output
    }

    /// Write an intermediate file and return its path
    pub fn write_scratch(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.scratch.path().join(file_name);
        fs::write(&path, bytes)?;
        Ok(path)
    }

    /// Keep the output file; scratch files are still removed on drop
    pub fn commit(mut self) -> PathBuf {
        self.committed = true;
        self.output.clone()
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        if !self.committed && self.output.exists() {
            match fs::remove_file(&self.output) {
                Ok(()) => debug!(path = %self.output.display(), "Removed partial output"),
                Err(e) => warn!(path = %self.output.display(), error = %e, "Failed to remove partial output"),
            }
        }
        // TempDir removes the scratch directory when it drops after this
    }
}
