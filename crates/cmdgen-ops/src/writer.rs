//! Persisting generated artifacts.

use std::io::Write;
#[cfg(unix)]
use std::fs::Permissions;
use std::path::Path;
use std::sync::Arc;

use cmdgen_core::{ArtifactDescriptor, RunReport};
use tempfile::{Builder, NamedTempFile};
use tracing::{info, warn};

use crate::error::{OpsError, OpsResult};

/// Low-level sink for generated files.
pub trait ArtifactWriter: Send + Sync {
    /// Write the descriptor's content to its target path, replacing any existing file.
    fn write(&self, descriptor: &ArtifactDescriptor) -> std::io::Result<()>;
}

/// Writes to the local filesystem.
///
/// Content goes to a temporary file next to the target which is then renamed
/// over it, so readers never observe a half-written file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsWriter;

impl ArtifactWriter for FsWriter {
    fn write(&self, descriptor: &ArtifactDescriptor) -> std::io::Result<()> {
        let target = descriptor.path();
        let parent = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(parent)?;

        // Replaced files keep their mode; new ones get the umask default
        let existing = std::fs::metadata(target)
            .ok()
            .filter(|m| m.is_file())
            .map(|m| m.permissions());

        let mut tmp = temp_file_in(parent)?;
        tmp.write_all(descriptor.content.as_bytes())?;
        if let Some(permissions) = existing {
            tmp.as_file().set_permissions(permissions)?;
        }
        tmp.as_file().sync_all()?;
        tmp.persist(target).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(unix)]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    // The mode is passed to open(2), so the process umask still applies
    Builder::new()
        .permissions(Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn temp_file_in(dir: &Path) -> std::io::Result<NamedTempFile> {
    Builder::new().tempfile_in(dir)
}

/// Writes artifacts and records each successful write in the run report.
#[derive(Clone)]
pub struct WriteExecutor {
    writer: Arc<dyn ArtifactWriter>,
}

impl std::fmt::Debug for WriteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WriteExecutor").finish_non_exhaustive()
    }
}

impl Default for WriteExecutor {
    fn default() -> Self {
        Self::new(Arc::new(FsWriter))
    }
}

impl WriteExecutor {
    /// Create an executor on top of a writer.
    pub fn new(writer: Arc<dyn ArtifactWriter>) -> Self {
        Self { writer }
    }

    /// Write one descriptor unconditionally.
    ///
    /// On failure the returned error carries the report as it stood before
    /// this write.
    pub fn write(&self, descriptor: &ArtifactDescriptor, report: &mut RunReport) -> OpsResult<()> {
        match self.writer.write(descriptor) {
            Ok(()) => {
                info!(
                    path = %descriptor.path().display(),
                    kind = %descriptor.kind,
                    bytes = descriptor.content.len(),
                    "Wrote artifact"
                );
                report.record_written(descriptor.path());
                Ok(())
            }
            Err(source) => {
                warn!(path = %descriptor.path().display(), error = %source, "Failed to write artifact");
                Err(OpsError::Write {
                    path: descriptor.target_path.clone(),
                    source,
                    report: report.clone(),
                })
            }
        }
    }

    /// Write descriptors in order, stopping at the first failure.
    pub fn write_all(
        &self,
        descriptors: &[ArtifactDescriptor],
        report: &mut RunReport,
    ) -> OpsResult<()> {
        for descriptor in descriptors {
            self.write(descriptor, report)?;
        }
        Ok(())
    }
}
