use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{MediaError, Result};
use crate::profile::extension_of;

/// Transcodes a media file into another container/format.
pub trait MediaConverter: Send + Sync {
    /// Convert `source` to `target_extension` (dot-prefixed) and return the
    /// path of the produced file.
    fn convert(
        &self,
        source: &Path,
        target_extension: &str,
        destination: Option<&Path>,
    ) -> Result<PathBuf>;
}

/// Where a converted file lands: next to `source`, or inside `destination`
/// which must be an existing directory.
pub fn target_path(
    source: &Path,
    target_extension: &str,
    destination: Option<&Path>,
) -> Result<PathBuf> {
    let extension = target_extension.trim_start_matches('.');
    match destination {
        None => Ok(source.with_extension(extension)),
        Some(dir) if dir.is_dir() => {
            let stem = source.file_stem().unwrap_or(source.as_os_str());
            Ok(dir.join(format!("{}.{}", stem.to_string_lossy(), extension)))
        }
        Some(dir) => Err(MediaError::InvalidDestination(dir.to_path_buf())),
    }
}

/// Runs the `ffmpeg` binary as a child process.
#[derive(Debug, Clone)]
pub struct FfmpegConverter {
    ffmpeg_path: PathBuf,
}

impl FfmpegConverter {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }
}

impl Default for FfmpegConverter {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl MediaConverter for FfmpegConverter {
    fn convert(
        &self,
        source: &Path,
        target_extension: &str,
        destination: Option<&Path>,
    ) -> Result<PathBuf> {
        let target = target_path(source, target_extension, destination)?;
        let transcode_error = |reason: String| MediaError::Transcode {
            path: source.to_path_buf(),
            source_format: extension_of(source),
            target_format: target_extension.to_string(),
            reason,
        };

        log::debug!(
            "Converting {} -> {} with {}",
            source.display(),
            target.display(),
            self.ffmpeg_path.display()
        );
        let output = Command::new(&self.ffmpeg_path)
            .arg("-y")
            .arg("-i")
            .arg(source)
            .arg(&target)
            .output()
            .map_err(|e| transcode_error(format!("failed to run ffmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let reason = stderr
                .lines()
                .last()
                .map(str::to_string)
                .unwrap_or_else(|| format!("ffmpeg exited with {}", output.status));
            return Err(transcode_error(reason));
        }

        Ok(target)
    }
}
