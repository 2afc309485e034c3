use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use uuid::Uuid;

use crate::application::ports::{AudioPrepError, AudioPreparer, PreparedAudio};

/// Audio prober/transcoder backed by the host's ffmpeg/ffprobe
/// binaries. Oversized files are transcoded to mono 16 kHz opus and,
/// when still over the limit, split into fixed-duration segments.
pub struct FfmpegPreparer {
    ffmpeg_bin: String,
    ffprobe_bin: String,
    scratch_root: PathBuf,
    chunk_seconds: u32,
    transcode_bitrate: String,
    segment_bitrate: String,
}

impl FfmpegPreparer {
    pub fn new(
        ffmpeg_bin: String,
        ffprobe_bin: String,
        scratch_root: PathBuf,
        chunk_seconds: u32,
    ) -> Self {
        Self {
            ffmpeg_bin,
            ffprobe_bin,
            scratch_root,
            chunk_seconds,
            transcode_bitrate: "48k".to_string(),
            segment_bitrate: "64k".to_string(),
        }
    }

    async fn tooling_available(&self) -> bool {
        for bin in [&self.ffmpeg_bin, &self.ffprobe_bin] {
            let probe = Command::new(bin)
                .arg("-version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .await;
            if probe.is_err() {
                return false;
            }
        }
        true
    }

    async fn transcode(&self, src: &Path, dst: &Path, bitrate: &str) -> Result<(), AudioPrepError> {
        let output = Command::new(&self.ffmpeg_bin)
            .arg("-y")
            .arg("-i")
            .arg(src)
            .args(["-ac", "1", "-ar", "16000", "-c:a", "libopus", "-b:a", bitrate])
            .arg(dst)
            .output()
            .await
            .map_err(|e| AudioPrepError::ToolingUnavailable(e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioPrepError::TranscodeFailed(
                stderr.lines().last().unwrap_or("ffmpeg failed").to_string(),
            ));
        }
        if file_size(dst).await.unwrap_or(0) == 0 {
            return Err(AudioPrepError::TranscodeFailed(
                "ffmpeg produced an empty file".to_string(),
            ));
        }
        Ok(())
    }

    /// Shrink an oversized file into the scratch dir: transcode first,
    /// split only when the transcode alone does not fit.
    async fn shrink_into(
        &self,
        path: &Path,
        limit_bytes: u64,
        scratch: &Path,
    ) -> Result<PreparedAudio, AudioPrepError> {
        let compressed = scratch.join("compressed.ogg");
        self.transcode(path, &compressed, &self.transcode_bitrate)
            .await?;

        if file_size(&compressed).await? <= limit_bytes {
            tracing::debug!(path = %compressed.display(), "Transcode alone fit the limit");
            return Ok(PreparedAudio {
                segments: vec![compressed],
                scratch_dir: Some(scratch.to_path_buf()),
            });
        }

        let duration = self.duration_seconds(&compressed).await?;
        let segments = self
            .split(&compressed, scratch, duration, limit_bytes)
            .await?;
        tracing::info!(segments = segments.len(), "Audio split into segments");
        Ok(PreparedAudio {
            segments,
            scratch_dir: Some(scratch.to_path_buf()),
        })
    }

    /// Walk the timeline from zero to the full duration in fixed
    /// windows, re-encoding each window with the same codec settings.
    /// Every emitted segment must itself fit `limit_bytes`.
    async fn split(
        &self,
        src: &Path,
        out_dir: &Path,
        duration: f64,
        limit_bytes: u64,
    ) -> Result<Vec<PathBuf>, AudioPrepError> {
        let mut parts = Vec::new();
        let mut start = 0.0f64;
        let mut index = 1u32;

        while start < duration - 0.1 {
            let out = out_dir.join(format!("part_{:03}.ogg", index));
            let output = Command::new(&self.ffmpeg_bin)
                .arg("-y")
                .args(["-ss", &format!("{:.2}", start)])
                .arg("-i")
                .arg(src)
                .args(["-t", &self.chunk_seconds.to_string()])
                .args([
                    "-ac",
                    "1",
                    "-ar",
                    "16000",
                    "-c:a",
                    "libopus",
                    "-b:a",
                    &self.segment_bitrate,
                ])
                .arg(&out)
                .output()
                .await
                .map_err(|e| AudioPrepError::ToolingUnavailable(e.to_string()))?;

            let size = if output.status.success() {
                file_size(&out).await.unwrap_or(0)
            } else {
                0
            };
            if size > limit_bytes {
                return Err(AudioPrepError::SplitFailed(format!(
                    "segment {} is {} bytes, over the {}-byte limit",
                    index, size, limit_bytes
                )));
            }
            if size > 0 {
                parts.push(out);
            } else {
                tracing::warn!(segment = index, "Split segment came out empty, skipping");
            }
            index += 1;
            start += f64::from(self.chunk_seconds);
        }

        if parts.is_empty() {
            return Err(AudioPrepError::SplitFailed(
                "no non-empty segments produced".to_string(),
            ));
        }
        Ok(parts)
    }
}

#[async_trait]
impl AudioPreparer for FfmpegPreparer {
    async fn duration_seconds(&self, path: &Path) -> Result<f64, AudioPrepError> {
        let output = Command::new(&self.ffprobe_bin)
            .args(["-v", "error", "-show_entries", "format=duration", "-of", "default=nw=1:nk=1"])
            .arg(path)
            .output()
            .await
            .map_err(|e| AudioPrepError::ToolingUnavailable(e.to_string()))?;

        let raw = String::from_utf8_lossy(&output.stdout);
        let seconds: f64 = raw
            .trim()
            .parse()
            .map_err(|_| AudioPrepError::DurationUnmeasurable(format!("ffprobe output: {:?}", raw.trim())))?;

        if !seconds.is_finite() || seconds <= 0.0 {
            return Err(AudioPrepError::DurationUnmeasurable(format!(
                "non-positive duration {}",
                seconds
            )));
        }
        Ok(seconds)
    }

    async fn prepare(
        &self,
        path: &Path,
        limit_bytes: u64,
    ) -> Result<PreparedAudio, AudioPrepError> {
        let size = file_size(path).await?;
        if size <= limit_bytes {
            // Already small enough; re-encoding would only lose quality.
            return Ok(PreparedAudio::passthrough(path.to_path_buf()));
        }

        if !self.tooling_available().await {
            return Err(AudioPrepError::ToolingUnavailable(format!(
                "{}/{} not found on host",
                self.ffmpeg_bin, self.ffprobe_bin
            )));
        }

        let scratch = self.scratch_root.join(format!("prep-{}", Uuid::new_v4()));
        tokio::fs::create_dir_all(&scratch).await?;

        // On failure nothing in the scratch dir is usable; drop it here
        // because the caller only sees the path on success.
        match self.shrink_into(path, limit_bytes, &scratch).await {
            Ok(prepared) => Ok(prepared),
            Err(e) => {
                if let Err(cleanup) = tokio::fs::remove_dir_all(&scratch).await {
                    tracing::warn!(
                        path = %scratch.display(),
                        error = %cleanup,
                        "Failed to remove scratch dir after preparation error"
                    );
                }
                Err(e)
            }
        }
    }
}

async fn file_size(path: &Path) -> Result<u64, AudioPrepError> {
    Ok(tokio::fs::metadata(path).await?.len())
}
