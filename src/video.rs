use std::{
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use rand::Rng;
use tracing::{info, warn};

use crate::{
    assets,
    error::{QuotecardError, QuotecardResult},
};

#[derive(Clone, Debug)]
pub struct VideoConfig {
    pub duration_secs: u32,
    pub fps: u32,
    pub out_path: PathBuf,
    pub overwrite: bool,
}

impl VideoConfig {
    pub fn validate(&self) -> QuotecardResult<()> {
        if self.duration_secs == 0 {
            return Err(QuotecardError::validation("video duration must be non-zero"));
        }
        if self.fps == 0 {
            return Err(QuotecardError::validation("video fps must be non-zero"));
        }
        Ok(())
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> QuotecardResult<()> {
    if let Some(parent) = path.parent() {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Turns the square card into a still-image MP4, muxing a randomly chosen
/// music track when one exists. No music means a silent video, not a failure.
///
/// We intentionally shell out to the system `ffmpeg` binary rather than bind
/// FFmpeg natively to avoid dev header/lib requirements.
pub fn assemble_video(
    card_path: &Path,
    music_dir: &Path,
    cfg: &VideoConfig,
    rng: &mut impl Rng,
) -> QuotecardResult<PathBuf> {
    cfg.validate()?;
    ensure_parent_dir(&cfg.out_path)?;

    if !cfg.overwrite && cfg.out_path.exists() {
        return Err(QuotecardError::validation(format!(
            "output file '{}' already exists",
            cfg.out_path.display()
        )));
    }

    if !is_ffmpeg_on_path() {
        return Err(QuotecardError::render(
            "ffmpeg is required for MP4 assembly, but was not found on PATH",
        ));
    }

    let music = assets::pick_asset(music_dir, assets::AUDIO_EXTENSIONS, rng);
    match &music {
        Some(track) => info!(track = %track.display(), "music track selected"),
        None => warn!("no music track found, producing a silent video"),
    }

    let mut cmd = Command::new("ffmpeg");
    cmd.stdin(Stdio::null()).stdout(Stdio::null());

    cmd.arg(if cfg.overwrite { "-y" } else { "-n" });
    cmd.args(["-loglevel", "error", "-loop", "1", "-framerate"])
        .arg(cfg.fps.to_string())
        .arg("-i")
        .arg(card_path);

    if let Some(track) = &music {
        cmd.arg("-i").arg(track);
    }

    cmd.arg("-t")
        .arg(cfg.duration_secs.to_string())
        .args(["-c:v", "libx264", "-pix_fmt", "yuv420p"]);

    if music.is_some() {
        cmd.args(["-c:a", "aac", "-shortest"]);
    }

    cmd.args(["-movflags", "+faststart"]).arg(&cfg.out_path);

    let output = cmd
        .output()
        .map_err(|e| QuotecardError::render(format!("failed to run ffmpeg: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(QuotecardError::render(format!(
            "ffmpeg exited with status {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    info!(video = %cfg.out_path.display(), "video written");
    Ok(cfg.out_path.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_validation_catches_bad_values() {
        assert!(
            VideoConfig {
                duration_secs: 0,
                fps: 30,
                out_path: PathBuf::from("images/out.mp4"),
                overwrite: true,
            }
            .validate()
            .is_err()
        );

        assert!(
            VideoConfig {
                duration_secs: 10,
                fps: 0,
                out_path: PathBuf::from("images/out.mp4"),
                overwrite: true,
            }
            .validate()
            .is_err()
        );
    }
}
