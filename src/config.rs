use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;

use crate::{
    error::{QuotecardError, QuotecardResult},
    schedule::Window,
};

/// Directory layout rooted at the working directory. All directories are
/// created lazily at startup; a missing directory is never a hard error for
/// asset lookups.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct Dirs {
    pub root: PathBuf,
}

impl Default for Dirs {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

impl Dirs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn images(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn music(&self) -> PathBuf {
        self.root.join("music")
    }

    pub fn fonts(&self) -> PathBuf {
        self.root.join("fonts")
    }

    pub fn assets(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn backgrounds(&self) -> PathBuf {
        self.assets().join("backgrounds")
    }

    pub fn all(&self) -> [PathBuf; 5] {
        [
            self.images(),
            self.music(),
            self.fonts(),
            self.assets(),
            self.backgrounds(),
        ]
    }
}

/// Fixed output artifact paths, overwritten on every cycle.
#[derive(Clone, Debug)]
pub struct OutputPaths {
    pub card: PathBuf,
    pub thumbnail: PathBuf,
    pub video: PathBuf,
}

impl OutputPaths {
    pub fn for_dirs(dirs: &Dirs) -> Self {
        let images = dirs.images();
        Self {
            card: images.join("quote_card.jpg"),
            thumbnail: images.join("quote_card_thumb.jpg"),
            video: images.join("quote_card.mp4"),
        }
    }
}

/// One watermark row: an optional icon file (looked up under `assets/`) and
/// the label drawn 42px to its right.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct WatermarkRow {
    pub icon: String,
    pub label: String,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Config {
    pub dirs: Dirs,
    pub windows: Vec<Window>,
    pub watermark_rows: Vec<WatermarkRow>,
    pub caption: String,
    /// Preferred font file name under `fonts/`.
    pub font_file: String,
    pub poll_interval_secs: u64,
    pub regen_cooldown_secs: u64,
    pub video_duration_secs: u32,
    pub video_fps: u32,
    pub quote_max_attempts: u32,
    pub completion_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dirs: Dirs::default(),
            windows: Window::default_windows(),
            watermark_rows: vec![
                WatermarkRow {
                    icon: "youtube.png".to_string(),
                    label: "youtube.com/@thehiddenwisdom".to_string(),
                },
                WatermarkRow {
                    icon: "instagram.png".to_string(),
                    label: "@hiddenwisdom.daily".to_string(),
                },
            ],
            caption: "Message of the day \u{2728}\u{1f525} #motivation #wisdom #reels"
                .to_string(),
            font_file: "quote.ttf".to_string(),
            poll_interval_secs: 20,
            regen_cooldown_secs: 60,
            video_duration_secs: 10,
            video_fps: 30,
            quote_max_attempts: 5,
            completion_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl Config {
    pub fn from_json_file(path: &Path) -> QuotecardResult<Self> {
        let f = File::open(path)
            .with_context(|| format!("open config '{}'", path.display()))?;
        let r = BufReader::new(f);
        let cfg: Config = serde_json::from_reader(r)
            .with_context(|| format!("parse config '{}'", path.display()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> QuotecardResult<()> {
        if self.windows.is_empty() {
            return Err(QuotecardError::validation(
                "at least one scheduling window is required",
            ));
        }
        for w in &self.windows {
            w.validate()?;
        }
        if self.poll_interval_secs == 0 || self.poll_interval_secs >= 60 {
            // The minute-granular schedule is only guaranteed to be observed
            // with a sub-minute poll interval.
            return Err(QuotecardError::validation(
                "poll interval must be in 1..=59 seconds",
            ));
        }
        if self.video_duration_secs == 0 || self.video_fps == 0 {
            return Err(QuotecardError::validation(
                "video duration and fps must be non-zero",
            ));
        }
        if self.quote_max_attempts == 0 {
            return Err(QuotecardError::validation(
                "quote_max_attempts must be at least 1",
            ));
        }
        Ok(())
    }

    pub fn output_paths(&self) -> OutputPaths {
        OutputPaths::for_dirs(&self.dirs)
    }

    pub fn font_path(&self) -> PathBuf {
        self.dirs.fonts().join(&self.font_file)
    }
}

/// Completion-service key. Required for quote generation; commands that call
/// the generator abort at startup without it.
pub fn completion_api_key() -> QuotecardResult<String> {
    match std::env::var("OPENAI_API_KEY") {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(QuotecardError::validation(
            "OPENAI_API_KEY is not set; the quote generator cannot run without it",
        )),
    }
}

/// Platform credentials. Absence is a warning-level no-op at publish time,
/// never a failure of the cycle.
pub fn platform_credentials() -> Option<(String, String)> {
    let user = std::env::var("IG_USER").ok()?;
    let pass = std::env::var("IG_PASS").ok()?;
    if user.trim().is_empty() || pass.trim().is_empty() {
        return None;
    }
    Some((user, pass))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn default_layout_matches_reference_paths() {
        let dirs = Dirs::default();
        assert_eq!(dirs.backgrounds(), PathBuf::from("./assets/backgrounds"));

        let out = OutputPaths::for_dirs(&dirs);
        assert_eq!(out.card, PathBuf::from("./images/quote_card.jpg"));
        assert_eq!(out.thumbnail, PathBuf::from("./images/quote_card_thumb.jpg"));
        assert_eq!(out.video, PathBuf::from("./images/quote_card.mp4"));
    }

    #[test]
    fn validation_rejects_minute_blind_poll_interval() {
        let cfg = Config {
            poll_interval_secs: 60,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validation_rejects_empty_windows() {
        let cfg = Config {
            windows: vec![],
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }
}
