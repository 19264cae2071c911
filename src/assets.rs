use std::path::{Path, PathBuf};

use anyhow::Context as _;
use rand::Rng;
use tracing::warn;

use crate::{config::Dirs, error::QuotecardResult};

/// Extensions accepted for background images and icons.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "png"];
/// Extensions accepted for music tracks.
pub const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav"];

/// Creates the full directory layout. Run once at startup so later lookups
/// can treat a missing directory the same as an empty one.
pub fn ensure_dirs(dirs: &Dirs) -> QuotecardResult<()> {
    for dir in dirs.all() {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create directory '{}'", dir.display()))?;
    }
    Ok(())
}

/// Files in `dir` whose extension matches `extensions` (case-insensitive),
/// sorted by name so a seeded random source selects deterministically. A
/// missing or unreadable directory yields an empty list.
pub fn list_assets(dir: &Path, extensions: &[&str]) -> Vec<PathBuf> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return Vec::new(),
    };

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_extension(p, extensions))
        .collect();
    files.sort();
    files
}

/// Uniformly picks one matching file, or `None` when nothing usable exists.
pub fn pick_asset(dir: &Path, extensions: &[&str], rng: &mut impl Rng) -> Option<PathBuf> {
    let files = list_assets(dir, extensions);
    if files.is_empty() {
        warn!(dir = %dir.display(), "no matching assets found");
        return None;
    }
    let idx = rng.gen_range(0..files.len());
    files.into_iter().nth(idx)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| extensions.iter().any(|want| *want == e))
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("quotecard_{name}_{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_directory_yields_none() {
        let dir = std::env::temp_dir().join("quotecard_does_not_exist");
        let mut rng = StdRng::seed_from_u64(0);
        assert!(pick_asset(&dir, IMAGE_EXTENSIONS, &mut rng).is_none());
    }

    #[test]
    fn extension_match_is_case_insensitive_and_filtered() {
        let dir = scratch_dir("assets_filter");
        std::fs::write(dir.join("a.JPG"), b"x").unwrap();
        std::fs::write(dir.join("b.png"), b"x").unwrap();
        std::fs::write(dir.join("notes.txt"), b"x").unwrap();

        let files = list_assets(&dir, IMAGE_EXTENSIONS);
        assert_eq!(files.len(), 2);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn pick_is_deterministic_under_a_seeded_source() {
        let dir = scratch_dir("assets_pick");
        for name in ["a.jpg", "b.jpg", "c.jpg", "d.jpg"] {
            std::fs::write(dir.join(name), b"x").unwrap();
        }

        let a = pick_asset(&dir, IMAGE_EXTENSIONS, &mut StdRng::seed_from_u64(42));
        let b = pick_asset(&dir, IMAGE_EXTENSIONS, &mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.is_some());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn ensure_dirs_creates_the_full_layout() {
        let root = scratch_dir("layout");
        let dirs = Dirs::new(&root);
        ensure_dirs(&dirs).unwrap();
        for dir in dirs.all() {
            assert!(dir.is_dir(), "{} missing", dir.display());
        }
        let _ = std::fs::remove_dir_all(&root);
    }
}
