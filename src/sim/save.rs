/// Best-score persistence.
///
/// A single TOML document, `best.toml`:
///
/// ```toml
/// best_score = 31
/// ```
///
/// A missing or unreadable file simply means "no best yet" (0).

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

const BEST_FILE: &str = "best.toml";

#[derive(Serialize, Deserialize, Debug, Default, PartialEq, Eq)]
struct BestRecord {
    #[serde(default)]
    best_score: u32,
}

// ══════════════════════════════════════════════════════════════
// Paths
// ══════════════════════════════════════════════════════════════

fn save_dir() -> PathBuf {
    // 1. Exe directory (portable installs), only if writable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let test_path = parent.join(".write_test_jupikl");
            if std::fs::write(&test_path, "").is_ok() {
                let _ = std::fs::remove_file(&test_path);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/jupikl");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}

pub fn best_path() -> PathBuf {
    save_dir().join(BEST_FILE)
}

// ══════════════════════════════════════════════════════════════
// Load / store
// ══════════════════════════════════════════════════════════════

pub fn load_best_from(path: &Path) -> u32 {
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(_) => return 0,
    };
    match toml::from_str::<BestRecord>(&text) {
        Ok(rec) => rec.best_score,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring corrupt best-score file");
            0
        }
    }
}

pub fn save_best_to(path: &Path, best_score: u32) -> io::Result<()> {
    let text = toml::to_string(&BestRecord { best_score })
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    std::fs::write(path, text)
}

pub fn load_best() -> u32 {
    load_best_from(&best_path())
}

pub fn save_best(best_score: u32) -> io::Result<()> {
    save_best_to(&best_path(), best_score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_zero() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(load_best_from(&dir.path().join("nope.toml")), 0);
    }

    #[test]
    fn stored_best_is_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BEST_FILE);
        save_best_to(&path, 31).unwrap();
        assert_eq!(load_best_from(&path), 31);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("best_score = 31"));
    }

    #[test]
    fn corrupt_file_means_zero() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(BEST_FILE);
        std::fs::write(&path, "best_score = \"lots\"").unwrap();
        assert_eq!(load_best_from(&path), 0);
    }
}
