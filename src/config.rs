/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub tuning: Tuning,
    pub gamepad: GamepadConfig,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub seed: Option<u64>,
}

/// Gameplay numbers. Speeds are world units per second.
#[derive(Clone, Debug, PartialEq)]
pub struct Tuning {
    pub tick_rate_ms: u64,
    pub coins_per_level: u32,
    pub run_speed: f32,
    pub jump_velocity: f32,
    pub gravity: f32,
    pub coin_speed: f32,
    pub rug_speed: f32,
    pub coin_hitbox_inset: f32,
    pub rug_hitbox_inset: f32,
    pub comment_ms: u32,     // fade-out starts here
    pub end_delay_ms: u32,   // finished run → home screen
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    tuning: TomlTuning,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTuning {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_coins_per_level")]
    coins_per_level: u32,
    #[serde(default = "default_run_speed")]
    run_speed: f32,
    #[serde(default = "default_jump_velocity")]
    jump_velocity: f32,
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_coin_speed")]
    coin_speed: f32,
    #[serde(default = "default_rug_speed")]
    rug_speed: f32,
    #[serde(default = "default_coin_inset")]
    coin_hitbox_inset: f32,
    #[serde(default = "default_rug_inset")]
    rug_hitbox_inset: f32,
    #[serde(default = "default_comment_ms")]
    comment_ms: u32,
    #[serde(default = "default_end_delay")]
    end_delay_ms: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_jump_buttons")]
    jump: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_coins_per_level() -> u32 { 10 }
fn default_run_speed() -> f32 { 240.0 }
fn default_jump_velocity() -> f32 { 520.0 }
fn default_gravity() -> f32 { 1400.0 }
fn default_coin_speed() -> f32 { 260.0 }
fn default_rug_speed() -> f32 { 300.0 }
fn default_coin_inset() -> f32 { 4.0 }
fn default_rug_inset() -> f32 { 6.0 }   // a little forgiving on grazes
fn default_comment_ms() -> u32 { 1000 }
fn default_end_delay() -> u32 { 2500 }

fn default_jump_buttons() -> Vec<String> { vec!["A".into(), "B".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into(), "A".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "jupikl.log".into() }
fn default_log_level() -> String { "info".into() }

impl Default for TomlTuning {
    fn default() -> Self {
        TomlTuning {
            tick_rate_ms: default_tick_rate(),
            coins_per_level: default_coins_per_level(),
            run_speed: default_run_speed(),
            jump_velocity: default_jump_velocity(),
            gravity: default_gravity(),
            coin_speed: default_coin_speed(),
            rug_speed: default_rug_speed(),
            coin_hitbox_inset: default_coin_inset(),
            rug_hitbox_inset: default_rug_inset(),
            comment_ms: default_comment_ms(),
            end_delay_ms: default_end_delay(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_jump_buttons(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            log_file: default_log_file(),
            log_level: default_log_level(),
            seed: None,
        }
    }
}

impl Default for Tuning {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default()).tuning
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory, (3) XDG data dir.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        GameConfig::from_toml(load_toml(&search_dirs))
    }

    /// Parse a config document. Unknown keys are ignored; missing keys use defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(GameConfig::from_toml(cfg))
    }

    fn from_toml(cfg: TomlConfig) -> Self {
        let t = cfg.tuning;
        let log_file = if cfg.general.log_file.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(cfg.general.log_file))
        };

        GameConfig {
            tuning: Tuning {
                tick_rate_ms: t.tick_rate_ms.max(1),
                coins_per_level: t.coins_per_level.max(1),
                run_speed: t.run_speed,
                jump_velocity: t.jump_velocity,
                gravity: t.gravity,
                coin_speed: t.coin_speed,
                rug_speed: t.rug_speed,
                coin_hitbox_inset: t.coin_hitbox_inset.max(0.0),
                rug_hitbox_inset: t.rug_hitbox_inset.max(0.0),
                comment_ms: t.comment_ms,
                end_delay_ms: t.end_delay_ms,
            },
            gamepad: GamepadConfig {
                jump: cfg.gamepad.jump,
                confirm: cfg.gamepad.confirm,
                cancel: cfg.gamepad.cancel,
            },
            log_file,
            log_level: cfg.general.log_level,
            seed: cfg.general.seed,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
pub fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/jupikl");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let cfg = GameConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.tuning, Tuning::default());
        assert_eq!(cfg.tuning.coins_per_level, 10);
        assert_eq!(cfg.tuning.end_delay_ms, 2500);
        assert_eq!(cfg.log_file, Some(PathBuf::from("jupikl.log")));
        assert_eq!(cfg.seed, None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg = GameConfig::from_toml_str(
            "[tuning]\ncoins_per_level = 3\nrug_speed = 420.0\n\n[general]\nseed = 7\n",
        ).unwrap();
        assert_eq!(cfg.tuning.coins_per_level, 3);
        assert_eq!(cfg.tuning.rug_speed, 420.0);
        assert_eq!(cfg.tuning.coin_speed, 260.0);
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.gamepad.cancel, vec!["Select".to_string()]);
    }

    #[test]
    fn empty_log_file_disables_logging() {
        let cfg = GameConfig::from_toml_str("[general]\nlog_file = \"\"\n").unwrap();
        assert!(cfg.log_file.is_none());
    }

    #[test]
    fn degenerate_values_are_clamped() {
        let cfg = GameConfig::from_toml_str(
            "[tuning]\ncoins_per_level = 0\ntick_rate_ms = 0\ncoin_hitbox_inset = -5.0\n",
        ).unwrap();
        assert_eq!(cfg.tuning.coins_per_level, 1);
        assert_eq!(cfg.tuning.tick_rate_ms, 1);
        assert_eq!(cfg.tuning.coin_hitbox_inset, 0.0);
    }

    #[test]
    fn malformed_document_is_an_error() {
        assert!(GameConfig::from_toml_str("[tuning\n").is_err());
        assert!(GameConfig::from_toml_str("[tuning]\ncoins_per_level = \"ten\"\n").is_err());
    }
}
