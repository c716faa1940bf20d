/// `config.toml` loading.
///
/// The first `config.toml` found in `candidate_dirs()` wins. Missing keys take
/// their defaults; an unreadable or unparsable file means all defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub final_level: usize,
}

/// All durations in milliseconds.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TimingConfig {
    pub frame_ms: u64,
    pub ice_step_ms: u32,
    pub skeleton_step_ms: u32,
    pub explosion_ms: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        TimingConfig {
            frame_ms: default_frame(),
            ice_step_ms: default_ice_step(),
            skeleton_step_ms: default_skeleton_step(),
            explosion_ms: default_explosion(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub undo: Vec<String>,
    pub restart: Vec<String>,
    pub skip: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_frame")]
    frame_ms: u64,
    #[serde(default = "default_ice_step")]
    ice_step_ms: u32,
    #[serde(default = "default_skeleton_step")]
    skeleton_step_ms: u32,
    #[serde(default = "default_explosion")]
    explosion_ms: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_undo")]
    undo: Vec<String>,
    #[serde(default = "default_restart")]
    restart: Vec<String>,
    #[serde(default = "default_skip")]
    skip: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_final_level")]
    final_level: usize,
}

// ── Defaults ──

fn default_frame() -> u64 { 33 }
fn default_ice_step() -> u32 { 250 }
fn default_skeleton_step() -> u32 { 1000 }
fn default_explosion() -> u32 { 400 }

fn default_undo() -> Vec<String> { vec!["B".into(), "L1".into()] }
fn default_restart() -> Vec<String> { vec!["Y".into()] }
fn default_skip() -> Vec<String> { vec!["Select".into()] }
fn default_quit() -> Vec<String> { vec!["Start".into()] }
fn default_levels_dir() -> String { "res/levels".into() }
fn default_final_level() -> usize { 5 }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            frame_ms: default_frame(),
            ice_step_ms: default_ice_step(),
            skeleton_step_ms: default_skeleton_step(),
            explosion_ms: default_explosion(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            undo: default_undo(),
            restart: default_restart(),
            skip: default_skip(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            final_level: default_final_level(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, CWD, XDG data home, /usr/share.
    /// Missing file or missing keys fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::resolve(toml_cfg, &search_dirs)
    }

    fn resolve(toml_cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let levels_dir_str = &toml_cfg.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        let mut timing = TimingConfig {
            frame_ms: toml_cfg.timing.frame_ms,
            ice_step_ms: toml_cfg.timing.ice_step_ms,
            skeleton_step_ms: toml_cfg.timing.skeleton_step_ms,
            explosion_ms: toml_cfg.timing.explosion_ms,
        };
        if timing.frame_ms == 0 {
            warn!("timing.frame_ms must be positive, using {}", default_frame());
            timing.frame_ms = default_frame();
        }

        GameConfig {
            timing,
            gamepad: GamepadConfig {
                undo: toml_cfg.gamepad.undo,
                restart: toml_cfg.gamepad.restart,
                skip: toml_cfg.gamepad.skip,
                quit: toml_cfg.gamepad.quit,
            },
            levels_dir,
            final_level: toml_cfg.general.final_level,
        }
    }
}

/// Where config and data may live, most specific first, without repeats.
fn candidate_dirs() -> Vec<PathBuf> {
    let exe_dir = std::env::current_exe().ok()
        // Resolve symlinks to the real binary.
        .map(|exe| exe.canonicalize().unwrap_or(exe))
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    let cwd = std::env::current_dir().ok();
    let xdg = std::env::var_os("HOME")
        .map(|home| PathBuf::from(home).join(".local/share/cryptpush"))
        .filter(|d| d.is_dir());
    let sys = Some(PathBuf::from("/usr/share/cryptpush")).filter(|d| d.is_dir());

    let mut dirs = dedup_dirs([exe_dir, cwd, xdg, sys].into_iter().flatten());
    if dirs.is_empty() { dirs.push(PathBuf::from(".")); }
    dirs
}

fn dedup_dirs(found: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = vec![];
    for d in found {
        if !dirs.contains(&d) { dirs.push(d); }
    }
    dirs
}

/// First readable config.toml in search order.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() { continue; }
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                info!(path = %path.display(), "loading config");
                return parse_toml(&text);
            }
            Err(e) => warn!("could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("config.toml parse error, using default settings: {e}");
            TomlConfig::default()
        }
    }
}
