/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// Problems are collected in `warnings` and logged once logging is up,
/// since the log directory itself comes from this file.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub timing: TimingConfig,
    pub gamepad: GamepadConfig,
    /// Map file in the layered text format. Absent file = built-in world.
    pub map_file: PathBuf,
    /// Fixed RNG seed for reproducible runs.
    pub seed: Option<u64>,
    pub log_dir: PathBuf,
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub tick_rate_ms: u64,
    /// How long a status message stays up, in ticks.
    pub message_ticks: u32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub use_item: Vec<String>,
    pub pickup: Vec<String>,
    pub drop: Vec<String>,
    pub talk: Vec<String>,
    pub slot1: Vec<String>,
    pub slot2: Vec<String>,
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
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_message_ticks")]
    message_ticks: u32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_use", rename = "use")]
    use_item: Vec<String>,
    #[serde(default = "default_pickup")]
    pickup: Vec<String>,
    #[serde(default = "default_drop")]
    drop: Vec<String>,
    #[serde(default = "default_talk")]
    talk: Vec<String>,
    #[serde(default = "default_slot1")]
    slot1: Vec<String>,
    #[serde(default = "default_slot2")]
    slot2: Vec<String>,
    #[serde(default = "default_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_map_file")]
    map_file: String,
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_log_dir")]
    log_dir: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 33 }       // ~30 ticks/s
fn default_message_ticks() -> u32 { 90 }   // 3s

fn default_use() -> Vec<String> { vec!["A".into(), "R1".into()] }
fn default_pickup() -> Vec<String> { vec!["X".into()] }
fn default_drop() -> Vec<String> { vec!["Y".into()] }
fn default_talk() -> Vec<String> { vec!["B".into()] }
fn default_slot1() -> Vec<String> { vec!["L1".into()] }
fn default_slot2() -> Vec<String> { vec!["L2".into()] }
fn default_quit() -> Vec<String> { vec!["Select".into()] }
fn default_map_file() -> String { "map.txt".into() }
fn default_log_dir() -> String { "logs".into() }

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            tick_rate_ms: default_tick_rate(),
            message_ticks: default_message_ticks(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            use_item: default_use(),
            pickup: default_pickup(),
            drop: default_drop(),
            talk: default_talk(),
            slot1: default_slot1(),
            slot2: default_slot2(),
            quit: default_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            map_file: default_map_file(),
            seed: None,
            log_dir: default_log_dir(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: exe directory, current working directory, data dirs.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        Self::from_toml(toml_cfg, &search_dirs, warnings)
    }

    /// Parse a config document directly (no file search).
    #[cfg(test)]
    fn from_text(text: &str) -> Self {
        let mut warnings = Vec::new();
        let cfg = parse_toml(text, Path::new("config.toml"), &mut warnings);
        Self::from_toml(cfg, &[], warnings)
    }

    fn from_toml(toml_cfg: TomlConfig, search_dirs: &[PathBuf], mut warnings: Vec<String>) -> Self {
        let mut tick_rate_ms = toml_cfg.timing.tick_rate_ms;
        if tick_rate_ms == 0 {
            warnings.push("tick_rate_ms must be positive; using default".into());
            tick_rate_ms = default_tick_rate();
        }

        GameConfig {
            timing: TimingConfig {
                tick_rate_ms,
                message_ticks: toml_cfg.timing.message_ticks,
            },
            gamepad: GamepadConfig {
                use_item: toml_cfg.gamepad.use_item,
                pickup: toml_cfg.gamepad.pickup,
                drop: toml_cfg.gamepad.drop,
                talk: toml_cfg.gamepad.talk,
                slot1: toml_cfg.gamepad.slot1,
                slot2: toml_cfg.gamepad.slot2,
                quit: toml_cfg.gamepad.quit,
            },
            map_file: resolve_path(&toml_cfg.general.map_file, search_dirs, Path::exists),
            seed: toml_cfg.general.seed,
            log_dir: PathBuf::from(toml_cfg.general.log_dir),
            warnings,
        }
    }
}

/// Absolute paths are kept; relative ones are looked up in the search dirs
/// and default to CWD-relative.
fn resolve_path(name: &str, search_dirs: &[PathBuf], found: impl Fn(&Path) -> bool) -> PathBuf {
    let path = PathBuf::from(name);
    if path.is_absolute() {
        return path;
    }
    search_dirs.iter()
        .map(|d| d.join(name))
        .find(|p| found(p))
        .unwrap_or(path)
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/hero-adventure");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. System data directory
    let sys = PathBuf::from("/usr/share/hero-adventure");
    if sys.is_dir() && !dirs.iter().any(|d| d == &sys) {
        dirs.push(sys);
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_toml(&text, &path, warnings),
                Err(e) => warnings.push(format!("could not read {}: {e}", path.display())),
            }
        }
    }
    TomlConfig::default()
}

fn parse_toml(text: &str, path: &Path, warnings: &mut Vec<String>) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            warnings.push(format!("{} parse error, using defaults: {e}", path.display()));
            TomlConfig::default()
        }
    }
}
