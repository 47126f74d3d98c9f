/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD), or from an
/// explicit path. Missing file or missing keys fall back to defaults.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub maze: MazeConfig,
    pub slimes: SlimeConfig,
    pub timing: TimingConfig,
    pub general: GeneralConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MazeConfig {
    pub width: usize,
    pub height: usize,
    pub extra_openings: u32,     // random walls knocked out after carving
    pub decoration_chance: f64,  // per leftover wall: becomes water or rock
}

#[derive(Clone, Debug, PartialEq)]
pub struct SlimeConfig {
    pub count: usize,
    pub min_distance: usize,       // Manhattan distance from the player
    pub placement_attempts: u32,   // after this many draws, distance is ignored
}

#[derive(Clone, Debug, PartialEq)]
pub struct TimingConfig {
    pub slime_interval_ms: u64,
    pub reset_delay_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GeneralConfig {
    pub seed: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub log_level: String,
    pub bgm: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    maze: TomlMaze,
    #[serde(default)]
    slimes: TomlSlimes,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlMaze {
    #[serde(default = "default_width")]
    width: usize,
    #[serde(default = "default_height")]
    height: usize,
    #[serde(default = "default_extra_openings")]
    extra_openings: u32,
    #[serde(default = "default_decoration_chance")]
    decoration_chance: f64,
}

#[derive(Deserialize, Debug)]
struct TomlSlimes {
    #[serde(default = "default_slime_count")]
    count: usize,
    #[serde(default = "default_min_distance")]
    min_distance: usize,
    #[serde(default = "default_placement_attempts")]
    placement_attempts: u32,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_slime_interval")]
    slime_interval_ms: u64,
    #[serde(default = "default_reset_delay")]
    reset_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default)]
    log_file: Option<String>,
    #[serde(default = "default_log_level")]
    log_level: String,
    #[serde(default = "default_bgm")]
    bgm: bool,
}

// ── Defaults ──

fn default_width() -> usize { 20 }
fn default_height() -> usize { 20 }
fn default_extra_openings() -> u32 { 30 }
fn default_decoration_chance() -> f64 { 0.1 }
fn default_slime_count() -> usize { 5 }
fn default_min_distance() -> usize { 5 }
fn default_placement_attempts() -> u32 { 100 }
fn default_slime_interval() -> u64 { 1000 }
fn default_reset_delay() -> u64 { 1200 }  // long enough to read the message
fn default_log_level() -> String { "info".into() }
fn default_bgm() -> bool { true }

impl Default for TomlMaze {
    fn default() -> Self {
        TomlMaze {
            width: default_width(),
            height: default_height(),
            extra_openings: default_extra_openings(),
            decoration_chance: default_decoration_chance(),
        }
    }
}

impl Default for TomlSlimes {
    fn default() -> Self {
        TomlSlimes {
            count: default_slime_count(),
            min_distance: default_min_distance(),
            placement_attempts: default_placement_attempts(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            slime_interval_ms: default_slime_interval(),
            reset_delay_ms: default_reset_delay(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            seed: None,
            log_file: None,
            log_level: default_log_level(),
            bgm: default_bgm(),
        }
    }
}

impl Default for MazeConfig {
    fn default() -> Self {
        MazeConfig::from(TomlMaze::default())
    }
}

impl Default for SlimeConfig {
    fn default() -> Self {
        SlimeConfig::from(TomlSlimes::default())
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from(TomlConfig::default())
    }
}

impl From<TomlMaze> for MazeConfig {
    fn from(t: TomlMaze) -> Self {
        MazeConfig {
            width: t.width,
            height: t.height,
            extra_openings: t.extra_openings,
            decoration_chance: t.decoration_chance,
        }
    }
}

impl From<TomlSlimes> for SlimeConfig {
    fn from(t: TomlSlimes) -> Self {
        SlimeConfig {
            count: t.count,
            min_distance: t.min_distance,
            placement_attempts: t.placement_attempts,
        }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            maze: t.maze.into(),
            slimes: t.slimes.into(),
            timing: TimingConfig {
                slime_interval_ms: t.timing.slime_interval_ms,
                reset_delay_ms: t.timing.reset_delay_ms,
            },
            general: GeneralConfig {
                seed: t.general.seed,
                log_file: t.general.log_file.map(PathBuf::from),
                log_level: t.general.log_level,
                bgm: t.general.bgm,
            },
        }
    }
}

// ── Loading ──

/// What happened while looking for a config file.
/// Logging is not set up yet when config loads, so the caller reports this.
#[derive(Debug)]
pub enum LoadNote {
    Loaded(PathBuf),
    NotFound,
    FellBack(ConfigError),
}

impl GameConfig {
    /// Load config.
    /// With an explicit path, any read or parse failure is an error.
    /// Otherwise search (1) exe directory, (2) current working directory;
    /// a broken file found by search falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, LoadNote), ConfigError> {
        if let Some(path) = explicit {
            let cfg = Self::from_file(path)?;
            return Ok((cfg, LoadNote::Loaded(path.to_path_buf())));
        }

        for dir in candidate_dirs() {
            let path = dir.join("config.toml");
            if !path.exists() {
                continue;
            }
            return match Self::from_file(&path) {
                Ok(cfg) => Ok((cfg, LoadNote::Loaded(path))),
                Err(e @ ConfigError::Invalid { .. }) => Err(e),
                Err(e) => Ok((GameConfig::default(), LoadNote::FellBack(e))),
            };
        }

        Ok((GameConfig::default(), LoadNote::NotFound))
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let parsed = toml::from_str::<TomlConfig>(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        let cfg = GameConfig::from(parsed);
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.maze.width < 5 || self.maze.height < 5 {
            return Err(ConfigError::Invalid {
                key: "maze.width/maze.height",
                reason: format!(
                    "maze must be at least 5x5, got {}x{}",
                    self.maze.width, self.maze.height
                ),
            });
        }
        if !(0.0..=1.0).contains(&self.maze.decoration_chance) {
            return Err(ConfigError::Invalid {
                key: "maze.decoration_chance",
                reason: format!("{} is not a probability", self.maze.decoration_chance),
            });
        }
        if self.timing.slime_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: "timing.slime_interval_ms",
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
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

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}
