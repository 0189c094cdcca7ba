/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use tracing::warn;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub tick_interval: Duration,
    pub trace_cap: usize,
    pub leaderboard_cap: usize,
    pub arrays_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tick_interval: Duration::from_millis(default_tick_ms()),
            trace_cap: default_trace_cap(),
            leaderboard_cap: default_leaderboard_cap(),
            arrays_dir: PathBuf::from(default_arrays_dir()),
        }
    }
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    engine: TomlEngine,
    #[serde(default)]
    leaderboard: TomlLeaderboard,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlEngine {
    #[serde(default = "default_tick_ms")]
    tick_ms: u64,
    #[serde(default = "default_trace_cap")]
    trace_cap: usize,
}

#[derive(Deserialize, Debug)]
struct TomlLeaderboard {
    #[serde(default = "default_leaderboard_cap")]
    cap: usize,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_arrays_dir")]
    arrays_dir: String,
}

// ── Defaults ──

fn default_tick_ms() -> u64 { 400 }
fn default_trace_cap() -> usize { 100 }
fn default_leaderboard_cap() -> usize { 10 }
fn default_arrays_dir() -> String { "arrays".into() }

impl Default for TomlEngine {
    fn default() -> Self {
        TomlEngine {
            tick_ms: default_tick_ms(),
            trace_cap: default_trace_cap(),
        }
    }
}

impl Default for TomlLeaderboard {
    fn default() -> Self {
        TomlLeaderboard { cap: default_leaderboard_cap() }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { arrays_dir: default_arrays_dir() }
    }
}

// ── Loading ──

impl EngineConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Resolve the arrays directory
        let arrays_dir_str = &toml_cfg.general.arrays_dir;
        let arrays_dir = if PathBuf::from(arrays_dir_str).is_absolute() {
            PathBuf::from(arrays_dir_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(arrays_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(arrays_dir_str))
        };

        EngineConfig {
            tick_interval: Duration::from_millis(toml_cfg.engine.tick_ms),
            trace_cap: toml_cfg.engine.trace_cap,
            leaderboard_cap: toml_cfg.leaderboard.cap,
            arrays_dir,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + system paths (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a /usr/bin shim still finds its data dir.
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

    // 3. XDG data home (~/.local/share/simulacra-core)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/simulacra-core");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    // 4. Fallback
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
                        warn!("config.toml parse error: {e}; using default settings");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warn!("could not read {}: {e}", path.display());
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
    fn missing_keys_take_defaults() {
        let cfg: TomlConfig = toml::from_str("[engine]\ntick_ms = 100\n").unwrap();
        assert_eq!(cfg.engine.tick_ms, 100);
        assert_eq!(cfg.engine.trace_cap, 100);
        assert_eq!(cfg.leaderboard.cap, 10);
        assert_eq!(cfg.general.arrays_dir, "arrays");
    }

    #[test]
    fn empty_document_is_fully_defaulted() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.engine.tick_ms, 400);
    }

    #[test]
    fn default_tick_interval_is_400ms() {
        assert_eq!(EngineConfig::default().tick_interval, Duration::from_millis(400));
    }
}
