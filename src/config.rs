/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.
/// The defaults reproduce the classic tuning: 400×600 arena, gravity 0.3,
/// jump 10 / boosted 18, platforms 60×10 spaced 80 apart.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub world: WorldConfig,
    pub physics: PhysicsConfig,
    pub generator: GeneratorConfig,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
}

/// Arena dimensions in world units. `height` is one camera window.
#[derive(Clone, Debug)]
pub struct WorldConfig {
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub move_speed: f32,
    pub jump: f32,
    pub boosted_jump: f32,
    pub boost_ticks: u32,
    pub player_width: f32,
    pub player_height: f32,
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub initial_platforms: usize,
    pub spacing: f32,
    pub platform_width: f32,
    pub platform_height: f32,
    pub drift_speed: f32,
    pub powerup_size: f32,
    /// One power-up per `powerup_chance` extend calls, on average.
    pub powerup_chance: u32,
    /// Score awarded per platform generated.
    pub platform_score: u32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    world: TomlWorld,
    #[serde(default)]
    physics: TomlPhysics,
    #[serde(default)]
    generator: TomlGenerator,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlWorld {
    #[serde(default = "default_width")]
    width: f32,
    #[serde(default = "default_height")]
    height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlPhysics {
    #[serde(default = "default_gravity")]
    gravity: f32,
    #[serde(default = "default_move_speed")]
    move_speed: f32,
    #[serde(default = "default_jump")]
    jump: f32,
    #[serde(default = "default_boosted_jump")]
    boosted_jump: f32,
    #[serde(default = "default_boost_ticks")]
    boost_ticks: u32,
    #[serde(default = "default_player_width")]
    player_width: f32,
    #[serde(default = "default_player_height")]
    player_height: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGenerator {
    #[serde(default = "default_initial_platforms")]
    initial_platforms: usize,
    #[serde(default = "default_spacing")]
    spacing: f32,
    #[serde(default = "default_platform_width")]
    platform_width: f32,
    #[serde(default = "default_platform_height")]
    platform_height: f32,
    #[serde(default = "default_drift_speed")]
    drift_speed: f32,
    #[serde(default = "default_powerup_size")]
    powerup_size: f32,
    #[serde(default = "default_powerup_chance")]
    powerup_chance: u32,
    #[serde(default = "default_platform_score")]
    platform_score: u32,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }        // ~60 Hz
fn default_width() -> f32 { 400.0 }
fn default_height() -> f32 { 600.0 }
fn default_gravity() -> f32 { 0.3 }
fn default_move_speed() -> f32 { 4.0 }
fn default_jump() -> f32 { 10.0 }
fn default_boosted_jump() -> f32 { 18.0 }
fn default_boost_ticks() -> u32 { 60 }      // one second of spring
fn default_player_width() -> f32 { 50.0 }
fn default_player_height() -> f32 { 60.0 }
fn default_initial_platforms() -> usize { 10 }
fn default_spacing() -> f32 { 80.0 }
fn default_platform_width() -> f32 { 60.0 }
fn default_platform_height() -> f32 { 10.0 }
fn default_drift_speed() -> f32 { 2.0 }
fn default_powerup_size() -> f32 { 20.0 }
fn default_powerup_chance() -> u32 { 15 }
fn default_platform_score() -> u32 { 10 }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed { tick_rate_ms: default_tick_rate() }
    }
}

impl Default for TomlWorld {
    fn default() -> Self {
        TomlWorld {
            width: default_width(),
            height: default_height(),
        }
    }
}

impl Default for TomlPhysics {
    fn default() -> Self {
        TomlPhysics {
            gravity: default_gravity(),
            move_speed: default_move_speed(),
            jump: default_jump(),
            boosted_jump: default_boosted_jump(),
            boost_ticks: default_boost_ticks(),
            player_width: default_player_width(),
            player_height: default_player_height(),
        }
    }
}

impl Default for TomlGenerator {
    fn default() -> Self {
        TomlGenerator {
            initial_platforms: default_initial_platforms(),
            spacing: default_spacing(),
            platform_width: default_platform_width(),
            platform_height: default_platform_height(),
            drift_speed: default_drift_speed(),
            powerup_size: default_powerup_size(),
            powerup_chance: default_powerup_chance(),
            platform_score: default_platform_score(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let toml_cfg = load_toml(&candidate_dirs());

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms,
            },
            world: WorldConfig {
                width: toml_cfg.world.width,
                height: toml_cfg.world.height,
            },
            physics: PhysicsConfig {
                gravity: toml_cfg.physics.gravity,
                move_speed: toml_cfg.physics.move_speed,
                jump: toml_cfg.physics.jump,
                boosted_jump: toml_cfg.physics.boosted_jump,
                boost_ticks: toml_cfg.physics.boost_ticks,
                player_width: toml_cfg.physics.player_width,
                player_height: toml_cfg.physics.player_height,
            },
            generator: GeneratorConfig {
                initial_platforms: toml_cfg.generator.initial_platforms,
                spacing: toml_cfg.generator.spacing,
                platform_width: toml_cfg.generator.platform_width,
                platform_height: toml_cfg.generator.platform_height,
                drift_speed: toml_cfg.generator.drift_speed,
                powerup_size: toml_cfg.generator.powerup_size,
                powerup_chance: toml_cfg.generator.powerup_chance,
                platform_score: toml_cfg.generator.platform_score,
            },
        }
    }

    /// Built-in defaults, bypassing the filesystem. Used by tests.
    #[cfg(test)]
    pub fn default_values() -> Self {
        let toml_cfg = TomlConfig::default();
        GameConfig {
            speed: SpeedConfig { tick_rate_ms: toml_cfg.speed.tick_rate_ms },
            world: WorldConfig {
                width: toml_cfg.world.width,
                height: toml_cfg.world.height,
            },
            physics: PhysicsConfig {
                gravity: toml_cfg.physics.gravity,
                move_speed: toml_cfg.physics.move_speed,
                jump: toml_cfg.physics.jump,
                boosted_jump: toml_cfg.physics.boosted_jump,
                boost_ticks: toml_cfg.physics.boost_ticks,
                player_width: toml_cfg.physics.player_width,
                player_height: toml_cfg.physics.player_height,
            },
            generator: GeneratorConfig {
                initial_platforms: toml_cfg.generator.initial_platforms,
                spacing: toml_cfg.generator.spacing,
                platform_width: toml_cfg.generator.platform_width,
                platform_height: toml_cfg.generator.platform_height,
                drift_speed: toml_cfg.generator.drift_speed,
                powerup_size: toml_cfg.generator.powerup_size,
                powerup_chance: toml_cfg.generator.powerup_chance,
                platform_score: toml_cfg.generator.platform_score,
            },
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
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
    fn partial_toml_fills_missing_keys() {
        let cfg: TomlConfig = toml::from_str(
            "[physics]\ngravity = 0.5\n\n[world]\nwidth = 320.0\n",
        ).unwrap();
        assert_eq!(cfg.physics.gravity, 0.5);
        assert_eq!(cfg.world.width, 320.0);
        // Untouched keys keep their defaults
        assert_eq!(cfg.world.height, 600.0);
        assert_eq!(cfg.physics.jump, 10.0);
        assert_eq!(cfg.generator.spacing, 80.0);
        assert_eq!(cfg.speed.tick_rate_ms, 16);
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.generator.initial_platforms, 10);
        assert_eq!(cfg.generator.powerup_chance, 15);
        assert_eq!(cfg.physics.boost_ticks, 60);
    }
}
