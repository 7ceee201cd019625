//! Tunable generation and rules parameters, loadable from TOML.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: usize,
    pub max: usize,
}

impl CountRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn contains(self, value: usize) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RatioBand {
    pub min: f64,
    pub max: f64,
}

impl RatioBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub rules: RulesConfig,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        self.rules.validate()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub width: usize,
    pub height: usize,
    pub max_attempts: u32,
    /// Exit positions tried per base map before regenerating it.
    pub exit_attempts: u32,
    pub door_attempts: u32,
    pub hazard_attempts: u32,
    pub min_exit_key_distance: u32,
    pub min_perimeter_wall_ratio: f64,
    pub default_floor_band: RatioBand,
    pub default_rooms: CountRange,
    pub center_out_floor_band: RatioBand,
    pub center_out_rooms: CountRange,
    pub chest_lock_chance: f64,
    pub faulty_floors: CountRange,
    pub goblins: CountRange,
    pub snakes: CountRange,
    pub snake_pot_chance: f64,
    pub min_enemy_distance: u32,
    pub rocks: CountRange,
    pub pots: CountRange,
    pub runes: CountRange,
    pub wall_torches: CountRange,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            width: 25,
            height: 25,
            max_attempts: 200,
            exit_attempts: 8,
            door_attempts: 40,
            hazard_attempts: 30,
            min_exit_key_distance: 13,
            min_perimeter_wall_ratio: 0.5,
            default_floor_band: RatioBand::new(0.50, 0.75),
            default_rooms: CountRange::new(1, 4),
            center_out_floor_band: RatioBand::new(0.35, 0.60),
            center_out_rooms: CountRange::new(1, 6),
            chest_lock_chance: 0.5,
            faulty_floors: CountRange::new(2, 5),
            goblins: CountRange::new(1, 2),
            snakes: CountRange::new(1, 3),
            snake_pot_chance: 0.35,
            min_enemy_distance: 4,
            rocks: CountRange::new(3, 7),
            pots: CountRange::new(3, 7),
            runes: CountRange::new(1, 2),
            wall_torches: CountRange::new(2, 5),
        }
    }
}

impl GeneratorConfig {
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 7 || self.height < 7 {
            return Err(ConfigError::Invalid(format!(
                "map must be at least 7x7, got {}x{}",
                self.width, self.height
            )));
        }
        if self.max_attempts == 0 || self.exit_attempts == 0 {
            return Err(ConfigError::Invalid("attempt limits must be positive".to_string()));
        }
        let ranges = [
            ("default_rooms", self.default_rooms),
            ("center_out_rooms", self.center_out_rooms),
            ("faulty_floors", self.faulty_floors),
            ("goblins", self.goblins),
            ("snakes", self.snakes),
            ("rocks", self.rocks),
            ("pots", self.pots),
            ("runes", self.runes),
            ("wall_torches", self.wall_torches),
        ];
        for (name, range) in ranges {
            if range.min > range.max {
                return Err(ConfigError::Invalid(format!(
                    "{name}: min {} exceeds max {}",
                    range.min, range.max
                )));
            }
        }
        for (name, band) in [
            ("default_floor_band", self.default_floor_band),
            ("center_out_floor_band", self.center_out_floor_band),
        ] {
            if !(0.0..=1.0).contains(&band.min) || !(band.min..=1.0).contains(&band.max) {
                return Err(ConfigError::Invalid(format!(
                    "{name}: band {}..{} is not inside 0..1",
                    band.min, band.max
                )));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    pub hero_max_health: i32,
    pub hero_attack: i32,
    pub sword_attack_bonus: i32,
    pub shield_block: i32,
    pub food_heal: i32,
    pub potion_heal: i32,
    pub poison_step_interval: u32,
    pub poison_damage: i32,
    pub full_map_duration_ms: u64,
    pub pot_reveal_threshold: f64,
    pub enemy_aggro_range: u32,
    pub rock_damage: i32,
    pub rune_damage: i32,
    pub npc_memory_capacity: usize,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            hero_max_health: 10,
            hero_attack: 1,
            sword_attack_bonus: 2,
            shield_block: 1,
            food_heal: 2,
            potion_heal: 5,
            poison_step_interval: 8,
            poison_damage: 1,
            full_map_duration_ms: 3_000,
            pot_reveal_threshold: 0.5,
            enemy_aggro_range: 5,
            rock_damage: 1,
            rune_damage: 3,
            npc_memory_capacity: 32,
        }
    }
}

impl RulesConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.hero_max_health <= 0 {
            return Err(ConfigError::Invalid("hero_max_health must be positive".to_string()));
        }
        if self.poison_step_interval == 0 {
            return Err(ConfigError::Invalid("poison_step_interval must be positive".to_string()));
        }
        if !(0.0..=1.0).contains(&self.pot_reveal_threshold) {
            return Err(ConfigError::Invalid(
                "pot_reveal_threshold must be inside 0..1".to_string(),
            ));
        }
        Ok(())
    }
}
