//! Game tuning and variant presets
//!
//! Persisted as JSON in the key-value store. Every section uses
//! `#[serde(default)]`, so a partial document only overrides what it names.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::platform::storage::KeyValueStore;
use crate::ranking::ScoringRule;

/// Game variant presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Variant {
    /// Straight into play; ranking by time left plus bows collected
    #[default]
    Classic,
    /// Classic ranking behind a pre-round menu
    Arcade,
    /// Ranking by fastest time only
    TimeTrial,
}

impl Variant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variant::Classic => "Classic",
            Variant::Arcade => "Arcade",
            Variant::TimeTrial => "TimeTrial",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(Variant::Classic),
            "arcade" => Some(Variant::Arcade),
            "timetrial" | "time-trial" => Some(Variant::TimeTrial),
            _ => None,
        }
    }

    /// Ranking rule used by this variant
    pub fn scoring_rule(&self) -> ScoringRule {
        match self {
            Variant::Classic | Variant::Arcade => ScoringRule::Composite {
                pickup_weight: PICKUP_WEIGHT,
            },
            Variant::TimeTrial => ScoringRule::FastestTime,
        }
    }

    /// Whether a run waits on a start screen
    pub fn menu_enabled(&self) -> bool {
        match self {
            Variant::Classic | Variant::TimeTrial => false,
            Variant::Arcade => true,
        }
    }
}

/// Player and platform physics
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    pub gravity: f32,
    pub move_accel: f32,
    pub max_speed: f32,
    pub friction: f32,
    pub slime_friction: f32,
    pub jump_velocity: f32,
    /// Coyote window (milliseconds)
    pub coyote_ms: f32,
    pub dash_speed: f32,
    pub dash_duration: f32,
    pub dash_cooldown: f32,
    pub falling_platform_gravity: f32,
    /// Largest dt a tick integrates
    pub max_dt: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            move_accel: MOVE_ACCEL,
            max_speed: MAX_SPEED,
            friction: FRICTION,
            slime_friction: SLIME_FRICTION,
            jump_velocity: JUMP_VELOCITY,
            coyote_ms: COYOTE_MS,
            dash_speed: DASH_SPEED,
            dash_duration: DASH_DURATION,
            dash_cooldown: DASH_COOLDOWN,
            falling_platform_gravity: FALLING_PLATFORM_GRAVITY,
            max_dt: MAX_DT,
        }
    }
}

impl PhysicsConfig {
    /// Replace a frame cap the tick cannot use
    fn validate(&mut self) {
        if !(self.max_dt.is_finite() && self.max_dt > 0.0) {
            log::warn!("Invalid max_dt {}, using {}", self.max_dt, MAX_DT);
            self.max_dt = MAX_DT;
        }
    }
}

/// Run rules: clock, lives, play area bounds, name entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub time_limit: f32,
    pub start_lives: u32,
    pub respawn_lock: f32,
    pub start_x: f32,
    pub start_y: f32,
    pub player_size: f32,
    pub play_area_height: f32,
    pub fall_out_margin: f32,
    pub platform_despawn_margin: f32,
    /// Start each run on a menu gate
    pub menu_enabled: bool,
    pub default_name: String,
    pub max_name_len: usize,
    /// Seconds before the default name is submitted
    pub name_entry_timeout: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            time_limit: TIME_LIMIT,
            start_lives: START_LIVES,
            respawn_lock: RESPAWN_LOCK,
            start_x: START_X,
            start_y: START_Y,
            player_size: PLAYER_SIZE,
            play_area_height: PLAY_AREA_HEIGHT,
            fall_out_margin: FALL_OUT_MARGIN,
            platform_despawn_margin: PLATFORM_DESPAWN_MARGIN,
            menu_enabled: false,
            default_name: DEFAULT_NAME.to_string(),
            max_name_len: MAX_NAME_LEN,
            name_entry_timeout: NAME_ENTRY_TIMEOUT,
        }
    }
}

impl RunConfig {
    /// Y beyond which the player counts as fallen out
    #[inline]
    pub fn fall_out_y(&self) -> f32 {
        self.play_area_height + self.fall_out_margin
    }

    /// Y beyond which a falling platform is removed
    #[inline]
    pub fn platform_despawn_y(&self) -> f32 {
        self.play_area_height + self.platform_despawn_margin
    }

    /// Trim a submitted name, falling back to the default when blank
    pub fn sanitize_name(&self, name: Option<&str>) -> String {
        let trimmed = name.map(str::trim).unwrap_or_default();
        let chosen = if trimmed.is_empty() {
            self.default_name.trim()
        } else {
            trimmed
        };
        chosen.chars().take(self.max_name_len).collect()
    }
}

/// Leaderboard settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub capacity: usize,
    pub storage_key: String,
    pub rule: ScoringRule,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            capacity: RANKING_CAPACITY,
            storage_key: "bow_runner_top3".to_string(),
            rule: ScoringRule::Composite {
                pickup_weight: PICKUP_WEIGHT,
            },
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GameConfig {
    pub variant: Variant,
    pub physics: PhysicsConfig,
    pub run: RunConfig,
    pub ranking: RankingConfig,
}

impl GameConfig {
    /// Defaults for a variant
    pub fn for_variant(variant: Variant) -> Self {
        let mut config = Self::default();
        config.apply_variant(variant);
        config
    }

    /// Apply a variant (updates variant-dependent settings)
    pub fn apply_variant(&mut self, variant: Variant) {
        self.variant = variant;
        self.run.menu_enabled = variant.menu_enabled();
        self.ranking.rule = variant.scoring_rule();
        self.ranking.storage_key = match variant {
            Variant::Classic => "bow_runner_top3".to_string(),
            Variant::Arcade => "bow_runner_arcade_top3".to_string(),
            Variant::TimeTrial => "bow_runner_timetrial_top3".to_string(),
        };
    }

    /// Parse a JSON document, falling back to defaults for missing fields.
    ///
    /// The stored variant's preset fills in the menu gate, ranking rule and
    /// ranking key unless the document sets them explicitly.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let mut config: Self = serde_json::from_value(value.clone())?;

        let preset = Self::for_variant(config.variant);
        if value.pointer("/run/menu_enabled").is_none() {
            config.run.menu_enabled = preset.run.menu_enabled;
        }
        if value.pointer("/ranking/rule").is_none() {
            config.ranking.rule = preset.ranking.rule;
        }
        if value.pointer("/ranking/storage_key").is_none() {
            config.ranking.storage_key = preset.ranking.storage_key;
        }

        config.physics.validate();
        Ok(config)
    }

    /// Storage key
    const STORAGE_KEY: &'static str = "bow_runner_settings";

    /// Load settings from the store
    pub fn load(store: &dyn KeyValueStore) -> Self {
        if let Some(json) = store.get(Self::STORAGE_KEY) {
            match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded settings ({} variant)", config.variant.as_str());
                    return config;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Save settings to the store
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Failed to save settings: {}", e),
            },
            Err(e) => log::warn!("Failed to encode settings: {}", e),
        }
    }
}
