//! Bow Runner - A single-level 2D platformer
//!
//! Core modules:
//! - `sim`: Simulation (movement, collisions, falling platforms, run state)
//! - `platform`: Browser/native platform abstraction (input, storage, frame time)
//! - `ranking`: Best-of-3 leaderboard
//! - `session`: Frame driver tying the simulation to a store
//! - `settings`: Data-driven game tuning

pub mod platform;
pub mod ranking;
pub mod session;
pub mod settings;
pub mod sim;

pub use ranking::{RankEntry, Ranking, ScoringRule};
pub use session::Session;
pub use settings::{GameConfig, Variant};

/// Game configuration constants (defaults for `GameConfig`)
pub mod consts {
    /// Player gravity (pixels/s²)
    pub const GRAVITY: f32 = 1800.0;
    /// Y of the floor surface in the demo level
    pub const FLOOR_Y: f32 = 480.0;

    /// Horizontal acceleration while a direction is held
    pub const MOVE_ACCEL: f32 = 2400.0;
    pub const MAX_SPEED: f32 = 420.0;
    /// Deceleration with no horizontal input
    pub const FRICTION: f32 = 2200.0;
    /// Deceleration on slime (lower = slides further)
    pub const SLIME_FRICTION: f32 = 500.0;
    pub const JUMP_VELOCITY: f32 = 650.0;

    /// Coyote window after leaving the ground (milliseconds)
    pub const COYOTE_MS: f32 = 90.0;

    pub const DASH_SPEED: f32 = 900.0;
    pub const DASH_DURATION: f32 = 0.10;
    pub const DASH_COOLDOWN: f32 = 0.6;

    /// Falling platforms drop faster than the player
    pub const FALLING_PLATFORM_GRAVITY: f32 = 2200.0;
    pub const FALL_DELAY: f32 = 0.25;

    /// Largest dt a single tick may integrate (seconds)
    pub const MAX_DT: f32 = 0.033;

    pub const TIME_LIMIT: f32 = 60.0;
    pub const START_LIVES: u32 = 3;
    /// Post-hit window during which hazards are ignored
    pub const RESPAWN_LOCK: f32 = 0.6;

    /// Height of the visible play area
    pub const PLAY_AREA_HEIGHT: f32 = 540.0;
    /// Player is lost once this far below the play area
    pub const FALL_OUT_MARGIN: f32 = 200.0;
    /// Falling platforms deactivate once this far below the play area
    pub const PLATFORM_DESPAWN_MARGIN: f32 = 300.0;

    /// Player spawn (top-left corner)
    pub const START_X: f32 = 120.0;
    pub const START_Y: f32 = 200.0;
    pub const PLAYER_SIZE: f32 = 56.0;

    /// Camera leads the player by this many pixels
    pub const CAMERA_LEAD: f32 = 200.0;

    pub const RANKING_CAPACITY: usize = 3;
    pub const MAX_NAME_LEN: usize = 16;
    pub const DEFAULT_NAME: &str = "Player";
    /// Seconds to wait for a name before submitting the default
    pub const NAME_ENTRY_TIMEOUT: f32 = 30.0;
    /// Pickup weight for the composite ranking score
    pub const PICKUP_WEIGHT: f32 = 0.11;
}

/// Format a duration in seconds the way the HUD shows it ("12.34s")
pub fn format_time(seconds: f32) -> String {
    format!("{:.2}s", seconds)
}
