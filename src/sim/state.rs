//! Run state and the simulation context
//!
//! Everything a tick mutates lives in [`Simulation`]: the world, the player
//! and the run bookkeeping. The renderer reads it; only `tick` writes it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::player::Player;
use super::world::World;
use crate::consts::CAMERA_LEAD;
use crate::ranking::{RankEntry, Ranking};
use crate::settings::GameConfig;

/// Where a won run is in the name-entry exchange
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WinPhase {
    /// Waiting for the host to supply a name; the default is used at timeout
    WaitingForName { timeout: f32 },
    /// Result submitted to the ranking (rank is None if it missed the board)
    Recorded { rank: Option<usize> },
}

/// Current phase of a run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RunStatus {
    /// Pre-round gate (only when the config enables it)
    Menu,
    /// Active gameplay
    Playing,
    /// Goal reached
    Win(WinPhase),
    /// Out of lives or out of time
    Lose,
}

impl RunStatus {
    pub fn is_playing(&self) -> bool {
        matches!(self, RunStatus::Playing)
    }

    /// Win or Lose
    pub fn is_over(&self) -> bool {
        matches!(self, RunStatus::Win(_) | RunStatus::Lose)
    }
}

/// Why a run was lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoseReason {
    TimeUp,
    OutOfLives,
}

/// What caused a life to be lost
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Hit {
    Spike,
    FellOut,
}

/// Things that happened during a tick, for the host (HUD, sounds, storage)
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    RunReset,
    RunStarted,
    PickupCollected { index: usize, score: u32 },
    LifeLost { cause: Hit, lives: u32 },
    PlatformTriggered { index: usize },
    PlatformFalling { index: usize },
    PlatformGone { index: usize },
    Jumped,
    Dashed,
    Won { time: f32, pickups: u32 },
    /// Host should ask for a name and answer with `Simulation::submit_name`
    NameRequested,
    /// Ranking changed and should be persisted
    RankingChanged { entry: RankEntry, rank: Option<usize> },
    Lost { reason: LoseReason },
}

/// Run bookkeeping
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunState {
    pub status: RunStatus,
    pub lives: u32,
    /// Seconds left on the clock
    pub time_left: f32,
    /// Pickups collected
    pub score: u32,
    /// Simulation time when play started
    pub started_at: f32,
    /// Simulation time when the run ended
    pub ended_at: Option<f32>,
    /// Hazards are ignored while this is positive
    pub respawn_lock: f32,
}

impl RunState {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            status: if config.run.menu_enabled {
                RunStatus::Menu
            } else {
                RunStatus::Playing
            },
            lives: config.run.start_lives,
            time_left: config.run.time_limit,
            score: 0,
            started_at: 0.0,
            ended_at: None,
            respawn_lock: 0.0,
        }
    }
}

/// Values the HUD shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hud {
    pub lives: u32,
    pub time_left: f32,
    pub score: u32,
}

/// Complete simulation context
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    pub config: GameConfig,
    pub world: World,
    pub player: Player,
    pub run: RunState,
    pub ranking: Ranking,
    /// Total simulated time (seconds)
    pub clock: f32,
    /// Feet were in slime at the end of the last tick
    pub on_slime: bool,
    /// Events since the last drain
    #[serde(skip)]
    pub events: Vec<GameEvent>,
}

impl Simulation {
    /// Create a simulation for `world` and start a fresh run
    pub fn new(config: GameConfig, world: World) -> Self {
        let player = Player::new(Self::start_of(&config), Vec2::splat(config.run.player_size));
        let ranking = Ranking::new(
            config.ranking.rule,
            config.ranking.capacity,
            config.run.time_limit,
        );
        let run = RunState::new(&config);
        let mut sim = Self {
            config,
            world,
            player,
            run,
            ranking,
            clock: 0.0,
            on_slime: false,
            events: Vec::new(),
        };
        sim.reset_run();
        sim
    }

    /// Simulation on the built-in level
    pub fn demo(config: GameConfig) -> Self {
        Self::new(config, World::demo())
    }

    fn start_of(config: &GameConfig) -> Vec2 {
        Vec2::new(config.run.start_x, config.run.start_y)
    }

    /// Player spawn point
    pub fn start_position(&self) -> Vec2 {
        Self::start_of(&self.config)
    }

    /// Horizontal camera offset for the renderer
    pub fn camera_x(&self) -> f32 {
        self.player.pos.x - CAMERA_LEAD
    }

    pub fn hud(&self) -> Hud {
        Hud {
            lives: self.run.lives,
            time_left: self.run.time_left,
            score: self.run.score,
        }
    }

    /// Seconds since play started (frozen once the run ends)
    pub fn elapsed(&self) -> f32 {
        self.run.ended_at.unwrap_or(self.clock) - self.run.started_at
    }

    /// Take the events produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
