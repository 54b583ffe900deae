//! Simulation module
//!
//! All gameplay logic lives here. This module stays free of rendering and
//! platform code:
//! - dt comes in already measured; the tick clamps it
//! - Input arrives through the `InputSource` trait
//! - Stable iteration order (platforms, then barriers, by index)

pub mod collision;
pub mod falling;
pub mod geometry;
pub mod player;
pub mod state;
pub mod tick;
pub mod world;

pub use collision::{CollisionResult, resolve_player};
pub use falling::{FallState, FallingPlatform};
pub use geometry::{Circle, Rect, aabb_overlap, circle_rect_overlap};
pub use player::Player;
pub use state::{GameEvent, Hit, Hud, LoseReason, RunState, RunStatus, Simulation, WinPhase};
pub use tick::tick;
pub use world::{Pickup, Platform, PlatformKind, World};
