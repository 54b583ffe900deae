//! Platform abstraction layer
//!
//! Handles browser/native differences for:
//! - Input (held buttons with press-once consumption)
//! - Storage (LocalStorage on web, JSON files on native)
//! - Frame time (clamped dt)

pub mod input;
pub mod storage;
pub mod time;

pub use input::{Autopilot, Button, HeldButtons, InputSource};
pub use storage::{KeyValueStore, MemoryStore, StorageError};
pub use time::{FrameClock, clamp_dt};
