//! Falling platform lifecycle
//!
//! A falling platform is solid until something lands on it. After a short
//! delay it drops under its own gravity and disappears once it is well below
//! the play area:
//!
//! `Idle -> Triggered -> Falling -> Inactive`
//!
//! States only move forward. `reset` is the only way back to `Idle`.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a falling platform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FallState {
    /// Solid and stationary, waiting for a landing
    Idle,
    /// Landed on; counting down before the drop
    Triggered { remaining: f32 },
    /// Dropping
    Falling { vy: f32 },
    /// Gone until the next run
    Inactive,
}

impl FallState {
    /// Position in the lifecycle (used to check ordering)
    pub fn stage(&self) -> u8 {
        match self {
            FallState::Idle => 0,
            FallState::Triggered { .. } => 1,
            FallState::Falling { .. } => 2,
            FallState::Inactive => 3,
        }
    }
}

/// What happened to a platform during one update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallTransition {
    StartedFalling,
    Deactivated,
}

/// Falling-specific platform data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallingPlatform {
    pub state: FallState,
    /// Delay between landing and drop (seconds)
    pub fall_delay: f32,
    /// Y the platform returns to on reset
    pub origin_y: f32,
}

impl FallingPlatform {
    pub fn new(origin_y: f32, fall_delay: f32) -> Self {
        Self {
            state: FallState::Idle,
            fall_delay,
            origin_y,
        }
    }

    /// Inactive platforms take no part in collision or drawing
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state != FallState::Inactive
    }

    /// Arm the trigger. Only an idle platform reacts; returns true if armed.
    pub fn arm(&mut self) -> bool {
        if self.state == FallState::Idle {
            self.state = FallState::Triggered {
                remaining: self.fall_delay,
            };
            true
        } else {
            false
        }
    }

    /// Advance the lifecycle by `dt`, moving the platform's `y` while falling.
    ///
    /// The tick that finds the delay already used up starts the drop and
    /// integrates in that same tick.
    pub fn update(
        &mut self,
        y: &mut f32,
        dt: f32,
        gravity: f32,
        deactivate_below: f32,
    ) -> Option<FallTransition> {
        match self.state {
            FallState::Idle | FallState::Inactive => None,
            FallState::Triggered { remaining } if remaining > 0.0 => {
                self.state = FallState::Triggered {
                    remaining: remaining - dt,
                };
                None
            }
            FallState::Triggered { .. } => {
                let vy = gravity * dt;
                *y += vy * dt;
                self.state = FallState::Falling { vy };
                if *y > deactivate_below {
                    self.state = FallState::Inactive;
                    return Some(FallTransition::Deactivated);
                }
                Some(FallTransition::StartedFalling)
            }
            FallState::Falling { vy } => {
                let vy = vy + gravity * dt;
                *y += vy * dt;
                if *y > deactivate_below {
                    self.state = FallState::Inactive;
                    Some(FallTransition::Deactivated)
                } else {
                    self.state = FallState::Falling { vy };
                    None
                }
            }
        }
    }

    /// Back to idle at the original height
    pub fn reset(&mut self, y: &mut f32) {
        self.state = FallState::Idle;
        *y = self.origin_y;
    }
}
