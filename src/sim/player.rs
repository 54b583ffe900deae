//! Player entity and movement model
//!
//! Horizontal acceleration with friction, jump with coyote time, a short dash
//! on a cooldown, and gravity. Collision is handled separately in
//! [`super::collision`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use crate::platform::input::{Button, InputSource};
use crate::settings::PhysicsConfig;

/// The player-controlled character
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    /// +1 facing right, -1 facing left
    pub facing: f32,
    pub on_ground: bool,
    pub dash_ready: bool,
    /// Seconds until the dash re-arms
    pub dash_cooldown: f32,
    /// Seconds of dash left (> 0 while dashing)
    pub dash_timer: f32,
    /// Coyote countdown (milliseconds)
    pub coyote_ms: f32,
}

impl Player {
    pub fn new(start: Vec2, size: Vec2) -> Self {
        Self {
            pos: start,
            vel: Vec2::ZERO,
            size,
            facing: 1.0,
            on_ground: false,
            dash_ready: true,
            dash_cooldown: 0.0,
            dash_timer: 0.0,
            coyote_ms: 0.0,
        }
    }

    /// Bounding box
    #[inline]
    pub fn rect(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y, self.size.x, self.size.y)
    }

    /// Thin strip along the bottom edge, used to detect slime underfoot
    #[inline]
    pub fn feet_probe(&self) -> Rect {
        Rect::new(self.pos.x, self.pos.y + self.size.y - 2.0, self.size.x, 4.0)
    }

    #[inline]
    pub fn is_dashing(&self) -> bool {
        self.dash_timer > 0.0
    }

    /// Put the player back at the start after losing a life
    pub fn respawn(&mut self, start: Vec2) {
        self.pos = start;
        self.vel = Vec2::ZERO;
        self.dash_timer = 0.0;
        self.coyote_ms = 0.0;
    }

    /// Count down the dash cooldown; re-arm once it runs out
    pub fn tick_cooldowns(&mut self, dt: f32) {
        if self.dash_cooldown > 0.0 {
            self.dash_cooldown -= dt;
        }
        if self.dash_cooldown <= 0.0 {
            self.dash_ready = true;
        }
    }

    /// Held left/right, or friction when neither is held. Ignored mid-dash.
    pub fn apply_horizontal(
        &mut self,
        left: bool,
        right: bool,
        on_slime: bool,
        physics: &PhysicsConfig,
        dt: f32,
    ) {
        if self.is_dashing() {
            return;
        }

        if left {
            self.vel.x -= physics.move_accel * dt;
            self.facing = -1.0;
        }
        if right {
            self.vel.x += physics.move_accel * dt;
            self.facing = 1.0;
        }

        if !left && !right {
            let friction = if on_slime {
                physics.slime_friction
            } else {
                physics.friction
            };
            let f = friction * dt;
            if self.vel.x.abs() <= f {
                self.vel.x = 0.0;
            } else {
                self.vel.x -= self.vel.x.signum() * f;
            }
        }

        self.vel.x = self.vel.x.clamp(-physics.max_speed, physics.max_speed);
    }

    /// Decay the coyote countdown while airborne
    pub fn tick_coyote(&mut self, dt: f32) {
        if !self.on_ground {
            self.coyote_ms = (self.coyote_ms - dt * 1000.0).max(0.0);
        }
    }

    #[inline]
    pub fn can_jump(&self) -> bool {
        self.on_ground || self.coyote_ms > 0.0
    }

    /// Jump if allowed. Returns true on success.
    pub fn try_jump(&mut self, physics: &PhysicsConfig) -> bool {
        if !self.can_jump() {
            return false;
        }
        self.vel.y = -physics.jump_velocity;
        self.on_ground = false;
        self.coyote_ms = 0.0;
        true
    }

    /// Dash if ready and not already dashing. Returns true on success.
    pub fn try_dash(&mut self, physics: &PhysicsConfig) -> bool {
        if !self.dash_ready || self.is_dashing() {
            return false;
        }
        self.dash_timer = physics.dash_duration;
        self.vel.x = self.facing * physics.dash_speed;
        self.vel.y = 0.0;
        self.dash_ready = false;
        self.dash_cooldown = physics.dash_cooldown;
        true
    }

    /// Count down the dash, then apply gravity if no dash is running
    pub fn integrate_gravity(&mut self, physics: &PhysicsConfig, dt: f32) {
        if self.dash_timer > 0.0 {
            self.dash_timer -= dt;
        }
        if self.dash_timer <= 0.0 {
            self.vel.y += physics.gravity * dt;
        }
    }

    /// One tick of the movement model (everything before collision).
    ///
    /// Jump and dash presses are consumed only when they succeed, so a jump
    /// held in the air fires on landing.
    pub fn update_movement(
        &mut self,
        input: &mut dyn InputSource,
        on_slime: bool,
        physics: &PhysicsConfig,
        dt: f32,
    ) -> Movement {
        let left = input.is_held(Button::Left);
        let right = input.is_held(Button::Right);
        self.apply_horizontal(left, right, on_slime, physics, dt);

        self.tick_coyote(dt);

        let mut movement = Movement::default();
        if input.is_held(Button::Jump) && self.try_jump(physics) {
            input.consume(Button::Jump);
            movement.jumped = true;
        }
        if input.is_held(Button::Dash) && self.try_dash(physics) {
            input.consume(Button::Dash);
            movement.dashed = true;
        }

        self.integrate_gravity(physics, dt);
        movement
    }
}

/// Actions taken during a movement update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Movement {
    pub jumped: bool,
    pub dashed: bool,
}
