//! Simulation tick
//!
//! One call per displayed frame. The order inside a playing tick is fixed:
//! clock and timers, movement, falling platforms, collision, then hazards,
//! pickups and the goal.

use super::collision::{feet_in_slime, resolve_player, touched_pickups, touches_goal, touches_spike};
use super::falling::FallTransition;
use super::player::Player;
use super::state::{GameEvent, Hit, LoseReason, RunState, RunStatus, Simulation, WinPhase};
use super::world::PlatformKind;
use crate::platform::input::{Button, InputSource};
use crate::platform::time::clamp_dt;
use crate::ranking::RankEntry;

/// Advance the simulation by one frame of `dt` seconds (clamped to `max_dt`)
pub fn tick(sim: &mut Simulation, input: &mut dyn InputSource, dt: f32) {
    let dt = clamp_dt(dt, sim.config.physics.max_dt);
    sim.clock += dt;

    // Restart is honoured in every state
    if input.consume(Button::Restart) {
        sim.reset_run();
    }

    match sim.run.status {
        RunStatus::Menu => {
            if input.consume(Button::ConfirmStart) {
                sim.run.status = RunStatus::Playing;
                sim.run.started_at = sim.clock;
                log::info!("Run started");
                sim.emit(GameEvent::RunStarted);
            }
        }
        RunStatus::Playing => step_playing(sim, input, dt),
        RunStatus::Win(WinPhase::WaitingForName { timeout }) => {
            let timeout = timeout - dt;
            if timeout <= 0.0 {
                log::info!("Name entry timed out, using default name");
                sim.submit_name(None);
            } else {
                sim.run.status = RunStatus::Win(WinPhase::WaitingForName { timeout });
            }
        }
        RunStatus::Win(WinPhase::Recorded { .. }) | RunStatus::Lose => {}
    }
}

fn step_playing(sim: &mut Simulation, input: &mut dyn InputSource, dt: f32) {
    // Clock
    sim.run.time_left = (sim.run.time_left - dt).max(0.0);
    if sim.run.time_left <= 0.0 {
        sim.end_run_lost(LoseReason::TimeUp);
        return;
    }

    if sim.run.respawn_lock > 0.0 {
        sim.run.respawn_lock -= dt;
    }
    sim.player.tick_cooldowns(dt);

    // Movement
    let on_slime = feet_in_slime(&sim.player, &sim.world);
    let movement = sim
        .player
        .update_movement(input, on_slime, &sim.config.physics, dt);
    if movement.jumped {
        sim.emit(GameEvent::Jumped);
    }
    if movement.dashed {
        sim.emit(GameEvent::Dashed);
    }

    update_falling_platforms(sim, dt);

    // Collision
    let result = resolve_player(
        &mut sim.player,
        &mut sim.world,
        dt,
        sim.config.physics.coyote_ms,
    );
    sim.on_slime = result.on_slime;
    for index in result.triggered {
        sim.emit(GameEvent::PlatformTriggered { index });
    }

    // Hazards
    if sim.player.pos.y > sim.config.run.fall_out_y() {
        sim.lose_life(Hit::FellOut);
    }
    if touches_spike(&sim.player, &sim.world) {
        sim.lose_life(Hit::Spike);
    }
    if !sim.run.status.is_playing() {
        return;
    }

    // Pickups
    for index in touched_pickups(&sim.player, &sim.world) {
        sim.world.pickups[index].taken = true;
        sim.run.score += 1;
        log::debug!("Pickup {} collected (score {})", index, sim.run.score);
        sim.emit(GameEvent::PickupCollected {
            index,
            score: sim.run.score,
        });
    }

    // Goal
    if touches_goal(&sim.player, &sim.world) {
        sim.win();
    }
}

fn update_falling_platforms(sim: &mut Simulation, dt: f32) {
    let gravity = sim.config.physics.falling_platform_gravity;
    let despawn_y = sim.config.run.platform_despawn_y();

    let mut transitions = Vec::new();
    for (index, platform) in sim.world.platforms.iter_mut().enumerate() {
        if let PlatformKind::Falling(fall) = &mut platform.kind {
            if let Some(t) = fall.update(&mut platform.rect.y, dt, gravity, despawn_y) {
                transitions.push((index, t));
            }
        }
    }

    for (index, transition) in transitions {
        match transition {
            FallTransition::StartedFalling => {
                log::debug!("Platform {} falling", index);
                sim.emit(GameEvent::PlatformFalling { index });
            }
            FallTransition::Deactivated => {
                log::debug!("Platform {} gone", index);
                sim.emit(GameEvent::PlatformGone { index });
            }
        }
    }
}

impl Simulation {
    /// Put the player, the run and the world back to their starting state.
    ///
    /// A win still waiting for a name is recorded under the default name first.
    pub fn reset_run(&mut self) {
        if matches!(
            self.run.status,
            RunStatus::Win(WinPhase::WaitingForName { .. })
        ) {
            self.submit_name(None);
        }

        self.run = RunState::new(&self.config);
        self.run.started_at = self.clock;
        self.player = Player::new(self.start_position(), self.player.size);
        self.world.reset();
        self.on_slime = false;

        log::info!(
            "Run reset ({} lives, {:.0}s)",
            self.run.lives,
            self.run.time_left
        );
        self.emit(GameEvent::RunReset);
    }

    /// Take a hit. Ignored while the respawn lock is running or when not
    /// playing, so one hazard contact costs at most one life.
    /// Returns true if a life was lost.
    pub fn lose_life(&mut self, cause: Hit) -> bool {
        if self.run.respawn_lock > 0.0 || !self.run.status.is_playing() {
            return false;
        }

        self.run.lives = self.run.lives.saturating_sub(1);
        self.run.respawn_lock = self.config.run.respawn_lock;
        log::info!("Life lost ({:?}), {} left", cause, self.run.lives);
        self.emit(GameEvent::LifeLost {
            cause,
            lives: self.run.lives,
        });

        if self.run.lives == 0 {
            self.end_run_lost(LoseReason::OutOfLives);
        } else {
            let start = self.start_position();
            self.player.respawn(start);
        }
        true
    }

    fn end_run_lost(&mut self, reason: LoseReason) {
        self.run.status = RunStatus::Lose;
        self.run.ended_at = Some(self.clock);
        log::info!("Run lost ({:?}) after {:.2}s", reason, self.elapsed());
        self.emit(GameEvent::Lost { reason });
    }

    fn win(&mut self) {
        if !self.run.status.is_playing() {
            return;
        }
        self.run.ended_at = Some(self.clock);
        self.run.status = RunStatus::Win(WinPhase::WaitingForName {
            timeout: self.config.run.name_entry_timeout,
        });

        let time = self.elapsed();
        log::info!("Goal reached in {:.2}s with {} bows", time, self.run.score);
        self.emit(GameEvent::Won {
            time,
            pickups: self.run.score,
        });
        self.emit(GameEvent::NameRequested);
    }

    /// Answer a name request. Blank or missing names use the default.
    /// Returns false if no name was being waited for.
    pub fn submit_name(&mut self, name: Option<&str>) -> bool {
        if !matches!(
            self.run.status,
            RunStatus::Win(WinPhase::WaitingForName { .. })
        ) {
            return false;
        }

        let entry = RankEntry::new(
            self.config.run.sanitize_name(name),
            self.elapsed(),
            self.run.score,
        );
        let rank = self.ranking.submit_result(entry.clone());
        match rank {
            Some(r) => log::info!("{} ranked #{}", entry.name, r),
            None => log::info!("{} did not make the ranking", entry.name),
        }

        self.run.status = RunStatus::Win(WinPhase::Recorded { rank });
        self.emit(GameEvent::RankingChanged { entry, rank });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FLOOR_Y;
    use crate::platform::input::HeldButtons;
    use crate::settings::{GameConfig, Variant};
    use crate::sim::falling::FallState;
    use crate::sim::geometry::Rect;
    use crate::sim::world::{Platform, World};
    use glam::Vec2;

    const DT: f32 = 1.0 / 60.0;

    fn demo() -> Simulation {
        Simulation::demo(GameConfig::default())
    }

    /// Player resting on the floor at `x`
    fn on_floor(sim: &mut Simulation, x: f32) {
        sim.player.pos = Vec2::new(x, FLOOR_Y - sim.player.size.y);
        sim.player.vel = Vec2::ZERO;
    }

    fn idle(sim: &mut Simulation, ticks: usize) {
        let mut input = HeldButtons::new();
        for _ in 0..ticks {
            tick(sim, &mut input, DT);
        }
    }

    fn has_event(events: &[GameEvent], pred: impl Fn(&GameEvent) -> bool) -> bool {
        events.iter().any(pred)
    }

    #[test]
    fn test_standing_still_stays_grounded() {
        let mut sim = demo();
        on_floor(&mut sim, 120.0);

        idle(&mut sim, 1);

        assert_eq!(sim.player.vel.y, 0.0);
        assert!(sim.player.on_ground);
        assert_eq!(sim.player.pos.y, FLOOR_Y - sim.player.size.y);
    }

    #[test]
    fn test_new_simulation_starts_playing() {
        let sim = demo();
        assert_eq!(sim.run.status, RunStatus::Playing);
        assert_eq!(sim.run.lives, 3);
        assert_eq!(sim.run.time_left, 60.0);
        assert_eq!(sim.player.pos, Vec2::new(120.0, 200.0));
    }

    #[test]
    fn test_walk_right() {
        let mut sim = demo();
        on_floor(&mut sim, 120.0);
        let mut input = HeldButtons::new();
        input.press(Button::Right);
        for _ in 0..20 {
            tick(&mut sim, &mut input, DT);
        }
        assert!(sim.player.pos.x > 120.0);
        assert!(sim.player.vel.x > 0.0);
        assert_eq!(sim.player.facing, 1.0);
    }

    #[test]
    fn test_dt_is_clamped() {
        let mut sim = demo();
        let before = sim.run.time_left;
        let mut input = HeldButtons::new();
        tick(&mut sim, &mut input, 5.0);
        assert!((before - sim.run.time_left - sim.config.physics.max_dt).abs() < 1e-5);
    }

    #[test]
    fn test_bad_max_dt_does_not_panic() {
        let mut config = GameConfig::default();
        config.physics.max_dt = -1.0;
        let mut sim = Simulation::demo(config);
        let before = sim.run.time_left;

        idle(&mut sim, 1);
        assert!((before - sim.run.time_left - DT).abs() < 1e-5);

        sim.config.physics.max_dt = f32::NAN;
        idle(&mut sim, 1);
        assert!(sim.run.time_left < before);
        assert_eq!(sim.run.status, RunStatus::Playing);
    }

    /// Simulation whose player has just stepped off a ledge: airborne, with
    /// a full coyote countdown that has not started decaying yet
    fn just_left_ledge(dt: f32) -> Simulation {
        let mut config = GameConfig::default();
        config.physics.coyote_ms = 93.75;
        let world = World {
            platforms: vec![Platform::solid(0.0, 300.0, 200.0, 20.0)],
            spikes: Vec::new(),
            barriers: Vec::new(),
            slime: Vec::new(),
            pickups: Vec::new(),
            goal: Rect::new(5000.0, 0.0, 10.0, 10.0),
        };
        let mut sim = Simulation::new(config, world);
        sim.player.pos = Vec2::new(100.0, 300.0 - sim.player.size.y);

        let mut input = HeldButtons::new();
        tick(&mut sim, &mut input, dt);
        assert!(sim.player.on_ground);

        // Step off the edge
        sim.player.pos.x = 250.0;
        tick(&mut sim, &mut input, dt);
        assert!(!sim.player.on_ground);
        assert_eq!(sim.player.coyote_ms, 93.75);
        sim
    }

    #[test]
    fn test_coyote_jump_boundary() {
        // 31.25ms per tick: 93.75 -> 62.5 -> 31.25 -> 0
        let dt = 1.0 / 32.0;
        let mut idle_input = HeldButtons::new();

        // Jump one tick before the countdown runs out: accepted
        let mut early = just_left_ledge(dt);
        tick(&mut early, &mut idle_input, dt);
        let mut jump = HeldButtons::new();
        jump.press(Button::Jump);
        tick(&mut early, &mut jump, dt);
        assert!(early.player.vel.y < 0.0);
        assert!(!jump.is_held(Button::Jump));

        // Jump on the tick the countdown reaches zero: rejected
        let mut late = just_left_ledge(dt);
        tick(&mut late, &mut idle_input, dt);
        tick(&mut late, &mut idle_input, dt);
        let vy_before = late.player.vel.y;
        let mut jump = HeldButtons::new();
        jump.press(Button::Jump);
        tick(&mut late, &mut jump, dt);
        assert_eq!(late.player.coyote_ms, 0.0);
        assert!(late.player.vel.y > vy_before);
        assert!(jump.is_held(Button::Jump));
    }

    #[test]
    fn test_dash_in_simulation() {
        let mut sim = demo();
        on_floor(&mut sim, 120.0);
        idle(&mut sim, 1);

        let mut input = HeldButtons::new();
        input.press(Button::Dash);
        tick(&mut sim, &mut input, DT);
        let events = sim.drain_events();
        assert!(has_event(&events, |e| *e == GameEvent::Dashed));
        assert_eq!(sim.player.vel.x, sim.config.physics.dash_speed);
        assert!(!sim.player.dash_ready);
    }

    #[test]
    fn test_falling_platform_lifecycle() {
        let mut sim = demo();
        // Stand on the falling platform at x=1180, y=360
        sim.player.pos = Vec2::new(1250.0, 360.0 - sim.player.size.y);
        sim.player.vel = Vec2::ZERO;

        let mut stages = Vec::new();
        let mut events = Vec::new();
        for _ in 0..180 {
            idle(&mut sim, 1);
            events.extend(sim.drain_events());
            if let PlatformKind::Falling(fall) = &sim.world.platforms[4].kind {
                let stage = fall.state.stage();
                if stages.last() != Some(&stage) {
                    stages.push(stage);
                }
            }
        }

        assert_eq!(stages, vec![1, 2, 3]);
        assert!(has_event(&events, |e| *e == GameEvent::PlatformTriggered { index: 4 }));
        assert!(has_event(&events, |e| *e == GameEvent::PlatformFalling { index: 4 }));
        assert!(has_event(&events, |e| *e == GameEvent::PlatformGone { index: 4 }));
        assert!(!sim.world.platforms[4].is_active());
        // The player ended up on the floor below
        assert!(sim.player.on_ground);
        assert_eq!(sim.run.lives, 3);
    }

    #[test]
    fn test_spike_costs_one_life_per_lock_window() {
        let mut sim = demo();
        // Spike at x=430..490 on the floor
        on_floor(&mut sim, 440.0);
        idle(&mut sim, 1);
        assert_eq!(sim.run.lives, 2);
        assert_eq!(sim.player.pos, sim.start_position());

        // Back onto the spike inside the lock window: ignored
        on_floor(&mut sim, 440.0);
        idle(&mut sim, 1);
        assert_eq!(sim.run.lives, 2);
        assert!(sim.run.respawn_lock > 0.0);

        // Direct hits inside the window are also ignored
        assert!(!sim.lose_life(Hit::Spike));
        assert_eq!(sim.run.lives, 2);

        // Once the lock runs out, the spike bites again
        sim.run.respawn_lock = 0.0;
        on_floor(&mut sim, 440.0);
        idle(&mut sim, 1);
        assert_eq!(sim.run.lives, 1);
    }

    #[test]
    fn test_hits_keep_score() {
        let mut sim = demo();
        sim.run.score = 4;
        sim.world.pickups[0].taken = true;
        assert!(sim.lose_life(Hit::FellOut));
        assert_eq!(sim.run.score, 4);
        assert!(sim.world.pickups[0].taken);
    }

    #[test]
    fn test_fall_out_with_last_life_loses() {
        let mut config = GameConfig::default();
        config.run.start_lives = 1;
        let mut sim = Simulation::demo(config);
        sim.player.pos = Vec2::new(3000.0, 800.0);

        idle(&mut sim, 1);
        let events = sim.drain_events();
        assert_eq!(sim.run.status, RunStatus::Lose);
        assert_eq!(sim.run.lives, 0);
        assert!(sim.run.ended_at.is_some());
        assert!(has_event(&events, |e| *e
            == GameEvent::Lost {
                reason: LoseReason::OutOfLives
            }));

        // Terminal: further ticks change nothing
        let lock = sim.run.respawn_lock;
        idle(&mut sim, 10);
        assert_eq!(sim.run.status, RunStatus::Lose);
        assert_eq!(sim.run.respawn_lock, lock);
    }

    #[test]
    fn test_time_up_loses() {
        let mut config = GameConfig::default();
        config.run.time_limit = 0.05;
        let mut sim = Simulation::demo(config);
        on_floor(&mut sim, 120.0);

        idle(&mut sim, 4);
        assert_eq!(sim.run.status, RunStatus::Lose);
        assert_eq!(sim.run.time_left, 0.0);
        let events = sim.drain_events();
        assert!(has_event(&events, |e| *e
            == GameEvent::Lost {
                reason: LoseReason::TimeUp
            }));
    }

    #[test]
    fn test_pickup_collected_once() {
        let mut sim = demo();
        // Pickup 0 is centered at (300, 360)
        sim.player.pos = Vec2::new(280.0, 330.0);
        sim.player.vel = Vec2::ZERO;

        idle(&mut sim, 1);
        assert_eq!(sim.run.score, 1);
        assert!(sim.world.pickups[0].taken);

        sim.player.pos = Vec2::new(280.0, 330.0);
        sim.player.vel = Vec2::ZERO;
        idle(&mut sim, 1);
        assert_eq!(sim.run.score, 1);
    }

    #[test]
    fn test_goal_then_name() {
        let mut sim = demo();
        sim.run.score = 5;
        on_floor(&mut sim, 2400.0);

        idle(&mut sim, 1);
        let events = sim.drain_events();
        assert!(matches!(
            sim.run.status,
            RunStatus::Win(WinPhase::WaitingForName { .. })
        ));
        assert!(has_event(&events, |e| *e == GameEvent::NameRequested));

        // The simulation keeps ticking while waiting
        idle(&mut sim, 3);
        assert!(matches!(
            sim.run.status,
            RunStatus::Win(WinPhase::WaitingForName { .. })
        ));

        assert!(sim.submit_name(Some("  Ana  ")));
        assert_eq!(sim.run.status, RunStatus::Win(WinPhase::Recorded { rank: Some(1) }));
        let best = sim.ranking.best().unwrap();
        assert_eq!(best.name, "Ana");
        assert_eq!(best.pickups, 5);
        assert!((best.time - DT).abs() < 1e-5);

        let events = sim.drain_events();
        assert!(has_event(&events, |e| matches!(e, GameEvent::RankingChanged { .. })));

        // Only one answer is accepted
        assert!(!sim.submit_name(Some("Bob")));
        assert_eq!(sim.ranking.entries.len(), 1);
    }

    #[test]
    fn test_name_timeout_uses_default() {
        let mut config = GameConfig::default();
        config.run.name_entry_timeout = 0.05;
        let mut sim = Simulation::demo(config);
        on_floor(&mut sim, 2400.0);

        idle(&mut sim, 1);
        idle(&mut sim, 4);
        assert!(matches!(sim.run.status, RunStatus::Win(WinPhase::Recorded { .. })));
        assert_eq!(sim.ranking.best().unwrap().name, sim.config.run.default_name);
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut sim = demo();
        let start = sim.start_position();

        // Mess up the run
        sim.run.score = 3;
        sim.run.lives = 1;
        sim.run.time_left = 12.0;
        sim.run.status = RunStatus::Lose;
        for pickup in &mut sim.world.pickups {
            pickup.taken = true;
        }
        if let PlatformKind::Falling(fall) = &mut sim.world.platforms[4].kind {
            fall.state = FallState::Inactive;
        }
        sim.world.platforms[4].rect.y = 2000.0;
        sim.player.pos = Vec2::new(900.0, 100.0);
        sim.player.vel = Vec2::new(200.0, 100.0);
        sim.player.dash_ready = false;

        let mut input = HeldButtons::new();
        input.press(Button::Restart);
        tick(&mut sim, &mut input, 0.0);
        assert!(!input.is_held(Button::Restart));

        assert_eq!(sim.run.status, RunStatus::Playing);
        assert_eq!(sim.run.lives, sim.config.run.start_lives);
        assert_eq!(sim.run.time_left, sim.config.run.time_limit);
        assert_eq!(sim.run.score, 0);
        assert_eq!(sim.run.respawn_lock, 0.0);
        assert!(sim.world.pickups.iter().all(|p| !p.taken));
        let platform = &sim.world.platforms[4];
        assert_eq!(platform.rect.y, 360.0);
        assert!(matches!(
            platform.kind,
            PlatformKind::Falling(ref f) if f.state == FallState::Idle
        ));
        assert_eq!(sim.player.pos, start);
        assert_eq!(sim.player.vel, Vec2::ZERO);
        assert!(sim.player.dash_ready);
    }

    #[test]
    fn test_restart_while_naming_records_default() {
        let mut sim = demo();
        on_floor(&mut sim, 2400.0);
        idle(&mut sim, 1);

        sim.reset_run();
        assert_eq!(sim.ranking.entries.len(), 1);
        assert_eq!(sim.run.status, RunStatus::Playing);
    }

    #[test]
    fn test_menu_gate() {
        let mut sim = Simulation::demo(GameConfig::for_variant(Variant::Arcade));
        assert_eq!(sim.run.status, RunStatus::Menu);

        idle(&mut sim, 10);
        assert_eq!(sim.run.status, RunStatus::Menu);
        assert_eq!(sim.run.time_left, sim.config.run.time_limit);
        assert_eq!(sim.player.pos, sim.start_position());

        let mut input = HeldButtons::new();
        input.press(Button::ConfirmStart);
        tick(&mut sim, &mut input, DT);
        assert_eq!(sim.run.status, RunStatus::Playing);
        assert!(has_event(&sim.drain_events(), |e| *e == GameEvent::RunStarted));

        // Restart goes back to the menu
        input.press(Button::Restart);
        tick(&mut sim, &mut input, DT);
        assert_eq!(sim.run.status, RunStatus::Menu);
    }

    #[test]
    fn test_camera_and_hud() {
        let sim = demo();
        assert_eq!(sim.camera_x(), 120.0 - 200.0);
        let hud = sim.hud();
        assert_eq!(hud.lives, 3);
        assert_eq!(hud.score, 0);
        assert_eq!(hud.time_left, 60.0);
    }
}
