//! Frame driver
//!
//! Ties a [`Simulation`] to a frame clock and a key-value store. Hosts call
//! [`Session::frame`] once per displayed frame and get back the events of
//! that frame; the ranking is loaded at startup and written back whenever it
//! changes.

use crate::platform::input::InputSource;
use crate::platform::storage::KeyValueStore;
use crate::platform::time::FrameClock;
use crate::settings::GameConfig;
use crate::sim::{GameEvent, Simulation, World, tick};

pub struct Session<S: KeyValueStore> {
    sim: Simulation,
    clock: FrameClock,
    store: S,
    /// Events produced outside a frame (name submission)
    pending: Vec<GameEvent>,
}

impl<S: KeyValueStore> Session<S> {
    /// Start a session on `world`, loading the stored ranking
    pub fn new(config: GameConfig, world: World, store: S) -> Self {
        let clock = FrameClock::new(config.physics.max_dt);
        let mut sim = Simulation::new(config, world);
        let key = sim.config.ranking.storage_key.clone();
        sim.ranking.load(&store, &key);

        Self {
            sim,
            clock,
            store,
            pending: Vec::new(),
        }
    }

    /// Session on the built-in level
    pub fn demo(config: GameConfig, store: S) -> Self {
        Self::new(config, World::demo(), store)
    }

    /// Run one frame stamped `now_ms` (milliseconds, any monotonic origin)
    pub fn frame(&mut self, now_ms: f64, input: &mut dyn InputSource) -> Vec<GameEvent> {
        let dt = self.clock.advance(now_ms);
        self.step(dt, input)
    }

    /// Run one tick with an explicit dt (headless runs)
    pub fn step(&mut self, dt: f32, input: &mut dyn InputSource) -> Vec<GameEvent> {
        tick(&mut self.sim, input, dt);
        let mut events = std::mem::take(&mut self.pending);
        events.extend(self.collect());
        events
    }

    /// Answer a name request; the result is stored immediately
    pub fn submit_name(&mut self, name: Option<&str>) -> bool {
        if !self.sim.submit_name(name) {
            return false;
        }
        let events = self.collect();
        self.pending.extend(events);
        true
    }

    /// Restart the frame clock (after the page was hidden, for example) so
    /// the next frame does not see the gap
    pub fn pause_clock(&mut self) {
        self.clock.reset();
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Drain simulation events, persisting the ranking when it changed
    fn collect(&mut self) -> Vec<GameEvent> {
        let events = self.sim.drain_events();
        if events
            .iter()
            .any(|e| matches!(e, GameEvent::RankingChanged { .. }))
        {
            let key = &self.sim.config.ranking.storage_key;
            self.sim.ranking.save(&mut self.store, key);
        }
        events
    }
}
