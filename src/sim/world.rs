//! Level description: platforms, hazards, pickups and the goal
//!
//! Everything here is built once. During a run only falling platforms and
//! pickup `taken` flags change, and `World::reset` puts both back.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::falling::FallingPlatform;
use super::geometry::{Circle, Rect};
use crate::consts::{FALL_DELAY, FLOOR_Y};

/// Platform variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlatformKind {
    Solid,
    Falling(FallingPlatform),
}

/// A platform the player can stand on
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub rect: Rect,
    pub kind: PlatformKind,
}

impl Platform {
    pub fn solid(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            kind: PlatformKind::Solid,
        }
    }

    pub fn falling(x: f32, y: f32, w: f32, h: f32, fall_delay: f32) -> Self {
        Self {
            rect: Rect::new(x, y, w, h),
            kind: PlatformKind::Falling(FallingPlatform::new(y, fall_delay)),
        }
    }

    /// Whether the platform takes part in collision (and drawing)
    #[inline]
    pub fn is_active(&self) -> bool {
        match &self.kind {
            PlatformKind::Solid => true,
            PlatformKind::Falling(fall) => fall.is_active(),
        }
    }
}

/// A bow to collect
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub center: Vec2,
    pub radius: f32,
    /// Collected this run
    #[serde(default)]
    pub taken: bool,
}

impl Pickup {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self {
            center: Vec2::new(x, y),
            radius,
            taken: false,
        }
    }

    #[inline]
    pub fn hit_circle(&self) -> Circle {
        Circle::new(self.center, self.radius)
    }
}

/// Static level layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub platforms: Vec<Platform>,
    /// Touching one costs a life
    pub spikes: Vec<Rect>,
    /// Solid obstacles standing on the path
    pub barriers: Vec<Rect>,
    /// Slippery patches (only change friction)
    pub slime: Vec<Rect>,
    pub pickups: Vec<Pickup>,
    pub goal: Rect,
}

impl World {
    /// Restore falling platforms and pickups for a fresh run
    pub fn reset(&mut self) {
        for platform in &mut self.platforms {
            if let PlatformKind::Falling(fall) = &mut platform.kind {
                fall.reset(&mut platform.rect.y);
            }
        }
        for pickup in &mut self.pickups {
            pickup.taken = false;
        }
    }

    /// Number of pickups still in the level
    pub fn pickups_remaining(&self) -> usize {
        self.pickups.iter().filter(|p| !p.taken).count()
    }

    /// The built-in level
    pub fn demo() -> Self {
        const BOW_RADIUS: f32 = 12.0;

        let platforms = vec![
            Platform::solid(0.0, FLOOR_Y, 2600.0, 60.0),
            Platform::solid(260.0, 400.0, 180.0, 20.0),
            Platform::solid(520.0, 340.0, 180.0, 20.0),
            Platform::solid(820.0, 300.0, 220.0, 20.0),
            Platform::falling(1180.0, 360.0, 220.0, 20.0, FALL_DELAY),
            Platform::solid(1500.0, 320.0, 240.0, 20.0),
            Platform::solid(1820.0, 380.0, 180.0, 20.0),
        ];

        let spikes = vec![
            Rect::new(430.0, FLOOR_Y - 18.0, 60.0, 18.0),
            Rect::new(1040.0, FLOOR_Y - 18.0, 70.0, 18.0),
            Rect::new(1650.0, FLOOR_Y - 18.0, 80.0, 18.0),
        ];

        let barriers = vec![
            Rect::new(360.0, FLOOR_Y - 60.0, 22.0, 60.0),
            Rect::new(950.0, FLOOR_Y - 85.0, 26.0, 85.0),
            Rect::new(1460.0, FLOOR_Y - 80.0, 22.0, 80.0),
            Rect::new(1980.0, FLOOR_Y - 60.0, 26.0, 60.0),
        ];

        let slime = vec![
            Rect::new(700.0, FLOOR_Y - 10.0, 90.0, 10.0),
            Rect::new(1380.0, FLOOR_Y - 10.0, 110.0, 10.0),
        ];

        let pickups = [
            (300.0, 360.0),
            (350.0, 360.0),
            (560.0, 300.0),
            (610.0, 300.0),
            (840.0, 260.0),
            (900.0, 260.0),
            (1210.0, 320.0),
            (1260.0, 320.0),
            (1540.0, 280.0),
            (1600.0, 280.0),
            (1860.0, 340.0),
        ]
        .into_iter()
        .map(|(x, y)| Pickup::new(x, y, BOW_RADIUS))
        .collect();

        Self {
            platforms,
            spikes,
            barriers,
            slime,
            pickups,
            goal: Rect::new(2450.0, FLOOR_Y - 90.0, 15.0, 90.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::falling::FallState;

    #[test]
    fn test_demo_level_layout() {
        let world = World::demo();
        assert_eq!(world.platforms.len(), 7);
        assert_eq!(world.pickups.len(), 11);
        assert_eq!(world.pickups_remaining(), 11);
        assert_eq!(
            world
                .platforms
                .iter()
                .filter(|p| matches!(p.kind, PlatformKind::Falling(_)))
                .count(),
            1
        );
        assert!(world.platforms.iter().all(Platform::is_active));
    }

    #[test]
    fn test_reset_restores_platforms_and_pickups() {
        let mut world = World::demo();
        for pickup in world.pickups.iter_mut().take(4) {
            pickup.taken = true;
        }
        let platform = &mut world.platforms[4];
        if let PlatformKind::Falling(fall) = &mut platform.kind {
            fall.state = FallState::Inactive;
        }
        platform.rect.y = 9000.0;
        assert!(!world.platforms[4].is_active());
        assert_eq!(world.pickups_remaining(), 7);

        world.reset();

        assert_eq!(world.pickups_remaining(), 11);
        let platform = &world.platforms[4];
        assert!(platform.is_active());
        assert_eq!(platform.rect.y, 360.0);
        match &platform.kind {
            PlatformKind::Falling(fall) => assert_eq!(fall.state, FallState::Idle),
            PlatformKind::Solid => panic!("expected falling platform"),
        }
    }

    #[test]
    fn test_world_json_roundtrip_keeps_kinds() {
        let world = World::demo();
        let json = serde_json::to_string(&world).unwrap();
        let back: World = serde_json::from_str(&json).unwrap();
        assert!(matches!(back.platforms[4].kind, PlatformKind::Falling(_)));
        assert!(matches!(back.platforms[0].kind, PlatformKind::Solid));
    }
}
