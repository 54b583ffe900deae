//! Collision resolution for the player
//!
//! Axis-separated: move along Y and push out of every solid, then move along
//! X and push out again. Resolving Y first means a landing is settled before
//! the horizontal pass, and a solid touched on the Y pass can still block
//! on the X pass in the same tick (no corner clipping).
//!
//! A single pass per axis does not stop tunneling at arbitrary speeds; the
//! clamped dt keeps per-tick motion well under platform thickness in practice.

use super::geometry::{Rect, aabb_overlap, circle_rect_overlap};
use super::player::Player;
use super::world::{PlatformKind, World};

/// What the collision pass found
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollisionResult {
    /// Player is standing on something
    pub on_ground: bool,
    /// Feet are in a slime patch
    pub on_slime: bool,
    /// Falling platforms armed by this landing (indices into `World::platforms`)
    pub triggered: Vec<usize>,
}

/// A solid the player can be pushed out of
#[derive(Clone, Copy)]
enum Solid {
    Platform(usize),
    Barrier(usize),
}

/// Active platforms first, then barriers (fixed order keeps results stable)
fn solids(world: &World) -> impl Iterator<Item = (Solid, Rect)> + '_ {
    let platforms = world
        .platforms
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_active())
        .map(|(i, p)| (Solid::Platform(i), p.rect));
    let barriers = world
        .barriers
        .iter()
        .enumerate()
        .map(|(i, b)| (Solid::Barrier(i), *b));
    platforms.chain(barriers)
}

/// Move the player by `vel * dt` and resolve against platforms and barriers.
///
/// Landing refreshes the coyote countdown to `coyote_ms` and arms any idle
/// falling platform underfoot.
pub fn resolve_player(
    player: &mut Player,
    world: &mut World,
    dt: f32,
    coyote_ms: f32,
) -> CollisionResult {
    let mut result = CollisionResult::default();
    player.on_ground = false;

    // Y pass
    player.pos.y += player.vel.y * dt;
    let mut landed_on: Vec<usize> = Vec::new();
    for (solid, rect) in solids(world) {
        if !aabb_overlap(&player.rect(), &rect) {
            continue;
        }
        if player.vel.y > 0.0 {
            player.pos.y = rect.y - player.size.y;
            player.vel.y = 0.0;
            player.on_ground = true;
            player.coyote_ms = coyote_ms;
            if let Solid::Platform(i) = solid {
                landed_on.push(i);
            }
        } else if player.vel.y < 0.0 {
            player.pos.y = rect.bottom();
            player.vel.y = 0.0;
        }
    }

    for i in landed_on {
        if let PlatformKind::Falling(fall) = &mut world.platforms[i].kind {
            if fall.arm() {
                log::debug!("Falling platform {} triggered", i);
                result.triggered.push(i);
            }
        }
    }

    // X pass
    player.pos.x += player.vel.x * dt;
    for (_, rect) in solids(world) {
        if !aabb_overlap(&player.rect(), &rect) {
            continue;
        }
        if player.vel.x > 0.0 {
            player.pos.x = rect.x - player.size.x;
        } else if player.vel.x < 0.0 {
            player.pos.x = rect.right();
        }
        player.vel.x = 0.0;
    }

    result.on_ground = player.on_ground;
    result.on_slime = feet_in_slime(player, world);
    result
}

/// Is the player's feet probe touching any slime patch?
pub fn feet_in_slime(player: &Player, world: &World) -> bool {
    let feet = player.feet_probe();
    world.slime.iter().any(|s| aabb_overlap(&feet, s))
}

/// Is the player touching a spike?
pub fn touches_spike(player: &Player, world: &World) -> bool {
    let body = player.rect();
    world.spikes.iter().any(|s| aabb_overlap(&body, s))
}

/// Indices of untaken pickups the player is touching
pub fn touched_pickups(player: &Player, world: &World) -> Vec<usize> {
    let body = player.rect();
    world
        .pickups
        .iter()
        .enumerate()
        .filter(|(_, p)| !p.taken && circle_rect_overlap(&p.hit_circle(), &body))
        .map(|(i, _)| i)
        .collect()
}

/// Is the player touching the goal?
pub fn touches_goal(player: &Player, world: &World) -> bool {
    aabb_overlap(&player.rect(), &world.goal)
}
