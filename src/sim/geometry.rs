//! Rectangle and circle overlap tests
//!
//! Rectangles are stored as top-left corner plus size, with Y growing downward
//! (screen space).

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle (top-left corner + size)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        Vec2::new(self.right(), self.bottom())
    }
}

/// A circle (center + radius)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub const fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// Check if two rectangles overlap
///
/// Edge-exclusive: rectangles that only share a boundary line do not overlap.
/// This is what lets a player rest exactly on top of a platform without
/// colliding with it again next tick.
#[inline]
pub fn aabb_overlap(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Check if a circle touches a rectangle
///
/// Clamps the center onto the rectangle to find the nearest point and compares
/// squared distances.
#[inline]
pub fn circle_rect_overlap(circle: &Circle, rect: &Rect) -> bool {
    let closest = circle.center.clamp(rect.min(), rect.max());
    (circle.center - closest).length_squared() <= circle.radius * circle.radius
}
