//! Frame timing
//!
//! One simulation tick per display refresh, with dt measured from the frame
//! timestamp and capped so a stall (tab in background, breakpoint) cannot
//! integrate one huge step.

/// Limit `dt` to `[0, max_dt]`. Non-finite input gives 0; an unusable
/// `max_dt` (non-positive or non-finite) falls back to the default cap.
pub fn clamp_dt(dt: f32, max_dt: f32) -> f32 {
    let cap = if max_dt.is_finite() && max_dt > 0.0 {
        max_dt
    } else {
        crate::consts::MAX_DT
    };
    if dt.is_finite() { dt.max(0.0).min(cap) } else { 0.0 }
}

/// Measures clamped dt between frame timestamps
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_ms: Option<f64>,
    max_dt: f32,
}

impl FrameClock {
    pub fn new(max_dt: f32) -> Self {
        Self {
            last_ms: None,
            max_dt,
        }
    }

    /// Seconds since the previous frame, clamped to `[0, max_dt]`.
    /// The first frame returns 0.
    pub fn advance(&mut self, now_ms: f64) -> f32 {
        let dt = match self.last_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);
        clamp_dt(dt, self.max_dt)
    }

    /// Forget the previous timestamp (e.g. after the page was hidden)
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
