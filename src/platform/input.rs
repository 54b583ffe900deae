//! Logical buttons and the input source seen by the simulation
//!
//! The host feeds key events into a [`HeldButtons`]; the simulation only sees
//! the [`InputSource`] trait. `consume` releases a button so a single press
//! acts once even while the key stays down.

use std::collections::HashSet;

/// Logical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Button {
    Left,
    Right,
    Jump,
    Dash,
    Restart,
    ConfirmStart,
}

impl Button {
    /// Map a `KeyboardEvent.code` to a button
    pub fn from_key_code(code: &str) -> Option<Self> {
        match code {
            "ArrowLeft" | "KeyA" => Some(Button::Left),
            "ArrowRight" | "KeyD" => Some(Button::Right),
            "Space" | "ArrowUp" | "KeyW" => Some(Button::Jump),
            "ShiftLeft" => Some(Button::Dash),
            "KeyR" => Some(Button::Restart),
            "Enter" => Some(Button::ConfirmStart),
            _ => None,
        }
    }
}

/// What the simulation reads each tick
pub trait InputSource {
    /// Is the button currently down?
    fn is_held(&self, button: Button) -> bool;

    /// Take a press: returns whether the button was down and releases it
    fn consume(&mut self, button: Button) -> bool;
}

/// Set of currently held buttons
#[derive(Debug, Clone, Default)]
pub struct HeldButtons {
    held: HashSet<Button>,
}

impl HeldButtons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, button: Button) {
        self.held.insert(button);
    }

    pub fn release(&mut self, button: Button) {
        self.held.remove(&button);
    }

    /// Key down by `KeyboardEvent.code`; returns true if the key is mapped
    pub fn key_down(&mut self, code: &str) -> bool {
        match Button::from_key_code(code) {
            Some(button) => {
                self.press(button);
                true
            }
            None => false,
        }
    }

    /// Key up by `KeyboardEvent.code`
    pub fn key_up(&mut self, code: &str) {
        if let Some(button) = Button::from_key_code(code) {
            self.release(button);
        }
    }

    pub fn clear(&mut self) {
        self.held.clear();
    }
}

impl InputSource for HeldButtons {
    fn is_held(&self, button: Button) -> bool {
        self.held.contains(&button)
    }

    fn consume(&mut self, button: Button) -> bool {
        self.held.remove(&button)
    }
}

/// Scripted input for headless runs: confirms the start, holds right and
/// presses jump and dash on a fixed frame schedule
#[derive(Debug, Clone)]
pub struct Autopilot {
    held: HeldButtons,
    frame: u64,
    jump_every: u64,
    dash_every: u64,
}

impl Autopilot {
    pub fn new(jump_every: u64, dash_every: u64) -> Self {
        Self {
            held: HeldButtons::new(),
            frame: 0,
            jump_every: jump_every.max(1),
            dash_every: dash_every.max(1),
        }
    }

    /// Update the held buttons for the next frame
    pub fn advance(&mut self) {
        if self.frame == 0 {
            self.held.press(Button::ConfirmStart);
        }
        self.held.press(Button::Right);
        if self.frame % self.jump_every == 0 {
            self.held.press(Button::Jump);
        }
        if self.frame > 0 && self.frame % self.dash_every == 0 {
            self.held.press(Button::Dash);
        }
        self.frame += 1;
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

impl Default for Autopilot {
    fn default() -> Self {
        Self::new(45, 150)
    }
}

impl InputSource for Autopilot {
    fn is_held(&self, button: Button) -> bool {
        self.held.is_held(button)
    }

    fn consume(&mut self, button: Button) -> bool {
        self.held.consume(button)
    }
}
