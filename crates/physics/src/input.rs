//! Per-frame fighter input.

use serde::{Deserialize, Serialize};

/// Directional input flags packed into a byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputButtons(pub u8);

impl InputButtons {
    pub const LEFT: u8 = 1 << 0;
    pub const RIGHT: u8 = 1 << 1;
    pub const JUMP: u8 = 1 << 2;

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Check if a button is pressed.
    #[inline]
    pub fn pressed(self, button: u8) -> bool {
        (self.0 & button) != 0
    }

    /// Press a button.
    #[inline]
    pub fn press(&mut self, button: u8) {
        self.0 |= button;
    }

    /// Release a button.
    #[inline]
    pub fn release(&mut self, button: u8) {
        self.0 &= !button;
    }
}

/// Attack phase reported by the combat system. Used only to gate movement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackPhase {
    #[default]
    Idle,
    Windup,
    /// Holding a charged attack; the only attacking phase that allows walking.
    Charge,
    Active,
    Recovery,
}

impl AttackPhase {
    /// Whether horizontal input is honoured in this phase.
    #[inline]
    pub fn allows_movement(self) -> bool {
        matches!(self, AttackPhase::Idle | AttackPhase::Charge)
    }
}

/// Locomotion style selected by game state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalkMode {
    #[default]
    Combat,
    NonCombat,
    Sneak,
}

/// Input for a single fighter for a single frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FighterInput {
    pub buttons: InputButtons,
    pub attack_phase: AttackPhase,
}

impl FighterInput {
    pub fn new(buttons: u8, attack_phase: AttackPhase) -> Self {
        Self {
            buttons: InputButtons(buttons),
            attack_phase,
        }
    }

    /// Input holding only the given buttons.
    pub fn held(buttons: u8) -> Self {
        Self::new(buttons, AttackPhase::Idle)
    }

    #[inline]
    pub fn left(&self) -> bool {
        self.buttons.pressed(InputButtons::LEFT)
    }

    #[inline]
    pub fn right(&self) -> bool {
        self.buttons.pressed(InputButtons::RIGHT)
    }

    #[inline]
    pub fn wants_jump(&self) -> bool {
        self.buttons.pressed(InputButtons::JUMP)
    }

    /// Horizontal direction: -1 (left), 0, or 1 (right).
    pub fn horizontal(&self) -> f32 {
        match (self.left(), self.right()) {
            (true, false) => -1.0,
            (false, true) => 1.0,
            _ => 0.0,
        }
    }
}
