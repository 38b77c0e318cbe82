//! Fighter entities and their owned physics components.
//!
//! A [`Fighter`] owns exactly one [`PhysicsState`] and one [`KnockbackState`].
//! Both are built together with the fighter and dropped with it; nothing else
//! holds a reference to them.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::blend::PartialBlend;
use crate::config::{PhysicsConfig, StatProfile};
use crate::input::WalkMode;
use crate::joint::{JointMap, JointPose};
use crate::stage::SurfaceMaterial;

/// Unique identifier for a fighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FighterId(pub u32);

/// Manages fighter ID generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FighterIdGenerator {
    next_id: u32,
}

impl FighterIdGenerator {
    pub fn new() -> Self {
        Self { next_id: 1 }
    }

    pub fn next(&mut self) -> FighterId {
        let id = FighterId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl Default for FighterIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-fighter skeleton and blend state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsState {
    /// Angular velocity per joint (rad per frame).
    pub joint_velocity: JointMap,
    /// Current rendered angle per joint.
    pub joint_angle: JointPose,
    /// Randomized targets followed while ragdolled.
    pub ragdoll_target: JointPose,
    /// Seconds until the ragdoll targets are re-rolled.
    pub retarget_timer: f32,
    pub partial: PartialBlend,
    pub air_blend: f32,
    pub recovery_blend: f32,
    /// Max of the individual blends, recomputed every step.
    pub total_blend: f32,
    /// Latest target pose from the animator.
    pub animation_pose: Option<JointPose>,
    /// Joint angles captured when the get-up started.
    pub recovery_pose: Option<JointPose>,
    pub body_radius: f32,
}

impl PhysicsState {
    pub fn new(config: &PhysicsConfig) -> Self {
        let rest = JointMap::rest();
        Self {
            joint_velocity: JointMap::ZERO,
            joint_angle: rest,
            ragdoll_target: rest,
            retarget_timer: 0.0,
            partial: PartialBlend::default(),
            air_blend: 0.0,
            recovery_blend: 0.0,
            total_blend: 0.0,
            animation_pose: None,
            recovery_pose: None,
            body_radius: config.body_radius,
        }
    }
}

/// Temporary locomotion override following a hit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct KnockbackState {
    /// Seconds of knockback-influenced movement remaining.
    pub timer: f32,
    /// Length of the window when it was armed.
    pub duration: f32,
    /// Hit force that armed the window.
    pub magnitude: f32,
    /// Horizontal push direction: -1, 0 or 1.
    pub direction: f32,
}

impl KnockbackState {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.timer > 0.0
    }

    /// Fraction of the window remaining, in [0, 1].
    pub fn remaining_fraction(&self) -> f32 {
        if self.duration <= 0.0 {
            0.0
        } else {
            (self.timer / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Arm or refresh the window. A shorter refresh never truncates a longer
    /// window already running.
    pub fn arm(&mut self, duration: f32, magnitude: f32, direction: f32) {
        if duration > self.timer {
            self.timer = duration;
            self.duration = duration;
        }
        self.magnitude = magnitude;
        self.direction = if direction > 0.0 {
            1.0
        } else if direction < 0.0 {
            -1.0
        } else {
            0.0
        };
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// Lifecycle phase derived from the ragdoll/recovering flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecyclePhase {
    #[default]
    Normal,
    Ragdoll,
    Recovering,
}

/// A combatant.
///
/// Position is the feet point; y grows downward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub id: FighterId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub on_ground: bool,
    pub ragdoll: bool,
    pub recovering: bool,
    pub alive: bool,
    pub is_player: bool,

    /// Stability resource in [0, max_footing].
    pub footing: f32,
    pub max_footing: f32,

    /// Impact speed of the last landing, decaying toward zero.
    pub landed_impulse: f32,
    /// Material of the last surface landed on or stood on.
    pub surface_material: Option<SurfaceMaterial>,

    pub walk_mode: WalkMode,
    pub stats: StatProfile,
    /// Overrides the default gravity multiplier when set.
    pub gravity_scale: Option<f32>,

    /// Seconds spent ragdolled in the current knockdown.
    pub ragdoll_time: f32,
    /// Footing at the moment the knockdown started.
    pub footing_at_fall: f32,
    /// Seconds into the current get-up.
    pub recovery_elapsed: f32,
    /// Length of the current get-up.
    pub recovery_duration: f32,
    /// Top of the surface last stood on.
    pub support_y: f32,
    /// Phase at the end of the previous step.
    pub previous_phase: LifecyclePhase,

    pub physics: PhysicsState,
    pub knockback: KnockbackState,
}

impl Fighter {
    /// Create a grounded-state-unknown fighter at `position` with full footing.
    pub fn new(id: FighterId, position: Vec2, config: &PhysicsConfig) -> Self {
        Self {
            id,
            position,
            velocity: Vec2::ZERO,
            on_ground: false,
            ragdoll: false,
            recovering: false,
            alive: true,
            is_player: false,
            footing: config.max_footing,
            max_footing: config.max_footing,
            landed_impulse: 0.0,
            surface_material: None,
            walk_mode: WalkMode::default(),
            stats: StatProfile::default(),
            gravity_scale: None,
            ragdoll_time: 0.0,
            footing_at_fall: config.max_footing,
            recovery_elapsed: 0.0,
            recovery_duration: 0.0,
            support_y: position.y,
            previous_phase: LifecyclePhase::Normal,
            physics: PhysicsState::new(config),
            knockback: KnockbackState::default(),
        }
    }

    /// Mark as player-controlled.
    pub fn as_player(mut self) -> Self {
        self.is_player = true;
        self
    }

    /// Set a weapon-dependent maximum footing and refill to it.
    pub fn with_max_footing(mut self, max_footing: f32) -> Self {
        if max_footing.is_finite() && max_footing > 0.0 {
            self.max_footing = max_footing;
            self.footing = max_footing;
            self.footing_at_fall = max_footing;
        }
        self
    }

    pub fn with_body_radius(mut self, radius: f32) -> Self {
        if radius.is_finite() && radius >= 0.0 {
            self.physics.body_radius = radius;
        }
        self
    }

    pub fn with_stats(mut self, stats: StatProfile) -> Self {
        self.stats = stats.sanitized();
        self
    }

    pub fn with_gravity_scale(mut self, scale: f32) -> Self {
        self.gravity_scale = Some(scale);
        self
    }

    pub fn phase(&self) -> LifecyclePhase {
        if self.ragdoll {
            LifecyclePhase::Ragdoll
        } else if self.recovering {
            LifecyclePhase::Recovering
        } else {
            LifecyclePhase::Normal
        }
    }

    /// Supply the animator's target pose for subsequent steps.
    pub fn set_animation_pose(&mut self, pose: JointPose) {
        self.physics.animation_pose = Some(pose);
    }

    pub fn clear_animation_pose(&mut self) {
        self.physics.animation_pose = None;
    }

    pub fn body_radius(&self) -> f32 {
        self.physics.body_radius
    }

    /// Footing as a fraction of its maximum.
    pub fn footing_ratio(&self) -> f32 {
        if self.max_footing <= 0.0 {
            0.0
        } else {
            (self.footing / self.max_footing).clamp(0.0, 1.0)
        }
    }

    /// Whether the fighter takes part in body collisions.
    pub fn is_solid(&self) -> bool {
        self.alive && !self.ragdoll && self.physics.body_radius > 0.0
    }

    /// Reset any non-finite kinematic values in place.
    ///
    /// Returns true if anything had to be repaired.
    pub fn sanitize(&mut self, fallback_position: Vec2) -> bool {
        let mut repaired = false;
        if !self.position.x.is_finite() {
            self.position.x = fallback_position.x;
            repaired = true;
        }
        if !self.position.y.is_finite() {
            self.position.y = fallback_position.y;
            repaired = true;
        }
        if !self.velocity.is_finite() {
            self.velocity = Vec2::ZERO;
            repaired = true;
        }
        if !(self.max_footing.is_finite() && self.max_footing > 0.0) {
            self.max_footing = 1.0;
            repaired = true;
        }
        if !self.footing.is_finite() {
            self.footing = self.max_footing;
            repaired = true;
        }
        if !self.landed_impulse.is_finite() {
            self.landed_impulse = 0.0;
            repaired = true;
        }
        if !self.knockback.timer.is_finite() {
            self.knockback.clear();
            repaired = true;
        }
        self.footing = self.footing.clamp(0.0, self.max_footing);
        repaired
    }
}
