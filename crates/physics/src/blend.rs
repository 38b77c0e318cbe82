//! Blend-state machine.
//!
//! Four independent producers write blend weights in `[0, 1]`:
//!
//! - **Ragdoll**: 1 while the fighter is ragdolled.
//! - **Partial**: a one-shot stagger weight set by hit reactions and the
//!   get-up, decaying to zero along a cubic curve.
//! - **Airborne**: follows vertical speed while off the ground and falls off
//!   quickly after landing.
//! - **Recovery**: fades linearly from its start value over the get-up.
//!
//! The joint integrator only reads their maximum, so no single cause can push
//! the blend past what it would produce alone.

use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::fighter::Fighter;
use crate::math::smoothing_factor;

/// A one-shot blend weight that decays to zero over a fixed duration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialBlend {
    /// Current weight.
    pub value: f32,
    /// Weight at the moment the decay started.
    pub start: f32,
    /// Seconds since the decay started.
    pub elapsed: f32,
    /// Seconds until the weight reaches zero.
    pub duration: f32,
}

impl PartialBlend {
    /// Whether any weight remains.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.value > 0.0
    }

    /// Start a new decay from `value`, replacing whatever was running.
    pub fn set(&mut self, value: f32, duration: f32) {
        let value = if value.is_finite() { value.clamp(0.0, 1.0) } else { 0.0 };
        if !(duration.is_finite() && duration > 0.0) {
            *self = Self::default();
            return;
        }
        *self = Self {
            value,
            start: value,
            elapsed: 0.0,
            duration,
        };
    }

    /// Start a new decay only if `value` exceeds the current weight.
    ///
    /// Returns whether the blend was raised.
    pub fn raise(&mut self, value: f32, duration: f32) -> bool {
        if value.is_finite() && value > self.value {
            self.set(value, duration);
            self.value > 0.0
        } else {
            false
        }
    }

    /// Advance the decay. The weight never increases and reaches exactly zero
    /// once `elapsed >= duration`.
    pub fn decay(&mut self, dt: f32) {
        if !self.is_active() {
            return;
        }
        self.elapsed += dt.max(0.0);
        if self.duration <= 0.0 || self.elapsed >= self.duration {
            *self = Self::default();
            return;
        }
        let remaining = 1.0 - self.elapsed / self.duration;
        let eased = self.start * remaining * remaining * remaining;
        self.value = eased.min(self.value).max(0.0);
    }
}

/// Target airborne weight for the current vertical speed.
pub fn airborne_target(on_ground: bool, vertical_speed: f32, config: &PhysicsConfig) -> f32 {
    if on_ground {
        return 0.0;
    }
    let raw = config.air_blend_min + vertical_speed.abs() / config.air_blend_speed_divisor.max(1.0);
    raw.clamp(config.air_blend_min, config.air_blend_max)
}

/// Smooth the airborne weight toward its target. Landing uses the faster rate.
pub fn step_air_blend(
    current: f32,
    on_ground: bool,
    vertical_speed: f32,
    dt: f32,
    config: &PhysicsConfig,
) -> f32 {
    let target = airborne_target(on_ground, vertical_speed, config);
    let rate = if on_ground {
        config.air_blend_land_rate
    } else {
        config.air_blend_rise_rate
    };
    let next = current + (target - current) * smoothing_factor(rate, dt);
    // Snap the tail so landings settle to an exact zero.
    if on_ground && next < 1e-3 {
        0.0
    } else {
        next.clamp(0.0, 1.0)
    }
}

/// Recovery weight `start * (1 - t)` for `t = elapsed / duration`.
pub fn recovery_weight(elapsed: f32, duration: f32, start: f32) -> f32 {
    if !(duration > 0.0) {
        return 0.0;
    }
    let t = (elapsed / duration).clamp(0.0, 1.0);
    (start * (1.0 - t)).max(0.0)
}

/// Combined weight consumed by the integrator.
#[inline]
pub fn combine(ragdoll: bool, partial: f32, air: f32, recovery: f32) -> f32 {
    let ragdoll: f32 = if ragdoll { 1.0 } else { 0.0 };
    ragdoll.max(partial).max(air).max(recovery).clamp(0.0, 1.0)
}

/// Advance every blend producer for one step and recompute the total.
pub fn update_blends(fighter: &mut Fighter, config: &PhysicsConfig, dt: f32) {
    let physics = &mut fighter.physics;

    physics.partial.decay(dt);
    physics.air_blend = step_air_blend(
        physics.air_blend,
        fighter.on_ground,
        fighter.velocity.y,
        dt,
        config,
    );
    physics.recovery_blend = if fighter.recovering {
        recovery_weight(
            fighter.recovery_elapsed,
            fighter.recovery_duration,
            config.recovery_blend_start,
        )
    } else {
        0.0
    };
    physics.total_blend = combine(
        fighter.ragdoll,
        physics.partial.value,
        physics.air_blend,
        physics.recovery_blend,
    );
}
