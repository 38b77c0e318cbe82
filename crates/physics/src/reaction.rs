//! Reaction API used by the combat system.
//!
//! Reactions are immediate state mutations; their effects play out over the
//! following steps.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;
use crate::fighter::Fighter;
use crate::joint::{Joint, JointPose};
use crate::math::lerp;
use crate::random::RandomSource;
use crate::spring::{perturb_joints, reroll_ragdoll_targets};

/// Impulse that knocks a fighter down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitImpulse {
    /// Direction of the push (radians, 0 = +x, +y is down).
    pub angle: f32,
    pub force: f32,
}

/// A hit that may or may not knock the fighter down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HitReaction {
    pub angle: f32,
    pub force: f32,
    /// Footing the fighter had before the hit's damage was applied.
    pub footing_before: f32,
}

/// Spin kick applied to an airborne fighter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinImpulse {
    pub force: f32,
    /// Sign selects the spin direction.
    pub direction: f32,
}

/// Per-joint share of an airborne spin.
const SPIN_WEIGHTS: [(Joint, f32); 6] = [
    (Joint::Torso, 1.0),
    (Joint::Head, 0.8),
    (Joint::LeftHip, 0.5),
    (Joint::RightHip, 0.5),
    (Joint::LeftKnee, 0.4),
    (Joint::RightKnee, 0.4),
];

fn push_direction(angle: f32) -> Vec2 {
    if angle.is_finite() {
        Vec2::from_angle(angle)
    } else {
        Vec2::ZERO
    }
}

fn finite_force(force: f32) -> f32 {
    if force.is_finite() {
        force.max(0.0)
    } else {
        0.0
    }
}

/// Put `fighter` into full ragdoll and launch it along the impulse.
pub fn trigger_full_ragdoll(
    fighter: &mut Fighter,
    impulse: HitImpulse,
    config: &PhysicsConfig,
    rng: &mut impl RandomSource,
) {
    let force = finite_force(impulse.force);

    if !fighter.ragdoll {
        fighter.footing_at_fall = fighter.footing;
    }
    fighter.ragdoll = true;
    fighter.recovering = false;
    fighter.ragdoll_time = 0.0;
    fighter.recovery_elapsed = 0.0;

    let physics = &mut fighter.physics;
    physics.recovery_pose = None;
    physics.partial.set(1.0, config.full_ragdoll_fade);
    reroll_ragdoll_targets(physics, rng);
    let (min, max) = config.retarget_interval();
    physics.retarget_timer = rng.next_range(min, max);
    perturb_joints(physics, config.ragdoll_perturbation, rng);

    fighter.velocity += push_direction(impulse.angle) * force * config.ragdoll_impulse_scale;
    fighter.velocity.y -= config.ragdoll_lift;
    if fighter.velocity.y < 0.0 {
        fighter.on_ground = false;
    }

    log::debug!(
        "fighter {:?}: knocked down (force {:.0}, footing {:.1})",
        fighter.id,
        force,
        fighter.footing_at_fall
    );
}

/// Apply a hit. Knocks the fighter down when its footing was already gone.
///
/// Returns true if the hit caused a knockdown.
pub fn apply_hit_reaction(
    fighter: &mut Fighter,
    hit: HitReaction,
    config: &PhysicsConfig,
    rng: &mut impl RandomSource,
) -> bool {
    if !(hit.footing_before > 0.0) {
        trigger_full_ragdoll(
            fighter,
            HitImpulse {
                angle: hit.angle,
                force: hit.force,
            },
            config,
            rng,
        );
        return true;
    }

    let force = finite_force(hit.force);
    let instability = 1.0 - fighter.footing_ratio();

    fighter.physics.partial.raise(
        lerp(config.hit_blend_min, config.hit_blend_max, instability),
        lerp(config.hit_fade_min, config.hit_fade_max, instability),
    );
    perturb_joints(
        &mut fighter.physics,
        config.hit_perturbation * (0.4 + instability),
        rng,
    );

    let push = push_direction(hit.angle);
    fighter.velocity.x += push.x * force * config.ragdoll_impulse_scale * config.hit_impulse_scale;

    let duration = lerp(
        config.knockback_min_duration,
        config.knockback_max_duration,
        instability,
    );
    fighter.knockback.arm(duration, force, push.x);

    log::trace!(
        "fighter {:?}: staggered (instability {:.2}, knockback {:.2}s)",
        fighter.id,
        instability,
        duration
    );
    false
}

/// Spin an airborne fighter without knocking it down. No-op on the ground.
pub fn apply_airborne_spin(fighter: &mut Fighter, spin: SpinImpulse, config: &PhysicsConfig) {
    if fighter.on_ground {
        return;
    }
    let force = finite_force(spin.force);
    let sign = if spin.direction < 0.0 { -1.0 } else { 1.0 };
    let spin_velocity = sign * force * config.spin_scale;

    for (joint, weight) in SPIN_WEIGHTS {
        fighter.physics.joint_velocity[joint] += spin_velocity * weight;
    }

    let blend = (config.spin_blend_base + force * config.spin_scale).min(config.spin_blend_max);
    fighter.physics.partial.raise(blend, config.spin_fade);

    log::trace!("fighter {:?}: airborne spin {:.3}", fighter.id, spin_velocity);
}

/// Blend weight the renderer uses between animated and simulated angles.
pub fn ragdoll_blend(fighter: &Fighter) -> f32 {
    fighter.physics.total_blend
}

/// Current simulated joint angles.
pub fn ragdoll_angles(fighter: &Fighter) -> &JointPose {
    &fighter.physics.joint_angle
}
