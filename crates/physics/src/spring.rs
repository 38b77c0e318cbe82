//! Spring-damper joint integrator.
//!
//! Each joint chases a target angle with a per-frame spring:
//!
//! ```text
//! vel += (target - angle) * stiffness
//! vel *= damping ^ (dt / (1/60))
//! vel  = clamp(vel, -max_angular_velocity, max_angular_velocity)
//! angle = clamp(angle + vel, joint_min, joint_max)
//! ```
//!
//! The target is the animated pose, the ragdoll target, or a blend of the two
//! weighted by the fighter's total blend. While getting up, the pose captured
//! at the end of the knockdown stands in for the ragdoll target.

use crate::config::{PhysicsConfig, SpringPreset};
use crate::fighter::{Fighter, PhysicsState};
use crate::joint::{Joint, JointMap};
use crate::math::{finite_or, frame_rate_independent, lerp};
use crate::random::RandomSource;

/// Fraction of each joint's range used for randomized ragdoll targets.
const RAGDOLL_TARGET_SPREAD: f32 = 0.7;

/// Spring preset for the current blend.
///
/// Full ragdoll uses the ragdoll preset outright; otherwise the normal preset
/// is pulled toward it by `blend`.
pub fn blended_preset(config: &PhysicsConfig, ragdoll: bool, blend: f32) -> SpringPreset {
    if ragdoll {
        config.ragdoll_spring
    } else {
        config
            .normal_spring
            .lerp(config.ragdoll_spring, blend.clamp(0.0, 1.0))
    }
}

/// Roll new ragdoll targets within the central part of each joint's range.
pub fn reroll_ragdoll_targets(physics: &mut PhysicsState, rng: &mut impl RandomSource) {
    physics.ragdoll_target = JointMap::from_fn(|joint| {
        let (min, max) = joint.range();
        let center = (min + max) * 0.5;
        let half_spread = (max - min) * 0.5 * RAGDOLL_TARGET_SPREAD;
        joint.clamp(center + rng.next_signed(half_spread))
    });
}

/// Add uniform random angular velocity in `[-magnitude, magnitude)` to every joint.
pub fn perturb_joints(physics: &mut PhysicsState, magnitude: f32, rng: &mut impl RandomSource) {
    if !(magnitude.is_finite() && magnitude > 0.0) {
        return;
    }
    for joint in Joint::ALL {
        physics.joint_velocity[joint] += rng.next_signed(magnitude);
    }
}

/// Advance every joint of `fighter` by one step.
///
/// Reads `fighter.physics.total_blend`, so blends must be updated first.
pub fn integrate_joints(
    fighter: &mut Fighter,
    config: &PhysicsConfig,
    rng: &mut impl RandomSource,
    dt: f32,
) {
    let ragdoll = fighter.ragdoll;
    let recovering = fighter.recovering;
    let physics = &mut fighter.physics;

    if ragdoll {
        physics.retarget_timer -= dt;
        if physics.retarget_timer <= 0.0 {
            reroll_ragdoll_targets(physics, rng);
            let (min, max) = config.retarget_interval();
            physics.retarget_timer = rng.next_range(min, max);
        }
    }

    let blend = physics.total_blend.clamp(0.0, 1.0);
    let preset = blended_preset(config, ragdoll, blend);
    let damping = frame_rate_independent(preset.damping, dt);
    let max_velocity = config.max_angular_velocity;

    for joint in Joint::ALL {
        let animated = physics
            .animation_pose
            .map(|pose| joint.clamp(pose[joint]))
            .unwrap_or_else(|| joint.rest_angle());
        let loose = match (recovering, physics.recovery_pose) {
            (true, Some(pose)) => pose[joint],
            _ => physics.ragdoll_target[joint],
        };

        let target = if ragdoll {
            loose
        } else if blend > 0.0 {
            lerp(animated, loose, blend)
        } else {
            animated
        };

        let angle = joint.clamp(physics.joint_angle[joint]);
        let mut velocity = finite_or(physics.joint_velocity[joint], 0.0);

        velocity += (target - angle) * preset.stiffness;
        velocity *= damping;
        if ragdoll {
            velocity += rng.next_signed(config.ragdoll_noise);
        }
        velocity = velocity.clamp(-max_velocity, max_velocity);

        let next = joint.clamp(angle + velocity);
        // Drop velocity that would keep driving the joint into its stop.
        let (min, max) = joint.range();
        if (next >= max && velocity > 0.0) || (next <= min && velocity < 0.0) {
            velocity = 0.0;
        }

        physics.joint_angle[joint] = next;
        physics.joint_velocity[joint] = velocity;
    }
}
