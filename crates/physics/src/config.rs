//! Physics tuning.
//!
//! All parameters are grouped here for easy tuning. Units are pixels and
//! seconds; y grows downward. Per-frame constants (spring stiffness, damping,
//! angular velocity, noise) are tuned against a 60 fps step.
//!
//! Every field has a default, so a partial TOML file only overrides what it
//! names. Values that are non-finite or out of range are replaced by their
//! defaults in [`PhysicsConfig::sanitized`].

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Stiffness/damping pair for the joint spring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringPreset {
    /// Fraction of the angle error added to joint velocity per frame.
    pub stiffness: f32,
    /// Velocity retained per 60 fps frame, in (0, 1].
    pub damping: f32,
}

impl SpringPreset {
    pub const fn new(stiffness: f32, damping: f32) -> Self {
        Self { stiffness, damping }
    }

    /// Component-wise interpolation toward `other`.
    pub fn lerp(self, other: SpringPreset, t: f32) -> SpringPreset {
        SpringPreset {
            stiffness: crate::math::lerp(self.stiffness, other.stiffness, t),
            damping: crate::math::lerp(self.damping, other.damping, t),
        }
    }
}

/// Read-only stat multipliers supplied by the stat/perk system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatProfile {
    pub movement_speed_multiplier: f32,
    pub footing_recovery_multiplier: f32,
    /// Scales the get-up (recovery) duration.
    pub animation_duration_multiplier: f32,
}

impl Default for StatProfile {
    fn default() -> Self {
        Self {
            movement_speed_multiplier: 1.0,
            footing_recovery_multiplier: 1.0,
            animation_duration_multiplier: 1.0,
        }
    }
}

impl StatProfile {
    /// Replace non-finite or non-positive multipliers with 1.0.
    pub fn sanitized(self) -> Self {
        let fix = |v: f32| if v.is_finite() && v > 0.0 { v } else { 1.0 };
        Self {
            movement_speed_multiplier: fix(self.movement_speed_multiplier),
            footing_recovery_multiplier: fix(self.footing_recovery_multiplier),
            animation_duration_multiplier: fix(self.animation_duration_multiplier),
        }
    }
}

/// Global balance knobs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceScalars {
    pub base_movement_speed: f32,
    pub base_recovery_rate: f32,
}

impl Default for BalanceScalars {
    fn default() -> Self {
        Self {
            base_movement_speed: 1.0,
            base_recovery_rate: 1.0,
        }
    }
}

/// How much standing ground each kind of fighter keeps in body collisions.
///
/// Corrections are split inversely: a fighter with twice the share of its
/// partner moves half as far.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionShares {
    pub player: f32,
    pub npc: f32,
    pub staggered: f32,
    pub recovering: f32,
    /// Partial blend above which a fighter counts as staggered.
    pub stagger_threshold: f32,
}

impl Default for CollisionShares {
    fn default() -> Self {
        Self {
            player: 1.0,
            npc: 0.7,
            staggered: 0.5,
            recovering: 0.35,
            stagger_threshold: 0.3,
        }
    }
}

/// Configuration for fighter physics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    // ========================================================================
    // World
    // ========================================================================
    /// Gravity acceleration (px/s², +y is down).
    pub gravity: f32,

    /// Upward launch speed of a jump (px/s).
    pub jump_impulse: f32,

    /// Largest time step integrated in one call (s).
    pub max_delta_time: f32,

    /// Bounds width at which movement values apply unscaled (px).
    pub reference_span: f32,

    // ========================================================================
    // Locomotion
    // ========================================================================
    /// Horizontal input acceleration (px/s²).
    pub acceleration: f32,

    /// Horizontal speed cap under input (px/s).
    pub max_speed: f32,

    /// Ground deceleration without input (px/s²).
    pub friction: f32,

    /// Exponential horizontal drag while airborne (1/s).
    pub air_drag: f32,

    /// Fraction of impact speed kept when bouncing off a surface.
    pub restitution: f32,

    /// Rebound speed below which a landing sticks instead of bouncing (px/s).
    pub bounce_threshold: f32,

    /// Speed multiplier while charging an attack.
    pub charge_move_multiplier: f32,

    pub combat_walk_multiplier: f32,
    pub non_combat_walk_multiplier: f32,
    pub sneak_walk_multiplier: f32,

    // ========================================================================
    // Body
    // ========================================================================
    /// Collision circle radius (px).
    pub body_radius: f32,

    /// Default maximum footing.
    pub max_footing: f32,

    /// Footing regained per second while grounded.
    pub footing_regen_rate: f32,

    /// Exponential decay rate of the landing impulse signal (1/s).
    pub landed_impulse_decay: f32,

    // ========================================================================
    // Joint springs
    // ========================================================================
    pub normal_spring: SpringPreset,
    pub ragdoll_spring: SpringPreset,

    /// Joint angular velocity cap (rad per frame).
    pub max_angular_velocity: f32,

    // ========================================================================
    // Blend
    // ========================================================================
    pub air_blend_min: f32,
    pub air_blend_max: f32,
    /// Vertical speed that adds 1.0 to the airborne blend target (px/s).
    pub air_blend_speed_divisor: f32,
    /// Smoothing rate toward the airborne target while falling (1/s).
    pub air_blend_rise_rate: f32,
    /// Smoothing rate toward zero after landing (1/s).
    pub air_blend_land_rate: f32,

    // ========================================================================
    // Ragdoll
    // ========================================================================
    pub ragdoll_gravity_multiplier: f32,
    /// Uniform velocity noise injected per frame (rad per frame).
    pub ragdoll_noise: f32,
    pub ragdoll_retarget_min: f32,
    pub ragdoll_retarget_max: f32,
    /// Ground time before a stable fall gets up (s).
    pub ragdoll_settle_min: f32,
    /// Ground time before a fully unstable fall gets up (s).
    pub ragdoll_settle_max: f32,
    /// Fraction of impact speed kept when a ragdoll hits the ground.
    pub ragdoll_ground_bounce: f32,
    pub ragdoll_bounce_min_speed: f32,
    /// Horizontal speed kept through a ragdoll ground bounce.
    pub ragdoll_bounce_slide: f32,
    /// Joint velocity kick per 1000 px/s of ragdoll impact (rad per frame).
    pub ragdoll_landing_perturbation: f32,
    pub ragdoll_friction_multiplier: f32,
    /// Velocity gained per unit of knockdown force (px/s).
    pub ragdoll_impulse_scale: f32,
    /// Upward pop applied by a knockdown (px/s).
    pub ragdoll_lift: f32,

    // ========================================================================
    // Recovery
    // ========================================================================
    pub recovery_duration: f32,
    /// Recovery blend at the start of the get-up.
    pub recovery_blend_start: f32,
    /// Partial blend seeded at the start of the get-up.
    pub recovery_partial_blend: f32,
    /// Minimum footing fraction restored when the get-up finishes.
    pub recovery_footing_restore: f32,

    // ========================================================================
    // Knockback
    // ========================================================================
    /// Exponential horizontal damping while knockback is active (1/s).
    pub knockback_damping: f32,
    /// Input suppression at the start of a knockback window.
    pub knockback_input_suppression: f32,
    /// Extra timer drain per second while pushing against the knockback.
    pub knockback_escape_rate: f32,
    pub knockback_min_duration: f32,
    pub knockback_max_duration: f32,
    pub knockback_footing_regen_multiplier: f32,

    // ========================================================================
    // Reactions
    // ========================================================================
    /// Fade duration of the partial blend set by a knockdown (s).
    pub full_ragdoll_fade: f32,
    /// Joint velocity kick of a knockdown (rad per frame).
    pub ragdoll_perturbation: f32,
    pub hit_blend_min: f32,
    pub hit_blend_max: f32,
    pub hit_fade_min: f32,
    pub hit_fade_max: f32,
    /// Fraction of the knockdown impulse a stagger applies.
    pub hit_impulse_scale: f32,
    pub hit_perturbation: f32,
    /// Joint velocity per unit of spin force (rad per frame).
    pub spin_scale: f32,
    pub spin_blend_base: f32,
    pub spin_blend_max: f32,
    pub spin_fade: f32,

    // ========================================================================
    // Body collisions
    // ========================================================================
    pub collision_shares: CollisionShares,
    /// Vertical separation, as a fraction of the radius sum, below which
    /// grounded pairs resolve along x only.
    pub vertical_overlap_factor: f32,
    /// Fraction of approaching horizontal velocity removed per contact.
    pub horizontal_velocity_bleed: f32,
    /// Fraction of approaching normal velocity exchanged per circle contact.
    pub circle_velocity_transfer: f32,

    // ========================================================================
    // Global scalars
    // ========================================================================
    pub balance: BalanceScalars,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            // World
            gravity: 2400.0,
            jump_impulse: 1050.0,
            max_delta_time: 0.1,
            reference_span: 1800.0,

            // Locomotion
            acceleration: 3200.0,
            max_speed: 420.0,
            friction: 2800.0,
            air_drag: 0.6,
            restitution: 0.15,
            bounce_threshold: 240.0,
            charge_move_multiplier: 0.5,
            combat_walk_multiplier: 1.0,
            non_combat_walk_multiplier: 1.15,
            sneak_walk_multiplier: 0.45,

            // Body
            body_radius: 45.0,
            max_footing: 100.0,
            footing_regen_rate: 14.0,
            landed_impulse_decay: 8.0,

            // Joint springs
            normal_spring: SpringPreset::new(0.22, 0.72),
            ragdoll_spring: SpringPreset::new(0.05, 0.9),
            max_angular_velocity: 0.35,

            // Blend
            air_blend_min: 0.25,
            air_blend_max: 0.7,
            air_blend_speed_divisor: 1200.0,
            air_blend_rise_rate: 4.0,
            air_blend_land_rate: 18.0,

            // Ragdoll
            ragdoll_gravity_multiplier: 1.8,
            ragdoll_noise: 0.03,
            ragdoll_retarget_min: 0.25,
            ragdoll_retarget_max: 0.6,
            ragdoll_settle_min: 0.5,
            ragdoll_settle_max: 1.4,
            ragdoll_ground_bounce: 0.35,
            ragdoll_bounce_min_speed: 260.0,
            ragdoll_bounce_slide: 0.8,
            ragdoll_landing_perturbation: 0.25,
            ragdoll_friction_multiplier: 1.5,
            ragdoll_impulse_scale: 1.0,
            ragdoll_lift: 180.0,

            // Recovery
            recovery_duration: 0.6,
            recovery_blend_start: 0.75,
            recovery_partial_blend: 0.85,
            recovery_footing_restore: 0.35,

            // Knockback
            knockback_damping: 6.0,
            knockback_input_suppression: 0.85,
            knockback_escape_rate: 1.5,
            knockback_min_duration: 0.15,
            knockback_max_duration: 0.45,
            knockback_footing_regen_multiplier: 0.5,

            // Reactions
            full_ragdoll_fade: 0.6,
            ragdoll_perturbation: 0.3,
            hit_blend_min: 0.2,
            hit_blend_max: 0.85,
            hit_fade_min: 0.25,
            hit_fade_max: 0.7,
            hit_impulse_scale: 0.35,
            hit_perturbation: 0.18,
            spin_scale: 0.0008,
            spin_blend_base: 0.3,
            spin_blend_max: 0.6,
            spin_fade: 0.5,

            // Body collisions
            collision_shares: CollisionShares::default(),
            vertical_overlap_factor: 0.6,
            horizontal_velocity_bleed: 0.5,
            circle_velocity_transfer: 0.6,

            balance: BalanceScalars::default(),
        }
    }
}

/// Replace each listed field with its default when it is non-finite or
/// falls outside `[min, max]`.
macro_rules! sanitize_fields {
    ($cfg:ident, $defaults:ident, $min:expr, $max:expr, [$($field:ident),+ $(,)?]) => {
        $(
            if !($cfg.$field.is_finite() && $cfg.$field >= $min && $cfg.$field <= $max) {
                log::warn!(
                    "physics config: {} = {} is invalid, using {}",
                    stringify!($field),
                    $cfg.$field,
                    $defaults.$field
                );
                $cfg.$field = $defaults.$field;
            }
        )+
    };
}

impl PhysicsConfig {
    /// Lighter, snappier movement with short knockdowns.
    pub fn arcade() -> Self {
        Self {
            gravity: 2000.0,
            jump_impulse: 1150.0,
            acceleration: 4200.0,
            max_speed: 520.0,
            friction: 3600.0,
            ragdoll_settle_min: 0.35,
            ragdoll_settle_max: 0.9,
            recovery_duration: 0.45,
            knockback_max_duration: 0.35,
            ..Default::default()
        }
    }

    /// Slower, weightier movement with long knockdowns.
    pub fn heavy() -> Self {
        Self {
            gravity: 2800.0,
            jump_impulse: 950.0,
            acceleration: 2400.0,
            max_speed: 340.0,
            friction: 2200.0,
            ragdoll_gravity_multiplier: 2.0,
            ragdoll_settle_min: 0.8,
            ragdoll_settle_max: 2.0,
            recovery_duration: 0.9,
            knockback_max_duration: 0.6,
            ..Default::default()
        }
    }

    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: PhysicsConfig = toml::from_str(source)?;
        Ok(config.sanitized())
    }

    /// Read and parse a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    /// Copy of this config with every invalid value replaced by its default.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let cfg = &mut self;

        sanitize_fields!(cfg, defaults, 0.0, f32::MAX, [
            gravity,
            jump_impulse,
            acceleration,
            max_speed,
            friction,
            air_drag,
            bounce_threshold,
            charge_move_multiplier,
            combat_walk_multiplier,
            non_combat_walk_multiplier,
            sneak_walk_multiplier,
            body_radius,
            footing_regen_rate,
            landed_impulse_decay,
            max_angular_velocity,
            air_blend_speed_divisor,
            air_blend_rise_rate,
            air_blend_land_rate,
            ragdoll_gravity_multiplier,
            ragdoll_noise,
            ragdoll_retarget_min,
            ragdoll_retarget_max,
            ragdoll_settle_min,
            ragdoll_settle_max,
            ragdoll_bounce_min_speed,
            ragdoll_landing_perturbation,
            ragdoll_friction_multiplier,
            ragdoll_impulse_scale,
            ragdoll_lift,
            recovery_duration,
            knockback_damping,
            knockback_escape_rate,
            knockback_min_duration,
            knockback_max_duration,
            full_ragdoll_fade,
            ragdoll_perturbation,
            hit_fade_min,
            hit_fade_max,
            hit_impulse_scale,
            hit_perturbation,
            spin_scale,
            spin_fade,
        ]);

        sanitize_fields!(cfg, defaults, 0.0, 1.0, [
            restitution,
            ragdoll_ground_bounce,
            ragdoll_bounce_slide,
            air_blend_min,
            air_blend_max,
            recovery_blend_start,
            recovery_partial_blend,
            recovery_footing_restore,
            knockback_input_suppression,
            knockback_footing_regen_multiplier,
            hit_blend_min,
            hit_blend_max,
            spin_blend_base,
            spin_blend_max,
            vertical_overlap_factor,
            horizontal_velocity_bleed,
            circle_velocity_transfer,
        ]);

        sanitize_fields!(cfg, defaults, f32::MIN_POSITIVE, f32::MAX, [
            max_delta_time,
            reference_span,
            max_footing,
        ]);

        for (name, preset, default) in [
            ("normal_spring", &mut cfg.normal_spring, defaults.normal_spring),
            ("ragdoll_spring", &mut cfg.ragdoll_spring, defaults.ragdoll_spring),
        ] {
            let valid = preset.stiffness.is_finite()
                && (0.0..=1.0).contains(&preset.stiffness)
                && preset.damping.is_finite()
                && preset.damping > 0.0
                && preset.damping <= 1.0;
            if !valid {
                log::warn!("physics config: {name} = {preset:?} is invalid, using {default:?}");
                *preset = default;
            }
        }

        // Paired ranges must stay ordered.
        if cfg.ragdoll_retarget_max < cfg.ragdoll_retarget_min {
            cfg.ragdoll_retarget_max = cfg.ragdoll_retarget_min;
        }
        if cfg.ragdoll_settle_max < cfg.ragdoll_settle_min {
            cfg.ragdoll_settle_max = cfg.ragdoll_settle_min;
        }
        if cfg.knockback_max_duration < cfg.knockback_min_duration {
            cfg.knockback_max_duration = cfg.knockback_min_duration;
        }
        if cfg.air_blend_max < cfg.air_blend_min {
            cfg.air_blend_max = cfg.air_blend_min;
        }
        if cfg.hit_blend_max < cfg.hit_blend_min {
            cfg.hit_blend_max = cfg.hit_blend_min;
        }
        if cfg.hit_fade_max < cfg.hit_fade_min {
            cfg.hit_fade_max = cfg.hit_fade_min;
        }

        let shares = &mut cfg.collision_shares;
        for (value, default) in [
            (&mut shares.player, defaults.collision_shares.player),
            (&mut shares.npc, defaults.collision_shares.npc),
            (&mut shares.staggered, defaults.collision_shares.staggered),
            (&mut shares.recovering, defaults.collision_shares.recovering),
        ] {
            if !(value.is_finite() && *value > 0.0) {
                *value = default;
            }
        }
        if !(shares.stagger_threshold.is_finite() && (0.0..=1.0).contains(&shares.stagger_threshold)) {
            shares.stagger_threshold = defaults.collision_shares.stagger_threshold;
        }

        let balance = &mut cfg.balance;
        if !(balance.base_movement_speed.is_finite() && balance.base_movement_speed >= 0.0) {
            balance.base_movement_speed = 1.0;
        }
        if !(balance.base_recovery_rate.is_finite() && balance.base_recovery_rate >= 0.0) {
            balance.base_recovery_rate = 1.0;
        }

        self
    }

    /// Movement scale for a given play-area width, kept within [0.5, 2].
    pub fn span_scale(&self, bounds_width: f32) -> f32 {
        if !(bounds_width.is_finite() && bounds_width > 0.0) {
            return 1.0;
        }
        (bounds_width / self.reference_span).clamp(0.5, 2.0)
    }

    /// Retargeting interval range as `(min, max)` seconds.
    pub fn retarget_interval(&self) -> (f32, f32) {
        (self.ragdoll_retarget_min, self.ragdoll_retarget_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PhysicsConfig::default();
        assert!(config.gravity > 0.0);
        assert!(config.body_radius > 0.0);
        assert!(config.max_footing > 0.0);
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn presets_are_valid() {
        for config in [PhysicsConfig::arcade(), PhysicsConfig::heavy()] {
            assert_eq!(config.clone().sanitized(), config);
        }
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let config = PhysicsConfig::from_toml_str("gravity = 1800.0\nmax_speed = 300.0\n")
            .expect("valid toml");
        assert_eq!(config.gravity, 1800.0);
        assert_eq!(config.max_speed, 300.0);
        assert_eq!(config.friction, PhysicsConfig::default().friction);
    }

    #[test]
    fn nested_tables_parse() {
        let source = r#"
            [normal_spring]
            stiffness = 0.3
            damping = 0.8

            [collision_shares]
            player = 2.0
        "#;
        let config = PhysicsConfig::from_toml_str(source).expect("valid toml");
        assert_eq!(config.normal_spring, SpringPreset::new(0.3, 0.8));
        assert_eq!(config.collision_shares.player, 2.0);
        assert_eq!(config.collision_shares.npc, CollisionShares::default().npc);
    }

    #[test]
    fn invalid_values_are_replaced() {
        let defaults = PhysicsConfig::default();
        let config = PhysicsConfig {
            gravity: f32::NAN,
            restitution: 3.0,
            max_footing: 0.0,
            ragdoll_spring: SpringPreset::new(0.1, 0.0),
            ragdoll_settle_min: 2.0,
            ragdoll_settle_max: 1.0,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.gravity, defaults.gravity);
        assert_eq!(config.restitution, defaults.restitution);
        assert_eq!(config.max_footing, defaults.max_footing);
        assert_eq!(config.ragdoll_spring, defaults.ragdoll_spring);
        assert!(config.ragdoll_settle_max >= config.ragdoll_settle_min);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let result = PhysicsConfig::from_toml_str("gravity = [");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn span_scale_is_bounded() {
        let config = PhysicsConfig::default();
        assert_eq!(config.span_scale(config.reference_span), 1.0);
        assert_eq!(config.span_scale(1.0), 0.5);
        assert_eq!(config.span_scale(1.0e6), 2.0);
        assert_eq!(config.span_scale(f32::NAN), 1.0);
    }

    #[test]
    fn stat_profile_sanitizes() {
        let stats = StatProfile {
            movement_speed_multiplier: f32::NAN,
            footing_recovery_multiplier: -1.0,
            animation_duration_multiplier: 2.0,
        }
        .sanitized();
        assert_eq!(stats.movement_speed_multiplier, 1.0);
        assert_eq!(stats.footing_recovery_multiplier, 1.0);
        assert_eq!(stats.animation_duration_multiplier, 2.0);
    }
}
