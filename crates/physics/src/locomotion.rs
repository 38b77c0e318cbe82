//! Per-fighter locomotion and world collision.
//!
//! [`FighterController::update`] advances one fighter by one step:
//!
//! 1. Gravity (heavier while ragdolled)
//! 2. Knockback timer, damping and input suppression
//! 3. Horizontal input, jump, friction and drag
//! 4. Position integration and horizontal bounds
//! 5. Platform and ground collision
//! 6. Ragdoll → recovering → normal transitions
//! 7. Footing regeneration
//! 8. Blend update and joint integration
//!
//! The landing impulse decays at the start of the step so a landing recorded
//! this step is reported at full strength.

use glam::Vec2;

use crate::blend::update_blends;
use crate::bounds::PlayBounds;
use crate::config::PhysicsConfig;
use crate::fighter::{Fighter, LifecyclePhase};
use crate::input::{AttackPhase, FighterInput, WalkMode};
use crate::math::{lerp, move_towards};
use crate::random::RandomSource;
use crate::spring::{integrate_joints, perturb_joints};
use crate::stage::{Stage, SurfaceMaterial};

/// Tolerance when testing whether a fighter was above a surface last step.
const SURFACE_EPSILON: f32 = 0.5;

/// Shortest get-up the controller will run (s).
const MIN_RECOVERY_DURATION: f32 = 0.05;

/// Which surface stopped a fall this step.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Landing {
    Platform(SurfaceMaterial),
    Ground,
}

/// Fighter movement controller.
///
/// # Example
///
/// ```ignore
/// let controller = FighterController::new(PhysicsConfig::default());
/// // Each frame, for each fighter:
/// controller.update(&mut fighter, &input, &stage, &mut rng, delta_time);
/// ```
#[derive(Debug, Clone)]
pub struct FighterController {
    pub config: PhysicsConfig,
}

impl FighterController {
    /// Create a controller; the configuration is sanitized first.
    pub fn new(config: PhysicsConfig) -> Self {
        Self {
            config: config.sanitized(),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new(PhysicsConfig::default())
    }

    /// Update one fighter for one step.
    pub fn update(
        &self,
        fighter: &mut Fighter,
        input: &FighterInput,
        stage: &Stage,
        rng: &mut impl RandomSource,
        delta_time: f32,
    ) {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return;
        }
        let delta_time = delta_time.min(self.config.max_delta_time);

        let bounds = stage.bounds();
        let ground_y = stage.ground_y();
        if fighter.sanitize(Vec2::new(bounds.center(), ground_y)) {
            log::warn!("fighter {:?}: reset non-finite physics state", fighter.id);
        }

        if fighter.ragdoll && fighter.previous_phase != LifecyclePhase::Ragdoll {
            self.begin_knockdown(fighter);
        }

        let was_on_ground = fighter.on_ground;
        let previous_y = fighter.position.y;

        self.decay_landed_impulse(fighter, delta_time);
        self.apply_gravity(fighter, delta_time);
        let input_scale = self.update_knockback(fighter, input, delta_time);
        self.horizontal_move(fighter, input, input_scale, &bounds, delta_time);
        self.integrate_position(fighter, &bounds, delta_time);
        self.resolve_vertical(fighter, stage, previous_y, was_on_ground, rng);
        self.update_lifecycle(fighter, delta_time);
        self.regenerate_footing(fighter, delta_time);

        update_blends(fighter, &self.config, delta_time);
        integrate_joints(fighter, &self.config, rng, delta_time);

        fighter.previous_phase = fighter.phase();
    }

    /// Combined multiplier applied to acceleration, max speed and friction.
    pub fn movement_scale(&self, fighter: &Fighter, bounds: &PlayBounds) -> f32 {
        let stats = fighter.stats.sanitized();
        let walk = match fighter.walk_mode {
            WalkMode::Combat => self.config.combat_walk_multiplier,
            WalkMode::NonCombat => self.config.non_combat_walk_multiplier,
            WalkMode::Sneak => self.config.sneak_walk_multiplier,
        };
        self.config.span_scale(bounds.width())
            * stats.movement_speed_multiplier
            * self.config.balance.base_movement_speed
            * walk
    }

    /// Ground time a knockdown needs before the get-up starts.
    pub fn settle_duration(&self, fighter: &Fighter) -> f32 {
        let instability = if fighter.max_footing > 0.0 {
            1.0 - (fighter.footing_at_fall / fighter.max_footing).clamp(0.0, 1.0)
        } else {
            1.0
        };
        lerp(
            self.config.ragdoll_settle_min,
            self.config.ragdoll_settle_max,
            instability,
        )
    }

    // ========================================================================
    // Forces
    // ========================================================================

    fn decay_landed_impulse(&self, fighter: &mut Fighter, delta_time: f32) {
        fighter.landed_impulse *= (-self.config.landed_impulse_decay * delta_time).exp();
        if fighter.landed_impulse < 1e-3 {
            fighter.landed_impulse = 0.0;
        }
    }

    fn apply_gravity(&self, fighter: &mut Fighter, delta_time: f32) {
        // Recovery pins the fighter to its support.
        if fighter.recovering {
            fighter.velocity.y = 0.0;
            return;
        }
        let default_scale = if fighter.ragdoll {
            self.config.ragdoll_gravity_multiplier
        } else {
            1.0
        };
        let scale = fighter
            .gravity_scale
            .filter(|s| s.is_finite())
            .unwrap_or(default_scale);
        fighter.velocity.y += self.config.gravity * scale * delta_time;
    }

    /// Tick the knockback window and return the input control factor.
    fn update_knockback(&self, fighter: &mut Fighter, input: &FighterInput, delta_time: f32) -> f32 {
        let knockback = &mut fighter.knockback;
        if !knockback.is_active() {
            return 1.0;
        }

        let push = input.horizontal();
        let mut drain = delta_time;
        if push != 0.0 && knockback.direction != 0.0 && push != knockback.direction {
            drain += delta_time * self.config.knockback_escape_rate;
        }
        knockback.timer = (knockback.timer - drain).max(0.0);

        fighter.velocity.x *= (-self.config.knockback_damping * delta_time).exp();

        1.0 - knockback.remaining_fraction() * self.config.knockback_input_suppression
    }

    // ========================================================================
    // Horizontal movement
    // ========================================================================

    fn horizontal_move(
        &self,
        fighter: &mut Fighter,
        input: &FighterInput,
        input_scale: f32,
        bounds: &PlayBounds,
        delta_time: f32,
    ) {
        let has_control = fighter.alive
            && !fighter.ragdoll
            && !fighter.recovering
            && input.attack_phase.allows_movement();

        let scale = self.movement_scale(fighter, bounds);
        let charge = if input.attack_phase == AttackPhase::Charge {
            self.config.charge_move_multiplier
        } else {
            1.0
        };
        let acceleration = self.config.acceleration * scale * charge;
        let max_speed = self.config.max_speed * scale * charge;
        let friction = self.config.friction * scale;

        let direction = if has_control { input.horizontal() } else { 0.0 };

        if direction != 0.0 {
            let wish_speed = max_speed * input_scale;
            let current_speed = fighter.velocity.x * direction;
            let add_speed = wish_speed - current_speed;
            if add_speed > 0.0 {
                let accel_speed = (acceleration * input_scale * delta_time).min(add_speed);
                fighter.velocity.x += direction * accel_speed;
            }
        } else if fighter.on_ground {
            let friction = if fighter.ragdoll {
                friction * self.config.ragdoll_friction_multiplier
            } else {
                friction
            };
            fighter.velocity.x = move_towards(fighter.velocity.x, 0.0, friction * delta_time);
        } else {
            fighter.velocity.x *= (-self.config.air_drag * delta_time).exp();
        }

        if has_control && input.wants_jump() && fighter.on_ground {
            fighter.velocity.y = -self.config.jump_impulse;
            fighter.on_ground = false;
            log::trace!("fighter {:?}: jump", fighter.id);
        }
    }

    fn integrate_position(&self, fighter: &mut Fighter, bounds: &PlayBounds, delta_time: f32) {
        fighter.position += fighter.velocity * delta_time;

        let clamped = bounds.clamp(fighter.position.x);
        if clamped != fighter.position.x {
            // Kill velocity pushing further out.
            if (clamped <= bounds.min_x && fighter.velocity.x < 0.0)
                || (clamped >= bounds.max_x && fighter.velocity.x > 0.0)
            {
                fighter.velocity.x = 0.0;
            }
            fighter.position.x = clamped;
        }
    }

    // ========================================================================
    // Vertical collision
    // ========================================================================

    fn resolve_vertical(
        &self,
        fighter: &mut Fighter,
        stage: &Stage,
        previous_y: f32,
        was_on_ground: bool,
        rng: &mut impl RandomSource,
    ) {
        let ground_y = stage.ground_y();
        let body_height = fighter.body_radius() * 2.0;
        fighter.on_ground = false;

        let mut landing = None;

        for platform in stage.solid_platforms() {
            if !platform.spans(fighter.position.x) {
                continue;
            }
            let top = platform.top(ground_y);
            let bottom = platform.bottom(ground_y);

            if fighter.velocity.y >= 0.0
                && previous_y <= top + SURFACE_EPSILON
                && fighter.position.y >= top
            {
                fighter.position.y = top;
                fighter.support_y = top;
                self.land(fighter, was_on_ground, false, rng);
                landing = Some(Landing::Platform(platform.material));
                break;
            }

            let head = fighter.position.y - body_height;
            let previous_head = previous_y - body_height;
            if fighter.velocity.y < 0.0
                && previous_head >= bottom - SURFACE_EPSILON
                && head < bottom
            {
                fighter.position.y = bottom + body_height;
                fighter.velocity.y = 0.0;
            }
        }

        if landing.is_none() && fighter.position.y >= ground_y {
            fighter.position.y = ground_y;
            fighter.support_y = ground_y;
            self.land(fighter, was_on_ground, true, rng);
            landing = Some(Landing::Ground);
        }

        // Platform this step, else ground this step, else keep the last one.
        match landing {
            Some(Landing::Platform(material)) => fighter.surface_material = Some(material),
            Some(Landing::Ground) => fighter.surface_material = Some(stage.ground_material),
            None => {}
        }
    }

    /// Resolve a downward contact: record the impact and bounce or stick.
    fn land(
        &self,
        fighter: &mut Fighter,
        was_on_ground: bool,
        is_ground: bool,
        rng: &mut impl RandomSource,
    ) {
        let impact = fighter.velocity.y.max(0.0);
        if !was_on_ground {
            fighter.landed_impulse = fighter.landed_impulse.max(impact);
        }

        if fighter.ragdoll && is_ground && impact > self.config.ragdoll_bounce_min_speed {
            fighter.velocity.y = -impact * self.config.ragdoll_ground_bounce;
            fighter.velocity.x *= self.config.ragdoll_bounce_slide;
            let kick = self.config.ragdoll_landing_perturbation * impact / 1000.0;
            perturb_joints(&mut fighter.physics, kick, rng);
            return;
        }

        let rebound = impact * self.config.restitution;
        if rebound > self.config.bounce_threshold {
            fighter.velocity.y = -rebound;
        } else {
            fighter.velocity.y = 0.0;
            fighter.on_ground = true;
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    fn update_lifecycle(&self, fighter: &mut Fighter, delta_time: f32) {
        if fighter.ragdoll {
            fighter.ragdoll_time += delta_time;
            if fighter.on_ground && fighter.ragdoll_time >= self.settle_duration(fighter) {
                self.begin_recovery(fighter);
            }
        } else if fighter.recovering {
            fighter.recovery_elapsed += delta_time;
            let t = (fighter.recovery_elapsed / fighter.recovery_duration).clamp(0.0, 1.0);
            fighter.position.y = fighter.support_y;
            fighter.velocity.y = 0.0;
            fighter.on_ground = true;
            if t >= 1.0 {
                self.finish_recovery(fighter);
            }
        }
    }

    /// Start a knockdown's bookkeeping on the first step spent ragdolled.
    fn begin_knockdown(&self, fighter: &mut Fighter) {
        fighter.ragdoll_time = 0.0;
        fighter.footing_at_fall = fighter.footing;
        fighter.recovering = false;
        fighter.recovery_elapsed = 0.0;
        fighter.physics.recovery_pose = None;
        log::debug!(
            "fighter {:?}: {:?} -> ragdoll, footing {:.1}",
            fighter.id,
            fighter.previous_phase,
            fighter.footing
        );
    }

    /// The get-up only starts once the fighter rests on a surface, so the
    /// position is already resolved onto `support_y` and stays pinned there.
    fn begin_recovery(&self, fighter: &mut Fighter) {
        let duration = (self.config.recovery_duration
            * fighter.stats.sanitized().animation_duration_multiplier)
            .max(MIN_RECOVERY_DURATION);

        fighter.ragdoll = false;
        fighter.recovering = true;
        fighter.recovery_elapsed = 0.0;
        fighter.recovery_duration = duration;
        fighter.physics.recovery_pose = Some(fighter.physics.joint_angle);
        fighter
            .physics
            .partial
            .set(self.config.recovery_partial_blend, duration);

        log::debug!(
            "fighter {:?}: ragdoll -> recovering after {:.2}s",
            fighter.id,
            fighter.ragdoll_time
        );
        fighter.ragdoll_time = 0.0;
    }

    fn finish_recovery(&self, fighter: &mut Fighter) {
        fighter.recovering = false;
        fighter.recovery_elapsed = 0.0;
        fighter.physics.recovery_pose = None;
        fighter.position.y = fighter.support_y;

        let restored = fighter.max_footing * self.config.recovery_footing_restore;
        fighter.footing = fighter.footing.max(restored).min(fighter.max_footing);

        log::debug!(
            "fighter {:?}: recovering -> normal, footing {:.1}/{:.1}",
            fighter.id,
            fighter.footing,
            fighter.max_footing
        );
    }

    fn regenerate_footing(&self, fighter: &mut Fighter, delta_time: f32) {
        if !fighter.on_ground || fighter.ragdoll {
            return;
        }
        let mut rate = self.config.footing_regen_rate
            * fighter.stats.sanitized().footing_recovery_multiplier
            * self.config.balance.base_recovery_rate;
        if fighter.knockback.is_active() {
            rate *= self.config.knockback_footing_regen_multiplier;
        }
        fighter.footing = (fighter.footing + rate * delta_time).min(fighter.max_footing);
    }
}

impl Default for FighterController {
    fn default() -> Self {
        Self::with_default_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::FighterId;
    use crate::input::InputButtons;
    use crate::random::SequenceRandom;
    use crate::stage::Platform;
    use approx::assert_abs_diff_eq;

    const DT: f32 = 1.0 / 60.0;
    const GROUND: f32 = 500.0;

    fn stage() -> Stage {
        Stage::flat(GROUND, PlayBounds::new(0.0, 1800.0))
    }

    fn grounded(controller: &FighterController, x: f32) -> Fighter {
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(x, GROUND), &controller.config);
        fighter.on_ground = true;
        fighter
    }

    fn run(
        controller: &FighterController,
        fighter: &mut Fighter,
        input: FighterInput,
        stage: &Stage,
        frames: usize,
    ) {
        let mut rng = SequenceRandom::centered();
        for _ in 0..frames {
            controller.update(fighter, &input, stage, &mut rng, DT);
        }
    }

    #[test]
    fn test_gravity() {
        let controller = FighterController::default();
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(100.0, 0.0), &controller.config);
        run(&controller, &mut fighter, FighterInput::default(), &stage(), 1);
        assert!(fighter.velocity.y > 0.0, "Should be falling");
        assert!(!fighter.on_ground);
    }

    #[test]
    fn ragdoll_falls_heavier() {
        let controller = FighterController::default();
        let stage = stage();
        let mut normal = Fighter::new(FighterId(1), Vec2::new(100.0, 0.0), &controller.config);
        let mut ragdoll = normal.clone();
        ragdoll.ragdoll = true;
        run(&controller, &mut normal, FighterInput::default(), &stage, 1);
        run(&controller, &mut ragdoll, FighterInput::default(), &stage, 1);
        assert_abs_diff_eq!(
            ragdoll.velocity.y / normal.velocity.y,
            controller.config.ragdoll_gravity_multiplier,
            epsilon = 1e-4
        );
    }

    #[test]
    fn gravity_override_wins() {
        let controller = FighterController::default();
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(100.0, 0.0), &controller.config)
            .with_gravity_scale(0.5);
        fighter.ragdoll = true;
        run(&controller, &mut fighter, FighterInput::default(), &stage(), 1);
        assert_abs_diff_eq!(
            fighter.velocity.y,
            controller.config.gravity * 0.5 * DT,
            epsilon = 1e-3
        );
    }

    #[test]
    fn standing_fighter_stays_grounded() {
        let controller = FighterController::default();
        let mut fighter = grounded(&controller, 400.0);
        run(&controller, &mut fighter, FighterInput::default(), &stage(), 120);
        assert!(fighter.on_ground);
        assert_eq!(fighter.position.y, GROUND);
        assert_eq!(fighter.velocity.y, 0.0);
        assert_eq!(fighter.surface_material, Some(SurfaceMaterial::Stone));
    }

    #[test]
    fn input_accelerates_to_max_speed() {
        let controller = FighterController::default();
        let mut fighter = grounded(&controller, 400.0);
        run(
            &controller,
            &mut fighter,
            FighterInput::held(InputButtons::RIGHT),
            &stage(),
            120,
        );
        let max_speed = controller.config.max_speed;
        assert_abs_diff_eq!(fighter.velocity.x, max_speed, epsilon = 1e-2);
        assert!(fighter.position.x > 400.0);
    }

    #[test]
    fn friction_stops_without_input() {
        let controller = FighterController::default();
        let mut fighter = grounded(&controller, 400.0);
        fighter.velocity.x = 300.0;
        run(&controller, &mut fighter, FighterInput::default(), &stage(), 60);
        assert_eq!(fighter.velocity.x, 0.0);
    }

    #[test]
    fn sneak_is_slower_than_combat() {
        let controller = FighterController::default();
        let stage = stage();
        let mut combat = grounded(&controller, 400.0);
        let mut sneak = grounded(&controller, 400.0);
        sneak.walk_mode = WalkMode::Sneak;
        let input = FighterInput::held(InputButtons::RIGHT);
        run(&controller, &mut combat, input, &stage, 120);
        run(&controller, &mut sneak, input, &stage, 120);
        assert!(sneak.velocity.x < combat.velocity.x);
    }

    #[test]
    fn movement_scales_with_play_area() {
        let controller = FighterController::default();
        let fighter = grounded(&controller, 400.0);
        let narrow = controller.movement_scale(&fighter, &PlayBounds::new(0.0, 900.0));
        let wide = controller.movement_scale(&fighter, &PlayBounds::new(0.0, 1800.0));
        assert_abs_diff_eq!(narrow, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(wide, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn attack_phases_gate_movement() {
        let controller = FighterController::default();
        let stage = stage();

        let mut attacking = grounded(&controller, 400.0);
        let input = FighterInput::new(InputButtons::RIGHT, AttackPhase::Active);
        run(&controller, &mut attacking, input, &stage, 30);
        assert_eq!(attacking.velocity.x, 0.0);

        let mut charging = grounded(&controller, 400.0);
        let input = FighterInput::new(InputButtons::RIGHT, AttackPhase::Charge);
        run(&controller, &mut charging, input, &stage, 120);
        assert_abs_diff_eq!(
            charging.velocity.x,
            controller.config.max_speed * controller.config.charge_move_multiplier,
            epsilon = 1e-2
        );
    }

    #[test]
    fn knockback_suppresses_input() {
        let controller = FighterController::default();
        let stage = stage();
        let input = FighterInput::held(InputButtons::RIGHT);

        let mut free = grounded(&controller, 400.0);
        let mut knocked = grounded(&controller, 400.0);
        knocked.knockback.arm(0.4, 100.0, 1.0);

        run(&controller, &mut free, input, &stage, 3);
        run(&controller, &mut knocked, input, &stage, 3);
        assert!(knocked.velocity.x < free.velocity.x);
    }

    #[test]
    fn pushing_against_knockback_escapes_sooner() {
        let controller = FighterController::default();
        let stage = stage();

        let mut along = grounded(&controller, 400.0);
        along.knockback.arm(0.4, 100.0, 1.0);
        let mut against = along.clone();

        run(&controller, &mut along, FighterInput::held(InputButtons::RIGHT), &stage, 6);
        run(&controller, &mut against, FighterInput::held(InputButtons::LEFT), &stage, 6);
        assert!(against.knockback.timer < along.knockback.timer);
    }

    #[test]
    fn knockback_damps_harder_than_friction() {
        let controller = FighterController::default();
        let stage = stage();

        let mut free = grounded(&controller, 400.0);
        free.velocity.x = 800.0;
        let mut knocked = free.clone();
        knocked.knockback.arm(0.4, 100.0, 1.0);

        run(&controller, &mut free, FighterInput::default(), &stage, 5);
        run(&controller, &mut knocked, FighterInput::default(), &stage, 5);
        assert!(knocked.velocity.x < free.velocity.x);
    }

    #[test]
    fn jump_leaves_ground() {
        let controller = FighterController::default();
        let mut fighter = grounded(&controller, 400.0);
        run(&controller, &mut fighter, FighterInput::held(InputButtons::JUMP), &stage(), 1);
        assert!(fighter.velocity.y < 0.0);
        assert!(!fighter.on_ground);
        assert!(fighter.position.y < GROUND);
    }

    #[test]
    fn bounds_clamp_position() {
        let controller = FighterController::default();
        let mut fighter = grounded(&controller, 1795.0);
        fighter.velocity.x = 2000.0;
        run(&controller, &mut fighter, FighterInput::held(InputButtons::RIGHT), &stage(), 10);
        assert_eq!(fighter.position.x, 1800.0);
        assert!(stage().bounds().contains(fighter.position.x));
    }

    #[test]
    fn lands_on_platform_from_above() {
        let controller = FighterController::default();
        let stage = stage().with_platform(
            Platform::new(300.0, 200.0, 150.0, 20.0).with_material(SurfaceMaterial::Wood),
        );
        let top = GROUND - 150.0;
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(400.0, top - 100.0), &controller.config);

        run(&controller, &mut fighter, FighterInput::default(), &stage, 60);
        assert!(fighter.on_ground);
        assert_eq!(fighter.position.y, top);
        assert_eq!(fighter.surface_material, Some(SurfaceMaterial::Wood));
        assert!(fighter.landed_impulse > 0.0);
    }

    #[test]
    fn platform_blocks_from_below() {
        let controller = FighterController::default();
        let stage = stage().with_platform(Platform::new(300.0, 200.0, 150.0, 20.0));
        let bottom = GROUND - 150.0 + 20.0;
        let mut fighter = grounded(&controller, 400.0);

        run(&controller, &mut fighter, FighterInput::held(InputButtons::JUMP), &stage, 30);
        let head = fighter.position.y - fighter.body_radius() * 2.0;
        assert!(head >= bottom - 1e-3, "head passed through platform: {head} < {bottom}");
    }

    #[test]
    fn walking_off_platform_falls() {
        let controller = FighterController::default();
        let stage = stage().with_platform(Platform::new(300.0, 200.0, 150.0, 20.0));
        let top = GROUND - 150.0;
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(495.0, top), &controller.config);
        fighter.on_ground = true;

        run(&controller, &mut fighter, FighterInput::held(InputButtons::RIGHT), &stage, 120);
        assert_eq!(fighter.position.y, GROUND);
        assert_eq!(fighter.surface_material, Some(SurfaceMaterial::Stone));
    }

    #[test]
    fn degenerate_platform_is_ignored() {
        let controller = FighterController::default();
        let stage = stage().with_platform(Platform::new(300.0, 0.0, 150.0, 20.0));
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(300.0, 0.0), &controller.config);
        run(&controller, &mut fighter, FighterInput::default(), &stage, 120);
        assert_eq!(fighter.position.y, GROUND);
    }

    #[test]
    fn ragdoll_bounces_on_ground() {
        let controller = FighterController::default();
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(400.0, GROUND - 1.0), &controller.config);
        fighter.ragdoll = true;
        fighter.velocity.y = 1000.0;

        run(&controller, &mut fighter, FighterInput::default(), &stage(), 1);
        assert!(fighter.velocity.y < 0.0);
        assert!(!fighter.on_ground);
        assert!(fighter.landed_impulse >= 1000.0);
    }

    /// Step a knocked-down fighter until it is back to normal.
    ///
    /// Returns the seconds spent ragdolled.
    fn run_knockdown(controller: &FighterController, fighter: &mut Fighter, stage: &Stage) -> f32 {
        let mut rng = SequenceRandom::centered();
        let input = FighterInput::default();
        let mut ragdolled = 0.0;
        for _ in 0..1200 {
            if fighter.ragdoll {
                ragdolled += DT;
            }
            controller.update(fighter, &input, stage, &mut rng, DT);
            match fighter.phase() {
                LifecyclePhase::Ragdoll => {}
                LifecyclePhase::Recovering => {
                    assert_eq!(fighter.position.y, fighter.support_y);
                    assert_eq!(fighter.ragdoll_time, 0.0);
                }
                LifecyclePhase::Normal => return ragdolled,
            }
        }
        panic!("fighter never recovered");
    }

    #[test]
    fn repeated_knockdowns_each_settle() {
        let controller = FighterController::default();
        let stage = stage();
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(400.0, 200.0), &controller.config);
        fighter.footing = 0.0;
        fighter.ragdoll = true;
        run_knockdown(&controller, &mut fighter, &stage);

        let footing = fighter.footing;
        fighter.position.y = 200.0;
        fighter.on_ground = false;
        fighter.ragdoll = true;

        // First step opens the knockdown: timer reset, footing captured.
        let mut rng = SequenceRandom::centered();
        controller.update(&mut fighter, &FighterInput::default(), &stage, &mut rng, DT);
        assert_abs_diff_eq!(fighter.ragdoll_time, DT, epsilon = 1e-6);
        assert_eq!(fighter.footing_at_fall, footing);

        let settle = controller.settle_duration(&fighter);
        let ragdolled = DT + run_knockdown(&controller, &mut fighter, &stage);
        assert!(
            ragdolled >= settle - 1e-4,
            "got up after {ragdolled}s, settle is {settle}s"
        );
    }

    #[test]
    fn dead_fighter_ignores_input() {
        let controller = FighterController::default();
        let mut fighter = grounded(&controller, 400.0);
        fighter.alive = false;
        let input = FighterInput::held(InputButtons::RIGHT | InputButtons::JUMP);
        run(&controller, &mut fighter, input, &stage(), 30);
        assert_eq!(fighter.velocity.x, 0.0);
        assert_eq!(fighter.position, Vec2::new(400.0, GROUND));
        assert!(fighter.on_ground);
    }

    #[test]
    fn ragdoll_recovers_and_restores_footing() {
        let controller = FighterController::default();
        let stage = stage();
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(400.0, 200.0), &controller.config);
        fighter.ragdoll = true;
        fighter.footing = 0.0;
        fighter.footing_at_fall = 0.0;

        let mut rng = SequenceRandom::centered();
        let input = FighterInput::default();
        let mut saw_recovering = false;
        for _ in 0..600 {
            controller.update(&mut fighter, &input, &stage, &mut rng, DT);
            if fighter.recovering {
                saw_recovering = true;
                assert!(!fighter.ragdoll);
            }
            if saw_recovering && !fighter.recovering {
                break;
            }
        }

        assert!(saw_recovering);
        assert!(!fighter.ragdoll);
        assert!(!fighter.recovering);
        assert!(fighter.footing >= 0.3 * fighter.max_footing);
        assert_eq!(fighter.position.y, GROUND);
    }

    #[test]
    fn settle_duration_scales_with_instability() {
        let controller = FighterController::default();
        let mut fighter = grounded(&controller, 0.0);
        fighter.footing_at_fall = fighter.max_footing;
        assert_abs_diff_eq!(
            controller.settle_duration(&fighter),
            controller.config.ragdoll_settle_min,
            epsilon = 1e-6
        );
        fighter.footing_at_fall = 0.0;
        assert_abs_diff_eq!(
            controller.settle_duration(&fighter),
            controller.config.ragdoll_settle_max,
            epsilon = 1e-6
        );
    }

    #[test]
    fn footing_regenerates_slower_in_knockback() {
        let controller = FighterController::default();
        let stage = stage();
        let mut calm = grounded(&controller, 400.0);
        calm.footing = 10.0;
        let mut knocked = calm.clone();
        knocked.knockback.arm(10.0, 1.0, 1.0);

        run(&controller, &mut calm, FighterInput::default(), &stage, 30);
        run(&controller, &mut knocked, FighterInput::default(), &stage, 30);
        let calm_gain = calm.footing - 10.0;
        let knocked_gain = knocked.footing - 10.0;
        assert_abs_diff_eq!(knocked_gain, calm_gain * 0.5, epsilon = 1e-3);
    }

    #[test]
    fn landed_impulse_decays() {
        let controller = FighterController::default();
        let mut fighter = grounded(&controller, 400.0);
        fighter.landed_impulse = 900.0;
        run(&controller, &mut fighter, FighterInput::default(), &stage(), 1);
        assert!(fighter.landed_impulse < 900.0);
        run(&controller, &mut fighter, FighterInput::default(), &stage(), 600);
        assert_eq!(fighter.landed_impulse, 0.0);
    }

    #[test]
    fn non_finite_state_is_reset() {
        let controller = FighterController::default();
        let mut fighter = grounded(&controller, 400.0);
        fighter.position.x = f32::NAN;
        fighter.velocity = Vec2::new(f32::INFINITY, f32::NAN);
        run(&controller, &mut fighter, FighterInput::default(), &stage(), 1);
        assert!(fighter.position.is_finite());
        assert!(fighter.velocity.is_finite());
        assert_eq!(fighter.position.x, stage().bounds().center());
    }

    #[test]
    fn invalid_delta_time_is_skipped() {
        let controller = FighterController::default();
        let mut fighter = Fighter::new(FighterId(1), Vec2::new(400.0, 0.0), &controller.config);
        let before = fighter.clone();
        let mut rng = SequenceRandom::centered();
        for dt in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            controller.update(&mut fighter, &FighterInput::default(), &stage(), &mut rng, dt);
        }
        assert_eq!(fighter, before);
    }
}
