//! Fighter roster and per-frame ordering.
//!
//! Each [`Simulation::tick`] runs two passes in a fixed order:
//!
//! 1. Per-fighter locomotion, world collision and joint integration, in
//!    roster order.
//! 2. Pairwise body collisions over the whole roster.
//!
//! The roster is a `Vec` in insertion order and every random draw comes from
//! the simulation's own generator, so the same seed and input sequence always
//! produce the same result.

use glam::Vec2;

use crate::config::PhysicsConfig;
use crate::contact::resolve_body_collisions;
use crate::fighter::{Fighter, FighterId, FighterIdGenerator};
use crate::input::FighterInput;
use crate::joint::JointPose;
use crate::locomotion::FighterController;
use crate::random::{RandomSource, SeededRandom};
use crate::reaction::{self, HitImpulse, HitReaction, SpinImpulse};
use crate::stage::Stage;

/// The physics simulation for one stage.
#[derive(Debug, Clone)]
pub struct Simulation<R: RandomSource = SeededRandom> {
    frame: u32,
    controller: FighterController,
    stage: Stage,
    fighters: Vec<Fighter>,
    rng: R,
    ids: FighterIdGenerator,
}

impl Simulation {
    /// Create a simulation driven by a [`SeededRandom`].
    pub fn new(config: PhysicsConfig, stage: Stage, seed: u32) -> Self {
        Self::with_rng(config, stage, SeededRandom::new(seed))
    }
}

impl<R: RandomSource> Simulation<R> {
    /// Create a simulation drawing from `rng`.
    pub fn with_rng(config: PhysicsConfig, stage: Stage, rng: R) -> Self {
        Self {
            frame: 0,
            controller: FighterController::new(config),
            stage,
            fighters: Vec::with_capacity(8),
            rng,
            ids: FighterIdGenerator::new(),
        }
    }

    /// Get the current frame number.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Sanitized configuration in use.
    pub fn config(&self) -> &PhysicsConfig {
        &self.controller.config
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    /// Replace the stage geometry. Fighters keep their state.
    pub fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    /// Fighters in roster order.
    pub fn fighters(&self) -> &[Fighter] {
        &self.fighters
    }

    pub fn fighter(&self, id: FighterId) -> Option<&Fighter> {
        self.fighters.iter().find(|f| f.id == id)
    }

    pub fn fighter_mut(&mut self, id: FighterId) -> Option<&mut Fighter> {
        self.fighters.iter_mut().find(|f| f.id == id)
    }

    /// Add a fighter with default settings at `position` (feet).
    pub fn add_fighter(&mut self, position: Vec2) -> FighterId {
        self.spawn(position, |fighter| fighter)
    }

    /// Add a fighter, letting `build` apply per-fighter overrides first.
    ///
    /// ```ignore
    /// let id = sim.spawn(Vec2::new(400.0, 900.0), |f| f.as_player().with_max_footing(140.0));
    /// ```
    pub fn spawn(&mut self, position: Vec2, build: impl FnOnce(Fighter) -> Fighter) -> FighterId {
        let id = self.ids.next();
        let fighter = build(Fighter::new(id, position, &self.controller.config));
        // The builder must not change identity.
        let fighter = Fighter { id, ..fighter };
        log::debug!("spawned fighter {:?} at {}", id, fighter.position);
        self.fighters.push(fighter);
        id
    }

    /// Remove a fighter, keeping the order of the rest.
    pub fn remove_fighter(&mut self, id: FighterId) -> Option<Fighter> {
        let index = self.fighters.iter().position(|f| f.id == id)?;
        log::debug!("removed fighter {:?}", id);
        Some(self.fighters.remove(index))
    }

    /// Advance the simulation by one frame.
    ///
    /// Inputs are indexed by roster position; missing entries mean no input.
    pub fn tick(&mut self, inputs: &[FighterInput], delta_time: f32) {
        if !delta_time.is_finite() || delta_time <= 0.0 {
            return;
        }
        self.frame += 1;

        for (i, fighter) in self.fighters.iter_mut().enumerate() {
            let input = inputs.get(i).copied().unwrap_or_default();
            self.controller
                .update(fighter, &input, &self.stage, &mut self.rng, delta_time);
        }

        resolve_body_collisions(&mut self.fighters, &self.controller.config, &self.stage);
    }

    // ========================================================================
    // Reactions
    // ========================================================================

    /// Knock a fighter down. Returns false if the id is unknown.
    pub fn trigger_full_ragdoll(&mut self, id: FighterId, impulse: HitImpulse) -> bool {
        let Some(fighter) = self.fighters.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        reaction::trigger_full_ragdoll(fighter, impulse, &self.controller.config, &mut self.rng);
        true
    }

    /// Apply a hit. Returns true if it knocked the fighter down.
    pub fn apply_hit_reaction(&mut self, id: FighterId, hit: HitReaction) -> bool {
        let Some(fighter) = self.fighters.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        let knocked_down =
            reaction::apply_hit_reaction(fighter, hit, &self.controller.config, &mut self.rng);
        if knocked_down {
            log::debug!("fighter {:?}: hit with no footing left, knockdown", id);
        }
        knocked_down
    }

    /// Spin an airborne fighter. Returns false if the id is unknown.
    pub fn apply_airborne_spin(&mut self, id: FighterId, spin: SpinImpulse) -> bool {
        let Some(fighter) = self.fighters.iter_mut().find(|f| f.id == id) else {
            return false;
        };
        reaction::apply_airborne_spin(fighter, spin, &self.controller.config);
        true
    }

    /// Supply a fighter's animated target pose. Returns false if the id is unknown.
    pub fn set_animation_pose(&mut self, id: FighterId, pose: JointPose) -> bool {
        match self.fighter_mut(id) {
            Some(fighter) => {
                fighter.set_animation_pose(pose);
                true
            }
            None => false,
        }
    }

    pub fn ragdoll_blend(&self, id: FighterId) -> Option<f32> {
        self.fighter(id).map(reaction::ragdoll_blend)
    }

    pub fn ragdoll_angles(&self, id: FighterId) -> Option<&JointPose> {
        self.fighter(id).map(reaction::ragdoll_angles)
    }
}
