//! Skirmish Physics
//!
//! Per-frame physical simulation for a 2D fighter. Advances every fighter's
//! position, velocity and skeleton, blends animated poses against a
//! spring-damper ragdoll, and resolves collisions against the ground,
//! platforms and other fighters.
//!
//! # Architecture
//!
//! - **Joints**: ten clamped joints driven by a per-frame spring-damper
//!   ([`spring`]), pulled between the animated pose and a ragdoll target by
//!   the blend-state machine ([`blend`]).
//! - **Locomotion**: gravity, input, knockback, platforms, ground and the
//!   `Normal → Ragdoll → Recovering → Normal` lifecycle ([`locomotion`]).
//! - **Contacts**: pairwise body pushes weighted by collision share
//!   ([`contact`]).
//! - **Reactions**: knockdowns, hit staggers and airborne spins triggered by
//!   the combat system ([`reaction`]).
//!
//! [`Simulation`] owns the roster and runs locomotion, then contacts, every
//! frame.
//!
//! # Determinism
//!
//! 1. All randomness goes through [`RandomSource`]; the simulation owns a
//!    [`SeededRandom`]
//! 2. Ordered iteration: fighters live in a `Vec`, joints in a fixed array
//! 3. No system time: callers pass `dt`

pub mod blend;
pub mod bounds;
pub mod config;
pub mod contact;
pub mod error;
pub mod fighter;
pub mod input;
pub mod joint;
pub mod locomotion;
pub mod math;
pub mod random;
pub mod reaction;
pub mod simulation;
pub mod spring;
pub mod stage;

// Re-export commonly used types
pub use bounds::PlayBounds;
pub use config::{BalanceScalars, CollisionShares, PhysicsConfig, SpringPreset, StatProfile};
pub use error::ConfigError;
pub use fighter::{Fighter, FighterId, KnockbackState, LifecyclePhase, PhysicsState};
pub use input::{AttackPhase, FighterInput, InputButtons, WalkMode};
pub use joint::{Joint, JointMap, JointPose};
pub use locomotion::FighterController;
pub use random::{RandomSource, SeededRandom, SequenceRandom};
pub use reaction::{HitImpulse, HitReaction, SpinImpulse};
pub use simulation::Simulation;
pub use stage::{Platform, Stage, SurfaceMaterial};
