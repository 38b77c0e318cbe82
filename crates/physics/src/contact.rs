//! Pairwise body-collision resolution.
//!
//! Fighters are circles of `body_radius` centred one radius above their feet.
//! Grounded pairs at roughly the same height resolve along x only so standing
//! fighters shove each other sideways without popping upward; everything else
//! resolves as a full circle-circle contact.
//!
//! Corrections are split by collision share: a fighter moves by
//! `overlap * share_other / (share_self + share_other)`.

use glam::Vec2;

use crate::config::{CollisionShares, PhysicsConfig};
use crate::fighter::Fighter;
use crate::stage::Stage;

/// Below this distance two circle centres count as coincident.
const COINCIDENT_EPSILON: f32 = 1e-4;

/// How much standing ground `fighter` keeps in a collision.
pub fn collision_share(fighter: &Fighter, shares: &CollisionShares) -> f32 {
    if fighter.recovering {
        shares.recovering
    } else if fighter.physics.partial.value > shares.stagger_threshold
        || fighter.knockback.is_active()
    {
        shares.staggered
    } else if fighter.is_player {
        shares.player
    } else {
        shares.npc
    }
}

/// Fractions of a correction applied to `a` and `b`.
fn correction_split(share_a: f32, share_b: f32) -> (f32, f32) {
    let total = share_a + share_b;
    if !(total.is_finite() && total > 0.0) {
        return (0.5, 0.5);
    }
    (share_b / total, share_a / total)
}

fn body_center(fighter: &Fighter) -> Vec2 {
    fighter.position - Vec2::new(0.0, fighter.body_radius())
}

/// Separate one overlapping pair. Returns whether they were touching.
pub fn resolve_pair(a: &mut Fighter, b: &mut Fighter, config: &PhysicsConfig) -> bool {
    if !a.is_solid() || !b.is_solid() {
        return false;
    }

    let radius_sum = a.body_radius() + b.body_radius();
    let (move_a, move_b) = correction_split(
        collision_share(a, &config.collision_shares),
        collision_share(b, &config.collision_shares),
    );

    let delta = body_center(b) - body_center(a);
    let side_by_side = delta.y.abs() < radius_sum * config.vertical_overlap_factor;

    if side_by_side && (a.on_ground || b.on_ground) {
        let overlap = radius_sum - delta.x.abs();
        if overlap <= 0.0 {
            return false;
        }
        let direction = if delta.x < 0.0 { -1.0 } else { 1.0 };

        a.position.x -= direction * overlap * move_a;
        b.position.x += direction * overlap * move_b;

        let closing = (b.velocity.x - a.velocity.x) * direction;
        if closing < 0.0 {
            let bleed = -closing * config.horizontal_velocity_bleed;
            a.velocity.x -= direction * bleed * move_a;
            b.velocity.x += direction * bleed * move_b;
        }
        return true;
    }

    let distance = delta.length();
    if distance >= radius_sum {
        return false;
    }
    let normal = if distance > COINCIDENT_EPSILON {
        delta / distance
    } else {
        Vec2::X
    };
    let depth = radius_sum - distance;

    a.position -= normal * depth * move_a;
    b.position += normal * depth * move_b;

    let closing = (b.velocity - a.velocity).dot(normal);
    if closing < 0.0 {
        let impulse = -closing * config.circle_velocity_transfer;
        a.velocity -= normal * impulse * move_a;
        b.velocity += normal * impulse * move_b;
    }
    true
}

/// Resolve every overlapping pair in roster order, then restore the bounds
/// and ground constraints the pushes may have broken.
///
/// Returns the number of pairs that were in contact.
pub fn resolve_body_collisions(
    fighters: &mut [Fighter],
    config: &PhysicsConfig,
    stage: &Stage,
) -> usize {
    let mut contacts = 0;

    for i in 0..fighters.len() {
        for j in (i + 1)..fighters.len() {
            let (head, tail) = fighters.split_at_mut(j);
            if resolve_pair(&mut head[i], &mut tail[0], config) {
                contacts += 1;
            }
        }
    }

    let bounds = stage.bounds();
    let ground_y = stage.ground_y();
    for fighter in fighters.iter_mut() {
        fighter.position.x = bounds.clamp(fighter.position.x);
        if !fighter.ragdoll && fighter.position.y > ground_y {
            fighter.position.y = ground_y;
            fighter.velocity.y = fighter.velocity.y.min(0.0);
            fighter.on_ground = true;
        }
    }

    if contacts > 0 {
        log::trace!("resolved {contacts} body contacts");
    }
    contacts
}
