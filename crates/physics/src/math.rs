//! Scalar helpers shared by the integrators.

/// Reference frame time the per-frame constants are tuned against.
pub const REFERENCE_FRAME_TIME: f32 = 1.0 / 60.0;

/// Linear interpolation.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Move towards a target value at a maximum delta.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    let diff = target - current;
    if diff.abs() <= max_delta {
        target
    } else {
        current + diff.signum() * max_delta
    }
}

/// Fraction of the remaining distance covered this step by exponential
/// smoothing at `rate` per second.
#[inline]
pub fn smoothing_factor(rate: f32, dt: f32) -> f32 {
    1.0 - (-rate * dt).exp()
}

/// Convert a per-60fps retention factor into one for an arbitrary `dt`.
#[inline]
pub fn frame_rate_independent(base: f32, dt: f32) -> f32 {
    base.powf(dt / REFERENCE_FRAME_TIME)
}

/// Returns `value` if it is finite, `fallback` otherwise.
#[inline]
pub fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}
