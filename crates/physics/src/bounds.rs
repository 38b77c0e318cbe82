//! Horizontal play-area bounds.

use serde::{Deserialize, Serialize};

/// Horizontal extent fighters are confined to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayBounds {
    pub min_x: f32,
    pub max_x: f32,
}

impl PlayBounds {
    pub const fn new(min_x: f32, max_x: f32) -> Self {
        Self { min_x, max_x }
    }

    /// Finite and non-empty.
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite() && self.max_x.is_finite() && self.max_x > self.min_x
    }

    /// Check if an x coordinate is within bounds.
    pub fn contains(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    /// Clamp an x coordinate to within bounds.
    pub fn clamp(&self, x: f32) -> f32 {
        x.clamp(self.min_x, self.max_x)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn center(&self) -> f32 {
        (self.min_x + self.max_x) * 0.5
    }
}

impl Default for PlayBounds {
    fn default() -> Self {
        Self::new(0.0, 1920.0)
    }
}

/// Pick the first valid bounds in precedence order: explicit playable
/// override, then map bounds, then `[margin, width - margin]`.
pub fn resolve_bounds(
    playable: Option<PlayBounds>,
    map: Option<PlayBounds>,
    stage_width: f32,
    margin: f32,
) -> PlayBounds {
    if let Some(bounds) = playable.filter(PlayBounds::is_valid) {
        return bounds;
    }
    if let Some(bounds) = map.filter(PlayBounds::is_valid) {
        return bounds;
    }

    let width = if stage_width.is_finite() && stage_width > 0.0 {
        stage_width
    } else {
        PlayBounds::default().max_x
    };
    let margin = if margin.is_finite() { margin.clamp(0.0, width * 0.45) } else { 0.0 };
    PlayBounds::new(margin, width - margin)
}
