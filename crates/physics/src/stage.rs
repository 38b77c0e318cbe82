//! Resolved stage geometry: ground plane, platforms and play-area bounds.
//!
//! Stage data arrives already resolved into plain numbers. Platforms are
//! axis-aligned rectangles positioned relative to the ground line; y grows
//! downward, so a platform's top is `ground_y - top_offset`.

use serde::{Deserialize, Serialize};

use crate::bounds::{resolve_bounds, PlayBounds};

/// Surface type reported to the footstep-audio collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceMaterial {
    #[default]
    Stone,
    Wood,
    Metal,
    Grass,
    Dirt,
}

/// A one-way-from-above, solid-from-below platform rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    /// Left edge (x).
    pub left: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Height of the top surface above the ground line.
    pub top_offset: f32,
    /// Vertical thickness.
    pub height: f32,
    #[serde(default)]
    pub material: SurfaceMaterial,
}

impl Platform {
    pub fn new(left: f32, width: f32, top_offset: f32, height: f32) -> Self {
        Self {
            left,
            width,
            top_offset,
            height,
            material: SurfaceMaterial::default(),
        }
    }

    pub fn with_material(mut self, material: SurfaceMaterial) -> Self {
        self.material = material;
        self
    }

    /// Zero-size or non-finite colliders are skipped entirely.
    pub fn is_degenerate(&self) -> bool {
        !(self.left.is_finite()
            && self.width.is_finite()
            && self.top_offset.is_finite()
            && self.height.is_finite())
            || self.width <= 0.0
            || self.height <= 0.0
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Top surface y for the given ground line.
    pub fn top(&self, ground_y: f32) -> f32 {
        ground_y - self.top_offset
    }

    /// Underside y for the given ground line.
    pub fn bottom(&self, ground_y: f32) -> f32 {
        self.top(ground_y) + self.height
    }

    /// Whether an x coordinate is over the platform.
    pub fn spans(&self, x: f32) -> bool {
        x >= self.left && x <= self.right()
    }
}

/// Everything a fighter can collide with besides other fighters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Stage {
    /// Ground line y.
    pub ground_y: f32,
    pub ground_material: SurfaceMaterial,
    pub platforms: Vec<Platform>,
    /// Explicit playable-area override.
    pub playable_bounds: Option<PlayBounds>,
    /// Bounds derived from map data.
    pub map_bounds: Option<PlayBounds>,
    /// Stage width used for the margin-derived default bounds.
    pub width: f32,
    /// Margin kept on each side by the default bounds.
    pub bounds_margin: f32,
}

impl Default for Stage {
    fn default() -> Self {
        Self {
            ground_y: 900.0,
            ground_material: SurfaceMaterial::Stone,
            platforms: Vec::new(),
            playable_bounds: None,
            map_bounds: None,
            width: 1920.0,
            bounds_margin: 60.0,
        }
    }
}

impl Stage {
    /// A flat stage with the given ground line and bounds.
    pub fn flat(ground_y: f32, bounds: PlayBounds) -> Self {
        Self {
            ground_y,
            playable_bounds: Some(bounds),
            ..Default::default()
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platforms.push(platform);
        self
    }

    /// Resolved horizontal play area.
    pub fn bounds(&self) -> PlayBounds {
        resolve_bounds(
            self.playable_bounds,
            self.map_bounds,
            self.width,
            self.bounds_margin,
        )
    }

    /// Ground line, falling back to the default when non-finite.
    pub fn ground_y(&self) -> f32 {
        if self.ground_y.is_finite() {
            self.ground_y
        } else {
            Stage::default().ground_y
        }
    }

    /// Non-degenerate platforms in declaration order.
    pub fn solid_platforms(&self) -> impl Iterator<Item = &Platform> {
        self.platforms.iter().filter(|p| !p.is_degenerate())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn platform_edges() {
        let p = Platform::new(100.0, 200.0, 150.0, 20.0);
        assert_eq!(p.right(), 300.0);
        assert_eq!(p.top(900.0), 750.0);
        assert_eq!(p.bottom(900.0), 770.0);
        assert!(p.spans(100.0));
        assert!(p.spans(300.0));
        assert!(!p.spans(301.0));
    }

    #[test]
    fn degenerate_platforms_are_skipped() {
        let stage = Stage::default()
            .with_platform(Platform::new(0.0, 0.0, 100.0, 20.0))
            .with_platform(Platform::new(0.0, 100.0, f32::NAN, 20.0))
            .with_platform(Platform::new(0.0, 100.0, 100.0, 20.0));
        assert_eq!(stage.solid_platforms().count(), 1);
    }

    #[test]
    fn stage_bounds_resolution() {
        let stage = Stage::default();
        assert_eq!(stage.bounds(), PlayBounds::new(60.0, 1860.0));

        let stage = Stage::flat(500.0, PlayBounds::new(0.0, 800.0));
        assert_eq!(stage.bounds(), PlayBounds::new(0.0, 800.0));
    }

    #[test]
    fn non_finite_ground_falls_back() {
        let stage = Stage {
            ground_y: f32::NAN,
            ..Default::default()
        };
        assert_eq!(stage.ground_y(), 900.0);
    }
}
