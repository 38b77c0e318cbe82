//! Skeleton joint catalog.
//!
//! The skeleton is a fixed set of ten named joints. Each joint has a closed
//! angular range in radians, and every angle produced by the integrator is
//! clamped into that range.
//!
//! Per-joint data is stored in [`JointMap`], a fixed-size array indexed by
//! [`Joint`]. Iteration order is always [`Joint::ALL`] so results are
//! reproducible frame to frame.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Number of joints in the skeleton.
pub const JOINT_COUNT: usize = 10;

/// A named skeleton joint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Joint {
    Torso,
    Head,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
}

impl Joint {
    /// All joints in storage order.
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::Torso,
        Joint::Head,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
    ];

    /// Storage index of this joint.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Closed angular range `(min, max)` in radians.
    pub const fn range(self) -> (f32, f32) {
        match self {
            Joint::Torso => (-0.6, 0.6),
            Joint::Head => (-0.7, 0.7),
            Joint::LeftShoulder | Joint::RightShoulder => (-2.8, 2.8),
            Joint::LeftElbow | Joint::RightElbow => (0.0, 2.6),
            Joint::LeftHip | Joint::RightHip => (-1.6, 1.6),
            Joint::LeftKnee | Joint::RightKnee => (-2.4, 0.0),
        }
    }

    /// Lower bound of the joint range.
    #[inline]
    pub const fn min_angle(self) -> f32 {
        self.range().0
    }

    /// Upper bound of the joint range.
    #[inline]
    pub const fn max_angle(self) -> f32 {
        self.range().1
    }

    /// Clamp an angle into this joint's range.
    ///
    /// Non-finite input collapses to the rest angle so a NaN can never
    /// leak into the pose.
    #[inline]
    pub fn clamp(self, angle: f32) -> f32 {
        if !angle.is_finite() {
            return self.rest_angle();
        }
        let (min, max) = self.range();
        angle.clamp(min, max)
    }

    /// Angle used when no animation pose has been supplied yet.
    #[inline]
    pub fn rest_angle(self) -> f32 {
        let (min, max) = self.range();
        0.0_f32.clamp(min, max)
    }

    /// Name used by animation data and debug output.
    pub const fn name(self) -> &'static str {
        match self {
            Joint::Torso => "torso",
            Joint::Head => "head",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
        }
    }
}

/// One `f32` per joint, indexable by [`Joint`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointMap(pub [f32; JOINT_COUNT]);

/// A full set of joint angles in radians.
pub type JointPose = JointMap;

impl JointMap {
    /// All zeros.
    pub const ZERO: Self = Self([0.0; JOINT_COUNT]);

    /// Every joint at its rest angle.
    pub fn rest() -> Self {
        Self::from_fn(Joint::rest_angle)
    }

    /// Build a map by evaluating `f` for each joint.
    pub fn from_fn(mut f: impl FnMut(Joint) -> f32) -> Self {
        let mut values = [0.0; JOINT_COUNT];
        for joint in Joint::ALL {
            values[joint.index()] = f(joint);
        }
        Self(values)
    }

    /// Iterate `(joint, value)` pairs in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (Joint, f32)> + '_ {
        Joint::ALL.iter().map(move |&joint| (joint, self.0[joint.index()]))
    }

    /// Clamp every value into its joint's range.
    pub fn clamped(mut self) -> Self {
        for joint in Joint::ALL {
            self[joint] = joint.clamp(self[joint]);
        }
        self
    }

    /// Whether every value lies within its joint's range.
    pub fn within_limits(&self) -> bool {
        self.iter().all(|(joint, angle)| {
            let (min, max) = joint.range();
            angle >= min && angle <= max
        })
    }
}

impl Index<Joint> for JointMap {
    type Output = f32;

    #[inline]
    fn index(&self, joint: Joint) -> &f32 {
        &self.0[joint.index()]
    }
}

impl IndexMut<Joint> for JointMap {
    #[inline]
    fn index_mut(&mut self, joint: Joint) -> &mut f32 {
        &mut self.0[joint.index()]
    }
}
