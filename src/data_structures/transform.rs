//! Local node transforms: position, rotation and scale.
//!
//! Transforms compose parent-first (`parent * local`) the same way world
//! transforms are derived when walking the scene graph.

use std::ops::Mul;

use cgmath::{Array, ElementWise, One, SquareMatrix, Zero};

/// Per-node transformation: position, rotation (as quaternion), and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: cgmath::Vector3<f32>,
    pub rotation: cgmath::Quaternion<f32>,
    pub scale: cgmath::Vector3<f32>,
}

impl Transform {
    /// The identity transform.
    pub fn new() -> Self {
        Self {
            position: cgmath::Vector3::zero(),
            rotation: cgmath::Quaternion::one(),
            scale: cgmath::Vector3::from_value(1.0),
        }
    }

    /// Builds a transform from glTF's decomposed `(translation, rotation xyzw, scale)`.
    pub fn from_decomposed((t, r, s): ([f32; 3], [f32; 4], [f32; 3])) -> Self {
        Self {
            position: t.into(),
            // glTF stores xyzw, cgmath's constructor takes w first
            rotation: cgmath::Quaternion::new(r[3], r[0], r[1], r[2]),
            scale: s.into(),
        }
    }

    pub fn set_uniform_scale(&mut self, factor: f32) {
        self.scale = cgmath::Vector3::new(factor, factor, factor);
    }

    pub fn to_matrix(&self) -> cgmath::Matrix4<f32> {
        cgmath::Matrix4::from_translation(self.position)
            * cgmath::Matrix4::from(self.rotation)
            * cgmath::Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z)
    }

    /// Sign of the matrix determinant; negative for mirrored nodes.
    pub fn handedness(&self) -> f32 {
        self.to_matrix().determinant().signum()
    }
}

/// `parent * child`: the child's offset is scaled and rotated into the parent's frame.
impl Mul<&Transform> for &Transform {
    type Output = Transform;

    fn mul(self, child: &Transform) -> Transform {
        Transform {
            position: self.position + self.rotation * self.scale.mul_element_wise(child.position),
            rotation: self.rotation * child.rotation,
            scale: self.scale.mul_element_wise(child.scale),
        }
    }
}

impl From<cgmath::Vector3<f32>> for Transform {
    fn from(position: cgmath::Vector3<f32>) -> Self {
        Transform {
            position,
            ..Default::default()
        }
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}
