//! XR value types handed to the plugin by the harness, and view math
//!
//! These mirror the runtime's composition-layer structures closely enough that
//! a harness can fill them field by field, but carry glam types for the pose.

use glam::{Mat4, Quat, Vec3};

/// Pixel offset of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Offset2Di {
    pub x: i32,
    pub y: i32,
}

/// Pixel extent of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Extent2Di {
    pub width: i32,
    pub height: i32,
}

/// Pixel rectangle inside a swapchain image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect2Di {
    pub offset: Offset2Di,
    pub extent: Extent2Di,
}

impl Rect2Di {
    /// Rectangle anchored at the origin
    pub fn from_size(width: i32, height: i32) -> Self {
        Self {
            offset: Offset2Di { x: 0, y: 0 },
            extent: Extent2Di { width, height },
        }
    }

    /// True if the rectangle has no negative component and fits in `width` x `height`
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        if self.offset.x < 0 || self.offset.y < 0 || self.extent.width < 0 || self.extent.height < 0 {
            return false;
        }
        let right = self.offset.x as u64 + self.extent.width as u64;
        let bottom = self.offset.y as u64 + self.extent.height as u64;
        right <= width as u64 && bottom <= height as u64
    }
}

/// Rigid transform: orientation then position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posef {
    pub orientation: Quat,
    pub position: Vec3,
}

impl Posef {
    pub const IDENTITY: Posef = Posef {
        orientation: Quat::IDENTITY,
        position: Vec3::ZERO,
    };

    /// Pose as an affine matrix (rotation then translation)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.orientation, self.position)
    }
}

impl Default for Posef {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Asymmetric field of view, angles in radians
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Fovf {
    pub angle_left: f32,
    pub angle_right: f32,
    pub angle_up: f32,
    pub angle_down: f32,
}

/// Region of a swapchain image a view renders into
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwapchainSubImage {
    pub image_rect: Rect2Di,
    pub image_array_index: u32,
}

/// Per-eye projection view for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CompositionLayerProjectionView {
    pub pose: Posef,
    pub fov: Fovf,
    pub sub_image: SwapchainSubImage,
}

/// One cube of scene content
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cube {
    pub pose: Posef,
    pub scale: Vec3,
}

impl Cube {
    /// Model matrix: scale, then the cube's pose
    pub fn model_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.pose.orientation, self.pose.position)
    }
}

/// Parameters the runtime used to create a swapchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapchainCreateInfo {
    pub format: i64,
    pub width: u32,
    pub height: u32,
    pub sample_count: u32,
    pub array_size: u32,
    pub mip_count: u32,
}

/// World-to-eye matrix for a view pose
pub fn view_matrix(pose: &Posef) -> Mat4 {
    pose.to_matrix().inverse()
}

/// Off-center projection for an XR fov, D3D clip space (z in [0, 1])
///
/// An infinite `far_z`, or `far_z <= near_z`, builds an infinite far plane.
pub fn projection_fov(fov: &Fovf, near_z: f32, far_z: f32) -> Mat4 {
    let tan_left = fov.angle_left.tan();
    let tan_right = fov.angle_right.tan();
    let tan_down = fov.angle_down.tan();
    let tan_up = fov.angle_up.tan();

    let tan_width = tan_right - tan_left;
    let tan_height = tan_up - tan_down;

    let (m22, m32) = if far_z.is_infinite() || far_z <= near_z {
        (-1.0, -near_z)
    } else {
        (-far_z / (far_z - near_z), -(far_z * near_z) / (far_z - near_z))
    };

    Mat4::from_cols_array(&[
        2.0 / tan_width, 0.0, 0.0, 0.0,
        0.0, 2.0 / tan_height, 0.0, 0.0,
        (tan_right + tan_left) / tan_width, (tan_up + tan_down) / tan_height, m22, -1.0,
        0.0, 0.0, m32, 0.0,
    ])
}

#[cfg(test)]
#[path = "xr_tests.rs"]
mod tests;
