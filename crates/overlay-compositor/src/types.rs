//! Inputs handed to the compositor by external collaborators.

use glam::{Mat4, Vec4};

/// FOV tangents (left, right, up, down) of a typical HMD eye; left and
/// bottom are negative. Callers normally pass device-reported values.
pub const DEFAULT_FOV_TANGENTS: Vec4 =
    Vec4::new(-1.047_197_3, 0.785_398_2, 0.785_398_2, -0.872_663_2);

/// Per-frame pose state from the tracking collaborator.
#[derive(Debug, Clone, Copy)]
pub struct FrameInputs {
    /// Current device (head) transform in world space.
    pub device_anchor: Mat4,
    /// Pose the incoming video frame was rendered at; the delta between
    /// this and `device_anchor` drives reprojection.
    pub frame_pose: Mat4,
    /// Asymmetric-projection FOV tangents (left, right, up, down).
    pub tangents: Vec4,
}

impl FrameInputs {
    /// A static pose: no head movement, default FOV.
    pub fn identity() -> Self {
        Self {
            device_anchor: Mat4::IDENTITY,
            frame_pose: Mat4::IDENTITY,
            tangents: DEFAULT_FOV_TANGENTS,
        }
    }
}

/// One overlay or passthrough plane to draw this frame.
///
/// The scene-graph collaborator controls how many of these exist; each gets
/// its own uniform slot and draw call, independent of the others.
#[derive(Debug, Clone, Copy)]
pub struct OverlayPlane {
    /// Places the plane in world space.
    pub transform: Mat4,
    /// RGBA tint, channels conventionally in [0, 1].
    pub color: Vec4,
    /// Proximity fade factor; 0 disables the fade.
    pub proximity_fade: f32,
}
