//! Projection and view matrices for the per-eye frame uniforms.
//!
//! The projection is asymmetric (built from FOV tangents) and reverse-Z:
//! the near plane maps to depth 1 and the far plane to depth 0, which is
//! why the depth target clears to 0.0 and compares `Greater`.

use glam::{Mat4, Vec4};

/// Near clip distance in meters.
pub const NEAR_Z: f32 = 0.1;
/// Far clip distance in meters.
pub const FAR_Z: f32 = 10.0;

/// Builds a right-handed, reverse-Z projection from FOV tangents
/// (left, right, up, down; left and down negative).
pub fn projection_from_tangents(tangents: Vec4, near: f32, far: f32) -> Mat4 {
    let (tl, tr, tu, td) = (tangents.x, tangents.y, tangents.z, tangents.w);

    // Reverse-Z depth terms: z = -near -> 1, z = -far -> 0.
    let a = near / (far - near);
    let b = far * near / (far - near);

    Mat4::from_cols(
        Vec4::new(2.0 / (tr - tl), 0.0, 0.0, 0.0),
        Vec4::new(0.0, 2.0 / (tu - td), 0.0, 0.0),
        Vec4::new((tr + tl) / (tr - tl), (tu + td) / (tu - td), a, -1.0),
        Vec4::new(0.0, 0.0, b, 0.0),
    )
}

/// Zeroes the translation column, keeping orientation only.
fn strip_translation(m: Mat4) -> Mat4 {
    let mut out = m;
    out.w_axis = Vec4::new(0.0, 0.0, 0.0, 1.0);
    out
}

/// Derives the two model-view matrices of the frame uniforms from the
/// current device anchor and the pose the video frame was rendered at.
///
/// Returns `(model_view, model_view_frame)`. The frame-referenced matrix is
/// rotation-only: reprojection corrects orientation drift between frame
/// arrival and display, translation is left to the panel transform.
pub fn view_matrices(device_anchor: Mat4, frame_pose: Mat4) -> (Mat4, Mat4) {
    let model_view = device_anchor.inverse();

    let frame_rot = strip_translation(frame_pose);
    let anchor_rot = strip_translation(device_anchor);
    let model_view_frame = (frame_rot.inverse() * anchor_rot).inverse();

    (model_view, model_view_frame)
}
