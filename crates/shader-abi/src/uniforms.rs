//! Uniform block layouts.
//!
//! Each struct is `#[repr(C)]` plain old data and must match the
//! corresponding struct in `shaders/overlay.wgsl` field for field. The
//! shader reads by offset, so reordering or resizing a field is an ABI
//! break even when the code still compiles on both sides.
//!
//! WGSL rounds struct sizes up to 16-byte multiples; the host-side ring
//! buffers bind whole 256-byte-aligned slots (see [`align_256`]), which
//! covers the shader-visible size in every case.

use bytemuck::{Pod, PodCastError, Zeroable};
use glam::{Mat4, Vec4};

/// Rounds `size` up to the next multiple of 256, the uniform buffer offset
/// alignment shared by the ring buffers and the GPU binding rules.
#[inline]
pub const fn align_256(size: usize) -> usize {
    (size + 0xFF) & !0xFF
}

/// Per-eye, per-frame transform and viewport state, bound at
/// [`BufferIndex::Uniforms`](crate::layout::BufferIndex::Uniforms).
///
/// Overwritten by the host before each eye's draw call, read-only to the
/// shader, never persisted. `which` selects the eye (0 = left, 1 = right);
/// this layer stores it verbatim and does not range-check it.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct FrameUniforms {
    /// Camera projection for this eye.
    pub projection: [[f32; 4]; 4],
    /// Model-view state at display-frame timing, used for reprojection.
    pub model_view_frame: [[f32; 4]; 4],
    /// Current model-view transform.
    pub model_view: [[f32; 4]; 4],
    /// FOV tangents (left, right, up, down) of the asymmetric projection.
    pub tangents: [f32; 4],
    /// Eye selector.
    pub which: u32,
    /// Render target width in pixels.
    pub render_width: f32,
    /// Render target height in pixels.
    pub render_height: f32,
}

impl FrameUniforms {
    pub fn new(
        projection: Mat4,
        model_view_frame: Mat4,
        model_view: Mat4,
        tangents: Vec4,
        which: u32,
        render_width: f32,
        render_height: f32,
    ) -> Self {
        Self {
            projection: projection.to_cols_array_2d(),
            model_view_frame: model_view_frame.to_cols_array_2d(),
            model_view: model_view.to_cols_array_2d(),
            tangents: tangents.to_array(),
            which,
            render_width,
            render_height,
        }
    }

    /// Exact wire size of the block in bytes.
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Ring-buffer slot size (256-byte aligned).
    #[inline]
    pub const fn aligned_size() -> usize {
        align_256(Self::SIZE)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    /// Decodes a block previously produced by [`Self::as_bytes`]. The input
    /// may sit at any offset; only its length is checked.
    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PodCastError> {
        bytemuck::try_pod_read_unaligned(bytes)
    }
}

/// Per-overlay-plane transform, tint and proximity fade, bound at
/// [`BufferIndex::PlaneUniforms`](crate::layout::BufferIndex::PlaneUniforms).
///
/// One instance per visible plane per frame; instances are independent and
/// the host may write any number of them into consecutive ring slots.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct PlaneUniform {
    /// Places the plane in view space.
    pub transform: [[f32; 4]; 4],
    /// RGBA tint. Channels are conventionally in [0, 1]; not enforced here.
    pub color: [f32; 4],
    /// Proximity fade factor; 0 disables the fade, larger values fade more.
    pub do_proximity: f32,
}

impl PlaneUniform {
    pub fn new(transform: Mat4, color: Vec4, do_proximity: f32) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            color: color.to_array(),
            do_proximity,
        }
    }

    pub const SIZE: usize = std::mem::size_of::<Self>();

    #[inline]
    pub const fn aligned_size() -> usize {
        align_256(Self::SIZE)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PodCastError> {
        bytemuck::try_pod_read_unaligned(bytes)
    }
}

/// Color-space conversion for the decoded video plane, bound at
/// [`BufferIndex::EncodingUniforms`](crate::layout::BufferIndex::EncodingUniforms).
///
/// Stable across frames while the stream's color metadata is unchanged; the
/// matrix must match the decoder's color space and range exactly or the
/// output gets a visible color cast rather than an error.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct EncodingUniform {
    /// Color-space transform applied as `yuv_transform * vec4(y, u, v, 1)`;
    /// any range offset is folded into the fourth column.
    pub yuv_transform: [[f32; 4]; 4],
    /// Gamma exponent applied after the matrix.
    pub gamma: f32,
}

impl EncodingUniform {
    pub fn new(yuv_transform: Mat4, gamma: f32) -> Self {
        Self {
            yuv_transform: yuv_transform.to_cols_array_2d(),
            gamma,
        }
    }

    pub const SIZE: usize = std::mem::size_of::<Self>();

    #[inline]
    pub const fn aligned_size() -> usize {
        align_256(Self::SIZE)
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PodCastError> {
        bytemuck::try_pod_read_unaligned(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::offset_of;

    fn f32_at(bytes: &[u8], offset: usize) -> f32 {
        f32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().unwrap())
    }

    #[test]
    fn frame_uniforms_layout_is_fixed() {
        // 3 matrices + tangents + which + width + height, no padding.
        assert_eq!(FrameUniforms::SIZE, 64 * 3 + 16 + 4 + 4 + 4);
        assert_eq!(offset_of!(FrameUniforms, projection), 0);
        assert_eq!(offset_of!(FrameUniforms, model_view_frame), 64);
        assert_eq!(offset_of!(FrameUniforms, model_view), 128);
        assert_eq!(offset_of!(FrameUniforms, tangents), 192);
        assert_eq!(offset_of!(FrameUniforms, which), 208);
        assert_eq!(offset_of!(FrameUniforms, render_width), 212);
        assert_eq!(offset_of!(FrameUniforms, render_height), 216);
        assert_eq!(FrameUniforms::aligned_size(), 256);
    }

    #[test]
    fn plane_uniform_layout_is_fixed() {
        assert_eq!(PlaneUniform::SIZE, 64 + 16 + 4);
        assert_eq!(offset_of!(PlaneUniform, transform), 0);
        assert_eq!(offset_of!(PlaneUniform, color), 64);
        assert_eq!(offset_of!(PlaneUniform, do_proximity), 80);
        assert_eq!(PlaneUniform::aligned_size(), 256);
    }

    #[test]
    fn encoding_uniform_layout_is_fixed() {
        assert_eq!(EncodingUniform::SIZE, 64 + 4);
        assert_eq!(offset_of!(EncodingUniform, yuv_transform), 0);
        assert_eq!(offset_of!(EncodingUniform, gamma), 64);
        assert_eq!(EncodingUniform::aligned_size(), 256);
    }

    #[test]
    fn frame_uniforms_round_trip_by_offset() {
        let u = FrameUniforms::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec4::new(1.0, 1.0, 1.0, 1.0),
            0,
            1832.0,
            1920.0,
        );
        let bytes = u.as_bytes();
        assert_eq!(bytes.len(), FrameUniforms::SIZE);

        // Identity diagonal of the projection matrix.
        assert_eq!(f32_at(bytes, 0), 1.0);
        assert_eq!(f32_at(bytes, 20), 1.0);
        assert_eq!(f32_at(bytes, 40), 1.0);
        assert_eq!(f32_at(bytes, 60), 1.0);

        for i in 0..4 {
            assert_eq!(f32_at(bytes, 192 + i * 4), 1.0);
        }
        assert_eq!(u32_at(bytes, 208), 0);
        assert_eq!(f32_at(bytes, 212), 1832.0);
        assert_eq!(f32_at(bytes, 216), 1920.0);

        let back = FrameUniforms::from_bytes(bytes).unwrap();
        assert_eq!(back, u);
    }

    #[test]
    fn frame_uniforms_encoding_is_idempotent() {
        let make = || {
            FrameUniforms::new(
                Mat4::perspective_rh(1.0, 1.0, 0.1, 10.0),
                Mat4::from_translation(glam::Vec3::new(0.5, -0.25, 3.0)),
                Mat4::IDENTITY,
                Vec4::new(-1.047_197_3, 0.785_398_2, 0.785_398_2, -0.872_663_2),
                1,
                1024.0,
                1024.0,
            )
        };
        assert_eq!(make().as_bytes(), make().as_bytes());
    }

    #[test]
    fn plane_uniform_round_trip() {
        let p = PlaneUniform::new(
            Mat4::from_translation(glam::Vec3::new(0.0, 1.5, -2.0)),
            Vec4::new(0.2, 0.4, 0.6, 0.8),
            1.0,
        );
        let back = PlaneUniform::from_bytes(p.as_bytes()).unwrap();
        assert_eq!(back, p);
        assert_eq!(f32_at(p.as_bytes(), 80), 1.0);
    }

    #[test]
    fn plane_slots_do_not_alias() {
        // Two planes written into consecutive ring slots of one arena must
        // remain independently readable.
        let a = PlaneUniform::new(Mat4::IDENTITY, Vec4::new(1.0, 0.0, 0.0, 1.0), 0.0);
        let b = PlaneUniform::new(
            Mat4::from_rotation_y(0.5),
            Vec4::new(0.0, 1.0, 0.0, 0.5),
            2.0,
        );

        let slot = PlaneUniform::aligned_size();
        let mut arena = vec![0u8; slot * 2];
        arena[..PlaneUniform::SIZE].copy_from_slice(a.as_bytes());
        arena[slot..slot + PlaneUniform::SIZE].copy_from_slice(b.as_bytes());

        let a_back = PlaneUniform::from_bytes(&arena[..PlaneUniform::SIZE]).unwrap();
        let b_back = PlaneUniform::from_bytes(&arena[slot..slot + PlaneUniform::SIZE]).unwrap();
        assert_eq!(a_back, a);
        assert_eq!(b_back, b);
    }

    #[test]
    fn encoding_uniform_identity_passes_color_through() {
        let e = EncodingUniform::new(Mat4::IDENTITY, 1.0);
        let back = EncodingUniform::from_bytes(e.as_bytes()).unwrap();
        assert_eq!(back, e);

        let m = Mat4::from_cols_array_2d(&back.yuv_transform);
        let rgb = Vec4::new(0.25, 0.5, 0.75, 1.0);
        assert_eq!(m * rgb, rgb);
    }

    #[test]
    fn from_bytes_rejects_wrong_length() {
        let e = EncodingUniform::new(Mat4::IDENTITY, 1.0);
        assert!(EncodingUniform::from_bytes(&e.as_bytes()[..EncodingUniform::SIZE - 1]).is_err());
    }
}
