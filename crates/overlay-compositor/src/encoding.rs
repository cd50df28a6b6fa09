//! Color-space conversion for the decoded video plane.
//!
//! The decoder collaborator reports the stream's color metadata; this
//! module turns it into the `EncodingUniform` of the shader contract. The
//! 4x4 matrix is applied as `m * vec4(y, u, v, 1)` with the range offsets
//! folded into the fourth column, so the shader needs a single multiply.
//!
//! No default is synthesized: a wrong matrix is a silent color cast, so the
//! caller must state the space and range explicitly.

use glam::{Mat4, Vec4};
use shader_abi::EncodingUniform;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    /// ITU-R BT.601 (SD content).
    Bt601,
    /// ITU-R BT.709 (HD content, the common case for streamed video).
    Bt709,
}

impl ColorSpace {
    /// Luma coefficients (Kr, Kb) of the space.
    fn luma_coefficients(self) -> (f32, f32) {
        match self {
            ColorSpace::Bt601 => (0.299, 0.114),
            ColorSpace::Bt709 => (0.2126, 0.0722),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRange {
    /// Y in [16, 235], chroma in [16, 240] (8-bit terms).
    Limited,
    /// Full [0, 255] excursion.
    Full,
}

/// Stream color metadata as reported by the video decoder.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoColorMetadata {
    pub space: ColorSpace,
    pub range: ColorRange,
    /// Gamma exponent applied after conversion; 1.0 leaves values linear.
    pub gamma: f32,
}

impl VideoColorMetadata {
    /// Builds the encoding uniform block for this metadata.
    pub fn encoding_uniform(&self) -> EncodingUniform {
        EncodingUniform::new(yuv_to_rgb_matrix(self.space, self.range), self.gamma)
    }
}

/// YUV -> RGB matrix for normalized [0, 1] inputs, offsets folded in.
pub fn yuv_to_rgb_matrix(space: ColorSpace, range: ColorRange) -> Mat4 {
    let (kr, kb) = space.luma_coefficients();
    let kg = 1.0 - kr - kb;

    // Unscaled reconstruction terms.
    let rv = 2.0 * (1.0 - kr);
    let gu = -2.0 * kb * (1.0 - kb) / kg;
    let gv = -2.0 * kr * (1.0 - kr) / kg;
    let bu = 2.0 * (1.0 - kb);

    // Range scale/offset in normalized 8-bit terms.
    let (ys, yo, cs, co) = match range {
        ColorRange::Limited => (255.0 / 219.0, 16.0 / 255.0, 255.0 / 224.0, 128.0 / 255.0),
        ColorRange::Full => (1.0, 0.0, 1.0, 0.5),
    };

    let r_off = -ys * yo - cs * rv * co;
    let g_off = -ys * yo - cs * (gu + gv) * co;
    let b_off = -ys * yo - cs * bu * co;

    Mat4::from_cols(
        Vec4::new(ys, ys, ys, 0.0),
        Vec4::new(0.0, cs * gu, cs * bu, 0.0),
        Vec4::new(cs * rv, cs * gv, 0.0, 0.0),
        Vec4::new(r_off, g_off, b_off, 1.0),
    )
}

/// Tracks the last metadata so unchanged frames skip the re-upload.
#[derive(Debug, Default)]
pub struct EncodingState {
    last: Option<VideoColorMetadata>,
}

impl EncodingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a fresh uniform block only when `meta` differs from the last
    /// seen metadata. Identical metadata produces identical bytes, so the
    /// host can keep the previously uploaded block.
    pub fn update(&mut self, meta: VideoColorMetadata) -> Option<EncodingUniform> {
        if self.last == Some(meta) {
            return None;
        }
        self.last = Some(meta);
        Some(meta.encoding_uniform())
    }

    /// Whether any metadata has been supplied yet.
    pub fn is_initialized(&self) -> bool {
        self.last.is_some()
    }
}
