//! Binary contract between the compositor host and its shader stages.
//!
//! Both sides of the host/GPU boundary index the same resources by small
//! integers and read the same byte layouts. A mismatch here is not a crash,
//! it is silent visual corruption, so this crate is the single source of
//! truth for:
//!
//! - Slot registry: buffer slots, vertex attribute locations, texture slots.
//! - Uniform block layouts (little-endian, natural alignment, order fixed):
//!
//!   | block             | slot | bytes | fields (in order)                              |
//!   |-------------------|------|-------|------------------------------------------------|
//!   | `FrameUniforms`   | 2    | 220   | projection(64) mv_frame(64) mv(64) tangents(16) which(u32,4) render_width(f32,4) render_height(f32,4) |
//!   | `PlaneUniform`    | 3    | 84    | transform(64) color(16) do_proximity(f32,4)    |
//!   | `EncodingUniform` | 4    | 68    | yuv_transform(64) gamma(f32,4)                 |
//!
//! - Foveated-rendering specialization constants, ids 100-106, resolved once
//!   per pipeline build.
//!
//! Ring buffers on the host align each block to 256 bytes (see
//! [`uniforms::align_256`]); the layouts above are the unaligned payloads.

pub mod foveation;
pub mod layout;
pub mod uniforms;

pub use foveation::{FoveationConstant, FoveationError, FoveationSettings, ResolvedFoveation};
pub use layout::{BufferIndex, TextureIndex, VertexAttribute};
pub use uniforms::{EncodingUniform, FrameUniforms, PlaneUniform};
