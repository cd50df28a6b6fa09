//! Headless compositor for the VR video overlay pipeline.
//!
//! This crate is the host side of the contract defined in `shader_abi`:
//! - Writes the per-eye frame, per-plane and encoding uniform blocks into
//!   ring buffers using the shared slot registry.
//! - Builds render pipelines specialized by the foveation constant set and
//!   caches one pipeline per distinct parameter combination.
//! - Records one pass per eye into a side-by-side offscreen target.
//!
//! Video decoding, head tracking, networking and windowing are external
//! collaborators; their outputs enter through [`types::FrameInputs`],
//! [`encoding::VideoColorMetadata`] and a caller-supplied video texture.

pub mod encoding;
pub mod projection;
pub mod renderer;
pub mod types;
pub mod uniforms;

pub use renderer::Compositor;
pub use types::{FrameInputs, OverlayPlane};
