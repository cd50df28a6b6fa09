//! The main rendering orchestrator. Owns the GPU context, offscreen eye
//! targets, the foveation-specialized pipeline cache, and the uniform rings.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{context::GfxContext, pipelines::overlay::OverlayPipelines, targets::EyeTargets};
use crate::{
    encoding::{EncodingState, VideoColorMetadata},
    projection::{projection_from_tangents, view_matrices, FAR_Z, NEAR_Z},
    types::{FrameInputs, OverlayPlane},
    uniforms::{FrameUniformRing, PlaneUniformRing},
};
use anyhow::{bail, Result};
use glam::{Mat4, Vec4};
use shader_abi::{
    uniforms::align_256, BufferIndex, EncodingUniform, FoveationSettings, FrameUniforms,
    PlaneUniform,
};
use std::sync::Arc;
use wgpu::util::DeviceExt;

/// Fullscreen quad at the timewarp panel depth: four xyz positions followed
/// by four uv pairs in one buffer. UVs cover the left half of the
/// side-by-side video texture; the shader shifts them for the right eye.
const PANEL_DEPTH: f32 = 1.0;
#[rustfmt::skip]
const QUAD_VERTICES: [f32; 20] = [
    // positions (triangle strip)
    -PANEL_DEPTH, -PANEL_DEPTH, -PANEL_DEPTH,
     PANEL_DEPTH, -PANEL_DEPTH, -PANEL_DEPTH,
    -PANEL_DEPTH,  PANEL_DEPTH, -PANEL_DEPTH,
     PANEL_DEPTH,  PANEL_DEPTH, -PANEL_DEPTH,
    // texcoords
    0.0, 1.0,
    0.5, 1.0,
    0.0, 0.0,
    0.5, 0.0,
];
/// Byte offset of the texcoords within [`QUAD_VERTICES`].
const QUAD_UV_OFFSET: u64 = (4 * 3 * std::mem::size_of::<f32>()) as u64;

/// Owns all rendering state for the overlay compositor.
pub struct Compositor {
    pub gfx: GfxContext,
    pub targets: EyeTargets,
    pipelines: OverlayPipelines,
    pipeline: Arc<wgpu::RenderPipeline>,
    frame_ring: FrameUniformRing,
    plane_ring: PlaneUniformRing,
    encoding_buffer: wgpu::Buffer,
    encoding_state: EncodingState,
    uniforms_bind: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    video_bind: Option<wgpu::BindGroup>,
    quad_vb: wgpu::Buffer,
}

impl Compositor {
    pub async fn new(
        eye_width: u32,
        eye_height: u32,
        foveation: FoveationSettings,
    ) -> Result<Self> {
        let gfx = GfxContext::new().await?;
        let targets = EyeTargets::new(&gfx.device, eye_width, eye_height);

        let mut pipelines = OverlayPipelines::new(&gfx.device);
        let pipeline = pipelines.get_or_build(&gfx.device, &foveation)?;

        let frame_ring = FrameUniformRing::new(&gfx.device);
        let plane_ring = PlaneUniformRing::new(&gfx.device);

        let encoding_buffer = gfx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Encoding Uniform Buffer"),
            size: align_256(EncodingUniform::SIZE) as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let uniforms_bind = gfx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Overlay Uniforms Bind"),
            layout: &pipelines.uniforms_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: BufferIndex::Uniforms.slot(),
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &frame_ring.buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(FrameUniforms::aligned_size() as u64),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: BufferIndex::PlaneUniforms.slot(),
                    resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                        buffer: &plane_ring.buffer,
                        offset: 0,
                        size: wgpu::BufferSize::new(PlaneUniform::aligned_size() as u64),
                    }),
                },
                wgpu::BindGroupEntry {
                    binding: BufferIndex::EncodingUniforms.slot(),
                    resource: encoding_buffer.as_entire_binding(),
                },
            ],
        });

        let sampler = gfx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Video Sampler"),
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            ..Default::default()
        });

        let quad_vb = gfx
            .device
            .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Overlay Quad VB"),
                contents: bytemuck::cast_slice(&QUAD_VERTICES),
                usage: wgpu::BufferUsages::VERTEX,
            });

        Ok(Self {
            gfx,
            targets,
            pipelines,
            pipeline,
            frame_ring,
            plane_ring,
            encoding_buffer,
            encoding_state: EncodingState::new(),
            uniforms_bind,
            sampler,
            video_bind: None,
            quad_vb,
        })
    }

    /// Switches to the pipeline for `settings`, building and caching it if
    /// this combination has not been seen. Expensive on a miss; callers
    /// should treat it as a rare reconfiguration, not a per-frame toggle.
    pub fn set_foveation(&mut self, settings: &FoveationSettings) -> Result<()> {
        self.pipeline = self.pipelines.get_or_build(&self.gfx.device, settings)?;
        Ok(())
    }

    /// Number of distinct pipelines built so far.
    pub fn pipeline_count(&self) -> usize {
        self.pipelines.cached()
    }

    /// Binds the decoded video texture (side-by-side stereo layout).
    /// Call again whenever the decoder hands out a new texture.
    pub fn set_video_texture(&mut self, view: &wgpu::TextureView) {
        self.video_bind = Some(self.gfx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Video Texture Bind"),
            layout: &self.pipelines.texture_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: shader_abi::TextureIndex::Color.slot(),
                    resource: wgpu::BindingResource::TextureView(view),
                },
                wgpu::BindGroupEntry {
                    binding: shader_abi::TextureIndex::Color.slot() + 1,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        }));
    }

    /// Applies the stream's color metadata. The block is re-uploaded only
    /// when the metadata actually changed.
    pub fn set_color_metadata(&mut self, meta: VideoColorMetadata) {
        if let Some(uniform) = self.encoding_state.update(meta) {
            log::debug!("Color metadata changed, re-encoding: {meta:?}");
            self.gfx
                .queue
                .write_buffer(&self.encoding_buffer, 0, uniform.as_bytes());
        }
    }

    /// Renders one frame: the video quad plus `planes`, once per eye, into
    /// the side-by-side target. All uniform writes for the frame are queued
    /// before the command buffer is submitted, so the shader stage never
    /// observes a partially written block.
    pub fn render_frame(&mut self, inputs: &FrameInputs, planes: &[OverlayPlane]) -> Result<()> {
        let Some(video_bind) = &self.video_bind else {
            bail!("no video texture bound; call set_video_texture first");
        };
        if !self.encoding_state.is_initialized() {
            bail!("no color metadata supplied; call set_color_metadata first");
        }

        let projection = projection_from_tangents(inputs.tangents, NEAR_Z, FAR_Z);
        let (model_view, model_view_frame) = view_matrices(inputs.device_anchor, inputs.frame_pose);

        self.frame_ring.begin_frame();

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        for eye in 0..2u32 {
            let frame_uniforms = FrameUniforms::new(
                projection,
                model_view_frame,
                model_view,
                inputs.tangents,
                eye,
                self.targets.eye_width as f32,
                self.targets.eye_height as f32,
            );
            let frame_offset = self.frame_ring.write(&self.gfx.queue, eye, &frame_uniforms);

            // The video layer is itself a plane: identity transform, no
            // tint, no proximity fade.
            let video_offset = self.plane_ring.write(
                &self.gfx.queue,
                &PlaneUniform::new(Mat4::IDENTITY, Vec4::ONE, 0.0),
            );
            let plane_offsets: Vec<u32> = planes
                .iter()
                .map(|p| {
                    self.plane_ring.write(
                        &self.gfx.queue,
                        &PlaneUniform::new(p.transform, p.color, p.proximity_fade),
                    )
                })
                .collect();

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Eye Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.color_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        // The left eye clears the shared texture; the right
                        // eye draws into its own viewport on top.
                        load: if eye == 0 {
                            wgpu::LoadOp::Clear(wgpu::Color::TRANSPARENT)
                        } else {
                            wgpu::LoadOp::Load
                        },
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.targets.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        // Reverse-Z clear.
                        load: wgpu::LoadOp::Clear(0.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            let (vx, vy, vw, vh) = self.targets.viewport(eye);
            pass.set_viewport(vx, vy, vw, vh, 0.0, 1.0);

            pass.set_pipeline(&self.pipeline);
            pass.set_bind_group(1, video_bind, &[]);
            pass.set_vertex_buffer(
                BufferIndex::MeshPositions.slot(),
                self.quad_vb.slice(..QUAD_UV_OFFSET),
            );
            pass.set_vertex_buffer(
                BufferIndex::MeshGenerics.slot(),
                self.quad_vb.slice(QUAD_UV_OFFSET..),
            );

            // Video quad first, then each overlay plane with its own slot.
            pass.set_bind_group(0, &self.uniforms_bind, &[frame_offset, video_offset]);
            pass.draw(0..4, 0..1);

            for plane_offset in plane_offsets {
                pass.set_bind_group(0, &self.uniforms_bind, &[frame_offset, plane_offset]);
                pass.draw(0..4, 0..1);
            }
        }

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }
}
