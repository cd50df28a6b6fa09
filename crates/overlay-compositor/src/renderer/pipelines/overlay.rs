//! The overlay render pipeline, specialized by the foveation constant set.
//!
//! Specialization happens once per pipeline build: the resolved constants
//! go into wgpu's pipeline-overridable constants (WGSL `@id(N) override`,
//! keyed by the decimal id). Pipelines are cached per distinct constant
//! combination; toggling foveation means fetching (or building) another
//! pipeline object, never flipping a per-frame flag.

use anyhow::Result;
use shader_abi::{BufferIndex, FoveationSettings, TextureIndex, VertexAttribute};
use std::collections::HashMap;
use std::sync::Arc;

use crate::renderer::targets::{COLOR_FORMAT, DEPTH_FORMAT};

/// WGSL source shared with the shader build; binding and override ids in it
/// must agree with the `shader_abi` registry (see the tests below).
pub const OVERLAY_SHADER: &str = include_str!("../../../shaders/overlay.wgsl");

pub struct OverlayPipelines {
    pub uniforms_layout: wgpu::BindGroupLayout,
    pub texture_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    shader: wgpu::ShaderModule,
    cache: HashMap<shader_abi::foveation::PipelineKey, Arc<wgpu::RenderPipeline>>,
}

impl OverlayPipelines {
    pub fn new(device: &wgpu::Device) -> Self {
        // Uniform blocks. Frame and plane uniforms live in ring buffers and
        // bind with dynamic offsets; the slot sizes are 256-byte aligned so
        // every binding covers the shader-visible struct size.
        let uniform_entry = |binding: u32, visibility, dynamic| wgpu::BindGroupLayoutEntry {
            binding,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: None,
            },
            count: None,
        };
        let uniforms_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Uniforms Layout"),
            entries: &[
                uniform_entry(
                    BufferIndex::Uniforms.slot(),
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    true,
                ),
                uniform_entry(
                    BufferIndex::PlaneUniforms.slot(),
                    wgpu::ShaderStages::VERTEX_FRAGMENT,
                    true,
                ),
                uniform_entry(
                    BufferIndex::EncodingUniforms.slot(),
                    wgpu::ShaderStages::FRAGMENT,
                    false,
                ),
            ],
        });

        // Decoded video texture plus its sampler.
        let texture_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Overlay Texture Layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: TextureIndex::Color.slot(),
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: TextureIndex::Color.slot() + 1,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Overlay PipelineLayout"),
            bind_group_layouts: &[&uniforms_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/overlay.wgsl"),
            source: wgpu::ShaderSource::Wgsl(OVERLAY_SHADER.into()),
        });

        Self {
            uniforms_layout,
            texture_layout,
            pipeline_layout,
            shader,
            cache: HashMap::new(),
        }
    }

    /// Number of pipelines built so far.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Returns the pipeline for `settings`, building it on first use.
    /// Fails fast when an enabled set carries missing or zero parameters.
    pub fn get_or_build(
        &mut self,
        device: &wgpu::Device,
        settings: &FoveationSettings,
    ) -> Result<Arc<wgpu::RenderPipeline>> {
        let key = settings.pipeline_key();
        if let Some(pipeline) = self.cache.get(&key) {
            return Ok(pipeline.clone());
        }

        let constants = settings.resolve()?.to_override_map();
        log::info!(
            "Building overlay pipeline (foveation {})",
            if settings.enabled { "enabled" } else { "disabled" }
        );

        let compilation_options = wgpu::PipelineCompilationOptions {
            constants: &constants,
            ..Default::default()
        };

        // Vertex buffer layouts: positions and texcoords come from separate
        // buffer slots, as the registry lays them out.
        let vbuf_layouts = [
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 3) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    shader_location: VertexAttribute::Position.slot(),
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x3,
                }],
            },
            wgpu::VertexBufferLayout {
                array_stride: (std::mem::size_of::<f32>() * 2) as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    shader_location: VertexAttribute::Texcoord.slot(),
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            },
        ];

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Overlay Pipeline"),
            layout: Some(&self.pipeline_layout),
            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: "vs_main",
                buffers: &vbuf_layouts,
                compilation_options: compilation_options.clone(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleStrip,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: DEPTH_FORMAT,
                depth_write_enabled: true,
                // Reverse-Z.
                depth_compare: wgpu::CompareFunction::Greater,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: COLOR_FORMAT,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options,
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        let pipeline = Arc::new(pipeline);
        self.cache.insert(key, pipeline.clone());
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shader_abi::FoveationConstant;

    // The WGSL source is the shader side of the contract; these tests pin
    // its declarations to the registry so the two cannot drift apart.

    #[test]
    fn shader_declares_the_registry_bindings() {
        for slot in [
            BufferIndex::Uniforms,
            BufferIndex::PlaneUniforms,
            BufferIndex::EncodingUniforms,
        ] {
            let needle = format!("@binding({})", slot.slot());
            assert!(
                OVERLAY_SHADER.contains(&needle),
                "shader is missing {needle}"
            );
        }
        let tex = format!("@binding({}) var color_tex", TextureIndex::Color.slot());
        assert!(OVERLAY_SHADER.contains(&tex));
    }

    #[test]
    fn shader_declares_the_vertex_locations() {
        for attr in VertexAttribute::ALL {
            let needle = format!("@location({})", attr.slot());
            assert!(
                OVERLAY_SHADER.contains(&needle),
                "shader is missing {needle}"
            );
        }
    }

    #[test]
    fn shader_declares_every_foveation_override() {
        for c in [
            FoveationConstant::Enabled,
            FoveationConstant::TargetResolution,
            FoveationConstant::OptimizedResolution,
            FoveationConstant::EyeSizeRatio,
            FoveationConstant::CenterSize,
            FoveationConstant::CenterShift,
            FoveationConstant::EdgeRatio,
        ] {
            let needle = format!("@id({}) override", c.id());
            assert!(
                OVERLAY_SHADER.contains(&needle),
                "shader is missing {needle}"
            );
        }
    }
}
