//! Offscreen render targets: both eyes side by side in one color texture,
//! with a shared depth buffer. The platform layer picks the finished color
//! texture up for display, so it is also shader-readable and copyable.

/// HDR-capable color format the display layer consumes.
pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;
/// Depth format; reverse-Z, cleared to 0.0.
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

pub struct EyeTargets {
    pub color: wgpu::Texture,
    pub color_view: wgpu::TextureView,
    pub depth: wgpu::Texture,
    pub depth_view: wgpu::TextureView,
    pub eye_width: u32,
    pub eye_height: u32,
}

impl EyeTargets {
    /// Creates targets sized `2 * eye_width x eye_height`.
    pub fn new(device: &wgpu::Device, eye_width: u32, eye_height: u32) -> Self {
        let size = wgpu::Extent3d {
            width: eye_width * 2,
            height: eye_height,
            depth_or_array_layers: 1,
        };

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Eye Color Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());

        let depth = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Eye Depth Target"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            color,
            color_view,
            depth,
            depth_view,
            eye_width,
            eye_height,
        }
    }

    /// Viewport rectangle `(x, y, w, h)` of one eye.
    pub fn viewport(&self, eye: u32) -> (f32, f32, f32, f32) {
        (
            eye as f32 * self.eye_width as f32,
            0.0,
            self.eye_width as f32,
            self.eye_height as f32,
        )
    }
}
