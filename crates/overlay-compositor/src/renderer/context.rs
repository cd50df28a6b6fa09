use anyhow::{anyhow, Result};

/// Holds the GPU device and queue. The compositor renders into an
/// offscreen texture consumed by the platform layer, so no surface or
/// window is involved.
pub struct GfxContext {
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GfxContext {
    /// Acquires a headless device on a high-performance adapter.
    pub async fn new() -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor::default());

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .ok_or_else(|| anyhow!("Failed to find a suitable GPU adapter."))?;

        let info = adapter.get_info();
        log::info!("Using adapter: {} ({:?})", info.name, info.backend);

        // Request a device and its command queue.
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("Compositor Device"),
                    required_features: wgpu::Features::empty(),
                    // Use default limits for broad compatibility.
                    required_limits: wgpu::Limits::default(),
                },
                None, // no trace
            )
            .await?;

        Ok(Self { device, queue })
    }
}
