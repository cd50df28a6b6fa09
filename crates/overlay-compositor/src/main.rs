//! Headless smoke run: bring up the compositor, feed it a test-pattern
//! "video" texture, and render a few frames with foveation enabled.

use anyhow::Result;
use glam::{Mat4, Vec3, Vec4};
use overlay_compositor::{
    encoding::{ColorRange, ColorSpace, VideoColorMetadata},
    Compositor, FrameInputs, OverlayPlane,
};
use shader_abi::FoveationSettings;

fn main() -> Result<()> {
    // Initialize logging; default to "info" if RUST_LOG is unset.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let foveation = FoveationSettings {
        enabled: true,
        target_resolution: 1920.0,
        optimized_resolution: 1280.0,
        eye_size_ratio: 0.5,
        center_size: 0.4,
        center_shift: 0.1,
        edge_ratio: 4.0,
    };

    let mut compositor = match pollster::block_on(Compositor::new(1024, 1024, foveation)) {
        Ok(c) => c,
        Err(err) => {
            // Machines without a GPU adapter are fine for a smoke run.
            log::error!("Compositor unavailable: {err}");
            return Ok(());
        }
    };

    let video = make_test_pattern(&compositor.gfx.device, &compositor.gfx.queue);
    compositor.set_video_texture(&video.create_view(&wgpu::TextureViewDescriptor::default()));
    compositor.set_color_metadata(VideoColorMetadata {
        space: ColorSpace::Bt709,
        range: ColorRange::Limited,
        gamma: 1.0,
    });

    let planes = [
        OverlayPlane {
            transform: Mat4::from_translation(Vec3::new(0.0, 0.0, -2.0)),
            color: Vec4::new(0.1, 0.6, 0.9, 0.8),
            proximity_fade: 1.0,
        },
        OverlayPlane {
            transform: Mat4::from_rotation_y(0.7) * Mat4::from_translation(Vec3::new(0.5, 0.0, -3.0)),
            color: Vec4::new(0.9, 0.9, 0.9, 0.5),
            proximity_fade: 0.0,
        },
    ];

    for frame in 0..3 {
        let inputs = FrameInputs {
            device_anchor: Mat4::from_rotation_y(frame as f32 * 0.01),
            ..FrameInputs::identity()
        };
        compositor.render_frame(&inputs, &planes)?;
        log::info!("Rendered frame {frame}");
    }

    // Flipping foveation off is a pipeline rebuild, exercised once here.
    compositor.set_foveation(&FoveationSettings::DISABLED)?;
    compositor.render_frame(&FrameInputs::identity(), &planes)?;
    log::info!(
        "Done; {} pipeline(s) in the cache",
        compositor.pipeline_count()
    );

    Ok(())
}

/// A side-by-side gradient standing in for a decoded video frame.
fn make_test_pattern(device: &wgpu::Device, queue: &wgpu::Queue) -> wgpu::Texture {
    const W: u32 = 256;
    const H: u32 = 128;

    let mut pixels = vec![0u8; (W * H * 4) as usize];
    for y in 0..H {
        for x in 0..W {
            let i = ((y * W + x) * 4) as usize;
            pixels[i] = (x * 255 / W) as u8;
            pixels[i + 1] = (y * 255 / H) as u8;
            pixels[i + 2] = 128;
            pixels[i + 3] = 255;
        }
    }

    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Pattern"),
        size: wgpu::Extent3d {
            width: W,
            height: H,
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });

    queue.write_texture(
        wgpu::ImageCopyTexture {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        &pixels,
        wgpu::ImageDataLayout {
            offset: 0,
            bytes_per_row: Some(W * 4),
            rows_per_image: Some(H),
        },
        wgpu::Extent3d {
            width: W,
            height: H,
            depth_or_array_layers: 1,
        },
    );

    texture
}
