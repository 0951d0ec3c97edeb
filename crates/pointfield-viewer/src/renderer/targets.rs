//! Offscreen HDR target the sprite layers are drawn into before post-processing.

pub struct Targets {
    // Keep the texture alive for the lifetime of the view.
    _scene_tex: wgpu::Texture,

    /// Additively accumulated scene color, read by the post stack.
    pub scene: wgpu::TextureView,
    pub scene_fmt: wgpu::TextureFormat,
    pub size: winit::dpi::PhysicalSize<u32>,
}

impl Targets {
    pub fn new(device: &wgpu::Device, size: winit::dpi::PhysicalSize<u32>) -> Self {
        let width = size.width.max(1);
        let height = size.height.max(1);

        // Additive sprites overshoot 1.0 where they overlap; bloom reads the excess.
        let scene_fmt = wgpu::TextureFormat::Rgba16Float;

        let scene_tex = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("Scene Color Target"),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: scene_fmt,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });

        Self {
            scene: scene_tex.create_view(&wgpu::TextureViewDescriptor::default()),
            _scene_tex: scene_tex,
            scene_fmt,
            size: winit::dpi::PhysicalSize::new(width, height),
        }
    }

    /// Recreates the target for a new window size.
    pub fn resize(&mut self, device: &wgpu::Device, size: winit::dpi::PhysicalSize<u32>) {
        *self = Self::new(device, size);
    }
}
