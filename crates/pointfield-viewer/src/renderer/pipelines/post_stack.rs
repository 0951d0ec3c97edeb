use wgpu::util::DeviceExt;

/// Intermediate texture format
const INTERMEDIATE_FMT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

/// Full-screen triangle vertices
const FS_TRI: [[f32; 2]; 3] = [
    [-1.0, -1.0],
    [3.0, -1.0],
    [-1.0, 3.0],
];

/// Ping‑pong textures for the bloom passes
pub struct PingPong {
    pub ping: wgpu::TextureView,
    pub pong: wgpu::TextureView,
    size: wgpu::Extent3d,
    _tex_ping: wgpu::Texture,
    _tex_pong: wgpu::Texture,
}

impl PingPong {
    pub fn new(device: &wgpu::Device, width: u32, height: u32) -> Self {
        fn make_tex(device: &wgpu::Device, width: u32, height: u32) -> wgpu::Texture {
            device.create_texture(&wgpu::TextureDescriptor {
                label: Some("PostStack PingPong"),
                size: wgpu::Extent3d {
                    width,
                    height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: 1,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: INTERMEDIATE_FMT,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT
                    | wgpu::TextureUsages::TEXTURE_BINDING,
                view_formats: &[],
            })
        }

        let width = width.max(1);
        let height = height.max(1);
        let tex_ping = make_tex(device, width, height);
        let tex_pong = make_tex(device, width, height);
        let ping = tex_ping.create_view(&wgpu::TextureViewDescriptor::default());
        let pong = tex_pong.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            ping,
            pong,
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            _tex_ping: tex_ping,
            _tex_pong: tex_pong,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        if self.size.width == width.max(1) && self.size.height == height.max(1) {
            return;
        }
        *self = Self::new(device, width, height);
    }
}

// -------------------- Uniform Buffers --------------------

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct UboBright {
    threshold: f32,
    _pad: [f32; 3],
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct UboBlur {
    direction: [f32; 2],
    spread_px: f32,
    _pad: f32,
}

#[repr(C)]
#[derive(Clone, Copy, bytemuck::Pod, bytemuck::Zeroable, Default)]
struct UboComposite {
    bloom_intensity: f32,
    vignette_offset: f32,
    vignette_darkness: f32,
    /// 1.0 applies the vignette, 0.0 skips it.
    vignette_on: f32,
}

// -------------------- Post Parameters & Stack --------------------

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostParams {
    /// Luminance above which pixels feed the bloom.
    pub bloom_threshold: f32,
    pub bloom_intensity: f32,
    /// Blur spread in `[0, 1]`.
    pub bloom_radius: f32,
    pub vignette_offset: f32,
    pub vignette_darkness: f32,

    pub bloom_on: bool,
    pub vignette_on: bool,
}

impl Default for PostParams {
    fn default() -> Self {
        Self {
            bloom_threshold: 0.15,
            bloom_intensity: 1.5,
            bloom_radius: 0.6,
            vignette_offset: 0.1,
            vignette_darkness: 1.1,

            bloom_on: true,
            vignette_on: true,
        }
    }
}

impl PostParams {
    /// Pixel distance between blur taps.
    pub fn blur_spread_px(&self) -> f32 {
        1.0 + 4.0 * self.bloom_radius.clamp(0.0, 1.0)
    }
}

struct BrightPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    ubo: wgpu::Buffer,
    fs_vbo: wgpu::Buffer,
}

struct BlurPass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    ubo: wgpu::Buffer,
    fs_vbo: wgpu::Buffer,
}

struct CompositePass {
    pipeline: wgpu::RenderPipeline,
    layout: wgpu::BindGroupLayout,
    ubo: wgpu::Buffer,
    fs_vbo: wgpu::Buffer,
}

pub struct PostStack {
    pingpong: PingPong,
    bright: BrightPass,
    // Separate passes so each direction owns its UBO within one submit.
    blur_h: BlurPass,
    blur_v: BlurPass,
    composite: CompositePass,
    pub params: PostParams,
}

impl PostStack {
    pub fn new(
        device: &wgpu::Device,
        out_fmt: wgpu::TextureFormat,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            pingpong: PingPong::new(device, width, height),
            bright: BrightPass::new(device, INTERMEDIATE_FMT),
            blur_h: BlurPass::new(device, INTERMEDIATE_FMT),
            blur_v: BlurPass::new(device, INTERMEDIATE_FMT),
            composite: CompositePass::new(device, out_fmt),
            params: PostParams::default(),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.pingpong.resize(device, width, height);
    }

    /// Run the post‑processing chain: bright pass → blur H → blur V → composite
    pub fn run(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        swapchain_dst: &wgpu::TextureView,
        scene_color_src: &wgpu::TextureView,
    ) {
        let p = &self.params;
        let spread_px = p.blur_spread_px();

        let bloom = if p.bloom_on {
            self.bright.draw(
                device,
                queue,
                encoder,
                &self.pingpong.ping,
                scene_color_src,
                scene_color_src,
                &UboBright {
                    threshold: p.bloom_threshold,
                    _pad: [0.0; 3],
                },
            );
            self.blur_h.draw(
                device,
                queue,
                encoder,
                &self.pingpong.pong,
                &self.pingpong.ping,
                scene_color_src,
                &UboBlur {
                    direction: [1.0, 0.0],
                    spread_px,
                    _pad: 0.0,
                },
            );
            self.blur_v.draw(
                device,
                queue,
                encoder,
                &self.pingpong.ping,
                &self.pingpong.pong,
                scene_color_src,
                &UboBlur {
                    direction: [0.0, 1.0],
                    spread_px,
                    _pad: 0.0,
                },
            );
            Some(&self.pingpong.ping)
        } else {
            None
        };

        // Without bloom the composite reads the scene twice at zero weight.
        self.composite.draw(
            device,
            queue,
            encoder,
            swapchain_dst,
            scene_color_src,
            bloom.unwrap_or(scene_color_src),
            &UboComposite {
                bloom_intensity: if bloom.is_some() { p.bloom_intensity } else { 0.0 },
                vignette_offset: p.vignette_offset,
                vignette_darkness: p.vignette_darkness,
                vignette_on: if p.vignette_on { 1.0 } else { 0.0 },
            },
        );
    }
}

// -------------------- Pass Implementations --------------------

macro_rules! create_post_pass {
    ($name:ident, $ubo_type:ty, $shader:expr) => {
        impl $name {
            pub fn new(device: &wgpu::Device, out_fmt: wgpu::TextureFormat) -> Self {
                let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
                    binding,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        sample_type: wgpu::TextureSampleType::Float { filterable: false },
                        view_dimension: wgpu::TextureViewDimension::D2,
                        multisampled: false,
                    },
                    count: None,
                };

                let layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some(concat!(stringify!($name), " Layout")),
                    entries: &[
                        texture_entry(0),
                        texture_entry(1),
                        wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Buffer {
                                ty: wgpu::BufferBindingType::Uniform,
                                has_dynamic_offset: false,
                                min_binding_size: wgpu::BufferSize::new(
                                    std::mem::size_of::<$ubo_type>() as u64,
                                ),
                            },
                            count: None,
                        },
                    ],
                });

                let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
                    label: Some($shader),
                    source: wgpu::ShaderSource::Wgsl(
                        include_str!(concat!("../../../shaders/", $shader)).into(),
                    ),
                });

                let pipe_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                    label: Some(concat!(stringify!($name), " PipelineLayout")),
                    bind_group_layouts: &[&layout],
                    push_constant_ranges: &[],
                });

                let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
                    label: Some(concat!(stringify!($name), " Pipeline")),
                    layout: Some(&pipe_layout),
                    vertex: wgpu::VertexState {
                        module: &shader,
                        entry_point: "vs_main",
                        buffers: &[wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                            step_mode: wgpu::VertexStepMode::Vertex,
                            attributes: &[wgpu::VertexAttribute {
                                shader_location: 0,
                                offset: 0,
                                format: wgpu::VertexFormat::Float32x2,
                            }],
                        }],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    },
                    fragment: Some(wgpu::FragmentState {
                        module: &shader,
                        entry_point: "fs_main",
                        targets: &[Some(wgpu::ColorTargetState {
                            format: out_fmt,
                            blend: None,
                            write_mask: wgpu::ColorWrites::ALL,
                        })],
                        compilation_options: wgpu::PipelineCompilationOptions::default(),
                    }),
                    primitive: wgpu::PrimitiveState::default(),
                    depth_stencil: None,
                    multisample: wgpu::MultisampleState::default(),
                    multiview: None,
                });

                let ubo = device.create_buffer(&wgpu::BufferDescriptor {
                    label: Some(concat!(stringify!($name), " UBO")),
                    size: std::mem::size_of::<$ubo_type>() as u64,
                    usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                    mapped_at_creation: false,
                });

                let fs_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some(concat!(stringify!($name), " FS VBO")),
                    contents: bytemuck::cast_slice(&FS_TRI),
                    usage: wgpu::BufferUsages::VERTEX,
                });

                Self {
                    pipeline,
                    layout,
                    ubo,
                    fs_vbo,
                }
            }

            /// Writes the pass parameters and draws `t_a`/`t_b` into `dst`.
            pub fn draw(
                &self,
                device: &wgpu::Device,
                queue: &wgpu::Queue,
                encoder: &mut wgpu::CommandEncoder,
                dst: &wgpu::TextureView,
                t_a: &wgpu::TextureView,
                t_b: &wgpu::TextureView,
                params: &$ubo_type,
            ) {
                queue.write_buffer(&self.ubo, 0, bytemuck::bytes_of(params));
                let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some(concat!(stringify!($name), " Bind")),
                    layout: &self.layout,
                    entries: &[
                        wgpu::BindGroupEntry {
                            binding: 0,
                            resource: wgpu::BindingResource::TextureView(t_a),
                        },
                        wgpu::BindGroupEntry {
                            binding: 1,
                            resource: wgpu::BindingResource::TextureView(t_b),
                        },
                        wgpu::BindGroupEntry {
                            binding: 2,
                            resource: self.ubo.as_entire_binding(),
                        },
                    ],
                });
                execute_pass(
                    &self.pipeline,
                    encoder,
                    &bind,
                    &self.fs_vbo,
                    dst,
                    concat!(stringify!($name), " Pass"),
                );
            }
        }
    };
}

create_post_pass!(BrightPass, UboBright, "bright.wgsl");
create_post_pass!(BlurPass, UboBlur, "blur.wgsl");
create_post_pass!(CompositePass, UboComposite, "composite.wgsl");

fn execute_pass(
    pipeline: &wgpu::RenderPipeline,
    encoder: &mut wgpu::CommandEncoder,
    bind_group: &wgpu::BindGroup,
    fs_vbo: &wgpu::Buffer,
    dst: &wgpu::TextureView,
    label: &str,
) {
    let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: dst,
            resolve_target: None,
            ops: wgpu::Operations {
                load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: None,
        timestamp_writes: None,
        occlusion_query_set: None,
    });

    rpass.set_pipeline(pipeline);
    rpass.set_bind_group(0, bind_group, &[]);
    rpass.set_vertex_buffer(0, fs_vbo.slice(..));
    rpass.draw(0..3, 0..1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniforms_are_16_bytes() {
        assert_eq!(std::mem::size_of::<UboBright>(), 16);
        assert_eq!(std::mem::size_of::<UboBlur>(), 16);
        assert_eq!(std::mem::size_of::<UboComposite>(), 16);
    }

    #[test]
    fn blur_spread_tracks_radius() {
        let mut p = PostParams::default();
        assert!((p.blur_spread_px() - 3.4).abs() < 1e-6);
        p.bloom_radius = 5.0;
        assert_eq!(p.blur_spread_px(), 5.0);
    }
}
