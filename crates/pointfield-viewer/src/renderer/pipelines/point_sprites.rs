//! Additively blended, round point sprites for both animator layers.

use crate::camera::CameraUniform;
use pointfield::{Layer, LayerView, RenderSurface};
use wgpu::util::DeviceExt;

/// Per-layer sprite parameters. Must match `SpriteUniform` in `point_sprites.wgsl`.
#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteUniform {
    /// Sprite diameter in world units.
    pub size: f32,
    pub opacity: f32,
    pub _pad: [f32; 2],
}

const ADDITIVE: wgpu::BlendState = wgpu::BlendState {
    color: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::SrcAlpha,
        dst_factor: wgpu::BlendFactor::One,
        operation:  wgpu::BlendOperation::Add,
    },
    alpha: wgpu::BlendComponent {
        src_factor: wgpu::BlendFactor::One,
        dst_factor: wgpu::BlendFactor::One,
        operation:  wgpu::BlendOperation::Add,
    },
};

const CENTER_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![1 => Float32x3];
const COLOR_ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![2 => Float32x3];

/// GPU-resident copy of one animator layer.
pub struct LayerGpu {
    /// Interleaved xyz, rewritten whenever the layer is marked dirty.
    pub positions: wgpu::Buffer,
    /// Interleaved linear rgb, written once at mount time.
    pub colors: wgpu::Buffer,
    pub ubo: wgpu::Buffer,
    pub bind: wgpu::BindGroup,
    pub count: u32,
}

/// The two sprite layers; a `None` slot is not mounted.
#[derive(Default)]
pub struct PointLayers {
    pub ground: Option<LayerGpu>,
    pub particles: Option<LayerGpu>,
}

impl PointLayers {
    pub fn get(&self, layer: Layer) -> Option<&LayerGpu> {
        match layer {
            Layer::Ground => self.ground.as_ref(),
            Layer::Particles => self.particles.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, layer: Layer) -> &mut Option<LayerGpu> {
        match layer {
            Layer::Ground => &mut self.ground,
            Layer::Particles => &mut self.particles,
        }
    }

    /// Releases both layers' GPU buffers.
    pub fn unmount_all(&mut self) {
        self.ground = None;
        self.particles = None;
    }
}

/// Uploads dirty layers straight into their vertex buffers.
pub struct LayerUploader<'a> {
    pub queue: &'a wgpu::Queue,
    pub layers: &'a PointLayers,
}

impl RenderSurface for LayerUploader<'_> {
    fn is_mounted(&self, layer: Layer) -> bool {
        self.layers.get(layer).is_some()
    }

    fn mark_dirty(&mut self, layer: Layer, view: LayerView<'_>) {
        match self.layers.get(layer) {
            Some(gpu) if !view.positions.is_empty() => {
                self.queue
                    .write_buffer(&gpu.positions, 0, bytemuck::cast_slice(view.positions));
            }
            _ => {}
        }
    }
}

/// Expands a layer's colors to one linear rgb triple per point.
pub fn layer_colors(view: &LayerView<'_>) -> Vec<f32> {
    match view.colors {
        Some(colors) => colors.to_vec(),
        None => {
            let rgb = view
                .style
                .color
                .map(|c| c.to_linear().to_array())
                .unwrap_or([1.0; 3]);
            rgb.repeat(view.len())
        }
    }
}

pub struct PointSpritePipeline {
    pipeline:      wgpu::RenderPipeline,
    sprite_layout: wgpu::BindGroupLayout,
    camera_ubo:    wgpu::Buffer,
    camera_bind:   wgpu::BindGroup,
    quad_vb:       wgpu::Buffer,
}

impl PointSpritePipeline {
    pub fn new(device: &wgpu::Device, color_fmt: wgpu::TextureFormat) -> Self {
        let uniform_entry = |visibility, size: usize| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: wgpu::BufferSize::new(size as u64),
            },
            count: None,
        };

        let camera_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Camera BGL"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX,
                std::mem::size_of::<CameraUniform>(),
            )],
        });

        let sprite_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Layer BGL"),
            entries: &[uniform_entry(
                wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                std::mem::size_of::<SpriteUniform>(),
            )],
        });

        let camera_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sprite Camera UBO"),
            size: std::mem::size_of::<CameraUniform>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let camera_bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Sprite Camera BindGroup"),
            layout: &camera_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_ubo.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shaders/point_sprites.wgsl"),
            source: wgpu::ShaderSource::Wgsl(
                include_str!("../../../shaders/point_sprites.wgsl").into(),
            ),
        });

        // Billboard quad; the fragment shader rounds it off.
        let quad_corners: [[f32; 2]; 6] = [
            [-1.0, -1.0],
            [1.0, -1.0],
            [1.0, 1.0],
            [-1.0, -1.0],
            [1.0, 1.0],
            [-1.0, 1.0],
        ];

        let quad_vb = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Quad VB"),
            contents: bytemuck::cast_slice(&quad_corners),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let vbuf_layouts = [
            // Quad corners
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 2]>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &[wgpu::VertexAttribute {
                    shader_location: 0,
                    offset: 0,
                    format: wgpu::VertexFormat::Float32x2,
                }],
            },
            // Point centers
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &CENTER_ATTRS,
            },
            // Point colors
            wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<[f32; 3]>() as u64,
                step_mode: wgpu::VertexStepMode::Instance,
                attributes: &COLOR_ATTRS,
            },
        ];

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite PipelineLayout"),
            bind_group_layouts: &[&camera_layout, &sprite_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Point Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &vbuf_layouts,
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                ..Default::default()
            },
            // Additive sprites are order independent; no depth test.
            depth_stencil: None,
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: color_fmt,
                    blend: Some(ADDITIVE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
        });

        Self {
            pipeline,
            sprite_layout,
            camera_ubo,
            camera_bind,
            quad_vb,
        }
    }

    pub fn update_camera(&self, queue: &wgpu::Queue, camera: &CameraUniform) {
        queue.write_buffer(&self.camera_ubo, 0, bytemuck::bytes_of(camera));
    }

    /// Allocates GPU buffers for a layer and uploads its current contents.
    pub fn create_layer(&self, device: &wgpu::Device, label: &str, view: &LayerView<'_>) -> LayerGpu {
        // Zero-length vertex buffers cannot be bound; keep a minimum size.
        let padded = |data: &[f32]| {
            let mut bytes = bytemuck::cast_slice::<f32, u8>(data).to_vec();
            if bytes.is_empty() {
                bytes.resize(16, 0);
            }
            bytes
        };

        let positions = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Positions")),
            contents: &padded(view.positions),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        let colors = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Colors")),
            contents: &padded(&layer_colors(view)),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let sprite = SpriteUniform {
            size: view.style.size,
            opacity: view.style.opacity,
            _pad: [0.0; 2],
        };
        let ubo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Sprite UBO")),
            contents: bytemuck::bytes_of(&sprite),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let bind = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(&format!("{label} Sprite BindGroup")),
            layout: &self.sprite_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: ubo.as_entire_binding(),
            }],
        });

        LayerGpu {
            positions,
            colors,
            ubo,
            bind,
            count: view.len() as u32,
        }
    }

    pub fn draw_layer<'a>(&'a self, rpass: &mut wgpu::RenderPass<'a>, layer: &'a LayerGpu) {
        if layer.count == 0 {
            return;
        }
        rpass.set_pipeline(&self.pipeline);
        rpass.set_bind_group(0, &self.camera_bind, &[]);
        rpass.set_bind_group(1, &layer.bind, &[]);
        rpass.set_vertex_buffer(0, self.quad_vb.slice(..));
        rpass.set_vertex_buffer(1, layer.positions.slice(..));
        rpass.set_vertex_buffer(2, layer.colors.slice(..));
        rpass.draw(0..6, 0..layer.count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointfield::{Rgb, SpriteStyle};

    #[test]
    fn uniform_colors_are_expanded_per_point() {
        let positions = [0.0f32; 9];
        let view = LayerView {
            positions: &positions,
            colors: None,
            style: SpriteStyle {
                size: 0.15,
                opacity: 0.6,
                color: Some(Rgb([1.0, 0.0, 0.0])),
            },
        };
        let colors = layer_colors(&view);
        assert_eq!(colors.len(), 9);
        assert!((colors[6] - 1.0).abs() < 1e-5);
        assert_eq!(&colors[7..], &[0.0, 0.0]);
    }

    #[test]
    fn vertex_colors_pass_through() {
        let positions = [0.0f32; 6];
        let colors = [0.1f32, 0.2, 0.3, 0.4, 0.5, 0.6];
        let view = LayerView {
            positions: &positions,
            colors: Some(&colors),
            style: SpriteStyle {
                size: 0.18,
                opacity: 0.9,
                color: None,
            },
        };
        assert_eq!(layer_colors(&view), colors.to_vec());
    }

    #[test]
    fn sprite_uniform_is_16_bytes() {
        assert_eq!(std::mem::size_of::<SpriteUniform>(), 16);
    }
}
