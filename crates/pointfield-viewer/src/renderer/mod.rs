//! The main rendering orchestrator. Owns the GPU context, render targets,
//! the sprite layers and the post-processing stack.

pub mod context;
pub mod pipelines;
pub mod targets;

use self::{
    context::GfxContext,
    pipelines::{
        point_sprites::{LayerUploader, PointLayers, PointSpritePipeline},
        post_stack::PostStack,
    },
    targets::Targets,
};
use crate::camera::Camera;
use pointfield::{Layer, PointFieldAnimator};
use std::sync::Arc;
use winit::window::Window;

/// Owns all rendering-related state.
pub struct Renderer {
    pub gfx: GfxContext,
    pub targets: Targets,
    pub sprites: PointSpritePipeline,
    pub layers: PointLayers,
    pub post_stack: PostStack,
    pub egui_renderer: egui_wgpu::Renderer,
}

impl Renderer {
    pub async fn new(window: Arc<Window>, vsync: bool) -> anyhow::Result<Self> {
        let gfx = GfxContext::new(window, vsync).await?;
        let size = gfx.size;

        let targets = Targets::new(&gfx.device, size);
        let sprites = PointSpritePipeline::new(&gfx.device, targets.scene_fmt);
        let post_stack = PostStack::new(&gfx.device, gfx.config.format, size.width, size.height);

        let egui_renderer =
            egui_wgpu::Renderer::new(&gfx.device, gfx.config.format, None, 1);

        Ok(Self {
            gfx,
            targets,
            sprites,
            layers: PointLayers::default(),
            post_stack,
            egui_renderer,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.gfx.resize(new_size);
            self.targets.resize(&self.gfx.device, new_size);
            self.post_stack.resize(&self.gfx.device, new_size.width, new_size.height);
        }
    }

    /// Surface handed to the animator's tick; writes dirty layers to the GPU.
    pub fn uploader(&self) -> LayerUploader<'_> {
        LayerUploader {
            queue: &self.gfx.queue,
            layers: &self.layers,
        }
    }

    /// Creates GPU buffers for every layer that is not mounted yet.
    /// Returns how many layers were mounted.
    pub fn mount_missing<R>(&mut self, animator: &PointFieldAnimator<R>) -> usize {
        let mut mounted = 0;
        for layer in Layer::ALL {
            let slot = self.layers.slot_mut(layer);
            if slot.is_some() {
                continue;
            }
            let view = animator.view(layer);
            log::debug!("Mounting {:?} layer with {} points", layer, view.len());
            *slot = Some(self.sprites.create_layer(
                &self.gfx.device,
                &format!("{layer:?}"),
                &view,
            ));
            mounted += 1;
        }
        mounted
    }

    /// Drops every layer, e.g. before the field is rebuilt with new counts.
    pub fn unmount_all(&mut self) {
        self.layers.unmount_all();
    }

    pub fn render(&mut self, swap_view: &wgpu::TextureView, camera: &Camera) {
        self.sprites.update_camera(&self.gfx.queue, &camera.uniform());

        let mut encoder = self
            .gfx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Frame Encoder"),
            });

        // Pass 1: Sprites -> HDR scene target
        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Sprite Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.targets.scene,
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

            for layer in Layer::ALL {
                if let Some(gpu) = self.layers.get(layer) {
                    self.sprites.draw_layer(&mut pass, gpu);
                }
            }
        }

        // Pass 2..N: Bloom and vignette
        self.post_stack.run(
            &self.gfx.device,
            &self.gfx.queue,
            &mut encoder,
            swap_view,
            &self.targets.scene,
        );

        self.gfx.queue.submit(std::iter::once(encoder.finish()));
    }

    /// Draws tessellated egui output on top of the finished frame.
    pub fn render_overlay(
        &mut self,
        swap_view: &wgpu::TextureView,
        shapes: &[egui::ClippedPrimitive],
        textures: &egui::TexturesDelta,
        pixels_per_point: f32,
    ) {
        let device = &self.gfx.device;
        let queue = &self.gfx.queue;
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.gfx.config.width, self.gfx.config.height],
            pixels_per_point,
        };

        for (id, delta) in &textures.set {
            self.egui_renderer.update_texture(device, queue, *id, delta);
        }

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("UI Encoder"),
        });
        self.egui_renderer
            .update_buffers(device, queue, &mut encoder, shapes, &screen);

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("EGUI Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: swap_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer.render(&mut pass, shapes, &screen);
        }

        for id in &textures.free {
            self.egui_renderer.free_texture(id);
        }

        queue.submit(std::iter::once(encoder.finish()));
    }
}
