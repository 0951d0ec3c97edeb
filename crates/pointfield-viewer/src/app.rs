use crate::{
    camera::Camera,
    config::Config,
    input::{FrameClock, PointerTracker},
    renderer::Renderer,
    ui::{self, HudStats, UiAction},
};
use anyhow::Result;
use pointfield::{FieldConfig, FrameInput, PointFieldAnimator, Preset};
use std::sync::Arc;
use winit::{
    event::{ElementState, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

pub struct App {
    pub renderer: Renderer,
    pub camera: Camera,
    pub pointer: PointerTracker,
    pub clock: FrameClock,
    pub animator: PointFieldAnimator,
    pub cli: Config,
    pub preset: Preset,
    pub seed: u64,
    pub egui_ctx: egui::Context,
    pub egui_state: egui_winit::State,
    pub show_debug: bool,
    recycled_total: u64,
}

impl App {
    pub async fn new(window: Arc<Window>, cli: Config) -> Result<Self> {
        let field = cli.field_config()?;
        let seed = cli.seed();
        let animator = PointFieldAnimator::seeded(field, seed)?;
        log_field(&animator, cli.preset, seed);

        let renderer = Renderer::new(window.clone(), !cli.no_vsync).await?;
        let size = renderer.gfx.size;

        let camera = Camera::hero(size.width as f32 / size.height.max(1) as f32);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &*window,
            None,
            None,
        );

        Ok(Self {
            renderer,
            camera,
            pointer: PointerTracker::new(size),
            clock: FrameClock::new(),
            animator,
            preset: cli.preset,
            cli,
            seed,
            egui_ctx,
            egui_state,
            show_debug: false,
            recycled_total: 0,
        })
    }

    pub fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer.resize(new_size);
            self.camera.set_viewport(new_size.width, new_size.height);
        }
    }

    pub fn handle_event(&mut self, window: &Window, event: &WindowEvent) -> bool {
        // The field follows the cursor even while it hovers the overlay.
        self.pointer.handle_event(event);

        let response = self.egui_state.on_window_event(window, event);
        if response.consumed {
            return true;
        }

        match event {
            WindowEvent::Resized(physical_size) => self.resize(*physical_size),
            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed
                    && !event.repeat
                    && event.physical_key == PhysicalKey::Code(KeyCode::F1) =>
            {
                self.show_debug = !self.show_debug;
                return true;
            }
            _ => {}
        }

        false
    }

    /// Replaces the animator. Layers are unmounted so the next frame mounts
    /// buffers sized for the new field.
    pub fn rebuild(&mut self, field: FieldConfig, preset: Preset, seed: u64) -> Result<()> {
        let animator = PointFieldAnimator::seeded(field, seed)?;
        log_field(&animator, preset, seed);

        self.animator = animator;
        self.preset = preset;
        self.seed = seed;
        self.renderer.unmount_all();
        self.clock.reset();
        self.recycled_total = 0;
        Ok(())
    }

    fn apply(&mut self, action: UiAction) -> Result<()> {
        match action {
            UiAction::SwitchPreset(preset) => {
                let mut field = FieldConfig::preset(preset);
                self.cli.apply_overrides(&mut field);
                self.rebuild(field, preset, self.seed)
            }
            UiAction::Reseed => {
                let field = self.animator.config().clone();
                self.rebuild(field, self.preset, rand::random())
            }
        }
    }

    pub fn render(&mut self, window: &Window) -> Result<(), wgpu::SurfaceError> {
        let frame = self.renderer.gfx.surface.get_current_texture()?;
        let swap_view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let input = FrameInput {
            elapsed_seconds: self.clock.tick(),
            pointer_ndc: self.pointer.ndc(),
        };
        let report = self.animator.tick(input, &mut self.renderer.uploader());
        self.recycled_total += report.recycled as u64;

        // Layers skipped by this tick are mounted now and animate from the next one.
        if self.renderer.mount_missing(&self.animator) > 0 {
            log::debug!("Mounted sprite layers after tick {:?}", report);
        }

        self.renderer.render(&swap_view, &self.camera);

        let egui_input = self.egui_state.take_egui_input(window);
        self.egui_ctx.begin_frame(egui_input);

        let mut action = None;
        if self.show_debug {
            let stats = HudStats {
                fps: self.clock.fps(),
                ground_points: self.animator.ground().len(),
                natural_ground_points: self.animator.ground().natural_count(),
                particles: self.animator.particles().len(),
                recycled_total: self.recycled_total,
                phase: self.animator.phase(),
                pointer_ndc: self.pointer.ndc(),
                preset: self.preset,
                seed: self.seed,
            };
            action = ui::draw_debug_panel(
                &self.egui_ctx,
                &stats,
                &mut self.renderer.post_stack.params,
            );
        }

        let egui_output = self.egui_ctx.end_frame();
        let pixels_per_point = self.egui_ctx.pixels_per_point();
        let shapes = self.egui_ctx.tessellate(egui_output.shapes, pixels_per_point);
        self.renderer.render_overlay(
            &swap_view,
            &shapes,
            &egui_output.textures_delta,
            pixels_per_point,
        );
        frame.present();

        if let Some(action) = action {
            if let Err(err) = self.apply(action) {
                log::error!("Failed to rebuild the field: {:#}", err);
            }
        }

        Ok(())
    }
}

fn log_field(animator: &PointFieldAnimator, preset: Preset, seed: u64) {
    log::info!(
        "Field built | preset={} seed={} | ground={} particles={}",
        preset.name(),
        seed,
        animator.ground().len(),
        animator.particles().len()
    );
}
