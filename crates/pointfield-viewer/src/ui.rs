//! Debug overlay, toggled with F1.

use crate::renderer::pipelines::post_stack::PostParams;
use pointfield::{PointerPhase, Preset};

/// Snapshot of what the overlay reports for the current frame.
#[derive(Debug, Clone, Copy)]
pub struct HudStats {
    pub fps: f32,
    pub ground_points: usize,
    /// Lattice size before the point cap was applied.
    pub natural_ground_points: usize,
    pub particles: usize,
    /// Particles recycled since the field was built.
    pub recycled_total: u64,
    pub phase: PointerPhase,
    pub pointer_ndc: [f32; 2],
    pub preset: Preset,
    pub seed: u64,
}

/// Requests from the overlay that the app must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiAction {
    SwitchPreset(Preset),
    Reseed,
}

pub fn draw_debug_panel(
    ctx: &egui::Context,
    stats: &HudStats,
    post: &mut PostParams,
) -> Option<UiAction> {
    let mut action = None;

    egui::Window::new("Point Field")
        .default_pos([12.0, 12.0])
        .resizable(false)
        .show(ctx, |ui| {
            ui.label(format!("{:.1} fps", stats.fps));
            ui.separator();

            ui.label(format!("ground points: {}", stats.ground_points));
            if stats.ground_points < stats.natural_ground_points {
                ui.colored_label(
                    egui::Color32::from_rgb(255, 140, 0),
                    format!("truncated from {}", stats.natural_ground_points),
                );
            }
            ui.label(format!("particles: {}", stats.particles));
            ui.label(format!("recycled: {}", stats.recycled_total));
            ui.label(format!(
                "pointer: {:+.2}, {:+.2} ({:?})",
                stats.pointer_ndc[0], stats.pointer_ndc[1], stats.phase
            ));
            ui.separator();

            let mut selected = stats.preset;
            egui::ComboBox::from_label("preset")
                .selected_text(selected.name())
                .show_ui(ui, |ui| {
                    for preset in Preset::ALL {
                        ui.selectable_value(&mut selected, preset, preset.name());
                    }
                });
            if selected != stats.preset {
                action = Some(UiAction::SwitchPreset(selected));
            }

            ui.horizontal(|ui| {
                ui.label(format!("seed: {}", stats.seed));
                if ui.button("Reseed").clicked() {
                    action = Some(UiAction::Reseed);
                }
            });
            ui.separator();

            ui.checkbox(&mut post.bloom_on, "Bloom");
            ui.add_enabled_ui(post.bloom_on, |ui| {
                ui.add(egui::Slider::new(&mut post.bloom_threshold, 0.0..=1.0).text("threshold"));
                ui.add(egui::Slider::new(&mut post.bloom_intensity, 0.0..=4.0).text("intensity"));
                ui.add(egui::Slider::new(&mut post.bloom_radius, 0.0..=1.0).text("radius"));
            });
            ui.checkbox(&mut post.vignette_on, "Vignette");
            ui.add_enabled_ui(post.vignette_on, |ui| {
                ui.add(egui::Slider::new(&mut post.vignette_offset, 0.0..=1.0).text("offset"));
                ui.add(egui::Slider::new(&mut post.vignette_darkness, 0.0..=2.0).text("darkness"));
            });
        });

    action
}
