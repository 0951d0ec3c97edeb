//! Contract between the animator and whatever draws its buffers.

use crate::config::SpriteStyle;

/// The two independently uploaded point populations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    Ground,
    Particles,
}

impl Layer {
    /// Both layers, in draw order.
    pub const ALL: [Layer; 2] = [Layer::Ground, Layer::Particles];
}

/// Read-only view of one layer's buffers, lent for the duration of a call.
#[derive(Debug, Clone, Copy)]
pub struct LayerView<'a> {
    /// Interleaved `x, y, z`.
    pub positions: &'a [f32],
    /// Interleaved linear `r, g, b`; only present for vertex-colored layers.
    /// The contents never change after construction.
    pub colors: Option<&'a [f32]>,
    pub style: SpriteStyle,
}

impl LayerView<'_> {
    pub fn len(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// A render adapter that receives updated buffers every tick.
///
/// A layer whose GPU buffer does not exist yet reports itself as unmounted;
/// the animator then leaves that layer untouched for the tick and tries again
/// on the next one.
pub trait RenderSurface {
    fn is_mounted(&self, layer: Layer) -> bool;

    /// Called after `layer` was rewritten; the adapter should re-upload it.
    fn mark_dirty(&mut self, layer: Layer, view: LayerView<'_>);
}

/// Headless surface with both layers permanently mounted. Useful for driving
/// the animator without a renderer.
#[derive(Debug, Default, Clone, Copy)]
pub struct Detached;

impl RenderSurface for Detached {
    fn is_mounted(&self, _layer: Layer) -> bool {
        true
    }

    fn mark_dirty(&mut self, _layer: Layer, _view: LayerView<'_>) {}
}
