//! User overrides layered over converted materials
//!
//! Overrides live until the next import, which starts from a fresh state.

use std::collections::BTreeSet;

use crate::convert::RenderMaterial;

/// Color painted onto a mesh by "change color"
pub const HIGHLIGHT_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Material a mesh should currently be drawn with
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectiveMaterial {
    pub base_color: [f32; 4],
    pub texture: Option<usize>,
    pub blended: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialOverrides {
    opacity: f32,
    painted: BTreeSet<usize>,
}

impl Default for MaterialOverrides {
    fn default() -> Self {
        Self {
            opacity: 1.0,
            painted: BTreeSet::new(),
        }
    }
}

impl MaterialOverrides {
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Opacity applied to every mesh, clamped to `[0, 1]`
    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = if opacity.is_nan() { 1.0 } else { opacity.clamp(0.0, 1.0) };
    }

    /// Paint mesh `index` with [`HIGHLIGHT_COLOR`]
    pub fn paint(&mut self, index: usize) {
        self.painted.insert(index);
    }

    pub fn is_painted(&self, index: usize) -> bool {
        self.painted.contains(&index)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn effective(&self, index: usize, base: &RenderMaterial) -> EffectiveMaterial {
        let (mut color, texture) = if self.is_painted(index) {
            (HIGHLIGHT_COLOR, None)
        } else {
            (base.base_color, base.texture)
        };
        color[3] *= self.opacity;
        EffectiveMaterial {
            base_color: color,
            texture,
            blended: color[3] < 1.0,
        }
    }
}
