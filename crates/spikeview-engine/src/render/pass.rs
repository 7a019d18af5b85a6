//! Explicit render-pass configuration.
//!
//! Blend state and clear color travel with each draw call instead of living in
//! process-wide GPU state, so several canvases cannot clobber each other.

use crate::coords::ColorRgba;

/// Primitive topology of a draw call.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DrawMode {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
}

impl DrawMode {
    pub(crate) fn to_wgpu(self) -> wgpu::PrimitiveTopology {
        match self {
            DrawMode::Points => wgpu::PrimitiveTopology::PointList,
            DrawMode::Lines => wgpu::PrimitiveTopology::LineList,
            DrawMode::LineStrip => wgpu::PrimitiveTopology::LineStrip,
            DrawMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
            DrawMode::TriangleStrip => wgpu::PrimitiveTopology::TriangleStrip,
        }
    }
}

/// Color blending applied by a draw call.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    /// `src_alpha, one_minus_src_alpha` on straight-alpha colors.
    #[default]
    Alpha,
    /// `one, one_minus_src_alpha` on premultiplied colors.
    Premultiplied,
    /// No blending; fragments overwrite the target.
    Opaque,
}

impl BlendMode {
    pub(crate) fn to_wgpu(self) -> Option<wgpu::BlendState> {
        let over = |src_factor| wgpu::BlendComponent {
            src_factor,
            dst_factor: wgpu::BlendFactor::OneMinusSrcAlpha,
            operation: wgpu::BlendOperation::Add,
        };
        match self {
            BlendMode::Alpha => Some(wgpu::BlendState {
                color: over(wgpu::BlendFactor::SrcAlpha),
                alpha: over(wgpu::BlendFactor::One),
            }),
            BlendMode::Premultiplied => Some(wgpu::BlendState {
                color: over(wgpu::BlendFactor::One),
                alpha: over(wgpu::BlendFactor::One),
            }),
            BlendMode::Opaque => None,
        }
    }
}

/// Per-frame pass settings handed to every draw call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PassConfig {
    pub blend: BlendMode,
    pub clear_color: ColorRgba,
}

impl Default for PassConfig {
    fn default() -> Self {
        Self {
            blend: BlendMode::Alpha,
            clear_color: ColorRgba::black(),
        }
    }
}
