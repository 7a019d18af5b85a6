//! GPU rendering subsystem.
//!
//! Visuals talk to [`Program`]s: named uniforms, attributes and textures
//! validated against a [`ProgramLayout`], plus draw calls configured by an
//! explicit [`PassConfig`]. Two backends exist: [`WgpuProgram`] for real
//! frames and [`HeadlessProgram`] for running visuals without a GPU.
//!
//! Convention:
//! - Vertex positions are in normalized device coordinates (+Y up).
//! - Vertex shaders apply `u_pan` / `u_zoom` as `(position + pan) * zoom`.

pub mod headless;
mod pass;
mod program;
pub mod shaders;
mod target;
mod wgpu_program;

pub use headless::{HeadlessFactory, HeadlessProgram};
pub use pass::{BlendMode, DrawMode, PassConfig};
pub use program::{
    share, AttributeSlot, Program, ProgramFactory, ProgramLayout, SharedProgram, TextureData,
    UniformSink, UniformSlot, UniformValue, VertexData,
};
pub use target::RenderTarget;
pub use wgpu_program::{WgpuProgram, WgpuProgramFactory};
