//! Shader library.
//!
//! WGSL sources are assets looked up by name; each entry carries the resource
//! layout the source declares. Every vertex stage reads `u_pan` / `u_zoom`
//! from the first two uniform slots.

use crate::error::ProgramError;

use super::program::{AttributeSlot, ProgramLayout, UniformSlot};

/// Uniform written by the pan/zoom transform with the pan offset.
pub const PAN_UNIFORM: &str = "u_pan";
/// Uniform written by the pan/zoom transform with the effective zoom vector.
pub const ZOOM_UNIFORM: &str = "u_zoom";

/// A named WGSL module with entry points `vs_main` / `fs_main`.
#[derive(Debug)]
pub struct ShaderSpec {
    pub name: &'static str,
    pub source: &'static str,
    pub layout: ProgramLayout,
}

const fn view_uniforms_with(extra: &'static str) -> [UniformSlot; 3] {
    [
        UniformSlot { name: PAN_UNIFORM, components: 2 },
        UniformSlot { name: ZOOM_UNIFORM, components: 2 },
        UniformSlot { name: extra, components: 1 },
    ]
}

const GRID_UNIFORMS: [UniformSlot; 3] = view_uniforms_with("n_rows");
const SPIKE_UNIFORMS: [UniformSlot; 3] = view_uniforms_with("n_clusters");

static SHADERS: [ShaderSpec; 4] = [
    ShaderSpec {
        name: "box",
        source: include_str!("shaders/box.wgsl"),
        layout: ProgramLayout {
            label: "box",
            uniforms: &GRID_UNIFORMS,
            attributes: &[AttributeSlot { name: "a_position", components: 3 }],
            textures: &[],
        },
    },
    ShaderSpec {
        name: "axis",
        source: include_str!("shaders/axis.wgsl"),
        layout: ProgramLayout {
            label: "axis",
            uniforms: &GRID_UNIFORMS,
            attributes: &[AttributeSlot { name: "a_position", components: 4 }],
            textures: &[],
        },
    },
    ShaderSpec {
        name: "spikes",
        source: include_str!("shaders/spikes.wgsl"),
        layout: ProgramLayout {
            label: "spikes",
            uniforms: &SPIKE_UNIFORMS,
            attributes: &[
                AttributeSlot { name: "a_position", components: 2 },
                AttributeSlot { name: "a_mask", components: 1 },
                AttributeSlot { name: "a_cluster", components: 1 },
            ],
            textures: &["u_cluster_color"],
        },
    },
    ShaderSpec {
        name: "correlograms",
        source: include_str!("shaders/correlograms.wgsl"),
        layout: ProgramLayout {
            label: "correlograms",
            uniforms: &GRID_UNIFORMS,
            attributes: &[AttributeSlot { name: "a_position", components: 3 }],
            textures: &["u_cluster_color"],
        },
    },
];

/// Looks up a shader by name.
pub fn shader(name: &str) -> Result<&'static ShaderSpec, ProgramError> {
    SHADERS
        .iter()
        .find(|s| s.name == name)
        .ok_or_else(|| ProgramError::UnknownShader(name.to_string()))
}

/// WGSL text of a bundled shader.
pub fn shader_source(name: &str) -> Result<&'static str, ProgramError> {
    shader(name).map(|s| s.source)
}

/// Names of all bundled shaders.
pub fn shader_names() -> impl Iterator<Item = &'static str> {
    SHADERS.iter().map(|s| s.name)
}
