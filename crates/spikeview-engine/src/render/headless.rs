//! In-memory program for running visuals without a GPU.
//!
//! Uploads are validated against the shader's layout exactly like the wgpu
//! program, then kept as plain values. Draw calls are appended to a
//! [`DrawLog`]. Tests use it to observe what a bake wrote and in which order.

use std::collections::HashMap;

use crate::error::ProgramError;

use super::pass::{BlendMode, DrawMode, PassConfig};
use super::program::{
    Program, ProgramFactory, ProgramLayout, TextureData, UniformSink, UniformValue, VertexData,
};
use super::shaders;

/// One recorded upload, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upload {
    Uniform(&'static str),
    Attribute(&'static str),
    Texture(&'static str),
}

/// One recorded draw call.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DrawCall {
    pub program: &'static str,
    pub mode: DrawMode,
    pub blend: BlendMode,
    pub vertex_count: u32,
}

/// Draw target of headless programs.
#[derive(Debug, Default)]
pub struct DrawLog {
    pub calls: Vec<DrawCall>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessTexture {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

#[derive(Debug)]
pub struct HeadlessProgram {
    layout: ProgramLayout,
    uniforms: HashMap<&'static str, UniformValue>,
    attributes: HashMap<&'static str, (Vec<f32>, u32)>,
    textures: HashMap<&'static str, HeadlessTexture>,
    uploads: Vec<Upload>,
}

impl HeadlessProgram {
    pub fn new(layout: ProgramLayout) -> Self {
        Self {
            layout,
            uniforms: HashMap::new(),
            attributes: HashMap::new(),
            textures: HashMap::new(),
            uploads: Vec::new(),
        }
    }

    /// Headless program for a bundled shader.
    pub fn for_shader(name: &str) -> Result<Self, ProgramError> {
        Ok(Self::new(shaders::shader(name)?.layout))
    }

    pub fn uniform(&self, name: &str) -> Option<UniformValue> {
        self.uniforms.get(name).copied()
    }

    /// Raw floats of an attribute.
    pub fn attribute(&self, name: &str) -> Option<&[f32]> {
        self.attributes.get(name).map(|(data, _)| data.as_slice())
    }

    pub fn texture(&self, name: &str) -> Option<&HeadlessTexture> {
        self.textures.get(name)
    }

    pub fn uploads(&self) -> &[Upload] {
        &self.uploads
    }

    /// Forgets the upload history, keeping current values.
    pub fn clear_uploads(&mut self) {
        self.uploads.clear();
    }
}

impl UniformSink for HeadlessProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), ProgramError> {
        let index = self.layout.uniform_slot(name, &value)?;
        let name = self.layout.uniforms[index].name;
        self.uniforms.insert(name, value);
        self.uploads.push(Upload::Uniform(name));
        Ok(())
    }
}

impl Program for HeadlessProgram {
    type Target<'t> = DrawLog;

    fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    fn set_attribute(&mut self, name: &str, data: VertexData<'_>) -> Result<(), ProgramError> {
        let index = self.layout.attribute_slot(name, &data)?;
        let name = self.layout.attributes[index].name;
        self.attributes.insert(name, (data.data.to_vec(), data.vertex_count()));
        self.uploads.push(Upload::Attribute(name));
        Ok(())
    }

    fn set_texture(&mut self, name: &str, texture: TextureData<'_>) -> Result<(), ProgramError> {
        let index = self.layout.texture_slot(name, &texture)?;
        let name = self.layout.textures[index];
        self.textures.insert(
            name,
            HeadlessTexture {
                width: texture.width,
                height: texture.height,
                rgba: texture.rgba.to_vec(),
            },
        );
        self.uploads.push(Upload::Texture(name));
        Ok(())
    }

    fn vertex_count(&self) -> u32 {
        self.layout
            .attributes
            .iter()
            .map(|a| self.attributes.get(a.name).map_or(0, |(_, n)| *n))
            .min()
            .unwrap_or(0)
    }

    fn draw(&mut self, target: &mut DrawLog, pass: &PassConfig, mode: DrawMode) {
        target.calls.push(DrawCall {
            program: self.layout.label,
            mode,
            blend: pass.blend,
            vertex_count: self.vertex_count(),
        });
    }
}

/// Factory producing [`HeadlessProgram`]s from bundled shader names.
#[derive(Debug, Default, Copy, Clone)]
pub struct HeadlessFactory;

impl ProgramFactory for HeadlessFactory {
    type Program = HeadlessProgram;

    fn create_program(&self, shader: &str) -> Result<HeadlessProgram, ProgramError> {
        HeadlessProgram::for_shader(shader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_count_is_the_shortest_attribute() {
        let mut p = HeadlessProgram::for_shader("spikes").unwrap();
        assert_eq!(p.vertex_count(), 0);

        p.set_attribute("a_position", VertexData::new(&[0.0; 8], 2)).unwrap();
        p.set_attribute("a_mask", VertexData::new(&[1.0; 4], 1)).unwrap();
        assert_eq!(p.vertex_count(), 0, "a_cluster still missing");

        p.set_attribute("a_cluster", VertexData::new(&[0.0; 3], 1)).unwrap();
        assert_eq!(p.vertex_count(), 3);
    }

    #[test]
    fn draw_records_mode_and_blend() {
        let mut p = HeadlessProgram::for_shader("box").unwrap();
        p.set_attribute("a_position", VertexData::new(&[0.0; 24], 3)).unwrap();

        let mut log = DrawLog::default();
        let pass = PassConfig { blend: BlendMode::Opaque, ..PassConfig::default() };
        p.draw(&mut log, &pass, DrawMode::Lines);

        assert_eq!(
            log.calls,
            vec![DrawCall { program: "box", mode: DrawMode::Lines, blend: BlendMode::Opaque, vertex_count: 8 }]
        );
    }

    #[test]
    fn rejected_uploads_leave_no_trace() {
        let mut p = HeadlessProgram::for_shader("box").unwrap();
        assert!(p.set_uniform("n_rows", UniformValue::Vec2([1.0, 1.0])).is_err());
        assert!(p.uploads().is_empty());
        assert!(p.uniform("n_rows").is_none());
    }
}
