//! GPU program abstraction.
//!
//! A program is a compiled vertex/fragment pair plus the resources it reads:
//! named uniforms, per-vertex attributes and 2D textures. The layout of those
//! resources is declared up front ([`ProgramLayout`]) and every upload is
//! checked against it, so a typo in an attribute name fails the same way on a
//! GPU-backed program and on a headless one.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::ProgramError;

use super::pass::{DrawMode, PassConfig};

/// Program handle shared between its owning visual and the pan/zoom transform.
pub type SharedProgram<P> = Rc<RefCell<P>>;

/// Wraps a program for sharing.
#[inline]
pub fn share<P>(program: P) -> SharedProgram<P> {
    Rc::new(RefCell::new(program))
}

/// Uniform value. Every uniform occupies one `vec4<f32>` slot on the GPU.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
}

impl UniformValue {
    pub fn components(&self) -> u32 {
        match self {
            UniformValue::Float(_) => 1,
            UniformValue::Vec2(_) => 2,
            UniformValue::Vec3(_) => 3,
            UniformValue::Vec4(_) => 4,
        }
    }

    /// Zero-padded `vec4` slot contents.
    pub fn to_slot(self) -> [f32; 4] {
        match self {
            UniformValue::Float(x) => [x, 0.0, 0.0, 0.0],
            UniformValue::Vec2([x, y]) => [x, y, 0.0, 0.0],
            UniformValue::Vec3([x, y, z]) => [x, y, z, 0.0],
            UniformValue::Vec4(v) => v,
        }
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

/// Non-interleaved vertex data: `components` floats per vertex.
#[derive(Debug, Copy, Clone)]
pub struct VertexData<'a> {
    pub data: &'a [f32],
    pub components: u32,
}

impl<'a> VertexData<'a> {
    #[inline]
    pub fn new(data: &'a [f32], components: u32) -> Self {
        Self { data, components }
    }

    /// Number of whole vertices in `data`.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        if self.components == 0 {
            return 0;
        }
        (self.data.len() / self.components as usize) as u32
    }
}

/// Packed RGBA8 texels, row-major, `width × height`.
#[derive(Debug, Copy, Clone)]
pub struct TextureData<'a> {
    pub width: u32,
    pub height: u32,
    pub rgba: &'a [u8],
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UniformSlot {
    pub name: &'static str,
    pub components: u32,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct AttributeSlot {
    pub name: &'static str,
    pub components: u32,
}

/// Declared resources of a program.
///
/// Uniforms map to consecutive `vec4<f32>` members of the uniform block at
/// `@group(0) @binding(0)`, in declaration order. Attribute `i` is read from
/// `@location(i)`. Texture `i` is bound at `@binding(1 + 2i)` with its sampler
/// at `@binding(2 + 2i)`.
#[derive(Debug, Copy, Clone)]
pub struct ProgramLayout {
    pub label: &'static str,
    pub uniforms: &'static [UniformSlot],
    pub attributes: &'static [AttributeSlot],
    pub textures: &'static [&'static str],
}

impl ProgramLayout {
    /// Slot index of `name`, checking the component count of `value`.
    pub fn uniform_slot(&self, name: &str, value: &UniformValue) -> Result<usize, ProgramError> {
        let index = self
            .uniforms
            .iter()
            .position(|u| u.name == name)
            .ok_or_else(|| ProgramError::UnknownUniform {
                program: self.label,
                name: name.to_string(),
            })?;
        let expected = self.uniforms[index].components;
        if value.components() != expected {
            return Err(ProgramError::UniformComponents {
                name: name.to_string(),
                expected,
                actual: value.components(),
            });
        }
        Ok(index)
    }

    /// Location of `name`, checking component count and length of `data`.
    pub fn attribute_slot(&self, name: &str, data: &VertexData<'_>) -> Result<usize, ProgramError> {
        let index = self
            .attributes
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| ProgramError::UnknownAttribute {
                program: self.label,
                name: name.to_string(),
            })?;
        let expected = self.attributes[index].components;
        if data.components != expected {
            return Err(ProgramError::AttributeComponents {
                name: name.to_string(),
                expected,
                actual: data.components,
            });
        }
        if data.data.len() % expected as usize != 0 {
            return Err(ProgramError::AttributeLength {
                name: name.to_string(),
                len: data.data.len(),
                components: expected,
            });
        }
        Ok(index)
    }

    /// Binding index of `name`, checking that the texel buffer fills the texture.
    pub fn texture_slot(&self, name: &str, texture: &TextureData<'_>) -> Result<usize, ProgramError> {
        let index = self
            .textures
            .iter()
            .position(|t| *t == name)
            .ok_or_else(|| ProgramError::UnknownTexture {
                program: self.label,
                name: name.to_string(),
            })?;
        let needed = texture.width as usize * texture.height as usize * 4;
        if texture.width == 0 || texture.height == 0 || texture.rgba.len() != needed {
            return Err(ProgramError::TextureSize {
                name: name.to_string(),
                width: texture.width,
                height: texture.height,
                len: texture.rgba.len(),
            });
        }
        Ok(index)
    }
}

/// Receiver of named uniform values.
///
/// This is the only capability the pan/zoom transform needs from a program.
pub trait UniformSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), ProgramError>;
}

/// A compiled program that can receive uploads and issue draw calls.
pub trait Program: UniformSink + 'static {
    /// Where draw calls are recorded (a command encoder, a headless log, ...).
    type Target<'t>;

    fn layout(&self) -> &ProgramLayout;

    fn set_attribute(&mut self, name: &str, data: VertexData<'_>) -> Result<(), ProgramError>;

    fn set_texture(&mut self, name: &str, texture: TextureData<'_>) -> Result<(), ProgramError>;

    /// Vertices drawable with the attributes uploaded so far (the shortest attribute wins).
    fn vertex_count(&self) -> u32;

    /// Issues one draw call with the given topology.
    ///
    /// Programs with no complete vertex may skip the call.
    fn draw(&mut self, target: &mut Self::Target<'_>, pass: &PassConfig, mode: DrawMode);
}

/// Creates programs from shader names.
pub trait ProgramFactory {
    type Program: Program;

    fn create_program(&self, shader: &str) -> Result<Self::Program, ProgramError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: ProgramLayout = ProgramLayout {
        label: "test",
        uniforms: &[
            UniformSlot { name: "u_pan", components: 2 },
            UniformSlot { name: "n_rows", components: 1 },
        ],
        attributes: &[AttributeSlot { name: "a_position", components: 3 }],
        textures: &["u_color"],
    };

    #[test]
    fn uniform_slot_follows_declaration_order() {
        assert_eq!(LAYOUT.uniform_slot("n_rows", &UniformValue::Float(2.0)), Ok(1));
    }

    #[test]
    fn uniform_with_wrong_arity_is_rejected() {
        let err = LAYOUT.uniform_slot("u_pan", &UniformValue::Float(0.0)).unwrap_err();
        assert!(matches!(err, ProgramError::UniformComponents { expected: 2, actual: 1, .. }));
    }

    #[test]
    fn unknown_names_are_reported() {
        assert!(matches!(
            LAYOUT.uniform_slot("u_zoom", &UniformValue::Vec2([1.0, 1.0])),
            Err(ProgramError::UnknownUniform { .. })
        ));
        let data = [0.0; 3];
        assert!(matches!(
            LAYOUT.attribute_slot("a_mask", &VertexData::new(&data, 3)),
            Err(ProgramError::UnknownAttribute { .. })
        ));
    }

    #[test]
    fn ragged_attribute_data_is_rejected() {
        let data = [0.0; 7];
        assert!(matches!(
            LAYOUT.attribute_slot("a_position", &VertexData::new(&data, 3)),
            Err(ProgramError::AttributeLength { len: 7, .. })
        ));
    }

    #[test]
    fn texture_must_be_filled_exactly() {
        let texels = [0u8; 8];
        let ok = TextureData { width: 2, height: 1, rgba: &texels };
        let short = TextureData { width: 3, height: 1, rgba: &texels };
        assert_eq!(LAYOUT.texture_slot("u_color", &ok), Ok(0));
        assert!(matches!(LAYOUT.texture_slot("u_color", &short), Err(ProgramError::TextureSize { .. })));
    }

    #[test]
    fn slots_are_zero_padded() {
        assert_eq!(UniformValue::Vec2([1.0, 2.0]).to_slot(), [1.0, 2.0, 0.0, 0.0]);
        assert_eq!(VertexData::new(&[0.0; 6], 2).vertex_count(), 3);
    }
}
