use std::collections::HashMap;

use crate::error::ProgramError;

use super::pass::{BlendMode, DrawMode, PassConfig};
use super::program::{
    Program, ProgramFactory, ProgramLayout, TextureData, UniformSink, UniformValue, VertexData,
};
use super::shaders::{self, ShaderSpec};
use super::target::RenderTarget;

/// wgpu-backed program.
///
/// Uploads go to the GPU immediately through the queue (they land with the
/// next submit). Pipelines are created lazily, one per (draw mode, blend mode)
/// pair, because topology and blend state are baked into wgpu pipelines.
pub struct WgpuProgram {
    layout: ProgramLayout,

    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,

    shader: wgpu::ShaderModule,
    bind_group_layout: wgpu::BindGroupLayout,
    pipeline_layout: wgpu::PipelineLayout,
    pipelines: HashMap<(DrawMode, BlendMode), wgpu::RenderPipeline>,

    uniforms: Vec<[f32; 4]>,
    uniform_ubo: wgpu::Buffer,

    vertex_slots: Vec<Option<VertexSlot>>,

    textures: Vec<(wgpu::Texture, wgpu::TextureView)>,
    sampler: wgpu::Sampler,

    /// Rebuilt lazily after a texture is replaced.
    bind_group: Option<wgpu::BindGroup>,
}

struct VertexSlot {
    buffer: wgpu::Buffer,
    /// Capacity in floats.
    capacity: usize,
    vertices: u32,
}

const UNIFORM_SLOT_SIZE: u64 = std::mem::size_of::<[f32; 4]>() as u64;

fn texture_binding(i: usize) -> u32 {
    1 + 2 * i as u32
}

fn sampler_binding(i: usize) -> u32 {
    2 + 2 * i as u32
}

fn vertex_format(components: u32) -> wgpu::VertexFormat {
    debug_assert!((1..=4).contains(&components), "attributes take 1 to 4 floats");
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}

impl WgpuProgram {
    /// Compiles `spec` for render targets of `format`.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        format: wgpu::TextureFormat,
        spec: &ShaderSpec,
    ) -> Self {
        let layout = spec.layout;
        let label = Some(layout.label);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label,
            source: wgpu::ShaderSource::Wgsl(spec.source.into()),
        });

        let visibility = wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT;
        let mut entries = vec![wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        }];
        for i in 0..layout.textures.len() {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: texture_binding(i),
                visibility,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: sampler_binding(i),
                visibility,
                ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                count: None,
            });
        }

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label,
            entries: &entries,
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label,
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

        let slot_count = layout.uniforms.len().max(1);
        let uniform_ubo = device.create_buffer(&wgpu::BufferDescriptor {
            label,
            size: slot_count as u64 * UNIFORM_SLOT_SIZE,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        // Opaque white until the owning visual bakes real texels.
        let white = [255u8; 4];
        let textures = layout
            .textures
            .iter()
            .map(|name| {
                create_texture(
                    device,
                    queue,
                    name,
                    TextureData { width: 1, height: 1, rgba: &white },
                )
            })
            .collect();

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label,
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            layout,
            device: device.clone(),
            queue: queue.clone(),
            format,
            shader,
            bind_group_layout,
            pipeline_layout,
            pipelines: HashMap::new(),
            uniforms: vec![[0.0; 4]; slot_count],
            uniform_ubo,
            vertex_slots: layout.attributes.iter().map(|_| None).collect(),
            textures,
            sampler,
            bind_group: None,
        }
    }

    fn ensure_bind_group(&mut self) {
        if self.bind_group.is_some() {
            return;
        }

        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: self.uniform_ubo.as_entire_binding(),
        }];
        for (i, (_, view)) in self.textures.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: texture_binding(i),
                resource: wgpu::BindingResource::TextureView(view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: sampler_binding(i),
                resource: wgpu::BindingResource::Sampler(&self.sampler),
            });
        }

        let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some(self.layout.label),
            layout: &self.bind_group_layout,
            entries: &entries,
        });
        self.bind_group = Some(bind_group);
    }

    fn ensure_pipeline(&mut self, mode: DrawMode, blend: BlendMode) {
        if self.pipelines.contains_key(&(mode, blend)) {
            return;
        }

        let attributes: Vec<[wgpu::VertexAttribute; 1]> = self
            .layout
            .attributes
            .iter()
            .enumerate()
            .map(|(i, a)| {
                [wgpu::VertexAttribute {
                    format: vertex_format(a.components),
                    offset: 0,
                    shader_location: i as u32,
                }]
            })
            .collect();

        let buffers: Vec<wgpu::VertexBufferLayout<'_>> = self
            .layout
            .attributes
            .iter()
            .zip(&attributes)
            .map(|(a, attribute)| wgpu::VertexBufferLayout {
                array_stride: a.components as u64 * std::mem::size_of::<f32>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attribute,
            })
            .collect();

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(self.layout.label),
            layout: Some(&self.pipeline_layout),

            vertex: wgpu::VertexState {
                module: &self.shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &self.shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.format,
                    blend: blend.to_wgpu(),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: mode.to_wgpu(),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        log::debug!("{}: pipeline created for {mode:?}/{blend:?}", self.layout.label);
        self.pipelines.insert((mode, blend), pipeline);
    }
}

fn create_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    label: &str,
    data: TextureData<'_>,
) -> (wgpu::Texture, wgpu::TextureView) {
    let size = wgpu::Extent3d {
        width: data.width,
        height: data.height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
        view_formats: &[],
    });
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        data.rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * data.width),
            rows_per_image: Some(data.height),
        },
        size,
    );
    let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
    (texture, view)
}

impl UniformSink for WgpuProgram {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), ProgramError> {
        let index = self.layout.uniform_slot(name, &value)?;
        self.uniforms[index] = value.to_slot();
        self.queue.write_buffer(
            &self.uniform_ubo,
            index as u64 * UNIFORM_SLOT_SIZE,
            bytemuck::bytes_of(&self.uniforms[index]),
        );
        Ok(())
    }
}

impl Program for WgpuProgram {
    type Target<'t> = RenderTarget<'t>;

    fn layout(&self) -> &ProgramLayout {
        &self.layout
    }

    fn set_attribute(&mut self, name: &str, data: VertexData<'_>) -> Result<(), ProgramError> {
        let index = self.layout.attribute_slot(name, &data)?;
        let len = data.data.len();

        let needs_alloc = self.vertex_slots[index]
            .as_ref()
            .is_none_or(|slot| slot.capacity < len);
        if needs_alloc {
            let capacity = len.next_power_of_two().max(64);
            let buffer = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(self.layout.attributes[index].name),
                size: (capacity * std::mem::size_of::<f32>()) as u64,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            self.vertex_slots[index] = Some(VertexSlot { buffer, capacity, vertices: 0 });
        }

        if let Some(slot) = self.vertex_slots[index].as_mut() {
            if len > 0 {
                self.queue
                    .write_buffer(&slot.buffer, 0, bytemuck::cast_slice(data.data));
            }
            slot.vertices = data.vertex_count();
        }
        Ok(())
    }

    fn set_texture(&mut self, name: &str, texture: TextureData<'_>) -> Result<(), ProgramError> {
        let index = self.layout.texture_slot(name, &texture)?;
        self.textures[index] = create_texture(&self.device, &self.queue, name, texture);
        self.bind_group = None;
        Ok(())
    }

    fn vertex_count(&self) -> u32 {
        self.vertex_slots
            .iter()
            .map(|slot| slot.as_ref().map_or(0, |s| s.vertices))
            .min()
            .unwrap_or(0)
    }

    fn draw(&mut self, target: &mut RenderTarget<'_>, pass: &PassConfig, mode: DrawMode) {
        let vertex_count = self.vertex_count();
        if vertex_count == 0 {
            return;
        }

        // Mutating methods must run before borrowing pipeline/buffers immutably.
        self.ensure_bind_group();
        self.ensure_pipeline(mode, pass.blend);

        let Some(pipeline) = self.pipelines.get(&(mode, pass.blend)) else { return };
        let Some(bind_group) = self.bind_group.as_ref() else { return };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some(self.layout.label),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_pipeline(pipeline);
        rpass.set_bind_group(0, bind_group, &[]);
        for (i, slot) in self.vertex_slots.iter().enumerate() {
            // vertex_count > 0 means every slot holds data.
            let Some(slot) = slot else { return };
            rpass.set_vertex_buffer(i as u32, slot.buffer.slice(..));
        }
        rpass.draw(0..vertex_count, 0..1);
    }
}

/// Creates [`WgpuProgram`]s for one device and surface format.
#[derive(Clone)]
pub struct WgpuProgramFactory {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
}

impl WgpuProgramFactory {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue, format: wgpu::TextureFormat) -> Self {
        Self {
            device: device.clone(),
            queue: queue.clone(),
            format,
        }
    }
}

impl ProgramFactory for WgpuProgramFactory {
    type Program = WgpuProgram;

    fn create_program(&self, shader: &str) -> Result<WgpuProgram, ProgramError> {
        let spec = shaders::shader(shader)?;
        log::debug!("compiling shader `{}`", spec.name);
        Ok(WgpuProgram::new(&self.device, &self.queue, self.format, spec))
    }
}
