//! Shader program builder.
//!
//! Compiles a vertex and a fragment WGSL stage, links them into one render
//! pipeline, and resolves where the sprite attributes and uniforms live.
//!
//! Compilation and linking are checked with naga on the CPU first, so a bad
//! shader produces a readable diagnostic before anything touches the GPU:
//!
//! - [`ProgramBuilder::compile_stage`] parses and validates one stage.
//! - [`ProgramBuilder::link`] matches the stage interfaces and resolves the
//!   `position`, `velocity`, `life`, `color` attributes and the
//!   `resolution`, `time` uniform members (plus `fade` when present).
//! - [`ProgramBuilder::build`] does both, then creates the wgpu objects.

use std::fmt;
use std::num::NonZeroU64;

use glam::Vec2;
use naga::front::wgsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Module, Scalar, TypeInner, VectorSize};

use crate::error::OverlayError;
use crate::shader::{PointInstance, FRAGMENT_SOURCE, VERTEX_SOURCE};

/// The two programmable stages of the sprite program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Entry point the stage must define.
    pub fn entry_point(&self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vs_main",
            ShaderStage::Fragment => "fs_main",
        }
    }

    fn naga_stage(&self) -> naga::ShaderStage {
        match self {
            ShaderStage::Vertex => naga::ShaderStage::Vertex,
            ShaderStage::Fragment => naga::ShaderStage::Fragment,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// A stage that parsed and validated.
#[derive(Debug)]
pub struct CompiledStage {
    stage: ShaderStage,
    source: String,
    module: Module,
    entry_index: usize,
}

impl CompiledStage {
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    fn entry_function(&self) -> &naga::Function {
        &self.module.entry_points[self.entry_index].function
    }
}

/// Shader locations of the per-instance attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeLocations {
    pub position: u32,
    pub velocity: u32,
    pub life: u32,
    pub color: u32,
}

/// Where the uniform block is bound and where its members sit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UniformLayout {
    pub group: u32,
    pub binding: u32,
    /// Byte offset of `resolution: vec2<f32>`.
    pub resolution: u32,
    /// Byte offset of `time: f32`.
    pub time: u32,
    /// Byte offset of the optional `fade: f32` opacity factor.
    pub fade: Option<u32>,
    /// Total block size in bytes.
    pub size: u32,
}

impl UniformLayout {
    /// Serialize the uniform block for `queue.write_buffer`.
    ///
    /// `fade` is dropped when the program has no `fade` member.
    pub fn encode(&self, resolution: Vec2, time: f32, fade: f32) -> Vec<u8> {
        let mut bytes = vec![0u8; self.size as usize];
        write_f32(&mut bytes, self.resolution, resolution.x);
        write_f32(&mut bytes, self.resolution + 4, resolution.y);
        write_f32(&mut bytes, self.time, time);
        if let Some(offset) = self.fade {
            write_f32(&mut bytes, offset, fade);
        }
        bytes
    }
}

fn write_f32(bytes: &mut [u8], offset: u32, value: f32) {
    let offset = offset as usize;
    bytes[offset..offset + 4].copy_from_slice(bytemuck::bytes_of(&value));
}

/// Everything resolved by linking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramLayout {
    pub attributes: AttributeLocations,
    pub uniforms: UniformLayout,
}

impl ProgramLayout {
    /// Instance-rate vertex attributes for [`PointInstance`].
    pub fn vertex_attributes(&self) -> [wgpu::VertexAttribute; 4] {
        [
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: PointInstance::POSITION_OFFSET,
                shader_location: self.attributes.position,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x2,
                offset: PointInstance::VELOCITY_OFFSET,
                shader_location: self.attributes.velocity,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32,
                offset: PointInstance::LIFE_OFFSET,
                shader_location: self.attributes.life,
            },
            wgpu::VertexAttribute {
                format: wgpu::VertexFormat::Float32x3,
                offset: PointInstance::COLOR_OFFSET,
                shader_location: self.attributes.color,
            },
        ]
    }
}

/// A linked sprite program ready to draw with.
pub struct Program {
    pub pipeline: wgpu::RenderPipeline,
    pub bind_group_layout: wgpu::BindGroupLayout,
    pub layout: ProgramLayout,
}

const VEC2_F32: TypeInner = TypeInner::Vector {
    size: VectorSize::Bi,
    scalar: Scalar::F32,
};
const VEC3_F32: TypeInner = TypeInner::Vector {
    size: VectorSize::Tri,
    scalar: Scalar::F32,
};
const F32: TypeInner = TypeInner::Scalar(Scalar::F32);

/// Builds the sprite [`Program`] from a pair of WGSL stages.
#[derive(Debug, Clone)]
pub struct ProgramBuilder {
    vertex_source: String,
    fragment_source: String,
}

impl ProgramBuilder {
    pub fn new(vertex_source: impl Into<String>, fragment_source: impl Into<String>) -> Self {
        Self {
            vertex_source: vertex_source.into(),
            fragment_source: fragment_source.into(),
        }
    }

    /// The built-in soft-disc sprite shaders.
    pub fn sprite() -> Self {
        Self::new(VERTEX_SOURCE, FRAGMENT_SOURCE)
    }

    /// Parse and validate one stage.
    pub fn compile_stage(stage: ShaderStage, source: &str) -> Result<CompiledStage, OverlayError> {
        let module = wgsl::parse_str(source).map_err(|err| OverlayError::ShaderCompile {
            stage,
            log: err.emit_to_string(source),
        })?;

        let mut validator = Validator::new(ValidationFlags::all(), Capabilities::empty());
        validator
            .validate(&module)
            .map_err(|err| OverlayError::ShaderCompile {
                stage,
                log: err.emit_to_string(source),
            })?;

        let entry_index = module
            .entry_points
            .iter()
            .position(|ep| ep.name == stage.entry_point() && ep.stage == stage.naga_stage())
            .ok_or_else(|| OverlayError::ShaderCompile {
                stage,
                log: format!("missing @{} entry point `{}`", stage, stage.entry_point()),
            })?;

        Ok(CompiledStage {
            stage,
            source: source.to_string(),
            module,
            entry_index,
        })
    }

    /// Match the fragment inputs against the vertex outputs and resolve the
    /// attribute and uniform locations.
    pub fn link(vertex: &CompiledStage, fragment: &CompiledStage) -> Result<ProgramLayout, OverlayError> {
        let outputs = stage_outputs(vertex);
        for (name, location, inner) in stage_inputs(fragment) {
            match outputs.iter().find(|(_, loc, _)| *loc == location) {
                None => {
                    return Err(link_error(format!(
                        "fragment input `{}` at location {} is not written by the vertex stage",
                        name, location
                    )))
                }
                Some((_, _, out)) if *out != inner => {
                    return Err(link_error(format!(
                        "fragment input `{}` at location {} does not match the vertex output type",
                        name, location
                    )))
                }
                Some(_) => {}
            }
        }

        let inputs = stage_inputs(vertex);
        let attribute = |wanted: &str, ty: &TypeInner| -> Result<u32, OverlayError> {
            let (_, location, inner) = inputs
                .iter()
                .find(|(name, _, _)| name == wanted)
                .ok_or_else(|| link_error(format!("missing vertex attribute `{}`", wanted)))?;
            if inner != ty {
                return Err(link_error(format!("vertex attribute `{}` has the wrong type", wanted)));
            }
            Ok(*location)
        };

        let attributes = AttributeLocations {
            position: attribute("position", &VEC2_F32)?,
            velocity: attribute("velocity", &VEC2_F32)?,
            life: attribute("life", &F32)?,
            color: attribute("color", &VEC3_F32)?,
        };

        let uniforms = resolve_uniforms(&vertex.module)?;

        Ok(ProgramLayout { attributes, uniforms })
    }

    /// Compile and link without creating any GPU objects.
    pub fn reflect(&self) -> Result<ProgramLayout, OverlayError> {
        let vertex = Self::compile_stage(ShaderStage::Vertex, &self.vertex_source)?;
        let fragment = Self::compile_stage(ShaderStage::Fragment, &self.fragment_source)?;
        Self::link(&vertex, &fragment)
    }

    /// Compile, link and create the render pipeline.
    ///
    /// On failure every GPU object created so far is dropped before the error
    /// is returned.
    pub fn build(&self, device: &wgpu::Device, format: wgpu::TextureFormat) -> Result<Program, OverlayError> {
        let vertex = Self::compile_stage(ShaderStage::Vertex, &self.vertex_source)?;
        let fragment = Self::compile_stage(ShaderStage::Fragment, &self.fragment_source)?;
        let layout = Self::link(&vertex, &fragment)?;

        let vertex_module = create_module(device, &vertex)?;
        let fragment_module = create_module(device, &fragment)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Sprite Uniform Bind Group Layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: layout.uniforms.binding,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: NonZeroU64::new(layout.uniforms.size as u64),
                },
                count: None,
            }],
        });

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Sprite Pipeline Layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let attributes = layout.vertex_attributes();
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Sprite Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex_module,
                entry_point: Some(ShaderStage::Vertex.entry_point()),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: PointInstance::STRIDE,
                    step_mode: wgpu::VertexStepMode::Instance,
                    attributes: &attributes,
                }],
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment_module,
                entry_point: Some(ShaderStage::Fragment.entry_point()),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(device.pop_error_scope()) {
            return Err(link_error(err.to_string()));
        }

        log::debug!("Sprite program linked: {:?}", layout);

        Ok(Program {
            pipeline,
            bind_group_layout,
            layout,
        })
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::sprite()
    }
}

fn link_error(log: String) -> OverlayError {
    OverlayError::ProgramLink { log }
}

fn create_module(device: &wgpu::Device, stage: &CompiledStage) -> Result<wgpu::ShaderModule, OverlayError> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(match stage.stage {
            ShaderStage::Vertex => "Sprite Vertex Shader",
            ShaderStage::Fragment => "Sprite Fragment Shader",
        }),
        source: wgpu::ShaderSource::Wgsl(stage.source.as_str().into()),
    });
    match pollster::block_on(device.pop_error_scope()) {
        Some(err) => Err(OverlayError::ShaderCompile {
            stage: stage.stage,
            log: err.to_string(),
        }),
        None => Ok(module),
    }
}

/// `(name, location, type)` for every user-located input of the entry point,
/// looking inside struct arguments.
fn stage_inputs(stage: &CompiledStage) -> Vec<(String, u32, TypeInner)> {
    let module = &stage.module;
    let mut found = Vec::new();
    for arg in &stage.entry_function().arguments {
        let name = arg.name.clone().unwrap_or_default();
        collect_locations(module, &name, arg.ty, arg.binding.as_ref(), &mut found);
    }
    found
}

/// `(name, location, type)` for every user-located output of the entry point.
fn stage_outputs(stage: &CompiledStage) -> Vec<(String, u32, TypeInner)> {
    let module = &stage.module;
    let mut found = Vec::new();
    if let Some(result) = &stage.entry_function().result {
        collect_locations(module, "", result.ty, result.binding.as_ref(), &mut found);
    }
    found
}

fn collect_locations(
    module: &Module,
    name: &str,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    found: &mut Vec<(String, u32, TypeInner)>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            found.push((name.to_string(), *location, module.types[ty].inner.clone()));
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    let member_name = member.name.clone().unwrap_or_default();
                    collect_locations(module, &member_name, member.ty, member.binding.as_ref(), found);
                }
            }
        }
    }
}

/// Find the uniform block holding `resolution` and `time`.
fn resolve_uniforms(module: &Module) -> Result<UniformLayout, OverlayError> {
    let mut missing = "resolution";

    for (_, global) in module.global_variables.iter() {
        if global.space != AddressSpace::Uniform {
            continue;
        }
        let Some(binding) = &global.binding else {
            continue;
        };
        let TypeInner::Struct { members, span } = &module.types[global.ty].inner else {
            continue;
        };

        let member = |wanted: &str, ty: &TypeInner| {
            members
                .iter()
                .find(|m| m.name.as_deref() == Some(wanted) && module.types[m.ty].inner == *ty)
                .map(|m| m.offset)
        };

        let Some(resolution) = member("resolution", &VEC2_F32) else {
            continue;
        };
        let Some(time) = member("time", &F32) else {
            missing = "time";
            continue;
        };
        let fade = member("fade", &F32);

        if binding.group != 0 {
            return Err(link_error(format!(
                "uniform block must be in bind group 0, found group {}",
                binding.group
            )));
        }

        return Ok(UniformLayout {
            group: binding.group,
            binding: binding.binding,
            resolution,
            time,
            fade,
            size: *span,
        });
    }

    Err(link_error(format!("missing uniform `{}`", missing)))
}
