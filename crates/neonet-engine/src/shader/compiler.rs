//! WGSL stage validation (naga) and the wgpu program backend.
//!
//! Each section of a shader file is a standalone WGSL module. Stages are
//! validated with naga before wgpu sees them, so a broken shader comes back as
//! an error value with the compiler's message instead of tripping wgpu's
//! device-level error handler.

use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::{ShaderBackend, Stage};

/// A parsed and validated stage module plus its entry point.
#[derive(Debug)]
pub struct ValidatedStage {
    pub stage: Stage,
    pub entry_point: String,
    pub module: naga::Module,
}

impl ValidatedStage {
    fn entry(&self) -> Option<&naga::EntryPoint> {
        self.module
            .entry_points
            .iter()
            .find(|ep| ep.name == self.entry_point)
    }
}

fn naga_stage(stage: Stage) -> naga::ShaderStage {
    match stage {
        Stage::Vertex => naga::ShaderStage::Vertex,
        Stage::Fragment => naga::ShaderStage::Fragment,
    }
}

/// Shader capabilities a device with `features` accepts.
///
/// Covers the optional-feature gates WGSL code commonly trips over. Anything
/// finer is still caught when the device creates the module.
pub fn capabilities_for(features: wgpu::Features) -> Capabilities {
    let gates = [
        (wgpu::Features::IMMEDIATES, Capabilities::IMMEDIATES),
        (wgpu::Features::SHADER_F64, Capabilities::FLOAT64),
        (wgpu::Features::SHADER_F16, Capabilities::SHADER_FLOAT16),
        (wgpu::Features::SHADER_INT64, Capabilities::SHADER_INT64),
        (wgpu::Features::SHADER_PRIMITIVE_INDEX, Capabilities::PRIMITIVE_INDEX),
        (wgpu::Features::MULTIVIEW, Capabilities::MULTIVIEW),
        (wgpu::Features::DUAL_SOURCE_BLENDING, Capabilities::DUAL_SOURCE_BLENDING),
        (wgpu::Features::CLIP_DISTANCES, Capabilities::CLIP_DISTANCE),
    ];

    let mut caps = Capabilities::default();
    for (feature, cap) in gates {
        caps.set(cap, features.contains(feature));
    }
    caps
}

/// Parses and validates one WGSL stage against `caps`.
///
/// The module must declare an entry point for `stage`; the first one found is
/// used.
pub fn validate_stage(
    stage: Stage,
    source: &str,
    caps: Capabilities,
) -> Result<ValidatedStage, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), caps)
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = naga_stage(stage);
    let entry_point = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == wanted)
        .map(|ep| ep.name.clone())
        .ok_or_else(|| format!("no @{stage} entry point in {stage} section"))?;

    Ok(ValidatedStage {
        stage,
        entry_point,
        module,
    })
}

/// Checks that every fragment input location is written by the vertex stage.
pub fn check_interface(vertex: &ValidatedStage, fragment: &ValidatedStage) -> Result<(), String> {
    let (Some(vs), Some(fs)) = (vertex.entry(), fragment.entry()) else {
        return Err("missing entry point".to_string());
    };

    let mut outputs = Vec::new();
    if let Some(result) = &vs.function.result {
        collect_locations(&vertex.module, result.ty, result.binding.as_ref(), &mut outputs);
    }

    let mut inputs = Vec::new();
    for arg in &fs.function.arguments {
        collect_locations(&fragment.module, arg.ty, arg.binding.as_ref(), &mut inputs);
    }

    for location in inputs {
        if !outputs.contains(&location) {
            return Err(format!(
                "fragment input @location({location}) of `{}` is not written by vertex entry point `{}`",
                fs.name, vs.name
            ));
        }
    }

    Ok(())
}

fn collect_locations(
    module: &naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&naga::Binding>,
    out: &mut Vec<u32>,
) {
    match binding {
        Some(naga::Binding::Location { location, .. }) => out.push(*location),
        Some(_) => {}
        // Unbound value: a struct whose members carry the bindings.
        None => {
            if let naga::TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(naga::Binding::Location { location, .. }) = &member.binding {
                        out.push(*location);
                    }
                }
            }
        }
    }
}

// ── wgpu backend ──────────────────────────────────────────────────────────

/// Fixed-function state the linked pipeline is built with.
#[derive(Debug, Clone)]
pub struct PipelineConfig<'a> {
    pub label: Option<&'a str>,
    pub vertex_buffers: &'a [wgpu::VertexBufferLayout<'a>],
    pub bind_group_layouts: &'a [&'a wgpu::BindGroupLayout],
    pub color_format: wgpu::TextureFormat,
    pub blend: Option<wgpu::BlendState>,
    pub topology: wgpu::PrimitiveTopology,
}

impl<'a> PipelineConfig<'a> {
    /// Triangle list, no blending, no vertex buffers or bind groups.
    pub fn new(color_format: wgpu::TextureFormat) -> Self {
        Self {
            label: None,
            vertex_buffers: &[],
            bind_group_layouts: &[],
            color_format,
            blend: None,
            topology: wgpu::PrimitiveTopology::TriangleList,
        }
    }
}

/// One stage after validation, uploaded as a wgpu shader module.
pub struct CompiledStage {
    pub validated: ValidatedStage,
    pub module: wgpu::ShaderModule,
}

/// Compiles WGSL stages and links them into a `wgpu::RenderPipeline`.
pub struct WgpuShaderBackend<'a> {
    device: &'a wgpu::Device,
    config: PipelineConfig<'a>,
}

impl<'a> WgpuShaderBackend<'a> {
    pub fn new(device: &'a wgpu::Device, config: PipelineConfig<'a>) -> Self {
        Self { device, config }
    }

    /// Runs `create` inside a validation error scope. A captured error comes
    /// back as its message instead of reaching the device's uncaptured-error
    /// handler, which panics.
    fn scoped<T>(&self, create: impl FnOnce(&wgpu::Device) -> T) -> Result<T, String> {
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = create(self.device);
        match pollster::block_on(scope.pop()) {
            Some(err) => Err(err.to_string()),
            None => Ok(value),
        }
    }

    fn create_pipeline(
        &self,
        device: &wgpu::Device,
        vertex: &CompiledStage,
        fragment: &CompiledStage,
    ) -> wgpu::RenderPipeline {
        let layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: self.config.label,
            bind_group_layouts: self.config.bind_group_layouts,
            immediate_size: 0,
        });

        device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: self.config.label,
            layout: Some(&layout),

            vertex: wgpu::VertexState {
                module: &vertex.module,
                entry_point: Some(&vertex.validated.entry_point),
                compilation_options: Default::default(),
                buffers: self.config.vertex_buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fragment.module,
                entry_point: Some(&fragment.validated.entry_point),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.config.color_format,
                    blend: self.config.blend,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: self.config.topology,
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
        })
    }
}

impl ShaderBackend for WgpuShaderBackend<'_> {
    type Stage = CompiledStage;
    type Program = wgpu::RenderPipeline;

    fn compile_stage(&self, stage: Stage, source: &str) -> Result<CompiledStage, String> {
        let validated = validate_stage(stage, source, capabilities_for(self.device.features()))?;

        let label = format!("{} {stage} shader", self.config.label.unwrap_or("neonet"));
        let module = self.scoped(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(source.into()),
            })
        })?;

        Ok(CompiledStage { validated, module })
    }

    fn link(
        &self,
        vertex: CompiledStage,
        fragment: CompiledStage,
    ) -> Result<wgpu::RenderPipeline, String> {
        check_interface(&vertex.validated, &fragment.validated)?;

        // Stage modules drop after this; the pipeline keeps what it needs.
        self.scoped(|device| self.create_pipeline(device, &vertex, &fragment))
    }
}
