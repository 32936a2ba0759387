use anyhow::{Context, Result};
use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use neonet_engine::core::{AppControl, FrameCtx, LoadCtx, Scene};
use neonet_engine::paint::Color;
use neonet_engine::shader::{GpuShaderProgram, PipelineConfig};
use neonet_engine::time::GameTime;

const SHADER_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/res/shaders/default.wgsl");

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
        0 => Float32x3, // position
        1 => Float32x3  // color
    ];

    fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

const VERTICES: [Vertex; 4] = [
    // top right, blue
    Vertex { position: [0.5, 0.5, 0.0], color: [0.0, 0.0, 1.0] },
    // bottom right, green
    Vertex { position: [0.5, -0.5, 0.0], color: [0.0, 1.0, 0.0] },
    // bottom left, red
    Vertex { position: [-0.5, -0.5, 0.0], color: [1.0, 0.0, 0.0] },
    // top left, white
    Vertex { position: [-0.5, 0.5, 0.0], color: [1.0, 1.0, 1.0] },
];

// Two triangles sharing the 1-3 diagonal.
const INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

struct Buffers {
    vertices: wgpu::Buffer,
    indices: wgpu::Buffer,
}

/// Draws one colored rectangle on a black background.
#[derive(Default)]
pub struct RectangleScene {
    program: Option<GpuShaderProgram>,
    buffers: Option<Buffers>,
}

impl RectangleScene {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scene for RectangleScene {
    fn load_content(&mut self, ctx: &mut LoadCtx<'_, '_>) -> Result<()> {
        let mut program = GpuShaderProgram::from_file(SHADER_PATH)
            .with_context(|| format!("failed to read shader {SHADER_PATH}"))?;

        let layouts = [Vertex::layout()];
        let mut config = PipelineConfig::new(ctx.surface_format());
        config.label = Some("rectangle");
        config.vertex_buffers = &layouts;
        ctx.compile(&mut program, config)
            .context("failed to build rectangle shader")?;

        let device = ctx.device();
        let vertices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rectangle vbo"),
            contents: bytemuck::cast_slice(&VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let indices = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("rectangle ibo"),
            contents: bytemuck::cast_slice(&INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        self.program = Some(program);
        self.buffers = Some(Buffers { vertices, indices });
        Ok(())
    }

    fn update(&mut self, _time: &GameTime) -> AppControl {
        AppControl::Continue
    }

    fn render(&mut self, ctx: &mut FrameCtx<'_, '_>, _time: &GameTime) -> AppControl {
        let mut pass = ctx.begin_pass(Color::BLACK);

        let (Some(program), Some(buffers)) = (&self.program, &self.buffers) else {
            return AppControl::Continue;
        };
        if program.bind(&mut pass).is_err() {
            return AppControl::Continue;
        }

        pass.set_vertex_buffer(0, buffers.vertices.slice(..));
        pass.set_index_buffer(buffers.indices.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..INDICES.len() as u32, 0, 0..1);

        AppControl::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use neonet_engine::shader::{
        ShaderSource, Stage, capabilities_for, check_interface, validate_stage,
    };

    #[test]
    fn bundled_shader_has_both_sections() {
        let parsed = ShaderSource::parse_file(SHADER_PATH).unwrap();
        assert!(parsed.is_clean());

        let source = parsed.into_source();
        assert!(source.vertex.contains("@vertex"));
        assert!(source.fragment.contains("@fragment"));
    }

    #[test]
    fn bundled_shader_validates_and_links() {
        let source = ShaderSource::parse_file(SHADER_PATH).unwrap().into_source();

        let caps = capabilities_for(wgpu::Features::empty());

        let vs = validate_stage(Stage::Vertex, &source.vertex, caps).unwrap();
        let fs = validate_stage(Stage::Fragment, &source.fragment, caps).unwrap();
        assert_eq!(vs.entry_point, "vs_main");
        assert_eq!(fs.entry_point, "fs_main");
        check_interface(&vs, &fs).unwrap();
    }

    #[test]
    fn vertex_layout_matches_shader_locations() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 24);
        assert_eq!(layout.attributes[0].shader_location, 0);
        assert_eq!(layout.attributes[1].shader_location, 1);
        assert_eq!(layout.attributes[1].offset, 12);
    }

    #[test]
    fn indices_cover_all_vertices() {
        for i in 0..VERTICES.len() as u32 {
            assert!(INDICES.contains(&i));
        }
    }
}
