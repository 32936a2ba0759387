//! Shader sources, stage compilation and program linking.
//!
//! A shader file holds both stages, separated by directive lines:
//!
//! ```text
//! #shader vertex
//! ... vertex stage ...
//! #shader fragment
//! ... fragment stage ...
//! ```
//!
//! `ShaderSource` splits the file, `ShaderProgram` drives compilation through
//! a `ShaderBackend`, and `WgpuShaderBackend` is the GPU implementation.

mod compiler;
mod error;
mod program;
mod source;

pub use compiler::{
    capabilities_for, check_interface, validate_stage, CompiledStage, PipelineConfig, ValidatedStage,
    WgpuShaderBackend,
};
pub use error::ShaderError;
pub use program::{GpuShaderProgram, ShaderBackend, ShaderProgram};
pub use source::{DiagnosticKind, ParseDiagnostic, ParsedShader, ShaderSource, DIRECTIVE};

/// Programmable pipeline stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
