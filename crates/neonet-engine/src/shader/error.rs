use std::path::PathBuf;

use super::Stage;

/// Errors produced while loading, compiling or using a shader program.
#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{stage} shader compilation failed:\n{log}")]
    Compile { stage: Stage, log: String },

    #[error("shader program link failed:\n{log}")]
    Link { log: String },

    #[error("shader program used before a successful compile")]
    NotCompiled,
}

impl ShaderError {
    /// The failing stage, for compile errors.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            ShaderError::Compile { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}
