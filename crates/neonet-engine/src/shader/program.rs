use std::path::Path;

use super::{ShaderError, ShaderSource, Stage};

/// Graphics-API seam for compiling and linking shader programs.
///
/// `Stage` values are intermediate per-stage objects; `link` consumes them,
/// so they are released as soon as linking returns.
pub trait ShaderBackend {
    type Stage;
    type Program;

    /// Compiles one stage; `Err` carries the compiler's diagnostic text.
    fn compile_stage(&self, stage: Stage, source: &str) -> Result<Self::Stage, String>;

    /// Links both stages into a program; `Err` carries the linker's text.
    fn link(&self, vertex: Self::Stage, fragment: Self::Stage) -> Result<Self::Program, String>;
}

/// A vertex + fragment shader program.
///
/// Not usable until [`compile`](Self::compile) succeeds. `P` is the backend's
/// linked program handle.
#[derive(Debug)]
pub struct ShaderProgram<P> {
    source: ShaderSource,
    program: Option<P>,
}

/// Shader program linked into a wgpu render pipeline.
pub type GpuShaderProgram = ShaderProgram<wgpu::RenderPipeline>;

impl<P> ShaderProgram<P> {
    pub fn new(source: ShaderSource) -> Self {
        Self {
            source,
            program: None,
        }
    }

    /// Reads and splits a shader file. Parse diagnostics are logged.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let parsed = ShaderSource::parse_file(path)?;
        Ok(Self::new(parsed.into_source()))
    }

    pub fn source(&self) -> &ShaderSource {
        &self.source
    }

    pub fn is_compiled(&self) -> bool {
        self.program.is_some()
    }

    /// Compiles both stages and links them.
    ///
    /// The vertex stage is compiled first; on its failure the fragment stage
    /// is not attempted. A failed compile leaves the program unusable.
    /// Compiling an already compiled program does nothing and succeeds.
    pub fn compile<B>(&mut self, backend: &B) -> Result<(), ShaderError>
    where
        B: ShaderBackend<Program = P>,
    {
        if self.program.is_some() {
            log::debug!("shader program already compiled");
            return Ok(());
        }

        let vertex = compile_stage(backend, Stage::Vertex, &self.source.vertex)?;
        let fragment = compile_stage(backend, Stage::Fragment, &self.source.fragment)?;

        let program = backend.link(vertex, fragment).map_err(|log| {
            log::error!("shader program link failed:\n{log}");
            ShaderError::Link { log }
        })?;

        self.program = Some(program);
        log::info!("shader program compiled");
        Ok(())
    }

    /// The linked program, or `NotCompiled` (logged) if not ready.
    pub fn program(&self) -> Result<&P, ShaderError> {
        match &self.program {
            Some(p) => Ok(p),
            None => {
                log::warn!("shader program used before a successful compile");
                Err(ShaderError::NotCompiled)
            }
        }
    }
}

impl ShaderProgram<wgpu::RenderPipeline> {
    /// Makes this program current for subsequent draws in `pass`.
    ///
    /// On a program that is not ready this is a no-op returning `NotCompiled`.
    pub fn bind(&self, pass: &mut wgpu::RenderPass<'_>) -> Result<(), ShaderError> {
        let pipeline = self.program()?;
        pass.set_pipeline(pipeline);
        Ok(())
    }
}

fn compile_stage<B: ShaderBackend>(
    backend: &B,
    stage: Stage,
    source: &str,
) -> Result<B::Stage, ShaderError> {
    backend.compile_stage(stage, source).map_err(|log| {
        log::error!("{stage} shader compilation failed:\n{log}");
        ShaderError::Compile { stage, log }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Records every call; fails on sources containing "BAD" or on link when
    /// `fail_link` is set.
    #[derive(Default)]
    struct FakeBackend {
        compiled: RefCell<Vec<Stage>>,
        links: Cell<usize>,
        fail_link: bool,
    }

    #[derive(Debug, PartialEq)]
    struct FakeProgram(String);

    impl ShaderBackend for FakeBackend {
        type Stage = String;
        type Program = FakeProgram;

        fn compile_stage(&self, stage: Stage, source: &str) -> Result<String, String> {
            self.compiled.borrow_mut().push(stage);
            if source.contains("BAD") {
                return Err(format!("error: bad token in {stage}"));
            }
            Ok(source.to_string())
        }

        fn link(&self, vertex: String, fragment: String) -> Result<FakeProgram, String> {
            self.links.set(self.links.get() + 1);
            if self.fail_link {
                return Err("error: interface mismatch".to_string());
            }
            Ok(FakeProgram(format!("{vertex}|{fragment}")))
        }
    }

    fn program(vs: &str, fs: &str) -> ShaderProgram<FakeProgram> {
        ShaderProgram::new(ShaderSource::new(vs, fs))
    }

    #[test]
    fn compile_links_both_stages() {
        let backend = FakeBackend::default();
        let mut p = program("v", "f");
        p.compile(&backend).unwrap();
        assert!(p.is_compiled());
        assert_eq!(p.program().unwrap(), &FakeProgram("v|f".into()));
        assert_eq!(*backend.compiled.borrow(), vec![Stage::Vertex, Stage::Fragment]);
        assert_eq!(backend.links.get(), 1);
    }

    #[test]
    fn second_compile_is_noop() {
        let backend = FakeBackend::default();
        let mut p = program("v", "f");
        p.compile(&backend).unwrap();
        p.compile(&backend).unwrap();
        assert_eq!(backend.compiled.borrow().len(), 2);
        assert_eq!(backend.links.get(), 1);
    }

    #[test]
    fn vertex_failure_skips_fragment() {
        let backend = FakeBackend::default();
        let mut p = program("BAD", "f");
        let err = p.compile(&backend).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Vertex));
        match err {
            ShaderError::Compile { log, .. } => assert!(log.contains("bad token")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(*backend.compiled.borrow(), vec![Stage::Vertex]);
        assert_eq!(backend.links.get(), 0);
        assert!(!p.is_compiled());
    }

    #[test]
    fn fragment_failure_reports_fragment() {
        let backend = FakeBackend::default();
        let mut p = program("v", "BAD");
        let err = p.compile(&backend).unwrap_err();
        assert_eq!(err.stage(), Some(Stage::Fragment));
        assert!(!p.is_compiled());
        assert_eq!(backend.links.get(), 0);
    }

    #[test]
    fn link_failure_leaves_program_unusable() {
        let backend = FakeBackend { fail_link: true, ..Default::default() };
        let mut p = program("v", "f");
        let err = p.compile(&backend).unwrap_err();
        assert!(matches!(err, ShaderError::Link { .. }));
        assert!(!p.is_compiled());
    }

    #[test]
    fn failed_compile_can_be_retried() {
        let failing = FakeBackend { fail_link: true, ..Default::default() };
        let working = FakeBackend::default();
        let mut p = program("v", "f");
        assert!(p.compile(&failing).is_err());
        p.compile(&working).unwrap();
        assert!(p.is_compiled());
    }

    #[test]
    fn use_before_compile_is_rejected() {
        let p = program("v", "f");
        assert!(matches!(p.program(), Err(ShaderError::NotCompiled)));
    }

    #[test]
    fn from_file_splits_sections() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "#shader vertex\nv\n#shader fragment\nf\n").unwrap();
        let p: ShaderProgram<FakeProgram> = ShaderProgram::from_file(file.path()).unwrap();
        assert_eq!(p.source(), &ShaderSource::new("v\n", "f\n"));
        assert!(!p.is_compiled());
    }
}
