use std::fmt;
use std::path::Path;

use super::{ShaderError, Stage};

/// Reserved token that starts a section directive line.
pub const DIRECTIVE: &str = "#shader";

/// Vertex and fragment source text split out of one shader file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    pub vertex: String,
    pub fragment: String,
}

/// What a parse diagnostic is about.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum DiagnosticKind {
    /// Content line seen before any section directive; the line was dropped.
    OrphanLine,
    /// Directive line naming neither `vertex` nor `fragment`; ignored.
    UnknownSection,
}

/// Non-fatal problem found while splitting a shader file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDiagnostic {
    /// 1-based line number.
    pub line: usize,
    pub kind: DiagnosticKind,
    /// The offending line, verbatim.
    pub text: String,
}

impl fmt::Display for ParseDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::OrphanLine => {
                write!(f, "line {}: content outside any shader section: {:?}", self.line, self.text)
            }
            DiagnosticKind::UnknownSection => {
                write!(f, "line {}: unknown shader section directive: {:?}", self.line, self.text)
            }
        }
    }
}

/// Result of splitting a shader file: the sections plus any diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedShader {
    pub source: ShaderSource,
    pub diagnostics: Vec<ParseDiagnostic>,
}

impl ParsedShader {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.diagnostics.iter().filter(|d| d.kind == kind).count()
    }

    pub fn into_source(self) -> ShaderSource {
        self.source
    }
}

impl ShaderSource {
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Source text of one stage.
    pub fn stage(&self, stage: Stage) -> &str {
        match stage {
            Stage::Vertex => &self.vertex,
            Stage::Fragment => &self.fragment,
        }
    }

    /// Reads and splits a shader file.
    ///
    /// Only I/O failures are errors; layout problems come back as diagnostics.
    pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedShader, ShaderError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(split_sections(&text, &path.display().to_string()))
    }

    /// Splits in-memory shader text.
    pub fn parse_str(text: &str) -> ParsedShader {
        split_sections(text, "<memory>")
    }
}

/// Partitions `text` by the most recent `#shader` directive.
///
/// Every non-directive line is copied with a trailing `\n` into the active
/// section. Directive lines themselves are never copied.
fn split_sections(text: &str, origin: &str) -> ParsedShader {
    let mut parsed = ParsedShader::default();
    let mut current: Option<Stage> = None;

    for (idx, line) in text.lines().enumerate() {
        if let Some(rest) = line.strip_prefix(DIRECTIVE) {
            if rest.contains("vertex") {
                current = Some(Stage::Vertex);
            } else if rest.contains("fragment") {
                current = Some(Stage::Fragment);
            } else {
                report(&mut parsed, origin, idx + 1, DiagnosticKind::UnknownSection, line);
            }
            continue;
        }

        let section = match current {
            Some(Stage::Vertex) => &mut parsed.source.vertex,
            Some(Stage::Fragment) => &mut parsed.source.fragment,
            None => {
                report(&mut parsed, origin, idx + 1, DiagnosticKind::OrphanLine, line);
                continue;
            }
        };
        section.push_str(line);
        section.push('\n');
    }

    parsed
}

fn report(parsed: &mut ParsedShader, origin: &str, line: usize, kind: DiagnosticKind, text: &str) {
    let diag = ParseDiagnostic {
        line,
        kind,
        text: text.to_string(),
    };
    log::warn!("invalid shader file {origin}: {diag}");
    parsed.diagnostics.push(diag);
}
