//! Shader sources and programs
//!
//! Shader files hold both stages in one text file. Each stage starts with a
//! marker line naming it:
//!
//! ```text
//! ### vertex
//! <vertex-stage source>
//! ### fragment
//! <fragment-stage source>
//! ```
//!
//! Sections may appear in any order and either may be missing; a missing
//! stage is compiled from empty source.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use nalgebra::Matrix4;

use super::backend::{GraphicsError, SharedBackend, UniformValue};
use crate::foundation::collections::ProgramHandle;
use crate::resources::{io, ResourceError, TypeHandler};

/// Prefix of a section marker line
pub const SECTION_MARKER: &str = "###";

/// Programmable pipeline stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// Vertex stage
    Vertex,
    /// Fragment stage
    Fragment,
}

impl ShaderStage {
    /// Parse the keyword following a section marker
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "vertex" => Some(Self::Vertex),
            "fragment" => Some(Self::Fragment),
            _ => None,
        }
    }

    /// Keyword used in section markers
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Vertex => "vertex",
            Self::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Source text for both stages of a program
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderSource {
    /// Vertex stage source
    pub vertex: String,
    /// Fragment stage source
    pub fragment: String,
}

impl ShaderSource {
    /// Create a source from explicit stage texts
    pub fn new(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }

    /// Split a combined shader file into its stages
    ///
    /// Lines of a section are joined with `\n` without a trailing newline.
    /// Text before the first marker and sections with an unknown keyword are
    /// dropped. A stage that appears twice keeps its last section.
    pub fn parse(text: &str) -> Self {
        let (source, dropped) = Self::split(text);
        if dropped.preamble {
            log::warn!("Ignoring shader text before the first section marker");
        }
        for keyword in &dropped.unknown_sections {
            log::warn!("Ignoring unknown shader section '{keyword}'");
        }
        source
    }

    fn split(text: &str) -> (Self, DroppedText) {
        let mut source = Self::default();
        let mut dropped = DroppedText::default();
        let mut seen: Vec<ShaderStage> = Vec::with_capacity(2);
        let mut current = Section::Preamble;

        for line in text.lines() {
            if let Some(rest) = line.strip_prefix(SECTION_MARKER) {
                if let Section::Stage(stage, lines) = current {
                    source.store(stage, &lines, &mut seen);
                }

                let keyword = rest.split_whitespace().next().unwrap_or_default();
                current = match ShaderStage::from_keyword(keyword) {
                    Some(stage) => Section::Stage(stage, Vec::new()),
                    None => {
                        dropped.unknown_sections.push(keyword.to_string());
                        Section::Unknown
                    }
                };
                continue;
            }

            match &mut current {
                Section::Stage(_, lines) => lines.push(line),
                Section::Preamble if !line.trim().is_empty() => dropped.preamble = true,
                Section::Preamble | Section::Unknown => {}
            }
        }

        if let Section::Stage(stage, lines) = current {
            source.store(stage, &lines, &mut seen);
        }

        (source, dropped)
    }

    /// Source of one stage
    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }

    fn store(&mut self, stage: ShaderStage, lines: &[&str], seen: &mut Vec<ShaderStage>) {
        if seen.contains(&stage) {
            log::warn!("Duplicate {stage} shader section replaces the earlier one");
        } else {
            seen.push(stage);
        }

        let text = lines.join("\n");
        match stage {
            ShaderStage::Vertex => self.vertex = text,
            ShaderStage::Fragment => self.fragment = text,
        }
    }
}

/// Section a line of a shader file belongs to
enum Section<'a> {
    Preamble,
    Stage(ShaderStage, Vec<&'a str>),
    Unknown,
}

/// Text [`ShaderSource::parse`] discarded
#[derive(Debug, Default)]
struct DroppedText {
    preamble: bool,
    unknown_sections: Vec<String>,
}

/// Compiled program plus the source it came from
///
/// The program is deleted by [`Shader::cleanup`], or on drop if that never
/// ran.
pub struct Shader {
    program: ProgramHandle,
    source: ShaderSource,
    backend: SharedBackend,
    released: Cell<bool>,
}

impl Shader {
    /// Compile a program on the backend
    pub fn compile(backend: SharedBackend, source: ShaderSource) -> Result<Self, GraphicsError> {
        let program = backend.borrow_mut().compile_program(&source)?;
        log::debug!("Compiled shader program {:?}", program);
        Ok(Self {
            program,
            source,
            backend,
            released: Cell::new(false),
        })
    }

    /// Backend handle of the program
    pub const fn program(&self) -> ProgramHandle {
        self.program
    }

    /// Source the program was compiled from
    pub const fn source(&self) -> &ShaderSource {
        &self.source
    }

    /// Make this program current
    pub fn bind(&self) -> Result<(), GraphicsError> {
        self.backend.borrow_mut().use_program(Some(self.program))
    }

    /// Unbind any program
    pub fn unbind(&self) -> Result<(), GraphicsError> {
        self.backend.borrow_mut().use_program(None)
    }

    /// Assign a uniform
    pub fn set_uniform(&self, name: &str, value: UniformValue) -> Result<(), GraphicsError> {
        self.backend
            .borrow_mut()
            .set_uniform(self.program, name, value)
    }

    /// Assign a 4x4 matrix uniform
    pub fn set_mat4(&self, name: &str, value: &Matrix4<f32>) -> Result<(), GraphicsError> {
        self.set_uniform(name, UniformValue::Mat4(*value))
    }

    /// Assign a scalar uniform
    pub fn set_float(&self, name: &str, value: f32) -> Result<(), GraphicsError> {
        self.set_uniform(name, UniformValue::Float(value))
    }

    /// Release the program
    ///
    /// Later calls do nothing.
    pub fn cleanup(&self) -> Result<(), GraphicsError> {
        if self.released.replace(true) {
            return Ok(());
        }
        log::debug!("Deleting shader program {:?}", self.program);
        self.backend.borrow_mut().delete_program(self.program)
    }

    /// Whether the program has been released
    pub fn is_released(&self) -> bool {
        self.released.get()
    }
}

impl Drop for Shader {
    fn drop(&mut self) {
        if self.released.replace(true) {
            return;
        }
        match self.backend.try_borrow_mut() {
            Ok(mut backend) => {
                if let Err(e) = backend.delete_program(self.program) {
                    log::warn!("Failed to delete shader program {:?} on drop: {}", self.program, e);
                }
            }
            Err(_) => log::warn!("Backend busy, leaking shader program {:?}", self.program),
        }
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("program", &self.program)
            .field("source", &self.source)
            .field("released", &self.released.get())
            .finish_non_exhaustive()
    }
}

/// Resource handler for `"shader"` files
///
/// Reads the file, splits it into stages and compiles it on `backend`.
/// Evicting the resource deletes the program.
pub fn shader_handler(backend: SharedBackend) -> TypeHandler {
    TypeHandler::with_cleanup(
        move |path, _| {
            let text = io::read_text(path)?;
            let shader = Shader::compile(Rc::clone(&backend), ShaderSource::parse(&text))?;
            Ok(shader)
        },
        |shader: &Shader| shader.cleanup().map_err(ResourceError::from),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::HeadlessBackend;
    use crate::resources::ResourceCache;

    #[test]
    fn test_parse_both_sections() {
        let source = ShaderSource::parse("### vertex\nA\n### fragment\nB");
        assert_eq!(source.vertex, "A");
        assert_eq!(source.fragment, "B");
    }

    #[test]
    fn test_parse_missing_fragment_is_empty() {
        let source = ShaderSource::parse("### vertex\nvoid main() {}\n");
        assert_eq!(source.vertex, "void main() {}");
        assert_eq!(source.fragment, "");
    }

    #[test]
    fn test_parse_any_order_and_multiline() {
        let text = "### fragment\nout vec4 c;\nvoid main() {}\n### vertex\nin vec4 p;\nvoid main() {}\n";
        let source = ShaderSource::parse(text);
        assert_eq!(source.vertex, "in vec4 p;\nvoid main() {}");
        assert_eq!(source.fragment, "out vec4 c;\nvoid main() {}");
    }

    #[test]
    fn test_parse_ignores_preamble_and_unknown_sections() {
        let text = "// header\n### geometry\nG\n###VERTEX\nV\r\n### fragment\nF";
        let source = ShaderSource::parse(text);
        assert_eq!(source.vertex, "V");
        assert_eq!(source.fragment, "F");
    }

    #[test]
    fn test_split_reports_preamble_and_unknown_sections_apart() {
        let (source, dropped) = ShaderSource::split("### geometry\nG\n### vertex\nV");
        assert_eq!(source.vertex, "V");
        assert!(!dropped.preamble);
        assert_eq!(dropped.unknown_sections, vec!["geometry".to_string()]);

        let (_, dropped) = ShaderSource::split("// header\n\n### vertex\nV");
        assert!(dropped.preamble);
        assert!(dropped.unknown_sections.is_empty());
    }

    #[test]
    fn test_parse_duplicate_section_keeps_last() {
        let source = ShaderSource::parse("### vertex\nfirst\n### vertex\nsecond");
        assert_eq!(source.stage(ShaderStage::Vertex), "second");
    }

    #[test]
    fn test_parse_empty_text() {
        assert_eq!(ShaderSource::parse(""), ShaderSource::default());
    }

    #[test]
    fn test_shader_handler_loads_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("shaders")).unwrap();
        std::fs::write(
            dir.path().join("shaders/main.shader"),
            "### vertex\nV\n### fragment\nF\n",
        )
        .unwrap();

        let backend = HeadlessBackend::shared();
        let mut cache = ResourceCache::new(dir.path());
        cache
            .register_type_handler("shader", shader_handler(backend.clone()))
            .unwrap();

        let shader: Rc<Shader> = cache.load("shader", "shaders/main.shader", "level1").unwrap();
        assert_eq!(shader.source(), &ShaderSource::new("V", "F"));
        assert_eq!(backend.borrow().live_programs(), 1);

        shader.bind().unwrap();
        shader.set_mat4("ViewMatrix", &Matrix4::identity()).unwrap();
        assert_eq!(
            backend.borrow().uniform(shader.program(), "ViewMatrix"),
            Some(&UniformValue::Mat4(Matrix4::identity()))
        );

        cache.clear_lifespan("level1").unwrap();
        assert_eq!(backend.borrow().live_programs(), 0);
    }

    #[test]
    fn test_dropping_shader_deletes_program() {
        let backend = HeadlessBackend::shared();
        let shader = Shader::compile(backend.clone(), ShaderSource::new("V", "F")).unwrap();
        assert_eq!(backend.borrow().live_programs(), 1);

        drop(shader);
        assert_eq!(backend.borrow().live_programs(), 0);
    }

    #[test]
    fn test_cleanup_then_drop_deletes_once() {
        let backend = HeadlessBackend::shared();
        let shader = Shader::compile(backend.clone(), ShaderSource::new("V", "F")).unwrap();

        shader.cleanup().unwrap();
        assert!(shader.is_released());
        shader.cleanup().unwrap();
        drop(shader);
        assert_eq!(backend.borrow().live_programs(), 0);
    }

    #[test]
    fn test_shader_handler_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = ResourceCache::new(dir.path());
        cache
            .register_type_handler("shader", shader_handler(HeadlessBackend::shared()))
            .unwrap();

        let result = cache.load::<Shader>("shader", "missing.shader", "");
        assert!(matches!(result, Err(ResourceError::Io { .. })));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_shader_handler_compile_error_propagates() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.shader"), "### fragment\n#error\n").unwrap();

        let mut cache = ResourceCache::new(dir.path());
        cache
            .register_type_handler("shader", shader_handler(HeadlessBackend::shared()))
            .unwrap();

        let result = cache.load::<Shader>("shader", "bad.shader", "");
        assert!(matches!(
            result,
            Err(ResourceError::Graphics(GraphicsError::Compilation {
                stage: ShaderStage::Fragment,
                ..
            }))
        ));
        assert!(cache.is_empty());
    }
}
