//! Headless graphics backend
//!
//! Keeps every GPU object as plain bookkeeping so the engine can run without
//! a device: in tests, on CI, or in the demo app.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::backend::{GraphicsBackend, GraphicsError, UniformValue};
use super::mesh::{BufferUsage, Vertex, VertexLayout};
use super::shader::{ShaderSource, ShaderStage};
use crate::foundation::collections::{MeshHandle, ProgramHandle};

/// Directive that makes the headless compiler reject a stage
const FAIL_DIRECTIVE: &str = "#error";

/// Bookkeeping for one uploaded mesh
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRecord {
    /// Number of vertices
    pub vertex_count: usize,
    /// Number of indices
    pub index_count: usize,
    /// Size of the vertex buffer in bytes
    pub vertex_bytes: usize,
    /// Usage hint given at creation
    pub usage: BufferUsage,
    /// Times the buffers were written, including creation
    pub uploads: usize,
}

/// Graphics backend that records calls instead of issuing them
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u32,
    programs: HashMap<ProgramHandle, ShaderSource>,
    uniforms: HashMap<(ProgramHandle, String), UniformValue>,
    bound_program: Option<ProgramHandle>,
    meshes: HashMap<MeshHandle, MeshRecord>,
    draw_calls: Vec<(MeshHandle, usize)>,
    clears: usize,
    mesh_limit: Option<usize>,
}

impl HeadlessBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty backend wrapped for sharing
    ///
    /// The result coerces to [`SharedBackend`](super::SharedBackend) while
    /// keeping the concrete type available for inspection.
    pub fn shared() -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Reject mesh creation once `limit` meshes are live
    pub fn set_mesh_limit(&mut self, limit: Option<usize>) {
        self.mesh_limit = limit;
    }

    /// Number of programs not yet deleted
    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    /// Number of meshes not yet deleted
    pub fn live_meshes(&self) -> usize {
        self.meshes.len()
    }

    /// Bookkeeping for a live mesh
    pub fn mesh(&self, mesh: MeshHandle) -> Option<&MeshRecord> {
        self.meshes.get(&mesh)
    }

    /// Last value assigned to a uniform
    pub fn uniform(&self, program: ProgramHandle, name: &str) -> Option<&UniformValue> {
        self.uniforms.get(&(program, name.to_string()))
    }

    /// Currently bound program
    pub const fn bound_program(&self) -> Option<ProgramHandle> {
        self.bound_program
    }

    /// Every draw issued so far, as (mesh, element count)
    pub fn draw_calls(&self) -> &[(MeshHandle, usize)] {
        &self.draw_calls
    }

    /// Number of clears issued so far
    pub const fn clears(&self) -> usize {
        self.clears
    }

    fn next_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    fn check_stage(stage: ShaderStage, text: &str) -> Result<(), GraphicsError> {
        match text.lines().position(|line| line.trim() == FAIL_DIRECTIVE) {
            Some(line) => Err(GraphicsError::Compilation {
                stage,
                message: format!("{FAIL_DIRECTIVE} directive on line {}", line + 1),
            }),
            None => Ok(()),
        }
    }
}

impl GraphicsBackend for HeadlessBackend {
    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramHandle, GraphicsError> {
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            Self::check_stage(stage, source.stage(stage))?;
        }

        let program = ProgramHandle(self.next_id());
        self.programs.insert(program, source.clone());
        Ok(program)
    }

    fn delete_program(&mut self, program: ProgramHandle) -> Result<(), GraphicsError> {
        self.programs
            .remove(&program)
            .ok_or(GraphicsError::UnknownProgram(program))?;
        self.uniforms.retain(|(owner, _), _| *owner != program);
        if self.bound_program == Some(program) {
            self.bound_program = None;
        }
        Ok(())
    }

    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<(), GraphicsError> {
        if let Some(program) = program {
            if !self.programs.contains_key(&program) {
                return Err(GraphicsError::UnknownProgram(program));
            }
        }
        self.bound_program = program;
        Ok(())
    }

    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: UniformValue,
    ) -> Result<(), GraphicsError> {
        if !self.programs.contains_key(&program) {
            return Err(GraphicsError::UnknownProgram(program));
        }
        self.uniforms.insert((program, name.to_string()), value);
        Ok(())
    }

    fn create_mesh(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        usage: BufferUsage,
        layout: &VertexLayout,
    ) -> Result<MeshHandle, GraphicsError> {
        if layout.stride != std::mem::size_of::<Vertex>() {
            return Err(GraphicsError::Backend(format!(
                "vertex layout stride {} does not match vertex size {}",
                layout.stride,
                std::mem::size_of::<Vertex>()
            )));
        }
        if self.mesh_limit.is_some_and(|limit| self.meshes.len() >= limit) {
            return Err(GraphicsError::Backend(format!(
                "mesh limit of {} reached",
                self.meshes.len()
            )));
        }
        let vertex_bytes = bytemuck::cast_slice::<Vertex, u8>(vertices).len();

        let mesh = MeshHandle(self.next_id());
        self.meshes.insert(
            mesh,
            MeshRecord {
                vertex_count: vertices.len(),
                index_count: indices.len(),
                vertex_bytes,
                usage,
                uploads: 1,
            },
        );
        Ok(mesh)
    }

    fn update_mesh(
        &mut self,
        mesh: MeshHandle,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), GraphicsError> {
        let record = self
            .meshes
            .get_mut(&mesh)
            .ok_or(GraphicsError::UnknownMesh(mesh))?;
        record.vertex_count = vertices.len();
        record.index_count = indices.len();
        record.vertex_bytes = bytemuck::cast_slice::<Vertex, u8>(vertices).len();
        record.uploads += 1;
        Ok(())
    }

    fn draw_mesh(&mut self, mesh: MeshHandle, element_count: usize) -> Result<(), GraphicsError> {
        let record = self.meshes.get(&mesh).ok_or(GraphicsError::UnknownMesh(mesh))?;
        if element_count > record.index_count {
            return Err(GraphicsError::Backend(format!(
                "draw of {element_count} elements exceeds {} indices",
                record.index_count
            )));
        }
        self.draw_calls.push((mesh, element_count));
        Ok(())
    }

    fn delete_mesh(&mut self, mesh: MeshHandle) -> Result<(), GraphicsError> {
        self.meshes
            .remove(&mesh)
            .map(|_| ())
            .ok_or(GraphicsError::UnknownMesh(mesh))
    }

    fn clear(&mut self, _color: [f32; 4]) {
        self.clears += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_and_delete_program() {
        let mut backend = HeadlessBackend::new();
        let program = backend
            .compile_program(&ShaderSource::new("void main() {}", ""))
            .unwrap();

        assert_eq!(backend.live_programs(), 1);
        backend.use_program(Some(program)).unwrap();
        backend.delete_program(program).unwrap();

        assert_eq!(backend.live_programs(), 0);
        assert_eq!(backend.bound_program(), None);
        assert!(matches!(
            backend.delete_program(program),
            Err(GraphicsError::UnknownProgram(_))
        ));
    }

    #[test]
    fn test_fail_directive_reports_stage_and_line() {
        let mut backend = HeadlessBackend::new();
        let result = backend.compile_program(&ShaderSource::new("ok\n  #error  ", ""));

        match result {
            Err(GraphicsError::Compilation { stage, message }) => {
                assert_eq!(stage, ShaderStage::Vertex);
                assert!(message.contains("line 2"));
            }
            other => panic!("Expected compilation error, got {other:?}"),
        }
        assert_eq!(backend.live_programs(), 0);
    }

    #[test]
    fn test_uniforms_require_live_program() {
        let mut backend = HeadlessBackend::new();
        let result = backend.set_uniform(ProgramHandle(42), "Time", UniformValue::Float(1.0));
        assert!(matches!(result, Err(GraphicsError::UnknownProgram(_))));
    }
}
