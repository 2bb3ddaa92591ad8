//! Graphics backend trait

use std::cell::RefCell;
use std::rc::Rc;

use nalgebra::{Matrix4, Vector3, Vector4};
use thiserror::Error;

use super::mesh::{BufferUsage, Vertex, VertexLayout};
use super::shader::{ShaderSource, ShaderStage};
use crate::foundation::collections::{MeshHandle, ProgramHandle};

/// Backend shared between the engine, loaders and GPU-owning wrappers
pub type SharedBackend = Rc<RefCell<dyn GraphicsBackend>>;

/// Graphics errors
#[derive(Debug, Error)]
pub enum GraphicsError {
    /// A shader stage failed to compile
    #[error("{stage} shader compilation failed: {message}")]
    Compilation {
        /// Stage that failed
        stage: ShaderStage,
        /// Compiler log
        message: String,
    },

    /// Program handle is not live
    #[error("Unknown program {0:?}")]
    UnknownProgram(ProgramHandle),

    /// Mesh handle is not live
    #[error("Unknown mesh {0:?}")]
    UnknownMesh(MeshHandle),

    /// Mesh has no uploaded buffers
    #[error("Mesh has no uploaded data")]
    MeshNotUploaded,

    /// Backend-specific failure
    #[error("Backend error: {0}")]
    Backend(String),
}

/// Value assignable to a shader uniform
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// Scalar
    Float(f32),
    /// 3-component vector
    Vec3(Vector3<f32>),
    /// 4-component vector
    Vec4(Vector4<f32>),
    /// 4x4 matrix
    Mat4(Matrix4<f32>),
}

/// Narrow interface to a graphics API
///
/// Handles are opaque to the caller and only meaningful to the backend that
/// produced them.
pub trait GraphicsBackend {
    /// Compile and link a program from both stage sources
    fn compile_program(&mut self, source: &ShaderSource) -> Result<ProgramHandle, GraphicsError>;

    /// Release a program
    fn delete_program(&mut self, program: ProgramHandle) -> Result<(), GraphicsError>;

    /// Make a program current, or unbind with `None`
    fn use_program(&mut self, program: Option<ProgramHandle>) -> Result<(), GraphicsError>;

    /// Assign a uniform on a program
    fn set_uniform(
        &mut self,
        program: ProgramHandle,
        name: &str,
        value: UniformValue,
    ) -> Result<(), GraphicsError>;

    /// Upload vertex and index buffers
    fn create_mesh(
        &mut self,
        vertices: &[Vertex],
        indices: &[u32],
        usage: BufferUsage,
        layout: &VertexLayout,
    ) -> Result<MeshHandle, GraphicsError>;

    /// Overwrite the buffers of an existing mesh in place
    fn update_mesh(
        &mut self,
        mesh: MeshHandle,
        vertices: &[Vertex],
        indices: &[u32],
    ) -> Result<(), GraphicsError>;

    /// Draw `element_count` indices of a mesh as triangles
    fn draw_mesh(&mut self, mesh: MeshHandle, element_count: usize) -> Result<(), GraphicsError>;

    /// Release a mesh's buffers
    fn delete_mesh(&mut self, mesh: MeshHandle) -> Result<(), GraphicsError>;

    /// Clear the color and depth targets
    fn clear(&mut self, color: [f32; 4]);
}
