//! Graphics wrappers
//!
//! Thin shader and mesh types over a [`GraphicsBackend`]. The backend is the
//! only thing that talks to a GPU API; everything here is plain data plus
//! calls through the trait.
//!
//! ```text
//! ResourceCache ── "shader" handler ──→ Shader ──┐
//!                                                 ├──→ GraphicsBackend
//! Application ────────────────────────→ Mesh ────┘
//! ```

mod backend;
mod headless;
pub mod mesh;
pub mod shader;

pub use backend::{GraphicsBackend, GraphicsError, SharedBackend, UniformValue};
pub use headless::{HeadlessBackend, MeshRecord};
pub use mesh::{make_quad, BufferUsage, Mesh, Vertex, VertexAttribute, VertexLayout};
pub use shader::{shader_handler, Shader, ShaderSource, ShaderStage};

pub use crate::foundation::collections::{MeshHandle, ProgramHandle};
