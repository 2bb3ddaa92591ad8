//! Mesh representation
//!
//! CPU-side vertex and index data plus the backend handle of its uploaded
//! buffers. `Vertex` is a pure `#[repr(C)]` data structure; how its
//! attributes map onto shader inputs is described by [`VertexLayout`] and left
//! to the backend.

use std::fmt;
use std::mem::{offset_of, size_of};

use bytemuck::{Pod, Zeroable};
use nalgebra::{Vector2, Vector3, Vector4};

use super::backend::{GraphicsError, SharedBackend};
use crate::foundation::collections::MeshHandle;

/// Vertex with position, normal, texture coordinate and color
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Homogeneous position
    pub position: [f32; 4],
    /// Normal vector
    pub normal: [f32; 3],
    /// Texture coordinates
    pub uv: [f32; 2],
    /// RGBA color
    pub color: [f32; 4],
}

impl Vertex {
    /// Vertex at `position` with zero normal and uv and white color
    pub const fn new(position: [f32; 4]) -> Self {
        Self {
            position,
            normal: [0.0; 3],
            uv: [0.0; 2],
            color: [1.0; 4],
        }
    }

    /// Set the normal
    pub fn with_normal(mut self, normal: Vector3<f32>) -> Self {
        self.normal = normal.into();
        self
    }

    /// Set the texture coordinates
    pub fn with_uv(mut self, uv: Vector2<f32>) -> Self {
        self.uv = uv.into();
        self
    }

    /// Set the color
    pub fn with_color(mut self, color: Vector4<f32>) -> Self {
        self.color = color.into();
        self
    }
}

impl From<Vector4<f32>> for Vertex {
    fn from(position: Vector4<f32>) -> Self {
        Self::new(position.into())
    }
}

/// Buffer usage hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BufferUsage {
    /// Uploaded once, drawn many times
    #[default]
    Static,
    /// Rewritten occasionally
    Dynamic,
    /// Rewritten every frame
    Stream,
}

/// One vertex attribute as seen by the shader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Shader input location
    pub location: u32,
    /// Number of `f32` components
    pub components: u32,
    /// Byte offset inside the vertex
    pub offset: usize,
}

/// Attribute layout of a vertex buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    /// Byte distance between consecutive vertices
    pub stride: usize,
    /// Attributes in location order
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout of [`Vertex`]: position, normal, uv, color at locations 0-3
    pub fn of_vertex() -> Self {
        Self {
            stride: size_of::<Vertex>(),
            attributes: vec![
                VertexAttribute { location: 0, components: 4, offset: offset_of!(Vertex, position) },
                VertexAttribute { location: 1, components: 3, offset: offset_of!(Vertex, normal) },
                VertexAttribute { location: 2, components: 2, offset: offset_of!(Vertex, uv) },
                VertexAttribute { location: 3, components: 4, offset: offset_of!(Vertex, color) },
            ],
        }
    }
}

/// Geometry with its uploaded buffers
pub struct Mesh {
    backend: SharedBackend,
    handle: Option<MeshHandle>,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    usage: BufferUsage,
}

impl Mesh {
    /// Create a mesh and upload its data
    pub fn new(
        backend: SharedBackend,
        vertices: Vec<Vertex>,
        indices: Vec<u32>,
        usage: BufferUsage,
    ) -> Result<Self, GraphicsError> {
        let mut mesh = Self {
            backend,
            handle: None,
            vertices: Vec::new(),
            indices: Vec::new(),
            usage,
        };
        mesh.set_data(vertices, indices)?;
        Ok(mesh)
    }

    /// Replace the geometry, recreating the buffers
    ///
    /// The new buffers are created before the old ones are released, so a
    /// failed upload leaves the mesh as it was.
    pub fn set_data(&mut self, vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<(), GraphicsError> {
        let handle = self.backend.borrow_mut().create_mesh(
            &vertices,
            &indices,
            self.usage,
            &VertexLayout::of_vertex(),
        )?;

        let previous = self.handle.replace(handle);
        self.vertices = vertices;
        self.indices = indices;

        match previous {
            Some(old) => self.backend.borrow_mut().delete_mesh(old),
            None => Ok(()),
        }
    }

    /// Write the current CPU-side data into the existing buffers
    ///
    /// Use after editing through [`Mesh::vertices_mut`] or
    /// [`Mesh::indices_mut`] without changing lengths.
    pub fn reupload_data(&self) -> Result<(), GraphicsError> {
        let handle = self.handle.ok_or(GraphicsError::MeshNotUploaded)?;
        self.backend
            .borrow_mut()
            .update_mesh(handle, &self.vertices, &self.indices)
    }

    /// Draw `elements` indices, or all of them
    pub fn render(&self, elements: Option<usize>) -> Result<(), GraphicsError> {
        let handle = self.handle.ok_or(GraphicsError::MeshNotUploaded)?;
        let count = elements.unwrap_or(self.indices.len());
        self.backend.borrow_mut().draw_mesh(handle, count)
    }

    /// Release the buffers; the CPU-side data is kept
    pub fn cleanup(&mut self) -> Result<(), GraphicsError> {
        match self.handle.take() {
            Some(handle) => self.backend.borrow_mut().delete_mesh(handle),
            None => Ok(()),
        }
    }

    /// Whether buffers are currently uploaded
    pub const fn has_data(&self) -> bool {
        self.handle.is_some()
    }

    /// Backend handle, if uploaded
    pub const fn handle(&self) -> Option<MeshHandle> {
        self.handle
    }

    /// Vertex data
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Mutable vertex data; call [`Mesh::reupload_data`] afterwards
    pub fn vertices_mut(&mut self) -> &mut [Vertex] {
        &mut self.vertices
    }

    /// Index data
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Mutable index data; call [`Mesh::reupload_data`] afterwards
    pub fn indices_mut(&mut self) -> &mut [u32] {
        &mut self.indices
    }

    /// Vertex data as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

impl Drop for Mesh {
    fn drop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        match self.backend.try_borrow_mut() {
            Ok(mut backend) => {
                if let Err(e) = backend.delete_mesh(handle) {
                    log::warn!("Failed to delete mesh {:?} on drop: {}", handle, e);
                }
            }
            Err(_) => log::warn!("Backend busy, leaking mesh {:?}", handle),
        }
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mesh")
            .field("handle", &self.handle)
            .field("vertices", &self.vertices.len())
            .field("indices", &self.indices.len())
            .field("usage", &self.usage)
            .finish_non_exhaustive()
    }
}

/// Vertices and indices of a quad on the `z = -1` plane
pub fn quad_geometry(scale: f32) -> (Vec<Vertex>, Vec<u32>) {
    let vertices = vec![
        Vertex::new([-scale, -scale, -1.0, 1.0]).with_uv(Vector2::new(0.0, 0.0)),
        Vertex::new([-scale, scale, -1.0, 1.0]).with_uv(Vector2::new(0.0, 1.0)),
        Vertex::new([scale, scale, -1.0, 1.0]).with_uv(Vector2::new(1.0, 1.0)),
        Vertex::new([scale, -scale, -1.0, 1.0]).with_uv(Vector2::new(1.0, 0.0)),
    ];
    (vertices, vec![0, 2, 1, 0, 3, 2])
}

/// Upload a static quad spanning `[-scale, scale]` in x and y
pub fn make_quad(backend: SharedBackend, scale: f32) -> Result<Mesh, GraphicsError> {
    let (vertices, indices) = quad_geometry(scale);
    Mesh::new(backend, vertices, indices, BufferUsage::Static)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::HeadlessBackend;

    #[test]
    fn test_vertex_layout_matches_struct() {
        let layout = VertexLayout::of_vertex();
        assert_eq!(layout.stride, 52);
        let offsets: Vec<usize> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 16, 28, 36]);
    }

    #[test]
    fn test_quad_geometry() {
        let (vertices, indices) = quad_geometry(2.0);
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices, vec![0, 2, 1, 0, 3, 2]);
        assert_eq!(vertices[2].position, [2.0, 2.0, -1.0, 1.0]);
        assert_eq!(vertices[3].uv, [1.0, 0.0]);
    }

    #[test]
    fn test_render_draws_all_indices_by_default() {
        let backend = HeadlessBackend::shared();
        let quad = make_quad(backend.clone(), 1.0).unwrap();

        quad.render(None).unwrap();
        quad.render(Some(3)).unwrap();

        let handle = quad.handle().unwrap();
        assert_eq!(backend.borrow().draw_calls(), &[(handle, 6), (handle, 3)]);
    }

    #[test]
    fn test_set_data_replaces_buffers() {
        let backend = HeadlessBackend::shared();
        let mut quad = make_quad(backend.clone(), 1.0).unwrap();
        let first = quad.handle().unwrap();

        quad.set_data(vec![Vertex::new([0.0, 0.0, 0.0, 1.0]); 3], vec![0, 1, 2])
            .unwrap();

        assert_ne!(quad.handle(), Some(first));
        assert_eq!(backend.borrow().live_meshes(), 1);
        assert_eq!(backend.borrow().mesh(quad.handle().unwrap()).unwrap().index_count, 3);
    }

    #[test]
    fn test_failed_set_data_keeps_previous_buffers() {
        let backend = HeadlessBackend::shared();
        let mut quad = make_quad(backend.clone(), 1.0).unwrap();
        let handle = quad.handle().unwrap();
        backend.borrow_mut().set_mesh_limit(Some(1));

        let result = quad.set_data(vec![Vertex::new([0.0, 0.0, 0.0, 1.0]); 3], vec![0, 1, 2]);

        assert!(matches!(result, Err(GraphicsError::Backend(_))));
        assert_eq!(quad.handle(), Some(handle));
        assert_eq!(quad.indices().len(), 6);
        assert_eq!(backend.borrow().live_meshes(), 1);
        quad.render(None).unwrap();
    }

    #[test]
    fn test_reupload_and_cleanup() {
        let backend = HeadlessBackend::shared();
        let mut quad = make_quad(backend.clone(), 1.0).unwrap();
        let handle = quad.handle().unwrap();

        quad.vertices_mut()[0].color = [1.0, 0.0, 0.0, 1.0];
        quad.reupload_data().unwrap();
        assert_eq!(backend.borrow().mesh(handle).unwrap().uploads, 2);
        assert_eq!(quad.vertex_bytes().len(), 4 * 52);

        quad.cleanup().unwrap();
        assert!(!quad.has_data());
        assert_eq!(backend.borrow().live_meshes(), 0);
        assert!(matches!(quad.render(None), Err(GraphicsError::MeshNotUploaded)));
    }

    #[test]
    fn test_drop_releases_buffers() {
        let backend = HeadlessBackend::shared();
        {
            let _quad = make_quad(backend.clone(), 1.0).unwrap();
            assert_eq!(backend.borrow().live_meshes(), 1);
        }
        assert_eq!(backend.borrow().live_meshes(), 0);
    }
}
