use voxlith_geom::Vec3;

use crate::tables::{QUAD_INDICES_FLIPPED, QUAD_INDICES_NORMAL};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub uv: [f32; 2],
    /// `[u0, v0, u1, v1]` of the atlas region, for wrapping in the shader.
    pub uv_bounds: [f32; 4],
    /// `[sun, ambient, dynamic, 255]`.
    pub base_color: [u8; 4],
    pub tint_color: [u8; 4],
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub faces: usize,
    pub vertices: usize,
    pub indices: usize,
}

impl std::ops::AddAssign for MeshStats {
    fn add_assign(&mut self, rhs: Self) {
        self.faces += rhs.faces;
        self.vertices += rhs.vertices;
        self.indices += rhs.indices;
    }
}

/// Combined vertex and index list for one chunk.
#[derive(Clone, Debug, Default)]
pub struct MeshBuffer {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
}

impl MeshBuffer {
    pub fn with_quad_capacity(n_quads: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(n_quads * 4),
            indices: Vec::with_capacity(n_quads * 6),
        }
    }

    #[inline]
    pub fn clear_keep_capacity(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }

    /// Doubles capacity when the next quad would not fit.
    #[inline]
    fn grow_for_quad(&mut self) {
        if self.vertices.len() + 4 > self.vertices.capacity() {
            let extra = self.vertices.capacity().max(4);
            self.vertices.reserve_exact(extra);
        }
        if self.indices.len() + 6 > self.indices.capacity() {
            let extra = self.indices.capacity().max(6);
            self.indices.reserve_exact(extra);
        }
    }

    /// Appends a quad given counter-clockwise vertices.
    pub fn push_quad(&mut self, quad: [Vertex; 4], flipped: bool) {
        self.grow_for_quad();
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&quad);
        let order = if flipped {
            &QUAD_INDICES_FLIPPED
        } else {
            &QUAD_INDICES_NORMAL
        };
        self.indices.extend(order.iter().map(|i| base + i));
    }

    #[inline]
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }
    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.vertices.len() / 4
    }
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn stats(&self) -> MeshStats {
        MeshStats {
            faces: self.quad_count(),
            vertices: self.vertices.len(),
            indices: self.indices.len(),
        }
    }

    /// Triangle normals, one per emitted triangle.
    pub fn triangle_normals(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.indices.chunks_exact(3).map(|t| {
            let a = self.vertices[t[0] as usize].position;
            let b = self.vertices[t[1] as usize].position;
            let c = self.vertices[t[2] as usize].position;
            (b - a).cross(c - a).normalized()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_doubles_on_overflow() {
        let mut m = MeshBuffer::with_quad_capacity(1);
        m.push_quad([Vertex::default(); 4], false);
        assert_eq!(m.vertices().len(), 4);
        m.push_quad([Vertex::default(); 4], true);
        assert!(m.vertices.capacity() >= 8);
        assert_eq!(m.indices()[6..], [5, 6, 7, 5, 7, 4]);
        assert_eq!(m.stats().faces, 2);
    }
}
