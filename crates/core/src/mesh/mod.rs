use glam::Vec3;

use crate::{Result, VaseError};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half of the larger horizontal (x/z) extent.
    pub fn footprint_radius(&self) -> f32 {
        let size = self.size();
        size.x.max(size.z) * 0.5
    }
}

/// Vertex buffer with matching normals and an optional triangle index buffer.
///
/// Without indices the mesh is a triangle soup: every three consecutive
/// vertices form one triangle. Meshes are plain values; the operations below
/// return new meshes and leave `self` alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    indices: Option<Vec<[u32; 3]>>,
}

impl TriangleMesh {
    /// Builds an indexed mesh and derives area-weighted vertex normals.
    pub fn try_indexed(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Result<Self> {
        let vertex_count = positions.len();
        if indices.iter().flatten().any(|&i| i as usize >= vertex_count) {
            return Err(VaseError::InvalidInput(
                "triangle index out of range for the vertex buffer",
            ));
        }

        Ok(Self::indexed(positions, indices))
    }

    /// Infallible variant for index buffers built alongside their vertices.
    pub(crate) fn indexed(positions: Vec<Vec3>, indices: Vec<[u32; 3]>) -> Self {
        debug_assert!(indices
            .iter()
            .flatten()
            .all(|&i| (i as usize) < positions.len()));

        let mut mesh = Self {
            normals: Vec::new(),
            positions,
            indices: Some(indices),
        };
        mesh.normals = mesh.compute_vertex_normals();
        mesh
    }

    /// Builds a triangle soup from consecutive vertex triples. A trailing
    /// incomplete triple is dropped.
    pub fn flat(mut positions: Vec<Vec3>) -> Self {
        positions.truncate(positions.len() / 3 * 3);
        let mut mesh = Self {
            normals: Vec::new(),
            positions,
            indices: None,
        };
        mesh.normals = mesh.compute_vertex_normals();
        mesh
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    pub fn indices(&self) -> Option<&[[u32; 3]]> {
        self.indices.as_deref()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        match &self.indices {
            Some(indices) => indices.len(),
            None => self.positions.len() / 3,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Iterates triangles as vertex position triples, resolving the index
    /// buffer when there is one.
    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (0..self.triangle_count()).map(move |triangle| {
            let [a, b, c] = self.triangle_indices(triangle);
            [self.positions[a], self.positions[b], self.positions[c]]
        })
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.positions.first()?;
        let bounds = self.positions.iter().fold(
            Bounds {
                min: first,
                max: first,
            },
            |bounds, position| Bounds {
                min: bounds.min.min(*position),
                max: bounds.max.max(*position),
            },
        );
        Some(bounds)
    }

    /// Returns a copy moved by `offset`. Normals are unaffected.
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            positions: self.positions.iter().map(|p| *p + offset).collect(),
            ..self.clone()
        }
    }

    /// Returns a copy uniformly scaled about the origin. A positive factor
    /// keeps every normal direction, so normals are carried over.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            positions: self.positions.iter().map(|p| *p * factor).collect(),
            ..self.clone()
        }
    }

    /// Appends `other` after `self`, offsetting its indices by this mesh's
    /// vertex count. Two soups stay a soup; a soup mixed with an indexed
    /// mesh receives sequential indices.
    pub fn concat(&self, other: &TriangleMesh) -> TriangleMesh {
        let offset = self.vertex_count() as u32;

        let indices = match (&self.indices, &other.indices) {
            (None, None) => None,
            _ => {
                let mut merged = self.index_list();
                merged.extend(
                    other
                        .index_list()
                        .into_iter()
                        .map(|[a, b, c]| [a + offset, b + offset, c + offset]),
                );
                Some(merged)
            }
        };

        let mut positions = Vec::with_capacity(self.vertex_count() + other.vertex_count());
        positions.extend_from_slice(&self.positions);
        positions.extend_from_slice(&other.positions);

        let mut normals = Vec::with_capacity(positions.len());
        normals.extend_from_slice(&self.normals);
        normals.extend_from_slice(&other.normals);

        TriangleMesh {
            positions,
            normals,
            indices,
        }
    }

    fn triangle_indices(&self, triangle: usize) -> [usize; 3] {
        match &self.indices {
            Some(indices) => indices[triangle].map(|i| i as usize),
            None => {
                let base = triangle * 3;
                [base, base + 1, base + 2]
            }
        }
    }

    fn index_list(&self) -> Vec<[u32; 3]> {
        match &self.indices {
            Some(indices) => indices.clone(),
            None => (0..self.triangle_count() as u32)
                .map(|t| [t * 3, t * 3 + 1, t * 3 + 2])
                .collect(),
        }
    }

    /// Area-weighted accumulation of face normals per vertex. Vertices that
    /// only touch degenerate faces end up with a zero normal.
    fn compute_vertex_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for triangle in 0..self.triangle_count() {
            let [a, b, c] = self.triangle_indices(triangle);
            let face = face_normal_unnormalized(self.positions[a], self.positions[b], self.positions[c]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        normals.iter().map(|n| n.normalize_or_zero()).collect()
    }
}

/// Cross product of the two edges leaving `a`. Its length is twice the
/// triangle's area.
pub fn face_normal_unnormalized(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a)
}

/// Unit face normal, or zero for a degenerate triangle.
pub fn face_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    face_normal_unnormalized(a, b, c).normalize_or_zero()
}
