//! Vertex attribute storage
//!
//! Geometry is stored the way a scene graph hands it over: a set of named
//! attributes, each a flat buffer with an item size (components per vertex)
//! and a storage type, plus an optional index buffer.

use std::collections::BTreeMap;

use glam::{Mat3, Mat4, Vec3};

use crate::error::AggregationError;

/// Name of the position attribute.
pub const POSITION: &str = "position";
/// Name of the normal attribute.
pub const NORMAL: &str = "normal";
/// Name of the texture coordinate attribute.
pub const UV: &str = "uv";

/// Component storage type of an attribute buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageKind {
    F32,
    U16,
    U8,
}

impl StorageKind {
    /// Width of a single component in bytes.
    pub fn width(self) -> usize {
        match self {
            StorageKind::F32 => 4,
            StorageKind::U16 => 2,
            StorageKind::U8 => 1,
        }
    }
}

/// Raw component buffer of an attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeData {
    F32(Vec<f32>),
    U16(Vec<u16>),
    U8(Vec<u8>),
}

impl AttributeData {
    /// Number of components (not vertices) in the buffer.
    pub fn len(&self) -> usize {
        match self {
            AttributeData::F32(v) => v.len(),
            AttributeData::U16(v) => v.len(),
            AttributeData::U8(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> StorageKind {
        match self {
            AttributeData::F32(_) => StorageKind::F32,
            AttributeData::U16(_) => StorageKind::U16,
            AttributeData::U8(_) => StorageKind::U8,
        }
    }

    /// Byte view of the buffer.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            AttributeData::F32(v) => bytemuck::cast_slice(v),
            AttributeData::U16(v) => bytemuck::cast_slice(v),
            AttributeData::U8(v) => v.as_slice(),
        }
    }

    fn empty_like(&self) -> AttributeData {
        match self {
            AttributeData::F32(_) => AttributeData::F32(Vec::new()),
            AttributeData::U16(_) => AttributeData::U16(Vec::new()),
            AttributeData::U8(_) => AttributeData::U8(Vec::new()),
        }
    }

    /// Append `other` to this buffer. Both must share a storage kind.
    fn extend_from(&mut self, other: &AttributeData) -> Result<(), AggregationError> {
        match (self, other) {
            (AttributeData::F32(a), AttributeData::F32(b)) => a.extend_from_slice(b),
            (AttributeData::U16(a), AttributeData::U16(b)) => a.extend_from_slice(b),
            (AttributeData::U8(a), AttributeData::U8(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(AggregationError::MergeFailed(format!(
                    "storage mismatch: {:?} vs {:?}",
                    a.kind(),
                    b.kind()
                )));
            }
        }
        Ok(())
    }

    /// Copy the items referenced by `indices` (item size `item_size`) into a new buffer.
    fn gather(&self, item_size: usize, indices: &[u32]) -> Option<AttributeData> {
        fn pick<T: Copy>(src: &[T], item_size: usize, indices: &[u32]) -> Option<Vec<T>> {
            let mut out = Vec::with_capacity(indices.len() * item_size);
            for &i in indices {
                let start = i as usize * item_size;
                out.extend_from_slice(src.get(start..start + item_size)?);
            }
            Some(out)
        }

        Some(match self {
            AttributeData::F32(v) => AttributeData::F32(pick(v, item_size, indices)?),
            AttributeData::U16(v) => AttributeData::U16(pick(v, item_size, indices)?),
            AttributeData::U8(v) => AttributeData::U8(pick(v, item_size, indices)?),
        })
    }
}

/// Shape of an attribute: what two meshes must agree on to be merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttributeLayout {
    pub item_size: usize,
    pub kind: StorageKind,
    pub normalized: bool,
}

/// A named per-vertex buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct VertexAttribute {
    /// Components per vertex (3 for positions, 2 for uvs, ...)
    pub item_size: usize,
    /// Integer data is interpreted as normalized [0, 1]
    pub normalized: bool,
    pub data: AttributeData,
}

impl VertexAttribute {
    pub fn f32(item_size: usize, data: Vec<f32>) -> Self {
        Self {
            item_size,
            normalized: false,
            data: AttributeData::F32(data),
        }
    }

    pub fn u16(item_size: usize, data: Vec<u16>, normalized: bool) -> Self {
        Self {
            item_size,
            normalized,
            data: AttributeData::U16(data),
        }
    }

    pub fn u8(item_size: usize, data: Vec<u8>, normalized: bool) -> Self {
        Self {
            item_size,
            normalized,
            data: AttributeData::U8(data),
        }
    }

    /// Number of vertices stored.
    pub fn count(&self) -> usize {
        if self.item_size == 0 {
            0
        } else {
            self.data.len() / self.item_size
        }
    }

    pub fn layout(&self) -> AttributeLayout {
        AttributeLayout {
            item_size: self.item_size,
            kind: self.data.kind(),
            normalized: self.normalized,
        }
    }

    /// Storage width of one component in bytes.
    pub fn storage_width(&self) -> usize {
        self.data.kind().width()
    }

    pub(crate) fn empty_like(&self) -> Self {
        Self {
            item_size: self.item_size,
            normalized: self.normalized,
            data: self.data.empty_like(),
        }
    }

    pub(crate) fn append(&mut self, other: &VertexAttribute) -> Result<(), AggregationError> {
        if self.layout() != other.layout() {
            return Err(AggregationError::MergeFailed(format!(
                "layout mismatch: {:?} vs {:?}",
                self.layout(),
                other.layout()
            )));
        }
        self.data.extend_from(&other.data)
    }

    fn as_vec3_slice_mut(&mut self) -> Option<&mut [[f32; 3]]> {
        match (&mut self.data, self.item_size) {
            (AttributeData::F32(v), 3) if v.len() % 3 == 0 => Some(bytemuck::cast_slice_mut(v)),
            _ => None,
        }
    }
}

/// Mesh geometry: named attributes plus an optional index buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    attributes: BTreeMap<String, VertexAttribute>,
    index: Option<Vec<u32>>,
}

impl Geometry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a non-indexed geometry from a flat `[x, y, z, ...]` position list.
    pub fn from_positions(positions: Vec<f32>) -> Self {
        Self::new().with_attribute(POSITION, VertexAttribute::f32(3, positions))
    }

    /// Build an indexed geometry from vertices and triangle indices.
    pub fn from_indexed(vertices: &[Vec3], indices: Vec<u32>) -> Self {
        let positions = vertices.iter().flat_map(|v| v.to_array()).collect();
        Self::from_positions(positions).with_index(indices)
    }

    pub fn with_attribute(mut self, name: &str, attribute: VertexAttribute) -> Self {
        self.set_attribute(name, attribute);
        self
    }

    pub fn with_index(mut self, index: Vec<u32>) -> Self {
        self.index = Some(index);
        self
    }

    pub fn set_attribute(&mut self, name: &str, attribute: VertexAttribute) {
        self.attributes.insert(name.to_string(), attribute);
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<VertexAttribute> {
        self.attributes.remove(name)
    }

    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &VertexAttribute)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.attributes.keys().map(String::as_str)
    }

    pub fn index(&self) -> Option<&[u32]> {
        self.index.as_deref()
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    /// Positions as `[x, y, z]` items, if the position attribute is a 3-component f32 buffer.
    pub fn positions(&self) -> Option<&[[f32; 3]]> {
        let attr = self.attributes.get(POSITION)?;
        match (&attr.data, attr.item_size) {
            (AttributeData::F32(v), 3) if v.len() % 3 == 0 => Some(bytemuck::cast_slice(v)),
            _ => None,
        }
    }

    /// Number of vertices (position count).
    pub fn vertex_count(&self) -> usize {
        self.positions().map_or(0, |p| p.len())
    }

    /// Number of triangles described by the index (or by the vertex list if not indexed).
    pub fn triangle_count(&self) -> usize {
        match &self.index {
            Some(index) => index.len() / 3,
            None => self.vertex_count() / 3,
        }
    }

    /// Expand an indexed geometry so every triangle owns its three vertices.
    ///
    /// Non-indexed geometry is returned unchanged. Fails if the index buffer
    /// references a vertex that does not exist in some attribute.
    pub fn to_non_indexed(&self) -> Result<Geometry, AggregationError> {
        let Some(index) = &self.index else {
            return Ok(self.clone());
        };

        let mut attributes = BTreeMap::new();
        for (name, attr) in &self.attributes {
            let data = attr.data.gather(attr.item_size, index).ok_or_else(|| {
                AggregationError::MergeFailed(format!("index out of range for attribute '{name}'"))
            })?;
            attributes.insert(
                name.clone(),
                VertexAttribute {
                    item_size: attr.item_size,
                    normalized: attr.normalized,
                    data,
                },
            );
        }

        Ok(Geometry {
            attributes,
            index: None,
        })
    }

    /// Bake a world transform into positions and normals.
    pub fn apply_matrix(&mut self, matrix: Mat4) {
        if let Some(positions) = self
            .attributes
            .get_mut(POSITION)
            .and_then(VertexAttribute::as_vec3_slice_mut)
        {
            for p in positions.iter_mut() {
                *p = matrix.transform_point3(Vec3::from_array(*p)).to_array();
            }
        }

        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        if let Some(normals) = self
            .attributes
            .get_mut(NORMAL)
            .and_then(VertexAttribute::as_vec3_slice_mut)
        {
            for n in normals.iter_mut() {
                *n = (normal_matrix * Vec3::from_array(*n))
                    .normalize_or_zero()
                    .to_array();
            }
        }
    }

    /// Compute flat per-face normals. Expects non-indexed geometry.
    pub fn compute_flat_normals(&mut self) {
        let Some(positions) = self.positions() else {
            return;
        };

        let mut normals = Vec::with_capacity(positions.len() * 3);
        for tri in positions.chunks_exact(3) {
            let a = Vec3::from_array(tri[0]);
            let b = Vec3::from_array(tri[1]);
            let c = Vec3::from_array(tri[2]);
            let n = (b - a).cross(c - a).normalize_or_zero();
            for _ in 0..3 {
                normals.extend_from_slice(&n.to_array());
            }
        }
        // Trailing vertices that do not form a full triangle
        normals.resize(positions.len() * 3, 0.0);

        self.set_attribute(NORMAL, VertexAttribute::f32(3, normals));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> Geometry {
        Geometry::from_indexed(
            &[
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(0.0, 0.0, 1.0),
            ],
            vec![0, 2, 1, 0, 3, 2],
        )
    }

    #[test]
    fn test_storage_width() {
        assert_eq!(VertexAttribute::f32(3, vec![]).storage_width(), 4);
        assert_eq!(VertexAttribute::u16(2, vec![], true).storage_width(), 2);
        assert_eq!(VertexAttribute::u8(4, vec![], true).storage_width(), 1);
    }

    #[test]
    fn test_as_bytes_length() {
        let attr = VertexAttribute::f32(3, vec![1.0; 6]);
        assert_eq!(attr.data.as_bytes().len(), 24);
    }

    #[test]
    fn test_to_non_indexed_expands_triangles() {
        let geometry = quad().to_non_indexed().unwrap();
        assert!(!geometry.is_indexed());
        assert_eq!(geometry.vertex_count(), 6);
        assert_eq!(geometry.triangle_count(), 2);
        let p = geometry.positions().unwrap();
        assert_eq!(p[1], [1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_to_non_indexed_rejects_bad_index() {
        let geometry = Geometry::from_indexed(&[Vec3::ZERO, Vec3::X, Vec3::Z], vec![0, 1, 7]);
        assert!(geometry.to_non_indexed().is_err());
    }

    #[test]
    fn test_flat_normals_point_up_for_ccw_floor() {
        let mut geometry = quad().to_non_indexed().unwrap();
        geometry.compute_flat_normals();
        let normal = geometry.attribute(NORMAL).unwrap();
        assert_eq!(normal.count(), 6);
        match &normal.data {
            AttributeData::F32(v) => {
                assert!((v[1] - 1.0).abs() < 1e-6, "normal y was {}", v[1]);
            }
            _ => panic!("normals should be f32"),
        }
    }

    #[test]
    fn test_apply_matrix_moves_positions_and_rotates_normals() {
        let mut geometry = quad().to_non_indexed().unwrap();
        geometry.compute_flat_normals();
        let matrix = Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0))
            * Mat4::from_rotation_x(std::f32::consts::FRAC_PI_2);
        geometry.apply_matrix(matrix);

        let p = geometry.positions().unwrap();
        assert!((p[0][1] - 5.0).abs() < 1e-5);

        match &geometry.attribute(NORMAL).unwrap().data {
            AttributeData::F32(v) => {
                // +Y rotated 90 degrees about X points along +Z
                assert!((v[2] - 1.0).abs() < 1e-5);
            }
            _ => panic!("normals should be f32"),
        }
    }
}
