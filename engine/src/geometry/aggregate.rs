//! Static mesh aggregation
//!
//! Merges every static scene mesh into one non-indexed, world-space buffer the
//! collider can index. Meshes without positions are skipped and attributes
//! the meshes do not agree on are dropped; both are logged, neither is fatal.

use std::collections::{BTreeMap, BTreeSet};

use log::{debug, warn};

use super::attributes::{AttributeLayout, Geometry, NORMAL, POSITION, UV, VertexAttribute};
use crate::error::AggregationError;
use crate::scene::{MeshRole, SceneMesh};

/// Merge the static meshes among `meshes` into a single world-space geometry.
pub fn merge_static_meshes<'a, I>(meshes: I) -> Result<Geometry, AggregationError>
where
    I: IntoIterator<Item = &'a SceneMesh>,
{
    let mut prepared = Vec::new();

    for mesh in meshes {
        if mesh.role == MeshRole::Player {
            continue;
        }
        if mesh.geometry.positions().is_none() {
            warn!("Skipping mesh '{}': no usable position attribute", mesh.name);
            continue;
        }

        let mut geometry = match mesh.geometry.to_non_indexed() {
            Ok(geometry) => geometry,
            Err(err) => {
                warn!("Skipping mesh '{}': {}", mesh.name, err);
                continue;
            }
        };
        geometry.apply_matrix(mesh.world_transform);

        if geometry.attribute(NORMAL).is_none() {
            geometry.compute_flat_normals();
        }
        if geometry.attribute(UV).is_none() {
            let count = geometry.vertex_count();
            geometry.set_attribute(UV, VertexAttribute::f32(2, vec![0.0; count * 2]));
        }

        prepared.push((mesh.name.as_str(), geometry));
    }

    if prepared.is_empty() {
        return Err(AggregationError::NoMeshes);
    }

    drop_incompatible_attributes(&mut prepared);

    let mut iter = prepared.into_iter();
    let Some((_, first)) = iter.next() else {
        return Err(AggregationError::NoMeshes);
    };

    let mut merged = Geometry::new();
    for (name, attr) in first.attributes() {
        let mut combined = attr.empty_like();
        combined.append(attr)?;
        merged.set_attribute(name, combined);
    }

    for (mesh_name, geometry) in iter {
        for (name, attr) in geometry.attributes() {
            let mut target = merged.remove_attribute(name).ok_or_else(|| {
                AggregationError::MergeFailed(format!(
                    "attribute '{name}' of mesh '{mesh_name}' has no counterpart"
                ))
            })?;
            target.append(attr)?;
            merged.set_attribute(name, target);
        }
    }

    let vertex_count = merged.vertex_count();
    for (name, attr) in merged.attributes() {
        if attr.count() != vertex_count {
            return Err(AggregationError::MergeFailed(format!(
                "attribute '{name}' has {} items, expected {vertex_count}",
                attr.count()
            )));
        }
    }

    debug!(
        "Merged static geometry: {} triangles, attributes [{}]",
        merged.triangle_count(),
        merged.attribute_names().collect::<Vec<_>>().join(", ")
    );

    Ok(merged)
}

/// Remove every attribute that is missing on some mesh or whose layout differs.
fn drop_incompatible_attributes(prepared: &mut [(&str, Geometry)]) {
    let mut layouts: BTreeMap<String, BTreeSet<Option<AttributeLayout>>> = BTreeMap::new();
    let all_names: BTreeSet<String> = prepared
        .iter()
        .flat_map(|(_, g)| g.attribute_names().map(str::to_string))
        .collect();

    for name in &all_names {
        let seen = layouts.entry(name.clone()).or_default();
        for (_, geometry) in prepared.iter() {
            seen.insert(geometry.attribute(name).map(VertexAttribute::layout));
        }
    }

    for (name, seen) in layouts {
        if name == POSITION || seen.len() == 1 && !seen.contains(&None) {
            continue;
        }
        warn!(
            "Dropping attribute '{}': not present with the same layout on every mesh",
            name
        );
        for (_, geometry) in prepared.iter_mut() {
            geometry.remove_attribute(&name);
        }
    }
}
