use log::warn;
use lume_core::{INVALID_INDEX, Indices, Mesh, Mode};
use serde::{Deserialize, Serialize};

use super::remap::RemapTable;

/// A pass that reorders the vertices (and possibly the primitives) of a mesh
/// without changing what it draws.
pub trait VertexOrderOptimizer {
    fn optimize(&self, mesh: &mut Mesh);
}

/// Renumbers vertices in the order the primitives first reference them and
/// drops vertices nothing references. Primitive order is untouched.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccessOrder;

impl VertexOrderOptimizer for AccessOrder {
    fn optimize(&self, mesh: &mut Mesh) {
        let vertex_count = mesh.vertex_count();
        if let Some(index) = mesh
            .primitive_sets
            .iter()
            .filter_map(|s| s.max_index())
            .find(|&i| i as usize >= vertex_count)
        {
            warn!("mesh '{}': index {} out of range, vertex order left as is", mesh.name, index);
            return;
        }

        let mut map = vec![INVALID_INDEX; vertex_count];
        let mut next = 0u32;
        let mut reindexed = Vec::with_capacity(mesh.primitive_sets.len());
        for set in &mesh.primitive_sets {
            let indices: Vec<u32> = set
                .resolve()
                .into_iter()
                .map(|old| {
                    let slot = &mut map[old as usize];
                    if *slot == INVALID_INDEX {
                        *slot = next;
                        next += 1;
                    }
                    *slot
                })
                .collect();
            reindexed.push(indices);
        }

        let table = RemapTable::new(map, next as usize);
        if table.is_identity() && mesh.primitive_sets.iter().all(|s| s.is_indexed()) {
            return;
        }

        mesh.attributes = mesh.attributes.gather(&table.inverse());
        for (set, indices) in mesh.primitive_sets.iter_mut().zip(reindexed) {
            set.indices = Indices::Elements(indices);
        }
    }
}

/// Reorders triangles for post-transform cache efficiency, then applies
/// [`AccessOrder`].
#[derive(Clone, Copy, Debug, Default)]
pub struct CacheOrder;

impl VertexOrderOptimizer for CacheOrder {
    fn optimize(&self, mesh: &mut Mesh) {
        let vertex_count = mesh.vertex_count();
        for set in &mut mesh.primitive_sets {
            if set.mode != Mode::Triangles {
                continue;
            }
            let Indices::Elements(indices) = &mut set.indices else {
                continue;
            };
            if indices.len() % 3 != 0 || indices.iter().any(|&i| i as usize >= vertex_count) {
                continue;
            }
            *indices = meshopt::optimize_vertex_cache(indices.as_slice(), vertex_count);
        }
        AccessOrder.optimize(mesh);
    }
}

/// Selects the pass the splitter runs on each remainder mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VertexOrder {
    #[default]
    AccessOrder,
    CacheOrder,
}

impl VertexOrderOptimizer for VertexOrder {
    fn optimize(&self, mesh: &mut Mesh) {
        match self {
            VertexOrder::AccessOrder => AccessOrder.optimize(mesh),
            VertexOrder::CacheOrder => CacheOrder.optimize(mesh),
        }
    }
}
