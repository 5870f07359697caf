use log::{debug, info};
use lume_core::{LumeError, LumeResult, Mesh, Mode, PrimitiveSet};

use super::order::{VertexOrder, VertexOrderOptimizer};

/// Splits indexed triangle meshes so that no output references a vertex
/// index above `max_index`.
///
/// Each pass keeps the triangles whose indices all fit, truncates the vertex
/// arrays to the bound, and hands the remaining triangles to a fresh copy of
/// the full arrays. That copy is reordered with the configured
/// [`VertexOrder`] before the next pass. Vertices shared across a boundary are
/// duplicated into every output that needs them.
#[derive(Clone, Copy, Debug)]
pub struct IndexSplitter {
    max_index: u32,
    order: VertexOrder,
}

impl IndexSplitter {
    pub fn new(max_index: u32) -> Self {
        Self {
            max_index,
            order: VertexOrder::default(),
        }
    }

    pub fn with_order(mut self, order: VertexOrder) -> Self {
        self.order = order;
        self
    }

    pub fn max_index(&self) -> u32 {
        self.max_index
    }

    /// Returns the split meshes in pass order. A mesh already within the
    /// bound comes back as its only element; a pass that keeps no triangles
    /// produces no mesh.
    ///
    /// Fails with [`LumeError::UnsplittableMesh`] when a set is not an
    /// indexed triangle list; callers may treat that as "leave unsplit".
    pub fn split(&self, mesh: &Mesh) -> LumeResult<Vec<Mesh>> {
        self.split_with(mesh, &self.order)
    }

    /// Like [`split`](Self::split), reordering each remainder with `order`
    /// instead of the configured [`VertexOrder`].
    ///
    /// An order that leaves a remainder's first triangle above the bound
    /// makes no progress and fails with [`LumeError::SplitDidNotConverge`].
    pub fn split_with<O: VertexOrderOptimizer>(&self, mesh: &Mesh, order: &O) -> LumeResult<Vec<Mesh>> {
        if self.max_index < 2 {
            return Err(LumeError::InvalidIndexBound(self.max_index));
        }
        mesh.validate()?;
        let vertex_count = mesh.vertex_count();
        for set in &mesh.primitive_sets {
            let Some(indices) = set.elements() else {
                return Err(LumeError::UnsplittableMesh {
                    reason: format!("mesh '{}' contains non indexed {:?} primitives", mesh.name, set.mode),
                });
            };
            if set.mode != Mode::Triangles {
                return Err(LumeError::UnsplittableMesh {
                    reason: format!("mesh '{}' contains {:?} primitives", mesh.name, set.mode),
                });
            }
            if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(LumeError::IndexOutOfRange { index, vertex_count });
            }
        }
        if !self.needs_split(mesh) {
            debug!("mesh '{}' fits index bound {}", mesh.name, self.max_index);
            return Ok(vec![mesh.clone()]);
        }

        let max_passes = mesh.triangle_index_count() / 3 + 1;
        let mut outputs = Vec::new();
        let mut processing = mesh.clone();

        for pass in 0..max_passes {
            let (kept, reported) = self.partition(&processing.primitive_sets);
            // A reordered remainder starts at index 0, so only the first pass
            // may keep nothing.
            if kept.is_empty() && pass > 0 {
                return Err(LumeError::SplitDidNotConverge { iterations: pass + 1 });
            }

            let remainder = if reported.is_empty() {
                None
            } else {
                let mut next = Mesh {
                    name: processing.name.clone(),
                    attributes: processing.attributes.clone(),
                    primitive_sets: vec![PrimitiveSet::draw_elements(Mode::Triangles, reported)],
                };
                order.optimize(&mut next);
                Some(next)
            };

            if !kept.is_empty() {
                let limit = processing.vertex_count().min(self.max_index as usize + 1);
                processing.primitive_sets = kept;
                processing.attributes.truncate(limit);
                outputs.push(processing);
            }

            match remainder {
                Some(next) => processing = next,
                None => {
                    info!(
                        "mesh '{}' ({} vertices) has indices above {}, split into {} meshes",
                        mesh.name,
                        mesh.vertex_count(),
                        self.max_index,
                        outputs.len()
                    );
                    return Ok(outputs);
                }
            }
        }

        Err(LumeError::SplitDidNotConverge { iterations: max_passes })
    }

    fn needs_split(&self, mesh: &Mesh) -> bool {
        mesh.primitive_sets
            .iter()
            .filter_map(|s| s.max_index())
            .any(|i| i > self.max_index)
    }

    /// Splits triangles into the sets that fit the bound, in their original
    /// sets, and one merged list of triangles that don't.
    fn partition(&self, sets: &[PrimitiveSet]) -> (Vec<PrimitiveSet>, Vec<u32>) {
        let mut kept_sets = Vec::with_capacity(sets.len());
        let mut reported = Vec::new();
        for set in sets {
            let Some(indices) = set.elements() else {
                continue;
            };
            let mut kept = Vec::with_capacity(indices.len());
            for triangle in indices.chunks_exact(3) {
                if triangle.iter().any(|&i| i > self.max_index) {
                    reported.extend_from_slice(triangle);
                } else {
                    kept.extend_from_slice(triangle);
                }
            }
            if !kept.is_empty() {
                kept_sets.push(PrimitiveSet::draw_elements(Mode::Triangles, kept));
            }
        }
        (kept_sets, reported)
    }
}
