use log::{debug, warn};
use lume_core::{LumeError, LumeResult, Mesh};
use serde::{Deserialize, Serialize};

use super::binding::normalize_bindings;
use super::order::{AccessOrder, VertexOrder, VertexOrderOptimizer};
use super::rebuild::index_mesh;
use super::split::IndexSplitter;
use super::strip::{StripOptions, strip_triangles};
use super::surface::{detach_wireframe, separate_surfaces};
use super::tangent::generate_tangent_space;
use super::unindex::to_draw_arrays;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// Largest vertex index an output mesh may reference.
    pub max_index_value: u32,
    /// Rebuild surfaces as deduplicated edge lists.
    pub wireframe: bool,
    /// Emit non-indexed meshes. No index bound applies, so nothing is split.
    pub use_draw_array: bool,
    pub vertex_order: VertexOrder,
    /// Add MikkTSpace tangents after indexing.
    pub generate_tangent_space: bool,
    /// Texture unit whose coordinates drive the tangents.
    pub tangent_space_unit: u32,
    /// Convert triangle lists to strips after splitting.
    pub tri_strip: bool,
    pub strip_options: StripOptions,
    /// Move wireframe sets into meshes of their own.
    pub detach_wireframe: bool,
    /// Expand every output to draw arrays at the very end. Unlike
    /// `use_draw_array`, splitting still happens.
    pub disable_index: bool,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            max_index_value: 65535,
            wireframe: false,
            use_draw_array: false,
            vertex_order: VertexOrder::AccessOrder,
            generate_tangent_space: false,
            tangent_space_unit: 0,
            tri_strip: false,
            strip_options: StripOptions::default(),
            detach_wireframe: false,
            disable_index: false,
        }
    }
}

/// Runs the full pipeline on one mesh: binding normalization, vertex
/// deduplication and primitive rebuilding, optional tangents, then either
/// index splitting or draw-array conversion, optional strips, and finally
/// wireframe detachment and unindexing when asked for.
#[derive(Clone, Debug, Default)]
pub struct GeometryOptimizer {
    config: OptimizerConfig,
}

impl GeometryOptimizer {
    pub fn new(config: OptimizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OptimizerConfig {
        &self.config
    }

    pub fn optimize(&self, mesh: &Mesh) -> LumeResult<Vec<Mesh>> {
        let normalized = normalize_bindings(mesh)?;
        let mut indexed = index_mesh(&normalized, self.config.wireframe)?;
        debug!(
            "mesh '{}': {} -> {} vertices after indexing",
            mesh.name,
            mesh.vertex_count(),
            indexed.vertex_count()
        );

        if self.config.generate_tangent_space {
            indexed = generate_tangent_space(&indexed, self.config.tangent_space_unit)?;
        }

        let mut outputs = if self.config.use_draw_array {
            vec![indexed]
        } else {
            self.split(indexed)?
        };

        if self.config.tri_strip {
            outputs = outputs
                .iter()
                .map(|m| strip_triangles(m, &self.config.strip_options))
                .collect::<LumeResult<_>>()?;
        }
        if self.config.use_draw_array {
            outputs = outputs.iter().map(to_draw_arrays).collect::<LumeResult<_>>()?;
        }
        if self.config.detach_wireframe {
            outputs = outputs
                .iter()
                .flat_map(|m| {
                    let (rest, wireframe) = detach_wireframe(m);
                    rest.into_iter().chain(wireframe)
                })
                .collect();
        }
        if self.config.disable_index && !self.config.use_draw_array {
            outputs = outputs.iter().map(to_draw_arrays).collect::<LumeResult<_>>()?;
        }
        Ok(outputs)
    }

    /// Splits the mesh to the index bound. When lines or points keep the
    /// splitter from running, only the surfaces are split and the rest is
    /// compacted into a mesh of its own.
    fn split(&self, mesh: Mesh) -> LumeResult<Vec<Mesh>> {
        let splitter = IndexSplitter::new(self.config.max_index_value).with_order(self.config.vertex_order);
        let reason = match splitter.split(&mesh) {
            Err(LumeError::UnsplittableMesh { reason }) => reason,
            result => return result,
        };
        if !self.exceeds_bound(&mesh) {
            return Ok(vec![mesh]);
        }

        let (surfaces, others) = separate_surfaces(&mesh);
        let mut outputs = match surfaces {
            Some(surfaces) => match splitter.split(&surfaces) {
                Err(LumeError::UnsplittableMesh { reason }) => {
                    warn!("skipping split: {}", reason);
                    return Ok(vec![mesh]);
                }
                result => result?,
            },
            None => Vec::new(),
        };
        if let Some(mut others) = others {
            AccessOrder.optimize(&mut others);
            if self.exceeds_bound(&others) {
                warn!("{}; its lines and points stay above index {}", reason, self.config.max_index_value);
            }
            outputs.push(others);
        }
        Ok(outputs)
    }

    fn exceeds_bound(&self, mesh: &Mesh) -> bool {
        mesh.primitive_sets
            .iter()
            .filter_map(|s| s.max_index())
            .any(|i| i > self.config.max_index_value)
    }
}
