pub mod binding;
pub mod chunk;
pub mod compare;
pub mod dedup;
pub mod optimizer;
pub mod order;
pub mod rebuild;
pub mod remap;
pub mod split;
pub mod stats;
pub mod strip;
pub mod surface;
pub mod tangent;
pub mod unindex;

pub use binding::normalize_bindings;
pub use chunk::split_by_vertex_count;
pub use compare::VertexComparator;
pub use dedup::{Deduplicated, deduplicate};
pub use optimizer::{GeometryOptimizer, OptimizerConfig};
pub use order::{AccessOrder, CacheOrder, VertexOrder, VertexOrderOptimizer};
pub use rebuild::{RebuiltPrimitives, index_mesh, rebuild_primitives};
pub use remap::RemapTable;
pub use split::IndexSplitter;
pub use stats::{MeshStats, StatsCollector};
pub use strip::{StripOptions, strip_triangles};
pub use surface::{detach_wireframe, separate_surfaces};
pub use tangent::generate_tangent_space;
pub use unindex::to_draw_arrays;
