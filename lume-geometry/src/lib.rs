//! Mesh indexing and index-bound splitting.
//!
//! Meshes go through [`GeometryOptimizer`]: bindings are normalized to per
//! vertex, exact duplicate vertices are merged, primitives are rebuilt as
//! indexed triangle, line and point lists, and meshes referencing indices
//! above the configured bound are split. Tangent generation, triangle
//! strips, wireframe detachment and unindexing are optional stages.

pub mod processor;

pub use processor::*;
