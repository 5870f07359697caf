pub mod arena;
pub mod array;
pub mod error;
pub mod mesh;
pub mod primitive;

pub use arena::{MeshArena, MeshId};
pub use array::{ArrayData, ArrayKind, Component, Element, INVALID_INDEX};
pub use error::{LumeError, LumeResult};
pub use mesh::{AttributeArraySet, Binding, Channel, Mesh, VertexAttribute};
pub use primitive::{IndexBuffer, IndexFormat, Indices, Mode, PrimitiveSet};
