use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::array::ArrayData;
use crate::primitive::PrimitiveSet;
use crate::{LumeError, LumeResult};

/// Attribute slot of a mesh. The derived ordering is the canonical channel
/// order used whenever vertices are compared.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Channel {
    Position,
    Normal,
    Color,
    SecondaryColor,
    FogCoord,
    TexCoord(u32),
    VertexAttrib(u32),
    Tangent,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Position => write!(f, "position"),
            Channel::Normal => write!(f, "normal"),
            Channel::Color => write!(f, "color"),
            Channel::SecondaryColor => write!(f, "secondary color"),
            Channel::FogCoord => write!(f, "fog coord"),
            Channel::TexCoord(unit) => write!(f, "texcoord {}", unit),
            Channel::VertexAttrib(index) => write!(f, "vertex attrib {}", index),
            Channel::Tangent => write!(f, "tangent"),
        }
    }
}

/// How an attribute array maps onto the mesh.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Binding {
    Off,
    #[default]
    PerVertex,
    PerPrimitive,
    PerPrimitiveSet,
    Overall,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexAttribute {
    pub binding: Binding,
    pub data: ArrayData,
}

impl VertexAttribute {
    pub fn per_vertex(data: ArrayData) -> Self {
        Self {
            binding: Binding::PerVertex,
            data,
        }
    }
}

/// The attribute arrays of a mesh, iterated in [`Channel`] order.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AttributeArraySet {
    arrays: BTreeMap<Channel, VertexAttribute>,
}

impl AttributeArraySet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, channel: Channel, attribute: VertexAttribute) -> Option<VertexAttribute> {
        self.arrays.insert(channel, attribute)
    }

    pub fn remove(&mut self, channel: Channel) -> Option<VertexAttribute> {
        self.arrays.remove(&channel)
    }

    pub fn get(&self, channel: Channel) -> Option<&VertexAttribute> {
        self.arrays.get(&channel)
    }

    pub fn get_mut(&mut self, channel: Channel) -> Option<&mut VertexAttribute> {
        self.arrays.get_mut(&channel)
    }

    pub fn positions(&self) -> Option<&ArrayData> {
        self.get(Channel::Position).map(|a| &a.data)
    }

    pub fn len(&self) -> usize {
        self.arrays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrays.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Channel, &VertexAttribute)> {
        self.arrays.iter().map(|(c, a)| (*c, a))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Channel, &mut VertexAttribute)> {
        self.arrays.iter_mut().map(|(c, a)| (*c, a))
    }

    /// Arrays bound per vertex, in canonical order.
    pub fn per_vertex(&self) -> impl Iterator<Item = (Channel, &ArrayData)> {
        self.iter()
            .filter(|(_, a)| a.binding == Binding::PerVertex)
            .map(|(c, a)| (c, &a.data))
    }

    pub fn per_vertex_mut(&mut self) -> impl Iterator<Item = (Channel, &mut ArrayData)> {
        self.iter_mut()
            .filter(|(_, a)| a.binding == Binding::PerVertex)
            .map(|(c, a)| (c, &mut a.data))
    }

    pub fn has_binding(&self, binding: Binding) -> bool {
        self.arrays.values().any(|a| a.binding == binding)
    }

    /// Arrays of the same kinds and bindings with no elements in the
    /// per-vertex ones. Other bindings keep their data.
    pub fn empty_like(&self) -> Self {
        let arrays = self
            .arrays
            .iter()
            .map(|(channel, attribute)| {
                let data = if attribute.binding == Binding::PerVertex {
                    attribute.data.empty_like()
                } else {
                    attribute.data.clone()
                };
                (*channel, VertexAttribute { binding: attribute.binding, data })
            })
            .collect();
        Self { arrays }
    }

    /// Copy of these arrays where every per-vertex array holds
    /// `self[i]` for each `i` in `indices`.
    pub fn gather(&self, indices: &[u32]) -> Self {
        let arrays = self
            .arrays
            .iter()
            .map(|(channel, attribute)| {
                let data = if attribute.binding == Binding::PerVertex {
                    attribute.data.gather(indices)
                } else {
                    attribute.data.clone()
                };
                (*channel, VertexAttribute { binding: attribute.binding, data })
            })
            .collect();
        Self { arrays }
    }

    pub fn truncate(&mut self, len: usize) {
        for (_, data) in self.per_vertex_mut() {
            data.truncate(len);
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub name: String,
    pub attributes: AttributeArraySet,
    pub primitive_sets: Vec<PrimitiveSet>,
}

impl Mesh {
    pub fn new(positions: ArrayData) -> Self {
        let mut attributes = AttributeArraySet::new();
        attributes.insert(Channel::Position, VertexAttribute::per_vertex(positions));
        Self {
            name: String::new(),
            attributes,
            primitive_sets: Vec::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_attribute(mut self, channel: Channel, binding: Binding, data: ArrayData) -> Self {
        self.attributes.insert(channel, VertexAttribute { binding, data });
        self
    }

    pub fn with_primitive_set(mut self, set: PrimitiveSet) -> Self {
        self.primitive_sets.push(set);
        self
    }

    /// Number of logical vertices, taken from the position array.
    pub fn vertex_count(&self) -> usize {
        self.attributes.positions().map_or(0, |p| p.len())
    }

    pub fn primitive_count(&self) -> usize {
        self.primitive_sets.iter().map(|s| s.primitive_count()).sum()
    }

    pub fn triangle_index_count(&self) -> usize {
        self.primitive_sets
            .iter()
            .filter(|s| s.mode == crate::primitive::Mode::Triangles)
            .map(|s| s.index_count())
            .sum()
    }

    /// Checks the element count of every array against its binding.
    pub fn validate(&self) -> LumeResult<()> {
        let position = self
            .attributes
            .get(Channel::Position)
            .ok_or(LumeError::MissingPositions)?;
        if position.binding != Binding::PerVertex {
            return Err(LumeError::InvalidPositionBinding(position.binding));
        }

        let vertex_count = self.vertex_count();
        for (channel, attribute) in self.attributes.iter() {
            let expected = match attribute.binding {
                Binding::Off => continue,
                Binding::PerVertex => vertex_count,
                Binding::Overall => 1,
                Binding::PerPrimitiveSet => self.primitive_sets.len(),
                Binding::PerPrimitive => self.primitive_count(),
            };
            let actual = attribute.data.len();
            let too_short = actual < expected;
            let wrong_per_vertex = attribute.binding == Binding::PerVertex && actual != expected;
            if too_short || wrong_per_vertex {
                return Err(LumeError::AttributeLengthMismatch {
                    channel,
                    binding: attribute.binding,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}
