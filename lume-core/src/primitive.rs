use serde::{Deserialize, Serialize};

/// Draw mode of a primitive set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    Points,
    Lines,
    LineStrip,
    LineLoop,
    Triangles,
    TriangleStrip,
    TriangleFan,
    Quads,
    QuadStrip,
    Polygon,
}

impl Mode {
    /// Modes that rasterize filled polygons.
    pub fn is_surface(self) -> bool {
        matches!(
            self,
            Mode::Triangles
                | Mode::TriangleStrip
                | Mode::TriangleFan
                | Mode::Quads
                | Mode::QuadStrip
                | Mode::Polygon
        )
    }

    pub fn is_line(self) -> bool {
        matches!(self, Mode::Lines | Mode::LineStrip | Mode::LineLoop)
    }

    /// Number of primitives drawn from `count` index references.
    /// A polygon counts as a single primitive.
    pub fn primitive_count(self, count: usize) -> usize {
        match self {
            Mode::Points => count,
            Mode::Lines => count / 2,
            Mode::LineStrip => count.saturating_sub(1),
            Mode::LineLoop => {
                if count >= 2 {
                    count
                } else {
                    0
                }
            }
            Mode::Triangles => count / 3,
            Mode::TriangleStrip | Mode::TriangleFan => count.saturating_sub(2),
            Mode::Quads => count / 4,
            Mode::QuadStrip => count.saturating_sub(2) / 2,
            Mode::Polygon => usize::from(count >= 3),
        }
    }
}

/// Where a primitive set takes its vertex indices from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Indices {
    /// Consecutive vertices `first..first + count`.
    Array { first: u32, count: u32 },
    Elements(Vec<u32>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimitiveSet {
    pub mode: Mode,
    pub indices: Indices,
    /// Marks line sets extracted as wireframe, and surface sets that should
    /// be rebuilt as wireframe.
    pub wireframe: bool,
}

fn last_array_index(first: u32, count: u32) -> u32 {
    first.saturating_add(count.saturating_sub(1))
}

impl PrimitiveSet {
    pub fn draw_arrays(mode: Mode, first: u32, count: u32) -> Self {
        Self {
            mode,
            indices: Indices::Array { first, count },
            wireframe: false,
        }
    }

    pub fn draw_elements(mode: Mode, indices: Vec<u32>) -> Self {
        Self {
            mode,
            indices: Indices::Elements(indices),
            wireframe: false,
        }
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn is_indexed(&self) -> bool {
        matches!(self.indices, Indices::Elements(_))
    }

    pub fn index_count(&self) -> usize {
        match &self.indices {
            Indices::Array { count, .. } => *count as usize,
            Indices::Elements(indices) => indices.len(),
        }
    }

    /// Vertex index of the `i`-th reference. Draw-array references past
    /// `u32::MAX` saturate.
    pub fn index(&self, i: usize) -> u32 {
        match &self.indices {
            Indices::Array { first, .. } => first.saturating_add(u32::try_from(i).unwrap_or(u32::MAX)),
            Indices::Elements(indices) => indices[i],
        }
    }

    /// Resolves the set to an explicit list of vertex references. A draw-array
    /// range running past `u32::MAX` stops at the last representable index.
    pub fn resolve(&self) -> Vec<u32> {
        match &self.indices {
            Indices::Array { first, count } => (*first..=last_array_index(*first, *count)).take(*count as usize).collect(),
            Indices::Elements(indices) => indices.clone(),
        }
    }

    pub fn elements(&self) -> Option<&[u32]> {
        match &self.indices {
            Indices::Elements(indices) => Some(indices),
            Indices::Array { .. } => None,
        }
    }

    pub fn primitive_count(&self) -> usize {
        self.mode.primitive_count(self.index_count())
    }

    pub fn max_index(&self) -> Option<u32> {
        match &self.indices {
            Indices::Array { first, count } => count.checked_sub(1).map(|_| last_array_index(*first, *count)),
            Indices::Elements(indices) => indices.iter().copied().max(),
        }
    }

    /// Encodes the indices of an indexed set at the narrowest width that
    /// holds them.
    pub fn index_buffer(&self) -> Option<IndexBuffer> {
        self.elements().map(IndexBuffer::from_indices)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IndexFormat {
    U16,
    U32,
}

/// Index storage as handed to a writer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IndexBuffer {
    U16(Vec<u16>),
    U32(Vec<u32>),
}

impl IndexBuffer {
    pub fn from_indices(indices: &[u32]) -> Self {
        let fits_u16 = indices.iter().all(|&i| i <= u16::MAX as u32);
        if fits_u16 {
            IndexBuffer::U16(indices.iter().map(|&i| i as u16).collect())
        } else {
            IndexBuffer::U32(indices.to_vec())
        }
    }

    pub fn format(&self) -> IndexFormat {
        match self {
            IndexBuffer::U16(_) => IndexFormat::U16,
            IndexBuffer::U32(_) => IndexFormat::U32,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            IndexBuffer::U16(v) => v.len(),
            IndexBuffer::U32(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            IndexBuffer::U16(v) => bytemuck::cast_slice(v),
            IndexBuffer::U32(v) => bytemuck::cast_slice(v),
        }
    }
}
