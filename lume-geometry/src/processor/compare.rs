use std::cmp::Ordering;

use lume_core::{ArrayData, AttributeArraySet};

/// Orders vertex indices by the values of every per-vertex array, compared
/// in channel order. Equal means the two vertices are exact duplicates.
pub struct VertexComparator<'a> {
    arrays: Vec<&'a ArrayData>,
}

impl<'a> VertexComparator<'a> {
    pub fn new(attributes: &'a AttributeArraySet) -> Self {
        Self {
            arrays: attributes.per_vertex().map(|(_, data)| data).collect(),
        }
    }

    pub fn compare(&self, lhs: u32, rhs: u32) -> Ordering {
        for array in &self.arrays {
            match array.compare(lhs as usize, rhs as usize) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    #[inline]
    pub fn equivalent(&self, lhs: u32, rhs: u32) -> bool {
        self.compare(lhs, rhs) == Ordering::Equal
    }
}
