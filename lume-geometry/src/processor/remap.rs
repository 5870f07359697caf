use lume_core::INVALID_INDEX;

/// Maps old vertex indices to new ones. Entries set to [`INVALID_INDEX`]
/// mark vertices that have no counterpart after the remap.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemapTable {
    map: Vec<u32>,
    target_count: usize,
}

impl RemapTable {
    pub fn new(map: Vec<u32>, target_count: usize) -> Self {
        debug_assert!(map.iter().all(|&i| i == INVALID_INDEX || (i as usize) < target_count));
        Self { map, target_count }
    }

    pub fn identity(count: usize) -> Self {
        Self {
            map: (0..count as u32).collect(),
            target_count: count,
        }
    }

    /// New index of `old`, or `None` when it was dropped or never existed.
    #[inline]
    pub fn get(&self, old: u32) -> Option<u32> {
        match self.map.get(old as usize) {
            Some(&new) if new != INVALID_INDEX => Some(new),
            _ => None,
        }
    }

    /// Number of old indices covered.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Number of distinct new indices.
    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.map
    }

    pub fn is_identity(&self) -> bool {
        self.target_count == self.map.len()
            && self.map.iter().enumerate().all(|(old, &new)| old as u32 == new)
    }

    /// For every new index, the lowest old index mapped onto it.
    pub fn inverse(&self) -> Vec<u32> {
        let mut inverse = vec![INVALID_INDEX; self.target_count];
        for (old, &new) in self.map.iter().enumerate() {
            if new != INVALID_INDEX && inverse[new as usize] == INVALID_INDEX {
                inverse[new as usize] = old as u32;
            }
        }
        inverse
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverse_picks_lowest_old_index() {
        let table = RemapTable::new(vec![0, 1, 0, INVALID_INDEX, 1], 2);
        assert_eq!(table.inverse(), vec![0, 1]);
        assert_eq!(table.get(3), None);
        assert_eq!(table.get(9), None);
        assert_eq!(table.get(4), Some(1));
        assert!(!table.is_identity());
    }

    #[test]
    fn identity() {
        assert!(RemapTable::identity(4).is_identity());
    }
}
