use serde::{Deserialize, Serialize};

use crate::mesh::Mesh;

/// Stable handle to a mesh owned by a [`MeshArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MeshId(u32);

impl MeshId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Central store for the meshes of a scene. Handles stay valid for the
/// lifetime of the arena; meshes are replaced in place, never removed.
#[derive(Clone, Debug, Default)]
pub struct MeshArena {
    meshes: Vec<Mesh>,
}

impl MeshArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.meshes.len() as u32);
        self.meshes.push(mesh);
        id
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id.index())
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(id.index())
    }

    /// Swaps in a new mesh and returns the previous one.
    pub fn replace(&mut self, id: MeshId, mesh: Mesh) -> Option<Mesh> {
        self.meshes
            .get_mut(id.index())
            .map(|slot| std::mem::replace(slot, mesh))
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeshId, &Mesh)> {
        self.meshes
            .iter()
            .enumerate()
            .map(|(i, mesh)| (MeshId(i as u32), mesh))
    }

    pub fn into_meshes(self) -> Vec<Mesh> {
        self.meshes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::ArrayData;

    #[test]
    fn handles_are_stable() {
        let mut arena = MeshArena::new();
        let a = arena.insert(Mesh::new(ArrayData::Vec3(Vec::new())).with_name("a"));
        let b = arena.insert(Mesh::new(ArrayData::Vec3(Vec::new())).with_name("b"));
        assert_ne!(a, b);

        let old = arena.replace(a, Mesh::default().with_name("c"));
        assert_eq!(old.map(|m| m.name), Some("a".to_string()));
        assert_eq!(arena.get(a).map(|m| m.name.as_str()), Some("c"));
        assert_eq!(arena.get(b).map(|m| m.name.as_str()), Some("b"));
        assert_eq!(arena.len(), 2);
    }
}
