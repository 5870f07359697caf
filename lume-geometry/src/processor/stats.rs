use std::collections::HashSet;
use std::fmt;
use std::ops::AddAssign;

use lume_core::{Mesh, MeshArena, MeshId, Mode};

use super::rebuild::for_each_triangle;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshStats {
    pub meshes: usize,
    pub triangles: usize,
    pub lines: usize,
    pub points: usize,
    pub vertices: usize,
}

impl MeshStats {
    /// Surface primitives count as the triangles they draw; degenerate
    /// triangles bridging merged strips are left out.
    pub fn of(mesh: &Mesh) -> Self {
        let mut stats = Self {
            meshes: 1,
            vertices: mesh.vertex_count(),
            ..Self::default()
        };
        for set in &mesh.primitive_sets {
            if set.mode.is_surface() {
                for_each_triangle(set.mode, &set.resolve(), |[a, b, c]| {
                    if a != b && b != c && a != c {
                        stats.triangles += 1;
                    }
                });
            } else if set.mode.is_line() {
                stats.lines += set.primitive_count();
            } else if set.mode == Mode::Points {
                stats.points += set.primitive_count();
            }
        }
        stats
    }
}

impl AddAssign for MeshStats {
    fn add_assign(&mut self, rhs: Self) {
        self.meshes += rhs.meshes;
        self.triangles += rhs.triangles;
        self.lines += rhs.lines;
        self.points += rhs.points;
        self.vertices += rhs.vertices;
    }
}

impl fmt::Display for MeshStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} meshes, {} triangles, {} lines, {} points, {} vertices",
            self.meshes, self.triangles, self.lines, self.points, self.vertices
        )
    }
}

/// Running totals over meshes, counting each [`MeshId`] once however often
/// it is visited.
#[derive(Debug, Default)]
pub struct StatsCollector {
    visited: HashSet<MeshId>,
    totals: MeshStats,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `mesh` to the totals. Returns false if `id` was already counted.
    pub fn visit(&mut self, id: MeshId, mesh: &Mesh) -> bool {
        if !self.visited.insert(id) {
            return false;
        }
        self.totals += MeshStats::of(mesh);
        true
    }

    pub fn visit_arena(&mut self, arena: &MeshArena) {
        for (id, mesh) in arena.iter() {
            self.visit(id, mesh);
        }
    }

    pub fn totals(&self) -> MeshStats {
        self.totals
    }
}
