use std::collections::HashSet;

use log::{debug, warn};
use lume_core::{LumeResult, Mesh, Mode, PrimitiveSet};

use super::dedup::deduplicate;
use super::remap::RemapTable;

/// Merged index lists produced from a mesh's primitive sets.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RebuiltPrimitives {
    pub triangles: Vec<u32>,
    pub lines: Vec<u32>,
    /// Undirected edges extracted from surfaces, each listed once.
    pub wireframe: Vec<u32>,
    pub points: Vec<u32>,
}

impl RebuiltPrimitives {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty() && self.lines.is_empty() && self.wireframe.is_empty() && self.points.is_empty()
    }

    /// Non-empty lists as indexed sets: triangles, lines, wireframe lines, points.
    pub fn into_primitive_sets(self) -> Vec<PrimitiveSet> {
        let mut sets = Vec::new();
        if !self.triangles.is_empty() {
            sets.push(PrimitiveSet::draw_elements(Mode::Triangles, self.triangles));
        }
        if !self.lines.is_empty() {
            sets.push(PrimitiveSet::draw_elements(Mode::Lines, self.lines));
        }
        if !self.wireframe.is_empty() {
            sets.push(PrimitiveSet::draw_elements(Mode::Lines, self.wireframe).with_wireframe(true));
        }
        if !self.points.is_empty() {
            sets.push(PrimitiveSet::draw_elements(Mode::Points, self.points));
        }
        sets
    }
}

/// Decomposes surface modes into triangles. Strips alternate winding so
/// every triangle keeps the front face of the first one.
pub fn for_each_triangle(mode: Mode, refs: &[u32], mut emit: impl FnMut([u32; 3])) {
    match mode {
        Mode::Triangles => {
            for t in refs.chunks_exact(3) {
                emit([t[0], t[1], t[2]]);
            }
        }
        Mode::TriangleStrip => {
            for (i, w) in refs.windows(3).enumerate() {
                if i % 2 == 0 {
                    emit([w[0], w[1], w[2]]);
                } else {
                    emit([w[1], w[0], w[2]]);
                }
            }
        }
        Mode::TriangleFan | Mode::Polygon => {
            if let Some((&first, rest)) = refs.split_first() {
                for w in rest.windows(2) {
                    emit([first, w[0], w[1]]);
                }
            }
        }
        Mode::Quads => {
            for q in refs.chunks_exact(4) {
                emit([q[0], q[1], q[3]]);
                emit([q[1], q[2], q[3]]);
            }
        }
        Mode::QuadStrip => {
            // Quad (q0, q1, q3, q2) split along the same diagonal as Quads.
            for q in refs.windows(4).step_by(2) {
                emit([q[0], q[1], q[2]]);
                emit([q[1], q[3], q[2]]);
            }
        }
        Mode::Points | Mode::Lines | Mode::LineStrip | Mode::LineLoop => {}
    }
}

pub fn for_each_line(mode: Mode, refs: &[u32], mut emit: impl FnMut([u32; 2])) {
    match mode {
        Mode::Lines => {
            for l in refs.chunks_exact(2) {
                emit([l[0], l[1]]);
            }
        }
        Mode::LineStrip | Mode::LineLoop => {
            for w in refs.windows(2) {
                emit([w[0], w[1]]);
            }
            if mode == Mode::LineLoop && refs.len() >= 2 {
                emit([refs[refs.len() - 1], refs[0]]);
            }
        }
        _ => {}
    }
}

/// Visible edges of any primitive. Quads and polygons give their
/// perimeter only, without the triangulation diagonals.
pub fn for_each_edge(mode: Mode, refs: &[u32], mut emit: impl FnMut([u32; 2])) {
    match mode {
        Mode::Triangles | Mode::TriangleStrip | Mode::TriangleFan => {
            for_each_triangle(mode, refs, |[a, b, c]| {
                emit([a, b]);
                emit([b, c]);
                emit([a, c]);
            });
        }
        Mode::Quads => {
            for q in refs.chunks_exact(4) {
                emit([q[0], q[1]]);
                emit([q[1], q[2]]);
                emit([q[2], q[3]]);
                emit([q[3], q[0]]);
            }
        }
        Mode::QuadStrip => {
            for q in refs.windows(4).step_by(2) {
                emit([q[0], q[1]]);
                emit([q[1], q[3]]);
                emit([q[2], q[3]]);
                emit([q[2], q[0]]);
            }
        }
        Mode::Polygon => {
            if refs.len() >= 3 {
                for_each_line(Mode::LineLoop, refs, emit);
            }
        }
        Mode::Lines | Mode::LineStrip | Mode::LineLoop => for_each_line(mode, refs, emit),
        Mode::Points => {}
    }
}

fn remap<const N: usize>(mapping: &RemapTable, indices: [u32; N]) -> Option<[u32; N]> {
    let mut out = [0; N];
    for (slot, index) in out.iter_mut().zip(indices) {
        *slot = mapping.get(index)?;
    }
    Some(out)
}

/// Expands every primitive set into merged triangle, line and point lists,
/// passing each index through `mapping`. Primitives touching an index the
/// mapping doesn't cover are dropped.
///
/// With `wireframe` set, surfaces contribute their edges instead of their
/// triangles. Sets tagged wireframe are always treated that way.
pub fn rebuild_primitives(sets: &[PrimitiveSet], mapping: &RemapTable, wireframe: bool) -> RebuiltPrimitives {
    let mut out = RebuiltPrimitives::default();
    let mut seen_edges = HashSet::new();

    for set in sets {
        let refs = set.resolve();
        let mut dropped = 0usize;
        let as_wireframe = set.mode != Mode::Points && (set.wireframe || (wireframe && set.mode.is_surface()));

        if as_wireframe {
            for_each_edge(set.mode, &refs, |edge| match remap(mapping, edge) {
                Some([a, b]) => {
                    if seen_edges.insert((a.min(b), a.max(b))) {
                        out.wireframe.extend([a, b]);
                    }
                }
                None => dropped += 1,
            });
        } else if set.mode.is_surface() {
            for_each_triangle(set.mode, &refs, |triangle| match remap(mapping, triangle) {
                Some(t) => out.triangles.extend(t),
                None => dropped += 1,
            });
        } else if set.mode.is_line() {
            for_each_line(set.mode, &refs, |line| match remap(mapping, line) {
                Some(l) => out.lines.extend(l),
                None => dropped += 1,
            });
        } else {
            for &index in &refs {
                match mapping.get(index) {
                    Some(i) => out.points.push(i),
                    None => dropped += 1,
                }
            }
        }

        if dropped > 0 {
            warn!("{:?} set: dropped {} primitives referencing missing vertices", set.mode, dropped);
        }
    }
    out
}

/// Merges duplicate vertices and rebuilds the primitive sets as indexed
/// triangle, line and point lists. Meshes with nothing to deduplicate or no
/// primitives come back unchanged; meshes that fail validation are an error.
pub fn index_mesh(mesh: &Mesh, wireframe: bool) -> LumeResult<Mesh> {
    mesh.validate()?;
    if mesh.primitive_sets.is_empty() {
        debug!("mesh '{}' has no primitive sets", mesh.name);
        return Ok(mesh.clone());
    }
    let Some(dedup) = deduplicate(mesh)? else {
        return Ok(mesh.clone());
    };

    let rebuilt = rebuild_primitives(&mesh.primitive_sets, &dedup.mapping, wireframe);
    Ok(Mesh {
        name: mesh.name.clone(),
        attributes: dedup.attributes,
        primitive_sets: rebuilt.into_primitive_sets(),
    })
}
