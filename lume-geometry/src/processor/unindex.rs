use lume_core::{LumeError, LumeResult, Mesh, Mode, PrimitiveSet};

/// Vertex references of every set laid end to end, and the draw-array sets
/// addressing them.
pub(crate) struct Corners {
    pub refs: Vec<u32>,
    pub sets: Vec<PrimitiveSet>,
}

/// Number of leading references that form whole primitives.
pub(crate) fn whole_primitive_len(mode: Mode, len: usize) -> usize {
    match mode {
        Mode::Lines => len - len % 2,
        Mode::Triangles => len - len % 3,
        Mode::Quads => len - len % 4,
        Mode::Polygon if len < 3 => 0,
        _ => len,
    }
}

pub(crate) fn collect_corners(mesh: &Mesh, trim: bool) -> LumeResult<Corners> {
    let vertex_count = mesh.vertex_count();
    let mut refs = Vec::new();
    let mut sets = Vec::with_capacity(mesh.primitive_sets.len());

    for set in &mesh.primitive_sets {
        let mut set_refs = set.resolve();
        if trim {
            set_refs.truncate(whole_primitive_len(set.mode, set_refs.len()));
        }
        if let Some(&index) = set_refs.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(LumeError::IndexOutOfRange { index, vertex_count });
        }
        sets.push(
            PrimitiveSet::draw_arrays(set.mode, refs.len() as u32, set_refs.len() as u32).with_wireframe(set.wireframe),
        );
        refs.extend(set_refs);
    }
    Ok(Corners { refs, sets })
}

/// Converts a mesh to non-indexed form: each reference gets its own copy of
/// the vertex and every set becomes a draw-array range of the same mode.
pub fn to_draw_arrays(mesh: &Mesh) -> LumeResult<Mesh> {
    let corners = collect_corners(mesh, false)?;
    Ok(Mesh {
        name: mesh.name.clone(),
        attributes: mesh.attributes.gather(&corners.refs),
        primitive_sets: corners.sets,
    })
}
