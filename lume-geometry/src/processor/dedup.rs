use log::debug;
use lume_core::{AttributeArraySet, Binding, LumeResult, Mesh};

use super::compare::VertexComparator;
use super::remap::RemapTable;

/// Compacted arrays plus the old-to-new vertex mapping that produced them.
#[derive(Clone, Debug, PartialEq)]
pub struct Deduplicated {
    pub attributes: AttributeArraySet,
    pub mapping: RemapTable,
}

impl Deduplicated {
    pub fn vertex_count(&self) -> usize {
        self.mapping.target_count()
    }
}

/// Merges vertices whose per-vertex attributes are all exactly equal.
///
/// Each class of duplicates is represented by its lowest original index and
/// the survivors keep their relative order. Returns `Ok(None)` when there is
/// nothing to do: fewer than three vertices, or arrays that are still bound
/// per primitive or per primitive set. Arrays whose lengths disagree with
/// their bindings are an error.
pub fn deduplicate(mesh: &Mesh) -> LumeResult<Option<Deduplicated>> {
    mesh.validate()?;

    let vertex_count = mesh.vertex_count();
    if vertex_count < 3 {
        debug!("mesh '{}': {} vertices, nothing to deduplicate", mesh.name, vertex_count);
        return Ok(None);
    }
    if mesh.attributes.has_binding(Binding::PerPrimitiveSet) || mesh.attributes.has_binding(Binding::PerPrimitive) {
        debug!("mesh '{}': arrays not bound per vertex, skipping deduplication", mesh.name);
        return Ok(None);
    }

    let comparator = VertexComparator::new(&mesh.attributes);
    let mut sorted: Vec<u32> = (0..vertex_count as u32).collect();
    sorted.sort_by(|&a, &b| comparator.compare(a, b));

    let mut representative = vec![0u32; vertex_count];
    let mut run_start = 0;
    for i in 1..=vertex_count {
        if i < vertex_count && comparator.equivalent(sorted[run_start], sorted[i]) {
            continue;
        }
        let run = &sorted[run_start..i];
        let lowest = run.iter().copied().fold(u32::MAX, u32::min);
        for &old in run {
            representative[old as usize] = lowest;
        }
        run_start = i;
    }

    // A duplicate always points at a lower index, which is already assigned.
    let mut mapping = vec![0u32; vertex_count];
    let mut keep = Vec::new();
    for old in 0..vertex_count {
        let canonical = representative[old] as usize;
        if canonical == old {
            mapping[old] = keep.len() as u32;
            keep.push(old as u32);
        } else {
            mapping[old] = mapping[canonical];
        }
    }

    let mut attributes = mesh.attributes.clone();
    if keep.len() < vertex_count {
        for (_, data) in attributes.per_vertex_mut() {
            data.compact(&keep);
        }
    }

    debug!(
        "mesh '{}': {} vertices deduplicated to {}",
        mesh.name,
        vertex_count,
        keep.len()
    );

    let unique = keep.len();
    Ok(Some(Deduplicated {
        attributes,
        mapping: RemapTable::new(mapping, unique),
    }))
}
