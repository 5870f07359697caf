use std::collections::HashMap;

use log::info;
use lume_core::{LumeError, LumeResult, Mesh, Mode, PrimitiveSet};

fn corners_per_primitive(mode: Mode) -> Option<usize> {
    match mode {
        Mode::Points => Some(1),
        Mode::Lines => Some(2),
        Mode::Triangles => Some(3),
        _ => None,
    }
}

/// Cuts a mesh into pieces referencing at most `max_vertices` vertices each.
///
/// Every indexed set is sliced into runs of whole primitives, and each run
/// becomes its own mesh holding only the vertices it uses, in the order it
/// first uses them. Meshes already under the limit pass through.
pub fn split_by_vertex_count(mesh: &Mesh, max_vertices: usize) -> LumeResult<Vec<Mesh>> {
    if mesh.vertex_count() <= max_vertices {
        return Ok(vec![mesh.clone()]);
    }

    let mut chunks = Vec::new();
    for set in &mesh.primitive_sets {
        let (Some(indices), Some(per)) = (set.elements(), corners_per_primitive(set.mode)) else {
            return Err(LumeError::UnsplittableMesh {
                reason: format!("{:?} set of mesh '{}' can't be chunked", set.mode, mesh.name),
            });
        };
        let chunk_len = max_vertices / per * per;
        if chunk_len == 0 {
            return Err(LumeError::UnsplittableMesh {
                reason: format!("{} vertices can't hold a {:?} primitive", max_vertices, set.mode),
            });
        }

        let whole = indices.len() - indices.len() % per;
        for run in indices[..whole].chunks(chunk_len) {
            let mut global_to_local = HashMap::new();
            let mut used = Vec::new();
            let local: Vec<u32> = run
                .iter()
                .map(|&global| {
                    *global_to_local.entry(global).or_insert_with(|| {
                        used.push(global);
                        used.len() as u32 - 1
                    })
                })
                .collect();

            chunks.push(Mesh {
                name: format!("{}_{}", mesh.name, chunks.len()),
                attributes: mesh.attributes.gather(&used),
                primitive_sets: vec![PrimitiveSet::draw_elements(set.mode, local).with_wireframe(set.wireframe)],
            });
        }
    }

    info!(
        "mesh '{}' ({} vertices) cut into {} chunks of at most {} vertices",
        mesh.name,
        mesh.vertex_count(),
        chunks.len(),
        max_vertices
    );
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lume_core::ArrayData;

    #[test]
    fn chunks_hold_whole_triangles() {
        let mesh = Mesh::new(ArrayData::Float((0..8).map(|i| i as f32).collect())).with_name("strip").with_primitive_set(
            PrimitiveSet::draw_elements(Mode::Triangles, vec![7, 6, 5, 5, 6, 4, 0, 1, 2, 2, 1, 3]),
        );
        let chunks = split_by_vertex_count(&mesh, 7).unwrap();

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].name, "strip_0");
        assert_eq!(chunks[0].attributes.positions(), Some(&ArrayData::Float(vec![7.0, 6.0, 5.0, 4.0])));
        assert_eq!(chunks[0].primitive_sets[0].elements(), Some(&[0, 1, 2, 2, 1, 3][..]));
        assert_eq!(chunks[1].attributes.positions(), Some(&ArrayData::Float(vec![0.0, 1.0, 2.0, 3.0])));
        for chunk in &chunks {
            assert!(chunk.vertex_count() <= 7);
        }
    }

    #[test]
    fn chunks_keep_the_wireframe_tag() {
        let mesh = Mesh::new(ArrayData::Float((0..8).map(|i| i as f32).collect())).with_primitive_set(
            PrimitiveSet::draw_elements(Mode::Lines, vec![0, 1, 1, 2, 4, 5, 6, 7]).with_wireframe(true),
        );
        let chunks = split_by_vertex_count(&mesh, 4).unwrap();

        assert_eq!(chunks.len(), 2);
        for chunk in &chunks {
            assert!(chunk.primitive_sets[0].wireframe);
            assert_eq!(chunk.primitive_sets[0].mode, Mode::Lines);
        }
        assert_eq!(chunks[1].attributes.positions(), Some(&ArrayData::Float(vec![4.0, 5.0, 6.0, 7.0])));
    }

    #[test]
    fn small_meshes_pass_through() {
        let mesh = Mesh::new(ArrayData::Float(vec![0.0; 3])).with_primitive_set(PrimitiveSet::draw_arrays(Mode::Triangles, 0, 3));
        assert_eq!(split_by_vertex_count(&mesh, 3), Ok(vec![mesh]));
    }

    #[test]
    fn strips_are_rejected() {
        let mesh = Mesh::new(ArrayData::Float(vec![0.0; 5]))
            .with_primitive_set(PrimitiveSet::draw_elements(Mode::TriangleStrip, vec![0, 1, 2, 3, 4]));
        assert!(split_by_vertex_count(&mesh, 3).is_err());
    }
}
