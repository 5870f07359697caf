use log::debug;
use lume_core::{LumeError, LumeResult, Mesh, Mode, PrimitiveSet};
use serde::{Deserialize, Serialize};

use super::rebuild::for_each_triangle;

const RESTART_INDEX: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripOptions {
    /// FIFO cache size the triangles are ordered for before stripping.
    pub cache_size: u32,
    /// Strips with fewer triangles than this go back into a triangle list.
    pub min_size: u32,
    /// Join the strips of a set into one, bridged by degenerate triangles.
    pub merge: bool,
}

impl Default for StripOptions {
    fn default() -> Self {
        Self {
            cache_size: 16,
            min_size: 2,
            merge: true,
        }
    }
}

fn is_degenerate([a, b, c]: [u32; 3]) -> bool {
    a == b || b == c || a == c
}

/// Appends each strip to the previous one through repeated vertices. The
/// next strip always starts on an even position so its winding holds.
fn join_strips(strips: &[&[u32]]) -> Vec<u32> {
    let mut joined: Vec<u32> = Vec::new();
    for strip in strips {
        if let (Some(&last), Some(&first)) = (joined.last(), strip.first()) {
            if joined.len() % 2 == 1 {
                joined.push(last);
            }
            joined.push(last);
            joined.push(first);
        }
        joined.extend_from_slice(strip);
    }
    joined
}

/// Converts every indexed triangle list of `mesh` into triangle strips.
///
/// Other sets, including wireframe edges, are kept as they are. Short strips
/// fall back to a triangle list emitted after the strips of their set.
pub fn strip_triangles(mesh: &Mesh, options: &StripOptions) -> LumeResult<Mesh> {
    let vertex_count = mesh.vertex_count();
    let mut primitive_sets = Vec::with_capacity(mesh.primitive_sets.len());

    for set in &mesh.primitive_sets {
        let indices = match set.elements() {
            Some(indices) if set.mode == Mode::Triangles && !set.wireframe => indices,
            _ => {
                primitive_sets.push(set.clone());
                continue;
            }
        };
        let whole = &indices[..indices.len() - indices.len() % 3];
        if whole.is_empty() {
            primitive_sets.push(set.clone());
            continue;
        }
        if let Some(&index) = whole.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(LumeError::IndexOutOfRange { index, vertex_count });
        }

        let ordered = meshopt::optimize_vertex_cache_fifo(whole, vertex_count, options.cache_size);
        let stripped = meshopt::stripify(&ordered, vertex_count, RESTART_INDEX)
            .map_err(|err| LumeError::StripGenerationFailed { reason: err.to_string() })?;

        let mut strips: Vec<&[u32]> = Vec::new();
        let mut leftover = Vec::new();
        for strip in stripped.split(|&i| i == RESTART_INDEX).filter(|s| s.len() >= 3) {
            if strip.len() - 2 < options.min_size as usize {
                for_each_triangle(Mode::TriangleStrip, strip, |t| {
                    if !is_degenerate(t) {
                        leftover.extend_from_slice(&t);
                    }
                });
            } else {
                strips.push(strip);
            }
        }

        debug!(
            "mesh '{}': {} triangles into {} strips, {} left as a list",
            mesh.name,
            whole.len() / 3,
            strips.len(),
            leftover.len() / 3
        );
        if options.merge {
            if !strips.is_empty() {
                primitive_sets.push(PrimitiveSet::draw_elements(Mode::TriangleStrip, join_strips(&strips)));
            }
        } else {
            primitive_sets.extend(
                strips
                    .iter()
                    .map(|strip| PrimitiveSet::draw_elements(Mode::TriangleStrip, strip.to_vec())),
            );
        }
        if !leftover.is_empty() {
            primitive_sets.push(PrimitiveSet::draw_elements(Mode::Triangles, leftover));
        }
    }

    Ok(Mesh {
        name: mesh.name.clone(),
        attributes: mesh.attributes.clone(),
        primitive_sets,
    })
}
