use lume_core::{Mesh, PrimitiveSet};

fn partition_sets(mesh: &Mesh, pred: impl Fn(&PrimitiveSet) -> bool) -> (Option<Mesh>, Option<Mesh>) {
    let (matching, others): (Vec<_>, Vec<_>) = mesh.primitive_sets.iter().cloned().partition(|s| pred(s));

    let half = |primitive_sets: Vec<_>| {
        (!primitive_sets.is_empty()).then(|| Mesh {
            name: mesh.name.clone(),
            attributes: mesh.attributes.clone(),
            primitive_sets,
        })
    };
    (half(matching), half(others))
}

/// Splits a mesh into its surface primitives and its points and lines.
/// Each half gets its own copy of the arrays; an empty half is `None`.
pub fn separate_surfaces(mesh: &Mesh) -> (Option<Mesh>, Option<Mesh>) {
    partition_sets(mesh, |s| s.mode.is_surface())
}

/// Moves the sets tagged `wireframe` into a mesh of their own, named after
/// the source with a `_wireframe` suffix. Returns the remaining mesh and the
/// detached one; either is `None` when it would hold no sets.
pub fn detach_wireframe(mesh: &Mesh) -> (Option<Mesh>, Option<Mesh>) {
    let (wireframe, rest) = partition_sets(mesh, |s| s.wireframe);
    let wireframe = wireframe.map(|mut m| {
        m.name = format!("{}_wireframe", mesh.name);
        m
    });
    (rest, wireframe)
}
