use lume_core::{ArrayData, AttributeArraySet, Binding, LumeError, LumeResult, Mesh, Mode, PrimitiveSet, VertexAttribute};

use super::unindex::collect_corners;

fn is_per_primitive(binding: Binding) -> bool {
    matches!(binding, Binding::PerPrimitive | Binding::PerPrimitiveSet)
}

/// Strips, fans and quads share vertices between primitives, so a value
/// bound to one primitive has no single vertex to land on.
fn conversion_supported(mode: Mode, binding: Binding) -> bool {
    match binding {
        Binding::PerPrimitive => !matches!(
            mode,
            Mode::TriangleStrip | Mode::TriangleFan | Mode::Quads | Mode::QuadStrip | Mode::LineStrip | Mode::LineLoop
        ),
        Binding::PerPrimitiveSet => !matches!(
            mode,
            Mode::TriangleStrip | Mode::TriangleFan | Mode::Quads | Mode::QuadStrip
        ),
        _ => true,
    }
}

/// Returns a copy of `mesh` where every array bound overall, per primitive
/// set or per primitive is bound per vertex instead.
///
/// Per-primitive bindings need one vertex per reference, so such meshes are
/// expanded to draw arrays first. Unsupported mode and binding pairs fail
/// before anything is converted.
pub fn normalize_bindings(mesh: &Mesh) -> LumeResult<Mesh> {
    mesh.validate()?;

    for set in &mesh.primitive_sets {
        for (channel, attribute) in mesh.attributes.iter() {
            if !conversion_supported(set.mode, attribute.binding) {
                return Err(LumeError::UnsupportedBindingConversion {
                    channel,
                    mode: set.mode,
                    binding: attribute.binding,
                });
            }
        }
    }

    let mut normalized = if mesh.attributes.iter().any(|(_, a)| is_per_primitive(a.binding)) {
        expand_per_primitive(mesh)?
    } else {
        mesh.clone()
    };

    let vertex_count = normalized.vertex_count();
    for (_, attribute) in normalized.attributes.iter_mut() {
        if attribute.binding == Binding::Overall {
            attribute.data = attribute.data.repeat(0, vertex_count);
            attribute.binding = Binding::PerVertex;
        }
    }
    Ok(normalized)
}

fn expand_per_primitive(mesh: &Mesh) -> LumeResult<Mesh> {
    let corners = collect_corners(mesh, true)?;

    let mut attributes = AttributeArraySet::new();
    for (channel, attribute) in mesh.attributes.iter() {
        let data = match attribute.binding {
            Binding::PerVertex => attribute.data.gather(&corners.refs),
            Binding::PerPrimitiveSet => replicate_per_set(&attribute.data, &corners.sets)?,
            Binding::PerPrimitive => replicate_per_primitive(&attribute.data, &corners.sets)?,
            Binding::Off | Binding::Overall => {
                attributes.insert(channel, attribute.clone());
                continue;
            }
        };
        attributes.insert(channel, VertexAttribute::per_vertex(data));
    }

    Ok(Mesh {
        name: mesh.name.clone(),
        attributes,
        primitive_sets: corners.sets,
    })
}

fn replicate_per_set(data: &ArrayData, sets: &[PrimitiveSet]) -> LumeResult<ArrayData> {
    let mut out = data.empty_like();
    for (p, set) in sets.iter().enumerate() {
        out.extend_repeat(data, p, set.index_count())?;
    }
    Ok(out)
}

fn replicate_per_primitive(data: &ArrayData, sets: &[PrimitiveSet]) -> LumeResult<ArrayData> {
    let mut out = data.empty_like();
    let mut primitive = 0;
    for set in sets {
        // Only modes with disjoint primitives get here.
        let corners = match set.mode {
            Mode::Points => 1,
            Mode::Lines => 2,
            Mode::Polygon => set.index_count(),
            _ => 3,
        };
        for _ in 0..set.primitive_count() {
            out.extend_repeat(data, primitive, corners)?;
            primitive += 1;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lume_core::{Channel, Indices};

    fn positions(n: usize) -> ArrayData {
        ArrayData::Vec3((0..n).map(|i| [i as f32, 0.0, 0.0]).collect())
    }

    #[test]
    fn per_vertex_mesh_is_unchanged() {
        let mesh = Mesh::new(positions(3)).with_primitive_set(PrimitiveSet::draw_arrays(Mode::TriangleFan, 0, 3));
        assert_eq!(normalize_bindings(&mesh), Ok(mesh));
    }

    #[test]
    fn overall_is_repeated_per_vertex() {
        let mesh = Mesh::new(positions(4))
            .with_attribute(Channel::Color, Binding::Overall, ArrayData::Vec4(vec![[1.0, 0.0, 0.0, 1.0]]))
            .with_primitive_set(PrimitiveSet::draw_arrays(Mode::Quads, 0, 4));
        let normalized = normalize_bindings(&mesh).unwrap();
        let color = normalized.attributes.get(Channel::Color).unwrap();
        assert_eq!(color.binding, Binding::PerVertex);
        assert_eq!(color.data, ArrayData::Vec4(vec![[1.0, 0.0, 0.0, 1.0]; 4]));
        assert_eq!(normalized.primitive_sets, mesh.primitive_sets);
    }

    #[test]
    fn per_primitive_set_follows_each_set() {
        let mesh = Mesh::new(positions(4))
            .with_attribute(Channel::FogCoord, Binding::PerPrimitiveSet, ArrayData::Float(vec![1.0, 2.0]))
            .with_primitive_set(PrimitiveSet::draw_elements(Mode::Triangles, vec![0, 1, 2]))
            .with_primitive_set(PrimitiveSet::draw_elements(Mode::Lines, vec![2, 3]));
        let normalized = normalize_bindings(&mesh).unwrap();

        assert_eq!(normalized.vertex_count(), 5);
        assert_eq!(
            normalized.attributes.get(Channel::FogCoord).map(|a| &a.data),
            Some(&ArrayData::Float(vec![1.0, 1.0, 1.0, 2.0, 2.0]))
        );
        assert_eq!(normalized.primitive_sets[1].indices, Indices::Array { first: 3, count: 2 });
        assert_eq!(normalized.validate(), Ok(()));
    }

    #[test]
    fn per_primitive_counts_across_sets() {
        let mesh = Mesh::new(positions(6))
            .with_attribute(Channel::Normal, Binding::PerPrimitive, ArrayData::Vec3(vec![[0.0; 3], [1.0; 3], [2.0; 3]]))
            .with_primitive_set(PrimitiveSet::draw_arrays(Mode::Triangles, 0, 6))
            .with_primitive_set(PrimitiveSet::draw_elements(Mode::Points, vec![5]));
        let normalized = normalize_bindings(&mesh).unwrap();
        assert_eq!(
            normalized.attributes.get(Channel::Normal).map(|a| &a.data),
            Some(&ArrayData::Vec3(vec![
                [0.0; 3], [0.0; 3], [0.0; 3],
                [1.0; 3], [1.0; 3], [1.0; 3],
                [2.0; 3],
            ]))
        );
    }

    #[test]
    fn fan_with_per_primitive_binding_is_fatal() {
        let mesh = Mesh::new(positions(4))
            .with_attribute(Channel::Color, Binding::PerPrimitive, ArrayData::Vec4ub(vec![[0; 4], [1; 4]]))
            .with_primitive_set(PrimitiveSet::draw_arrays(Mode::TriangleFan, 0, 4));
        assert_eq!(
            normalize_bindings(&mesh),
            Err(LumeError::UnsupportedBindingConversion {
                channel: Channel::Color,
                mode: Mode::TriangleFan,
                binding: Binding::PerPrimitive,
            })
        );
    }

    #[test]
    fn shared_vertex_modes_reject_per_primitive_values() {
        let rejected = [
            (Mode::TriangleStrip, Binding::PerPrimitiveSet),
            (Mode::TriangleStrip, Binding::PerPrimitive),
            (Mode::TriangleFan, Binding::PerPrimitiveSet),
            (Mode::TriangleFan, Binding::PerPrimitive),
            (Mode::Quads, Binding::PerPrimitiveSet),
            (Mode::Quads, Binding::PerPrimitive),
            (Mode::QuadStrip, Binding::PerPrimitiveSet),
            (Mode::QuadStrip, Binding::PerPrimitive),
            (Mode::LineStrip, Binding::PerPrimitive),
            (Mode::LineLoop, Binding::PerPrimitive),
        ];
        for (mode, binding) in rejected {
            let mesh = Mesh::new(positions(8))
                .with_attribute(Channel::Color, binding, ArrayData::Vec4(vec![[1.0; 4]; 8]))
                .with_primitive_set(PrimitiveSet::draw_arrays(mode, 0, 8));
            assert_eq!(
                normalize_bindings(&mesh),
                Err(LumeError::UnsupportedBindingConversion {
                    channel: Channel::Color,
                    mode,
                    binding,
                }),
                "{mode:?} with {binding:?}"
            );
        }
    }

    #[test]
    fn disjoint_modes_accept_per_primitive_values() {
        let accepted = [
            (Mode::LineStrip, Binding::PerPrimitiveSet),
            (Mode::LineLoop, Binding::PerPrimitiveSet),
            (Mode::Triangles, Binding::PerPrimitive),
            (Mode::Lines, Binding::PerPrimitive),
            (Mode::Points, Binding::PerPrimitive),
            (Mode::Polygon, Binding::PerPrimitive),
        ];
        for (mode, binding) in accepted {
            let mesh = Mesh::new(positions(6))
                .with_attribute(Channel::Color, binding, ArrayData::Vec4(vec![[1.0; 4]; 6]))
                .with_primitive_set(PrimitiveSet::draw_arrays(mode, 0, 6));
            let normalized = normalize_bindings(&mesh);
            assert!(normalized.is_ok(), "{mode:?} with {binding:?}: {normalized:?}");
            let normalized = normalized.unwrap();
            assert_eq!(normalized.attributes.get(Channel::Color).map(|a| a.binding), Some(Binding::PerVertex));
            assert_eq!(normalized.validate(), Ok(()));
        }
    }

    #[test]
    fn invalid_lengths_are_reported() {
        let mesh = Mesh::new(positions(3))
            .with_attribute(Channel::Color, Binding::PerPrimitiveSet, ArrayData::Vec4(Vec::new()))
            .with_primitive_set(PrimitiveSet::draw_arrays(Mode::Triangles, 0, 3));
        assert!(matches!(
            normalize_bindings(&mesh),
            Err(LumeError::AttributeLengthMismatch { .. })
        ));
    }
}
