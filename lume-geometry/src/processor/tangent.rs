use bevy_mikktspace::{Geometry, StdOps, TangentSpace};
use log::{debug, warn};
use lume_core::{ArrayData, Binding, Channel, LumeError, LumeResult, Mesh};

use super::rebuild::for_each_triangle;

struct TangentInput<'a> {
    triangles: Vec<[u32; 3]>,
    positions: &'a [[f32; 3]],
    normals: &'a [[f32; 3]],
    texcoords: &'a [[f32; 2]],
    tangents: Vec<[f32; 4]>,
}

impl TangentInput<'_> {
    fn vertex(&self, face: usize, vert: usize) -> usize {
        self.triangles[face][vert] as usize
    }
}

impl Geometry<StdOps> for TangentInput<'_> {
    fn num_faces(&self) -> usize {
        self.triangles.len()
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.positions[self.vertex(face, vert)]
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.normals[self.vertex(face, vert)]
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.texcoords[self.vertex(face, vert)]
    }

    fn set_tangent(&mut self, tangent_space: Option<TangentSpace>, face: usize, vert: usize) {
        let index = self.vertex(face, vert);
        self.tangents[index] = tangent_space.unwrap_or_default().tangent_encoded();
    }
}

/// Adds a per-vertex [`Channel::Tangent`] array computed with MikkTSpace
/// from the positions, normals and the texture coordinates on
/// `texcoord_unit`. The `w` component holds the bitangent sign.
///
/// Meshes without per-vertex `Vec3` normals, `Vec2` texture coordinates on
/// that unit, or surface primitives come back unchanged.
pub fn generate_tangent_space(mesh: &Mesh, texcoord_unit: u32) -> LumeResult<Mesh> {
    mesh.validate()?;

    let per_vertex = move |channel: Channel| {
        mesh.attributes
            .get(channel)
            .filter(|a| a.binding == Binding::PerVertex)
            .map(|a| &a.data)
    };
    let (Some(positions), Some(normals), Some(texcoords)) = (
        per_vertex(Channel::Position).and_then(ArrayData::as_vec3),
        per_vertex(Channel::Normal).and_then(ArrayData::as_vec3),
        per_vertex(Channel::TexCoord(texcoord_unit)).and_then(ArrayData::as_vec2),
    ) else {
        debug!(
            "mesh '{}': no normals or texcoord {} to build tangents from",
            mesh.name, texcoord_unit
        );
        return Ok(mesh.clone());
    };

    let vertex_count = mesh.vertex_count();
    let mut triangles = Vec::new();
    for set in mesh.primitive_sets.iter().filter(|s| s.mode.is_surface() && !s.wireframe) {
        let refs = set.resolve();
        if let Some(&index) = refs.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(LumeError::IndexOutOfRange { index, vertex_count });
        }
        for_each_triangle(set.mode, &refs, |t| triangles.push(t));
    }
    if triangles.is_empty() {
        debug!("mesh '{}': no triangles, tangents skipped", mesh.name);
        return Ok(mesh.clone());
    }

    let mut input = TangentInput {
        triangles,
        positions,
        normals,
        texcoords,
        tangents: vec![[1.0, 0.0, 0.0, 1.0]; vertex_count],
    };
    bevy_mikktspace::generate_tangents::<_, StdOps>(&mut input).map_err(|err| LumeError::TangentGenerationFailed {
        mesh: mesh.name.clone(),
        reason: format!("{err:?}"),
    })?;

    if mesh.attributes.get(Channel::Tangent).is_some() {
        warn!("mesh '{}': replacing existing tangents", mesh.name);
    }
    Ok(mesh
        .clone()
        .with_attribute(Channel::Tangent, Binding::PerVertex, ArrayData::Vec4(input.tangents)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lume_core::{Mode, PrimitiveSet};

    fn textured_quad() -> Mesh {
        Mesh::new(ArrayData::Vec3(vec![
            [0.0, 0.0, 0.0],
            [1.0, 0.0, 0.0],
            [1.0, 1.0, 0.0],
            [0.0, 1.0, 0.0],
        ]))
        .with_attribute(Channel::Normal, Binding::PerVertex, ArrayData::Vec3(vec![[0.0, 0.0, 1.0]; 4]))
        .with_attribute(
            Channel::TexCoord(1),
            Binding::PerVertex,
            ArrayData::Vec2(vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]),
        )
        .with_primitive_set(PrimitiveSet::draw_elements(Mode::Triangles, vec![0, 1, 2, 0, 2, 3]))
    }

    #[test]
    fn tangents_follow_the_u_direction() {
        let out = generate_tangent_space(&textured_quad(), 1).unwrap();
        let tangent = out.attributes.get(Channel::Tangent).unwrap();
        assert_eq!(tangent.binding, Binding::PerVertex);

        let ArrayData::Vec4(values) = &tangent.data else {
            panic!("tangents should be Vec4");
        };
        assert_eq!(values.len(), 4);
        for t in values {
            assert!((t[0] - 1.0).abs() < 1e-4, "{t:?}");
            assert!(t[1].abs() < 1e-4 && t[2].abs() < 1e-4, "{t:?}");
            assert_eq!(t[3].abs(), 1.0);
        }
    }

    #[test]
    fn missing_texcoords_leave_the_mesh_alone() {
        let mesh = textured_quad();
        assert_eq!(generate_tangent_space(&mesh, 0), Ok(mesh));
    }

    #[test]
    fn bad_references_are_reported() {
        let mut mesh = textured_quad();
        mesh.primitive_sets = vec![PrimitiveSet::draw_elements(Mode::Triangles, vec![0, 1, 7])];
        assert_eq!(
            generate_tangent_space(&mesh, 1),
            Err(LumeError::IndexOutOfRange {
                index: 7,
                vertex_count: 4
            })
        );
    }
}
