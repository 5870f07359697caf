use lume_core::{ArrayData, Binding, Channel, LumeError, Mesh, MeshArena, Mode, PrimitiveSet};
use lume_geometry::{
    GeometryOptimizer, IndexSplitter, OptimizerConfig, StatsCollector, deduplicate, index_mesh, normalize_bindings,
};

const CUBE_CORNERS: [[f32; 3]; 8] = [
    [-1.0, -1.0, -1.0],
    [1.0, -1.0, -1.0],
    [1.0, 1.0, -1.0],
    [-1.0, 1.0, -1.0],
    [-1.0, -1.0, 1.0],
    [1.0, -1.0, 1.0],
    [1.0, 1.0, 1.0],
    [-1.0, 1.0, 1.0],
];

const CUBE_FACES: [[usize; 4]; 6] = [
    [0, 3, 2, 1],
    [4, 5, 6, 7],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
    [1, 2, 6, 5],
    [0, 4, 7, 3],
];

/// Cube as 36 unshared corners drawn as a plain triangle list.
fn soup_cube() -> Mesh {
    let mut corners = Vec::new();
    for [a, b, c, d] in CUBE_FACES {
        for i in [a, b, c, a, c, d] {
            corners.push(CUBE_CORNERS[i]);
        }
    }
    Mesh::new(ArrayData::Vec3(corners))
        .with_name("cube")
        .with_primitive_set(PrimitiveSet::draw_arrays(Mode::Triangles, 0, 36))
}

fn triangle_values(mesh: &Mesh) -> Vec<[[f32; 3]; 3]> {
    let positions = mesh.attributes.positions().and_then(|p| p.as_vec3()).unwrap();
    mesh.primitive_sets
        .iter()
        .flat_map(|s| s.resolve())
        .collect::<Vec<_>>()
        .chunks(3)
        .map(|t| [positions[t[0] as usize], positions[t[1] as usize], positions[t[2] as usize]])
        .collect()
}

#[test]
fn cube_collapses_to_eight_vertices() {
    let cube = soup_cube();
    let normalized = normalize_bindings(&cube).unwrap();
    assert_eq!(normalized, cube);

    let indexed = index_mesh(&normalized, false).unwrap();
    assert_eq!(indexed.vertex_count(), 8);
    assert_eq!(indexed.primitive_sets.len(), 1);

    let set = &indexed.primitive_sets[0];
    assert_eq!(set.mode, Mode::Triangles);
    assert_eq!(set.index_count(), 36);
    assert!(set.elements().unwrap().iter().all(|&i| i < 8));
    assert_eq!(triangle_values(&indexed), triangle_values(&cube));
}

#[test]
fn quad_becomes_two_triangles() {
    let mesh = Mesh::new(ArrayData::Vec3(vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]]))
        .with_primitive_set(PrimitiveSet::draw_elements(Mode::Quads, vec![0, 1, 2, 3]));
    let indexed = index_mesh(&mesh, false).unwrap();
    assert_eq!(indexed.primitive_sets[0].elements(), Some(&[0, 1, 3, 1, 2, 3][..]));
}

#[test]
fn lowest_original_index_wins() {
    let mut positions: Vec<[f32; 3]> = (0..6).map(|i| [i as f32, 0.0, 0.0]).collect();
    positions[5] = positions[2];
    let mesh = Mesh::new(ArrayData::Vec3(positions))
        .with_primitive_set(PrimitiveSet::draw_arrays(Mode::Points, 0, 6));

    let dedup = deduplicate(&mesh).unwrap().unwrap();
    assert_eq!(dedup.vertex_count(), 5);
    assert_eq!(dedup.mapping.get(5), dedup.mapping.get(2));
    assert_eq!(dedup.mapping.get(2), Some(2));
    assert_eq!(dedup.mapping.get(3), Some(3));
}

#[test]
fn deduplication_is_idempotent() {
    let indexed = index_mesh(&soup_cube(), false).unwrap();
    let again = deduplicate(&indexed).unwrap().unwrap();
    assert!(again.mapping.is_identity());
    assert_eq!(again.attributes, indexed.attributes);
    assert_eq!(index_mesh(&indexed, false), Ok(indexed));
}

#[test]
fn fan_with_per_primitive_color_is_rejected() {
    let mesh = Mesh::new(ArrayData::Vec3(vec![[0.0; 3], [1.0; 3], [2.0; 3], [3.0; 3]]))
        .with_attribute(Channel::Color, Binding::PerPrimitive, ArrayData::Vec4(vec![[1.0; 4], [0.5; 4]]))
        .with_primitive_set(PrimitiveSet::draw_arrays(Mode::TriangleFan, 0, 4));

    let err = GeometryOptimizer::default().optimize(&mesh).unwrap_err();
    assert_eq!(
        err,
        LumeError::UnsupportedBindingConversion {
            channel: Channel::Color,
            mode: Mode::TriangleFan,
            binding: Binding::PerPrimitive,
        }
    );
}

#[test]
fn per_primitive_colors_survive_the_pipeline() {
    let mesh = Mesh::new(ArrayData::Vec3(vec![[0.0; 3], [1.0; 3], [2.0; 3], [3.0; 3]]))
        .with_attribute(Channel::Color, Binding::PerPrimitive, ArrayData::Vec4ub(vec![[255, 0, 0, 255], [0, 255, 0, 255]]))
        .with_primitive_set(PrimitiveSet::draw_elements(Mode::Triangles, vec![0, 1, 2, 2, 1, 3]));

    let out = GeometryOptimizer::default().optimize(&mesh).unwrap();
    assert_eq!(out.len(), 1);
    // Shared corners 1 and 2 carry different colors, so they stay apart.
    assert_eq!(out[0].vertex_count(), 6);
    assert_eq!(out[0].attributes.get(Channel::Color).unwrap().binding, Binding::PerVertex);
}

fn grid_mesh(size: u32) -> Mesh {
    let row = size + 1;
    let positions = (0..row * row).map(|i| [(i % row) as f32, (i / row) as f32, 0.0]).collect();
    let mut indices = Vec::new();
    for y in 0..size {
        for x in 0..size {
            let i = y * row + x;
            indices.extend([i, i + 1, i + row, i + 1, i + row + 1, i + row]);
        }
    }
    Mesh::new(ArrayData::Vec3(positions)).with_primitive_set(PrimitiveSet::draw_elements(Mode::Triangles, indices))
}

#[test]
fn split_partitions_triangles_within_bound() {
    let mesh = grid_mesh(20);
    let bound = 100;
    let parts = IndexSplitter::new(bound).split(&mesh).unwrap();
    assert!(parts.len() > 1);

    let mut split_triangles = Vec::new();
    for part in &parts {
        for set in &part.primitive_sets {
            assert!(set.max_index().is_none_or(|m| m <= bound));
            assert!(set.elements().unwrap().iter().all(|&i| (i as usize) < part.vertex_count()));
        }
        assert!(part.vertex_count() <= bound as usize + 1);
        split_triangles.extend(triangle_values(part));
    }

    let mut expected = triangle_values(&mesh);
    let key = |t: &[[f32; 3]; 3]| t.map(|p| p.map(|c| c.to_bits()));
    expected.sort_by_key(key);
    split_triangles.sort_by_key(key);
    assert_eq!(split_triangles, expected);
}

#[test]
fn split_keeps_relative_triangle_order() {
    let mesh = grid_mesh(8);
    let parts = IndexSplitter::new(40).split(&mesh).unwrap();
    let original = triangle_values(&mesh);
    for part in &parts {
        let triangles = triangle_values(part);
        let positions: Vec<usize> = triangles
            .iter()
            .map(|t| original.iter().position(|o| o == t).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}

#[test]
fn far_apart_triangle_is_isolated() {
    let positions = (0..200_000).map(|i| [i as f32, 0.0, 0.0]).collect();
    let mesh = Mesh::new(ArrayData::Vec3(positions))
        .with_primitive_set(PrimitiveSet::draw_elements(Mode::Triangles, vec![0, 100_000, 199_999]));

    // Nothing fits the first pass, so only the reordered remainder comes out.
    let parts = IndexSplitter::new(65535).split(&mesh).unwrap();
    assert_eq!(parts.len(), 1);

    let isolated = &parts[0];
    assert_eq!(isolated.vertex_count(), 3);
    assert_eq!(isolated.primitive_sets[0].elements(), Some(&[0, 1, 2][..]));
    assert_eq!(
        isolated.attributes.positions(),
        Some(&ArrayData::Vec3(vec![[0.0, 0.0, 0.0], [100_000.0, 0.0, 0.0], [199_999.0, 0.0, 0.0]]))
    );
}

#[test]
fn optimizer_splits_large_meshes() {
    let config = OptimizerConfig {
        max_index_value: 255,
        ..OptimizerConfig::default()
    };
    let mesh = grid_mesh(30);
    let out = GeometryOptimizer::new(config).optimize(&mesh).unwrap();
    assert!(out.len() > 1);
    let triangles: usize = out.iter().map(|m| m.triangle_index_count() / 3).sum();
    assert_eq!(triangles, 30 * 30 * 2);
}

#[test]
fn stats_count_each_mesh_once() {
    let mut arena = MeshArena::new();
    let cube = arena.insert(index_mesh(&soup_cube(), false).unwrap());
    let quad = arena.insert(
        Mesh::new(ArrayData::Vec3(vec![[0.0; 3]; 4]))
            .with_primitive_set(PrimitiveSet::draw_elements(Mode::Lines, vec![0, 1, 2, 3])),
    );

    let mut stats = StatsCollector::new();
    stats.visit_arena(&arena);
    assert!(!stats.visit(cube, arena.get(cube).unwrap()));
    assert!(!stats.visit(quad, arena.get(quad).unwrap()));

    let totals = stats.totals();
    assert_eq!(totals.meshes, 2);
    assert_eq!(totals.triangles, 12);
    assert_eq!(totals.lines, 2);
    assert_eq!(totals.vertices, 12);
}

#[test]
fn surfaces_split_beside_lines() {
    let config = OptimizerConfig {
        max_index_value: 100,
        ..OptimizerConfig::default()
    };
    let mesh = grid_mesh(20).with_primitive_set(PrimitiveSet::draw_elements(Mode::Lines, vec![0, 440]));
    let out = GeometryOptimizer::new(config).optimize(&mesh).unwrap();
    assert!(out.len() > 2);

    let (lines, surfaces) = out.split_last().unwrap();
    for part in surfaces {
        assert!(part.primitive_sets.iter().all(|s| s.mode == Mode::Triangles));
        assert!(part.vertex_count() <= 101);
    }
    let triangles: usize = surfaces.iter().map(|m| m.triangle_index_count() / 3).sum();
    assert_eq!(triangles, 20 * 20 * 2);

    assert_eq!(lines.vertex_count(), 2);
    assert_eq!(lines.primitive_sets[0].elements(), Some(&[0, 1][..]));
    assert_eq!(
        lines.attributes.positions(),
        Some(&ArrayData::Vec3(vec![[0.0, 0.0, 0.0], [20.0, 20.0, 0.0]]))
    );
}

#[test]
fn out_of_range_triangle_fails_the_split_quickly() {
    let n = 20_000u32;
    let mut indices: Vec<u32> = (0..n - 2).flat_map(|i| [i, i + 1, i + 2]).collect();
    indices.extend([0, 1, n + 5]);
    let mesh = Mesh::new(ArrayData::Vec3((0..n).map(|i| [i as f32, 0.0, 0.0]).collect()))
        .with_primitive_set(PrimitiveSet::draw_elements(Mode::Triangles, indices));

    assert_eq!(
        IndexSplitter::new(1000).split(&mesh),
        Err(LumeError::IndexOutOfRange {
            index: n + 5,
            vertex_count: n as usize
        })
    );
}
