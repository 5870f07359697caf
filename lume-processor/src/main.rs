use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use log::{debug, error, info, warn};
use lume_core::{ArrayData, Binding, Channel, Indices, LumeError, Mesh, MeshArena, Mode, PrimitiveSet};
use lume_geometry::{
    GeometryOptimizer, MeshStats, OptimizerConfig, StatsCollector, StripOptions, VertexOrder, split_by_vertex_count,
};
use rayon::prelude::*;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "lume-processor")]
#[command(about = "Indexes OBJ meshes and splits them to fit an index bound")]
#[command(version)]
struct Cli {
    /// Input OBJ file
    input: PathBuf,

    /// Output file for the encoded meshes
    output: PathBuf,

    /// Largest vertex index an output mesh may reference
    #[arg(long, default_value_t = 65535)]
    max_index: u32,

    /// Rebuild surfaces as edge lists
    #[arg(long)]
    wireframe: bool,

    /// Write non-indexed meshes
    #[arg(long)]
    draw_array: bool,

    /// Reorder split remainders for vertex cache efficiency
    #[arg(long)]
    cache_order: bool,

    /// Cut output meshes into chunks of at most N vertices
    #[arg(long, value_name = "N")]
    chunk: Option<usize>,

    /// Recenter and scale positions into [-1, 1]
    #[arg(long)]
    normalize: bool,

    /// Generate MikkTSpace tangents
    #[arg(long)]
    tangent_space: bool,

    /// Texture unit the tangents follow
    #[arg(long, value_name = "UNIT", default_value_t = 0)]
    tangent_unit: u32,

    /// Convert triangle lists to strips
    #[arg(long)]
    tri_strip: bool,

    /// Vertex cache size the strips are built for
    #[arg(long, value_name = "N", default_value_t = 16)]
    strip_cache_size: u32,

    /// Shortest strip, in triangles, kept as a strip
    #[arg(long, value_name = "N", default_value_t = 2)]
    strip_min_size: u32,

    /// Keep every strip as its own primitive set
    #[arg(long)]
    no_strip_merge: bool,

    /// Write wireframe edges as separate meshes
    #[arg(long)]
    detach_wireframe: bool,

    /// Write non-indexed meshes after splitting
    #[arg(long)]
    disable_index: bool,
}

impl Cli {
    fn config(&self) -> OptimizerConfig {
        OptimizerConfig {
            max_index_value: self.max_index,
            wireframe: self.wireframe,
            use_draw_array: self.draw_array,
            vertex_order: if self.cache_order {
                VertexOrder::CacheOrder
            } else {
                VertexOrder::AccessOrder
            },
            generate_tangent_space: self.tangent_space,
            tangent_space_unit: self.tangent_unit,
            tri_strip: self.tri_strip,
            strip_options: StripOptions {
                cache_size: self.strip_cache_size,
                min_size: self.strip_min_size,
                merge: !self.no_strip_merge,
            },
            detach_wireframe: self.detach_wireframe,
            disable_index: self.disable_index,
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let start_total = Instant::now();

    let mut meshes = load_obj(&cli.input)?;
    info!(
        "loaded {} meshes from {} in {:.2}s",
        meshes.len(),
        cli.input.display(),
        start_total.elapsed().as_secs_f32()
    );

    if cli.normalize {
        normalize_positions(&mut meshes);
    }

    let optimize_start = Instant::now();
    let optimizer = GeometryOptimizer::new(cli.config());
    let results: Vec<Result<Vec<Mesh>, LumeError>> = meshes.par_iter().map(|mesh| optimizer.optimize(mesh)).collect();

    let mut arena = MeshArena::new();
    for (mesh, result) in meshes.iter().zip(results) {
        let parts = match result {
            Ok(parts) => parts,
            Err(err) => {
                error!("skipping mesh '{}': {}", mesh.name, err);
                continue;
            }
        };
        for part in parts {
            for piece in chunk(part, cli.chunk)? {
                debug!("mesh '{}': {}", piece.name, MeshStats::of(&piece));
                arena.insert(piece);
            }
        }
    }
    info!("optimized in {:.2}s", optimize_start.elapsed().as_secs_f32());

    let mut stats = StatsCollector::new();
    stats.visit_arena(&arena);
    info!("output: {}", stats.totals());

    let file = File::create(&cli.output).with_context(|| format!("Failed to create {}", cli.output.display()))?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, &arena.into_meshes()).context("Failed to write meshes")?;
    writer.flush()?;

    info!(
        "saved to {} (total {:.2}s)",
        cli.output.display(),
        start_total.elapsed().as_secs_f32()
    );
    Ok(())
}

fn chunk(mesh: Mesh, max_vertices: Option<usize>) -> Result<Vec<Mesh>> {
    let Some(max_vertices) = max_vertices else {
        return Ok(vec![mesh]);
    };
    match split_by_vertex_count(&mesh, max_vertices) {
        Ok(chunks) => Ok(chunks),
        Err(LumeError::UnsplittableMesh { reason }) => {
            warn!("not chunking: {}", reason);
            Ok(vec![mesh])
        }
        Err(err) => Err(err).with_context(|| format!("Failed to chunk mesh '{}'", mesh.name)),
    }
}

/// One mesh per OBJ model. Indices are not unified, so every face corner
/// becomes its own vertex and identical corners are left for the optimizer
/// to merge.
fn load_obj(path: &Path) -> Result<Vec<Mesh>> {
    let options = tobj::LoadOptions {
        single_index: false,
        triangulate: false,
        ..Default::default()
    };
    let (models, _materials) =
        tobj::load_obj(path, &options).with_context(|| format!("Failed to load OBJ file: {}", path.display()))?;

    models
        .into_iter()
        .map(|model| {
            let name = model.name.clone();
            corner_mesh(model).with_context(|| format!("Invalid mesh '{}' in {}", name, path.display()))
        })
        .collect()
}

fn corner_mesh(model: tobj::Model) -> Result<Mesh> {
    let mesh = &model.mesh;
    let positions = gather::<3>(&mesh.positions, &mesh.indices).context("position index out of range")?;
    let mut out = Mesh::new(ArrayData::Vec3(positions)).with_name(model.name.clone());

    if !mesh.normals.is_empty() && mesh.normal_indices.len() == mesh.indices.len() {
        let normals = gather::<3>(&mesh.normals, &mesh.normal_indices).context("normal index out of range")?;
        out = out.with_attribute(Channel::Normal, Binding::PerVertex, ArrayData::Vec3(normals));
    }
    if !mesh.texcoords.is_empty() && mesh.texcoord_indices.len() == mesh.indices.len() {
        let texcoords = gather::<2>(&mesh.texcoords, &mesh.texcoord_indices).context("texcoord index out of range")?;
        out = out.with_attribute(Channel::TexCoord(0), Binding::PerVertex, ArrayData::Vec2(texcoords));
    }
    if !mesh.vertex_color.is_empty() {
        let colors = gather::<3>(&mesh.vertex_color, &mesh.indices).context("color index out of range")?;
        out = out.with_attribute(Channel::Color, Binding::PerVertex, ArrayData::Vec3(colors));
    }

    out.primitive_sets = face_sets(&mesh.face_arities, mesh.indices.len());
    Ok(out)
}

fn gather<const N: usize>(data: &[f32], indices: &[u32]) -> Option<Vec<[f32; N]>> {
    indices
        .iter()
        .map(|&i| {
            let start = i as usize * N;
            let mut value = [0.0; N];
            value.copy_from_slice(data.get(start..start + N)?);
            Some(value)
        })
        .collect()
}

/// Draw-array sets over the corner list. Runs of faces with the same arity
/// share one set; larger polygons get one set each.
fn face_sets(face_arities: &[u32], corner_count: usize) -> Vec<PrimitiveSet> {
    if face_arities.is_empty() {
        return vec![PrimitiveSet::draw_arrays(Mode::Triangles, 0, corner_count as u32)];
    }

    let mut sets: Vec<PrimitiveSet> = Vec::new();
    let mut first = 0u32;
    for &arity in face_arities {
        let mode = match arity {
            1 => Mode::Points,
            2 => Mode::Lines,
            3 => Mode::Triangles,
            4 => Mode::Quads,
            _ => Mode::Polygon,
        };
        let extends_last = mode != Mode::Polygon && sets.last().is_some_and(|s| s.mode == mode);
        if extends_last {
            if let Some(PrimitiveSet {
                indices: Indices::Array { count, .. },
                ..
            }) = sets.last_mut()
            {
                *count += arity;
            }
        } else {
            sets.push(PrimitiveSet::draw_arrays(mode, first, arity));
        }
        first += arity;
    }
    sets
}

fn normalize_positions(meshes: &mut [Mesh]) {
    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for positions in meshes.iter().filter_map(|m| m.attributes.positions().and_then(|p| p.as_vec3())) {
        for &p in positions {
            min = min.min(Vec3::from(p));
            max = max.max(Vec3::from(p));
        }
    }
    if min.cmpgt(max).any() {
        return;
    }

    let center = (min + max) * 0.5;
    let max_dim = (max - min).max_element();
    let scale = if max_dim > 0.0 { 2.0 / max_dim } else { 1.0 };
    info!("normalizing positions: center {:?}, scale {}", center, scale);

    for mesh in meshes.iter_mut() {
        let Some(positions) = mesh
            .attributes
            .get_mut(Channel::Position)
            .and_then(|a| a.data.as_vec3_mut())
        else {
            continue;
        };
        for p in positions.iter_mut() {
            *p = ((Vec3::from(*p) - center) * scale).to_array();
        }
    }
}
