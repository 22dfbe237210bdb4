use super::*;
use crate::error::MeshError;
use crate::gpu::{BlendMode, DrawTarget, GraphicsContext, MeshBuffer, PolygonMode, RenderState};
use crate::material::{Material, MaterialLibrary};
use crate::model::{parse_str, primitives, MeshDescription};
use crate::scene::Model;
use glam::Vec3;
use std::collections::HashSet;
use std::ops::Range;

/// Hands out numbered buffers and remembers which are still alive.
#[derive(Default)]
struct RecordingContext {
    next_id: usize,
    live: HashSet<usize>,
    uploads: Vec<(String, usize)>,
}

impl GraphicsContext for RecordingContext {
    type Buffer = usize;

    fn create_vertex_buffer(&mut self, label: &str, contents: &[u8]) -> usize {
        self.create(label, contents)
    }

    fn create_index_buffer(&mut self, label: &str, contents: &[u8]) -> usize {
        self.create(label, contents)
    }

    fn destroy_buffer(&mut self, buffer: usize) {
        assert!(self.live.remove(&buffer), "buffer {} destroyed twice", buffer);
    }
}

impl RecordingContext {
    fn create(&mut self, label: &str, contents: &[u8]) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        self.live.insert(id);
        self.uploads.push((label.to_string(), contents.len()));
        id
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Command {
    Bind(usize, usize),
    Unbind,
    State(RenderState),
    Material(String),
    Draw(Range<u32>),
}

#[derive(Default)]
struct RecordingTarget {
    commands: Vec<Command>,
}

impl DrawTarget for RecordingTarget {
    type Buffer = usize;
    type Material = Material;

    fn bind_mesh(&mut self, vertices: &usize, indices: &usize) {
        self.commands.push(Command::Bind(*vertices, *indices));
    }

    fn unbind_mesh(&mut self) {
        self.commands.push(Command::Unbind);
    }

    fn apply_render_state(&mut self, state: RenderState) {
        self.commands.push(Command::State(state));
    }

    fn use_material(&mut self, material: &Material) {
        self.commands.push(Command::Material(material.name.clone()));
    }

    fn draw_indexed(&mut self, indices: Range<u32>) {
        self.commands.push(Command::Draw(indices));
    }
}

impl RecordingTarget {
    fn draws(&self) -> Vec<Range<u32>> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                Command::Draw(range) => Some(range.clone()),
                _ => None,
            })
            .collect()
    }

    /// (material, state) in effect for each draw call.
    fn draw_states(&self) -> Vec<(String, RenderState)> {
        let mut state = None;
        let mut material = None;
        let mut out = Vec::new();
        for command in &self.commands {
            match command {
                Command::State(s) => state = Some(*s),
                Command::Material(m) => material = Some(m.clone()),
                Command::Draw(_) => out.push((
                    material.clone().expect("draw without material"),
                    state.expect("draw without render state"),
                )),
                _ => {}
            }
        }
        out
    }
}

const CAR: &str = "\
4
0 0 0 0 1 0 0 0
1 0 0 0 1 0 1 0
1 0 1 0 1 0 1 1
0 0 1 0 1 0 0 1
4
0 1 2
0 2 3
0 2 1
0 3 2
4
0 2 Body
2 3 Windows
3 4 Wheels
3 4 Body
";

fn upload(ctx: &mut RecordingContext, description: MeshDescription) -> (MeshBuffer<usize>, SubmeshRegistry) {
    MeshBuffer::upload(ctx, "test", description)
}

#[test]
fn test_upload_sizes_buffers_exactly() {
    let mut ctx = RecordingContext::default();
    let (buffer, _) = upload(&mut ctx, parse_str(CAR).unwrap());

    assert_eq!(buffer.vertex_count(), 4);
    assert_eq!(buffer.index_count(), 12);
    assert_eq!(
        ctx.uploads,
        [
            ("test Vertex Buffer".to_string(), 4 * 32),
            ("test Index Buffer".to_string(), 12 * 4),
        ]
    );
}

#[test]
fn test_registry_names_keep_file_order() {
    let mut ctx = RecordingContext::default();
    let (_, registry) = upload(&mut ctx, parse_str(CAR).unwrap());

    let names: Vec<&str> = registry.names().collect();
    assert_eq!(names, ["Body", "Windows", "Wheels", "Body"]);
    assert_eq!(registry.len(), 4);
    assert_eq!(registry.required_index_count(), 12);
}

#[test]
fn test_range_of_first_match_and_unknown() {
    let mut ctx = RecordingContext::default();
    let (_, registry) = upload(&mut ctx, parse_str(CAR).unwrap());

    assert_eq!(registry.range_of("Body").unwrap(), (0, 6));
    assert_eq!(registry.range_of("Windows").unwrap(), (6, 3));
    assert!(registry.contains("Wheels"));

    match registry.range_of("Bumper") {
        Err(MeshError::NotFound(name)) => assert_eq!(name, "Bumper"),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn test_single_triangle_draws_once_with_default_material() {
    let mut ctx = RecordingContext::default();
    let (buffer, registry) = upload(&mut ctx, primitives::triangle());
    let renderer = MeshRenderer::new(Material::fallback());
    let mut target = RecordingTarget::default();

    let stats = renderer.render(&mut target, &buffer, &registry, &MaterialLibrary::new());

    assert_eq!(
        target.commands,
        [
            Command::Bind(0, 1),
            Command::State(RenderState::OPAQUE),
            Command::Material("default".to_string()),
            Command::Draw(0..3),
            Command::Unbind,
        ]
    );
    assert_eq!(
        stats,
        RenderStats {
            draw_calls: 1,
            transparent_draws: 0,
            fallback_materials: 1,
        }
    );
}

#[test]
fn test_transparent_material_only_affects_its_submesh() {
    let mut ctx = RecordingContext::default();
    let (buffer, registry) = upload(&mut ctx, parse_str(CAR).unwrap());
    let renderer = MeshRenderer::new(Material::fallback());
    let library = MaterialLibrary::new()
        .with("Body", Material::flat("paint", Vec3::new(0.8, 0.1, 0.1)))
        .with("Windows", Material::glass("glass", Vec3::new(0.6, 0.8, 1.0), 0.4));
    let mut target = RecordingTarget::default();

    let stats = renderer.render(&mut target, &buffer, &registry, &library);

    assert_eq!(target.draws(), [0..6, 6..9, 9..12, 9..12]);
    assert_eq!(
        target.draw_states(),
        [
            ("paint".to_string(), RenderState::OPAQUE),
            ("glass".to_string(), RenderState::TRANSPARENT),
            ("default".to_string(), RenderState::OPAQUE),
            ("paint".to_string(), RenderState::OPAQUE),
        ]
    );
    assert!(RenderState::TRANSPARENT.blend_enabled());
    assert!(!RenderState::TRANSPARENT.depth_write);
    assert_eq!(stats.transparent_draws, 1);
    assert_eq!(stats.fallback_materials, 1);
}

#[test]
fn test_opaque_first_moves_glass_last() {
    let mut ctx = RecordingContext::default();
    let (buffer, registry) = upload(&mut ctx, parse_str(CAR).unwrap());
    let renderer = MeshRenderer::with_options(
        Material::fallback(),
        RendererOptions {
            draw_order: DrawOrder::OpaqueFirst,
            ..Default::default()
        },
    );
    let library = MaterialLibrary::new().with("Windows", Material::glass("glass", Vec3::ONE, 0.4));
    let mut target = RecordingTarget::default();

    renderer.render(&mut target, &buffer, &registry, &library);

    assert_eq!(target.draws(), [0..6, 9..12, 9..12, 6..9]);
    let (last_material, last_state) = target.draw_states().pop().unwrap();
    assert_eq!(last_material, "glass");
    assert_eq!(last_state.blend, BlendMode::AlphaOver);
}

#[test]
fn test_wireframe_option_reaches_render_state() {
    let mut ctx = RecordingContext::default();
    let (buffer, registry) = upload(&mut ctx, primitives::quad());
    let renderer = MeshRenderer::with_options(
        Material::fallback(),
        RendererOptions {
            polygon_mode: PolygonMode::Line,
            ..Default::default()
        },
    );
    let mut target = RecordingTarget::default();

    renderer.render(&mut target, &buffer, &registry, &MaterialLibrary::new());

    let (_, state) = target.draw_states()[0].clone();
    assert_eq!(state.polygon_mode, PolygonMode::Line);
    assert!(state.depth_write);
}

#[test]
fn test_transparent_default_material_draws_opaque() {
    let mut ctx = RecordingContext::default();
    let (buffer, registry) = upload(&mut ctx, parse_str(CAR).unwrap());
    let renderer = MeshRenderer::with_options(
        Material::glass("smoked", Vec3::splat(0.2), 0.3),
        RendererOptions {
            draw_order: DrawOrder::OpaqueFirst,
            ..Default::default()
        },
    );
    let library = MaterialLibrary::new().with("Windows", Material::flat("paint", Vec3::ONE));
    let mut target = RecordingTarget::default();

    let stats = renderer.render(&mut target, &buffer, &registry, &library);

    assert_eq!(target.draws(), [0..6, 6..9, 9..12, 9..12]);
    assert_eq!(
        target.draw_states(),
        [
            ("smoked".to_string(), RenderState::OPAQUE),
            ("paint".to_string(), RenderState::OPAQUE),
            ("smoked".to_string(), RenderState::OPAQUE),
            ("smoked".to_string(), RenderState::OPAQUE),
        ]
    );
    assert_eq!(stats.transparent_draws, 0);
    assert_eq!(stats.fallback_materials, 3);
}

#[test]
fn test_index_range_checks() {
    let mut ctx = RecordingContext::default();
    let (buffer, _) = upload(&mut ctx, parse_str(CAR).unwrap());

    assert_eq!(buffer.index_range(9, 3).unwrap(), 9..12);
    assert_eq!(buffer.index_range(12, 0).unwrap(), 12..12);
    assert!(matches!(
        buffer.index_range(9, 6),
        Err(MeshError::Range { start: 9, count: 6, len: 12 })
    ));
    assert!(buffer.index_range(u32::MAX, 2).is_err());
}

#[test]
#[should_panic(expected = "exceeds index buffer")]
fn test_draw_range_out_of_bounds_panics() {
    let mut ctx = RecordingContext::default();
    let (buffer, _) = upload(&mut ctx, primitives::triangle());
    let mut target = RecordingTarget::default();
    buffer.draw_range(&mut target, 0, 6);
}

#[test_log::test]
fn test_destroy_releases_buffers() {
    let mut ctx = RecordingContext::default();
    let (mut buffer, _) = upload(&mut ctx, primitives::cube());
    assert_eq!(ctx.live.len(), 2);
    assert!(!buffer.is_destroyed());

    buffer.destroy(&mut ctx);
    assert!(buffer.is_destroyed());
    assert!(ctx.live.is_empty());
}

#[test]
#[should_panic(expected = "used after destroy")]
fn test_draw_after_destroy_panics() {
    let mut ctx = RecordingContext::default();
    let (mut buffer, _) = upload(&mut ctx, primitives::triangle());
    buffer.destroy(&mut ctx);

    let mut target = RecordingTarget::default();
    buffer.draw_range(&mut target, 0, 3);
}

#[test]
fn test_model_pairs_buffer_and_registry() {
    let mut ctx = RecordingContext::default();
    let mut model = Model::from_description(&mut ctx, "cube", primitives::cube());
    let renderer = MeshRenderer::new(Material::fallback());
    let library = MaterialLibrary::new().with("Top", Material::textured("roof"));
    let mut target = RecordingTarget::default();

    let stats = model.render(&mut target, &renderer, &library);
    assert_eq!(stats.draw_calls, 6);
    assert_eq!(stats.fallback_materials, 5);
    assert_eq!(target.draws()[4], 24..30);

    model.transform.translate(Vec3::new(0.0, 2.0, 0.0));
    let lifted = model.model_matrix().transform_point3(Vec3::new(0.0, 0.5, 0.0));
    assert_eq!(lifted, Vec3::new(0.0, 2.5, 0.0));

    model.destroy(&mut ctx);
    assert!(model.buffer().is_destroyed());
    assert!(ctx.live.is_empty());
}

#[test]
fn test_model_load_from_file() {
    use assert_fs::prelude::*;

    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("mini-cooper.model");
    file.write_str(CAR).unwrap();

    let mut ctx = RecordingContext::default();
    let model = Model::load(&mut ctx, file.path(), Default::default()).unwrap();
    assert_eq!(model.name(), "mini-cooper");
    assert_eq!(model.registry().len(), 4);
    assert_eq!(model.buffer().index_count(), 12);
}

#[test]
fn test_malformed_file_creates_no_buffers() {
    use assert_fs::prelude::*;

    let temp = assert_fs::TempDir::new().unwrap();
    let file = temp.child("broken.model");
    file.write_str(&CAR.replace("0 3 2", "0 3 4")).unwrap();

    let mut ctx = RecordingContext::default();
    let result = Model::load(&mut ctx, file.path(), Default::default());
    assert!(matches!(result, Err(MeshError::Format { .. })));
    assert!(ctx.uploads.is_empty());
}
