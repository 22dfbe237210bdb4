use custom_mesh::gpu::{MeshPipelines, SceneUniforms, WgpuContext, WgpuPass};
use custom_mesh::material::{GpuMaterial, Material, MaterialLibrary};
use custom_mesh::model::primitives;
use custom_mesh::{MeshRenderer, Model};
use glam::{Mat4, Vec3};
use pollster::FutureExt;

fn create_test_device() -> Option<(wgpu::Device, wgpu::Queue)> {
    let instance = wgpu::Instance::default();
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions::default())
        .block_on()?;
    adapter
        .request_device(
            &wgpu::DeviceDescriptor {
                label: None,
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: Default::default(),
            },
            None,
        )
        .block_on()
        .ok()
}

#[test]
fn test_render_cube_offscreen() {
    let Some((device, queue)) = create_test_device() else {
        eprintln!("No wgpu adapter available, skipping");
        return;
    };

    let color_format = wgpu::TextureFormat::Rgba8UnormSrgb;
    let pipelines = MeshPipelines::new(&device, &queue, color_format);
    let scene = SceneUniforms::new(&device, &pipelines);

    let mut ctx = WgpuContext::new(&device);
    let mut model = Model::from_description(&mut ctx, "cube", primitives::cube());
    assert_eq!(model.buffer().index_count(), 36);
    scene.update(&queue, Mat4::IDENTITY, model.model_matrix());

    let mut triangle = Model::from_description(&mut ctx, "triangle", primitives::triangle());
    triangle.transform.translate(Vec3::new(0.5, 0.0, 0.0));
    let triangle_scene = SceneUniforms::new(&device, &pipelines);
    triangle_scene.update(&queue, Mat4::IDENTITY, triangle.model_matrix());

    let renderer = MeshRenderer::new(GpuMaterial::new(&device, &pipelines, Material::fallback(), None));
    let library = MaterialLibrary::new().with(
        "Front",
        GpuMaterial::new(&device, &pipelines, Material::glass("glass", Vec3::ONE, 0.5), None),
    );

    let extent = wgpu::Extent3d {
        width: 64,
        height: 64,
        depth_or_array_layers: 1,
    };
    let color = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Color Target"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: color_format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let depth = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("Test Depth Target"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: MeshPipelines::DEPTH_FORMAT,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
    let depth_view = depth.create_view(&wgpu::TextureViewDescriptor::default());

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("Test Encoder"),
    });
    let (stats, triangle_stats) = {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("Test Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: &depth_view,
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        let mut target = WgpuPass::new(&mut render_pass, &pipelines, &scene);
        let stats = model.render(&mut target, &renderer, &library);
        target.set_scene(&triangle_scene);
        (stats, triangle.render(&mut target, &renderer, &library))
    };
    queue.submit(std::iter::once(encoder.finish()));

    assert_eq!(stats.draw_calls, 6);
    assert_eq!(stats.transparent_draws, 1);
    assert_eq!(stats.fallback_materials, 5);
    assert_eq!(triangle_stats.draw_calls, 1);

    model.destroy(&mut ctx);
    triangle.destroy(&mut ctx);
    assert!(model.buffer().is_destroyed());
    assert!(triangle.buffer().is_destroyed());
}
