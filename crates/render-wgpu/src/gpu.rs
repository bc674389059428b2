use crate::{shaders, texture};
use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4};
use globe_assets::TextureHandle;
use globe_render::{PerspectiveCamera, RenderError};
use globe_scene::{
    AtmosphereMesh, Blending, GlobeMesh, MeshVertex, Node, Scene, Side, SphereGeometry, StarField,
};
use std::sync::Arc;
use wgpu::util::DeviceExt;

const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;
const SAMPLE_COUNT: u32 = 4;

fn multisample_state() -> wgpu::MultisampleState {
    wgpu::MultisampleState {
        count: SAMPLE_COUNT,
        mask: !0,
        alpha_to_coverage_enabled: false,
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct MeshUniforms {
    model_view: [[f32; 4]; 4],
    projection: [[f32; 4]; 4],
    normal_matrix: [[f32; 4]; 4],
    sun_position: [f32; 4],
}

impl MeshUniforms {
    fn new(view: Mat4, world: Mat4, projection: Mat4, sun_position: [f32; 3]) -> Self {
        let model_view = view * world;
        let normal_matrix = Mat3::from_mat4(model_view).inverse().transpose();
        let [x, y, z] = sun_position;
        Self {
            model_view: model_view.to_cols_array_2d(),
            projection: projection.to_cols_array_2d(),
            normal_matrix: Mat4::from_mat3(normal_matrix).to_cols_array_2d(),
            sun_position: [x, y, z, 1.0],
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct StarUniforms {
    view_proj: [[f32; 4]; 4],
    color: [f32; 4],
}

fn cull_mode(side: Side) -> Option<wgpu::Face> {
    match side {
        Side::Front => Some(wgpu::Face::Back),
        Side::Back => Some(wgpu::Face::Front),
        Side::Double => None,
    }
}

fn blend_state(blending: Blending) -> wgpu::BlendState {
    match blending {
        Blending::Opaque => wgpu::BlendState::REPLACE,
        Blending::Additive => {
            let additive = wgpu::BlendComponent {
                src_factor: wgpu::BlendFactor::SrcAlpha,
                dst_factor: wgpu::BlendFactor::One,
                operation: wgpu::BlendOperation::Add,
            };
            wgpu::BlendState {
                color: additive,
                alpha: additive,
            }
        }
    }
}

/// Sphere vertex and index buffers for one tessellation.
struct SphereBuffers {
    geometry: SphereGeometry,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    index_count: u32,
}

/// Pipeline and texture bindings for one globe material.
struct GlobeResources {
    day: TextureHandle,
    night: TextureHandle,
    sharpness: f32,
    pipeline: wgpu::RenderPipeline,
    bind_group: wgpu::BindGroup,
}

impl GlobeResources {
    fn matches(&self, mesh: &GlobeMesh) -> bool {
        Arc::ptr_eq(&self.day, &mesh.material.day)
            && Arc::ptr_eq(&self.night, &mesh.material.night)
            && self.sharpness == mesh.material.terminator_sharpness
    }
}

struct StarResources {
    point_count: u32,
    vertex_buffer: wgpu::Buffer,
}

struct AtmosphereResources {
    side: Side,
    blending: Blending,
    pipeline: wgpu::RenderPipeline,
}

/// What one frame draws, gathered from a scene traversal.
#[derive(Default)]
struct FrameDraws<'a> {
    globe: Option<(Mat4, &'a GlobeMesh)>,
    atmosphere: Option<(Mat4, &'a AtmosphereMesh)>,
    stars: Option<(Mat4, &'a StarField)>,
}

impl<'a> FrameDraws<'a> {
    fn collect(scene: &'a Scene) -> Self {
        let mut draws = Self::default();
        for (_, world, node) in scene.traverse() {
            match node {
                Node::Globe(mesh) => draws.globe = Some((world, mesh)),
                Node::Atmosphere(mesh) => draws.atmosphere = Some((world, mesh)),
                Node::Stars(stars) => draws.stars = Some((world, stars)),
                Node::Group(_) | Node::Light(_) => {}
            }
        }
        draws
    }
}

/// wgpu globe renderer: star points, day/night globe and atmosphere shell.
///
/// Frames are drawn 4x multisampled and resolved into the target view.
/// Scene resources (sphere buffers, textures, star buffer) are uploaded on
/// the first frame that needs them and reused afterwards.
pub struct GlobeRenderer {
    format: wgpu::TextureFormat,
    clear_color: wgpu::Color,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    globe_pipeline_layout: wgpu::PipelineLayout,
    atmosphere_pipeline_layout: wgpu::PipelineLayout,
    star_pipeline: wgpu::RenderPipeline,
    globe_uniform_buffer: wgpu::Buffer,
    globe_uniform_bind_group: wgpu::BindGroup,
    atmosphere_uniform_buffer: wgpu::Buffer,
    atmosphere_uniform_bind_group: wgpu::BindGroup,
    star_uniform_buffer: wgpu::Buffer,
    star_uniform_bind_group: wgpu::BindGroup,
    sampler: wgpu::Sampler,
    spheres: Vec<SphereBuffers>,
    globe: Option<GlobeResources>,
    atmosphere: Option<AtmosphereResources>,
    stars: Option<StarResources>,
    msaa_view: wgpu::TextureView,
    depth_view: wgpu::TextureView,
}

impl GlobeRenderer {
    /// `format` is the format of the views passed to [`GlobeRenderer::render`].
    pub fn new(
        device: &wgpu::Device,
        format: wgpu::TextureFormat,
        width: u32,
        height: u32,
        clear_color: [f64; 4],
    ) -> Self {
        let uniform_entry = |visibility| wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: None,
            },
            count: None,
        };

        let mesh_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mesh_uniform_layout"),
                entries: &[uniform_entry(
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let texture_entry = |binding| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("globe_texture_layout"),
                entries: &[
                    texture_entry(0),
                    texture_entry(1),
                    wgpu::BindGroupLayoutEntry {
                        binding: 2,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
            });

        let star_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("star_uniform_layout"),
                entries: &[uniform_entry(
                    wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                )],
            });

        let globe_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("globe_pipeline_layout"),
            bind_group_layouts: &[&mesh_bind_group_layout, &texture_bind_group_layout],
            push_constant_ranges: &[],
        });
        let atmosphere_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("atmosphere_pipeline_layout"),
                bind_group_layouts: &[&mesh_bind_group_layout],
                push_constant_ranges: &[],
            });
        let star_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("star_pipeline_layout"),
            bind_group_layouts: &[&star_bind_group_layout],
            push_constant_ranges: &[],
        });

        let star_shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("star_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::STAR_SHADER.into()),
        });
        let star_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("star_pipeline"),
            layout: Some(&star_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &star_shader,
                entry_point: Some("vs_stars"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: (3 * std::mem::size_of::<f32>()) as u64,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &wgpu::vertex_attr_array![0 => Float32x3],
                }],
            },
            fragment: Some(wgpu::FragmentState {
                module: &star_shader,
                entry_point: Some("fs_stars"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::PointList,
                ..Default::default()
            },
            depth_stencil: Some(depth_state(true)),
            multisample: multisample_state(),
            multiview: None,
            cache: None,
        });

        let uniform_buffer = |label, size: usize| {
            device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(label),
                size: size as u64,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            })
        };
        let bind_uniform = |label, layout, buffer: &wgpu::Buffer| {
            device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(label),
                layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: buffer.as_entire_binding(),
                }],
            })
        };

        let globe_uniform_buffer =
            uniform_buffer("globe_uniforms", std::mem::size_of::<MeshUniforms>());
        let globe_uniform_bind_group = bind_uniform(
            "globe_uniform_bind_group",
            &mesh_bind_group_layout,
            &globe_uniform_buffer,
        );
        let atmosphere_uniform_buffer =
            uniform_buffer("atmosphere_uniforms", std::mem::size_of::<MeshUniforms>());
        let atmosphere_uniform_bind_group = bind_uniform(
            "atmosphere_uniform_bind_group",
            &mesh_bind_group_layout,
            &atmosphere_uniform_buffer,
        );
        let star_uniform_buffer =
            uniform_buffer("star_uniforms", std::mem::size_of::<StarUniforms>());
        let star_uniform_bind_group = bind_uniform(
            "star_uniform_bind_group",
            &star_bind_group_layout,
            &star_uniform_buffer,
        );

        let [r, g, b, a] = clear_color;

        Self {
            format,
            clear_color: wgpu::Color { r, g, b, a },
            texture_bind_group_layout,
            globe_pipeline_layout,
            atmosphere_pipeline_layout,
            star_pipeline,
            globe_uniform_buffer,
            globe_uniform_bind_group,
            atmosphere_uniform_buffer,
            atmosphere_uniform_bind_group,
            star_uniform_buffer,
            star_uniform_bind_group,
            sampler: texture::globe_sampler(device),
            spheres: Vec::new(),
            globe: None,
            atmosphere: None,
            stars: None,
            msaa_view: frame_target(device, "msaa_color", format, width, height),
            depth_view: frame_target(device, "depth_texture", DEPTH_FORMAT, width, height),
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, width: u32, height: u32) {
        self.msaa_view = frame_target(device, "msaa_color", self.format, width, height);
        self.depth_view = frame_target(device, "depth_texture", DEPTH_FORMAT, width, height);
    }

    /// Render one frame: stars, globe, then the additive atmosphere.
    pub fn render(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        view: &wgpu::TextureView,
        scene: &Scene,
        camera: &PerspectiveCamera,
    ) -> Result<(), RenderError> {
        let draws = FrameDraws::collect(scene);
        let view_matrix = camera.view_matrix();
        let projection = camera.projection_matrix();

        let mut globe_sphere = None;
        if let Some((world, mesh)) = draws.globe {
            self.prepare_globe(device, queue, mesh)?;
            queue.write_buffer(
                &self.globe_uniform_buffer,
                0,
                bytemuck::bytes_of(&MeshUniforms::new(
                    view_matrix,
                    world,
                    projection,
                    mesh.material.sun_position.to_array(),
                )),
            );
            globe_sphere = Some(self.sphere(device, mesh.geometry));
        }

        let atmosphere_sphere = draws.atmosphere.map(|(world, mesh)| {
            self.prepare_atmosphere(device, mesh);
            queue.write_buffer(
                &self.atmosphere_uniform_buffer,
                0,
                bytemuck::bytes_of(&MeshUniforms::new(
                    view_matrix,
                    world,
                    projection,
                    [0.0; 3],
                )),
            );
            self.sphere(device, mesh.geometry)
        });

        let draw_stars = draws.stars.is_some_and(|(world, stars)| {
            self.prepare_stars(device, stars);
            let [r, g, b] = stars.color();
            queue.write_buffer(
                &self.star_uniform_buffer,
                0,
                bytemuck::bytes_of(&StarUniforms {
                    view_proj: (projection * view_matrix * world).to_cols_array_2d(),
                    color: [r, g, b, 1.0],
                }),
            );
            stars.point_count() > 0
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("globe_encoder"),
        });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("globe_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &self.msaa_view,
                    resolve_target: Some(view),
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Discard,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Discard,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            if let (true, Some(stars)) = (draw_stars, &self.stars) {
                pass.set_pipeline(&self.star_pipeline);
                pass.set_bind_group(0, &self.star_uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, stars.vertex_buffer.slice(..));
                pass.draw(0..stars.point_count, 0..1);
            }

            if let (Some(index), Some(globe)) = (globe_sphere, &self.globe) {
                let sphere = &self.spheres[index];
                pass.set_pipeline(&globe.pipeline);
                pass.set_bind_group(0, &self.globe_uniform_bind_group, &[]);
                pass.set_bind_group(1, &globe.bind_group, &[]);
                pass.set_vertex_buffer(0, sphere.vertex_buffer.slice(..));
                pass.set_index_buffer(sphere.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..sphere.index_count, 0, 0..1);
            }

            if let (Some(index), Some(atmosphere)) = (atmosphere_sphere, &self.atmosphere) {
                let sphere = &self.spheres[index];
                pass.set_pipeline(&atmosphere.pipeline);
                pass.set_bind_group(0, &self.atmosphere_uniform_bind_group, &[]);
                pass.set_vertex_buffer(0, sphere.vertex_buffer.slice(..));
                pass.set_index_buffer(sphere.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..sphere.index_count, 0, 0..1);
            }
        }

        queue.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Index of the buffers for `geometry`, uploading them on first use.
    fn sphere(&mut self, device: &wgpu::Device, geometry: SphereGeometry) -> usize {
        if let Some(index) = self.spheres.iter().position(|s| s.geometry == geometry) {
            return index;
        }
        let mesh = geometry.build();
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_vertex_buffer"),
            contents: bytemuck::cast_slice(&mesh.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("sphere_index_buffer"),
            contents: bytemuck::cast_slice(&mesh.indices),
            usage: wgpu::BufferUsages::INDEX,
        });
        tracing::debug!(
            "uploaded sphere r={} {}x{} ({} vertices)",
            geometry.radius,
            geometry.width_segments,
            geometry.height_segments,
            mesh.vertices.len()
        );
        self.spheres.push(SphereBuffers {
            geometry,
            vertex_buffer,
            index_buffer,
            index_count: mesh.indices.len() as u32,
        });
        self.spheres.len() - 1
    }

    fn prepare_globe(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mesh: &GlobeMesh,
    ) -> Result<(), RenderError> {
        if self.globe.as_ref().is_some_and(|g| g.matches(mesh)) {
            return Ok(());
        }
        let material = &mesh.material;
        let day = texture::upload(device, queue, &material.day)?;
        let night = texture::upload(device, queue, &material.night)?;
        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("globe_texture_bind_group"),
            layout: &self.texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&day),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::TextureView(&night),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::Sampler(&self.sampler),
                },
            ],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("globe_shader"),
            source: wgpu::ShaderSource::Wgsl(
                shaders::globe_shader(material.terminator_sharpness).into(),
            ),
        });
        let pipeline = mesh_pipeline(
            device,
            MeshPipeline {
                label: "globe_pipeline",
                layout: &self.globe_pipeline_layout,
                shader: &shader,
                vs_entry: "vs_globe",
                fs_entry: "fs_globe",
                format: self.format,
                side: material.side(),
                blending: material.blending(),
            },
        );

        self.globe = Some(GlobeResources {
            day: Arc::clone(&material.day),
            night: Arc::clone(&material.night),
            sharpness: material.terminator_sharpness,
            pipeline,
            bind_group,
        });
        Ok(())
    }

    fn prepare_atmosphere(&mut self, device: &wgpu::Device, mesh: &AtmosphereMesh) {
        let material = &mesh.material;
        if self
            .atmosphere
            .as_ref()
            .is_some_and(|a| a.side == material.side && a.blending == material.blending)
        {
            return;
        }
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("atmosphere_shader"),
            source: wgpu::ShaderSource::Wgsl(shaders::atmosphere_shader().into()),
        });
        let pipeline = mesh_pipeline(
            device,
            MeshPipeline {
                label: "atmosphere_pipeline",
                layout: &self.atmosphere_pipeline_layout,
                shader: &shader,
                vs_entry: "vs_atmosphere",
                fs_entry: "fs_atmosphere",
                format: self.format,
                side: material.side,
                blending: material.blending,
            },
        );
        self.atmosphere = Some(AtmosphereResources {
            side: material.side,
            blending: material.blending,
            pipeline,
        });
    }

    fn prepare_stars(&mut self, device: &wgpu::Device, stars: &StarField) {
        let point_count = stars.point_count() as u32;
        if self.stars.as_ref().is_some_and(|s| s.point_count == point_count) || point_count == 0 {
            return;
        }
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("star_vertex_buffer"),
            contents: bytemuck::cast_slice(stars.positions()),
            usage: wgpu::BufferUsages::VERTEX,
        });
        tracing::debug!("uploaded {point_count} star points");
        self.stars = Some(StarResources {
            point_count,
            vertex_buffer,
        });
    }
}

/// Multisampled attachment the frame is drawn into before resolve.
fn frame_target(
    device: &wgpu::Device,
    label: &str,
    format: wgpu::TextureFormat,
    width: u32,
    height: u32,
) -> wgpu::TextureView {
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some(label),
        size: wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        },
        mip_level_count: 1,
        sample_count: SAMPLE_COUNT,
        dimension: wgpu::TextureDimension::D2,
        format,
        usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
        view_formats: &[],
    });
    texture.create_view(&Default::default())
}

fn depth_state(write: bool) -> wgpu::DepthStencilState {
    wgpu::DepthStencilState {
        format: DEPTH_FORMAT,
        depth_write_enabled: write,
        depth_compare: wgpu::CompareFunction::Less,
        stencil: Default::default(),
        bias: Default::default(),
    }
}

struct MeshPipeline<'a> {
    label: &'a str,
    layout: &'a wgpu::PipelineLayout,
    shader: &'a wgpu::ShaderModule,
    vs_entry: &'a str,
    fs_entry: &'a str,
    format: wgpu::TextureFormat,
    side: Side,
    blending: Blending,
}

fn mesh_pipeline(device: &wgpu::Device, desc: MeshPipeline<'_>) -> wgpu::RenderPipeline {
    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(desc.label),
        layout: Some(desc.layout),
        vertex: wgpu::VertexState {
            module: desc.shader,
            entry_point: Some(desc.vs_entry),
            compilation_options: Default::default(),
            buffers: &[wgpu::VertexBufferLayout {
                array_stride: std::mem::size_of::<MeshVertex>() as u64,
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: &wgpu::vertex_attr_array![
                    0 => Float32x3,
                    1 => Float32x3,
                    2 => Float32x2,
                ],
            }],
        },
        fragment: Some(wgpu::FragmentState {
            module: desc.shader,
            entry_point: Some(desc.fs_entry),
            compilation_options: Default::default(),
            targets: &[Some(wgpu::ColorTargetState {
                format: desc.format,
                blend: Some(blend_state(desc.blending)),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: cull_mode(desc.side),
            ..Default::default()
        },
        depth_stencil: Some(depth_state(desc.blending == Blending::Opaque)),
        multisample: multisample_state(),
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn back_side_culls_front_faces() {
        assert_eq!(cull_mode(Side::Back), Some(wgpu::Face::Front));
        assert_eq!(cull_mode(Side::Front), Some(wgpu::Face::Back));
        assert_eq!(cull_mode(Side::Double), None);
    }

    #[test]
    fn additive_blend_adds_alpha_weighted_source() {
        let blend = blend_state(Blending::Additive);
        assert_eq!(blend.color.src_factor, wgpu::BlendFactor::SrcAlpha);
        assert_eq!(blend.color.dst_factor, wgpu::BlendFactor::One);
        assert_eq!(blend_state(Blending::Opaque), wgpu::BlendState::REPLACE);
    }

    #[test]
    fn pipelines_draw_four_samples() {
        let state = multisample_state();
        assert_eq!(state.count, 4);
        assert_eq!(state.mask, !0);
        assert!(!state.alpha_to_coverage_enabled);
    }

    #[test]
    fn uniforms_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<MeshUniforms>(), 208);
        assert_eq!(std::mem::size_of::<StarUniforms>(), 80);
    }

    #[test]
    fn normal_matrix_keeps_uniform_scale_direction() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 12.5), Vec3::ZERO, Vec3::Y);
        let world = Mat4::from_scale(Vec3::splat(1.1));
        let u = MeshUniforms::new(view, world, Mat4::IDENTITY, [5.0, 3.0, -4.5]);
        let n = Mat4::from_cols_array_2d(&u.normal_matrix).transform_vector3(Vec3::Z);
        assert!(n.normalize().abs_diff_eq(Vec3::Z, 1e-5));
        assert_eq!(u.sun_position, [5.0, 3.0, -4.5, 1.0]);
    }
}
