#[cfg(target_arch = "wasm32")]
mod imp {
    use ::wgpu::util::DeviceExt;
    use std::borrow::Cow;
    use std::collections::HashMap;

    use foundation::ids::ResourceId;
    use gpu::{GpuBackend, GpuError, PassKind, RenderFrame};
    use scene::{Material, MeshData, MeshVertex, Side};
    use texture::{ColorSpace, TextureData, WrapMode};
    use tracing::{debug, warn};

    const SHADER: &str = r#"
struct Globals {
    view: mat4x4<f32>,
    proj: mat4x4<f32>,
    camera_pos: vec4<f32>,
    light_dir: vec4<f32>,
};

struct Draw {
    model: mat4x4<f32>,
    color: vec4<f32>,
    // x: shading mode, y: has normal map
    params: vec4<f32>,
};

@group(0) @binding(0) var<uniform> globals: Globals;
@group(1) @binding(0) var<uniform> draw: Draw;
@group(2) @binding(0) var color_map: texture_2d<f32>;
@group(2) @binding(1) var normal_map: texture_2d<f32>;
@group(2) @binding(2) var map_sampler: sampler;

struct VsIn {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
};

struct VsOut {
    @builtin(position) pos: vec4<f32>,
    @location(0) world: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
};

@vertex
fn vs_main(in: VsIn) -> VsOut {
    var out: VsOut;
    let mode = u32(draw.params.x + 0.5);
    if (mode == 5u) {
        // Billboard: centre in position, corner in uv, size in normal.x.
        let centre = globals.view * draw.model * vec4<f32>(in.position, 1.0);
        let corner = vec4<f32>(in.uv * in.normal.x, 0.0, 0.0);
        out.pos = globals.proj * (centre + corner);
        out.world = centre.xyz;
        out.normal = vec3<f32>(0.0, 0.0, 1.0);
    } else {
        let world = draw.model * vec4<f32>(in.position, 1.0);
        out.pos = globals.proj * globals.view * world;
        out.world = world.xyz;
        out.normal = normalize((draw.model * vec4<f32>(in.normal, 0.0)).xyz);
    }
    out.uv = in.uv;
    out.color = in.color * draw.color;
    return out;
}

@fragment
fn fs_main(in: VsOut) -> @location(0) vec4<f32> {
    let texel = textureSample(color_map, map_sampler, in.uv);
    let bump = textureSample(normal_map, map_sampler, in.uv).xyz * 2.0 - 1.0;
    let mode = u32(draw.params.x + 0.5);
    let base = in.color * texel;
    let l = normalize(globals.light_dir.xyz);
    var n = normalize(in.normal);

    if (mode == 0u) {
        if (draw.params.y > 0.5) {
            n = normalize(n + vec3<f32>(bump.x, bump.y, 0.0) * 0.35);
        }
        let shade = 0.08 + 0.92 * max(dot(n, l), 0.0);
        return vec4<f32>(base.rgb * shade, base.a);
    }
    if (mode == 1u) {
        let dark = smoothstep(0.15, -0.25, dot(n, l));
        let glow = max(texel.r, max(texel.g, texel.b));
        return vec4<f32>(base.rgb, glow * dark * in.color.a);
    }
    if (mode == 2u) {
        let shade = 0.2 + 0.8 * max(dot(n, l), 0.0);
        return vec4<f32>(vec3<f32>(shade), texel.a * texel.r * in.color.a);
    }
    if (mode == 3u) {
        let v = normalize(globals.camera_pos.xyz - in.world);
        let rim = pow(1.0 - abs(dot(n, v)), 2.5);
        let lit = 0.35 + 0.65 * max(dot(n, l), 0.0);
        return vec4<f32>(in.color.rgb * lit, rim * in.color.a);
    }
    if (mode == 5u) {
        let d = length(in.uv);
        if (d > 1.0) {
            discard;
        }
        let falloff = pow(1.0 - d, 1.5);
        return vec4<f32>(in.color.rgb, falloff * in.color.a);
    }
    return base;
}
"#;

    /// Per-draw uniforms are packed at this stride for dynamic offsets.
    const DRAW_STRIDE: u64 = 256;

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct Globals {
        view: [[f32; 4]; 4],
        proj: [[f32; 4]; 4],
        camera_pos: [f32; 4],
        light_dir: [f32; 4],
    }

    #[repr(C)]
    #[derive(Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
    struct DrawUniform {
        model: [[f32; 4]; 4],
        color: [f32; 4],
        params: [f32; 4],
    }

    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
    struct PipelineKey {
        pass: PassKind,
        side: Side,
        depth_write: bool,
    }

    #[derive(Debug)]
    struct GpuMesh {
        vertex_buffer: ::wgpu::Buffer,
        index_buffer: ::wgpu::Buffer,
        index_count: u32,
    }

    #[derive(Debug)]
    struct GpuTexture {
        _texture: ::wgpu::Texture,
        view: ::wgpu::TextureView,
        wrap: WrapMode,
    }

    #[derive(Debug)]
    struct GpuMaterial {
        maps: (Option<ResourceId>, Option<ResourceId>),
        has_normal: bool,
        bind_group: ::wgpu::BindGroup,
    }

    #[derive(Debug)]
    struct Gpu {
        _instance: &'static ::wgpu::Instance,
        surface: ::wgpu::Surface<'static>,
        device: ::wgpu::Device,
        queue: ::wgpu::Queue,
        config: ::wgpu::SurfaceConfiguration,
        depth_view: ::wgpu::TextureView,
        shader: ::wgpu::ShaderModule,
        pipeline_layout: ::wgpu::PipelineLayout,
        pipelines: HashMap<PipelineKey, ::wgpu::RenderPipeline>,
        globals_buffer: ::wgpu::Buffer,
        globals_bind_group: ::wgpu::BindGroup,
        draw_layout: ::wgpu::BindGroupLayout,
        draw_buffer: ::wgpu::Buffer,
        draw_capacity: u64,
        draw_bind_group: ::wgpu::BindGroup,
        material_layout: ::wgpu::BindGroupLayout,
        repeat_sampler: ::wgpu::Sampler,
        clamp_sampler: ::wgpu::Sampler,
        white_view: ::wgpu::TextureView,
        flat_normal_view: ::wgpu::TextureView,
        geometries: HashMap<ResourceId, GpuMesh>,
        textures: HashMap<ResourceId, GpuTexture>,
        materials: HashMap<ResourceId, GpuMaterial>,
    }

    /// [`GpuBackend`] over a wgpu surface bound to a canvas. WebGPU when the
    /// browser has it, WebGL2 otherwise.
    #[derive(Debug)]
    pub struct WgpuBackend {
        gpu: Option<Gpu>,
    }

    fn backend_err(e: impl std::fmt::Display) -> GpuError {
        GpuError::Backend(e.to_string())
    }

    fn create_depth_view(
        device: &::wgpu::Device,
        config: &::wgpu::SurfaceConfiguration,
    ) -> ::wgpu::TextureView {
        let tex = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some("backdrop-depth"),
            size: ::wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format: ::wgpu::TextureFormat::Depth24Plus,
            usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        tex.create_view(&::wgpu::TextureViewDescriptor::default())
    }

    fn create_sampler(device: &::wgpu::Device, mode: ::wgpu::AddressMode) -> ::wgpu::Sampler {
        // WebGL2 adapters reject anisotropic filtering without mipmaps.
        device.create_sampler(&::wgpu::SamplerDescriptor {
            label: Some("backdrop-sampler"),
            address_mode_u: mode,
            address_mode_v: ::wgpu::AddressMode::ClampToEdge,
            mag_filter: ::wgpu::FilterMode::Linear,
            min_filter: ::wgpu::FilterMode::Linear,
            anisotropy_clamp: 1,
            ..Default::default()
        })
    }

    fn upload_rgba(
        device: &::wgpu::Device,
        queue: &::wgpu::Queue,
        label: &str,
        width: u32,
        height: u32,
        format: ::wgpu::TextureFormat,
        bytes: &[u8],
    ) -> ::wgpu::Texture {
        let size = ::wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&::wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: ::wgpu::TextureDimension::D2,
            format,
            usage: ::wgpu::TextureUsages::TEXTURE_BINDING | ::wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        queue.write_texture(
            ::wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: ::wgpu::Origin3d::ZERO,
                aspect: ::wgpu::TextureAspect::All,
            },
            bytes,
            ::wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );
        texture
    }

    fn create_draw_buffer(
        device: &::wgpu::Device,
        layout: &::wgpu::BindGroupLayout,
        capacity: u64,
    ) -> (::wgpu::Buffer, ::wgpu::BindGroup) {
        let buffer = device.create_buffer(&::wgpu::BufferDescriptor {
            label: Some("backdrop-draws"),
            size: capacity.max(1) * DRAW_STRIDE,
            usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
            label: Some("backdrop-draws-bg"),
            layout,
            entries: &[::wgpu::BindGroupEntry {
                binding: 0,
                resource: ::wgpu::BindingResource::Buffer(::wgpu::BufferBinding {
                    buffer: &buffer,
                    offset: 0,
                    size: ::wgpu::BufferSize::new(std::mem::size_of::<DrawUniform>() as u64),
                }),
            }],
        });
        (buffer, bind_group)
    }

    fn uniform_entry(binding: u32, dynamic: bool) -> ::wgpu::BindGroupLayoutEntry {
        ::wgpu::BindGroupLayoutEntry {
            binding,
            visibility: ::wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: ::wgpu::BindingType::Buffer {
                ty: ::wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: dynamic,
                min_binding_size: None,
            },
            count: None,
        }
    }

    fn texture_entry(binding: u32) -> ::wgpu::BindGroupLayoutEntry {
        ::wgpu::BindGroupLayoutEntry {
            binding,
            visibility: ::wgpu::ShaderStages::FRAGMENT,
            ty: ::wgpu::BindingType::Texture {
                sample_type: ::wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: ::wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        }
    }

    impl WgpuBackend {
        pub async fn from_canvas(
            canvas: web_sys::HtmlCanvasElement,
            width: u32,
            height: u32,
        ) -> Result<Self, GpuError> {
            // `wgpu::Surface` must not outlive its `wgpu::Instance`; the
            // instance is leaked for the lifetime of the page.
            let instance: &'static ::wgpu::Instance = Box::leak(Box::new(::wgpu::Instance::new(
                &::wgpu::InstanceDescriptor {
                    backends: ::wgpu::Backends::BROWSER_WEBGPU | ::wgpu::Backends::GL,
                    ..Default::default()
                },
            )));

            let surface = instance
                .create_surface(::wgpu::SurfaceTarget::Canvas(canvas))
                .map_err(|e| GpuError::Surface(e.to_string()))?;

            let adapter = instance
                .request_adapter(&::wgpu::RequestAdapterOptions {
                    power_preference: ::wgpu::PowerPreference::LowPower,
                    compatible_surface: Some(&surface),
                    force_fallback_adapter: false,
                })
                .await
                .map_err(backend_err)?;

            let (device, queue) = adapter
                .request_device(&::wgpu::DeviceDescriptor {
                    label: Some("backdrop-device"),
                    required_features: ::wgpu::Features::empty(),
                    required_limits: ::wgpu::Limits::downlevel_webgl2_defaults(),
                    ..Default::default()
                })
                .await
                .map_err(backend_err)?;

            let caps = surface.get_capabilities(&adapter);
            let format = caps
                .formats
                .iter()
                .copied()
                .find(|f| f.is_srgb())
                .or_else(|| caps.formats.first().copied())
                .ok_or_else(|| GpuError::Surface("no surface formats".into()))?;
            let alpha_mode = if caps
                .alpha_modes
                .contains(&::wgpu::CompositeAlphaMode::PreMultiplied)
            {
                ::wgpu::CompositeAlphaMode::PreMultiplied
            } else {
                caps.alpha_modes
                    .first()
                    .copied()
                    .unwrap_or(::wgpu::CompositeAlphaMode::Auto)
            };

            let config = ::wgpu::SurfaceConfiguration {
                usage: ::wgpu::TextureUsages::RENDER_ATTACHMENT,
                format,
                width: width.max(1),
                height: height.max(1),
                desired_maximum_frame_latency: 2,
                present_mode: ::wgpu::PresentMode::Fifo,
                alpha_mode,
                view_formats: vec![],
            };
            surface.configure(&device, &config);
            let depth_view = create_depth_view(&device, &config);

            let shader = device.create_shader_module(::wgpu::ShaderModuleDescriptor {
                label: Some("backdrop-shader"),
                source: ::wgpu::ShaderSource::Wgsl(Cow::Borrowed(SHADER)),
            });

            let globals_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("backdrop-globals-bgl"),
                entries: &[uniform_entry(0, false)],
            });
            let draw_layout = device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                label: Some("backdrop-draw-bgl"),
                entries: &[uniform_entry(0, true)],
            });
            let material_layout =
                device.create_bind_group_layout(&::wgpu::BindGroupLayoutDescriptor {
                    label: Some("backdrop-material-bgl"),
                    entries: &[
                        texture_entry(0),
                        texture_entry(1),
                        ::wgpu::BindGroupLayoutEntry {
                            binding: 2,
                            visibility: ::wgpu::ShaderStages::FRAGMENT,
                            ty: ::wgpu::BindingType::Sampler(::wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

            let globals_buffer = device.create_buffer(&::wgpu::BufferDescriptor {
                label: Some("backdrop-globals"),
                size: std::mem::size_of::<Globals>() as u64,
                usage: ::wgpu::BufferUsages::UNIFORM | ::wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });
            let globals_bind_group = device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("backdrop-globals-bg"),
                layout: &globals_layout,
                entries: &[::wgpu::BindGroupEntry {
                    binding: 0,
                    resource: globals_buffer.as_entire_binding(),
                }],
            });

            let pipeline_layout = device.create_pipeline_layout(&::wgpu::PipelineLayoutDescriptor {
                label: Some("backdrop-pipeline-layout"),
                bind_group_layouts: &[&globals_layout, &draw_layout, &material_layout],
                immediate_size: 0,
            });

            let draw_capacity = 64;
            let (draw_buffer, draw_bind_group) =
                create_draw_buffer(&device, &draw_layout, draw_capacity);

            let white = upload_rgba(
                &device,
                &queue,
                "backdrop-white",
                1,
                1,
                ::wgpu::TextureFormat::Rgba8Unorm,
                &[255, 255, 255, 255],
            );
            let flat_normal = upload_rgba(
                &device,
                &queue,
                "backdrop-flat-normal",
                1,
                1,
                ::wgpu::TextureFormat::Rgba8Unorm,
                &[128, 128, 255, 255],
            );

            debug!(?format, ?alpha_mode, width, height, "wgpu surface configured");
            Ok(Self {
                gpu: Some(Gpu {
                    _instance: instance,
                    surface,
                    repeat_sampler: create_sampler(&device, ::wgpu::AddressMode::Repeat),
                    clamp_sampler: create_sampler(&device, ::wgpu::AddressMode::ClampToEdge),
                    white_view: white.create_view(&::wgpu::TextureViewDescriptor::default()),
                    flat_normal_view: flat_normal
                        .create_view(&::wgpu::TextureViewDescriptor::default()),
                    device,
                    queue,
                    config,
                    depth_view,
                    shader,
                    pipeline_layout,
                    pipelines: HashMap::new(),
                    globals_buffer,
                    globals_bind_group,
                    draw_layout,
                    draw_buffer,
                    draw_capacity,
                    draw_bind_group,
                    material_layout,
                    geometries: HashMap::new(),
                    textures: HashMap::new(),
                    materials: HashMap::new(),
                }),
            })
        }

        fn gpu(&mut self) -> Result<&mut Gpu, GpuError> {
            self.gpu.as_mut().ok_or(GpuError::ContextLost)
        }
    }

    impl Gpu {
        fn material_bind_group(&self, material: &Material) -> ::wgpu::BindGroup {
            let color = material.map.and_then(|id| self.textures.get(&id));
            let normal = material.normal_map.and_then(|id| self.textures.get(&id));
            let sampler = match color.map(|t| t.wrap) {
                Some(WrapMode::ClampToEdge) => &self.clamp_sampler,
                _ => &self.repeat_sampler,
            };
            self.device.create_bind_group(&::wgpu::BindGroupDescriptor {
                label: Some("backdrop-material-bg"),
                layout: &self.material_layout,
                entries: &[
                    ::wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ::wgpu::BindingResource::TextureView(
                            color.map(|t| &t.view).unwrap_or(&self.white_view),
                        ),
                    },
                    ::wgpu::BindGroupEntry {
                        binding: 1,
                        resource: ::wgpu::BindingResource::TextureView(
                            normal.map(|t| &t.view).unwrap_or(&self.flat_normal_view),
                        ),
                    },
                    ::wgpu::BindGroupEntry {
                        binding: 2,
                        resource: ::wgpu::BindingResource::Sampler(sampler),
                    },
                ],
            })
        }

        fn ensure_pipeline(&mut self, key: PipelineKey) {
            if self.pipelines.contains_key(&key) {
                return;
            }
            let blend = match key.pass {
                PassKind::Opaque => ::wgpu::BlendState::REPLACE,
                PassKind::Alpha => ::wgpu::BlendState::ALPHA_BLENDING,
                PassKind::Additive => ::wgpu::BlendState {
                    color: ::wgpu::BlendComponent {
                        src_factor: ::wgpu::BlendFactor::SrcAlpha,
                        dst_factor: ::wgpu::BlendFactor::One,
                        operation: ::wgpu::BlendOperation::Add,
                    },
                    alpha: ::wgpu::BlendComponent {
                        src_factor: ::wgpu::BlendFactor::Zero,
                        dst_factor: ::wgpu::BlendFactor::One,
                        operation: ::wgpu::BlendOperation::Add,
                    },
                },
            };
            let cull_mode = match key.side {
                Side::Front => Some(::wgpu::Face::Back),
                Side::Back => Some(::wgpu::Face::Front),
                Side::Double => None,
            };
            let pipeline = self
                .device
                .create_render_pipeline(&::wgpu::RenderPipelineDescriptor {
                    label: Some("backdrop-pipeline"),
                    layout: Some(&self.pipeline_layout),
                    vertex: ::wgpu::VertexState {
                        module: &self.shader,
                        entry_point: Some("vs_main"),
                        compilation_options: Default::default(),
                        buffers: &[::wgpu::VertexBufferLayout {
                            array_stride: std::mem::size_of::<MeshVertex>() as ::wgpu::BufferAddress,
                            step_mode: ::wgpu::VertexStepMode::Vertex,
                            attributes: &::wgpu::vertex_attr_array![
                                0 => Float32x3,
                                1 => Float32x3,
                                2 => Float32x2,
                                3 => Float32x4
                            ],
                        }],
                    },
                    fragment: Some(::wgpu::FragmentState {
                        module: &self.shader,
                        entry_point: Some("fs_main"),
                        compilation_options: Default::default(),
                        targets: &[Some(::wgpu::ColorTargetState {
                            format: self.config.format,
                            blend: Some(blend),
                            write_mask: ::wgpu::ColorWrites::ALL,
                        })],
                    }),
                    primitive: ::wgpu::PrimitiveState {
                        topology: ::wgpu::PrimitiveTopology::TriangleList,
                        strip_index_format: None,
                        front_face: ::wgpu::FrontFace::Ccw,
                        cull_mode,
                        polygon_mode: ::wgpu::PolygonMode::Fill,
                        unclipped_depth: false,
                        conservative: false,
                    },
                    depth_stencil: Some(::wgpu::DepthStencilState {
                        format: ::wgpu::TextureFormat::Depth24Plus,
                        depth_write_enabled: key.depth_write,
                        depth_compare: ::wgpu::CompareFunction::LessEqual,
                        stencil: ::wgpu::StencilState::default(),
                        bias: ::wgpu::DepthBiasState::default(),
                    }),
                    multisample: ::wgpu::MultisampleState::default(),
                    multiview_mask: None,
                    cache: None,
                });
            self.pipelines.insert(key, pipeline);
        }

        fn ensure_draw_capacity(&mut self, draws: u64) {
            if draws <= self.draw_capacity {
                return;
            }
            let capacity = draws.next_power_of_two();
            let (buffer, bind_group) = create_draw_buffer(&self.device, &self.draw_layout, capacity);
            self.draw_buffer = buffer;
            self.draw_bind_group = bind_group;
            self.draw_capacity = capacity;
        }
    }

    impl GpuBackend for WgpuBackend {
        fn create_geometry(&mut self, id: ResourceId, mesh: &MeshData) -> Result<(), GpuError> {
            let gpu = self.gpu()?;
            let vertex_buffer = gpu
                .device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("backdrop-vertices"),
                    contents: bytemuck::cast_slice(&mesh.vertices),
                    usage: ::wgpu::BufferUsages::VERTEX,
                });
            let index_buffer = gpu
                .device
                .create_buffer_init(&::wgpu::util::BufferInitDescriptor {
                    label: Some("backdrop-indices"),
                    contents: bytemuck::cast_slice(&mesh.indices),
                    usage: ::wgpu::BufferUsages::INDEX,
                });
            gpu.geometries.insert(
                id,
                GpuMesh {
                    vertex_buffer,
                    index_buffer,
                    index_count: mesh.indices.len() as u32,
                },
            );
            Ok(())
        }

        fn create_material(&mut self, id: ResourceId, material: &Material) -> Result<(), GpuError> {
            let gpu = self.gpu()?;
            let bind_group = gpu.material_bind_group(material);
            gpu.materials.insert(
                id,
                GpuMaterial {
                    maps: (material.map, material.normal_map),
                    has_normal: material.normal_map.is_some(),
                    bind_group,
                },
            );
            Ok(())
        }

        fn update_material(&mut self, id: ResourceId, material: &Material) -> Result<(), GpuError> {
            let gpu = self.gpu()?;
            let maps = (material.map, material.normal_map);
            let Some(existing) = gpu.materials.get(&id) else {
                return Err(GpuError::UnknownResource(id));
            };
            // Per-frame opacity changes travel in the draw uniforms.
            if existing.maps == maps {
                return Ok(());
            }
            let bind_group = gpu.material_bind_group(material);
            gpu.materials.insert(
                id,
                GpuMaterial {
                    maps,
                    has_normal: material.normal_map.is_some(),
                    bind_group,
                },
            );
            Ok(())
        }

        fn create_texture(&mut self, id: ResourceId, data: &TextureData) -> Result<(), GpuError> {
            let gpu = self.gpu()?;
            let format = match data.sampling.color_space {
                ColorSpace::Srgb => ::wgpu::TextureFormat::Rgba8UnormSrgb,
                ColorSpace::Linear => ::wgpu::TextureFormat::Rgba8Unorm,
            };
            let texture = upload_rgba(
                &gpu.device,
                &gpu.queue,
                "backdrop-texture",
                data.width(),
                data.height(),
                format,
                data.as_bytes(),
            );
            let view = texture.create_view(&::wgpu::TextureViewDescriptor::default());
            gpu.textures.insert(
                id,
                GpuTexture {
                    _texture: texture,
                    view,
                    wrap: data.sampling.wrap,
                },
            );
            Ok(())
        }

        fn dispose(&mut self, id: ResourceId) {
            if let Some(gpu) = self.gpu.as_mut() {
                // Dropping a wgpu handle destroys the device object.
                gpu.geometries.remove(&id);
                gpu.materials.remove(&id);
                gpu.textures.remove(&id);
            }
        }

        fn resize(&mut self, width: u32, height: u32) {
            if let Some(gpu) = self.gpu.as_mut() {
                gpu.config.width = width.max(1);
                gpu.config.height = height.max(1);
                gpu.surface.configure(&gpu.device, &gpu.config);
                gpu.depth_view = create_depth_view(&gpu.device, &gpu.config);
            }
        }

        fn render(&mut self, frame: &RenderFrame) -> Result<(), GpuError> {
            let gpu = self.gpu()?;

            let mut keys = Vec::with_capacity(frame.draws.len());
            for draw in &frame.draws {
                let key = PipelineKey {
                    pass: draw.pass,
                    side: draw.side,
                    depth_write: draw.depth_write,
                };
                gpu.ensure_pipeline(key);
                keys.push(key);
            }
            gpu.ensure_draw_capacity(frame.draws.len() as u64);

            let globals = Globals {
                view: frame.view,
                proj: frame.projection,
                camera_pos: [
                    frame.camera_position[0],
                    frame.camera_position[1],
                    frame.camera_position[2],
                    1.0,
                ],
                light_dir: [frame.light_dir[0], frame.light_dir[1], frame.light_dir[2], 0.0],
            };
            gpu.queue
                .write_buffer(&gpu.globals_buffer, 0, bytemuck::bytes_of(&globals));

            let mut packed = vec![0u8; frame.draws.len() * DRAW_STRIDE as usize];
            for (i, draw) in frame.draws.iter().enumerate() {
                let has_normal = gpu
                    .materials
                    .get(&draw.material)
                    .is_some_and(|m| m.has_normal);
                let uniform = DrawUniform {
                    model: draw.model,
                    color: draw.color,
                    params: [
                        draw.shading.mode() as f32,
                        if has_normal { 1.0 } else { 0.0 },
                        0.0,
                        0.0,
                    ],
                };
                let start = i * DRAW_STRIDE as usize;
                let bytes = bytemuck::bytes_of(&uniform);
                packed[start..start + bytes.len()].copy_from_slice(bytes);
            }
            if !packed.is_empty() {
                gpu.queue.write_buffer(&gpu.draw_buffer, 0, &packed);
            }

            let surface_texture = match gpu.surface.get_current_texture() {
                Ok(texture) => texture,
                Err(err) => {
                    // Lost or outdated surfaces recover on the next frame.
                    gpu.surface.configure(&gpu.device, &gpu.config);
                    return Err(GpuError::Surface(err.to_string()));
                }
            };
            let view = surface_texture
                .texture
                .create_view(&::wgpu::TextureViewDescriptor::default());
            let mut encoder = gpu
                .device
                .create_command_encoder(&::wgpu::CommandEncoderDescriptor {
                    label: Some("backdrop-encoder"),
                });

            {
                let [r, g, b, a] = frame.clear_color;
                let mut rpass = encoder.begin_render_pass(&::wgpu::RenderPassDescriptor {
                    label: Some("backdrop-pass"),
                    color_attachments: &[Some(::wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        depth_slice: None,
                        ops: ::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(::wgpu::Color {
                                r: r as f64,
                                g: g as f64,
                                b: b as f64,
                                a: a as f64,
                            }),
                            store: ::wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(::wgpu::RenderPassDepthStencilAttachment {
                        view: &gpu.depth_view,
                        depth_ops: Some(::wgpu::Operations {
                            load: ::wgpu::LoadOp::Clear(1.0),
                            store: ::wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                    multiview_mask: None,
                });
                rpass.set_bind_group(0, &gpu.globals_bind_group, &[]);

                for (i, (draw, key)) in frame.draws.iter().zip(&keys).enumerate() {
                    let (Some(mesh), Some(material), Some(pipeline)) = (
                        gpu.geometries.get(&draw.geometry),
                        gpu.materials.get(&draw.material),
                        gpu.pipelines.get(key),
                    ) else {
                        continue;
                    };
                    rpass.set_pipeline(pipeline);
                    rpass.set_bind_group(1, &gpu.draw_bind_group, &[(i as u64 * DRAW_STRIDE) as u32]);
                    rpass.set_bind_group(2, &material.bind_group, &[]);
                    rpass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    rpass.set_index_buffer(mesh.index_buffer.slice(..), ::wgpu::IndexFormat::Uint32);
                    rpass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }

            gpu.queue.submit(std::iter::once(encoder.finish()));
            surface_texture.present();
            Ok(())
        }

        fn release_context(&mut self) {
            if let Some(gpu) = self.gpu.take() {
                if !(gpu.geometries.is_empty() && gpu.materials.is_empty() && gpu.textures.is_empty()) {
                    warn!(
                        geometries = gpu.geometries.len(),
                        materials = gpu.materials.len(),
                        textures = gpu.textures.len(),
                        "releasing context with live resources"
                    );
                }
                gpu.device.destroy();
            }
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod imp {
    use foundation::ids::ResourceId;
    use gpu::{GpuBackend, GpuError, RenderFrame};
    use scene::{Material, MeshData};
    use texture::TextureData;

    #[derive(Debug, Default)]
    pub struct WgpuBackend;

    fn unavailable() -> GpuError {
        GpuError::Backend("wgpu rendering is only available on wasm32 targets".into())
    }

    impl WgpuBackend {
        pub async fn from_canvas(
            _canvas: web_sys::HtmlCanvasElement,
            _width: u32,
            _height: u32,
        ) -> Result<Self, GpuError> {
            Err(unavailable())
        }
    }

    impl GpuBackend for WgpuBackend {
        fn create_geometry(&mut self, _id: ResourceId, _mesh: &MeshData) -> Result<(), GpuError> {
            Err(unavailable())
        }

        fn create_material(&mut self, _id: ResourceId, _material: &Material) -> Result<(), GpuError> {
            Err(unavailable())
        }

        fn update_material(&mut self, _id: ResourceId, _material: &Material) -> Result<(), GpuError> {
            Err(unavailable())
        }

        fn create_texture(&mut self, _id: ResourceId, _texture: &TextureData) -> Result<(), GpuError> {
            Err(unavailable())
        }

        fn dispose(&mut self, _id: ResourceId) {}

        fn resize(&mut self, _width: u32, _height: u32) {}

        fn render(&mut self, _frame: &RenderFrame) -> Result<(), GpuError> {
            Err(unavailable())
        }

        fn release_context(&mut self) {}
    }
}

pub use imp::WgpuBackend;
