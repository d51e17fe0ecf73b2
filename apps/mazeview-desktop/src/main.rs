mod overlay;

use anyhow::{Context as _, Result};
use clap::Parser;
use egui::Context as EguiContext;
use mazeview_common::{Action, ViewerConfig};
use mazeview_input::InputController;
use mazeview_kernel::{Player, Simulation};
use mazeview_map::GridMap;
use mazeview_render::{Camera, Minimap, SceneGeometry};
use mazeview_render_wgpu::{MazeRenderer, TextureSet};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser)]
#[command(name = "mazeview-desktop", about = "First-person maze viewer")]
struct Cli {
    /// Map file
    #[arg(default_value = "map_00.txt")]
    map: PathBuf,

    /// Wall texture
    #[arg(long, default_value = "wall00-2.png")]
    wall: PathBuf,

    /// Floor texture
    #[arg(long, default_value = "pol00.png")]
    floor: PathBuf,

    /// Ceiling texture
    #[arg(long, default_value = "pol01.png")]
    ceiling: PathBuf,

    /// Window width in pixels
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window height in pixels
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Viewer config (YAML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Everything loaded from disk before the window opens.
struct Assets {
    config: ViewerConfig,
    map: Arc<GridMap>,
    textures: TextureSet,
    scene: SceneGeometry,
    minimap: Minimap,
}

impl Assets {
    fn load(cli: &Cli) -> Result<Self> {
        let config = match &cli.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("failed to load config {}", path.display()))?,
            None => ViewerConfig::default(),
        };
        let map = GridMap::load(&cli.map)
            .with_context(|| format!("failed to load map {}", cli.map.display()))?;
        let textures = TextureSet::load(&cli.wall, &cli.floor, &cli.ceiling)
            .context("failed to load textures")?;
        let scene = SceneGeometry::build(&map);
        let minimap = Minimap::new(&map);
        Ok(Self {
            config,
            map: Arc::new(map),
            textures,
            scene,
            minimap,
        })
    }
}

/// Window plus every GPU resource tied to it.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    renderer: MazeRenderer,
    egui_winit: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
}

impl Gpu {
    fn new(
        event_loop: &ActiveEventLoop,
        size: PhysicalSize<u32>,
        assets: &Assets,
        egui_ctx: &EguiContext,
    ) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("mazeview")
            .with_inner_size(size);
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create window")?,
        );

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .context("failed to create surface")?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .context("no compatible GPU adapter")?;

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("mazeview_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .context("failed to create GPU device")?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .context("surface reports no texture formats")?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let renderer = MazeRenderer::new(
            &device,
            &queue,
            surface_format,
            config.width,
            config.height,
            &assets.scene,
            &assets.textures,
        );

        let egui_winit = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );

        Ok(Self {
            window,
            surface,
            device,
            queue,
            config,
            renderer,
            egui_winit,
            egui_renderer,
        })
    }

    fn aspect(&self) -> f32 {
        self.config.width as f32 / self.config.height.max(1) as f32
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.device, &self.config);
        self.renderer
            .resize(&self.device, self.config.width, self.config.height);
    }

    /// Lock and hide the cursor for mouse look, or give it back.
    fn grab_cursor(&self, grab: bool) {
        if grab {
            let grabbed = self
                .window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                tracing::warn!("cursor grab unavailable: {e}");
            }
        } else if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
            tracing::warn!("failed to release cursor: {e}");
        }
        self.window.set_cursor_visible(!grab);
    }

    fn paint_egui(
        &mut self,
        egui_ctx: &EguiContext,
        full_output: egui::FullOutput,
        view: &wgpu::TextureView,
    ) {
        self.egui_winit
            .handle_platform_output(&self.window, full_output.platform_output);

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.device, &self.queue, *id, image_delta);
        }
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("egui_encoder"),
            });
        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );
        {
            let mut pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("egui_pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    ..Default::default()
                })
                .forget_lifetime();
            self.egui_renderer
                .render(&mut pass, &paint_jobs, &screen_descriptor);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
    }
}

struct MazeApp {
    assets: Assets,
    size: PhysicalSize<u32>,
    input: InputController,
    egui_ctx: EguiContext,
    gpu: Option<Gpu>,
    sim: Option<Simulation>,
    cursor_grabbed: bool,
    error: Option<anyhow::Error>,
}

impl MazeApp {
    fn new(assets: Assets, size: PhysicalSize<u32>) -> Self {
        let input = InputController::from_config(&assets.config);
        Self {
            assets,
            size,
            input,
            egui_ctx: EguiContext::default(),
            gpu: None,
            sim: None,
            cursor_grabbed: false,
            error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let gpu = Gpu::new(event_loop, self.size, &self.assets, &self.egui_ctx)?;

        let player = Player::spawn(Arc::clone(&self.assets.map))
            .with_tilt_limit(self.assets.config.tilt_limit);
        let sim = Simulation::spawn(player, &self.assets.config)
            .context("failed to start simulation")?;

        gpu.grab_cursor(true);
        self.cursor_grabbed = true;
        self.gpu = Some(gpu);
        self.sim = Some(sim);
        Ok(())
    }

    fn set_cursor_grab(&mut self, grab: bool) {
        if let Some(gpu) = &self.gpu {
            gpu.grab_cursor(grab);
            self.cursor_grabbed = grab;
        }
    }

    /// Queue an action for the simulation. A closed queue ends the session.
    fn dispatch(&mut self, event_loop: &ActiveEventLoop, action: Action) {
        let Some(sim) = &self.sim else {
            return;
        };
        if let Err(e) = sim.send(action) {
            tracing::error!("action queue closed: {e}");
            self.stop(event_loop);
        }
    }

    /// Join the simulation thread and leave the event loop.
    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(sim) = self.sim.take() {
            match sim.shutdown() {
                Ok(player) => {
                    let pose = player.pose();
                    tracing::info!(
                        x = pose.position.x,
                        y = pose.position.y,
                        dir = pose.dir,
                        tilt = pose.tilt,
                        "final pose"
                    );
                }
                Err(e) if self.error.is_none() => {
                    self.error = Some(anyhow::Error::new(e).context("simulation failed"));
                }
                Err(e) => tracing::error!("simulation failed: {e}"),
            }
        }
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode, pressed: bool) {
        if key == KeyCode::Escape {
            if pressed && self.cursor_grabbed {
                self.set_cursor_grab(false);
            }
            return;
        }
        if let Some(action) = self.input.key(key, pressed) {
            self.dispatch(event_loop, action);
        }
    }

    fn redraw(&mut self) {
        let (Some(gpu), Some(sim)) = (&mut self.gpu, &self.sim) else {
            return;
        };
        let pose = sim.pose();

        let output = match gpu.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                gpu.surface.configure(&gpu.device, &gpu.config);
                return;
            }
            Err(e) => {
                tracing::error!("surface error: {e}");
                return;
            }
        };
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let camera = Camera::from_pose(&pose, gpu.aspect());
        gpu.renderer.render(&gpu.device, &gpu.queue, &view, &camera);

        let raw_input = gpu.egui_winit.take_egui_input(&gpu.window);
        let minimap = &self.assets.minimap;
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            overlay::draw_minimap(ctx, minimap, &pose);
        });
        gpu.paint_egui(&self.egui_ctx, full_output, &view);

        output.present();
        gpu.window.request_redraw();
    }

    /// Surface any error captured inside the event loop.
    fn finish(mut self) -> Result<()> {
        if let Some(sim) = self.sim.take() {
            sim.shutdown().context("simulation failed")?;
        }
        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for MazeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() || self.error.is_some() {
            return;
        }
        if let Err(e) = self.start(event_loop) {
            self.error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if let Some(gpu) = &mut self.gpu {
            let response = gpu.egui_winit.on_window_event(&gpu.window, &event);
            if response.consumed {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => {
                self.stop(event_loop);
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::Focused(false) => {
                let action = self.input.release_all();
                self.dispatch(event_loop, action);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                self.handle_key(event_loop, key, key_state == ElementState::Pressed);
            }
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state: ElementState::Pressed,
                ..
            } if !self.cursor_grabbed => {
                self.set_cursor_grab(true);
            }
            WindowEvent::RedrawRequested => {
                self.redraw();
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _device_id: winit::event::DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if !self.cursor_grabbed {
                return;
            }
            if let Some(action) = self.input.mouse_motion(delta.0, delta.1) {
                self.dispatch(event_loop, action);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &self.gpu {
            gpu.window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("mazeview-desktop starting");

    let assets = Assets::load(&cli)?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = MazeApp::new(assets, PhysicalSize::new(cli.width, cli.height));
    event_loop.run_app(&mut app)?;

    app.finish()
}
