// SPDX-License-Identifier: MIT OR Apache-2.0
//! Main viewer application setup and event loop.

use crate::panel_types::PanelType;
use crate::panels::console::TracingEvent;
use crate::panels::{CanvasAction, CanvasPanel, ConsolePanel, ExplorerPanel};
use egui_dock::{DockArea, DockState, NodeIndex, Style, TabViewer};
use egui_wgpu::wgpu;
use rive_viewer_bindings::config::{ViewerConfig, CONFIG_FILE_NAME};
use rive_viewer_bindings::controls::ControlEdit;
use rive_viewer_bindings::memory::MemoryRuntime;
use rive_viewer_bindings::registry::looks_like_animation_file;
use rive_viewer_bindings::session::{LoadOutcome, ViewerSession};
use rive_viewer_bindings::ui::draw_control_panel;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Viewer application errors
#[derive(Debug, Error)]
pub enum AppError {
    /// Window creation failed
    #[error("Failed to create window: {0}")]
    WindowCreation(String),

    /// Renderer initialization failed
    #[error("Failed to initialize renderer: {0}")]
    RendererInit(String),

    /// Event loop error
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// Result type for application operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Tab viewer implementation for `egui_dock`
struct ViewerTabViewer<'a> {
    session: &'a mut ViewerSession,
    canvas: &'a mut CanvasPanel,
    explorer: &'a mut ExplorerPanel,
    console: &'a mut ConsolePanel,
    /// Control edits raised this frame
    edits: &'a mut Vec<ControlEdit>,
    /// Canvas requests raised this frame
    canvas_actions: &'a mut Vec<CanvasAction>,
}

impl<'a> TabViewer for ViewerTabViewer<'a> {
    type Tab = PanelType;

    fn title(&mut self, tab: &mut Self::Tab) -> egui::WidgetText {
        format!("{} {}", tab.icon(), tab.name()).into()
    }

    fn ui(&mut self, ui: &mut egui::Ui, tab: &mut Self::Tab) {
        match tab {
            PanelType::Canvas => {
                let actions = self.canvas.ui(ui, self.session);
                self.canvas_actions.extend(actions);
            }
            PanelType::Controls => {
                let edits = draw_control_panel(ui, self.session.panel_mut());
                self.edits.extend(edits);
            }
            PanelType::Explorer => self.explorer.ui(ui, self.session),
            PanelType::Console => self.console.ui(ui, self.session),
        }
    }

    fn closeable(&mut self, tab: &mut Self::Tab) -> bool {
        *tab != PanelType::Canvas
    }
}

/// Graphics state for wgpu rendering
struct GraphicsState {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    egui_renderer: egui_wgpu::Renderer,
}

impl GraphicsState {
    fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::PRIMARY,
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .map_err(|e| AppError::RendererInit(e.to_string()))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .ok_or_else(|| AppError::RendererInit("no suitable GPU adapter".to_string()))?;

        tracing::info!("Using GPU: {}", adapter.get_info().name);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("Rive Viewer Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            },
            None,
        ))
        .map_err(|e| AppError::RendererInit(e.to_string()))?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(wgpu::TextureFormat::is_srgb)
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| AppError::RendererInit("surface has no formats".to_string()))?;
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

        let egui_renderer = egui_wgpu::Renderer::new(&device, surface_format, None, 1, false);

        Ok(Self {
            surface,
            device,
            queue,
            config,
            egui_renderer,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);
        }
    }

    fn render(
        &mut self,
        egui_ctx: &egui::Context,
        full_output: egui::FullOutput,
        window: &Window,
    ) -> std::result::Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output.texture.create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Viewer Encoder"),
        });

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.config.width, self.config.height],
            pixels_per_point: window.scale_factor() as f32,
        };

        let paint_jobs = egui_ctx.tessellate(full_output.shapes, full_output.pixels_per_point);

        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui_renderer.update_texture(&self.device, &self.queue, *id, image_delta);
        }

        self.egui_renderer.update_buffers(
            &self.device,
            &self.queue,
            &mut encoder,
            &paint_jobs,
            &screen_descriptor,
        );

        {
            let mut render_pass = encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Viewer Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(wgpu::Color {
                                r: 0.1,
                                g: 0.1,
                                b: 0.1,
                                a: 1.0,
                            }),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                })
                .forget_lifetime();

            self.egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }

        Ok(())
    }
}

/// Running state of the viewer
struct ViewerRunning {
    window: Arc<Window>,
    graphics: GraphicsState,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    viewer: ViewerInner,
}

/// Session, layout and panels
struct ViewerInner {
    session: ViewerSession,
    dock_state: DockState<PanelType>,
    canvas: CanvasPanel,
    explorer: ExplorerPanel,
    console: ConsolePanel,
    /// File of the current animation
    current_path: Option<PathBuf>,
    /// Where settings are read from and saved to
    config_path: PathBuf,
    /// Whether the app should exit
    request_exit: bool,
}

impl ViewerInner {
    fn new(tracing_rx: Option<mpsc::Receiver<TracingEvent>>) -> Self {
        let config_path = PathBuf::from(CONFIG_FILE_NAME);
        let config = ViewerConfig::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Ignoring {}: {e}", config_path.display());
            ViewerConfig::default()
        });

        Self {
            session: ViewerSession::new(config),
            dock_state: Self::create_default_layout(),
            canvas: CanvasPanel::new(),
            explorer: ExplorerPanel::new(),
            console: ConsolePanel::with_tracing_receiver(tracing_rx),
            current_path: None,
            config_path,
            request_exit: false,
        }
    }

    fn create_default_layout() -> DockState<PanelType> {
        let mut dock_state = DockState::new(vec![PanelType::Canvas]);
        let surface = dock_state.main_surface_mut();

        // Controls on the right
        let [center, _right] = surface.split_right(NodeIndex::root(), 0.62, vec![PanelType::Controls]);

        // Explorer and Console below the canvas
        let [_top, _bottom] = surface.split_below(center, 0.68, vec![PanelType::Console, PanelType::Explorer]);

        dock_state
    }

    /// Load an animation file and hand it to the session.
    ///
    /// The session may ask for one reload after filling in the state-machine
    /// selection; the file is instantiated again in that case.
    fn open_file(&mut self, path: &Path) {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        tracing::info!("Opening {}", path.display());
        self.session.load_started(name);
        self.current_path = Some(path.to_path_buf());

        for _ in 0..2 {
            let runtime = match MemoryRuntime::load(path) {
                Ok(runtime) => runtime,
                Err(e) => {
                    tracing::error!("Failed to load {}: {e}", path.display());
                    self.session.cleanup();
                    self.current_path = None;
                    return;
                }
            };

            match self.session.loaded(Rc::new(runtime), Instant::now()) {
                LoadOutcome::Ready { .. } => return,
                LoadOutcome::ReloadRequested { state_machine } => {
                    tracing::debug!("Reloading {} with state machine {state_machine}", path.display());
                }
            }
        }
        tracing::warn!("{} did not settle after a reload", path.display());
    }

    fn reload(&mut self) {
        if let Some(path) = self.current_path.clone() {
            self.open_file(&path);
        }
    }

    fn unload(&mut self) {
        self.session.cleanup();
        self.current_path = None;
    }

    fn save_settings(&self) {
        match self.session.config().save(&self.config_path) {
            Ok(()) => tracing::info!("Settings saved to {}", self.config_path.display()),
            Err(e) => tracing::error!("Failed to save settings: {e}"),
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped: Vec<PathBuf> = ctx.input(|i| {
            i.raw
                .dropped_files
                .iter()
                .filter_map(|file| file.path.clone())
                .filter(|path| looks_like_animation_file(&path.to_string_lossy()))
                .collect()
        });
        if let Some(path) = dropped.last() {
            self.open_file(path);
        }
    }

    fn update(&mut self, ctx: &egui::Context) {
        self.session.tick(Instant::now());
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                self.file_menu(ui);
                self.view_menu(ui);

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(egui::RichText::new(self.session.config().runtime.name()).weak());
                });
            });
        });

        let mut edits = Vec::new();
        let mut canvas_actions = Vec::new();
        let mut tab_viewer = ViewerTabViewer {
            session: &mut self.session,
            canvas: &mut self.canvas,
            explorer: &mut self.explorer,
            console: &mut self.console,
            edits: &mut edits,
            canvas_actions: &mut canvas_actions,
        };

        DockArea::new(&mut self.dock_state)
            .style(Style::from_egui(ctx.style().as_ref()))
            .show(ctx, &mut tab_viewer);

        for edit in edits {
            if let Err(e) = self.session.apply_edit(edit) {
                tracing::warn!("{e}");
            }
        }

        for action in canvas_actions {
            match action {
                CanvasAction::Open(path) => self.open_file(&path),
                CanvasAction::Reload => self.reload(),
                CanvasAction::Unload => self.unload(),
                CanvasAction::SaveSettings => self.save_settings(),
            }
        }
    }

    fn file_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("File", |ui| {
            let loaded = self.session.handle().is_some();
            if ui.add_enabled(loaded, egui::Button::new("Reload")).clicked() {
                self.reload();
                ui.close_menu();
            }
            if ui.add_enabled(loaded, egui::Button::new("Unload")).clicked() {
                self.unload();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Save Settings").clicked() {
                self.save_settings();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Quit").clicked() {
                self.request_exit = true;
                ui.close_menu();
            }
        });
    }

    fn view_menu(&mut self, ui: &mut egui::Ui) {
        ui.menu_button("View", |ui| {
            for panel in [PanelType::Canvas, PanelType::Controls, PanelType::Explorer, PanelType::Console] {
                if ui.button(format!("{} {}", panel.icon(), panel.name())).clicked() {
                    self.open_panel(panel);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("Refresh Controls").clicked() {
                self.session.refresh(Instant::now());
                ui.close_menu();
            }
        });
    }

    fn open_panel(&mut self, panel: PanelType) {
        if let Some((surface, node, tab)) = self.dock_state.find_tab(&panel) {
            self.dock_state.set_active_tab((surface, node, tab));
            self.dock_state.set_focused_node_and_surface((surface, node));
        } else {
            self.dock_state.push_to_focused_leaf(panel);
        }
    }
}

/// Main viewer application
pub struct ViewerApp {
    running: Option<ViewerRunning>,
    /// Tracing receiver passed to the console panel on first resume
    tracing_rx: Option<mpsc::Receiver<TracingEvent>>,
    /// File opened once the window is up
    initial_file: Option<PathBuf>,
}

impl ViewerApp {
    /// Create a viewer that opens `initial_file` on start
    pub fn new(tracing_rx: Option<mpsc::Receiver<TracingEvent>>, initial_file: Option<PathBuf>) -> Self {
        Self {
            running: None,
            tracing_rx,
            initial_file,
        }
    }

    /// Run the viewer until the window closes
    pub fn run(tracing_rx: Option<mpsc::Receiver<TracingEvent>>, initial_file: Option<PathBuf>) -> Result<()> {
        let event_loop = EventLoop::new()?;
        event_loop.set_control_flow(ControlFlow::Poll);

        let mut app = ViewerApp::new(tracing_rx, initial_file);
        event_loop.run_app(&mut app)?;

        Ok(())
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<ViewerRunning> {
        let window_attrs = Window::default_attributes()
            .with_title("Rive Viewer")
            .with_inner_size(winit::dpi::LogicalSize::new(1400, 860))
            .with_min_inner_size(winit::dpi::LogicalSize::new(720, 480));

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .map_err(|e| AppError::WindowCreation(e.to_string()))?,
        );

        tracing::info!("Initializing graphics...");
        let graphics = GraphicsState::new(window.clone())?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui_ctx.viewport_id(),
            &window,
            Some(window.scale_factor() as f32),
            None,
            Some(2 * 1024), // max texture side
        );

        let mut viewer = ViewerInner::new(self.tracing_rx.take());
        if let Some(path) = self.initial_file.take() {
            viewer.open_file(&path);
        }

        Ok(ViewerRunning {
            window,
            graphics,
            egui_ctx,
            egui_state,
            viewer,
        })
    }
}

impl ApplicationHandler for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.running.is_some() {
            return;
        }

        tracing::info!("Creating viewer window...");
        match self.start(event_loop) {
            Ok(running) => {
                tracing::info!("Window size: {:?}", running.window.inner_size());
                self.running = Some(running);
            }
            Err(e) => {
                tracing::error!("{e}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        let Some(running) = &mut self.running else {
            return;
        };

        let response = running.egui_state.on_window_event(&running.window, &event);
        if response.consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting...");
                running.viewer.session.cleanup();
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                tracing::debug!("Window resized to {:?}", new_size);
                running.graphics.resize(new_size);
                running.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                let raw_input = running.egui_state.take_egui_input(&running.window);
                let full_output = running.egui_ctx.run(raw_input, |ctx| {
                    running.viewer.update(ctx);
                });

                if running.viewer.request_exit {
                    running.viewer.session.cleanup();
                    event_loop.exit();
                    return;
                }

                running
                    .egui_state
                    .handle_platform_output(&running.window, full_output.platform_output.clone());

                match running.graphics.render(&running.egui_ctx, full_output, &running.window) {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        let size = running.window.inner_size();
                        running.graphics.resize(size);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        tracing::error!("Out of GPU memory!");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        tracing::warn!("Surface timeout");
                    }
                }

                running.window.request_redraw();
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}
