use crate::input::{Action, InputState};
use crate::overlay::{DebugInfo, FrameCounter, Info};
use crate::render::{pack_cells, GridRenderer, RenderParams, CANDIDATE};
use conway_life::config::Config;
use conway_life::error::StartupError;
use conway_life::patterns::{self, PatternLibrary};
use conway_life::view::Viewport;
use conway_life::{Conway, Grid, Position};
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;
use winit::{dpi::PhysicalSize, window::Window};

use egui::Context as EguiContext;
use egui_wgpu::Renderer as EguiWgpuRenderer;
use egui_winit::State as EguiWinitState;

pub struct State {
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub size: PhysicalSize<u32>,
    pub window: Arc<Window>,
    pub renderer: GridRenderer,

    // --- Game ---
    pub settings: Config,
    pub conway: Conway,
    pub patterns: PatternLibrary,
    /// Offsets of the selected pattern, or empty if it failed to load.
    pub pattern: Rc<[Position]>,
    pub running: bool,
    pub debug: bool,
    pub candidates: usize,

    pub viewport: Viewport,
    pub input: InputState,
    pub frames: FrameCounter,

    // GUI state
    pub egui_ctx: EguiContext,
    pub egui_winit_state: EguiWinitState,
    pub egui_renderer: EguiWgpuRenderer,
}

impl State {
    pub async fn new(
        window: Arc<Window>,
        settings: Config,
        patterns: PatternLibrary,
    ) -> Result<Self, StartupError> {
        let size = window.inner_size();
        let width = size.width.max(1);
        let height = size.height.max(1);

        log::info!("Initializing wgpu...");

        let instance = wgpu::Instance::default();
        let surface = instance.create_surface(window.clone())?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(&surface),
            })
            .await
            .ok_or(StartupError::NoAdapter)?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                },
                None,
            )
            .await?;

        // Palette colours are linear, so prefer an sRGB target.
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|format| format.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or(StartupError::NoAdapter)?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width,
            height,
            present_mode: surface_caps.present_modes[0],
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let cell_size = settings.display.cell_size;
        let shape = Grid::shape_for_window((size.width, size.height), cell_size);
        let conway = Conway::new(shape);
        log::info!("Board is {}x{} cells", shape.0, shape.1);

        let renderer =
            GridRenderer::new(&device, surface_format, &settings.palette, conway.grid().area());
        let viewport = Viewport::new(&settings.zoom, cell_size, (size.width, size.height), shape);
        let input = InputState::new(settings.keybinds.clone(), settings.event.clone());

        log::info!("Initializing egui...");
        let egui_ctx = EguiContext::default();
        let mut style = (*egui_ctx.style()).clone();
        style
            .text_styles
            .insert(egui::TextStyle::Monospace, egui::FontId::monospace(settings.font.size));
        egui_ctx.set_style(style);
        let egui_winit_state =
            EguiWinitState::new(egui_ctx.clone(), egui_ctx.viewport_id(), &window, None, None);
        let egui_renderer = EguiWgpuRenderer::new(&device, config.format, None, 1);
        log::info!("wgpu and egui initialized");

        let mut state = Self {
            surface,
            device,
            queue,
            config,
            size,
            window,
            renderer,
            settings,
            conway,
            patterns,
            pattern: Rc::from(Vec::new()),
            running: false,
            debug: false,
            candidates: 0,
            viewport,
            input,
            frames: FrameCounter::default(),
            egui_ctx,
            egui_winit_state,
            egui_renderer,
        };
        state.refresh_pattern();
        Ok(state)
    }

    pub fn resize(&mut self, new_size: PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            self.surface.configure(&self.device, &self.config);

            let window = (new_size.width, new_size.height);
            let shape = Grid::shape_for_window(window, self.settings.display.cell_size);
            self.conway.resize(shape);
            self.viewport.set_window(window, shape);

            log::info!(
                "Resized board to {}x{} cells for a {}x{} window",
                shape.0, shape.1, new_size.width, new_size.height
            );
        } else {
            log::warn!(
                "Ignoring resize to zero dimensions: {}x{}",
                new_size.width, new_size.height
            );
        }
    }

    /// Reloads the offsets of the selected pattern.
    /// A broken file is logged and previews as nothing.
    pub fn refresh_pattern(&mut self) {
        self.pattern = match self.patterns.parse() {
            Ok(pattern) => pattern,
            Err(err) => {
                let name = self.patterns.selected().unwrap_or_default();
                log::warn!("Unable to load pattern {:?}: {}", name, err);
                Rc::from(Vec::new())
            }
        };
    }

    pub fn cursor_cell(&self) -> Option<Position> {
        self.input
            .cursor
            .map(|pos| self.viewport.screen_to_cell((pos.x, pos.y)))
    }

    /// Cell the pattern preview is anchored to.
    pub fn highlight_cell(&self) -> Option<Position> {
        self.input.highlight.cell().or_else(|| self.cursor_cell())
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::TogglePause => {
                self.running = !self.running;
                log::info!("{}", if self.running { "Running" } else { "Paused" });
            }
            Action::Step => self.conway.update(),
            Action::Reset => {
                self.conway.reset();
                log::info!("Board reset");
            }
            Action::PlaceAt(cell) => match self.patterns.placement(cell) {
                Ok(cells) => self.conway.toggle(cells),
                Err(err) => log::warn!("Unable to place pattern at {:?}: {}", cell, err),
            },
            Action::SelectNext => {
                self.patterns.rotate(1);
                self.refresh_pattern();
            }
            Action::SelectPrevious => {
                self.patterns.rotate(-1);
                self.refresh_pattern();
            }
            Action::ToggleDebug => self.debug = !self.debug,
        }
    }

    pub fn overlay_info(&self) -> Info<'_> {
        let grid = self.conway.grid();
        Info {
            fps: self.frames.fps(),
            alive: grid.alive_count(),
            generation: self.conway.generation(),
            file: self.patterns.selected(),
            running: self.running,
            debug: self.debug.then(|| DebugInfo {
                grid: grid.shape(),
                rule: self.conway.rules().notation(),
                zoom: self.viewport.zoom(),
                candidates: self.candidates,
                pointer: format!("{:?}", self.input.pointer),
                highlight: format!("{:?}", self.input.highlight.cell()),
            }),
        }
    }

    /// Advances the board if running and draws it.
    /// The frame is returned unpresented so the overlay can draw on top.
    pub fn update_and_render(&mut self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        let now = Instant::now();
        self.frames.tick(now);
        if let Some(action) = self.input.tick(now) {
            self.apply(action);
        }
        if self.running {
            self.conway.update();
        }

        let highlight: Vec<Position> = match self.highlight_cell() {
            Some(cell) => patterns::translate(&self.pattern, cell).collect(),
            None => Vec::new(),
        };
        let cells = pack_cells(self.conway.grid(), &highlight, self.debug);
        if self.debug {
            self.candidates = cells.iter().filter(|&&flags| flags & CANDIDATE != 0).count();
        }
        let params = RenderParams::new(
            self.viewport.offset(),
            self.viewport.zoom(),
            self.viewport.cell_size(),
            self.conway.grid().shape(),
            self.debug,
        );
        self.renderer.upload(&self.device, &self.queue, &params, &cells);

        let output_frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(wgpu::SurfaceError::Lost) => {
                log::warn!("Surface lost, reconfiguring...");
                self.surface.configure(&self.device, &self.config);
                return Err(wgpu::SurfaceError::Lost);
            }
            Err(e) => {
                log::error!("Unable to acquire the next frame: {:?}", e);
                return Err(e);
            }
        };

        let output_view = output_frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut render_encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = render_encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &output_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.renderer.draw(&mut render_pass);
        }
        self.queue.submit(Some(render_encoder.finish()));

        Ok(output_frame)
    }
}
