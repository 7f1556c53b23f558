use crate::state::State;
use std::time::{Duration, Instant};

/// Smoothed frames per second.
#[derive(Debug, Default)]
pub struct FrameCounter {
    last: Option<Instant>,
    fps: f32,
}

impl FrameCounter {
    const SMOOTHING: f32 = 0.1;

    pub fn tick(&mut self, now: Instant) {
        if let Some(last) = self.last.replace(now) {
            let elapsed = now.saturating_duration_since(last);
            if elapsed > Duration::ZERO {
                let sample = 1.0 / elapsed.as_secs_f32();
                self.fps = if self.fps == 0.0 {
                    sample
                } else {
                    self.fps + (sample - self.fps) * Self::SMOOTHING
                };
            }
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }
}

pub struct DebugInfo {
    pub grid: (u32, u32),
    pub rule: String,
    pub zoom: f32,
    pub candidates: usize,
    pub pointer: String,
    pub highlight: String,
}

/// Everything the info panel shows for one frame.
pub struct Info<'a> {
    pub fps: f32,
    pub alive: usize,
    pub generation: u64,
    pub file: Option<&'a str>,
    pub running: bool,
    pub debug: Option<DebugInfo>,
}

pub fn info_lines(info: &Info) -> Vec<String> {
    let fps = if info.fps > 0.0 {
        format!("FPS   | {:.0} ({:.2}ms)", info.fps, 1000.0 / info.fps)
    } else {
        "FPS   | --".to_string()
    };
    let mut lines = vec![
        fps,
        format!("Alive | {} (Gen #{})", info.alive, info.generation),
        format!("File  | {}", info.file.unwrap_or("<none>")),
    ];
    if let Some(debug) = &info.debug {
        lines.push(format!("Grid  | {}x{}", debug.grid.0, debug.grid.1));
        lines.push(format!("Rule  | {}", debug.rule));
        lines.push(format!("Zoom  | {:.2}", debug.zoom));
        lines.push(format!("Cands | {}", debug.candidates));
        lines.push(format!("Mouse | {}", debug.pointer));
        lines.push(format!("Focus | {}", debug.highlight));
    }
    lines.push(if info.running { " >>> Running" } else { " >>> Paused" }.to_string());
    lines
}

/// Draws the info panel over the board frame.
pub fn render(state: &mut State, output_frame: &wgpu::SurfaceTexture) {
    let lines = info_lines(&state.overlay_info());
    let colour = state.settings.font.colour.to_egui();

    let output_view = output_frame
        .texture
        .create_view(&wgpu::TextureViewDescriptor::default());

    let raw_input = state.egui_winit_state.take_egui_input(&state.window);
    state.egui_ctx.begin_frame(raw_input);

    egui::Area::new(egui::Id::new("info_area"))
        .anchor(egui::Align2::LEFT_TOP, egui::vec2(10.0, 10.0))
        .interactable(false)
        .show(&state.egui_ctx, |ui| {
            for line in &lines {
                ui.label(egui::RichText::new(line).monospace().color(colour));
            }
        });

    let full_output = state.egui_ctx.end_frame();
    let pixels_per_point = state.window.scale_factor() as f32;
    let paint_jobs = state.egui_ctx.tessellate(full_output.shapes, pixels_per_point);
    let screen_descriptor = egui_wgpu::ScreenDescriptor {
        size_in_pixels: [state.config.width, state.config.height],
        pixels_per_point,
    };

    let mut encoder = state.device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("egui Encoder"),
    });
    for (id, image_delta) in &full_output.textures_delta.set {
        state.egui_renderer.update_texture(&state.device, &state.queue, *id, image_delta);
    }
    let user_buffers = state.egui_renderer.update_buffers(
        &state.device,
        &state.queue,
        &mut encoder,
        &paint_jobs,
        &screen_descriptor,
    );
    state
        .egui_winit_state
        .handle_platform_output(&state.window, full_output.platform_output);

    {
        let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("egui Render Pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &output_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Load, // keep the board underneath
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
        });
        state.egui_renderer.render(&mut render_pass, &paint_jobs, &screen_descriptor);
    }

    for id in &full_output.textures_delta.free {
        state.egui_renderer.free_texture(id);
    }
    state
        .queue
        .submit(user_buffers.into_iter().chain(Some(encoder.finish())));
}
