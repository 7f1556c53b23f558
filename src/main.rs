mod icon;
mod input;
mod overlay;
mod render;
mod state;

use crate::state::State;
use conway_life::config::Config;
use conway_life::error::StartupError;
use conway_life::patterns::PatternLibrary;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use winit::{
    dpi::PhysicalSize,
    event::{Event, KeyEvent, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    keyboard::PhysicalKey,
    window::{Window, WindowBuilder},
};

async fn run(
    event_loop: EventLoop<()>,
    window: Arc<Window>,
    settings: Config,
    patterns: PatternLibrary,
) -> Result<(), StartupError> {
    let mut state = State::new(window, settings, patterns).await?;
    let frame_interval = state
        .settings
        .display
        .framerate
        .map(|fps| Duration::from_secs_f64(1.0 / f64::from(fps)));
    let mut next_frame = Instant::now();

    event_loop.run(move |event, window_target| {
        match event {
            Event::WindowEvent { window_id, ref event } if window_id == state.window.id() => {
                // egui sees every window event first
                let response = state.egui_winit_state.on_window_event(&state.window, event);
                let consumed_by_egui =
                    response.consumed && !matches!(event, WindowEvent::Resized(_));
                if consumed_by_egui {
                    return;
                }

                match event {
                    WindowEvent::CloseRequested => {
                        log::info!("Window closed");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        state.resize(*new_size);
                    }
                    WindowEvent::KeyboardInput {
                        event:
                            KeyEvent {
                                physical_key: PhysicalKey::Code(code),
                                state: element_state,
                                repeat,
                                ..
                            },
                        ..
                    } => {
                        input::handle_key(&mut state, *code, *element_state, *repeat);
                    }
                    WindowEvent::MouseInput { state: element_state, button, .. } => {
                        input::handle_mouse_input(&mut state, *button, *element_state);
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        input::handle_cursor_move(&mut state, *position);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input::handle_cursor_left(&mut state);
                    }
                    WindowEvent::MouseWheel { delta, .. } => {
                        let scroll_amount = match delta {
                            MouseScrollDelta::LineDelta(_, y) => *y,
                            MouseScrollDelta::PixelDelta(pos) => (pos.y / 20.0) as f32,
                        };
                        if scroll_amount != 0.0 {
                            input::handle_zoom(&mut state, scroll_amount);
                        }
                    }
                    WindowEvent::RedrawRequested => {
                        let output_frame = match state.update_and_render() {
                            Ok(frame) => frame,
                            Err(err) => {
                                log::warn!("Skipping frame due to surface {:?}", err);
                                state.window.request_redraw();
                                return;
                            }
                        };
                        overlay::render(&mut state, &output_frame);
                        output_frame.present();
                    }
                    _ => (),
                }
            }
            Event::AboutToWait => match frame_interval {
                None => {
                    window_target.set_control_flow(ControlFlow::Poll);
                    state.window.request_redraw();
                }
                Some(interval) => {
                    let now = Instant::now();
                    if now >= next_frame {
                        state.window.request_redraw();
                        next_frame = now + interval;
                    }
                    window_target.set_control_flow(ControlFlow::WaitUntil(next_frame));
                }
            },
            _ => (),
        }
    })?;
    Ok(())
}

fn start() -> Result<(), StartupError> {
    let settings = Config::load()?;
    let folder = settings.patterns.folder.clone();
    let patterns = PatternLibrary::open(&folder)
        .map_err(|source| StartupError::Patterns { folder, source })?;

    let event_loop = EventLoop::new()?;
    let (width, height) = settings.display.window_size;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Conway's Game of Life")
            .with_inner_size(PhysicalSize::new(width, height))
            .with_window_icon(icon::window_icon(&settings.icon))
            .build(&event_loop)?,
    );

    pollster::block_on(run(event_loop, window, settings, patterns))
}

fn main() -> ExitCode {
    env_logger::init();
    match start() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
