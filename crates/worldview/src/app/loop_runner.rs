use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{debug, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::input::{EventDisposition, PointerEvent};
use crate::view::WorldView;
use crate::view_model::{CollaboratorError, ViewModel};

use super::input::{next_show_underlying, pointer_button, KeyCollector, PointerTranslator};
use super::rendering::Renderer;

/// Fixed-step world update driven by the windowed loop.
pub trait Simulation {
    fn advance(&mut self, dt_seconds: f32);
}

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "World View".to_string(),
            target_tps: 30,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens a window sized to the view and runs it until the window closes or Escape is pressed.
pub fn run_app<VM>(config: LoopConfig, mut view: WorldView<VM>) -> Result<(), AppError>
where
    VM: ViewModel + Simulation,
{
    let (view_width, view_height) = view.root_size();
    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(view_width as f64, view_height as f64))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let mut renderer = Renderer::new(Arc::clone(&window), view_width, view_height)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        view_width,
        view_height,
        "loop_config"
    );

    let mut pointer = PointerTranslator::new();
    let mut keys = KeyCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize_surface(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize_surface(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ModifiersChanged(modifiers) => {
                    pointer.set_shift_down(modifiers.state().shift_key());
                }
                WindowEvent::CursorMoved { position, .. } => {
                    let position = renderer.window_to_view(position.x, position.y);
                    for pointer_event in pointer.cursor_moved(position) {
                        dispatch_pointer(&mut view, &pointer_event);
                    }
                }
                WindowEvent::CursorLeft { .. } => pointer.cursor_left(),
                WindowEvent::MouseInput { state, button, .. } => {
                    let Some(button) = pointer_button(button) else {
                        return;
                    };
                    for pointer_event in pointer.button_changed(button, state) {
                        dispatch_pointer(&mut view, &pointer_event);
                    }
                }
                WindowEvent::MouseWheel { delta, .. } => {
                    let scroll = pointer.scroll(delta);
                    report_failure("scroll", view.handle_scroll(&scroll));
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    keys.handle_physical_key(event.physical_key, event.state);
                    if keys.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                    if keys.take_underlying_cycle_pressed() {
                        let next = next_show_underlying(view.options().show_underlying);
                        view.set_show_underlying(next);
                        info!(show_underlying = ?next, "show_underlying_cycled");
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    accumulator = accumulator.saturating_add(raw_frame_dt.min(max_frame_delta));

                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        view.view_model_mut().advance(fixed_dt_seconds);
                        view.pump_notifications();
                    }
                    accumulator = step_plan.remaining_accumulator;
                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    let (width, height) = view.root_size();
                    if let Err(error) = renderer.resize_buffer(width, height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                        return;
                    }
                    if let Err(error) = renderer.render(&view) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

fn dispatch_pointer<VM: ViewModel>(view: &mut WorldView<VM>, event: &PointerEvent) {
    if let Some(disposition) = report_failure("pointer", view.handle_pointer(event)) {
        if disposition == EventDisposition::Ignored {
            debug!(kind = ?event.kind, button = ?event.button, "pointer_event_ignored");
        }
    }
}

/// Collaborator failures abort only the event that triggered them.
fn report_failure<T>(source: &'static str, result: Result<T, CollaboratorError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(error) => {
            warn!(source, error = %error, "input_event_failed");
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct StepPlan {
    ticks_to_run: u32,
    remaining_accumulator: Duration,
    dropped_backlog: Duration,
}

fn plan_sim_steps(
    mut accumulator: Duration,
    fixed_dt: Duration,
    max_ticks_per_frame: u32,
) -> StepPlan {
    let mut ticks_to_run = 0u32;
    while accumulator >= fixed_dt && ticks_to_run < max_ticks_per_frame {
        accumulator = accumulator.saturating_sub(fixed_dt);
        ticks_to_run = ticks_to_run.saturating_add(1);
    }

    let dropped_backlog = if accumulator >= fixed_dt {
        std::mem::take(&mut accumulator)
    } else {
        Duration::ZERO
    };
    StepPlan {
        ticks_to_run,
        remaining_accumulator: accumulator,
        dropped_backlog,
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
