use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use super::input::ActionStates;
use super::rendering::{pixels_per_world, view_size_world, TilePalette, TilesetAtlas, TilesetConfig};
use super::scene::{SceneLoadError, SceneRuntime};
use super::{InputAction, InputSnapshot, Renderer, Scene, SceneCommand, SceneWorld};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    pub max_frame_delta: Duration,
    pub max_ticks_per_frame: u32,
    /// Drawn from the atlas when present, otherwise from `palette`.
    pub tileset: Option<TilesetConfig>,
    pub palette: TilePalette,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Delve".to_string(),
            window_width: 1280,
            window_height: 720,
            target_tps: 60,
            max_frame_delta: Duration::from_millis(250),
            max_ticks_per_frame: 5,
            tileset: None,
            palette: TilePalette::default(),
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
    #[error(transparent)]
    SceneLoad(#[from] SceneLoadError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, scene: Box<dyn Scene>) -> Result<(), AppError> {
    let mut runtime = SceneRuntime::new(scene);

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );

    let tileset = config.tileset.as_ref().and_then(|tileset_config| {
        match TilesetAtlas::load(tileset_config) {
            Ok(atlas) => {
                info!(
                    path = %tileset_config.path.display(),
                    tiles = atlas.tile_count(),
                    "tileset_loaded"
                );
                Some(atlas)
            }
            Err(error) => {
                warn!(error = %error, "tileset_unavailable_using_palette");
                None
            }
        }
    });
    let mut renderer = Renderer::new(Arc::clone(&window), tileset, config.palette.clone())
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let target_tps = config.target_tps.max(1);
    let max_frame_delta =
        normalize_non_zero_duration(config.max_frame_delta, Duration::from_millis(250));
    let max_ticks_per_frame = config.max_ticks_per_frame.max(1);
    let fixed_dt = Duration::from_secs_f64(1.0 / target_tps as f64);
    let fixed_dt_seconds = fixed_dt.as_secs_f32();

    sync_view_size(runtime.world_mut(), &renderer);
    runtime.load()?;
    info!(
        scene = runtime.scene_name(),
        entity_count = runtime.world().entity_count(),
        "scene_loaded"
    );
    info!(
        target_tps,
        max_frame_delta_ms = max_frame_delta.as_millis() as u64,
        max_ticks_per_frame,
        "loop_config"
    );

    let fatal: Rc<RefCell<Option<AppError>>> = Rc::new(RefCell::new(None));
    let fatal_in_loop = Rc::clone(&fatal);
    let mut input_collector = InputCollector::default();
    let mut accumulator = Duration::ZERO;
    let mut last_frame_instant = Instant::now();
    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    input_collector.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                    window_target.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = renderer.resize(size.width, size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    input_collector.handle_key(event.physical_key, event.state);
                    if input_collector.quit_requested {
                        info!(reason = "escape_key", "shutdown_requested");
                        window_target.exit();
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let raw_frame_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;
                    accumulator =
                        accumulator.saturating_add(clamp_frame_delta(raw_frame_dt, max_frame_delta));

                    sync_view_size(runtime.world_mut(), &renderer);
                    let step_plan = plan_sim_steps(accumulator, fixed_dt, max_ticks_per_frame);
                    for _ in 0..step_plan.ticks_to_run {
                        let input_snapshot = input_collector.snapshot_for_tick();
                        match runtime.update(fixed_dt_seconds, &input_snapshot) {
                            SceneCommand::None => {}
                            SceneCommand::Rebuild => {
                                if let Err(load_error) = runtime.rebuild() {
                                    error!(error = %load_error, "scene_rebuild_failed");
                                    *fatal_in_loop.borrow_mut() = Some(load_error.into());
                                    window_target.exit();
                                    return;
                                }
                                info!(
                                    scene = runtime.scene_name(),
                                    entity_count = runtime.world().entity_count(),
                                    "scene_rebuilt"
                                );
                            }
                        }
                    }
                    accumulator = step_plan.remaining_accumulator;

                    if step_plan.dropped_backlog > Duration::ZERO {
                        warn!(
                            dropped_backlog_ms = step_plan.dropped_backlog.as_millis() as u64,
                            max_ticks_per_frame, "sim_clamp_triggered"
                        );
                    }

                    if let Err(error) = renderer.render_world(runtime.world()) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                    }

                    let next_title = runtime.world().title().map(str::to_owned);
                    if next_title != last_applied_title {
                        window.set_title(next_title.as_deref().unwrap_or(&config.window_title));
                        last_applied_title = next_title;
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                runtime.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)?;

    let fatal_error = fatal.borrow_mut().take();
    match fatal_error {
        Some(error) => Err(error),
        None => Ok(()),
    }
}

fn sync_view_size(world: &mut SceneWorld, renderer: &Renderer) {
    let tile_size_px = world.tile_grid().map_or(1, |grid| grid.tile_size_px());
    let ppw = pixels_per_world(tile_size_px, world.camera());
    world.set_view_size(view_size_world(renderer.viewport(), ppw));
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_key(&mut self, key: PhysicalKey, state: ElementState) {
        let is_pressed = state == ElementState::Pressed;
        let action = match key {
            PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => {
                InputAction::MoveUp
            }
            PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
                InputAction::MoveDown
            }
            PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
                InputAction::MoveLeft
            }
            PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
                InputAction::MoveRight
            }
            PhysicalKey::Code(KeyCode::Escape) => {
                if is_pressed {
                    self.quit_requested = true;
                }
                InputAction::Quit
            }
            _ => return,
        };
        self.action_states.set(action, is_pressed);
    }

    fn snapshot_for_tick(&self) -> InputSnapshot {
        InputSnapshot::new(self.quit_requested, self.action_states)
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

    if accumulator >= fixed_dt {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: Duration::ZERO,
            dropped_backlog: accumulator,
        }
    } else {
        StepPlan {
            ticks_to_run,
            remaining_accumulator: accumulator,
            dropped_backlog: Duration::ZERO,
        }
    }
}

fn clamp_frame_delta(frame_dt: Duration, max_frame_delta: Duration) -> Duration {
    frame_dt.min(max_frame_delta)
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}
