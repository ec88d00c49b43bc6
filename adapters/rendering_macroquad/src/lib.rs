#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Memory Spheres.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Enabling this crate's `audio` feature turns it
//! back on and plays synthesised tones for each cue; otherwise cues are
//! only logged.

#[cfg(feature = "audio")]
mod audio;
mod input;

pub use self::input::{
    frame_input_from_observations, pointer_to_ndc, PointerDrag, CLICK_SLOP_PIXELS,
};

use anyhow::Result;
use glam::{Vec2, Vec3};
use macroquad::math::Vec3 as MacroquadVec3;
use macroquad::{
    camera::{set_camera, set_default_camera, Camera3D},
    color::WHITE,
    input::{
        is_key_pressed, is_mouse_button_pressed, is_mouse_button_released,
        mouse_position, mouse_wheel, KeyCode, MouseButton,
    },
    models::{draw_cube, draw_sphere},
    text::draw_text,
};
use memory_spheres_rendering::{
    CameraRig, Color, FrameInput, HudPresentation, Presentation, RenderingBackend, Scene,
    SpherePresentation,
};
use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

const HUD_FONT_SIZE: f32 = 24.0;
const HUD_MARGIN: f32 = 16.0;

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    show_fps: bool,
    window_size: Option<(i32, i32)>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Configures whether the backend logs frame timing metrics once per second.
    #[must_use]
    pub fn with_show_fps(mut self, show: bool) -> Self {
        self.show_fps = show;
        self
    }

    /// Requests an initial window size in pixels.
    #[must_use]
    pub fn with_window_size(mut self, width: i32, height: i32) -> Self {
        self.window_size = Some((width, height));
        self
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct FrameBreakdown {
    frame: Duration,
    simulation: Duration,
    render: Duration,
}

/// Tracks the average frames-per-second produced by the render loop.
#[derive(Debug, Default)]
struct FpsCounter {
    elapsed: Duration,
    frames: u32,
    frame_times: VecDeque<Duration>,
    window_duration: Duration,
    simulation_accum: Duration,
    render_accum: Duration,
}

#[derive(Clone, Copy, Debug)]
struct FpsMetrics {
    per_second: f32,
    trailing_ten_seconds: f32,
    avg_simulation: Duration,
    avg_render: Duration,
}

impl FpsCounter {
    /// Records a rendered frame and returns the per-second and trailing ten-second averages once
    /// one second has elapsed.
    fn record_frame(&mut self, breakdown: FrameBreakdown) -> Option<FpsMetrics> {
        self.elapsed += breakdown.frame;
        self.frames = self.frames.saturating_add(1);
        self.simulation_accum += breakdown.simulation;
        self.render_accum += breakdown.render;

        self.frame_times.push_back(breakdown.frame);
        self.window_duration += breakdown.frame;

        let trailing_window = Duration::from_secs(10);
        while self.window_duration > trailing_window {
            if let Some(removed) = self.frame_times.pop_front() {
                self.window_duration = self.window_duration.saturating_sub(removed);
            } else {
                break;
            }
        }

        if self.elapsed < Duration::from_secs(1) {
            return None;
        }

        let seconds = self.elapsed.as_secs_f32();
        let frames = self.frames;
        let per_second = frames as f32 / seconds;
        let window_seconds = self.window_duration.as_secs_f32();
        let trailing_ten_seconds = if window_seconds <= f32::EPSILON {
            per_second
        } else {
            self.frame_times.len() as f32 / window_seconds
        };
        let metrics = FpsMetrics {
            per_second,
            trailing_ten_seconds,
            avg_simulation: self.simulation_accum / frames.max(1),
            avg_render: self.render_accum / frames.max(1),
        };

        self.elapsed = Duration::ZERO;
        self.frames = 0;
        self.simulation_accum = Duration::ZERO;
        self.render_accum = Duration::ZERO;
        Some(metrics)
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            show_fps,
            window_size,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let (window_width, window_height) = window_size.unwrap_or((1_280, 720));
        let mut config = macroquad::window::Conf {
            window_title,
            window_width,
            window_height,
            window_resizable: true,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;

            #[cfg(feature = "audio")]
            let sounds = match audio::CueSounds::load().await {
                Ok(sounds) => Some(sounds),
                Err(error) => {
                    warn!(error = %format!("{error:#}"), "audio cues disabled");
                    None
                }
            };

            let background = to_macroquad_color(clear_color);
            let mut fps_counter = FpsCounter::default();
            let mut surface = Vec2::ZERO;
            let mut rotate_drag = PointerDrag::default();
            let mut pan_drag = PointerDrag::default();

            loop {
                if is_key_pressed(KeyCode::Escape) || is_key_pressed(KeyCode::Q) {
                    info!("quit requested");
                    break;
                }

                let screen = Vec2::new(
                    macroquad::window::screen_width(),
                    macroquad::window::screen_height(),
                );
                if screen != surface {
                    surface = screen;
                    match scene.camera.projection.set_surface_size(screen.x, screen.y) {
                        Ok(()) => debug!(width = screen.x, height = screen.y, "surface resized"),
                        Err(error) => warn!(%error, "keeping previous aspect ratio"),
                    }
                }

                let (cursor_x, cursor_y) = mouse_position();
                let cursor = Vec2::new(cursor_x, cursor_y);
                let click = track_camera_drags(&mut scene.camera, &mut rotate_drag, &mut pan_drag, cursor);
                let frame_input = frame_input_from_observations(cursor, surface, click);

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));

                let simulation_start = Instant::now();
                update_scene(frame_dt, frame_input, &mut scene);
                let simulation_duration = simulation_start.elapsed();

                for cue in scene.cues.drain(..) {
                    debug!(?cue, "audio cue");
                    #[cfg(feature = "audio")]
                    if let Some(sounds) = &sounds {
                        sounds.play(cue);
                    }
                }

                let render_start = Instant::now();
                macroquad::window::clear_background(background);
                set_camera(&camera_3d(&scene.camera));
                draw_platform(&scene);
                draw_spheres(&scene.spheres);
                set_default_camera();
                draw_hud(&scene.hud);
                let render_duration = render_start.elapsed();

                let fps_metrics = fps_counter.record_frame(FrameBreakdown {
                    frame: frame_dt,
                    simulation: simulation_duration,
                    render: render_duration,
                });
                if show_fps {
                    if let Some(FpsMetrics {
                        per_second,
                        trailing_ten_seconds,
                        avg_simulation,
                        avg_render,
                    }) = fps_metrics
                    {
                        info!(
                            fps = %format!("{per_second:.2}"),
                            fps_10s = %format!("{trailing_ten_seconds:.2}"),
                            sim_ms = avg_simulation.as_secs_f64() * 1_000.0,
                            render_ms = avg_render.as_secs_f64() * 1_000.0,
                            "frame timing"
                        );
                    }
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

/// Applies left-drag rotation, right-drag panning and wheel zoom, returning
/// whether a left click completed this frame.
fn track_camera_drags(
    camera: &mut CameraRig,
    rotate_drag: &mut PointerDrag,
    pan_drag: &mut PointerDrag,
    cursor: Vec2,
) -> bool {
    if is_mouse_button_pressed(MouseButton::Left) {
        rotate_drag.press(cursor);
    }
    if is_mouse_button_pressed(MouseButton::Right) {
        pan_drag.press(cursor);
    }

    camera.orbit.rotate(rotate_drag.drag(cursor));
    camera.orbit.pan(pan_drag.drag(cursor));
    if is_mouse_button_released(MouseButton::Right) {
        let _ = pan_drag.release();
    }

    let (_, wheel) = mouse_wheel();
    if wheel != 0.0 {
        camera.orbit.zoom(wheel.signum());
    }

    is_mouse_button_released(MouseButton::Left) && rotate_drag.release()
}

fn camera_3d(rig: &CameraRig) -> Camera3D {
    Camera3D {
        position: to_macroquad_vec3(rig.orbit.eye()),
        target: to_macroquad_vec3(rig.orbit.target()),
        up: MacroquadVec3::Y,
        fovy: rig.projection.fov_y(),
        aspect: Some(rig.projection.aspect()),
        ..Camera3D::default()
    }
}

fn draw_platform(scene: &Scene) {
    let platform = scene.platform;
    draw_cube(
        to_macroquad_vec3(platform.center),
        to_macroquad_vec3(platform.size),
        None,
        to_macroquad_color(platform.color),
    );
}

fn draw_spheres(spheres: &[SpherePresentation]) {
    // Opaque first so translucent spheres blend over them.
    for pass_translucent in [false, true] {
        for sphere in spheres
            .iter()
            .filter(|sphere| sphere.material.translucent == pass_translucent)
        {
            draw_sphere(
                to_macroquad_vec3(sphere.center),
                sphere.radius,
                None,
                to_macroquad_color(sphere.fill()),
            );
        }
    }
}

fn hud_lines(hud: &HudPresentation) -> [String; 3] {
    let remaining = hud
        .remaining
        .map_or_else(|| String::from("-"), |remaining| remaining.to_string());
    [
        format!("Spawned: {}", hud.spawned),
        format!("Score: {}", hud.score),
        format!("Remaining: {remaining}"),
    ]
}

fn draw_hud(hud: &HudPresentation) {
    for (row, line) in hud_lines(hud).iter().enumerate() {
        let baseline = HUD_MARGIN + HUD_FONT_SIZE * (row as f32 + 1.0);
        let _ = draw_text(line, HUD_MARGIN, baseline, HUD_FONT_SIZE, WHITE);
    }
}

fn to_macroquad_vec3(vector: Vec3) -> MacroquadVec3 {
    MacroquadVec3::new(vector.x, vector.y, vector.z)
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
