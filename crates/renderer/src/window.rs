use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use gradient::ColorStops;
use tracing::{debug, info, trace};
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event::{ElementState, Event, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowBuilder};

use crate::driver::{Backdrop, BackdropState, RenderSurface, TickOutcome};
use crate::gpu::GpuSurface;
use crate::runtime::SystemTimeSource;
use crate::schedule::{FramePacer, RedrawFlag};
use crate::types::{BackdropOptions, RendererConfig, SurfaceGeometry};

/// Pixels scrolled per wheel notch when the platform reports lines.
const LINE_HEIGHT: f64 = 40.0;

/// Input forwarded from the window to the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HostInput {
    /// New viewport size in logical pixels.
    Resized { width: f64, height: f64 },
    /// Positive values scroll towards the end of the page.
    Scroll { delta_y: f64 },
    Key(HostKey),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostKey {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
    Escape,
    Character(char),
}

/// What the host wants shown after a re-render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostView {
    /// Backdrop colors; `None` means the backdrop defaults.
    pub color_stops: Option<ColorStops>,
    /// Appended to the window title.
    pub subtitle: Option<String>,
    pub exit: bool,
}

/// The application that owns the backdrop.
///
/// `render` is called once before the backdrop mounts and again after every
/// input for which `handle_input` returns `true`. Each returned view is handed
/// to the backdrop, which ignores stops equal to the ones it already shows.
pub trait WindowHost {
    fn handle_input(&mut self, input: HostInput) -> bool;
    fn render(&mut self) -> HostView;
}

/// Opens a window, mounts one backdrop on it, and runs until the window
/// closes. The backdrop is unmounted before this returns.
pub fn run_window<H>(config: RendererConfig, mut host: H) -> Result<()>
where
    H: WindowHost + 'static,
{
    let event_loop = EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;
    let (width, height) = config.logical_size;
    let window = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(LogicalSize::new(f64::from(width), f64::from(height)))
        .build(&event_loop)
        .map_err(|err| anyhow!("failed to create window: {err}"))?;
    let window = Arc::new(window);

    let options = config.backdrop;
    let power = config.power;
    let fallback_stops = config.color_stops;
    let mut titles = TitleState::new(config.title.clone());

    let _ = host.handle_input(logical_input(&window, window.inner_size()));
    let initial = host.render();
    titles.apply(&window, initial.subtitle.as_deref());

    let flag = RedrawFlag::new();
    let surface_window = window.clone();
    let mut backdrop = Backdrop::mount(
        initial.color_stops.unwrap_or(fallback_stops),
        options,
        geometry_for(&window, window.inner_size(), &options),
        move |geometry| GpuSurface::new(surface_window, geometry, &options, power),
        SystemTimeSource::new(),
        flag.clone(),
    );
    let mut minimized = is_minimized(window.inner_size());
    let mut pacer = FramePacer::new(options.max_fps);
    if let Some(interval) = pacer.interval() {
        info!(frame_ms = interval.as_secs_f64() * 1000.0, "frame cap enabled");
    }

    let run_result = event_loop.run(move |event, elwt| match event {
        Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
            WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                elwt.exit();
            }
            WindowEvent::Resized(new_size) => {
                minimized = is_minimized(new_size);
                backdrop.resize(geometry_for(&window, new_size, &options));
                if host.handle_input(logical_input(&window, new_size)) {
                    let view = host.render();
                    if apply_view(view, &mut backdrop, &window, &mut titles, fallback_stops) {
                        elwt.exit();
                    }
                }
            }
            WindowEvent::ScaleFactorChanged { .. } => {
                let size = window.inner_size();
                minimized = is_minimized(size);
                backdrop.resize(geometry_for(&window, size, &options));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let input = HostInput::Scroll {
                    delta_y: scroll_delta(delta, window.scale_factor()),
                };
                if host.handle_input(input) {
                    let view = host.render();
                    if apply_view(view, &mut backdrop, &window, &mut titles, fallback_stops) {
                        elwt.exit();
                    }
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                let Some(key) = host_key(&event.logical_key) else {
                    return;
                };
                if host.handle_input(HostInput::Key(key)) {
                    let view = host.render();
                    if apply_view(view, &mut backdrop, &window, &mut titles, fallback_stops) {
                        elwt.exit();
                    }
                }
            }
            WindowEvent::RedrawRequested => {
                // Only a pending tick renders; nothing renders while minimized.
                if minimized || !flag.take() {
                    trace!(minimized, "redraw without a pending tick");
                    return;
                }
                let now = Instant::now();
                let outcome = backdrop.tick();
                trace!(?outcome, "backdrop tick");
                if outcome == TickOutcome::Rendered {
                    pacer.mark_rendered(now);
                }
            }
            _ => {}
        },
        Event::AboutToWait => {
            let now = Instant::now();
            if minimized {
                trace!("scheduler: window minimized");
                elwt.set_control_flow(ControlFlow::Wait);
            } else if backdrop.state() != BackdropState::Running || !flag.is_pending() {
                trace!("scheduler: idle (no tick requested)");
                elwt.set_control_flow(ControlFlow::Wait);
            } else if pacer.ready(now) {
                trace!("scheduler: issuing redraw now");
                window.request_redraw();
                elwt.set_control_flow(ControlFlow::Wait);
            } else if let Some(deadline) = pacer.next_deadline() {
                let ms = deadline.saturating_duration_since(now).as_millis();
                trace!(deadline_ms = ms, "scheduler: waiting until next frame");
                elwt.set_control_flow(ControlFlow::WaitUntil(deadline));
            } else {
                elwt.set_control_flow(ControlFlow::Wait);
            }
        }
        Event::LoopExiting => {
            backdrop.unmount();
        }
        _ => {}
    });

    run_result.map_err(|err| anyhow!("window event loop error: {err}"))
}

/// Hands a host view to the backdrop. Returns `true` when the host asked to exit.
fn apply_view<S: RenderSurface>(
    view: HostView,
    backdrop: &mut Backdrop<S>,
    window: &Window,
    titles: &mut TitleState,
    fallback: ColorStops,
) -> bool {
    let changed = backdrop.set_color_stops(view.color_stops.unwrap_or(fallback));
    if changed {
        debug!("host supplied new backdrop colors");
    }
    titles.apply(window, view.subtitle.as_deref());
    view.exit
}

struct TitleState {
    base: String,
    current: Option<String>,
}

impl TitleState {
    fn new(base: String) -> Self {
        Self {
            base,
            current: None,
        }
    }

    fn apply(&mut self, window: &Window, subtitle: Option<&str>) {
        let title = compose_title(&self.base, subtitle);
        if self.current.as_deref() != Some(title.as_str()) {
            window.set_title(&title);
            self.current = Some(title);
        }
    }
}

fn compose_title(base: &str, subtitle: Option<&str>) -> String {
    match subtitle {
        Some(subtitle) if !subtitle.is_empty() => format!("{base} - {subtitle}"),
        _ => base.to_string(),
    }
}

fn geometry_for(
    window: &Window,
    size: PhysicalSize<u32>,
    options: &BackdropOptions,
) -> SurfaceGeometry {
    SurfaceGeometry::new(
        (size.width, size.height),
        window.scale_factor(),
        options.pixel_ratio,
    )
}

/// Minimized windows report a zero-area size; nothing can be presented.
fn is_minimized(size: PhysicalSize<u32>) -> bool {
    size.width == 0 || size.height == 0
}

fn logical_input(window: &Window, size: PhysicalSize<u32>) -> HostInput {
    let logical = size.to_logical::<f64>(window.scale_factor());
    HostInput::Resized {
        width: logical.width,
        height: logical.height,
    }
}

/// Converts a wheel event into logical pixels scrolled down the page.
fn scroll_delta(delta: MouseScrollDelta, scale_factor: f64) -> f64 {
    match delta {
        MouseScrollDelta::LineDelta(_, lines) => -f64::from(lines) * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(position) => {
            let scale = if scale_factor > 0.0 { scale_factor } else { 1.0 };
            -position.y / scale
        }
    }
}

fn host_key(key: &Key) -> Option<HostKey> {
    match key {
        Key::Named(NamedKey::ArrowUp) => Some(HostKey::Up),
        Key::Named(NamedKey::ArrowDown) => Some(HostKey::Down),
        Key::Named(NamedKey::PageUp) => Some(HostKey::PageUp),
        Key::Named(NamedKey::PageDown) | Key::Named(NamedKey::Space) => Some(HostKey::PageDown),
        Key::Named(NamedKey::Home) => Some(HostKey::Home),
        Key::Named(NamedKey::End) => Some(HostKey::End),
        Key::Named(NamedKey::Escape) => Some(HostKey::Escape),
        Key::Character(value) => value.chars().next().map(HostKey::Character),
        _ => None,
    }
}
