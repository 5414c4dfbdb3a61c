//! Browser host
//!
//! Owns the game, the canvas renderer, the requestAnimationFrame loop and
//! every DOM listener. Dropping the host (or calling `stop`) cancels the
//! pending frame and unregisters all listeners.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Event, EventTarget, HtmlCanvasElement, KeyboardEvent, PointerEvent};

use super::input::{self, HostAction, PointerTracker};
use super::{camera_zoom, effective_dpr};
use crate::game::Game;
use crate::persistence;
use crate::renderer::Renderer;
use crate::renderer::canvas::CanvasRenderer;
use crate::sim::{RunStatus, SimRng, Viewport};
use crate::tuning::Tuning;

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// A DOM listener that unregisters itself on drop
struct Listener {
    target: EventTarget,
    kind: &'static str,
    callback: Closure<dyn FnMut(Event)>,
}

impl Listener {
    fn new(target: &EventTarget, kind: &'static str, f: impl FnMut(Event) + 'static) -> Result<Self, JsValue> {
        let callback = Closure::<dyn FnMut(Event)>::new(f);
        target.add_event_listener_with_callback(kind, callback.as_ref().unchecked_ref())?;
        Ok(Self {
            target: target.clone(),
            kind,
            callback,
        })
    }
}

impl Drop for Listener {
    fn drop(&mut self) {
        let _ = self
            .target
            .remove_event_listener_with_callback(self.kind, self.callback.as_ref().unchecked_ref());
    }
}

/// Everything the callbacks share
struct HostState {
    game: Game,
    renderer: CanvasRenderer,
    pointers: PointerTracker,
    canvas: HtmlCanvasElement,
    touch: bool,
    last_time: Option<f64>,
}

impl HostState {
    fn paused(&self) -> bool {
        self.game.status() == RunStatus::Paused
    }

    fn apply(&mut self, actions: Vec<HostAction>) {
        for action in actions {
            match action {
                HostAction::Game(intent) => self.game.push(intent),
                HostAction::CycleDayMode => {
                    self.game.cycle_next();
                }
                HostAction::CycleWeather => {
                    self.game.weather_next();
                }
            }
        }
    }

    fn fit_canvas(&mut self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let css_w = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(960.0).floor();
        let css_h = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(540.0).floor();
        let dpr = effective_dpr(window.device_pixel_ratio(), self.touch);

        self.canvas.set_width((css_w * dpr) as u32);
        self.canvas.set_height((css_h * dpr) as u32);
        let style = self.canvas.style();
        let _ = style.set_property("width", &format!("{css_w}px"));
        let _ = style.set_property("height", &format!("{css_h}px"));

        self.renderer.set_size(css_w, css_h, dpr);
        self.game.set_zoom(camera_zoom(css_w as f32, self.touch));
        self.game.resize(css_w as f32, css_h as f32);
        log::debug!("Canvas {css_w}x{css_h} @ {dpr}");
    }

    fn frame(&mut self, time: f64) {
        let dt = match self.last_time {
            Some(last) => ((time - last) / 1000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(time);

        self.game.frame(dt);

        let settings = self.game.settings();
        self.renderer.sky_phase = settings.cycle.sky_phase(time / 1000.0);
        self.renderer.lightning = (self.renderer.lightning - dt * 3.0).max(0.0);
        if settings.effective_lightning() && js_sys::Math::random() < 0.004 {
            self.renderer.lightning = 1.0;
        }
        self.renderer.draw(self.game.world());
    }
}

/// Running browser game
pub struct Host {
    state: Rc<RefCell<HostState>>,
    listeners: Vec<Listener>,
    frame: FrameCallback,
    raf_id: Rc<Cell<Option<i32>>>,
}

impl Host {
    /// Attach to the canvas with the given element id and start the loop
    pub fn start(canvas_id: &str) -> Result<Host, JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(canvas_id)
            .ok_or("no canvas")?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas.get_context("2d")?.ok_or("no 2d context")?.dyn_into()?;

        let touch = window.navigator().max_touch_points() > 0;
        let viewport = Viewport::new(
            window.inner_width()?.as_f64().unwrap_or(960.0) as f32,
            window.inner_height()?.as_f64().unwrap_or(540.0) as f32,
        );
        let storage = persistence::open_default();
        let game = match seed_param(&window) {
            Some(seed) => Game::from_seed_str(&seed, viewport, storage),
            None => Game::new(viewport, Tuning::default(), SimRng::from_entropy(), storage),
        };

        let state = Rc::new(RefCell::new(HostState {
            game,
            renderer: CanvasRenderer::new(ctx),
            pointers: PointerTracker::new(),
            canvas: canvas.clone(),
            touch,
            last_time: None,
        }));
        state.borrow_mut().fit_canvas();

        let mut host = Host {
            state,
            listeners: Vec::new(),
            frame: Rc::new(RefCell::new(None)),
            raf_id: Rc::new(Cell::new(None)),
        };
        host.listen(&window, &document, &canvas)?;
        host.run_loop();
        log::info!("Rooftop Cat running");
        Ok(host)
    }

    fn listen(&mut self, window: &web_sys::Window, document: &web_sys::Document, canvas: &HtmlCanvasElement) -> Result<(), JsValue> {
        let s = self.state.clone();
        self.listeners.push(Listener::new(window, "keydown", move |e| {
            let Some(e) = e.dyn_ref::<KeyboardEvent>() else {
                return;
            };
            let mut st = s.borrow_mut();
            let paused = st.paused();
            if paused || input::captures_key(&e.key()) {
                e.prevent_default();
            }
            let actions = input::key_down(&e.key(), e.repeat(), paused);
            st.apply(actions);
        })?);

        let s = self.state.clone();
        self.listeners.push(Listener::new(window, "keyup", move |e| {
            if let Some(e) = e.dyn_ref::<KeyboardEvent>() {
                s.borrow_mut().apply(input::key_up(&e.key()));
            }
        })?);

        let s = self.state.clone();
        self.listeners.push(Listener::new(canvas, "pointerdown", move |e| {
            let Some(e) = e.dyn_ref::<PointerEvent>() else {
                return;
            };
            e.prevent_default();
            let mut st = s.borrow_mut();
            let rect = st.canvas.get_bounding_client_rect();
            let x = (e.client_x() as f64 - rect.left()) as f32;
            let paused = st.paused();
            let intents = st.pointers.down(e.pointer_id(), x, rect.width() as f32, paused);
            for intent in intents {
                st.game.push(intent);
            }
            // Keep receiving events if the finger leaves the canvas
            let _ = st.canvas.set_pointer_capture(e.pointer_id());
        })?);

        for kind in ["pointerup", "pointercancel"] {
            let s = self.state.clone();
            self.listeners.push(Listener::new(window, kind, move |e| {
                if let Some(e) = e.dyn_ref::<PointerEvent>() {
                    let mut st = s.borrow_mut();
                    for intent in st.pointers.up(e.pointer_id()) {
                        st.game.push(intent);
                    }
                }
            })?);
        }

        let s = self.state.clone();
        self.listeners.push(Listener::new(window, "blur", move |_| {
            s.borrow_mut().game.focus_lost();
        })?);

        let s = self.state.clone();
        let doc = document.clone();
        self.listeners.push(Listener::new(document, "visibilitychange", move |_| {
            if doc.visibility_state() == web_sys::VisibilityState::Hidden {
                let mut st = s.borrow_mut();
                st.game.focus_lost();
                st.game.flush();
                log::info!("Auto-paused (tab hidden)");
            }
        })?);

        let s = self.state.clone();
        self.listeners.push(Listener::new(window, "pagehide", move |_| {
            let mut st = s.borrow_mut();
            st.game.focus_lost();
            st.game.flush();
        })?);

        for kind in ["resize", "orientationchange"] {
            let s = self.state.clone();
            self.listeners.push(Listener::new(window, kind, move |_| {
                s.borrow_mut().fit_canvas();
            })?);
        }
        Ok(())
    }

    fn run_loop(&mut self) {
        let state = self.state.clone();
        let frame = self.frame.clone();
        let raf_id = self.raf_id.clone();
        *self.frame.borrow_mut() = Some(Closure::new(move |time: f64| {
            state.borrow_mut().frame(time);
            raf_id.set(request_frame(&frame));
        }));
        self.raf_id.set(request_frame(&self.frame));
    }

    /// Cancel the frame loop and remove every listener
    pub fn stop(&mut self) {
        if let (Some(id), Some(window)) = (self.raf_id.take(), web_sys::window()) {
            let _ = window.cancel_animation_frame(id);
        }
        // Dropping the closure breaks its self-reference
        self.frame.borrow_mut().take();
        self.listeners.clear();
        self.state.borrow_mut().game.flush();
        log::info!("Rooftop Cat stopped");
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        if self.frame.borrow().is_some() {
            self.stop();
        }
    }
}

fn request_frame(frame: &FrameCallback) -> Option<i32> {
    let window = web_sys::window()?;
    let callback = frame.borrow();
    let callback = callback.as_ref()?;
    window.request_animation_frame(callback.as_ref().unchecked_ref()).ok()
}

/// `?seed=` from the page URL
fn seed_param(window: &web_sys::Window) -> Option<String> {
    let search = window.location().search().ok()?;
    let params = web_sys::UrlSearchParams::new_with_str(&search).ok()?;
    params.get("seed").filter(|s| !s.is_empty())
}
