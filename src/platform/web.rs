//! Browser frontend
//!
//! Rectangles go through the WebGPU canvas; text commands are mirrored into
//! absolutely positioned elements in `#text-layer` on top of it.

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement};

use super::session::Session;
use crate::audio::{AudioManager, AudioOutput};
use crate::consts::{MAX_SUBSTEPS, SIM_DT, WINDOW_HEIGHT, WINDOW_WIDTH};
use crate::renderer::{Anchor, DrawCmd, Frame, RenderState, TextSize, build_frame};
use crate::settings::Settings;

/// DOM mirror of a frame's text commands
struct TextLayer {
    root: Element,
    /// Text commands currently shown, to skip identical rebuilds
    shown: Vec<DrawCmd>,
}

impl TextLayer {
    fn new(document: &Document) -> Option<Self> {
        let root = document.get_element_by_id("text-layer")?;
        Some(Self {
            root,
            shown: Vec::new(),
        })
    }

    fn update(&mut self, document: &Document, frame: &Frame) {
        let texts: Vec<DrawCmd> = frame
            .commands
            .iter()
            .filter(|c| matches!(c, DrawCmd::Text { .. }))
            .cloned()
            .collect();
        if texts == self.shown {
            return;
        }

        let scale = self.root.client_height() as f32 / WINDOW_HEIGHT;
        self.root.set_inner_html("");
        for cmd in &texts {
            let DrawCmd::Text {
                text,
                x,
                y,
                size,
                anchor,
                color,
            } = cmd
            else {
                continue;
            };
            let Ok(el) = document.create_element("div") else {
                continue;
            };
            el.set_text_content(Some(text));
            let translate = match anchor {
                Anchor::TopLeft => "none",
                Anchor::Center => "translate(-50%, -50%)",
            };
            let style = format!(
                "position:absolute;left:{:.3}%;top:{:.3}%;transform:{};\
                 font-size:{:.1}px;white-space:nowrap;color:rgba({},{},{},{:.3})",
                x / WINDOW_WIDTH * 100.0,
                y / WINDOW_HEIGHT * 100.0,
                translate,
                size.px() * scale,
                color.r,
                color.g,
                color.b,
                f32::from(color.a) / 255.0,
            );
            let _ = el.set_attribute("style", &style);
            if *size == TextSize::Title {
                let _ = el.set_attribute("class", "title");
            }
            let _ = self.root.append_child(&el);
        }
        self.shown = texts;
    }
}

/// Game instance holding all state
struct Game {
    session: Session,
    settings: Settings,
    audio: AudioManager,
    render_state: Option<RenderState>,
    text_layer: Option<TextLayer>,
    document: Document,
    accumulator: f32,
    last_time: f64,
    // FPS tracking
    frame_times: [f64; 60],
    frame_index: usize,
    fps: u32,
    music_started: bool,
}

impl Game {
    fn new(seed: u64, settings: Settings, document: Document) -> Self {
        Self {
            session: Session::new(seed),
            audio: AudioManager::new(&settings),
            settings,
            render_state: None,
            text_layer: TextLayer::new(&document),
            document,
            accumulator: 0.0,
            last_time: 0.0,
            frame_times: [0.0; 60],
            frame_index: 0,
            fps: 0,
            music_started: false,
        }
    }

    /// Run simulation ticks
    fn update(&mut self, dt: f32, time: f64) {
        let dt = dt.min(0.1);
        self.accumulator += dt;

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let events = self.session.step();
            self.audio.handle_events(&events);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }

        self.frame_times[self.frame_index] = time;
        self.frame_index = (self.frame_index + 1) % 60;

        let oldest_time = self.frame_times[self.frame_index];
        if oldest_time > 0.0 {
            let elapsed = time - oldest_time;
            if elapsed > 0.0 {
                self.fps = (60000.0 / elapsed).round() as u32;
            }
        }
    }

    /// Render the current frame
    fn render(&mut self) {
        let options = self.session.scene_options(&self.settings, Some(self.fps));
        let frame = build_frame(&self.session.state, &options);

        if let Some(ref mut render_state) = self.render_state {
            match render_state.render(&frame) {
                Ok(_) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    render_state.resize(render_state.size.0, render_state.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }
        if let Some(ref mut layer) = self.text_layer {
            layer.update(&self.document, &frame);
        }
    }

    fn on_key(&mut self, key: &str) -> bool {
        if !self.music_started {
            // Browsers only allow audio after a user gesture
            self.audio.resume();
            self.audio.start_music();
            self.music_started = true;
        }
        self.session.handle_key(key).is_some()
    }

    fn shut_down(&mut self) {
        self.audio.stop_music();
        if let Some(ref mut layer) = self.text_layer {
            layer.shown.clear();
            layer.root.set_inner_html("");
            if let Ok(el) = self.document.create_element("div") {
                el.set_text_content(Some("Thanks for playing! Reload to play again."));
                let _ = el.set_attribute("class", "farewell");
                let _ = layer.root.append_child(&el);
            }
        }
        log::info!("Session ended:\n{}", self.session.summary());
    }
}

pub async fn run() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    if let Err(e) = start().await {
        log::error!("RGB Guardian failed to start: {}", e);
        if let Some(loading) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("loading"))
        {
            loading.set_text_content(Some(&format!("Could not start: {}", e)));
        }
    }
}

async fn start() -> Result<(), String> {
    log::info!("RGB Guardian starting...");

    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;

    let canvas: HtmlCanvasElement = document
        .get_element_by_id("canvas")
        .ok_or("no #canvas element")?
        .dyn_into()
        .map_err(|_| "#canvas is not a canvas")?;

    let dpr = window.device_pixel_ratio();
    let width = (canvas.client_width() as f64 * dpr) as u32;
    let height = (canvas.client_height() as f64 * dpr) as u32;
    canvas.set_width(width);
    canvas.set_height(height);

    let settings = Settings::load().sanitized();
    let seed = settings.seed.unwrap_or(js_sys::Date::now() as u64);
    let game = Rc::new(RefCell::new(Game::new(seed, settings, document.clone())));
    log::info!("Game initialized with seed: {}", seed);

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU,
        ..Default::default()
    });

    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas))
        .map_err(|e| format!("could not create surface: {}", e))?;

    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .map_err(|e| format!("no WebGPU adapter: {}", e))?;

    log::info!("Using adapter: {:?}", adapter.get_info().name);

    let render_state = RenderState::new(surface, &adapter, width, height)
        .await
        .map_err(|e| format!("could not create device: {}", e))?;
    game.borrow_mut().render_state = Some(render_state);

    if let Some(loading) = document.get_element_by_id("loading") {
        let _ = loading.set_attribute("class", "hidden");
    }

    setup_keyboard(game.clone());
    setup_auto_pause(game.clone());

    request_animation_frame(game);

    log::info!("RGB Guardian running!");
    Ok(())
}

fn setup_keyboard(game: Rc<RefCell<Game>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
        if event.repeat() {
            return;
        }
        if game.borrow_mut().on_key(&event.key()) {
            event.prevent_default();
        }
    });
    let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
    closure.forget();
}

fn request_animation_frame(game: Rc<RefCell<Game>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        game_loop(game, time);
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
    {
        let mut g = game.borrow_mut();

        if g.session.quit {
            g.shut_down();
            return;
        }

        let dt = if g.last_time > 0.0 {
            ((time - g.last_time) / 1000.0) as f32
        } else {
            SIM_DT
        };
        g.last_time = time;

        g.update(dt, time);
        g.render();
    }

    request_animation_frame(game);
}

fn setup_auto_pause(game: Rc<RefCell<Game>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };

    fn lose_focus(g: &mut Game, why: &str) {
        if !g.settings.mute_on_blur {
            return;
        }
        if g.session.auto_pause() {
            log::info!("Auto-paused ({})", why);
        }
        g.audio.set_muted(true);
    }

    fn regain_focus(g: &mut Game) {
        if g.settings.mute_on_blur {
            g.audio.set_muted(false);
        }
    }

    // Visibility change (tab switch, minimize)
    {
        let game = game.clone();
        let document_clone = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut g = game.borrow_mut();
            if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                lose_focus(&mut g, "tab hidden");
            } else {
                regain_focus(&mut g);
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    // Window blur (click outside)
    {
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            lose_focus(&mut game.borrow_mut(), "window blur");
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            regain_focus(&mut game.borrow_mut());
        });
        let _ = window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}
