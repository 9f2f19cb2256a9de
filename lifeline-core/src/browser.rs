use js_sys::Reflect;
use tracing::error;
use wasm_bindgen::{closure::Closure, prelude::*, JsCast};

use crate::schedule::{EventLoop, Task};

#[wasm_bindgen]
extern "C" {
    // the global one, so workers and Node have it too
    #[wasm_bindgen(js_name = setTimeout, catch)]
    fn global_set_timeout(handler: &js_sys::Function) -> Result<JsValue, JsValue>;
}

/// [`EventLoop`] backed by the JS host: `window.requestAnimationFrame` for
/// frames and the global `setTimeout` for timers.
///
/// Hosts without a window (web workers, Node) only have timers. On non-wasm
/// targets neither capability is available.
#[derive(Clone, Debug)]
pub struct BrowserLoop {
    window: Option<web_sys::Window>,
    timers: bool,
}

impl Default for BrowserLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserLoop {
    pub fn new() -> Self {
        if !cfg!(target_family = "wasm") {
            return Self {
                window: None,
                timers: false,
            };
        }

        let window = web_sys::window().filter(|window| defines(window, "requestAnimationFrame"));
        let timers = defines(&js_sys::global(), "setTimeout");
        Self { window, timers }
    }

    /// Ignores animation frames even when the host provides them.
    pub fn without_frames(mut self) -> Self {
        self.window = None;
        self
    }
}

impl EventLoop for BrowserLoop {
    fn has_animation_frames(&self) -> bool {
        self.window.is_some()
    }

    fn has_timers(&self) -> bool {
        self.timers
    }

    fn request_animation_frame(&self, task: Task) {
        let Some(window) = &self.window else {
            error!("requestAnimationFrame called without a window");
            return;
        };
        if let Err(err) = window.request_animation_frame(&callback(task)) {
            error!(?err, "requestAnimationFrame failed");
        }
    }

    fn set_timeout(&self, task: Task) {
        if !self.timers {
            error!("setTimeout called in a host without timers");
            return;
        }
        if let Err(err) = global_set_timeout(&callback(task)) {
            error!(?err, "setTimeout failed");
        }
    }
}

fn defines(target: &JsValue, name: &str) -> bool {
    Reflect::has(target, &JsValue::from_str(name)).unwrap_or(false)
}

fn callback(task: Task) -> js_sys::Function {
    Closure::once_into_js(move || task()).unchecked_into()
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::schedule::Deferrer;

    #[cfg(not(target_family = "wasm"))]
    #[test]
    fn unavailable_outside_browser() {
        use crate::error::Error;

        let event_loop = BrowserLoop::new();
        assert!(!event_loop.has_animation_frames());
        assert!(!event_loop.has_timers());
        assert!(matches!(
            Deferrer::new(Rc::new(event_loop)),
            Err(Error::NoScheduler)
        ));
    }

    #[cfg(target_family = "wasm")]
    mod browser {
        use std::cell::Cell;

        use js_sys::{Function, Promise};
        use wasm_bindgen_futures::JsFuture;
        use wasm_bindgen_test::*;

        use super::*;
        use crate::schedule::Tick;

        wasm_bindgen_test_configure!(run_in_browser);

        /// Defers one task and waits for it, plus one more timer tick so a
        /// repeated run would be seen. Returns how often the task ran.
        async fn run_deferred(deferrer: &Deferrer) -> u32 {
            let runs = Rc::new(Cell::new(0));
            let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
                let runs = runs.clone();
                deferrer.defer(move || {
                    runs.set(runs.get() + 1);
                    resolve.call0(&JsValue::UNDEFINED).unwrap();
                });
            });
            JsFuture::from(promise).await.unwrap();

            let settle = Promise::new(&mut |resolve: Function, _reject: Function| {
                global_set_timeout(&resolve).unwrap();
            });
            JsFuture::from(settle).await.unwrap();

            runs.get()
        }

        #[wasm_bindgen_test]
        fn detects_window_capabilities() {
            let event_loop = BrowserLoop::new();
            assert!(event_loop.has_animation_frames());
            assert!(event_loop.has_timers());
        }

        #[wasm_bindgen_test]
        async fn runs_frame_tasks_once() {
            let deferrer = Deferrer::new(Rc::new(BrowserLoop::new())).unwrap();
            assert_eq!(deferrer.tick(), Tick::AnimationFrame);
            assert_eq!(run_deferred(&deferrer).await, 1);
        }

        #[wasm_bindgen_test]
        async fn falls_back_to_global_timers() {
            let deferrer = Deferrer::new(Rc::new(BrowserLoop::new().without_frames())).unwrap();
            assert_eq!(deferrer.tick(), Tick::Timeout);
            assert_eq!(run_deferred(&deferrer).await, 1);
        }
    }
}
