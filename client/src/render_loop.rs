use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

type FrameListener = Box<dyn FnMut(f64)>;

/// Runs registered listeners once per `requestAnimationFrame`, continuously.
///
/// Listeners get the frame timestamp in milliseconds and run in the order
/// they were added.
pub struct FrameTicker {
    inner: Rc<Inner>,
}

struct Inner {
    window: Option<web_sys::Window>,
    running: Cell<bool>,
    raf_id: Cell<Option<i32>>,
    listeners: RefCell<Vec<FrameListener>>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl FrameTicker {
    pub fn new() -> Self {
        let inner = Rc::new(Inner {
            window: web_sys::window(),
            running: Cell::new(false),
            raf_id: Cell::new(None),
            listeners: RefCell::new(Vec::new()),
            callback: RefCell::new(None),
        });

        let inner_cb = inner.clone();
        let cb = Closure::<dyn FnMut(f64)>::new(move |timestamp: f64| {
            inner_cb.raf_id.set(None);
            if !inner_cb.running.get() {
                return;
            }
            if let Ok(mut listeners) = inner_cb.listeners.try_borrow_mut() {
                for listener in listeners.iter_mut() {
                    listener(timestamp);
                }
            }
            request_frame(&inner_cb);
        });
        *inner.callback.borrow_mut() = Some(cb);

        Self { inner }
    }

    /// Add a per-frame listener. Must not be called from inside a listener.
    pub fn add(&self, listener: impl FnMut(f64) + 'static) {
        self.inner.listeners.borrow_mut().push(Box::new(listener));
    }

    pub fn start(&self) {
        if self.inner.running.replace(true) {
            return;
        }
        request_frame(&self.inner);
    }
}

fn request_frame(inner: &Inner) {
    if inner.raf_id.get().is_some() {
        return;
    }
    let cb_ref = inner.callback.borrow();
    let Some(ref cb) = *cb_ref else {
        return;
    };
    let Some(window) = inner.window.as_ref() else {
        inner.running.set(false);
        return;
    };
    match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
        Ok(id) => inner.raf_id.set(Some(id)),
        Err(_) => inner.running.set(false),
    }
}

impl Drop for FrameTicker {
    fn drop(&mut self) {
        if let Some(raf_id) = self.inner.raf_id.replace(None)
            && let Some(window) = self.inner.window.as_ref()
        {
            let _ = window.cancel_animation_frame(raf_id);
        }
        self.inner.running.set(false);
        self.inner.listeners.borrow_mut().clear();
        // Break the callback->inner reference cycle on teardown.
        self.inner.callback.borrow_mut().take();
    }
}
