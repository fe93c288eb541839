use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;

/// Coalesces repaint requests into at most one `requestAnimationFrame` callback.
///
/// `mark_dirty()` is safe to call from every effect and pointer handler; the
/// paint closure runs once on the next frame.
pub struct RenderScheduler {
    frame: Rc<Frame>,
}

struct Frame {
    window: Option<web_sys::Window>,
    dirty: Cell<bool>,
    pending: Cell<Option<i32>>,
    callback: RefCell<Option<Closure<dyn FnMut()>>>,
}

impl Frame {
    fn request(&self) {
        if self.pending.get().is_some() {
            return;
        }
        let Some(window) = self.window.as_ref() else {
            return;
        };
        let callback = self.callback.borrow();
        let Some(cb) = callback.as_ref() else {
            return;
        };
        if let Ok(id) = window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            self.pending.set(Some(id));
        }
    }
}

impl RenderScheduler {
    pub fn new(paint: impl Fn() + 'static) -> Self {
        let frame = Rc::new(Frame {
            window: web_sys::window(),
            dirty: Cell::new(false),
            pending: Cell::new(None),
            callback: RefCell::new(None),
        });

        let weak = Rc::downgrade(&frame);
        let cb = Closure::<dyn FnMut()>::new(move || {
            let Some(frame) = weak.upgrade() else {
                return;
            };
            frame.pending.set(None);
            if !frame.dirty.replace(false) {
                return;
            }
            paint();
        });
        *frame.callback.borrow_mut() = Some(cb);

        Self { frame }
    }

    pub fn mark_dirty(&self) {
        self.frame.dirty.set(true);
        self.frame.request();
    }
}

impl Drop for RenderScheduler {
    fn drop(&mut self) {
        if let Some(id) = self.frame.pending.take()
            && let Some(window) = self.frame.window.as_ref()
        {
            let _ = window.cancel_animation_frame(id);
        }
        self.frame.dirty.set(false);
        self.frame.callback.borrow_mut().take();
    }
}
