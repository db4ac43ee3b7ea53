//! FrameRegistry: wires every reachable document to the controller.
//!
//! The top document is registered at startup. Same-origin iframes are
//! registered when found, either already present, added later anywhere in
//! the top document's subtree, or once they finish loading. Cross-origin
//! frames have no accessible `contentDocument` and are skipped quietly.
//!
//! Each registered document gets five listeners (`focusin`, `input`,
//! `keydown`, capturing `scroll`, `mousedown`) and a subtree observer on its
//! body. Subtree changes are reported as [`FrameEvent::SubtreeChanged`] so
//! the controller can notice when the active surface is removed.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::{Interval, Timeout};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, HtmlIFrameElement, KeyboardEvent, MutationObserver, MutationObserverInit,
    MutationRecord, Node,
};

use crate::cast::as_keyboard_event;
use crate::error::DomError;
use crate::events::target_element;

const BODY_POLL_MS: u32 = 100;
const BODY_POLL_LIMIT_MS: u32 = 5_000;

/// An input-affecting event from any registered document.
#[derive(Debug, Clone)]
pub enum FrameEvent {
    FocusIn(Element),
    Input,
    /// Kept whole so the receiver can prevent the default action.
    KeyDown(KeyboardEvent),
    Scroll,
    MouseDown(Option<Element>),
    SubtreeChanged,
}

pub type FrameEventHandler = Rc<dyn Fn(FrameEvent)>;

/// Listeners and observer attached to one document. Dropping it detaches
/// everything.
struct FrameHandle {
    document: Document,
    _listeners: Vec<EventListener>,
    observer: Option<SubtreeObserver>,
}

struct SubtreeObserver {
    observer: MutationObserver,
    _callback: Closure<dyn FnMut(js_sys::Array, MutationObserver)>,
}

impl Drop for SubtreeObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

/// A same-origin frame whose body did not exist yet when it was registered.
struct BodyWait {
    document: Document,
    interval: Rc<RefCell<Option<Interval>>>,
}

/// `load` listener for one iframe element.
struct IframeLoad {
    iframe: HtmlIFrameElement,
    _listener: EventListener,
}

struct Shared {
    handler: FrameEventHandler,
    frames: RefCell<Vec<FrameHandle>>,
    top_observer: RefCell<Option<SubtreeObserver>>,
    iframe_loads: RefCell<Vec<IframeLoad>>,
    body_waits: RefCell<Vec<BodyWait>>,
}

#[derive(Clone)]
pub struct FrameRegistry {
    shared: Rc<Shared>,
}

impl FrameRegistry {
    pub fn new(handler: FrameEventHandler) -> Self {
        Self {
            shared: Rc::new(Shared {
                handler,
                frames: RefCell::new(Vec::new()),
                top_observer: RefCell::new(None),
                iframe_loads: RefCell::new(Vec::new()),
                body_waits: RefCell::new(Vec::new()),
            }),
        }
    }

    /// Register the top document, every iframe already in it, and start
    /// watching for iframes added later.
    pub fn register_top(&self) -> Result<(), DomError> {
        let document = web_sys::window()
            .and_then(|window| window.document())
            .ok_or("no top document")?;
        self.register_document(&document);

        let body = document.body().ok_or("top document has no body")?;
        let weak = Rc::downgrade(&self.shared);
        let observer = SubtreeObserver::new(&body, move |records| {
            let Some(shared) = weak.upgrade() else {
                return;
            };
            let registry = FrameRegistry { shared };
            for iframe in added_iframes(&records) {
                registry.handle_iframe(&iframe);
            }
            registry.prune_detached();
            (registry.shared.handler)(FrameEvent::SubtreeChanged);
        })?;
        *self.shared.top_observer.borrow_mut() = Some(observer);

        let existing = document.query_selector_all("iframe")?;
        for i in 0..existing.length() {
            if let Some(iframe) = existing
                .item(i)
                .and_then(|node| node.dyn_into::<HtmlIFrameElement>().ok())
            {
                self.handle_iframe(&iframe);
            }
        }
        Ok(())
    }

    /// Attach the input listeners to `document`.
    ///
    /// Returns false if it was already registered.
    pub fn register_document(&self, document: &Document) -> bool {
        if self.is_registered(document) {
            return false;
        }
        let listeners = frame_listeners(document, &self.shared.handler);
        self.shared.frames.borrow_mut().push(FrameHandle {
            document: document.clone(),
            _listeners: listeners,
            observer: None,
        });
        tracing::debug!(target: "ghostline::frames", frames = self.frame_count(), "frame registered");
        true
    }

    pub fn is_registered(&self, document: &Document) -> bool {
        self.shared
            .frames
            .borrow()
            .iter()
            .any(|frame| frame.document.is_same_node(Some(document.as_ref())))
    }

    pub fn frame_count(&self) -> usize {
        self.shared.frames.borrow().len()
    }

    /// Number of iframes with a `load` listener.
    pub fn watched_iframe_count(&self) -> usize {
        self.shared.iframe_loads.borrow().len()
    }

    /// Detach every listener and observer.
    pub fn clear(&self) {
        self.shared.body_waits.borrow_mut().clear();
        self.shared.iframe_loads.borrow_mut().clear();
        self.shared.top_observer.borrow_mut().take();
        self.shared.frames.borrow_mut().clear();
    }

    /// Register an iframe now if its document is reachable, and again after
    /// each load so a navigated frame is picked up.
    ///
    /// An iframe gets one `load` listener however often it is handled.
    pub fn handle_iframe(&self, iframe: &HtmlIFrameElement) {
        self.try_register_iframe(iframe);

        let watched = self
            .shared
            .iframe_loads
            .borrow()
            .iter()
            .any(|load| load.iframe.is_same_node(Some(iframe.as_ref())));
        if watched {
            return;
        }
        let weak = Rc::downgrade(&self.shared);
        let frame = iframe.clone();
        let listener = EventListener::new(iframe, "load", move |_| {
            if let Some(shared) = weak.upgrade() {
                FrameRegistry { shared }.try_register_iframe(&frame);
            }
        });
        self.shared.iframe_loads.borrow_mut().push(IframeLoad {
            iframe: iframe.clone(),
            _listener: listener,
        });
    }

    fn try_register_iframe(&self, iframe: &HtmlIFrameElement) {
        let Some(document) = iframe.content_document() else {
            tracing::debug!(target: "ghostline::frames", src = %iframe.src(), "iframe not accessible, skipping");
            return;
        };
        if self.register_document(&document) {
            self.observe_frame(&document);
        }
    }

    /// Watch a frame document's body, polling briefly if it has none yet.
    fn observe_frame(&self, document: &Document) {
        if let Some(body) = document.body() {
            self.attach_frame_observer(document, &body);
            return;
        }

        let weak = Rc::downgrade(&self.shared);
        let doc = document.clone();
        let found = Rc::new(Cell::new(false));
        let interval = Interval::new(BODY_POLL_MS, move || {
            if found.get() {
                return;
            }
            let (Some(shared), Some(body)) = (weak.upgrade(), doc.body()) else {
                return;
            };
            found.set(true);
            FrameRegistry { shared }.attach_frame_observer(&doc, &body);
        });
        let slot = Rc::new(RefCell::new(Some(interval)));

        let expire = Rc::downgrade(&slot);
        Timeout::new(BODY_POLL_LIMIT_MS, move || {
            if let Some(slot) = expire.upgrade() {
                slot.borrow_mut().take();
            }
        })
        .forget();

        self.shared.body_waits.borrow_mut().push(BodyWait {
            document: document.clone(),
            interval: slot,
        });
    }

    fn attach_frame_observer(&self, document: &Document, body: &Element) {
        let weak = Rc::downgrade(&self.shared);
        let observer = SubtreeObserver::new(body, move |_| {
            if let Some(shared) = weak.upgrade() {
                (shared.handler)(FrameEvent::SubtreeChanged);
            }
        });
        let observer = match observer {
            Ok(observer) => observer,
            Err(e) => {
                tracing::warn!(target: "ghostline::frames", error = %e, "failed to observe frame");
                return;
            }
        };
        let mut frames = self.shared.frames.borrow_mut();
        if let Some(frame) = frames
            .iter_mut()
            .find(|frame| frame.document.is_same_node(Some(document.as_ref())))
        {
            frame.observer = Some(observer);
        }
    }

    /// Forget frames whose document no longer has a window, iframes that
    /// left the page, and finished or expired body waits.
    pub fn prune_detached(&self) {
        self.shared
            .frames
            .borrow_mut()
            .retain(|frame| frame.document.default_view().is_some());
        self.shared
            .iframe_loads
            .borrow_mut()
            .retain(|load| load.iframe.is_connected());
        self.shared.body_waits.borrow_mut().retain(|wait| {
            wait.interval.borrow().is_some() && wait.document.body().is_none()
        });
    }
}

impl SubtreeObserver {
    fn new(
        target: &Node,
        mut on_change: impl FnMut(js_sys::Array) + 'static,
    ) -> Result<Self, DomError> {
        let callback = Closure::<dyn FnMut(js_sys::Array, MutationObserver)>::new(
            move |records: js_sys::Array, _observer: MutationObserver| on_change(records),
        );
        let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        observer.observe_with_options(target, &init)?;
        Ok(Self {
            observer,
            _callback: callback,
        })
    }
}

fn frame_listeners(document: &Document, handler: &FrameEventHandler) -> Vec<EventListener> {
    let passive = EventListenerOptions::default();
    let active = EventListenerOptions::enable_prevent_default();
    let capture = EventListenerOptions::run_in_capture_phase();

    let on = |event_type: &'static str,
              options: EventListenerOptions,
              map: fn(&web_sys::Event) -> Option<FrameEvent>| {
        let handler = handler.clone();
        EventListener::new_with_options(document, event_type, options, move |event| {
            if let Some(frame_event) = map(event) {
                handler(frame_event);
            }
        })
    };

    vec![
        on("focusin", passive, |event| {
            target_element(event).map(FrameEvent::FocusIn)
        }),
        on("input", passive, |_| Some(FrameEvent::Input)),
        on("keydown", active, |event| {
            as_keyboard_event(event).map(FrameEvent::KeyDown)
        }),
        on("scroll", capture, |_| Some(FrameEvent::Scroll)),
        on("mousedown", passive, |event| {
            Some(FrameEvent::MouseDown(target_element(event)))
        }),
    ]
}

/// Iframes among the added nodes of `records`, including ones nested in an
/// added subtree.
fn added_iframes(records: &js_sys::Array) -> Vec<HtmlIFrameElement> {
    let mut found = Vec::new();
    for record in records.iter() {
        let Ok(record) = record.dyn_into::<MutationRecord>() else {
            continue;
        };
        let added = record.added_nodes();
        for i in 0..added.length() {
            let Some(node) = added.item(i) else {
                continue;
            };
            if let Some(iframe) = node.dyn_ref::<HtmlIFrameElement>() {
                found.push(iframe.clone());
                continue;
            }
            let Some(element) = node.dyn_ref::<Element>() else {
                continue;
            };
            let Ok(nested) = element.query_selector_all("iframe") else {
                continue;
            };
            for j in 0..nested.length() {
                if let Some(iframe) = nested
                    .item(j)
                    .and_then(|node| node.dyn_into::<HtmlIFrameElement>().ok())
                {
                    found.push(iframe);
                }
            }
        }
    }
    found
}
