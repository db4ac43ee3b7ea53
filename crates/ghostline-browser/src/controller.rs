//! Runs a [`SuggestionMachine`] against the live page.
//!
//! The controller turns [`FrameEvent`]s into machine calls and carries out
//! the resulting effects: `gloo-timers` timeouts for the machine's timers,
//! `spawn_local` for provider requests, and the overlay, position and
//! insertion adapters for everything visible. DOM failures are logged and
//! absorbed here.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use ghostline_core::{
    Config, Effect, HostProfiles, Instant, Phase, SessionId, SuggestError, SuggestionMachine,
    SuggestionProvider, TimerKind, TimerToken, Transition,
};
use gloo_timers::callback::Timeout;

use crate::classify::SurfaceClassifier;
use crate::error::DomError;
use crate::events::key_press;
use crate::frames::{FrameEvent, FrameEventHandler, FrameRegistry};
use crate::insertion::InsertionAdapter;
use crate::overlay::OverlayRenderer;
use crate::position::PositionEngine;
use crate::surface::Surface;

struct Inner<P> {
    machine: RefCell<SuggestionMachine<Surface>>,
    /// Dropping a `Timeout` cancels it.
    timers: RefCell<HashMap<TimerKind, Timeout>>,
    classifier: SurfaceClassifier,
    adapter: InsertionAdapter,
    position: RefCell<PositionEngine>,
    overlay: RefCell<OverlayRenderer>,
    frames: RefCell<Option<FrameRegistry>>,
    provider: P,
}

pub struct Controller<P: SuggestionProvider + 'static> {
    inner: Rc<Inner<P>>,
}

impl<P: SuggestionProvider + 'static> Clone for Controller<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P: SuggestionProvider + 'static> Controller<P> {
    /// New controller for a page at `hostname`, initially disabled.
    pub fn new(config: &Config, profiles: &HostProfiles, hostname: &str, provider: P) -> Self {
        let classifier = SurfaceClassifier::for_host(profiles, hostname);
        let adapter = InsertionAdapter::new(classifier.profile().cloned());
        Self {
            inner: Rc::new(Inner {
                machine: RefCell::new(SuggestionMachine::new(config.timing)),
                timers: RefCell::new(HashMap::new()),
                classifier,
                adapter,
                position: RefCell::new(PositionEngine::new()),
                overlay: RefCell::new(OverlayRenderer::new(config.overlay.clone())),
                frames: RefCell::new(None),
                provider,
            }),
        }
    }

    /// Register the top document and its frames.
    pub fn install(&self) -> Result<(), DomError> {
        let weak = Rc::downgrade(&self.inner);
        let handler: FrameEventHandler = Rc::new(move |event| {
            if let Some(inner) = weak.upgrade() {
                Controller { inner }.handle(event);
            }
        });
        let frames = FrameRegistry::new(handler);
        frames.register_top()?;
        *self.inner.frames.borrow_mut() = Some(frames);
        Ok(())
    }

    pub fn frames(&self) -> Option<FrameRegistry> {
        self.inner.frames.borrow().clone()
    }

    pub fn phase(&self) -> Phase {
        self.inner.machine.borrow().phase()
    }

    pub fn is_enabled(&self) -> bool {
        self.inner.machine.borrow().is_enabled()
    }

    pub fn set_enabled(&self, enabled: bool) {
        tracing::info!(enabled, "autocomplete toggled");
        let tx = self.inner.machine.borrow_mut().set_enabled(enabled);
        self.apply(tx);
        if !enabled {
            self.inner.timers.borrow_mut().clear();
        }
    }

    /// Text of the suggestion currently on screen.
    pub fn displayed_text(&self) -> Option<String> {
        self.inner
            .machine
            .borrow()
            .displayed_text()
            .map(str::to_string)
    }

    pub fn handle(&self, event: FrameEvent) {
        let now = Instant::now();
        let tx = match event {
            FrameEvent::FocusIn(element) => {
                let Some(surface) = self.inner.classifier.classify(&element) else {
                    return;
                };
                tracing::debug!(kind = %surface.kind(), "editable surface focused");
                self.inner.machine.borrow_mut().focus(surface)
            }
            FrameEvent::Input => self.inner.machine.borrow_mut().input(now),
            FrameEvent::KeyDown(event) => {
                let tx = self.inner.machine.borrow_mut().key_down(&key_press(&event), now);
                if tx.consumed {
                    event.prevent_default();
                }
                tx
            }
            FrameEvent::Scroll => self.inner.machine.borrow_mut().scroll(),
            FrameEvent::MouseDown(target) => {
                let on_overlay = target
                    .as_ref()
                    .is_some_and(|target| self.inner.overlay.borrow().contains(target));
                self.inner.machine.borrow_mut().mouse_down(on_overlay, now)
            }
            FrameEvent::SubtreeChanged => self
                .inner
                .machine
                .borrow_mut()
                .subtree_changed(Surface::is_attached),
        };
        self.apply(tx);
    }

    fn timer_fired(&self, kind: TimerKind, token: TimerToken) {
        let adapter = &self.inner.adapter;
        let tx = self.inner.machine.borrow_mut().timer_fired(
            kind,
            token,
            Instant::now(),
            |surface| adapter.read_caret_state(surface),
        );
        self.apply(tx);
    }

    fn suggestion_resolved(&self, session: SessionId, result: Result<String, SuggestError>) {
        if let Err(e) = &result {
            if e.is_provider_unavailable() {
                tracing::warn!(session, error = %e, "suggestion provider unavailable");
            }
        }
        let adapter = &self.inner.adapter;
        let tx = self.inner.machine.borrow_mut().suggestion_resolved(
            session,
            result,
            Instant::now(),
            |surface| adapter.read_caret_state(surface),
        );
        self.apply(tx);
    }

    fn apply(&self, tx: Transition<Surface>) {
        for effect in tx.effects {
            match effect {
                Effect::ScheduleTimer { kind, token, delay } => {
                    let weak = Rc::downgrade(&self.inner);
                    let millis = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
                    let timeout = Timeout::new(millis, move || {
                        if let Some(inner) = weak.upgrade() {
                            Controller { inner }.timer_fired(kind, token);
                        }
                    });
                    self.inner.timers.borrow_mut().insert(kind, timeout);
                }
                Effect::CancelTimer(kind) => {
                    self.inner.timers.borrow_mut().remove(&kind);
                }
                Effect::RequestSuggestion { session, prompt } => {
                    let inner = Rc::clone(&self.inner);
                    wasm_bindgen_futures::spawn_local(async move {
                        let result = inner.provider.complete(&prompt).await;
                        Controller { inner }.suggestion_resolved(session, result);
                    });
                }
                Effect::ShowOverlay { surface, text } => {
                    if let Err(e) = self.show(&surface, &text) {
                        tracing::warn!(error = %e, "failed to render suggestion");
                        let tx = self.inner.machine.borrow_mut().render_failed();
                        self.apply(tx);
                    }
                }
                Effect::RepositionOverlay => {
                    if let Err(e) = self.reposition() {
                        tracing::debug!(error = %e, "failed to reposition suggestion");
                    }
                }
                Effect::HideOverlay => self.inner.overlay.borrow_mut().hide(),
                Effect::Insert { surface, text } => {
                    if let Err(e) = self.inner.adapter.insert(&surface, &text) {
                        tracing::warn!(kind = %surface.kind(), error = %e, "failed to insert suggestion");
                    }
                }
            }
        }
    }

    fn show(&self, surface: &Surface, text: &str) -> Result<(), DomError> {
        let point = self
            .inner
            .position
            .borrow_mut()
            .caret_pixel(surface, &self.inner.adapter)?;
        self.inner.overlay.borrow_mut().show(surface, text, point)
    }

    fn reposition(&self) -> Result<(), DomError> {
        let Some(surface) = self.inner.overlay.borrow().surface().cloned() else {
            return Ok(());
        };
        let point = self
            .inner
            .position
            .borrow_mut()
            .caret_pixel(&surface, &self.inner.adapter)?;
        self.inner.overlay.borrow_mut().reposition(point)
    }
}
