//! The suggestion lifecycle state machine.
//!
//! [`SuggestionMachine`] is sans-IO: every handler takes the current time and
//! returns a [`Transition`] listing the [`Effect`]s the host must carry out
//! (arm or cancel timers, issue a request, show/hide/move the overlay,
//! insert text). The host feeds timer expiries and request results back in.
//! Timers carry a [`TimerToken`]; an expiry whose token is no longer the
//! pending one is ignored, so cancelled timers are harmless even if the host
//! fails to clear them.
//!
//! The machine is generic over the surface handle `S`. The browser layer
//! uses a DOM element wrapper; tests use plain integers.

use std::time::Duration;

use smol_str::SmolStr;
use web_time::Instant;

use crate::caret::CaretState;
use crate::config::TimingConfig;
use crate::error::SuggestError;

/// Identifies one request/display lifecycle.
pub type SessionId = u64;

/// The three timers the machine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Coalesces bursts of `input` events.
    Debounce,
    /// Clears the "user is typing" flag.
    TypingStopped,
    /// Issues the request once cooldown and typing allow it.
    Request,
}

impl TimerKind {
    pub const ALL: [TimerKind; 3] = [
        TimerKind::Debounce,
        TimerKind::TypingStopped,
        TimerKind::Request,
    ];
}

/// Token identifying one arming of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

/// Side effects requested by the machine, in the order they must be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect<S> {
    /// Arm `kind` to fire after `delay`, replacing any pending timer of the
    /// same kind.
    ScheduleTimer {
        kind: TimerKind,
        token: TimerToken,
        delay: Duration,
    },
    CancelTimer(TimerKind),
    /// Ask the provider to continue `prompt`; report back with `session`.
    RequestSuggestion { session: SessionId, prompt: String },
    /// Render ghost text for `surface`, replacing any existing overlay.
    ShowOverlay { surface: S, text: String },
    /// Recompute overlay coordinates without touching its styles.
    RepositionOverlay,
    HideOverlay,
    /// Write accepted text into `surface` at its caret.
    Insert { surface: S, text: String },
}

/// Result of feeding one event to the machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Transition<S> {
    pub effects: Vec<Effect<S>>,
    /// The triggering DOM event was handled and its default must be
    /// prevented.
    pub consumed: bool,
}

impl<S> Default for Transition<S> {
    fn default() -> Self {
        Self {
            effects: Vec::new(),
            consumed: false,
        }
    }
}

impl<S> Transition<S> {
    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && !self.consumed
    }
}

/// Observable lifecycle phase, derived from pending work.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    ArmedForDebounce,
    WaitingCooldownOrTypingStop,
    RequestInFlight,
    Displaying,
}

/// A key press as seen by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: SmolStr,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<SmolStr>, shift: bool) -> Self {
        Self {
            key: key.into(),
            shift,
        }
    }

    /// Plain `Tab` accepts the displayed suggestion.
    pub fn is_accept(&self) -> bool {
        self.key == "Tab" && !self.shift
    }
}

/// One request/display lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionSession {
    pub id: SessionId,
    pub requested_at: Instant,
    pub prompt_text: String,
    pub result_text: Option<String>,
    /// An overlay for this session is on screen.
    pub rendered: bool,
}

/// Process-wide timing facts.
#[derive(Debug, Clone, Default)]
struct TimingState {
    last_accepted_or_shown_at: Option<Instant>,
    typing_since: Option<Instant>,
}

impl TimingState {
    fn is_typing(&self, now: Instant, window: Duration) -> bool {
        self.typing_since
            .is_some_and(|since| now.saturating_duration_since(since) < window)
    }

    fn cooldown_remaining(&self, now: Instant, cooldown: Duration) -> Option<Duration> {
        let last = self.last_accepted_or_shown_at?;
        let elapsed = now.saturating_duration_since(last);
        (elapsed < cooldown).then(|| cooldown - elapsed)
    }
}

#[derive(Debug, Clone, Default)]
struct PendingTimers {
    debounce: Option<TimerToken>,
    typing_stopped: Option<TimerToken>,
    request: Option<TimerToken>,
    next_token: u64,
}

impl PendingTimers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerToken> {
        match kind {
            TimerKind::Debounce => &mut self.debounce,
            TimerKind::TypingStopped => &mut self.typing_stopped,
            TimerKind::Request => &mut self.request,
        }
    }

    fn is_pending(&self, kind: TimerKind) -> bool {
        match kind {
            TimerKind::Debounce => self.debounce.is_some(),
            TimerKind::TypingStopped => self.typing_stopped.is_some(),
            TimerKind::Request => self.request.is_some(),
        }
    }
}

/// All mutable state of the machine, owned in one place.
#[derive(Debug, Clone)]
pub struct SessionContext<S> {
    enabled: bool,
    surface: Option<S>,
    timing: TimingState,
    timers: PendingTimers,
    /// Prompt captured at debounce time, waiting on the request timer.
    pending_prompt: Option<String>,
    in_flight: Option<SuggestionSession>,
    displayed: Option<SuggestionSession>,
    next_session: SessionId,
}

impl<S> Default for SessionContext<S> {
    fn default() -> Self {
        Self {
            enabled: false,
            surface: None,
            timing: TimingState::default(),
            timers: PendingTimers::default(),
            pending_prompt: None,
            in_flight: None,
            displayed: None,
            next_session: 1,
        }
    }
}

/// Coordinates debounce, cooldown, requests and the overlay for the single
/// active surface.
#[derive(Debug, Clone)]
pub struct SuggestionMachine<S> {
    config: TimingConfig,
    ctx: SessionContext<S>,
}

impl<S: Clone + PartialEq> SuggestionMachine<S> {
    /// New machine, initially disabled.
    pub fn new(config: TimingConfig) -> Self {
        Self {
            config,
            ctx: SessionContext::default(),
        }
    }

    pub fn config(&self) -> &TimingConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.ctx.enabled
    }

    pub fn active_surface(&self) -> Option<&S> {
        self.ctx.surface.as_ref()
    }

    /// Text of the suggestion currently on screen.
    pub fn displayed_text(&self) -> Option<&str> {
        self.ctx
            .displayed
            .as_ref()
            .and_then(|s| s.result_text.as_deref())
    }

    pub fn in_flight(&self) -> Option<&SuggestionSession> {
        self.ctx.in_flight.as_ref()
    }

    pub fn is_user_actively_typing(&self, now: Instant) -> bool {
        self.ctx.timing.is_typing(now, self.config.typing_idle())
    }

    pub fn phase(&self) -> Phase {
        let timers = &self.ctx.timers;
        if timers.is_pending(TimerKind::Debounce) {
            Phase::ArmedForDebounce
        } else if timers.is_pending(TimerKind::Request) {
            Phase::WaitingCooldownOrTypingStop
        } else if self.ctx.in_flight.is_some() {
            Phase::RequestInFlight
        } else if self.ctx.displayed.is_some() {
            Phase::Displaying
        } else {
            Phase::Idle
        }
    }

    /// External toggle. Disabling tears everything down synchronously.
    pub fn set_enabled(&mut self, enabled: bool) -> Transition<S> {
        let mut tx = Transition::default();
        if enabled {
            self.ctx.enabled = true;
            tracing::debug!(target: "ghostline::machine", "enabled");
            return tx;
        }
        self.teardown(&mut tx.effects);
        self.ctx.timing.typing_since = None;
        self.ctx.enabled = false;
        tracing::debug!(target: "ghostline::machine", "disabled");
        tx
    }

    /// A classified surface received focus.
    pub fn focus(&mut self, surface: S) -> Transition<S> {
        let mut tx = Transition::default();
        if !self.ctx.enabled || self.ctx.surface.as_ref() == Some(&surface) {
            return tx;
        }

        // The previous surface's overlay and pending prompt no longer apply.
        self.hide(&mut tx.effects);
        self.cancel(TimerKind::Debounce, &mut tx.effects);
        self.cancel(TimerKind::Request, &mut tx.effects);
        self.ctx.pending_prompt = None;
        self.ctx.in_flight = None;

        self.ctx.surface = Some(surface);
        tracing::debug!(target: "ghostline::machine", "active surface changed");
        tx
    }

    /// An `input` event on any registered frame.
    ///
    /// Also counts as typing, so a request already waiting on its timer
    /// cannot go out within the typing window of this keystroke.
    pub fn input(&mut self, now: Instant) -> Transition<S> {
        let mut tx = Transition::default();
        if !self.ctx.enabled || self.ctx.surface.is_none() {
            return tx;
        }
        self.ctx.timing.typing_since = Some(now);
        let delay = self.config.debounce();
        self.schedule(TimerKind::Debounce, delay, &mut tx.effects);
        tx
    }

    /// A timer armed by a previous [`Effect::ScheduleTimer`] expired.
    ///
    /// `read_caret` is only called when the debounce evaluation needs a
    /// fresh snapshot of the active surface.
    pub fn timer_fired(
        &mut self,
        kind: TimerKind,
        token: TimerToken,
        now: Instant,
        read_caret: impl FnOnce(&S) -> Option<CaretState>,
    ) -> Transition<S> {
        let mut tx = Transition::default();
        if !self.ctx.enabled {
            return tx;
        }
        let slot = self.ctx.timers.slot(kind);
        if *slot != Some(token) {
            tracing::trace!(target: "ghostline::machine", ?kind, "ignoring stale timer");
            return tx;
        }
        *slot = None;

        match kind {
            TimerKind::Debounce => self.evaluate(now, read_caret, &mut tx.effects),
            TimerKind::TypingStopped => {
                // A later keystroke may have extended the window.
                if !self.is_user_actively_typing(now) {
                    self.ctx.timing.typing_since = None;
                }
            }
            TimerKind::Request => self.request_due(now, &mut tx.effects),
        }
        tx
    }

    /// The provider settled for `session`.
    ///
    /// The result is applied only if `session` is still the outstanding
    /// request and the surface's text before the caret still equals the
    /// prompt.
    pub fn suggestion_resolved(
        &mut self,
        session: SessionId,
        result: Result<String, SuggestError>,
        now: Instant,
        read_caret: impl FnOnce(&S) -> Option<CaretState>,
    ) -> Transition<S> {
        let mut tx = Transition::default();
        if !self.ctx.enabled {
            return tx;
        }
        let Some(in_flight) = self.ctx.in_flight.take_if(|s| s.id == session) else {
            tracing::debug!(target: "ghostline::machine", session, "discarding superseded result");
            return tx;
        };
        let Some(surface) = self.ctx.surface.clone() else {
            return tx;
        };

        let text = match result {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => {
                tracing::debug!(session, "provider returned nothing");
                self.hide(&mut tx.effects);
                return tx;
            }
            Err(e) => {
                tracing::debug!(session, error = %e, "suggestion unavailable");
                self.hide(&mut tx.effects);
                return tx;
            }
        };

        let current = read_caret(&surface);
        if current.as_ref().map(CaretState::text_before_caret) != Some(in_flight.prompt_text.as_str())
        {
            tracing::debug!(target: "ghostline::machine", session, "prompt changed while in flight");
            return tx;
        }

        tracing::debug!(session, len = text.len(), "displaying suggestion");
        tx.effects.push(Effect::ShowOverlay {
            surface,
            text: text.clone(),
        });
        self.ctx.displayed = Some(SuggestionSession {
            result_text: Some(text),
            rendered: true,
            ..in_flight
        });
        self.ctx.timing.last_accepted_or_shown_at = Some(now);
        tx
    }

    /// A keydown on any registered frame.
    pub fn key_down(&mut self, key: &KeyPress, now: Instant) -> Transition<S> {
        let mut tx = Transition::default();
        if !self.ctx.enabled || !key.is_accept() {
            return tx;
        }
        let (Some(surface), Some(text)) = (self.ctx.surface.clone(), self.displayed_text()) else {
            return tx;
        };
        let text = text.to_string();

        tracing::debug!(len = text.len(), "accepting suggestion");
        tx.consumed = true;
        tx.effects.push(Effect::Insert { surface, text });
        self.hide(&mut tx.effects);
        // The insertion changes the text a waiting request was built from.
        self.cancel(TimerKind::Request, &mut tx.effects);
        self.ctx.pending_prompt = None;
        self.ctx.timing.last_accepted_or_shown_at = Some(now);
        tx
    }

    /// A mousedown; `on_overlay` is true when it hit the overlay itself.
    pub fn mouse_down(&mut self, on_overlay: bool, now: Instant) -> Transition<S> {
        let mut tx = Transition::default();
        if !self.ctx.enabled || on_overlay || self.ctx.displayed.is_none() {
            return tx;
        }
        self.hide(&mut tx.effects);
        self.ctx.timing.last_accepted_or_shown_at = Some(now);
        tx
    }

    /// The host could not render the suggestion it was asked to show.
    ///
    /// The suggestion is dropped so `Tab` cannot accept invisible text. The
    /// cooldown timestamp is left as set by the display attempt.
    pub fn render_failed(&mut self) -> Transition<S> {
        let mut tx = Transition::default();
        self.hide(&mut tx.effects);
        tx
    }

    /// A scroll anywhere; only moves a visible overlay.
    pub fn scroll(&mut self) -> Transition<S> {
        let mut tx = Transition::default();
        if self.ctx.enabled && self.ctx.displayed.is_some() {
            tx.effects.push(Effect::RepositionOverlay);
        }
        tx
    }

    /// A registered frame's subtree changed; drop the surface if it left
    /// its document.
    pub fn subtree_changed(&mut self, is_attached: impl FnOnce(&S) -> bool) -> Transition<S> {
        let mut tx = Transition::default();
        let Some(surface) = &self.ctx.surface else {
            return tx;
        };
        if is_attached(surface) {
            return tx;
        }
        tracing::debug!(target: "ghostline::machine", "active surface detached");
        self.teardown(&mut tx.effects);
        tx
    }

    fn evaluate(
        &mut self,
        now: Instant,
        read_caret: impl FnOnce(&S) -> Option<CaretState>,
        effects: &mut Vec<Effect<S>>,
    ) {
        let Some(surface) = &self.ctx.surface else {
            return;
        };
        let caret = read_caret(surface);
        let Some(caret) = caret.filter(|c| c.has_enough_context(self.config.min_context_chars))
        else {
            tracing::trace!(target: "ghostline::machine", "not enough context");
            self.cancel(TimerKind::Request, effects);
            self.ctx.pending_prompt = None;
            self.ctx.in_flight = None;
            self.hide(effects);
            return;
        };

        self.ctx.timing.typing_since = Some(now);
        self.schedule(TimerKind::TypingStopped, self.config.typing_idle(), effects);

        let delay = self
            .ctx
            .timing
            .cooldown_remaining(now, self.config.cooldown())
            .unwrap_or_else(|| self.config.typing_idle());
        tracing::trace!(
            target: "ghostline::machine",
            delay_ms = delay.as_millis() as u64,
            "request scheduled"
        );
        self.ctx.pending_prompt = Some(caret.text_before_caret().to_string());
        self.schedule(TimerKind::Request, delay, effects);
    }

    fn request_due(&mut self, now: Instant, effects: &mut Vec<Effect<S>>) {
        let Some(prompt) = self.ctx.pending_prompt.take() else {
            return;
        };
        if self.is_user_actively_typing(now) {
            tracing::trace!(target: "ghostline::machine", "still typing, dropping request");
            return;
        }
        if let Some(remaining) = self.ctx.timing.cooldown_remaining(now, self.config.cooldown()) {
            self.ctx.pending_prompt = Some(prompt);
            self.schedule(TimerKind::Request, remaining, effects);
            return;
        }

        let id = self.ctx.next_session;
        self.ctx.next_session += 1;
        if let Some(previous) = &self.ctx.in_flight {
            tracing::debug!(
                target: "ghostline::machine",
                superseded = previous.id,
                session = id,
                "superseding outstanding request"
            );
        }
        tracing::debug!(session = id, prompt_len = prompt.len(), "issuing suggestion request");
        effects.push(Effect::RequestSuggestion {
            session: id,
            prompt: prompt.clone(),
        });
        self.ctx.in_flight = Some(SuggestionSession {
            id,
            requested_at: now,
            prompt_text: prompt,
            result_text: None,
            rendered: false,
        });
    }

    fn schedule(&mut self, kind: TimerKind, delay: Duration, effects: &mut Vec<Effect<S>>) {
        let token = TimerToken(self.ctx.timers.next_token);
        self.ctx.timers.next_token += 1;
        *self.ctx.timers.slot(kind) = Some(token);
        effects.push(Effect::ScheduleTimer { kind, token, delay });
    }

    fn cancel(&mut self, kind: TimerKind, effects: &mut Vec<Effect<S>>) {
        if self.ctx.timers.slot(kind).take().is_some() {
            effects.push(Effect::CancelTimer(kind));
        }
    }

    fn hide(&mut self, effects: &mut Vec<Effect<S>>) {
        if self.ctx.displayed.take().is_some() {
            effects.push(Effect::HideOverlay);
        }
    }

    /// Clear the surface, the overlay and every pending timer or request.
    fn teardown(&mut self, effects: &mut Vec<Effect<S>>) {
        self.ctx.surface = None;
        self.hide(effects);
        for kind in TimerKind::ALL {
            self.cancel(kind, effects);
        }
        self.ctx.pending_prompt = None;
        self.ctx.in_flight = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled() -> SuggestionMachine<u32> {
        let mut machine = SuggestionMachine::new(TimingConfig::default());
        machine.set_enabled(true);
        machine
    }

    fn token_of(tx: &Transition<u32>, kind: TimerKind) -> TimerToken {
        tx.effects
            .iter()
            .find_map(|e| match e {
                Effect::ScheduleTimer { kind: k, token, .. } if *k == kind => Some(*token),
                _ => None,
            })
            .expect("timer scheduled")
    }

    #[test]
    fn disabled_machine_ignores_events() {
        let mut machine = SuggestionMachine::<u32>::new(TimingConfig::default());
        assert!(machine.focus(1).is_empty());
        assert!(machine.input(Instant::now()).is_empty());
        assert_eq!(machine.active_surface(), None);
    }

    #[test]
    fn input_without_surface_is_ignored() {
        let mut machine = enabled();
        assert!(machine.input(Instant::now()).is_empty());
        assert_eq!(machine.phase(), Phase::Idle);
    }

    #[test]
    fn input_arms_debounce() {
        let mut machine = enabled();
        machine.focus(7);
        let tx = machine.input(Instant::now());
        assert!(matches!(
            tx.effects.as_slice(),
            [Effect::ScheduleTimer { kind: TimerKind::Debounce, delay, .. }]
                if *delay == Duration::from_millis(300)
        ));
        assert_eq!(machine.phase(), Phase::ArmedForDebounce);
    }

    #[test]
    fn stale_debounce_token_is_ignored() {
        let mut machine = enabled();
        machine.focus(7);
        let now = Instant::now();
        let first = token_of(&machine.input(now), TimerKind::Debounce);
        let _second = machine.input(now);
        let tx = machine.timer_fired(TimerKind::Debounce, first, now, |_| {
            panic!("stale timer must not read the caret")
        });
        assert!(tx.is_empty());
        assert_eq!(machine.phase(), Phase::ArmedForDebounce);
    }

    #[test]
    fn render_failure_drops_suggestion() {
        let mut machine = enabled();
        machine.focus(7);
        let now = Instant::now();
        let debounce = token_of(&machine.input(now), TimerKind::Debounce);
        let later = now + Duration::from_millis(300);
        let tx = machine.timer_fired(TimerKind::Debounce, debounce, later, |_| {
            Some(CaretState::at_end("Hello"))
        });
        let request = token_of(&tx, TimerKind::Request);
        let later = later + Duration::from_millis(1000);
        let tx = machine.timer_fired(TimerKind::Request, request, later, |_| None);
        let session = tx
            .effects
            .iter()
            .find_map(|e| match e {
                Effect::RequestSuggestion { session, .. } => Some(*session),
                _ => None,
            })
            .expect("request issued");
        machine.suggestion_resolved(session, Ok(" world".into()), later, |_| {
            Some(CaretState::at_end("Hello"))
        });
        assert_eq!(machine.displayed_text(), Some(" world"));

        let tx = machine.render_failed();
        assert_eq!(tx.effects, vec![Effect::HideOverlay]);
        assert_eq!(machine.displayed_text(), None);
        assert!(!machine.key_down(&KeyPress::new("Tab", false), later).consumed);
    }

    #[test]
    fn shift_tab_is_not_accept() {
        assert!(KeyPress::new("Tab", false).is_accept());
        assert!(!KeyPress::new("Tab", true).is_accept());
        assert!(!KeyPress::new("Enter", false).is_accept());
    }
}
