use serde::Serialize;

use crate::{
    core::{Fraction, Millis},
    ease::Ease,
    model::{Lerp, RevealSpec, RevealTrigger, VisualState},
};

/// Lifecycle of a reveal group. Transitions are monotonic: once a group has
/// played it never rewinds, no matter how visibility changes afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealPhase {
    Idle,
    Playing,
    Done,
}

/// One item's hidden-to-shown animation, handed to the host's scheduler.
/// `delay` counts from the instant the whole group fired.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Transition {
    pub group: String,
    pub item: String,
    pub from: VisualState,
    pub to: VisualState,
    pub delay: Millis,
    pub duration: Millis,
    pub ease: Ease,
}

impl Transition {
    /// Samples the animated state at `elapsed` since the group fired.
    /// Opacity is clamped to [0, 1]; offsets and scale may overshoot.
    pub fn sample(&self, elapsed: Millis) -> VisualState {
        if elapsed <= self.delay {
            return self.from;
        }
        let run = elapsed.saturating_sub(self.delay);
        if run >= self.duration {
            return self.to;
        }
        let t = self.ease.apply(run.as_f64() / self.duration.as_f64());
        let mut state = VisualState::lerp(&self.from, &self.to, t);
        state.opacity = state.opacity.clamp(0.0, 1.0);
        state
    }
}

/// Opaque ticket for a scheduled transition, used to cancel it on teardown.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TransitionHandle(pub u64);

/// Host boundary: something that can run timed transitions.
pub trait TransitionScheduler {
    fn schedule(&mut self, transition: Transition) -> TransitionHandle;
    fn cancel(&mut self, handle: TransitionHandle);
}

/// Drives one reveal group from Idle through Playing to Done.
///
/// The runner is poll-based: the engine feeds it the root's visible fraction
/// each frame and it decides whether the trigger condition has been met. It
/// fires at most once per lifetime.
pub struct RevealRunner {
    spec: RevealSpec,
    phase: RevealPhase,
    triggered_at: Option<Millis>,
    in_flight: Vec<TransitionHandle>,
    root_missing_reported: bool,
}

impl RevealRunner {
    pub fn new(spec: RevealSpec) -> Self {
        Self {
            spec,
            phase: RevealPhase::Idle,
            triggered_at: None,
            in_flight: Vec::new(),
            root_missing_reported: false,
        }
    }

    pub fn spec(&self) -> &RevealSpec {
        &self.spec
    }

    pub fn root(&self) -> &str {
        &self.spec.root
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    /// Visual state an item should present while no transition is running:
    /// the hidden pose before the group fires, the shown pose after.
    pub fn resting_state(&self) -> &VisualState {
        match self.phase {
            RevealPhase::Idle => &self.spec.hidden,
            RevealPhase::Playing | RevealPhase::Done => &self.spec.shown,
        }
    }

    /// Feeds this frame's trigger condition. `visible` is the root's visible
    /// fraction, or None when the root cannot be resolved. Returns the
    /// transitions scheduled this frame (empty unless the group just fired).
    pub fn observe(
        &mut self,
        visible: Option<Fraction>,
        now: Millis,
        scheduler: &mut dyn TransitionScheduler,
    ) -> Vec<Transition> {
        if self.phase != RevealPhase::Idle {
            return Vec::new();
        }
        let fired = match self.spec.trigger {
            RevealTrigger::Mount => true,
            RevealTrigger::Visible { threshold } => match visible {
                Some(fraction) => fraction.value() >= threshold.value(),
                None => {
                    if !self.root_missing_reported {
                        self.root_missing_reported = true;
                        tracing::debug!(
                            "reveal root '{}' is unresolvable; group stays idle",
                            self.spec.root
                        );
                    }
                    false
                }
            },
        };
        if !fired {
            return Vec::new();
        }
        self.fire(now, scheduler)
    }

    fn fire(&mut self, now: Millis, scheduler: &mut dyn TransitionScheduler) -> Vec<Transition> {
        if self.spec.items.is_empty() {
            self.phase = RevealPhase::Done;
            tracing::debug!("reveal group '{}' has no items; done immediately", self.spec.root);
            return Vec::new();
        }

        self.phase = RevealPhase::Playing;
        self.triggered_at = Some(now);
        tracing::debug!(
            "reveal group '{}' fired: {} item(s) over {}ms",
            self.spec.root,
            self.spec.items.len(),
            self.spec.schedule_span().0
        );

        let mut scheduled = Vec::with_capacity(self.spec.items.len());
        for (index, item) in self.spec.items.iter().enumerate() {
            let transition = Transition {
                group: self.spec.root.clone(),
                item: item.id.clone(),
                from: self.spec.hidden,
                to: self.spec.shown,
                delay: self.spec.delay_at(index),
                duration: self.spec.duration_at(index),
                ease: self.spec.timing.ease,
            };
            self.in_flight.push(scheduler.schedule(transition.clone()));
            scheduled.push(transition);
        }
        scheduled
    }

    /// Advances the completion clock. Returns true on the frame the group
    /// finishes playing.
    pub fn advance(&mut self, now: Millis) -> bool {
        if self.phase != RevealPhase::Playing {
            return false;
        }
        let Some(triggered_at) = self.triggered_at else {
            return false;
        };
        if now < triggered_at.saturating_add(self.spec.schedule_span()) {
            return false;
        }
        self.phase = RevealPhase::Done;
        self.in_flight.clear();
        tracing::debug!("reveal group '{}' done", self.spec.root);
        true
    }

    /// Cancels whatever is still in flight. The phase is left untouched.
    pub fn teardown(&mut self, scheduler: &mut dyn TransitionScheduler) {
        for handle in self.in_flight.drain(..) {
            scheduler.cancel(handle);
        }
    }
}
