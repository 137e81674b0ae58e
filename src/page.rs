use std::{cell::Cell, rc::Rc};

use serde::Serialize;

use crate::{
    core::{Fraction, Millis, Viewport},
    error::SightlineResult,
    hub::{EventHub, Subscription},
    model::PageManifest,
    nav::{NavMenu, ScrollCommand},
    reveal::{RevealPhase, RevealRunner, Transition, TransitionScheduler},
    spy::{ScrollSpy, SectionGeometry},
};

/// Host boundary: the scrollable surface the page lives on. Extends plain
/// geometry with viewport metrics and animated scrolling.
pub trait PageSurface: SectionGeometry {
    fn viewport(&self) -> Viewport;

    /// Fraction of the region currently inside the viewport, or None when the
    /// region cannot be resolved.
    fn visible_fraction(&self, id: &str) -> Option<Fraction>;

    /// Starts an animated scroll that brings the region's top to the top of
    /// the viewport.
    fn scroll_to(&mut self, id: &str);
}

/// Something happened on the surface that may have moved geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    Scrolled,
    Resized,
}

/// Everything a frame decided, for the host to apply and for traces to record.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    pub now: Millis,
    /// Whether this frame consumed a pending input notification.
    pub recomputed: bool,
    pub active_changed: bool,
    pub active: Option<String>,
    pub highlighted: Option<String>,
    pub menu_open: bool,
    /// Transitions scheduled this frame (reveal groups that just fired).
    pub scheduled: Vec<Transition>,
    /// Reveal roots that finished playing this frame.
    pub completed: Vec<String>,
}

/// Ties the scroll spy, the reveal runners and the nav menu to one surface.
///
/// The engine is poll-driven: input events only latch a dirty flag, and the
/// next `frame` call does the actual work. However many notifications arrive
/// between frames, geometry is re-read at most once per frame.
pub struct PageEngine {
    spy: ScrollSpy,
    menu: NavMenu,
    reveals: Vec<RevealRunner>,
    pending: Rc<Cell<bool>>,
    input_sub: Option<Subscription<InputEvent>>,
    frame_count: u64,
}

impl PageEngine {
    pub fn new(manifest: PageManifest) -> SightlineResult<Self> {
        manifest.validate()?;

        let mut spy = ScrollSpy::new(manifest.detection_offset);
        spy.register(manifest.sections.iter().cloned());
        let menu = NavMenu::new(manifest.nav.clone(), manifest.menu);
        let reveals = manifest
            .reveals
            .into_iter()
            .map(RevealRunner::new)
            .collect();

        Ok(Self {
            spy,
            menu,
            reveals,
            // Latched so the first frame computes an initial answer even
            // before any input arrives.
            pending: Rc::new(Cell::new(true)),
            input_sub: None,
            frame_count: 0,
        })
    }

    /// Subscribes to the host's input events. The previous attachment, if
    /// any, is dropped. Only a dirty flag is touched inside the callback.
    pub fn attach(&mut self, events: &EventHub<InputEvent>) {
        let pending = Rc::clone(&self.pending);
        self.input_sub = Some(events.subscribe(move |event| {
            tracing::trace!(?event, "input notification");
            pending.set(true);
        }));
    }

    /// Direct notification path for hosts that do not use an event hub.
    pub fn notify(&self, event: InputEvent) {
        tracing::trace!(?event, "input notification");
        self.pending.set(true);
    }

    pub fn active_id(&self) -> Option<&str> {
        self.spy.active_id()
    }

    pub fn menu(&self) -> &NavMenu {
        &self.menu
    }

    pub fn reveal_phase(&self, root: &str) -> Option<RevealPhase> {
        self.reveals
            .iter()
            .find(|runner| runner.root() == root)
            .map(|runner| runner.phase())
    }

    /// Flips the collapsible menu and returns its new state.
    pub fn toggle_menu(&mut self) -> bool {
        self.menu.toggle()
    }

    /// Picks a nav item: closes the menu and, when the item resolves to a
    /// registered section, asks the surface to scroll there.
    pub fn select_item(
        &mut self,
        item_id: &str,
        surface: &mut dyn PageSurface,
    ) -> Option<ScrollCommand> {
        let command = self.menu.select_item(item_id, self.spy.sections());
        if let Some(command) = &command {
            surface.scroll_to(&command.target);
        }
        command
    }

    /// Runs one frame: consumes the input latch, recomputes the active
    /// section, polls reveal triggers and advances their completion clocks.
    #[tracing::instrument(skip(self, surface, scheduler), fields(frame = self.frame_count))]
    pub fn frame(
        &mut self,
        now: Millis,
        surface: &mut dyn PageSurface,
        scheduler: &mut dyn TransitionScheduler,
    ) -> FrameReport {
        self.frame_count += 1;

        let recomputed = self.pending.replace(false);
        let mut active_changed = false;
        let mut scheduled = Vec::new();

        if recomputed {
            let geometry: &dyn SectionGeometry = &*surface;
            active_changed = self.spy.recompute(geometry);

            // Visibility only moves when geometry does, so trigger polling
            // rides the same latch as the spy.
            for runner in &mut self.reveals {
                if runner.phase() != RevealPhase::Idle {
                    continue;
                }
                let fraction = surface.visible_fraction(runner.root());
                scheduled.extend(runner.observe(fraction, now, scheduler));
            }
        }

        let mut completed = Vec::new();
        for runner in &mut self.reveals {
            if runner.advance(now) {
                completed.push(runner.root().to_string());
            }
        }

        let active = self.spy.active_id().map(str::to_string);
        let highlighted = self
            .menu
            .highlighted_item(self.spy.active_id())
            .map(|item| item.id.clone());

        FrameReport {
            now,
            recomputed,
            active_changed,
            active,
            highlighted,
            menu_open: self.menu.is_open(),
            scheduled,
            completed,
        }
    }

    /// Dismantles the page: cancels in-flight transitions and detaches from
    /// the event hub. Consumes the engine so no further frames can run.
    pub fn teardown(mut self, scheduler: &mut dyn TransitionScheduler) {
        for runner in &mut self.reveals {
            runner.teardown(scheduler);
        }
        self.input_sub.take();
        tracing::debug!("page engine torn down");
    }
}
