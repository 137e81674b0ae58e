//! Deterministic in-memory host, used by the trace tool and integration
//! tests. Blocks are laid out in document coordinates; scrolling moves a
//! single offset and smooth scrolls glide along an easing curve.

use crate::{
    core::{Fraction, Millis, Rect, Viewport},
    ease::Ease,
    error::{SightlineError, SightlineResult},
    model::{Lerp, VisualState},
    page::PageSurface,
    reveal::{Transition, TransitionHandle, TransitionScheduler},
    spy::SectionGeometry,
};

/// One laid-out content block, in document coordinates.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimBlock {
    pub id: String,
    pub top: f64,
    pub height: f64,
}

struct Glide {
    from: f64,
    to: f64,
    started_at: Millis,
    duration: Millis,
    ease: Ease,
}

/// Scrollable document with a fixed block layout.
pub struct SimDocument {
    viewport: Viewport,
    blocks: Vec<SimBlock>,
    scroll_top: f64,
    now: Millis,
    glide: Option<Glide>,
    scroll_duration: Millis,
    scroll_ease: Ease,
}

impl SimDocument {
    pub fn new(viewport: Viewport, blocks: Vec<SimBlock>) -> SightlineResult<Self> {
        for block in &blocks {
            if block.id.trim().is_empty() {
                return Err(SightlineError::validation("block id must be non-empty"));
            }
            if !block.top.is_finite() {
                return Err(SightlineError::validation(format!(
                    "block '{}' top must be finite",
                    block.id
                )));
            }
            if !block.height.is_finite() || block.height <= 0.0 {
                return Err(SightlineError::validation(format!(
                    "block '{}' height must be finite and > 0",
                    block.id
                )));
            }
        }
        Ok(Self {
            viewport,
            blocks,
            scroll_top: 0.0,
            now: Millis::ZERO,
            glide: None,
            scroll_duration: Millis(500),
            scroll_ease: Ease::InOutCubic,
        })
    }

    /// Overrides how animated scrolls move.
    pub fn with_scroll_animation(mut self, duration: Millis, ease: Ease) -> Self {
        self.scroll_duration = duration;
        self.scroll_ease = ease;
        self
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }

    fn content_height(&self) -> f64 {
        self.blocks
            .iter()
            .map(|block| block.top + block.height)
            .fold(0.0, f64::max)
    }

    fn max_scroll(&self) -> f64 {
        (self.content_height() - self.viewport.height).max(0.0)
    }

    /// Jumps straight to a position, as a wheel or drag would. Any animated
    /// scroll in progress loses to the direct gesture.
    pub fn set_scroll(&mut self, top: f64) {
        self.glide = None;
        self.scroll_top = if top.is_finite() {
            top.clamp(0.0, self.max_scroll())
        } else {
            0.0
        };
    }

    pub fn scroll_by(&mut self, delta: f64) {
        self.set_scroll(self.scroll_top + delta);
    }

    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scroll_top = self.scroll_top.clamp(0.0, self.max_scroll());
    }

    /// Advances the clock, moving any animated scroll along its curve.
    /// Returns true while the scroll position is being animated.
    pub fn tick(&mut self, now: Millis) -> bool {
        self.now = now;
        let Some(glide) = &self.glide else {
            return false;
        };

        let elapsed = now.saturating_sub(glide.started_at);
        if elapsed >= glide.duration {
            // The range may have shrunk since the command was issued.
            self.scroll_top = glide.to.clamp(0.0, self.max_scroll());
            self.glide = None;
        } else {
            let t = glide.ease.apply(elapsed.as_f64() / glide.duration.as_f64());
            let position = <f64 as Lerp>::lerp(&glide.from, &glide.to, t);
            self.scroll_top = position.clamp(0.0, self.max_scroll());
        }
        true
    }
}

impl SectionGeometry for SimDocument {
    fn section_rect(&self, id: &str) -> Option<Rect> {
        let block = self.blocks.iter().find(|block| block.id == id)?;
        let top = block.top - self.scroll_top;
        Some(Rect::new(0.0, top, self.viewport.width, top + block.height))
    }
}

impl PageSurface for SimDocument {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn visible_fraction(&self, id: &str) -> Option<Fraction> {
        let rect = self.section_rect(id)?;
        let visible = rect.max_y().min(self.viewport.height) - rect.min_y().max(0.0);
        Some(Fraction::clamped(visible / rect.height()))
    }

    fn scroll_to(&mut self, id: &str) {
        let Some(block) = self.blocks.iter().find(|block| block.id == id) else {
            tracing::debug!("scroll target '{id}' has no block; ignoring");
            return;
        };
        let target = block.top.clamp(0.0, self.max_scroll());
        if (target - self.scroll_top).abs() < f64::EPSILON {
            return;
        }
        self.glide = Some(Glide {
            from: self.scroll_top,
            to: target,
            started_at: self.now,
            duration: self.scroll_duration,
            ease: self.scroll_ease,
        });
    }
}

struct Running {
    handle: TransitionHandle,
    scheduled_at: Millis,
    transition: Transition,
}

impl Running {
    fn elapsed(&self, now: Millis) -> Millis {
        now.saturating_sub(self.scheduled_at)
    }

    fn finished(&self, now: Millis) -> bool {
        self.elapsed(now) >= self.transition.delay.saturating_add(self.transition.duration)
    }
}

/// Transition scheduler that runs everything on a sampled clock.
#[derive(Default)]
pub struct SimScheduler {
    running: Vec<Running>,
    now: Millis,
    next_handle: u64,
    cancelled: usize,
}

impl SimScheduler {
    pub fn tick(&mut self, now: Millis) {
        self.now = now;
    }

    /// Current state of a transition's item, sampled at the clock. The most
    /// recently scheduled transition for the item wins.
    pub fn sample(&self, item: &str) -> Option<VisualState> {
        self.running
            .iter()
            .rev()
            .find(|running| running.transition.item == item)
            .map(|running| running.transition.sample(running.elapsed(self.now)))
    }

    /// Transitions scheduled and not yet finished, with sampled states.
    pub fn in_flight(&self) -> Vec<(String, VisualState)> {
        self.running
            .iter()
            .filter(|running| !running.finished(self.now))
            .map(|running| {
                (
                    running.transition.item.clone(),
                    running.transition.sample(running.elapsed(self.now)),
                )
            })
            .collect()
    }

    pub fn cancelled_count(&self) -> usize {
        self.cancelled
    }
}

impl TransitionScheduler for SimScheduler {
    fn schedule(&mut self, transition: Transition) -> TransitionHandle {
        self.next_handle += 1;
        let handle = TransitionHandle(self.next_handle);
        self.running.push(Running {
            handle,
            scheduled_at: self.now,
            transition,
        });
        handle
    }

    fn cancel(&mut self, handle: TransitionHandle) {
        let before = self.running.len();
        self.running.retain(|running| running.handle != handle);
        if self.running.len() < before {
            self.cancelled += 1;
        }
    }
}
