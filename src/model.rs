use crate::{
    core::{Fraction, Millis},
    ease::Ease,
    error::{SightlineError, SightlineResult},
};

/// One renderable content region. Registration order is the position in the
/// manifest's `sections` list and doubles as the tie-break key.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Section {
    pub id: String,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct NavItem {
    pub id: String, // expected to match a Section.id; mismatches degrade silently
    pub label: String,
}

pub trait Lerp: Sized {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self;
}

impl Lerp for f64 {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        a + (b - a) * t
    }
}

/// Visual state of a reveal item as the host should draw it.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct VisualState {
    pub opacity: f64, // 0..1, clamped when sampled
    pub dy: f64,      // vertical offset from rest position
    pub scale: f64,
}

impl VisualState {
    pub fn hidden() -> Self {
        Self {
            opacity: 0.0,
            dy: 20.0,
            scale: 1.0,
        }
    }

    pub fn shown() -> Self {
        Self {
            opacity: 1.0,
            dy: 0.0,
            scale: 1.0,
        }
    }

    fn validate(&self, what: &str) -> SightlineResult<()> {
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(SightlineError::validation(format!(
                "{what} opacity must be finite and within [0, 1]"
            )));
        }
        if !self.dy.is_finite() {
            return Err(SightlineError::validation(format!(
                "{what} dy must be finite"
            )));
        }
        if !self.scale.is_finite() || self.scale <= 0.0 {
            return Err(SightlineError::validation(format!(
                "{what} scale must be finite and > 0"
            )));
        }
        Ok(())
    }
}

impl Lerp for VisualState {
    fn lerp(a: &Self, b: &Self, t: f64) -> Self {
        Self {
            opacity: <f64 as Lerp>::lerp(&a.opacity, &b.opacity, t),
            dy: <f64 as Lerp>::lerp(&a.dy, &b.dy, t),
            scale: <f64 as Lerp>::lerp(&a.scale, &b.scale, t),
        }
    }
}

/// Group-wide timing: the schedule table is `delay[i] = base_delay + i * stagger_step`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RevealTiming {
    #[serde(default)]
    pub base_delay: Millis,
    #[serde(default = "RevealTiming::default_stagger_step")]
    pub stagger_step: Millis,
    #[serde(default = "RevealTiming::default_duration")]
    pub duration: Millis,
    #[serde(default)]
    pub ease: Ease,
}

impl RevealTiming {
    fn default_stagger_step() -> Millis {
        Millis(200)
    }

    fn default_duration() -> Millis {
        Millis(600)
    }

    pub fn validate(&self) -> SightlineResult<()> {
        if self.stagger_step.0 == 0 {
            return Err(SightlineError::schedule("stagger step must be > 0 ms"));
        }
        if self.duration.0 == 0 {
            return Err(SightlineError::schedule("duration must be > 0 ms"));
        }
        Ok(())
    }
}

impl Default for RevealTiming {
    fn default() -> Self {
        Self {
            base_delay: Millis::ZERO,
            stagger_step: Self::default_stagger_step(),
            duration: Self::default_duration(),
            ease: Ease::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RevealTrigger {
    /// Fires on the first frame after the page mounts, regardless of scroll.
    Mount,
    /// Fires the first time the root's visible fraction reaches the threshold.
    Visible { threshold: Fraction },
}

impl Default for RevealTrigger {
    fn default() -> Self {
        Self::Visible {
            threshold: Fraction::clamped(0.2),
        }
    }
}

/// One element of a reveal group, with optional per-item timing overrides.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RevealItem {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay: Option<Millis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<Millis>,
}

impl RevealItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            delay: None,
            duration: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RevealSpec {
    pub root: String, // id of the region whose visibility triggers the group
    pub items: Vec<RevealItem>,
    #[serde(default)]
    pub trigger: RevealTrigger,
    #[serde(default)]
    pub timing: RevealTiming,
    #[serde(default = "VisualState::hidden")]
    pub hidden: VisualState,
    #[serde(default = "VisualState::shown")]
    pub shown: VisualState,
}

impl RevealSpec {
    /// Schedule table: override wins, otherwise `base_delay + index * stagger_step`.
    pub fn delay_at(&self, index: usize) -> Millis {
        match self.items.get(index).and_then(|item| item.delay) {
            Some(delay) => delay,
            None => self
                .timing
                .base_delay
                .saturating_add(self.timing.stagger_step.saturating_mul(index as u64)),
        }
    }

    pub fn duration_at(&self, index: usize) -> Millis {
        self.items
            .get(index)
            .and_then(|item| item.duration)
            .unwrap_or(self.timing.duration)
    }

    /// Offset from the trigger instant to the end of the last transition.
    pub fn schedule_span(&self) -> Millis {
        (0..self.items.len())
            .map(|i| self.delay_at(i).saturating_add(self.duration_at(i)))
            .max()
            .unwrap_or(Millis::ZERO)
    }

    pub fn validate(&self) -> SightlineResult<()> {
        if self.root.trim().is_empty() {
            return Err(SightlineError::validation(
                "reveal root id must be non-empty",
            ));
        }
        self.timing.validate()?;
        if let RevealTrigger::Visible { threshold } = self.trigger {
            Fraction::new(threshold.value()).map_err(|_| {
                SightlineError::validation(format!(
                    "reveal '{}' threshold must be within [0, 1]",
                    self.root
                ))
            })?;
        }
        self.hidden.validate("hidden state")?;
        self.shown.validate("shown state")?;

        let mut prev: Option<Millis> = None;
        for (index, item) in self.items.iter().enumerate() {
            if item.id.trim().is_empty() {
                return Err(SightlineError::validation(format!(
                    "reveal '{}' item {index} id must be non-empty",
                    self.root
                )));
            }
            if self.duration_at(index).0 == 0 {
                return Err(SightlineError::schedule(format!(
                    "reveal '{}' item '{}' duration must be > 0 ms",
                    self.root, item.id
                )));
            }
            let delay = self.delay_at(index);
            if let Some(prev) = prev
                && delay <= prev
            {
                return Err(SightlineError::schedule(format!(
                    "reveal '{}' delays must be strictly increasing (item '{}')",
                    self.root, item.id
                )));
            }
            prev = Some(delay);
        }
        Ok(())
    }
}

/// Open/close transition the host should apply to the collapsible menu.
/// Menu *state* stays a plain boolean; this only describes the motion.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MenuSpec {
    #[serde(default = "MenuSpec::default_duration")]
    pub duration: Millis,
    #[serde(default = "MenuSpec::default_ease")]
    pub ease: Ease,
}

impl MenuSpec {
    fn default_duration() -> Millis {
        Millis(300)
    }

    fn default_ease() -> Ease {
        Ease::InOutQuad
    }

    pub fn validate(&self) -> SightlineResult<()> {
        if self.duration.0 == 0 {
            return Err(SightlineError::schedule("menu duration must be > 0 ms"));
        }
        Ok(())
    }
}

impl Default for MenuSpec {
    fn default() -> Self {
        Self {
            duration: Self::default_duration(),
            ease: Self::default_ease(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PageManifest {
    pub nav: Vec<NavItem>,
    pub sections: Vec<Section>,
    #[serde(default)]
    pub reveals: Vec<RevealSpec>,
    /// Vertical offset of the detection line from the viewport top.
    #[serde(default = "PageManifest::default_detection_offset")]
    pub detection_offset: f64,
    #[serde(default)]
    pub menu: MenuSpec,
}

impl PageManifest {
    fn default_detection_offset() -> f64 {
        100.0
    }

    /// Duplicate or dangling ids are tolerated by design; they degrade at
    /// runtime instead of failing validation.
    pub fn validate(&self) -> SightlineResult<()> {
        if !self.detection_offset.is_finite() || self.detection_offset < 0.0 {
            return Err(SightlineError::validation(
                "detection offset must be finite and >= 0",
            ));
        }
        for item in &self.nav {
            if item.id.trim().is_empty() {
                return Err(SightlineError::validation("nav item id must be non-empty"));
            }
        }
        for section in &self.sections {
            if section.id.trim().is_empty() {
                return Err(SightlineError::validation("section id must be non-empty"));
            }
        }
        for reveal in &self.reveals {
            reveal.validate()?;
        }
        self.menu.validate()
    }
}
