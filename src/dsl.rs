use crate::{
    core::{Fraction, Millis},
    ease::Ease,
    error::SightlineResult,
    model::{
        MenuSpec, NavItem, PageManifest, RevealItem, RevealSpec, RevealTiming, RevealTrigger,
        Section, VisualState,
    },
};

pub struct PageBuilder {
    nav: Vec<NavItem>,
    sections: Vec<Section>,
    reveals: Vec<RevealSpec>,
    detection_offset: f64,
    menu: MenuSpec,
}

impl PageBuilder {
    pub fn new() -> Self {
        Self {
            nav: Vec::new(),
            sections: Vec::new(),
            reveals: Vec::new(),
            detection_offset: 100.0,
            menu: MenuSpec::default(),
        }
    }

    pub fn detection_offset(mut self, offset: f64) -> Self {
        self.detection_offset = offset;
        self
    }

    pub fn menu(mut self, menu: MenuSpec) -> Self {
        self.menu = menu;
        self
    }

    pub fn section(mut self, id: impl Into<String>) -> Self {
        self.sections.push(Section { id: id.into() });
        self
    }

    pub fn nav_item(mut self, id: impl Into<String>, label: impl Into<String>) -> Self {
        self.nav.push(NavItem {
            id: id.into(),
            label: label.into(),
        });
        self
    }

    /// Registers a section together with its nav entry, the common case.
    pub fn nav_section(self, id: impl Into<String>, label: impl Into<String>) -> Self {
        let id = id.into();
        self.section(id.clone()).nav_item(id, label)
    }

    pub fn reveal(mut self, spec: RevealSpec) -> Self {
        self.reveals.push(spec);
        self
    }

    pub fn build(self) -> SightlineResult<PageManifest> {
        let manifest = PageManifest {
            nav: self.nav,
            sections: self.sections,
            reveals: self.reveals,
            detection_offset: self.detection_offset,
            menu: self.menu,
        };
        manifest.validate()?;
        Ok(manifest)
    }
}

impl Default for PageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub struct RevealBuilder {
    root: String,
    items: Vec<RevealItem>,
    trigger: RevealTrigger,
    timing: RevealTiming,
    hidden: VisualState,
    shown: VisualState,
}

impl RevealBuilder {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            items: Vec::new(),
            trigger: RevealTrigger::default(),
            timing: RevealTiming::default(),
            hidden: VisualState::hidden(),
            shown: VisualState::shown(),
        }
    }

    pub fn item(mut self, id: impl Into<String>) -> Self {
        self.items.push(RevealItem::new(id));
        self
    }

    /// Adds an item carrying its own timing overrides.
    pub fn item_with(mut self, item: RevealItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn on_mount(mut self) -> Self {
        self.trigger = RevealTrigger::Mount;
        self
    }

    pub fn when_visible(mut self, threshold: f64) -> SightlineResult<Self> {
        self.trigger = RevealTrigger::Visible {
            threshold: Fraction::new(threshold)?,
        };
        Ok(self)
    }

    pub fn base_delay(mut self, delay: Millis) -> Self {
        self.timing.base_delay = delay;
        self
    }

    pub fn stagger_step(mut self, step: Millis) -> Self {
        self.timing.stagger_step = step;
        self
    }

    pub fn duration(mut self, duration: Millis) -> Self {
        self.timing.duration = duration;
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.timing.ease = ease;
        self
    }

    pub fn hidden(mut self, state: VisualState) -> Self {
        self.hidden = state;
        self
    }

    pub fn shown(mut self, state: VisualState) -> Self {
        self.shown = state;
        self
    }

    pub fn build(self) -> SightlineResult<RevealSpec> {
        let spec = RevealSpec {
            root: self.root,
            items: self.items,
            trigger: self.trigger,
            timing: self.timing,
            hidden: self.hidden,
            shown: self.shown,
        };
        spec.validate()?;
        Ok(spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_create_expected_structure() {
        let cards = RevealBuilder::new("services")
            .item("card-0")
            .item("card-1")
            .item("card-2")
            .when_visible(0.25)
            .unwrap()
            .base_delay(Millis(100))
            .stagger_step(Millis(150))
            .duration(Millis(500))
            .ease(Ease::OutBack)
            .build()
            .unwrap();

        let manifest = PageBuilder::new()
            .nav_section("home", "Home")
            .nav_section("about", "About")
            .nav_section("services", "Services")
            .section("footer")
            .detection_offset(80.0)
            .reveal(cards)
            .build()
            .unwrap();

        assert_eq!(manifest.nav.len(), 3);
        assert_eq!(manifest.sections.len(), 4);
        assert_eq!(manifest.reveals[0].delay_at(2), Millis(400));
        assert_eq!(manifest.detection_offset, 80.0);
    }

    #[test]
    fn out_of_range_threshold_is_rejected() {
        assert!(RevealBuilder::new("hero").when_visible(1.5).is_err());
    }

    #[test]
    fn degenerate_timing_is_rejected() {
        let result = RevealBuilder::new("hero")
            .item("headline")
            .stagger_step(Millis(0))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn mount_trigger_builds() {
        let spec = RevealBuilder::new("hero")
            .item("headline")
            .on_mount()
            .build()
            .unwrap();
        assert!(matches!(spec.trigger, RevealTrigger::Mount));
    }
}
