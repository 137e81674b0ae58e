use serde::Serialize;

use crate::model::{MenuSpec, NavItem, Section};

/// Request for the host to bring a section into view with an animated scroll.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ScrollCommand {
    pub target: String,
}

/// Collapsible navigation menu plus item selection.
///
/// Selection always closes the menu, whether or not the chosen item resolves
/// to a real section. Highlighting is a pure projection of the active id and
/// keeps no state of its own.
pub struct NavMenu {
    items: Vec<NavItem>,
    spec: MenuSpec,
    open: bool,
}

impl NavMenu {
    pub fn new(items: Vec<NavItem>, spec: MenuSpec) -> Self {
        Self {
            items,
            spec,
            open: false,
        }
    }

    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    /// Open/close transition descriptor for the host to animate with.
    pub fn spec(&self) -> &MenuSpec {
        &self.spec
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Flips the menu and returns the new state.
    pub fn toggle(&mut self) -> bool {
        self.open = !self.open;
        tracing::debug!("menu {}", if self.open { "opened" } else { "closed" });
        self.open
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    /// Picks a nav item. The menu closes unconditionally; the scroll command
    /// is only produced when the item resolves to a registered section.
    pub fn select_item(&mut self, item_id: &str, sections: &[Section]) -> Option<ScrollCommand> {
        self.open = false;

        let resolved = self
            .items
            .iter()
            .find(|item| item.id == item_id)
            .and_then(|item| sections.iter().find(|section| section.id == item.id));

        match resolved {
            Some(section) => Some(ScrollCommand {
                target: section.id.clone(),
            }),
            None => {
                tracing::debug!("nav item '{item_id}' does not resolve to a section; no scroll issued");
                None
            }
        }
    }

    /// The at-most-one item whose id equals the active section id.
    pub fn highlighted_item(&self, active_id: Option<&str>) -> Option<&NavItem> {
        let active = active_id?;
        self.items.iter().find(|item| item.id == active)
    }
}
