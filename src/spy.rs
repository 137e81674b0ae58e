use std::collections::BTreeSet;

use crate::{core::Rect, model::Section};

/// Host boundary: where things currently are on the rendering surface.
/// Coordinates are viewport-relative (origin at the viewport's top-left).
pub trait SectionGeometry {
    /// Bounding box of the region with this id, if it is renderable right now.
    fn section_rect(&self, id: &str) -> Option<Rect>;
}

/// Tracks which registered section is "current" while the user scrolls.
///
/// A section is a candidate when the detection line (a fixed offset from the
/// viewport top) falls within its vertical extent; the first-registered
/// candidate wins. With no candidates the previous answer is retained, so the
/// active id never flickers back to null once it has been established.
pub struct ScrollSpy {
    sections: Vec<Section>,
    detection_offset: f64,
    active: Option<usize>, // index into `sections`
    missing_reported: BTreeSet<String>,
}

impl ScrollSpy {
    pub fn new(detection_offset: f64) -> Self {
        Self {
            sections: Vec::new(),
            detection_offset,
            active: None,
            missing_reported: BTreeSet::new(),
        }
    }

    /// Replaces the registered section list. This starts a new page view:
    /// the active id resets to null and stickiness starts over.
    pub fn register(&mut self, sections: impl IntoIterator<Item = Section>) {
        self.sections = sections.into_iter().collect();
        self.active = None;
        self.missing_reported.clear();
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.map(|index| self.sections[index].id.as_str())
    }

    /// Recomputes the active section against current geometry. Returns true
    /// when the published id changed.
    pub fn recompute(&mut self, geometry: &dyn SectionGeometry) -> bool {
        let line = self.detection_offset;
        let mut candidate = None;

        for (index, section) in self.sections.iter().enumerate() {
            let Some(rect) = geometry.section_rect(&section.id) else {
                if self.missing_reported.insert(section.id.clone()) {
                    tracing::warn!(
                        "no renderable region for section '{}'; it can never become active",
                        section.id
                    );
                }
                continue;
            };
            if rect.min_y() <= line && line <= rect.max_y() {
                candidate = Some(index);
                break; // first-registered candidate wins
            }
        }

        // Zero candidates: retain the previous answer.
        let Some(index) = candidate else { return false };
        if self.active == Some(index) {
            return false;
        }
        self.active = Some(index);
        tracing::debug!("active section -> '{}'", self.sections[index].id);
        true
    }
}
