//! Scripted playback: drives a page engine over a simulated document and
//! records what every frame decided. Traces are deterministic for a given
//! manifest and script, which makes them diffable and digestable.

use serde::{Deserialize, Serialize};

use crate::{
    core::{Millis, Viewport},
    error::{SightlineError, SightlineResult},
    hub::EventHub,
    model::{PageManifest, VisualState},
    page::{InputEvent, PageEngine},
    reveal::Transition,
    sim::{SimBlock, SimDocument, SimScheduler},
};

/// A scripted viewing session: the simulated page layout plus a timeline of
/// user gestures, stepped at a fixed frame rate.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScrollScript {
    pub viewport: Viewport,
    pub blocks: Vec<SimBlock>,
    pub fps: u32,
    /// Total number of frames to run.
    pub frames: u32,
    #[serde(default)]
    pub steps: Vec<ScriptStep>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScriptStep {
    /// Frame index the gesture lands on.
    pub at: u32,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScriptAction {
    /// Jump to an absolute scroll position.
    Scroll { top: f64 },
    /// Jump by a relative amount.
    ScrollBy { delta: f64 },
    ToggleMenu,
    /// Pick a nav item, as a click on the menu would.
    Select { item: String },
    Resize { width: f64, height: f64 },
}

impl ScrollScript {
    pub fn frame_time(&self, frame: u32) -> Millis {
        Millis(u64::from(frame) * 1000 / u64::from(self.fps))
    }

    pub fn validate(&self) -> SightlineResult<()> {
        Viewport::new(self.viewport.width, self.viewport.height)?;
        if self.fps == 0 || self.fps > 240 {
            return Err(SightlineError::script("fps must be within 1..=240"));
        }
        if self.frames == 0 {
            return Err(SightlineError::script("script must run at least one frame"));
        }
        for step in &self.steps {
            if step.at >= self.frames {
                return Err(SightlineError::script(format!(
                    "step at frame {} is past the end ({} frames)",
                    step.at, self.frames
                )));
            }
            match &step.action {
                ScriptAction::Scroll { top } if !top.is_finite() => {
                    return Err(SightlineError::script("scroll top must be finite"));
                }
                ScriptAction::ScrollBy { delta } if !delta.is_finite() => {
                    return Err(SightlineError::script("scroll delta must be finite"));
                }
                ScriptAction::Select { item } if item.trim().is_empty() => {
                    return Err(SightlineError::script("select item must be non-empty"));
                }
                ScriptAction::Resize { width, height } => {
                    Viewport::new(*width, *height)?;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Everything one frame decided, plus where the in-flight animations stood.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TraceFrame {
    pub frame: u32,
    pub now: Millis,
    pub scroll_top: f64,
    pub recomputed: bool,
    pub active: Option<String>,
    pub highlighted: Option<String>,
    pub menu_open: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scheduled: Vec<Transition>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub completed: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub animating: Vec<ItemSample>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ItemSample {
    pub item: String,
    pub state: VisualState,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PageTrace {
    pub fps: u32,
    /// Transitions cancelled when the page was torn down at script end.
    pub cancelled: usize,
    pub frames: Vec<TraceFrame>,
}

/// Runs a script against a manifest and records every frame.
pub fn run_script(manifest: PageManifest, script: &ScrollScript) -> SightlineResult<PageTrace> {
    script.validate()?;

    let mut engine = PageEngine::new(manifest)?;
    let mut document = SimDocument::new(script.viewport, script.blocks.clone())?;
    let mut scheduler = SimScheduler::default();
    let events = EventHub::new();
    engine.attach(&events);

    let mut frames = Vec::with_capacity(script.frames as usize);
    for frame in 0..script.frames {
        let now = script.frame_time(frame);
        scheduler.tick(now);
        if document.tick(now) {
            events.emit(&InputEvent::Scrolled);
        }

        for step in script.steps.iter().filter(|step| step.at == frame) {
            match &step.action {
                ScriptAction::Scroll { top } => {
                    document.set_scroll(*top);
                    events.emit(&InputEvent::Scrolled);
                }
                ScriptAction::ScrollBy { delta } => {
                    document.scroll_by(*delta);
                    events.emit(&InputEvent::Scrolled);
                }
                ScriptAction::ToggleMenu => {
                    engine.toggle_menu();
                }
                ScriptAction::Select { item } => {
                    engine.select_item(item, &mut document);
                }
                ScriptAction::Resize { width, height } => {
                    document.resize(Viewport::new(*width, *height)?);
                    events.emit(&InputEvent::Resized);
                }
            }
        }

        let report = engine.frame(now, &mut document, &mut scheduler);
        frames.push(TraceFrame {
            frame,
            now,
            scroll_top: document.scroll_top(),
            recomputed: report.recomputed,
            active: report.active,
            highlighted: report.highlighted,
            menu_open: report.menu_open,
            scheduled: report.scheduled,
            completed: report.completed,
            animating: scheduler
                .in_flight()
                .into_iter()
                .map(|(item, state)| ItemSample { item, state })
                .collect(),
        });
    }

    engine.teardown(&mut scheduler);

    Ok(PageTrace {
        fps: script.fps,
        cancelled: scheduler.cancelled_count(),
        frames,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NavItem, Section};

    fn minimal_script() -> ScrollScript {
        ScrollScript {
            viewport: Viewport {
                width: 1280.0,
                height: 720.0,
            },
            blocks: vec![
                SimBlock {
                    id: "home".to_string(),
                    top: 0.0,
                    height: 800.0,
                },
                SimBlock {
                    id: "about".to_string(),
                    top: 800.0,
                    height: 600.0,
                },
            ],
            fps: 60,
            frames: 4,
            steps: Vec::new(),
        }
    }

    fn minimal_manifest() -> PageManifest {
        PageManifest {
            nav: vec![NavItem {
                id: "about".to_string(),
                label: "About".to_string(),
            }],
            sections: vec![
                Section {
                    id: "home".to_string(),
                },
                Section {
                    id: "about".to_string(),
                },
            ],
            reveals: Vec::new(),
            detection_offset: 100.0,
            menu: Default::default(),
        }
    }

    #[test]
    fn frame_time_follows_fps() {
        let script = minimal_script();
        assert_eq!(script.frame_time(0), Millis(0));
        assert_eq!(script.frame_time(1), Millis(16));
        assert_eq!(script.frame_time(3), Millis(50));
    }

    #[test]
    fn validate_rejects_out_of_range_steps() {
        let mut script = minimal_script();
        script.steps.push(ScriptStep {
            at: 4,
            action: ScriptAction::ToggleMenu,
        });
        assert!(script.validate().is_err());

        let mut script = minimal_script();
        script.fps = 0;
        assert!(script.validate().is_err());

        let mut script = minimal_script();
        script.steps.push(ScriptStep {
            at: 0,
            action: ScriptAction::Scroll { top: f64::NAN },
        });
        assert!(script.validate().is_err());
    }

    #[test]
    fn empty_script_still_records_every_frame() {
        let trace = run_script(minimal_manifest(), &minimal_script()).unwrap();
        assert_eq!(trace.frames.len(), 4);
        assert!(trace.frames[0].recomputed);
        assert!(!trace.frames[1].recomputed);
        assert_eq!(trace.frames[0].active.as_deref(), Some("home"));
        assert_eq!(trace.cancelled, 0);
    }

    #[test]
    fn script_steps_round_trip_through_json() {
        let json = r#"{ "at": 2, "kind": "select", "item": "about" }"#;
        let step: ScriptStep = serde_json::from_str(json).unwrap();
        assert_eq!(step.at, 2);
        assert!(matches!(step.action, ScriptAction::Select { ref item } if item == "about"));

        let json = r#"{ "at": 0, "kind": "toggle_menu" }"#;
        let step: ScriptStep = serde_json::from_str(json).unwrap();
        assert!(matches!(step.action, ScriptAction::ToggleMenu));
    }
}
