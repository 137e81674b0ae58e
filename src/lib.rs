#![forbid(unsafe_code)]

pub mod core;
pub mod dsl;
pub mod ease;
pub mod error;
pub mod hub;
pub mod model;
pub mod nav;
pub mod page;
pub mod reveal;
pub mod sim;
pub mod spy;
pub mod trace;

pub use core::{Fraction, Millis, Point, Rect, Vec2, Viewport};
pub use dsl::{PageBuilder, RevealBuilder};
pub use ease::Ease;
pub use error::{SightlineError, SightlineResult};
pub use hub::{EventHub, Subscription};
pub use model::{
    Lerp, MenuSpec, NavItem, PageManifest, RevealItem, RevealSpec, RevealTiming, RevealTrigger,
    Section, VisualState,
};
pub use nav::{NavMenu, ScrollCommand};
pub use page::{FrameReport, InputEvent, PageEngine, PageSurface};
pub use reveal::{RevealPhase, RevealRunner, Transition, TransitionHandle, TransitionScheduler};
pub use sim::{SimBlock, SimDocument, SimScheduler};
pub use spy::{ScrollSpy, SectionGeometry};
pub use trace::{
    run_script, ItemSample, PageTrace, ScriptAction, ScriptStep, ScrollScript, TraceFrame,
};
