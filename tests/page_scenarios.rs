use sightline::{
    run_script, Millis, PageBuilder, PageManifest, RevealBuilder, ScriptAction, ScriptStep,
    ScrollScript, SimBlock, Viewport,
};

fn fixture_trace() -> sightline::PageTrace {
    let manifest: PageManifest = serde_json::from_str(include_str!("data/page.json")).unwrap();
    let script: ScrollScript = serde_json::from_str(include_str!("data/script.json")).unwrap();
    run_script(manifest, &script).unwrap()
}

#[test]
fn fixture_session_plays_out() {
    let trace = fixture_trace();
    assert_eq!(trace.frames.len(), 180);

    // Mount: the hero group fires on the very first frame, before any input.
    let first = &trace.frames[0];
    assert!(first.recomputed);
    assert_eq!(first.active.as_deref(), Some("home"));
    assert_eq!(first.highlighted.as_deref(), Some("home"));
    assert_eq!(first.scheduled.len(), 3);
    assert!(first.scheduled.iter().all(|t| t.group == "home"));
    let delays: Vec<u64> = first.scheduled.iter().map(|t| t.delay.0).collect();
    assert_eq!(delays, vec![200, 350, 500]);

    // Scroll steps move the active section along the page.
    assert_eq!(trace.frames[12].active.as_deref(), Some("about"));
    assert_eq!(trace.frames[30].active.as_deref(), Some("services"));

    // The services group fires the moment its root crosses the threshold.
    assert_eq!(trace.frames[30].scheduled.len(), 4);
    assert!(trace.frames[30].scheduled.iter().all(|t| t.group == "services"));

    // Menu opens at frame 60 and selection closes it at 72.
    assert!(trace.frames[60].menu_open);
    assert!(trace.frames[71].menu_open);
    assert!(!trace.frames[72].menu_open);

    // The animated scroll lands on contact and the spy follows.
    assert_eq!(trace.frames[110].active.as_deref(), Some("contact"));
    assert!((trace.frames[110].scroll_top - 3440.0).abs() < 1e-9);

    // Jumping back to the top re-activates home.
    assert_eq!(trace.frames[150].active.as_deref(), Some("home"));
}

#[test]
fn fixture_reveals_fire_once_and_finish() {
    let trace = fixture_trace();

    let scheduled_total: usize = trace.frames.iter().map(|f| f.scheduled.len()).sum();
    assert_eq!(scheduled_total, 3 + 4 + 3 + 2);

    let mut completed: Vec<&str> = trace
        .frames
        .iter()
        .flat_map(|f| f.completed.iter().map(String::as_str))
        .collect();
    completed.sort_unstable();
    assert_eq!(completed, vec!["cases", "home", "services", "team"]);

    // Everything finished on its own, so teardown had nothing to cancel.
    assert_eq!(trace.cancelled, 0);
}

#[test]
fn fixture_active_id_is_sticky() {
    let trace = fixture_trace();
    let first_some = trace
        .frames
        .iter()
        .position(|f| f.active.is_some())
        .unwrap();
    assert!(trace.frames[first_some..].iter().all(|f| f.active.is_some()));
}

#[test]
fn fixture_coalesces_idle_frames() {
    let trace = fixture_trace();
    // Nothing happens between the mount frame and the first scroll step.
    assert!(trace.frames[1..12].iter().all(|f| !f.recomputed));
    assert!(trace.frames[12].recomputed);
}

#[test]
fn detection_line_in_a_gap_retains_previous_answer() {
    let manifest = PageBuilder::new()
        .nav_section("home", "Home")
        .nav_section("about", "About")
        .build()
        .unwrap();

    let script = ScrollScript {
        viewport: Viewport {
            width: 1280.0,
            height: 720.0,
        },
        blocks: vec![
            SimBlock {
                id: "home".to_string(),
                top: 0.0,
                height: 500.0,
            },
            // 300px of decorative filler between the sections.
            SimBlock {
                id: "about".to_string(),
                top: 800.0,
                height: 800.0,
            },
        ],
        fps: 60,
        frames: 10,
        steps: vec![
            ScriptStep {
                at: 3,
                action: ScriptAction::Scroll { top: 450.0 },
            },
            ScriptStep {
                at: 6,
                action: ScriptAction::Scroll { top: 750.0 },
            },
        ],
    };

    let trace = run_script(manifest, &script).unwrap();
    assert_eq!(trace.frames[0].active.as_deref(), Some("home"));
    // Frame 3 puts the line at 550, inside the gap: the answer is retained.
    assert!(trace.frames[3].recomputed);
    assert_eq!(trace.frames[3].active.as_deref(), Some("home"));
    // Frame 6 puts the line at 850, inside "about".
    assert_eq!(trace.frames[6].active.as_deref(), Some("about"));
}

#[test]
fn selecting_a_dead_link_closes_menu_without_scrolling() {
    let manifest = PageBuilder::new()
        .nav_section("home", "Home")
        .nav_item("careers", "Careers") // no matching section
        .build()
        .unwrap();

    let script = ScrollScript {
        viewport: Viewport {
            width: 1280.0,
            height: 720.0,
        },
        blocks: vec![SimBlock {
            id: "home".to_string(),
            top: 0.0,
            height: 2000.0,
        }],
        fps: 60,
        frames: 6,
        steps: vec![
            ScriptStep {
                at: 1,
                action: ScriptAction::ToggleMenu,
            },
            ScriptStep {
                at: 2,
                action: ScriptAction::Select {
                    item: "careers".to_string(),
                },
            },
        ],
    };

    let trace = run_script(manifest, &script).unwrap();
    assert!(trace.frames[1].menu_open);
    assert!(!trace.frames[2].menu_open);
    // No scroll command was issued, so the page never moves.
    assert!(trace.frames.iter().all(|f| f.scroll_top == 0.0));
    assert!(trace.frames.iter().all(|f| f.active.as_deref() == Some("home")));
}

#[test]
fn mid_flight_teardown_reports_cancellations() {
    let manifest = PageBuilder::new()
        .section("hero")
        .reveal(
            RevealBuilder::new("hero")
                .item("headline")
                .item("subtitle")
                .on_mount()
                .duration(Millis(10_000))
                .build()
                .unwrap(),
        )
        .build()
        .unwrap();

    let script = ScrollScript {
        viewport: Viewport {
            width: 1280.0,
            height: 720.0,
        },
        blocks: vec![SimBlock {
            id: "hero".to_string(),
            top: 0.0,
            height: 900.0,
        }],
        fps: 60,
        frames: 5, // ends long before the 10s transitions do
        steps: Vec::new(),
    };

    let trace = run_script(manifest, &script).unwrap();
    assert_eq!(trace.frames[0].scheduled.len(), 2);
    assert!(!trace.frames[4].animating.is_empty());
    assert_eq!(trace.cancelled, 2);
}
