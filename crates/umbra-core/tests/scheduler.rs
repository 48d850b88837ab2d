//! End-to-end scheduling scenarios.
//!
//! Every test drives [`Engine::run_frame`] with explicit clock samples so
//! timeouts are deterministic, and records hook calls in a shared journal.

#![allow(clippy::unwrap_used)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use umbra_core::engine::{Engine, EngineSettings, FrameSummary};
use umbra_core::{
    Canvas, FrameInfo, Module, ModuleContext, ModuleError, ModuleId, ModuleState, TextCanvas,
    UpdateFlow,
};

#[derive(Clone, Default)]
struct Journal(Rc<RefCell<Vec<String>>>);

impl Journal {
    fn push(&self, entry: String) {
        self.0.borrow_mut().push(entry);
    }

    fn take(&self) -> Vec<String> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    fn count(&self, entry: &str) -> usize {
        self.0.borrow().iter().filter(|e| e.as_str() == entry).count()
    }
}

type Hook = Box<dyn FnMut(&mut ModuleContext<'_>)>;

struct Probe {
    name: &'static str,
    journal: Journal,
    init_failures: u32,
    stop_after: Option<u32>,
    updates: u32,
    on_activate: Option<Hook>,
    on_deactivate: Option<Hook>,
    on_update: Option<Hook>,
}

impl Probe {
    fn new(name: &'static str, journal: &Journal) -> Self {
        Self {
            name,
            journal: journal.clone(),
            init_failures: 0,
            stop_after: None,
            updates: 0,
            on_activate: None,
            on_deactivate: None,
            on_update: None,
        }
    }

    fn failing_init(mut self, times: u32) -> Self {
        self.init_failures = times;
        self
    }

    fn stop_after(mut self, updates: u32) -> Self {
        self.stop_after = Some(updates);
        self
    }

    fn with_on_activate(mut self, hook: impl FnMut(&mut ModuleContext<'_>) + 'static) -> Self {
        self.on_activate = Some(Box::new(hook));
        self
    }

    fn with_on_deactivate(mut self, hook: impl FnMut(&mut ModuleContext<'_>) + 'static) -> Self {
        self.on_deactivate = Some(Box::new(hook));
        self
    }

    fn with_on_update(mut self, hook: impl FnMut(&mut ModuleContext<'_>) + 'static) -> Self {
        self.on_update = Some(Box::new(hook));
        self
    }

    fn log(&self, what: &str) {
        self.journal.push(format!("{}:{what}", self.name));
    }
}

impl Module for Probe {
    fn on_initialize(&mut self, ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        self.log("init");
        if self.init_failures > 0 {
            self.init_failures = self.init_failures.saturating_sub(1);
            return Err(ModuleError::initialization(ctx, "not ready"));
        }
        Ok(())
    }

    fn on_activate(&mut self, ctx: &mut ModuleContext<'_>) {
        self.log("activate");
        if let Some(hook) = self.on_activate.as_mut() {
            hook(ctx);
        }
    }

    fn on_deactivate(&mut self, ctx: &mut ModuleContext<'_>) {
        self.log("deactivate");
        if let Some(hook) = self.on_deactivate.as_mut() {
            hook(ctx);
        }
    }

    fn on_pause(&mut self, _ctx: &mut ModuleContext<'_>) {
        self.log("pause");
    }

    fn on_resume(&mut self, _ctx: &mut ModuleContext<'_>) {
        self.log("resume");
    }

    fn update(&mut self, ctx: &mut ModuleContext<'_>) -> UpdateFlow {
        self.log("update");
        self.updates = self.updates.saturating_add(1);
        if let Some(hook) = self.on_update.as_mut() {
            hook(ctx);
        }
        match self.stop_after {
            Some(limit) if self.updates >= limit => UpdateFlow::Stop,
            _ => UpdateFlow::Continue,
        }
    }

    fn render(&mut self, _canvas: &mut dyn Canvas, _frame: &FrameInfo) {
        self.log("render");
    }
}

struct Harness {
    engine: Engine,
    journal: Journal,
    canvas: TextCanvas,
    start: Instant,
}

impl Harness {
    fn new() -> Self {
        Self::with_settings(EngineSettings::default())
    }

    fn with_settings(settings: EngineSettings) -> Self {
        Self {
            engine: Engine::new(settings),
            journal: Journal::default(),
            canvas: TextCanvas::new(40, 10),
            start: Instant::now(),
        }
    }

    fn add(&mut self, name: &'static str) -> ModuleId {
        let probe = Probe::new(name, &self.journal);
        self.engine.register_module(name, probe).unwrap()
    }

    fn add_probe(&mut self, name: &'static str, build: impl FnOnce(Probe) -> Probe) -> ModuleId {
        let probe = build(Probe::new(name, &self.journal));
        self.engine.register_module(name, probe).unwrap()
    }

    /// Run a frame sampled `ms` milliseconds after the harness was created.
    fn frame_at(&mut self, ms: u64) -> FrameSummary {
        let now = self.start.checked_add(Duration::from_millis(ms)).unwrap();
        self.engine.run_frame(now, &[], &mut self.canvas)
    }

    fn state(&self, name: &str) -> ModuleState {
        self.engine.state(name).unwrap()
    }
}

#[test]
fn update_and_render_follow_priority_then_timeout_expires() {
    let mut h = Harness::new();
    let b = h.add("b");
    let a = h.add("a");
    h.engine.set_priority("b", 5).unwrap();
    h.engine.set_timeout("b", Some(Duration::from_secs(2))).unwrap();
    h.engine.activate("a");
    h.engine.activate("b");

    let summary = h.frame_at(0);
    assert_eq!(summary.updated, vec![a, b]);
    assert_eq!(summary.rendered, vec![a, b]);
    assert_eq!(
        h.journal.take(),
        vec![
            "a:init", "a:activate", "b:init", "b:activate", "a:update", "b:update", "a:render",
            "b:render",
        ]
    );

    let summary = h.frame_at(1999);
    assert!(summary.timed_out.is_empty());
    assert_eq!(h.state("b"), ModuleState::Active);

    let summary = h.frame_at(2000);
    assert_eq!(summary.timed_out, vec![b]);

    let summary = h.frame_at(2016);
    assert_eq!(summary.deactivated, vec![b]);
    assert_eq!(summary.fallback, None);
    assert_eq!(h.state("b"), ModuleState::Inactive);
    assert_eq!(h.state("a"), ModuleState::Active);
    assert_eq!(summary.updated, vec![a]);
}

#[test]
fn timeout_is_rearmed_on_each_activation() {
    let mut h = Harness::new();
    let _menu = h.add("menu");
    let popup = h.add("popup");
    h.engine.set_timeout("popup", Some(Duration::from_millis(500))).unwrap();
    h.engine.activate("menu");
    h.engine.activate("popup");
    h.frame_at(0);

    h.engine.deactivate("popup");
    h.frame_at(100);
    h.engine.activate("popup");
    h.frame_at(400);

    // 500 ms after the first activation, but only 500 - 400 after the second.
    assert!(h.frame_at(500).timed_out.is_empty());
    assert_eq!(h.frame_at(900).timed_out, vec![popup]);
}

#[test]
fn unknown_module_requests_change_nothing() {
    let mut h = Harness::new();
    h.add("menu");
    h.engine.activate("menu");
    h.frame_at(0);
    h.journal.take();

    h.engine.activate("ghost");
    h.engine.deactivate("ghost");
    h.engine.pause("ghost");
    let summary = h.frame_at(16);

    assert!(summary.activated.is_empty());
    assert!(summary.deactivated.is_empty());
    assert_eq!(h.state("menu"), ModuleState::Active);
    assert_eq!(h.engine.state("ghost"), None);
    assert_eq!(h.journal.take(), vec!["menu:update", "menu:render"]);
}

#[test]
fn global_pause_freezes_updates_but_keeps_rendering() {
    let mut h = Harness::new();
    let a = h.add("a");
    let b = h.add("b");
    h.engine.activate("a");
    h.engine.activate("b");
    h.frame_at(0);

    h.engine.toggle_pause();
    for ms in [16, 32, 48] {
        let summary = h.frame_at(ms);
        assert!(summary.paused);
        assert!(summary.updated.is_empty());
        assert_eq!(summary.rendered, vec![a, b]);
    }

    h.engine.toggle_pause();
    let summary = h.frame_at(64);
    assert_eq!(summary.updated, vec![a, b]);
}

#[test]
fn global_pause_holds_back_timeouts() {
    let mut h = Harness::new();
    let _a = h.add("a");
    h.engine.set_timeout("a", Some(Duration::from_secs(1))).unwrap();
    h.engine.activate("a");
    h.frame_at(0);

    h.engine.set_paused(true);
    assert!(h.frame_at(1500).timed_out.is_empty());
    h.frame_at(1516);
    assert_eq!(h.state("a"), ModuleState::Active);

    h.engine.set_paused(false);
    assert_eq!(h.frame_at(1532).timed_out.len(), 1);
}

#[test]
fn fallback_activates_in_the_same_frame() {
    let mut h = Harness::new();
    h.add("intro");
    let menu = h.add("menu");
    h.engine.set_fallback("intro", "menu").unwrap();
    h.engine.activate("intro");
    h.frame_at(0);

    h.engine.deactivate("intro");
    let summary = h.frame_at(16);
    assert_eq!(summary.fallback, Some(menu));
    assert_eq!(summary.updated, vec![menu]);
    assert_eq!(h.state("menu"), ModuleState::Active);
}

#[test]
fn fallback_skips_modules_that_fail_to_initialize() {
    let mut h = Harness::new();
    h.add("intro");
    h.add_probe("broken", |p| p.failing_init(u32::MAX));
    let menu = h.add("menu");
    h.engine.set_fallback("intro", "broken").unwrap();
    h.engine.set_fallback("broken", "menu").unwrap();
    h.engine.activate("intro");
    h.frame_at(0);

    h.engine.deactivate("intro");
    let summary = h.frame_at(16);
    assert_eq!(summary.fallback, Some(menu));
    assert_eq!(h.state("broken"), ModuleState::Uninitialized);
}

#[test]
fn fallback_cycles_terminate() {
    let mut h = Harness::new();
    h.add("start");
    h.add_probe("b", |p| p.failing_init(u32::MAX));
    h.add_probe("c", |p| p.failing_init(u32::MAX));
    h.engine.set_fallback("start", "b").unwrap();
    h.engine.set_fallback("b", "c").unwrap();
    h.engine.set_fallback("c", "b").unwrap();
    h.engine.activate("start");
    h.frame_at(0);
    h.journal.take();

    h.engine.deactivate("start");
    let summary = h.frame_at(16);

    assert_eq!(summary.fallback, None);
    assert!(h.engine.active_modules().is_empty());
    assert_eq!(h.journal.take(), vec!["start:deactivate", "b:init", "c:init"]);
}

#[test]
fn fallback_follows_a_mutual_chain() {
    let mut h = Harness::new();
    h.add("a");
    h.add("b");
    h.engine.set_fallback("a", "b").unwrap();
    h.engine.set_fallback("b", "a").unwrap();
    h.engine.activate("b");
    h.frame_at(0);

    h.engine.deactivate("b");
    let summary = h.frame_at(16);
    assert_eq!(h.state("a"), ModuleState::Active);
    assert_eq!(h.state("b"), ModuleState::Inactive);
    assert_eq!(summary.activated.len(), 1);
}

#[test]
fn module_can_fall_back_to_itself() {
    let mut h = Harness::new();
    let looping = h.add_probe("loop", |p| p.stop_after(1));
    h.engine.set_fallback("loop", "loop").unwrap();
    h.engine.activate("loop");
    h.frame_at(0);
    h.journal.take();

    let summary = h.frame_at(16);
    assert_eq!(summary.deactivated, vec![looping]);
    assert_eq!(summary.fallback, Some(looping));
    assert_eq!(h.state("loop"), ModuleState::Active);
    assert_eq!(
        h.journal.take(),
        vec!["loop:deactivate", "loop:activate", "loop:update", "loop:render"]
    );
}

#[test]
fn default_fallback_starts_when_nothing_is_active() {
    let settings = EngineSettings {
        default_fallback: Some("menu".to_owned()),
        ..EngineSettings::default()
    };
    let mut h = Harness::with_settings(settings);
    let menu = h.add("menu");
    assert!(!h.engine.is_idle());

    let summary = h.frame_at(0);
    assert_eq!(summary.fallback, Some(menu));
    assert_eq!(h.state("menu"), ModuleState::Active);
}

#[test]
fn fallback_is_retried_after_failed_initialization() {
    let mut h = Harness::new();
    h.add("intro");
    let menu = h.add_probe("menu", |p| p.failing_init(1));
    h.engine.set_fallback("intro", "menu").unwrap();
    h.engine.activate("intro");
    h.frame_at(0);

    h.engine.deactivate("intro");
    let summary = h.frame_at(16);
    assert_eq!(summary.fallback, None);
    assert_eq!(h.state("menu"), ModuleState::Uninitialized);
    assert!(!h.engine.is_idle());

    let summary = h.frame_at(32);
    assert_eq!(summary.fallback, Some(menu));
    assert_eq!(h.state("menu"), ModuleState::Active);
    assert_eq!(h.journal.count("menu:init"), 2);
}

#[test]
fn paused_modules_do_not_hold_back_the_fallback() {
    let mut h = Harness::new();
    h.add("intro");
    let menu = h.add("menu");
    h.add("hud");
    h.engine.set_fallback("intro", "menu").unwrap();
    h.engine.activate("intro");
    h.engine.activate("hud");
    h.frame_at(0);
    h.engine.pause("hud");
    h.frame_at(16);

    h.engine.deactivate("intro");
    let summary = h.frame_at(32);
    assert_eq!(summary.fallback, Some(menu));
    assert_eq!(h.engine.active_modules(), vec![menu]);
    assert_eq!(h.state("hud"), ModuleState::Paused);
}

#[test]
fn default_fallback_covers_modules_without_one() {
    let settings = EngineSettings {
        default_fallback: Some("menu".to_owned()),
        ..EngineSettings::default()
    };
    let mut h = Harness::with_settings(settings);
    h.add_probe("credits", |p| p.stop_after(1));
    let menu = h.add("menu");
    h.engine.activate("credits");

    h.frame_at(0);
    let summary = h.frame_at(16);
    assert_eq!(summary.fallback, Some(menu));
}

#[test]
fn no_fallback_while_another_module_runs() {
    let mut h = Harness::new();
    h.add("intro");
    h.add("menu");
    h.add("hud");
    h.engine.set_fallback("intro", "menu").unwrap();
    h.engine.activate("intro");
    h.engine.activate("hud");
    h.frame_at(0);

    h.engine.deactivate("intro");
    let summary = h.frame_at(16);
    assert_eq!(summary.fallback, None);
    assert_eq!(h.state("menu"), ModuleState::Uninitialized);
}

#[test]
fn repeated_requests_apply_once() {
    let mut h = Harness::new();
    h.add("a");
    for _ in 0..3 {
        h.engine.activate("a");
    }
    h.frame_at(0);
    assert_eq!(h.journal.count("a:activate"), 1);

    for _ in 0..3 {
        h.engine.deactivate("a");
    }
    h.frame_at(16);
    assert_eq!(h.journal.count("a:deactivate"), 1);
    assert_eq!(h.state("a"), ModuleState::Inactive);
}

#[test]
fn deactivations_drain_before_activations() {
    let mut h = Harness::new();
    h.add("a");
    h.engine.activate("a");
    h.frame_at(0);
    h.journal.take();

    h.engine.activate("a");
    h.engine.deactivate("a");
    h.frame_at(16);

    assert_eq!(h.state("a"), ModuleState::Active);
    let journal = h.journal.take();
    assert_eq!(journal.get(..2), Some(["a:deactivate".to_owned(), "a:activate".to_owned()].as_slice()));
}

#[test]
fn last_pause_request_wins() {
    let mut h = Harness::new();
    h.add("a");
    h.engine.activate("a");
    h.frame_at(0);

    h.engine.pause("a");
    h.engine.resume("a");
    h.engine.pause("a");
    h.frame_at(16);
    assert_eq!(h.state("a"), ModuleState::Paused);
}

#[test]
fn update_and_render_sets_match_despite_mid_frame_requests() {
    let mut h = Harness::new();
    let a = h.add_probe("a", |p| {
        p.with_on_update(|ctx| {
            ctx.deactivate_self();
            ctx.activate("b");
        })
    });
    h.add("b");
    h.engine.activate("a");

    let summary = h.frame_at(0);
    assert_eq!(summary.updated, vec![a]);
    assert_eq!(summary.rendered, summary.updated);
    assert_eq!(h.state("b"), ModuleState::Uninitialized);

    let summary = h.frame_at(16);
    assert_eq!(summary.updated, summary.rendered);
    assert_eq!(h.state("a"), ModuleState::Inactive);
    assert_eq!(h.state("b"), ModuleState::Active);
}

#[test]
fn requests_from_drain_hooks_follow_queue_order() {
    let mut h = Harness::new();
    h.add_probe("leaving", |p| p.with_on_deactivate(|ctx| ctx.activate("next")));
    h.add_probe("next", |p| p.with_on_activate(|ctx| ctx.deactivate("other")));
    h.add("other");
    h.engine.activate("leaving");
    h.engine.activate("other");
    h.frame_at(0);

    h.engine.deactivate("leaving");
    let summary = h.frame_at(16);
    // Activation queue not drained yet: applied this frame.
    assert_eq!(h.state("next"), ModuleState::Active);
    // Deactivation queue already drained: applied next frame.
    assert_eq!(h.state("other"), ModuleState::Active);
    assert_eq!(summary.fallback, None);

    h.frame_at(32);
    assert_eq!(h.state("other"), ModuleState::Inactive);
}

#[test]
fn failed_initialization_is_retried() {
    let mut h = Harness::new();
    h.add_probe("shy", |p| p.failing_init(1));
    h.engine.activate("shy");
    h.frame_at(0);
    assert_eq!(h.state("shy"), ModuleState::Uninitialized);

    h.engine.activate("shy");
    h.frame_at(16);
    assert_eq!(h.state("shy"), ModuleState::Active);
    assert_eq!(h.journal.count("shy:init"), 2);
}

#[test]
fn paused_modules_render_per_policy() {
    let mut h = Harness::new();
    let a = h.add("a");
    let _b = h.add("b");
    h.engine.set_render_when_paused("b", Some(false)).unwrap();
    h.engine.activate("a");
    h.engine.activate("b");
    h.frame_at(0);

    h.engine.pause("a");
    h.engine.pause("b");
    let summary = h.frame_at(16);
    assert!(summary.updated.is_empty());
    assert_eq!(summary.rendered, vec![a]);

    let settings = EngineSettings {
        render_paused_modules: false,
        ..EngineSettings::default()
    };
    let mut h = Harness::with_settings(settings);
    h.add("a");
    h.engine.activate("a");
    h.frame_at(0);
    h.engine.pause("a");
    assert!(h.frame_at(16).rendered.is_empty());
}

#[test]
fn pausing_an_uninitialized_module_only_initializes_it() {
    let mut h = Harness::new();
    h.add("a");
    h.engine.pause("a");
    h.frame_at(0);
    assert_eq!(h.state("a"), ModuleState::Inactive);
    assert_eq!(h.journal.take(), vec!["a:init"]);
}

#[test]
fn paused_module_deactivates_and_resumes_cleanly() {
    let mut h = Harness::new();
    h.add("a");
    h.add("keep");
    h.engine.activate("a");
    h.engine.activate("keep");
    h.frame_at(0);
    h.engine.pause("a");
    h.frame_at(16);
    h.engine.resume("a");
    h.frame_at(32);
    assert_eq!(h.state("a"), ModuleState::Active);

    h.engine.pause("a");
    h.frame_at(48);
    h.engine.deactivate("a");
    h.frame_at(64);
    assert_eq!(h.state("a"), ModuleState::Inactive);
    assert_eq!(h.journal.count("a:resume"), 1);
    assert_eq!(h.journal.count("a:deactivate"), 1);
}

#[test]
fn equal_priorities_keep_registration_order() {
    let mut h = Harness::new();
    let ids: Vec<ModuleId> = ["w", "x", "y", "z"].into_iter().map(|n| h.add(n)).collect();
    h.engine.set_priority("x", -1).unwrap();
    for name in ["z", "y", "x", "w"] {
        h.engine.activate(name);
    }

    let summary = h.frame_at(0);
    let [w, x, y, z]: [ModuleId; 4] = ids.try_into().unwrap();
    assert_eq!(summary.updated, vec![x, w, y, z]);
    assert_eq!(summary.rendered, summary.updated);
}

#[test]
fn module_parameters_are_visible_to_hooks() {
    let seen: Rc<RefCell<Option<i64>>> = Rc::default();
    let sink = Rc::clone(&seen);
    let mut h = Harness::new();
    h.add_probe("credits", move |p| {
        p.with_on_update(move |ctx| {
            *sink.borrow_mut() = ctx.param("speed").as_int();
        })
    });
    h.engine.set_parameter("credits", "speed", 3_i64).unwrap();
    h.engine.set_parameter("credits", "speed", 4_i64).unwrap();
    h.engine.activate("credits");
    h.frame_at(0);

    assert_eq!(*seen.borrow(), Some(4));
    assert!(h.engine.parameter("credits", "missing").unwrap().is_empty());
}
