//! The per-frame scheduling engine.
//!
//! Each call to [`Engine::run_frame`] runs these steps, in this order:
//!
//! 1. **Deactivation drain** -- queued deactivations are applied.
//!
//! 2. **Activation drain** -- queued activations are applied, initializing
//!    modules on first use and arming their timeouts.
//!
//! 3. **Fallback** -- if no module is active, the fallback chain of the most
//!    recently deactivated module (or the engine's default fallback) is
//!    walked until a module activates. A walk that finds nothing is retried
//!    on the next frame.
//!
//! 4. **Pause drain** -- queued pause and resume requests are applied.
//!
//! 5. **Input** -- global key bindings first, then the running modules in
//!    priority order until one consumes the event.
//!
//! 6. **Timeout sweep** -- expired modules get a deactivation queued for the
//!    next frame.
//!
//! 7. **Update** -- active modules, in priority order.
//!
//! 8. **Render** -- active modules, and paused ones if the render policy
//!    allows it, in the same order.
//!
//! While the engine is globally paused, steps 6 and 7 are skipped.
//!
//! Module states only change during steps 1 to 4. The module order used by
//! steps 5 to 8 is computed once after step 4, so the update and render
//! passes always see the same set of modules.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, info_span, warn};

use crate::canvas::Canvas;
use crate::clock::{FrameClock, FrameInfo};
use crate::config::{ChainEntry, UmbraConfig};
use crate::font::{Font, FontRegistry};
use crate::input::{GlobalAction, InputEvent, KeyBindings};
use crate::module::{EventFlow, Module, ModuleId, ModuleSlot, ModuleState, UpdateFlow};
use crate::params::ParamValue;
use crate::queue::{ModuleRef, PauseRequest, RequestQueues};
use crate::registry::{ModuleRegistry, RegistryError};
use crate::speedometer::{SPEEDOMETER_NAME, SPEEDOMETER_PRIORITY, Speedometer};

/// Errors returned by the engine's registration and configuration APIs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// A registry operation failed.
    #[error("registry error: {source}")]
    Registry {
        /// The underlying registry error.
        #[from]
        source: RegistryError,
    },
}

/// Engine-wide settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// Whether paused modules are rendered (per-module overrides win).
    pub render_paused_modules: bool,
    /// Module activated when nothing is active and the last deactivated
    /// module has no fallback.
    pub default_fallback: Option<String>,
    /// Initially selected font.
    pub font_id: usize,
    /// Fonts to register.
    pub fonts: Vec<Font>,
    /// Initial fullscreen mode.
    pub full_screen: bool,
    /// Reserved key bindings.
    pub bindings: KeyBindings,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            render_paused_modules: true,
            default_fallback: None,
            font_id: 0,
            fonts: Vec::new(),
            full_screen: false,
            bindings: KeyBindings::default(),
        }
    }
}

impl EngineSettings {
    /// Settings taken from a loaded configuration.
    pub fn from_config(config: &UmbraConfig) -> Self {
        Self {
            render_paused_modules: config.engine.render_paused_modules,
            default_fallback: config.engine.default_fallback.clone(),
            font_id: config.font.font_id,
            fonts: config.font.fonts.clone(),
            full_screen: config.window.full_screen,
            bindings: KeyBindings::default(),
        }
    }
}

/// Requests for the frontend raised by global actions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayRequests {
    /// Desired display mode.
    pub fullscreen: bool,
    /// A screenshot was requested since the last take.
    pub screenshot: bool,
    /// The font changed; the surface must be rebuilt.
    pub reinitialize: bool,
}

/// What happened during one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameSummary {
    /// The frame number.
    pub frame: u64,
    /// Whether updates were skipped because of the global pause.
    pub paused: bool,
    /// Modules deactivated by the drain.
    pub deactivated: Vec<ModuleId>,
    /// Modules activated by the drain or the fallback walk.
    pub activated: Vec<ModuleId>,
    /// Module activated by the fallback walk.
    pub fallback: Option<ModuleId>,
    /// Modules whose timeout expired this frame.
    pub timed_out: Vec<ModuleId>,
    /// Modules updated, in call order.
    pub updated: Vec<ModuleId>,
    /// Modules rendered, in call order.
    pub rendered: Vec<ModuleId>,
}

/// The module scheduler.
#[derive(Debug)]
pub struct Engine {
    /// Every registered module.
    registry: ModuleRegistry,

    /// Pending state-change requests.
    requests: RequestQueues,

    /// Per-frame clock.
    clock: FrameClock,

    /// Reserved key bindings.
    bindings: KeyBindings,

    /// Registered fonts and the current selection.
    fonts: FontRegistry,

    /// Engine-wide paused render policy.
    render_paused: bool,

    /// Name of the module tried when a fallback walk has nowhere to start.
    default_fallback: Option<String>,

    /// Most recently deactivated module, where fallback walks start.
    last_deactivated: Option<ModuleId>,

    /// Global pause flag.
    paused: bool,

    /// Desired display mode.
    fullscreen: bool,

    /// One-shot display requests, cleared by [`Engine::take_display_requests`].
    screenshot_requested: bool,
    reinitialize_requested: bool,

    /// Id of the built-in speedometer.
    speedometer: ModuleId,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl Engine {
    /// Create an engine. The speedometer is registered, inactive.
    pub fn new(settings: EngineSettings) -> Self {
        let mut registry = ModuleRegistry::new();
        let speedometer = registry.register_reserved(
            SPEEDOMETER_NAME.to_owned(),
            Box::new(Speedometer::new()),
            SPEEDOMETER_PRIORITY,
        );

        let mut fonts = FontRegistry::new(settings.font_id);
        for font in settings.fonts {
            fonts.register(font);
        }
        if !fonts.is_empty() && !fonts.activate_font(0) {
            warn!(font_id = settings.font_id, "Configured font does not exist");
        }

        info!(
            render_paused_modules = settings.render_paused_modules,
            default_fallback = settings.default_fallback.as_deref().unwrap_or(""),
            fonts = fonts.len(),
            "Engine created"
        );

        Self {
            registry,
            requests: RequestQueues::new(),
            clock: FrameClock::new(),
            bindings: settings.bindings,
            fonts,
            render_paused: settings.render_paused_modules,
            default_fallback: settings.default_fallback,
            last_deactivated: None,
            paused: false,
            fullscreen: settings.full_screen,
            screenshot_requested: false,
            reinitialize_requested: false,
            speedometer,
        }
    }

    /// Create an engine from a loaded configuration.
    pub fn from_config(config: &UmbraConfig) -> Self {
        Self::new(EngineSettings::from_config(config))
    }

    // -----------------------------------------------------------------
    // Registration and per-module settings
    // -----------------------------------------------------------------

    /// Register a module under a unique name. It starts uninitialized.
    pub fn register_module(
        &mut self,
        name: impl Into<String>,
        module: impl Module + 'static,
    ) -> Result<ModuleId, EngineError> {
        let name = name.into();
        let id = self.registry.register(name.clone(), Box::new(module))?;
        info!(module = %name, id = %id, "Module registered");
        Ok(id)
    }

    /// Change a module's priority.
    pub fn set_priority(
        &mut self,
        module: impl Into<ModuleRef>,
        priority: i32,
    ) -> Result<(), EngineError> {
        let id = self.registry.resolve(&module.into())?;
        self.registry.set_priority(id, priority)?;
        Ok(())
    }

    /// Set or clear a module's timeout. Applies from its next activation.
    pub fn set_timeout(
        &mut self,
        module: impl Into<ModuleRef>,
        timeout: Option<Duration>,
    ) -> Result<(), EngineError> {
        let id = self.registry.resolve(&module.into())?;
        self.registry.set_timeout(id, timeout)?;
        Ok(())
    }

    /// Point a module's fallback at the module named `fallback`.
    ///
    /// The name is looked up now. An unknown name is logged and nothing is
    /// stored.
    pub fn set_fallback(
        &mut self,
        module: impl Into<ModuleRef>,
        fallback: &str,
    ) -> Result<(), EngineError> {
        let id = self.registry.resolve(&module.into())?;
        if let Err(err) = self.registry.set_fallback(id, fallback) {
            error!(module = %id, fallback, error = %err, "Cannot set fallback");
            return Err(err.into());
        }
        Ok(())
    }

    /// Remove a module's fallback.
    pub fn clear_fallback(&mut self, module: impl Into<ModuleRef>) -> Result<(), EngineError> {
        let id = self.registry.resolve(&module.into())?;
        self.registry.clear_fallback(id)?;
        Ok(())
    }

    /// Upsert a module parameter.
    pub fn set_parameter(
        &mut self,
        module: impl Into<ModuleRef>,
        name: &str,
        value: impl Into<ParamValue>,
    ) -> Result<(), EngineError> {
        let id = self.registry.resolve(&module.into())?;
        self.registry.set_parameter(id, name, value)?;
        Ok(())
    }

    /// A module parameter, [`ParamValue::Empty`] if unset. `None` if the
    /// module does not exist.
    pub fn parameter(&self, module: impl Into<ModuleRef>, name: &str) -> Option<&ParamValue> {
        let id = self.registry.resolve(&module.into()).ok()?;
        self.registry.get(id).map(|slot| slot.params().get(name))
    }

    /// Override the paused render policy of one module.
    pub fn set_render_when_paused(
        &mut self,
        module: impl Into<ModuleRef>,
        policy: Option<bool>,
    ) -> Result<(), EngineError> {
        let id = self.registry.resolve(&module.into())?;
        self.registry.set_render_when_paused(id, policy)?;
        Ok(())
    }

    /// Change the default fallback.
    pub fn set_default_fallback(&mut self, name: Option<String>) {
        self.default_fallback = name;
    }

    /// Reserved key bindings, for rebinding at runtime.
    pub const fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    /// Apply a configured module chain and queue its activations.
    ///
    /// Entries naming unknown modules are logged and skipped. Returns the
    /// number of activation requests queued.
    pub fn load_chain(&mut self, name: &str, entries: &[ChainEntry]) -> usize {
        let _span = info_span!("load_chain", chain = name).entered();
        let mut queued: usize = 0;
        for entry in entries {
            let Some(id) = self.registry.lookup(&entry.module) else {
                error!(module = %entry.module, "Chain names an unregistered module");
                continue;
            };
            if let Some(priority) = entry.priority
                && let Err(err) = self.set_priority(id, priority)
            {
                error!(module = %entry.module, error = %err, "Cannot set priority");
            }
            if let Some(timeout_ms) = entry.timeout_ms
                && let Err(err) = self.set_timeout(id, Some(Duration::from_millis(timeout_ms)))
            {
                error!(module = %entry.module, error = %err, "Cannot set timeout");
            }
            if let Some(fallback) = &entry.fallback
                && let Err(err) = self.set_fallback(id, fallback)
            {
                debug!(module = %entry.module, error = %err, "Chain fallback skipped");
            }
            if entry.render_when_paused.is_some()
                && let Err(err) = self.set_render_when_paused(id, entry.render_when_paused)
            {
                error!(module = %entry.module, error = %err, "Cannot set render policy");
            }
            for (param, value) in &entry.params {
                if let Err(err) = self.set_parameter(id, param, value.clone()) {
                    error!(module = %entry.module, param = %param, error = %err, "Cannot set parameter");
                }
            }
            if entry.active {
                self.requests.request_activate(id);
                queued = queued.saturating_add(1);
            }
        }
        info!(queued, "Module chain loaded");
        queued
    }

    /// Load the chain selected by `module_chain` in the configuration.
    pub fn load_startup_chain(&mut self, config: &UmbraConfig) -> usize {
        let Some(name) = config.module_chain.as_deref() else {
            debug!("No startup module chain configured");
            return 0;
        };
        match config.startup_chain() {
            Some((name, entries)) => self.load_chain(name, entries),
            None => {
                error!(chain = name, "Configured module chain does not exist");
                0
            }
        }
    }

    // -----------------------------------------------------------------
    // Requests
    // -----------------------------------------------------------------

    /// Queue the activation of a module.
    pub fn activate(&mut self, module: impl Into<ModuleRef>) {
        self.requests.request_activate(module);
    }

    /// Queue the deactivation of a module.
    pub fn deactivate(&mut self, module: impl Into<ModuleRef>) {
        self.requests.request_deactivate(module);
    }

    /// Queue a pause of a module.
    pub fn pause(&mut self, module: impl Into<ModuleRef>) {
        self.requests.request_pause(module);
    }

    /// Queue a resume of a module.
    pub fn resume(&mut self, module: impl Into<ModuleRef>) {
        self.requests.request_resume(module);
    }

    /// Queue the deactivation of every running module.
    pub fn deactivate_all(&mut self) {
        for slot in self.registry.iter_ordered() {
            if slot.state().is_running() {
                self.requests.request_deactivate(slot.id());
            }
        }
    }

    /// Ask the host loop to stop.
    pub const fn request_shutdown(&mut self) {
        self.requests.request_shutdown();
    }

    /// Whether shutdown has been requested.
    pub const fn shutdown_requested(&self) -> bool {
        self.requests.shutdown_requested()
    }

    /// Set the global pause.
    pub fn set_paused(&mut self, paused: bool) {
        if self.paused != paused {
            info!(paused, "Global pause changed");
        }
        self.paused = paused;
    }

    /// Flip the global pause.
    pub fn toggle_pause(&mut self) {
        self.set_paused(!self.paused);
    }

    /// Whether the engine is globally paused.
    pub const fn is_paused(&self) -> bool {
        self.paused
    }

    // -----------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------

    /// The module registry.
    pub const fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// Id registered under `name`.
    pub fn lookup(&self, name: &str) -> Option<ModuleId> {
        self.registry.lookup(name)
    }

    /// A module's slot.
    pub fn module(&self, id: ModuleId) -> Option<&ModuleSlot> {
        self.registry.get(id)
    }

    /// State of a module, `None` if it does not exist.
    pub fn state(&self, module: impl Into<ModuleRef>) -> Option<ModuleState> {
        let id = self.registry.resolve(&module.into()).ok()?;
        self.registry.state(id)
    }

    /// Active modules in priority order.
    pub fn active_modules(&self) -> Vec<ModuleId> {
        self.registry.ids_in_state(ModuleState::Active)
    }

    /// Id of the built-in speedometer.
    pub const fn speedometer(&self) -> ModuleId {
        self.speedometer
    }

    /// Registered fonts.
    pub const fn fonts(&self) -> &FontRegistry {
        &self.fonts
    }

    /// Desired display mode.
    pub const fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Frames run so far.
    pub const fn frame(&self) -> u64 {
        self.clock.frame()
    }

    /// Whether requests are waiting for the next drain.
    pub fn has_pending(&self) -> bool {
        self.requests.has_pending()
    }

    /// Nothing is running, nothing is queued and no fallback walk would
    /// start on the next frame.
    pub fn is_idle(&self) -> bool {
        !self.registry.any_running()
            && !self.requests.has_pending()
            && (self.requests.shutdown_requested() || self.fallback_start().is_none())
    }

    /// Display requests raised since the last call. One-shot requests are
    /// cleared.
    pub const fn take_display_requests(&mut self) -> DisplayRequests {
        let requests = DisplayRequests {
            fullscreen: self.fullscreen,
            screenshot: self.screenshot_requested,
            reinitialize: self.reinitialize_requested,
        };
        self.screenshot_requested = false;
        self.reinitialize_requested = false;
        requests
    }

    // -----------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------

    /// Run one frame sampled at the current time.
    pub fn tick(&mut self, events: &[InputEvent], canvas: &mut dyn Canvas) -> FrameSummary {
        self.run_frame(Instant::now(), events, canvas)
    }

    /// Run one frame. `now` is the only clock sample used by the frame.
    pub fn run_frame(
        &mut self,
        now: Instant,
        events: &[InputEvent],
        canvas: &mut dyn Canvas,
    ) -> FrameSummary {
        let frame = self.clock.begin_frame(now, self.paused);
        let mut summary = FrameSummary {
            frame: frame.frame,
            ..FrameSummary::default()
        };

        summary.deactivated = self.drain_deactivations(&frame);
        summary.activated = self.drain_activations(&frame);
        if self.active_modules().is_empty() {
            let fresh = !summary.deactivated.is_empty();
            summary.fallback = self.resolve_fallback(&frame, fresh);
            summary.activated.extend(summary.fallback);
        }
        self.drain_pause_requests(&frame);

        let order = self.registry.ordered().to_vec();
        self.deliver_input(&frame, &order, events);

        // Input may have toggled the global pause.
        let frame = FrameInfo {
            paused: self.paused,
            ..frame
        };
        summary.paused = self.paused;

        let update_start = Instant::now();
        if !self.paused {
            summary.timed_out = self.sweep_timeouts(now, &order);
            summary.updated = self.update_pass(&frame, &order);
        }
        self.clock.record_update_time(update_start.elapsed());

        let render_start = Instant::now();
        canvas.clear();
        summary.rendered = self.render_pass(canvas, &frame, &order);
        self.clock.record_render_time(render_start.elapsed());

        summary
    }

    fn resolve_logged(&self, reference: &ModuleRef) -> Option<ModuleId> {
        match self.registry.resolve(reference) {
            Ok(id) => Some(id),
            Err(err) => {
                error!(error = %err, "Dropping request for an unknown module");
                None
            }
        }
    }

    fn drain_deactivations(&mut self, frame: &FrameInfo) -> Vec<ModuleId> {
        let mut deactivated = Vec::new();
        for reference in self.requests.take_deactivations() {
            let Some(id) = self.resolve_logged(&reference) else {
                continue;
            };
            let Some(slot) = self.registry.get_mut(id) else {
                continue;
            };
            if slot.deactivate(frame, &mut self.requests) {
                info!(module = %slot.name(), "Module deactivated");
                deactivated.push(id);
                self.last_deactivated = Some(id);
            }
        }
        deactivated
    }

    fn drain_activations(&mut self, frame: &FrameInfo) -> Vec<ModuleId> {
        let mut activated = Vec::new();
        for reference in self.requests.take_activations() {
            let Some(id) = self.resolve_logged(&reference) else {
                continue;
            };
            let Some(slot) = self.registry.get_mut(id) else {
                continue;
            };
            match slot.activate(frame, &mut self.requests) {
                Ok(true) => {
                    info!(module = %slot.name(), "Module activated");
                    activated.push(id);
                }
                Ok(false) => debug!(module = %slot.name(), state = %slot.state(), "Module already running"),
                Err(err) => error!(error = %err, "Module activation failed"),
            }
        }
        activated
    }

    /// First module of the fallback walk: the fallback of the most recently
    /// deactivated module, else the default fallback.
    fn fallback_start(&self) -> Option<ModuleId> {
        self.last_deactivated
            .and_then(|id| self.registry.get(id))
            .and_then(ModuleSlot::fallback)
            .or_else(|| {
                self.default_fallback
                    .as_deref()
                    .and_then(|name| self.registry.lookup(name))
            })
    }

    /// Walk the fallback chain until a module activates. `fresh` is set when
    /// a deactivation happened this frame; retries on later frames log less.
    fn resolve_fallback(&mut self, frame: &FrameInfo, fresh: bool) -> Option<ModuleId> {
        if self.requests.shutdown_requested() {
            return None;
        }
        let Some(start) = self.fallback_start() else {
            if fresh && let Some(name) = self.default_fallback.as_deref() {
                error!(module = name, "Default fallback is not registered");
            }
            return None;
        };
        let _span = info_span!("fallback", frame = frame.frame, start = %start).entered();

        let mut candidate = Some(start);
        let mut visited = BTreeSet::new();

        while let Some(id) = candidate {
            if !visited.insert(id) {
                debug!(module = %id, "Fallback chain loops back on itself");
                break;
            }
            let slot = self.registry.get_mut(id)?;
            match slot.activate(frame, &mut self.requests) {
                Ok(true) => {
                    info!(module = %slot.name(), "Fallback module activated");
                    return Some(id);
                }
                Ok(false) => debug!(module = %slot.name(), "Fallback module cannot be activated"),
                Err(err) => error!(error = %err, "Fallback module failed to initialize"),
            }
            candidate = slot.fallback();
        }

        if fresh {
            warn!("Fallback chain exhausted, no module is active");
        } else {
            debug!("Fallback chain still exhausted");
        }
        None
    }

    fn drain_pause_requests(&mut self, frame: &FrameInfo) {
        for (reference, request) in self.requests.take_pause_requests() {
            let Some(id) = self.resolve_logged(&reference) else {
                continue;
            };
            let Some(slot) = self.registry.get_mut(id) else {
                continue;
            };
            match request {
                PauseRequest::Pause => match slot.pause(frame, &mut self.requests) {
                    Ok(true) => info!(module = %slot.name(), "Module paused"),
                    Ok(false) => debug!(module = %slot.name(), state = %slot.state(), "Module not active, pause ignored"),
                    Err(err) => error!(error = %err, "Module pause failed"),
                },
                PauseRequest::Resume => {
                    if slot.resume(frame, &mut self.requests) {
                        info!(module = %slot.name(), "Module resumed");
                    }
                }
            }
        }
    }

    fn deliver_input(&mut self, frame: &FrameInfo, order: &[ModuleId], events: &[InputEvent]) {
        for event in events {
            if let InputEvent::Key(key) = event
                && let Some(action) = self.bindings.action_for(key)
            {
                self.apply_global_action(action);
                continue;
            }
            if self.paused {
                continue;
            }
            for &id in order {
                let Some(slot) = self.registry.get_mut(id) else {
                    continue;
                };
                if !slot.state().is_running() {
                    continue;
                }
                let flow = slot.dispatch(frame, &mut self.requests, |module, ctx| match event {
                    InputEvent::Key(key) => module.on_key(ctx, key),
                    InputEvent::Mouse(mouse) => module.on_mouse(ctx, mouse),
                });
                if flow == EventFlow::Consumed {
                    break;
                }
            }
        }
    }

    /// Run a global action. Called for events matching a reserved binding.
    pub fn apply_global_action(&mut self, action: GlobalAction) {
        info!(action = ?action, "Global action");
        match action {
            GlobalAction::Quit => {
                self.deactivate_all();
                self.requests.request_shutdown();
            }
            GlobalAction::ToggleFullscreen => self.fullscreen = !self.fullscreen,
            GlobalAction::Screenshot => self.screenshot_requested = true,
            GlobalAction::FontUp => self.shift_font(1),
            GlobalAction::FontDown => self.shift_font(-1),
            GlobalAction::TogglePause => self.toggle_pause(),
            GlobalAction::ToggleSpeedometer => {
                if self.registry.state(self.speedometer).is_some_and(ModuleState::is_running) {
                    self.requests.request_deactivate(self.speedometer);
                } else {
                    self.requests.request_activate(self.speedometer);
                }
            }
        }
    }

    fn shift_font(&mut self, shift: i32) {
        if self.fonts.activate_font(shift) {
            info!(font_id = self.fonts.font_id(), "Font changed");
            self.reinitialize_requested = true;
        } else {
            debug!(font_id = self.fonts.font_id(), shift, "Font unchanged");
        }
    }

    fn sweep_timeouts(&mut self, now: Instant, order: &[ModuleId]) -> Vec<ModuleId> {
        let mut expired = Vec::new();
        for &id in order {
            let Some(slot) = self.registry.get(id) else {
                continue;
            };
            if slot.is_expired(now) {
                info!(module = %slot.name(), "Module timed out");
                self.requests.request_deactivate(id);
                expired.push(id);
            }
        }
        expired
    }

    fn update_pass(&mut self, frame: &FrameInfo, order: &[ModuleId]) -> Vec<ModuleId> {
        let mut updated = Vec::new();
        for &id in order {
            let Some(slot) = self.registry.get_mut(id) else {
                continue;
            };
            if slot.state() != ModuleState::Active {
                continue;
            }
            if slot.update(frame, &mut self.requests) == UpdateFlow::Stop {
                debug!(module = %slot.name(), "Module asked to stop");
                self.requests.request_deactivate(id);
            }
            updated.push(id);
        }
        updated
    }

    fn render_pass(
        &mut self,
        canvas: &mut dyn Canvas,
        frame: &FrameInfo,
        order: &[ModuleId],
    ) -> Vec<ModuleId> {
        let mut rendered = Vec::new();
        for &id in order {
            let Some(slot) = self.registry.get_mut(id) else {
                continue;
            };
            let visible = match slot.state() {
                ModuleState::Active => true,
                ModuleState::Paused => slot.renders_when_paused(self.render_paused),
                ModuleState::Uninitialized | ModuleState::Inactive => false,
            };
            if visible {
                slot.render(canvas, frame);
                rendered.push(id);
            }
        }
        rendered
    }
}
