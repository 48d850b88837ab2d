//! Module lifecycle: the hook trait, states, and the engine-side slot.
//!
//! A module is any type implementing [`Module`]. The engine wraps it in a
//! [`ModuleSlot`] that carries everything the scheduler needs to know about
//! it: its name, lifecycle state, priority, fallback, timeout and parameters.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized -> Inactive <-> Active <-> Paused
//!                     ^                      |
//!                     +----------------------+
//! ```
//!
//! Only the slot's transition methods move a module along these edges, and
//! only the engine calls them, from its drain points. Hooks receive a
//! [`ModuleContext`] through which they can *request* changes; the requests
//! are applied at the next drain point.

use std::fmt;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::canvas::Canvas;
use crate::clock::FrameInfo;
use crate::input::{KeyPress, MouseEvent};
use crate::params::{ParamValue, Params};
use crate::queue::{ModuleRef, RequestQueues};

/// Errors raised by module hooks.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModuleError {
    /// The module's setup hook failed. The module stays uninitialized.
    #[error("module \"{module}\" failed to initialize: {reason}")]
    InitializationFailed {
        /// Name of the module.
        module: String,
        /// What went wrong.
        reason: String,
    },
}

impl ModuleError {
    /// Build an [`InitializationFailed`](Self::InitializationFailed) error
    /// for the module owning `ctx`.
    pub fn initialization(ctx: &ModuleContext<'_>, reason: impl Into<String>) -> Self {
        Self::InitializationFailed {
            module: ctx.name().to_owned(),
            reason: reason.into(),
        }
    }
}

/// Stable identifier of a registered module (its registration index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ModuleId(usize);

impl ModuleId {
    /// Wrap a registration index.
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// The registration index.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "module#{}", self.0)
    }
}

/// Lifecycle state of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModuleState {
    /// Registered, setup hook not run yet.
    Uninitialized,
    /// Set up but not running.
    Inactive,
    /// Updated and rendered every frame.
    Active,
    /// Frozen: not updated, rendered only if the render policy allows it.
    Paused,
}

impl ModuleState {
    /// Whether `self -> next` is one of the lifecycle edges.
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Uninitialized, Self::Inactive)
                | (Self::Inactive, Self::Active)
                | (Self::Active, Self::Inactive | Self::Paused)
                | (Self::Paused, Self::Active | Self::Inactive)
        )
    }

    /// Active or paused: the module occupies a place in the frame.
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Active | Self::Paused)
    }
}

impl fmt::Display for ModuleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Uninitialized => "uninitialized",
            Self::Inactive => "inactive",
            Self::Active => "active",
            Self::Paused => "paused",
        };
        f.write_str(label)
    }
}

/// Result of a module's `update` hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateFlow {
    /// Keep running.
    Continue,
    /// Deactivate this module at the next drain point.
    Stop,
}

/// Whether an input event should be offered to further modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventFlow {
    /// Let later modules see the event.
    Continue,
    /// Stop propagation.
    Consumed,
}

/// Hooks implemented by every module.
///
/// All hooks except [`update`](Module::update) and
/// [`render`](Module::render) have no-op defaults.
pub trait Module {
    /// Called once, the first time the module is activated (or paused).
    ///
    /// Returning an error leaves the module uninitialized; the next
    /// activation request tries again.
    fn on_initialize(&mut self, _ctx: &mut ModuleContext<'_>) -> Result<(), ModuleError> {
        Ok(())
    }

    /// Called after the module became active.
    fn on_activate(&mut self, _ctx: &mut ModuleContext<'_>) {}

    /// Called after the module became inactive.
    fn on_deactivate(&mut self, _ctx: &mut ModuleContext<'_>) {}

    /// Called after the module was paused.
    fn on_pause(&mut self, _ctx: &mut ModuleContext<'_>) {}

    /// Called after the module was resumed.
    fn on_resume(&mut self, _ctx: &mut ModuleContext<'_>) {}

    /// A key press not claimed by a global binding.
    fn on_key(&mut self, _ctx: &mut ModuleContext<'_>, _key: &KeyPress) -> EventFlow {
        EventFlow::Continue
    }

    /// A mouse event.
    fn on_mouse(&mut self, _ctx: &mut ModuleContext<'_>, _mouse: &MouseEvent) -> EventFlow {
        EventFlow::Continue
    }

    /// Per-frame logic, called while the module is active and the engine is
    /// not globally paused.
    fn update(&mut self, ctx: &mut ModuleContext<'_>) -> UpdateFlow;

    /// Draw the module. Must not block.
    fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInfo);
}

/// The capability handed to a module's hooks.
///
/// It exposes the module's own identity and parameters, the current frame,
/// and the request queues. It cannot change any module's state directly.
pub struct ModuleContext<'a> {
    id: ModuleId,
    name: &'a str,
    params: &'a Params,
    frame: &'a FrameInfo,
    requests: &'a mut RequestQueues,
}

impl<'a> ModuleContext<'a> {
    /// Build a context. Used by the engine and by tests driving hooks directly.
    pub const fn new(
        id: ModuleId,
        name: &'a str,
        params: &'a Params,
        frame: &'a FrameInfo,
        requests: &'a mut RequestQueues,
    ) -> Self {
        Self {
            id,
            name,
            params,
            frame,
            requests,
        }
    }

    /// Id of the module owning this context.
    pub const fn id(&self) -> ModuleId {
        self.id
    }

    /// Name of the module owning this context.
    pub const fn name(&self) -> &str {
        self.name
    }

    /// A parameter of this module, or [`ParamValue::Empty`].
    pub fn param(&self, name: &str) -> &ParamValue {
        self.params.get(name)
    }

    /// All parameters of this module.
    pub const fn params(&self) -> &Params {
        self.params
    }

    /// The current frame.
    pub const fn frame(&self) -> &FrameInfo {
        self.frame
    }

    /// Request activation of a module.
    pub fn activate(&mut self, module: impl Into<ModuleRef>) {
        self.requests.request_activate(module);
    }

    /// Request deactivation of a module.
    pub fn deactivate(&mut self, module: impl Into<ModuleRef>) {
        self.requests.request_deactivate(module);
    }

    /// Request deactivation of this module.
    pub fn deactivate_self(&mut self) {
        self.requests.request_deactivate(self.id);
    }

    /// Request a pause of a module.
    pub fn pause(&mut self, module: impl Into<ModuleRef>) {
        self.requests.request_pause(module);
    }

    /// Request a resume of a module.
    pub fn resume(&mut self, module: impl Into<ModuleRef>) {
        self.requests.request_resume(module);
    }

    /// Ask the host loop to stop.
    pub fn request_shutdown(&mut self) {
        self.requests.request_shutdown();
    }
}

/// Engine-side record of a registered module.
pub struct ModuleSlot {
    id: ModuleId,
    name: String,
    state: ModuleState,
    priority: i32,
    fallback: Option<ModuleId>,
    timeout: Option<Duration>,
    deadline: Option<Instant>,
    params: Params,
    render_when_paused: Option<bool>,
    behaviour: Box<dyn Module>,
}

impl fmt::Debug for ModuleSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleSlot")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("priority", &self.priority)
            .field("fallback", &self.fallback)
            .field("timeout", &self.timeout)
            .field("deadline", &self.deadline)
            .field("params", &self.params)
            .field("render_when_paused", &self.render_when_paused)
            .finish_non_exhaustive()
    }
}

impl ModuleSlot {
    /// Wrap a module. New slots are uninitialized with priority 0.
    pub(crate) fn new(id: ModuleId, name: String, behaviour: Box<dyn Module>) -> Self {
        Self {
            id,
            name,
            state: ModuleState::Uninitialized,
            priority: 0,
            fallback: None,
            timeout: None,
            deadline: None,
            params: Params::new(),
            render_when_paused: None,
            behaviour,
        }
    }

    /// Registry id.
    pub const fn id(&self) -> ModuleId {
        self.id
    }

    /// Registered name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> ModuleState {
        self.state
    }

    /// Ordering key; lower goes first.
    pub const fn priority(&self) -> i32 {
        self.priority
    }

    /// Fallback module, if any.
    pub const fn fallback(&self) -> Option<ModuleId> {
        self.fallback
    }

    /// Configured timeout, if any.
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Expiry instant armed at the last activation.
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Module parameters.
    pub const fn params(&self) -> &Params {
        &self.params
    }

    /// Per-module override of the paused render policy.
    pub const fn render_when_paused(&self) -> Option<bool> {
        self.render_when_paused
    }

    pub(crate) const fn set_priority(&mut self, priority: i32) {
        self.priority = priority;
    }

    pub(crate) const fn set_fallback(&mut self, fallback: Option<ModuleId>) {
        self.fallback = fallback;
    }

    pub(crate) const fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub(crate) const fn set_render_when_paused(&mut self, policy: Option<bool>) {
        self.render_when_paused = policy;
    }

    pub(crate) const fn params_mut(&mut self) -> &mut Params {
        &mut self.params
    }

    /// Whether this module is drawn while paused, given the engine default.
    pub fn renders_when_paused(&self, engine_default: bool) -> bool {
        self.render_when_paused.unwrap_or(engine_default)
    }

    /// Arm the timeout from `now`. Modules without a timeout never expire.
    pub(crate) fn initialize_timeout(&mut self, now: Instant) {
        self.deadline = self.timeout.and_then(|timeout| now.checked_add(timeout));
    }

    /// Whether the module is active and its deadline is at or before `now`.
    pub fn is_expired(&self, now: Instant) -> bool {
        self.state == ModuleState::Active && self.deadline.is_some_and(|deadline| now >= deadline)
    }

    fn transition(&mut self, next: ModuleState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next} for {}",
            self.state,
            self.name
        );
        trace!(module = %self.name, from = %self.state, to = %next, "Module state transition");
        self.state = next;
    }

    /// Run `f` with this module's behaviour and a context borrowing its
    /// name and parameters.
    pub(crate) fn dispatch<R>(
        &mut self,
        frame: &FrameInfo,
        requests: &mut RequestQueues,
        f: impl FnOnce(&mut dyn Module, &mut ModuleContext<'_>) -> R,
    ) -> R {
        let mut ctx = ModuleContext::new(self.id, &self.name, &self.params, frame, requests);
        f(self.behaviour.as_mut(), &mut ctx)
    }

    /// `Uninitialized -> Inactive`. Returns whether the setup hook ran.
    pub(crate) fn initialize(
        &mut self,
        frame: &FrameInfo,
        requests: &mut RequestQueues,
    ) -> Result<bool, ModuleError> {
        if self.state != ModuleState::Uninitialized {
            return Ok(false);
        }
        self.dispatch(frame, requests, |module, ctx| module.on_initialize(ctx))?;
        self.transition(ModuleState::Inactive);
        debug!(module = %self.name, "Module initialized");
        Ok(true)
    }

    /// `Inactive -> Active`, initializing first if needed.
    ///
    /// Returns whether the module became active. Already active or paused
    /// modules are left untouched.
    pub(crate) fn activate(
        &mut self,
        frame: &FrameInfo,
        requests: &mut RequestQueues,
    ) -> Result<bool, ModuleError> {
        self.initialize(frame, requests)?;
        if self.state != ModuleState::Inactive {
            return Ok(false);
        }
        self.transition(ModuleState::Active);
        self.initialize_timeout(frame.now);
        self.dispatch(frame, requests, |module, ctx| module.on_activate(ctx));
        Ok(true)
    }

    /// `Active | Paused -> Inactive`. Returns whether the module changed state.
    pub(crate) fn deactivate(&mut self, frame: &FrameInfo, requests: &mut RequestQueues) -> bool {
        if !self.state.is_running() {
            return false;
        }
        self.transition(ModuleState::Inactive);
        self.deadline = None;
        self.dispatch(frame, requests, |module, ctx| module.on_deactivate(ctx));
        true
    }

    /// `Active -> Paused`, initializing first if needed.
    pub(crate) fn pause(
        &mut self,
        frame: &FrameInfo,
        requests: &mut RequestQueues,
    ) -> Result<bool, ModuleError> {
        self.initialize(frame, requests)?;
        if self.state != ModuleState::Active {
            return Ok(false);
        }
        self.transition(ModuleState::Paused);
        self.dispatch(frame, requests, |module, ctx| module.on_pause(ctx));
        Ok(true)
    }

    /// `Paused -> Active`. Returns whether the module changed state.
    pub(crate) fn resume(&mut self, frame: &FrameInfo, requests: &mut RequestQueues) -> bool {
        if self.state != ModuleState::Paused {
            return false;
        }
        self.transition(ModuleState::Active);
        self.dispatch(frame, requests, |module, ctx| module.on_resume(ctx));
        true
    }

    pub(crate) fn update(&mut self, frame: &FrameInfo, requests: &mut RequestQueues) -> UpdateFlow {
        self.dispatch(frame, requests, |module, ctx| module.update(ctx))
    }

    pub(crate) fn render(&mut self, canvas: &mut dyn Canvas, frame: &FrameInfo) {
        self.behaviour.render(canvas, frame);
    }
}
