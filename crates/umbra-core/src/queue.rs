//! Deferred state-change requests.
//!
//! Anything that wants a module to change state (the host, an input handler,
//! a module's own hooks) pushes a request here. The engine takes each queue
//! whole at its drain point and applies the requests in FIFO order:
//! deactivations, then activations, then pause/resume toggles.
//!
//! Requests pushed while a queue is being drained go into the fresh, empty
//! queue left behind by the take, so a drain never observes its own output.

use std::fmt;

use crate::module::ModuleId;

/// A reference to a module, resolved when the request is drained.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ModuleRef {
    /// Already-resolved registry id.
    Id(ModuleId),
    /// Name looked up at drain time.
    Name(String),
}

impl fmt::Display for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

impl From<ModuleId> for ModuleRef {
    fn from(id: ModuleId) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for ModuleRef {
    fn from(name: &str) -> Self {
        Self::Name(name.to_owned())
    }
}

impl From<String> for ModuleRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

/// Direction of a pause-queue request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PauseRequest {
    /// `Active -> Paused`.
    Pause,
    /// `Paused -> Active`.
    Resume,
}

/// The three request queues plus the shutdown signal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestQueues {
    deactivate: Vec<ModuleRef>,
    activate: Vec<ModuleRef>,
    pause: Vec<(ModuleRef, PauseRequest)>,
    shutdown: bool,
}

impl RequestQueues {
    /// Create empty queues.
    pub const fn new() -> Self {
        Self {
            deactivate: Vec::new(),
            activate: Vec::new(),
            pause: Vec::new(),
            shutdown: false,
        }
    }

    /// Queue an activation.
    pub fn request_activate(&mut self, module: impl Into<ModuleRef>) {
        self.activate.push(module.into());
    }

    /// Queue a deactivation.
    pub fn request_deactivate(&mut self, module: impl Into<ModuleRef>) {
        self.deactivate.push(module.into());
    }

    /// Queue a pause.
    pub fn request_pause(&mut self, module: impl Into<ModuleRef>) {
        self.pause.push((module.into(), PauseRequest::Pause));
    }

    /// Queue a resume.
    pub fn request_resume(&mut self, module: impl Into<ModuleRef>) {
        self.pause.push((module.into(), PauseRequest::Resume));
    }

    /// Ask the host loop to stop after the current frame.
    pub const fn request_shutdown(&mut self) {
        self.shutdown = true;
    }

    /// Whether shutdown has been requested.
    pub const fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    /// Take the deactivation queue, leaving it empty.
    pub fn take_deactivations(&mut self) -> Vec<ModuleRef> {
        std::mem::take(&mut self.deactivate)
    }

    /// Take the activation queue, leaving it empty.
    pub fn take_activations(&mut self) -> Vec<ModuleRef> {
        std::mem::take(&mut self.activate)
    }

    /// Take the pause/resume queue, leaving it empty.
    pub fn take_pause_requests(&mut self) -> Vec<(ModuleRef, PauseRequest)> {
        std::mem::take(&mut self.pause)
    }

    /// Whether any state-change request is pending.
    pub fn has_pending(&self) -> bool {
        !(self.deactivate.is_empty() && self.activate.is_empty() && self.pause.is_empty())
    }

    /// Pending deactivations, in queue order.
    pub fn pending_deactivations(&self) -> &[ModuleRef] {
        &self.deactivate
    }

    /// Pending activations, in queue order.
    pub fn pending_activations(&self) -> &[ModuleRef] {
        &self.activate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_leaves_queue_empty() {
        let mut queues = RequestQueues::new();
        queues.request_activate("menu");
        queues.request_activate("menu");
        assert!(queues.has_pending());

        let taken = queues.take_activations();
        assert_eq!(taken.len(), 2);
        assert!(!queues.has_pending());
    }

    #[test]
    fn requests_keep_fifo_order() {
        let mut queues = RequestQueues::new();
        queues.request_pause("a");
        queues.request_resume("a");
        queues.request_pause(ModuleId::new(3));

        let taken = queues.take_pause_requests();
        assert_eq!(
            taken,
            vec![
                (ModuleRef::from("a"), PauseRequest::Pause),
                (ModuleRef::from("a"), PauseRequest::Resume),
                (ModuleRef::Id(ModuleId::new(3)), PauseRequest::Pause),
            ]
        );
    }

    #[test]
    fn shutdown_is_not_a_pending_request() {
        let mut queues = RequestQueues::new();
        queues.request_shutdown();
        assert!(queues.shutdown_requested());
        assert!(!queues.has_pending());
    }

    #[test]
    fn module_ref_display() {
        assert_eq!(ModuleRef::from("ghost").to_string(), "\"ghost\"");
        assert_eq!(ModuleRef::from(ModuleId::new(2)).to_string(), "module#2");
    }
}
