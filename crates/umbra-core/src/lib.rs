//! Module lifecycle, request queues, and the per-frame scheduling engine.
//!
//! An Umbra application is a set of independently written modules (screens,
//! overlays, diagnostic panels). The [`Engine`] owns every module and decides,
//! frame by frame, which ones are active, in which order they update and
//! render, and how input and timeouts move them through their lifecycle.
//!
//! State changes are never applied on the spot. Modules, input handlers and
//! the host raise requests that land in queues; the engine drains those queues
//! at fixed points of each frame, so the set of modules iterated during the
//! update and render passes never changes underneath them.
//!
//! # Modules
//!
//! - [`canvas`] -- Rendering surface trait and an in-memory text canvas.
//! - [`clock`] -- Per-frame clock sampling, frame counter, fps and timings.
//! - [`config`] -- Configuration loading and save-back from `umbra-config.yaml`.
//! - [`engine`] -- The frame loop: drains, fallback, timeouts, passes.
//! - [`font`] -- Font registry and the font switching rule.
//! - [`input`] -- Input events, key bindings and global actions.
//! - [`module`] -- The [`Module`] hook trait, lifecycle states, module context.
//! - [`params`] -- Typed module parameters.
//! - [`queue`] -- Deferred activation, deactivation and pause requests.
//! - [`registry`] -- Module ownership, lookup and priority ordering.
//! - [`runner`] -- Frame-paced async loop driving the engine against a frontend.
//! - [`speedometer`] -- Built-in frame timing overlay.
//!
//! [`Engine`]: engine::Engine
//! [`Module`]: module::Module

pub mod canvas;
pub mod clock;
pub mod config;
pub mod engine;
pub mod font;
pub mod input;
pub mod module;
pub mod params;
pub mod queue;
pub mod registry;
pub mod runner;
pub mod speedometer;

pub use canvas::{Canvas, Rect, TextCanvas};
pub use clock::{FrameClock, FrameInfo};
pub use config::UmbraConfig;
pub use engine::{DisplayRequests, Engine, EngineError, EngineSettings, FrameSummary};
pub use input::{GlobalAction, InputEvent, KeyCode, KeyPress, Modifiers, MouseEvent};
pub use module::{EventFlow, Module, ModuleContext, ModuleError, ModuleId, ModuleState, UpdateFlow};
pub use params::ParamValue;
pub use queue::ModuleRef;
