#![forbid(unsafe_code)]

//! Exoplanet narrative runtime.
//!
//! This crate ties the `exo-core` data pipeline to an Elm-style message
//! loop that decides which scene is shown and which records are active.
//!
//! # Key Components
//!
//! - [`Program`] - message loop driving a [`Model`] and a [`Renderer`]
//! - [`Model`] - trait for application state and behavior
//! - [`Cmd`] - commands for side effects (background tasks, logs, quit)
//! - [`SceneController`] - the three-scene state machine
//! - [`NarrativeSession`] - the model owning dataset, controller and caches
//! - [`ProgramSimulator`] - deterministic, thread-free driver for tests
//!
//! # Role in the workspace
//! `exo-runtime` owns all interaction state. Drawing is external: a
//! [`Renderer`] receives one [`SceneFrame`] per render and reports user
//! interaction back as [`NarrativeMsg`] values.

pub mod config;
pub mod msg;
pub mod program;
pub mod renderer;
pub mod scene;
pub mod session;
pub mod simulator;

pub use config::SessionConfig;
pub use msg::NarrativeMsg;
pub use program::{Cmd, Model, Program, ProgramConfig, TaskSpec};
pub use renderer::{
    ComparisonDetail, DashboardDetail, EarthOverlay, LoadStatus, OverviewDetail, RecordingRenderer,
    Renderer, SceneDetail, SceneFrame,
};
pub use scene::{Scene, SceneController, SceneState, Transition};
pub use session::{DataSource, LoadState, NarrativeSession};
pub use simulator::{CmdRecord, ProgramSimulator};
