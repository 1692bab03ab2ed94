#![forbid(unsafe_code)]

//! The rendering contract.
//!
//! Drawing lives outside this workspace. Per render the session hands a
//! [`Renderer`] one [`SceneFrame`] (or a [`LoadStatus`] while no dataset is
//! available); the renderer never reads session state directly.

use std::io;
use std::sync::Arc;

use exo_core::earth::RefRange;
use exo_core::{AxisField, ComparisonRow, Extent, FilterState, PlanetRecord, YearCount};

use crate::scene::{Scene, SceneState};

/// Receives frames and status updates.
pub trait Renderer {
    fn render(&mut self, frame: &SceneFrame) -> io::Result<()>;

    fn status(&mut self, status: &LoadStatus) -> io::Result<()>;

    /// One sanitized log line from [`Cmd::Log`](crate::program::Cmd::Log).
    fn log(&mut self, line: &str) -> io::Result<()> {
        tracing::info!(target: "exo.log", "{line}");
        Ok(())
    }
}

/// Everything a renderer needs for one scene render.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SceneFrame {
    pub scene: Scene,
    /// The active subset for this scene.
    pub records: Vec<Arc<PlanetRecord>>,
    /// Discovery counts over the full dataset; overview only.
    pub aggregates: Option<Vec<YearCount>>,
    pub state: SceneState,
    /// Play the entry animation for this render.
    pub animate: bool,
    pub detail: SceneDetail,
}

/// Scene-specific render inputs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum SceneDetail {
    Overview(OverviewDetail),
    Comparison(ComparisonDetail),
    Dashboard(DashboardDetail),
}

/// Scatter domains and legend data for the overview.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct OverviewDetail {
    pub temperature: Extent,
    pub eccentricity: Extent,
    pub stellar_mass: Extent,
    pub stellar_radius: Extent,
    /// Every known discovery year, ascending.
    pub years: Vec<i32>,
    /// Tallest histogram bar.
    pub peak: Option<usize>,
    /// Active records in the temperate band on a near-circular orbit.
    pub habitable: usize,
    /// Active records whose host star is Sun-like.
    pub sun_like_hosts: usize,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ComparisonDetail {
    pub rows: Vec<ComparisonRow>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct DashboardDetail {
    pub filter: FilterState,
    pub x: AxisField,
    pub y: AxisField,
    pub x_domain: Extent,
    pub y_domain: Extent,
    /// Earth reference ranges on the chosen axes, when the overlay is on.
    pub earth_overlay: Option<EarthOverlay>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EarthOverlay {
    pub x: RefRange,
    pub y: RefRange,
}

/// Shown instead of a scene while no dataset is available.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum LoadStatus {
    Loading { source: String },
    Failed { reason: String },
}

/// Keeps every frame, status and log line in memory.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    frames: Vec<SceneFrame>,
    statuses: Vec<LoadStatus>,
    logs: Vec<String>,
}

impl RecordingRenderer {
    pub fn frames(&self) -> &[SceneFrame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&SceneFrame> {
        self.frames.last()
    }

    pub fn statuses(&self) -> &[LoadStatus] {
        &self.statuses
    }

    pub fn logs(&self) -> &[String] {
        &self.logs
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.statuses.clear();
        self.logs.clear();
    }
}

impl Renderer for RecordingRenderer {
    fn render(&mut self, frame: &SceneFrame) -> io::Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }

    fn status(&mut self, status: &LoadStatus) -> io::Result<()> {
        self.statuses.push(status.clone());
        Ok(())
    }

    fn log(&mut self, line: &str) -> io::Result<()> {
        self.logs.push(line.to_owned());
        Ok(())
    }
}
