#![forbid(unsafe_code)]

//! The three-scene state machine.
//!
//! ```text
//!            select_year / background_click
//!                  ┌──────┐
//!                  ▼      │
//!   load ──▶  Overview (S1) ──select_record──▶ Comparison (S2)
//!              ▲   │   ▲                           │   │
//!              │ explore └──────────back───────────┘   │
//!              │   ▼                                   │
//!             back  Dashboard (S3) ◀──────explore──────┘
//!                   │   ▲
//!                   └───┘ reset / filter changes
//! ```
//!
//! A dashboard `select_record` also opens the comparison scene. Events
//! not listed for the current scene are ignored.

use std::cell::Cell;
use std::fmt;
use std::sync::Arc;

use exo_core::{CoreError, FilterConfig, FilterParam, FilterState, PlanetRecord, Result};

/// Top-level display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Scene {
    /// S1: discovery histogram and overview scatter plots.
    #[default]
    Overview,
    /// S2: one planet against the Earth reference ranges.
    Comparison,
    /// S3: filterable scatter with selectable axes.
    Dashboard,
}

impl Scene {
    pub const ALL: [Scene; 3] = [Scene::Overview, Scene::Comparison, Scene::Dashboard];

    pub const fn title(self) -> &'static str {
        match self {
            Scene::Overview => "Exoplanet Discovery Overview",
            Scene::Comparison => "Comparison with Earth",
            Scene::Dashboard => "Explore the Exoplanets",
        }
    }
}

impl fmt::Display for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = match self {
            Scene::Overview => "S1",
            Scene::Comparison => "S2",
            Scene::Dashboard => "S3",
        };
        f.write_str(short)
    }
}

/// Read-only snapshot of the controller.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SceneState {
    pub scene: Scene,
    pub focused_year: Option<i32>,
    pub focused_record: Option<Arc<PlanetRecord>>,
    pub has_animated_once: bool,
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The scene changed to the given one.
    Entered(Scene),
    /// Same scene, state changed.
    Stayed,
    /// The event is not defined for the current scene.
    Ignored,
}

impl Transition {
    pub fn changed(self) -> bool {
        !matches!(self, Transition::Ignored)
    }
}

/// Owns the scene, the focus, the dashboard filter and the animation flag.
///
/// The filter state exists only while the dashboard is shown.
#[derive(Debug)]
pub struct SceneController {
    scene: Scene,
    focused_year: Option<i32>,
    focused_record: Option<Arc<PlanetRecord>>,
    filter: Option<FilterState>,
    config: FilterConfig,
    // Flipped from `&self` during rendering.
    animated: Cell<bool>,
}

impl Default for SceneController {
    fn default() -> Self {
        Self::with_config(FilterConfig::default())
    }
}

impl SceneController {
    /// A controller on the overview whose dashboard uses `config`.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidArgument`] when any slider range is empty,
    /// inverted or non-finite.
    pub fn new(config: FilterConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_config(config))
    }

    fn with_config(config: FilterConfig) -> Self {
        Self {
            scene: Scene::Overview,
            focused_year: None,
            focused_record: None,
            filter: None,
            config,
            animated: Cell::new(false),
        }
    }

    pub fn scene(&self) -> Scene {
        self.scene
    }

    pub fn focused_year(&self) -> Option<i32> {
        self.focused_year
    }

    pub fn focused_record(&self) -> Option<&Arc<PlanetRecord>> {
        self.focused_record.as_ref()
    }

    /// The dashboard filter; `None` outside the dashboard.
    pub fn filter(&self) -> Option<&FilterState> {
        self.filter.as_ref()
    }

    pub fn filter_config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn has_animated_once(&self) -> bool {
        self.animated.get()
    }

    pub fn state(&self) -> SceneState {
        SceneState {
            scene: self.scene,
            focused_year: self.focused_year,
            focused_record: self.focused_record.clone(),
            has_animated_once: self.animated.get(),
        }
    }

    /// Narrow the overview to one discovery year.
    pub fn select_year(&mut self, year: i32) -> Transition {
        if self.scene != Scene::Overview {
            return Transition::Ignored;
        }
        self.focused_year = Some(year);
        Transition::Stayed
    }

    /// Open the comparison scene for `record`.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidArgument`] when `record` is `None`; the state is
    /// left untouched.
    pub fn select_record(&mut self, record: Option<Arc<PlanetRecord>>) -> Result<Transition> {
        let Some(record) = record else {
            return Err(CoreError::InvalidArgument(
                "select_record requires a record".into(),
            ));
        };
        match self.scene {
            Scene::Overview => {}
            Scene::Dashboard => self.filter = None,
            Scene::Comparison => return Ok(Transition::Ignored),
        }
        self.focused_record = Some(record);
        Ok(self.enter(Scene::Comparison))
    }

    /// A click that may clear the year focus.
    pub fn background_click(&mut self, on_data_mark: bool) -> Transition {
        if self.scene != Scene::Overview || on_data_mark {
            return Transition::Ignored;
        }
        self.focused_year = None;
        Transition::Stayed
    }

    /// Return to the overview.
    pub fn back(&mut self) -> Transition {
        match self.scene {
            Scene::Overview => return Transition::Ignored,
            Scene::Comparison => self.focused_record = None,
            Scene::Dashboard => self.filter = None,
        }
        self.enter(Scene::Overview)
    }

    /// Open the dashboard with a fresh default filter.
    pub fn explore(&mut self) -> Transition {
        if self.scene == Scene::Dashboard {
            return Transition::Ignored;
        }
        self.filter = Some(self.config.defaults());
        self.focused_year = None;
        self.focused_record = None;
        self.enter(Scene::Dashboard)
    }

    /// Replace the dashboard filter with defaults.
    pub fn reset(&mut self) -> Transition {
        if self.scene != Scene::Dashboard {
            return Transition::Ignored;
        }
        self.filter = Some(self.config.defaults());
        Transition::Stayed
    }

    /// Apply one dashboard parameter change.
    pub fn set_filter(&mut self, param: FilterParam) -> Result<Transition> {
        match self.filter.as_mut() {
            Some(filter) if self.scene == Scene::Dashboard => {
                filter.set(param)?;
                Ok(Transition::Stayed)
            }
            _ => Ok(Transition::Ignored),
        }
    }

    /// Called once per render of the current scene.
    ///
    /// Returns `true` exactly once per controller: for the first overview
    /// render.
    pub fn begin_render(&self) -> bool {
        if self.scene != Scene::Overview || self.animated.get() {
            return false;
        }
        self.animated.set(true);
        true
    }

    fn enter(&mut self, scene: Scene) -> Transition {
        tracing::debug!(from = %self.scene, to = %scene, "scene transition");
        self.scene = scene;
        Transition::Entered(scene)
    }
}
