#![forbid(unsafe_code)]

//! The narrative session: one model owning dataset, controller and caches.
//!
//! # Lifecycle
//!
//! 1. `init()` spawns the one-shot load task for the [`DataSource`].
//! 2. Until [`NarrativeMsg::DatasetLoaded`] arrives, every interaction is a
//!    logged no-op and the renderer receives [`LoadStatus::Loading`].
//! 3. A load failure parks the session in [`LoadState::Failed`]; the
//!    renderer receives [`LoadStatus::Failed`] and interaction stays inert.
//! 4. Once loaded, each interaction is forwarded to the
//!    [`SceneController`] and the active subset is recomputed before the
//!    next render.
//!
//! The discovery histogram is computed once at load over the full dataset;
//! a year focus narrows the scatter plots but never the histogram.

use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use exo_core::aggregate::peak;
use exo_core::earth::{axis_reference, has_sun_like_host, is_potentially_habitable};
use exo_core::filter::apply;
use exo_core::{
    CoreError, Dataset, FilterConfig, Loaded, NumericField, PlanetRecord, Result, YearCount,
    comparison_rows, count_by_year, load_path, load_str,
};

use crate::config::SessionConfig;
use crate::msg::NarrativeMsg;
use crate::program::{Cmd, Model, panic_message};
use crate::renderer::{
    ComparisonDetail, DashboardDetail, EarthOverlay, LoadStatus, OverviewDetail, Renderer,
    SceneDetail, SceneFrame,
};
use crate::scene::{Scene, SceneController, SceneState, Transition};

/// Where the dataset comes from.
#[derive(Debug, Clone)]
pub enum DataSource {
    /// A CSV table on disk.
    Path(PathBuf),
    /// CSV text already in memory.
    Inline(String),
    /// Records built in code.
    Records(Vec<PlanetRecord>),
}

impl DataSource {
    /// Short description for status lines.
    pub fn describe(&self) -> String {
        match self {
            DataSource::Path(path) => path.display().to_string(),
            DataSource::Inline(_) => "inline table".to_owned(),
            DataSource::Records(records) => format!("{} in-memory records", records.len()),
        }
    }

    /// Read and normalize the source. Blocking.
    pub fn load(self) -> Result<Loaded> {
        match self {
            DataSource::Path(path) => load_path(path),
            DataSource::Inline(text) => load_str(&text),
            DataSource::Records(records) => {
                let rows = records.len();
                Ok(Loaded {
                    dataset: Dataset::load(records),
                    rows,
                    degraded_cells: 0,
                    missing_columns: Vec::new(),
                })
            }
        }
    }
}

/// Progress of the one-shot load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Pending,
    Ready,
    Failed(String),
}

/// The narrative model.
#[derive(Debug)]
pub struct NarrativeSession {
    source: Option<DataSource>,
    source_label: String,
    load: LoadState,
    dataset: Dataset,
    controller: SceneController,
    active: Vec<Arc<PlanetRecord>>,
    histogram: Vec<YearCount>,
}

impl NarrativeSession {
    pub fn new(source: DataSource) -> Self {
        Self::with_controller(source, SceneController::default())
    }

    /// # Errors
    ///
    /// [`CoreError::InvalidArgument`] when the slider layout is invalid.
    pub fn with_filter_config(source: DataSource, config: FilterConfig) -> Result<Self> {
        Ok(Self::with_controller(source, SceneController::new(config)?))
    }

    fn with_controller(source: DataSource, controller: SceneController) -> Self {
        Self {
            source_label: source.describe(),
            source: Some(source),
            load: LoadState::Pending,
            dataset: Dataset::default(),
            controller,
            active: Vec::new(),
            histogram: Vec::new(),
        }
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::new(DataSource::Path(path.into()))
    }

    /// Build a session from configuration.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidArgument`] when no data path is configured or the
    /// slider layout is invalid.
    pub fn from_config(config: &SessionConfig) -> Result<Self> {
        config.validate()?;
        let path = config
            .data
            .clone()
            .ok_or_else(|| CoreError::InvalidArgument("no data source configured".into()))?;
        Self::with_filter_config(DataSource::Path(path), config.filter)
    }

    pub fn load_state(&self) -> &LoadState {
        &self.load
    }

    pub fn is_ready(&self) -> bool {
        self.load == LoadState::Ready
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn controller(&self) -> &SceneController {
        &self.controller
    }

    pub fn scene(&self) -> Scene {
        self.controller.scene()
    }

    pub fn state(&self) -> SceneState {
        self.controller.state()
    }

    /// Records shown by the current scene.
    pub fn active(&self) -> &[Arc<PlanetRecord>] {
        &self.active
    }

    /// Discovery counts over the full dataset.
    pub fn histogram(&self) -> &[YearCount] {
        &self.histogram
    }

    /// Apply one interaction message.
    ///
    /// Load results and `Quit` are not interactions and report
    /// [`Transition::Ignored`], as does everything before the dataset is
    /// ready.
    ///
    /// # Errors
    ///
    /// [`CoreError::InvalidArgument`] for a `None` or foreign record and for
    /// non-finite filter values. The session is unchanged on error.
    pub fn interact(&mut self, msg: NarrativeMsg) -> Result<Transition> {
        if !self.is_ready() {
            return Ok(Transition::Ignored);
        }
        let transition = match msg {
            NarrativeMsg::RecordSelected(record) => {
                if let Some(r) = &record
                    && !self.dataset.contains(r)
                {
                    return Err(CoreError::InvalidArgument(format!(
                        "{:?} is not part of the loaded dataset",
                        r.name()
                    )));
                }
                self.controller.select_record(record)?
            }
            NarrativeMsg::YearSelected(year) => self.controller.select_year(year),
            NarrativeMsg::BackgroundClicked { on_data_mark } => {
                self.controller.background_click(on_data_mark)
            }
            NarrativeMsg::ExploreRequested => self.controller.explore(),
            NarrativeMsg::BackRequested => self.controller.back(),
            NarrativeMsg::FilterParamChanged(param) => self.controller.set_filter(param)?,
            NarrativeMsg::ResetRequested => self.controller.reset(),
            NarrativeMsg::DatasetLoaded(_) | NarrativeMsg::LoadFailed(_) | NarrativeMsg::Quit => {
                Transition::Ignored
            }
        };
        if transition.changed() {
            self.recompute();
        }
        Ok(transition)
    }

    fn on_loaded(&mut self, loaded: Loaded) -> Cmd<NarrativeMsg> {
        if self.load != LoadState::Pending {
            tracing::debug!(state = ?self.load, "duplicate dataset load ignored");
            return Cmd::none();
        }
        let Loaded {
            dataset,
            rows,
            degraded_cells,
            missing_columns,
        } = loaded;

        if !missing_columns.is_empty() {
            let names: Vec<&str> = missing_columns.iter().map(|c| c.header()).collect();
            tracing::warn!(missing = ?names, "source table lacks schema columns");
        }
        self.histogram = count_by_year(dataset.records());
        self.dataset = dataset;
        self.load = LoadState::Ready;
        self.recompute();

        tracing::info!(
            source = %self.source_label,
            rows,
            records = self.dataset.len(),
            degraded_cells,
            years = self.histogram.len(),
            "dataset loaded"
        );
        Cmd::log(format!(
            "loaded {} planets from {}",
            self.dataset.len(),
            self.source_label
        ))
    }

    fn on_load_failed(&mut self, err: CoreError) -> Cmd<NarrativeMsg> {
        tracing::warn!(source = %self.source_label, error = %err, "dataset load failed");
        self.load = LoadState::Failed(err.to_string());
        Cmd::log(format!("failed to load {}: {err}", self.source_label))
    }

    fn recompute(&mut self) {
        self.active = match self.controller.scene() {
            Scene::Overview => match self.controller.focused_year() {
                Some(year) => self.dataset.records_in_year(year),
                None => self.dataset.to_vec(),
            },
            Scene::Comparison => self.controller.focused_record().cloned().into_iter().collect(),
            Scene::Dashboard => match self.controller.filter() {
                Some(filter) => apply(&self.dataset, filter),
                None => self.dataset.to_vec(),
            },
        };
        tracing::trace!(active = self.active.len(), "active subset recomputed");
    }

    fn build_frame(&self) -> SceneFrame {
        let scene = self.controller.scene();
        let animate = self.controller.begin_render();
        let (aggregates, detail) = match scene {
            Scene::Overview => (
                Some(self.histogram.clone()),
                SceneDetail::Overview(self.overview_detail()),
            ),
            Scene::Comparison => (
                None,
                SceneDetail::Comparison(ComparisonDetail {
                    rows: self
                        .controller
                        .focused_record()
                        .map(|r| comparison_rows(r))
                        .unwrap_or_default(),
                }),
            ),
            Scene::Dashboard => (None, SceneDetail::Dashboard(self.dashboard_detail())),
        };
        SceneFrame {
            scene,
            records: self.active.clone(),
            aggregates,
            state: self.controller.state(),
            animate,
            detail,
        }
    }

    fn overview_detail(&self) -> OverviewDetail {
        OverviewDetail {
            temperature: self.dataset.extent_or_unit(NumericField::EquilibriumTemp),
            eccentricity: self.dataset.extent_or_unit(NumericField::OrbitalEccentricity),
            stellar_mass: self.dataset.extent_or_unit(NumericField::StellarMass),
            stellar_radius: self.dataset.extent_or_unit(NumericField::StellarRadius),
            years: self.dataset.distinct_years(),
            peak: peak(&self.histogram),
            habitable: self
                .active
                .iter()
                .filter(|r| is_potentially_habitable(r))
                .count(),
            sun_like_hosts: self.active.iter().filter(|r| has_sun_like_host(r)).count(),
        }
    }

    fn dashboard_detail(&self) -> DashboardDetail {
        let filter = self
            .controller
            .filter()
            .cloned()
            .unwrap_or_else(|| self.controller.filter_config().defaults());
        let (x, y) = (filter.x_field(), filter.y_field());
        let earth_overlay = filter.show_earth_overlay().then(|| EarthOverlay {
            x: axis_reference(x),
            y: axis_reference(y),
        });
        DashboardDetail {
            x,
            y,
            x_domain: x.domain(),
            y_domain: y.domain(),
            earth_overlay,
            filter,
        }
    }
}

impl Model for NarrativeSession {
    type Message = NarrativeMsg;

    fn init(&mut self) -> Cmd<NarrativeMsg> {
        let Some(source) = self.source.take() else {
            return Cmd::none();
        };
        tracing::debug!(source = %self.source_label, "starting dataset load");
        Cmd::task_named("load-dataset", move || settle_load(move || source.load()))
    }

    fn update(&mut self, msg: NarrativeMsg) -> Cmd<NarrativeMsg> {
        match msg {
            NarrativeMsg::DatasetLoaded(loaded) => self.on_loaded(loaded),
            NarrativeMsg::LoadFailed(err) => self.on_load_failed(err),
            NarrativeMsg::Quit => Cmd::quit(),
            other => {
                let name = other.name();
                match self.interact(other) {
                    Ok(Transition::Ignored) => tracing::debug!(
                        msg = name,
                        scene = %self.scene(),
                        load = ?self.load,
                        "message ignored"
                    ),
                    Ok(transition) => {
                        tracing::debug!(msg = name, ?transition, active = self.active.len(), "message applied")
                    }
                    Err(err) => tracing::warn!(msg = name, error = %err, "message rejected"),
                }
                Cmd::none()
            }
        }
    }

    fn view(&self, renderer: &mut dyn Renderer) -> io::Result<()> {
        match &self.load {
            LoadState::Pending => renderer.status(&LoadStatus::Loading {
                source: self.source_label.clone(),
            }),
            LoadState::Failed(reason) => renderer.status(&LoadStatus::Failed {
                reason: reason.clone(),
            }),
            LoadState::Ready => renderer.render(&self.build_frame()),
        }
    }
}

/// Run a load and turn every outcome into a message, including a panic,
/// so the session never stays pending.
fn settle_load(load: impl FnOnce() -> Result<Loaded>) -> NarrativeMsg {
    match panic::catch_unwind(AssertUnwindSafe(load)) {
        Ok(Ok(loaded)) => NarrativeMsg::DatasetLoaded(loaded),
        Ok(Err(err)) => NarrativeMsg::LoadFailed(err),
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::error!(%reason, "dataset load panicked");
            NarrativeMsg::LoadFailed(CoreError::Io(io::Error::other(format!(
                "load panicked: {reason}"
            ))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exo_core::{FilterParam, Threshold};

    fn catalog() -> Vec<PlanetRecord> {
        vec![
            PlanetRecord::new("TOI-700 d")
                .with(NumericField::DiscoveryYear, 2020.0)
                .with(NumericField::EquilibriumTemp, 269.0)
                .with(NumericField::OrbitalEccentricity, 0.032)
                .with(NumericField::StellarMass, 0.42)
                .with(NumericField::StellarRadius, 0.42),
            PlanetRecord::new("Kepler-452 b")
                .with(NumericField::DiscoveryYear, 2015.0)
                .with(NumericField::EquilibriumTemp, 300.0)
                .with(NumericField::OrbitalEccentricity, 0.05)
                .with(NumericField::StellarMass, 1.04)
                .with(NumericField::StellarRadius, 1.11),
            PlanetRecord::new("WASP-12 b")
                .with(NumericField::DiscoveryYear, 2015.0)
                .with(NumericField::EquilibriumTemp, 2580.0),
            PlanetRecord::new("unknown"),
        ]
    }

    fn loaded_session() -> NarrativeSession {
        let mut session = NarrativeSession::new(DataSource::Records(catalog()));
        let source = session.source.take().unwrap();
        let cmd = session.update(NarrativeMsg::DatasetLoaded(source.load().unwrap()));
        assert!(matches!(cmd, Cmd::Log(_)));
        session
    }

    #[test]
    fn interactions_before_load_are_noops() {
        let mut session = NarrativeSession::new(DataSource::Records(catalog()));
        assert_eq!(
            session.interact(NarrativeMsg::ExploreRequested).unwrap(),
            Transition::Ignored
        );
        assert_eq!(session.scene(), Scene::Overview);
        assert!(session.active().is_empty());
    }

    #[test]
    fn load_populates_subset_and_histogram() {
        let session = loaded_session();
        assert!(session.is_ready());
        assert_eq!(session.active().len(), 4);
        assert_eq!(
            session.histogram(),
            [
                YearCount { year: 2015, count: 2 },
                YearCount { year: 2020, count: 1 }
            ]
        );
    }

    #[test]
    fn year_focus_narrows_subset_not_histogram() {
        let mut session = loaded_session();
        session.interact(NarrativeMsg::YearSelected(2015)).unwrap();
        let names: Vec<_> = session.active().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["Kepler-452 b", "WASP-12 b"]);
        assert_eq!(session.histogram().len(), 2);
    }

    #[test]
    fn foreign_record_is_rejected() {
        let mut session = loaded_session();
        let stranger = Arc::new(PlanetRecord::new("TOI-700 d"));
        let err = session
            .interact(NarrativeMsg::RecordSelected(Some(stranger)))
            .unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(session.scene(), Scene::Overview);
    }

    #[test]
    fn comparison_subset_is_the_selected_record() {
        let mut session = loaded_session();
        let pick = Arc::clone(&session.dataset().records()[0]);
        session
            .interact(NarrativeMsg::RecordSelected(Some(Arc::clone(&pick))))
            .unwrap();
        assert_eq!(session.active().len(), 1);
        assert!(Arc::ptr_eq(&session.active()[0], &pick));
    }

    #[test]
    fn dashboard_filter_drives_subset() {
        let mut session = loaded_session();
        session.interact(NarrativeMsg::ExploreRequested).unwrap();
        assert_eq!(session.active().len(), 4);
        session
            .interact(FilterParam::Threshold(Threshold::MaxEccentricity, 0.04).into())
            .unwrap();
        let names: Vec<_> = session.active().iter().map(|r| r.name()).collect();
        assert_eq!(names, vec!["TOI-700 d"]);

        session.interact(NarrativeMsg::ResetRequested).unwrap();
        assert_eq!(session.active().len(), 4);
    }

    #[test]
    fn overview_frame_carries_domains_and_highlights() {
        let session = loaded_session();
        let frame = session.build_frame();
        assert!(frame.animate);
        assert!(frame.state.has_animated_once);
        let SceneDetail::Overview(detail) = &frame.detail else {
            panic!("expected overview detail");
        };
        assert_eq!(detail.temperature.min, 269.0);
        assert_eq!(detail.temperature.max, 2580.0);
        assert_eq!(detail.years, vec![2015, 2020]);
        assert_eq!(detail.peak, Some(2));
        assert_eq!(detail.habitable, 1);
        assert_eq!(detail.sun_like_hosts, 1);
        assert!(frame.aggregates.is_some());
        assert!(!session.build_frame().animate);
    }

    #[test]
    fn dashboard_frame_reports_overlay() {
        let mut session = loaded_session();
        session.interact(NarrativeMsg::ExploreRequested).unwrap();
        session
            .interact(FilterParam::ShowEarthOverlay(true).into())
            .unwrap();
        let frame = session.build_frame();
        assert!(frame.aggregates.is_none());
        let SceneDetail::Dashboard(detail) = &frame.detail else {
            panic!("expected dashboard detail");
        };
        let overlay = detail.earth_overlay.expect("overlay enabled");
        assert_eq!(overlay.x, axis_reference(detail.x));
        assert_eq!(detail.x_domain, detail.x.domain());
    }

    #[test]
    fn failed_load_is_terminal_for_interaction() {
        let mut session = NarrativeSession::from_path("/nonexistent/catalog.csv");
        session.update(NarrativeMsg::LoadFailed(CoreError::InvalidArgument("boom".into())));
        assert!(matches!(session.load_state(), LoadState::Failed(reason) if reason.contains("boom")));
        assert_eq!(
            session.interact(NarrativeMsg::ExploreRequested).unwrap(),
            Transition::Ignored
        );
    }

    #[test]
    fn panicking_load_becomes_a_failure() {
        let msg = settle_load(|| panic!("catalog reader exploded"));
        let NarrativeMsg::LoadFailed(err) = msg else {
            panic!("expected load failure, got {}", msg.name());
        };
        assert!(err.to_string().contains("catalog reader exploded"));

        let mut session = NarrativeSession::new(DataSource::Records(catalog()));
        session.source = None;
        session.update(NarrativeMsg::LoadFailed(err));
        assert!(matches!(session.load_state(), LoadState::Failed(reason) if reason.contains("panicked")));
    }

    #[test]
    fn settled_load_passes_results_through() {
        let msg = settle_load(|| DataSource::Records(catalog()).load());
        assert!(matches!(msg, NarrativeMsg::DatasetLoaded(ref loaded) if loaded.rows == 4));
        let msg = settle_load(|| DataSource::Path("/nonexistent/catalog.csv".into()).load());
        assert!(matches!(msg, NarrativeMsg::LoadFailed(CoreError::Io(_))));
    }

    #[test]
    fn invalid_slider_layout_is_rejected() {
        let inverted = FilterConfig::default()
            .with_slider(Threshold::MaxStellarMass, exo_core::SliderSpec::new(5.0, 1.0, 0.1));
        let err = NarrativeSession::with_filter_config(DataSource::Records(catalog()), inverted)
            .err()
            .unwrap();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn from_config_requires_a_data_path() {
        assert!(
            NarrativeSession::from_config(&SessionConfig::default())
                .unwrap_err()
                .is_invalid_argument()
        );
        let session =
            NarrativeSession::from_config(&SessionConfig::default().with_data("a.csv")).unwrap();
        assert_eq!(session.load_state(), &LoadState::Pending);
    }
}
