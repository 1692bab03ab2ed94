#![forbid(unsafe_code)]

//! Messages understood by [`NarrativeSession`](crate::session::NarrativeSession).

use std::sync::Arc;

use exo_core::{CoreError, FilterParam, Loaded, PlanetRecord};

/// Interaction events from the renderer plus the load task's result.
#[derive(Debug)]
pub enum NarrativeMsg {
    /// The background load finished.
    DatasetLoaded(Loaded),
    /// The background load failed.
    LoadFailed(CoreError),
    /// A data mark was clicked. `None` models a click the renderer could
    /// not resolve to a record.
    RecordSelected(Option<Arc<PlanetRecord>>),
    /// A histogram bar or year control was chosen.
    YearSelected(i32),
    BackgroundClicked {
        on_data_mark: bool,
    },
    ExploreRequested,
    BackRequested,
    FilterParamChanged(FilterParam),
    ResetRequested,
    Quit,
}

impl NarrativeMsg {
    /// Stable name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            NarrativeMsg::DatasetLoaded(_) => "dataset_loaded",
            NarrativeMsg::LoadFailed(_) => "load_failed",
            NarrativeMsg::RecordSelected(_) => "record_selected",
            NarrativeMsg::YearSelected(_) => "year_selected",
            NarrativeMsg::BackgroundClicked { .. } => "background_clicked",
            NarrativeMsg::ExploreRequested => "explore_requested",
            NarrativeMsg::BackRequested => "back_requested",
            NarrativeMsg::FilterParamChanged(_) => "filter_param_changed",
            NarrativeMsg::ResetRequested => "reset_requested",
            NarrativeMsg::Quit => "quit",
        }
    }

    /// Whether the message comes from user interaction.
    pub fn is_interaction(&self) -> bool {
        !matches!(
            self,
            NarrativeMsg::DatasetLoaded(_) | NarrativeMsg::LoadFailed(_) | NarrativeMsg::Quit
        )
    }
}

impl From<FilterParam> for NarrativeMsg {
    fn from(param: FilterParam) -> Self {
        NarrativeMsg::FilterParamChanged(param)
    }
}
