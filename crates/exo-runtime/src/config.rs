#![forbid(unsafe_code)]

//! Session configuration.

use std::path::{Path, PathBuf};

use exo_core::{FilterConfig, Result};

/// Where the data comes from and how the dashboard sliders are laid out.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SessionConfig {
    /// Source table path.
    pub data: Option<PathBuf>,
    pub filter: FilterConfig,
}

impl SessionConfig {
    #[must_use]
    pub fn with_data(mut self, path: impl AsRef<Path>) -> Self {
        self.data = Some(path.as_ref().to_path_buf());
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    /// Check the slider layout.
    pub fn validate(&self) -> Result<()> {
        self.filter.validate()
    }
}
