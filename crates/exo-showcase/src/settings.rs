#![forbid(unsafe_code)]

//! Showcase errors and TOML session configuration.
//!
//! ```toml
//! data = "data/catalog.csv"
//!
//! [filter]
//! default_x = "planet_radius"
//! default_y = "stellar_radius"
//!
//! [filter.equilibrium_temp]
//! min = 0.0
//! max = 3000.0
//! step = 25.0
//! ```

use std::fs;
use std::io;
use std::path::Path;

use exo_core::CoreError;
use exo_runtime::SessionConfig;
use thiserror::Error;

use crate::script::ScriptError;

pub type Result<T> = std::result::Result<T, ShowcaseError>;

#[derive(Error, Debug)]
pub enum ShowcaseError {
    /// Configuration loading or validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The catalog load finished with an error.
    #[error("Catalog failed to load: {0}")]
    LoadFailed(String),

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Parse a session config from TOML text and validate it.
pub fn parse_config(text: &str) -> Result<SessionConfig> {
    let config: SessionConfig = toml::from_str(text)
        .map_err(|e| ShowcaseError::Config(format!("Parse TOML failed: {e}")))?;
    config
        .validate()
        .map_err(|e| ShowcaseError::Config(e.to_string()))?;
    Ok(config)
}

/// Build the effective session config.
///
/// Starts from the config file when one is given, then applies the
/// command-line data path on top.
pub fn resolve_config(config: Option<&Path>, data: Option<&Path>) -> Result<SessionConfig> {
    let mut session = match config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|e| {
                ShowcaseError::Config(format!("Read {} failed: {e}", path.display()))
            })?;
            parse_config(&text)?
        }
        None => SessionConfig::default(),
    };
    if let Some(path) = data {
        session = session.with_data(path);
    }
    if session.data.is_none() {
        return Err(ShowcaseError::Config(
            "no catalog given (use --data or set `data` in the config file)".into(),
        ));
    }
    Ok(session)
}
