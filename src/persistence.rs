use std::{
    fs::File,
    io::{Read, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::{
    chain::{Chain, ChainBuilder, DispatchError, Handler},
    work_state::{Activity, WorkState},
};

/// Errors raised while saving or loading files
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// The file could not be opened, read or written
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The contents were not valid JSON for the expected shape
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The loaded chain layout was rejected
    #[error("invalid chain layout: {0}")]
    Chain(#[from] DispatchError),
}

impl PersistenceError {
    /// Wrap an I/O error together with the path it concerns
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io { path: path.to_path_buf(), source }
    }
}

/// Serializable summary of a finished workday run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DayReport {
    /// Hour the day was evaluated at
    pub hour: i32,
    /// Whether the work was finished
    pub finished: bool,
    /// What the day settled on
    pub activity: Activity,
    /// Every state visited, starting with the initial one
    pub path: Vec<WorkState>,
}

impl DayReport {
    /// Number of transitions taken to reach the activity
    #[must_use]
    pub fn transitions(&self) -> usize {
        self.path.len().saturating_sub(1)
    }

    /// Save the report as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns a `PersistenceError` if the report cannot be serialized
    /// or the file cannot be created or written.
    pub fn save_to_file(&self, path: &Path) -> Result<(), PersistenceError> {
        let serialized = serde_json::to_string_pretty(self)?;
        info!(path = %path.display(), "saving day report");

        let mut file = File::create(path).map_err(|e| PersistenceError::io(path, e))?;
        file.write_all(serialized.as_bytes()).map_err(|e| PersistenceError::io(path, e))?;
        Ok(())
    }

    /// Load a report previously written by `save_to_file`
    ///
    /// # Errors
    ///
    /// Returns a `PersistenceError` if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, PersistenceError> {
        info!(path = %path.display(), "loading day report");
        let contents = read_file(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

/// One handler entry in a chain layout file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HandlerConfig {
    /// Handler identity
    pub name: String,
    /// Inclusive lower bound
    pub low: i64,
    /// Exclusive upper bound
    pub high: i64,
}

impl From<&Handler> for HandlerConfig {
    fn from(handler: &Handler) -> Self {
        Self { name: handler.name.clone(), low: handler.range.start, high: handler.range.end }
    }
}

/// Chain layout as stored on disk, handlers in link order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainConfig {
    /// Handlers, first link first
    pub handlers: Vec<HandlerConfig>,
}

impl ChainConfig {
    /// Capture the layout of an existing chain
    #[must_use]
    pub fn from_chain(chain: &Chain) -> Self {
        Self { handlers: chain.handlers().iter().map(HandlerConfig::from).collect() }
    }

    /// Parse a layout from JSON text
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Json` if the text is not a valid layout.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a layout from a JSON file
    ///
    /// # Errors
    ///
    /// Returns a `PersistenceError` if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> Result<Self, PersistenceError> {
        info!(path = %path.display(), "loading chain layout");
        Self::from_json(&read_file(path)?)
    }

    /// Save the layout as pretty JSON
    ///
    /// # Errors
    ///
    /// Returns a `PersistenceError` if the file cannot be created or written.
    pub fn save_to_file(&self, path: &Path) -> Result<(), PersistenceError> {
        let serialized = serde_json::to_string_pretty(self)?;
        info!(path = %path.display(), "saving chain layout");

        let mut file = File::create(path).map_err(|e| PersistenceError::io(path, e))?;
        file.write_all(serialized.as_bytes()).map_err(|e| PersistenceError::io(path, e))?;
        Ok(())
    }

    /// Link the handlers in file order
    ///
    /// # Errors
    ///
    /// Returns `PersistenceError::Chain` if the layout is empty, has an
    /// empty range or repeats a handler name.
    pub fn build(&self) -> Result<Chain, PersistenceError> {
        let chain = self
            .handlers
            .iter()
            .fold(ChainBuilder::new(), |builder, h| builder.handler(&h.name, h.low, h.high))
            .build()?;
        Ok(chain)
    }
}

/// Read a whole file into a string
fn read_file(path: &Path) -> Result<String, PersistenceError> {
    let mut file = File::open(path).map_err(|e| PersistenceError::io(path, e))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents).map_err(|e| PersistenceError::io(path, e))?;
    Ok(contents)
}
