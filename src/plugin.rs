//! The runtime plugin handle and its lifecycle state machine (spec §3/§4.2).

use std::path::PathBuf;

use crate::PluginInfo;

/// Lifecycle state of a [`Plugin`] (spec §4.2). Transitions are driven
/// exclusively by [`Manager::refresh`](crate::Manager::refresh),
/// [`Manager::load_plugin`](crate::Manager::load_plugin), and
/// [`Manager::unload_plugin`](crate::Manager::unload_plugin) — nothing else
/// is authorized to mutate a Plugin's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginState {
    /// Initial state before any successful query.
    Unknown,
    /// Info extracted, not loaded.
    Queried,
    /// Discovery found the file again but a backend set changed since the
    /// last query; the file must be re-queried before further use.
    Requery,
    Loaded,
    LoadFailed,
    UnloadFailed,
}

/// Runtime handle for a single discovered plugin: identity, owning loader,
/// descriptor, and lifecycle state (spec §3). A `Plugin`'s `filename` and
/// `loader` never change after construction; only `state` and `error` are
/// mutated, and only by the manager's load/unload driver.
#[derive(Debug, Clone)]
pub struct Plugin {
    /// Absolute path the owning loader queried.
    pub(crate) filename: PathBuf,
    /// `id()` of the owning [`LoaderBackend`](crate::LoaderBackend).
    pub(crate) loader: String,
    pub(crate) info: PluginInfo,
    pub(crate) state: PluginState,
    /// Human-readable description of the last load/unload failure, if any.
    pub(crate) error: Option<String>,
}

impl Plugin {
    pub(crate) fn new(filename: PathBuf, loader: String, info: PluginInfo) -> Self {
        Self {
            filename,
            loader,
            info,
            state: PluginState::Queried,
            error: None,
        }
    }

    pub fn filename(&self) -> &PathBuf {
        &self.filename
    }

    pub fn loader(&self) -> &str {
        &self.loader
    }

    pub fn info(&self) -> &PluginInfo {
        &self.info
    }

    pub fn state(&self) -> PluginState {
        self.state
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn id(&self) -> &str {
        &self.info.id
    }

    pub fn version(&self) -> &crate::dependency::Version {
        &self.info.version
    }
}

impl PartialEq for Plugin {
    fn eq(&self, other: &Self) -> bool {
        self.filename == other.filename && self.loader == other.loader
    }
}

impl Eq for Plugin {}
