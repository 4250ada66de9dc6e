use std::error::Error as StdError;

use thiserror::Error;

use crate::DependencyExpr;

/// Result alias for operations a [`LoaderBackend`](crate::LoaderBackend)
/// implementation performs on behalf of the manager, matching the teacher
/// crate's convention of boxing backend errors rather than forcing backends
/// to adopt this crate's own error enums.
pub type BackendResult<T> = Result<T, Box<dyn StdError + Send + Sync>>;

/// Failure to interpret a candidate file during discovery (spec §7
/// `QueryFailure`). Non-fatal to refresh: the manager records it as a
/// diagnostic and tries the next loader registered for the extension.
#[derive(Error, Debug)]
#[error("loader `{loader}` failed to query `{path}`: {source}")]
pub struct QueryError {
    pub loader: String,
    pub path: String,
    #[source]
    pub source: Box<dyn StdError + Send + Sync>,
}

/// Errors produced while registering or unregistering a [`LoaderBackend`]
/// (spec §7 `RegistrationConflict`).
#[derive(Error, Debug)]
pub enum RegisterLoaderError {
    #[error("a loader with id `{0}` is already registered")]
    AlreadyRegistered(String),
}

#[derive(Error, Debug)]
pub enum UnregisterLoaderError {
    #[error("no loader with id `{0}` is registered")]
    NotFound(String),
}

/// Errors produced by [`Manager::load_plugin`](crate::Manager::load_plugin).
#[derive(Error, Debug)]
pub enum LoadPluginError {
    #[error("plugin `{0}` is not known to the manager")]
    NotFound(String),

    #[error("plugin `{0}` has no associated info")]
    MissingInfo(String),

    #[error("plugin `{0}` has no owning loader registered")]
    MissingLoader(String),

    #[error(
        "dependency `{expr}` of plugin `{plugin}` could not be resolved against the plugin index"
    )]
    UnresolvedDependency {
        plugin: String,
        expr: DependencyExpr,
    },

    #[error("dependency `{depend_id}` of plugin `{plugin}` failed to load: {source}")]
    DependencyFailed {
        plugin: String,
        depend_id: String,
        #[source]
        source: Box<LoadPluginError>,
    },

    #[error("loader `{loader}` refused to load plugin `{plugin}`: {source}")]
    LoaderRefused {
        loader: String,
        plugin: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("a listener vetoed loading plugin `{plugin}`: {reason}")]
    ListenerVeto { plugin: String, reason: String },
}

/// Errors produced by [`Manager::unload_plugin`](crate::Manager::unload_plugin).
#[derive(Error, Debug)]
pub enum UnloadPluginError {
    #[error("plugin `{0}` is not known to the manager")]
    NotFound(String),

    #[error("plugin `{0}` has no owning loader registered")]
    MissingLoader(String),

    #[error("loader `{loader}` refused to unload plugin `{plugin}`: {source}")]
    LoaderRefused {
        loader: String,
        plugin: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    #[error("a listener vetoed unloading plugin `{plugin}`: {reason}")]
    ListenerVeto { plugin: String, reason: String },
}

/// A malformed dependency atom (spec §4.5/§9 — the hand-written parser makes
/// this explicit where the original's regex failed silently).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyParseError {
    #[error("dependency expression is empty")]
    Empty,
    #[error("atom `{0}` has an operator but no version")]
    MissingVersion(String),
    #[error("atom `{0}` has no plugin id before the operator")]
    MissingId(String),
}
