//! The pluggable per-format backend contract (spec §4.1), grounded on the
//! teacher crate's `Manager<'a, O, I>` trait (`src/manager.rs`) — same
//! shape, renamed to match this spec's terminology, trimmed of the
//! function-registry parameters that subsystem no longer exists to pass.

use std::path::Path;

use crate::{Plugin, PluginInfo, utils::BackendResult};

/// Context handed to a [`LoaderBackend`] during `query`: the path it was
/// asked to inspect. Kept close to the teacher's
/// `RegisterPluginContext` (`src/context/register_plugin_context.rs`), which
/// already carried exactly this.
pub struct QueryContext<'a> {
    pub path: &'a Path,
}

/// A component that knows how to interpret plugin files of one or more
/// extensions and drive their load/unload lifecycle (spec §4.1). The
/// manager treats backends as opaque: query failures are non-fatal (the
/// manager tries the next backend registered for the extension), but
/// load/unload failures propagate to the caller.
pub trait LoaderBackend: Send + Sync {
    /// Unique identifier across all backends registered with a given
    /// manager.
    fn id(&self) -> &str;

    /// File-name suffixes (without the leading dot) this backend claims.
    /// Membership need not be disjoint from other backends.
    fn supported_extensions(&self) -> &[&str];

    /// Opens `context.path`, extracts a [`PluginInfo`], and returns it.
    /// On success the manager wraps the result in a [`Plugin`] whose state
    /// is `queried`. May fail with a parse/validation error, which the
    /// manager records as a diagnostic and does not propagate.
    fn query(&mut self, context: QueryContext) -> BackendResult<PluginInfo>;

    /// Executes `plugin`'s load entry point. The backend is responsible for
    /// any language-runtime-specific setup.
    fn load(&mut self, plugin: &Plugin) -> BackendResult<()>;

    /// Inverse of `load`. A backend may refuse (e.g. an interpreter that
    /// cannot be torn down); failure is reported, not suppressed.
    fn unload(&mut self, plugin: &Plugin) -> BackendResult<()>;
}
