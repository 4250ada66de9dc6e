//! # plugforge - a pluggable plugin manager
//!
//! `plugforge` discovers plugin files across a configured set of search
//! paths, hands each one to the [`LoaderBackend`] registered for its file
//! extension, resolves the dependency graph between the plugins that backend
//! extracts, and drives their load/unload lifecycle while notifying
//! listeners of every transition.
//!
//! ## Core components
//!
//! - [`Manager`]: owns the search-path list, the loader registry, and the
//!   plugin index; drives discovery and the load/unload lifecycle.
//! - [`LoaderBackend`]: a pluggable per-format backend — native dynamic
//!   libraries, an embedded scripting runtime, or anything else that can
//!   produce a [`PluginInfo`] from a path and execute a load/unload entry
//!   point.
//! - [`Plugin`]: the runtime handle a manager hands back for each discovered
//!   file: identity, owning loader, descriptor, and lifecycle state.
//! - [`PluginInfo`]: the immutable descriptor a backend extracts during
//!   `query` — name, version, dependencies, and the rest of spec's metadata.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use plugforge::{Manager, PluginState};
//!
//! let mut manager = Manager::new();
//! manager.append_path("/usr/lib/myapp/plugins");
//! // manager.register_loader(Box::new(MyLoaderBackend::new()))?;
//! manager.refresh();
//!
//! for id in manager.list_plugins() {
//!     if let Some(plugin) = manager.find_plugin_with_newest_version(&id) {
//!         if plugin.state() == PluginState::Queried {
//!             let _ = manager.load_plugin(plugin.id(), plugin.version());
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs)]

/// Lifecycle notifications a [`Manager`] emits as it loads and unloads
/// plugins.
pub mod events;

/// The two-level directory listing the discovery loop walks.
pub mod file_tree;

/// The immutable plugin descriptor extracted by a [`LoaderBackend`].
pub mod info;

/// The pluggable per-format backend contract.
pub mod loader;

/// The central orchestrator: search paths, loader registry, discovery, and
/// the load/unload driver.
pub mod manager;

/// The runtime plugin handle and its lifecycle state machine.
pub mod plugin;

/// Dependency-expression grammar and the version total order used to
/// resolve it.
pub mod dependency;

/// Error types and small path/collation helpers shared across the crate.
pub mod utils;

pub use events::Event;
pub use info::{ABI_VERSION_FRAMEWORK_MASK, PluginInfo, PluginInfoBuilder};
pub use loader::{LoaderBackend, QueryContext};
pub use manager::{Manager, default_manager};
pub use plugin::{Plugin, PluginState};

pub use dependency::{Comparator, DependencyAtom, DependencyExpr, Version};

/// Re-export of the types most consumers need: a [`Manager`], the
/// [`LoaderBackend`] trait to implement, and the plugin/info/dependency
/// types those calls exchange.
pub mod prelude {
    pub use crate::dependency::{Comparator, DependencyAtom, DependencyExpr, Version};
    pub use crate::events::Event;
    pub use crate::info::{PluginInfo, PluginInfoBuilder};
    pub use crate::loader::{LoaderBackend, QueryContext};
    pub use crate::manager::{Manager, default_manager};
    pub use crate::plugin::{Plugin, PluginState};
    pub use crate::utils::*;
}
