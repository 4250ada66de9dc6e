//! The central orchestrator (spec §2/§4.3–§4.9): search-path registry,
//! loader-by-extension multiplexing, the reentrant discovery loop, lookup
//! operations, and the load/unload driver. Grounded on the teacher crate's
//! `Loader<'a, O, I>` (`src/loader.rs`) for overall shape — trimmed of every
//! `par_*` rayon variant and the `Ptr`-based aliasing, neither of which has
//! a place in a single-threaded manager (spec §5) — and on GPlugin's
//! `gplugin-manager.c` for the search-path/discovery/load-driver semantics
//! themselves, which the teacher has no equivalent of (see `DESIGN.md`).

use std::{
    cmp::Ordering,
    collections::HashMap,
    path::{Path, PathBuf},
    sync::{Mutex, OnceLock},
};

use tracing::{trace, warn};

use crate::{
    LoaderBackend, Plugin, PluginInfo, PluginState, QueryContext,
    dependency::{Comparator, Version, version_compare},
    events::{Event, EventBus},
    file_tree::FileTree,
    utils::{
        LoadPluginError, QueryError, RegisterLoaderError, UnloadPluginError,
        UnregisterLoaderError, app_paths, default_paths, normalize_path, paths_equal,
    },
};

/// Owns the search-path list, the loader registry, the plugin index, and
/// drives discovery and the load/unload lifecycle (spec §2). Not
/// thread-safe: all operations run on the caller's thread (spec §5).
pub struct Manager {
    paths: Vec<String>,
    loaders_by_id: HashMap<String, Box<dyn LoaderBackend>>,
    /// Most-recently-registered-first per extension (spec §4.4).
    loaders_by_extension: HashMap<String, Vec<String>>,
    /// One entry per (filename, loader) pair (spec §3 invariant).
    plugins: HashMap<PathBuf, Plugin>,
    /// id → ordered filenames, newest-discovered first (spec §4.6 step 7c).
    plugins_by_id: HashMap<String, Vec<PathBuf>>,
    refresh_needed: bool,
    events: EventBus,
}

impl Default for Manager {
    fn default() -> Self {
        Self::new()
    }
}

impl Manager {
    pub fn new() -> Self {
        Self {
            paths: Vec::new(),
            loaders_by_id: HashMap::new(),
            loaders_by_extension: HashMap::new(),
            plugins: HashMap::new(),
            plugins_by_id: HashMap::new(),
            refresh_needed: false,
            events: EventBus::new(),
        }
    }

    // --- §4.3 search-path registry -----------------------------------

    pub fn append_path(&mut self, path: impl AsRef<str>) {
        let normalized = normalize_path(path.as_ref());
        if !self.paths.iter().any(|p| paths_equal(p, &normalized)) {
            self.paths.push(normalized);
        }
    }

    pub fn prepend_path(&mut self, path: impl AsRef<str>) {
        let normalized = normalize_path(path.as_ref());
        if !self.paths.iter().any(|p| paths_equal(p, &normalized)) {
            self.paths.insert(0, normalized);
        }
    }

    pub fn remove_path(&mut self, path: impl AsRef<str>) {
        let normalized = normalize_path(path.as_ref());
        if let Some(idx) = self.paths.iter().position(|p| paths_equal(p, &normalized)) {
            self.paths.remove(idx);
        }
    }

    pub fn remove_all_paths(&mut self) {
        self.paths.clear();
    }

    /// Prepends `<install_prefix>/<libdir>/<framework>` and
    /// `<user_config>/<framework>`, in that final order (spec §6).
    pub fn add_default_paths(&mut self, install_prefix: &Path, libdir: &str, framework: &str) {
        for path in default_paths(install_prefix, libdir, framework)
            .into_iter()
            .rev()
        {
            self.prepend_path(path.to_string_lossy());
        }
    }

    /// Prepends `<prefix>/<libdir>/<app>` and `<user_config>/<app>/plugins`,
    /// in that final order (spec §6).
    pub fn add_app_paths(&mut self, prefix: &Path, libdir: &str, app_name: &str) {
        for path in app_paths(prefix, libdir, app_name).into_iter().rev() {
            self.prepend_path(path.to_string_lossy());
        }
    }

    pub fn paths(&self) -> &[String] {
        &self.paths
    }

    // --- §4.4 loader registry ------------------------------------------

    pub fn register_loader(
        &mut self,
        loader: Box<dyn LoaderBackend>,
    ) -> Result<(), RegisterLoaderError> {
        let id = loader.id().to_string();
        if self.loaders_by_id.contains_key(&id) {
            return Err(RegisterLoaderError::AlreadyRegistered(id));
        }

        for ext in loader.supported_extensions() {
            let ids = self
                .loaders_by_extension
                .entry((*ext).to_string())
                .or_default();
            ids.retain(|existing| existing != &id);
            ids.insert(0, id.clone());
        }

        self.loaders_by_id.insert(id, loader);
        self.refresh_needed = true;
        Ok(())
    }

    pub fn unregister_loader(&mut self, id: &str) -> Result<(), UnregisterLoaderError> {
        if self.loaders_by_id.remove(id).is_none() {
            return Err(UnregisterLoaderError::NotFound(id.to_string()));
        }

        for ids in self.loaders_by_extension.values_mut() {
            ids.retain(|existing| existing != id);
        }

        Ok(())
    }

    pub fn get_loaders(&self) -> Vec<&str> {
        self.loaders_by_id.keys().map(String::as_str).collect()
    }

    /// Registers a listener fired for every notification (spec §4.9). The
    /// listener inspects the event's `Plugin` and, for vetoable events,
    /// returns `false` (optionally writing a reason into the error slot) to
    /// veto the in-flight operation.
    pub fn subscribe<F>(&mut self, listener: F)
    where
        F: FnMut(&mut Event) -> bool + Send + Sync + 'static,
    {
        self.events.subscribe(listener);
    }

    // --- §4.6 discovery --------------------------------------------------

    /// The reentrant discovery loop. Walks every search path, routes each
    /// candidate file to the loaders registered for its extension, and
    /// repeats while progress (a new plugin queried, or a load-on-query
    /// retry warranted) was made in the last pass (spec §4.6/§9).
    pub fn refresh(&mut self) {
        let tree = FileTree::build(&self.paths);
        self.refresh_needed = true;

        while self.refresh_needed {
            self.refresh_needed = false;
            let mut diagnostics: Vec<String> = Vec::new();
            let mut error_count: u32 = 0;

            for entry in tree.entries() {
                let filename = entry.path.canonicalize().unwrap_or_else(|_| entry.path.clone());

                if let Some(existing) = self.plugins.get(&filename) {
                    if matches!(existing.state(), PluginState::Queried | PluginState::Loaded) {
                        continue;
                    }
                }

                let loader_ids = match self.loaders_by_extension.get(&entry.extension) {
                    Some(ids) => ids.clone(),
                    None => continue,
                };

                let mut queried: Option<(String, PluginInfo)> = None;
                for loader_id in &loader_ids {
                    let Some(loader) = self.loaders_by_id.get_mut(loader_id) else {
                        continue;
                    };

                    match loader.query(QueryContext { path: &entry.path }) {
                        Ok(info) => {
                            queried = Some((loader_id.clone(), info));
                            break;
                        }
                        Err(source) => {
                            diagnostics.push(
                                QueryError {
                                    loader: loader_id.clone(),
                                    path: entry.path.display().to_string(),
                                    source,
                                }
                                .to_string(),
                            );
                        }
                    }
                }

                let Some((loader_id, info)) = queried else {
                    continue;
                };

                let id = info.id.clone();
                if id.is_empty() {
                    diagnostics.push(format!(
                        "plugin queried from `{}` has no id, discarding",
                        filename.display()
                    ));
                    continue;
                }

                let plugin = Plugin::new(filename.clone(), loader_id, info);
                self.plugins.insert(filename.clone(), plugin);

                let ids = self.plugins_by_id.entry(id.clone()).or_default();
                if !ids.contains(&filename) {
                    ids.insert(0, filename.clone());
                }

                let load_on_query = self.plugins[&filename].info.load_on_query;
                if load_on_query {
                    if let Err(source) = self.load_plugin_filename(&filename) {
                        diagnostics.push(format!(
                            "load-on-query failed for `{id}`: {source}"
                        ));
                        error_count += 1;
                    }
                } else if error_count > 0 {
                    error_count = 0;
                    self.refresh_needed = true;
                }
            }

            for diagnostic in &diagnostics {
                warn!(%diagnostic, "refresh diagnostic");
            }
        }

        trace!(plugins = self.plugins.len(), "refresh complete");
    }

    // --- §4.7 lookups ------------------------------------------------------

    pub fn find_plugins(&self, id: &str) -> Vec<&Plugin> {
        self.plugins_by_id
            .get(id)
            .map(|filenames| filenames.iter().filter_map(|f| self.plugins.get(f)).collect())
            .unwrap_or_default()
    }

    pub fn find_plugins_with_version(
        &self,
        id: &str,
        constraint: Option<(Comparator, &Version)>,
    ) -> Vec<&Plugin> {
        let all = self.find_plugins(id);
        match constraint {
            Some((op, version)) => all
                .into_iter()
                .filter(|p| op.keeps(version_compare(p.version().as_str(), version.as_str())))
                .collect(),
            None => all,
        }
    }

    pub fn find_plugins_with_state(&self, state: PluginState) -> Vec<&Plugin> {
        self.plugins.values().filter(|p| p.state() == state).collect()
    }

    pub fn find_plugin(&self, id: &str) -> Option<&Plugin> {
        self.find_plugins(id).into_iter().next()
    }

    /// Reduces `find_plugins(id)` under `version_compare`, keeping the
    /// maximum; ties resolve to the earlier entry (spec §8 property 7).
    pub fn find_plugin_with_newest_version(&self, id: &str) -> Option<&Plugin> {
        let mut best: Option<&Plugin> = None;
        for plugin in self.find_plugins(id) {
            best = match best {
                None => Some(plugin),
                Some(current)
                    if version_compare(plugin.version().as_str(), current.version().as_str())
                        == Ordering::Greater =>
                {
                    Some(plugin)
                }
                Some(current) => Some(current),
            };
        }
        best
    }

    pub fn list_plugins(&self) -> Vec<String> {
        self.plugins_by_id.keys().cloned().collect()
    }

    pub fn foreach<F: FnMut(&str, &[&Plugin])>(&self, mut func: F) {
        for (id, filenames) in &self.plugins_by_id {
            let plugins: Vec<&Plugin> =
                filenames.iter().filter_map(|f| self.plugins.get(f)).collect();
            func(id, &plugins);
        }
    }

    // --- §4.5 dependency resolution -----------------------------------

    fn resolve_dependency(
        &self,
        dependent_id: &str,
        expr: &crate::dependency::DependencyExpr,
    ) -> Result<PathBuf, LoadPluginError> {
        for atom in &expr.atoms {
            if let Some(filenames) = self.plugins_by_id.get(&atom.id) {
                for filename in filenames {
                    if let Some(plugin) = self.plugins.get(filename) {
                        if atom.matches(&plugin.info.id, &plugin.info.version) {
                            return Ok(filename.clone());
                        }
                    }
                }
            }
        }

        Err(LoadPluginError::UnresolvedDependency {
            plugin: dependent_id.to_string(),
            expr: expr.clone(),
        })
    }

    // --- §4.8 load/unload driver ---------------------------------------

    pub fn load_plugin(&mut self, id: &str, version: &Version) -> Result<(), LoadPluginError> {
        let filename = self
            .find_plugins(id)
            .into_iter()
            .find(|p| p.version() == version)
            .map(|p| p.filename().clone())
            .ok_or_else(|| LoadPluginError::NotFound(id.to_string()))?;

        self.load_plugin_filename(&filename)
    }

    pub fn unload_plugin(&mut self, id: &str, version: &Version) -> Result<(), UnloadPluginError> {
        let filename = self
            .find_plugins(id)
            .into_iter()
            .find(|p| p.version() == version)
            .map(|p| p.filename().clone())
            .ok_or_else(|| UnloadPluginError::NotFound(id.to_string()))?;

        self.unload_plugin_filename(&filename)
    }

    fn mark_load_failed(&mut self, filename: &Path, message: String) {
        if let Some(plugin) = self.plugins.get_mut(filename) {
            plugin.state = PluginState::LoadFailed;
            plugin.error = Some(message);
        }
    }

    fn load_plugin_filename(&mut self, filename: &Path) -> Result<(), LoadPluginError> {
        let filename = filename.to_path_buf();

        let Some(plugin) = self.plugins.get(&filename) else {
            return Err(LoadPluginError::NotFound(filename.display().to_string()));
        };

        if plugin.state() == PluginState::Loaded {
            return Ok(());
        }

        let id = plugin.info.id.clone();
        let dependencies = plugin.info.dependencies.clone();
        let loader_id = plugin.loader.clone();

        for dep_expr in &dependencies {
            let dep_filename = match self.resolve_dependency(&id, dep_expr) {
                Ok(filename) => filename,
                Err(error) => {
                    self.mark_load_failed(&filename, error.to_string());
                    return Err(error);
                }
            };

            if let Err(source) = self.load_plugin_filename(&dep_filename) {
                let message = source.to_string();
                self.mark_load_failed(&filename, message);
                return Err(LoadPluginError::DependencyFailed {
                    plugin: id.clone(),
                    depend_id: dep_expr.to_string(),
                    source: Box::new(source),
                });
            }
        }

        if !self.loaders_by_id.contains_key(&loader_id) {
            self.mark_load_failed(&filename, "owning loader is not registered".to_string());
            return Err(LoadPluginError::MissingLoader(id));
        }

        let mut veto_reason = None;
        let allowed = {
            let plugin_ref = self.plugins.get(&filename).expect("plugin present");
            self.events.notify_vetoable(Event::LoadingPlugin {
                plugin: plugin_ref,
                veto_reason: &mut veto_reason,
            })
        };

        if !allowed {
            let reason = veto_reason.unwrap_or_else(|| "listener vetoed load".to_string());
            self.mark_load_failed(&filename, reason.clone());
            return Err(LoadPluginError::ListenerVeto { plugin: id, reason });
        }

        let load_result = {
            let loader = self.loaders_by_id.get_mut(&loader_id).expect("checked above");
            let plugin_ref = self.plugins.get(&filename).expect("plugin present");
            loader.load(plugin_ref)
        };

        match load_result {
            Ok(()) => {
                if let Some(plugin) = self.plugins.get_mut(&filename) {
                    plugin.state = PluginState::Loaded;
                    plugin.error = None;
                }
                let plugin_ref = self.plugins.get(&filename).expect("plugin present");
                self.events.notify(Event::LoadedPlugin { plugin: plugin_ref });
                Ok(())
            }
            Err(source) => {
                let message = source.to_string();
                self.mark_load_failed(&filename, message);
                let plugin_ref = self.plugins.get(&filename).expect("plugin present");
                self.events.notify(Event::LoadPluginFailed { plugin: plugin_ref });
                Err(LoadPluginError::LoaderRefused {
                    loader: loader_id,
                    plugin: id,
                    source,
                })
            }
        }
    }

    fn unload_plugin_filename(&mut self, filename: &Path) -> Result<(), UnloadPluginError> {
        let filename = filename.to_path_buf();

        let Some(plugin) = self.plugins.get(&filename) else {
            return Err(UnloadPluginError::NotFound(filename.display().to_string()));
        };

        if plugin.state() != PluginState::Loaded {
            return Ok(());
        }

        let id = plugin.info.id.clone();
        let loader_id = plugin.loader.clone();

        if !self.loaders_by_id.contains_key(&loader_id) {
            return Err(UnloadPluginError::MissingLoader(id));
        }

        let mut veto_reason = None;
        let allowed = {
            let plugin_ref = self.plugins.get(&filename).expect("plugin present");
            self.events.notify_vetoable(Event::UnloadingPlugin {
                plugin: plugin_ref,
                veto_reason: &mut veto_reason,
            })
        };

        if !allowed {
            let reason = veto_reason.unwrap_or_else(|| "listener vetoed unload".to_string());
            // Spec §4.8 unload driver step 3: a veto marks `load_failed`,
            // not `unload_failed` — reproduced here exactly as written.
            self.mark_load_failed(&filename, reason.clone());
            return Err(UnloadPluginError::ListenerVeto { plugin: id, reason });
        }

        let unload_result = {
            let loader = self.loaders_by_id.get_mut(&loader_id).expect("checked above");
            let plugin_ref = self.plugins.get(&filename).expect("plugin present");
            loader.unload(plugin_ref)
        };

        match unload_result {
            Ok(()) => {
                if let Some(plugin) = self.plugins.get_mut(&filename) {
                    plugin.state = PluginState::Queried;
                    plugin.error = None;
                }
                let plugin_ref = self.plugins.get(&filename).expect("plugin present");
                self.events.notify(Event::UnloadedPlugin { plugin: plugin_ref });
                Ok(())
            }
            Err(source) => {
                let message = source.to_string();
                if let Some(plugin) = self.plugins.get_mut(&filename) {
                    plugin.state = PluginState::UnloadFailed;
                    plugin.error = Some(message);
                }
                let plugin_ref = self.plugins.get(&filename).expect("plugin present");
                self.events
                    .notify(Event::UnloadPluginFailed { plugin: plugin_ref });
                Err(UnloadPluginError::LoaderRefused {
                    loader: loader_id,
                    plugin: id,
                    source,
                })
            }
        }
    }
}

/// Process-wide default [`Manager`], for applications that want one instead
/// of threading an explicit handle everywhere (spec §9). Most applications
/// should prefer constructing their own `Manager` and passing it to
/// consumers explicitly.
static DEFAULT_MANAGER: OnceLock<Mutex<Manager>> = OnceLock::new();

pub fn default_manager() -> &'static Mutex<Manager> {
    DEFAULT_MANAGER.get_or_init(|| Mutex::new(Manager::new()))
}
