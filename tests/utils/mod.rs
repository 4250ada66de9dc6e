mod config;
mod mock_loader;

pub use config::*;
pub use mock_loader::*;

use std::path::Path;

use plugforge::Manager;

/// Builds a [`Manager`] watching `search_path` with a [`MockLoaderBackend`]
/// registered, returning the manager and a handle to the backend's call log.
pub fn manager_with_mock_loader(
    search_path: &Path,
) -> (Manager, std::sync::Arc<std::sync::Mutex<Vec<String>>>) {
    let backend = MockLoaderBackend::new();
    let calls = backend.calls();

    let mut manager = Manager::new();
    manager.append_path(search_path.to_string_lossy());
    manager
        .register_loader(Box::new(backend))
        .expect("loader registers");

    (manager, calls)
}
