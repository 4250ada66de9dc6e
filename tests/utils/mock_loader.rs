use std::{
    error::Error,
    fmt,
    sync::{Arc, Mutex},
};

use plugforge::{LoaderBackend, Plugin, PluginInfo, QueryContext, utils::BackendResult};

use crate::utils::PluginFixture;

#[derive(Debug)]
struct LoaderRefused(String);

impl fmt::Display for LoaderRefused {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Error for LoaderRefused {}

/// A [`LoaderBackend`] over `.plug` TOML fixtures, standing in for a real
/// native or scripting backend in these integration tests. A plugin whose id
/// contains `faulty-load`/`faulty-unload` fails the corresponding operation,
/// for exercising the loader-refusal paths without a second backend.
pub struct MockLoaderBackend {
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockLoaderBackend {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shared call log: `"load:<id>"` / `"unload:<id>"`, in call order.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        self.calls.clone()
    }
}

impl LoaderBackend for MockLoaderBackend {
    fn id(&self) -> &str {
        "mock"
    }

    fn supported_extensions(&self) -> &[&str] {
        &["plug"]
    }

    fn query(&mut self, context: QueryContext) -> BackendResult<PluginInfo> {
        let content = std::fs::read_to_string(context.path)?;
        let fixture: PluginFixture = toml::from_str(&content)?;

        let dependencies = fixture
            .dependencies
            .iter()
            .map(|expr| expr.parse())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(PluginInfo::builder(fixture.id, fixture.name, fixture.version)
            .dependencies(dependencies)
            .load_on_query(fixture.load_on_query)
            .build())
    }

    fn load(&mut self, plugin: &Plugin) -> BackendResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("load:{}", plugin.id()));

        if plugin.id().contains("faulty-load") {
            return Err(Box::new(LoaderRefused(format!(
                "mock backend refuses to load `{}`",
                plugin.id()
            ))));
        }

        Ok(())
    }

    fn unload(&mut self, plugin: &Plugin) -> BackendResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("unload:{}", plugin.id()));

        if plugin.id().contains("faulty-unload") {
            return Err(Box::new(LoaderRefused(format!(
                "mock backend refuses to unload `{}`",
                plugin.id()
            ))));
        }

        Ok(())
    }
}
