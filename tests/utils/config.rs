use serde::{Deserialize, Serialize};

/// On-disk descriptor the mock loader backend parses during `query`. Mirrors
/// the subset of `PluginInfo` these integration tests exercise.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PluginFixture {
    pub id: String,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub dependencies: Vec<String>,
    #[serde(default)]
    pub load_on_query: bool,
}

impl PluginFixture {
    pub fn new(id: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            name: id.to_string(),
            version: version.to_string(),
            dependencies: Vec::new(),
            load_on_query: false,
        }
    }

    pub fn depends_on(mut self, expr: &str) -> Self {
        self.dependencies.push(expr.to_string());
        self
    }

    pub fn load_on_query(mut self) -> Self {
        self.load_on_query = true;
        self
    }
}

/// Writes `fixture` as a `<name>.plug` TOML file inside `dir`.
pub fn write_fixture(dir: &std::path::Path, filename: &str, fixture: &PluginFixture) {
    let content = toml::to_string(fixture).expect("fixture serializes");
    std::fs::write(dir.join(filename), content).expect("fixture writes");
}
