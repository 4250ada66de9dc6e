//! The immutable plugin descriptor (spec §3), produced by a
//! [`LoaderBackend`](crate::LoaderBackend) during `query` and shared for the
//! lifetime of the [`Plugin`](crate::Plugin) it is attached to.

use serde::{Deserialize, Serialize};

use crate::dependency::DependencyExpr;

/// Framework-reserved high byte of `abi_version` (spec §6): the low 24 bits
/// are free for the embedding application to carve up.
pub const ABI_VERSION_FRAMEWORK_MASK: u32 = 0xff00_0000;

/// Immutable descriptor of a plugin's identity, metadata, dependencies, ABI
/// version, and flags (spec §3). Constructed once by a loader backend during
/// `query` and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Recommended form `<app>/<name>`. See [`PluginInfo::normalized_id`].
    pub id: String,
    /// High byte framework-owned, low 24 bits application-owned.
    pub abi_version: u32,
    /// Other `id` or `id=version` aliases this plugin also satisfies.
    pub provides: Vec<String>,
    /// Higher wins when multiple plugins share an identifier.
    pub priority: i32,
    pub name: String,
    pub version: crate::dependency::Version,
    pub license_id: Option<String>,
    pub license_text: Option<String>,
    pub license_url: Option<String>,
    pub icon_name: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub authors: Vec<String>,
    pub website: Option<String>,
    /// Dependency expressions, see [`crate::dependency`].
    pub dependencies: Vec<DependencyExpr>,
    /// A plugin whose purpose is to extend the framework rather than be
    /// shown to users.
    pub internal: bool,
    /// Must be loaded immediately after successful query (spec §4.6 step 7d).
    pub load_on_query: bool,
    /// Hint to the native loader about symbol binding; opaque to the core.
    pub bind_global: bool,
}

impl PluginInfo {
    /// Builds a minimal descriptor with `id`, `name`, and `version`, leaving
    /// every other field at its neutral default. Use
    /// [`PluginInfo::builder`] to fill in the rest.
    pub fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        PluginInfoBuilder::new(id, name, version).build()
    }

    /// Starts a builder for a fully-specified descriptor (spec §9: a
    /// builder replaces the source's reflective property bag).
    pub fn builder(
        id: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> PluginInfoBuilder {
        PluginInfoBuilder::new(id, name, version)
    }

    /// Restricts `id` to `[A-Za-z0-9-]`, folding every other byte to `-`
    /// (spec §3; grounded on GPlugin's `gplugin_info_get_id_normalized`).
    pub fn normalized_id(&self) -> String {
        self.id
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect()
    }
}

/// Fluent builder for [`PluginInfo`]; the statically-typed counterpart to
/// the source's reflective property-bag construction (spec §9).
pub struct PluginInfoBuilder {
    info: PluginInfo,
}

impl PluginInfoBuilder {
    fn new(id: impl Into<String>, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: PluginInfo {
                id: id.into(),
                abi_version: 0,
                provides: Vec::new(),
                priority: 0,
                name: name.into(),
                version: version.into().into(),
                license_id: None,
                license_text: None,
                license_url: None,
                icon_name: None,
                summary: None,
                description: None,
                category: None,
                authors: Vec::new(),
                website: None,
                dependencies: Vec::new(),
                internal: false,
                load_on_query: false,
                bind_global: false,
            },
        }
    }

    pub fn abi_version(mut self, abi_version: u32) -> Self {
        self.info.abi_version = abi_version;
        self
    }

    pub fn provides(mut self, provides: Vec<String>) -> Self {
        self.info.provides = provides;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.info.priority = priority;
        self
    }

    pub fn license_id(mut self, license_id: impl Into<String>) -> Self {
        self.info.license_id = Some(license_id.into());
        self
    }

    pub fn license_text(mut self, license_text: impl Into<String>) -> Self {
        self.info.license_text = Some(license_text.into());
        self
    }

    pub fn license_url(mut self, license_url: impl Into<String>) -> Self {
        self.info.license_url = Some(license_url.into());
        self
    }

    pub fn icon_name(mut self, icon_name: impl Into<String>) -> Self {
        self.info.icon_name = Some(icon_name.into());
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.info.summary = Some(summary.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.info.category = Some(category.into());
        self
    }

    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.info.authors = authors;
        self
    }

    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.info.website = Some(website.into());
        self
    }

    pub fn dependencies(mut self, dependencies: Vec<DependencyExpr>) -> Self {
        self.info.dependencies = dependencies;
        self
    }

    pub fn internal(mut self, internal: bool) -> Self {
        self.info.internal = internal;
        self
    }

    pub fn load_on_query(mut self, load_on_query: bool) -> Self {
        self.info.load_on_query = load_on_query;
        self
    }

    pub fn bind_global(mut self, bind_global: bool) -> Self {
        self.info.bind_global = bind_global;
        self
    }

    pub fn build(self) -> PluginInfo {
        self.info
    }
}
