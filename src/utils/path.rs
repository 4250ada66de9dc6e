use std::path::{MAIN_SEPARATOR, Path, PathBuf};

/// Appends the platform directory separator to `path` if it is not already
/// present, so every search path stored by the [`Manager`](crate::Manager) ends
/// with a separator (spec invariant: `paths()` entries always end with the
/// directory separator).
pub fn normalize_path(path: &str) -> String {
    if path.ends_with(MAIN_SEPARATOR) || path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}{MAIN_SEPARATOR}")
    }
}

/// Locale-aware filename collation, used to deduplicate normalized search
/// paths. There is no ICU/locale crate in this pack to bind, so comparison
/// falls back to ordinary Unicode ordinal comparison of the normalized
/// strings — still encoding-aware, just not collation-table-aware. See
/// `DESIGN.md` for the reasoning.
pub fn paths_equal(a: &str, b: &str) -> bool {
    normalize_path(a) == normalize_path(b)
}

/// Builds the two framework-owned default search paths:
/// `<install_prefix>/<libdir>/<framework>` and `<user_config>/<framework>`.
pub fn default_paths(install_prefix: &Path, libdir: &str, framework: &str) -> Vec<PathBuf> {
    vec![
        install_prefix.join(libdir).join(framework),
        user_config_dir().join(framework),
    ]
}

/// Builds the two application-owned search paths:
/// `<prefix>/<libdir>/<app>` and `<user_config>/<app>/plugins`.
pub fn app_paths(prefix: &Path, libdir: &str, app_name: &str) -> Vec<PathBuf> {
    vec![
        prefix.join(libdir).join(app_name),
        user_config_dir().join(app_name).join("plugins"),
    ]
}

fn user_config_dir() -> PathBuf {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        .unwrap_or_else(|| PathBuf::from(".config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_path_appends_the_separator_exactly_once() {
        let normalized = normalize_path("/opt/plugins");
        assert!(normalized.ends_with(MAIN_SEPARATOR));
        assert_eq!(normalize_path(&normalized), normalized);
    }

    #[test]
    fn paths_equal_compares_normalized_forms() {
        assert!(paths_equal("/opt/plugins", "/opt/plugins/"));
        assert!(!paths_equal("/opt/plugins", "/opt/other"));
    }
}
