mod utils;

#[cfg(test)]
mod tests {
    use plugforge::{Comparator, Version};

    use crate::utils::{PluginFixture, manager_with_mock_loader, write_fixture};

    #[test]
    fn find_plugin_with_newest_version_picks_the_maximum() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "v1.plug", &PluginFixture::new("demo/brush", "1.0.0"));
        write_fixture(dir.path(), "v2.plug", &PluginFixture::new("demo/brush", "3.0.0"));
        write_fixture(dir.path(), "v3.plug", &PluginFixture::new("demo/brush", "2.0.0"));

        let (mut manager, _) = manager_with_mock_loader(dir.path());
        manager.refresh();

        let newest = manager.find_plugin_with_newest_version("demo/brush").unwrap();
        assert_eq!(newest.version(), &Version::new("3.0.0"));
    }

    #[test]
    fn find_plugins_with_version_filters_by_comparator() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "v1.plug", &PluginFixture::new("demo/brush", "1.0.0"));
        write_fixture(dir.path(), "v2.plug", &PluginFixture::new("demo/brush", "2.0.0"));
        write_fixture(dir.path(), "v3.plug", &PluginFixture::new("demo/brush", "3.0.0"));

        let (mut manager, _) = manager_with_mock_loader(dir.path());
        manager.refresh();

        let at_least_two = manager.find_plugins_with_version(
            "demo/brush",
            Some((Comparator::Ge, &Version::new("2.0.0"))),
        );

        let mut versions: Vec<_> = at_least_two
            .iter()
            .map(|p| p.version().as_str().to_string())
            .collect();
        versions.sort();

        assert_eq!(versions, vec!["2.0.0".to_string(), "3.0.0".to_string()]);
    }

    #[test]
    fn dependency_resolution_can_pin_an_exact_version_among_many() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(dir.path(), "v1.plug", &PluginFixture::new("demo/brush", "1.0.0"));
        write_fixture(dir.path(), "v2.plug", &PluginFixture::new("demo/brush", "2.0.0"));
        write_fixture(
            dir.path(),
            "tool.plug",
            &PluginFixture::new("demo/tool", "1.0.0").depends_on("demo/brush==1.0.0"),
        );

        let (mut manager, calls) = manager_with_mock_loader(dir.path());
        manager.refresh();

        manager
            .load_plugin("demo/tool", &Version::new("1.0.0"))
            .unwrap();

        assert!(
            calls
                .lock()
                .unwrap()
                .contains(&"load:demo/brush".to_string())
        );

        let loaded = manager
            .find_plugins("demo/brush")
            .into_iter()
            .find(|p| p.state() == plugforge::PluginState::Loaded)
            .unwrap();
        assert_eq!(loaded.version(), &Version::new("1.0.0"));
    }
}
