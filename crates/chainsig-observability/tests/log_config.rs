use chainsig_observability::LogConfig;

#[test]
fn yaml_log_section_with_defaults() {
    let config: LogConfig = serde_yaml::from_str("json: true\n").unwrap();
    assert_eq!(config.level, "warn");
    assert!(config.json);
    assert!(config.components.is_empty());
}

#[test]
fn yaml_log_section_with_components() {
    let yaml = "level: info\ncomponents:\n  chainsig-registry: debug\n";
    let config: LogConfig = serde_yaml::from_str(yaml).unwrap();
    assert_eq!(config.directives(), "info,chainsig_registry=debug");
}
