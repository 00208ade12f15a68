use std::fs;
use std::path::Path;

use ecoship::config::{ConfigError, RuleConfigLoader, DEFAULT_RULE_FILES};
use ecoship::rules::{RuleConfigSet, RuleTarget};

fn shipped_configs() -> RuleConfigLoader {
    RuleConfigLoader::new(Path::new(env!("CARGO_MANIFEST_DIR")).join("configs"))
}

#[test]
fn shipped_configs_match_builtin_rules() {
    let loaded = shipped_configs().load_set().expect("configs parse");
    let builtin = RuleConfigSet::builtin();

    assert!(loaded.missing_targets().is_empty());
    for target in RuleTarget::ALL {
        assert_eq!(
            loaded.get(target),
            builtin.get(target),
            "shipped rules for {target:?} drifted from the builtin set"
        );
    }
}

#[test]
fn missing_index_falls_back_to_default_files() {
    let dir = tempfile::tempdir().unwrap();
    for file in DEFAULT_RULE_FILES {
        let shipped = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("configs")
            .join(file);
        fs::copy(shipped, dir.path().join(file)).unwrap();
    }

    let set = RuleConfigLoader::new(dir.path()).load_set().unwrap();
    assert!(set.missing_targets().is_empty());
}

#[test]
fn index_controls_which_files_load() {
    let dir = tempfile::tempdir().unwrap();
    let shipped = Path::new(env!("CARGO_MANIFEST_DIR")).join("configs");
    fs::copy(shipped.join("tree.json"), dir.path().join("tree.json")).unwrap();
    fs::write(dir.path().join("index.json"), r#"["tree.json"]"#).unwrap();

    let set = RuleConfigLoader::new(dir.path()).load_set().unwrap();
    assert!(set.get(RuleTarget::Tree).is_some());
    assert_eq!(set.len(), 1);
    assert!(set.missing_targets().contains(&RuleTarget::Farm));
}

#[test]
fn malformed_json_reports_the_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("tree.json"), "{ not json").unwrap();
    fs::write(dir.path().join("index.json"), r#"["tree.json"]"#).unwrap();

    let err = RuleConfigLoader::new(dir.path()).load_set().unwrap_err();
    match err {
        ConfigError::Parse { path, .. } => {
            assert!(path.ends_with("tree.json"), "unexpected path {path:?}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_file_reports_io_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.json"), r#"["nope.json"]"#).unwrap();

    let err = RuleConfigLoader::new(dir.path()).load_set().unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}
