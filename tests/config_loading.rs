use std::fs;

use scoped_reanalysis::RecompileConfig;
use tempfile::TempDir;

#[test]
fn test_load_toml_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("reanalysis.toml");
    fs::write(&path, "function_scoped = false\nmax_body_len = 4096\n").expect("write");

    let config = RecompileConfig::load_from_file(&path).expect("valid toml");
    assert!(!config.function_scoped);
    assert!(config.verify_suffix);
    assert_eq!(config.max_body_len, Some(4096));
}

#[test]
fn test_load_yaml_and_yml_files() {
    let dir = TempDir::new().expect("tempdir");
    for name in ["reanalysis.yaml", "reanalysis.YML"] {
        let path = dir.path().join(name);
        fs::write(&path, "verify_suffix: false\nverbose_logging: true\n").expect("write");

        let config = RecompileConfig::load_from_file(&path).expect("valid yaml");
        assert!(!config.verify_suffix, "{name}");
        assert!(config.verbose_logging, "{name}");
        assert!(config.function_scoped, "{name}");
    }
}

#[test]
fn test_save_then_load() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("saved.toml");
    let config = RecompileConfig { max_body_len: Some(128), ..RecompileConfig::default() };

    config.save_to_file(&path).expect("save");
    assert_eq!(RecompileConfig::load_from_file(&path).expect("load"), config);
}

#[test]
fn test_unsupported_extension_and_missing_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("reanalysis.json");
    fs::write(&path, "{}").expect("write");

    let err = RecompileConfig::load_from_file(&path).expect_err("json is not supported");
    assert!(err.to_string().contains("Unsupported config format"), "{err}");

    let missing = dir.path().join("absent.toml");
    let err = RecompileConfig::load_from_file(&missing).expect_err("missing file");
    assert!(err.to_string().contains("Failed to read"), "{err}");
}

#[test]
fn test_invalid_values_name_the_file() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("bad.toml");
    fs::write(&path, "max_body_len = 0\n").expect("write");

    let err = RecompileConfig::load_from_file(&path).expect_err("zero limit");
    assert!(err.to_string().contains("bad.toml"), "{err}");
    assert!(format!("{err:#}").contains("max_body_len"), "{err:#}");
}
