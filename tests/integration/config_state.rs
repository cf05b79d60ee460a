// Config persistence and its effect on job defaults

use tempfile::TempDir;
use vidbatch::config::{Config, DefaultsConfig};
use vidbatch::engine::validate::validate_parameters;

#[test]
fn test_saved_defaults_round_trip_through_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("vidbatch").join("config.toml");

    let mut config = Config::default();
    config.output.directory = Some(temp_dir.path().join("encoded"));
    config.defaults = DefaultsConfig {
        video_codec: "h265".into(),
        video_height: "1080".into(),
        rotate: "180".into(),
        watermark_placement: "spiral".into(),
        cpu_threads: Some(2),
        ..DefaultsConfig::default()
    };
    config.save_to(&path).unwrap();

    let loaded = Config::load_from(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.output_directory(), temp_dir.path().join("encoded"));
}

#[test]
fn test_default_parameters_pass_validation() {
    let params = DefaultsConfig::default().parameters();
    assert!(validate_parameters(&params, 1).is_ok());
}

#[test]
fn test_config_defaults_can_be_invalid() {
    let defaults = DefaultsConfig {
        fps: "29.97".into(),
        cpu_threads: Some(64),
        ..DefaultsConfig::default()
    };
    let errors = validate_parameters(&defaults.parameters(), 8).unwrap_err();
    let fields: Vec<_> = errors.iter().map(|e| e.field.as_str()).collect();
    assert_eq!(fields, vec!["fps", "cpu_threads"]);
}

#[test]
fn test_empty_file_uses_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "").unwrap();

    assert_eq!(Config::load_from(&path).unwrap(), Config::default());
}

#[test]
fn test_missing_file_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    assert!(Config::load_from(&temp_dir.path().join("absent.toml")).is_err());
}
