// Configuration tests: file loading, defaults and validation

use std::io::Write;
use tempfile::NamedTempFile;
use upmark::config::Config;
use upmark::logging::LogFormat;

fn load(yaml: &str) -> Result<Config, String> {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    Config::from_file(file.path())
}

#[test]
fn test_partial_config_fills_defaults() {
    let config = load("server:\n  port: 8081\n").unwrap();

    assert_eq!(config.server.port, 8081);
    assert_eq!(config.server.address, "0.0.0.0");
    assert_eq!(config.server.max_upload_size, 20 * 1024 * 1024);
    assert_eq!(config.pipeline.target_width, 2000);
    assert_eq!(config.pipeline.max_target_width, 4096);
    assert_eq!(config.watermark.shrink_divisor, 8);
    assert_eq!(config.watermark.shrink_width, 255);
    assert_eq!(config.logging.format, LogFormat::Pretty);
    assert!(config.validate().is_ok());
}

#[test]
fn test_env_var_in_watermark_path() {
    std::env::set_var("UPMARK_CONFIG_TEST_MARK", "/srv/marks/brand.png");
    let config = load("watermark:\n  path: ${UPMARK_CONFIG_TEST_MARK}\n").unwrap();
    assert_eq!(config.watermark.path, "/srv/marks/brand.png");
    std::env::remove_var("UPMARK_CONFIG_TEST_MARK");
}

#[test]
fn test_unknown_log_format_rejected() {
    assert!(load("logging:\n  format: xml\n").is_err());
}

#[test]
fn test_target_width_above_maximum_rejected() {
    let config = load("pipeline:\n  target_width: 5000\n").unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.contains("max_target_width"), "{}", err);
}

#[test]
fn test_negative_opacity_rejected() {
    let config = load("watermark:\n  opacity: -0.1\n").unwrap();
    assert!(config.validate().is_err());
}
