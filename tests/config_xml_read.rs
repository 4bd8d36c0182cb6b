//! Verify XML config is parsed and used without touching user state.

use std::fs;
use tempfile::tempdir;

use ntinterop::{load_config_from_xml_path, Config, LogLevel, PathFormat};

#[test]
fn reads_config_xml_and_applies_values() {
    let td = tempdir().expect("create tempdir");
    let cfg_path = td.path().join("config.xml");
    let log_file = td.path().join("ntinterop.log");

    let xml = format!(
        r#"
<config>
  <log_level>debug</log_level>
  <log_file>{}</log_file>
  <path_format>full</path_format>
  <initial_buffer_size>2048</initial_buffer_size>
  <max_attempts>5</max_attempts>
</config>
"#,
        log_file.display()
    );
    fs::write(&cfg_path, xml).expect("write config.xml");

    let cfg = load_config_from_xml_path(&cfg_path).expect("load_config_from_xml_path");

    assert_eq!(cfg.log_level, LogLevel::Debug, "log_level mismatch");
    assert_eq!(cfg.log_file.as_deref(), Some(log_file.as_path()), "log_file mismatch");
    assert_eq!(cfg.path_format, PathFormat::FullPath, "path_format mismatch");
    assert_eq!(cfg.initial_buffer_size, Some(2048));
    assert_eq!(cfg.max_attempts, 5);
    cfg.validate().expect("values are in range");
}

#[test]
fn missing_elements_keep_defaults() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config>\n  <log_level>quiet</log_level>\n</config>").unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert_eq!(
        cfg,
        Config {
            log_level: LogLevel::Quiet,
            ..Config::default()
        }
    );
}

#[test]
fn whitespace_and_empty_elements_are_tolerated() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    let xml = r#"<config>
  <log_level>  info  </log_level>
  <log_file></log_file>
  <initial_buffer_size>
    4096
  </initial_buffer_size>
  <max_attempts> </max_attempts>
</config>"#;
    fs::write(&cfg_path, xml).unwrap();

    let cfg = load_config_from_xml_path(&cfg_path).unwrap();
    assert_eq!(cfg.log_level, LogLevel::Info);
    assert!(cfg.log_file.is_none(), "empty log_file means unset");
    assert_eq!(cfg.initial_buffer_size, Some(4096));
    assert_eq!(cfg.max_attempts, Config::default().max_attempts);
}

#[test]
fn malformed_xml_errors() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    // Missing closing tag for log_level
    let xml = r#"<config>
  <log_level>debug
</config>"#;
    fs::write(&cfg_path, xml).unwrap();
    let err = load_config_from_xml_path(&cfg_path).unwrap_err();
    assert!(format!("{err}").contains("parse config xml"));
}

#[test]
fn unknown_elements_are_rejected() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");
    fs::write(&cfg_path, "<config><max_atempts>4</max_atempts></config>").unwrap();
    let err = load_config_from_xml_path(&cfg_path).unwrap_err();
    assert!(format!("{err}").contains("parse config xml"));
}

#[test]
fn invalid_values_are_reported() {
    let td = tempdir().unwrap();
    let cfg_path = td.path().join("config.xml");

    fs::write(&cfg_path, "<config><path_format>sideways</path_format></config>").unwrap();
    let err = load_config_from_xml_path(&cfg_path).unwrap_err();
    assert!(format!("{err:#}").contains("invalid path format"), "{err:#}");

    fs::write(&cfg_path, "<config><log_level>loud</log_level></config>").unwrap();
    let err = load_config_from_xml_path(&cfg_path).unwrap_err();
    assert!(format!("{err}").contains("invalid value in config xml"));

    fs::write(&cfg_path, "<config><max_attempts>many</max_attempts></config>").unwrap();
    assert!(load_config_from_xml_path(&cfg_path).is_err());
}

#[test]
fn missing_file_errors_with_context() {
    let td = tempdir().unwrap();
    let err = load_config_from_xml_path(&td.path().join("absent.xml")).unwrap_err();
    assert!(format!("{err}").contains("read config xml"));
}
