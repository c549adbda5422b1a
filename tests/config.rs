use std::fs;

use assert_matches::assert_matches;

use cvm_quota::config::{Config, ConfigLoader, DEFAULT_INDEX_SELECTOR};
use cvm_quota::error::CvmError;

#[test]
fn resolve_from_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("cvm-quota.json");
    fs::write(
        &path,
        r#"{
            "funds_url": "https://funds.example.test/cvm",
            "daily_info_url": "http://dados.example.test/FI/DOC/INF_DIARIO/DADOS/",
            "timeout_secs": 15
        }"#,
    )
    .unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(
        resolved.require_funds_url().unwrap(),
        "https://funds.example.test/cvm"
    );
    assert_eq!(
        resolved.daily_info_url,
        "http://dados.example.test/FI/DOC/INF_DIARIO/DADOS/"
    );
    assert_eq!(resolved.timeout_secs, 15);
    assert_eq!(resolved.index_selector, DEFAULT_INDEX_SELECTOR);
}

#[test]
fn missing_explicit_file() {
    let err = ConfigLoader::resolve(Some("/nonexistent/cvm-quota.json")).unwrap_err();
    assert_matches!(err, CvmError::ConfigRead(_));
}

#[test]
fn invalid_json() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("cvm-quota.json");
    fs::write(&path, "{ not json").unwrap();
    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(CvmError::ConfigParse(_))
    );
}

#[test]
fn custom_selector_is_kept() {
    let config = Config {
        daily_info_url: Some("http://dados.example.test/".to_string()),
        index_selector: Some("pre".to_string()),
        ..Config::default()
    };
    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(resolved.index_selector, "pre");
}
