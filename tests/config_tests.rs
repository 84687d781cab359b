use anyhow::Result;
use prepwise_interview::session::SessionSettings;
use prepwise_interview::Config;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults() {
    let config = Config::default();

    assert_eq!(config.service.http.port, 3000);
    assert_eq!(config.call.env_key_var, "VAPI_PUBLIC_KEY");
    assert_eq!(config.questions.api_key_env, "GEMINI_API_KEY");
    assert_eq!(config.debug_log.capacity, 200);
    assert_eq!(config.session_settings(), SessionSettings::default());
}

#[test]
fn test_load_partial_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("prepwise.toml");
    fs::write(
        &path,
        r#"
[service.http]
port = 8088

[call]
voice_id = "rachel"

[storage]
credentials_path = "/var/lib/prepwise/credentials.json"
"#,
    )?;

    let config = Config::load(path.to_str().unwrap_or_default())?;

    assert_eq!(config.service.http.port, 8088);
    assert_eq!(config.service.http.bind, "127.0.0.1");
    assert_eq!(config.call.voice_id, "rachel");
    assert_eq!(config.call.model_name, "gpt-3.5-turbo");

    let settings = config.session_settings();
    assert_eq!(settings.defaults.voice_id, "rachel");

    assert_eq!(
        config.credentials_path()?,
        std::path::PathBuf::from("/var/lib/prepwise/credentials.json")
    );
    Ok(())
}

#[test]
fn test_start_timeout_is_not_configurable() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("prepwise.toml");
    fs::write(
        &path,
        r#"
[call]
start_timeout_secs = 0
"#,
    )?;

    let config = Config::load(path.to_str().unwrap_or_default())?;

    // The key is ignored; the controller always waits the fixed budget
    assert_eq!(config.session_settings(), SessionSettings::default());
    Ok(())
}

#[test]
fn test_missing_file_is_error() {
    assert!(Config::load("/nonexistent/prepwise-config").is_err());
}

#[test]
fn test_home_is_expanded() -> Result<()> {
    let config = Config::default();
    let path = config.credentials_path()?;

    assert!(!path.to_string_lossy().starts_with('~'));
    assert!(path.ends_with(".prepwise/credentials.json"));
    Ok(())
}

#[test]
fn test_sample_config_parses() -> Result<()> {
    let config = Config::load(concat!(env!("CARGO_MANIFEST_DIR"), "/config/prepwise"))?;
    assert!(!config.call.system_prompt_template.is_empty());
    assert!(config.call.system_prompt_template.contains("{questions}"));
    Ok(())
}
