// Tests for configuration loading

use anyhow::Result;
use speech_session::{Config, Language};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_load_config_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("speech-session.toml");
    fs::write(
        &path,
        r#"
[service]
name = "speech-session"

[service.http]
bind = "0.0.0.0"
port = 5000

[recognition]
language = "ru-RU"

[nats]
url = "nats://localhost:4222"
session_id = "desk-1"
"#,
    )?;

    let cfg = Config::load(path.with_extension("").to_str().unwrap())?;

    assert_eq!(cfg.service.http.port, 5000);
    assert_eq!(cfg.recognition.language, Language::Russian);
    assert_eq!(cfg.recognition.notification_history, 64);
    assert_eq!(cfg.nats.session_id(), "desk-1");

    Ok(())
}

#[test]
fn test_generated_session_id_when_absent() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("minimal.toml");
    fs::write(
        &path,
        r#"
[service]
name = "speech-session"

[service.http]
bind = "127.0.0.1"
port = 8080

[recognition]
language = "kk-KZ"

[nats]
url = "nats://localhost:4222"
"#,
    )?;

    let cfg = Config::load(path.with_extension("").to_str().unwrap())?;

    assert_eq!(cfg.recognition.language, Language::Kazakh);
    assert!(cfg.nats.session_id().starts_with("speech-"));

    Ok(())
}

#[test]
fn test_unsupported_language_fails_to_load() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        r#"
[service]
name = "speech-session"

[service.http]
bind = "127.0.0.1"
port = 8080

[recognition]
language = "en-US"

[nats]
url = "nats://localhost:4222"
"#,
    )?;

    assert!(Config::load(path.with_extension("").to_str().unwrap()).is_err());

    Ok(())
}

#[test]
fn test_language_parsing() {
    assert_eq!("kk-KZ".parse::<Language>().unwrap(), Language::Kazakh);
    assert_eq!("ru_ru".parse::<Language>().unwrap(), Language::Russian);
    assert_eq!("ru".parse::<Language>().unwrap(), Language::Russian);
    assert!("en-US".parse::<Language>().is_err());
    assert_eq!(Language::Russian.to_string(), "ru-RU");
}
