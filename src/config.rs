use crate::language::Language;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub recognition: RecognitionConfig,
    pub nats: NatsConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct RecognitionConfig {
    /// Initial recognition language ("kk-KZ" or "ru-RU")
    pub language: Language,
    /// How many notifications the HTTP API keeps for `/notifications`
    #[serde(default = "default_notification_history")]
    pub notification_history: usize,
}

#[derive(Debug, Deserialize)]
pub struct NatsConfig {
    pub url: String,
    /// Session id used to tag control messages and filter transcripts.
    /// Generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,
}

fn default_notification_history() -> usize {
    64
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

impl NatsConfig {
    pub fn session_id(&self) -> String {
        self.session_id
            .clone()
            .unwrap_or_else(|| format!("speech-{}", uuid::Uuid::new_v4()))
    }
}
