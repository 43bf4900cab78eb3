use super::messages::{ControlAction, ControlMessage};
use crate::engine::EngineConfig;
use anyhow::{Context, Result};
use async_nats::connection::State;
use async_nats::Client;
use tracing::info;

/// Subject prefix for transcripts (loqa-core publishes stt.text.partial and stt.text.final)
pub const TRANSCRIPT_SUBJECT: &str = "stt.text.>";

/// Subject prefix for recognition errors
pub const ERROR_SUBJECT: &str = "stt.error.>";

pub struct NatsClient {
    client: Client,
    session_id: String,
}

impl NatsClient {
    /// Connect to NATS server
    pub async fn connect(url: &str, session_id: String) -> Result<Self> {
        info!("Connecting to NATS at {}", url);

        let client = async_nats::connect(url)
            .await
            .context("Failed to connect to NATS")?;

        info!("Connected to NATS successfully");

        Ok(Self { client, session_id })
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.client.connection_state(), State::Connected)
    }

    /// Publish a session control message to the STT service
    pub async fn publish_control(&self, action: ControlAction, config: &EngineConfig) -> Result<()> {
        let subject = format!("stt.control.{}", self.session_id);

        let message = ControlMessage {
            session_id: self.session_id.clone(),
            action,
            language: config.language,
            continuous: config.continuous,
            interim_results: config.interim_results,
            timestamp: chrono::Utc::now().to_rfc3339(),
        };

        let payload = serde_json::to_vec(&message)?;

        self.client
            .publish(subject.clone(), payload.into())
            .await
            .context("Failed to publish control message")?;

        info!(
            "Published {:?} to {} (language={})",
            action, subject, config.language
        );

        Ok(())
    }

    /// Subscribe to transcript messages
    pub async fn subscribe_transcripts(&self) -> Result<async_nats::Subscriber> {
        // Subscribe to all transcripts (partial and final).
        // We filter by session_id in the message payload
        info!("Subscribing to transcripts on {}", TRANSCRIPT_SUBJECT);

        let subscriber = self
            .client
            .subscribe(TRANSCRIPT_SUBJECT)
            .await
            .context("Failed to subscribe to transcripts")?;

        Ok(subscriber)
    }

    /// Subscribe to recognition error messages
    pub async fn subscribe_errors(&self) -> Result<async_nats::Subscriber> {
        info!("Subscribing to recognition errors on {}", ERROR_SUBJECT);

        let subscriber = self
            .client
            .subscribe(ERROR_SUBJECT)
            .await
            .context("Failed to subscribe to recognition errors")?;

        Ok(subscriber)
    }
}
