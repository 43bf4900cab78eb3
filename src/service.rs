//! Session service
//!
//! One task owns the `RecognitionController`. Caller commands arrive over a
//! channel and engine events over the controller's subscription; the task
//! handles one of either at a time, so controller state has a single writer.

use crate::language::Language;
use crate::session::{RecognitionController, SessionState};
use anyhow::{Context, Result};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

type Reply = oneshot::Sender<SessionState>;

#[derive(Debug)]
enum Command {
    Start(Reply),
    Stop(Reply),
    Clear(Reply),
    SetLanguage(Language, Reply),
    State(Reply),
    Shutdown(oneshot::Sender<()>),
}

/// Cloneable handle to a running session service
#[derive(Debug, Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<Command>,
}

impl SessionHandle {
    /// Spawn the service task owning `controller`
    pub fn spawn(controller: RecognitionController) -> (Self, JoinHandle<()>) {
        let (commands, rx) = mpsc::channel(32);
        let task = tokio::spawn(run(controller, rx));
        (Self { commands }, task)
    }

    pub async fn start_listening(&self) -> Result<SessionState> {
        self.request(Command::Start).await
    }

    pub async fn stop_listening(&self) -> Result<SessionState> {
        self.request(Command::Stop).await
    }

    pub async fn clear_transcript(&self) -> Result<SessionState> {
        self.request(Command::Clear).await
    }

    pub async fn set_language(&self, language: Language) -> Result<SessionState> {
        self.request(|reply| Command::SetLanguage(language, reply)).await
    }

    pub async fn state(&self) -> Result<SessionState> {
        self.request(Command::State).await
    }

    /// Tear the session down and wait for the service task to acknowledge
    pub async fn shutdown(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Shutdown(tx))
            .await
            .context("Session service has stopped")?;
        rx.await.context("Session service dropped shutdown reply")
    }

    async fn request(&self, command: impl FnOnce(Reply) -> Command) -> Result<SessionState> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(command(tx))
            .await
            .context("Session service has stopped")?;
        rx.await.context("Session service dropped reply")
    }
}

async fn run(mut controller: RecognitionController, mut commands: mpsc::Receiver<Command>) {
    info!("Session service started ({})", controller.language());

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    debug!("All session handles dropped");
                    break;
                };

                let reply = match command {
                    Command::Start(reply) => {
                        controller.start_listening();
                        reply
                    }
                    Command::Stop(reply) => {
                        controller.stop_listening();
                        reply
                    }
                    Command::Clear(reply) => {
                        controller.clear_transcript();
                        reply
                    }
                    Command::SetLanguage(language, reply) => {
                        controller.set_language(language);
                        reply
                    }
                    Command::State(reply) => reply,
                    Command::Shutdown(done) => {
                        controller.teardown();
                        let _ = done.send(());
                        break;
                    }
                };

                // Pick up anything the command made the engine queue
                controller.pump_pending();
                let _ = reply.send(controller.state());
            }
            event = controller.next_event() => {
                controller.handle_event(event);
            }
        }
    }

    controller.teardown();
    info!("Session service stopped");
}
