/// The activated monitor: per-edit callback, commands and the host event loop
///
/// Created once at activation with every collaborator injected. Each edit is
/// classified against the threshold read fresh from the `ConfigSource`, so a
/// settings change applies to the very next event.

use anyhow::{bail, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::classifier::{classify, ClassificationResult};
use crate::config::ConfigSource;
use crate::constants::alert::PLAY_TEST_SOUND_COMMAND;
use crate::dispatcher::{panic_message, timestamp, AlertDispatcher};
use crate::error::MalformedMessage;
use crate::event::{EditEvent, HostMessage};
use crate::host::{HostEventSource, HostWindow};
use crate::output::OutputChannel;
use crate::sound::SoundFallbackChain;

/// A flagged edit and the detached sound attempt it started
#[derive(Debug)]
pub struct Alert {
    pub result: ClassificationResult,
    pub sound: Option<JoinHandle<()>>,
}

pub struct Monitor {
    config: Arc<dyn ConfigSource>,
    output: Arc<dyn OutputChannel>,
    dispatcher: AlertDispatcher,
}

impl Monitor {
    pub fn new(
        config: Arc<dyn ConfigSource>,
        output: Arc<dyn OutputChannel>,
        host: Arc<dyn HostWindow>,
        chain: Arc<SoundFallbackChain>,
    ) -> Self {
        let dispatcher = AlertDispatcher::new(Arc::clone(&output), host, chain);
        let monitor = Monitor {
            config,
            output,
            dispatcher,
        };

        monitor.output.append_line(&format!(
            "[{}] Codex monitor activated (threshold {})",
            timestamp(),
            monitor.threshold()
        ));
        monitor
    }

    pub fn threshold(&self) -> usize {
        self.config.monitor_config().min_inserted_length
    }

    /// Host callback for every document change
    ///
    /// Never panics into the host: anything unexpected is written to the
    /// diagnostic channel and the event is treated as not flagged.
    pub fn on_did_change_text_document(&self, event: &EditEvent) -> Option<Alert> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.handle_edit(event))) {
            Ok(alert) => alert,
            Err(payload) => {
                self.output.append_line(&format!(
                    "[{}] Error handling edit in {}: {}",
                    timestamp(),
                    event.document,
                    panic_message(payload.as_ref())
                ));
                None
            }
        }
    }

    fn handle_edit(&self, event: &EditEvent) -> Option<Alert> {
        let result = classify(event, self.threshold())?;

        if !result.flagged {
            tracing::trace!(
                "Edit of {} chars in {} below threshold {}",
                result.inserted_length,
                event.document,
                result.threshold
            );
            return None;
        }

        let sound = self.dispatcher.dispatch(&result, &event.document);
        Some(Alert { result, sound })
    }

    /// Run a registered command by id
    pub fn execute_command(&self, command: &str) -> Result<Option<JoinHandle<()>>> {
        if command == PLAY_TEST_SOUND_COMMAND {
            self.output
                .append_line(&format!("[{}] Test sound requested", timestamp()));
            Ok(self.dispatcher.spawn_sound())
        } else {
            bail!("Unknown command: {}", command)
        }
    }

    /// Drain host messages until shutdown or end of input
    ///
    /// Malformed messages are logged and skipped. Only a failure to read from
    /// the host at all ends the loop with an error.
    pub fn run(&self, source: &mut dyn HostEventSource) -> Result<()> {
        loop {
            match source.poll_message() {
                Ok(Some(HostMessage::DidChange(event))) => {
                    // Fire-and-forget: the sound thread is not joined
                    let _ = self.on_did_change_text_document(&event);
                }
                Ok(Some(HostMessage::Command { command })) => {
                    if let Err(e) = self.execute_command(&command) {
                        self.output.append_line(&format!("[{}] {:#}", timestamp(), e));
                    }
                }
                Ok(Some(HostMessage::Shutdown)) | Ok(None) => break,
                Err(e) if e.downcast_ref::<MalformedMessage>().is_some() => {
                    self.output
                        .append_line(&format!("[{}] Ignoring host message: {:#}", timestamp(), e));
                }
                Err(e) => return Err(e),
            }
        }

        Ok(())
    }

    /// Release the diagnostic channel
    pub fn deactivate(&self) {
        self.output
            .append_line(&format!("[{}] Codex monitor deactivated", timestamp()));
        self.output.dispose();
    }
}
