/// Alert side effects for a flagged edit
///
/// Three independent effects: a sound attempt on a detached thread, an
/// informational notification and a status-bar message. The notification and
/// status bar are issued on the caller's thread right after the sound thread
/// is launched, so a slow or failing shell never delays them. Nothing here
/// returns an error or lets a panic out.

use chrono::Local;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::classifier::ClassificationResult;
use crate::constants::alert::STATUS_BAR_TIMEOUT_MS;
use crate::event::DocumentId;
use crate::host::HostWindow;
use crate::output::OutputChannel;
use crate::sound::SoundFallbackChain;

pub struct AlertDispatcher {
    output: Arc<dyn OutputChannel>,
    host: Arc<dyn HostWindow>,
    chain: Arc<SoundFallbackChain>,
}

impl AlertDispatcher {
    pub fn new(
        output: Arc<dyn OutputChannel>,
        host: Arc<dyn HostWindow>,
        chain: Arc<SoundFallbackChain>,
    ) -> Self {
        AlertDispatcher {
            output,
            host,
            chain,
        }
    }

    /// Fire every alert side effect for `result`
    ///
    /// Returns the sound thread's handle. Callers in the edit path drop it
    /// (fire-and-forget); tests join it to observe the sound log.
    pub fn dispatch(&self, result: &ClassificationResult, document: &DocumentId) -> Option<JoinHandle<()>> {
        self.output.append_line(&format!(
            "[{}] Codex-like edit: {} chars (threshold {}) in {}",
            timestamp(),
            result.inserted_length,
            result.threshold,
            document
        ));

        let sound = self.spawn_sound();

        let message = format!(
            "Codex-like edit detected in {} ({} chars)",
            document.file_name(),
            result.inserted_length
        );
        if let Err(e) = self.host.show_information_message(&message) {
            self.output
                .append_line(&format!("Failed to show notification: {:#}", e));
        }

        let status = format!("Codex-like edit: {} chars", result.inserted_length);
        if let Err(e) = self
            .host
            .set_status_bar_message(&status, Duration::from_millis(STATUS_BAR_TIMEOUT_MS))
        {
            self.output
                .append_line(&format!("Failed to set status bar message: {:#}", e));
        }

        sound
    }

    /// Run the sound chain once, detached from the caller
    pub fn spawn_sound(&self) -> Option<JoinHandle<()>> {
        let output = Arc::clone(&self.output);
        let chain = Arc::clone(&self.chain);

        let spawned = thread::Builder::new()
            .name("codex-monitor-sound".to_string())
            .spawn(move || {
                let played = panic::catch_unwind(AssertUnwindSafe(|| chain.try_play()));
                match played {
                    Ok(outcome) if outcome.succeeded => {
                        tracing::debug!(
                            "Alert sound played via {}",
                            outcome.method.as_deref().unwrap_or("unknown")
                        );
                    }
                    Ok(outcome) => {
                        tracing::debug!(
                            "Alert sound failed: {}",
                            outcome.diagnostic.as_deref().unwrap_or("unknown")
                        );
                    }
                    Err(payload) => {
                        output.append_line(&format!(
                            "Sound attempt panicked: {}",
                            panic_message(payload.as_ref())
                        ));
                    }
                }
            });

        match spawned {
            Ok(handle) => Some(handle),
            Err(e) => {
                self.output
                    .append_line(&format!("Failed to start sound thread: {}", e));
                None
            }
        }
    }
}

pub(crate) fn timestamp() -> String {
    Local::now().format("%H:%M:%S").to_string()
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
