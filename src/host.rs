/// Seams to the host editor and their JSON-lines implementations
///
/// The editor owns the event subscription and the UI. The monitor only sees
/// `HostEventSource` (edit events and commands in) and `HostWindow`
/// (notification and status-bar requests out).

use anyhow::{Context, Result};
use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::MalformedMessage;
use crate::event::{HostMessage, HostRequest};

/// User-facing UI calls issued for each flagged edit
pub trait HostWindow: Send + Sync {
    /// Transient informational popup
    fn show_information_message(&self, message: &str) -> Result<()>;

    /// Short-lived status-bar message, no acknowledgement expected
    fn set_status_bar_message(&self, message: &str, timeout: Duration) -> Result<()>;
}

/// Subscription to host events, polled until the host goes away
pub trait HostEventSource {
    /// `Ok(None)` means the host closed the subscription
    fn poll_message(&mut self) -> Result<Option<HostMessage>>;
}

impl HostEventSource for VecDeque<HostMessage> {
    fn poll_message(&mut self) -> Result<Option<HostMessage>> {
        Ok(self.pop_front())
    }
}

/// Reads one `HostMessage` JSON object per line
///
/// Lines that are not UTF-8 or not valid JSON come back as `MalformedMessage`;
/// only a failing reader is a hard error.
pub struct JsonLinesSource<R> {
    reader: R,
    line: Vec<u8>,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        JsonLinesSource {
            reader,
            line: Vec::new(),
        }
    }
}

impl<R: BufRead> HostEventSource for JsonLinesSource<R> {
    fn poll_message(&mut self) -> Result<Option<HostMessage>> {
        loop {
            self.line.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut self.line)
                .context("Failed to read host message")?;

            if read == 0 {
                return Ok(None);
            }

            let text = match std::str::from_utf8(&self.line) {
                Ok(text) => text.trim(),
                Err(e) => {
                    return Err(MalformedMessage {
                        line: String::from_utf8_lossy(&self.line).trim().to_string(),
                        source: Box::new(e),
                    }
                    .into())
                }
            };
            if text.is_empty() {
                continue;
            }

            return match serde_json::from_str(text) {
                Ok(message) => Ok(Some(message)),
                Err(e) => Err(MalformedMessage {
                    line: text.to_string(),
                    source: Box::new(e),
                }
                .into()),
            };
        }
    }
}

/// Writes one `HostRequest` JSON object per line
pub struct JsonLinesHost<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesHost<W> {
    pub fn new(writer: W) -> Self {
        JsonLinesHost {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn send(&self, request: &HostRequest) -> Result<()> {
        let json = serde_json::to_string(request).context("Failed to serialize host request")?;

        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        writeln!(writer, "{}", json).context("Failed to write host request")?;
        writer.flush().context("Failed to flush host request")?;
        Ok(())
    }
}

impl<W: Write + Send> HostWindow for JsonLinesHost<W> {
    fn show_information_message(&self, message: &str) -> Result<()> {
        self.send(&HostRequest::ShowInformationMessage {
            message: message.to_string(),
        })
    }

    fn set_status_bar_message(&self, message: &str, timeout: Duration) -> Result<()> {
        self.send(&HostRequest::SetStatusBarMessage {
            message: message.to_string(),
            timeout_ms: timeout.as_millis() as u64,
        })
    }
}
