/// Diagnostic output channel
///
/// The channel is an append-only log the operator can open to see why an alert
/// did or did not make a sound. It is constructed once at activation, shared by
/// reference with the dispatcher and the sound thread, and disposed at
/// deactivation.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

pub trait OutputChannel: Send + Sync {
    fn append_line(&self, line: &str);

    /// Release the underlying resource. Later appends are dropped.
    fn dispose(&self) {}
}

/// File-backed channel, opened lazily on the first append
pub struct DiagnosticChannel {
    path: PathBuf,
    file: Mutex<Option<File>>,
    disposed: AtomicBool,
}

impl DiagnosticChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DiagnosticChannel {
            path: path.into(),
            file: Mutex::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn open(&self) -> std::io::Result<File> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&self.path)
    }
}

impl OutputChannel for DiagnosticChannel {
    fn append_line(&self, line: &str) {
        tracing::debug!(target: "codex_monitor::diagnostic", "{}", line);

        if self.disposed.load(Ordering::Acquire) {
            return;
        }

        // A poisoned lock only means another writer panicked mid-line
        let mut guard = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if guard.is_none() {
            match self.open() {
                Ok(file) => *guard = Some(file),
                Err(e) => {
                    tracing::warn!("Failed to open diagnostic log {}: {}", self.path.display(), e);
                    return;
                }
            }
        }

        if let Some(file) = guard.as_mut() {
            if let Err(e) = writeln!(file, "{}", line) {
                tracing::warn!("Failed to write diagnostic log {}: {}", self.path.display(), e);
            }
        }
    }

    fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
        let mut guard = match self.file.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Some(mut file) = guard.take() {
            let _ = file.flush();
        }
    }
}

/// In-memory channel for embedding hosts and tests
#[derive(Debug, Default)]
pub struct MemoryChannel {
    lines: Mutex<Vec<String>>,
}

impl MemoryChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.contains(needle))
    }
}

impl OutputChannel for MemoryChannel {
    fn append_line(&self, line: &str) {
        tracing::debug!(target: "codex_monitor::diagnostic", "{}", line);
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}
