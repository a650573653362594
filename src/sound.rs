/// Audible alert through an ordered fallback chain of external shells
///
/// Candidates are rebuilt on every attempt from the detected environment and
/// tried strictly one after another until the first success. Nothing here
/// panics or returns an error to the caller: every failure becomes a line in
/// the diagnostic channel and, at worst, an unsuccessful `PlaybackOutcome`.

use std::io::ErrorKind;
use std::process::{Command, Stdio};
use std::sync::Arc;

use crate::constants::sound::{
    BEEP_SCRIPT, PWSH_WIN, PWSH_WSL, SHELL_ARGS, TONE_LABEL, WINDOWS_POWERSHELL_WIN,
    WINDOWS_POWERSHELL_WSL, WSLPATH,
};
use crate::environment::{detect_environment, EnvironmentKind, EnvironmentProbe};
use crate::error::PlaybackError;
use crate::output::OutputChannel;
use crate::tone::TonePlayer;

/// One executable to attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackCandidate {
    pub label: String,
    pub command: String,
    pub args: Vec<String>,
}

impl PlaybackCandidate {
    /// A PowerShell candidate running the fixed beep script
    pub fn shell(label: impl Into<String>, command: impl Into<String>) -> Self {
        let mut args: Vec<String> = SHELL_ARGS.iter().map(|arg| arg.to_string()).collect();
        args.push(BEEP_SCRIPT.to_string());

        PlaybackCandidate {
            label: label.into(),
            command: command.into(),
            args,
        }
    }

    pub fn command_line(&self) -> String {
        quote_command_line(&self.command, &self.args)
    }
}

/// Result of one run of the chain, consumed only for logging
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackOutcome {
    pub succeeded: bool,
    /// Label of the candidate that played the sound
    pub method: Option<String>,
    /// Full command line of the candidate that played the sound
    pub command: Option<String>,
    pub diagnostic: Option<String>,
}

impl PlaybackOutcome {
    fn success(method: &str, command: String) -> Self {
        PlaybackOutcome {
            succeeded: true,
            method: Some(method.to_string()),
            command: Some(command),
            diagnostic: None,
        }
    }

    fn failure(diagnostic: impl Into<String>) -> Self {
        PlaybackOutcome {
            succeeded: false,
            method: None,
            command: None,
            diagnostic: Some(diagnostic.into()),
        }
    }
}

/// Seam over the operating system's process execution
pub trait CommandRunner: Send + Sync {
    /// Run to completion, succeeding only on a zero exit status
    fn run(&self, program: &str, args: &[String]) -> Result<(), PlaybackError>;

    /// Run to completion and return trimmed stdout
    fn capture(&self, program: &str, args: &[String]) -> Result<String, PlaybackError>;
}

/// Runs real processes with `std::process::Command`
///
/// No timeout is imposed: a hung shell stalls only the thread that launched it.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemCommandRunner;

impl SystemCommandRunner {
    fn output(program: &str, args: &[String]) -> Result<std::process::Output, PlaybackError> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| {
                if source.kind() == ErrorKind::NotFound {
                    PlaybackError::NotFound {
                        program: program.to_string(),
                    }
                } else {
                    PlaybackError::Spawn {
                        program: program.to_string(),
                        source,
                    }
                }
            })?;

        if output.status.success() {
            Ok(output)
        } else {
            Err(PlaybackError::ExitStatus {
                program: program.to_string(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
    }
}

impl CommandRunner for SystemCommandRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<(), PlaybackError> {
        Self::output(program, args).map(|_| ())
    }

    fn capture(&self, program: &str, args: &[String]) -> Result<String, PlaybackError> {
        let output = Self::output(program, args)?;
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Quote a single argument for display
///
/// Arguments containing whitespace or a quote character are wrapped in double
/// quotes with embedded double quotes escaped. Everything else is left as is.
pub fn quote_arg(arg: &str) -> String {
    let needs_quotes = arg.is_empty()
        || arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'');

    if needs_quotes {
        format!("\"{}\"", arg.replace('"', "\\\""))
    } else {
        arg.to_string()
    }
}

/// Render a command and its arguments as one readable line
pub fn quote_command_line(program: &str, args: &[String]) -> String {
    std::iter::once(program)
        .chain(args.iter().map(String::as_str))
        .map(quote_arg)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert a Windows path to its WSL form with `wslpath -u`
///
/// Failure is logged and yields `None`; the caller omits that candidate.
fn translate_path(
    runner: &dyn CommandRunner,
    output: &dyn OutputChannel,
    windows_path: &str,
) -> Option<String> {
    let args = vec!["-u".to_string(), windows_path.to_string()];

    match runner.capture(WSLPATH, &args) {
        Ok(translated) if !translated.is_empty() => Some(translated),
        Ok(_) => {
            output.append_line(&format!(
                "Path translation for {} returned nothing, skipping",
                windows_path
            ));
            None
        }
        Err(e) => {
            output.append_line(&format!("Path translation failed for {}: {}", windows_path, e));
            None
        }
    }
}

/// Build the ordered candidate list for an environment
pub fn build_candidates(
    kind: EnvironmentKind,
    runner: &dyn CommandRunner,
    output: &dyn OutputChannel,
) -> Vec<PlaybackCandidate> {
    match kind {
        EnvironmentKind::Native => {
            let (powershell, pwsh) = if cfg!(windows) {
                ("powershell.exe", "pwsh.exe")
            } else {
                ("powershell", "pwsh")
            };
            vec![
                PlaybackCandidate::shell(format!("{} (PATH)", powershell), powershell),
                PlaybackCandidate::shell(format!("{} (PATH)", pwsh), pwsh),
            ]
        }
        EnvironmentKind::Wsl => {
            let shells = [
                ("Windows PowerShell", WINDOWS_POWERSHELL_WSL, WINDOWS_POWERSHELL_WIN),
                ("PowerShell 7", PWSH_WSL, PWSH_WIN),
            ];

            let mut candidates = Vec::new();
            for (name, absolute, windows_path) in shells {
                candidates.push(PlaybackCandidate::shell(
                    format!("{} (absolute path)", name),
                    absolute,
                ));

                if let Some(translated) = translate_path(runner, output, windows_path) {
                    if !candidates.iter().any(|c| c.command == translated) {
                        candidates.push(PlaybackCandidate::shell(
                            format!("{} (wslpath)", name),
                            translated,
                        ));
                    }
                }
            }

            // Windows interop resolves these through the Windows PATH
            candidates.push(PlaybackCandidate::shell("powershell.exe (PATH)", "powershell.exe"));
            candidates.push(PlaybackCandidate::shell("pwsh.exe (PATH)", "pwsh.exe"));
            candidates
        }
    }
}

/// Ordered, first-success-wins sound player
pub struct SoundFallbackChain {
    runner: Arc<dyn CommandRunner>,
    output: Arc<dyn OutputChannel>,
    environment: Option<EnvironmentKind>,
    tone: Option<Arc<dyn TonePlayer>>,
}

impl SoundFallbackChain {
    pub fn new(runner: Arc<dyn CommandRunner>, output: Arc<dyn OutputChannel>) -> Self {
        SoundFallbackChain {
            runner,
            output,
            environment: None,
            tone: None,
        }
    }

    /// Skip detection and always build candidates for `kind`
    pub fn with_environment(mut self, kind: EnvironmentKind) -> Self {
        self.environment = Some(kind);
        self
    }

    /// Try an in-process tone before any shell candidate
    pub fn with_tone(mut self, tone: Arc<dyn TonePlayer>) -> Self {
        self.tone = Some(tone);
        self
    }

    pub fn environment(&self) -> EnvironmentKind {
        self.environment
            .unwrap_or_else(|| detect_environment(&EnvironmentProbe::capture()))
    }

    /// Build the candidate list for the current environment
    pub fn candidates(&self) -> Vec<PlaybackCandidate> {
        build_candidates(self.environment(), self.runner.as_ref(), self.output.as_ref())
    }

    /// Tone first if configured, then the candidates for the current environment
    ///
    /// The candidate list is only built when the tone is absent or fails.
    pub fn try_play(&self) -> PlaybackOutcome {
        if let Some(outcome) = self.play_tone() {
            return outcome;
        }

        let candidates = self.candidates();
        self.play_candidates(&candidates)
    }

    /// Like `try_play`, over a candidate list the caller already built
    pub fn try_play_candidates(&self, candidates: &[PlaybackCandidate]) -> PlaybackOutcome {
        if let Some(outcome) = self.play_tone() {
            return outcome;
        }

        self.play_candidates(candidates)
    }

    fn play_tone(&self) -> Option<PlaybackOutcome> {
        let tone = self.tone.as_ref()?;

        self.output.append_line(&format!("Attempting sound via {}", TONE_LABEL));
        match tone.play() {
            Ok(()) => {
                self.output.append_line(&format!("Sound played via {}", TONE_LABEL));
                Some(PlaybackOutcome::success(TONE_LABEL, TONE_LABEL.to_string()))
            }
            Err(e) => {
                self.output
                    .append_line(&format!("Sound via {} failed: {:#}", TONE_LABEL, e));
                None
            }
        }
    }

    /// Try `candidates` in order, stopping at the first success
    ///
    /// Each attempt writes an "Attempting" line before the process starts, so a
    /// shell that never returns still shows up in the diagnostic channel.
    pub fn play_candidates(&self, candidates: &[PlaybackCandidate]) -> PlaybackOutcome {
        if candidates.is_empty() {
            self.output.append_line("No sound candidates available");
        }

        for candidate in candidates {
            let command_line = candidate.command_line();
            self.output.append_line(&format!(
                "Attempting sound via {}: {}",
                candidate.label, command_line
            ));

            match self.runner.run(&candidate.command, &candidate.args) {
                Ok(()) => {
                    self.output.append_line(&format!(
                        "Sound played via {}: {}",
                        candidate.label, command_line
                    ));
                    return PlaybackOutcome::success(&candidate.label, command_line);
                }
                Err(e) => {
                    self.output.append_line(&format!(
                        "Sound via {} failed ({}): {}",
                        candidate.label, command_line, e
                    ));
                }
            }
        }

        self.output.append_line("All sound attempts failed");
        PlaybackOutcome::failure("all sound attempts failed")
    }
}
