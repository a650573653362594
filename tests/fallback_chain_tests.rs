// Ordering and logging behaviour of the sound fallback chain, driven through a scripted runner

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use codex_monitor::environment::EnvironmentKind;
use codex_monitor::error::PlaybackError;
use codex_monitor::output::MemoryChannel;
use codex_monitor::sound::{CommandRunner, PlaybackCandidate, SoundFallbackChain};
use codex_monitor::tone::TonePlayer;

/// Succeeds only for programs listed in `succeeds`, records every attempt
#[derive(Default)]
struct ScriptedRunner {
    succeeds: Vec<String>,
    translations: HashMap<String, String>,
    attempts: Mutex<Vec<String>>,
    captures: Mutex<usize>,
}

impl ScriptedRunner {
    fn succeeding(programs: &[&str]) -> Self {
        ScriptedRunner {
            succeeds: programs.iter().map(|p| p.to_string()).collect(),
            ..Default::default()
        }
    }

    fn attempts(&self) -> Vec<String> {
        self.attempts.lock().unwrap().clone()
    }

    fn captures(&self) -> usize {
        *self.captures.lock().unwrap()
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, program: &str, _args: &[String]) -> Result<(), PlaybackError> {
        self.attempts.lock().unwrap().push(program.to_string());
        if self.succeeds.iter().any(|p| p == program) {
            Ok(())
        } else {
            Err(PlaybackError::ExitStatus {
                program: program.to_string(),
                code: Some(1),
                stderr: String::new(),
            })
        }
    }

    fn capture(&self, program: &str, args: &[String]) -> Result<String, PlaybackError> {
        *self.captures.lock().unwrap() += 1;
        let windows_path = args.last().cloned().unwrap_or_default();
        self.translations
            .get(&windows_path)
            .cloned()
            .ok_or_else(|| PlaybackError::NotFound {
                program: program.to_string(),
            })
    }
}

struct FailingTone;

impl TonePlayer for FailingTone {
    fn play(&self) -> anyhow::Result<()> {
        Err(anyhow!("No output device available"))
    }
}

struct WorkingTone;

impl TonePlayer for WorkingTone {
    fn play(&self) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Log lines reporting how an attempt ended, without the "Attempting" lines
fn outcome_lines(output: &MemoryChannel) -> Vec<String> {
    output
        .lines()
        .into_iter()
        .filter(|line| !line.starts_with("Attempting"))
        .collect()
}

fn candidates(names: &[&str]) -> Vec<PlaybackCandidate> {
    names
        .iter()
        .map(|name| PlaybackCandidate::shell(name.to_uppercase(), *name))
        .collect()
}

#[test]
fn test_stops_at_first_success() {
    let runner = Arc::new(ScriptedRunner::succeeding(&["b"]));
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(runner.clone(), output.clone());

    let outcome = chain.play_candidates(&candidates(&["a", "b", "c"]));

    assert!(outcome.succeeded);
    assert_eq!(outcome.method.as_deref(), Some("B"));
    assert!(outcome.command.unwrap().starts_with("b -NoProfile -NonInteractive -Command "));
    assert_eq!(runner.attempts(), vec!["a", "b"]);

    let lines = outcome_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Sound via A failed (a -NoProfile"));
    assert!(lines[1].starts_with("Sound played via B: b -NoProfile"));
}

#[test]
fn test_each_attempt_is_logged_before_it_runs() {
    let runner = Arc::new(ScriptedRunner::succeeding(&["b"]));
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(runner, output.clone());

    chain.play_candidates(&candidates(&["a", "b", "c"]));

    let lines = output.lines();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Attempting sound via A: a -NoProfile -NonInteractive -Command "));
    assert!(lines[1].starts_with("Sound via A failed"));
    assert!(lines[2].starts_with("Attempting sound via B: b -NoProfile"));
    assert!(lines[3].starts_with("Sound played via B"));
    assert!(!output.contains("Attempting sound via C"));
}

#[test]
fn test_all_failures_log_one_line_per_candidate_plus_summary() {
    let runner = Arc::new(ScriptedRunner::default());
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(runner.clone(), output.clone());

    let outcome = chain.play_candidates(&candidates(&["a", "b", "c"]));

    assert!(!outcome.succeeded);
    assert_eq!(outcome.method, None);
    assert_eq!(runner.attempts(), vec!["a", "b", "c"]);

    let lines = outcome_lines(&output);
    assert_eq!(lines.len(), 4);
    assert!(lines[..3].iter().all(|l| l.contains("failed") && l.contains("exited with code 1")));
    assert_eq!(lines[3], "All sound attempts failed");
}

#[test]
fn test_empty_candidate_list_reports_failure() {
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(Arc::new(ScriptedRunner::default()), output.clone());

    let outcome = chain.play_candidates(&[]);

    assert!(!outcome.succeeded);
    assert_eq!(
        output.lines(),
        vec!["No sound candidates available", "All sound attempts failed"]
    );
}

#[test]
fn test_failed_log_line_quotes_the_command() {
    let runner = Arc::new(ScriptedRunner::default());
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(runner, output.clone());

    chain.play_candidates(&[PlaybackCandidate::shell(
        "PowerShell 7 (absolute path)",
        "/mnt/c/Program Files/PowerShell/7/pwsh.exe",
    )]);

    let lines = output.lines();
    let attempting = &lines[0];
    assert!(attempting.contains("via PowerShell 7 (absolute path): \"/mnt/c/Program Files/PowerShell/7/pwsh.exe\" -NoProfile"));

    let first = &outcome_lines(&output)[0];
    assert!(first.contains("(\"/mnt/c/Program Files/PowerShell/7/pwsh.exe\" -NoProfile"));
    assert!(first.contains("\"(New-Object System.Media.SoundPlayer \\\"$env:WINDIR"));
}

#[test]
fn test_native_environment_tries_bare_names() {
    let runner = Arc::new(ScriptedRunner::default());
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(runner.clone(), output.clone())
        .with_environment(EnvironmentKind::Native);

    let outcome = chain.try_play();

    assert!(!outcome.succeeded);
    let attempts = runner.attempts();
    assert_eq!(attempts.len(), 2);
    assert!(attempts[0].starts_with("powershell"));
    assert!(attempts[1].starts_with("pwsh"));
}

#[test]
fn test_wsl_environment_order_with_translation() {
    let mut runner = ScriptedRunner::succeeding(&["pwsh.exe"]);
    runner.translations.insert(
        r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe".to_string(),
        "/mnt/host/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe".to_string(),
    );
    let runner = Arc::new(runner);
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(runner.clone(), output.clone())
        .with_environment(EnvironmentKind::Wsl);

    let outcome = chain.try_play();

    assert!(outcome.succeeded);
    assert_eq!(outcome.method.as_deref(), Some("pwsh.exe (PATH)"));
    assert_eq!(
        runner.attempts(),
        vec![
            "/mnt/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe",
            "/mnt/host/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe",
            "/mnt/c/Program Files/PowerShell/7/pwsh.exe",
            "powershell.exe",
            "pwsh.exe",
        ]
    );
    // PowerShell 7 path translation failed and was logged, not fatal
    assert!(output.contains(r"Path translation failed for C:\Program Files\PowerShell\7\pwsh.exe"));
}

#[test]
fn test_tone_is_tried_first_and_short_circuits() {
    let runner = Arc::new(ScriptedRunner::default());
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(runner.clone(), output.clone())
        .with_environment(EnvironmentKind::Native)
        .with_tone(Arc::new(WorkingTone));

    let outcome = chain.try_play();

    assert!(outcome.succeeded);
    assert_eq!(outcome.method.as_deref(), Some("in-process tone"));
    assert!(runner.attempts().is_empty());
    assert_eq!(
        output.lines(),
        vec!["Attempting sound via in-process tone", "Sound played via in-process tone"]
    );
}

#[test]
fn test_tone_failure_falls_through_to_shells() {
    let runner = Arc::new(ScriptedRunner::succeeding(&["powershell", "powershell.exe"]));
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(runner.clone(), output.clone())
        .with_environment(EnvironmentKind::Native)
        .with_tone(Arc::new(FailingTone));

    let outcome = chain.try_play();

    assert!(outcome.succeeded);
    assert_eq!(runner.attempts().len(), 1);
    let lines = outcome_lines(&output);
    assert_eq!(lines[0], "Sound via in-process tone failed: No output device available");
    assert!(lines[1].starts_with("Sound played via powershell"));
}

#[test]
fn test_prebuilt_candidates_are_not_rebuilt() {
    let mut runner = ScriptedRunner::succeeding(&["pwsh.exe"]);
    runner.translations.insert(
        r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe".to_string(),
        "/mnt/host/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe".to_string(),
    );
    let runner = Arc::new(runner);
    let output = Arc::new(MemoryChannel::new());
    let chain = SoundFallbackChain::new(runner.clone(), output.clone())
        .with_environment(EnvironmentKind::Wsl)
        .with_tone(Arc::new(FailingTone));

    let candidates = chain.candidates();
    assert_eq!(runner.captures(), 2);

    let outcome = chain.try_play_candidates(&candidates);

    assert!(outcome.succeeded);
    assert_eq!(outcome.method.as_deref(), Some("pwsh.exe (PATH)"));
    // wslpath ran once per Windows path, while building the list only
    assert_eq!(runner.captures(), 2);
    assert_eq!(runner.attempts().len(), candidates.len());
    assert!(output.contains("Sound via in-process tone failed"));
}
