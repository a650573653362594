/// Application-wide constants for edit classification, alerting and sound playback

pub mod config {
    /// Configuration namespace used as the top-level key in settings.yaml
    pub const NAMESPACE: &str = "codexMonitor";

    /// Default minimum inserted-character count that flags an edit
    pub const DEFAULT_MIN_INSERTED_LENGTH: usize = 200;

    /// Directory under the home directory holding settings and the diagnostic log
    pub const CONFIG_DIR_NAME: &str = ".codex-monitor";

    pub const SETTINGS_FILE_NAME: &str = "settings.yaml";

    pub const LOG_FILE_NAME: &str = "codex-monitor.log";
}

pub mod alert {
    /// How long the status-bar message stays visible
    pub const STATUS_BAR_TIMEOUT_MS: u64 = 3000;

    /// Document scheme for edits backed by a real file on disk
    pub const FILE_SCHEME: &str = "file";

    /// Manually invocable command that re-runs the sound chain
    pub const PLAY_TEST_SOUND_COMMAND: &str = "codexMonitor.playTestSound";
}

pub mod sound {
    /// Windows PowerShell as seen from Windows
    pub const WINDOWS_POWERSHELL_WIN: &str =
        r"C:\Windows\System32\WindowsPowerShell\v1.0\powershell.exe";

    /// Windows PowerShell through the WSL drive mount
    pub const WINDOWS_POWERSHELL_WSL: &str =
        "/mnt/c/Windows/System32/WindowsPowerShell/v1.0/powershell.exe";

    /// PowerShell 7 as seen from Windows
    pub const PWSH_WIN: &str = r"C:\Program Files\PowerShell\7\pwsh.exe";

    /// PowerShell 7 through the WSL drive mount
    pub const PWSH_WSL: &str = "/mnt/c/Program Files/PowerShell/7/pwsh.exe";

    /// Path translation helper shipped with WSL
    pub const WSLPATH: &str = "wslpath";

    /// Plays the Windows "Exclamation" sound and waits for it to finish
    pub const BEEP_SCRIPT: &str =
        r#"(New-Object System.Media.SoundPlayer "$env:WINDIR\Media\Windows Exclamation.wav").PlaySync()"#;

    /// Shell flags: no profile loading, no prompts, run the script that follows
    pub const SHELL_ARGS: [&str; 3] = ["-NoProfile", "-NonInteractive", "-Command"];

    /// Label recorded for the in-process tone candidate
    pub const TONE_LABEL: &str = "in-process tone";
}

pub mod tone {
    pub const FREQUENCY_HZ: f32 = 880.0;

    pub const DURATION_MS: u64 = 250;

    /// Linear fade in/out length, avoids clicks at the edges
    pub const FADE_MS: u64 = 15;

    pub const AMPLITUDE: f32 = 0.2;
}
