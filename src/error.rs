use thiserror::Error;

/// Why a single external-process invocation did not succeed
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("executable not found: {program}")]
    NotFound { program: String },

    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}{}", exit_code_text(.code), stderr_suffix(.stderr))]
    ExitStatus {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// A host message line that could not be decoded
///
/// Recoverable: the event loop logs it and reads the next line.
#[derive(Debug, Error)]
#[error("Malformed host message: {line}")]
pub struct MalformedMessage {
    /// The offending line, lossily decoded when it was not UTF-8
    pub line: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

fn exit_code_text(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!(": {}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_status_display_includes_stderr() {
        let err = PlaybackError::ExitStatus {
            program: "pwsh".to_string(),
            code: Some(1),
            stderr: "boom\n".to_string(),
        };
        assert_eq!(err.to_string(), "pwsh exited with code 1: boom");
    }

    #[test]
    fn test_malformed_message_display_names_the_line() {
        let source = serde_json::from_str::<serde_json::Value>("nope").unwrap_err();
        let err = MalformedMessage {
            line: "nope".to_string(),
            source: Box::new(source),
        };
        assert_eq!(err.to_string(), "Malformed host message: nope");
    }

    #[test]
    fn test_exit_status_display_without_code() {
        let err = PlaybackError::ExitStatus {
            program: "pwsh".to_string(),
            code: None,
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "pwsh exited with no exit code (terminated by signal)");
    }
}
