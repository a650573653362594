/// Runtime environment detection for choosing sound candidates
///
/// `EnvironmentProbe::capture()` reads the process environment and kernel release;
/// `detect_environment` is a pure function over the captured values so both
/// branches can be exercised in tests.

use std::env;
use std::fs;

const KERNEL_RELEASE_PATH: &str = "/proc/sys/kernel/osrelease";
const WSL_KERNEL_MARKER: &str = "microsoft";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvironmentKind {
    /// Linux running under the Windows Subsystem for Linux
    Wsl,
    /// Anything else: native Windows, macOS, plain Linux
    Native,
}

/// Raw markers used to detect WSL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentProbe {
    pub wsl_distro_name: Option<String>,
    pub wsl_interop: Option<String>,
    pub kernel_release: Option<String>,
}

impl EnvironmentProbe {
    pub fn capture() -> Self {
        EnvironmentProbe {
            wsl_distro_name: env::var("WSL_DISTRO_NAME").ok(),
            wsl_interop: env::var("WSL_INTEROP").ok(),
            kernel_release: fs::read_to_string(KERNEL_RELEASE_PATH).ok(),
        }
    }
}

pub fn detect_environment(probe: &EnvironmentProbe) -> EnvironmentKind {
    let has_marker = |value: &Option<String>| value.as_deref().is_some_and(|v| !v.is_empty());

    if has_marker(&probe.wsl_distro_name) || has_marker(&probe.wsl_interop) {
        return EnvironmentKind::Wsl;
    }

    let kernel_says_wsl = probe
        .kernel_release
        .as_deref()
        .is_some_and(|release| release.to_lowercase().contains(WSL_KERNEL_MARKER));

    if kernel_says_wsl {
        EnvironmentKind::Wsl
    } else {
        EnvironmentKind::Native
    }
}
