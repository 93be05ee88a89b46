//! Detection of the kind of console the process writes to.

use once_cell::sync::OnceCell;

/// Determines how log lines are decorated before they are handed to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeProfile {
    /// A regular process writing to a terminal or a plain text stream. Lines are decorated with an
    /// icon and ANSI colors.
    Terminal,
    /// A browser devtools-like console that understands `%c` style directives and `%O` object
    /// inspection.
    BrowserConsole,
}

/// A function that classifies the current process. Only ever called once.
pub type Detector = fn() -> RuntimeProfile;

/// The profile resolved for this process.
static PROFILE: OnceCell<RuntimeProfile> = OnceCell::new();

impl RuntimeProfile {
    /// The built-in detector. Anything compiled for the web (WebAssembly without WASI) has no
    /// process around it and is treated as a browser console.
    pub fn detect() -> Self {
        if cfg!(all(target_arch = "wasm32", not(target_os = "wasi"))) {
            RuntimeProfile::BrowserConsole
        } else {
            RuntimeProfile::Terminal
        }
    }

    /// The profile for this process. Resolved using [`detect()`][Self::detect()] on first use and
    /// fixed from then on.
    pub fn current() -> Self {
        *PROFILE.get_or_init(Self::detect)
    }

    /// Resolve the process-wide profile using a custom detector. If the profile was already
    /// resolved the detector is not called, and the existing profile is returned.
    pub fn resolve_with(detector: Detector) -> Self {
        *PROFILE.get_or_init(detector)
    }
}
