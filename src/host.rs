use std::fmt;
use std::fs;

const KERNEL_RELEASE_PATH: &str = "/proc/sys/kernel/osrelease";
const WSL_KERNEL_MARKER: &str = "microsoft";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Windows,
    Linux,
    Other,
}

impl OsFamily {
    pub fn current() -> Self {
        Self::from_os_name(std::env::consts::OS)
    }

    pub fn from_os_name(name: &str) -> Self {
        match name {
            "windows" => Self::Windows,
            "linux" => Self::Linux,
            _ => Self::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Windows => "windows",
            Self::Linux => "linux",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for OsFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where the process sits relative to the Windows Subsystem for Linux.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bridge {
    /// Windows host; the `wsl` command may route into a Linux environment.
    Outside,
    /// Running inside a WSL distribution.
    Inside,
    /// No bridge involved.
    Absent,
}

/// Facts about the host computed once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostContext {
    os_family: OsFamily,
    is_wsl: bool,
}

impl HostContext {
    /// `is_wsl` only holds on a Linux host whose kernel release carries the
    /// WSL marker.
    pub fn new(os_family: OsFamily, kernel_release: Option<&str>) -> Self {
        let is_wsl = os_family == OsFamily::Linux
            && kernel_release
                .map(|release| release.to_ascii_lowercase().contains(WSL_KERNEL_MARKER))
                .unwrap_or(false);
        Self { os_family, is_wsl }
    }

    pub fn detect() -> Self {
        let os_family = OsFamily::current();
        let release = match os_family {
            OsFamily::Linux => match fs::read_to_string(KERNEL_RELEASE_PATH) {
                Ok(release) => Some(release),
                Err(err) => {
                    tracing::debug!("could not read kernel release: {err}");
                    None
                }
            },
            _ => None,
        };
        let host = Self::new(os_family, release.as_deref());
        tracing::info!(
            os_family = %host.os_family,
            is_wsl = host.is_wsl,
            "host context detected"
        );
        host
    }

    pub fn os_family(&self) -> OsFamily {
        self.os_family
    }

    pub fn is_wsl(&self) -> bool {
        self.is_wsl
    }

    pub fn bridge(&self) -> Bridge {
        match (self.os_family, self.is_wsl) {
            (OsFamily::Windows, _) => Bridge::Outside,
            (OsFamily::Linux, true) => Bridge::Inside,
            _ => Bridge::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Bridge, HostContext, OsFamily};

    #[test]
    fn wsl_detected_from_microsoft_kernel_release() {
        let host = HostContext::new(
            OsFamily::Linux,
            Some("5.15.153.1-microsoft-standard-WSL2\n"),
        );
        assert!(host.is_wsl());
        assert_eq!(host.bridge(), Bridge::Inside);
    }

    #[test]
    fn wsl_marker_is_case_insensitive() {
        let host = HostContext::new(OsFamily::Linux, Some("4.4.0-19041-Microsoft"));
        assert!(host.is_wsl());
    }

    #[test]
    fn plain_linux_kernel_is_not_wsl() {
        let host = HostContext::new(OsFamily::Linux, Some("6.8.0-45-generic"));
        assert!(!host.is_wsl());
        assert_eq!(host.bridge(), Bridge::Absent);
    }

    #[test]
    fn wsl_requires_linux_family() {
        let host = HostContext::new(OsFamily::Windows, Some("microsoft"));
        assert!(!host.is_wsl());
        assert_eq!(host.bridge(), Bridge::Outside);

        let other = HostContext::new(OsFamily::Other, Some("microsoft"));
        assert!(!other.is_wsl());
        assert_eq!(other.bridge(), Bridge::Absent);
    }

    #[test]
    fn os_family_maps_rust_target_names() {
        assert_eq!(OsFamily::from_os_name("windows"), OsFamily::Windows);
        assert_eq!(OsFamily::from_os_name("linux"), OsFamily::Linux);
        assert_eq!(OsFamily::from_os_name("macos"), OsFamily::Other);
    }
}
