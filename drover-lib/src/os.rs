// SPDX-License-Identifier: GPL-2.0-only
use std::path::Path;

/// Release-identification file used for OS family detection.
pub const RELEASE_FILE: &str = "/etc/os-release";

/// Distribution family of the host, derived once per run.
///
/// Drives which package manager is invoked and how its output is parsed.
/// Anything that is neither SUSE nor Ubuntu falls into `Other` and is
/// handled with yum/rpm commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsFamily {
    Suse,
    Ubuntu,
    Other,
}

impl OsFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            OsFamily::Suse => "suse",
            OsFamily::Ubuntu => "ubuntu",
            OsFamily::Other => "other",
        }
    }

    /// Detect the family from the default release file.
    pub fn detect() -> OsFamily {
        Self::detect_from(Path::new(RELEASE_FILE))
    }

    /// Detect the family from a specific release file.
    ///
    /// Case-insensitive substring match; a missing or unreadable file
    /// classifies as `Other`. "suse" is checked before "ubuntu", so a file
    /// that somehow contains both classifies as SUSE.
    pub fn detect_from(path: &Path) -> OsFamily {
        let Ok(content) = std::fs::read_to_string(path) else {
            return OsFamily::Other;
        };
        let content = content.to_lowercase();
        if content.contains("suse") {
            OsFamily::Suse
        } else if content.contains("ubuntu") {
            OsFamily::Ubuntu
        } else {
            OsFamily::Other
        }
    }
}

impl std::fmt::Display for OsFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OsFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "suse" => Ok(OsFamily::Suse),
            "ubuntu" => Ok(OsFamily::Ubuntu),
            "other" => Ok(OsFamily::Other),
            _ => Err(format!("invalid OS family: '{s}' (expected: suse, ubuntu, other)")),
        }
    }
}
