// SPDX-License-Identifier: GPL-2.0-only
use crate::command::{CommandError, CommandRunner};
use crate::os::OsFamily;
use crate::package;
use tracing::{debug, info};

/// Resolver status meaning "the selected version is already optimal".
/// Internal convention inherited from the shell-era tooling; this is not
/// a process exit code and not a failure.
pub const ALREADY_OPTIMAL: i32 = 1;

/// Outcome of version resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// `ALREADY_OPTIMAL` when a usable version was selected; otherwise
    /// the package-tool search status passed through.
    pub status: i32,
    /// Selected version, possibly empty when nothing was found.
    pub version: String,
}

/// Select the best installable agent package version.
///
/// A non-empty request that is already among the available versions is
/// returned as-is. Otherwise the nearest installable version is taken from
/// the package-tool search.
///
/// The `Other` family tags `ALREADY_OPTIMAL` on any plain search success,
/// even when the search produced an empty version; SUSE and Ubuntu require
/// a non-empty version first. The asymmetry is inherited behavior, kept
/// pending product review — callers must gate on `version`, not `status`.
pub fn optimal_version(
    family: OsFamily,
    requested: &str,
    runner: &dyn CommandRunner,
) -> Result<Resolution, CommandError> {
    if !requested.is_empty() {
        let available = package::available_versions(family, runner)?;
        debug!(available = %available.output, "available agent package versions");
        if available.success() && available.output.contains(requested) {
            info!(version = requested, "requested version is available");
            return Ok(Resolution {
                status: ALREADY_OPTIMAL,
                version: requested.to_string(),
            });
        }
    }

    let nearest = package::nearest_version(family, requested, runner)?;
    let version = nearest.first_line().to_string();
    let status = match family {
        OsFamily::Other => {
            if nearest.success() {
                ALREADY_OPTIMAL
            } else {
                nearest.status
            }
        }
        OsFamily::Suse | OsFamily::Ubuntu => {
            if nearest.success() && !version.is_empty() {
                ALREADY_OPTIMAL
            } else {
                nearest.status
            }
        }
    };
    info!(family = %family, version = %version, status, "resolved nearest agent version");
    Ok(Resolution { status, version })
}
