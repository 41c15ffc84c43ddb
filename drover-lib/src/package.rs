// SPDX-License-Identifier: GPL-2.0-only
use crate::command::{CommandError, CommandResult, CommandRunner};
use crate::os::OsFamily;
use tracing::info;

/// Name of the agent package in every repository.
pub const AGENT_PACKAGE: &str = "drover-agent";

/// Query all package versions the repositories currently offer.
///
/// Output format is the package tool's contract: one version per line,
/// collapsed to a comma-separated list.
pub fn available_versions(
    family: OsFamily,
    runner: &dyn CommandRunner,
) -> Result<CommandResult, CommandError> {
    let command = match family {
        OsFamily::Suse => format!(
            "zypper --no-gpg-checks -q search -s --match-exact {AGENT_PACKAGE} \
             | grep {AGENT_PACKAGE} | sed -re 's/\\s+/ /g' | cut -d '|' -f 4 | tr '\\n' ', '"
        ),
        OsFamily::Ubuntu => format!(
            "apt-cache -q show {AGENT_PACKAGE} | grep 'Version:' | cut -d ' ' -f 2 | tr '\\n' ', '"
        ),
        OsFamily::Other => format!(
            "yum -q list all {AGENT_PACKAGE} | grep -E '^{AGENT_PACKAGE}' \
             | sed -re 's/\\s+/ /g' | cut -d ' ' -f 2 | tr '\\n' ', '"
        ),
    };
    runner.run(&command)
}

/// Query the nearest installable version: the first version the package
/// tool lists for the requested prefix. An empty request drops the filter,
/// so the first listed version wins.
pub fn nearest_version(
    family: OsFamily,
    requested: &str,
    runner: &dyn CommandRunner,
) -> Result<CommandResult, CommandError> {
    let filter = if requested.is_empty() {
        String::new()
    } else {
        format!(" | grep '{requested}'")
    };
    let command = match family {
        OsFamily::Suse => format!(
            "zypper --no-gpg-checks -q search -s --match-exact {AGENT_PACKAGE} \
             | grep {AGENT_PACKAGE}{filter} | cut -d '|' -f 4 | head -n1"
        ),
        OsFamily::Ubuntu => format!(
            "apt-cache -q show {AGENT_PACKAGE} | grep 'Version:'{filter} \
             | cut -d ' ' -f 2 | head -n1"
        ),
        OsFamily::Other => format!(
            "yum -q list all {AGENT_PACKAGE} | grep -E '^{AGENT_PACKAGE}'{filter} \
             | sed -re 's/\\s+/ /g' | cut -d ' ' -f 2 | head -n1"
        ),
    };
    runner.run(&command)
}

/// Check whether the installed agent package already matches `version`.
pub fn already_installed(
    family: OsFamily,
    version: &str,
    runner: &dyn CommandRunner,
) -> Result<bool, CommandError> {
    let command = match family {
        OsFamily::Ubuntu => format!("dpkg-query -W -f='${{Version}}' {AGENT_PACKAGE}"),
        _ => format!("rpm -q --queryformat '%{{VERSION}}-%{{RELEASE}}' {AGENT_PACKAGE}"),
    };
    let result = runner.run(&command)?;
    Ok(result.success() && result.output.contains(version))
}

/// Install the exact resolved version through the family's package manager.
pub fn install_agent(
    family: OsFamily,
    version: &str,
    runner: &dyn CommandRunner,
) -> Result<CommandResult, CommandError> {
    let command = match family {
        OsFamily::Suse => format!("zypper --no-gpg-checks install -y {AGENT_PACKAGE}-{version}"),
        OsFamily::Ubuntu => {
            format!("apt-get install -y --allow-downgrades {AGENT_PACKAGE}={version}*")
        }
        OsFamily::Other => format!("yum -y install --nogpgcheck {AGENT_PACKAGE}-{version}"),
    };
    info!(family = %family, version, "installing agent package");
    runner.run(&command)
}
