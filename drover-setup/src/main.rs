// SPDX-License-Identifier: GPL-2.0-only
use clap::Parser;
use drover_lib::command::ShellRunner;
use drover_lib::setup::{Setup, SetupArgs};
use drover_lib::{agent, os};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

mod logging;

const EXIT_FAILURE: u8 = 1;

#[derive(Parser)]
#[command(
    name = "drover-setup",
    about = "Install, configure and start the Drover agent on this node",
    version
)]
struct Cli {
    /// Hostname this node's agent should register as
    agent_hostname: String,

    /// Shared secret for agent registration
    passphrase: String,

    /// Drover server hostname
    server_hostname: String,

    /// Requested agent package version
    /// ("null" or an unexpanded placeholder selects the nearest available)
    #[arg(id = "agent_version", value_name = "VERSION")]
    version: String,

    /// Drover server port
    port: u16,

    /// Path to the OS release-identification file
    /// [default: /etc/os-release]
    #[arg(long)]
    release_file: Option<PathBuf>,

    /// Path to the agent configuration file
    /// [default: /etc/drover-agent/agent.conf]
    #[arg(long)]
    agent_config: Option<PathBuf>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    logging::init();

    let release_file = cli
        .release_file
        .unwrap_or_else(|| PathBuf::from(os::RELEASE_FILE));
    let config_file = cli
        .agent_config
        .unwrap_or_else(|| PathBuf::from(agent::AGENT_CONFIG_FILE));

    let args = SetupArgs {
        agent_hostname: cli.agent_hostname,
        passphrase: cli.passphrase,
        server_hostname: cli.server_hostname,
        requested_version: cli.version,
        server_port: cli.port,
    };

    let runner = ShellRunner;
    let setup = Setup::new(&runner)
        .release_file(&release_file)
        .config_file(&config_file);

    match setup.run(&args) {
        Ok(0) => {
            info!(server = %args.server_hostname, "agent is up and registering");
            ExitCode::SUCCESS
        }
        Ok(status) => {
            error!(status, "agent did not come up");
            ExitCode::from(u8::try_from(status).unwrap_or(EXIT_FAILURE))
        }
        Err(e) => {
            error!(error = %e, "agent setup failed");
            ExitCode::from(u8::try_from(e.exit_status()).unwrap_or(EXIT_FAILURE))
        }
    }
}
